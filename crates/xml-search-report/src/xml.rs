//! Search results as XML documents
//!
//! A single result renders as:
//!
//! ```text
//! <searchResults>
//!   <metadata>
//!     <parserType>DOM Parser</parserType>
//!     <elementName>book</elementName>
//!     <resultsCount>2</resultsCount>
//!     <executionTime>12.50</executionTime>
//!   </metadata>
//!   <results>
//!     <element>
//!       <tag>book</tag>
//!       <path>catalog/book</path>
//!       <attributes><attribute name="id" value="bk101"/></attributes>
//!       <text>...</text>
//!     </element>
//!   </results>
//! </searchResults>
//! ```

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use xml_search_traits::{Error, ParsedElement, Result, SearchResult};

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Render one result as a standalone document with metadata and results blocks
pub fn result_to_xml(result: &SearchResult) -> Result<String> {
    let mut writer = new_writer()?;
    open(&mut writer, BytesStart::new("searchResults"))?;
    write_metadata(&mut writer, result, true)?;
    write_results(&mut writer, &result.elements)?;
    close(&mut writer, "searchResults")?;
    finish(writer)
}

/// Render several results under one `multipleSearchResults` root.
///
/// Each block carries a 1-based `index` attribute and a shorter metadata
/// header without filters or timing.
pub fn results_to_xml(results: &[SearchResult]) -> Result<String> {
    let mut writer = new_writer()?;
    open(&mut writer, BytesStart::new("multipleSearchResults"))?;
    for (idx, result) in results.iter().enumerate() {
        let index = (idx + 1).to_string();
        let mut block = BytesStart::new("searchResult");
        block.push_attribute(("index", index.as_str()));
        open(&mut writer, block)?;
        write_metadata(&mut writer, result, false)?;
        write_results(&mut writer, &result.elements)?;
        close(&mut writer, "searchResult")?;
    }
    close(&mut writer, "multipleSearchResults")?;
    finish(writer)
}

fn new_writer() -> Result<XmlWriter> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    Ok(writer)
}

fn write_metadata(writer: &mut XmlWriter, result: &SearchResult, full: bool) -> Result<()> {
    open(writer, BytesStart::new("metadata"))?;
    text_element(writer, "parserType", &result.parser_type)?;
    text_element(writer, "elementName", &result.query.element_name)?;

    if full {
        if let Some(name) = result.query.attribute_filter() {
            open(writer, BytesStart::new("attributeFilter"))?;
            text_element(writer, "name", name)?;
            text_element(
                writer,
                "value",
                result.query.attribute_value.as_deref().unwrap_or_default(),
            )?;
            close(writer, "attributeFilter")?;
        }
        if let Some(text) = result.query.text_filter() {
            text_element(writer, "textFilter", text)?;
        }
    }

    text_element(writer, "resultsCount", &result.count().to_string())?;
    if full {
        text_element(
            writer,
            "executionTime",
            &format!("{:.2}", result.execution_time_ms),
        )?;
    }
    close(writer, "metadata")
}

fn write_results(writer: &mut XmlWriter, elements: &[ParsedElement]) -> Result<()> {
    if elements.is_empty() {
        return write(writer, Event::Empty(BytesStart::new("results")));
    }
    open(writer, BytesStart::new("results"))?;
    for element in elements {
        write_element(writer, element)?;
    }
    close(writer, "results")
}

fn write_element(writer: &mut XmlWriter, element: &ParsedElement) -> Result<()> {
    open(writer, BytesStart::new("element"))?;
    text_element(writer, "tag", &element.tag)?;
    if !element.path.is_empty() {
        text_element(writer, "path", &element.path)?;
    }

    if !element.attributes.is_empty() {
        open(writer, BytesStart::new("attributes"))?;
        for (name, value) in &element.attributes {
            let mut attribute = BytesStart::new("attribute");
            attribute.push_attribute(("name", name.as_str()));
            attribute.push_attribute(("value", value.as_str()));
            write(writer, Event::Empty(attribute))?;
        }
        close(writer, "attributes")?;
    }

    let text = element.text.trim();
    if !text.is_empty() {
        text_element(writer, "text", text)?;
    }
    if element.children_count() > 0 {
        text_element(writer, "childrenCount", &element.children_count().to_string())?;
    }
    close(writer, "element")
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    open(writer, BytesStart::new(name))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    close(writer, name)
}

fn open(writer: &mut XmlWriter, start: BytesStart<'_>) -> Result<()> {
    write(writer, Event::Start(start))
}

fn close(writer: &mut XmlWriter, name: &str) -> Result<()> {
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
}

fn finish(writer: XmlWriter) -> Result<String> {
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| Error::malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use xml_search_traits::SearchQuery;

    use super::*;

    fn sample() -> SearchResult {
        let mut attrs = BTreeMap::new();
        attrs.insert("id".to_string(), "bk101".to_string());
        attrs.insert("note".to_string(), "a<b & \"c\"".to_string());
        let book = ParsedElement::new("book", attrs, "catalog/book").with_text("Fish & Chips");
        let bare = ParsedElement::new("book", BTreeMap::new(), "catalog/shelf/book");
        SearchResult::new(
            SearchQuery::new("book")
                .with_attribute("id", "bk101")
                .with_text("fish"),
            vec![book, bare],
            "DOM Parser",
            12.5,
        )
    }

    #[test]
    fn single_result_is_well_formed_and_ordered() {
        let xml = result_to_xml(&sample()).unwrap();
        let doc = flatten(&xml);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(doc.contains("<parserType>DOM Parser</parserType>"));
        assert!(doc.contains("<name>id</name>"));
        assert!(doc.contains("<value>bk101</value>"));
        assert!(doc.contains("<textFilter>fish</textFilter>"));
        assert!(doc.contains("<resultsCount>2</resultsCount>"));
        assert!(doc.contains("<executionTime>12.50</executionTime>"));
        assert!(doc.contains("<text>Fish &amp; Chips</text>"));
        assert!(doc.contains("value=\"a&lt;b &amp; &quot;c&quot;\""));

        let first = doc.find("<path>catalog/book</path>").unwrap();
        let second = doc.find("<path>catalog/shelf/book</path>").unwrap();
        assert!(first < second);

        let mut reader = quick_xml::Reader::from_str(&xml);
        while !matches!(reader.read_event().unwrap(), Event::Eof) {}
    }

    #[test]
    fn empty_result_has_empty_results_block() {
        let result = SearchResult::new(SearchQuery::new("missing"), vec![], "SAX Parser", 0.0);
        let xml = result_to_xml(&result).unwrap();
        assert!(xml.contains("<results/>"));
        assert!(!xml.contains("attributeFilter"));
        assert!(!xml.contains("textFilter"));
    }

    #[test]
    fn multiple_results_are_indexed() {
        let xml = results_to_xml(&[sample(), sample()]).unwrap();
        assert!(xml.contains("<multipleSearchResults>"));
        assert!(xml.contains("<searchResult index=\"1\">"));
        assert!(xml.contains("<searchResult index=\"2\">"));
        assert!(!xml.contains("executionTime"));
    }

    /// Strip indentation so assertions do not depend on whitespace layout
    fn flatten(xml: &str) -> String {
        xml.lines().map(str::trim).collect::<Vec<_>>().join("")
    }
}
