//! Basic tests for dom-adapter

use std::io::Write;

use dom_adapter::{DomStrategy, DomTree};
use tempfile::NamedTempFile;
use xml_search_traits::{ErrorKind, ParserStrategy, SearchQuery};

const LIBRARY: &str = r#"<?xml version="1.0"?>
<library>
    <shelf name="fiction">
        <Book id="b1" year="1965">Dune<note>classic</note></Book>
        <book id="b2" year="1969">Ubik</book>
    </shelf>
    <shelf name="science">
        <BOOK id="b3">Cosmos</BOOK>
    </shelf>
</library>"#;

fn xml_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_dom_tree_document_element() {
    let tree = DomTree::parse_str(LIBRARY).unwrap();
    let root = tree.document_element();
    assert_eq!(tree.tag(root), Some("library"));
    assert_eq!(tree.child_elements(root).count(), 2);
}

#[test]
fn test_dom_matches_tag_case_insensitively() {
    let file = xml_file(LIBRARY);
    let result = DomStrategy::new()
        .parse(file.path(), &SearchQuery::new("book"))
        .unwrap();

    let tags: Vec<&str> = result.elements.iter().map(|e| e.tag.as_str()).collect();
    assert_eq!(tags, vec!["Book", "book", "BOOK"]);
    let paths: Vec<&str> = result.elements.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["library/shelf/Book", "library/shelf/book", "library/shelf/BOOK"]
    );
}

#[test]
fn test_dom_text_is_direct_text_only() {
    let file = xml_file(LIBRARY);
    let result = DomStrategy::new()
        .parse(file.path(), &SearchQuery::new("book").with_text("classic"))
        .unwrap();
    assert!(result.is_empty(), "descendant text must not match");

    let dune = DomStrategy::new()
        .parse(file.path(), &SearchQuery::new("book").with_attribute("id", "b1"))
        .unwrap();
    assert_eq!(dune.count(), 1);
    assert_eq!(dune.elements[0].text, "Dune");
}

#[test]
fn test_dom_nested_matches_are_all_reported() {
    let file = xml_file("<item n='1'><item n='2'>inner</item></item>");
    let result = DomStrategy::new()
        .parse(file.path(), &SearchQuery::new("item"))
        .unwrap();
    assert_eq!(result.count(), 2);
    assert_eq!(result.elements[0].path, "item");
    assert_eq!(result.elements[1].path, "item/item");
}

#[test]
fn test_dom_uses_local_tag_names() {
    let file = xml_file(r#"<x:root xmlns:x="urn:x"><x:item x:id="1">v</x:item></x:root>"#);
    let result = DomStrategy::new()
        .parse(file.path(), &SearchQuery::new("item"))
        .unwrap();
    assert_eq!(result.count(), 1);
    assert_eq!(result.elements[0].path, "root/item");
    assert_eq!(result.elements[0].attributes["{urn:x}id"], "1");
    assert_eq!(result.elements[0].attributes.len(), 1);
}

#[test]
fn test_dom_qualified_attributes_do_not_collide() {
    let file = xml_file(
        r#"<r xmlns:a="urn:a"><book xml:lang="en" lang="fr" a:id="1" id="2"/></r>"#,
    );
    let strategy = DomStrategy::new();
    let result = strategy
        .parse(file.path(), &SearchQuery::new("book").with_attribute("lang", "fr"))
        .unwrap();
    assert_eq!(result.count(), 1);
    assert_eq!(result.elements[0].attributes.len(), 4);
    assert_eq!(result.elements[0].attributes["id"], "2");
    assert_eq!(result.elements[0].attributes["{urn:a}id"], "1");

    let attrs = strategy.available_attributes(file.path(), "book").unwrap();
    assert_eq!(
        attrs.into_iter().collect::<Vec<_>>(),
        vec![
            "id",
            "lang",
            "{http://www.w3.org/XML/1998/namespace}lang",
            "{urn:a}id"
        ]
    );
}

#[test]
fn test_dom_accepts_doctype_and_declared_encoding() {
    let doctype = xml_file(
        r#"<?xml version="1.0"?>
<!DOCTYPE library [<!ENTITY pub "Acme">]>
<library><book id="b1">&pub; Press</book></library>"#,
    );
    let result = DomStrategy::new()
        .parse(doctype.path(), &SearchQuery::new("book"))
        .unwrap();
    assert_eq!(result.elements[0].text, "Acme Press");

    let mut latin1 = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
    latin1
        .write_all(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><r><item>caf\xE9</item></r>")
        .unwrap();
    let result = DomStrategy::new()
        .parse(latin1.path(), &SearchQuery::new("item"))
        .unwrap();
    assert_eq!(result.elements[0].text, "caf\u{e9}");
}

#[test]
fn test_dom_discovery() {
    let file = xml_file(LIBRARY);
    let strategy = DomStrategy::new();

    let attrs = strategy.available_attributes(file.path(), "BOOK").unwrap();
    assert_eq!(attrs.into_iter().collect::<Vec<_>>(), vec!["id", "year"]);

    let years = strategy.attribute_values(file.path(), "book", "year").unwrap();
    assert_eq!(years.into_iter().collect::<Vec<_>>(), vec!["1965", "1969"]);

    let names = strategy.element_names(file.path()).unwrap();
    assert!(names.contains("Book") && names.contains("book") && names.contains("BOOK"));
    assert!(names.contains("note"));
}

#[test]
fn test_dom_invalid_xml() {
    let strategy = DomStrategy::new();
    for doc in ["<a><b></a>", "<root><unclosed>", ""] {
        let file = xml_file(doc);
        let err = strategy.parse(file.path(), &SearchQuery::new("a")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDocument, "document {:?}", doc);

        let err = strategy.available_attributes(file.path(), "a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    }
}

#[test]
fn test_dom_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = DomStrategy::new()
        .attribute_values(&dir.path().join("missing.xml"), "a", "b")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
