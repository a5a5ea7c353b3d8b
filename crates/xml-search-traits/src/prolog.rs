//! Document prolog handling shared by the strategies.
//!
//! Covers the two things a parser backend may refuse on its own: a declared
//! non-UTF-8 encoding and a `<!DOCTYPE>` with internal entity declarations.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io;
use std::ops::Range;

use encoding_rs::{Encoding, UTF_8};
use quick_xml::escape::{resolve_predefined_entity, unescape, unescape_with};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};

/// Internal general entities declared in a DOCTYPE, name to replacement text
pub type Entities = BTreeMap<String, String>;

/// Decode raw document bytes to text.
///
/// A byte order mark wins over the XML declaration; without either the
/// document is UTF-8. When the text was converted, the declaration is
/// relabelled `UTF-8` so downstream parsers see a consistent document.
pub fn decode_document(bytes: &[u8]) -> Result<String> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes)?.unwrap_or(UTF_8), bytes),
    };

    let text = encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            Error::malformed(format!("document is not valid {}", encoding.name()))
        })?
        .into_owned();

    if encoding == UTF_8 {
        return Ok(text);
    }
    tracing::debug!(encoding = encoding.name(), "decoded document");
    Ok(relabel_utf8(text))
}

fn declared_encoding(bytes: &[u8]) -> Result<Option<&'static Encoding>> {
    let Some(range) = encoding_label_range(bytes) else {
        return Ok(None);
    };
    let label = &bytes[range];
    Encoding::for_label(label).map(Some).ok_or_else(|| {
        Error::malformed(format!(
            "unknown encoding: {}",
            String::from_utf8_lossy(label)
        ))
    })
}

fn relabel_utf8(mut text: String) -> String {
    if let Some(range) = encoding_label_range(text.as_bytes()) {
        text.replace_range(range, "UTF-8");
    }
    text
}

/// Byte range of the `encoding` value inside a leading XML declaration
fn encoding_label_range(head: &[u8]) -> Option<Range<usize>> {
    if !head.starts_with(b"<?xml") {
        return None;
    }
    let end = find(head, b"?>")?;
    let mut pos = find(&head[..end], b"encoding")? + b"encoding".len();

    pos += skip_whitespace(&head[pos..end]);
    if head.get(pos) != Some(&b'=') {
        return None;
    }
    pos += 1;
    pos += skip_whitespace(&head[pos..end]);

    let quote = *head.get(pos).filter(|b| **b == b'"' || **b == b'\'')?;
    let start = pos + 1;
    let len = head[start..end].iter().position(|b| *b == quote)?;
    Some(start..start + len)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn skip_whitespace(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count()
}

/// Collect `<!ENTITY name "value">` declarations from DOCTYPE content.
///
/// Parameter entities and external (`SYSTEM`/`PUBLIC`) entities are skipped.
/// Character references and predefined entities in a value are expanded
/// here, once.
pub fn internal_entities(doctype: &str) -> Entities {
    let mut entities = Entities::new();
    let mut rest = doctype;

    while let Some(at) = rest.find("<!") {
        rest = &rest[at..];
        if let Some(comment) = rest.strip_prefix("<!--") {
            rest = comment.split_once("-->").map_or("", |(_, after)| after);
            continue;
        }
        let Some(decl) = rest.strip_prefix("<!ENTITY") else {
            rest = &rest[2..];
            continue;
        };

        let decl = decl.trim_start();
        let (parameter, decl) = match decl.strip_prefix('%') {
            Some(after) => (true, after.trim_start()),
            None => (false, decl),
        };
        let name_len = decl
            .find(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == '>')
            .unwrap_or(decl.len());
        let (name, after_name) = decl.split_at(name_len);
        let after_name = after_name.trim_start();

        let mut consumed = after_name;
        if let Some(quote) = after_name.chars().next().filter(|c| *c == '"' || *c == '\'') {
            if let Some((value, after)) = after_name[1..].split_once(quote) {
                if !parameter && !name.is_empty() {
                    let value = unescape(value).map_or_else(|_| value.to_string(), Cow::into_owned);
                    entities.entry(name.to_string()).or_insert(value);
                }
                consumed = after;
            }
        }
        rest = consumed.split_once('>').map_or("", |(_, after)| after);
    }
    entities
}

/// Replacement text for `&name;`, predefined entities first
pub fn resolve_entity<'a>(entities: &'a Entities, name: &str) -> Option<&'a str> {
    resolve_predefined_entity(name).or_else(|| entities.get(name).map(String::as_str))
}

/// Expand character, predefined and declared entity references in `raw`
pub fn expand_entities<'r>(raw: &'r str, entities: &Entities) -> Result<Cow<'r, str>> {
    unescape_with(raw, |name| resolve_entity(entities, name))
        .map_err(|e| Error::malformed(e.to_string()))
}

/// Rewrite a document without its DOCTYPE, with declared entities expanded.
///
/// For backends that reject DTDs outright. Documents without a DOCTYPE are
/// returned untouched. Replacement text is inserted as character data.
pub fn strip_doctype(xml: &str) -> Result<Cow<'_, str>> {
    if !xml.contains("<!DOCTYPE") {
        return Ok(Cow::Borrowed(xml));
    }

    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut entities = Entities::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::malformed(format!("{} (at byte {})", e, reader.buffer_position())))?;
        match event {
            Event::DocType(doctype) => {
                entities = internal_entities(utf8(&doctype)?);
                tracing::trace!(entities = entities.len(), "dropped DOCTYPE");
            }
            Event::Text(text) => {
                let content = expand_entities(utf8(&text)?, &entities)?;
                write(&mut writer, Event::Text(BytesText::new(&content)))?;
            }
            Event::Start(start) => {
                write(&mut writer, Event::Start(expand_attributes(&start, &entities)?))?;
            }
            Event::Empty(start) => {
                write(&mut writer, Event::Empty(expand_attributes(&start, &entities)?))?;
            }
            Event::Eof => break,
            other => write(&mut writer, other)?,
        }
    }

    String::from_utf8(writer.into_inner())
        .map(Cow::Owned)
        .map_err(|e| Error::malformed(e.to_string()))
}

fn expand_attributes(start: &BytesStart<'_>, entities: &Entities) -> Result<BytesStart<'static>> {
    let mut expanded = start.to_owned();
    expanded.clear_attributes();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::malformed(e.to_string()))?;
        let key = utf8(attr.key.as_ref())?;
        let value = expand_entities(utf8(&attr.value)?, entities)?;
        expanded.push_attribute((key, &*value));
    }
    Ok(expanded)
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Io(io::Error::other(e.to_string())))
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::malformed(format!("invalid UTF-8: {}", e)))
}
