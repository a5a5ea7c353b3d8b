//! Streaming driver: turns quick-xml events into handler callbacks

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use quick_xml::encoding::Decoder;
use quick_xml::escape::unescape_with;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use xml_search_traits::error::{Error, Result};
use xml_search_traits::prolog::{internal_entities, resolve_entity, Entities};

/// Receiver of start-tag, end-tag and character events in document order.
///
/// Names arrive exactly as written (`prefix:local`); no namespace
/// processing happens on this path.
pub trait EventHandler {
    fn start_element(&mut self, name: &str, attributes: &BTreeMap<String, String>);

    fn end_element(&mut self, _name: &str) {}

    fn characters(&mut self, _content: &str) {}
}

/// Stream `file` through `handler`, holding only the current event in memory.
///
/// The reader picks up the encoding from a byte order mark or the XML
/// declaration. Entities declared in an internal DOCTYPE subset are
/// expanded as text.
pub fn drive<H: EventHandler>(file: &Path, handler: &mut H) -> Result<()> {
    let input = BufReader::new(File::open(file)?);
    let mut reader = Reader::from_reader(input);
    reader.config_mut().expand_empty_elements = true;

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut entities = Entities::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(start)) => {
                if seen_root && depth == 0 {
                    return Err(malformed_at(
                        reader.buffer_position(),
                        "junk after document element",
                    ));
                }
                seen_root = true;
                depth += 1;

                let decoder = reader.decoder();
                let qname = start.name();
                let name = decode(decoder, qname.as_ref())?;
                check_name(&name).map_err(|e| malformed_at(reader.buffer_position(), e))?;
                let attributes = collect_attributes(&start, decoder, &entities)
                    .map_err(|e| malformed_at(reader.buffer_position(), e))?;
                handler.start_element(&name, &attributes);
            }
            Ok(Event::End(end)) => {
                depth = depth.saturating_sub(1);
                let qname = end.name();
                let name = decode(reader.decoder(), qname.as_ref())?;
                handler.end_element(&name);
            }
            Ok(Event::Text(text)) => {
                let raw = decode(reader.decoder(), &text)?;
                let content = unescape_with(&raw, |name| resolve_entity(&entities, name))
                    .map_err(|e| malformed_at(reader.buffer_position(), e))?;
                if depth > 0 {
                    handler.characters(&content);
                } else if !content.trim().is_empty() {
                    return Err(malformed_at(
                        reader.buffer_position(),
                        "text outside of the document element",
                    ));
                }
            }
            Ok(Event::CData(cdata)) => {
                if depth == 0 {
                    return Err(malformed_at(
                        reader.buffer_position(),
                        "CDATA outside of the document element",
                    ));
                }
                handler.characters(&decode(reader.decoder(), &cdata)?);
            }
            Ok(Event::Decl(decl)) => {
                // an unknown label would otherwise leave the reader on UTF-8
                if let Some(label) = decl.encoding() {
                    let label = label.map_err(|e| malformed_at(reader.buffer_position(), e))?;
                    if decl.encoder().is_none() {
                        return Err(malformed_at(
                            reader.buffer_position(),
                            format!("unknown encoding: {}", String::from_utf8_lossy(&label)),
                        ));
                    }
                }
            }
            Ok(Event::DocType(doctype)) => {
                if seen_root {
                    return Err(malformed_at(
                        reader.buffer_position(),
                        "DOCTYPE after the document element",
                    ));
                }
                entities = internal_entities(&decode(reader.decoder(), &doctype)?);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed_at(reader.buffer_position(), e)),
        }
        buf.clear();
    }

    if depth > 0 {
        return Err(Error::malformed(format!(
            "{} element(s) left unclosed at end of document",
            depth
        )));
    }
    if !seen_root {
        return Err(Error::malformed("no element found"));
    }
    tracing::trace!(
        bytes = reader.buffer_position(),
        entities = entities.len(),
        "event stream finished"
    );
    Ok(())
}

fn collect_attributes(
    start: &BytesStart<'_>,
    decoder: Decoder,
    entities: &Entities,
) -> std::result::Result<BTreeMap<String, String>, String> {
    let mut attributes = BTreeMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = decoder.decode(attr.key.as_ref()).map_err(|e| e.to_string())?;
        check_name(&key)?;
        let raw = decoder.decode(&attr.value).map_err(|e| e.to_string())?;
        let value = unescape_with(&raw, |name| resolve_entity(entities, name))
            .map_err(|e| e.to_string())?;
        attributes.insert(key.into_owned(), value.into_owned());
    }
    Ok(attributes)
}

fn decode<'b>(decoder: Decoder, bytes: &'b [u8]) -> Result<Cow<'b, str>> {
    decoder
        .decode(bytes)
        .map_err(|e| Error::malformed(format!("invalid text encoding: {}", e)))
}

/// quick-xml accepts any bytes as a name; XML does not
fn check_name(name: &str) -> std::result::Result<(), String> {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => {}
        Some(first) => return Err(format!("invalid name start character {:?} in {:?}", first, name)),
        None => return Err("empty name".to_string()),
    }
    match chars.find(|c| !is_name_char(*c)) {
        Some(bad) => Err(format!("invalid name character {:?} in {:?}", bad, name)),
        None => Ok(()),
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}'
    )
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

fn malformed_at<P: std::fmt::Display, E: std::fmt::Display>(position: P, err: E) -> Error {
    Error::malformed(format!("{} (at byte {})", err, position))
}
