use super::node::{MicroDocument, MicroElement};
use crate::core::{DaoError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parses XML text into a [`MicroDocument`].
///
/// Whitespace-only text is dropped from elements that also hold child
/// elements or comments (indentation). Elements holding only text keep it.
pub struct MicroReader;

impl MicroReader {
    pub fn read_bytes(bytes: &[u8]) -> Result<MicroDocument> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| DaoError::Xml(format!("Document is not valid UTF-8: {}", e)))?;
        Self::read_str(text)
    }

    pub fn read_str(text: &str) -> Result<MicroDocument> {
        let mut reader = Reader::from_str(text);
        let mut document = MicroDocument::new();
        let mut stack: Vec<MicroElement> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut document, &mut stack, element)?;
                }
                Event::End(end) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| DaoError::Xml("Unexpected closing tag".to_string()))?;
                    let end_qname = end.name();
                    let end_name = utf8(end_qname.as_ref())?;
                    if end_name != element.name() {
                        return Err(DaoError::Xml(format!(
                            "Closing tag '{}' does not match '{}'",
                            end_name,
                            element.name()
                        )));
                    }
                    element.drop_indentation();
                    attach(&mut document, &mut stack, element)?;
                }
                Event::Text(text) => {
                    let value = text.unescape()?;
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.append_text(value.into_owned());
                        }
                        None if value.trim().is_empty() => {}
                        None => {
                            return Err(DaoError::Xml(format!(
                                "Text outside of the document element: '{}'",
                                value.trim()
                            )));
                        }
                    }
                }
                Event::CData(data) => {
                    let value = utf8(&data)?.to_string();
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.append_text(value);
                        }
                        None => return Err(DaoError::Xml("CDATA outside of the document element".to_string())),
                    }
                }
                Event::Comment(comment) => {
                    let value = utf8(&comment)?.to_string();
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.append_comment(value);
                        }
                        None if document.root().is_none() => document.insert_comment_before_root(value),
                        None => {}
                    }
                }
                Event::Eof => break,
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(DaoError::Xml(format!("Unclosed element '{}'", open.name())));
        }
        if document.root().is_none() {
            return Err(DaoError::Xml("Document has no root element".to_string()));
        }
        Ok(document)
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| DaoError::Xml(format!("Invalid UTF-8: {}", e)))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<MicroElement> {
    let mut element = MicroElement::new(utf8(start.name().as_ref())?);
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = utf8(attribute.key.as_ref())?.to_string();
        let value = attribute.unescape_value()?;
        element.set_attribute(&key, value.into_owned());
    }
    Ok(element)
}

fn attach(document: &mut MicroDocument, stack: &mut [MicroElement], element: MicroElement) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.append_child(element);
            Ok(())
        }
        None if document.root().is_none() => {
            document.set_root(element);
            Ok(())
        }
        None => Err(DaoError::Xml("Document has more than one root element".to_string())),
    }
}
