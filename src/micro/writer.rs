use super::node::{MicroDocument, MicroElement, MicroNode};
use crate::config::Charset;
use quick_xml::escape::escape;

const INDENT: &str = "  ";

/// Serializes a [`MicroDocument`] to indented XML text.
///
/// Elements containing text are written on one line so that text content
/// survives a read/write cycle unchanged. Text and attribute characters the
/// charset cannot encode are written as character references.
pub struct MicroWriter;

impl MicroWriter {
    pub fn write_to_string(document: &MicroDocument, charset: Charset) -> String {
        let mut out = String::new();
        Self::write_into(document, charset, &mut out);
        out
    }

    pub fn write_into(document: &MicroDocument, charset: Charset, out: &mut String) {
        out.push_str(&format!(
            "<?xml version=\"1.0\" encoding=\"{}\" standalone=\"yes\"?>\n",
            charset.name()
        ));
        for comment in document.comments() {
            write_comment(comment, out);
            out.push('\n');
        }
        if let Some(root) = document.root() {
            write_element(root, 0, charset, out);
        }
    }

    /// A single element without declaration.
    pub fn element_to_string(element: &MicroElement) -> String {
        let mut out = String::new();
        write_element(element, 0, Charset::Utf8, &mut out);
        out
    }
}

fn push_escaped(text: &str, charset: Charset, out: &mut String) {
    for c in escape(text).chars() {
        if charset.can_encode(c) {
            out.push(c);
        } else {
            out.push_str(&format!("&#x{:X};", c as u32));
        }
    }
}

fn write_comment(text: &str, out: &mut String) {
    // "--" is not allowed inside comments
    out.push_str("<!--");
    out.push_str(&text.replace("--", "- -"));
    out.push_str("-->");
}

fn write_element(element: &MicroElement, depth: usize, charset: Charset, out: &mut String) {
    let indent = INDENT.repeat(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(element.name());
    for (name, value) in element.attributes() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        push_escaped(value, charset, out);
        out.push('"');
    }

    if !element.has_children() {
        out.push_str(" />\n");
        return;
    }
    out.push('>');

    let inline = element
        .children()
        .iter()
        .any(|node| matches!(node, MicroNode::Text(_)));
    if inline {
        for node in element.children() {
            write_inline(node, charset, out);
        }
    } else {
        out.push('\n');
        for node in element.children() {
            match node {
                MicroNode::Element(child) => write_element(child, depth + 1, charset, out),
                MicroNode::Comment(text) => {
                    out.push_str(&INDENT.repeat(depth + 1));
                    write_comment(text, out);
                    out.push('\n');
                }
                MicroNode::Text(_) => unreachable!("text children are written inline"),
            }
        }
        out.push_str(&indent);
    }

    out.push_str("</");
    out.push_str(element.name());
    out.push_str(">\n");
}

fn write_inline(node: &MicroNode, charset: Charset, out: &mut String) {
    match node {
        MicroNode::Text(text) => push_escaped(text, charset, out),
        MicroNode::Comment(text) => write_comment(text, out),
        MicroNode::Element(child) => {
            let mut nested = String::new();
            write_element(child, 0, charset, &mut nested);
            out.push_str(nested.trim_end_matches('\n'));
        }
    }
}
