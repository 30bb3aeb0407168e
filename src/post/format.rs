//! Stable pretty-printer for parsed HTML documents.
//!
//! Every node goes on its own line, indented by depth. Whitespace-only text
//! is dropped and other text is trimmed, so formatting the output of this
//! module again gives the same text back.

use kuchikiki::{ElementData, NodeData, NodeRef};
use maud::html;

const INDENT: &str = "  ";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

// Content of these is raw text (scripting enabled) and must not be escaped.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "template",
    "xmp",
];

// Whitespace sensitive; the parser drops one newline right after the open tag.
const PREFORMATTED_ELEMENTS: &[&str] = &["listing", "pre", "textarea"];

pub(crate) fn format_document(document: &NodeRef) -> String {
    let mut out = String::new();
    write_node(&mut out, document, 0);
    out
}

fn write_line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

fn escape(value: &str) -> String {
    html! { (value) }.into_string()
}

fn is_html_whitespace(c: char) -> bool {
    c.is_ascii_whitespace()
}

fn write_node(out: &mut String, node: &NodeRef, depth: usize) {
    match node.data() {
        NodeData::Document(_) | NodeData::DocumentFragment => {
            for child in node.children() {
                write_node(out, &child, depth);
            }
        }
        NodeData::Doctype(doctype) => {
            let mut line = format!("<!DOCTYPE {}", doctype.name);
            match (doctype.public_id.is_empty(), doctype.system_id.is_empty()) {
                (false, false) => line.push_str(&format!(
                    " PUBLIC \"{}\" \"{}\"",
                    doctype.public_id, doctype.system_id
                )),
                (false, true) => line.push_str(&format!(" PUBLIC \"{}\"", doctype.public_id)),
                (true, false) => line.push_str(&format!(" SYSTEM \"{}\"", doctype.system_id)),
                (true, true) => {}
            }
            line.push('>');
            write_line(out, depth, &line);
        }
        NodeData::Comment(text) => {
            write_line(out, depth, &format!("<!--{}-->", text.borrow()));
        }
        NodeData::Text(text) => {
            let text = text.borrow();
            let trimmed = text.trim_matches(is_html_whitespace);
            if !trimmed.is_empty() {
                write_line(out, depth, &escape(trimmed));
            }
        }
        NodeData::Element(element) => write_element(out, node, element, depth),
        // never produced by the HTML parser
        NodeData::ProcessingInstruction(_) => {}
    }
}

fn open_tag(name: &str, element: &ElementData) -> String {
    let mut open = format!("<{name}");
    for (attr_name, attr) in element.attributes.borrow().map.iter() {
        open.push(' ');
        if let Some(prefix) = &attr.prefix {
            open.push_str(prefix);
            open.push(':');
        }
        open.push_str(&attr_name.local);
        open.push_str("=\"");
        open.push_str(&escape(&attr.value));
        open.push('"');
    }
    open.push('>');
    open
}

fn starts_with_newline(node: &NodeRef) -> bool {
    node.first_child()
        .and_then(|child| child.as_text().map(|text| text.borrow().starts_with('\n')))
        .unwrap_or(false)
}

fn write_element(out: &mut String, node: &NodeRef, element: &ElementData, depth: usize) {
    let name: &str = &element.name.local;

    if RAW_TEXT_ELEMENTS.contains(&name) {
        write_line(out, depth, &node.to_string());
        return;
    }

    let open = open_tag(name, element);

    if PREFORMATTED_ELEMENTS.contains(&name) {
        let mut line = open;
        if starts_with_newline(node) {
            line.push('\n');
        }
        for child in node.children() {
            line.push_str(&child.to_string());
        }
        line.push_str(&format!("</{name}>"));
        write_line(out, depth, &line);
        return;
    }

    write_line(out, depth, &open);

    if VOID_ELEMENTS.contains(&name) {
        return;
    }
    for child in node.children() {
        write_node(out, &child, depth + 1);
    }
    write_line(out, depth, &format!("</{name}>"));
}
