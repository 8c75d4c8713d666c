//! Converts between the virtual document and HTML markup.

use std::{borrow::Cow, io};

use quick_xml::{
    Reader, Writer,
    escape::unescape,
    events::{BytesEnd, BytesStart, BytesText, Event},
};

use crate::render::node::{Element, Node};

/// HTML void elements are written self-closed and never carry children.
const VOID: &[&str] = &["br", "hr", "img", "input", "link", "meta", "source"];

pub fn to_html(element: &Element) -> io::Result<String> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, element)?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Serialise a list of sibling nodes, e.g. the rendered children of a container.
pub fn nodes_to_html(nodes: &[Node]) -> io::Result<String> {
    let mut writer = Writer::new(Vec::new());
    for node in nodes {
        write_node(&mut writer, node)?;
    }
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> io::Result<()> {
    match node {
        Node::Element(e) => write_element(writer, e),
        Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t))),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> io::Result<()> {
    let mut start = BytesStart::new(element.tag.as_str());
    for (name, value) in element.attrs() {
        start.push_attribute((name, value));
    }
    if VOID.contains(&element.tag.as_str()) {
        return writer.write_event(Event::Empty(start));
    }
    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))
}

/// Parse the markup that follows an opening `<{close}>` tag into nodes, up to its matching
/// close tag. Unclosed elements are closed at the end of input; stray end tags are ignored.
pub fn parse_children(markup: &str, close: &str) -> Vec<Node> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut root = Vec::new();
    let mut open: Vec<Element> = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let el = start_element(&start);
                if VOID.contains(&el.tag.as_str()) {
                    attach(&mut open, &mut root, Node::Element(el));
                } else {
                    open.push(el);
                }
            }
            Ok(Event::Empty(start)) => {
                attach(&mut open, &mut root, Node::Element(start_element(&start)))
            }
            Ok(Event::Text(text)) => attach_text(&mut open, &mut root, &unescape_lossy(&text)),
            Ok(Event::CData(data)) => {
                attach_text(&mut open, &mut root, &String::from_utf8_lossy(&data))
            }
            Ok(Event::GeneralRef(name)) => {
                let name = String::from_utf8_lossy(&name);
                let text = match name.as_ref() {
                    "nbsp" => "\u{a0}".to_string(),
                    other => unescape_lossy(format!("&{other};").as_bytes()),
                };
                attach_text(&mut open, &mut root, &text);
            }
            Ok(Event::End(end)) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).to_ascii_lowercase();
                match open.iter().rposition(|e| e.tag == name) {
                    Some(at) => {
                        while open.len() > at {
                            if let Some(el) = open.pop() {
                                attach(&mut open, &mut root, Node::Element(el));
                            }
                        }
                    }
                    None if name == close => break,
                    None => {}
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
    }
    while let Some(el) = open.pop() {
        attach(&mut open, &mut root, Node::Element(el));
    }
    root
}

fn start_element(start: &BytesStart) -> Element {
    let tag = String::from_utf8_lossy(start.name().as_ref()).to_ascii_lowercase();
    start
        .html_attributes()
        .flatten()
        .fold(Element::new(&tag), |el, attr| {
            let name = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
            let value = unescape_lossy(&attr.value);
            el.with_attr(&name, value)
        })
}

fn unescape_lossy(raw: &[u8]) -> String {
    let raw = String::from_utf8_lossy(raw);
    let unescaped = match unescape(&raw) {
        Ok(Cow::Owned(s)) => Some(s),
        // Nothing to unescape, or an unknown named entity that is kept verbatim.
        Ok(Cow::Borrowed(_)) | Err(_) => None,
    };
    unescaped.unwrap_or_else(|| raw.into_owned())
}

fn attach(open: &mut [Element], root: &mut Vec<Node>, node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.push(node),
    }
}

/// Append text, merging with a preceding text node.
fn attach_text(open: &mut [Element], root: &mut Vec<Node>, text: &str) {
    let siblings = match open.last_mut() {
        Some(parent) => &mut parent.children,
        None => root,
    };
    match siblings.last_mut() {
        Some(Node::Text(prev)) => prev.push_str(text),
        _ => siblings.push(Node::Text(text.to_string())),
    }
}
