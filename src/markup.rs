//! Owned element tree for the HTML-like form dialect.
//!
//! The reader is deliberately forgiving about HTML habits (void elements
//! without `/>`, valueless attributes, mixed-case names) and strict about
//! everything else: an element left open at end of input is an error.
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::SchemaError;

/// Elements that never have children, self-closing or not.
const VOID_ELEMENTS: &[&str] = &["input", "meta", "br", "hr", "img", "link"];

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Lowercased tag name.
    pub name: String,
    /// Lowercased attribute names with unescaped values, in document order.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Direct element children, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First direct child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// Concatenated descendant text with whitespace runs collapsed.
    pub fn text(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => {
                    out.push(' ');
                    out.push_str(t);
                }
                Node::Element(e) => e.collect_text(out),
            }
        }
    }
}

/// Read `src` into a tree and return its single root element.
pub fn read_document(src: &str) -> Result<Element, SchemaError> {
    let mut reader = Reader::from_str(src);
    reader.trim_text(true);
    reader.check_end_names(false);

    // stack[0] is a synthetic document node collecting top-level elements
    let mut stack: Vec<Element> = vec![Element::default()];
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf);
        let position = reader.buffer_position();
        match event {
            Ok(Event::Start(ref e)) => {
                let element = open_element(e, position)?;
                if VOID_ELEMENTS.contains(&element.name.as_str()) {
                    push_child(&mut stack, Node::Element(element));
                } else {
                    stack.push(element);
                }
            }
            Ok(Event::Empty(ref e)) => {
                let element = open_element(e, position)?;
                push_child(&mut stack, Node::Element(element));
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                close_element(&mut stack, &name);
            }
            Ok(Event::Text(ref t)) => {
                let text = t
                    .unescape_with(resolve_html_entity)
                    .map_err(|err| markup_error(position, err))?;
                if stack.len() > 1 {
                    push_child(&mut stack, Node::Text(text.into_owned()));
                }
            }
            Ok(Event::CData(ref t)) => {
                if stack.len() > 1 {
                    let text = String::from_utf8_lossy(t).into_owned();
                    push_child(&mut stack, Node::Text(text));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // declarations, doctype, comments, processing instructions
            Err(err) => return Err(markup_error(position, err)),
        }
        buf.clear();
    }

    if stack.len() > 1 {
        let open = stack.last().map(|e| e.name.clone()).unwrap_or_default();
        return Err(SchemaError::Markup {
            position: src.len(),
            message: format!("unclosed <{open}> at end of input"),
        });
    }

    let document = stack.pop().unwrap_or_default();
    let mut roots = document.children.into_iter().filter_map(|n| match n {
        Node::Element(e) => Some(e),
        Node::Text(_) => None,
    });
    match (roots.next(), roots.next()) {
        (Some(root), None) => Ok(root),
        (None, _) => Err(SchemaError::MissingElement("html")),
        (Some(_), Some(extra)) => Err(SchemaError::Markup {
            position: 0,
            message: format!("unexpected second root element <{}>", extra.name),
        }),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn open_element(start: &BytesStart, position: usize) -> Result<Element, SchemaError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_ascii_lowercase();
    let mut attrs = Vec::new();
    for attr in start.html_attributes() {
        let attr = attr.map_err(|err| markup_error(position, err))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let value = attr
            .unescape_value_with(resolve_html_entity)
            .map_err(|err| markup_error(position, err))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(Element { name, attrs, children: Vec::new() })
}

fn push_child(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Pop up to and including the innermost open element named `name`,
/// implicitly closing anything opened inside it. Stray end tags are ignored.
fn close_element(stack: &mut Vec<Element>, name: &str) {
    let Some(index) = stack.iter().rposition(|e| e.name == name) else {
        return;
    };
    if index == 0 {
        return;
    }
    while stack.len() > index {
        let Some(done) = stack.pop() else { break };
        push_child(stack, Node::Element(done));
    }
}

fn resolve_html_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some("\u{a0}"),
        "copy" => Some("\u{a9}"),
        _ => None,
    }
}

fn markup_error(position: usize, err: impl std::fmt::Display) -> SchemaError {
    SchemaError::Markup { position, message: err.to_string() }
}

// ------------------------------- Tests ------------------------------------ //
