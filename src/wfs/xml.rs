//! Minimal typed XML tree and serializer.
//!
//! Only what a WFS transaction needs: elements with attributes, element and
//! text children, and a document wrapper emitting the XML declaration. Text
//! and attribute values are always escaped; names are validated on write.

use std::fmt::Write as _;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum XmlError {
    #[error("Invalid XML name: {0:?}")]
    InvalidName(String),

    #[error("Character {0:?} is not allowed in XML 1.0")]
    InvalidChar(char),
}

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children
            .extend(children.into_iter().map(Node::Element));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Element holding a single text node, e.g. `<wfs:Name>area</wfs:Name>`.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).text(text)
    }

    fn write(&self, out: &mut String) -> Result<(), XmlError> {
        check_name(&self.name)?;
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            check_name(name)?;
            let _ = write!(out, " {}=\"{}\"", name, escape(value)?);
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return Ok(());
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(e) => e.write(out)?,
                Node::Text(t) => out.push_str(&escape(t)?),
            }
        }
        let _ = write!(out, "</{}>", self.name);
        Ok(())
    }

    /// Serialize this element without an XML declaration.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut out = String::new();
        self.write(&mut out)?;
        Ok(out)
    }
}

/// A complete document: declaration plus root element.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        self.root.write(&mut out)?;
        Ok(out)
    }
}

/// Escape the five predefined XML entities.
///
/// Characters outside the XML 1.0 `Char` production (C0 controls other than
/// tab, LF and CR, plus U+FFFE and U+FFFF) cannot be escaped and are rejected.
pub fn escape(raw: &str) -> Result<String, XmlError> {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c < '\u{20}' || c == '\u{FFFE}' || c == '\u{FFFF}' => {
                return Err(XmlError::InvalidChar(c))
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

/// Accepts `prefix:local` or `local` with ASCII name characters.
fn check_name(name: &str) -> Result<(), XmlError> {
    let valid_start = |c: char| c.is_ascii_alphabetic() || c == '_';
    let valid_rest = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');

    let mut parts = name.split(':');
    let ok = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), None, None) => is_ncname(local, valid_start, valid_rest),
        (Some(prefix), Some(local), None) => {
            is_ncname(prefix, valid_start, valid_rest) && is_ncname(local, valid_start, valid_rest)
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(XmlError::InvalidName(name.to_string()))
    }
}

fn is_ncname(s: &str, start: impl Fn(char) -> bool, rest: impl Fn(char) -> bool) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if start(c) => chars.all(rest),
        _ => false,
    }
}
