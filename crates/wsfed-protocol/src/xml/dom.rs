//! Owned XML element tree with resolved namespaces.
//!
//! Token responses are small, so the whole document is read into memory
//! before anything is interpreted. Keeping the tree around lets the verifier
//! canonicalize exactly the nodes the parser extracted data from.

use std::collections::{BTreeMap, HashSet};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::TokenParseError;

/// Namespace bound to the `xml` prefix.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Attribute names treated as element identifiers.
const ID_ATTRIBUTES: [&str; 3] = ["ID", "Id", "AssertionID"];

/// Deepest element nesting accepted.
const MAX_DEPTH: usize = 128;

/// Prefix to namespace URI bindings in scope at an element.
///
/// The default namespace is stored under the empty prefix. An empty URI
/// records an `xmlns=""` undeclaration.
pub type NamespaceScope = BTreeMap<String, String>;

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

/// An element with its attributes, declarations and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    prefix: Option<String>,
    local_name: String,
    namespace: Option<String>,
    attributes: Vec<XmlAttribute>,
    scope: NamespaceScope,
    children: Vec<XmlNode>,
}

/// An attribute other than a namespace declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Prefix as written, if any.
    pub prefix: Option<String>,
    /// Local part of the name.
    pub local_name: String,
    /// Namespace URI; unprefixed attributes have none.
    pub namespace: Option<String>,
    /// Normalized value with references expanded.
    pub value: String,
}

impl XmlAttribute {
    /// Returns the name as written in the document.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualify(self.prefix.as_deref(), &self.local_name)
    }
}

/// Content of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Child element.
    Element(XmlElement),
    /// Character data, CDATA sections included.
    Text(String),
    /// Comment body.
    Comment(String),
    /// Processing instruction.
    ProcessingInstruction {
        /// Instruction target.
        target: String,
        /// Everything after the target, leading whitespace removed.
        data: String,
    },
}

impl XmlDocument {
    /// Parses a document.
    ///
    /// # Errors
    ///
    /// Returns [`TokenParseError::Malformed`] for input that is not a
    /// well-formed namespace-aware document, carries a DOCTYPE, or reuses an
    /// identifier value, and [`TokenParseError::Encoding`] for undefined or
    /// invalid character references.
    pub fn parse(input: &str) -> Result<Self, TokenParseError> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| TokenParseError::Malformed(format!("at byte {}: {e}", reader.buffer_position())))?;

            match event {
                Event::Start(start) => {
                    if root.is_some() {
                        return Err(malformed("content after the document element"));
                    }
                    if stack.len() >= MAX_DEPTH {
                        return Err(malformed("elements nested too deeply"));
                    }
                    let scope = stack.last().map_or_else(NamespaceScope::new, |p| p.scope.clone());
                    stack.push(XmlElement::open(&start, scope)?);
                }
                Event::Empty(start) => {
                    if root.is_some() {
                        return Err(malformed("content after the document element"));
                    }
                    let scope = stack.last().map_or_else(NamespaceScope::new, |p| p.scope.clone());
                    let element = XmlElement::open(&start, scope)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| malformed("unexpected end tag"))?;
                    attach(&mut stack, &mut root, element);
                }
                Event::Text(text) => {
                    let raw = utf8(&text)?;
                    let value = unescape(&normalize_line_endings(raw))?;
                    match stack.last_mut() {
                        Some(parent) => parent.push_text(&value),
                        None if value.chars().all(is_xml_whitespace) => {}
                        None => return Err(malformed("text outside the document element")),
                    }
                }
                Event::CData(cdata) => {
                    let value = normalize_line_endings(utf8(&cdata)?);
                    match stack.last_mut() {
                        Some(parent) => parent.push_text(&value),
                        None => return Err(malformed("CDATA outside the document element")),
                    }
                }
                Event::Comment(comment) => {
                    if let Some(parent) = stack.last_mut() {
                        let body = normalize_line_endings(utf8(&comment)?);
                        parent.children.push(XmlNode::Comment(body));
                    }
                }
                Event::PI(pi) => {
                    if let Some(parent) = stack.last_mut() {
                        let raw = normalize_line_endings(utf8(&pi)?);
                        let (target, data) = match raw.find(is_xml_whitespace) {
                            Some(at) => (raw[..at].to_string(), raw[at..].trim_start().to_string()),
                            None => (raw.clone(), String::new()),
                        };
                        parent
                            .children
                            .push(XmlNode::ProcessingInstruction { target, data });
                    }
                }
                Event::DocType(_) => return Err(malformed("DOCTYPE declarations are not accepted")),
                Event::Decl(_) => {}
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(malformed("unexpected end of input"));
        }
        let root = root.ok_or_else(|| malformed("no document element"))?;

        let mut seen = HashSet::new();
        root.check_unique_ids(&mut seen)?;

        Ok(Self { root })
    }

    /// Returns the document element.
    #[must_use]
    pub const fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Consumes the document, returning its root element.
    #[must_use]
    pub fn into_root(self) -> XmlElement {
        self.root
    }
}

impl XmlElement {
    fn open(start: &BytesStart<'_>, mut scope: NamespaceScope) -> Result<Self, TokenParseError> {
        let (prefix, local_name) = split_qname(utf8(start.name().as_ref())?)?;

        let mut raw_attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| TokenParseError::Malformed(e.to_string()))?;
            let name = utf8(attr.key.as_ref())?.to_string();
            let value = attribute_value(utf8(&attr.value)?)?;

            if name == "xmlns" {
                scope.insert(String::new(), value);
            } else if let Some(declared) = name.strip_prefix("xmlns:") {
                if value.is_empty() {
                    return Err(malformed(&format!("prefix `{declared}` cannot be undeclared")));
                }
                scope.insert(declared.to_string(), value);
            } else {
                raw_attributes.push((name, value));
            }
        }

        let namespace = resolve(&scope, prefix.as_deref())?;

        let mut attributes: Vec<XmlAttribute> = Vec::with_capacity(raw_attributes.len());
        for (name, value) in raw_attributes {
            let (attr_prefix, attr_local) = split_qname(&name)?;
            let attr_namespace = match attr_prefix.as_deref() {
                Some(p) => resolve(&scope, Some(p))?,
                None => None,
            };
            if attributes
                .iter()
                .any(|a| a.local_name == attr_local && a.namespace == attr_namespace)
            {
                return Err(malformed(&format!("duplicate attribute `{name}`")));
            }
            attributes.push(XmlAttribute {
                prefix: attr_prefix,
                local_name: attr_local,
                namespace: attr_namespace,
                value,
            });
        }

        Ok(Self {
            prefix,
            local_name,
            namespace,
            attributes,
            scope,
            children: Vec::new(),
        })
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(XmlNode::Text(existing)) = self.children.last_mut() {
            existing.push_str(text);
        } else {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }

    fn check_unique_ids<'a>(&'a self, seen: &mut HashSet<&'a str>) -> Result<(), TokenParseError> {
        for attr in &self.attributes {
            if attr.namespace.is_none()
                && ID_ATTRIBUTES.contains(&attr.local_name.as_str())
                && !seen.insert(attr.value.as_str())
            {
                return Err(malformed(&format!("duplicate identifier `{}`", attr.value)));
            }
        }
        for child in self.child_elements() {
            child.check_unique_ids(seen)?;
        }
        Ok(())
    }

    /// Returns the prefix as written, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns the local part of the element name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Returns the element name as written in the document.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualify(self.prefix.as_deref(), &self.local_name)
    }

    /// Returns the resolved namespace URI.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns true if the element has this namespace and local name.
    #[must_use]
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(namespace)
    }

    /// Returns the namespace bindings in scope at this element.
    #[must_use]
    pub const fn scope(&self) -> &NamespaceScope {
        &self.scope
    }

    /// Returns the attributes, in document order.
    #[must_use]
    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// Returns the value of an unqualified attribute.
    #[must_use]
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    /// Returns the content nodes.
    #[must_use]
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Iterates over child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Iterates over child elements with this name.
    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> {
        self.child_elements()
            .filter(move |e| e.is(namespace, local_name))
    }

    /// Returns the first child element with this name.
    #[must_use]
    pub fn first_child(&self, namespace: &str, local_name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.is(namespace, local_name))
    }

    /// Returns the concatenated character data of direct text children.
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => *root = Some(element),
    }
}

fn resolve(scope: &NamespaceScope, prefix: Option<&str>) -> Result<Option<String>, TokenParseError> {
    match prefix {
        Some("xml") => Ok(Some(XML_NS.to_string())),
        Some(p) => scope
            .get(p)
            .map(|uri| Some(uri.clone()))
            .ok_or_else(|| malformed(&format!("unbound namespace prefix `{p}`"))),
        None => Ok(scope.get("").filter(|uri| !uri.is_empty()).cloned()),
    }
}

fn split_qname(name: &str) -> Result<(Option<String>, String), TokenParseError> {
    match name.split_once(':') {
        None if !name.is_empty() => Ok((None, name.to_string())),
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() && !local.contains(':') => {
            Ok((Some(prefix.to_string()), local.to_string()))
        }
        _ => Err(malformed(&format!("invalid name `{name}`"))),
    }
}

fn qualify(prefix: Option<&str>, local_name: &str) -> String {
    match prefix {
        Some(p) => format!("{p}:{local_name}"),
        None => local_name.to_string(),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, TokenParseError> {
    std::str::from_utf8(bytes).map_err(|e| TokenParseError::Encoding(e.to_string()))
}

fn unescape(raw: &str) -> Result<String, TokenParseError> {
    quick_xml::escape::unescape(raw)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| TokenParseError::Encoding(e.to_string()))
}

/// Applies attribute-value normalization for CDATA-typed attributes.
fn attribute_value(raw: &str) -> Result<String, TokenParseError> {
    let spaced: String = normalize_line_endings(raw)
        .chars()
        .map(|c| if matches!(c, '\t' | '\n') { ' ' } else { c })
        .collect();
    unescape(&spaced)
}

fn normalize_line_endings(raw: &str) -> String {
    if !raw.contains('\r') {
        return raw.to_string();
    }
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

const fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn malformed(reason: &str) -> TokenParseError {
    TokenParseError::Malformed(reason.to_string())
}
