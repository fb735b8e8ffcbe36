//! Exclusive XML Canonicalization 1.0.
//!
//! Produces the octets that `<ds:SignedInfo>` and `<ds:Reference>` digests are
//! computed over. Only the exclusive variants are offered; identity providers
//! issuing WS-Federation tokens sign with `xml-exc-c14n#`.
//!
//! Namespace declarations are emitted on the first output element that
//! visibly uses them, so a subtree canonicalizes the same way no matter which
//! envelope it was cut out of.

use std::collections::BTreeSet;

use super::dom::{NamespaceScope, XmlElement, XmlNode};

/// Exclusive canonicalization without comments.
pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
/// Exclusive canonicalization with comments.
pub const EXC_C14N_WITH_COMMENTS: &str = "http://www.w3.org/2001/10/xml-exc-c14n#WithComments";

/// Canonicalization method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum C14nMethod {
    /// Exclusive C14N, comments removed.
    #[default]
    Exclusive,
    /// Exclusive C14N, comments kept.
    ExclusiveWithComments,
}

impl C14nMethod {
    /// Returns the algorithm URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Exclusive => EXC_C14N,
            Self::ExclusiveWithComments => EXC_C14N_WITH_COMMENTS,
        }
    }

    /// Parses a method from its algorithm URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            EXC_C14N => Some(Self::Exclusive),
            EXC_C14N_WITH_COMMENTS => Some(Self::ExclusiveWithComments),
            _ => None,
        }
    }

    const fn keeps_comments(self) -> bool {
        matches!(self, Self::ExclusiveWithComments)
    }
}

/// Canonicalizes `element` and its descendants.
///
/// `inclusive_prefixes` is the `PrefixList` of an `InclusiveNamespaces`
/// parameter (`#default` names the default namespace); those prefixes are
/// rendered wherever they are in scope, used or not. `exclude` removes one
/// descendant subtree, as the enveloped-signature transform requires.
#[must_use]
pub fn canonicalize(
    element: &XmlElement,
    method: C14nMethod,
    inclusive_prefixes: &[String],
    exclude: Option<&XmlElement>,
) -> String {
    let inclusive: BTreeSet<&str> = inclusive_prefixes
        .iter()
        .map(|p| if p == "#default" { "" } else { p.as_str() })
        .collect();

    let mut canonicalizer = Canonicalizer {
        method,
        inclusive,
        exclude,
        out: String::new(),
    };
    canonicalizer.element(element, &NamespaceScope::new());
    canonicalizer.out
}

struct Canonicalizer<'a> {
    method: C14nMethod,
    inclusive: BTreeSet<&'a str>,
    exclude: Option<&'a XmlElement>,
    out: String,
}

impl Canonicalizer<'_> {
    fn element(&mut self, element: &XmlElement, rendered: &NamespaceScope) {
        let mut rendered = rendered.clone();
        let name = element.qualified_name();

        self.out.push('<');
        self.out.push_str(&name);

        for (prefix, uri) in namespaces_to_render(element, &self.inclusive, &rendered) {
            if prefix.is_empty() {
                self.out.push_str(" xmlns=\"");
            } else {
                self.out.push_str(" xmlns:");
                self.out.push_str(&prefix);
                self.out.push_str("=\"");
            }
            escape_attribute(&mut self.out, &uri);
            self.out.push('"');
            rendered.insert(prefix, uri);
        }

        let mut attributes: Vec<_> = element.attributes().iter().collect();
        attributes.sort_by(|a, b| {
            let a_ns = a.namespace.as_deref().unwrap_or("");
            let b_ns = b.namespace.as_deref().unwrap_or("");
            a_ns.cmp(b_ns).then_with(|| a.local_name.cmp(&b.local_name))
        });
        for attr in attributes {
            self.out.push(' ');
            self.out.push_str(&attr.qualified_name());
            self.out.push_str("=\"");
            escape_attribute(&mut self.out, &attr.value);
            self.out.push('"');
        }
        self.out.push('>');

        for child in element.children() {
            match child {
                XmlNode::Element(e) => {
                    if self.exclude.is_some_and(|ex| std::ptr::eq(ex, e)) {
                        continue;
                    }
                    self.element(e, &rendered);
                }
                XmlNode::Text(text) => escape_text(&mut self.out, text),
                XmlNode::Comment(body) => {
                    if self.method.keeps_comments() {
                        self.out.push_str("<!--");
                        self.out.push_str(body);
                        self.out.push_str("-->");
                    }
                }
                XmlNode::ProcessingInstruction { target, data } => {
                    self.out.push_str("<?");
                    self.out.push_str(target);
                    if !data.is_empty() {
                        self.out.push(' ');
                        self.out.push_str(data);
                    }
                    self.out.push_str("?>");
                }
            }
        }

        self.out.push_str("</");
        self.out.push_str(&name);
        self.out.push('>');
    }
}

/// Declarations to emit on `element`, sorted by prefix with the default first.
fn namespaces_to_render(
    element: &XmlElement,
    inclusive: &BTreeSet<&str>,
    rendered: &NamespaceScope,
) -> Vec<(String, String)> {
    let mut candidates: BTreeSet<&str> = BTreeSet::new();
    candidates.insert(element.prefix().unwrap_or(""));
    for attr in element.attributes() {
        if let Some(prefix) = attr.prefix.as_deref() {
            candidates.insert(prefix);
        }
    }
    for prefix in inclusive {
        if element.scope().contains_key(*prefix) {
            candidates.insert(*prefix);
        }
    }

    candidates
        .into_iter()
        .filter(|prefix| *prefix != "xml")
        .filter_map(|prefix| {
            let uri = element.scope().get(prefix).map_or("", String::as_str);
            let already = rendered.get(prefix).map_or("", String::as_str);
            let differs = if prefix.is_empty() {
                uri != already
            } else {
                rendered.get(prefix).map(String::as_str) != Some(uri)
            };
            differs.then(|| (prefix.to_string(), uri.to_string()))
        })
        .collect()
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
}
