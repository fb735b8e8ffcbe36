//! XML reading and canonicalization.

pub mod c14n;
pub mod dom;

pub use c14n::{canonicalize, C14nMethod, EXC_C14N, EXC_C14N_WITH_COMMENTS};
pub use dom::{NamespaceScope, XmlAttribute, XmlDocument, XmlElement, XmlNode};
