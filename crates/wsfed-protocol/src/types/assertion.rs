//! SAML 1.1 assertion types.
//!
//! An [`Assertion`] is untrusted: it is what the token says, before the
//! signature has been checked. It keeps the element it was read from so the
//! verifier can canonicalize exactly the parsed content.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::constants::XMLDSIG_NS;
use crate::xml::XmlElement;

/// SAML 1.1 assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assertion {
    /// Value of the `AssertionID` attribute.
    pub id: String,

    /// Entity that issued the assertion.
    pub issuer: String,

    /// When the assertion was issued.
    pub issue_instant: DateTime<Utc>,

    /// Validity window and audience restrictions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,

    /// Authentication statements, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication_statements: Vec<AuthenticationStatement>,

    /// Attribute statements, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribute_statements: Vec<AttributeStatement>,

    /// The `saml:Assertion` element as parsed.
    #[serde(skip)]
    pub(crate) element: XmlElement,
}

impl Assertion {
    /// Returns the parsed `saml:Assertion` element.
    #[must_use]
    pub const fn element(&self) -> &XmlElement {
        &self.element
    }

    /// Returns the enveloped `ds:Signature` element, if any.
    #[must_use]
    pub fn signature_element(&self) -> Option<&XmlElement> {
        self.element.first_child(XMLDSIG_NS, "Signature")
    }

    /// Returns true if the assertion carries a signature block.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.signature_element().is_some()
    }

    /// Returns the first audience of the first audience restriction.
    #[must_use]
    pub fn audience(&self) -> Option<&str> {
        self.conditions
            .as_ref()?
            .audience_restrictions
            .first()?
            .audiences
            .first()
            .map(String::as_str)
    }

    /// Returns the method of the first authentication statement.
    #[must_use]
    pub fn authentication_method(&self) -> Option<&str> {
        self.authentication_statements
            .first()?
            .authentication_method
            .as_deref()
    }

    /// Returns the first name identifier found in any statement subject.
    #[must_use]
    pub fn name_identifier(&self) -> Option<&str> {
        let from_authn = self
            .authentication_statements
            .iter()
            .filter_map(|s| s.subject.as_ref());
        let from_attrs = self
            .attribute_statements
            .iter()
            .filter_map(|s| s.subject.as_ref());
        from_authn
            .chain(from_attrs)
            .find_map(|s| s.name_identifier.as_deref())
    }
}

/// Conditions on the use of an assertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conditions {
    /// Earliest instant at which the assertion may be used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    /// Instant at which the assertion stops being usable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,

    /// `AudienceRestrictionCondition` elements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audience_restrictions: Vec<AudienceRestriction>,
}

/// Audience restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AudienceRestriction {
    /// Listed audiences.
    pub audiences: Vec<String>,
}

/// Subject of a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Subject {
    /// `NameIdentifier` text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_identifier: Option<String>,

    /// `NameIdentifier@Format`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// `SubjectConfirmation/ConfirmationMethod` values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub confirmation_methods: Vec<String>,
}

/// How the subject authenticated to the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthenticationStatement {
    /// `AuthenticationMethod` URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_method: Option<String>,

    /// `AuthenticationInstant`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_instant: Option<DateTime<Utc>>,

    /// Statement subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
}

/// Attributes asserted about the subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttributeStatement {
    /// Statement subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    /// Attributes, in document order.
    pub attributes: Vec<Attribute>,
}

/// A named attribute with its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// `AttributeName`.
    pub name: String,

    /// `AttributeNamespace`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// `AttributeValue` texts, in document order.
    pub values: Vec<String>,
}
