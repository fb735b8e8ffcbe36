//! Trusted identity credential.
//!
//! A [`Credential`] is built from an assertion whose signature has already
//! been verified. Its `retrieved_on` instant is the local clock reading taken
//! when the credential was built; nothing in the token can influence it.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::assertion::Assertion;
use crate::mutator::AttributeMutator;

/// Attribute names mapped to their values, ordered by name.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// Value of a credential attribute.
///
/// One value is kept as a scalar; several values keep their source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Exactly one value.
    Single(String),
    /// Two or more values.
    Multiple(Vec<String>),
}

impl AttributeValue {
    /// Builds a value from the texts of one attribute.
    ///
    /// Returns `None` when there are no values.
    #[must_use]
    pub fn from_values(mut values: Vec<String>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(Self::Single),
            _ => Some(Self::Multiple(values)),
        }
    }

    /// Returns all values in order.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(v) => vec![v.as_str()],
            Self::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    /// Returns true for a multi-valued attribute.
    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(v) => f.write_str(v),
            Self::Multiple(vs) => write!(f, "[{}]", vs.join(", ")),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

/// Identity established by a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    id: String,
    issuer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authentication_method: Option<String>,
    issued_on: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    not_before: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    not_on_or_after: Option<DateTime<Utc>>,
    retrieved_on: DateTime<Utc>,
    attributes: AttributeMap,
}

impl Credential {
    /// Builds a credential from a verified assertion, stamped now.
    #[must_use]
    pub fn from_assertion(assertion: &Assertion) -> Self {
        CredentialBuilder::from_assertion(assertion).build()
    }

    /// Returns a builder for a credential with the mandatory fields.
    #[must_use]
    pub fn builder(
        id: impl Into<String>,
        issuer: impl Into<String>,
        issued_on: DateTime<Utc>,
    ) -> CredentialBuilder {
        CredentialBuilder::new(id, issuer, issued_on)
    }

    /// Assertion identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Issuing identity provider.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Intended relying party.
    #[must_use]
    pub fn audience(&self) -> Option<&str> {
        self.audience.as_deref()
    }

    /// How the subject authenticated.
    #[must_use]
    pub fn authentication_method(&self) -> Option<&str> {
        self.authentication_method.as_deref()
    }

    /// Issue instant of the assertion.
    #[must_use]
    pub const fn issued_on(&self) -> DateTime<Utc> {
        self.issued_on
    }

    /// Start of the validity window.
    #[must_use]
    pub const fn not_before(&self) -> Option<DateTime<Utc>> {
        self.not_before
    }

    /// End of the validity window.
    #[must_use]
    pub const fn not_on_or_after(&self) -> Option<DateTime<Utc>> {
        self.not_on_or_after
    }

    /// Local time at which the credential was built.
    #[must_use]
    pub const fn retrieved_on(&self) -> DateTime<Utc> {
        self.retrieved_on
    }

    /// Attributes by name.
    #[must_use]
    pub const fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Looks up one attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Replaces the attributes with the output of `mutator`.
    #[must_use]
    pub fn map_attributes<M>(mut self, mutator: &M) -> Self
    where
        M: AttributeMutator + ?Sized,
    {
        self.attributes = mutator.mutate(self.attributes);
        self
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "Issuer: {}", self.issuer)?;
        writeln!(f, "Audience: {}", self.audience.as_deref().unwrap_or("-"))?;
        writeln!(
            f,
            "Authentication Method: {}",
            self.authentication_method.as_deref().unwrap_or("-")
        )?;
        writeln!(f, "Issued On: {}", timestamp(Some(self.issued_on)))?;
        writeln!(f, "Valid After: {}", timestamp(self.not_before))?;
        writeln!(f, "Valid Before: {}", timestamp(self.not_on_or_after))?;
        writeln!(f, "Attributes:")?;
        for (name, value) in &self.attributes {
            writeln!(f, "  {name}: {value}")?;
        }
        Ok(())
    }
}

fn timestamp(instant: Option<DateTime<Utc>>) -> String {
    instant.map_or_else(
        || "-".to_string(),
        |t| t.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

/// Builder for [`Credential`].
///
/// The retrieval instant is supplied when building, never before.
#[derive(Debug, Clone)]
pub struct CredentialBuilder {
    id: String,
    issuer: String,
    issued_on: DateTime<Utc>,
    audience: Option<String>,
    authentication_method: Option<String>,
    not_before: Option<DateTime<Utc>>,
    not_on_or_after: Option<DateTime<Utc>>,
    attributes: AttributeMap,
}

impl CredentialBuilder {
    /// Creates a builder with the mandatory fields.
    #[must_use]
    pub fn new(id: impl Into<String>, issuer: impl Into<String>, issued_on: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            issuer: issuer.into(),
            issued_on,
            audience: None,
            authentication_method: None,
            not_before: None,
            not_on_or_after: None,
            attributes: AttributeMap::new(),
        }
    }

    /// Copies everything a credential needs out of an assertion.
    ///
    /// Only the first audience restriction, the first authentication
    /// statement and the first attribute statement are read. Attributes
    /// without values are dropped.
    #[must_use]
    pub fn from_assertion(assertion: &Assertion) -> Self {
        let conditions = assertion.conditions.as_ref();

        let attributes = assertion
            .attribute_statements
            .first()
            .map(|statement| {
                statement
                    .attributes
                    .iter()
                    .filter_map(|attr| {
                        AttributeValue::from_values(attr.values.clone())
                            .map(|value| (attr.name.clone(), value))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: assertion.id.clone(),
            issuer: assertion.issuer.clone(),
            issued_on: assertion.issue_instant,
            audience: assertion.audience().map(str::to_string),
            authentication_method: assertion.authentication_method().map(str::to_string),
            not_before: conditions.and_then(|c| c.not_before),
            not_on_or_after: conditions.and_then(|c| c.not_on_or_after),
            attributes,
        }
    }

    /// Sets the audience.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Sets the authentication method.
    #[must_use]
    pub fn with_authentication_method(mut self, method: impl Into<String>) -> Self {
        self.authentication_method = Some(method.into());
        self
    }

    /// Sets the start of the validity window.
    #[must_use]
    pub const fn with_not_before(mut self, not_before: DateTime<Utc>) -> Self {
        self.not_before = Some(not_before);
        self
    }

    /// Sets the end of the validity window.
    #[must_use]
    pub const fn with_not_on_or_after(mut self, not_on_or_after: DateTime<Utc>) -> Self {
        self.not_on_or_after = Some(not_on_or_after);
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Builds the credential, stamping it with the current time.
    #[must_use]
    pub fn build(self) -> Credential {
        self.build_at(Utc::now())
    }

    /// Builds the credential with an explicit retrieval instant.
    #[must_use]
    pub fn build_at(self, retrieved_on: DateTime<Utc>) -> Credential {
        Credential {
            id: self.id,
            issuer: self.issuer,
            audience: self.audience,
            authentication_method: self.authentication_method,
            issued_on: self.issued_on,
            not_before: self.not_before,
            not_on_or_after: self.not_on_or_after,
            retrieved_on,
            attributes: self.attributes,
        }
    }
}

/// Builds a credential from a verified assertion, stamped now.
#[must_use]
pub fn build_credential(assertion: &Assertion) -> Credential {
    Credential::from_assertion(assertion)
}
