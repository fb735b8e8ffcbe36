//! Principal resolution and attribute population.

use serde::Serialize;

use wsfed_protocol::{AttributeMap, AttributeValue};

use crate::credentials::Credentials;
use crate::error::{AuthError, AuthResult};

/// An authenticated user as the host sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    id: String,
    attributes: AttributeMap,
}

impl Principal {
    /// Creates a principal without attributes.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: AttributeMap::new(),
        }
    }

    /// Replaces the attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = attributes;
        self
    }

    /// Principal identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Attributes released with the principal.
    #[must_use]
    pub const fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }
}

/// Picks the principal id out of a federation credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsFederationPrincipalResolver {
    identity_attribute: String,
}

impl WsFederationPrincipalResolver {
    /// Creates a resolver reading `identity_attribute`.
    #[must_use]
    pub fn new(identity_attribute: impl Into<String>) -> Self {
        Self {
            identity_attribute: identity_attribute.into(),
        }
    }

    /// Configured attribute name.
    #[must_use]
    pub fn identity_attribute(&self) -> &str {
        &self.identity_attribute
    }

    /// Returns true for federation credentials.
    #[must_use]
    pub const fn supports(&self, credentials: &Credentials) -> bool {
        credentials.as_ws_federation().is_some()
    }

    /// Returns the principal id.
    ///
    /// # Errors
    ///
    /// Fails for other credential kinds and when the identity attribute is
    /// absent or has more than one value.
    pub fn resolve(&self, credentials: &Credentials) -> AuthResult<String> {
        let credential = credentials
            .as_ws_federation()
            .ok_or(AuthError::UnsupportedCredentials {
                kind: credentials.kind(),
            })?;

        match credential.attribute(&self.identity_attribute) {
            Some(AttributeValue::Single(id)) => {
                tracing::debug!(principal_id = %id, "resolved principal");
                Ok(id.clone())
            }
            Some(AttributeValue::Multiple(values)) => Err(AuthError::AmbiguousIdentity {
                attribute: self.identity_attribute.clone(),
                count: values.len(),
            }),
            None => Err(AuthError::MissingIdentityAttribute {
                attribute: self.identity_attribute.clone(),
            }),
        }
    }
}

/// Copies a federation credential's attributes onto the principal.
///
/// Other credential kinds leave the principal unchanged.
#[must_use]
pub fn populate_attributes(principal: Principal, credentials: &Credentials) -> Principal {
    match credentials.as_ws_federation() {
        Some(credential) => principal.with_attributes(credential.attributes().clone()),
        None => principal,
    }
}
