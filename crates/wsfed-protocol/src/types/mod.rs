//! Token and credential types.

pub mod assertion;
pub mod constants;
pub mod credential;

pub use assertion::{
    Assertion, Attribute, AttributeStatement, AudienceRestriction, AuthenticationStatement,
    Conditions, Subject,
};
pub use constants::*;
pub use credential::{build_credential, AttributeMap, AttributeValue, Credential, CredentialBuilder};
