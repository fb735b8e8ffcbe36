//! Attribute post-processing hook.
//!
//! Deployments sometimes need to rename, filter or rewrite the attributes an
//! identity provider sends (stripping a domain prefix from group names, for
//! instance). A mutator runs once per accepted credential.

use crate::types::AttributeMap;

/// Transforms a credential's attributes.
pub trait AttributeMutator: Send + Sync {
    /// Returns the attributes to keep.
    fn mutate(&self, attributes: AttributeMap) -> AttributeMap;
}

impl<F> AttributeMutator for F
where
    F: Fn(AttributeMap) -> AttributeMap + Send + Sync,
{
    fn mutate(&self, attributes: AttributeMap) -> AttributeMap {
        self(attributes)
    }
}

/// Leaves attributes untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMutator;

impl AttributeMutator for NoopMutator {
    fn mutate(&self, attributes: AttributeMap) -> AttributeMap {
        attributes
    }
}
