//! Namespace and identifier URIs used by WS-Federation token responses.

/// WS-Trust 2005/02 namespace, used by AD FS 2.0 passive responses.
pub const WS_TRUST_2005_02_NS: &str = "http://schemas.xmlsoap.org/ws/2005/02/trust";

/// WS-Trust 1.3 namespace.
pub const WS_TRUST_1_3_NS: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512";

/// SAML 1.x assertion namespace.
pub const SAML11_ASSERTION_NS: &str = "urn:oasis:names:tc:SAML:1.0:assertion";

/// XML Digital Signature namespace.
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// Enveloped-signature transform.
pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

/// WS-Trust envelope element names.
pub mod trust {
    /// Single token response.
    pub const RSTR: &str = "RequestSecurityTokenResponse";
    /// Collection of token responses (WS-Trust 1.3).
    pub const RSTR_COLLECTION: &str = "RequestSecurityTokenResponseCollection";
    /// Container of the issued token.
    pub const REQUESTED_SECURITY_TOKEN: &str = "RequestedSecurityToken";

    /// Returns true for a namespace of a supported WS-Trust version.
    #[must_use]
    pub fn is_trust_namespace(namespace: Option<&str>) -> bool {
        matches!(
            namespace,
            Some(super::WS_TRUST_2005_02_NS | super::WS_TRUST_1_3_NS)
        )
    }
}
