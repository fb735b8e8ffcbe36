//! XML Signature verification for SAML 1.1 assertions.
//!
//! Identity providers put an enveloped `ds:Signature` inside the assertion.
//! Only that shape is accepted:
//!
//! - exactly one `ds:Reference`, pointing at the enclosing assertion
//! - enveloped-signature and exclusive canonicalization transforms only
//! - RSA PKCS#1 v1.5 with SHA-256, SHA-384 or SHA-512
//! - SHA-1 only when the security policy allows it
//!
//! `ds:KeyInfo` is never consulted. Keys come from the configured wallet.

mod validator;

pub use validator::{verify_signature, SignatureVerifier};

use base64::Engine;

use wsfed_crypto::{DigestAlgorithm, SignatureAlgorithm};

use crate::error::SignatureError;
use crate::types::constants::{ENVELOPED_SIGNATURE, XMLDSIG_NS};
use crate::xml::{C14nMethod, XmlElement};

/// Namespace of the `InclusiveNamespaces` parameter element.
const EXC_C14N_NS: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

/// The parts of a `ds:Signature` element needed to check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBlock<'a> {
    /// The `ds:SignedInfo` element.
    pub signed_info: &'a XmlElement,
    /// Canonicalization applied to `SignedInfo`.
    pub canonicalization: C14nMethod,
    /// `InclusiveNamespaces` prefixes for `SignedInfo`.
    pub canonicalization_prefixes: Vec<String>,
    /// Signature algorithm.
    pub algorithm: SignatureAlgorithm,
    /// `Reference@URI`.
    pub reference_uri: String,
    /// Canonicalization the reference transform declares. Comments are dropped
    /// for `#id` references either way.
    pub reference_canonicalization: C14nMethod,
    /// `InclusiveNamespaces` prefixes for the referenced element.
    pub reference_prefixes: Vec<String>,
    /// Reference digest algorithm.
    pub digest_algorithm: DigestAlgorithm,
    /// Decoded `DigestValue`.
    pub digest_value: Vec<u8>,
    /// Decoded `SignatureValue`.
    pub signature_value: Vec<u8>,
}

impl<'a> SignatureBlock<'a> {
    /// Reads a `ds:Signature` element.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Malformed`] for missing parts and
    /// [`SignatureError::UnsupportedAlgorithm`] for anything outside the
    /// accepted algorithm and transform set.
    pub fn parse(signature: &'a XmlElement) -> Result<Self, SignatureError> {
        let signed_info = ds_child(signature, "SignedInfo")?;

        let c14n_element = ds_child(signed_info, "CanonicalizationMethod")?;
        let canonicalization = c14n_method(c14n_element)?;
        let canonicalization_prefixes = inclusive_prefixes(c14n_element);

        let method_uri = algorithm_uri(ds_child(signed_info, "SignatureMethod")?)?;
        let algorithm = SignatureAlgorithm::from_uri(method_uri)
            .ok_or_else(|| SignatureError::UnsupportedAlgorithm(method_uri.to_string()))?;

        let mut references = signed_info.children_named(XMLDSIG_NS, "Reference");
        let reference = references
            .next()
            .ok_or_else(|| malformed("SignedInfo has no Reference"))?;
        if references.next().is_some() {
            return Err(malformed("SignedInfo has more than one Reference"));
        }

        let reference_uri = reference
            .attribute("URI")
            .ok_or_else(|| malformed("Reference has no URI"))?
            .to_string();

        let (reference_canonicalization, reference_prefixes) = reference_transforms(reference)?;

        let digest_uri = algorithm_uri(ds_child(reference, "DigestMethod")?)?;
        let digest_algorithm = DigestAlgorithm::from_uri(digest_uri)
            .ok_or_else(|| SignatureError::UnsupportedAlgorithm(digest_uri.to_string()))?;

        Ok(Self {
            signed_info,
            canonicalization,
            canonicalization_prefixes,
            algorithm,
            reference_uri,
            reference_canonicalization,
            reference_prefixes,
            digest_algorithm,
            digest_value: decode_base64(ds_child(reference, "DigestValue")?)?,
            signature_value: decode_base64(ds_child(signature, "SignatureValue")?)?,
        })
    }
}

/// Checks the transform chain and returns the canonicalization it ends with.
fn reference_transforms(reference: &XmlElement) -> Result<(C14nMethod, Vec<String>), SignatureError> {
    let transforms = reference
        .first_child(XMLDSIG_NS, "Transforms")
        .ok_or_else(|| malformed("Reference has no Transforms"))?;

    let mut enveloped = false;
    let mut canonicalization = None;
    for transform in transforms.children_named(XMLDSIG_NS, "Transform") {
        let uri = algorithm_uri(transform)?;
        if uri == ENVELOPED_SIGNATURE {
            enveloped = true;
        } else if let Some(method) = C14nMethod::from_uri(uri) {
            canonicalization = Some((method, inclusive_prefixes(transform)));
        } else {
            return Err(SignatureError::UnsupportedAlgorithm(uri.to_string()));
        }
    }

    if !enveloped {
        return Err(malformed("Reference lacks the enveloped-signature transform"));
    }
    canonicalization.ok_or_else(|| {
        SignatureError::UnsupportedAlgorithm("implicit inclusive canonicalization".to_string())
    })
}

fn c14n_method(element: &XmlElement) -> Result<C14nMethod, SignatureError> {
    let uri = algorithm_uri(element)?;
    C14nMethod::from_uri(uri).ok_or_else(|| SignatureError::UnsupportedAlgorithm(uri.to_string()))
}

fn inclusive_prefixes(element: &XmlElement) -> Vec<String> {
    element
        .first_child(EXC_C14N_NS, "InclusiveNamespaces")
        .and_then(|e| e.attribute("PrefixList"))
        .map(|list| list.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn ds_child<'a>(parent: &'a XmlElement, name: &str) -> Result<&'a XmlElement, SignatureError> {
    parent
        .first_child(XMLDSIG_NS, name)
        .ok_or_else(|| malformed(&format!("missing ds:{name}")))
}

fn algorithm_uri(element: &XmlElement) -> Result<&str, SignatureError> {
    element
        .attribute("Algorithm")
        .ok_or_else(|| malformed(&format!("ds:{} has no Algorithm", element.local_name())))
}

fn decode_base64(element: &XmlElement) -> Result<Vec<u8>, SignatureError> {
    let text: String = element.text().split_whitespace().collect();
    base64::engine::general_purpose::STANDARD
        .decode(text)
        .map_err(|e| malformed(&format!("ds:{} is not base64: {e}", element.local_name())))
}

fn malformed(reason: &str) -> SignatureError {
    SignatureError::Malformed(reason.to_string())
}
