//! Common test utilities and fixtures.

use std::path::PathBuf;

use base64::Engine;
use chrono::{DateTime, Duration, SecondsFormat, Utc};

use wsfed_crypto::SignatureAlgorithm;
use wsfed_protocol::xml::{canonicalize, C14nMethod, XmlDocument};
use wsfed_protocol::{
    parse_token, CertificateWallet, FederationValidator, SecurityPolicy, ValidationContext,
    ValidityPolicy,
};

/// Audience of the fixture token.
pub const AUDIENCE: &str = "urn:federation:Ewucas";

/// Issuer of the fixture token.
pub const ISSUER: &str = "http://login-test-env.ewu.edu/adfs/services/trust";

/// `AssertionID` of the fixture token.
pub const ASSERTION_ID: &str = "_8010ecc3-8cd1-47c1-b349-1fc7e25f19cb";

const TEMPLATE: &str = include_str!("../../fixtures/tokens/rstr-saml11.xml");

/// Installs a test subscriber once and initializes XML security.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("wsfed_protocol=debug,wsfed_auth=debug")
        .with_test_writer()
        .try_init();
    wsfed_protocol::initialize();
}

/// Path of a certificate fixture.
pub fn cert(name: &str) -> PathBuf {
    fixtures_dir().join("certs").join(name)
}

/// Directory holding all fixtures.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../fixtures")
}

/// Loads a wallet from certificate fixture names.
pub fn wallet(names: &[&str]) -> anyhow::Result<CertificateWallet> {
    let paths: Vec<_> = names.iter().map(|n| cert(n)).collect();
    Ok(CertificateWallet::load(&paths)?)
}

/// A validator trusting `certs`, expecting the fixture issuer and `audience`.
pub fn validator(certs: &[&str], audience: &str, tolerance_ms: u64) -> anyhow::Result<FederationValidator> {
    let context = ValidationContext::new(
        wallet(certs)?,
        ValidityPolicy::new(audience, ISSUER).with_tolerance_ms(tolerance_ms),
        "upn",
    )?;
    Ok(FederationValidator::with_security_policy(context, SecurityPolicy::default()))
}

/// Unsigned token response issued at `issued`, valid for one hour.
pub fn unsigned_token(issued: DateTime<Utc>) -> String {
    let fmt = |t: DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Millis, true);
    TEMPLATE
        .replace("{{ISSUE_INSTANT}}", &fmt(issued))
        .replace("{{NOT_BEFORE}}", &fmt(issued - Duration::milliseconds(16)))
        .replace("{{NOT_ON_OR_AFTER}}", &fmt(issued + Duration::hours(1)))
}

/// Token response issued at `issued` and signed with the `key` fixture.
pub fn signed_token(issued: DateTime<Utc>, key: &str) -> anyhow::Result<String> {
    sign(&unsigned_token(issued), key, SignatureAlgorithm::RsaSha256)
}

/// Inserts an enveloped RSA signature into the assertion of `token`.
pub fn sign(token: &str, key: &str, algorithm: SignatureAlgorithm) -> anyhow::Result<String> {
    let b64 = base64::engine::general_purpose::STANDARD;
    let key = std::fs::read(fixtures_dir().join("certs").join(key))?;

    let assertion = parse_token(token)?;
    let canonical = canonicalize(assertion.element(), C14nMethod::Exclusive, &[], None);
    let digest = wsfed_crypto::digest(algorithm.digest(), canonical.as_bytes());

    let signed_info = format!(
        concat!(
            r#"<ds:SignedInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#">"#,
            r#"<ds:CanonicalizationMethod Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"/>"#,
            r#"<ds:SignatureMethod Algorithm="{}"/>"#,
            r##"<ds:Reference URI="#{}"><ds:Transforms>"##,
            r#"<ds:Transform Algorithm="http://www.w3.org/2000/09/xmldsig#enveloped-signature"/>"#,
            r#"<ds:Transform Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"/>"#,
            r#"</ds:Transforms><ds:DigestMethod Algorithm="{}"/>"#,
            r#"<ds:DigestValue>{}</ds:DigestValue></ds:Reference></ds:SignedInfo>"#,
        ),
        algorithm.uri(),
        assertion.id,
        algorithm.digest().uri(),
        b64.encode(digest),
    );
    let doc = XmlDocument::parse(&signed_info)?;
    let canonical = canonicalize(doc.root(), C14nMethod::Exclusive, &[], None);
    let value = wsfed_crypto::rsa_sign(&key, algorithm, canonical.as_bytes())?;

    // AD FS also embeds its certificate; it must be ignored.
    let block = format!(
        r#"<ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#">{}<ds:SignatureValue>{}</ds:SignatureValue><KeyInfo xmlns="http://www.w3.org/2000/09/xmldsig#"><X509Data><X509Certificate>MIIBogus</X509Certificate></X509Data></KeyInfo></ds:Signature>"#,
        signed_info.replacen(r#" xmlns:ds="http://www.w3.org/2000/09/xmldsig#""#, "", 1),
        b64.encode(value),
    );
    Ok(token.replacen("</saml:Assertion>", &format!("{block}</saml:Assertion>"), 1))
}
