//! Certificate wallet loading and startup failures.

use wsfed_core::FederationConfig;
use wsfed_protocol::{
    CertificateLoadError, CertificateWallet, FederationValidator, ProtocolError, ValidationContext,
};

use crate::common;

fn config(certs: &str) -> anyhow::Result<FederationConfig> {
    let mut config = FederationConfig::from_toml_str(&format!(
        r#"
identity_provider_url = "https://login-test-env.ewu.edu/adfs/ls/"
identity_provider_identifier = "http://login-test-env.ewu.edu/adfs/services/trust"
signing_certificate_files = [{certs}]
relying_party_identifier = "urn:federation:Ewucas"
identity_attribute = "upn"
tolerance_ms = 5000
"#
    ))?;
    config.resolve_relative_paths(&common::fixtures_dir());
    Ok(config)
}

/// Paths resolve against the configuration directory and keep their order.
#[test]
fn test_wallet_from_config() -> anyhow::Result<()> {
    common::init();
    let config = config(r#""certs/idp-rollover.crt.der", "certs/idp-primary.crt.pem""#)?;
    let context = ValidationContext::from_config(&config)?;

    let sources: Vec<_> = context.wallet().iter().map(|c| c.source().to_path_buf()).collect();
    assert_eq!(sources, vec![common::cert("idp-rollover.crt.der"), common::cert("idp-primary.crt.pem")]);
    assert_eq!(context.policy().tolerance_ms(), 5000);

    assert!(FederationValidator::new(context).is_ok());
    Ok(())
}

/// Each load failure is reported with its own reason.
#[test]
fn test_wallet_errors() {
    let err = CertificateWallet::load(&[common::cert("missing.pem")]).unwrap_err();
    assert!(matches!(err, CertificateLoadError::NotFound(_)));

    let err = CertificateWallet::load(&[common::cert("malformed.crt.pem")]).unwrap_err();
    assert!(matches!(err, CertificateLoadError::Malformed { .. }));
    assert!(err.path().ends_with("malformed.crt.pem"));

    let err = CertificateWallet::load(&[common::cert("ec-p256.crt.pem")]).unwrap_err();
    assert!(matches!(err, CertificateLoadError::UnsupportedKeyAlgorithm { .. }));
}

/// Startup refuses to proceed without a usable wallet.
#[test]
fn test_startup_fails_closed() -> anyhow::Result<()> {
    let err = ValidationContext::from_config(&config("")?).unwrap_err();
    assert!(matches!(err, ProtocolError::Config(_)));

    let err = ValidationContext::from_config(&config(r#""certs/idp-primary.crt.pem", "certs/nope.pem""#)?)
        .unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::CertificateLoad(CertificateLoadError::NotFound(_))
    ));

    // A key the verifier can never use is a startup error, not a silent reject later.
    let err = ValidationContext::from_config(&config(r#""certs/idp-primary.crt.pem", "certs/rsa-1024.crt.pem""#)?)
        .unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::CertificateLoad(CertificateLoadError::UnsupportedKeyAlgorithm { .. })
    ));
    Ok(())
}

/// Environment overrides replace file values.
#[test]
fn test_environment_overrides() -> anyhow::Result<()> {
    let mut config = config(r#""certs/idp-primary.crt.pem""#)?;
    config.apply_overrides(|name| match name {
        "WSFED_RELYING_PARTY" => Some("urn:federation:Other".to_string()),
        "WSFED_TOLERANCE_MS" => Some("2500".to_string()),
        "WSFED_ENFORCE_NOT_BEFORE" => Some("true".to_string()),
        _ => None,
    })?;

    let context = ValidationContext::from_config(&config)?;
    assert_eq!(context.policy().expected_audience(), "urn:federation:Other");
    assert_eq!(context.policy().tolerance_ms(), 2500);
    assert!(context.policy().enforces_not_before());
    Ok(())
}
