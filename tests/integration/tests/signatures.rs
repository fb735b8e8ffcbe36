//! Signature verification against the wallet.

use chrono::{DateTime, Duration, Utc};

use wsfed_crypto::SignatureAlgorithm;
use wsfed_protocol::{parse_token, verify_signature, AttributeValue, Rejection, SignatureError};

use crate::common::{self, AUDIENCE};

/// Changing any signed byte must fail the signature check.
#[test]
fn test_tamper_sensitivity() -> anyhow::Result<()> {
    common::init();
    let token = common::signed_token(Utc::now(), "idp-primary.key.pk8")?;
    let validator = common::validator(&["idp-primary.crt.pem"], AUDIENCE, 10_000)?;

    let tampered = [
        token.replace(">John<", ">Jphn<"),
        token.replace("(509) 359-6419", "(509) 359-6418"),
        token.replace(
            r#"Issuer="http://login-test-env.ewu.edu/adfs/services/trust""#,
            r#"Issuer="http://login-test-env.ewu.edu/adfs/services/trusT""#,
        ),
        token.replacen("NotOnOrAfter=\"2", "NotOnOrAfter=\"3", 1),
        token.replace(
            "<saml:Audience>urn:federation:Ewucas<",
            "<saml:Audience>urn:federation:Ewucaz<",
        ),
    ];

    for forged in &tampered {
        assert_ne!(forged, &token);
        assert_eq!(
            validator.validate(forged).unwrap_err(),
            Rejection::SignatureInvalid(SignatureError::DigestMismatch)
        );
    }
    Ok(())
}

/// Tokens signed by untrusted keys are refused.
#[test]
fn test_wrong_key() -> anyhow::Result<()> {
    common::init();
    let token = common::signed_token(Utc::now(), "rogue.key.pk8")?;
    let validator =
        common::validator(&["idp-primary.crt.pem", "idp-rollover.crt.der"], AUDIENCE, 10_000)?;

    assert_eq!(
        validator.validate(&token).unwrap_err(),
        Rejection::SignatureInvalid(SignatureError::NoMatchingKey)
    );
    Ok(())
}

/// Either trusted key validates, whatever its wallet position.
#[test]
fn test_key_rotation() -> anyhow::Result<()> {
    common::init();
    let orders: [&[&str]; 2] = [
        &["idp-primary.crt.pem", "idp-rollover.crt.der"],
        &["idp-rollover.crt.der", "idp-primary.crt.pem"],
    ];

    for order in orders {
        let validator = common::validator(order, AUDIENCE, 10_000)?;
        for key in ["idp-primary.key.pk8", "idp-rollover.key.pk8"] {
            let token = common::signed_token(Utc::now(), key)?;
            assert!(validator.validate(&token).is_ok(), "{key} with {order:?}");
        }
    }
    Ok(())
}

/// Every RSA digest size is accepted; unsigned assertions are not.
#[test]
fn test_algorithms_and_unsigned() -> anyhow::Result<()> {
    common::init();
    let wallet = common::wallet(&["idp-primary.crt.pem"])?;

    for alg in [
        SignatureAlgorithm::RsaSha256,
        SignatureAlgorithm::RsaSha384,
        SignatureAlgorithm::RsaSha512,
    ] {
        let token = common::sign(&common::unsigned_token(Utc::now()), "idp-primary.key.pk8", alg)?;
        assert!(verify_signature(&parse_token(&token)?, &wallet), "{alg:?}");
    }

    let unsigned = parse_token(&common::unsigned_token(Utc::now()))?;
    assert!(!unsigned.is_signed());
    assert!(!verify_signature(&unsigned, &wallet));
    Ok(())
}

/// Whitespace and comments outside the assertion do not matter.
#[test]
fn test_envelope_is_not_signed() -> anyhow::Result<()> {
    common::init();
    let token = common::signed_token(Utc::now(), "idp-primary.key.pk8")?
        .replace("<t:TokenType>", "\n<!-- relayed by proxy -->\n<t:TokenType>");
    let validator = common::validator(&["idp-primary.crt.pem"], AUDIENCE, 10_000)?;
    assert!(validator.validate(&token).is_ok());
    Ok(())
}

/// A token signed by openssl over hand-canonicalized bytes, never re-signed here.
#[test]
fn test_externally_signed_token() -> anyhow::Result<()> {
    common::init();
    let token = std::fs::read_to_string(
        common::fixtures_dir().join("tokens/adfs-rollover-signed.xml"),
    )?;
    let issued = DateTime::parse_from_rfc3339("2012-10-16T18:52:09.284Z")?.with_timezone(&Utc);
    let validator = common::validator(
        &["idp-primary.crt.pem", "idp-rollover.crt.der"],
        AUDIENCE,
        2000,
    )?;

    let credential = validator.validate_at(&token, issued + Duration::milliseconds(750))?;
    assert_eq!(credential.id(), "_d71a3a8e-9fcc-45ad-9b43-51f6b5e1c9a2");
    assert_eq!(credential.issuer(), common::ISSUER);
    assert_eq!(
        credential.attribute("upn"),
        Some(&AttributeValue::from("jgasper@mailtest.ewu.edu"))
    );
    assert_eq!(
        credential.attribute("title"),
        Some(&AttributeValue::from("\"Lead\" > Analyst"))
    );
    assert_eq!(
        credential.attribute("Group").map(AttributeValue::values),
        Some(vec!["easterntest\\Domain Users", "easterntest\\DEPT-IS-DC"])
    );
    assert!(credential.attribute("nickname").is_none());

    // Only the primary key configured: the rollover signature has no match.
    let primary_only = common::validator(&["idp-primary.crt.pem"], AUDIENCE, 2000)?;
    assert_eq!(
        primary_only.validate_at(&token, issued).unwrap_err(),
        Rejection::SignatureInvalid(SignatureError::NoMatchingKey)
    );
    Ok(())
}
