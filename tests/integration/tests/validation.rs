//! Pipeline outcomes for signed tokens.

use chrono::{Duration, Utc};

use wsfed_protocol::{
    parse_token, AttributeValue, CredentialBuilder, PolicyViolation, Rejection, ValidityPolicy,
};

use crate::common::{self, ASSERTION_ID, AUDIENCE, ISSUER};

/// A freshly signed token yields a credential mirroring the assertion.
#[test]
fn test_round_trip() -> anyhow::Result<()> {
    common::init();
    let token = common::signed_token(Utc::now(), "idp-primary.key.pk8")?;
    let validator = common::validator(&["idp-primary.crt.pem"], AUDIENCE, 10_000)?;

    let credential = validator.validate(&token)?;
    let assertion = parse_token(&token)?;

    assert_eq!(credential.id(), ASSERTION_ID);
    assert_eq!(credential.issuer(), ISSUER);
    assert_eq!(credential.audience(), Some(AUDIENCE));
    assert_eq!(credential.issued_on(), assertion.issue_instant);
    assert_eq!(
        credential.authentication_method(),
        Some("urn:oasis:names:tc:SAML:1.0:am:password")
    );
    assert_eq!(
        credential.attribute("upn"),
        Some(&AttributeValue::from("jgasper@mailtest.ewu.edu"))
    );
    assert_eq!(
        credential.attribute("department"),
        Some(&AttributeValue::from("Information Resources & Systems"))
    );
    // Seven attributes carry values; `nickname` has none.
    assert_eq!(credential.attributes().len(), 7);
    assert!(credential.attribute("nickname").is_none());
    Ok(())
}

/// Three values stay an ordered list; one value stays a scalar.
#[test]
fn test_multi_valued_attributes() -> anyhow::Result<()> {
    common::init();
    let token = common::signed_token(Utc::now(), "idp-primary.key.pk8")?;
    let credential = common::validator(&["idp-primary.crt.pem"], AUDIENCE, 10_000)?.validate(&token)?;

    let groups = credential.attribute("Group").expect("Group attribute");
    assert_eq!(
        groups.values(),
        vec![
            r"easterntest\Domain Users",
            r"easterntest\CRS-AAST301-75-200940",
            r"easterntest\DEPT-IS-DC",
        ]
    );
    assert!(groups.is_multiple());
    assert!(!credential.attribute("givenname").expect("givenname").is_multiple());

    let json = serde_json::to_value(&credential)?;
    assert!(json["attributes"]["Group"].is_array());
    assert_eq!(json["attributes"]["surname"], "Gasper");
    Ok(())
}

/// The relying party must be the token's audience.
#[test]
fn test_audience_mismatch() -> anyhow::Result<()> {
    common::init();
    let token = common::signed_token(Utc::now(), "idp-primary.key.pk8")?;
    let validator = common::validator(&["idp-primary.crt.pem"], "urn:NotUs", 10_000)?;

    let rejection = validator.validate(&token).unwrap_err();
    assert!(matches!(
        rejection,
        Rejection::PolicyViolation(PolicyViolation::AudienceMismatch { .. })
    ));
    assert_eq!(rejection.user_message(), "federation login failed");
    Ok(())
}

/// A token presented after `NotOnOrAfter` is refused.
#[test]
fn test_late_use() -> anyhow::Result<()> {
    common::init();
    let issued = Utc::now() - Duration::hours(2);
    let token = common::signed_token(issued, "idp-primary.key.pk8")?;
    let validator = common::validator(&["idp-primary.crt.pem"], AUDIENCE, 10_000)?;

    // One second past the one-hour window.
    let at = issued + Duration::hours(1) + Duration::seconds(1);
    let rejection = validator.validate_at(&token, at).unwrap_err();
    assert!(matches!(
        rejection,
        Rejection::PolicyViolation(PolicyViolation::Expired { .. })
    ));
    Ok(())
}

/// Issue instants further than the tolerance from receipt are refused.
#[test]
fn test_clock_drift() -> anyhow::Result<()> {
    common::init();
    let issued = Utc::now();
    let token = common::signed_token(issued, "idp-primary.key.pk8")?;
    let validator = common::validator(&["idp-primary.crt.pem"], AUDIENCE, 2000)?;

    let rejection = validator
        .validate_at(&token, issued + Duration::milliseconds(3000))
        .unwrap_err();
    assert!(matches!(
        rejection,
        Rejection::PolicyViolation(PolicyViolation::IssuedOutsideTolerance { .. })
    ));

    let credential = validator.validate_at(&token, issued + Duration::milliseconds(1000))?;
    assert_eq!(credential.id(), ASSERTION_ID);
    Ok(())
}

/// Building twice from one assertion differs only in `retrievedOn`.
#[test]
fn test_build_is_idempotent() -> anyhow::Result<()> {
    let assertion = parse_token(&common::unsigned_token(Utc::now()))?;
    let at = Utc::now();

    let first = CredentialBuilder::from_assertion(&assertion).build_at(at);
    let second = CredentialBuilder::from_assertion(&assertion).build_at(at);
    assert_eq!(first, second);

    let later = CredentialBuilder::from_assertion(&assertion).build_at(at + Duration::seconds(5));
    assert_eq!(later.retrieved_on(), at + Duration::seconds(5));
    assert_eq!(later.attributes(), first.attributes());
    assert_eq!(later.issued_on(), first.issued_on());
    Ok(())
}

/// The early-use check is off unless configured.
#[test]
fn test_not_before_flag() -> anyhow::Result<()> {
    let assertion = parse_token(&common::unsigned_token(Utc::now()))?;
    let not_before = assertion
        .conditions
        .as_ref()
        .and_then(|c| c.not_before)
        .expect("NotBefore");
    let credential = CredentialBuilder::from_assertion(&assertion)
        .build_at(not_before - Duration::seconds(30));

    let lenient = ValidityPolicy::new(AUDIENCE, ISSUER).with_tolerance_ms(60_000);
    assert!(lenient.is_valid(&credential));

    let strict = lenient.with_tolerance_ms(10_000).with_enforce_not_before(true);
    assert!(matches!(
        strict.check(&credential),
        Err(PolicyViolation::NotYetValid { .. })
    ));
    Ok(())
}
