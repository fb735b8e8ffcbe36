//! Token response shapes the parser must refuse.

use chrono::Utc;

use wsfed_protocol::{parse_token, parse_token_bytes, Rejection, TokenParseError};

use crate::common::{self, AUDIENCE};

/// A collection response is unwrapped to its first response.
#[test]
fn test_collection_response() -> anyhow::Result<()> {
    let token = common::unsigned_token(Utc::now());
    let wrapped = format!(
        r#"<t:RequestSecurityTokenResponseCollection xmlns:t="http://schemas.xmlsoap.org/ws/2005/02/trust">{token}</t:RequestSecurityTokenResponseCollection>"#
    );
    assert_eq!(parse_token(&wrapped)?.id, parse_token(&token)?.id);
    Ok(())
}

/// Structural failures are distinguished.
#[test]
fn test_parse_failures() {
    assert!(matches!(parse_token("<unclosed"), Err(TokenParseError::Malformed(_))));
    assert!(matches!(
        parse_token_bytes(b"\xff\xfe<t/>"),
        Err(TokenParseError::Encoding(_))
    ));
    assert_eq!(
        parse_token(
            r#"<t:RequestSecurityTokenResponse xmlns:t="http://schemas.xmlsoap.org/ws/2005/02/trust"><t:TokenType>x</t:TokenType></t:RequestSecurityTokenResponse>"#
        ),
        Err(TokenParseError::MissingRequestedSecurityToken)
    );
    assert_eq!(
        parse_token(
            r#"<t:RequestSecurityTokenResponse xmlns:t="http://schemas.xmlsoap.org/ws/2005/02/trust"><t:RequestedSecurityToken><other/></t:RequestedSecurityToken></t:RequestSecurityTokenResponse>"#
        ),
        Err(TokenParseError::MissingAssertion)
    );
}

/// Entity declarations never reach the parser.
#[test]
fn test_doctype_is_refused() {
    let token = format!(
        "<!DOCTYPE t [<!ENTITY e \"x\">]>{}",
        common::unsigned_token(Utc::now())
    );
    assert!(matches!(parse_token(&token), Err(TokenParseError::Malformed(_))));
}

/// A forged assertion reusing the signed one's ID is refused before
/// signature checking.
#[test]
fn test_signature_wrapping_is_refused() -> anyhow::Result<()> {
    common::init();
    let token = common::signed_token(Utc::now(), "idp-primary.key.pk8")?;

    let start = token.find("<saml:Assertion").expect("assertion start");
    let end = token.find("</saml:Assertion>").expect("assertion end") + "</saml:Assertion>".len();
    let signed = &token[start..end];
    let forged = common::unsigned_token(Utc::now()).replace(">John<", ">Mallory<");
    let forged_start = forged.find("<saml:Assertion").expect("assertion start");
    let forged_end =
        forged.find("</saml:Assertion>").expect("assertion end") + "</saml:Assertion>".len();

    let wrapped = token.replacen(
        signed,
        &format!(
            "{}<t:Extra>{signed}</t:Extra>",
            &forged[forged_start..forged_end]
        ),
        1,
    );

    let validator = common::validator(&["idp-primary.crt.pem"], AUDIENCE, 10_000)?;
    let rejection = validator.validate(&wrapped).unwrap_err();
    assert!(matches!(
        rejection,
        Rejection::ParseFailure(TokenParseError::Malformed(ref m)) if m.contains("duplicate identifier")
    ));
    Ok(())
}
