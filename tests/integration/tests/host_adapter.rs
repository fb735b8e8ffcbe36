//! The `wresult` callback through to an authenticated principal.

use std::collections::HashMap;

use chrono::Utc;

use wsfed_auth::{
    AuthError, AuthenticationHandler, CallbackOutcome, Credentials, FederationCallback,
    WsFederationAuthenticationHandler, WsFederationPrincipalResolver, WRESULT,
};
use wsfed_protocol::AttributeMap;

use crate::common::{self, AUDIENCE};

fn params(wresult: &str) -> HashMap<String, String> {
    HashMap::from([(WRESULT.to_string(), wresult.to_string())])
}

/// A valid token authenticates its `upn`.
#[test]
fn test_callback_authenticates() -> anyhow::Result<()> {
    common::init();
    let callback = FederationCallback::new(common::validator(&["idp-primary.crt.pem"], AUDIENCE, 10_000)?);
    let token = common::signed_token(Utc::now(), "idp-primary.key.pk8")?;

    let CallbackOutcome::Authenticated(auth) = callback.handle(&params(&token)) else {
        anyhow::bail!("token was not accepted");
    };
    assert_eq!(auth.principal.id(), "jgasper@mailtest.ewu.edu");
    assert_eq!(auth.principal.attributes().len(), 7);
    Ok(())
}

/// Every failure looks the same to the user.
#[test]
fn test_callback_rejections_are_generic() -> anyhow::Result<()> {
    common::init();
    let callback = FederationCallback::new(common::validator(&["idp-primary.crt.pem"], AUDIENCE, 10_000)?);

    let forged = common::signed_token(Utc::now(), "rogue.key.pk8")?;
    let stale = common::signed_token(Utc::now() - chrono::Duration::minutes(5), "idp-primary.key.pk8")?;

    let outcomes = [
        callback.handle(&params("garbage")),
        callback.handle(&params(&forged)),
        callback.handle(&params(&stale)),
    ];
    for outcome in outcomes {
        assert_eq!(
            outcome,
            CallbackOutcome::Rejected {
                message: "federation login failed"
            }
        );
    }

    assert_eq!(callback.handle(&HashMap::new()), CallbackOutcome::NoToken);
    Ok(())
}

/// The attribute mutator runs before the principal is resolved.
#[test]
fn test_mutated_identity() -> anyhow::Result<()> {
    common::init();
    let context = common::validator(&["idp-primary.crt.pem"], AUDIENCE, 10_000)?
        .context()
        .clone()
        .with_mutator(|mut attrs: AttributeMap| {
            if let Some(upn) = attrs.remove("upn") {
                let user = upn.to_string().split('@').next().unwrap_or_default().to_string();
                attrs.insert("upn".to_string(), user.as_str().into());
            }
            attrs
        });
    let validator = wsfed_protocol::FederationValidator::new(context)?;
    let callback = FederationCallback::new(validator);

    let token = common::signed_token(Utc::now(), "idp-primary.key.pk8")?;
    let CallbackOutcome::Authenticated(auth) = callback.handle(&params(&token)) else {
        anyhow::bail!("token was not accepted");
    };
    assert_eq!(auth.principal.id(), "jgasper");
    Ok(())
}

/// A multi-valued identity attribute cannot name a principal.
#[test]
fn test_ambiguous_identity() -> anyhow::Result<()> {
    common::init();
    let token = common::signed_token(Utc::now(), "idp-primary.key.pk8")?;
    let credential = common::validator(&["idp-primary.crt.pem"], AUDIENCE, 10_000)?.validate(&token)?;

    let handler = WsFederationAuthenticationHandler::new(WsFederationPrincipalResolver::new("Group"));
    let err = handler.authenticate(&Credentials::from(credential)).unwrap_err();
    assert!(matches!(err, AuthError::AmbiguousIdentity { count: 3, .. }));
    Ok(())
}
