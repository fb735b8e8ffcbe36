//! Token response parsing.
//!
//! A passive-requestor `wresult` carries a WS-Trust
//! `RequestSecurityTokenResponse` whose `RequestedSecurityToken` holds a
//! SAML 1.1 assertion. Only the first requested token and its first child
//! are considered.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::TokenParseError;
use crate::types::constants::{trust, SAML11_ASSERTION_NS};
use crate::types::{
    Assertion, Attribute, AttributeStatement, AudienceRestriction, AuthenticationStatement,
    Conditions, Subject,
};
use crate::xml::{XmlDocument, XmlElement};

/// Parses a token response into its (unverified) assertion.
///
/// # Errors
///
/// See [`TokenParseError`].
pub fn parse_token(raw: &str) -> Result<Assertion, TokenParseError> {
    let document = XmlDocument::parse(raw)?;
    let response = token_response(document.root())?;

    let requested = response
        .child_elements()
        .find(|e| {
            e.local_name() == trust::REQUESTED_SECURITY_TOKEN
                && trust::is_trust_namespace(e.namespace())
        })
        .ok_or(TokenParseError::MissingRequestedSecurityToken)?;

    let token = requested
        .child_elements()
        .next()
        .filter(|e| e.is(SAML11_ASSERTION_NS, "Assertion"))
        .ok_or(TokenParseError::MissingAssertion)?;

    let assertion = parse_assertion(token)?;
    tracing::debug!(
        assertion_id = %assertion.id,
        issuer = %assertion.issuer,
        signed = assertion.is_signed(),
        "parsed token response"
    );
    Ok(assertion)
}

/// Parses a token response given as raw bytes.
///
/// # Errors
///
/// Returns [`TokenParseError::Encoding`] if the bytes are not UTF-8, and
/// otherwise behaves like [`parse_token`].
pub fn parse_token_bytes(raw: &[u8]) -> Result<Assertion, TokenParseError> {
    let text = std::str::from_utf8(raw).map_err(|e| TokenParseError::Encoding(e.to_string()))?;
    parse_token(text.strip_prefix('\u{feff}').unwrap_or(text))
}

fn token_response(root: &XmlElement) -> Result<&XmlElement, TokenParseError> {
    if !trust::is_trust_namespace(root.namespace()) {
        return Err(TokenParseError::Malformed(format!(
            "unexpected document element `{}`",
            root.qualified_name()
        )));
    }
    match root.local_name() {
        trust::RSTR => Ok(root),
        trust::RSTR_COLLECTION => root
            .child_elements()
            .find(|e| e.local_name() == trust::RSTR && trust::is_trust_namespace(e.namespace()))
            .ok_or(TokenParseError::MissingRequestedSecurityToken),
        _ => Err(TokenParseError::Malformed(format!(
            "unexpected document element `{}`",
            root.qualified_name()
        ))),
    }
}

/// Reads a `saml:Assertion` element.
///
/// # Errors
///
/// Returns [`TokenParseError::InvalidAssertion`] when a mandatory attribute
/// is missing or a timestamp cannot be read.
pub fn parse_assertion(element: &XmlElement) -> Result<Assertion, TokenParseError> {
    if let Some(major) = element.attribute("MajorVersion") {
        if major.trim() != "1" {
            return Err(invalid(format!("unsupported SAML major version `{major}`")));
        }
    }

    let id = required(element, "AssertionID")?.to_string();
    let issuer = required(element, "Issuer")?.to_string();
    let issue_instant = parse_instant(required(element, "IssueInstant")?, "IssueInstant")?;

    let conditions = element
        .first_child(SAML11_ASSERTION_NS, "Conditions")
        .map(parse_conditions)
        .transpose()?;

    let authentication_statements = element
        .children_named(SAML11_ASSERTION_NS, "AuthenticationStatement")
        .map(parse_authentication_statement)
        .collect::<Result<Vec<_>, _>>()?;

    let attribute_statements = element
        .children_named(SAML11_ASSERTION_NS, "AttributeStatement")
        .map(parse_attribute_statement)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Assertion {
        id,
        issuer,
        issue_instant,
        conditions,
        authentication_statements,
        attribute_statements,
        element: element.clone(),
    })
}

fn parse_conditions(element: &XmlElement) -> Result<Conditions, TokenParseError> {
    let audience_restrictions = element
        .children_named(SAML11_ASSERTION_NS, "AudienceRestrictionCondition")
        .map(|restriction| AudienceRestriction {
            audiences: restriction
                .children_named(SAML11_ASSERTION_NS, "Audience")
                .map(|a| a.text().trim().to_string())
                .collect(),
        })
        .collect();

    Ok(Conditions {
        not_before: optional_instant(element, "NotBefore")?,
        not_on_or_after: optional_instant(element, "NotOnOrAfter")?,
        audience_restrictions,
    })
}

fn parse_authentication_statement(
    element: &XmlElement,
) -> Result<AuthenticationStatement, TokenParseError> {
    Ok(AuthenticationStatement {
        authentication_method: element.attribute("AuthenticationMethod").map(str::to_string),
        authentication_instant: optional_instant(element, "AuthenticationInstant")?,
        subject: parse_subject(element),
    })
}

fn parse_attribute_statement(element: &XmlElement) -> Result<AttributeStatement, TokenParseError> {
    let attributes = element
        .children_named(SAML11_ASSERTION_NS, "Attribute")
        .map(|attr| -> Result<Attribute, TokenParseError> {
            Ok(Attribute {
                name: required(attr, "AttributeName")?.to_string(),
                namespace: attr.attribute("AttributeNamespace").map(str::to_string),
                values: attr
                    .children_named(SAML11_ASSERTION_NS, "AttributeValue")
                    .map(XmlElement::text)
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AttributeStatement {
        subject: parse_subject(element),
        attributes,
    })
}

fn parse_subject(statement: &XmlElement) -> Option<Subject> {
    let subject = statement.first_child(SAML11_ASSERTION_NS, "Subject")?;
    let name_id = subject.first_child(SAML11_ASSERTION_NS, "NameIdentifier");

    Some(Subject {
        name_identifier: name_id.map(|n| n.text().trim().to_string()),
        format: name_id.and_then(|n| n.attribute("Format")).map(str::to_string),
        confirmation_methods: subject
            .children_named(SAML11_ASSERTION_NS, "SubjectConfirmation")
            .flat_map(|c| c.children_named(SAML11_ASSERTION_NS, "ConfirmationMethod"))
            .map(|m| m.text().trim().to_string())
            .collect(),
    })
}

fn required<'a>(element: &'a XmlElement, name: &str) -> Result<&'a str, TokenParseError> {
    element
        .attribute(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| invalid(format!("missing {name} on {}", element.local_name())))
}

fn optional_instant(
    element: &XmlElement,
    name: &str,
) -> Result<Option<DateTime<Utc>>, TokenParseError> {
    element
        .attribute(name)
        .map(|v| parse_instant(v, name))
        .transpose()
}

/// Reads an `xsd:dateTime`; values without a zone are taken as UTC.
fn parse_instant(value: &str, name: &str) -> Result<DateTime<Utc>, TokenParseError> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").map(|t| t.and_utc())
        })
        .map_err(|e| invalid(format!("unreadable {name} `{value}`: {e}")))
}

fn invalid(reason: String) -> TokenParseError {
    TokenParseError::InvalidAssertion(reason)
}
