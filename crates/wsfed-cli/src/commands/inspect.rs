//! Unverified token inspection.

use wsfed_protocol::{parse_token_bytes, Assertion};

use super::read_token;
use crate::config::OutputFormat;
use crate::output::{output, warning, Field};
use crate::CliResult;

/// Runs the inspect command.
pub fn run_inspect(token: &str, format: OutputFormat) -> CliResult<()> {
    let assertion = parse_token_bytes(&read_token(token)?)?;

    match format {
        OutputFormat::Text => {
            warning("The signature has NOT been verified.");
            output(&summary(&assertion), format)
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&assertion)?);
            Ok(())
        }
    }
}

fn summary(assertion: &Assertion) -> Vec<Field> {
    let conditions = assertion.conditions.as_ref();
    let mut fields = vec![
        Field::new("ID", Some(&assertion.id)),
        Field::new("Issuer", Some(&assertion.issuer)),
        Field::new("Issued On", Some(assertion.issue_instant)),
        Field::new("Valid After", conditions.and_then(|c| c.not_before)),
        Field::new("Valid Before", conditions.and_then(|c| c.not_on_or_after)),
        Field::new("Audience", assertion.audience()),
        Field::new("Authentication Method", assertion.authentication_method()),
        Field::new("Name Identifier", assertion.name_identifier()),
        Field::new("Signed", Some(if assertion.is_signed() { "yes" } else { "no" })),
    ];

    for attribute in assertion
        .attribute_statements
        .first()
        .map(|s| s.attributes.as_slice())
        .unwrap_or_default()
    {
        fields.push(Field {
            name: "Attribute",
            value: format!("{} = [{}]", attribute.name, attribute.values.join(", ")),
        });
    }
    fields
}
