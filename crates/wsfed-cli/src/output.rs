//! Output formatting utilities.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crate::config::OutputFormat;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Outputs rows as a table or a JSON array.
pub fn output<T: Tabled + serde::Serialize>(data: &[T], format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Text => {
            if data.is_empty() {
                info("No results found.");
            } else {
                println!("{}", Table::new(data).with(Style::rounded()));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
    }
    Ok(())
}

/// Outputs a single item, as `Display` text or JSON.
pub fn output_single<T>(item: &T, format: OutputFormat) -> crate::CliResult<()>
where
    T: std::fmt::Display + serde::Serialize,
{
    match format {
        OutputFormat::Text => println!("{item}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(item)?),
    }
    Ok(())
}

/// A two-column key/value row.
#[derive(Debug, Tabled, serde::Serialize)]
pub struct Field {
    /// Field name.
    #[tabled(rename = "Field")]
    pub name: &'static str,
    /// Field value.
    #[tabled(rename = "Value")]
    pub value: String,
}

impl Field {
    /// Creates a row, showing `-` for an absent value.
    pub fn new(name: &'static str, value: Option<impl ToString>) -> Self {
        Self {
            name,
            value: value.map_or_else(|| "-".to_string(), |v| v.to_string()),
        }
    }
}
