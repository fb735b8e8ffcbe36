//! Trusted certificate listing.

use serde::Serialize;
use tabled::Tabled;

use wsfed_core::FederationConfig;
use wsfed_protocol::CertificateWallet;

use crate::config::OutputFormat;
use crate::output::output;
use crate::CliResult;

#[derive(Debug, Tabled, Serialize)]
struct WalletRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Key Bits")]
    key_bits: usize,
    #[tabled(rename = "Expires")]
    expires: String,
    #[tabled(rename = "SHA-256")]
    fingerprint: String,
}

/// Runs the wallet command.
pub fn run_wallet(config: &FederationConfig, format: OutputFormat) -> CliResult<()> {
    let wallet = CertificateWallet::load(&config.signing_certificate_files)
        .map_err(wsfed_protocol::ProtocolError::from)?;

    let rows: Vec<WalletRow> = wallet
        .iter()
        .enumerate()
        .map(|(index, cert)| WalletRow {
            index,
            file: cert.source().display().to_string(),
            subject: cert.subject().to_string(),
            key_bits: cert.key_bits(),
            expires: cert
                .not_after()
                .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d").to_string()),
            fingerprint: cert.fingerprint().to_string(),
        })
        .collect();

    output(&rows, format)
}
