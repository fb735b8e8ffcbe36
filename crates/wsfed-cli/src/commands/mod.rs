//! Command implementations.

pub mod config;
pub mod inspect;
pub mod validate;
pub mod wallet;

pub use config::run_config;
pub use inspect::run_inspect;
pub use validate::{run_validate, validate_token};
pub use wallet::run_wallet;

use std::io::Read;

/// Reads a token from a file, or from stdin when `source` is `-`.
pub fn read_token(source: &str) -> crate::CliResult<Vec<u8>> {
    if source == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read(source)?)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};

    use wsfed_core::FederationConfig;

    pub fn fixtures_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures")
    }

    /// Token signed by the rollover key, issued 2012-10-16T18:52:09.284Z.
    pub fn fixture_token() -> String {
        fixtures_dir()
            .join("tokens/adfs-rollover-signed.xml")
            .display()
            .to_string()
    }

    pub fn fixture_config(certs: &[&str]) -> FederationConfig {
        let mut config = FederationConfig::from_toml_str(&format!(
            r#"
identity_provider_url = "https://login-test-env.ewu.edu/adfs/ls/"
identity_provider_identifier = "http://login-test-env.ewu.edu/adfs/services/trust"
signing_certificate_files = [{}]
relying_party_identifier = "urn:federation:Ewucas"
identity_attribute = "upn"
"#,
            certs
                .iter()
                .map(|c| format!("{c:?}"))
                .collect::<Vec<_>>()
                .join(", ")
        ))
        .unwrap();
        config.resolve_relative_paths(&fixtures_dir());
        config
    }
}
