//! Relying-party configuration.
//!
//! Configuration is read from a TOML file and may be overridden from the
//! environment:
//!
//! | Variable | Key |
//! |----------|-----|
//! | `WSFED_IDP_URL` | `identity_provider_url` |
//! | `WSFED_IDP_IDENTIFIER` | `identity_provider_identifier` |
//! | `WSFED_SIGNING_CERTIFICATES` | `signing_certificate_files` (comma-separated) |
//! | `WSFED_RELYING_PARTY` | `relying_party_identifier` |
//! | `WSFED_IDENTITY_ATTRIBUTE` | `identity_attribute` |
//! | `WSFED_TOLERANCE_MS` | `tolerance_ms` |
//! | `WSFED_ENFORCE_NOT_BEFORE` | `enforce_not_before` |
//! | `WSFED_ALLOW_SHA1` | `allow_sha1` |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default clock-drift tolerance in milliseconds.
pub const DEFAULT_TOLERANCE_MS: u64 = 10_000;

/// Configuration of one relying party trusting one identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationConfig {
    /// Passive-requestor endpoint of the identity provider.
    ///
    /// Only used by the host's redirect flow; validation never contacts it.
    pub identity_provider_url: String,

    /// Issuer identifier the identity provider puts in its assertions.
    pub identity_provider_identifier: String,

    /// Certificates trusted to sign tokens, in the order they are tried.
    pub signing_certificate_files: Vec<PathBuf>,

    /// Audience identifier of this relying party.
    pub relying_party_identifier: String,

    /// Attribute holding the principal identifier.
    pub identity_attribute: String,

    /// Allowed clock drift between issuance and receipt.
    #[serde(default = "default_tolerance_ms")]
    pub tolerance_ms: u64,

    /// Reject tokens received before their `NotBefore` instant.
    #[serde(default)]
    pub enforce_not_before: bool,

    /// Accept `rsa-sha1` signatures and `sha1` digests.
    #[serde(default)]
    pub allow_sha1: bool,
}

const fn default_tolerance_ms() -> u64 {
    DEFAULT_TOLERANCE_MS
}

impl FederationConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or lacks required keys.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {e}")))
    }

    /// Loads configuration from a TOML file.
    ///
    /// Relative certificate paths are resolved against the directory holding
    /// the file, so a configuration directory can be moved as a unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_paths(base);
        }

        tracing::debug!(path = %path.display(), "loaded federation configuration");
        Ok(config)
    }

    /// Makes relative certificate paths relative to `base`.
    pub fn resolve_relative_paths(&mut self, base: &Path) {
        for file in &mut self.signing_certificate_files {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }

    /// Applies `WSFED_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies `WSFED_*` overrides using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable cannot be parsed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("WSFED_IDP_URL") {
            self.identity_provider_url = v;
        }
        if let Some(v) = lookup("WSFED_IDP_IDENTIFIER") {
            self.identity_provider_identifier = v;
        }
        if let Some(v) = lookup("WSFED_SIGNING_CERTIFICATES") {
            self.signing_certificate_files = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
        }
        if let Some(v) = lookup("WSFED_RELYING_PARTY") {
            self.relying_party_identifier = v;
        }
        if let Some(v) = lookup("WSFED_IDENTITY_ATTRIBUTE") {
            self.identity_attribute = v;
        }
        if let Some(v) = lookup("WSFED_TOLERANCE_MS") {
            self.tolerance_ms = v.trim().parse().map_err(|e| Error::InvalidValue {
                key: "tolerance_ms",
                reason: format!("{v:?}: {e}"),
            })?;
        }
        if let Some(v) = lookup("WSFED_ENFORCE_NOT_BEFORE") {
            self.enforce_not_before = parse_flag("enforce_not_before", &v)?;
        }
        if let Some(v) = lookup("WSFED_ALLOW_SHA1") {
            self.allow_sha1 = parse_flag("allow_sha1", &v)?;
        }
        Ok(())
    }

    /// Checks that every required value is present.
    ///
    /// # Errors
    ///
    /// Returns the first missing or invalid value.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("identity_provider_url", &self.identity_provider_url),
            ("identity_provider_identifier", &self.identity_provider_identifier),
            ("relying_party_identifier", &self.relying_party_identifier),
            ("identity_attribute", &self.identity_attribute),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Missing(key));
            }
        }

        if self.signing_certificate_files.is_empty() {
            return Err(Error::Missing("signing_certificate_files"));
        }

        if self.allow_sha1 {
            tracing::warn!("legacy SHA-1 signatures are accepted");
        }
        Ok(())
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidValue {
            key,
            reason: format!("{value:?} is not a boolean"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
identity_provider_url = "https://login.example.edu/adfs/ls/"
identity_provider_identifier = "http://login.example.edu/adfs/services/trust"
signing_certificate_files = ["certs/primary.pem", "/etc/wsfed/rollover.der"]
relying_party_identifier = "urn:federation:Ewucas"
identity_attribute = "upn"
"#;

    #[test]
    fn defaults_apply_to_optional_keys() {
        let config = FederationConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.tolerance_ms, DEFAULT_TOLERANCE_MS);
        assert!(!config.enforce_not_before);
        assert!(!config.allow_sha1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn relative_certificate_paths_follow_the_config_dir() {
        let mut config = FederationConfig::from_toml_str(SAMPLE).unwrap();
        config.resolve_relative_paths(Path::new("/srv/wsfed"));
        assert_eq!(
            config.signing_certificate_files,
            vec![
                PathBuf::from("/srv/wsfed/certs/primary.pem"),
                PathBuf::from("/etc/wsfed/rollover.der"),
            ]
        );
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [
            ("WSFED_RELYING_PARTY", "urn:other"),
            ("WSFED_SIGNING_CERTIFICATES", "a.pem, b.pem,"),
            ("WSFED_TOLERANCE_MS", "2000"),
            ("WSFED_ENFORCE_NOT_BEFORE", "yes"),
        ]
        .into_iter()
        .collect();

        let mut config = FederationConfig::from_toml_str(SAMPLE).unwrap();
        config
            .apply_overrides(|k| env.get(k).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.relying_party_identifier, "urn:other");
        assert_eq!(
            config.signing_certificate_files,
            vec![PathBuf::from("a.pem"), PathBuf::from("b.pem")]
        );
        assert_eq!(config.tolerance_ms, 2000);
        assert!(config.enforce_not_before);
        assert_eq!(config.identity_attribute, "upn");
    }

    #[test]
    fn bad_override_values_are_reported() {
        let mut config = FederationConfig::from_toml_str(SAMPLE).unwrap();
        let err = config
            .apply_overrides(|k| (k == "WSFED_TOLERANCE_MS").then(|| "soon".to_string()))
            .unwrap_err();
        assert_eq!(err.key(), Some("tolerance_ms"));

        let err = config
            .apply_overrides(|k| (k == "WSFED_ALLOW_SHA1").then(|| "maybe".to_string()))
            .unwrap_err();
        assert_eq!(err.key(), Some("allow_sha1"));
    }

    #[test]
    fn blank_required_values_fail_validation() {
        let mut config = FederationConfig::from_toml_str(SAMPLE).unwrap();
        config.identity_attribute = "  ".to_string();
        assert!(matches!(config.validate(), Err(Error::Missing("identity_attribute"))));

        let mut config = FederationConfig::from_toml_str(SAMPLE).unwrap();
        config.signing_certificate_files.clear();
        assert!(matches!(
            config.validate(),
            Err(Error::Missing("signing_certificate_files"))
        ));
    }

    #[test]
    fn missing_required_key_is_a_parse_error() {
        let result = FederationConfig::from_toml_str("identity_attribute = \"upn\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn unreadable_file_reports_path() {
        let err = FederationConfig::from_file("/nonexistent/federation.toml").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/federation.toml"));
    }
}
