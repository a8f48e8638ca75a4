use anyhow::{Context, Result};
use extrato_core::BankSelection;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "extrato.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub import: ImportSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    /// `AUTO` or a bank code such as `NUBANK_CSV`.
    pub default_bank: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub pretty: bool,
    /// Append the signed-amount view to the report.
    pub normalized: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            import: ImportSection::default(),
            output: OutputSection::default(),
        }
    }
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            default_bank: BankSelection::Auto.to_string(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            pretty: true,
            normalized: false,
        }
    }
}

impl AppConfig {
    /// An explicit path must exist; otherwise `./extrato.toml` is read when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_toml(&s).with_context(|| format!("parse {}", path.display()))
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(s)?;
        cfg.default_selection()?;
        Ok(cfg)
    }

    pub fn default_selection(&self) -> Result<BankSelection> {
        self.import
            .default_bank
            .parse()
            .context("invalid import.default_bank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extrato_core::BankCode;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.log_filter, "info");
        assert!(cfg.output.pretty);
        assert!(!cfg.output.normalized);
        assert_eq!(cfg.default_selection().unwrap(), BankSelection::Auto);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AppConfig::from_toml("[import]\ndefault_bank = \"nubank_csv\"\n[output]\nnormalized = true\n").unwrap();
        assert_eq!(cfg.default_selection().unwrap(), BankSelection::Bank(BankCode::NubankCsv));
        assert!(cfg.output.normalized);
        assert!(cfg.output.pretty);
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn unknown_bank_is_rejected() {
        let err = AppConfig::from_toml("[import]\ndefault_bank = \"ITAU_CSV\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("ITAU_CSV"));
    }

    #[test]
    fn loads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "log_filter = \"debug\"\n[output]\npretty = false\n").unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.log_filter, "debug");
        assert!(!cfg.output.pretty);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(AppConfig::from_toml("log_filter = ").is_err());
    }
}
