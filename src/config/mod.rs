mod file_config;

pub use file_config::{AccountsConfig, FileConfig, ImportConfig, ListingConfig};

use crate::pagination::PageCountMode;
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_MAX_IMPORT_BYTES: u64 = 2 * 1024 * 1024;
pub const MAX_PRUNE_INTERVAL_HOURS: u64 = 24 * 365;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub default_page_size: u64,
    pub round_up_partial_pages: bool,
    pub allow_registration: bool,
    pub max_import_bytes: u64,
    pub session_retention_days: u64,
    pub prune_interval_hours: u64,
    pub frontend_dir_path: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            db_path: None,
            host: "127.0.0.1".to_string(),
            port: 3001,
            logging_level: RequestsLoggingLevel::Path,
            default_page_size: 1,
            round_up_partial_pages: false,
            allow_registration: true,
            max_import_bytes: DEFAULT_MAX_IMPORT_BYTES,
            session_retention_days: 30,
            prune_interval_hours: 24,
            frontend_dir_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub default_page_size: u64,
    pub page_count_mode: PageCountMode,
    pub allow_registration: bool,
    pub max_import_bytes: u64,
    pub session_retention_days: u64,
    pub prune_interval_hours: u64,
    pub frontend_dir_path: Option<String>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| anyhow!("db_path must be specified via --db-path or in config file"))?;

        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let host = file.host.unwrap_or_else(|| cli.host.clone());
        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let listing = file.listing.unwrap_or_default();
        let default_page_size = listing.default_page_size.unwrap_or(cli.default_page_size);
        if default_page_size == 0 {
            bail!("default_page_size must be greater than zero");
        }
        let page_count_mode = if listing
            .round_up_partial_pages
            .unwrap_or(cli.round_up_partial_pages)
        {
            PageCountMode::RoundUp
        } else {
            PageCountMode::Truncate
        };

        let allow_registration = file
            .accounts
            .and_then(|a| a.allow_registration)
            .unwrap_or(cli.allow_registration);

        let max_import_bytes = match file.import.and_then(|i| i.max_upload_size) {
            Some(size) => parse_byte_size(&size)?,
            None => cli.max_import_bytes,
        };

        let session_retention_days = file
            .session_retention_days
            .unwrap_or(cli.session_retention_days);
        let prune_interval_hours = file
            .prune_interval_hours
            .unwrap_or(cli.prune_interval_hours);
        if session_retention_days > 0 && prune_interval_hours == 0 {
            bail!("prune_interval_hours must be greater than zero when pruning is enabled");
        }
        if prune_interval_hours > MAX_PRUNE_INTERVAL_HOURS {
            bail!(
                "prune_interval_hours must be at most {} (one year)",
                MAX_PRUNE_INTERVAL_HOURS
            );
        }

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        Ok(Self {
            db_path,
            host,
            port,
            logging_level,
            default_page_size,
            page_count_mode,
            allow_registration,
            max_import_bytes,
            session_retention_days,
            prune_interval_hours,
            frontend_dir_path,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            frontend_dir_path: self.frontend_dir_path.clone(),
            default_page_size: self.default_page_size,
            page_count_mode: self.page_count_mode,
            allow_registration: self.allow_registration,
            max_import_bytes: usize::try_from(self.max_import_bytes).unwrap_or(usize::MAX),
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

/// Parses sizes like "2 MiB", "500KB" or "1048576".
pub fn parse_byte_size(s: &str) -> Result<u64> {
    byte_unit::Byte::parse_str(s, true)
        .map(|b| b.as_u64())
        .map_err(|err| anyhow!("Invalid size '{}': {}", s, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli_with_db(temp_dir: &TempDir) -> CliConfig {
        CliConfig {
            db_path: Some(temp_dir.path().join("artists.db")),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("headers"),
            Some(RequestsLoggingLevel::Headers)
        ));
        // Case insensitive
        assert!(matches!(
            parse_logging_level("BODY"),
            Some(RequestsLoggingLevel::Body)
        ));
        assert!(parse_logging_level("invalid").is_none());
    }

    #[test]
    fn test_parse_byte_size() {
        assert_eq!(parse_byte_size("2 MiB").unwrap(), 2 * 1024 * 1024);
        assert_eq!(parse_byte_size("1000").unwrap(), 1000);
        assert_eq!(parse_byte_size("1kb").unwrap(), 1000);
        assert!(parse_byte_size("lots").is_err());
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
            logging_level: RequestsLoggingLevel::Headers,
            default_page_size: 10,
            round_up_partial_pages: true,
            allow_registration: false,
            session_retention_days: 7,
            prune_interval_hours: 6,
            frontend_dir_path: Some("/frontend".to_string()),
            ..cli_with_db(&temp_dir)
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_path, temp_dir.path().join("artists.db"));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Headers);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.page_count_mode, PageCountMode::RoundUp);
        assert!(!config.allow_registration);
        assert_eq!(config.max_import_bytes, DEFAULT_MAX_IMPORT_BYTES);
        assert_eq!(config.session_retention_days, 7);
        assert_eq!(config.prune_interval_hours, 6);
        assert_eq!(config.frontend_dir_path, Some("/frontend".to_string()));
    }

    #[test]
    fn test_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(&cli_with_db(&temp_dir), None).unwrap();
        assert_eq!(config.default_page_size, 1);
        assert_eq!(config.page_count_mode, PageCountMode::Truncate);
        assert!(config.allow_registration);
        assert_eq!(config.session_retention_days, 30);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_path: Some(PathBuf::from("/should/be/overridden.db")),
            port: 3001,
            logging_level: RequestsLoggingLevel::Path,
            session_retention_days: 10,
            ..Default::default()
        };

        let file_config = FileConfig {
            db_path: Some(
                temp_dir
                    .path()
                    .join("from_toml.db")
                    .to_string_lossy()
                    .to_string(),
            ),
            port: Some(4000),
            logging_level: Some("body".to_string()),
            listing: Some(ListingConfig {
                default_page_size: Some(25),
                round_up_partial_pages: None,
            }),
            accounts: Some(AccountsConfig {
                allow_registration: Some(false),
            }),
            import: Some(ImportConfig {
                max_upload_size: Some("1 KiB".to_string()),
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(config.db_path, temp_dir.path().join("from_toml.db"));
        assert_eq!(config.port, 4000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Body);
        assert_eq!(config.default_page_size, 25);
        assert!(!config.allow_registration);
        assert_eq!(config.max_import_bytes, 1024);
        // CLI value used when TOML doesn't specify
        assert_eq!(config.session_retention_days, 10);
        assert_eq!(config.page_count_mode, PageCountMode::Truncate);
    }

    #[test]
    fn test_resolve_missing_db_path_error() {
        let result = AppConfig::resolve(&CliConfig::default(), None);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("db_path must be specified"));
    }

    #[test]
    fn test_resolve_nonexistent_db_dir_error() {
        let cli = CliConfig {
            db_path: Some(PathBuf::from("/nonexistent/path/artists.db")),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_db_path_is_directory_error() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_path: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.unwrap_err().to_string().contains("is a directory"));
    }

    #[test]
    fn test_resolve_zero_page_size_error() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            default_page_size: 0,
            ..cli_with_db(&temp_dir)
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_pruning_disabled_allows_zero_interval() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            session_retention_days: 0,
            prune_interval_hours: 0,
            ..cli_with_db(&temp_dir)
        };
        assert!(AppConfig::resolve(&cli, None).is_ok());

        let cli = CliConfig {
            prune_interval_hours: 0,
            ..cli_with_db(&temp_dir)
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_prune_interval_is_capped() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            prune_interval_hours: MAX_PRUNE_INTERVAL_HOURS,
            ..cli_with_db(&temp_dir)
        };
        assert!(AppConfig::resolve(&cli, None).is_ok());

        let cli = CliConfig {
            prune_interval_hours: u64::MAX,
            ..cli_with_db(&temp_dir)
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_server_config_subset() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(&cli_with_db(&temp_dir), None).unwrap();
        let server_config = config.server_config();
        assert_eq!(server_config.port, config.port);
        assert_eq!(server_config.default_page_size, 1);
        assert_eq!(server_config.max_import_bytes, 2 * 1024 * 1024);
    }
}
