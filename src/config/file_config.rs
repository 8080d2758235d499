use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_path: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub session_retention_days: Option<u64>,
    pub prune_interval_hours: Option<u64>,

    pub listing: Option<ListingConfig>,
    pub accounts: Option<AccountsConfig>,
    pub import: Option<ImportConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ListingConfig {
    pub default_page_size: Option<u64>,
    /// Count a trailing partial page in `total_pages`.
    pub round_up_partial_pages: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct AccountsConfig {
    pub allow_registration: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ImportConfig {
    /// Upload size limit, e.g. "2 MiB" or "500000".
    pub max_upload_size: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_nested_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
db_path = "/data/artists.db"
port = 8080

[listing]
default_page_size = 20
round_up_partial_pages = true

[accounts]
allow_registration = false

[import]
max_upload_size = "5 MiB"
"#,
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.db_path.as_deref(), Some("/data/artists.db"));
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.host, None);

        let listing = config.listing.unwrap();
        assert_eq!(listing.default_page_size, Some(20));
        assert_eq!(listing.round_up_partial_pages, Some(true));
        assert_eq!(config.accounts.unwrap().allow_registration, Some(false));
        assert_eq!(
            config.import.unwrap().max_upload_size.as_deref(),
            Some("5 MiB")
        );
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();
        let err = FileConfig::load(&path).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = FileConfig::load(Path::new("/nonexistent/config.toml"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("Failed to read config file"));
    }
}
