use super::RequestsLoggingLevel;
use crate::pagination::PageCountMode;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub frontend_dir_path: Option<String>,
    /// Used when a list request has no `limit`.
    pub default_page_size: u64,
    pub page_count_mode: PageCountMode,
    /// If false, the registration page redirects to login.
    pub allow_registration: bool,
    pub max_import_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            frontend_dir_path: None,
            default_page_size: 1,
            page_count_mode: PageCountMode::Truncate,
            allow_registration: true,
            max_import_bytes: 2 * 1024 * 1024,
        }
    }
}
