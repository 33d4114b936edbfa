// src/config.rs
// =============================================================================
// Runtime settings for the HTTP server.
//
// Values come from command-line flags, each of which falls back to an
// environment variable (see cli.rs). A .env file in the working directory
// is loaded into the environment first.
//
//   HOST                default 0.0.0.0
//   PORT                default 8080
//   CORS_ORIGIN         default http://localhost:5173
//   STATIC_DIR          default public
//   DEFAULT_TIMEOUT_MS  default 4000 (shared with the check subcommand)
// =============================================================================

use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Origin allowed to call the API from a browser
    pub cors_origin: String,
    /// Directory of a built frontend; served only if it exists
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

// Loads .env into the process environment
//
// A missing file is normal (production sets real environment variables);
// any other problem, such as a malformed line, is reported.
pub fn load_dotenv() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(anyhow::anyhow!("failed to load .env: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert_eq!(config.static_dir, PathBuf::from("public"));
    }
}
