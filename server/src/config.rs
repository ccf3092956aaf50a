use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Snapshot file holding every link as a flat JSON object.
    /// Relative paths resolve against the working directory.
    pub links_file: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = non_empty("PORT")
            .unwrap_or_else(|| "80".into())
            .trim()
            .parse::<u16>()
            .context("PORT must be a valid port number (0–65535)")?;

        Ok(Self {
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            links_file: non_empty("LINKS_FILE")
                .unwrap_or_else(|| "links.json".into())
                .into(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
