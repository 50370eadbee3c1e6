
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::config::settings::ConfigError;

pub const DB_URI_KEY: &str = "DB_URI";
pub const PINECONE_API_KEY: &str = "PINECONE_API_KEY";
pub const OPENAI_KEY: &str = "OPENAI_KEY";

/// Credentials read once at startup and handed to each client.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Secrets {
    pub database_url: String,
    pub pinecone_api_key: String,
    pub openai_api_key: String,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("database_url", &"<redacted>")
            .field("pinecone_api_key", &"<redacted>")
            .field("openai_api_key", &"<redacted>")
            .finish()
    }
}

impl Secrets {
    /// Read a dotenv-style file. The process environment is not consulted.
    #[inline]
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        let env_error = |reason: String| ConfigError::EnvFile {
            path: path.to_path_buf(),
            reason,
        };

        let entries = dotenvy::from_path_iter(path).map_err(|e| env_error(e.to_string()))?;

        let mut values = HashMap::new();
        for entry in entries {
            let (key, value) = entry.map_err(|e| env_error(e.to_string()))?;
            values.insert(key, value);
        }

        debug!("Read {} entries from {}", values.len(), path.display());
        Self::from_values(&values)
    }

    #[inline]
    pub fn from_values(values: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required(values, DB_URI_KEY)?,
            pinecone_api_key: required(values, PINECONE_API_KEY)?,
            openai_api_key: required(values, OPENAI_KEY)?,
        })
    }
}

fn required(values: &HashMap<String, String>, key: &'static str) -> Result<String, ConfigError> {
    values
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::MissingKey(key))
}
