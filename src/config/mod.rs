// Configuration management module
// Secrets come from a dotenv file, everything else from an optional TOML file

pub mod secrets;
pub mod settings;


pub use secrets::Secrets;
pub use settings::{
    Config, ConfigError, OpenAiConfig, PineconeConfig, SearchConfig, validate_top_k,
};
