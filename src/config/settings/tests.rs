use super::*;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.pinecone.index_name, "finda");
    assert_eq!(config.pinecone.cloud, "aws");
    assert_eq!(config.pinecone.region, "us-east-1");
    assert_eq!(config.openai.model, "text-embedding-ada-002");
    assert_eq!(config.openai.dimension, 1536);
    assert_eq!(config.chunking.chunk_size, 10_000);
    assert_eq!(config.chunking.chunk_overlap, 0);
    assert_eq!(config.search.top_k, 2);
}

#[test]
fn config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    let mut invalid_config = config.clone();
    invalid_config.pinecone.index_name = "Finda_Index".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidIndexName(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.pinecone.cloud = "digitalocean".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidCloud(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.pinecone.metric = "manhattan".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.pinecone.ready_poll_interval_secs = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.openai.model = "  ".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidModel(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.openai.dimension = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.openai.base_url = "ftp://api.openai.com".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidUrl(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.search.top_k = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTopK(0))
    ));
}

#[test]
fn chunking_validation() {
    let mut config = Config::default();
    config.chunking.chunk_size = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidChunkSize(0))
    ));

    let mut config = Config::default();
    config.chunking.chunk_size = 100;
    config.chunking.chunk_overlap = 100;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidOverlapSize(100, 100))
    ));

    config.chunking.chunk_overlap = 99;
    assert!(config.validate().is_ok());
}

#[test]
fn url_accessors() {
    let config = Config::default();
    let url = config
        .pinecone
        .control_plane_url()
        .expect("should parse control plane url");
    assert_eq!(url.as_str(), "https://api.pinecone.io/");

    let url = config.openai.base_url().expect("should parse base url");
    assert_eq!(url.host_str(), Some("api.openai.com"));
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(config, parsed_config);
}

#[test]
fn partial_toml_uses_defaults() {
    let toml_str = r#"
        [pinecone]
        index_name = "finda-staging"

        [search]
        top_k = 5
    "#;
    let config: Config = toml::from_str(toml_str).expect("should parse partial toml");

    assert_eq!(config.pinecone.index_name, "finda-staging");
    assert_eq!(config.pinecone.region, "us-east-1");
    assert_eq!(config.search.top_k, 5);
    assert_eq!(config.openai, OpenAiConfig::default());
    assert!(config.validate().is_ok());
}

#[test]
fn top_k_bounds() {
    assert!(validate_top_k(1).is_ok());
    assert!(validate_top_k(10_000).is_ok());
    assert!(validate_top_k(0).is_err());
    assert!(validate_top_k(10_001).is_err());
}

#[test]
fn default_settings_path_is_under_home() {
    let Some(home) = dirs::home_dir() else {
        return;
    };

    let path = Config::default_settings_path().expect("home directory is known");
    assert_eq!(path, home.join(".findaso-index").join("config.toml"));
}
