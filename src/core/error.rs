use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unknown planet: {0}")]
    UnknownPlanet(String),

    #[error("Unknown city: {0}")]
    UnknownCity(String),

    #[error("Unknown citizen: {0}")]
    UnknownCitizen(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
