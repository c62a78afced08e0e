use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("unknown {key} value: {value}")]
    UnknownProvider { key: &'static str, value: String },
}
