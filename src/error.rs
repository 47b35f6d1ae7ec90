use std::path::PathBuf;
use thiserror::Error;

/// A request to the simplification service failed.
///
/// All variants are the same failure from the user's point of view: the
/// session renders them as `Error: <description>` and carries on. The variants
/// only exist so the description says where things went wrong.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// A TCP-level connection could not be established or the body could not
    /// be read.
    #[error("connection failed to {url}: {detail}")]
    Connect { url: String, detail: String },

    /// The service replied with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The body was not the JSON shape we expected.
    #[error("could not parse response from {url}: {detail}")]
    Decode { url: String, detail: String },
}

/// Problems loading or validating the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Errors that stop the binary before a session runs.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("no input text provided")]
    EmptyInput,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
