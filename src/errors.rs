use thiserror::Error;

#[derive(Error, Debug)]
#[error("ConfigError: {0}")]
pub struct ConfigError(pub String);
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self { ConfigError(e.to_string()) }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self { ConfigError(e.to_string()) }
}
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self { ConfigError(e.to_string()) }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("StorageError::Io: {0}")]
    Io(#[from] std::io::Error),
    #[error("StorageError::Pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("StorageError::Glob: {0}")]
    Glob(#[from] glob::GlobError),
    #[error("StorageError::Document: {0}")]
    Document(#[from] csv::Error),
    #[error("StorageError::Json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by a weather collector for a single lap.
///
/// `Collection` and `Record` only concern the lap being collected and the
/// lap is retried on the next cycle, the others are structural.
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("CollectorError::Collection: {0}")]
    Collection(String),
    #[error("CollectorError::Record: {0}")]
    Record(String),
    #[error("CollectorError::InvalidLapDuration: invalid laps duration: {0}")]
    InvalidLapDuration(u32),
    #[error("CollectorError::Storage: {0}")]
    Storage(#[from] StorageError),
}

impl CollectorError {
    /// Returns true if the error only affects the lap being collected
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CollectorError::Collection(_) | CollectorError::Record(_))
    }
}

impl From<ureq::Error> for CollectorError {
    fn from(e: ureq::Error) -> Self {
        CollectorError::Collection(format!("http request error: {}", e))
    }
}
impl From<csv::Error> for CollectorError {
    fn from(e: csv::Error) -> Self {
        CollectorError::Collection(format!("csv document error: {}", e))
    }
}

#[derive(Error, Debug)]
pub enum CycleError {
    #[error("CycleError::Storage: {0}")]
    Storage(#[from] StorageError),
    #[error("CycleError::Collector: {0}")]
    Collector(#[from] CollectorError),
}

#[derive(Error, Debug)]
#[error("LoggingError: {0}")]
pub struct LoggingError(pub String);
impl From<log::SetLoggerError> for LoggingError {
    fn from(e: log::SetLoggerError) -> Self { LoggingError(e.to_string()) }
}
impl From<log4rs::config::runtime::ConfigErrors> for LoggingError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self { LoggingError(e.to_string()) }
}
impl From<std::io::Error> for LoggingError {
    fn from(e: std::io::Error) -> Self { LoggingError(e.to_string()) }
}
