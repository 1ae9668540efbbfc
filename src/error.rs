use rdkafka::error::KafkaError;
use rdkafka::types::RDKafkaErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("Consumer error: {0}")]
    Consumer(String),

    #[error("Decompression error: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error reports a partition leader that is momentarily
    /// unknown or unavailable. These self-resolve once the cluster settles,
    /// so the fetch loop retries them instead of surfacing them.
    pub fn is_transient_topology(&self) -> bool {
        match self {
            Error::Kafka(e) => matches!(
                e.rdkafka_error_code(),
                Some(RDKafkaErrorCode::LeaderNotAvailable)
            ),
            _ => false,
        }
    }
}
