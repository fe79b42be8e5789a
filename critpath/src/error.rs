use thiserror::Error;

use crate::records::RecordId;

/// Structural problems with the input records. Missing ad requests, unresolvable frames and
/// cycles are all expected shapes and are never reported through this type.
#[derive(Error, Debug)]
pub enum InvalidInputError {
    #[error("network record {record} has an empty URL")]
    EmptyUrl { record: RecordId },

    #[error("initiator stack of network record {record} has {depth} chained parents, more than the maximum of {max}")]
    StackTooDeep { record: RecordId, depth: usize, max: usize },

    #[error("maximum stack depth {requested} is above the supported limit of {limit}")]
    StackDepthLimit { requested: usize, limit: usize },

    #[cfg(feature = "serde")]
    #[error("could not decode network records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not read network records: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InvalidInputError>;
