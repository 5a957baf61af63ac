use thiserror::Error;
use tonic::Code;
use txload_core::StoreError;

#[derive(Error, Debug)]
pub enum DgraphError {
    #[error("no dgraph hosts configured")]
    NoHosts,

    #[error("invalid endpoint {endpoint}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("grpc call failed: {0}")]
    Status(#[source] Box<tonic::Status>),

    #[error("failed to encode mutation: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("start timestamp mismatch: txn has {ours}, response has {theirs}")]
    StartTsMismatch { ours: u64, theirs: u64 },

    #[error("response carries no uid for the new record")]
    MissingUid,

    #[error("transaction has been aborted")]
    Aborted,

    #[error("transaction has already been committed or discarded")]
    Finished,
}

impl From<tonic::Status> for DgraphError {
    fn from(status: tonic::Status) -> Self {
        DgraphError::Status(Box::new(status))
    }
}

impl From<DgraphError> for StoreError {
    fn from(err: DgraphError) -> Self {
        match err {
            DgraphError::Status(s) => match s.code() {
                Code::Aborted => StoreError::Aborted,
                Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled => {
                    StoreError::Unavailable(s.message().to_string())
                }
                _ => StoreError::Rejected(format!("{:?}: {}", s.code(), s.message())),
            },
            DgraphError::NoHosts
            | DgraphError::InvalidEndpoint { .. }
            | DgraphError::Connect { .. } => StoreError::Unavailable(err.to_string()),
            DgraphError::Encode(e) => StoreError::Encode(e.to_string()),
            DgraphError::Decode(e) => StoreError::Decode(e.to_string()),
            DgraphError::StartTsMismatch { .. } | DgraphError::MissingUid => {
                StoreError::Rejected(err.to_string())
            }
            DgraphError::Aborted => StoreError::Aborted,
            DgraphError::Finished => StoreError::Finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_store_errors() {
        let aborted: StoreError = DgraphError::from(tonic::Status::aborted("conflict")).into();
        assert!(matches!(aborted, StoreError::Aborted));

        let down: StoreError = DgraphError::from(tonic::Status::unavailable("down")).into();
        assert!(matches!(down, StoreError::Unavailable(m) if m == "down"));

        let bad: StoreError =
            DgraphError::from(tonic::Status::invalid_argument("bad query")).into();
        assert!(matches!(bad, StoreError::Rejected(m) if m.contains("bad query")));
    }

    #[test]
    fn decode_errors_keep_their_kind() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: StoreError = DgraphError::Decode(json_err).into();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
