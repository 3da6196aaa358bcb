use thiserror::Error;

/// Klassifizierte Storage-Fehler über alle Backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("table or object not found: {0}")]
    NotFound(String),

    #[error("access denied for {0}")]
    AccessDenied(String),

    #[error("request throttled by backend")]
    Throttled,

    #[error("network error: {0}")]
    Network(String),

    #[error("stored item is invalid: {0}")]
    InvalidItem(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Nur transiente Fehler lohnen einen Retry; Berechtigungs- und
    /// Datenfehler schlagen sofort durch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Throttled | StorageError::Network(_))
    }

    /// Nutzerfreundliche Meldung für API-Antworten
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::NotFound(_) => "Requested data was not found.",
            StorageError::AccessDenied(_) => "Storage access was denied. Contact an administrator.",
            StorageError::Throttled | StorageError::Network(_) => {
                "Storage is temporarily unavailable. Please try again."
            }
            StorageError::InvalidItem(_) | StorageError::Serialization(_) => {
                "Stored data has an unexpected format."
            }
            StorageError::Backend(_) => "Storage operation failed. Please try again.",
        }
    }
}

/// Mappe AWS SDK Fehler (DynamoDB und S3) auf [`StorageError`]
pub(crate) fn map_sdk_error<E, R>(err: aws_sdk_dynamodb::error::SdkError<E, R>, context: &str) -> StorageError
where
    E: aws_sdk_dynamodb::error::ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    use aws_sdk_dynamodb::error::SdkError;

    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            StorageError::Network(err.to_string())
        }
        SdkError::ServiceError(service_err) => match service_err.err().code() {
            Some("ResourceNotFoundException")
            | Some("ConditionalCheckFailedException")
            | Some("NoSuchKey")
            | Some("NoSuchBucket") => StorageError::NotFound(context.to_string()),
            Some("AccessDeniedException")
            | Some("AccessDenied")
            | Some("UnrecognizedClientException")
            | Some("InvalidAccessKeyId")
            | Some("SignatureDoesNotMatch") => StorageError::AccessDenied(context.to_string()),
            Some("ProvisionedThroughputExceededException")
            | Some("ThrottlingException")
            | Some("RequestLimitExceeded")
            | Some("SlowDown") => StorageError::Throttled,
            _ => StorageError::Backend(err.to_string()),
        },
        _ => StorageError::Backend(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(StorageError::Throttled.is_retryable());
        assert!(StorageError::Network("reset".into()).is_retryable());
        assert!(!StorageError::AccessDenied("t".into()).is_retryable());
        assert!(!StorageError::NotFound("t".into()).is_retryable());
        assert!(!StorageError::Backend("x".into()).is_retryable());
    }
}
