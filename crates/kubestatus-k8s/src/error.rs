use std::time::Duration;

/// Failure of a read against the Kubernetes API
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("kubernetes api did not answer within {0:?}")]
    Timeout(Duration),

    #[error("kubernetes api transport failed: {0}")]
    Transport(#[source] kube::Error),

    #[error("kubernetes api rejected the request ({code} {reason}): {message}")]
    Rejected {
        code: u16,
        reason: String,
        message: String,
    },

    #[error("no kubernetes client is configured: {0}")]
    NoClient(String),
}

impl QueryError {
    /// Split API status responses from transport-level failures
    pub fn from_kube(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) => Self::Rejected {
                code: response.code,
                reason: response.reason,
                message: response.message,
            },
            other => Self::Transport(other),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Rejected { code: 404, .. })
    }

    /// Connection-level failures that are worth one more attempt
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(kube::Error::HyperError(_) | kube::Error::Service(_))
        )
    }

    /// The API server was reached and sent back a status
    pub fn answered(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
