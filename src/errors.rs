//! Failure taxonomy shared across the crate.
//!
//! An empty call graph is deliberately not an error: callers detect it with
//! [`crate::revision::RevisionCallGraph::is_call_graph_empty`] and decide
//! whether to emit output.

use thiserror::Error;

/// Errors produced while resolving, downloading, or translating an artifact.
#[derive(Error, Debug)]
pub enum CgError {
    /// The POM or JAR was absent from every configured repository.
    #[error("{what} not found for {coordinate} in any configured repository")]
    NotFound { what: &'static str, coordinate: String },

    /// Unparseable coordinate string, batch line, URI, or POM document.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The external analyzer reported an unrecoverable construction error.
    #[error("call graph construction failed: {0}")]
    AnalysisFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CgError {
    /// Short tag used by the batch summary to group failures by kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CgError::NotFound { .. } => "NotFound",
            CgError::MalformedInput(_) => "MalformedInput",
            CgError::AnalysisFailure(_) => "AnalysisFailure",
            CgError::Io(_) => "Io",
            CgError::Json(_) => "Json",
        }
    }
}

pub type CgResult<T> = Result<T, CgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        let err = CgError::NotFound {
            what: "JAR",
            coordinate: "g:a:1.0".to_string(),
        };
        assert_eq!(err.kind(), "NotFound");
        assert_eq!(
            err.to_string(),
            "JAR not found for g:a:1.0 in any configured repository"
        );

        assert_eq!(CgError::MalformedInput("x".into()).kind(), "MalformedInput");
        assert_eq!(CgError::AnalysisFailure("x".into()).kind(), "AnalysisFailure");
    }
}
