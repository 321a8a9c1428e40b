/// Failures talking to the issue store.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LinearError {
    #[error("network error: {0}")]
    Network(String),

    #[error("Linear API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("GraphQL query failed: {}", .0.join("; "))]
    Graphql(Vec<String>),
}

impl LinearError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Http { .. } => "http",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Graphql(_) => "graphql",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphql_errors_are_joined() {
        let err = LinearError::Graphql(vec!["Entity not found".into(), "rate limited".into()]);
        assert_eq!(
            err.to_string(),
            "GraphQL query failed: Entity not found; rate limited"
        );
    }

    #[test]
    fn error_kind_strings() {
        assert_eq!(LinearError::Network("reset".into()).error_kind(), "network");
        assert_eq!(
            LinearError::Http { status: 502, body: String::new() }.error_kind(),
            "http"
        );
        assert_eq!(LinearError::InvalidResponse("x".into()).error_kind(), "invalid_response");
    }
}
