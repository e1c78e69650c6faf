pub type RouteResult<T> = Result<T, RouteError>;

#[derive(thiserror::Error, Debug)]
pub enum RouteError {
    #[error("usage error: {0}")]
    Usage(String),

    #[error("document format error: {0}")]
    Format(String),

    #[error("consistency error: {0}")]
    Consistency(String),

    #[error("length mismatch: {table} declares {declared} entries but {actual} were extracted")]
    LengthMismatch {
        table: &'static str,
        declared: usize,
        actual: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RouteError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::Consistency(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
