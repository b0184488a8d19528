//! Application-level errors (everything that is not a reconciliation result).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad command line.
    #[error("{0}")]
    Usage(String),

    /// Module arguments failed validation.
    #[error("{0}")]
    Params(String),

    /// Connection settings missing or unreadable.
    #[error("{0}")]
    Config(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) | Self::Params(_) | Self::Config(_) => 2,
            Self::Io { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_and_params_exit_with_two() {
        assert_eq!(AppError::Usage("x".into()).exit_code(), 2);
        assert_eq!(AppError::Params("x".into()).exit_code(), 2);
        let io = AppError::io("/nope/args.yaml", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(io.exit_code(), 1);
        assert!(io.to_string().starts_with("Failed to read /nope/args.yaml"));
    }
}
