use thiserror::Error;

/// All errors that can occur in PassVault.
///
/// The first five variants are the taxonomy callers see from the service
/// layer. `Process` keeps its detail for logs and `Debug` output only; its
/// `Display` never leaks internals.
#[derive(Debug, Error)]
pub enum PassVaultError {
    // --- Caller-facing taxonomy ---
    #[error("Request error: {0}")]
    Request(String),

    #[error("Invalid credential")]
    Unauthorized,

    #[error("Access denied")]
    AccessDenied,

    #[error("Data exists: {0}")]
    DataExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Process error")]
    Process(String),

    // --- Ambient errors ---
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl PassVaultError {
    /// Short uppercase code for the error kind, as surfaced to API callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Request(_) => "REQUEST_ERROR",
            Self::Unauthorized => "CREDENTIAL_ERROR",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::DataExists(_) => "DATA_EXISTS",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Process(_) | Self::Io(_) => "PROCESS_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::CommandFailed(_) => "COMMAND_FAILED",
        }
    }

    /// Build a `Process` error and log its detail.
    ///
    /// Every internal fault funnels through here so the detail lands in
    /// the log exactly once and never reaches the caller.
    pub(crate) fn process(context: &str, detail: impl std::fmt::Display) -> Self {
        tracing::error!(context, error = %detail, "internal fault");
        Self::Process(format!("{context}: {detail}"))
    }
}

/// Convenience type alias for PassVault results.
pub type Result<T> = std::result::Result<T, PassVaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_display_hides_detail() {
        let err = PassVaultError::process("vault store", "connection refused on 10.0.0.4");
        assert_eq!(err.to_string(), "Process error");
        assert!(format!("{err:?}").contains("connection refused"));
        assert_eq!(err.code(), "PROCESS_ERROR");
    }

    #[test]
    fn access_denied_has_no_detail() {
        assert_eq!(PassVaultError::AccessDenied.to_string(), "Access denied");
        assert_eq!(PassVaultError::AccessDenied.code(), "ACCESS_DENIED");
    }
}
