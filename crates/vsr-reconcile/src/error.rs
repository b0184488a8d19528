//! Reconciliation error taxonomy.

use vsr_vmware::VmwareError;

/// Fatal reconciliation errors. Non-fatal outcomes (disconnected host,
/// already in desired state) are reported as results, not errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReconcileError {
    /// Targets could not be resolved; nothing was mutated.
    #[error("{0}")]
    Resolution(String),

    /// The service rejected a mutation. The message carries its native text.
    #[error("{0}")]
    ServiceFault(String),

    /// A read against the directory failed.
    #[error("{}", .0.message)]
    Directory(#[from] VmwareError),
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_errors_render_native_message_only() {
        let e: ReconcileError = VmwareError::auth("Cannot complete login due to an incorrect user name or password.").into();
        assert_eq!(e.to_string(), "Cannot complete login due to an incorrect user name or password.");
    }
}
