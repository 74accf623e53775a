//! Filesystem checks around a tool call: input existence and output
//! directory preparation.

use crate::error::OperationError;
use std::io::ErrorKind;
use std::path::Path;

/// Fail with `InputNotFound` unless `path` names an existing entry.
pub async fn check_input_exists(path: &str) -> Result<(), OperationError> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => Ok(()),
        _ => Err(OperationError::InputNotFound(path.to_string())),
    }
}

/// Create `dir` and any missing parents. An existing directory is success.
pub async fn ensure_dir(dir: &Path) -> Result<(), OperationError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    match tokio::fs::create_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(source) => Err(OperationError::OutputPrepFailed {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
