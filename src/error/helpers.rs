use super::{ErrorCode, PipelineError};
use std::path::Path;

/// Extension trait for convenient error conversion
pub trait ErrorExt<T> {
    /// Convert to a parse error with the given message
    fn to_parse_error(self, code: u16, message: impl Into<String>) -> Result<T, PipelineError>;

    /// Convert to an I/O error tied to a path
    fn to_io_error(
        self,
        code: u16,
        message: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<T, PipelineError>;

    /// Convert to a hand-off error
    fn to_handoff_error(self, message: impl Into<String>) -> Result<T, PipelineError>;
}

impl<T, E> ErrorExt<T> for Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn to_parse_error(self, code: u16, message: impl Into<String>) -> Result<T, PipelineError> {
        self.map_err(|e| PipelineError::parse_with_code(code, message).with_source(e))
    }

    fn to_io_error(
        self,
        code: u16,
        message: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<T, PipelineError> {
        self.map_err(|e| {
            PipelineError::io(code, message)
                .with_path(path)
                .with_source(e)
        })
    }

    fn to_handoff_error(self, message: impl Into<String>) -> Result<T, PipelineError> {
        self.map_err(|e| {
            PipelineError::handoff(ErrorCode::HANDOFF_GENERIC, message, None).with_source(e)
        })
    }
}

/// Helper functions for common error scenarios
pub mod common {
    use super::*;

    /// Map a failed source read to `NotFound` when the file is absent, `Io` otherwise
    pub fn source_read_failed(
        err: std::io::Error,
        path: impl AsRef<Path>,
        not_found_code: u16,
    ) -> PipelineError {
        let path = path.as_ref();
        match err.kind() {
            std::io::ErrorKind::NotFound => {
                PipelineError::not_found(not_found_code, path).with_source(err)
            }
            std::io::ErrorKind::PermissionDenied => {
                PipelineError::io(ErrorCode::IO_PERMISSION_DENIED, "Permission denied")
                    .with_path(path)
                    .with_source(err)
            }
            _ => PipelineError::io(ErrorCode::IO_READ_FAILED, "Failed to read file")
                .with_path(path)
                .with_source(err),
        }
    }

    /// Create an error for a hand-off key no upstream stage has produced
    pub fn handoff_key_missing(key: &str) -> PipelineError {
        PipelineError::handoff(
            ErrorCode::HANDOFF_KEY_MISSING,
            format!("no value has been handed off under '{}'", key),
            Some(key.to_string()),
        )
    }

    /// Create a schema error for a missing nested field
    pub fn missing_field(field: &str, context: impl std::fmt::Display) -> PipelineError {
        PipelineError::schema(
            ErrorCode::SCHEMA_MISSING_FIELD,
            format!("'{}' is missing in {}", field, context),
            Some(field.to_string()),
        )
    }

    /// Create a parse error for a table lacking a required column
    pub fn missing_column(column: &str) -> PipelineError {
        PipelineError::parse_with_code(
            ErrorCode::PARSE_MISSING_COLUMN,
            format!("required column '{}' is missing", column),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_extension_trait() {
        let io_result: Result<(), std::io::Error> =
            Err(std::io::Error::other("disk full"));

        let err = io_result
            .to_io_error(ErrorCode::IO_WRITE_FAILED, "Failed to write", "/tmp/x.csv")
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::IO_WRITE_FAILED);
        assert!(err.user_message().contains("/tmp/x.csv"));
    }

    #[test]
    fn test_source_read_failed_maps_not_found() {
        let err = common::source_read_failed(
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            "/data/videos.csv",
            ErrorCode::NOT_FOUND_VIDEO_TABLE,
        );
        assert!(err.is_not_found());
        assert_eq!(err.code(), ErrorCode::NOT_FOUND_VIDEO_TABLE);

        let err = common::source_read_failed(
            std::io::Error::other("boom"),
            "/data/videos.csv",
            ErrorCode::NOT_FOUND_VIDEO_TABLE,
        );
        assert_eq!(err.code(), ErrorCode::IO_READ_FAILED);
    }

    #[test]
    fn test_common_error_helpers() {
        let err = common::handoff_key_missing("videos_data");
        assert_eq!(err.code(), ErrorCode::HANDOFF_KEY_MISSING);
        assert!(err.user_message().contains("videos_data"));

        let err = common::missing_field("snippet.title", "item 3");
        assert_eq!(err.code(), ErrorCode::SCHEMA_MISSING_FIELD);
    }
}
