use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod codes;
pub mod helpers;

pub use codes::{describe_error_code, ErrorCode};
pub use helpers::{common, ErrorExt};

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The unified error type for every pipeline stage
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("[E{code:04}] Not found: {message}")]
    NotFound {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Parse error: {message}")]
    Parse {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Schema error: {message}")]
    Schema {
        code: u16,
        message: String,
        field: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Invalid argument: {message}")]
    InvalidArgument {
        code: u16,
        message: String,
        argument: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] I/O error: {message}")]
    Io {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Hand-off error: {message}")]
    HandOff {
        code: u16,
        message: String,
        key: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl PipelineError {
    /// Create a not-found error for a source path
    pub fn not_found(code: u16, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::NotFound {
            code,
            message: format!("{} does not exist", path.display()),
            path: Some(path.to_path_buf()),
            source: None,
        }
    }

    /// Create a parse error with specific code
    pub fn parse_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Parse {
            code,
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create a schema error with specific code and field
    pub fn schema(code: u16, message: impl Into<String>, field: Option<String>) -> Self {
        Self::Schema {
            code,
            message: message.into(),
            field,
            source: None,
        }
    }

    /// Create an invalid argument error for the named argument
    pub fn invalid_argument(
        code: u16,
        message: impl Into<String>,
        argument: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            code,
            message: message.into(),
            argument: Some(argument.into()),
            source: None,
        }
    }

    /// Create an I/O error with specific code
    pub fn io(code: u16, message: impl Into<String>) -> Self {
        Self::Io {
            code,
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create a hand-off error with specific code and key
    pub fn handoff(code: u16, message: impl Into<String>, key: Option<String>) -> Self {
        Self::HandOff {
            code,
            message: message.into(),
            key,
            source: None,
        }
    }

    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        match &mut self {
            Self::NotFound { source: src, .. }
            | Self::Parse { source: src, .. }
            | Self::Schema { source: src, .. }
            | Self::InvalidArgument { source: src, .. }
            | Self::Io { source: src, .. }
            | Self::HandOff { source: src, .. }
            | Self::Config { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Attach the file the error relates to, where the variant tracks one
    pub fn with_path(mut self, new_path: impl AsRef<Path>) -> Self {
        match &mut self {
            Self::NotFound { path, .. }
            | Self::Parse { path, .. }
            | Self::Io { path, .. }
            | Self::Config { path, .. } => {
                *path = Some(new_path.as_ref().to_path_buf());
            }
            Self::Schema { .. } | Self::InvalidArgument { .. } | Self::HandOff { .. } => {}
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::NotFound { message, .. }
            | Self::Parse { message, .. }
            | Self::Schema { message, .. }
            | Self::InvalidArgument { message, .. }
            | Self::Io { message, .. }
            | Self::HandOff { message, .. }
            | Self::Config { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => 2,
            Self::Parse { .. } => 3,
            Self::Schema { .. } => 4,
            Self::InvalidArgument { .. } => 5,
            Self::Io { .. } => 6,
            Self::HandOff { .. } => 7,
            Self::Config { .. } => 8,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::NotFound { code, .. }
            | Self::Parse { code, .. }
            | Self::Schema { code, .. }
            | Self::InvalidArgument { code, .. }
            | Self::Io { code, .. }
            | Self::HandOff { code, .. }
            | Self::Config { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { message, .. } => format!("Source not found: {}", message),
            Self::Parse { message, path, .. } => match path {
                Some(p) => format!("Could not parse {}: {}", p.display(), message),
                None => format!("Could not parse input: {}", message),
            },
            Self::Schema { message, field, .. } => match field {
                Some(f) => format!("Schema error for '{}': {}", f, message),
                None => format!("Schema error: {}", message),
            },
            Self::InvalidArgument {
                message, argument, ..
            } => match argument {
                Some(a) => format!("Invalid value for '{}': {}", a, message),
                None => format!("Invalid argument: {}", message),
            },
            Self::Io { message, path, .. } => match path {
                Some(p) => format!("I/O error at {}: {}", p.display(), message),
                None => format!("I/O error: {}", message),
            },
            Self::HandOff { message, key, .. } => match key {
                Some(k) => format!("Hand-off key '{}': {}", k, message),
                None => format!("Hand-off error: {}", message),
            },
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
        }
    }

    /// Get a developer-friendly error message with full chain
    pub fn developer_message(&self) -> String {
        use std::error::Error as _;

        let mut msg = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            msg.push_str(&format!("\n  caused by: {}", err));
            source = err.source();
        }
        msg
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Type alias for Results using PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<serde_yaml::Error> for PipelineError {
    fn from(err: serde_yaml::Error) -> Self {
        PipelineError::config_with_code(ErrorCode::CONFIG_INVALID_YAML, "Invalid YAML syntax")
            .with_source(err)
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        let (code, what) = match err.kind() {
            csv::ErrorKind::Deserialize { .. } => (ErrorCode::PARSE_INVALID_FIELD, "invalid field"),
            _ => (ErrorCode::PARSE_CSV, "malformed CSV"),
        };
        let message = match err.position() {
            Some(pos) => format!("{} near line {}", what, pos.line()),
            None => what.to_string(),
        };
        PipelineError::parse_with_code(code, message).with_source(err)
    }
}
