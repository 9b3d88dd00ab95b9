/// Error code registry for tubeflow
///
/// Error codes are organized by category:
/// - 1000-1999: Source not found
/// - 2000-2999: Parse errors
/// - 3000-3999: Schema errors
/// - 4000-4999: Invalid arguments
/// - 5000-5999: I/O errors
/// - 6000-6999: Hand-off errors
/// - 7000-7999: Configuration errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Not found (1000-1999)
    pub const NOT_FOUND_GENERIC: u16 = 1000;
    pub const NOT_FOUND_VIDEO_TABLE: u16 = 1001;
    pub const NOT_FOUND_CATEGORY_DOCUMENT: u16 = 1002;
    pub const NOT_FOUND_ENRICHED_TABLE: u16 = 1003;

    // Parse errors (2000-2999)
    pub const PARSE_GENERIC: u16 = 2000;
    pub const PARSE_CSV: u16 = 2001;
    pub const PARSE_JSON: u16 = 2002;
    pub const PARSE_MISSING_COLUMN: u16 = 2003;
    pub const PARSE_INVALID_FIELD: u16 = 2004;
    pub const PARSE_HANDOFF_PAYLOAD: u16 = 2005;

    // Schema errors (3000-3999)
    pub const SCHEMA_GENERIC: u16 = 3000;
    pub const SCHEMA_MISSING_FIELD: u16 = 3001;
    pub const SCHEMA_INVALID_TYPE: u16 = 3002;
    pub const SCHEMA_MISSING_COLUMN: u16 = 3003;

    // Invalid arguments (4000-4999)
    pub const ARGUMENT_GENERIC: u16 = 4000;
    pub const ARGUMENT_UNSUPPORTED_METRIC: u16 = 4001;
    pub const ARGUMENT_UNSUPPORTED_POLICY: u16 = 4002;
    pub const ARGUMENT_UNKNOWN_KEY: u16 = 4003;

    // I/O errors (5000-5999)
    pub const IO_GENERIC: u16 = 5000;
    pub const IO_READ_FAILED: u16 = 5001;
    pub const IO_WRITE_FAILED: u16 = 5002;
    pub const IO_CREATE_DIR_FAILED: u16 = 5003;
    pub const IO_PERMISSION_DENIED: u16 = 5004;
    pub const IO_RENDER_FAILED: u16 = 5005;

    // Hand-off errors (6000-6999)
    pub const HANDOFF_GENERIC: u16 = 6000;
    pub const HANDOFF_KEY_MISSING: u16 = 6001;
    pub const HANDOFF_STORE_CORRUPTED: u16 = 6002;
    pub const HANDOFF_LOCK_TIMEOUT: u16 = 6003;

    // Configuration errors (7000-7999)
    pub const CONFIG_GENERIC: u16 = 7000;
    pub const CONFIG_NOT_FOUND: u16 = 7001;
    pub const CONFIG_INVALID_YAML: u16 = 7002;
    pub const CONFIG_INVALID_VALUE: u16 = 7003;
    pub const CONFIG_NO_HOME_DIR: u16 = 7004;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        1000 => "Source not found",
        1001 => "Video table not found",
        1002 => "Category document not found",
        1003 => "Enriched table not found",

        2000 => "Generic parse error",
        2001 => "Malformed CSV content",
        2002 => "Malformed JSON content",
        2003 => "Required column is missing",
        2004 => "Field value could not be parsed",
        2005 => "Hand-off payload could not be decoded",

        3000 => "Generic schema error",
        3001 => "Required field is missing",
        3002 => "Field has an unexpected type",
        3003 => "Required column is missing from the table",

        4000 => "Invalid argument",
        4001 => "Unsupported ranking metric",
        4002 => "Unsupported missing-field policy",
        4003 => "Unknown configuration key",

        5000 => "Generic I/O error",
        5001 => "Failed to read file",
        5002 => "Failed to write file",
        5003 => "Failed to create directory",
        5004 => "Permission denied",
        5005 => "Failed to render chart",

        6000 => "Generic hand-off error",
        6001 => "Hand-off key is missing",
        6002 => "Hand-off store is corrupted",
        6003 => "Timed out waiting for the hand-off store lock",

        7000 => "Generic configuration error",
        7001 => "Configuration file not found",
        7002 => "Invalid YAML syntax in configuration",
        7003 => "Invalid value in configuration",
        7004 => "Could not determine home directory",

        _ => "Unknown error code",
    }
}
