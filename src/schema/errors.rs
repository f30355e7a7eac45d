//! Schema error types
//!
//! Error codes, grouped by when they can occur:
//! - Definition time (FATAL): OEM_DUPLICATE_KEY, OEM_INVALID_SCOPE,
//!   OEM_UNKNOWN_SCOPE, OEM_MOUNT_CONFLICT, OEM_NO_ROOT, OEM_CYCLIC_SCHEMA,
//!   OEM_KEY_REASSIGNED, OEM_PROTOCOL_EXISTS, OEM_MALFORMED_DECLARATION
//! - Encode time (REJECT): OEM_UNKNOWN_FIELD, OEM_SHAPE_MISMATCH
//! - Decode time (WARN): OEM_SHAPE_MISMATCH, reported and skipped

use std::fmt;

use super::types::KeyCode;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Reported, the surrounding operation continues
    Warn,
    /// The call is rejected, caller can fix its input and retry
    Reject,
    /// Schema construction must abort
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warn => write!(f, "WARN"),
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaErrorCode {
    /// Two fields of one scope share a key code (or a name)
    DuplicateKey,
    /// Scope declaration is structurally invalid
    InvalidScope,
    /// Scope referenced before it was defined
    UnknownScope,
    /// Field is already mounted
    MountConflict,
    /// No root scope was defined
    NoRoot,
    /// Mount links form a cycle
    CyclicSchema,
    /// Field is not declared in the scope
    UnknownField,
    /// Value does not have the shape the schema expects
    ShapeMismatch,
    /// A key code changed meaning between two schema revisions
    KeyReassigned,
    /// A kept field changed its mount between two schema revisions
    MountChanged,
    /// Protocol name already registered
    ProtocolExists,
    /// Declaration file could not be read or parsed
    MalformedDeclaration,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::DuplicateKey => "OEM_DUPLICATE_KEY",
            SchemaErrorCode::InvalidScope => "OEM_INVALID_SCOPE",
            SchemaErrorCode::UnknownScope => "OEM_UNKNOWN_SCOPE",
            SchemaErrorCode::MountConflict => "OEM_MOUNT_CONFLICT",
            SchemaErrorCode::NoRoot => "OEM_NO_ROOT",
            SchemaErrorCode::CyclicSchema => "OEM_CYCLIC_SCHEMA",
            SchemaErrorCode::UnknownField => "OEM_UNKNOWN_FIELD",
            SchemaErrorCode::ShapeMismatch => "OEM_SHAPE_MISMATCH",
            SchemaErrorCode::KeyReassigned => "OEM_KEY_REASSIGNED",
            SchemaErrorCode::MountChanged => "OEM_MOUNT_CHANGED",
            SchemaErrorCode::ProtocolExists => "OEM_PROTOCOL_EXISTS",
            SchemaErrorCode::MalformedDeclaration => "OEM_MALFORMED_DECLARATION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::UnknownField => Severity::Reject,
            SchemaErrorCode::ShapeMismatch => Severity::Reject,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Shape failure details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeDetails {
    /// Field path (e.g., "seasons[2].identifiers")
    pub field: String,
    /// Expected shape
    pub expected: String,
    /// Shape actually found
    pub actual: String,
}

impl ShapeDetails {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for ShapeDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': expected {}, got {}", self.field, self.expected, self.actual)
    }
}

/// Schema error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Scope name if applicable
    scope: Option<String>,
    /// Field name if applicable
    field: Option<String>,
    /// Shape details if applicable
    details: Option<ShapeDetails>,
    /// Whether a decode pass downgraded this error to a warning
    lenient: bool,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            scope: None,
            field: None,
            details: None,
            lenient: false,
        }
    }

    fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Create a duplicate key code error
    pub fn duplicate_key(scope: &str, code: KeyCode, existing: &str, field: &str) -> Self {
        Self::new(
            SchemaErrorCode::DuplicateKey,
            format!(
                "Key code {:#04x} in scope '{}' assigned to both '{}' and '{}'",
                code, scope, existing, field
            ),
        )
        .with_scope(scope)
        .with_field(field)
    }

    /// Create a duplicate field name error
    pub fn duplicate_field(scope: &str, field: &str) -> Self {
        Self::new(
            SchemaErrorCode::DuplicateKey,
            format!("Field '{}' declared twice in scope '{}'", field, scope),
        )
        .with_scope(scope)
        .with_field(field)
    }

    /// Create an invalid scope error
    pub fn invalid_scope(scope: &str, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::InvalidScope,
            format!("Invalid scope '{}': {}", scope, reason.into()),
        )
        .with_scope(scope)
    }

    /// Create an unknown scope error
    pub fn unknown_scope(scope: &str) -> Self {
        Self::new(
            SchemaErrorCode::UnknownScope,
            format!("Scope '{}' has not been defined", scope),
        )
        .with_scope(scope)
    }

    /// Create a mount conflict error
    pub fn mount_conflict(scope: &str, field: &str) -> Self {
        Self::new(
            SchemaErrorCode::MountConflict,
            format!("Field '{}' in scope '{}' is already mounted", field, scope),
        )
        .with_scope(scope)
        .with_field(field)
    }

    /// Create a no root error
    pub fn no_root() -> Self {
        Self::new(SchemaErrorCode::NoRoot, "No root scope defined".into())
    }

    /// Create a cyclic schema error
    pub fn cyclic(path: &[&str]) -> Self {
        Self::new(
            SchemaErrorCode::CyclicSchema,
            format!("Mount cycle detected: {}", path.join(" -> ")),
        )
    }

    /// Create an unknown field error
    pub fn unknown_field(scope: &str, field: &str) -> Self {
        Self::new(
            SchemaErrorCode::UnknownField,
            format!("Field '{}' is not declared in scope '{}'", field, scope),
        )
        .with_scope(scope)
        .with_field(field)
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(scope: &str, details: ShapeDetails) -> Self {
        let mut err = Self::new(
            SchemaErrorCode::ShapeMismatch,
            format!("Shape mismatch: {}", details),
        )
        .with_scope(scope);
        err.details = Some(details);
        err
    }

    /// Create a key reassigned error
    pub fn key_reassigned(scope: &str, code: KeyCode, previous: &str, next: &str) -> Self {
        Self::new(
            SchemaErrorCode::KeyReassigned,
            format!(
                "Key code {:#04x} in scope '{}' changed from '{}' to '{}'",
                code, scope, previous, next
            ),
        )
        .with_scope(scope)
        .with_field(next)
    }

    /// Create a mount changed error
    pub fn mount_changed(scope: &str, field: &str, previous: &str, next: &str) -> Self {
        Self::new(
            SchemaErrorCode::MountChanged,
            format!(
                "Field '{}' in scope '{}' changed from {} to {}",
                field, scope, previous, next
            ),
        )
        .with_scope(scope)
        .with_field(field)
    }

    /// Create a protocol exists error
    pub fn protocol_exists(name: &str) -> Self {
        Self::new(
            SchemaErrorCode::ProtocolExists,
            format!("Protocol '{}' is already registered", name),
        )
    }

    /// Create an error for a malformed declaration file
    pub fn malformed_declaration(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::MalformedDeclaration,
            format!("Malformed declaration '{}': {}", path.into(), reason.into()),
        )
    }

    /// Marks this error as reported by a lenient decode pass
    pub(crate) fn into_lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        if self.lenient {
            Severity::Warn
        } else {
            self.code.severity()
        }
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the scope name if applicable
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Returns the field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns shape details if applicable
    pub fn details(&self) -> Option<&ShapeDetails> {
        self.details.as_ref()
    }

    /// Returns whether this error must abort schema construction
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
