//! Defines the main `Error` struct and the codec error taxonomy.

use alloc::{
    string::String,
    vec::Vec,
};
use core::fmt;

/// Result alias used across all WABI crates.
pub type Result<T> = core::result::Result<T, Error>;

/// Pipeline phase an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbiPhase {
    /// Binding a WIT type to a host type.
    Compile = 1,
    /// Lowering a host value into the ABI representation.
    Encode = 2,
    /// Lifting an ABI representation back into a host value.
    Decode = 3,
}

impl AbiPhase {
    /// Short lowercase name used in `Display` output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Encode => "encode",
            Self::Decode => "decode",
        }
    }
}

/// Error kinds for codec operations.
///
/// Every operation reports exactly one kind; callers can discriminate on it
/// without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required output location was absent.
    NilPointer = 1,
    /// The host type cannot represent the WIT type.
    TypeMismatch = 2,
    /// A record or variant key required by the WIT type is absent.
    FieldMissing = 3,
    /// Structural violation (bad char scalar, missing active case, short
    /// slot slice).
    InvalidData = 4,
    /// A string failed UTF-8 validation.
    InvalidUtf8 = 5,
    /// A discriminant is out of range for its type.
    InvalidDiscriminant = 6,
    /// Arithmetic overflow or a size limit was exceeded.
    Overflow = 7,
    /// The guest allocator refused a request.
    Allocation = 8,
    /// A WIT construct is not implemented in this codec.
    Unsupported = 9,
}

impl ErrorKind {
    /// Short name used in `Display` output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NilPointer => "nil pointer",
            Self::TypeMismatch => "type mismatch",
            Self::FieldMissing => "field missing",
            Self::InvalidData => "invalid data",
            Self::InvalidUtf8 => "invalid utf-8",
            Self::InvalidDiscriminant => "invalid discriminant",
            Self::Overflow => "overflow",
            Self::Allocation => "allocation failed",
            Self::Unsupported => "unsupported",
        }
    }
}

/// WABI error type.
///
/// Carries the phase, the kind, the navigation path into the type tree
/// (field names and `[idx]` segments, outermost first), and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// Phase the error was raised in.
    pub phase: AbiPhase,
    /// Machine-discriminable error kind.
    pub kind: ErrorKind,
    /// Navigation path into the value tree, outermost segment first.
    pub path: Vec<String>,
    /// Human readable message.
    pub message: String,
}

impl Error {
    /// Create a new error.
    pub fn new<S: Into<String>>(phase: AbiPhase, kind: ErrorKind, message: S) -> Self {
        Self {
            phase,
            kind,
            path: Vec::new(),
            message: message.into(),
        }
    }

    /// Create a compile-phase error.
    pub fn compile(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(AbiPhase::Compile, kind, message)
    }

    /// Create an encode-phase error.
    pub fn encode(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(AbiPhase::Encode, kind, message)
    }

    /// Create a decode-phase error.
    pub fn decode(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(AbiPhase::Decode, kind, message)
    }

    /// Prepend a path segment; used while unwinding out of a recursion.
    pub fn push_path(mut self, segment: impl Into<String>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    /// Prepend a field-name segment.
    pub fn in_field(self, name: &str) -> Self {
        self.push_path(name)
    }

    /// Prepend a list-index segment rendered as `[idx]`.
    pub fn at_index(self, idx: usize) -> Self {
        self.push_path(alloc::format!("[{idx}]"))
    }

    /// Render the path as a single dotted string; empty when the error was
    /// raised at the root of the value tree.
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            if !out.is_empty() && !segment.starts_with('[') {
                out.push('.');
            }
            out.push_str(segment);
        }
        out
    }

    /// Check if this is a validation-class error (anything except
    /// allocator refusal).
    pub fn is_validation(&self) -> bool {
        self.kind != ErrorKind::Allocation
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path_string();
        if path.is_empty() {
            write!(
                f,
                "{} error ({}): {}",
                self.phase.as_str(),
                self.kind.as_str(),
                self.message
            )
        } else {
            write!(
                f,
                "{} error at {} ({}): {}",
                self.phase.as_str(),
                path,
                self.kind.as_str(),
                self.message
            )
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_phase_kind_and_message() {
        let err = Error::decode(ErrorKind::InvalidDiscriminant, "discriminant 2 out of range");
        let rendered = alloc::format!("{err}");
        assert!(rendered.contains("decode error"));
        assert!(rendered.contains("invalid discriminant"));
        assert!(rendered.contains("discriminant 2 out of range"));
    }

    #[test]
    fn path_segments_unwind_outermost_first() {
        let err = Error::encode(ErrorKind::InvalidUtf8, "bad bytes")
            .at_index(3)
            .in_field("name")
            .in_field("user");
        assert_eq!(err.path, ["user", "name", "[3]"]);
        assert_eq!(err.path_string(), "user.name[3]");
    }

    #[test]
    fn kind_is_discriminable() {
        let err = Error::encode(ErrorKind::Overflow, "list too long");
        assert_eq!(err.kind, ErrorKind::Overflow);
        assert_eq!(err.phase, AbiPhase::Encode);
        assert!(err.is_validation());
        assert!(!Error::encode(ErrorKind::Allocation, "refused").is_validation());
    }
}
