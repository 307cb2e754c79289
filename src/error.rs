use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Recoverable conditions (a missing record, an empty payload) are never
/// surfaced through this type; they are returned as sentinel values by the
/// read surface instead.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a schema declaration error (zero or duplicate primary keys,
    /// non-scalar key fields).
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Schema, ErrorOrigin::Schema, message)
    }

    /// Construct the error for an index request against an undeclared field.
    pub(crate) fn no_such_field(entity: &str, field: &str) -> Self {
        Self::new(
            ErrorClass::Schema,
            ErrorOrigin::Index,
            format!("no such field: {entity}.{field}"),
        )
    }

    /// Construct the error for an index request against a collection that
    /// does not exist yet.
    pub(crate) fn no_collection(entity: &str) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Index,
            format!("no collection: {entity}"),
        )
    }

    /// Construct an unsupported-field-type error for a specific origin.
    pub(crate) fn unsupported_field_type(
        origin: ErrorOrigin,
        entity: &str,
        field: &str,
    ) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            origin,
            format!("unsupported field type: {entity}.{field}"),
        )
    }

    /// Construct a codec-origin corruption error.
    pub(crate) fn codec_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Codec, message)
    }

    /// Construct an index-origin corruption error.
    pub(crate) fn index_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Index, message)
    }

    /// Construct a ledger-origin corruption error.
    pub(crate) fn ledger_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Ledger, message)
    }

    /// Construct a query-origin unsupported error (malformed predicate).
    pub(crate) fn query_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Query, message)
    }

    /// Construct an index-origin invariant violation.
    pub(crate) fn index_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Index,
            message,
        )
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_schema(&self) -> bool {
        matches!(self.class, ErrorClass::Schema)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Schema,
    NotFound,
    Corruption,
    Unsupported,
    Internal,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Schema => "schema",
            Self::NotFound => "not_found",
            Self::Corruption => "corruption",
            Self::Unsupported => "unsupported",
            Self::Internal => "internal",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Schema,
    Codec,
    Store,
    Index,
    Query,
    Ledger,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Schema => "schema",
            Self::Codec => "codec",
            Self::Store => "store",
            Self::Index => "index",
            Self::Query => "query",
            Self::Ledger => "ledger",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
