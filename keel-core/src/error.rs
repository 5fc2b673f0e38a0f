use crate::Error;
use thiserror::Error;

/// Prefix shared by every error raised by keel.
pub const ERROR_PREFIX: &str = "keel: ";

/// Malformed entity declaration, raised when the shape is compiled.
///
/// Entity declarations are a startup contract: a type rejected with a `ShapeError` stays
/// rejected for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("keel: shape: `{entity}` is not a struct with named fields")]
    NotAStruct { entity: &'static str },
    #[error(
        "keel: shape: field `{field}` of `{entity}` maps to the joined column `{column}` but the entity is not read only"
    )]
    JoinedColumn {
        entity: &'static str,
        field: String,
        column: String,
    },
    #[error("keel: shape: `{entity}` declares more than one primary field (`{first}` and `{second}`)")]
    DuplicatePrimary {
        entity: &'static str,
        first: String,
        second: String,
    },
    #[error(
        "keel: shape: composite group `{group}` of `{entity}` has {members} member, at least two are required"
    )]
    CompositeTooSmall {
        entity: &'static str,
        group: String,
        members: usize,
    },
    #[error("keel: shape: column `{column}` is declared more than once in `{entity}`")]
    DuplicateColumn {
        entity: &'static str,
        column: String,
    },
    #[error("keel: shape: `{entity}` has no persisted fields")]
    NoFields { entity: &'static str },
    #[error("keel: shape: `{entity}` declares neither a primary field nor a composite key")]
    NoKey { entity: &'static str },
    #[error("keel: shape: finder of `{entity}` references the unknown field `{field}`")]
    UnknownFinderField {
        entity: &'static str,
        field: String,
    },
}

/// A per call precondition does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("keel: validation: key field `{field}` of `{entity}` is not set")]
    MissingPrimaryKey { entity: &'static str, field: String },
    #[error("keel: validation: nothing to write for `{entity}`")]
    NothingToWrite { entity: &'static str },
    #[error("keel: validation: `{entity}` has joined columns and cannot be written")]
    JoinedModel { entity: &'static str },
    #[error("keel: validation: `{entity}` is already registered with different options")]
    ConflictingOptions { entity: &'static str },
    #[error("keel: validation: `{entity}` has no finder on ({fields})")]
    UnknownFinder { entity: &'static str, fields: String },
}

/// An integer read from a row does not fit into the destination field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("keel: overflow: value {value} of type {source_type} does not fit into {destination}")]
pub struct OverflowError {
    pub value: String,
    pub source_type: &'static str,
    pub destination: &'static str,
}

impl OverflowError {
    pub fn new(value: impl ToString, source_type: &'static str, destination: &'static str) -> Self {
        Self {
            value: value.to_string(),
            source_type,
            destination,
        }
    }
}

/// Zero rows where exactly one was expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("keel: record not found in `{table}`")]
pub struct RecordNotFound {
    pub table: String,
}

/// More than one row where exactly one was expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("keel: multiple rows: expected one row from `{table}`, got {rows}")]
pub struct MultipleRowsError {
    pub table: String,
    pub rows: usize,
}

/// Classification helpers for the errors carried inside [`Error`].
///
/// They look through any context attached with `anyhow::Context`.
pub trait ErrorExt {
    fn is_shape_error(&self) -> bool;
    fn is_validation_error(&self) -> bool;
    fn is_overflow(&self) -> bool;
    fn is_record_not_found(&self) -> bool;
    fn is_multiple_rows(&self) -> bool;
}

impl ErrorExt for Error {
    fn is_shape_error(&self) -> bool {
        self.downcast_ref::<ShapeError>().is_some()
    }
    fn is_validation_error(&self) -> bool {
        self.downcast_ref::<ValidationError>().is_some()
    }
    fn is_overflow(&self) -> bool {
        self.downcast_ref::<OverflowError>().is_some()
    }
    fn is_record_not_found(&self) -> bool {
        self.downcast_ref::<RecordNotFound>().is_some()
    }
    fn is_multiple_rows(&self) -> bool {
        self.downcast_ref::<MultipleRowsError>().is_some()
    }
}
