use rust_decimal::Decimal;
use std::fmt::{self, Display};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed value moved between entities and the executor.
///
/// Every variant wraps an `Option` so that a NULL keeps its SQL type, drivers need it to bind
/// typed parameters.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::TimestampWithTimezone(l), Self::TimestampWithTimezone(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::UInt8(v) => v.is_none(),
            Value::UInt16(v) => v.is_none(),
            Value::UInt32(v) => v.is_none(),
            Value::UInt64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::TimestampWithTimezone(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
        }
    }

    /// Kind of the value, `None` for the untyped `Value::Null`.
    pub fn kind(&self) -> Option<ValueKind> {
        Some(match self {
            Value::Null => return None,
            Value::Boolean(..) => ValueKind::Boolean,
            Value::Int8(..) => ValueKind::Int8,
            Value::Int16(..) => ValueKind::Int16,
            Value::Int32(..) => ValueKind::Int32,
            Value::Int64(..) => ValueKind::Int64,
            Value::UInt8(..) => ValueKind::UInt8,
            Value::UInt16(..) => ValueKind::UInt16,
            Value::UInt32(..) => ValueKind::UInt32,
            Value::UInt64(..) => ValueKind::UInt64,
            Value::Float32(..) => ValueKind::Float32,
            Value::Float64(..) => ValueKind::Float64,
            Value::Decimal(..) => ValueKind::Decimal,
            Value::Varchar(..) => ValueKind::Varchar,
            Value::Blob(..) => ValueKind::Blob,
            Value::Date(..) => ValueKind::Date,
            Value::Time(..) => ValueKind::Time,
            Value::Timestamp(..) => ValueKind::Timestamp,
            Value::TimestampWithTimezone(..) => ValueKind::TimestampWithTimezone,
            Value::Uuid(..) => ValueKind::Uuid,
        })
    }

    /// Short name of the value type, used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        self.kind().map(|v| v.name()).unwrap_or("null")
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! some {
            ($v:expr) => {
                match $v {
                    Some(v) => write!(f, "{v}"),
                    None => f.write_str("NULL"),
                }
            };
        }
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(v) => some!(v),
            Value::Int8(v) => some!(v),
            Value::Int16(v) => some!(v),
            Value::Int32(v) => some!(v),
            Value::Int64(v) => some!(v),
            Value::UInt8(v) => some!(v),
            Value::UInt16(v) => some!(v),
            Value::UInt32(v) => some!(v),
            Value::UInt64(v) => some!(v),
            Value::Float32(v) => some!(v),
            Value::Float64(v) => some!(v),
            Value::Decimal(v) => some!(v),
            Value::Varchar(Some(v)) => write!(f, "{v:?}"),
            Value::Varchar(None) => f.write_str("NULL"),
            Value::Blob(Some(v)) => write!(f, "<{} bytes>", v.len()),
            Value::Blob(None) => f.write_str("NULL"),
            Value::Date(v) => some!(v),
            Value::Time(v) => some!(v),
            Value::Timestamp(v) => some!(v),
            Value::TimestampWithTimezone(v) => some!(v),
            Value::Uuid(v) => some!(v),
        }
    }
}

/// Declared type of a persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Varchar,
    Blob,
    Date,
    Time,
    Timestamp,
    TimestampWithTimezone,
    Uuid,
}

impl ValueKind {
    pub const fn name(&self) -> &'static str {
        match self {
            ValueKind::Boolean => "bool",
            ValueKind::Int8 => "i8",
            ValueKind::Int16 => "i16",
            ValueKind::Int32 => "i32",
            ValueKind::Int64 => "i64",
            ValueKind::UInt8 => "u8",
            ValueKind::UInt16 => "u16",
            ValueKind::UInt32 => "u32",
            ValueKind::UInt64 => "u64",
            ValueKind::Float32 => "f32",
            ValueKind::Float64 => "f64",
            ValueKind::Decimal => "decimal",
            ValueKind::Varchar => "text",
            ValueKind::Blob => "bytes",
            ValueKind::Date => "date",
            ValueKind::Time => "time",
            ValueKind::Timestamp => "timestamp",
            ValueKind::TimestampWithTimezone => "timestamptz",
            ValueKind::Uuid => "uuid",
        }
    }

    /// Typed NULL of this kind.
    pub const fn empty_value(&self) -> Value {
        match self {
            ValueKind::Boolean => Value::Boolean(None),
            ValueKind::Int8 => Value::Int8(None),
            ValueKind::Int16 => Value::Int16(None),
            ValueKind::Int32 => Value::Int32(None),
            ValueKind::Int64 => Value::Int64(None),
            ValueKind::UInt8 => Value::UInt8(None),
            ValueKind::UInt16 => Value::UInt16(None),
            ValueKind::UInt32 => Value::UInt32(None),
            ValueKind::UInt64 => Value::UInt64(None),
            ValueKind::Float32 => Value::Float32(None),
            ValueKind::Float64 => Value::Float64(None),
            ValueKind::Decimal => Value::Decimal(None),
            ValueKind::Varchar => Value::Varchar(None),
            ValueKind::Blob => Value::Blob(None),
            ValueKind::Date => Value::Date(None),
            ValueKind::Time => Value::Time(None),
            ValueKind::Timestamp => Value::Timestamp(None),
            ValueKind::TimestampWithTimezone => Value::TimestampWithTimezone(None),
            ValueKind::Uuid => Value::Uuid(None),
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
