use crate::{Error, OverflowError, Result, Value, ValueKind, truncate_long};
use anyhow::Context;
use atoi::FromRadix10SignedChecked;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::any;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::well_known::Rfc3339,
    macros::format_description,
};
use uuid::Uuid;

/// Conversion between native field types and the dynamically typed [`Value`].
///
/// This is the only place where the numeric truth of a decoded row is established: integer
/// conversions succeed only when the mathematical value of the source fits exactly into the
/// destination, otherwise an [`OverflowError`] naming both types is returned.
///
/// # Zero values
/// `is_zero` tells the serialization engine whether a field holds the zero value of its type
/// (`0`, `false`, `""`, an empty blob, a nil uuid, `None`). Zero fields are left out of INSERT
/// and UPDATE statements unless a snapshot says they changed. Temporal values are never zero.
///
/// # Examples
/// ```rust
/// use keel_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: u8 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// assert!(u8::try_from_value(Value::Int16(Some(256))).is_err());
/// ```
pub trait AsValue {
    /// Declared kind of the field, recorded in the entity shape.
    const KIND: ValueKind;
    /// Typed NULL for this type.
    fn as_empty_value() -> Value;
    /// Owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Convert a dynamic [`Value`] into `Self`.
    ///
    /// Implementations accept the canonical variant and the alternate representations drivers
    /// are known to produce (other integer widths, integral floats, decimals, text, bytes).
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Whether `self` is the zero value of its type.
    fn is_zero(&self) -> bool;
    /// Parse a full string into `Self`.
    fn parse(input: impl AsRef<str>) -> Result<Self>
    where
        Self: Sized,
    {
        Err(Error::msg(format!(
            "Cannot parse `{}` as {}",
            truncate_long!(input.as_ref()),
            any::type_name::<Self>()
        )))
    }
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&'static str> for Value {
    fn from(value: &'static str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn mismatch(value: &Value, destination: &str) -> Error {
    Error::msg(format!("Cannot convert {value:?} to {destination}"))
}

fn parse_integer(text: &str, source: &'static str, destination: &'static str) -> Result<i128> {
    let trimmed = text.trim();
    let (parsed, used) = i128::from_radix_10_signed_checked(trimmed.as_bytes());
    if used != trimmed.len() || !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return Err(Error::msg(format!(
            "Cannot parse `{}` as {destination}",
            truncate_long!(text)
        )));
    }
    parsed.ok_or_else(|| OverflowError::new(trimmed, source, destination).into())
}

fn float_to_integer(value: f64, source: &'static str, destination: &'static str) -> Result<i128> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(Error::msg(format!(
            "Value {value}: {source} is not an integer, cannot convert it to {destination}"
        )));
    }
    // 2^127 is exactly representable, everything at or above it is out of range
    if value >= 170141183460469231731687303715884105728.0
        || value < -170141183460469231731687303715884105728.0
    {
        return Err(OverflowError::new(value, source, destination).into());
    }
    Ok(value as i128)
}

/// Mathematical value of an integral source together with the name of the source type.
fn integer_from(value: Value, destination: &'static str) -> Result<(i128, &'static str)> {
    let source = value.type_name();
    let wide = match value {
        Value::Int8(Some(v)) => v as i128,
        Value::Int16(Some(v)) => v as i128,
        Value::Int32(Some(v)) => v as i128,
        Value::Int64(Some(v)) => v as i128,
        Value::UInt8(Some(v)) => v as i128,
        Value::UInt16(Some(v)) => v as i128,
        Value::UInt32(Some(v)) => v as i128,
        Value::UInt64(Some(v)) => v as i128,
        Value::Float32(Some(v)) => float_to_integer(v as f64, source, destination)?,
        Value::Float64(Some(v)) => float_to_integer(v, source, destination)?,
        Value::Decimal(Some(v)) => {
            if !v.is_integer() {
                return Err(Error::msg(format!(
                    "Value {v}: decimal is not an integer, cannot convert it to {destination}"
                )));
            }
            v.to_i128()
                .ok_or_else(|| Error::from(OverflowError::new(v, source, destination)))?
        }
        Value::Varchar(Some(ref v)) => parse_integer(v, source, destination)?,
        Value::Blob(Some(ref v)) => {
            let text = std::str::from_utf8(v)
                .with_context(|| format!("Bytes do not form a valid {destination} literal"))?;
            parse_integer(text, source, destination)?
        }
        _ => return Err(mismatch(&value, destination)),
    };
    Ok((wide, source))
}

macro_rules! impl_as_value_integer {
    ($type:ty, $variant:path, $kind:path) => {
        impl AsValue for $type {
            const KIND: ValueKind = $kind;
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                if let $variant(Some(v)) = value {
                    return Ok(v);
                }
                let (wide, source) = integer_from(value, stringify!($type))?;
                <$type>::try_from(wide)
                    .map_err(|_| Error::from(OverflowError::new(wide, source, stringify!($type))))
            }
            fn is_zero(&self) -> bool {
                *self == 0
            }
            fn parse(input: impl AsRef<str>) -> Result<Self> {
                Self::try_from_value(Value::Varchar(Some(input.as_ref().into())))
            }
        }
    };
}
impl_as_value_integer!(i8, Value::Int8, ValueKind::Int8);
impl_as_value_integer!(i16, Value::Int16, ValueKind::Int16);
impl_as_value_integer!(i32, Value::Int32, ValueKind::Int32);
impl_as_value_integer!(i64, Value::Int64, ValueKind::Int64);
impl_as_value_integer!(u8, Value::UInt8, ValueKind::UInt8);
impl_as_value_integer!(u16, Value::UInt16, ValueKind::UInt16);
impl_as_value_integer!(u32, Value::UInt32, ValueKind::UInt32);
impl_as_value_integer!(u64, Value::UInt64, ValueKind::UInt64);

impl AsValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Int8(Some(v)) => Ok(v != 0),
            Value::Int16(Some(v)) => Ok(v != 0),
            Value::Int32(Some(v)) => Ok(v != 0),
            Value::Int64(Some(v)) => Ok(v != 0),
            Value::UInt8(Some(v)) => Ok(v != 0),
            Value::UInt16(Some(v)) => Ok(v != 0),
            Value::UInt32(Some(v)) => Ok(v != 0),
            Value::UInt64(Some(v)) => Ok(v != 0),
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
            _ => Err(mismatch(&value, "bool")),
        }
    }
    fn is_zero(&self) -> bool {
        !*self
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        match input.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "yes" | "y" => Ok(true),
            "false" | "f" | "0" | "no" | "n" => Ok(false),
            _ => Err(Error::msg(format!(
                "Cannot parse `{}` as bool",
                truncate_long!(input)
            ))),
        }
    }
}

macro_rules! impl_as_value_float {
    ($type:ty, $variant:path, $kind:path, $to:ident) => {
        impl AsValue for $type {
            const KIND: ValueKind = $kind;
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                #[allow(unreachable_patterns)]
                match value {
                    $variant(Some(v)) => Ok(v),
                    Value::Float32(Some(v)) => Ok(v as _),
                    Value::Float64(Some(v)) => {
                        if v.is_finite() && v.abs() > <$type>::MAX as f64 {
                            return Err(OverflowError::new(v, "f64", stringify!($type)).into());
                        }
                        Ok(v as _)
                    }
                    Value::Int8(Some(v)) => Ok(v as _),
                    Value::Int16(Some(v)) => Ok(v as _),
                    Value::Int32(Some(v)) => Ok(v as _),
                    Value::Int64(Some(v)) => Ok(v as _),
                    Value::UInt8(Some(v)) => Ok(v as _),
                    Value::UInt16(Some(v)) => Ok(v as _),
                    Value::UInt32(Some(v)) => Ok(v as _),
                    Value::UInt64(Some(v)) => Ok(v as _),
                    Value::Decimal(Some(v)) => v.$to().ok_or_else(|| {
                        Error::from(OverflowError::new(v, "decimal", stringify!($type)))
                    }),
                    Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
                    _ => Err(mismatch(&value, stringify!($type))),
                }
            }
            fn is_zero(&self) -> bool {
                *self == 0.0
            }
            fn parse(input: impl AsRef<str>) -> Result<Self> {
                let input = input.as_ref().trim();
                fast_float::parse::<$type, _>(input).map_err(|_| {
                    Error::msg(format!(
                        "Cannot parse `{}` as {}",
                        truncate_long!(input),
                        stringify!($type)
                    ))
                })
            }
        }
    };
}
impl_as_value_float!(f32, Value::Float32, ValueKind::Float32, to_f32);
impl_as_value_float!(f64, Value::Float64, ValueKind::Float64, to_f64);

impl AsValue for Decimal {
    const KIND: ValueKind = ValueKind::Decimal;
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Float32(Some(v)) => Decimal::from_f32(v)
                .ok_or_else(|| Error::from(OverflowError::new(v, "f32", "decimal"))),
            Value::Float64(Some(v)) => Decimal::from_f64(v)
                .ok_or_else(|| Error::from(OverflowError::new(v, "f64", "decimal"))),
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
            v @ (Value::Int8(..)
            | Value::Int16(..)
            | Value::Int32(..)
            | Value::Int64(..)
            | Value::UInt8(..)
            | Value::UInt16(..)
            | Value::UInt32(..)
            | Value::UInt64(..)) => {
                let (wide, source) = integer_from(v, "decimal")?;
                Decimal::from_i128(wide)
                    .ok_or_else(|| Error::from(OverflowError::new(wide, source, "decimal")))
            }
            _ => Err(mismatch(&value, "decimal")),
        }
    }
    fn is_zero(&self) -> bool {
        Decimal::is_zero(self)
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        Decimal::from_str_exact(input)
            .with_context(|| format!("Cannot parse `{}` as decimal", truncate_long!(input)))
    }
}

impl AsValue for String {
    const KIND: ValueKind = ValueKind::Varchar;
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            Value::Blob(Some(v)) => String::from_utf8(v.into_vec())
                .context("Bytes read from the row are not valid UTF-8 text"),
            Value::Uuid(Some(v)) => Ok(v.to_string()),
            Value::Decimal(Some(v)) => Ok(v.to_string()),
            _ => Err(mismatch(&value, "String")),
        }
    }
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        Ok(input.as_ref().into())
    }
}

impl AsValue for Vec<u8> {
    const KIND: ValueKind = ValueKind::Blob;
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v.into_vec()),
            Value::Varchar(Some(v)) => Ok(v.into_bytes()),
            _ => Err(mismatch(&value, "Vec<u8>")),
        }
    }
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl AsValue for Uuid {
    const KIND: ValueKind = ValueKind::Uuid;
    fn as_empty_value() -> Value {
        Value::Uuid(None)
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
            Value::Blob(Some(ref v)) if v.len() == 16 => {
                Uuid::from_slice(v).context("Cannot read a uuid from 16 bytes")
            }
            Value::Blob(Some(ref v)) => <Self as AsValue>::parse(
                std::str::from_utf8(v).context("Bytes read from the row are not a valid uuid")?,
            ),
            _ => Err(mismatch(&value, "Uuid")),
        }
    }
    fn is_zero(&self) -> bool {
        self.is_nil()
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        Uuid::parse_str(input)
            .with_context(|| format!("Cannot parse `{}` as uuid", truncate_long!(input)))
    }
}

impl AsValue for Date {
    const KIND: ValueKind = ValueKind::Date;
    fn as_empty_value() -> Value {
        Value::Date(None)
    }
    fn as_value(self) -> Value {
        Value::Date(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.date()),
            Value::TimestampWithTimezone(Some(v)) => Ok(v.date()),
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
            _ => Err(mismatch(&value, "Date")),
        }
    }
    fn is_zero(&self) -> bool {
        false
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        Date::parse(input, format_description!("[year]-[month]-[day]"))
            .with_context(|| format!("Cannot parse `{}` as date", truncate_long!(input)))
    }
}

impl AsValue for Time {
    const KIND: ValueKind = ValueKind::Time;
    fn as_empty_value() -> Value {
        Value::Time(None)
    }
    fn as_value(self) -> Value {
        Value::Time(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
            _ => Err(mismatch(&value, "Time")),
        }
    }
    fn is_zero(&self) -> bool {
        false
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        Time::parse(input, format_description!("[hour]:[minute]:[second].[subsecond]"))
            .or_else(|_| Time::parse(input, format_description!("[hour]:[minute]:[second]")))
            .with_context(|| format!("Cannot parse `{}` as time", truncate_long!(input)))
    }
}

impl AsValue for PrimitiveDateTime {
    const KIND: ValueKind = ValueKind::Timestamp;
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            Value::TimestampWithTimezone(Some(v)) => {
                let v = v.to_offset(time::UtcOffset::UTC);
                Ok(PrimitiveDateTime::new(v.date(), v.time()))
            }
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
            _ => Err(mismatch(&value, "PrimitiveDateTime")),
        }
    }
    fn is_zero(&self) -> bool {
        false
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        let formats = [
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        ];
        formats
            .iter()
            .find_map(|format| PrimitiveDateTime::parse(input, format).ok())
            .ok_or_else(|| Error::msg("no timestamp format matched"))
            .with_context(|| format!("Cannot parse `{}` as timestamp", truncate_long!(input)))
    }
}

impl AsValue for OffsetDateTime {
    const KIND: ValueKind = ValueKind::TimestampWithTimezone;
    fn as_empty_value() -> Value {
        Value::TimestampWithTimezone(None)
    }
    fn as_value(self) -> Value {
        Value::TimestampWithTimezone(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::TimestampWithTimezone(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.assume_utc()),
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
            _ => Err(mismatch(&value, "OffsetDateTime")),
        }
    }
    fn is_zero(&self) -> bool {
        false
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        OffsetDateTime::parse(input, &Rfc3339)
            .or_else(|_| {
                <PrimitiveDateTime as AsValue>::parse(input).map(PrimitiveDateTime::assume_utc)
            })
            .with_context(|| {
                format!(
                    "Cannot parse `{}` as timestamp with time zone",
                    truncate_long!(input)
                )
            })
    }
}

impl<T: AsValue> AsValue for Option<T> {
    const KIND: ValueKind = T::KIND;
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
    fn is_zero(&self) -> bool {
        self.is_none()
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        T::parse(input).map(Some)
    }
}
