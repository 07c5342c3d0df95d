//! Typed accessors layered over a [`Row`]'s raw [`Value`] tree: physical-type reads
//! (`get_int`, `get_string`, ...) and logical-type conversions (`get_date`,
//! `get_decimal`, `get_uuid`, ...) driven by the column's [`PrimitiveLogicalType`], plus
//! nested-value reads (`get_struct`, `get_list`, `get_map`) and primitive-list fast
//! paths. A thin view over the values [`crate::record::assemble_records`] already
//! produced; no decoding happens here.

use crate::error::{Error, Result};
use crate::parquet_bridge::{PrimitiveLogicalType, TimeUnit};
use crate::record::Value;
use crate::row::Row;
use crate::types::int96_to_i64_ns;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

fn misuse<T>(msg: String) -> Result<T> {
    Err(Error::ConsumerMisuse(msg))
}

/// A fixed-point decimal value: an arbitrary-precision unscaled integer plus the
/// number of digits to its right, per the column's `DECIMAL(precision, scale)`
/// logical type annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    pub unscaled: num_bigint::BigInt,
    pub scale: usize,
}

impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.unscaled);
        }
        let negative = self.unscaled.sign() == num_bigint::Sign::Minus;
        let digits = self.unscaled.magnitude().to_str_radix(10);
        let digits = if digits.len() <= self.scale {
            format!("{}{}", "0".repeat(self.scale - digits.len() + 1), digits)
        } else {
            digits
        };
        let split = digits.len() - self.scale;
        write!(f, "{}{}.{}", if negative { "-" } else { "" }, &digits[..split], &digits[split..])
    }
}

/// A nested group value: a struct's fields, in schema order. Reads within a struct
/// are by physical [`Value`] only; logical-type conversion is only offered at the
/// top-level [`Row`], matching the column descriptors the file schema carries for
/// top-level fields.
#[derive(Debug, Clone)]
pub struct Struct {
    fields: Vec<(String, Value)>,
}

impl Struct {
    pub fn is_null(&self, name: &str) -> Result<bool> {
        Ok(self.field(name)?.is_null())
    }

    fn field(&self, name: &str) -> Result<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| Error::ConsumerMisuse(format!("struct has no field named '{name}'")))
    }

    pub fn get_boolean(&self, name: &str) -> Result<bool> {
        match self.field(name)? {
            Value::Boolean(v) => Ok(*v),
            v => wrong_shape(name, v, "BOOLEAN"),
        }
    }

    pub fn get_int(&self, name: &str) -> Result<i32> {
        match self.field(name)? {
            Value::Int(v) => Ok(*v),
            v => wrong_shape(name, v, "INT32"),
        }
    }

    pub fn get_long(&self, name: &str) -> Result<i64> {
        match self.field(name)? {
            Value::Long(v) => Ok(*v),
            v => wrong_shape(name, v, "INT64"),
        }
    }

    pub fn get_double(&self, name: &str) -> Result<f64> {
        match self.field(name)? {
            Value::Double(v) => Ok(*v),
            v => wrong_shape(name, v, "DOUBLE"),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<&str> {
        match self.field(name)? {
            Value::ByteArray(v) => {
                std::str::from_utf8(v).map_err(|e| Error::ConsumerMisuse(format!("field '{name}' is not valid UTF-8: {e}")))
            }
            v => wrong_shape(name, v, "BYTE_ARRAY"),
        }
    }

    pub fn get_struct(&self, name: &str) -> Result<Struct> {
        match self.field(name)? {
            Value::Group(fields) => Ok(Struct { fields: fields.clone() }),
            v => wrong_shape(name, v, "a group"),
        }
    }

    pub fn get_list(&self, name: &str) -> Result<&[Value]> {
        match self.field(name)? {
            Value::List(v) => Ok(v.as_slice()),
            v => wrong_shape(name, v, "a repeated field"),
        }
    }
}

fn wrong_shape<T>(name: &str, value: &Value, expected: &str) -> Result<T> {
    if value.is_null() {
        return misuse(format!("field '{name}' is null"));
    }
    misuse(format!("field '{name}' is not {expected}"))
}

impl Row {
    /// Whether the named top-level field's value is null. Errs if `name` was not
    /// projected into this row.
    pub fn is_null(&self, name: &str) -> Result<bool> {
        Ok(self.required_value(name)?.is_null())
    }

    fn required_value(&self, name: &str) -> Result<&Value> {
        self.value(name)
            .ok_or_else(|| Error::ConsumerMisuse(format!("column '{name}' was not projected into this row")))
    }

    fn logical_type(&self, name: &str) -> Option<PrimitiveLogicalType> {
        self.schema_column(name).and_then(|c| c.logical_type)
    }

    pub fn get_boolean(&self, name: &str) -> Result<bool> {
        match self.required_value(name)? {
            Value::Boolean(v) => Ok(*v),
            v => wrong_shape(name, v, "BOOLEAN"),
        }
    }

    pub fn get_int(&self, name: &str) -> Result<i32> {
        match self.required_value(name)? {
            Value::Int(v) => Ok(*v),
            v => wrong_shape(name, v, "INT32"),
        }
    }

    pub fn get_long(&self, name: &str) -> Result<i64> {
        match self.required_value(name)? {
            Value::Long(v) => Ok(*v),
            v => wrong_shape(name, v, "INT64"),
        }
    }

    pub fn get_float(&self, name: &str) -> Result<f32> {
        match self.required_value(name)? {
            Value::Float(v) => Ok(*v),
            v => wrong_shape(name, v, "FLOAT"),
        }
    }

    pub fn get_double(&self, name: &str) -> Result<f64> {
        match self.required_value(name)? {
            Value::Double(v) => Ok(*v),
            v => wrong_shape(name, v, "DOUBLE"),
        }
    }

    pub fn get_binary(&self, name: &str) -> Result<&[u8]> {
        match self.required_value(name)? {
            Value::ByteArray(v) => Ok(v.as_slice()),
            v => wrong_shape(name, v, "BYTE_ARRAY"),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<&str> {
        let bytes = self.get_binary(name)?;
        std::str::from_utf8(bytes).map_err(|e| Error::ConsumerMisuse(format!("column '{name}' is not valid UTF-8: {e}")))
    }

    /// Days since the Unix epoch, per `DATE`, converted to a calendar date.
    pub fn get_date(&self, name: &str) -> Result<NaiveDate> {
        let days = self.get_int(name)?;
        NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .checked_add_signed(Duration::days(days as i64))
            .ok_or_else(|| Error::ConsumerMisuse(format!("column '{name}' carries an out-of-range DATE value")))
    }

    /// Time-of-day, per `TIME(unit)`, backed by an INT32 (millis) or INT64
    /// (micros/nanos) physical value.
    pub fn get_time(&self, name: &str) -> Result<NaiveTime> {
        let unit = match self.logical_type(name) {
            Some(PrimitiveLogicalType::Time { unit, .. }) => unit,
            _ => return misuse(format!("column '{name}' has no TIME logical type")),
        };
        let value = self.required_value(name)?;
        let nanos = match (unit, value) {
            (TimeUnit::Milliseconds, Value::Int(v)) => *v as i64 * 1_000_000,
            (TimeUnit::Microseconds, Value::Long(v)) => *v * 1_000,
            (TimeUnit::Nanoseconds, Value::Long(v)) => *v,
            (_, Value::Null) => return misuse(format!("column '{name}' is null")),
            _ => return misuse(format!("column '{name}' has an unexpected physical type for its TIME unit")),
        };
        NaiveTime::from_num_seconds_from_midnight_opt(
            (nanos / 1_000_000_000) as u32,
            (nanos % 1_000_000_000) as u32,
        )
        .ok_or_else(|| Error::ConsumerMisuse(format!("column '{name}' carries an out-of-range TIME value")))
    }

    /// A naive (timezone-stripped) timestamp, per `TIMESTAMP(unit)` or the legacy
    /// INT96 encoding. `is_adjusted_to_utc` is carried on the logical type but this
    /// reader does not attach a timezone to the result; callers needing one should
    /// apply it themselves using [`PrimitiveLogicalType::Timestamp::is_adjusted_to_utc`].
    pub fn get_timestamp(&self, name: &str) -> Result<NaiveDateTime> {
        let value = self.required_value(name)?;
        let nanos_since_epoch = match value {
            Value::ByteArray(bytes) if bytes.len() == 12 => {
                let mut raw = [0u32; 3];
                for (i, chunk) in bytes.chunks_exact(4).enumerate() {
                    raw[i] = u32::from_le_bytes(chunk.try_into().unwrap());
                }
                int96_to_i64_ns(raw)
            }
            Value::Long(v) => match self.logical_type(name) {
                Some(PrimitiveLogicalType::Timestamp { unit, .. }) => match unit {
                    TimeUnit::Milliseconds => v.checked_mul(1_000_000),
                    TimeUnit::Microseconds => v.checked_mul(1_000),
                    TimeUnit::Nanoseconds => Some(*v),
                }
                .ok_or_else(|| Error::ConsumerMisuse(format!("column '{name}' carries an out-of-range TIMESTAMP value")))?,
                _ => return misuse(format!("column '{name}' has no TIMESTAMP logical type")),
            },
            Value::Null => return misuse(format!("column '{name}' is null")),
            _ => return misuse(format!("column '{name}' is not a TIMESTAMP")),
        };
        NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .checked_add_signed(Duration::nanoseconds(nanos_since_epoch))
            .ok_or_else(|| Error::ConsumerMisuse(format!("column '{name}' carries an out-of-range TIMESTAMP value")))
    }

    /// A `DECIMAL(precision, scale)` value, backed by INT32, INT64, or a (fixed- or
    /// variable-length) big-endian two's-complement byte array.
    pub fn get_decimal(&self, name: &str) -> Result<Decimal> {
        let scale = match self.logical_type(name) {
            Some(PrimitiveLogicalType::Decimal(_, scale)) => scale,
            _ => return misuse(format!("column '{name}' has no DECIMAL logical type")),
        };
        let unscaled = match self.required_value(name)? {
            Value::Int(v) => num_bigint::BigInt::from(*v),
            Value::Long(v) => num_bigint::BigInt::from(*v),
            Value::ByteArray(bytes) => num_bigint::BigInt::from_signed_bytes_be(bytes),
            Value::Null => return misuse(format!("column '{name}' is null")),
            _ => return misuse(format!("column '{name}' has an unexpected physical type for DECIMAL")),
        };
        Ok(Decimal { unscaled, scale })
    }

    /// A `UUID`, backed by a 16-byte `FIXED_LEN_BYTE_ARRAY`.
    pub fn get_uuid(&self, name: &str) -> Result<uuid::Uuid> {
        match self.logical_type(name) {
            Some(PrimitiveLogicalType::Uuid) => {}
            _ => return misuse(format!("column '{name}' has no UUID logical type")),
        }
        match self.required_value(name)? {
            Value::ByteArray(bytes) => {
                uuid::Uuid::from_slice(bytes).map_err(|e| Error::ConsumerMisuse(format!("column '{name}' is not a valid UUID: {e}")))
            }
            Value::Null => misuse(format!("column '{name}' is null")),
            _ => misuse(format!("column '{name}' is not a UUID")),
        }
    }

    /// A nested struct field's values.
    pub fn get_struct(&self, name: &str) -> Result<Struct> {
        match self.required_value(name)? {
            Value::Group(fields) => Ok(Struct { fields: fields.clone() }),
            v => wrong_shape(name, v, "a group"),
        }
    }

    /// A repeated (list) field's elements, as raw [`Value`]s.
    pub fn get_list(&self, name: &str) -> Result<&[Value]> {
        match self.required_value(name)? {
            Value::List(v) => Ok(v.as_slice()),
            v => wrong_shape(name, v, "a repeated field"),
        }
    }

    /// A `MAP`'s entries as `(key, value)` pairs; each element of the underlying
    /// list must be a two-field `key`/`value` group.
    pub fn get_map(&self, name: &str) -> Result<Vec<(Value, Value)>> {
        self.get_list(name)?
            .iter()
            .map(|entry| match entry {
                Value::Group(fields) if fields.len() == 2 => Ok((fields[0].1.clone(), fields[1].1.clone())),
                _ => misuse(format!("element of map '{name}' is not a key/value pair")),
            })
            .collect()
    }

    /// Fast path for a repeated INT32 field: every element, `null` entries mapped
    /// to `0`.
    pub fn get_int_list(&self, name: &str) -> Result<Vec<i32>> {
        self.get_list(name)?
            .iter()
            .map(|v| match v {
                Value::Int(v) => Ok(*v),
                Value::Null => Ok(0),
                _ => misuse(format!("element of list '{name}' is not an INT32")),
            })
            .collect()
    }

    /// Fast path for a repeated INT64 field; see [`Row::get_int_list`].
    pub fn get_long_list(&self, name: &str) -> Result<Vec<i64>> {
        self.get_list(name)?
            .iter()
            .map(|v| match v {
                Value::Long(v) => Ok(*v),
                Value::Null => Ok(0),
                _ => misuse(format!("element of list '{name}' is not an INT64")),
            })
            .collect()
    }

    /// Fast path for a repeated DOUBLE field; see [`Row::get_int_list`].
    pub fn get_double_list(&self, name: &str) -> Result<Vec<f64>> {
        self.get_list(name)?
            .iter()
            .map(|v| match v {
                Value::Double(v) => Ok(*v),
                Value::Null => Ok(0.0),
                _ => misuse(format!("element of list '{name}' is not a DOUBLE")),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaTree;
    use std::sync::Arc;

    fn empty_schema() -> Arc<SchemaTree> {
        Arc::new(SchemaTree {
            name: "schema".to_string(),
            fields: Vec::new(),
            leaves: Vec::new(),
        })
    }

    #[test]
    fn missing_column_is_consumer_misuse() {
        let row = Row::new(empty_schema(), vec![]);
        assert!(matches!(row.get_int("x"), Err(Error::ConsumerMisuse(_))));
    }

    #[test]
    fn wrong_type_read_is_consumer_misuse() {
        let row = Row::new(empty_schema(), vec![("x".to_string(), Value::Int(1))]);
        assert!(matches!(row.get_long("x"), Err(Error::ConsumerMisuse(_))));
    }

    #[test]
    fn null_read_through_typed_accessor_is_consumer_misuse() {
        let row = Row::new(empty_schema(), vec![("x".to_string(), Value::Null)]);
        assert!(row.is_null("x").unwrap());
        assert!(matches!(row.get_int("x"), Err(Error::ConsumerMisuse(_))));
    }

    #[test]
    fn date_converts_days_since_epoch() {
        let row = Row::new(empty_schema(), vec![("d".to_string(), Value::Int(1))]);
        assert_eq!(row.get_date("d").unwrap(), NaiveDate::from_ymd_opt(1970, 1, 2).unwrap());
    }

    #[test]
    fn decimal_formats_with_implied_point() {
        let decimal = Decimal {
            unscaled: num_bigint::BigInt::from(12345),
            scale: 2,
        };
        assert_eq!(decimal.to_string(), "123.45");
    }

    #[test]
    fn negative_decimal_keeps_the_sign_outside_the_fraction() {
        let decimal = Decimal {
            unscaled: num_bigint::BigInt::from(-5),
            scale: 2,
        };
        assert_eq!(decimal.to_string(), "-0.05");
    }

    #[test]
    fn int_list_fast_path() {
        let row = Row::new(
            empty_schema(),
            vec![("tags".to_string(), Value::List(vec![Value::Int(1), Value::Null, Value::Int(3)]))],
        );
        assert_eq!(row.get_int_list("tags").unwrap(), vec![1, 0, 3]);
    }

    #[test]
    fn struct_access_reads_nested_fields() {
        let row = Row::new(
            empty_schema(),
            vec![(
                "address".to_string(),
                Value::Group(vec![("city".to_string(), Value::ByteArray(b"nyc".to_vec()))]),
            )],
        );
        let s = row.get_struct("address").unwrap();
        assert_eq!(s.get_string("city").unwrap(), "nyc");
    }
}
