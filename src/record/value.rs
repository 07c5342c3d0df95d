//! The assembled, nested value tree a [`super::assembler`] reconstructs from a row
//! group's flat, per-leaf (repetition level, definition level, value) streams.

/// One assembled record field, or an element of a list/struct within one.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Raw bytes: BYTE_ARRAY, FIXED_LEN_BYTE_ARRAY, and INT96 all land here; the row
    /// layer reinterprets them using the column's logical type.
    ByteArray(Vec<u8>),
    /// A group's fields, in schema order.
    Group(Vec<(String, Value)>),
    /// A repeated field's elements.
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}
