//! Reconstructs nested records from the flat, per-leaf column streams a projected
//! read decodes.

mod assembler;
mod field_path;
mod value;

pub use assembler::assemble_records;
pub use field_path::{build as build_field_paths, FieldPath};
pub use value::Value;
