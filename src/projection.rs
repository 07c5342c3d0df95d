//! Which columns a read pulls off disk. Projecting away unused columns means their
//! chunks are never scanned, decompressed or decoded.

use crate::error::{Error, Result};
use crate::schema::SchemaTree;
use std::collections::HashSet;

/// A column selection, given as top-level field names.
#[derive(Debug, Clone)]
pub enum Projection {
    /// Every top-level field in the schema.
    All,
    /// Only the named top-level fields (and, for a field that is a group, every
    /// leaf nested beneath it). A name absent from the schema surfaces as
    /// [`crate::error::Error::UnknownColumn`] the first time this projection is
    /// checked against a file.
    Fields(HashSet<String>),
}

/// The top-level field name a leaf's dotted path begins with, e.g. `"address"` for
/// `"address.city"`.
fn top_level(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

impl Projection {
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Fields(names.into_iter().map(Into::into).collect())
    }

    /// Whether the leaf column at dotted `path` belongs to a projected top-level
    /// field.
    pub fn includes(&self, path: &str) -> bool {
        match self {
            Projection::All => true,
            Projection::Fields(fields) => fields.contains(top_level(path)),
        }
    }

    /// Checks every named field actually exists as a top-level field of `schema`.
    pub fn validate(&self, schema: &SchemaTree) -> Result<()> {
        if let Projection::Fields(fields) = self {
            for name in fields {
                if !schema.fields.iter().any(|f| f.name() == name) {
                    return Err(Error::UnknownColumn(name.clone()));
                }
            }
        }
        Ok(())
    }
}

impl Default for Projection {
    fn default() -> Self {
        Projection::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_includes_everything() {
        assert!(Projection::All.includes("anything.at.all"));
    }

    #[test]
    fn fields_only_includes_named_top_level_fields() {
        let projection = Projection::fields(["a", "b"]);
        assert!(projection.includes("a"));
        assert!(projection.includes("b.c"));
        assert!(!projection.includes("c"));
    }

    #[test]
    fn validate_rejects_an_unknown_field_name() {
        let schema = SchemaTree {
            name: "schema".to_string(),
            fields: vec![],
            leaves: vec![],
        };
        let projection = Projection::fields(["missing"]);
        assert!(matches!(projection.validate(&schema), Err(Error::UnknownColumn(name)) if name == "missing"));
    }

    #[test]
    fn validate_accepts_all_projection_regardless_of_schema() {
        let schema = SchemaTree {
            name: "schema".to_string(),
            fields: vec![],
            leaves: vec![],
        };
        assert!(Projection::All.validate(&schema).is_ok());
    }
}
