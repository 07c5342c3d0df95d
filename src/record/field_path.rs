//! Precomputes, for every leaf column, the navigation info the assembler needs to
//! place its values into the right spot in the nested output — so assembly walks a
//! `Vec` indexed by [`crate::schema::SchemaNode::Primitive::column_index`] rather than
//! re-deriving each leaf's depth/levels from the schema tree, or hashing its path, on
//! every value.

use crate::schema::SchemaTree;

/// One leaf's precomputed descent info, at the same index as
/// [`SchemaTree::leaves`][crate::schema::SchemaTree].
#[derive(Debug, Clone)]
pub struct FieldPath {
    pub path: Vec<String>,
    pub max_definition_level: i16,
    pub max_repetition_level: i16,
}

/// Builds one [`FieldPath`] per leaf, in column order.
pub fn build(schema: &SchemaTree) -> Vec<FieldPath> {
    schema
        .leaves
        .iter()
        .map(|leaf| FieldPath {
            path: leaf.path_in_schema.clone(),
            max_definition_level: leaf.max_definition_level,
            max_repetition_level: leaf.max_repetition_level,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parquet_format_safe::{FieldRepetitionType, SchemaElement, Type as ThriftPhysicalType};

    fn leaf(name: &str, repetition: FieldRepetitionType, type_: ThriftPhysicalType) -> SchemaElement {
        SchemaElement {
            type_: Some(type_),
            type_length: None,
            repetition_type: Some(repetition),
            name: name.to_string(),
            num_children: None,
            converted_type: None,
            scale: None,
            precision: None,
            field_id: None,
            logical_type: None,
        }
    }

    fn group(name: &str, num_children: i32) -> SchemaElement {
        SchemaElement {
            type_: None,
            type_length: None,
            repetition_type: None,
            name: name.to_string(),
            num_children: Some(num_children),
            converted_type: None,
            scale: None,
            precision: None,
            field_id: None,
            logical_type: None,
        }
    }

    #[test]
    fn one_field_path_per_leaf_in_column_order() {
        let schema = SchemaTree::try_from_thrift(&[
            group("schema", 2),
            leaf("a", FieldRepetitionType::REQUIRED, ThriftPhysicalType::INT32),
            leaf("b", FieldRepetitionType::OPTIONAL, ThriftPhysicalType::BYTE_ARRAY),
        ])
        .unwrap();
        let paths = build(&schema);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].path, vec!["a"]);
        assert_eq!(paths[1].max_definition_level, 1);
    }
}
