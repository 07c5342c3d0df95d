//! The file schema: a tree of groups and primitive leaves, built from the Thrift
//! `SchemaElement` list stored flat (pre-order, parent-before-children) in the file
//! footer. Two views are derived from the same tree: the nested [`SchemaNode`] used by
//! the record assembler to walk structs/lists/maps, and a flattened, ordered
//! [`ColumnDescriptor`] per leaf used by the scanner and row layer.

use crate::error::{oos, Error, Result};
use crate::parquet_bridge::{GroupLogicalType, PrimitiveLogicalType, Repetition};
use crate::projection::Projection;
use parquet_format_safe::{ConvertedType, SchemaElement, Type as ThriftPhysicalType};
use std::convert::TryFrom;

/// A column's on-disk physical representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray(i32),
}

impl PhysicalType {
    fn try_new(type_: ThriftPhysicalType, type_length: Option<i32>) -> Result<Self> {
        Ok(match type_ {
            ThriftPhysicalType::BOOLEAN => PhysicalType::Boolean,
            ThriftPhysicalType::INT32 => PhysicalType::Int32,
            ThriftPhysicalType::INT64 => PhysicalType::Int64,
            ThriftPhysicalType::INT96 => PhysicalType::Int96,
            ThriftPhysicalType::FLOAT => PhysicalType::Float,
            ThriftPhysicalType::DOUBLE => PhysicalType::Double,
            ThriftPhysicalType::BYTE_ARRAY => PhysicalType::ByteArray,
            ThriftPhysicalType::FIXED_LEN_BYTE_ARRAY => PhysicalType::FixedLenByteArray(
                type_length.ok_or_else(|| oos!("FIXED_LEN_BYTE_ARRAY element is missing type_length"))?,
            ),
            _ => return Err(oos!("physical type out of range")),
        })
    }
}

/// Falls back to the legacy `converted_type` annotation when a schema element has no
/// (Parquet 2.4+) `logical_type`, so older files still get useful logical typing.
fn primitive_logical_type_from_converted(converted: ConvertedType) -> Option<PrimitiveLogicalType> {
    use crate::parquet_bridge::{IntegerType, TimeUnit};
    Some(match converted {
        ConvertedType::UTF8 | ConvertedType::ENUM => PrimitiveLogicalType::String,
        ConvertedType::DATE => PrimitiveLogicalType::Date,
        ConvertedType::TIME_MILLIS => PrimitiveLogicalType::Time {
            unit: TimeUnit::Milliseconds,
            is_adjusted_to_utc: true,
        },
        ConvertedType::TIME_MICROS => PrimitiveLogicalType::Time {
            unit: TimeUnit::Microseconds,
            is_adjusted_to_utc: true,
        },
        ConvertedType::TIMESTAMP_MILLIS => PrimitiveLogicalType::Timestamp {
            unit: TimeUnit::Milliseconds,
            is_adjusted_to_utc: true,
        },
        ConvertedType::TIMESTAMP_MICROS => PrimitiveLogicalType::Timestamp {
            unit: TimeUnit::Microseconds,
            is_adjusted_to_utc: true,
        },
        ConvertedType::UINT_8 => PrimitiveLogicalType::Integer(IntegerType::UInt8),
        ConvertedType::UINT_16 => PrimitiveLogicalType::Integer(IntegerType::UInt16),
        ConvertedType::UINT_32 => PrimitiveLogicalType::Integer(IntegerType::UInt32),
        ConvertedType::UINT_64 => PrimitiveLogicalType::Integer(IntegerType::UInt64),
        ConvertedType::INT_8 => PrimitiveLogicalType::Integer(IntegerType::Int8),
        ConvertedType::INT_16 => PrimitiveLogicalType::Integer(IntegerType::Int16),
        ConvertedType::INT_32 => PrimitiveLogicalType::Integer(IntegerType::Int32),
        ConvertedType::INT_64 => PrimitiveLogicalType::Integer(IntegerType::Int64),
        ConvertedType::JSON => PrimitiveLogicalType::Json,
        ConvertedType::BSON => PrimitiveLogicalType::Bson,
        _ => return None,
    })
}

fn group_logical_type_from_converted(converted: ConvertedType) -> Option<GroupLogicalType> {
    match converted {
        ConvertedType::LIST => Some(GroupLogicalType::List),
        ConvertedType::MAP | ConvertedType::MAP_KEY_VALUE => Some(GroupLogicalType::Map),
        _ => None,
    }
}

/// A single leaf column, flattened out of the schema tree in depth-first order —
/// the same order the file's row groups lay out their column chunks in.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    /// Full dotted path from the root message, e.g. `["address", "city"]`.
    pub path_in_schema: Vec<String>,
    pub physical_type: PhysicalType,
    pub logical_type: Option<PrimitiveLogicalType>,
    pub repetition: Repetition,
    /// The maximum definition level any value of this column can carry: the number
    /// of optional/repeated ancestors (inclusive of itself).
    pub max_definition_level: i16,
    /// The maximum repetition level any value of this column can carry: the number
    /// of repeated ancestors (inclusive of itself).
    pub max_repetition_level: i16,
}

impl ColumnDescriptor {
    pub fn name(&self) -> &str {
        self.path_in_schema.last().map(|s| s.as_str()).unwrap_or("")
    }
}

/// A node of the schema tree: either a typed leaf or a group of children, annotated
/// with the repetition/definition level state accumulated on the path from the root.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    Primitive {
        name: String,
        repetition: Repetition,
        physical_type: PhysicalType,
        logical_type: Option<PrimitiveLogicalType>,
        max_definition_level: i16,
        max_repetition_level: i16,
        /// Index into [`SchemaTree::leaves`].
        column_index: usize,
    },
    Group {
        name: String,
        repetition: Repetition,
        logical_type: Option<GroupLogicalType>,
        max_definition_level: i16,
        max_repetition_level: i16,
        children: Vec<SchemaNode>,
    },
}

impl SchemaNode {
    pub fn name(&self) -> &str {
        match self {
            SchemaNode::Primitive { name, .. } => name,
            SchemaNode::Group { name, .. } => name,
        }
    }

    pub fn repetition(&self) -> Repetition {
        match self {
            SchemaNode::Primitive { repetition, .. } => *repetition,
            SchemaNode::Group { repetition, .. } => *repetition,
        }
    }
}

/// The full schema of a Parquet file: the root message's children as a tree, and the
/// same leaves flattened into file column order.
#[derive(Debug, Clone)]
pub struct SchemaTree {
    pub name: String,
    pub fields: Vec<SchemaNode>,
    pub leaves: Vec<ColumnDescriptor>,
}

impl SchemaTree {
    /// Builds the tree from the flat, pre-order `SchemaElement` list stored in the
    /// file footer. `elements[0]` is the root message; `elements[0].num_children`
    /// gives the count of elements immediately following it that are its children.
    pub fn try_from_thrift(elements: &[SchemaElement]) -> Result<Self> {
        if elements.is_empty() {
            return Err(oos!("schema has no elements"));
        }
        let root = &elements[0];
        let num_children = root
            .num_children
            .ok_or_else(|| oos!("root schema element is missing num_children"))?
            as usize;

        let mut cursor = 1usize;
        let mut leaves = Vec::new();
        let mut fields = Vec::with_capacity(num_children);
        for _ in 0..num_children {
            let (node, next) = build_node(elements, cursor, &[], 0, 0, &mut leaves)?;
            fields.push(node);
            cursor = next;
        }
        if cursor != elements.len() {
            return Err(oos!(
                "schema element list has {} trailing elements unreachable from the root",
                elements.len() - cursor
            ));
        }

        Ok(SchemaTree {
            name: root.name.clone(),
            fields,
            leaves,
        })
    }

    pub fn column(&self, path: &str) -> Option<&ColumnDescriptor> {
        self.leaves.iter().find(|c| c.path_in_schema.join(".") == path)
    }

    pub fn column_index(&self, path: &str) -> Option<usize> {
        self.leaves.iter().position(|c| c.path_in_schema.join(".") == path)
    }
}

/// Recursively builds one node (and, for groups, its subtree) starting at
/// `elements[index]`, returning the node and the index just past everything it
/// consumed. `parent_path`/`parent_max_def`/`parent_max_rep` carry the accumulated
/// state down from the root.
fn build_node(
    elements: &[SchemaElement],
    index: usize,
    parent_path: &[String],
    parent_max_def: i16,
    parent_max_rep: i16,
    leaves: &mut Vec<ColumnDescriptor>,
) -> Result<(SchemaNode, usize)> {
    let element = elements
        .get(index)
        .ok_or_else(|| oos!("schema element list truncated"))?;

    let repetition = match element.repetition_type {
        Some(r) => Repetition::try_from(r)?,
        // the root's immediate children are always required to carry a repetition,
        // but be lenient and treat an absent one as REQUIRED rather than reject it.
        None => Repetition::Required,
    };

    let max_definition_level = parent_max_def + (repetition != Repetition::Required) as i16;
    let max_repetition_level = parent_max_rep + (repetition == Repetition::Repeated) as i16;

    let mut path = parent_path.to_vec();
    path.push(element.name.clone());

    match element.num_children {
        None | Some(0) => {
            let physical_type = PhysicalType::try_new(
                element
                    .type_
                    .ok_or_else(|| oos!("leaf schema element '{}' is missing its physical type", element.name))?,
                element.type_length,
            )?;
            let logical_type = match element.logical_type.clone() {
                Some(lt) => Some(PrimitiveLogicalType::try_from(lt)?),
                None => element.converted_type.and_then(primitive_logical_type_from_converted),
            };
            let column_index = leaves.len();
            leaves.push(ColumnDescriptor {
                path_in_schema: path.clone(),
                physical_type,
                logical_type,
                repetition,
                max_definition_level,
                max_repetition_level,
            });
            Ok((
                SchemaNode::Primitive {
                    name: element.name.clone(),
                    repetition,
                    physical_type,
                    logical_type,
                    max_definition_level,
                    max_repetition_level,
                    column_index,
                },
                index + 1,
            ))
        }
        Some(num_children) => {
            let logical_type = match element.logical_type.clone() {
                Some(lt) => Some(GroupLogicalType::try_from(lt)?),
                None => element.converted_type.and_then(group_logical_type_from_converted),
            };
            let mut cursor = index + 1;
            let mut children = Vec::with_capacity(num_children as usize);
            for _ in 0..num_children {
                let (child, next) = build_node(
                    elements,
                    cursor,
                    &path,
                    max_definition_level,
                    max_repetition_level,
                    leaves,
                )?;
                children.push(child);
                cursor = next;
            }
            Ok((
                SchemaNode::Group {
                    name: element.name.clone(),
                    repetition,
                    logical_type,
                    max_definition_level,
                    max_repetition_level,
                    children,
                },
                cursor,
            ))
        }
    }
}

/// Checks that `other` can be read together with `self` for every column `projection`
/// selects: a projected leaf present in both must agree on physical type, and a
/// projected leaf of `self` must also exist in `other` by the same name and path — a
/// column renamed or dropped in `other` is a `SchemaIncompatible` error, not a silent
/// all-null read. Non-projected leaves are not checked either way.
pub fn check_compatible(reference: &SchemaTree, other: &SchemaTree, projection: &Projection) -> Result<()> {
    for leaf in &other.leaves {
        let path = leaf.path_in_schema.join(".");
        if !projection.includes(&path) {
            continue;
        }
        if let Some(reference_leaf) = reference.column(&path) {
            if reference_leaf.physical_type != leaf.physical_type {
                return Err(Error::SchemaIncompatible {
                    column: leaf.name().to_string(),
                    path,
                    reason: format!(
                        "{:?} in one file, {:?} in another",
                        reference_leaf.physical_type, leaf.physical_type
                    ),
                });
            }
        }
    }
    for leaf in &reference.leaves {
        let path = leaf.path_in_schema.join(".");
        if !projection.includes(&path) {
            continue;
        }
        if other.column(&path).is_none() {
            return Err(Error::SchemaIncompatible {
                column: leaf.name().to_string(),
                path,
                reason: "column is missing from a later file".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parquet_format_safe::FieldRepetitionType;

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

    fn group(name: &str, repetition: Option<FieldRepetitionType>, num_children: i32) -> SchemaElement {
        SchemaElement {
            type_: None,
            type_length: None,
            repetition_type: repetition,
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
    fn flat_required_and_optional_columns() {
        let elements = vec![
            group("schema", None, 2),
            leaf("id", FieldRepetitionType::REQUIRED, ThriftPhysicalType::INT64),
            leaf("name", FieldRepetitionType::OPTIONAL, ThriftPhysicalType::BYTE_ARRAY),
        ];
        let tree = SchemaTree::try_from_thrift(&elements).unwrap();
        assert_eq!(tree.leaves.len(), 2);
        assert_eq!(tree.leaves[0].path_in_schema, vec!["id"]);
        assert_eq!(tree.leaves[0].max_definition_level, 0);
        assert_eq!(tree.leaves[1].path_in_schema, vec!["name"]);
        assert_eq!(tree.leaves[1].max_definition_level, 1);
    }

    #[test]
    fn nested_group_accumulates_levels() {
        let elements = vec![
            group("schema", None, 1),
            group("address", Some(FieldRepetitionType::OPTIONAL), 1),
            leaf("city", FieldRepetitionType::REQUIRED, ThriftPhysicalType::BYTE_ARRAY),
        ];
        let tree = SchemaTree::try_from_thrift(&elements).unwrap();
        assert_eq!(tree.leaves[0].path_in_schema, vec!["address", "city"]);
        // required leaf under one optional ancestor: def level comes only from the group.
        assert_eq!(tree.leaves[0].max_definition_level, 1);
        assert_eq!(tree.leaves[0].max_repetition_level, 0);
    }

    #[test]
    fn repeated_group_is_a_list_like_element() {
        let elements = vec![
            group("schema", None, 1),
            group("values", Some(FieldRepetitionType::REPEATED), 1),
            leaf("item", FieldRepetitionType::REQUIRED, ThriftPhysicalType::INT32),
        ];
        let tree = SchemaTree::try_from_thrift(&elements).unwrap();
        assert_eq!(tree.leaves[0].max_repetition_level, 1);
        assert_eq!(tree.leaves[0].max_definition_level, 1);
    }

    #[test]
    fn incompatible_physical_type_is_rejected() {
        let a = SchemaTree::try_from_thrift(&[
            group("schema", None, 1),
            leaf("x", FieldRepetitionType::REQUIRED, ThriftPhysicalType::INT32),
        ])
        .unwrap();
        let b = SchemaTree::try_from_thrift(&[
            group("schema", None, 1),
            leaf("x", FieldRepetitionType::REQUIRED, ThriftPhysicalType::INT64),
        ])
        .unwrap();
        assert!(check_compatible(&a, &b, &crate::projection::Projection::All).is_err());
    }

    #[test]
    fn renamed_projected_column_in_a_later_file_is_rejected() {
        let a = SchemaTree::try_from_thrift(&[
            group("schema", None, 2),
            leaf("id", FieldRepetitionType::REQUIRED, ThriftPhysicalType::INT64),
            leaf("name", FieldRepetitionType::REQUIRED, ThriftPhysicalType::BYTE_ARRAY),
        ])
        .unwrap();
        let b = SchemaTree::try_from_thrift(&[
            group("schema", None, 2),
            leaf("id", FieldRepetitionType::REQUIRED, ThriftPhysicalType::INT64),
            leaf("full_name", FieldRepetitionType::REQUIRED, ThriftPhysicalType::BYTE_ARRAY),
        ])
        .unwrap();
        let err = check_compatible(&a, &b, &crate::projection::Projection::All).unwrap_err();
        assert!(matches!(err, Error::SchemaIncompatible { ref column, .. } if column == "name"));
    }

    #[test]
    fn dropped_column_not_in_the_projection_is_ignored() {
        let a = SchemaTree::try_from_thrift(&[
            group("schema", None, 2),
            leaf("id", FieldRepetitionType::REQUIRED, ThriftPhysicalType::INT64),
            leaf("name", FieldRepetitionType::REQUIRED, ThriftPhysicalType::BYTE_ARRAY),
        ])
        .unwrap();
        let b = SchemaTree::try_from_thrift(&[
            group("schema", None, 1),
            leaf("id", FieldRepetitionType::REQUIRED, ThriftPhysicalType::INT64),
        ])
        .unwrap();
        let projection = crate::projection::Projection::fields(["id"]);
        assert!(check_compatible(&a, &b, &projection).is_ok());
    }
}
