//! Dremel-style record assembly: reconstructs nested [`Value`] trees from the flat,
//! per-leaf repetition/definition level streams a column's decoded pages carry.
//!
//! Supports arbitrarily deep struct nesting, and one level of list/map repetition
//! (covering the common `repeated group` and 3-level `LIST`/`MAP` encodings). Deeper
//! repetition (lists of lists, maps of lists, ...) is out of scope: such a leaf's
//! `max_repetition_level` would exceed 1 relative to its nearest repeated ancestor,
//! which this assembler does not attempt to disambiguate.

use crate::error::{oos, Result};
use crate::page::Page;
use crate::parquet_bridge::{GroupLogicalType, Repetition};
use crate::record::field_path;
use crate::record::value::Value;
use crate::schema::{SchemaNode, SchemaTree};
use std::collections::HashMap;

/// One leaf's concatenated values across every page read for it, plus a read cursor.
struct LeafCursor {
    repetition_levels: Vec<i32>,
    values: Vec<Value>,
    pos: usize,
}

impl LeafCursor {
    fn is_exhausted(&self) -> bool {
        self.pos >= self.values.len()
    }

    fn next_repetition_level(&self) -> Option<i32> {
        self.repetition_levels.get(self.pos).copied()
    }

    fn take(&mut self) -> Value {
        let v = self.values[self.pos].clone();
        self.pos += 1;
        v
    }
}

/// Flattens one column's pages into parallel repetition-level/value vectors, using
/// `Value::Null` for every slot whose definition level falls short of the leaf's
/// maximum (i.e. the leaf, or one of its ancestors, is absent for that slot).
fn page_to_slots(page: &Page) -> (Vec<i32>, Vec<Value>) {
    let num_values = page.num_values();
    let max_def = page.max_definition_level();
    let repetition_levels = page.repetition_levels().map(<[i32]>::to_vec).unwrap_or_else(|| vec![0; num_values]);
    let definition_levels: Vec<i16> = page
        .definition_levels()
        .map(|l| l.iter().map(|&d| d as i16).collect())
        .unwrap_or_else(|| vec![max_def; num_values]);

    macro_rules! build {
        ($values:expr, $wrap:expr) => {
            $values
                .iter()
                .zip(&definition_levels)
                .map(|(v, &d)| if d >= max_def { $wrap(v.clone()) } else { Value::Null })
                .collect()
        };
    }
    let values: Vec<Value> = match page {
        Page::Int(p) => build!(p.values, Value::Int),
        Page::Long(p) => build!(p.values, Value::Long),
        Page::Float(p) => build!(p.values, Value::Float),
        Page::Double(p) => build!(p.values, Value::Double),
        Page::Boolean(p) => build!(p.values, Value::Boolean),
        Page::ByteArray(p) => build!(p.values, Value::ByteArray),
    };
    (repetition_levels, values)
}

fn build_cursor(pages: &[Page]) -> LeafCursor {
    let mut repetition_levels = Vec::new();
    let mut values = Vec::new();
    for page in pages {
        let (rep, val) = page_to_slots(page);
        repetition_levels.extend(rep);
        values.extend(val);
    }
    LeafCursor {
        repetition_levels,
        values,
        pos: 0,
    }
}

/// Assembles every record across `columns`' concatenated pages, walking `schema`'s
/// group tree once per record. `columns` is keyed by dotted leaf path, matching
/// [`crate::file_manager::OpenedFile::columns`].
pub fn assemble_records(schema: &SchemaTree, columns: &HashMap<String, Vec<Page>>) -> Result<Vec<Vec<(String, Value)>>> {
    let mut leaves = Vec::with_capacity(schema.leaves.len());
    for leaf in field_path::build(schema) {
        let path = leaf.path.join(".");
        let pages = columns
            .get(&path)
            .ok_or_else(|| oos!("column '{}' was not read for record assembly", path))?;
        leaves.push(build_cursor(pages));
    }

    let mut records = Vec::new();
    loop {
        if leaves.first().map(LeafCursor::is_exhausted).unwrap_or(true) {
            break;
        }
        let mut fields = Vec::with_capacity(schema.fields.len());
        for node in &schema.fields {
            fields.push((node.name().to_string(), assemble_field(node, &mut leaves)));
        }
        records.push(fields);
    }
    Ok(records)
}

fn assemble_field(node: &SchemaNode, leaves: &mut [LeafCursor]) -> Value {
    match node {
        SchemaNode::Primitive {
            column_index,
            repetition,
            max_repetition_level,
            ..
        } => {
            if *repetition == Repetition::Repeated {
                Value::List(assemble_repeated_primitive(leaves, *column_index, *max_repetition_level))
            } else {
                leaves[*column_index].take()
            }
        }
        SchemaNode::Group {
            repetition,
            logical_type,
            max_repetition_level,
            children,
            ..
        } => {
            // the 3-level LIST/MAP encoding wraps its single repeated child in an
            // optional group annotated LIST/MAP; flatten straight through to it.
            if matches!(logical_type, Some(GroupLogicalType::List) | Some(GroupLogicalType::Map)) && children.len() == 1 {
                return assemble_field(&children[0], leaves);
            }
            if *repetition == Repetition::Repeated {
                Value::List(assemble_repeated_group(children, leaves, *max_repetition_level))
            } else {
                let fields = children
                    .iter()
                    .map(|child| (child.name().to_string(), assemble_field(child, leaves)))
                    .collect();
                Value::Group(fields)
            }
        }
    }
}

fn assemble_repeated_primitive(leaves: &mut [LeafCursor], column_index: usize, own_rep_level: i16) -> Vec<Value> {
    let mut elements = Vec::new();
    loop {
        let cursor = &mut leaves[column_index];
        let value = cursor.take();
        if !value.is_null() {
            elements.push(value);
        }
        match cursor.next_repetition_level() {
            Some(level) if level as i16 >= own_rep_level => continue,
            _ => break,
        }
    }
    elements
}

fn assemble_repeated_group(children: &[SchemaNode], leaves: &mut [LeafCursor], own_rep_level: i16) -> Vec<Value> {
    let driver = first_leaf_column_index(&children[0]);
    let mut elements = Vec::new();
    loop {
        let fields = children
            .iter()
            .map(|child| (child.name().to_string(), assemble_field(child, leaves)))
            .collect();
        elements.push(Value::Group(fields));
        match leaves[driver].next_repetition_level() {
            Some(level) if level as i16 >= own_rep_level => continue,
            _ => break,
        }
    }
    elements
}

fn first_leaf_column_index(node: &SchemaNode) -> usize {
    match node {
        SchemaNode::Primitive { column_index, .. } => *column_index,
        SchemaNode::Group { children, .. } => first_leaf_column_index(&children[0]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::TypedPage;
    use parquet_format_safe::{FieldRepetitionType, SchemaElement, Type as ThriftPhysicalType};

    fn leaf_element(name: &str, repetition: FieldRepetitionType, type_: ThriftPhysicalType) -> SchemaElement {
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

    fn group_element(name: &str, repetition: Option<FieldRepetitionType>, num_children: i32) -> SchemaElement {
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
    fn flat_required_columns_assemble_one_record_per_row() {
        let schema = SchemaTree::try_from_thrift(&[
            group_element("schema", None, 2),
            leaf_element("id", FieldRepetitionType::REQUIRED, ThriftPhysicalType::INT64),
            leaf_element("name", FieldRepetitionType::REQUIRED, ThriftPhysicalType::BYTE_ARRAY),
        ])
        .unwrap();

        let mut columns = HashMap::new();
        columns.insert(
            "id".to_string(),
            vec![Page::Long(TypedPage {
                values: vec![1, 2],
                definition_levels: None,
                repetition_levels: None,
                max_definition_level: 0,
                num_values: 2,
            })],
        );
        columns.insert(
            "name".to_string(),
            vec![Page::ByteArray(TypedPage {
                values: vec![b"a".to_vec(), b"b".to_vec()],
                definition_levels: None,
                repetition_levels: None,
                max_definition_level: 0,
                num_values: 2,
            })],
        );

        let records = assemble_records(&schema, &columns).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], vec![("id".to_string(), Value::Long(1)), ("name".to_string(), Value::ByteArray(b"a".to_vec()))]);
        assert_eq!(records[1][0].1, Value::Long(2));
    }

    #[test]
    fn optional_column_surfaces_nulls() {
        let schema = SchemaTree::try_from_thrift(&[
            group_element("schema", None, 1),
            leaf_element("name", FieldRepetitionType::OPTIONAL, ThriftPhysicalType::BYTE_ARRAY),
        ])
        .unwrap();
        let mut columns = HashMap::new();
        columns.insert(
            "name".to_string(),
            vec![Page::ByteArray(TypedPage {
                values: vec![b"a".to_vec(), Vec::new()],
                definition_levels: Some(vec![1, 0]),
                repetition_levels: None,
                max_definition_level: 1,
                num_values: 2,
            })],
        );
        let records = assemble_records(&schema, &columns).unwrap();
        assert_eq!(records[0][0].1, Value::ByteArray(b"a".to_vec()));
        assert_eq!(records[1][0].1, Value::Null);
    }

    #[test]
    fn repeated_primitive_groups_into_a_list_per_record() {
        let schema = SchemaTree::try_from_thrift(&[
            group_element("schema", None, 1),
            leaf_element("tags", FieldRepetitionType::REPEATED, ThriftPhysicalType::INT32),
        ])
        .unwrap();
        let mut columns = HashMap::new();
        // record 0: [1, 2]; record 1: [] (absent slot); record 2: [3]
        columns.insert(
            "tags".to_string(),
            vec![Page::Int(TypedPage {
                values: vec![1, 2, 0, 3],
                definition_levels: Some(vec![1, 1, 0, 1]),
                repetition_levels: Some(vec![0, 1, 0, 0]),
                max_definition_level: 1,
                num_values: 4,
            })],
        );
        let records = assemble_records(&schema, &columns).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0][0].1, Value::List(vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(records[1][0].1, Value::List(vec![]));
        assert_eq!(records[2][0].1, Value::List(vec![Value::Int(3)]));
    }
}
