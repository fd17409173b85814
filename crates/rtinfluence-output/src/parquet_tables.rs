//! Arrow/Parquet table writers shared by every output the Result Writer
//! persists in columnar form: the weighted edge list and, when enabled, the
//! per-variant node tables.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use rtinfluence_core::{BaseEdge, Error, NodeTable, Result};

/// One named, typed column for a node table (`node`, `pagerank`, `community`, ...).
pub enum Column {
    Str(Vec<String>),
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl Column {
    fn data_type(&self) -> DataType {
        match self {
            Column::Str(_) => DataType::Utf8,
            Column::Int(_) => DataType::Int64,
            Column::Float(_) => DataType::Float64,
        }
    }

    fn array(&self) -> ArrayRef {
        match self {
            Column::Str(v) => Arc::new(StringArray::from(v.clone())),
            Column::Int(v) => Arc::new(Int64Array::from(v.clone())),
            Column::Float(v) => Arc::new(Float64Array::from(v.clone())),
        }
    }

    fn len(&self) -> usize {
        match self {
            Column::Str(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
        }
    }
}

/// Write a flat columnar table (e.g. a per-variant node table) to `path`, one
/// row group, zstd-compressed to match the event store's own encoding.
pub fn write_table(path: &Path, columns: Vec<(&str, Column)>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let n_rows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
    for (name, col) in &columns {
        if col.len() != n_rows {
            return Err(Error::invariant(format!(
                "column '{name}' has {} rows, expected {n_rows}",
                col.len()
            )));
        }
    }

    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, col)| Field::new(*name, col.data_type(), false))
        .collect();
    let schema = Arc::new(Schema::new(fields));
    let arrays: Vec<ArrayRef> = columns.iter().map(|(_, col)| col.array()).collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(Default::default()))
        .build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Write a variant's base (unfiltered) weighted edge set to `weighted_edges.parquet`.
pub fn write_weighted_edges(path: &Path, edges: &[BaseEdge]) -> Result<()> {
    let src: Vec<String> = edges.iter().map(|e| e.src.clone()).collect();
    let dst: Vec<String> = edges.iter().map(|e| e.dst.clone()).collect();
    let weight: Vec<i64> = edges.iter().map(|e| e.weight).collect();
    write_table(
        path,
        vec![
            ("src", Column::Str(src)),
            ("dst", Column::Str(dst)),
            ("weight", Column::Int(weight)),
        ],
    )
}

/// Write a variant's per-vertex node table (pagerank/community/core
/// number/triangles/strength/degree, plus optional heavy centralities) to
/// `<variant>_nodes.parquet`.
pub fn write_node_table(path: &Path, table: &NodeTable) -> Result<()> {
    let mut columns: Vec<(&str, Column)> = vec![
        ("node", Column::Str(table.node.clone())),
        ("pagerank", Column::Float(table.pagerank.clone())),
        ("community", Column::Int(table.community.clone())),
        ("core_number", Column::Int(table.core_number.clone())),
        ("triangles", Column::Int(table.triangles.clone())),
        ("in_strength", Column::Float(table.in_strength.clone())),
        ("out_strength", Column::Float(table.out_strength.clone())),
        ("in_degree", Column::Int(table.in_degree.clone())),
        ("out_degree", Column::Int(table.out_degree.clone())),
    ];
    if let Some(v) = &table.eigenvector {
        columns.push(("eigenvector", Column::Float(v.clone())));
    }
    if let Some(v) = &table.betweenness {
        columns.push(("betweenness", Column::Float(v.clone())));
    }
    if let Some(v) = &table.closeness {
        columns.push(("closeness", Column::Float(v.clone())));
    }
    write_table(path, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_weighted_edges_through_parquet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weighted_edges.parquet");
        let edges = vec![
            BaseEdge { src: "A".into(), dst: "B".into(), weight: 3 },
            BaseEdge { src: "B".into(), dst: "C".into(), weight: 1 },
        ];
        write_weighted_edges(&path, &edges).unwrap();

        let file = File::open(&path).unwrap();
        let builder = parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let reader = builder.build().unwrap();
        let mut total_rows = 0;
        for batch in reader {
            total_rows += batch.unwrap().num_rows();
        }
        assert_eq!(total_rows, 2);
    }

    #[test]
    fn node_table_round_trips_with_optional_columns_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base_nodes.parquet");
        let table = NodeTable {
            node: vec!["A".into(), "B".into()],
            pagerank: vec![0.5, 0.5],
            community: vec![0, 0],
            core_number: vec![1, 1],
            triangles: vec![0, 0],
            in_strength: vec![1.0, 1.0],
            out_strength: vec![1.0, 1.0],
            in_degree: vec![1, 1],
            out_degree: vec![1, 1],
            eigenvector: Some(vec![0.7, 0.7]),
            betweenness: None,
            closeness: None,
        };
        write_node_table(&path, &table).unwrap();

        let file = File::open(&path).unwrap();
        let builder = parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        assert!(builder.schema().index_of("eigenvector").is_ok());
        assert!(builder.schema().index_of("betweenness").is_err());
    }

    #[test]
    fn mismatched_column_lengths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.parquet");
        let result = write_table(
            &path,
            vec![
                ("a", Column::Int(vec![1, 2])),
                ("b", Column::Int(vec![1])),
            ],
        );
        assert!(result.is_err());
    }
}
