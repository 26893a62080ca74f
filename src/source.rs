//! The external chunk-source contract. Loaders (CSV/Parquet/JSON/DB) live
//! outside this crate; they only need to hand over `Chunk`s in this shape.

use crate::error::ProfilerError;

/// One column's values for a single chunk, in row order. The source hands
/// over whichever typed representation it already has; the accumulator
/// treats all variants uniformly through [`RawValue`].
#[derive(Debug, Clone)]
pub enum ColumnView {
    Strings(Vec<Option<String>>),
    Integers(Vec<Option<i64>>),
    Floats(Vec<Option<f64>>),
    Booleans(Vec<Option<bool>>),
}

impl ColumnView {
    pub fn len(&self) -> usize {
        match self {
            ColumnView::Strings(v) => v.len(),
            ColumnView::Integers(v) => v.len(),
            ColumnView::Floats(v) => v.len(),
            ColumnView::Booleans(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A uniform row-value view regardless of the source's native column
    /// representation.
    pub fn raw(&self, row: usize) -> RawValue<'_> {
        match self {
            ColumnView::Strings(v) => match v.get(row).and_then(|o| o.as_deref()) {
                Some(s) => RawValue::Str(s),
                None => RawValue::Null,
            },
            ColumnView::Integers(v) => match v.get(row).and_then(|o| *o) {
                Some(i) => RawValue::Int(i),
                None => RawValue::Null,
            },
            ColumnView::Floats(v) => match v.get(row).and_then(|o| *o) {
                Some(f) => RawValue::Float(f),
                None => RawValue::Null,
            },
            ColumnView::Booleans(v) => match v.get(row).and_then(|o| *o) {
                Some(b) => RawValue::Bool(b),
                None => RawValue::Null,
            },
        }
    }
}

/// A single cell value, normalized across whatever native representation
/// the source used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    Null,
    Str(&'a str),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// One batch of rows sharing a single schema (column-name list).
#[derive(Debug, Clone)]
pub struct Chunk {
    pub row_count: usize,
    pub column_names: Vec<String>,
    columns: Vec<ColumnView>,
}

impl Chunk {
    pub fn new(column_names: Vec<String>, columns: Vec<ColumnView>) -> Self {
        let row_count = columns.first().map_or(0, ColumnView::len);
        Self {
            row_count,
            column_names,
            columns,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnView> {
        let idx = self.column_names.iter().position(|c| c == name)?;
        self.columns.get(idx)
    }

    pub fn column_at(&self, idx: usize) -> Option<&ColumnView> {
        self.columns.get(idx)
    }
}

/// The sole consumed contract: an ordered, finite sequence of row batches.
/// Every `Chunk` after the first must share the first chunk's
/// `column_names`; a violation surfaces as [`ProfilerError::BadChunkSchema`].
pub trait ChunkSource {
    /// Returns the next chunk, or `None` when the source is exhausted.
    /// Errors from the source propagate as fatal; a partially processed
    /// profile is discarded.
    fn next_chunk(&mut self) -> Result<Option<Chunk>, ProfilerError>;
}

/// An in-memory chunk source for tests and synthetic-data scenarios.
pub struct InMemoryChunkSource {
    chunks: std::collections::VecDeque<Chunk>,
}

impl InMemoryChunkSource {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks: chunks.into(),
        }
    }
}

impl ChunkSource for InMemoryChunkSource {
    fn next_chunk(&mut self) -> Result<Option<Chunk>, ProfilerError> {
        Ok(self.chunks.pop_front())
    }
}
