//! Cell comments collected per sheet
//!
//! Comments are keyed by a single-cell [`CellRange`] and kept until the sheet
//! closes, at which point they are sorted and handed to the sink as one
//! [`CommentBatch`] with its own author table.
//!
//! ```rust
//! use duke_stream_core::{CellRange, CommentCollector};
//!
//! let mut comments = CommentCollector::new();
//! comments.add(CellRange::parse("B2").unwrap(), "Check this", "Ann").unwrap();
//! comments.add(CellRange::parse("A1").unwrap(), "Header", "Bo").unwrap();
//!
//! let batch = comments.into_batch().unwrap();
//! assert_eq!(batch.authors, vec!["Bo", "Ann"]);
//! assert_eq!(batch.comments[0].cell.to_string(), "A1");
//! ```

use crate::error::{Error, Result};
use crate::range::CellRange;
use ahash::{AHashMap, AHashSet};

/// One comment ready for serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    /// Target cell, without sheet qualifier or absolute markers
    pub cell: CellRange,
    pub text: String,
    /// Index into [`CommentBatch::authors`]
    pub author_index: usize,
}

/// All comments of one sheet, ordered by cell
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentBatch {
    pub authors: Vec<String>,
    pub comments: Vec<CommentRecord>,
}

impl CommentBatch {
    pub fn author(&self, record: &CommentRecord) -> Option<&str> {
        self.authors.get(record.author_index).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct PendingComment {
    cell: CellRange,
    text: String,
    author: String,
}

/// Accumulates the comments of the open sheet
#[derive(Debug, Default)]
pub struct CommentCollector {
    pending: Vec<PendingComment>,
    cells: AHashSet<(u32, u32)>,
}

impl CommentCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a comment for a single cell
    ///
    /// Fails with [`Error::NotSingleCell`] for wider ranges and with
    /// [`Error::DuplicateComment`] when the cell already has one.
    pub fn add(
        &mut self,
        range: CellRange,
        text: impl Into<String>,
        author: impl Into<String>,
    ) -> Result<()> {
        if !range.is_single_cell() {
            return Err(Error::NotSingleCell(range.to_string()));
        }

        let key = (range.start_column(), range.start_row());
        let cell = range.without_sheet().with_absolute(false, false);
        if !self.cells.insert(key) {
            return Err(Error::DuplicateComment(cell.to_string()));
        }

        self.pending.push(PendingComment {
            cell,
            text: text.into(),
            author: author.into(),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Sort the comments by cell and build the author table
    ///
    /// Authors are indexed in order of first appearance after sorting.
    /// Returns `None` when nothing was collected.
    pub fn into_batch(self) -> Option<CommentBatch> {
        if self.pending.is_empty() {
            return None;
        }

        let mut pending = self.pending;
        pending.sort_by(|a, b| a.cell.cmp(&b.cell));

        let mut authors = Vec::new();
        let mut author_index: AHashMap<String, usize> = AHashMap::new();
        let comments = pending
            .into_iter()
            .map(|c| {
                let idx = *author_index.entry(c.author.clone()).or_insert_with(|| {
                    authors.push(c.author);
                    authors.len() - 1
                });
                CommentRecord {
                    cell: c.cell,
                    text: c.text,
                    author_index: idx,
                }
            })
            .collect();

        Some(CommentBatch { authors, comments })
    }
}
