//! A row-buffering writer that stably sorts rows before they are turned into pages.
//!
//! This crate's write path is page-based: callers turn already-typed arrays into
//! [`CompressedPage`](crate::page::CompressedPage)s themselves (see `write_column_chunk`), so
//! there is no generic in-library `Value` type to sort. [`RowBuffer`] instead operates over
//! a caller-chosen row representation `R: Ord`, whose ordering must agree with the
//! [`SortingColumn`] list the row group declares; turning `R` into pages remains the
//! caller's job, exactly as array-to-page encoding already is everywhere else in `write`.
use std::cmp::Reverse;
use std::collections::BinaryHeap;

pub use parquet_format_safe::SortingColumn;

use super::DynIter;

/// Buffers rows, stably sorting and spilling a chunk every time `sort_row_count` rows have
/// accumulated, then merges every spilled chunk with a k-way heap merge on [`finish`](Self::finish).
pub struct RowBuffer<R> {
    sort_row_count: usize,
    current: Vec<R>,
    chunks: Vec<Vec<R>>,
}

impl<R: Ord> RowBuffer<R> {
    pub fn new(sort_row_count: usize) -> Self {
        assert!(sort_row_count > 0, "sort_row_count must be positive");
        Self {
            sort_row_count,
            current: Vec::new(),
            chunks: Vec::new(),
        }
    }

    /// The number of rows buffered so far, across both the active chunk and every chunk
    /// already spilled (but not yet merged).
    pub fn len(&self) -> usize {
        self.current.len() + self.chunks.iter().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&mut self, row: R) {
        self.current.push(row);
        if self.current.len() >= self.sort_row_count {
            self.spill();
        }
    }

    /// Stably sorts the active chunk and moves it into `chunks`, resetting the active chunk.
    /// A no-op if the active chunk is empty.
    fn spill(&mut self) {
        if self.current.is_empty() {
            return;
        }
        // `Vec::sort` is a stable sort: ties preserve insertion order within the chunk.
        self.current.sort();
        self.chunks.push(std::mem::take(&mut self.current));
    }

    /// Sorts any rows left in the active chunk, then k-way merges every spilled chunk into
    /// one globally sorted sequence. Ties are broken by input order: a row from an earlier
    /// chunk sorts before an equal-keyed row from a later one, and within a chunk the stable
    /// sort above already preserves arrival order.
    pub fn finish(mut self) -> Vec<R> {
        self.spill();
        k_way_merge(self.chunks)
    }
}

struct HeapEntry<R> {
    row: R,
    chunk: usize,
    pos: usize,
}

impl<R: PartialEq> PartialEq for HeapEntry<R> {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row && self.chunk == other.chunk && self.pos == other.pos
    }
}
impl<R: Eq> Eq for HeapEntry<R> {}

impl<R: Ord> PartialOrd for HeapEntry<R> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<R: Ord> Ord for HeapEntry<R> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.row
            .cmp(&other.row)
            .then(self.chunk.cmp(&other.chunk))
            .then(self.pos.cmp(&other.pos))
    }
}

/// Merges `chunks`, each already sorted ascending, into one sorted `Vec`. Ties are broken
/// by chunk index (lower is earlier input) and then by position within the chunk.
fn k_way_merge<R: Ord>(chunks: Vec<Vec<R>>) -> Vec<R> {
    let total: usize = chunks.iter().map(Vec::len).sum();
    let mut iters: Vec<_> = chunks.into_iter().map(|c| c.into_iter()).collect();

    let mut heap = BinaryHeap::with_capacity(iters.len());
    for (chunk, iter) in iters.iter_mut().enumerate() {
        if let Some(row) = iter.next() {
            heap.push(Reverse(HeapEntry { row, chunk, pos: 0 }));
        }
    }

    let mut next_pos = vec![1usize; iters.len()];
    let mut merged = Vec::with_capacity(total);
    while let Some(Reverse(entry)) = heap.pop() {
        let chunk = entry.chunk;
        merged.push(entry.row);
        if let Some(row) = iters[chunk].next() {
            let pos = next_pos[chunk];
            next_pos[chunk] += 1;
            heap.push(Reverse(HeapEntry { row, chunk, pos }));
        }
    }
    merged
}

/// Reorders a row group's per-column iterators (typically a [`super::RowGroupIter`], one
/// entry per column) so that position `i` in the returned iterator always holds the column
/// for leaf `target_order[i]`, regardless of what order `columns` originally held them in
/// (`source_order[i]` names the leaf that the column currently at position `i` belongs to).
///
/// This is the guard against the classic sorting-writer defect: naively concatenating column
/// iterators from row groups whose column order doesn't already match the target schema
/// silently writes a column's bytes under the wrong leaf. In debug builds this additionally
/// asserts the "value's columnIndex equals the target leaf index" invariant at the column
/// granularity this crate's write path actually exposes (individual decoded values never pass
/// through this layer; only whole per-column page iterators do).
pub fn convert_row_group<'a, V>(
    columns: DynIter<'a, V>,
    source_order: &[usize],
    target_order: &[usize],
) -> DynIter<'a, V> {
    assert_eq!(
        source_order.len(),
        target_order.len(),
        "convert_row_group: source and target must name the same number of columns"
    );
    let materialized: Vec<_> = columns.collect();
    assert_eq!(materialized.len(), source_order.len());

    let mut tagged: Vec<(usize, _)> = materialized
        .into_iter()
        .zip(source_order.iter())
        .map(|(col, &leaf)| {
            let target_pos = target_order
                .iter()
                .position(|&t| t == leaf)
                .expect("convert_row_group: source column's leaf absent from target schema");
            (target_pos, col)
        })
        .collect();

    tagged.sort_by_key(|(target_pos, _)| *target_pos);

    if cfg!(debug_assertions) {
        for (expected_pos, (pos, _)) in tagged.iter().enumerate() {
            debug_assert_eq!(
                *pos, expected_pos,
                "convert_row_group: columnIndex invariant violated; expected leaf {} at slot {} (tag {}), found column still tagged for slot {}",
                target_order[expected_pos], expected_pos, !(expected_pos as i64), pos
            );
        }
    }

    DynIter::new(tagged.into_iter().map(|(_, col)| col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_within_a_single_chunk() {
        let mut buffer = RowBuffer::new(100);
        for v in [5, 3, 1, 4, 2] {
            buffer.push(v);
        }
        assert_eq!(buffer.finish(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn merges_across_spilled_chunks() {
        // sort_row_count = 3 forces two spills across 7 pushes.
        let mut buffer = RowBuffer::new(3);
        for v in [9, 1, 5, 2, 8, 3, 0] {
            buffer.push(v);
        }
        assert_eq!(buffer.finish(), vec![0, 1, 2, 3, 5, 8, 9]);
    }

    #[test]
    fn ties_preserve_input_order_across_chunks() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct Row {
            key: i32,
            seq: i32,
        }
        impl PartialOrd for Row {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }
        impl Ord for Row {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                // Ordering only considers `key`, so equal-key rows are genuine ties.
                self.key.cmp(&other.key)
            }
        }

        let mut buffer = RowBuffer::new(2);
        let rows = [
            Row { key: 1, seq: 0 },
            Row { key: 1, seq: 1 },
            Row { key: 1, seq: 2 },
            Row { key: 1, seq: 3 },
        ];
        for row in rows {
            buffer.push(row);
        }
        let merged = buffer.finish();
        let seqs: Vec<_> = merged.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3]);
    }

    #[test]
    fn convert_row_group_reorders_to_target_schema() {
        let columns: DynIter<'_, &str> = DynIter::new(vec!["a", "b", "c"].into_iter());
        // Source holds leaves [2, 0, 1]; target wants canonical order [0, 1, 2].
        let converted = convert_row_group(columns, &[2, 0, 1], &[0, 1, 2]);
        let result: Vec<_> = converted.collect();
        assert_eq!(result, vec!["b", "c", "a"]);
    }
}
