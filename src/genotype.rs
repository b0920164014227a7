/// Genotype tables: flattened row-major `i32` buffers viewed as 2-D matrices.
use ndarray::iter::AxisIter;
use ndarray::{ArrayView1, ArrayView2, Ix1};

use crate::error::{Result, ScoreError};

/// Wild-type call (observed) or absent mutation (node).
pub const WILD_TYPE: i32 = 0;
/// Mutant call (observed) or present mutation (node).
pub const MUTANT: i32 = 1;
/// No information for this cell and site. Only valid in observed tables.
pub const MISSING: i32 = 2;

/// A validated genotype table borrowed from the caller.
///
/// Rows are cells (observed matrix) or candidate tree nodes (node table),
/// columns are mutation sites. Every entry has been checked against the
/// codes allowed for its table, so lookups by code never fall outside the
/// log-likelihood table.
#[derive(Clone, Copy, Debug)]
pub struct GenotypeTable<'a> {
    data: ArrayView2<'a, i32>,
}

impl<'a> GenotypeTable<'a> {
    /// Wrap an observed cell x site matrix. Entries must be 0, 1 or 2.
    pub fn observed(values: &'a [i32], cells: usize, mutation_number: usize) -> Result<Self> {
        Self::build(values, cells, mutation_number, "observed", MISSING)
    }

    /// Wrap a candidate node x site matrix. Entries must be 0 or 1.
    pub fn nodes(values: &'a [i32], nodes_length: usize, mutation_number: usize) -> Result<Self> {
        Self::build(values, nodes_length, mutation_number, "candidate", MUTANT)
    }

    fn build(
        values: &'a [i32],
        rows: usize,
        columns: usize,
        table: &'static str,
        max_code: i32,
    ) -> Result<Self> {
        let expected = rows
            .checked_mul(columns)
            .ok_or(ScoreError::DimensionMismatch {
                what: table,
                expected: usize::MAX,
                found: values.len(),
            })?;
        if values.len() != expected {
            return Err(ScoreError::DimensionMismatch {
                what: table,
                expected,
                found: values.len(),
            });
        }

        let data = ArrayView2::from_shape((rows, columns), values).map_err(|_| {
            ScoreError::DimensionMismatch {
                what: table,
                expected,
                found: values.len(),
            }
        })?;

        for ((row, column), &value) in data.indexed_iter() {
            if !(WILD_TYPE..=max_code).contains(&value) {
                return Err(ScoreError::InvalidGenotype {
                    table,
                    row,
                    column,
                    value,
                });
            }
        }

        Ok(GenotypeTable { data })
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn mutation_number(&self) -> usize {
        self.data.ncols()
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, i32> {
        self.data.row(index)
    }

    /// Iterate over rows in order.
    pub fn iter_rows(&self) -> AxisIter<'_, i32, Ix1> {
        self.data.outer_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observed_accepts_missing() {
        let values = [0, 1, 2, 2, 1, 0];
        let table = GenotypeTable::observed(&values, 2, 3).unwrap();
        assert_eq!(table.rows(), 2);
        assert_eq!(table.mutation_number(), 3);
        assert_eq!(table.row(1).to_vec(), vec![2, 1, 0]);
    }

    #[test]
    fn test_nodes_reject_missing() {
        let values = [0, 1, 1, 2];
        match GenotypeTable::nodes(&values, 2, 2) {
            Err(ScoreError::InvalidGenotype {
                table,
                row,
                column,
                value,
            }) => {
                assert_eq!(table, "candidate");
                assert_eq!((row, column, value), (1, 1, 2));
            }
            other => panic!("expected InvalidGenotype, got {:?}", other),
        }
    }

    #[test]
    fn test_observed_rejects_negative_code() {
        let values = [0, -1];
        assert!(matches!(
            GenotypeTable::observed(&values, 1, 2),
            Err(ScoreError::InvalidGenotype { value: -1, .. })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let values = [0, 1, 0, 1];
        assert!(matches!(
            GenotypeTable::nodes(&values, 2, 3),
            Err(ScoreError::DimensionMismatch {
                expected: 6,
                found: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_overflowing_dimensions() {
        let values = [0];
        assert!(matches!(
            GenotypeTable::observed(&values, usize::MAX, 2),
            Err(ScoreError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_table() {
        let table = GenotypeTable::observed(&[], 0, 4).unwrap();
        assert_eq!(table.rows(), 0);
        assert_eq!(table.iter_rows().count(), 0);
    }
}
