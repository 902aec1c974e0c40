use anyhow::{Result, anyhow};

/// Dense document-by-topic weight matrix stored row major
///
/// Row `i` holds the topic weights of the document at corpus position `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicMatrix {
    n_rows: usize,
    n_columns: usize,
    weights: Vec<f64>,
}

impl TopicMatrix {
    /// Build from row-major weights with `n_columns` entries per row
    pub fn from_row_major(n_columns: usize, weights: Vec<f64>) -> Result<Self> {
        if n_columns == 0 {
            if !weights.is_empty() {
                return Err(anyhow!(
                    "Topic matrix has {} weights but no columns.",
                    weights.len()
                ));
            }
            return Ok(Self::default());
        }
        if weights.len() % n_columns != 0 {
            return Err(anyhow!(
                "Topic matrix has {} weights which is not a multiple of {n_columns} columns.",
                weights.len()
            ));
        }
        Ok(Self {
            n_rows: weights.len() / n_columns,
            n_columns,
            weights,
        })
    }

    /// Build from one vector per row; every row must have the same length
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_columns = rows.first().map(Vec::len).unwrap_or_default();
        if let Some(row) = rows.iter().position(|r| r.len() != n_columns) {
            return Err(anyhow!(
                "Topic matrix row {row} has {} weights, expected {n_columns}.",
                rows[row].len()
            ));
        }
        Self::from_row_major(n_columns, rows.into_iter().flatten().collect())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Weights of one row
    ///
    /// # Panics
    ///
    /// If `row >= self.n_rows()`.
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.n_columns;
        &self.weights[start..start + self.n_columns]
    }

    /// Location of the first NaN or infinite weight
    pub fn first_non_finite(&self) -> Option<(usize, usize)> {
        self.weights
            .iter()
            .position(|w| !w.is_finite())
            .map(|i| (i / self.n_columns, i % self.n_columns))
    }
}
