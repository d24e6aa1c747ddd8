use crate::dtype::Float;
use crate::error::{MatrixError, MatrixResult};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Dense 2-D matrix, the basic data structure of Boltzmann.
///
/// Stores data in a flat contiguous `Vec<T>` with row-major layout. Feature
/// matrices follow the convention rows = features, columns = samples, so a
/// mini-batch is a contiguous range of columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct Matrix<T: Float> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl<T: Float> Matrix<T> {
    /// Create a matrix from raw row-major data.
    pub fn new(data: Vec<T>, rows: usize, cols: usize) -> MatrixResult<Self> {
        if data.len() != rows * cols {
            return Err(MatrixError::DataLength {
                len: data.len(),
                rows,
                cols,
            });
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Create a matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix::full(rows, cols, T::ZERO)
    }

    /// Create a matrix filled with a constant value.
    pub fn full(rows: usize, cols: usize, value: T) -> Self {
        Matrix {
            data: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    /// Create a matrix from a slice of rows.
    pub fn from_vec2d(data: &[Vec<T>]) -> MatrixResult<Self> {
        if data.is_empty() {
            return Ok(Matrix::zeros(0, 0));
        }
        let rows = data.len();
        let cols = data[0].len();
        if let Some(bad) = data.iter().find(|r| r.len() != cols) {
            return Err(MatrixError::ShapeMismatch {
                expected: (rows, cols),
                got: (rows, bad.len()),
            });
        }
        let flat: Vec<T> = data.iter().flat_map(|r| r.iter().copied()).collect();
        Matrix::new(flat, rows, cols)
    }

    /// Create a matrix whose columns are the given vectors (one sample per column).
    pub fn from_columns(columns: &[Vec<T>]) -> MatrixResult<Self> {
        if columns.is_empty() {
            return Err(MatrixError::EmptyMatrix);
        }
        Ok(Matrix::from_vec2d(columns)?.t())
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    fn check_index(&self, i: usize, j: usize) -> MatrixResult<()> {
        if i >= self.rows {
            return Err(MatrixError::IndexOutOfBounds {
                index: i,
                axis: 0,
                size: self.rows,
            });
        }
        if j >= self.cols {
            return Err(MatrixError::IndexOutOfBounds {
                index: j,
                axis: 1,
                size: self.cols,
            });
        }
        Ok(())
    }

    /// Checked element access.
    pub fn get(&self, i: usize, j: usize) -> MatrixResult<T> {
        self.check_index(i, j)?;
        Ok(self.data[i * self.cols + j])
    }

    /// Checked element write.
    pub fn set(&mut self, i: usize, j: usize, value: T) -> MatrixResult<()> {
        self.check_index(i, j)?;
        self.data[i * self.cols + j] = value;
        Ok(())
    }

    /// Borrow row `i`. Panics if `i` is out of range.
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Copy out column `j`.
    pub fn column(&self, j: usize) -> MatrixResult<Vec<T>> {
        if j >= self.cols {
            return Err(MatrixError::IndexOutOfBounds {
                index: j,
                axis: 1,
                size: self.cols,
            });
        }
        Ok((0..self.rows).map(|i| self.data[i * self.cols + j]).collect())
    }

    // ─── Shape Manipulation ─────────────────────────────────────────────────

    /// Transposed copy.
    pub fn t(&self) -> Matrix<T> {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                data.push(self.data[i * self.cols + j]);
            }
        }
        Matrix {
            data,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Copy of rows `start..end`.
    pub fn slice_rows(&self, start: usize, end: usize) -> MatrixResult<Matrix<T>> {
        if start > end || end > self.rows {
            return Err(MatrixError::InvalidRange {
                start,
                end,
                axis: 0,
                size: self.rows,
            });
        }
        Ok(Matrix {
            data: self.data[start * self.cols..end * self.cols].to_vec(),
            rows: end - start,
            cols: self.cols,
        })
    }

    /// Copy of columns `start..end`.
    pub fn slice_cols(&self, start: usize, end: usize) -> MatrixResult<Matrix<T>> {
        if start > end || end > self.cols {
            return Err(MatrixError::InvalidRange {
                start,
                end,
                axis: 1,
                size: self.cols,
            });
        }
        let width = end - start;
        let mut data = Vec::with_capacity(self.rows * width);
        for i in 0..self.rows {
            data.extend_from_slice(&self.row(i)[start..end]);
        }
        Ok(Matrix {
            data,
            rows: self.rows,
            cols: width,
        })
    }

    /// Overwrite rows `start..start + src.rows()` with `src`.
    pub fn assign_rows(&mut self, start: usize, src: &Matrix<T>) -> MatrixResult<()> {
        if src.cols != self.cols {
            return Err(MatrixError::ShapeMismatch {
                expected: (src.rows, self.cols),
                got: src.shape(),
            });
        }
        let end = start + src.rows;
        if end > self.rows {
            return Err(MatrixError::InvalidRange {
                start,
                end,
                axis: 0,
                size: self.rows,
            });
        }
        self.data[start * self.cols..end * self.cols].copy_from_slice(&src.data);
        Ok(())
    }

    /// Overwrite every element with those of a same-shaped matrix.
    pub fn copy_from(&mut self, other: &Matrix<T>) -> MatrixResult<()> {
        if self.shape() != other.shape() {
            return Err(MatrixError::ShapeMismatch {
                expected: self.shape(),
                got: other.shape(),
            });
        }
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Reallocate as a zero matrix of the given shape.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.data.clear();
        self.data.resize(rows * cols, T::ZERO);
        self.rows = rows;
        self.cols = cols;
    }

    // ─── Element-wise ───────────────────────────────────────────────────────

    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    pub fn apply_mut<F: FnMut(T) -> T>(&mut self, mut f: F) {
        for x in self.data.iter_mut() {
            *x = f(*x);
        }
    }

    /// Add `bias[i]` to every element of row `i`.
    pub fn add_row_bias(&mut self, bias: &[T]) -> MatrixResult<()> {
        if bias.len() != self.rows {
            return Err(MatrixError::DimensionMismatch(format!(
                "bias of length {} for {} rows",
                bias.len(),
                self.rows
            )));
        }
        for (i, &b) in bias.iter().enumerate() {
            self.row_mut(i).iter_mut().for_each(|x| *x += b);
        }
        Ok(())
    }

    // ─── Reductions ─────────────────────────────────────────────────────────

    pub fn sum_all(&self) -> T {
        self.data.iter().copied().sum()
    }

    /// Sum of each row (reduction over the column axis).
    pub fn row_sums(&self) -> Vec<T> {
        (0..self.rows).map(|i| self.row(i).iter().copied().sum()).collect()
    }

    /// `Σ (self - other)²` over all elements.
    pub fn squared_distance(&self, other: &Matrix<T>) -> MatrixResult<T> {
        if self.shape() != other.shape() {
            return Err(MatrixError::ShapeMismatch {
                expected: self.shape(),
                got: other.shape(),
            });
        }
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| (a - b) * (a - b))
            .sum())
    }
}

impl<T: Float> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        debug_assert!(j < self.cols);
        &self.data[i * self.cols + j]
    }
}

impl<T: Float> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        debug_assert!(j < self.cols);
        &mut self.data[i * self.cols + j]
    }
}

impl<T: Float> PartialEq for Matrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.data == other.data
    }
}

// ─── Display ────────────────────────────────────────────────────────────────

impl<T: Float> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix({}x{}) [", self.rows, self.cols)?;
        for i in 0..self.rows {
            write!(f, "  [")?;
            for (j, v) in self.row(i).iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:.4}", v)?;
            }
            writeln!(f, "]")?;
        }
        write!(f, "]")
    }
}
