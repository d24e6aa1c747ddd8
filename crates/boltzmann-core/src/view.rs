use crate::dtype::Float;
use crate::error::{MatrixError, MatrixResult};
use crate::matrix::Matrix;

use std::ops::{Index, IndexMut};

/// Borrowed row-major matrix over a slice that lives somewhere else,
/// e.g. the weight block of a flat parameter vector.
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a, T: Float> {
    data: &'a [T],
    rows: usize,
    cols: usize,
}

/// Mutable counterpart of [`MatrixView`].
#[derive(Debug)]
pub struct MatrixViewMut<'a, T: Float> {
    data: &'a mut [T],
    rows: usize,
    cols: usize,
}

impl<'a, T: Float> MatrixView<'a, T> {
    pub fn new(data: &'a [T], rows: usize, cols: usize) -> MatrixResult<Self> {
        if data.len() != rows * cols {
            return Err(MatrixError::DataLength { len: data.len(), rows, cols });
        }
        Ok(MatrixView { data, rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn data(&self) -> &'a [T] {
        self.data
    }

    pub fn row(&self, i: usize) -> &'a [T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// `out = self · rhs`
    pub fn matmul_into(&self, rhs: &Matrix<T>, out: &mut Matrix<T>) -> MatrixResult<()> {
        if rhs.rows() != self.cols {
            return Err(MatrixError::DimensionMismatch(format!(
                "matmul: {}x{} · {}x{}",
                self.rows, self.cols, rhs.rows(), rhs.cols()
            )));
        }
        if out.shape() != (self.rows, rhs.cols()) {
            return Err(MatrixError::ShapeMismatch {
                expected: (self.rows, rhs.cols()),
                got: out.shape(),
            });
        }
        out.fill(T::ZERO);
        for i in 0..self.rows {
            let a_row = self.row(i);
            let out_row = out.row_mut(i);
            for (k, &a) in a_row.iter().enumerate() {
                if a == T::ZERO {
                    continue;
                }
                for (o, &b) in out_row.iter_mut().zip(rhs.row(k)) {
                    *o += a * b;
                }
            }
        }
        Ok(())
    }

    /// `out = selfᵀ · rhs`
    pub fn t_matmul_into(&self, rhs: &Matrix<T>, out: &mut Matrix<T>) -> MatrixResult<()> {
        if rhs.rows() != self.rows {
            return Err(MatrixError::DimensionMismatch(format!(
                "t_matmul: ({}x{})ᵀ · {}x{}",
                self.rows, self.cols, rhs.rows(), rhs.cols()
            )));
        }
        if out.shape() != (self.cols, rhs.cols()) {
            return Err(MatrixError::ShapeMismatch {
                expected: (self.cols, rhs.cols()),
                got: out.shape(),
            });
        }
        out.fill(T::ZERO);
        for k in 0..self.rows {
            let rhs_row = rhs.row(k);
            for (i, &a) in self.row(k).iter().enumerate() {
                if a == T::ZERO {
                    continue;
                }
                for (o, &b) in out.row_mut(i).iter_mut().zip(rhs_row) {
                    *o += a * b;
                }
            }
        }
        Ok(())
    }
}

impl<'a, T: Float> MatrixViewMut<'a, T> {
    pub fn new(data: &'a mut [T], rows: usize, cols: usize) -> MatrixResult<Self> {
        if data.len() != rows * cols {
            return Err(MatrixError::DataLength { len: data.len(), rows, cols });
        }
        Ok(MatrixViewMut { data, rows, cols })
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut *self.data
    }

    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// `self += alpha · a · bᵀ`, where `a` is `rows × k` and `b` is `cols × k`.
    ///
    /// With `k` the batch width this accumulates a batch of outer products.
    pub fn add_outer(&mut self, alpha: T, a: &Matrix<T>, b: &Matrix<T>) -> MatrixResult<()> {
        if a.rows() != self.rows || b.rows() != self.cols || a.cols() != b.cols() {
            return Err(MatrixError::DimensionMismatch(format!(
                "outer: {}x{} · ({}x{})ᵀ into {}x{}",
                a.rows(), a.cols(), b.rows(), b.cols(), self.rows, self.cols
            )));
        }
        for i in 0..self.rows {
            let a_row = a.row(i);
            for j in 0..self.cols {
                let dot: T = a_row.iter().zip(b.row(j)).map(|(&x, &y)| x * y).sum();
                self.data[i * self.cols + j] += alpha * dot;
            }
        }
        Ok(())
    }
}

impl<'a, T: Float> Index<(usize, usize)> for MatrixView<'a, T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        debug_assert!(j < self.cols);
        &self.data[i * self.cols + j]
    }
}

impl<'a, T: Float> Index<(usize, usize)> for MatrixViewMut<'a, T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        debug_assert!(j < self.cols);
        &self.data[i * self.cols + j]
    }
}

impl<'a, T: Float> IndexMut<(usize, usize)> for MatrixViewMut<'a, T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        debug_assert!(j < self.cols);
        &mut self.data[i * self.cols + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul_into() {
        let w = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0]; // 2x3
        let view = MatrixView::new(&w, 2, 3).unwrap();
        let x = Matrix::from_vec2d(&[vec![1.0], vec![0.0], vec![2.0]]).unwrap();
        let mut out = Matrix::zeros(2, 1);
        view.matmul_into(&x, &mut out).unwrap();
        assert_eq!(out.data(), &[7.0, 16.0]);
    }

    #[test]
    fn test_t_matmul_into() {
        let w = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0]; // 2x3
        let view = MatrixView::new(&w, 2, 3).unwrap();
        let h = Matrix::from_vec2d(&[vec![1.0, 0.0], vec![1.0, 2.0]]).unwrap();
        let mut out = Matrix::zeros(3, 2);
        view.t_matmul_into(&h, &mut out).unwrap();
        // Wᵀ = [[1,4],[2,5],[3,6]]
        assert_eq!(out.data(), &[5.0, 8.0, 7.0, 10.0, 9.0, 12.0]);
    }

    #[test]
    fn test_matmul_shape_errors() {
        let w = [0.0f64; 6];
        let view = MatrixView::new(&w, 2, 3).unwrap();
        let x = Matrix::zeros(2, 1);
        let mut out = Matrix::zeros(2, 1);
        assert!(view.matmul_into(&x, &mut out).is_err());
        assert!(MatrixView::new(&w, 4, 2).is_err());
    }

    #[test]
    fn test_add_outer() {
        let mut g = [1.0f64; 4];
        let mut view = MatrixViewMut::new(&mut g, 2, 2).unwrap();
        let a = Matrix::from_vec2d(&[vec![1.0, 1.0], vec![0.0, 2.0]]).unwrap();
        let b = Matrix::from_vec2d(&[vec![1.0, 0.0], vec![3.0, 1.0]]).unwrap();
        view.add_outer(0.5, &a, &b).unwrap();
        // a·bᵀ = [[1,4],[0,2]]
        assert_eq!(g, [1.5, 3.0, 1.0, 2.0]);
    }
}
