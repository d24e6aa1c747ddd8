use boltzmann_core::{Float, MatrixView, MatrixViewMut};
use serde::{Deserialize, Serialize};

use crate::error::{RbmError, RbmResult};

/// Partition of the flat parameter vector:
///
/// ```text
/// [ visible bias (V) | hidden bias (H) | weights (H x V, row-major by hidden unit) ]
/// ```
///
/// Every view into a parameter or gradient buffer goes through this type, so
/// the block boundaries are computed in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamLayout {
    pub num_visible: usize,
    pub num_hidden: usize,
}

/// Borrowed blocks of a parameter-shaped buffer.
#[derive(Debug, Clone, Copy)]
pub struct ParamView<'a, T: Float> {
    pub visible_bias: &'a [T],
    pub hidden_bias: &'a [T],
    pub weights: MatrixView<'a, T>,
}

/// Mutable blocks of a parameter-shaped buffer.
#[derive(Debug)]
pub struct ParamViewMut<'a, T: Float> {
    pub visible_bias: &'a mut [T],
    pub hidden_bias: &'a mut [T],
    pub weights: MatrixViewMut<'a, T>,
}

impl ParamLayout {
    pub fn new(num_visible: usize, num_hidden: usize) -> Self {
        ParamLayout { num_visible, num_hidden }
    }

    /// Total number of parameters.
    pub fn len(&self) -> usize {
        self.num_visible + self.num_hidden + self.num_visible * self.num_hidden
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check<T>(&self, buffer: &[T]) -> RbmResult<()> {
        if buffer.len() != self.len() {
            return Err(RbmError::ParameterLength {
                expected: self.len(),
                got: buffer.len(),
            });
        }
        Ok(())
    }

    pub fn view<'a, T: Float>(&self, buffer: &'a [T]) -> RbmResult<ParamView<'a, T>> {
        self.check(buffer)?;
        let (visible_bias, rest) = buffer.split_at(self.num_visible);
        let (hidden_bias, weights) = rest.split_at(self.num_hidden);
        Ok(ParamView {
            visible_bias,
            hidden_bias,
            weights: MatrixView::new(weights, self.num_hidden, self.num_visible)?,
        })
    }

    pub fn view_mut<'a, T: Float>(&self, buffer: &'a mut [T]) -> RbmResult<ParamViewMut<'a, T>> {
        self.check(buffer)?;
        let (visible_bias, rest) = buffer.split_at_mut(self.num_visible);
        let (hidden_bias, weights) = rest.split_at_mut(self.num_hidden);
        Ok(ParamViewMut {
            visible_bias,
            hidden_bias,
            weights: MatrixViewMut::new(weights, self.num_hidden, self.num_visible)?,
        })
    }

    pub fn visible_bias<'a, T: Float>(&self, buffer: &'a [T]) -> RbmResult<&'a [T]> {
        Ok(self.view(buffer)?.visible_bias)
    }

    pub fn hidden_bias<'a, T: Float>(&self, buffer: &'a [T]) -> RbmResult<&'a [T]> {
        Ok(self.view(buffer)?.hidden_bias)
    }

    pub fn weights<'a, T: Float>(&self, buffer: &'a [T]) -> RbmResult<MatrixView<'a, T>> {
        Ok(self.view(buffer)?.weights)
    }
}
