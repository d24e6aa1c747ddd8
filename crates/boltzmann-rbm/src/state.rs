use boltzmann_core::{Float, Matrix};
use rand::Rng;

/// Batch-sized Gibbs chain: hidden (`H x B`) and visible (`V x B`) states.
#[derive(Debug, Clone)]
pub struct BatchState<T: Float> {
    pub hidden: Matrix<T>,
    pub visible: Matrix<T>,
    batch_size: usize,
}

impl<T: Float> BatchState<T> {
    pub fn new() -> Self {
        BatchState {
            hidden: Matrix::zeros(0, 0),
            visible: Matrix::zeros(0, 0),
            batch_size: 0,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Reallocate both buffers for `batch_size` columns.
    ///
    /// Returns `false` without touching the buffers when the size is unchanged.
    pub fn resize(&mut self, num_visible: usize, num_hidden: usize, batch_size: usize) -> bool {
        if self.batch_size == batch_size && self.visible.rows() == num_visible {
            return false;
        }
        self.batch_size = batch_size;
        self.hidden.resize(num_hidden, batch_size);
        self.visible.resize(num_visible, batch_size);
        true
    }

    /// Restart the chain from uniformly random binary visible states.
    pub fn reset_chain<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.visible.apply_mut(|_| if rng.gen::<f64>() > 0.5 { T::ONE } else { T::ZERO });
    }
}

impl<T: Float> Default for BatchState<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_resize_reports_change() {
        let mut state: BatchState<f64> = BatchState::new();
        assert!(state.resize(4, 3, 5));
        assert_eq!(state.visible.shape(), (4, 5));
        assert_eq!(state.hidden.shape(), (3, 5));
        assert!(!state.resize(4, 3, 5));
        assert!(state.resize(4, 3, 2));
        assert_eq!(state.batch_size(), 2);
    }

    #[test]
    fn test_reset_chain_is_binary() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut state: BatchState<f64> = BatchState::new();
        state.resize(10, 2, 10);
        state.reset_chain(&mut rng);
        assert!(state.visible.data().iter().all(|&x| x == 0.0 || x == 1.0));
        let ones = state.visible.sum_all();
        assert!(ones > 20.0 && ones < 80.0);
    }
}
