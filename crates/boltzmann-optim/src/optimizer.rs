use boltzmann_core::Float;

/// Gradient descent with Nesterov-style momentum over a flat parameter vector.
///
/// Each step is split in two so the gradient can be evaluated at the
/// look-ahead point:
///
/// 1. [`lookahead`](Self::lookahead): `params += momentum * v`
/// 2. evaluate `grad` at the shifted parameters
/// 3. [`step`](Self::step): `v = momentum * v - lr * grad`, `params -= lr * grad`
///
/// After both calls `params` equals the pre-lookahead value plus the new
/// velocity.
#[derive(Debug, Clone)]
pub struct NesterovMomentum<T: Float> {
    pub momentum: T,
    velocity: Vec<T>,
}

impl<T: Float> NesterovMomentum<T> {
    pub fn new(num_params: usize, momentum: T) -> Self {
        NesterovMomentum {
            momentum,
            velocity: vec![T::ZERO; num_params],
        }
    }

    pub fn velocity(&self) -> &[T] {
        &self.velocity
    }

    /// Move the parameters to the look-ahead point.
    pub fn lookahead(&self, params: &mut [T]) {
        debug_assert_eq!(params.len(), self.velocity.len());
        for (p, &v) in params.iter_mut().zip(&self.velocity) {
            *p += self.momentum * v;
        }
    }

    /// Fold a gradient evaluated at the look-ahead point into the velocity and
    /// the parameters.
    pub fn step(&mut self, params: &mut [T], grads: &[T], lr: T) {
        debug_assert_eq!(params.len(), self.velocity.len());
        debug_assert_eq!(grads.len(), self.velocity.len());
        for ((p, v), &g) in params.iter_mut().zip(self.velocity.iter_mut()).zip(grads) {
            // v = momentum * v - lr * grad
            *v = self.momentum * *v - lr * g;
            *p -= lr * g;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_step_is_plain_sgd() {
        let mut opt = NesterovMomentum::new(2, 0.9);
        let mut params = vec![1.0f64, -1.0];
        opt.lookahead(&mut params);
        assert_eq!(params, vec![1.0, -1.0]);

        opt.step(&mut params, &[0.5, -0.5], 0.1);
        assert_relative_eq!(params[0], 0.95);
        assert_relative_eq!(params[1], -0.95);
        assert_relative_eq!(opt.velocity()[0], -0.05);
    }

    #[test]
    fn test_net_update_equals_velocity() {
        let mut opt = NesterovMomentum::new(1, 0.5);
        let mut params = vec![0.0f64];
        opt.lookahead(&mut params);
        opt.step(&mut params, &[1.0], 1.0);
        let before = params[0];

        opt.lookahead(&mut params);
        opt.step(&mut params, &[2.0], 1.0);
        // v = 0.5 * -1 - 2 = -2.5
        assert_relative_eq!(opt.velocity()[0], -2.5);
        assert_relative_eq!(params[0] - before, opt.velocity()[0]);
    }

    #[test]
    fn test_zero_momentum() {
        let mut opt = NesterovMomentum::new(3, 0.0f32);
        let mut params = vec![1.0f32; 3];
        for _ in 0..10 {
            opt.lookahead(&mut params);
            opt.step(&mut params, &[1.0, 0.0, -1.0], 0.1);
        }
        assert_relative_eq!(params[0], 0.0, epsilon = 1e-5);
        assert_relative_eq!(params[1], 1.0);
        assert_relative_eq!(params[2], 2.0, epsilon = 1e-5);
    }
}
