use boltzmann_core::{Float, Matrix, MatrixError};
use rand::Rng;

use crate::error::RbmResult;
use crate::rbm::{propagate_hidden, propagate_visible, Rbm};
use crate::units::{bernoulli_in_place, VisibleUnitType};

impl<T: Float> Rbm<T> {
    /// Mean free energy of a batch of visible vectors:
    ///
    /// ```text
    /// F(v) = ( -b·v - Σ_h softplus(c_h + W_h·v) + ½ Σ_{gaussian i} v_i² ) / B
    /// ```
    pub fn free_energy(&self, visible: &Matrix<T>) -> RbmResult<T> {
        self.check_visible(visible)?;
        let params = self.params_view()?;
        let batch = T::from_usize(visible.cols());

        let bias_term: T = params
            .visible_bias
            .iter()
            .zip(visible.row_sums())
            .map(|(&b, s)| b * s)
            .sum();

        let mut wv = Matrix::zeros(self.num_hidden(), visible.cols());
        params.weights.matmul_into(visible, &mut wv)?;
        wv.add_row_bias(params.hidden_bias)?;
        let hidden_term: T = wv.data().iter().map(|x| x.softplus()).sum();

        let mut energy = -(bias_term + hidden_term);
        for g in self.groups().iter().filter(|g| g.unit_type == VisibleUnitType::Gaussian) {
            for i in g.rows() {
                energy += T::HALF * visible.row(i).iter().map(|&x| x * x).sum::<T>();
            }
        }
        Ok(energy / batch)
    }

    /// Gradient of the mean free energy with respect to every parameter.
    ///
    /// The positive phase overwrites `gradients` with `∂F/∂θ`; the negative
    /// phase accumulates `-∂F/∂θ` into it. `hidden_mean`, when given, must be
    /// `sigmoid(W · visible + c)` for this same batch.
    pub fn free_energy_gradients(
        &self,
        visible: &Matrix<T>,
        gradients: &mut [T],
        positive_phase: bool,
        hidden_mean: Option<&Matrix<T>>,
    ) -> RbmResult<()> {
        self.check_visible(visible)?;
        let params = self.params_view()?;
        let batch = visible.cols();

        let computed;
        let hidden = match hidden_mean {
            Some(h) => h,
            None => {
                let mut h = Matrix::zeros(self.num_hidden(), batch);
                propagate_hidden(&params, visible, &mut h)?;
                computed = h;
                &computed
            }
        };
        if hidden.shape() != (self.num_hidden(), batch) {
            return Err(MatrixError::ShapeMismatch {
                expected: (self.num_hidden(), batch),
                got: hidden.shape(),
            }
            .into());
        }

        let mut grads = self.layout().view_mut(gradients)?;
        if positive_phase {
            grads.visible_bias.iter_mut().for_each(|g| *g = T::ZERO);
            grads.hidden_bias.iter_mut().for_each(|g| *g = T::ZERO);
            grads.weights.fill(T::ZERO);
        }

        let sign = if positive_phase { -T::ONE } else { T::ONE };
        let scale = sign / T::from_usize(batch);

        grads.weights.add_outer(scale, hidden, visible)?;
        for (g, s) in grads.visible_bias.iter_mut().zip(visible.row_sums()) {
            *g += scale * s;
        }
        for (g, s) in grads.hidden_bias.iter_mut().zip(hidden.row_sums()) {
            *g += scale * s;
        }
        Ok(())
    }

    /// Squared reconstruction error per sample after one stochastic
    /// visible → hidden → visible pass.
    ///
    /// Uses scratch buffers; the chain is left untouched.
    pub fn reconstruction_error(&mut self, visible: &Matrix<T>) -> RbmResult<T> {
        self.check_visible(visible)?;
        let batch = visible.cols();
        let params = self.layout().view(&self.params)?;

        let mut hidden = Matrix::zeros(self.num_hidden(), batch);
        propagate_hidden(&params, visible, &mut hidden)?;
        bernoulli_in_place(hidden.data_mut(), &mut self.rng);

        let mut reconstruction = Matrix::zeros(self.num_visible(), batch);
        propagate_visible(&params, self.groups(), &hidden, &mut reconstruction)?;

        Ok(reconstruction.squared_distance(visible)? / T::from_usize(batch))
    }

    /// Stochastic pseudo-log-likelihood estimate, binary visible units only.
    ///
    /// Flips one randomly chosen unit per sample and returns
    /// `V · ln σ(F(ṽ) - F(v))`.
    pub fn pseudo_likelihood(&mut self, visible: &Matrix<T>) -> RbmResult<T> {
        self.groups().require_binary("pseudo-likelihood")?;
        self.check_visible(visible)?;
        let num_visible = self.num_visible();

        let mut flipped = visible.clone();
        for j in 0..visible.cols() {
            let i = self.rng.gen_range(0..num_visible);
            flipped[(i, j)] = T::ONE - flipped[(i, j)];
        }

        let f1 = self.free_energy(visible)?;
        let f2 = self.free_energy(&flipped)?;
        Ok(-T::from_usize(num_visible) * (f1 - f2).softplus())
    }
}
