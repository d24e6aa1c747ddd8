use boltzmann_core::{Float, Matrix, MatrixView};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{RbmError, RbmResult};
use crate::params::{ParamLayout, ParamView};
use crate::state::BatchState;
use crate::units::{bernoulli_in_place, VisibleGroup, VisibleGroups, VisibleUnitType};

/// Restricted Boltzmann Machine with binary hidden units and any mix of
/// binary, softmax and Gaussian visible unit groups.
///
/// Usage: register visible groups, call [`initialize`](Rbm::initialize), then
/// [`train`](Rbm::train) and sample. Matrices follow the rows = units,
/// columns = samples convention.
#[derive(Debug, Clone)]
pub struct Rbm<T: Float> {
    num_hidden: usize,
    groups: VisibleGroups,
    pub(crate) params: Vec<T>,
    pub(crate) state: BatchState<T>,
    seed: Option<u64>,
    pub(crate) rng: StdRng,
}

/// Serializable model state: group metadata plus the flat parameter vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct RbmSnapshot<T: Float> {
    pub num_hidden: usize,
    pub seed: Option<u64>,
    pub groups: Vec<VisibleGroup>,
    pub params: Vec<T>,
}

fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// `out = sigmoid(W · visible + c)`
pub(crate) fn propagate_hidden<T: Float>(
    params: &ParamView<'_, T>,
    visible: &Matrix<T>,
    out: &mut Matrix<T>,
) -> RbmResult<()> {
    params.weights.matmul_into(visible, out)?;
    out.add_row_bias(params.hidden_bias)?;
    out.apply_mut(|x| x.sigmoid());
    Ok(())
}

/// `out = activation(Wᵀ · hidden + b)`, activation chosen per visible group.
pub(crate) fn propagate_visible<T: Float>(
    params: &ParamView<'_, T>,
    groups: &VisibleGroups,
    hidden: &Matrix<T>,
    out: &mut Matrix<T>,
) -> RbmResult<()> {
    params.weights.t_matmul_into(hidden, out)?;
    out.add_row_bias(params.visible_bias)?;
    groups.activate(out);
    Ok(())
}

impl<T: Float> Rbm<T> {
    /// An RBM with `num_hidden` hidden units and no visible groups yet.
    pub fn new(num_hidden: usize) -> Self {
        let seed = Some(42);
        Rbm {
            num_hidden,
            groups: VisibleGroups::new(),
            params: Vec::new(),
            state: BatchState::new(),
            seed,
            rng: rng_from_seed(seed),
        }
    }

    /// An RBM with a single visible group.
    pub fn with_visible(
        num_hidden: usize,
        num_visible: usize,
        unit_type: VisibleUnitType,
    ) -> RbmResult<Self> {
        let mut rbm = Rbm::new(num_hidden);
        rbm.add_visible_group(num_visible, unit_type)?;
        Ok(rbm)
    }

    /// Reseed the random engine; `None` seeds from entropy.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self.rng = rng_from_seed(seed);
        self
    }

    // ─── Registry & parameters ──────────────────────────────────────────────

    /// Append a visible group. Groups must be registered before
    /// [`initialize`](Rbm::initialize).
    pub fn add_visible_group(&mut self, size: usize, unit_type: VisibleUnitType) -> RbmResult<()> {
        if self.is_initialized() {
            return Err(RbmError::AlreadyInitialized);
        }
        self.groups.add(size, unit_type)?;
        Ok(())
    }

    fn require_shape(&self) -> RbmResult<()> {
        if self.groups.is_empty() {
            return Err(RbmError::InvalidConfig("no visible groups registered".into()));
        }
        if self.num_hidden == 0 {
            return Err(RbmError::InvalidConfig("number of hidden units must be positive".into()));
        }
        Ok(())
    }

    /// Allocate the parameter vector and fill it from `N(0, sigma²)`.
    pub fn initialize(&mut self, sigma: f64) -> RbmResult<()> {
        self.require_shape()?;
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(RbmError::InvalidConfig(format!(
                "initialization sigma must be finite and non-negative, got {}",
                sigma
            )));
        }
        let normal = Normal::new(0.0, sigma).map_err(|e| {
            RbmError::InvalidConfig(format!("initialization sigma {}: {}", sigma, e))
        })?;
        let n = self.layout().len();
        self.params = (0..n).map(|_| T::from_f64(normal.sample(&mut self.rng))).collect();
        debug!(
            "initialized RBM: {} visible units in {} groups, {} hidden units, {} parameters",
            self.num_visible(),
            self.groups.len(),
            self.num_hidden,
            n
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        !self.params.is_empty()
    }

    pub fn num_hidden(&self) -> usize {
        self.num_hidden
    }

    pub fn num_visible(&self) -> usize {
        self.groups.num_visible()
    }

    pub fn groups(&self) -> &VisibleGroups {
        &self.groups
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn layout(&self) -> ParamLayout {
        ParamLayout::new(self.groups.num_visible(), self.num_hidden)
    }

    fn require_initialized(&self) -> RbmResult<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(RbmError::NotInitialized)
        }
    }

    pub fn parameters(&self) -> &[T] {
        &self.params
    }

    /// Replace the whole parameter vector.
    pub fn set_parameters(&mut self, params: Vec<T>) -> RbmResult<()> {
        let expected = self.layout().len();
        if params.len() != expected {
            return Err(RbmError::ParameterLength { expected, got: params.len() });
        }
        self.params = params;
        Ok(())
    }

    pub fn params_view(&self) -> RbmResult<ParamView<'_, T>> {
        self.require_initialized()?;
        self.layout().view(&self.params)
    }

    pub fn weights(&self) -> RbmResult<MatrixView<'_, T>> {
        Ok(self.params_view()?.weights)
    }

    pub fn visible_bias(&self) -> RbmResult<&[T]> {
        Ok(self.params_view()?.visible_bias)
    }

    pub fn hidden_bias(&self) -> RbmResult<&[T]> {
        Ok(self.params_view()?.hidden_bias)
    }

    // ─── Chain state ────────────────────────────────────────────────────────

    pub fn batch_size(&self) -> usize {
        self.state.batch_size()
    }

    /// Current visible state of the Gibbs chain (`V x batch_size`).
    pub fn visible_state(&self) -> &Matrix<T> {
        &self.state.visible
    }

    /// Current hidden state of the Gibbs chain (`H x batch_size`).
    pub fn hidden_state(&self) -> &Matrix<T> {
        &self.state.hidden
    }

    /// Resize the chain buffers. A new size restarts the chain from random
    /// binary states; the same size is a no-op.
    pub fn set_batch_size(&mut self, batch_size: usize) -> RbmResult<()> {
        if batch_size == 0 {
            return Err(RbmError::InvalidConfig("batch size must be positive".into()));
        }
        let (num_visible, num_hidden) = (self.num_visible(), self.num_hidden);
        if self.state.resize(num_visible, num_hidden, batch_size) {
            debug!("resized RBM chain to batch size {}", batch_size);
            self.reset_chain();
        }
        Ok(())
    }

    /// Restart the visible chain from uniformly random binary states.
    pub fn reset_chain(&mut self) {
        self.state.reset_chain(&mut self.rng);
    }

    pub(crate) fn check_visible(&self, visible: &Matrix<T>) -> RbmResult<()> {
        self.require_initialized()?;
        if visible.rows() != self.num_visible() {
            return Err(RbmError::FeatureMismatch {
                expected: self.num_visible(),
                got: visible.rows(),
            });
        }
        if visible.cols() == 0 {
            return Err(RbmError::EmptyFeatures);
        }
        Ok(())
    }

    // ─── Inference ──────────────────────────────────────────────────────────

    /// Conditional means of the hidden units: `sigmoid(W · visible + c)`.
    pub fn mean_hidden(&self, visible: &Matrix<T>, out: &mut Matrix<T>) -> RbmResult<()> {
        self.check_visible(visible)?;
        propagate_hidden(&self.params_view()?, visible, out)
    }

    /// Conditional means of the visible units given hidden states.
    pub fn mean_visible(&self, hidden: &Matrix<T>, out: &mut Matrix<T>) -> RbmResult<()> {
        self.require_initialized()?;
        propagate_visible(&self.params_view()?, &self.groups, hidden, out)
    }

    /// Bernoulli sample of the hidden units from their means.
    pub fn sample_hidden(&mut self, mean: &Matrix<T>, out: &mut Matrix<T>) -> RbmResult<()> {
        out.copy_from(mean)?;
        bernoulli_in_place(out.data_mut(), &mut self.rng);
        Ok(())
    }

    /// Sample every visible group from its means.
    pub fn sample_visible(&mut self, mean: &Matrix<T>, out: &mut Matrix<T>) -> RbmResult<()> {
        if mean.rows() != self.num_visible() {
            return Err(RbmError::FeatureMismatch {
                expected: self.num_visible(),
                got: mean.rows(),
            });
        }
        out.copy_from(mean)?;
        for g in self.groups.iter() {
            g.unit_type.sample(out, g.rows(), &mut self.rng);
        }
        Ok(())
    }

    /// Sample a single visible group; other rows of `out` are left untouched.
    pub fn sample_visible_group(
        &mut self,
        index: usize,
        mean: &Matrix<T>,
        out: &mut Matrix<T>,
    ) -> RbmResult<()> {
        let group = *self.groups.get(index)?;
        if mean.shape() != out.shape() || mean.rows() != self.num_visible() {
            return Err(RbmError::FeatureMismatch {
                expected: self.num_visible(),
                got: mean.rows(),
            });
        }
        out.assign_rows(group.offset, &mean.slice_rows(group.offset, group.offset + group.size)?)?;
        group.unit_type.sample(out, group.rows(), &mut self.rng);
        Ok(())
    }

    /// One Gibbs half-sweep on the chain buffers:
    /// hidden ← sample(mean_hidden(visible)), visible ← mean_visible(hidden).
    ///
    /// With `recompute_hidden == false` the hidden buffer is expected to
    /// already hold the means to sample from.
    pub(crate) fn chain_step(&mut self, recompute_hidden: bool) -> RbmResult<()> {
        let params = self.layout().view(&self.params)?;
        if recompute_hidden {
            propagate_hidden(&params, &self.state.visible, &mut self.state.hidden)?;
        }
        bernoulli_in_place(self.state.hidden.data_mut(), &mut self.rng);
        propagate_visible(&params, &self.groups, &self.state.hidden, &mut self.state.visible)
    }

    /// Sample the chain's visible means, optionally leaving one group clamped.
    pub(crate) fn resample_chain_visible(&mut self, skip: Option<usize>) {
        for (k, g) in self.groups.iter().enumerate() {
            if Some(k) != skip {
                g.unit_type.sample(&mut self.state.visible, g.rows(), &mut self.rng);
            }
        }
    }

    // ─── Generative sampling ────────────────────────────────────────────────

    /// Run `num_gibbs_steps` steps of the persistent chain with `batch_size`
    /// parallel samples and return the visible state.
    ///
    /// The visible units are not resampled after the last step, so the result
    /// holds conditional means.
    pub fn sample(&mut self, num_gibbs_steps: usize, batch_size: usize) -> RbmResult<Matrix<T>> {
        self.require_initialized()?;
        self.set_batch_size(batch_size)?;
        for step in 0..num_gibbs_steps {
            self.chain_step(true)?;
            if step + 1 < num_gibbs_steps {
                self.resample_chain_visible(None);
            }
        }
        Ok(self.state.visible.clone())
    }

    /// Like [`sample`](Rbm::sample) but returns only the rows of one group.
    pub fn sample_group(
        &mut self,
        group: usize,
        num_gibbs_steps: usize,
        batch_size: usize,
    ) -> RbmResult<Matrix<T>> {
        let g = *self.groups.get(group)?;
        self.sample(num_gibbs_steps, batch_size)?;
        Ok(self.state.visible.slice_rows(g.offset, g.offset + g.size)?)
    }

    /// Gibbs sampling with one visible group clamped to `evidence`
    /// (`group size x batch`). The batch size becomes the evidence width.
    pub fn sample_with_evidence(
        &mut self,
        clamped_group: usize,
        evidence: &Matrix<T>,
        num_gibbs_steps: usize,
    ) -> RbmResult<Matrix<T>> {
        let g = *self.groups.get(clamped_group)?;
        self.require_initialized()?;
        if evidence.rows() != g.size {
            return Err(RbmError::EvidenceMismatch {
                group: clamped_group,
                expected: g.size,
                got: evidence.rows(),
            });
        }
        if evidence.cols() == 0 {
            return Err(RbmError::EmptyFeatures);
        }

        self.set_batch_size(evidence.cols())?;
        self.state.visible.assign_rows(g.offset, evidence)?;

        for step in 0..num_gibbs_steps {
            self.chain_step(true)?;
            if step + 1 < num_gibbs_steps {
                self.resample_chain_visible(Some(clamped_group));
            }
            self.state.visible.assign_rows(g.offset, evidence)?;
        }
        Ok(self.state.visible.clone())
    }

    /// Like [`sample_with_evidence`](Rbm::sample_with_evidence) but returns
    /// only the rows of `group`.
    pub fn sample_group_with_evidence(
        &mut self,
        group: usize,
        clamped_group: usize,
        evidence: &Matrix<T>,
        num_gibbs_steps: usize,
    ) -> RbmResult<Matrix<T>> {
        let g = *self.groups.get(group)?;
        self.sample_with_evidence(clamped_group, evidence, num_gibbs_steps)?;
        Ok(self.state.visible.slice_rows(g.offset, g.offset + g.size)?)
    }

    // ─── Persistence ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> RbmSnapshot<T> {
        RbmSnapshot {
            num_hidden: self.num_hidden,
            seed: self.seed,
            groups: self.groups.iter().copied().collect(),
            params: self.params.clone(),
        }
    }

    /// Rebuild a model from a snapshot. Offsets are recomputed from the group
    /// sizes; the chain starts empty.
    ///
    /// A snapshot carrying parameters must describe a model `initialize`
    /// would accept.
    pub fn from_snapshot(snapshot: RbmSnapshot<T>) -> RbmResult<Self> {
        let mut rbm = Rbm::new(snapshot.num_hidden).with_seed(snapshot.seed);
        for g in &snapshot.groups {
            rbm.add_visible_group(g.size, g.unit_type)?;
        }
        if !snapshot.params.is_empty() {
            rbm.require_shape()?;
            rbm.set_parameters(snapshot.params)?;
        }
        Ok(rbm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_rbm() -> Rbm<f64> {
        let mut rbm = Rbm::new(4);
        rbm.add_visible_group(3, VisibleUnitType::Binary).unwrap();
        rbm.add_visible_group(3, VisibleUnitType::Softmax).unwrap();
        rbm.add_visible_group(2, VisibleUnitType::Gaussian).unwrap();
        rbm.initialize(0.5).unwrap();
        rbm
    }

    #[test]
    fn test_initialize_sizes() {
        let rbm = mixed_rbm();
        assert_eq!(rbm.num_visible(), 8);
        assert_eq!(rbm.parameters().len(), 8 + 4 + 32);
        assert_eq!(rbm.weights().unwrap().shape(), (4, 8));
        assert!(rbm.parameters().iter().any(|&p| p != 0.0));
    }

    #[test]
    fn test_initialize_requires_groups() {
        let mut rbm: Rbm<f64> = Rbm::new(3);
        assert!(matches!(rbm.initialize(0.01), Err(RbmError::InvalidConfig(_))));
        let mut rbm: Rbm<f64> = Rbm::with_visible(0, 3, VisibleUnitType::Binary).unwrap();
        assert!(rbm.initialize(0.01).is_err());
    }

    #[test]
    fn test_negative_sigma_rejected() {
        let mut rbm: Rbm<f64> = Rbm::with_visible(2, 2, VisibleUnitType::Binary).unwrap();
        assert!(matches!(rbm.initialize(-1.0), Err(RbmError::InvalidConfig(_))));
    }

    #[test]
    fn test_groups_frozen_after_initialize() {
        let mut rbm = mixed_rbm();
        assert_eq!(
            rbm.add_visible_group(2, VisibleUnitType::Binary),
            Err(RbmError::AlreadyInitialized)
        );
        assert_eq!(rbm.num_visible(), 8);
    }

    #[test]
    fn test_uninitialized_queries_fail() {
        let mut rbm: Rbm<f64> = Rbm::with_visible(2, 2, VisibleUnitType::Binary).unwrap();
        assert_eq!(rbm.weights().unwrap_err(), RbmError::NotInitialized);
        assert_eq!(rbm.sample(1, 1).unwrap_err(), RbmError::NotInitialized);
    }

    #[test]
    fn test_seeded_initialization_is_reproducible() {
        let a = mixed_rbm();
        let b = mixed_rbm();
        assert_eq!(a.parameters(), b.parameters());
    }

    #[test]
    fn test_mean_hidden_in_open_unit_interval() {
        let rbm = mixed_rbm();
        let visible = Matrix::from_columns(&[
            vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.3, -1.2],
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.5, 0.1],
        ])
        .unwrap();
        let mut out = Matrix::zeros(4, 2);
        rbm.mean_hidden(&visible, &mut out).unwrap();
        assert!(out.data().iter().all(|&h| h > 0.0 && h < 1.0));
    }

    #[test]
    fn test_mean_hidden_feature_mismatch() {
        let rbm = mixed_rbm();
        let visible = Matrix::zeros(5, 2);
        let mut out = Matrix::zeros(4, 2);
        assert_eq!(
            rbm.mean_hidden(&visible, &mut out).unwrap_err(),
            RbmError::FeatureMismatch { expected: 8, got: 5 }
        );
    }

    #[test]
    fn test_mean_visible_softmax_columns_sum_to_one() {
        let rbm = mixed_rbm();
        let hidden = Matrix::from_columns(&[
            vec![1.0, 0.0, 1.0, 1.0],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![1.0, 1.0, 1.0, 1.0],
        ])
        .unwrap();
        let mut out = Matrix::zeros(8, 3);
        rbm.mean_visible(&hidden, &mut out).unwrap();
        for j in 0..3 {
            let softmax_sum: f64 = (3..6).map(|i| out[(i, j)]).sum();
            assert!((softmax_sum - 1.0).abs() < 1e-10);
            for i in 0..3 {
                assert!(out[(i, j)] > 0.0 && out[(i, j)] < 1.0);
            }
        }
    }

    #[test]
    fn test_mean_visible_gaussian_is_linear() {
        let mut rbm: Rbm<f64> = Rbm::with_visible(1, 2, VisibleUnitType::Gaussian).unwrap();
        rbm.initialize(0.1).unwrap();
        // [b0, b1 | c | w00, w01]
        rbm.set_parameters(vec![0.5, -1.0, 0.0, 2.0, 3.0]).unwrap();
        let hidden = Matrix::from_vec2d(&[vec![1.0, 0.0]]).unwrap();
        let mut out = Matrix::zeros(2, 2);
        rbm.mean_visible(&hidden, &mut out).unwrap();
        assert_eq!(out.data(), &[2.5, 0.5, 2.0, -1.0]);
    }

    #[test]
    fn test_sample_hidden_is_binary() {
        let mut rbm = mixed_rbm();
        let mean = Matrix::full(4, 6, 0.5);
        let mut out = Matrix::zeros(4, 6);
        rbm.sample_hidden(&mean, &mut out).unwrap();
        assert!(out.data().iter().all(|&x| x == 0.0 || x == 1.0));
    }

    #[test]
    fn test_sample_visible_group_only_touches_group() {
        let mut rbm = mixed_rbm();
        let mut mean = Matrix::full(8, 2, 0.5);
        for j in 0..2 {
            for i in 3..6 {
                mean[(i, j)] = 1.0 / 3.0;
            }
        }
        let mut out = Matrix::full(8, 2, -7.0);
        rbm.sample_visible_group(1, &mean, &mut out).unwrap();
        for j in 0..2 {
            let col = out.column(j).unwrap();
            assert_eq!(&col[..3], &[-7.0, -7.0, -7.0]);
            assert_eq!(col[3..6].iter().sum::<f64>(), 1.0);
            assert_eq!(&col[6..], &[-7.0, -7.0]);
        }
        assert!(rbm.sample_visible_group(3, &mean, &mut out).is_err());
    }

    #[test]
    fn test_sample_visible_leaves_gaussian_means() {
        let mut rbm = mixed_rbm();
        let mut mean = Matrix::full(8, 1, 0.5);
        mean[(3, 0)] = 1.0;
        mean[(4, 0)] = 0.0;
        mean[(5, 0)] = 0.0;
        mean[(6, 0)] = 1.75;
        mean[(7, 0)] = -0.25;
        let mut out = Matrix::zeros(8, 1);
        rbm.sample_visible(&mean, &mut out).unwrap();
        let col = out.column(0).unwrap();
        assert!(col[..3].iter().all(|&x| x == 0.0 || x == 1.0));
        assert_eq!(&col[3..6], &[1.0, 0.0, 0.0]);
        assert_eq!(&col[6..], &[1.75, -0.25]);
    }

    #[test]
    fn test_same_batch_size_keeps_chain() {
        let mut rbm = mixed_rbm();
        rbm.set_batch_size(4).unwrap();
        let before = rbm.visible_state().clone();
        rbm.set_batch_size(4).unwrap();
        assert_eq!(rbm.visible_state(), &before);
    }

    #[test]
    fn test_new_batch_size_resets_chain() {
        let mut rbm = mixed_rbm();
        rbm.set_batch_size(4).unwrap();
        rbm.state.visible.fill(0.25);
        rbm.set_batch_size(3).unwrap();
        assert_eq!(rbm.visible_state().shape(), (8, 3));
        assert_eq!(rbm.hidden_state().shape(), (4, 3));
        assert!(rbm.visible_state().data().iter().all(|&x| x == 0.0 || x == 1.0));
        assert!(rbm.set_batch_size(0).is_err());
    }

    #[test]
    fn test_sample_shapes() {
        let mut rbm = mixed_rbm();
        let v = rbm.sample(5, 7).unwrap();
        assert_eq!(v.shape(), (8, 7));
        let g = rbm.sample_group(1, 2, 7).unwrap();
        assert_eq!(g.shape(), (3, 7));
        for j in 0..7 {
            let s: f64 = g.column(j).unwrap().iter().sum();
            assert!((s - 1.0).abs() < 1e-10);
        }
        assert_eq!(
            rbm.sample_group(3, 1, 1).unwrap_err(),
            RbmError::GroupIndex { index: 3, count: 3 }
        );
    }

    #[test]
    fn test_sample_with_evidence_clamps_group() {
        let mut rbm = mixed_rbm();
        let evidence = Matrix::from_columns(&[
            vec![1.0, 0.0, 1.0],
            vec![0.0, 1.0, 1.0],
        ])
        .unwrap();
        let clamped = rbm.sample_group_with_evidence(0, 0, &evidence, 4).unwrap();
        assert_eq!(clamped, evidence);

        let visible = rbm.sample_with_evidence(0, &evidence, 3).unwrap();
        assert_eq!(visible.slice_rows(0, 3).unwrap(), evidence);
        assert_eq!(rbm.batch_size(), 2);
    }

    #[test]
    fn test_sample_with_evidence_errors() {
        let mut rbm = mixed_rbm();
        let evidence = Matrix::zeros(2, 2);
        assert_eq!(
            rbm.sample_with_evidence(0, &evidence, 1).unwrap_err(),
            RbmError::EvidenceMismatch { group: 0, expected: 3, got: 2 }
        );
        assert!(matches!(
            rbm.sample_group_with_evidence(9, 2, &evidence, 1),
            Err(RbmError::GroupIndex { index: 9, .. })
        ));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let rbm = mixed_rbm();
        let json = serde_json::to_string(&rbm.snapshot()).unwrap();
        let snapshot: RbmSnapshot<f64> = serde_json::from_str(&json).unwrap();
        let restored = Rbm::from_snapshot(snapshot).unwrap();
        assert_eq!(restored.parameters(), rbm.parameters());
        assert_eq!(restored.groups(), rbm.groups());
        assert_eq!(restored.num_hidden(), 4);
    }

    #[test]
    fn test_snapshot_with_bad_params_rejected() {
        let mut snapshot = mixed_rbm().snapshot();
        snapshot.params.pop();
        assert!(matches!(
            Rbm::from_snapshot(snapshot),
            Err(RbmError::ParameterLength { .. })
        ));
    }

    #[test]
    fn test_snapshot_json_is_bit_exact() {
        let mut rbm: Rbm<f64> = Rbm::with_visible(30, 40, VisibleUnitType::Binary).unwrap();
        rbm.initialize(1.0).unwrap();
        let json = serde_json::to_string(&rbm.snapshot()).unwrap();
        let snapshot: RbmSnapshot<f64> = serde_json::from_str(&json).unwrap();
        let drifted = snapshot
            .params
            .iter()
            .zip(rbm.parameters())
            .filter(|(a, b)| a.to_bits() != b.to_bits())
            .count();
        assert_eq!(drifted, 0);
    }

    #[test]
    fn test_snapshot_without_groups_rejected() {
        let snapshot = RbmSnapshot {
            num_hidden: 2,
            seed: Some(42),
            groups: vec![],
            params: vec![0.1f64, 0.2],
        };
        assert!(matches!(
            Rbm::from_snapshot(snapshot),
            Err(RbmError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_snapshot_without_hidden_units_rejected() {
        let snapshot = RbmSnapshot {
            num_hidden: 0,
            seed: None,
            groups: vec![VisibleGroup {
                size: 3,
                unit_type: VisibleUnitType::Binary,
                offset: 0,
            }],
            params: vec![0.0f64; 3],
        };
        assert!(matches!(
            Rbm::from_snapshot(snapshot),
            Err(RbmError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_uninitialized_snapshot_restores_registry() {
        let mut rbm: Rbm<f64> = Rbm::new(3);
        rbm.add_visible_group(2, VisibleUnitType::Softmax).unwrap();
        let restored = Rbm::from_snapshot(rbm.snapshot()).unwrap();
        assert!(!restored.is_initialized());
        assert_eq!(restored.num_visible(), 2);
    }

    #[test]
    fn test_sample_returns_means_after_last_step() {
        let mut rbm: Rbm<f64> = Rbm::with_visible(3, 5, VisibleUnitType::Binary).unwrap();
        rbm.initialize(0.5).unwrap();
        let v = rbm.sample(3, 4).unwrap();
        // binary units are not resampled on the final step
        assert!(v.data().iter().all(|&x| x > 0.0 && x < 1.0));
    }

    #[test]
    fn test_sample_with_evidence_returns_means_outside_clamp() {
        let mut rbm: Rbm<f64> = Rbm::new(3);
        rbm.add_visible_group(2, VisibleUnitType::Binary).unwrap();
        rbm.add_visible_group(4, VisibleUnitType::Binary).unwrap();
        rbm.initialize(0.5).unwrap();
        let evidence = Matrix::from_columns(&[vec![1.0, 0.0], vec![0.0, 0.0], vec![1.0, 1.0]])
            .unwrap();

        let visible = rbm.sample_with_evidence(0, &evidence, 3).unwrap();
        assert_eq!(visible.slice_rows(0, 2).unwrap(), evidence);
        let free = visible.slice_rows(2, 6).unwrap();
        assert!(free.data().iter().all(|&x| x > 0.0 && x < 1.0));
    }
}
