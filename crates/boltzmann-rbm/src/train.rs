use boltzmann_core::{Float, Matrix};
use boltzmann_optim::{ExponentialDecay, NesterovMomentum};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{RbmError, RbmResult};
use crate::rbm::{propagate_hidden, Rbm};

/// Progress measure reported while training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitoringMethod {
    ReconstructionError,
    /// Binary visible units only.
    PseudoLikelihood,
}

/// Hyperparameters for contrastive-divergence training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Gibbs steps per CD update (`k` in CD-k).
    pub cd_num_steps: usize,
    /// Continue the chain across updates instead of restarting it from data.
    pub persistent: bool,
    /// Sample the visible units at every step of the CD chain.
    pub sample_visible: bool,
    pub l1_coefficient: f64,
    pub l2_coefficient: f64,
    pub monitoring_method: MonitoringMethod,
    /// Monitor every this many updates.
    pub monitoring_interval: usize,
    /// Samples per update; 0 means full batch.
    pub mini_batch_size: usize,
    pub max_epochs: usize,
    pub learning_rate: f64,
    /// Multiplied into the learning rate before every update.
    pub learning_rate_decay: f64,
    pub momentum: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            cd_num_steps: 1,
            persistent: true,
            sample_visible: false,
            l1_coefficient: 0.0,
            l2_coefficient: 0.0,
            monitoring_method: MonitoringMethod::ReconstructionError,
            monitoring_interval: 10,
            mini_batch_size: 0,
            max_epochs: 1,
            learning_rate: 0.1,
            learning_rate_decay: 1.0,
            momentum: 0.9,
        }
    }
}

impl TrainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cd_steps(mut self, steps: usize) -> Self {
        self.cd_num_steps = steps;
        self
    }

    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    pub fn with_sample_visible(mut self, sample_visible: bool) -> Self {
        self.sample_visible = sample_visible;
        self
    }

    pub fn with_l1(mut self, l1: f64) -> Self {
        self.l1_coefficient = l1;
        self
    }

    pub fn with_l2(mut self, l2: f64) -> Self {
        self.l2_coefficient = l2;
        self
    }

    pub fn with_monitoring(mut self, method: MonitoringMethod, interval: usize) -> Self {
        self.monitoring_method = method;
        self.monitoring_interval = interval;
        self
    }

    pub fn with_mini_batch_size(mut self, size: usize) -> Self {
        self.mini_batch_size = size;
        self
    }

    pub fn with_max_epochs(mut self, epochs: usize) -> Self {
        self.max_epochs = epochs;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_learning_rate_decay(mut self, decay: f64) -> Self {
        self.learning_rate_decay = decay;
        self
    }

    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn validate(&self) -> RbmResult<()> {
        if self.cd_num_steps == 0 {
            return Err(RbmError::InvalidConfig("cd_num_steps must be at least 1".into()));
        }
        if self.monitoring_interval == 0 {
            return Err(RbmError::InvalidConfig("monitoring_interval must be at least 1".into()));
        }
        for (name, value) in [
            ("l1_coefficient", self.l1_coefficient),
            ("l2_coefficient", self.l2_coefficient),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(RbmError::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("learning_rate", self.learning_rate),
            ("learning_rate_decay", self.learning_rate_decay),
            ("momentum", self.momentum),
        ] {
            if !value.is_finite() {
                return Err(RbmError::InvalidConfig(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// One monitoring measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorRecord {
    pub epoch: usize,
    /// Column index of the first sample of the monitored mini-batch.
    pub batch_start: usize,
    pub method: MonitoringMethod,
    pub value: f64,
}

/// Summary of a training run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    /// Number of parameter updates performed.
    pub updates: usize,
    pub final_learning_rate: f64,
    pub history: Vec<MonitorRecord>,
}

impl<T: Float> Rbm<T> {
    /// Train with mini-batch contrastive divergence and Nesterov momentum.
    ///
    /// `features` is `V x N` (one sample per column). Every precondition is
    /// checked before the parameters are touched.
    pub fn train(&mut self, features: &Matrix<T>, config: &TrainConfig) -> RbmResult<TrainReport> {
        config.validate()?;
        self.check_visible(features)?;
        if config.monitoring_method == MonitoringMethod::PseudoLikelihood {
            self.groups().require_binary("pseudo-likelihood monitoring")?;
        }

        let n = features.cols();
        let mini_batch = if config.mini_batch_size == 0 { n } else { config.mini_batch_size };
        if mini_batch > n {
            return Err(RbmError::InvalidConfig(format!(
                "mini-batch size {} exceeds the number of samples {}",
                mini_batch, n
            )));
        }

        // seed the persistent chain with the leading samples
        self.set_batch_size(mini_batch)?;
        self.state.visible.copy_from(&features.slice_cols(0, mini_batch)?)?;

        let num_params = self.layout().len();
        let mut gradients = vec![T::ZERO; num_params];
        let mut optimizer = NesterovMomentum::new(num_params, T::from_f64(config.momentum));
        let mut schedule = ExponentialDecay::new(config.learning_rate, config.learning_rate_decay);
        let mut report = TrainReport {
            final_learning_rate: config.learning_rate,
            ..TrainReport::default()
        };

        debug!(
            "training RBM on {} samples: mini-batch {}, {} epochs, CD-{}{}",
            n,
            mini_batch,
            config.max_epochs,
            config.cd_num_steps,
            if config.persistent { " (persistent)" } else { "" }
        );

        let mut counter = 0usize;
        for epoch in 0..config.max_epochs {
            let mut start = 0;
            while start < n {
                let lr = T::from_f64(schedule.step());
                // the final batch overlaps the previous one rather than shrinking
                if start + mini_batch > n {
                    start = n - mini_batch;
                }
                let batch = features.slice_cols(start, start + mini_batch)?;

                optimizer.lookahead(&mut self.params);
                self.contrastive_divergence(&batch, &mut gradients, config)?;
                optimizer.step(&mut self.params, &gradients, lr);
                report.updates += 1;

                if counter % config.monitoring_interval == 0 {
                    let value = match config.monitoring_method {
                        MonitoringMethod::ReconstructionError => {
                            let err = self.reconstruction_error(&batch)?;
                            info!("Epoch {}: reconstruction error = {}", epoch, err);
                            err
                        }
                        MonitoringMethod::PseudoLikelihood => {
                            let pl = self.pseudo_likelihood(&batch)?;
                            info!("Epoch {}: pseudo-log-likelihood = {}", epoch, pl);
                            pl
                        }
                    };
                    report.history.push(MonitorRecord {
                        epoch,
                        batch_start: start,
                        method: config.monitoring_method,
                        value: value.to_f64(),
                    });
                }
                counter += 1;
                start += mini_batch;
            }
        }

        report.final_learning_rate = schedule.get_lr();
        debug!("training finished after {} updates", report.updates);
        Ok(report)
    }

    /// Write the CD-k gradient estimate for one mini-batch into `gradients`.
    ///
    /// The positive phase is computed from `batch`, the negative phase from the
    /// chain after `cd_num_steps` Gibbs steps. Regularization terms are added
    /// to the weight block.
    pub fn contrastive_divergence(
        &mut self,
        batch: &Matrix<T>,
        gradients: &mut [T],
        config: &TrainConfig,
    ) -> RbmResult<()> {
        self.check_visible(batch)?;
        self.set_batch_size(batch.cols())?;

        {
            let params = self.layout().view(&self.params)?;
            propagate_hidden(&params, batch, &mut self.state.hidden)?;
        }
        self.free_energy_gradients(batch, gradients, true, Some(&self.state.hidden))?;

        for step in 0..config.cd_num_steps {
            // a non-persistent chain starts from the data's hidden means
            self.chain_step(step > 0 || config.persistent)?;
            if config.sample_visible {
                self.resample_chain_visible(None);
            }
        }

        {
            let params = self.layout().view(&self.params)?;
            propagate_hidden(&params, &self.state.visible, &mut self.state.hidden)?;
        }
        self.free_energy_gradients(
            &self.state.visible,
            gradients,
            false,
            Some(&self.state.hidden),
        )?;

        self.regularize(gradients, config)
    }

    /// Add `l2 · W + l1 · sign(W)` to the weight gradients. Biases are not
    /// regularized.
    fn regularize(&self, gradients: &mut [T], config: &TrainConfig) -> RbmResult<()> {
        if config.l1_coefficient == 0.0 && config.l2_coefficient == 0.0 {
            return Ok(());
        }
        let l1 = T::from_f64(config.l1_coefficient);
        let l2 = T::from_f64(config.l2_coefficient);
        let layout = self.layout();
        let weights = layout.weights(&self.params)?;
        let mut grads = layout.view_mut(gradients)?;

        for (g, &w) in grads.weights.data_mut().iter_mut().zip(weights.data()) {
            let sign = if w == T::ZERO { T::ZERO } else { w.signum() };
            *g += l2 * w + l1 * sign;
        }
        Ok(())
    }
}
