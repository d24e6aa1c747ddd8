//! Learning rate schedulers.

/// Exponential decay applied once per optimisation step: `lr = lr * gamma`.
///
/// The decay is applied *before* the rate is used, so the first step already
/// runs at `initial_lr * gamma`.
#[derive(Debug, Clone)]
pub struct ExponentialDecay {
    pub initial_lr: f64,
    pub gamma: f64,
    lr: f64,
    current_step: usize,
}

impl ExponentialDecay {
    pub fn new(initial_lr: f64, gamma: f64) -> Self {
        ExponentialDecay {
            initial_lr,
            gamma,
            lr: initial_lr,
            current_step: 0,
        }
    }

    /// Decay and return the rate for the next step.
    pub fn step(&mut self) -> f64 {
        self.current_step += 1;
        self.lr *= self.gamma;
        self.lr
    }

    pub fn get_lr(&self) -> f64 {
        self.lr
    }

    pub fn steps(&self) -> usize {
        self.current_step
    }
}
