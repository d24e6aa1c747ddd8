//! # Boltzmann
//!
//! Restricted Boltzmann Machines trained with contrastive divergence.
//!
//! ## Modules
//!
//! - **core**: dense row-major matrices and borrowed views
//! - **optim**: Nesterov momentum and learning-rate decay
//! - **rbm**: the model, with visible unit groups, Gibbs sampling, free energy, training
//! - **io**: CSV feature loading, JSON model files

/// Matrix types.
pub use boltzmann_core as core;

/// Optimizers and schedulers.
pub use boltzmann_optim as optim;

/// Restricted Boltzmann Machines.
pub use boltzmann_rbm as rbm;

/// I/O utilities.
pub use boltzmann_io as io;

/// Commonly used items.
pub mod prelude {
    pub use boltzmann_core::{Float, Matrix};
    pub use boltzmann_io::{load_model, read_features_csv, save_model, ModelFile};
    pub use boltzmann_rbm::{
        MonitoringMethod, Rbm, RbmError, RbmResult, TrainConfig, TrainReport, VisibleUnitType,
    };
}
