//! Restricted Boltzmann Machines with heterogeneous visible units.
//!
//! The model keeps a single flat parameter vector (visible bias, hidden bias,
//! weights), a registry of visible unit groups and a batch-sized Gibbs chain.
//! Training uses (persistent) contrastive divergence with momentum.

pub mod error;
pub mod units;
pub mod params;
pub mod state;
pub mod rbm;
pub mod energy;
pub mod train;

pub use error::{RbmError, RbmResult};
pub use units::{VisibleGroup, VisibleGroups, VisibleUnitType};
pub use params::{ParamLayout, ParamView, ParamViewMut};
pub use state::BatchState;
pub use rbm::{Rbm, RbmSnapshot};
pub use train::{MonitorRecord, MonitoringMethod, TrainConfig, TrainReport};
