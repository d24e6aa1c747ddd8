//! Reading feature matrices from CSV and persisting trained models as JSON.

pub mod csv_io;
pub mod model_io;

pub use csv_io::{read_features_csv, write_samples_csv};
pub use model_io::{load_model, save_model, ModelFile};
