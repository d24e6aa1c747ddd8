use boltzmann_rbm::{Rbm, RbmSnapshot, TrainConfig};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

/// A trained model together with the configuration it was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub config: TrainConfig,
    pub model: RbmSnapshot<f64>,
}

impl ModelFile {
    pub fn new(rbm: &Rbm<f64>, config: &TrainConfig) -> Self {
        ModelFile {
            config: config.clone(),
            model: rbm.snapshot(),
        }
    }

    /// Rebuild the model; the chain starts empty.
    pub fn into_rbm(self) -> Result<(Rbm<f64>, TrainConfig), Box<dyn Error>> {
        let rbm = Rbm::from_snapshot(self.model)?;
        Ok((rbm, self.config))
    }
}

/// Save a model file as pretty-printed JSON.
pub fn save_model(model: &ModelFile, path: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(model)?;
    fs::write(Path::new(path), json)?;
    Ok(())
}

/// Load a model file written by [`save_model`].
pub fn load_model(path: &str) -> Result<ModelFile, Box<dyn Error>> {
    let json = fs::read_to_string(Path::new(path))?;
    let model: ModelFile = serde_json::from_str(&json)?;
    Ok(model)
}
