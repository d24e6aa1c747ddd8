//! Train an RBM on a small bars dataset, then fill in half-observed patterns.
//!
//! Run with `RUST_LOG=info cargo run -p boltzmann --example train_bars`.

use boltzmann::core::MatrixError;
use boltzmann::prelude::*;
use log::info;

fn bars(copies: usize) -> Result<Matrix<f64>, MatrixError> {
    let patterns = [
        vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0],
        vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
        vec![1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0],
    ];
    let columns: Vec<Vec<f64>> = (0..copies).flat_map(|_| patterns.iter().cloned()).collect();
    Matrix::from_columns(&columns)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let data = bars(16)?;

    // left and right halves as separate groups so one can be clamped
    let mut rbm: Rbm<f64> = Rbm::new(8).with_seed(Some(7));
    rbm.add_visible_group(4, VisibleUnitType::Binary)?;
    rbm.add_visible_group(4, VisibleUnitType::Binary)?;
    rbm.initialize(0.01)?;

    let config = TrainConfig::new()
        .with_max_epochs(500)
        .with_mini_batch_size(16)
        .with_learning_rate(0.05)
        .with_momentum(0.5)
        .with_monitoring(MonitoringMethod::PseudoLikelihood, 200);
    let report = rbm.train(&data, &config)?;
    info!(
        "{} updates, final learning rate {}",
        report.updates, report.final_learning_rate
    );

    let evidence = data.slice_rows(0, 4)?.slice_cols(0, 4)?;
    let completed = rbm.sample_group_with_evidence(1, 0, &evidence, 50)?;
    println!("left half (evidence):\n{}", evidence);
    println!("right half (conditional means):\n{}", completed);

    let path = std::env::temp_dir().join("boltzmann_bars.json");
    let path = path.to_string_lossy();
    save_model(&ModelFile::new(&rbm, &config), &path)?;
    println!("model written to {}", path);
    Ok(())
}
