use boltzmann_core::Matrix;
use std::error::Error;
use std::path::Path;

/// Read a headered numeric CSV (one sample per row) into a feature matrix
/// with one sample per column, plus the column headers.
pub fn read_features_csv(path: &str) -> Result<(Matrix<f64>, Vec<String>), Box<dyn Error>> {
    let mut rdr = csv::Reader::from_path(Path::new(path))?;
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

    let mut samples = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let mut sample = Vec::with_capacity(record.len());
        for (col, field) in record.iter().enumerate() {
            let val: f64 = field.trim().parse().map_err(|e| {
                format!(
                    "{}: row {}, column {:?}: cannot parse {:?}: {}",
                    path,
                    row + 1,
                    headers.get(col),
                    field,
                    e
                )
            })?;
            sample.push(val);
        }
        samples.push(sample);
    }

    if samples.is_empty() {
        return Err(format!("{}: no samples", path).into());
    }
    let features = Matrix::from_columns(&samples)?;
    Ok((features, headers))
}

/// Write a feature matrix (one sample per column) as CSV, one sample per row.
pub fn write_samples_csv(
    path: &str,
    samples: &Matrix<f64>,
    headers: Option<&[String]>,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(Path::new(path))?;

    if let Some(h) = headers {
        if h.len() != samples.rows() {
            return Err(format!("{} headers for {} features", h.len(), samples.rows()).into());
        }
        wtr.write_record(h)?;
    }

    for j in 0..samples.cols() {
        let row: Vec<String> = samples.column(j)?.iter().map(|v| format!("{}", v)).collect();
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
