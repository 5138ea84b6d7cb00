use crate::error::{CliError, Result};
use nalgebra::DMatrix;
use std::path::Path;

/// Writes a square state matrix as CSV with 1-based state labels on both axes.
pub fn write_matrix_csv(path: &Path, matrix: &DMatrix<f64>) -> Result<()> {
    let export_err = |source| CliError::Export {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(export_err)?;

    let mut header = vec!["state".to_string()];
    header.extend((1..=matrix.ncols()).map(|j| j.to_string()));
    writer.write_record(&header).map_err(export_err)?;

    for (i, row) in matrix.row_iter().enumerate() {
        let mut record = vec![(i + 1).to_string()];
        record.extend(row.iter().map(|v| v.to_string()));
        writer.write_record(&record).map_err(export_err)?;
    }
    writer.flush()?;
    Ok(())
}
