//! CSV export for the grid point nearest to a location.

use anyhow::Context;
use log::info;
use std::path::PathBuf;
use ww_api::download::{csv_filename, GridQuery};
use ww_api::WindApi;
use ww_core::data_model::DataModel;
use ww_core::settings::LocationParams;

/// Number of data records (header excluded); fails on malformed CSV.
pub fn count_csv_records(bytes: &[u8]) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut count = 0;
    for record in reader.records() {
        record.context("downloaded file is not valid CSV")?;
        count += 1;
    }
    Ok(count)
}

pub async fn run_download<A: WindApi>(
    api: &A,
    model: DataModel,
    position: LocationParams,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let locations = api
        .nearest_grid_location(&GridQuery::new(model, position))
        .await?;
    let nearest = locations.first().with_context(|| {
        format!(
            "no {} grid point near {}",
            model,
            position.format_coordinates()
        )
    })?;
    info!(
        "Nearest {} grid point: {} ({:.3}, {:.3})",
        model, nearest.index, nearest.latitude, nearest.longitude
    );

    let bytes = api.download_csv(model, nearest).await?;
    let records = count_csv_records(&bytes)?;
    let path = output.unwrap_or_else(|| PathBuf::from(csv_filename(nearest)));
    std::fs::write(&path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;

    println!("Wrote {} records to {}", records, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::count_csv_records;

    #[test]
    fn counts_records_without_header() {
        let csv = b"time,windspeed_40m\n2020-01-01T00:00,5.1\n2020-01-01T01:00,4.9\n";
        assert_eq!(count_csv_records(csv).unwrap(), 2);
        assert_eq!(count_csv_records(b"time,windspeed_40m\n").unwrap(), 0);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let csv = b"time,windspeed_40m\n2020-01-01T00:00,5.1,extra\n";
        assert!(count_csv_records(csv).is_err());
    }
}
