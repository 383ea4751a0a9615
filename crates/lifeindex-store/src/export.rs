//! Parquet export of life-index series and decade bars.

use std::fs::File;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use lifeindex_core::{DecadeBar, LifeIndexSeries, decade_bars_to_record_batch};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::info;

use crate::StoreError;

pub const LIFE_INDEX_FILE: &str = "life_index.parquet";
pub const DECADE_BARS_FILE: &str = "decade_bars.parquet";

/// Write batches sharing one schema to a Parquet file (overwriting).
pub fn write_parquet(path: &Path, batches: &[RecordBatch]) -> Result<(), StoreError> {
    let Some(first) = batches.first() else {
        return Err(StoreError::Other(format!("no record batches for {path:?}")));
    };
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, first.schema(), None)?;
    for batch in batches {
        writer.write(batch)?;
    }
    writer.close()?;

    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    info!(path = %path.display(), rows, "wrote parquet");
    Ok(())
}

/// Read a Parquet file into Arrow RecordBatches.
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches: Result<Vec<RecordBatch>, _> = reader.collect();
    Ok(batches?)
}

/// Write `life_index.parquet` and `decade_bars.parquet` into `dir`.
pub fn export_run(
    dir: &Path,
    series: &LifeIndexSeries,
    bars: &[DecadeBar],
) -> Result<(), StoreError> {
    std::fs::create_dir_all(dir)?;
    write_parquet(&dir.join(LIFE_INDEX_FILE), &[series.to_record_batch()?])?;
    write_parquet(&dir.join(DECADE_BARS_FILE), &[decade_bars_to_record_batch(bars)?])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeindex_core::schema::decade_bars_from_batches;
    use lifeindex_core::{
        ScoringConfig, ScoringTables, YearRecord, build_life_index, build_year_signal,
        to_decade_bars,
    };
    use tempfile::TempDir;

    fn sample_run() -> (LifeIndexSeries, Vec<DecadeBar>) {
        let years: Vec<YearRecord> = (0..25)
            .map(|i| {
                YearRecord::new(i, 1990 + i as i32)
                    .with_actor(["比", "财", "官"][i as usize % 3])
                    .with_description(if i % 4 == 0 { "冲" } else { "合" })
            })
            .collect();
        let config = ScoringConfig::default();
        let signal = build_year_signal(&years, &[], &config, &ScoringTables::default(), None);
        let series = build_life_index(&years, &signal, config.base).unwrap();
        let bars = to_decade_bars(&series);
        (series, bars)
    }

    #[test]
    fn read_missing_file_errors() {
        let result = read_parquet(Path::new("/nonexistent/file.parquet"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn write_requires_batches() {
        let tmp = TempDir::new().unwrap();
        let result = write_parquet(&tmp.path().join("empty.parquet"), &[]);
        assert!(matches!(result, Err(StoreError::Other(_))));
    }

    #[test]
    fn export_writes_both_files() {
        let tmp = TempDir::new().unwrap();
        let (series, bars) = sample_run();
        export_run(tmp.path(), &series, &bars).unwrap();

        let index_batches = read_parquet(&tmp.path().join(LIFE_INDEX_FILE)).unwrap();
        let rows: usize = index_batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(rows, 25);
        assert!(index_batches[0].schema().field_with_name("life_index").is_ok());

        let bar_batches = read_parquet(&tmp.path().join(DECADE_BARS_FILE)).unwrap();
        assert_eq!(decade_bars_from_batches(&bar_batches).unwrap(), bars);
    }

    #[test]
    fn export_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("runs").join("first");
        let (series, bars) = sample_run();
        export_run(&dir, &series, &bars).unwrap();
        assert!(dir.join(LIFE_INDEX_FILE).exists());
    }
}
