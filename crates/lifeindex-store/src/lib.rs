//! Storage layer: JSON chart and annotation files, Parquet export.

mod error;
pub use error::StoreError;

mod annotations;
pub use annotations::{annotations_from_json, load_annotations, save_annotations};

mod chart;
pub use chart::Chart;

mod export;
pub use export::{DECADE_BARS_FILE, LIFE_INDEX_FILE, export_run, read_parquet, write_parquet};
