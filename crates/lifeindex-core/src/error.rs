use thiserror::Error;

/// Contract violations the engine refuses to paper over.
///
/// Everything else (unknown vocabulary, empty text, unmatched annotations)
/// degrades to a neutral contribution instead of surfacing here.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("duplicate year {year} in year records: compounding order is ambiguous")]
    DuplicateYear { year: i32 },

    #[error("compounding base must be positive and finite, got {0}")]
    NonPositiveBase(f64),
}
