// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Every failure the rendering pipeline can report.
///
/// Validation variants are raised before any drawing starts, so a request that
/// fails never leaves a partial figure behind.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("invalid axis mode '{0}': horizontal choices are tnum or dist, vertical choices are twtt or depth")]
    InvalidAxisMode(String),

    #[error("invalid trace selector '{0}': expected a single trace index or a 2-element pair of bounds")]
    InvalidTraceSelector(String),

    #[error("invalid pick identifier '{0}': please enter an integer pick number")]
    InvalidPickIdentifier(String),

    #[error("there are no picks on this record, cannot plot return power")]
    NoPicksAvailable,

    #[error("pick number {0} not found in this record")]
    PickNotFound(i64),

    #[error("input cannot be more than one of native, gssi and pulse-ekko")]
    ConflictingFormatFlags,

    #[error("cannot plot both traces and power, pick one")]
    ConflictingPlotMode,

    #[error("unsupported format '{0}'")]
    UnsupportedFormat(String),

    #[error("invalid trace range ({start}, {end}) for a record with {tnum} traces")]
    InvalidTraceRange { start: i64, end: i64, tnum: usize },

    #[error("invalid survey record: {0}")]
    InvalidRecord(String),

    #[error("no figures were produced")]
    NoFigures,

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, PlotError>;

/// Collapses a plotters backend error into `PlotError::Render`.
///
/// Drawing errors are generic over the backend, so only their message is kept.
pub fn render_err<E: std::fmt::Display>(err: E) -> PlotError {
    PlotError::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = PlotError::InvalidAxisMode("banana".to_string());
        assert!(err.to_string().contains("banana"));

        let err = PlotError::PickNotFound(3);
        assert!(err.to_string().contains('3'));

        let err = PlotError::InvalidTraceRange { start: 5, end: 2, tnum: 10 };
        assert!(err.to_string().contains("(5, 2)"));
    }
}
