// src/data_input/loader.rs

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info};

use crate::data_input::survey_record::SurveyRecord;
use crate::error::{PlotError, Result};

/// On-disk formats an ingestion adapter may be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Processed records in the native JSON layout.
    #[default]
    Native,
    /// GSSI `.DZT` files.
    Gssi,
    /// Sensors & Software PulseEKKO `.DT1` files.
    PulseEkko,
}

impl InputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            InputFormat::Native => "native",
            InputFormat::Gssi => "gssi",
            InputFormat::PulseEkko => "pe",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InputFormat {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "mat" | "json" => Ok(InputFormat::Native),
            "gssi" | "dzt" => Ok(InputFormat::Gssi),
            "pe" | "pulse-ekko" | "pulseekko" | "dt1" => Ok(InputFormat::PulseEkko),
            other => Err(PlotError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Ingestion adapter seam: turns input paths into survey records.
///
/// Implementations return one record per path, in order.
pub trait SurveyLoader {
    fn load(&self, format: InputFormat, paths: &[PathBuf]) -> Result<Vec<SurveyRecord>>;
}

/// Loader for the native format. Vendor formats are left to external adapters.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLoader;

impl SurveyLoader for DefaultLoader {
    fn load(&self, format: InputFormat, paths: &[PathBuf]) -> Result<Vec<SurveyRecord>> {
        match format {
            InputFormat::Native => paths.iter().map(|p| read_native(p)).collect(),
            other => Err(PlotError::UnsupportedFormat(other.name().to_string())),
        }
    }
}

/// Reads and validates a single native record.
pub fn read_native(path: &Path) -> Result<SurveyRecord> {
    let file = File::open(path).map_err(|source| PlotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record: SurveyRecord =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| PlotError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    record.validate()?;
    info!(
        "Loaded '{}': {} samples x {} traces",
        path.display(),
        record.num_samples(),
        record.tnum
    );
    debug!(
        "  nmo_depth: {}, elevation display: {}, picks: {}",
        record.nmo_depth.is_some(),
        record.elevation_display().is_some(),
        record.picks.as_ref().map_or(0, |p| p.picknums.len())
    );
    Ok(record)
}

/// Writes a record in the native layout.
pub fn write_native(record: &SurveyRecord, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| PlotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer(std::io::BufWriter::new(file), record).map_err(|source| {
        PlotError::Json {
            path: path.to_path_buf(),
            source,
        }
    })
}


// src/data_input/loader.rs
