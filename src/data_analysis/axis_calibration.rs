// src/data_analysis/axis_calibration.rs

use std::fmt;
use std::str::FromStr;

use ndarray::{s, Array1};
use ndarray_stats::QuantileExt;

use crate::constants::{
    LABEL_DEPTH, LABEL_DISTANCE, LABEL_ELEVATION, LABEL_TRACE_NUMBER, LABEL_TWTT,
    PROPAGATION_VELOCITY_M_S, USEC_TO_SEC,
};
use crate::data_input::survey_record::SurveyRecord;
use crate::error::{PlotError, Result};

/// Units of the vertical (sample) axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalMode {
    #[default]
    TravelTime,
    Depth,
}

impl FromStr for VerticalMode {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twtt" | "time" => Ok(VerticalMode::TravelTime),
            "depth" => Ok(VerticalMode::Depth),
            other => Err(PlotError::InvalidAxisMode(other.to_string())),
        }
    }
}

impl fmt::Display for VerticalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerticalMode::TravelTime => f.write_str("twtt"),
            VerticalMode::Depth => f.write_str("depth"),
        }
    }
}

/// Units of the horizontal (trace) axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalMode {
    #[default]
    TraceNumber,
    Distance,
}

impl FromStr for HorizontalMode {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tnum" | "trace" => Ok(HorizontalMode::TraceNumber),
            "dist" | "distance" => Ok(HorizontalMode::Distance),
            other => Err(PlotError::InvalidAxisMode(other.to_string())),
        }
    }
}

impl fmt::Display for HorizontalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HorizontalMode::TraceNumber => f.write_str("tnum"),
            HorizontalMode::Distance => f.write_str("dist"),
        }
    }
}

/// Requested window of traces. An `end` of -1 runs to the last trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRange {
    pub start: i64,
    pub end: i64,
}

impl Default for TraceRange {
    fn default() -> Self {
        TraceRange::ALL
    }
}

/// Half-open `[start, end)` trace window checked against a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: usize,
    pub end: usize,
}

impl ResolvedRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn as_tuple(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}

impl TraceRange {
    pub const ALL: TraceRange = TraceRange { start: 0, end: -1 };

    pub fn new(start: i64, end: i64) -> Self {
        TraceRange { start, end }
    }

    /// Replaces the "to end" sentinel with `tnum` and checks the bounds.
    pub fn resolve(&self, tnum: usize) -> Result<ResolvedRange> {
        let invalid = || PlotError::InvalidTraceRange {
            start: self.start,
            end: self.end,
            tnum,
        };
        let end = if self.end == -1 {
            tnum
        } else {
            usize::try_from(self.end).map_err(|_| invalid())?
        };
        let start = usize::try_from(self.start).map_err(|_| invalid())?;
        if start >= end || end > tnum {
            return Err(invalid());
        }
        Ok(ResolvedRange { start, end })
    }
}

/// Vertical coordinates with their display label and orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalAxis {
    pub values: Array1<f64>,
    pub label: &'static str,
    /// True when values grow downward (time/depth); false for elevation.
    pub inverted: bool,
}

impl VerticalAxis {
    pub fn is_elevation(&self) -> bool {
        !self.inverted
    }
}

/// Horizontal coordinates restricted to the trace window.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalAxis {
    pub values: Array1<f64>,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisCalibration {
    pub vertical: VerticalAxis,
    pub horizontal: HorizontalAxis,
    pub trace_range: ResolvedRange,
}

/// Depth (m) from two-way travel time (usec) at the fixed propagation velocity.
pub fn depth_from_travel_time(travel_time: &Array1<f64>) -> Array1<f64> {
    travel_time.mapv(|t| t / 2.0 * PROPAGATION_VELOCITY_M_S * USEC_TO_SEC)
}

/// Time or depth per sample, ignoring any elevation request.
pub fn sample_axis(record: &SurveyRecord, mode: VerticalMode) -> VerticalAxis {
    let (values, label) = match mode {
        VerticalMode::TravelTime => (record.travel_time.clone(), LABEL_TWTT),
        VerticalMode::Depth => {
            let depth = match &record.nmo_depth {
                Some(depth) => depth.clone(),
                None => depth_from_travel_time(&record.travel_time),
            };
            (depth, LABEL_DEPTH)
        }
    };
    VerticalAxis {
        values,
        label,
        inverted: true,
    }
}

/// Vertical axis for radargrams: elevation overrides `mode` when the record asks for it.
pub fn vertical_axis(record: &SurveyRecord, mode: VerticalMode) -> VerticalAxis {
    match record.elevation_display() {
        Some(elevation) => VerticalAxis {
            values: elevation.clone(),
            label: LABEL_ELEVATION,
            inverted: false,
        },
        None => sample_axis(record, mode),
    }
}

pub fn horizontal_axis(
    record: &SurveyRecord,
    mode: HorizontalMode,
    range: ResolvedRange,
) -> HorizontalAxis {
    match mode {
        HorizontalMode::TraceNumber => HorizontalAxis {
            values: (range.start..range.end).map(|t| t as f64).collect(),
            label: LABEL_TRACE_NUMBER,
        },
        HorizontalMode::Distance => HorizontalAxis {
            values: record.dist.slice(s![range.start..range.end]).to_owned(),
            label: LABEL_DISTANCE,
        },
    }
}

/// Resolves the trace window and derives both axes for a record.
pub fn calibrate(
    record: &SurveyRecord,
    vertical: VerticalMode,
    horizontal: HorizontalMode,
    range: TraceRange,
) -> Result<AxisCalibration> {
    let trace_range = range.resolve(record.tnum)?;
    Ok(AxisCalibration {
        vertical: vertical_axis(record, vertical),
        horizontal: horizontal_axis(record, horizontal, trace_range),
        trace_range,
    })
}

/// Min and max of a coordinate array, or `None` when empty or not comparable (NaN).
pub fn extent(values: &Array1<f64>) -> Option<(f64, f64)> {
    let min = *values.min().ok()?;
    let max = *values.max().ok()?;
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}


// src/data_analysis/axis_calibration.rs
