// src/plot_functions/plot_power.rs

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};

use crate::constants::{
    LABEL_DB, LABEL_LATITUDE, LABEL_LONGITUDE, POWER_FIGSIZE_IN, POWER_PERCENTILES,
    SCATTER_POINT_RADIUS_PX,
};
use crate::data_analysis::display_range::{finite_percentiles, widen_degenerate, DisplayRange};
use crate::data_input::survey_record::SurveyRecord;
use crate::error::{PlotError, Result};
use crate::plot_framework::{padded_range, Colorbar, Colormap, Figure, Layer, ScatterLayer};

/// Integer pick number identifying a tracked horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickId(pub i64);

impl fmt::Display for PickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PickId {
    fn from(value: i64) -> Self {
        PickId(value)
    }
}

impl TryFrom<f64> for PickId {
    type Error = PlotError;

    /// Whole-number floats coerce; anything with a fraction does not.
    fn try_from(value: f64) -> Result<Self> {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Ok(PickId(value as i64))
        } else {
            Err(PlotError::InvalidPickIdentifier(value.to_string()))
        }
    }
}

impl FromStr for PickId {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Ok(PickId(value));
        }
        match trimmed.parse::<f64>() {
            Ok(value) => PickId::try_from(value),
            Err(_) => Err(PlotError::InvalidPickIdentifier(s.to_string())),
        }
    }
}

/// Reflected power in dB.
pub fn power_to_db(power: f64) -> f64 {
    10.0 * power.log10()
}

/// Color range for a dB series: 1st/99th percentile, widened if it collapses.
pub fn power_color_range(db: &[f64]) -> Option<DisplayRange> {
    let (p_low, p_high) = POWER_PERCENTILES;
    finite_percentiles(db.iter().copied(), p_low, p_high)
        .map(|(lo, hi)| widen_degenerate(DisplayRange::new(lo, hi)))
}

/// Map of reflected power along one pick, one point per trace at (long, lat).
pub fn plot_power(record: &SurveyRecord, pick: PickId) -> Result<Figure> {
    let picks = match &record.picks {
        Some(picks) if !picks.is_empty() => picks,
        _ => return Err(PlotError::NoPicksAvailable),
    };
    let power = picks
        .power_for(pick.0)
        .ok_or(PlotError::PickNotFound(pick.0))?;

    let db: Vec<f64> = power.iter().map(|&p| power_to_db(p)).collect();
    let clims = power_color_range(&db).ok_or_else(|| {
        PlotError::InvalidRecord(format!("pick {pick} has no positive power values"))
    })?;

    let points: Vec<(f64, f64, f64)> = record
        .long
        .iter()
        .zip(record.lat.iter())
        .zip(db.iter())
        .filter(|((x, y), c)| x.is_finite() && y.is_finite() && c.is_finite())
        .map(|((&x, &y), &c)| (x, y, c))
        .collect();
    if points.len() < db.len() {
        warn!(
            "  Pick {pick}: skipped {} traces with non-finite power or location",
            db.len() - points.len()
        );
    }
    if points.is_empty() {
        return Err(PlotError::InvalidRecord(format!(
            "pick {pick} has no traces with finite location"
        )));
    }

    let (x_min, x_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));
    let (y_min, y_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.1), hi.max(p.1)));

    debug!(
        "Power map for pick {pick}: {} points, clims ({:.2}, {:.2}) dB",
        points.len(),
        clims.low,
        clims.high
    );

    let mut figure = Figure::new(POWER_FIGSIZE_IN);
    let axes = &mut figure.axes;
    axes.x_label = LABEL_LONGITUDE.to_string();
    axes.y_label = LABEL_LATITUDE.to_string();
    axes.x_range = padded_range(x_min, x_max);
    axes.y_range = padded_range(y_min, y_max);
    axes.push_layer(Layer::Scatter(ScatterLayer {
        points,
        colormap: Colormap::Viridis,
        clim: clims,
        radius: SCATTER_POINT_RADIUS_PX,
    }));
    axes.colorbar = Some(Colorbar {
        label: LABEL_DB.to_string(),
        colormap: Colormap::Viridis,
        range: clims,
    });
    Ok(figure)
}


// src/plot_functions/plot_power.rs
