// src/plot_functions/plot_traces.rs

use std::str::FromStr;

use log::debug;
use ndarray::s;

use crate::constants::{LABEL_POWER, LINE_WIDTH_PLOT, TRACE_COLOR_CYCLE, TRACE_FIGSIZE_IN, TRACE_PERCENTILES};
use crate::data_analysis::axis_calibration::{extent, sample_axis, ResolvedRange, VerticalMode};
use crate::data_analysis::display_range::{finite_percentiles, profile_range};
use crate::data_input::survey_record::SurveyRecord;
use crate::error::{PlotError, Result};
use crate::plot_framework::{padded_range, Figure, Layer, PlotSeries};

/// Which traces to draw: one index, or a pair of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceSelector {
    Single(usize),
    /// Half-open bounds; equal bounds select the single trace.
    Pair(usize, usize),
}

impl TraceSelector {
    /// Normalizes to a half-open range: `i` and `(i, i)` both become `[i, i + 1)`.
    pub fn resolve(&self, tnum: usize) -> Result<ResolvedRange> {
        let invalid =
            || PlotError::InvalidTraceSelector(format!("{self} (record has {tnum} traces)"));
        let (start, end) = match *self {
            TraceSelector::Single(i) => (i, i.checked_add(1).ok_or_else(invalid)?),
            TraceSelector::Pair(a, b) if a == b => (a, a.checked_add(1).ok_or_else(invalid)?),
            TraceSelector::Pair(a, b) => (a, b),
        };
        if start >= end || end > tnum {
            return Err(invalid());
        }
        Ok(ResolvedRange { start, end })
    }
}

impl std::fmt::Display for TraceSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceSelector::Single(i) => write!(f, "{i}"),
            TraceSelector::Pair(a, b) => write!(f, "({a}, {b})"),
        }
    }
}

impl FromStr for TraceSelector {
    type Err = PlotError;

    /// Accepts `"5"`, `"5,9"`, `"5 9"` or `"5:9"`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || PlotError::InvalidTraceSelector(s.to_string());
        let parts: Vec<&str> = s
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split(|c: char| c == ',' || c == ':' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        let index = |p: &str| p.parse::<usize>().map_err(|_| invalid());
        match parts.as_slice() {
            [i] => Ok(TraceSelector::Single(index(i)?)),
            [a, b] => Ok(TraceSelector::Pair(index(a)?, index(b)?)),
            _ => Err(invalid()),
        }
    }
}

fn push_gap(out: &mut Vec<(f64, f64)>) {
    if matches!(out.last(), Some(last) if last.0.is_finite()) {
        out.push((f64::NAN, f64::NAN));
    }
}

/// Cuts a polyline at the vertical lines `x = lo` and `x = hi`.
///
/// Segments leaving the window end on the edge and the line resumes where it
/// re-enters; runs are separated by a NaN point. Non-finite samples also break
/// the line.
pub fn clip_to_x_limits(points: &[(f64, f64)], lo: f64, hi: f64) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(points.len());
    let mut prev: Option<(f64, f64)> = None;
    for &p in points {
        if !(p.0.is_finite() && p.1.is_finite()) {
            push_gap(&mut out);
            prev = None;
            continue;
        }
        if let Some(q) = prev {
            if q.0 != p.0 {
                let mut crossings: Vec<(f64, f64)> = [lo, hi]
                    .iter()
                    .map(|&edge| ((edge - q.0) / (p.0 - q.0), edge))
                    .filter(|(t, _)| *t > 0.0 && *t < 1.0)
                    .collect();
                crossings.sort_by(|a, b| a.0.total_cmp(&b.0));
                for (t, edge) in crossings {
                    out.push((edge, q.1 + t * (p.1 - q.1)));
                }
            }
        }
        if p.0 >= lo && p.0 <= hi {
            out.push(p);
        } else {
            push_gap(&mut out);
        }
        prev = Some(p);
    }
    if matches!(out.last(), Some(last) if !last.0.is_finite()) {
        out.pop();
    }
    out
}

/// Amplitude against time/depth for one or more adjacent traces on shared axes.
pub fn plot_traces(
    record: &SurveyRecord,
    selector: TraceSelector,
    vertical: VerticalMode,
) -> Result<Figure> {
    let range = selector.resolve(record.tnum)?;
    let columns = record.data.slice(s![.., range.start..range.end]);

    let (p_low, p_high) = TRACE_PERCENTILES;
    let (lo, hi) = finite_percentiles(columns.iter().copied(), p_low, p_high).ok_or_else(|| {
        PlotError::InvalidRecord(format!("trace {selector} has no finite amplitudes"))
    })?;
    let x_lims = profile_range(lo, hi);

    let axis = sample_axis(record, vertical);
    let (y_min, y_max) = extent(&axis.values)
        .ok_or_else(|| PlotError::InvalidRecord("vertical coordinates are not finite".into()))?;

    debug!(
        "Trace profile {}..{}, x-limits ({:.3}, {:.3})",
        range.start, range.end, x_lims.low, x_lims.high
    );

    let series: Vec<PlotSeries> = (range.start..range.end)
        .enumerate()
        .map(|(k, trace)| {
            let points: Vec<(f64, f64)> = record
                .data
                .column(trace)
                .iter()
                .zip(axis.values.iter())
                .map(|(&a, &y)| (a, y))
                .collect();
            PlotSeries {
                data: clip_to_x_limits(&points, x_lims.low, x_lims.high),
                label: format!("Trace {trace}"),
                color: TRACE_COLOR_CYCLE[k % TRACE_COLOR_CYCLE.len()],
                stroke_width: LINE_WIDTH_PLOT,
            }
        })
        .collect();

    let mut figure = Figure::new(TRACE_FIGSIZE_IN);
    let axes = &mut figure.axes;
    axes.x_label = LABEL_POWER.to_string();
    axes.y_label = axis.label.to_string();
    axes.x_range = padded_range(x_lims.low, x_lims.high);
    axes.y_range = padded_range(y_min, y_max);
    axes.y_inverted = true;
    axes.push_layer(Layer::Lines(series));
    Ok(figure)
}


// src/plot_functions/plot_traces.rs
