// src/plot_functions/plot_radargram.rs

use log::debug;
use ndarray::{s, Array1};

use crate::constants::RADARGRAM_FIGSIZE_IN;
use crate::data_analysis::axis_calibration::{
    calibrate, extent, HorizontalMode, ResolvedRange, TraceRange, VerticalMode,
};
use crate::data_analysis::display_range::{estimate_display_range, DisplayRange};
use crate::data_input::survey_record::SurveyRecord;
use crate::error::{PlotError, Result};
use crate::plot_framework::{padded_range, Colormap, Figure, Layer, LayerHandle, RasterLayer};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RadargramOptions {
    pub vertical: VerticalMode,
    pub horizontal: HorizontalMode,
    pub trace_range: TraceRange,
    pub colormap: Colormap,
}

/// Everything needed to overlay annotations (e.g. picks) in the radargram's coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotInfo {
    /// Raster layer inside the returned figure's axes.
    pub image: LayerHandle,
    pub x_coords: Array1<f64>,
    pub y_coords: Array1<f64>,
    pub trace_range: ResolvedRange,
    pub clims: DisplayRange,
}

/// Draws the amplitude image of a trace window, returning the figure.
///
/// With `surface` the radargram replaces the axes settings of an existing figure
/// and goes underneath its lines and scatter points; otherwise a new 12x8 in
/// figure is created.
pub fn plot_radargram(
    record: &SurveyRecord,
    options: &RadargramOptions,
    surface: Option<Figure>,
) -> Result<Figure> {
    plot_radargram_with_info(record, options, surface).map(|(figure, _)| figure)
}

/// Same as [`plot_radargram`] but also hands back the raster handle and coordinates.
pub fn plot_radargram_with_info(
    record: &SurveyRecord,
    options: &RadargramOptions,
    surface: Option<Figure>,
) -> Result<(Figure, PlotInfo)> {
    let range = options.trace_range.resolve(record.tnum)?;

    let window = record.data.slice(s![.., range.start..range.end]);
    let clims = estimate_display_range(window)?;

    let calibration = calibrate(record, options.vertical, options.horizontal, options.trace_range)?;
    let vertical = calibration.vertical;
    let horizontal = calibration.horizontal;

    let (x_min, x_max) = extent(&horizontal.values)
        .ok_or_else(|| PlotError::InvalidRecord("horizontal coordinates are not finite".into()))?;
    let (y_min, y_max) = extent(&vertical.values)
        .ok_or_else(|| PlotError::InvalidRecord("vertical coordinates are not finite".into()))?;

    // First sample row belongs at the top of the image: the shallow end on an
    // inverted time/depth axis, the high end on an upward elevation axis.
    let elevation = vertical.is_elevation();
    let y_extent = if elevation {
        (y_max, y_min)
    } else {
        (y_min, y_max)
    };

    debug!(
        "Radargram traces {}..{}, clims ({:.3}, {:.3}), elevation: {}",
        range.start, range.end, clims.low, clims.high, elevation
    );

    let mut figure = surface.unwrap_or_else(|| Figure::new(RADARGRAM_FIGSIZE_IN));
    let axes = &mut figure.axes;
    axes.x_label = horizontal.label.to_string();
    axes.y_label = vertical.label.to_string();
    axes.x_range = padded_range(x_min, x_max);
    axes.y_range = padded_range(y_min, y_max);
    axes.y_inverted = !elevation;
    axes.message = None;
    let image = axes.insert_underlay(Layer::Raster(RasterLayer {
        values: window.to_owned(),
        x_extent: (x_min, x_max),
        y_extent,
        colormap: options.colormap,
        clim: clims,
    }));

    let info = PlotInfo {
        image,
        x_coords: horizontal.values,
        y_coords: vertical.values,
        trace_range: range,
        clims,
    };
    Ok((figure, info))
}


// src/plot_functions/plot_radargram.rs
