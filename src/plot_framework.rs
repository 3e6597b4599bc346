// src/plot_framework.rs

use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::str::FromStr;

use log::{debug, info};
use ndarray::Array2;
use plotters::backend::{BitMapBackend, DrawingBackend, SVGBackend};
use plotters::chart::ChartBuilder;
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, Rectangle, Text};
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, RED, WHITE};
use plotters::style::{Color, IntoFont, RGBColor};

use crate::constants::{
    CHART_MARGIN_PX, COLORBAR_AREA_PX, COLORBAR_STEPS, DISPLAY_DPI, FONT_FAMILY,
    FONT_SIZE_AXIS_LABEL, FONT_SIZE_CHART_TITLE, FONT_SIZE_MESSAGE, FONT_SIZE_TICK_LABEL,
    REFERENCE_DPI, X_LABEL_AREA_PX, Y_LABEL_AREA_PX,
};
use crate::data_analysis::display_range::DisplayRange;
use crate::error::{render_err, PlotError, Result};

/// Continuous colormaps available to rasters and scatter plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    /// Black (low) to white (high).
    #[default]
    Gray,
    Viridis,
}

impl Colormap {
    /// Color at normalized position `t` in [0, 1]. Non-finite input maps to black.
    pub fn color_at(&self, t: f64) -> RGBColor {
        if !t.is_finite() {
            return RGBColor(0, 0, 0);
        }
        let t = t.clamp(0.0, 1.0);
        match self {
            Colormap::Gray => {
                let v = (t * 255.0).round() as u8;
                RGBColor(v, v, v)
            }
            Colormap::Viridis => {
                let color = colorous::VIRIDIS.eval_continuous(t);
                RGBColor(color.r, color.g, color.b)
            }
        }
    }

    /// Color for `value` scaled into `range`, clamping outside values to the ends.
    pub fn map(&self, value: f64, range: DisplayRange) -> RGBColor {
        if !value.is_finite() {
            return RGBColor(0, 0, 0);
        }
        self.color_at(range.normalize(value))
    }
}

impl FromStr for Colormap {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gray" | "grey" => Ok(Colormap::Gray),
            "viridis" => Ok(Colormap::Viridis),
            other => Err(PlotError::UnsupportedFormat(format!("colormap {other}"))),
        }
    }
}

/// Image encodings a figure can be saved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "bmp" => Ok(OutputFormat::Bmp),
            "svg" => Ok(OutputFormat::Svg),
            other => Err(PlotError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// One polyline; a point with a NaN coordinate splits it into separate runs.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotSeries {
    pub data: Vec<(f64, f64)>,
    pub label: String,
    pub color: RGBColor,
    pub stroke_width: u32,
}

/// Color-mapped image spanning an extent in data coordinates.
///
/// Row 0 of `values` is drawn at `y_extent.0`, the last row ends at `y_extent.1`;
/// column 0 starts at `x_extent.0`.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterLayer {
    pub values: Array2<f64>,
    pub x_extent: (f64, f64),
    pub y_extent: (f64, f64),
    pub colormap: Colormap,
    pub clim: DisplayRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScatterLayer {
    /// (x, y, value) per point.
    pub points: Vec<(f64, f64, f64)>,
    pub colormap: Colormap,
    pub clim: DisplayRange,
    pub radius: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Layer {
    Raster(RasterLayer),
    Lines(Vec<PlotSeries>),
    Scatter(ScatterLayer),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Colorbar {
    pub label: String,
    pub colormap: Colormap,
    pub range: DisplayRange,
}

/// Index of a layer inside an `Axes`, handed back so callers can find a drawn raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerHandle(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct Axes {
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    /// Draw `y_range.start` at the top instead of the bottom.
    pub y_inverted: bool,
    pub layers: Vec<Layer>,
    pub colorbar: Option<Colorbar>,
    /// Shown instead of a chart when there is nothing to draw.
    pub message: Option<String>,
}

impl Default for Axes {
    fn default() -> Self {
        Axes {
            title: None,
            x_label: String::new(),
            y_label: String::new(),
            x_range: 0.0..1.0,
            y_range: 0.0..1.0,
            y_inverted: false,
            layers: Vec::new(),
            colorbar: None,
            message: None,
        }
    }
}

impl Axes {
    pub fn push_layer(&mut self, layer: Layer) -> LayerHandle {
        self.layers.push(layer);
        LayerHandle(self.layers.len() - 1)
    }

    /// Adds an image below every line and scatter layer, above earlier images.
    ///
    /// Layers are painted in order, so overlays already on the axes stay visible.
    /// Handles of the layers that move up are shifted by one.
    pub fn insert_underlay(&mut self, layer: Layer) -> LayerHandle {
        let index = self
            .layers
            .iter()
            .position(|l| !matches!(l, Layer::Raster(_)))
            .unwrap_or(self.layers.len());
        self.layers.insert(index, layer);
        LayerHandle(index)
    }

    pub fn layer(&self, handle: LayerHandle) -> Option<&Layer> {
        self.layers.get(handle.0)
    }

    pub fn raster(&self, handle: LayerHandle) -> Option<&RasterLayer> {
        match self.layer(handle) {
            Some(Layer::Raster(raster)) => Some(raster),
            _ => None,
        }
    }

    /// Data y to the coordinate used on the chart. Inverted axes are drawn negated.
    fn to_chart_y(&self, y: f64) -> f64 {
        if self.y_inverted {
            -y
        } else {
            y
        }
    }

    fn chart_y_range(&self) -> Range<f64> {
        let (a, b) = (self.to_chart_y(self.y_range.start), self.to_chart_y(self.y_range.end));
        a.min(b)..a.max(b)
    }
}

/// A drawing surface: figure size plus one set of axes.
///
/// Renderers fill it in; it is drawn onto a plotters backend only when saved or shown.
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    pub size_in: (f64, f64),
    pub axes: Axes,
}

impl Figure {
    pub fn new(size_in: (f64, f64)) -> Self {
        Figure {
            size_in,
            axes: Axes::default(),
        }
    }

    /// Figure that only carries a message, used for inputs that failed to render.
    pub fn placeholder(size_in: (f64, f64), title: &str, reason: &str) -> Self {
        let mut figure = Figure::new(size_in);
        figure.axes.title = Some(title.to_string());
        figure.axes.message = Some(reason.to_string());
        figure
    }

    pub fn pixel_size(&self, dpi: u32) -> (u32, u32) {
        (
            (self.size_in.0 * dpi as f64).round().max(1.0) as u32,
            (self.size_in.1 * dpi as f64).round().max(1.0) as u32,
        )
    }
}

/// Widens an empty or reversed interval so plotters gets a usable coordinate range.
pub fn padded_range(lo: f64, hi: f64) -> Range<f64> {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if (hi - lo).abs() < 1e-12 {
        let pad = if lo.abs() > 1e-12 { lo.abs() * 0.01 } else { 0.5 };
        (lo - pad)..(hi + pad)
    } else {
        lo..hi
    }
}

/// Tick label text with precision that follows the magnitude.
pub fn format_tick_label(v: f64) -> String {
    let v = if v == 0.0 { 0.0 } else { v }; // avoid "-0"
    let a = v.abs();
    if a >= 100.0 {
        format!("{v:.0}")
    } else if a >= 1.0 {
        format!("{v:.1}")
    } else {
        format!("{v:.2}")
    }
}

fn scaled(size: i32, scale: f64) -> f64 {
    size as f64 * scale
}

fn scaled_px(px: u32, scale: f64) -> u32 {
    (px as f64 * scale).round() as u32
}

/// Draw a message centred on an area.
pub fn draw_unavailable_message<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    reason: &str,
    scale: f64,
) -> Result<()> {
    const CHAR_WIDTH_RATIO: f64 = 0.6; // Approximate character width relative to font size

    let (x_range, y_range) = area.get_pixel_range();
    let (width, height) = (x_range.end - x_range.start, y_range.end - y_range.start);
    let font_size = scaled(FONT_SIZE_MESSAGE, scale);
    let longest = title.len().max(reason.len()) as f64;
    let text_width = (longest * font_size * CHAR_WIDTH_RATIO) as i32;
    let x = (width / 2 - text_width / 2).max(0);
    let y = height / 2 - font_size as i32;

    let title_style = (FONT_FAMILY, font_size).into_font().color(&BLACK);
    let reason_style = (FONT_FAMILY, font_size).into_font().color(&RED);
    area.draw(&Text::new(title.to_string(), (x, y), title_style))
        .map_err(render_err)?;
    area.draw(&Text::new(
        reason.to_string(),
        (x, y + (font_size * 1.4) as i32),
        reason_style,
    ))
    .map_err(render_err)?;
    Ok(())
}

fn draw_raster<DB: DrawingBackend>(
    chart: &mut plotters::chart::ChartContext<
        '_,
        DB,
        plotters::coord::cartesian::Cartesian2d<
            plotters::coord::types::RangedCoordf64,
            plotters::coord::types::RangedCoordf64,
        >,
    >,
    axes: &Axes,
    raster: &RasterLayer,
    max_cells: (usize, usize),
) -> Result<()> {
    let (nrows, ncols) = raster.values.dim();
    if nrows == 0 || ncols == 0 {
        return Ok(());
    }
    // Never draw more cells than there are pixels: stride through the data instead.
    let row_step = nrows.div_ceil(max_cells.1.max(1)).max(1);
    let col_step = ncols.div_ceil(max_cells.0.max(1)).max(1);

    let dx = (raster.x_extent.1 - raster.x_extent.0) / ncols as f64;
    let dy = (raster.y_extent.1 - raster.y_extent.0) / nrows as f64;

    let mut cells = Vec::with_capacity((nrows / row_step + 1) * (ncols / col_step + 1));
    for i in (0..nrows).step_by(row_step) {
        let i_end = (i + row_step).min(nrows);
        let y0 = axes.to_chart_y(raster.y_extent.0 + dy * i as f64);
        let y1 = axes.to_chart_y(raster.y_extent.0 + dy * i_end as f64);
        for j in (0..ncols).step_by(col_step) {
            let j_end = (j + col_step).min(ncols);
            let x0 = raster.x_extent.0 + dx * j as f64;
            let x1 = raster.x_extent.0 + dx * j_end as f64;
            let value = raster.values[[i, j]];
            if !value.is_finite() {
                continue; // leave missing samples as background
            }
            let color = raster.colormap.map(value, raster.clim);
            cells.push(Rectangle::new([(x0, y0), (x1, y1)], color.filled()));
        }
    }
    chart.draw_series(cells).map_err(render_err)?;
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    colorbar: &Colorbar,
    scale: f64,
) -> Result<()> {
    let range = padded_range(colorbar.range.low, colorbar.range.high);
    let mut chart = ChartBuilder::on(area)
        .margin(scaled_px(CHART_MARGIN_PX, scale))
        .margin_top(scaled_px(CHART_MARGIN_PX * 4, scale))
        .x_label_area_size(scaled_px(X_LABEL_AREA_PX, scale))
        .right_y_label_area_size(scaled_px(Y_LABEL_AREA_PX, scale))
        .build_cartesian_2d(0.0f64..1.0f64, range.clone())
        .map_err(render_err)?;

    let step = (range.end - range.start) / COLORBAR_STEPS as f64;
    chart
        .draw_series((0..COLORBAR_STEPS).map(|k| {
            let v0 = range.start + step * k as f64;
            let v1 = v0 + step;
            let color = colorbar.colormap.map(v0 + step * 0.5, colorbar.range);
            Rectangle::new([(0.0, v0), (1.0, v1)], color.filled())
        }))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc(&colorbar.label)
        .y_labels(8)
        .y_label_formatter(&|y| format_tick_label(*y))
        .label_style((FONT_FAMILY, scaled(FONT_SIZE_TICK_LABEL, scale)))
        .axis_desc_style((FONT_FAMILY, scaled(FONT_SIZE_AXIS_LABEL, scale)))
        .draw()
        .map_err(render_err)?;
    Ok(())
}

/// Draws a figure onto any plotters drawing area.
///
/// `scale` multiplies font sizes and margins (1.0 at 100 dpi).
pub fn draw_figure<DB: DrawingBackend>(
    figure: &Figure,
    area: &DrawingArea<DB, Shift>,
    scale: f64,
) -> Result<()> {
    area.fill(&WHITE).map_err(render_err)?;
    let axes = &figure.axes;

    if axes.layers.is_empty() {
        let title = axes.title.as_deref().unwrap_or("Figure");
        let reason = axes.message.as_deref().unwrap_or("Nothing to draw");
        return draw_unavailable_message(area, title, reason, scale);
    }

    let (chart_area, colorbar_area) = match &axes.colorbar {
        Some(_) => {
            let width = area.dim_in_pixel().0;
            let bar_px = scaled_px(COLORBAR_AREA_PX, scale).min(width / 2);
            let (left, right) = area.split_horizontally(width - bar_px);
            (left, Some(right))
        }
        None => (area.clone(), None),
    };

    let mut builder = ChartBuilder::on(&chart_area);
    builder
        .margin(scaled_px(CHART_MARGIN_PX, scale))
        .x_label_area_size(scaled_px(X_LABEL_AREA_PX, scale))
        .y_label_area_size(scaled_px(Y_LABEL_AREA_PX, scale));
    if let Some(title) = &axes.title {
        builder.caption(title, (FONT_FAMILY, scaled(FONT_SIZE_CHART_TITLE, scale)));
    }
    let mut chart = builder
        .build_cartesian_2d(axes.x_range.clone(), axes.chart_y_range())
        .map_err(render_err)?;

    let inverted = axes.y_inverted;
    chart
        .configure_mesh()
        .x_desc(&axes.x_label)
        .y_desc(&axes.y_label)
        .x_labels(10)
        .y_labels(10)
        .x_label_formatter(&|x| format_tick_label(*x))
        .y_label_formatter(&|y| format_tick_label(if inverted { -*y } else { *y }))
        .light_line_style(WHITE.mix(0.0))
        .label_style((FONT_FAMILY, scaled(FONT_SIZE_TICK_LABEL, scale)))
        .axis_desc_style((FONT_FAMILY, scaled(FONT_SIZE_AXIS_LABEL, scale)))
        .draw()
        .map_err(render_err)?;

    let plot_px = chart.plotting_area().dim_in_pixel();
    for layer in &axes.layers {
        match layer {
            Layer::Raster(raster) => {
                draw_raster(
                    &mut chart,
                    axes,
                    raster,
                    (plot_px.0 as usize, plot_px.1 as usize),
                )?;
            }
            Layer::Lines(series) => {
                for s in series {
                    // A non-finite point is a break in the line.
                    for run in s.data.split(|p| !(p.0.is_finite() && p.1.is_finite())) {
                        if run.is_empty() {
                            continue;
                        }
                        chart
                            .draw_series(LineSeries::new(
                                run.iter().map(|&(x, y)| (x, axes.to_chart_y(y))),
                                s.color.stroke_width(s.stroke_width),
                            ))
                            .map_err(render_err)?;
                    }
                }
            }
            Layer::Scatter(scatter) => {
                chart
                    .draw_series(scatter.points.iter().map(|&(x, y, v)| {
                        Circle::new(
                            (x, axes.to_chart_y(y)),
                            scaled_px(scatter.radius, scale),
                            scatter.colormap.map(v, scatter.clim).filled(),
                        )
                    }))
                    .map_err(render_err)?;
            }
        }
    }

    if let (Some(colorbar), Some(bar_area)) = (&axes.colorbar, colorbar_area) {
        draw_colorbar(&bar_area, colorbar, scale)?;
    }
    Ok(())
}

/// Renders a figure to `path` in the requested encoding at `dpi`.
pub fn save_figure(figure: &Figure, path: &Path, format: OutputFormat, dpi: u32) -> Result<()> {
    let size = figure.pixel_size(dpi);
    let scale = dpi as f64 / REFERENCE_DPI;
    debug!("Rendering {}x{} px figure to '{}'", size.0, size.1, path.display());
    match format {
        OutputFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_figure(figure, &root, scale)?;
            root.present().map_err(render_err)?;
        }
        OutputFormat::Png | OutputFormat::Jpeg | OutputFormat::Bmp => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_figure(figure, &root, scale)?;
            root.present().map_err(render_err)?;
        }
    }
    info!("  Figure saved as '{}'.", path.display());
    Ok(())
}

/// Grid shape (rows, cols) that fits `n` figures, as close to square as possible.
pub fn grid_shape(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let cols = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    (rows, cols)
}

/// Lays out several figures on one canvas and writes it as a bitmap.
pub fn save_figure_grid(figures: &[Figure], path: &Path) -> Result<()> {
    if figures.is_empty() {
        return Err(PlotError::NoFigures);
    }
    let (rows, cols) = grid_shape(figures.len());
    let cell_in = figures.iter().fold((0.0f64, 0.0f64), |(w, h), f| {
        (w.max(f.size_in.0), h.max(f.size_in.1))
    });
    let size = (
        (cell_in.0 * cols as f64 * DISPLAY_DPI as f64) as u32,
        (cell_in.1 * rows as f64 * DISPLAY_DPI as f64) as u32,
    );
    let scale = DISPLAY_DPI as f64 / REFERENCE_DPI;

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let cells = root.split_evenly((rows, cols));
    for (figure, cell) in figures.iter().zip(cells.iter()) {
        draw_figure(figure, cell, scale)?;
    }
    root.present().map_err(render_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!(".JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("svg".parse::<OutputFormat>().unwrap(), OutputFormat::Svg);
        assert!(matches!(
            "tiffany".parse::<OutputFormat>(),
            Err(PlotError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_gray_colormap_endpoints() {
        assert_eq!(Colormap::Gray.color_at(0.0), RGBColor(0, 0, 0));
        assert_eq!(Colormap::Gray.color_at(1.0), RGBColor(255, 255, 255));
        let range = DisplayRange::new(-1.0, 1.0);
        assert_eq!(Colormap::Gray.map(5.0, range), RGBColor(255, 255, 255));
        assert_eq!(Colormap::Gray.map(f64::NAN, range), RGBColor(0, 0, 0));
    }

    #[test]
    fn test_padded_range_never_empty() {
        let r = padded_range(3.0, 3.0);
        assert!(r.end > r.start);
        let r = padded_range(0.0, 0.0);
        assert_eq!(r, -0.5..0.5);
        assert_eq!(padded_range(5.0, 1.0), 1.0..5.0);
    }

    #[test]
    fn test_grid_shape() {
        assert_eq!(grid_shape(1), (1, 1));
        assert_eq!(grid_shape(2), (1, 2));
        assert_eq!(grid_shape(3), (2, 2));
        assert_eq!(grid_shape(5), (2, 3));
    }

    #[test]
    fn test_format_tick_label() {
        assert_eq!(format_tick_label(-0.0), "0.00");
        assert_eq!(format_tick_label(0.25), "0.25");
        assert_eq!(format_tick_label(12.34), "12.3");
        assert_eq!(format_tick_label(1500.0), "1500");
    }

    #[test]
    fn test_inverted_axes_negate_chart_range() {
        let axes = Axes {
            y_range: 0.0..10.0,
            y_inverted: true,
            ..Axes::default()
        };
        assert_eq!(axes.chart_y_range(), -10.0..0.0);
        assert_eq!(axes.to_chart_y(2.0), -2.0);
    }

    #[test]
    fn test_underlay_goes_below_overlays() {
        let line = Layer::Lines(vec![PlotSeries {
            data: vec![(0.0, 0.0), (1.0, 1.0)],
            label: "pick".to_string(),
            color: RED,
            stroke_width: 1,
        }]);
        let raster = |v: f64| {
            Layer::Raster(RasterLayer {
                values: Array2::from_elem((1, 1), v),
                x_extent: (0.0, 1.0),
                y_extent: (0.0, 1.0),
                colormap: Colormap::Gray,
                clim: DisplayRange::new(0.0, 1.0),
            })
        };
        let mut axes = Axes::default();
        axes.push_layer(line);
        assert_eq!(axes.insert_underlay(raster(0.0)), LayerHandle(0));
        assert_eq!(axes.insert_underlay(raster(1.0)), LayerHandle(1));
        assert!(matches!(axes.layers[2], Layer::Lines(_)));
        assert_eq!(axes.raster(LayerHandle(1)).unwrap().values[[0, 0]], 1.0);

        let mut empty = Axes::default();
        assert_eq!(empty.insert_underlay(raster(0.5)), LayerHandle(0));
    }

    #[test]
    fn test_pixel_size_follows_dpi() {
        let figure = Figure::new((12.0, 8.0));
        assert_eq!(figure.pixel_size(100), (1200, 800));
        assert_eq!(figure.pixel_size(300), (3600, 2400));
    }
}

// src/plot_framework.rs
