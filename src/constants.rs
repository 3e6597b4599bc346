// src/constants.rs

use plotters::style::RGBColor;

// Figure sizes in inches. Pixel dimensions are inches * dpi.
pub const RADARGRAM_FIGSIZE_IN: (f64, f64) = (12.0, 8.0);
pub const TRACE_FIGSIZE_IN: (f64, f64) = (8.0, 12.0);
pub const POWER_FIGSIZE_IN: (f64, f64) = (8.0, 12.0);

// Resolution used when saving (matches the CLI default) and when composing the preview.
pub const DEFAULT_SAVE_DPI: u32 = 300;
pub const DISPLAY_DPI: u32 = 100;
// Font sizes below are specified at this reference resolution and scaled with dpi.
pub const REFERENCE_DPI: f64 = 100.0;

// Propagation velocity (m/s) used to convert two-way travel time (usec) to depth.
pub const PROPAGATION_VELOCITY_M_S: f64 = 1.69e8;
pub const USEC_TO_SEC: f64 = 1.0e-6;

// Percentile pairs for display ranges.
pub const RADARGRAM_PERCENTILES: (f64, f64) = (10.0, 90.0);
pub const TRACE_PERCENTILES: (f64, f64) = (1.0, 99.0);
pub const POWER_PERCENTILES: (f64, f64) = (1.0, 99.0);

// Degenerate color-range guard for the power scatter.
pub const DEGENERATE_RELATIVE_TOLERANCE: f64 = 1.0e-8;
pub const DEGENERATE_WIDENING_FRACTION: f64 = 0.01;
pub const DEGENERATE_ZERO_WIDENING: f64 = 1.0;

// --- Axis labels ---
pub const LABEL_ELEVATION: &str = "Elevation (m)";
pub const LABEL_TWTT: &str = "Two way travel time (usec)";
pub const LABEL_DEPTH: &str = "Depth (m)";
pub const LABEL_TRACE_NUMBER: &str = "Trace number";
pub const LABEL_DISTANCE: &str = "Distance (km)";
pub const LABEL_POWER: &str = "Power";
pub const LABEL_DB: &str = "dB";
pub const LABEL_LONGITUDE: &str = "Longitude";
pub const LABEL_LATITUDE: &str = "Latitude";

// --- Font sizes (at REFERENCE_DPI) ---
pub const FONT_SIZE_CHART_TITLE: i32 = 18;
pub const FONT_SIZE_AXIS_LABEL: i32 = 13;
pub const FONT_SIZE_TICK_LABEL: i32 = 11;
pub const FONT_SIZE_MESSAGE: i32 = 16;
pub const FONT_FAMILY: &str = "sans-serif";

// --- Layout (pixels at REFERENCE_DPI) ---
pub const CHART_MARGIN_PX: u32 = 10;
pub const X_LABEL_AREA_PX: u32 = 45;
pub const Y_LABEL_AREA_PX: u32 = 65;
pub const COLORBAR_AREA_PX: u32 = 90;
pub const COLORBAR_STEPS: usize = 128;
pub const SCATTER_POINT_RADIUS_PX: u32 = 3;

// Stroke widths for lines
pub const LINE_WIDTH_PLOT: u32 = 1;

// Matplotlib "tab10" cycle so multi-trace profiles get distinct colors.
pub const TRACE_COLOR_CYCLE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

// src/constants.rs
