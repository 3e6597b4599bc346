// src/plot_request.rs

use std::path::PathBuf;

use crate::constants::DEFAULT_SAVE_DPI;
use crate::data_analysis::axis_calibration::{HorizontalMode, TraceRange, VerticalMode};
use crate::data_input::loader::InputFormat;
use crate::error::{PlotError, Result};
use crate::plot_framework::{Colormap, OutputFormat};
use crate::plot_functions::plot_power::PickId;
use crate::plot_functions::plot_radargram::RadargramOptions;
use crate::plot_functions::plot_traces::TraceSelector;

/// Which renderer a request dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotMode {
    #[default]
    Radargram,
    TraceProfile(TraceSelector),
    PowerScatter(PickId),
}

impl PlotMode {
    /// Trace and power selections are mutually exclusive; neither means radargram.
    pub fn from_selections(trace: Option<TraceSelector>, pick: Option<PickId>) -> Result<Self> {
        match (trace, pick) {
            (Some(_), Some(_)) => Err(PlotError::ConflictingPlotMode),
            (Some(selector), None) => Ok(PlotMode::TraceProfile(selector)),
            (None, Some(pick)) => Ok(PlotMode::PowerScatter(pick)),
            (None, None) => Ok(PlotMode::Radargram),
        }
    }
}

/// Where finished figures go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputRouting {
    /// All figures laid out together and handed to a display sink.
    #[default]
    Show,
    /// One file per input, next to the input.
    Save { format: OutputFormat, dpi: u32 },
}

/// What a batch does when one input fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    #[default]
    AbortOnFirstError,
    ContinueOnError,
}

/// One validated rendering task over a batch of inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub inputs: Vec<PathBuf>,
    pub format: InputFormat,
    pub mode: PlotMode,
    pub vertical: VerticalMode,
    pub horizontal: HorizontalMode,
    pub trace_range: TraceRange,
    pub colormap: Colormap,
    pub output: OutputRouting,
    pub batch_policy: BatchPolicy,
}

impl PlotRequest {
    pub fn builder() -> PlotRequestBuilder {
        PlotRequestBuilder::new()
    }

    pub fn radargram_options(&self) -> RadargramOptions {
        RadargramOptions {
            vertical: self.vertical,
            horizontal: self.horizontal,
            trace_range: self.trace_range,
            colormap: self.colormap,
        }
    }
}

/// Collects loosely typed options (as they arrive from a command line) and
/// validates all of them at once in [`PlotRequestBuilder::build`].
#[derive(Debug, Clone)]
pub struct PlotRequestBuilder {
    inputs: Vec<PathBuf>,
    native: bool,
    gssi: bool,
    pulse_ekko: bool,
    trace: Option<String>,
    power: Option<String>,
    vertical: String,
    horizontal: String,
    trace_range: TraceRange,
    colormap: String,
    save: bool,
    output_format: String,
    dpi: u32,
    keep_going: bool,
}

impl PlotRequestBuilder {
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            native: false,
            gssi: false,
            pulse_ekko: false,
            trace: None,
            power: None,
            vertical: VerticalMode::default().to_string(),
            horizontal: HorizontalMode::default().to_string(),
            trace_range: TraceRange::ALL,
            colormap: "gray".to_string(),
            save: false,
            output_format: OutputFormat::default().to_string(),
            dpi: DEFAULT_SAVE_DPI,
            keep_going: false,
        }
    }

    pub fn inputs<I, P>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn native(mut self, flag: bool) -> Self {
        self.native = flag;
        self
    }

    pub fn gssi(mut self, flag: bool) -> Self {
        self.gssi = flag;
        self
    }

    pub fn pulse_ekko(mut self, flag: bool) -> Self {
        self.pulse_ekko = flag;
        self
    }

    pub fn trace(mut self, selector: impl Into<String>) -> Self {
        self.trace = Some(selector.into());
        self
    }

    pub fn power(mut self, pick: impl Into<String>) -> Self {
        self.power = Some(pick.into());
        self
    }

    pub fn vertical(mut self, mode: impl Into<String>) -> Self {
        self.vertical = mode.into();
        self
    }

    pub fn horizontal(mut self, mode: impl Into<String>) -> Self {
        self.horizontal = mode.into();
        self
    }

    pub fn trace_range(mut self, start: i64, end: i64) -> Self {
        self.trace_range = TraceRange::new(start, end);
        self
    }

    pub fn colormap(mut self, name: impl Into<String>) -> Self {
        self.colormap = name.into();
        self
    }

    pub fn save(mut self, flag: bool) -> Self {
        self.save = flag;
        self
    }

    pub fn output_format(mut self, extension: impl Into<String>) -> Self {
        self.output_format = extension.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn keep_going(mut self, flag: bool) -> Self {
        self.keep_going = flag;
        self
    }

    fn input_format(&self) -> Result<InputFormat> {
        let selected = [
            (self.native, InputFormat::Native),
            (self.gssi, InputFormat::Gssi),
            (self.pulse_ekko, InputFormat::PulseEkko),
        ];
        let mut chosen = selected.iter().filter(|(flag, _)| *flag).map(|(_, f)| *f);
        match (chosen.next(), chosen.next()) {
            (Some(_), Some(_)) => Err(PlotError::ConflictingFormatFlags),
            (Some(format), None) => Ok(format),
            (None, _) => Ok(InputFormat::Native),
        }
    }

    fn mode(&self) -> Result<PlotMode> {
        if self.trace.is_some() && self.power.is_some() {
            return Err(PlotError::ConflictingPlotMode);
        }
        let trace = self
            .trace
            .as_deref()
            .map(str::parse::<TraceSelector>)
            .transpose()?;
        let pick = self.power.as_deref().map(str::parse::<PickId>).transpose()?;
        PlotMode::from_selections(trace, pick)
    }

    pub fn build(self) -> Result<PlotRequest> {
        let format = self.input_format()?;
        let mode = self.mode()?;
        let vertical = self.vertical.parse::<VerticalMode>()?;
        let horizontal = self.horizontal.parse::<HorizontalMode>()?;
        let colormap = self.colormap.parse::<Colormap>()?;

        // The extension is checked even when nothing will be saved.
        let output_format = self.output_format.parse::<OutputFormat>()?;
        let output = if self.save {
            OutputRouting::Save {
                format: output_format,
                dpi: self.dpi.max(1),
            }
        } else {
            OutputRouting::Show
        };

        let batch_policy = if self.keep_going {
            BatchPolicy::ContinueOnError
        } else {
            BatchPolicy::AbortOnFirstError
        };

        Ok(PlotRequest {
            inputs: self.inputs,
            format,
            mode,
            vertical,
            horizontal,
            trace_range: self.trace_range,
            colormap,
            output,
            batch_policy,
        })
    }
}

impl Default for PlotRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}


// src/plot_request.rs
