// src/lib.rs - Library interface for the rendering pipeline

pub mod constants;
pub mod data_analysis;
pub mod data_input;
pub mod error;
pub mod orchestrator;
pub mod plot_framework;
pub mod plot_functions;
pub mod plot_request;

pub use data_input::survey_record::SurveyRecord;
pub use error::{PlotError, Result};
pub use orchestrator::{plot, run, BatchReport, DisplaySink, PreviewSink};
pub use plot_framework::Figure;
pub use plot_request::{BatchPolicy, OutputRouting, PlotMode, PlotRequest};
