// src/orchestrator.rs

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::constants::RADARGRAM_FIGSIZE_IN;
use crate::data_input::loader::{DefaultLoader, SurveyLoader};
use crate::data_input::survey_record::SurveyRecord;
use crate::error::{PlotError, Result};
use crate::plot_framework::{save_figure, save_figure_grid, Figure, OutputFormat};
use crate::plot_functions::plot_power::plot_power;
use crate::plot_functions::plot_radargram::plot_radargram;
use crate::plot_functions::plot_traces::plot_traces;
use crate::plot_request::{BatchPolicy, OutputRouting, PlotMode, PlotRequest};

/// Receives every figure of a show-mode batch in one call and returns once
/// the display session is over.
pub trait DisplaySink {
    fn show(&mut self, figures: &[Figure]) -> Result<()>;
}

/// Lays all figures out on one canvas and writes it to `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSink {
    pub path: PathBuf,
}

impl PreviewSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for PreviewSink {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("gpr_plot_preview.png"))
    }
}

impl DisplaySink for PreviewSink {
    fn show(&mut self, figures: &[Figure]) -> Result<()> {
        save_figure_grid(figures, &self.path)?;
        info!(
            "{} figure(s) laid out in preview '{}'.",
            figures.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Outcome of a batch: files written, and inputs that failed when the batch kept going.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub saved: Vec<PathBuf>,
    pub shown: usize,
    pub failures: Vec<(PathBuf, PlotError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Output file for `input`: same directory and base name, new extension.
pub fn save_path_for(input: &Path, format: OutputFormat) -> PathBuf {
    input.with_extension(format.extension())
}

/// Dispatches one record to the renderer selected by the request's mode.
pub fn render_record(record: &SurveyRecord, request: &PlotRequest) -> Result<Figure> {
    match request.mode {
        PlotMode::Radargram => plot_radargram(record, &request.radargram_options(), None),
        PlotMode::TraceProfile(selector) => plot_traces(record, selector, request.vertical),
        PlotMode::PowerScatter(pick) => plot_power(record, pick),
    }
}

fn title_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load, render and save (or collect) one input.
fn process_input(
    path: &Path,
    request: &PlotRequest,
    loader: &dyn SurveyLoader,
) -> Result<(Figure, Option<PathBuf>)> {
    let mut records = loader.load(request.format, &[path.to_path_buf()])?;
    if records.len() != 1 {
        return Err(PlotError::InvalidRecord(format!(
            "loader returned {} records for one input",
            records.len()
        )));
    }
    let record = records.remove(0);
    // Records from any adapter must satisfy the shape invariants before rendering.
    record.validate()?;

    let mut figure = render_record(&record, request)?;
    figure.axes.title = Some(title_for(path));

    match request.output {
        OutputRouting::Save { format, dpi } => {
            let out = save_path_for(path, format);
            save_figure(&figure, &out, format, dpi)?;
            Ok((figure, Some(out)))
        }
        OutputRouting::Show => Ok((figure, None)),
    }
}

/// Runs a whole batch, one input at a time, in order.
///
/// Under [`BatchPolicy::AbortOnFirstError`] the first failure is returned as is.
/// Under [`BatchPolicy::ContinueOnError`] failures are collected in the report and,
/// in show mode, stand in as placeholder figures so the layout keeps one panel per input.
pub fn run(
    request: &PlotRequest,
    loader: &dyn SurveyLoader,
    sink: &mut dyn DisplaySink,
) -> Result<BatchReport> {
    info!(
        "Plotting {} input(s) as {:?} from {} data",
        request.inputs.len(),
        request.mode,
        request.format
    );
    let mut report = BatchReport::default();
    let mut figures = Vec::new();

    for path in &request.inputs {
        info!("Processing '{}'", path.display());
        match process_input(path, request, loader) {
            Ok((figure, saved)) => match saved {
                Some(out) => report.saved.push(out),
                None => figures.push(figure),
            },
            Err(err) => match request.batch_policy {
                BatchPolicy::AbortOnFirstError => return Err(err),
                BatchPolicy::ContinueOnError => {
                    warn!("  Skipping '{}': {}", path.display(), err);
                    if request.output == OutputRouting::Show {
                        figures.push(Figure::placeholder(
                            RADARGRAM_FIGSIZE_IN,
                            &title_for(path),
                            &err.to_string(),
                        ));
                    }
                    report.failures.push((path.clone(), err));
                }
            },
        }
    }

    if request.output == OutputRouting::Show {
        if figures.is_empty() {
            return Err(PlotError::NoFigures);
        }
        sink.show(&figures)?;
        report.shown = figures.len();
    }
    Ok(report)
}

/// [`run`] with the native loader and the default preview sink.
pub fn plot(request: &PlotRequest) -> Result<BatchReport> {
    run(request, &DefaultLoader, &mut PreviewSink::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_input::loader::InputFormat;
    use crate::plot_functions::plot_traces::TraceSelector;
    use crate::plot_framework::Layer;
    use ndarray::{array, Array, Array1};

    struct MemoryLoader;

    impl SurveyLoader for MemoryLoader {
        fn load(&self, _format: InputFormat, paths: &[PathBuf]) -> Result<Vec<SurveyRecord>> {
            paths
                .iter()
                .map(|p| {
                    if p.to_string_lossy().contains("broken") {
                        return Err(PlotError::InvalidRecord("broken input".into()));
                    }
                    let data = Array::from_shape_fn((3, 6), |(i, j)| (i * j) as f64 - 4.0);
                    let mut record = SurveyRecord::new(
                        data,
                        array![0.0, 0.1, 0.2],
                        Array1::linspace(0.0, 0.5, 6),
                    );
                    if p.to_string_lossy().contains("short") {
                        record.dist = Array1::linspace(0.0, 0.2, 3);
                    }
                    Ok(record)
                })
                .collect()
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        figures: Vec<Figure>,
    }

    impl DisplaySink for CollectingSink {
        fn show(&mut self, figures: &[Figure]) -> Result<()> {
            self.figures.extend_from_slice(figures);
            Ok(())
        }
    }

    #[test]
    fn test_save_path_replaces_extension() {
        let path = save_path_for(Path::new("/data/line_07.mat"), OutputFormat::Png);
        assert_eq!(path, PathBuf::from("/data/line_07.png"));
        let path = save_path_for(Path::new("survey"), OutputFormat::Svg);
        assert_eq!(path, PathBuf::from("survey.svg"));
    }

    #[test]
    fn test_show_mode_collects_one_titled_figure_per_input() {
        let request = PlotRequest::builder()
            .inputs(["one.json", "two.json"])
            .build()
            .unwrap();
        let mut sink = CollectingSink::default();
        let report = run(&request, &MemoryLoader, &mut sink).unwrap();
        assert!(report.is_success());
        assert_eq!(report.shown, 2);
        assert_eq!(sink.figures.len(), 2);
        assert_eq!(sink.figures[1].axes.title.as_deref(), Some("two"));
        assert!(matches!(sink.figures[0].axes.layers[0], Layer::Raster(_)));
    }

    #[test]
    fn test_dispatches_on_mode() {
        let request = PlotRequest::builder().inputs(["a.json"]).trace("2").build().unwrap();
        let mut sink = CollectingSink::default();
        run(&request, &MemoryLoader, &mut sink).unwrap();
        assert_eq!(request.mode, PlotMode::TraceProfile(TraceSelector::Single(2)));
        assert!(matches!(sink.figures[0].axes.layers[0], Layer::Lines(_)));

        let request = PlotRequest::builder().inputs(["a.json"]).power("1").build().unwrap();
        let mut sink = CollectingSink::default();
        let err = run(&request, &MemoryLoader, &mut sink).unwrap_err();
        assert!(matches!(err, PlotError::NoPicksAvailable));
        assert!(sink.figures.is_empty());
    }

    #[test]
    fn test_abort_stops_at_first_failure() {
        let request = PlotRequest::builder()
            .inputs(["broken.json", "fine.json"])
            .build()
            .unwrap();
        let mut sink = CollectingSink::default();
        assert!(run(&request, &MemoryLoader, &mut sink).is_err());
        assert!(sink.figures.is_empty());
    }

    #[test]
    fn test_keep_going_reports_failures_and_leaves_placeholders() {
        let request = PlotRequest::builder()
            .inputs(["broken.json", "fine.json"])
            .keep_going(true)
            .build()
            .unwrap();
        let mut sink = CollectingSink::default();
        let report = run(&request, &MemoryLoader, &mut sink).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, PathBuf::from("broken.json"));
        assert_eq!(sink.figures.len(), 2);
        assert!(sink.figures[0].axes.message.is_some());
        assert!(sink.figures[0].axes.layers.is_empty());
        assert!(sink.figures[1].axes.message.is_none());
    }

    #[test]
    fn test_inconsistent_record_from_loader_is_rejected() {
        let request = PlotRequest::builder()
            .inputs(["short.json"])
            .horizontal("dist")
            .build()
            .unwrap();
        let mut sink = CollectingSink::default();
        let err = run(&request, &MemoryLoader, &mut sink).unwrap_err();
        assert!(matches!(err, PlotError::InvalidRecord(ref msg) if msg.contains("dist")));
        assert!(sink.figures.is_empty());
    }

    #[test]
    fn test_empty_batch_has_nothing_to_show() {
        let request = PlotRequest::builder().build().unwrap();
        let mut sink = CollectingSink::default();
        assert!(matches!(
            run(&request, &MemoryLoader, &mut sink),
            Err(PlotError::NoFigures)
        ));
    }
}

// src/orchestrator.rs
