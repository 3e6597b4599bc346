// tests/orchestrator_integration_test.rs

use std::path::{Path, PathBuf};

use gpr_plot::data_input::loader::{write_native, DefaultLoader};
use gpr_plot::data_input::survey_record::Picks;
use gpr_plot::orchestrator::{run, DisplaySink};
use gpr_plot::plot_framework::Layer;
use gpr_plot::plot_functions::plot_power::PickId;
use gpr_plot::{Figure, PlotError, PlotMode, PlotRequest, SurveyRecord};
use ndarray::{Array, Array1};

#[derive(Default)]
struct CollectingSink {
    figures: Vec<Figure>,
}

impl DisplaySink for CollectingSink {
    fn show(&mut self, figures: &[Figure]) -> gpr_plot::Result<()> {
        self.figures.extend_from_slice(figures);
        Ok(())
    }
}

fn survey(tnum: usize) -> SurveyRecord {
    let data = Array::from_shape_fn((50, tnum), |(i, j)| ((i as f64) * 0.3 + j as f64).sin() * 10.0);
    let travel_time = Array1::linspace(0.0, 2.0, 50);
    let dist = Array1::linspace(0.0, 1.5, tnum);
    SurveyRecord::new(data, travel_time, dist)
        .with_location(
            Array1::linspace(-77.0, -77.1, tnum),
            Array1::linspace(160.0, 160.2, tnum),
        )
        .with_picks(Picks {
            picknums: vec![1, 2],
            power: Array::from_shape_fn((2, tnum), |(_, j)| 1.0 + j as f64),
        })
}

fn write_survey(dir: &Path, name: &str, tnum: usize) -> PathBuf {
    let path = dir.join(name);
    write_native(&survey(tnum), &path).unwrap();
    path
}

#[test]
fn test_native_files_render_in_each_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_survey(dir.path(), "line_a.json", 100);

    let cases = [
        (PlotRequest::builder().inputs([&path]).build().unwrap(), "raster"),
        (PlotRequest::builder().inputs([&path]).trace("5").build().unwrap(), "lines"),
        (PlotRequest::builder().inputs([&path]).power("2").build().unwrap(), "scatter"),
    ];
    for (request, expected) in cases {
        let mut sink = CollectingSink::default();
        let report = run(&request, &DefaultLoader, &mut sink).unwrap();
        assert!(report.is_success());
        assert_eq!(sink.figures.len(), 1);
        let figure = &sink.figures[0];
        assert_eq!(figure.axes.title.as_deref(), Some("line_a"));
        let kind = match &figure.axes.layers[0] {
            Layer::Raster(_) => "raster",
            Layer::Lines(_) => "lines",
            Layer::Scatter(_) => "scatter",
        };
        assert_eq!(kind, expected, "mode {:?}", request.mode);
    }
}

#[test]
fn test_missing_pick_fails_the_request() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_survey(dir.path(), "line_b.json", 10);
    let request = PlotRequest::builder().inputs([&path]).power("3").build().unwrap();
    assert_eq!(request.mode, PlotMode::PowerScatter(PickId(3)));
    let mut sink = CollectingSink::default();
    let err = run(&request, &DefaultLoader, &mut sink).unwrap_err();
    assert!(matches!(err, PlotError::PickNotFound(3)));
    assert!(sink.figures.is_empty());
}

#[test]
fn test_conflicting_requests_are_rejected_before_loading() {
    let err = PlotRequest::builder()
        .inputs(["/nonexistent/line.json"])
        .trace("1")
        .power("1")
        .build()
        .unwrap_err();
    assert!(matches!(err, PlotError::ConflictingPlotMode));

    let err = PlotRequest::builder()
        .inputs(["/nonexistent/line.json"])
        .save(true)
        .output_format("tiffany")
        .build()
        .unwrap_err();
    assert!(matches!(err, PlotError::UnsupportedFormat(_)));
}

#[test]
fn test_keep_going_skips_unreadable_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_survey(dir.path(), "good.json", 20);
    let missing = dir.path().join("missing.json");

    let request = PlotRequest::builder()
        .inputs([&missing, &good])
        .keep_going(true)
        .build()
        .unwrap();
    let mut sink = CollectingSink::default();
    let report = run(&request, &DefaultLoader, &mut sink).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].1, PlotError::Io { .. }));
    assert_eq!(sink.figures.len(), 2);
    assert!(sink.figures[0].axes.message.is_some());

    let request = PlotRequest::builder().inputs([&missing, &good]).build().unwrap();
    let mut sink = CollectingSink::default();
    assert!(run(&request, &DefaultLoader, &mut sink).is_err());
    assert!(sink.figures.is_empty());
}

#[test]
fn test_save_writes_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_survey(dir.path(), "line_c.json", 30);
    let request = PlotRequest::builder()
        .inputs([&path])
        .save(true)
        .output_format("svg")
        .dpi(50)
        .build()
        .unwrap();
    let mut sink = CollectingSink::default();
    match run(&request, &DefaultLoader, &mut sink) {
        Ok(report) => {
            let expected = dir.path().join("line_c.svg");
            assert_eq!(report.saved, vec![expected.clone()]);
            assert!(expected.exists());
            assert!(sink.figures.is_empty());
        }
        // Hosts without any system font cannot lay out text.
        Err(PlotError::Render(msg)) => eprintln!("skipping save check: {msg}"),
        Err(other) => panic!("unexpected error: {other}"),
    }
}

// tests/orchestrator_integration_test.rs
