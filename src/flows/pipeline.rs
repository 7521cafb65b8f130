//! Pipeline driver
//!
//! Runs reconstruct -> search -> render for each fragment in order, prints
//! each report, and writes it to `reconstruction_report_<n>.txt`. A fragment's
//! failure never stops the run.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::backends::{Generator, WebSearch};
use crate::core::model::{Fragment, FragmentOutcome, RunSummary};
use crate::core::render::format_report;
use crate::flows::context::search_context;
use crate::flows::reconstruct::reconstruct;

pub const REPORT_PREFIX: &str = "reconstruction_report";

/// Receives phase updates while a fragment is being processed
pub trait ProgressReporter {
    fn phase(&self, message: &str);
    fn clear(&self);

    /// Print a diagnostic line on stderr without corrupting any live indicator
    fn notice(&self, line: &str) {
        eprintln!("{}", line);
    }
}

/// Reporter that shows nothing
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn phase(&self, _message: &str) {}
    fn clear(&self) {}
}

/// Terminal spinner shown while a provider call is in flight
pub struct SpinnerProgress {
    spinner: RefCell<Option<ProgressBar>>,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        Self {
            spinner: RefCell::new(None),
        }
    }
}

impl Default for SpinnerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for SpinnerProgress {
    fn phase(&self, message: &str) {
        let mut slot = self.spinner.borrow_mut();
        let spinner = slot.get_or_insert_with(|| {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
                spinner.set_style(
                    style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
                );
            }
            spinner.enable_steady_tick(Duration::from_millis(80));
            spinner
        });
        spinner.set_message(message.to_string());
    }

    fn clear(&self) {
        if let Some(spinner) = self.spinner.borrow_mut().take() {
            spinner.finish_and_clear();
        }
    }

    fn notice(&self, line: &str) {
        match self.spinner.borrow().as_ref() {
            Some(spinner) => spinner.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }
}

/// The reconstruction pipeline, built once with its provider capabilities
pub struct Pipeline {
    generator: Box<dyn Generator>,
    search: Box<dyn WebSearch>,
    progress: Box<dyn ProgressReporter>,
    out_dir: PathBuf,
    echo_reports: bool,
}

impl Pipeline {
    pub fn new(
        generator: Box<dyn Generator>,
        search: Box<dyn WebSearch>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            generator,
            search,
            progress: Box::new(NoProgress),
            out_dir: out_dir.into(),
            echo_reports: true,
        }
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Whether finished reports are printed to stdout
    pub fn echo_reports(mut self, echo: bool) -> Self {
        self.echo_reports = echo;
        self
    }

    /// Output path for the fragment with the given ordinal
    pub fn report_path(&self, ordinal: usize) -> PathBuf {
        report_path(&self.out_dir, ordinal)
    }

    /// Process every fragment in order
    pub fn run(&self, fragments: &[Fragment]) -> RunSummary {
        let mut summary = RunSummary::default();
        for fragment in fragments {
            summary.record(self.process(fragment, fragments.len()));
        }
        info!(
            reported = summary.reported,
            skipped = summary.skipped,
            unsaved = summary.unsaved,
            "run complete"
        );
        summary
    }

    /// Process one fragment: reconstruct, search, render, print, write
    pub fn process(&self, fragment: &Fragment, total: usize) -> FragmentOutcome {
        let label = format!("[{}/{}]", fragment.ordinal, total);
        println!("{} Processing fragment: {}", label.bold(), fragment.text());
        info!(ordinal = fragment.ordinal, fragment = fragment.text(), "processing fragment");

        self.progress.phase(&format!("{} Reconstructing text...", label));
        let reconstructed = match reconstruct(self.generator.as_ref(), fragment.text()) {
            Ok(text) => text,
            Err(err) => {
                self.progress.clear();
                warn!(ordinal = fragment.ordinal, kind = err.kind(), "reconstruction failed");
                self.progress
                    .notice(&format!("{} {}", "Skipped:".red().bold(), err));
                return FragmentOutcome::Skipped {
                    reason: err.to_string(),
                };
            }
        };

        self.progress.phase(&format!("{} Searching for context...", label));
        let sources = search_context(
            self.search.as_ref(),
            &reconstructed,
            self.progress.as_ref(),
        );
        self.progress.clear();
        if sources.is_empty() {
            self.progress
                .notice(&format!("{} No sources found.", "Warning:".yellow().bold()));
        }

        let report = format_report(fragment.text(), &reconstructed, &sources);
        if self.echo_reports {
            println!("{}", report);
        }

        let path = self.report_path(fragment.ordinal);
        match fs::write(&path, &report) {
            Ok(()) => {
                info!(path = %path.display(), sources = sources.len(), "report written");
                println!("{} '{}'", "Report saved to".green(), path.display());
                FragmentOutcome::Reported {
                    path,
                    sources: sources.len(),
                }
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to write report");
                self.progress.notice(&format!(
                    "{} failed to write report to '{}': {}",
                    "Error:".red().bold(),
                    path.display(),
                    err
                ));
                FragmentOutcome::Unsaved {
                    reason: err.to_string(),
                }
            }
        }
    }
}

/// `<out_dir>/reconstruction_report_<ordinal>.txt`
pub fn report_path(out_dir: &Path, ordinal: usize) -> PathBuf {
    out_dir.join(format!("{}_{}.txt", REPORT_PREFIX, ordinal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::parse_fragment_lines;
    use crate::core::model::SearchHit;
    use crate::core::render::NO_SOURCES_NOTICE;
    use anyhow::{anyhow, Result};
    use std::rc::Rc;
    use tempfile::tempdir;

    /// Returns a canned reconstruction for known fragments, upper-cases the rest
    struct StubGenerator;

    impl Generator for StubGenerator {
        fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.contains("th3 qu1ck br0wn f0x") {
                return Ok("The quick brown fox".to_string());
            }
            let fragment = prompt
                .split("The fragment is: \"")
                .nth(1)
                .and_then(|rest| rest.split('"').next())
                .unwrap_or_default();
            Ok(fragment.to_uppercase())
        }
    }

    struct FailingGenerator;

    impl Generator for FailingGenerator {
        fn generate(&self, _prompt: &str) -> Result<String> {
            Err(anyhow!("model unavailable"))
        }
    }

    /// Fails only for fragments containing "b4d"
    struct SelectiveGenerator;

    impl Generator for SelectiveGenerator {
        fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.contains("b4d") {
                Err(anyhow!("refused"))
            } else {
                Ok("fine".to_string())
            }
        }
    }

    struct EmptySearch;

    impl WebSearch for EmptySearch {
        fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
            Ok(Vec::new())
        }
    }

    struct FailingSearch;

    impl WebSearch for FailingSearch {
        fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
            Err(anyhow!("search backend down"))
        }
    }

    /// Records every query it receives
    struct RecordingSearch {
        queries: Rc<RefCell<Vec<String>>>,
    }

    impl WebSearch for RecordingSearch {
        fn search(&self, query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
            self.queries.borrow_mut().push(query.to_string());
            Ok(vec![SearchHit {
                title: Some(format!("About {}", query)),
                url: Some("https://example.com".to_string()),
                snippet: None,
            }])
        }
    }

    /// Records every reporter call as "phase", "clear" or "notice: <line>"
    struct RecordingProgress {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, _message: &str) {
            self.events.borrow_mut().push("phase".to_string());
        }

        fn clear(&self) {
            self.events.borrow_mut().push("clear".to_string());
        }

        fn notice(&self, line: &str) {
            self.events.borrow_mut().push(format!("notice: {}", line));
        }
    }

    #[test]
    fn test_single_fragment_without_sources() {
        let temp = tempdir().unwrap();
        let pipeline = Pipeline::new(
            Box::new(StubGenerator),
            Box::new(EmptySearch),
            temp.path(),
        )
        .echo_reports(false);

        let fragment = Fragment::new(1, "th3 qu1ck br0wn f0x").unwrap();
        let outcome = pipeline.process(&fragment, 1);

        let path = match outcome {
            FragmentOutcome::Reported { path, sources } => {
                assert_eq!(sources, 0);
                path
            }
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(path, temp.path().join("reconstruction_report_1.txt"));

        let report = fs::read_to_string(&path).unwrap();
        assert!(report.contains("th3 qu1ck br0wn f0x"));
        assert!(report.contains("The quick brown fox"));
        assert!(report.contains(NO_SOURCES_NOTICE));
        assert_eq!(report, format_report("th3 qu1ck br0wn f0x", "The quick brown fox", &[]));
    }

    #[test]
    fn test_search_failure_still_produces_report() {
        let temp = tempdir().unwrap();
        let pipeline = Pipeline::new(
            Box::new(StubGenerator),
            Box::new(FailingSearch),
            temp.path(),
        )
        .echo_reports(false);

        let fragment = Fragment::new(1, "h3ll0").unwrap();
        let outcome = pipeline.process(&fragment, 1);
        assert!(matches!(outcome, FragmentOutcome::Reported { sources: 0, .. }));

        let report = fs::read_to_string(pipeline.report_path(1)).unwrap();
        assert!(report.contains("Reconstructed Text: H3LL0"));
        assert!(report.contains(NO_SOURCES_NOTICE));
    }

    #[test]
    fn test_diagnostics_go_through_progress_reporter() {
        let temp = tempdir().unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));
        let pipeline = Pipeline::new(
            Box::new(StubGenerator),
            Box::new(FailingSearch),
            temp.path(),
        )
        .with_progress(Box::new(RecordingProgress {
            events: Rc::clone(&events),
        }))
        .echo_reports(false);

        let fragment = Fragment::new(1, "h3ll0").unwrap();
        pipeline.process(&fragment, 1);

        let events = events.borrow();
        let search_error = events
            .iter()
            .position(|e| e.starts_with("notice: ") && e.contains("search backend down"))
            .unwrap();
        let clear = events.iter().position(|e| e == "clear").unwrap();
        let no_sources = events
            .iter()
            .position(|e| e.starts_with("notice: ") && e.contains("No sources found."))
            .unwrap();
        assert!(search_error < clear);
        assert!(clear < no_sources);
    }

    #[test]
    fn test_reconstruction_failure_skips_search_and_report() {
        let temp = tempdir().unwrap();
        let queries = Rc::new(RefCell::new(Vec::new()));
        let pipeline = Pipeline::new(
            Box::new(FailingGenerator),
            Box::new(RecordingSearch {
                queries: Rc::clone(&queries),
            }),
            temp.path(),
        )
        .echo_reports(false);

        let fragment = Fragment::new(1, "g4rbl3d").unwrap();
        let outcome = pipeline.process(&fragment, 1);

        match outcome {
            FragmentOutcome::Skipped { reason } => assert!(reason.contains("model unavailable")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(queries.borrow().is_empty());
        assert!(!pipeline.report_path(1).exists());
    }

    #[test]
    fn test_file_of_three_fragments_writes_three_reports_in_order() {
        let temp = tempdir().unwrap();
        let queries = Rc::new(RefCell::new(Vec::new()));
        let pipeline = Pipeline::new(
            Box::new(StubGenerator),
            Box::new(RecordingSearch {
                queries: Rc::clone(&queries),
            }),
            temp.path(),
        )
        .echo_reports(false);

        let fragments = parse_fragment_lines("h3ll0\nw0rld\n\nl33t\n");
        let summary = pipeline.run(&fragments);

        assert_eq!(summary.reported, 3);
        assert_eq!(summary.total(), 3);
        assert_eq!(*queries.borrow(), vec!["H3LL0", "W0RLD", "L33T"]);

        let written = fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(written, 3);

        for (ordinal, expected) in [(1, "h3ll0"), (2, "w0rld"), (3, "l33t")] {
            let report = fs::read_to_string(pipeline.report_path(ordinal)).unwrap();
            assert!(report.contains(&format!("Original Fragment: {}", expected)));
            assert!(report.contains(&format!("Reconstructed Text: {}", expected.to_uppercase())));
            assert!(report.contains("1. About"));
        }
    }

    #[test]
    fn test_run_continues_after_failed_fragment() {
        let temp = tempdir().unwrap();
        let pipeline = Pipeline::new(
            Box::new(SelectiveGenerator),
            Box::new(EmptySearch),
            temp.path(),
        )
        .echo_reports(false);

        let fragments = parse_fragment_lines("g00d\nb4d\ng00d 4g41n\n");
        let summary = pipeline.run(&fragments);

        assert_eq!(summary.reported, 2);
        assert_eq!(summary.skipped, 1);
        assert!(pipeline.report_path(1).exists());
        assert!(!pipeline.report_path(2).exists());
        assert!(pipeline.report_path(3).exists());
    }

    #[test]
    fn test_existing_report_is_overwritten() {
        let temp = tempdir().unwrap();
        let pipeline = Pipeline::new(
            Box::new(StubGenerator),
            Box::new(EmptySearch),
            temp.path(),
        )
        .echo_reports(false);
        fs::write(pipeline.report_path(1), "stale").unwrap();

        let fragment = Fragment::new(1, "th3 qu1ck br0wn f0x").unwrap();
        pipeline.process(&fragment, 1);

        let report = fs::read_to_string(pipeline.report_path(1)).unwrap();
        assert!(!report.contains("stale"));
        assert!(report.contains("The quick brown fox"));
    }

    #[test]
    fn test_unwritable_output_is_reported_as_unsaved() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("does/not/exist");
        let pipeline = Pipeline::new(Box::new(StubGenerator), Box::new(EmptySearch), missing)
            .echo_reports(false);

        let fragment = Fragment::new(1, "x").unwrap();
        assert!(matches!(
            pipeline.process(&fragment, 1),
            FragmentOutcome::Unsaved { .. }
        ));
    }

    #[test]
    fn test_report_path() {
        assert_eq!(
            report_path(Path::new("/tmp/out"), 7),
            PathBuf::from("/tmp/out/reconstruction_report_7.txt")
        );
    }
}
