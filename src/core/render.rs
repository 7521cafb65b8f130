//! Report renderer
//!
//! Renders one fragment's reconstruction and context sources into a
//! fixed-width bordered text box. Every physical line of the output has the
//! same character width: content is clipped to the interior and right-padded.

use crate::core::model::{SourceRecord, MAX_SOURCES};
use crate::core::util::{clip_chars, sanitize_line};

/// Span between the box corners, in characters
pub const BOX_WIDTH: usize = 85;

/// Smallest width that still leaves room for "║ " and " ║"
const MIN_BOX_WIDTH: usize = 2;

pub const REPORT_TITLE: &str = "PROJECT CHRONOS REPORT";
pub const NO_SOURCES_NOTICE: &str = "No relevant sources found - may be truly obscure!";

const ANALYSIS: [&str; 3] = [
    "Analysis: This fragment appears to be from an old digital source.",
    "The model reconstructed it by correcting common internet-era corruptions",
    "(e.g., leetspeak, encoding errors). Treat it as a best guess, not a verified original.",
];

const NEXT_STEPS: [&str; 2] = [
    "Next Steps: Review sources for historical context.",
    "Run again with more fragments for deeper analysis.",
];

/// Line-oriented builder for a bordered box
///
/// Each line is `║ <content> ║`, with content clipped to `width - 2`
/// characters. Borders are `╔═..═╗` and `╚═..═╝`, `width + 2` characters
/// long, same as every content line.
#[derive(Debug, Clone)]
pub struct ReportBox {
    width: usize,
    lines: Vec<String>,
}

impl ReportBox {
    pub fn new(width: usize) -> Self {
        let width = width.max(MIN_BOX_WIDTH);
        Self {
            width,
            lines: vec![format!("╔{}╗", "═".repeat(width))],
        }
    }

    /// Number of content characters that fit between the borders
    pub fn interior_width(&self) -> usize {
        self.width - 2
    }

    /// Append content. Embedded newlines start new lines; every line is clipped.
    pub fn line(&mut self, content: &str) -> &mut Self {
        let interior = self.interior_width();
        for segment in content.split('\n') {
            let (clipped, _) = clip_chars(&sanitize_line(segment), interior);
            self.lines
                .push(format!("║ {:<width$} ║", clipped, width = interior));
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Close the box and join all lines with '\n' (no trailing newline)
    pub fn finish(mut self) -> String {
        self.lines.push(format!("╚{}╝", "═".repeat(self.width)));
        self.lines.join("\n")
    }
}

/// Render a report with the default [`BOX_WIDTH`]
pub fn format_report(original: &str, reconstructed: &str, sources: &[SourceRecord]) -> String {
    format_report_with_width(BOX_WIDTH, original, reconstructed, sources)
}

/// Render a report inside a box of the given width
pub fn format_report_with_width(
    width: usize,
    original: &str,
    reconstructed: &str,
    sources: &[SourceRecord],
) -> String {
    let mut report = ReportBox::new(width);

    report.line(REPORT_TITLE).blank();

    report
        .line(&format!("Original Fragment: {}", original))
        .line(&format!("Reconstructed Text: {}", reconstructed))
        .blank();

    for line in ANALYSIS {
        report.line(line);
    }
    report.blank();

    if sources.is_empty() {
        report.line(NO_SOURCES_NOTICE);
    } else {
        report.line(&format!(
            "Context Sources Found (Top {} from Web Search):",
            MAX_SOURCES
        ));
        for (i, source) in sources.iter().enumerate() {
            report
                .line(&format!("{}. {}", i + 1, source.title))
                .line(&format!("   -> {}", source.url))
                .blank();
        }
    }

    report.blank();
    for line in NEXT_STEPS {
        report.line(line);
    }

    report.finish()
}
