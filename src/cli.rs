//! CLI module - Command-line interface definitions and handlers

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::backends::duckduckgo::DEFAULT_SEARCH_URL;
use crate::backends::gemini::{DEFAULT_GEMINI_URL, DEFAULT_MODEL};
use crate::backends::{build_client, DuckDuckGoSearch, GeminiGenerator};
use crate::core::input::{resolve_fragments, InputSource};
use crate::core::model::FragmentOutcome;
use crate::flows::pipeline::{Pipeline, SpinnerProgress};

/// chronos - reconstruct corrupted text fragments and gather web context.
#[derive(Parser, Debug)]
#[command(name = "chronos")]
#[command(
    author,
    version,
    about,
    long_about = r#"chronos restores corrupted or obfuscated text fragments (leetspeak, missing
letters, garbled encodings) with a language model, searches the web for context
about the reconstruction, and renders a boxed text report per fragment.

Each report is printed and saved as reconstruction_report_<n>.txt in --out-dir.

Examples:
    chronos "th3 qu1ck br0wn f0x"
    chronos fragments.txt --out-dir reports
    GEMINI_API_KEY=... chronos "h4x0r w4z h3r3" -v
"#
)]
pub struct Cli {
    /// Fragment text, or a .txt/.lst/.list file with one fragment per line.
    #[arg(
        value_name = "FRAGMENT",
        long_help = "The corrupted text to reconstruct.\n\n\
If the argument is the path of an existing file ending in .txt, .lst or .list,\n\
each non-blank line of that file is processed as its own fragment, in file order."
    )]
    pub fragment: String,

    /// Gemini API key.
    #[arg(
        long,
        env = "GEMINI_API_KEY",
        hide_env_values = true,
        value_name = "KEY",
        long_help = "API key for the Gemini text-generation API.\n\n\
Required. Read from the environment or a .env file in the working directory.\n\
Get one from https://aistudio.google.com/app/apikey"
    )]
    pub api_key: Option<String>,

    /// Gemini model used for reconstruction.
    #[arg(long, env = "CHRONOS_MODEL", default_value = DEFAULT_MODEL, value_name = "MODEL")]
    pub model: String,

    /// Base URL of the Gemini API.
    #[arg(long, env = "CHRONOS_GEMINI_URL", default_value = DEFAULT_GEMINI_URL, value_name = "URL")]
    pub gemini_url: String,

    /// DuckDuckGo HTML search endpoint.
    #[arg(long, env = "CHRONOS_SEARCH_URL", default_value = DEFAULT_SEARCH_URL, value_name = "URL")]
    pub search_url: String,

    /// Directory reports are written to.
    #[arg(
        long,
        env = "CHRONOS_OUT_DIR",
        default_value = ".",
        value_name = "DIR",
        long_help = "Directory reports are written to. Created if missing.\n\n\
Existing reports with the same name are overwritten."
    )]
    pub out_dir: PathBuf,

    /// HTTP timeout in seconds for each provider call.
    #[arg(
        long,
        env = "CHRONOS_TIMEOUT_SECS",
        default_value_t = 30,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Quiet mode (no spinner, reports are only written to files).
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        long_help = "Increase log verbosity on stderr (-v info, -vv debug, -vvv trace).\n\n\
RUST_LOG, when set, takes precedence."
    )]
    pub verbose: u8,
}

/// Initialise the tracing subscriber on stderr
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match verbose {
        0 => "chronos=warn",
        1 => "chronos=info",
        2 => "chronos=debug",
        _ => "chronos=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let (source, fragments) = resolve_fragments(&cli.fragment)?;

    let api_key = match cli.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => bail!(
            "GEMINI_API_KEY is not set. Export it or add it to a .env file. \
             Get one from https://aistudio.google.com/app/apikey"
        ),
    };

    fs::create_dir_all(&cli.out_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            cli.out_dir.display()
        )
    })?;

    let client = build_client(Duration::from_secs(cli.timeout))?;
    let generator = GeminiGenerator::new(api_key, cli.model.clone(), cli.gemini_url, client.clone());
    let search = DuckDuckGoSearch::new(cli.search_url, client);

    let mut pipeline = Pipeline::new(Box::new(generator), Box::new(search), cli.out_dir.clone())
        .echo_reports(!cli.quiet);
    if !cli.quiet {
        pipeline = pipeline.with_progress(Box::new(SpinnerProgress::new()));
    }

    if let InputSource::File(path) = &source {
        println!(
            "Loaded {} fragment(s) from {}",
            fragments.len(),
            path.display()
        );
    }
    info!(
        count = fragments.len(),
        model = %cli.model,
        out_dir = %cli.out_dir.display(),
        "starting run"
    );

    let summary = pipeline.run(&fragments);

    println!();
    println!(
        "{} {} fragment(s): {} reported, {} skipped, {} unsaved",
        "Completed".green().bold(),
        summary.total(),
        summary.reported,
        summary.skipped,
        summary.unsaved
    );

    for (i, outcome) in summary.outcomes.iter().enumerate() {
        let ordinal = i + 1;
        match outcome {
            FragmentOutcome::Reported { path, sources } => {
                println!("  #{} {} ({} source(s))", ordinal, path.display(), sources)
            }
            FragmentOutcome::Skipped { reason } => {
                println!("  #{} {} {}", ordinal, "skipped:".yellow(), reason)
            }
            FragmentOutcome::Unsaved { reason } => {
                println!("  #{} {} {}", ordinal, "not saved:".red(), reason)
            }
        }
    }

    Ok(())
}
