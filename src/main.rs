//! chronos - reconstruct corrupted text fragments with an LLM and web context
//!
//! chronos provides:
//! - Fragment reconstruction through a text-generation provider (Gemini)
//! - Context search for the reconstruction (DuckDuckGo)
//! - A fixed-width boxed report per fragment, printed and saved to a file

use anyhow::Result;
use clap::Parser;

mod backends;
mod cli;
mod core;
mod flows;

fn main() -> Result<()> {
    // Values already in the environment win over .env
    dotenvy::dotenv().ok();
    let cli = cli::Cli::parse();
    cli::init_tracing(cli.verbose);
    cli::run(cli)
}
