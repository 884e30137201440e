//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use strauss_pipeline::SegmentStrategy;

/// Strauss CLI - Grounded-theory analysis for interview transcripts.
#[derive(Debug, Parser)]
#[command(name = "strauss")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Segment a transcript without running the analysis stages
    Segment(SegmentArgs),

    /// Run the full analysis pipeline
    RunAll(RunAllArgs),
}

/// Arguments for the segment command.
#[derive(Debug, Parser)]
pub struct SegmentArgs {
    /// Input transcript file
    #[arg(short, long)]
    pub input: String,

    /// Output directory for artifacts
    #[arg(short, long, default_value = "output")]
    pub out_dir: String,

    /// Segmentation strategy
    #[arg(long, value_enum, default_value = "dialog")]
    pub strategy: StrategyArg,

    /// Maximum characters per segment
    #[arg(long, default_value = "800")]
    pub max_segment_chars: usize,
}

/// Arguments for the run-all command.
#[derive(Debug, Parser)]
pub struct RunAllArgs {
    /// Input transcript file
    #[arg(short, long)]
    pub input: String,

    /// Configuration file (TOML)
    #[arg(short, long, env = "STRAUSS_CONFIG")]
    pub config: Option<String>,

    /// Output directory for artifacts (overrides the config file)
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Recompute every stage, ignoring cached artifacts
    #[arg(long)]
    pub force: bool,
}

/// Segmentation strategy argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StrategyArg {
    /// Speaker-turn lines (`Name: utterance`)
    Dialog,
    /// Blank-line-separated paragraphs
    Paragraph,
    /// One segment per non-empty line
    Line,
}

impl From<StrategyArg> for SegmentStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Dialog => SegmentStrategy::Dialog,
            StrategyArg::Paragraph => SegmentStrategy::Paragraph,
            StrategyArg::Line => SegmentStrategy::Line,
        }
    }
}
