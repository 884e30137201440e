//! Command execution for the CLI.

use std::fs;

use strauss_domain::traits::ArtifactStore;
use strauss_llm::make_provider;
use strauss_pipeline::{segment_transcript, Runner, Stage};
use strauss_store::JsonDirStore;

use crate::cli::{RunAllArgs, SegmentArgs};
use crate::config::AppConfig;
use crate::error::Result;
use crate::output::Formatter;

/// Segment a transcript and write the artifact, without any generation.
pub fn execute_segment(args: SegmentArgs, formatter: &Formatter) -> Result<()> {
    let text = fs::read_to_string(&args.input)?;
    let segments = segment_transcript(&text, args.strategy.into(), args.max_segment_chars);

    let mut store = JsonDirStore::new(&args.out_dir)?;
    store.write(Stage::Segment.name(), &serde_json::to_value(&segments)?)?;

    println!(
        "{}",
        formatter.success(&format!(
            "Segmented {} segments -> {}/{}.json",
            segments.len(),
            args.out_dir,
            Stage::Segment.name()
        ))
    );
    Ok(())
}

/// Run the full pipeline and print the per-stage usage table.
pub fn execute_run_all(args: RunAllArgs, formatter: &Formatter) -> Result<()> {
    let config = AppConfig::load(args.config.as_deref())?;
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| config.output.out_dir.clone());

    // Provider construction fails fast on bad credentials, before any
    // stage runs or artifact is touched.
    let provider = make_provider(&config.provider)?;
    let text = fs::read_to_string(&args.input)?;
    let store = JsonDirStore::new(&out_dir)?;

    let mut runner = Runner::new(provider, store, config.run)?.with_prices(
        config.provider.price_input_per_1k,
        config.provider.price_output_per_1k,
    );
    let meta = runner.run_all(&text, args.force)?;

    println!("{}", formatter.info(&format!("Run {}", meta.run_id)));
    println!("{}", formatter.usage_table(&meta));
    println!(
        "{}",
        formatter.success(&format!("Done. Artifacts in {}", out_dir))
    );
    Ok(())
}
