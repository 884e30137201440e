//! The generating stages
//!
//! Each stage builds its prompt, calls the generation service through the
//! shared retrying path, coerces the reply into JSON, applies the stage's
//! normalizer, and decodes into the typed artifact. Failures surface as
//! `PipelineError`; partial artifacts are never produced.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use strauss_domain::traits::TextGenerator;
use strauss_domain::{
    AxialTriple, Codebook, GenerationRequest, NegativeCase, OpenCodingItem, Segment, Theory,
};
use strauss_llm::{generate_with_retry, RetryPolicy, TokenBucket};
use tracing::debug;

use crate::error::PipelineError;
use crate::extract::{extract_json, reply_excerpt};
use crate::normalize;
use crate::prompt;

/// Shared call path for the generating stages.
///
/// Wraps a generator with the run's retry policy and optional rate
/// limiter. Every stage call acquires one limiter token, then goes
/// through the retrying caller.
pub struct StageClient<'a, G> {
    generator: &'a G,
    policy: RetryPolicy,
    limiter: Option<&'a TokenBucket>,
}

impl<'a, G> StageClient<'a, G>
where
    G: TextGenerator,
    G::Error: fmt::Display,
{
    /// Bundle a generator with the retry policy and optional limiter.
    pub fn new(generator: &'a G, policy: RetryPolicy, limiter: Option<&'a TokenBucket>) -> Self {
        Self {
            generator,
            policy,
            limiter,
        }
    }

    fn call(&self, request: &GenerationRequest) -> Result<String, PipelineError> {
        if let Some(limiter) = self.limiter {
            limiter.acquire();
        }
        let completion = generate_with_retry(self.generator, request, &self.policy)?;
        Ok(completion.text)
    }
}

fn schema_error(what: &str, detail: impl fmt::Display, raw: &str) -> PipelineError {
    PipelineError::SchemaValidation {
        what: what.to_string(),
        detail: detail.to_string(),
        excerpt: reply_excerpt(raw),
    }
}

fn decode<T: DeserializeOwned>(what: &str, normalized: Value, raw: &str) -> Result<T, PipelineError> {
    serde_json::from_value(normalized).map_err(|e| schema_error(what, e, raw))
}

/// Open-code the segments in batches.
///
/// Each batch is one generation call; results are concatenated in batch
/// order. A failing batch fails the stage.
pub fn run_open_coding<G>(
    client: &StageClient<'_, G>,
    segments: &[Segment],
    batch_size: usize,
) -> Result<Vec<OpenCodingItem>, PipelineError>
where
    G: TextGenerator,
    G::Error: fmt::Display,
{
    let batch_size = batch_size.max(1);
    let mut items = Vec::new();
    for (batch_index, batch) in segments.chunks(batch_size).enumerate() {
        let request = GenerationRequest::new(prompt::open_coding_prompt(batch)).structured();
        let raw = client.call(&request)?;
        let normalized = normalize::normalize_open_items(extract_json(&raw)?);
        let batch_items: Vec<OpenCodingItem> = decode("Open coding items", normalized, &raw)?;
        debug!(
            "Open coding batch {} done: {} items",
            batch_index + 1,
            batch_items.len()
        );
        items.extend(batch_items);
    }
    Ok(items)
}

/// Consolidate initial codes into a codebook.
pub fn build_codebook<G>(
    client: &StageClient<'_, G>,
    open_items: &[OpenCodingItem],
) -> Result<Codebook, PipelineError>
where
    G: TextGenerator,
    G::Error: fmt::Display,
{
    let request = GenerationRequest::new(prompt::codebook_prompt(open_items)).structured();
    let raw = client.call(&request)?;
    let normalized = normalize::normalize_codebook(extract_json(&raw)?);
    decode("Codebook", normalized, &raw)
}

/// Extract condition, action, result triples from the codebook.
pub fn build_axial<G>(
    client: &StageClient<'_, G>,
    codebook: &Codebook,
) -> Result<Vec<AxialTriple>, PipelineError>
where
    G: TextGenerator,
    G::Error: fmt::Display,
{
    let request = GenerationRequest::new(prompt::axial_prompt(codebook)).structured();
    let raw = client.call(&request)?;
    let normalized = normalize::normalize_triples(extract_json(&raw)?);
    decode("Axial triples", normalized, &raw)
}

/// Synthesize the selective-coding theory from the triples.
pub fn build_theory<G>(
    client: &StageClient<'_, G>,
    triples: &[AxialTriple],
) -> Result<Theory, PipelineError>
where
    G: TextGenerator,
    G::Error: fmt::Display,
{
    let request = GenerationRequest::new(prompt::theory_prompt(triples)).structured();
    let raw = client.call(&request)?;
    let normalized = normalize::normalize_theory(extract_json(&raw)?);
    decode("Theory", normalized, &raw)
}

/// Scan the segments for cases that contradict the storyline.
pub fn scan_negatives<G>(
    client: &StageClient<'_, G>,
    segments: &[Segment],
    storyline: &str,
) -> Result<Vec<NegativeCase>, PipelineError>
where
    G: TextGenerator,
    G::Error: fmt::Display,
{
    let request =
        GenerationRequest::new(prompt::negatives_prompt(segments, storyline)).structured();
    let raw = client.call(&request)?;
    let normalized = normalize::normalize_negatives(extract_json(&raw)?);
    decode("Negative cases", normalized, &raw)
}
