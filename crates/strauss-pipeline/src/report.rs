//! Final report assembly
//!
//! The report is the one artifact meant for human consumption: headline
//! counts, the Gioia-style data structure, and the theory, bundled into a
//! single JSON object.

use serde_json::{json, Value};
use strauss_domain::{AxialTriple, Codebook, GioiaView, OpenCodingItem, Segment, Theory};

/// Assemble the run report from the persisted artifacts.
///
/// `open_codes` counts every initial code across the stream, including
/// duplicates; it measures coding volume, not vocabulary size.
pub fn build_report(
    segments: &[Segment],
    open_items: &[OpenCodingItem],
    codebook: &Codebook,
    triples: &[AxialTriple],
    theory: &Theory,
) -> Value {
    let open_codes: usize = open_items.iter().map(|item| item.initial_codes.len()).sum();

    json!({
        "stats": {
            "segments": segments.len(),
            "open_codes": open_codes,
            "codebook_entries": codebook.entries.len(),
            "triples": triples.len(),
        },
        "gioia": GioiaView::from(codebook),
        "theory": theory,
    })
}
