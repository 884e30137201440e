//! Prompt construction for the generating stages
//!
//! Each stage sends one system message carrying its role and format
//! contract, plus one user message carrying the stage's working data.
//! Working data is always summarized before it goes into a prompt:
//! segments are listed one per line, codes are frequency-ranked and
//! capped, segment overviews are truncated per entry.

use strauss_domain::{AxialTriple, ChatMessage, Codebook, OpenCodingItem, Segment};

const OPEN_CODING_SYSTEM: &str = "You are a qualitative research assistant specialising in \
     grounded theory. Return JSON only.";

const CODEBOOK_SYSTEM: &str = "You are a qualitative research consultant. Review the supplied \
     open-coding results, merge semantically similar initial codes, and produce a structured \
     codebook (include/exclude guidance, examples, higher-order groupings). Return JSON only.";

const CODEBOOK_SCHEMA_HINT: &str = r#"Return JSON with the following structure:
{
  "entries": [
    {
      "code": "...",
      "definition": "...",
      "include": ["..."],
      "exclude": ["..."],
      "positive_examples": ["..."],
      "near_miss": ["..."],
      "aliases": ["..."]
    }
  ],
  "second_order_themes": {"Theme A": ["code1", "code2"]},
  "aggregate_dimensions": {"Dimension X": ["Theme A", "Theme B"]}
}"#;

const AXIAL_SYSTEM: &str = "You are a senior qualitative researcher. Perform axial coding, \
     extract condition->action->result triples, include supporting seg_id evidence, and output \
     JSON only.";

const THEORY_SYSTEM: &str = "You are a qualitative methods expert. Summarise the triples into a \
     selective-coding theory: identify the core category, provide a rationale, and draft a \
     storyline. Output JSON only.";

const NEGATIVES_SYSTEM: &str = "You are a research assistant. Identify segments that contradict \
     the storyline. Return a JSON array of {seg_id, conflict_type, explanation, \
     boundary_condition}.";

/// How many frequency-ranked codes the codebook prompt lists.
const CODE_SUMMARY_LIMIT: usize = 40;

/// How many codebook entries the axial prompt lists.
const AXIAL_ENTRY_LIMIT: usize = 60;

/// How many triples the theory prompt lists.
const THEORY_TRIPLE_LIMIT: usize = 40;

/// Evidence ids listed per triple in the theory prompt.
const THEORY_EVIDENCE_LIMIT: usize = 5;

/// Characters of each segment shown in the negative-case overview.
const OVERVIEW_CHARS: usize = 120;

/// Prompt for open-coding one batch of segments.
pub fn open_coding_prompt(batch: &[Segment]) -> Vec<ChatMessage> {
    let mut lines = Vec::with_capacity(batch.len());
    for segment in batch {
        let speaker = match segment.speaker.as_deref().map(str::trim) {
            Some(speaker) if !speaker.is_empty() => format!(" ({})", speaker),
            _ => String::new(),
        };
        lines.push(format!("seg_id={}{}: {}", segment.seg_id, speaker, segment.text));
    }
    let user = format!(
        "Open-code the following segments. For each seg_id provide:\n\
         - in_vivo_phrases (verbatim excerpts)\n\
         - initial_codes [{{code, definition, evidence_span}}]\n\
         - quick_memo\n\
         Segments:\n{}\n\
         Strictly return a JSON array.",
        lines.join("\n")
    );
    vec![ChatMessage::system(OPEN_CODING_SYSTEM), ChatMessage::user(user)]
}

/// Prompt for consolidating initial codes into a codebook.
pub fn codebook_prompt(open_items: &[OpenCodingItem]) -> Vec<ChatMessage> {
    let (summary, unique_codes) = summarize_codes(open_items);
    let user = format!(
        "Unique initial codes collected: {}\n\
         Summary of frequent codes:\n{}\n\n\
         Produce a JSON codebook with entries, second_order_themes, and aggregate_dimensions.\n{}",
        unique_codes, summary, CODEBOOK_SCHEMA_HINT
    );
    vec![ChatMessage::system(CODEBOOK_SYSTEM), ChatMessage::user(user)]
}

/// Prompt for axial coding over the codebook.
pub fn axial_prompt(codebook: &Codebook) -> Vec<ChatMessage> {
    let lines: Vec<String> = codebook
        .entries
        .iter()
        .take(AXIAL_ENTRY_LIMIT)
        .map(|entry| format!("- {}: {}", entry.code, entry.definition))
        .collect();
    let listing = if lines.is_empty() {
        "(no data)".to_string()
    } else {
        lines.join("\n")
    };
    let example = r#"{"condition":"...","action":"...","result":"...","evidence":["0001"]}"#;
    let user = format!(
        "Reference codebook:\n{}\nReturn a JSON array where each element looks like: {}.",
        listing, example
    );
    vec![ChatMessage::system(AXIAL_SYSTEM), ChatMessage::user(user)]
}

/// Prompt for the selective-coding theory.
pub fn theory_prompt(triples: &[AxialTriple]) -> Vec<ChatMessage> {
    let lines: Vec<String> = triples
        .iter()
        .take(THEORY_TRIPLE_LIMIT)
        .map(|triple| {
            let evidence = triple
                .evidence
                .iter()
                .take(THEORY_EVIDENCE_LIMIT)
                .cloned()
                .collect::<Vec<_>>()
                .join(",");
            format!(
                "- ({}) -> ({}) -> ({}); evidence: {}",
                triple.condition, triple.action, triple.result, evidence
            )
        })
        .collect();
    let listing = if lines.is_empty() {
        "(no triples yet)".to_string()
    } else {
        lines.join("\n")
    };
    let example = r#"{"core_category":"...","rationale":"...","storyline":"..."}"#;
    let user = format!("Triples:\n{}\nReturn: {}", listing, example);
    vec![ChatMessage::system(THEORY_SYSTEM), ChatMessage::user(user)]
}

/// Prompt for scanning segments that contradict the storyline.
pub fn negatives_prompt(segments: &[Segment], storyline: &str) -> Vec<ChatMessage> {
    let overview: Vec<String> = segments
        .iter()
        .map(|segment| {
            let head: String = segment.text.chars().take(OVERVIEW_CHARS).collect();
            format!("{}: {}", segment.seg_id, head)
        })
        .collect();
    let user = format!(
        "Storyline:\n{}\nSegment overview:\n{}",
        storyline,
        overview.join("\n")
    );
    vec![ChatMessage::system(NEGATIVES_SYSTEM), ChatMessage::user(user)]
}

/// Frequency-ranked code summary for the codebook prompt.
///
/// Codes are ranked by count (descending), ties broken alphabetically,
/// capped at `CODE_SUMMARY_LIMIT` lines. Each line carries the first
/// non-empty definition seen for the code. Returns the summary text and
/// the number of unique codes.
fn summarize_codes(open_items: &[OpenCodingItem]) -> (String, usize) {
    use std::collections::HashMap;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut definitions: HashMap<&str, &str> = HashMap::new();
    for item in open_items {
        for initial in &item.initial_codes {
            let code = initial.code.trim();
            if code.is_empty() {
                continue;
            }
            *counts.entry(code).or_insert(0) += 1;
            if let Some(definition) = initial.definition.as_deref().map(str::trim) {
                if !definition.is_empty() {
                    definitions.entry(code).or_insert(definition);
                }
            }
        }
    }

    if counts.is_empty() {
        return ("(no initial codes)".to_string(), 0);
    }

    let unique = counts.len();
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let lines: Vec<String> = ranked
        .iter()
        .take(CODE_SUMMARY_LIMIT)
        .map(|(code, freq)| match definitions.get(code) {
            Some(definition) => format!("- {} (x{}) · {}", code, freq, definition),
            None => format!("- {} (x{})", code, freq),
        })
        .collect();

    (lines.join("\n"), unique)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strauss_domain::{InitialCode, Role, Theory};

    fn item(seg_id: &str, codes: &[(&str, Option<&str>)]) -> OpenCodingItem {
        OpenCodingItem {
            seg_id: seg_id.to_string(),
            in_vivo_phrases: vec![],
            initial_codes: codes
                .iter()
                .map(|(code, definition)| InitialCode {
                    code: code.to_string(),
                    definition: definition.map(String::from),
                    evidence_span: None,
                })
                .collect(),
            quick_memo: None,
        }
    }

    #[test]
    fn test_open_coding_prompt_lists_segments() {
        let batch = vec![
            Segment::new(1, "I kept checking the door.").with_speaker("Alice"),
            Segment::new(2, "Every night."),
        ];
        let messages = open_coding_prompt(&batch);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[1].content.contains("seg_id=0001 (Alice): I kept checking the door."));
        assert!(messages[1].content.contains("seg_id=0002: Every night."));
        assert!(messages[1].content.contains("Strictly return a JSON array."));
    }

    #[test]
    fn test_codebook_prompt_ranks_by_frequency() {
        let items = vec![
            item("0001", &[("rare", None), ("common", Some("seen a lot"))]),
            item("0002", &[("common", None)]),
            item("0003", &[("common", None)]),
        ];
        let messages = codebook_prompt(&items);
        let user = &messages[1].content;
        assert!(user.contains("Unique initial codes collected: 2"));
        let common_pos = user.find("- common (x3) · seen a lot").unwrap();
        let rare_pos = user.find("- rare (x1)").unwrap();
        assert!(common_pos < rare_pos);
        assert!(user.contains("second_order_themes"));
    }

    #[test]
    fn test_codebook_prompt_caps_listing() {
        let items: Vec<OpenCodingItem> = (0..60)
            .map(|i| item(&format!("{:04}", i + 1), &[(&format!("code-{:02}", i), None)]))
            .collect();
        let messages = codebook_prompt(&items);
        let user = &messages[1].content;
        assert!(user.contains("Unique initial codes collected: 60"));
        assert!(user.contains("code-00"));
        assert!(user.contains("code-39"));
        assert!(!user.contains("code-40"));
    }

    #[test]
    fn test_codebook_prompt_without_codes() {
        let messages = codebook_prompt(&[]);
        assert!(messages[1].content.contains("(no initial codes)"));
        assert!(messages[1].content.contains("Unique initial codes collected: 0"));
    }

    #[test]
    fn test_axial_prompt_lists_entries() {
        let codebook: Codebook = serde_json::from_value(serde_json::json!({
            "entries": [{"code": "checking", "definition": "repeated verification"}]
        }))
        .unwrap();
        let messages = axial_prompt(&codebook);
        assert!(messages[1].content.contains("- checking: repeated verification"));
    }

    #[test]
    fn test_axial_prompt_empty_codebook() {
        let messages = axial_prompt(&Codebook::default());
        assert!(messages[1].content.contains("(no data)"));
    }

    #[test]
    fn test_theory_prompt_caps_evidence() {
        let triples = vec![AxialTriple {
            condition: "c".into(),
            action: "a".into(),
            result: "r".into(),
            evidence: (1..=8).map(|i| format!("{:04}", i)).collect(),
        }];
        let messages = theory_prompt(&triples);
        let user = &messages[1].content;
        assert!(user.contains("(c) -> (a) -> (r)"));
        assert!(user.contains("0005"));
        assert!(!user.contains("0006"));
    }

    #[test]
    fn test_negatives_prompt_truncates_overview() {
        let long_text = "x".repeat(300);
        let segments = vec![Segment::new(1, long_text)];
        let theory = Theory {
            core_category: "cc".into(),
            rationale: None,
            storyline: "The storyline.".into(),
        };
        let messages = negatives_prompt(&segments, &theory.storyline);
        let user = &messages[1].content;
        assert!(user.contains("The storyline."));
        let overview_line = user.lines().find(|l| l.starts_with("0001:")).unwrap();
        assert!(overview_line.chars().count() <= OVERVIEW_CHARS + "0001: ".len());
    }
}
