//! Transcript segmentation strategies
//!
//! Turns raw interview text into ordered segments. All strategies share
//! `chunk_split`, which caps segment length at sentence-friendly cut
//! points. Lengths are counted in characters, not bytes, so multi-byte
//! transcripts never split mid-character.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strauss_domain::Segment;

const SPLIT_PUNCTUATION: [char; 4] = ['.', '!', '?', ';'];

/// How the input transcript is carved into segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStrategy {
    /// `Speaker: utterance` lines start turns; other lines continue them
    Dialog,
    /// Blank-line-separated paragraphs
    Paragraph,
    /// One segment per non-empty line
    Line,
}

impl Default for SegmentStrategy {
    fn default() -> Self {
        SegmentStrategy::Dialog
    }
}

impl fmt::Display for SegmentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SegmentStrategy::Dialog => "dialog",
            SegmentStrategy::Paragraph => "paragraph",
            SegmentStrategy::Line => "line",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SegmentStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dialog" => Ok(SegmentStrategy::Dialog),
            "paragraph" => Ok(SegmentStrategy::Paragraph),
            "line" => Ok(SegmentStrategy::Line),
            other => Err(format!(
                "unknown strategy '{}' (expected dialog, paragraph, or line)",
                other
            )),
        }
    }
}

/// Segment a transcript with the given strategy.
///
/// Segment ids are assigned in emission order starting from 1, so the
/// same input always yields the same ids.
pub fn segment_transcript(text: &str, strategy: SegmentStrategy, max_chars: usize) -> Vec<Segment> {
    match strategy {
        SegmentStrategy::Dialog => segment_dialog(text, max_chars),
        SegmentStrategy::Paragraph => segment_paragraph(text, max_chars),
        SegmentStrategy::Line => segment_line(text, max_chars),
    }
}

/// Split text into pieces of at most `max_chars` characters.
///
/// Pieces end just after the nearest sentence punctuation (`.` `!` `?`
/// `;`) inside the window when one exists; otherwise the cut is hard at
/// the window boundary. Pieces are trimmed and blanks dropped.
pub fn chunk_split(s: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let s = s.trim();
    if s.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_chars {
        return vec![s.to_string()];
    }

    let mut out = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + max_chars).min(chars.len());
        let mut cut = end;
        for i in (start..end).rev() {
            if SPLIT_PUNCTUATION.contains(&chars[i]) {
                cut = i + 1;
                break;
            }
        }
        if cut <= start {
            cut = end;
        }
        let piece: String = chars[start..cut].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            out.push(piece.to_string());
        }
        start = cut;
    }
    out
}

/// Segment a `Speaker: utterance` transcript.
///
/// A trimmed line with a non-empty head before its first `:` and a
/// non-empty tail after it opens a new turn; other non-empty lines are
/// appended to the current turn, joined with single spaces. Text before
/// the first speaker line is discarded.
pub fn segment_dialog(text: &str, max_chars: usize) -> Vec<Segment> {
    let mut pieces: Vec<(String, String)> = Vec::new();
    let mut speaker: Option<String> = None;
    let mut buf: Vec<String> = Vec::new();

    let flush = |speaker: &Option<String>, buf: &mut Vec<String>, pieces: &mut Vec<(String, String)>| {
        if let Some(sp) = speaker {
            if !buf.is_empty() {
                let turn = buf.join(" ");
                for part in chunk_split(&turn, max_chars) {
                    pieces.push((sp.clone(), part));
                }
            }
        }
        buf.clear();
    };

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((head, tail)) = line.split_once(':') {
            let head = head.trim();
            let tail = tail.trim();
            if !head.is_empty() && !tail.is_empty() {
                flush(&speaker, &mut buf, &mut pieces);
                speaker = Some(head.to_string());
                buf.push(tail.to_string());
                continue;
            }
        }
        buf.push(line.to_string());
    }
    flush(&speaker, &mut buf, &mut pieces);

    pieces
        .into_iter()
        .enumerate()
        .map(|(i, (sp, part))| Segment::new(i + 1, part).with_speaker(sp))
        .collect()
}

/// Segment on blank-line-separated paragraphs.
pub fn segment_paragraph(text: &str, max_chars: usize) -> Vec<Segment> {
    let mut chunks: Vec<String> = Vec::new();
    let mut para: Vec<&str> = Vec::new();

    let flush = |para: &mut Vec<&str>, chunks: &mut Vec<String>| {
        if !para.is_empty() {
            chunks.extend(chunk_split(&para.join("\n"), max_chars));
            para.clear();
        }
    };

    for line in text.lines() {
        if line.trim().is_empty() {
            flush(&mut para, &mut chunks);
        } else {
            para.push(line);
        }
    }
    flush(&mut para, &mut chunks);

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| Segment::new(i + 1, chunk))
        .collect()
}

/// Segment on non-empty lines.
pub fn segment_line(text: &str, max_chars: usize) -> Vec<Segment> {
    let mut chunks: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if !line.is_empty() {
            chunks.extend(chunk_split(line, max_chars));
        }
    }
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| Segment::new(i + 1, chunk))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_split_short_text_is_whole() {
        assert_eq!(chunk_split("Short text.", 100), vec!["Short text."]);
    }

    #[test]
    fn test_chunk_split_empty_input() {
        assert!(chunk_split("", 100).is_empty());
        assert!(chunk_split("   \n  ", 100).is_empty());
    }

    #[test]
    fn test_chunk_split_prefers_sentence_boundary() {
        let text = "First sentence. Second sentence runs on a while longer.";
        let chunks = chunk_split(text, 20);
        assert_eq!(chunks[0], "First sentence.");
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 20);
        }
    }

    #[test]
    fn test_chunk_split_nearest_punctuation_wins() {
        // Both '!' and '.' fall inside the window; the later one cuts.
        let text = "One. Two! padpadpadpadpad";
        let chunks = chunk_split(text, 12);
        assert_eq!(chunks[0], "One. Two!");
    }

    #[test]
    fn test_chunk_split_hard_cut_without_punctuation() {
        let text = "a".repeat(50);
        let chunks = chunk_split(&text, 20);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 20);
        assert_eq!(chunks[2].chars().count(), 10);
    }

    #[test]
    fn test_chunk_split_counts_characters_not_bytes() {
        // Four-byte-per-char text; byte-indexed slicing would panic.
        let text = "你好吗？我很好。今天天气不错，我们出去走走吧。";
        let chunks = chunk_split(text, 8);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 8);
        }
        let rejoined: String = chunks.concat();
        assert!(rejoined.contains("我很好"));
    }

    #[test]
    fn test_chunk_split_reconstructs_content() {
        let text = "Alpha beta gamma. Delta epsilon zeta! Eta theta iota?";
        let chunks = chunk_split(text, 25);
        let rejoined = chunks.join(" ");
        assert_eq!(rejoined.split_whitespace().count(), text.split_whitespace().count());
    }

    #[test]
    fn test_dialog_basic_turns() {
        let text = "Alice: Hello there.\nBob: Hi back.";
        let segments = segment_dialog(text, 800);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].seg_id, "0001");
        assert_eq!(segments[0].speaker.as_deref(), Some("Alice"));
        assert_eq!(segments[0].text, "Hello there.");
        assert_eq!(segments[1].seg_id, "0002");
        assert_eq!(segments[1].speaker.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_dialog_continuation_lines_join_with_spaces() {
        let text = "Alice: I kept checking\nthe door at night.\nBob: Every night?";
        let segments = segment_dialog(text, 800);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "I kept checking the door at night.");
    }

    #[test]
    fn test_dialog_discards_preamble_before_first_speaker() {
        let text = "Recorded 2024-03-01\n\nAlice: Let's begin.";
        let segments = segment_dialog(text, 800);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Let's begin.");
    }

    #[test]
    fn test_dialog_line_needs_both_halves() {
        // ": text" and "Name:" are continuations, not turns.
        let text = "Alice: Start.\n: orphan tail\nBob's aside without colon";
        let segments = segment_dialog(text, 800);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].text.contains("orphan tail"));
        assert!(segments[0].text.contains("aside"));
    }

    #[test]
    fn test_dialog_long_turn_is_chunked_with_speaker() {
        let utterance = "This part is long enough to split. ".repeat(5);
        let text = format!("Alice: {}", utterance);
        let segments = segment_dialog(&text, 60);
        assert!(segments.len() > 1);
        for segment in &segments {
            assert_eq!(segment.speaker.as_deref(), Some("Alice"));
        }
        // Ids stay sequential across the chunked turn.
        assert_eq!(segments[0].seg_id, "0001");
        assert_eq!(segments[1].seg_id, "0002");
    }

    #[test]
    fn test_paragraph_splits_on_blank_runs() {
        let text = "First paragraph\nstill first.\n\n\nSecond paragraph.\n   \nThird.";
        let segments = segment_paragraph(text, 800);
        assert_eq!(segments.len(), 3);
        assert!(segments[0].text.contains("still first"));
        assert_eq!(segments[1].text, "Second paragraph.");
        assert!(segments.iter().all(|s| s.speaker.is_none()));
    }

    #[test]
    fn test_line_strategy_skips_blanks() {
        let text = "one\n\n  \ntwo\nthree";
        let segments = segment_line(text, 800);
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert_eq!(segments[2].seg_id, "0003");
    }

    #[test]
    fn test_ids_are_deterministic() {
        let text = "Alice: one. two. three.\nBob: four.";
        let a = segment_transcript(text, SegmentStrategy::Dialog, 10);
        let b = segment_transcript(text, SegmentStrategy::Dialog, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("dialog".parse::<SegmentStrategy>().unwrap(), SegmentStrategy::Dialog);
        assert_eq!("Paragraph".parse::<SegmentStrategy>().unwrap(), SegmentStrategy::Paragraph);
        assert!("sentence".parse::<SegmentStrategy>().is_err());
    }
}
