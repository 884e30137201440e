//! Saturation tracking over the open-coding stream
//!
//! Grounded-theory sampling stops when new data stops yielding new codes.
//! This module replays the open-coding items in order, counts how many
//! codes each item introduced that had never been seen before, and smooths
//! those counts into a windowed discovery rate. Saturation is declared at
//! the first index where the rate has stayed at or below the threshold for
//! three consecutive items.

use std::collections::HashSet;

use strauss_domain::{OpenCodingItem, SaturationReport};

/// Compute the new-code discovery series and the saturation point.
///
/// Codes are compared after trimming and lowercasing, so `"Coping"` and
/// `" coping "` count as one code. Blank codes are ignored. `window` is
/// clamped to at least 1; near the start of the stream the window covers
/// only the items that exist, and the rate divides by that shorter span.
pub fn saturation(
    open_items: &[OpenCodingItem],
    window: usize,
    threshold: f64,
) -> SaturationReport {
    let window = window.max(1);

    let mut seen: HashSet<String> = HashSet::new();
    let mut new_counts = Vec::with_capacity(open_items.len());
    for item in open_items {
        let mut count = 0;
        for code in &item.initial_codes {
            let label = code.code.trim().to_lowercase();
            if !label.is_empty() && seen.insert(label) {
                count += 1;
            }
        }
        new_counts.push(count);
    }

    let mut rates = Vec::with_capacity(new_counts.len());
    for i in 0..new_counts.len() {
        let lo = i.saturating_sub(window - 1);
        let total: usize = new_counts[lo..=i].iter().sum();
        rates.push(total as f64 / (i - lo + 1) as f64);
    }

    let mut saturation_seg_index = None;
    let mut consecutive = 0;
    for (i, rate) in rates.iter().enumerate() {
        if *rate <= threshold {
            consecutive += 1;
            if consecutive >= 3 {
                saturation_seg_index = Some(i);
                break;
            }
        } else {
            consecutive = 0;
        }
    }

    SaturationReport {
        window,
        threshold,
        new_counts,
        rates,
        saturation_seg_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strauss_domain::InitialCode;

    fn item(seg_id: &str, codes: &[&str]) -> OpenCodingItem {
        OpenCodingItem {
            seg_id: seg_id.to_string(),
            in_vivo_phrases: Vec::new(),
            initial_codes: codes
                .iter()
                .map(|code| InitialCode {
                    code: (*code).to_string(),
                    definition: None,
                    evidence_span: None,
                })
                .collect(),
            quick_memo: None,
        }
    }

    #[test]
    fn test_declining_discovery_saturates() {
        let items = vec![
            item("0001", &["a", "b"]),
            item("0002", &["c"]),
            item("0003", &[]),
            item("0004", &[]),
            item("0005", &[]),
            item("0006", &[]),
        ];
        let report = saturation(&items, 2, 0.05);

        assert_eq!(report.new_counts, vec![2, 1, 0, 0, 0, 0]);
        assert_eq!(report.rates, vec![2.0, 1.5, 0.5, 0.0, 0.0, 0.0]);
        assert_eq!(report.saturation_seg_index, Some(5));
    }

    #[test]
    fn test_steady_discovery_never_saturates() {
        let items = vec![
            item("0001", &["a"]),
            item("0002", &["b"]),
            item("0003", &["c"]),
            item("0004", &["d"]),
            item("0005", &["e"]),
        ];
        let report = saturation(&items, 5, 0.5);

        assert_eq!(report.new_counts, vec![1, 1, 1, 1, 1]);
        assert_eq!(report.rates, vec![1.0; 5]);
        assert!(report.saturation_seg_index.is_none());
    }

    #[test]
    fn test_repeated_codes_are_not_new() {
        let items = vec![
            item("0001", &["Coping", " coping ", "", "  "]),
            item("0002", &["COPING"]),
        ];
        let report = saturation(&items, 20, 0.05);
        assert_eq!(report.new_counts, vec![1, 0]);
    }

    #[test]
    fn test_empty_stream() {
        let report = saturation(&[], 20, 0.05);
        assert!(report.new_counts.is_empty());
        assert!(report.rates.is_empty());
        assert!(report.saturation_seg_index.is_none());
        assert_eq!(report.window, 20);
    }

    #[test]
    fn test_zero_window_is_clamped() {
        let items = vec![
            item("0001", &["a"]),
            item("0002", &[]),
            item("0003", &[]),
            item("0004", &[]),
        ];
        let report = saturation(&items, 0, 0.0);

        assert_eq!(report.window, 1);
        assert_eq!(report.rates, vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(report.saturation_seg_index, Some(3));
    }

    #[test]
    fn test_window_longer_than_stream_divides_by_span() {
        let items = vec![item("0001", &["a", "b"]), item("0002", &[]), item("0003", &[])];
        let report = saturation(&items, 10, 0.05);

        assert_eq!(report.rates[0], 2.0);
        assert_eq!(report.rates[1], 1.0);
        assert!((report.rates[2] - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_lull_does_not_saturate() {
        // Two quiet items, a burst, then three quiet ones. Only the
        // second lull reaches three consecutive low rates.
        let items = vec![
            item("0001", &[]),
            item("0002", &[]),
            item("0003", &["a"]),
            item("0004", &[]),
            item("0005", &[]),
            item("0006", &[]),
        ];
        let report = saturation(&items, 1, 0.0);
        assert_eq!(report.saturation_seg_index, Some(5));
    }
}
