//! Reading-order sorting for text spans.
//!
//! Spans are ordered from top to bottom, left to right. Spans on the same
//! visual line (top edges within a tolerance) are ordered by x-coordinate,
//! so slight vertical jitter between words does not scramble the
//! concatenated text.

use crate::domain::note::TextSpan;

/// Sorts span references into reading order.
///
/// A stable sort by `(y0, x0)` followed by a same-line pass: adjacent spans
/// whose top edges differ by less than `line_tolerance` document units are
/// reordered by x-coordinate. Identical inputs always produce identical
/// output order.
pub fn sort_spans_reading_order<'a>(
    spans: &[&'a TextSpan],
    line_tolerance: f32,
) -> Vec<&'a TextSpan> {
    if spans.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&TextSpan> = spans.to_vec();

    // Primary sort: y-coordinate, then x-coordinate.
    sorted.sort_by(|a, b| {
        match a.bbox.y0.partial_cmp(&b.bbox.y0) {
            Some(std::cmp::Ordering::Equal) => a
                .bbox
                .x0
                .partial_cmp(&b.bbox.x0)
                .unwrap_or(std::cmp::Ordering::Equal),
            other => other.unwrap_or(std::cmp::Ordering::Equal),
        }
    });

    // Bubble pass for spans on the same line: if two adjacent spans have
    // top edges within the tolerance and the later one starts further
    // left, swap them.
    let count = sorted.len();
    for i in 0..count.saturating_sub(1) {
        for j in (0..=i).rev() {
            if j + 1 >= sorted.len() {
                break;
            }
            let curr_y = sorted[j].bbox.y0;
            let next_y = sorted[j + 1].bbox.y0;
            let curr_x = sorted[j].bbox.x0;
            let next_x = sorted[j + 1].bbox.x0;

            if (next_y - curr_y).abs() < line_tolerance && next_x < curr_x {
                sorted.swap(j, j + 1);
            } else {
                break;
            }
        }
    }

    sorted
}
