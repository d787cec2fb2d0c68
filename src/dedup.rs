//! Near-duplicate title detection.
//!
//! Substack newsletters occasionally republish a post under a lightly
//! edited headline; exact-URL uniqueness in the store does not catch
//! those. This filter drops a candidate whose title is too similar to any
//! title already stored for the same source, using the character-bigram
//! Sorensen-Dice ratio from `strsim`. Heuristic by design: cost is
//! O(existing titles) per candidate, which is fine at feed sizes.

use strsim::sorensen_dice;

/// True if `title` exceeds `threshold` similarity against any existing
/// title. Case-sensitive.
pub fn is_similar_title(title: &str, existing_titles: &[String], threshold: f64) -> bool {
    existing_titles
        .iter()
        .any(|existing| sorensen_dice(title, existing) > threshold)
}
