//! Best-effort parsing of structured class descriptions.
//!
//! Class and event descriptions are free text, but editors conventionally end
//! them with a bullet list of materials or topics introduced by a label such
//! as `Materi:` or `☕ Tema kelas:`. This module extracts that structure for
//! display; when no structure is found the text falls back to plain-paragraph
//! rendering. This is a presentation heuristic, not a grammar — it never
//! fails, and only the first heading-like match is honoured.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Bullet character editors use to separate list items.
const BULLET: char = '•';

/// Heading used when a bullet list has no label of its own.
const DEFAULT_HEADING: &str = "Materi";

/// Optional emoji marker, then `materi`/`tema`, then up to 80 further
/// characters of label text, terminated by a colon.
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)(?:\p{Extended_Pictographic}\x{FE0F}?\s*)?(?:materi|tema).{0,80}?:")
        .expect("heading pattern is valid")
});

/// A description split into its displayable parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StructuredDescription {
    /// Free text before the materials list; may be empty.
    pub intro: String,
    /// The label introducing the list, `None` when the text is plain.
    pub heading: Option<String>,
    /// The list items; empty when the text is plain.
    pub items: Vec<String>,
}

/// Splits a description into intro, heading and list items.
///
/// See the module documentation for the convention being parsed. Degrades in
/// two stages: a bullet list without a recognisable label keeps its items
/// under the generic [`DEFAULT_HEADING`]; text without bullets at all comes
/// back as a single intro paragraph.
///
/// # Examples
///
/// ```
/// use kedai_rules::description::split_structured_description;
///
/// let parsed = split_structured_description("Intro text. Materi: Topic A • Topic B");
/// assert_eq!(parsed.intro, "Intro text.");
/// assert_eq!(parsed.heading.as_deref(), Some("Materi:"));
/// assert_eq!(parsed.items, vec!["Topic A", "Topic B"]);
/// ```
pub fn split_structured_description(text: &str) -> StructuredDescription {
    if let Some(found) = HEADING_RE.find(text) {
        let intro = text[..found.start()].trim().to_string();
        let items = split_bullets(&text[found.end()..]);
        return StructuredDescription {
            intro,
            heading: Some(found.as_str().trim().to_string()),
            items,
        };
    }

    if text.contains(BULLET) {
        let mut segments = split_bullets(text);
        if !segments.is_empty() {
            let intro = segments.remove(0);
            return StructuredDescription {
                intro,
                heading: Some(DEFAULT_HEADING.to_string()),
                items: segments,
            };
        }
    }

    StructuredDescription {
        intro: text.trim().to_string(),
        heading: None,
        items: Vec::new(),
    }
}

fn split_bullets(text: &str) -> Vec<String> {
    text.split(BULLET)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labelled_list_is_split() {
        let parsed = split_structured_description("Intro text. Materi: Topic A • Topic B");
        assert_eq!(parsed.intro, "Intro text.");
        assert_eq!(parsed.heading.as_deref(), Some("Materi:"));
        assert_eq!(parsed.items, vec!["Topic A", "Topic B"]);
    }

    #[test]
    fn label_match_is_case_insensitive_and_takes_extra_words() {
        let parsed =
            split_structured_description("Kelas dasar. TEMA kelas minggu ini: Latte • Cappuccino");
        assert_eq!(parsed.intro, "Kelas dasar.");
        assert_eq!(parsed.heading.as_deref(), Some("TEMA kelas minggu ini:"));
        assert_eq!(parsed.items, vec!["Latte", "Cappuccino"]);
    }

    #[test]
    fn emoji_marker_is_part_of_the_heading() {
        let parsed = split_structured_description("Belajar seduh. ☕ Materi: V60 • Aeropress");
        assert_eq!(parsed.intro, "Belajar seduh.");
        assert_eq!(parsed.heading.as_deref(), Some("☕ Materi:"));
        assert_eq!(parsed.items, vec!["V60", "Aeropress"]);
    }

    #[test]
    fn only_first_heading_is_used() {
        let parsed = split_structured_description("Materi: A • B materi lanjut: C");
        assert_eq!(parsed.heading.as_deref(), Some("Materi:"));
        assert_eq!(parsed.intro, "");
        assert_eq!(parsed.items, vec!["A", "B materi lanjut: C"]);
    }

    #[test]
    fn bullets_without_label_fall_back_to_generic_heading() {
        let parsed = split_structured_description("Kelas cupping • Sesi pagi • Sesi sore");
        assert_eq!(parsed.intro, "Kelas cupping");
        assert_eq!(parsed.heading.as_deref(), Some("Materi"));
        assert_eq!(parsed.items, vec!["Sesi pagi", "Sesi sore"]);
    }

    #[test]
    fn plain_text_is_a_paragraph() {
        let parsed = split_structured_description("Just a plain description.");
        assert_eq!(parsed.intro, "Just a plain description.");
        assert_eq!(parsed.heading, None);
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn empty_and_bullet_only_input() {
        let parsed = split_structured_description("");
        assert_eq!(parsed.intro, "");
        assert_eq!(parsed.heading, None);
        assert!(parsed.items.is_empty());

        // Bullets with nothing between them leave no usable segments, so the
        // text renders as a plain paragraph.
        let parsed = split_structured_description("• • •");
        assert_eq!(parsed.intro, "• • •");
        assert_eq!(parsed.heading, None);
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn empty_bullet_segments_are_dropped() {
        let parsed = split_structured_description("Materi: A ••  • B");
        assert_eq!(parsed.items, vec!["A", "B"]);
    }
}
