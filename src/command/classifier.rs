//! Ordered rule table for intent classification
//!
//! Rules are tried top to bottom over normalized text and the first match
//! wins. A `Find` match must also name a target; if it doesn't, the
//! utterance is unrecognized rather than handed to later rules.

use std::sync::LazyLock;

use regex::Regex;

use super::{Intent, IntentKind};
use crate::target::TargetId;

/// Capabilities announced at startup and after a misunderstanding
pub const INSTRUCTIONS: [&str; 4] = [
    "[Find] some fruit [orange, lemon, tomato, green apple]",
    "Turn on the [camera] on your laptop",
    "Make a [screenshot] on your camera",
    "[Quit]",
];

/// Top-level rules in priority order
static RULES: LazyLock<Vec<(IntentKind, Regex)>> = LazyLock::new(|| {
    [
        (IntentKind::Find, r"\b(find|detect|track|search)\b"),
        (IntentKind::ToggleCamera, r"\bcamera\b"),
        (IntentKind::Capture, r"\b(screenshot|picture|photo|capture)\b"),
        (IntentKind::Quit, r"\b(quit|exit|goodbye)\b|\bstop listening\b"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// Target sub-rules for `Find`, in priority order
static TARGET_RULES: LazyLock<Vec<(TargetId, Regex)>> = LazyLock::new(|| {
    [
        (TargetId::Orange, r"\boranges?\b"),
        (TargetId::Lemon, r"\blemons?\b"),
        (TargetId::GreenApple, r"\b(green )?apples?\b"),
        (TargetId::Tomato, r"\btomato(es)?\b"),
    ]
    .into_iter()
    .map(|(target, pattern)| (target, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// Lowercase, trim, and collapse internal whitespace
#[must_use]
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Classify transcribed text into an intent
///
/// Pure function of its input: the same text always yields the same intent.
#[must_use]
pub fn classify(text: &str) -> Intent {
    let normalized = normalize(text);

    let Some(kind) = RULES
        .iter()
        .find(|(_, pattern)| pattern.is_match(&normalized))
        .map(|(kind, _)| *kind)
    else {
        return Intent::new(IntentKind::Unrecognized, normalized);
    };

    if kind != IntentKind::Find {
        return Intent::new(kind, normalized);
    }

    match classify_target(&normalized) {
        Some(target) => Intent::find(target, normalized),
        None => {
            tracing::debug!(text = %normalized, "find command without a known target");
            Intent::new(IntentKind::Unrecognized, normalized)
        }
    }
}

/// Pick the target named in a `Find` utterance
fn classify_target(normalized: &str) -> Option<TargetId> {
    TARGET_RULES
        .iter()
        .find(|(_, pattern)| pattern.is_match(normalized))
        .map(|(target, _)| *target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  Find   THE\tOrange \n"), "find the orange");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn find_with_each_target() {
        assert_eq!(classify("find the orange").target, Some(TargetId::Orange));
        assert_eq!(classify("detect a lemon").target, Some(TargetId::Lemon));
        assert_eq!(classify("track the green apple").target, Some(TargetId::GreenApple));
        assert_eq!(classify("find an apple").target, Some(TargetId::GreenApple));
        assert_eq!(classify("search for tomatoes").target, Some(TargetId::Tomato));
    }

    #[test]
    fn words_must_be_whole() {
        assert_eq!(classify("findings about oranges").kind, IntentKind::Unrecognized);
        assert_eq!(classify("camcorder").kind, IntentKind::Unrecognized);
    }

    #[test]
    fn find_without_target_is_unrecognized() {
        // Does not fall through to the camera rule
        let intent = classify("find the camera");
        assert_eq!(intent.kind, IntentKind::Unrecognized);
        assert_eq!(intent.target, None);
    }

    #[test]
    fn sub_rule_order_breaks_ties() {
        assert_eq!(classify("find a lemon or an orange").target, Some(TargetId::Orange));
    }

    #[test]
    fn other_intents() {
        assert_eq!(classify("turn on the camera").kind, IntentKind::ToggleCamera);
        assert_eq!(classify("take a picture").kind, IntentKind::Capture);
        assert_eq!(classify("Quit").kind, IntentKind::Quit);
        assert_eq!(classify("please stop listening").kind, IntentKind::Quit);
        assert!(classify("goodbye").is_quit());
    }

    #[test]
    fn empty_text_is_unrecognized() {
        let intent = classify("");
        assert_eq!(intent.kind, IntentKind::Unrecognized);
        assert!(intent.text.is_empty());
    }
}
