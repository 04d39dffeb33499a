//! Item name cleanup for OCR'd hunt table rows.
//!
//! The rules run as an ordered pipeline. Each stage sees the output of the
//! previous one, so reordering them changes results: the leading number is
//! removed before noise words are looked for, and the token filter only runs
//! after the leading/trailing punctuation has been peeled off.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::noise::{is_noise_word, ARTIFACT_LETTERS, LONE_ARTIFACT, NOISE_WORDS};

// ── Character classes ────────────────────────────────────────────────────

const ANY_PUNCT: &str = r#"['"`.,;:!?|~\[\]{}()]"#;
const QUOTES: &str = r#"["`']"#;
const BRACKETS: &str = r#"[|:;~"`'\[\]{}()]"#;
const SENTENCE_PUNCT: &str = r#"['"`.,;:!?]"#;

/// Characters ignored when judging a single token.
const TOKEN_PUNCT: &[char] = &[
    '|', ':', ';', '~', '"', '`', '\'', '[', ']', '{', '}', '(', ')', '.', ',', '!', '?',
];

// ── Stages ───────────────────────────────────────────────────────────────

/// One step of the cleanup pipeline.
pub enum Stage {
    /// Replace the first match of `pattern` with `with`.
    Replace {
        name: String,
        pattern: Regex,
        with: &'static str,
    },
    /// Split on whitespace and drop tokens that carry no name information.
    DropNoiseTokens,
}

impl Stage {
    fn replace(name: impl Into<String>, pattern: &str, with: &'static str) -> Self {
        Self::Replace {
            name: name.into(),
            pattern: Regex::new(pattern).expect("sanitizer regex"),
            with,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Replace { name, .. } => name,
            Self::DropNoiseTokens => "drop noise tokens",
        }
    }

    pub fn apply(&self, input: &str) -> String {
        match self {
            Self::Replace { pattern, with, .. } => pattern.replace(input, *with).into_owned(),
            Self::DropNoiseTokens => drop_noise_tokens(input),
        }
    }
}

static STAGES: LazyLock<Vec<Stage>> = LazyLock::new(build_stages);

fn build_stages() -> Vec<Stage> {
    let mut stages = vec![
        Stage::replace("leading punctuation", &format!(r"^{ANY_PUNCT}+\s*"), ""),
        Stage::replace("leading quotes", &format!("^{QUOTES}+"), ""),
        Stage::replace("leading brackets", &format!("^{BRACKETS}+"), ""),
        Stage::replace("leading number", r"^[0-9]+\s+", ""),
        Stage::replace("leading ey", r"(?i)^ey\s+", ""),
        // lower-case only: a capital I usually starts a real word
        Stage::replace("leading i", r"^i\s+", ""),
        Stage::replace(
            "leading sentence punctuation",
            &format!(r"^{SENTENCE_PUNCT}+\s*"),
            "",
        ),
        Stage::replace("leading s", r"(?i)^s\s+", ""),
    ];

    for word in NOISE_WORDS {
        let escaped = regex::escape(word.text);
        stages.push(Stage::replace(
            format!("leading {}", word.text),
            &format!(r"(?i)^{escaped}\s+"),
            "",
        ));
        stages.push(Stage::replace(
            format!("inner {}", word.text),
            &format!(r"(?i)\s+{escaped}\s+"),
            " ",
        ));
    }

    stages.extend([
        Stage::replace("leading bracket run", &format!(r"^\s*{BRACKETS}+\s*"), ""),
        Stage::replace("trailing bracket run", &format!(r"\s*{BRACKETS}+\s*$"), ""),
        Stage::replace(
            "leading punctuation run",
            &format!(r"^{SENTENCE_PUNCT}+\s*"),
            "",
        ),
        Stage::replace(
            "trailing punctuation run",
            &format!(r"\s*{SENTENCE_PUNCT}+\s*$"),
            "",
        ),
        Stage::DropNoiseTokens,
        Stage::replace(
            "final leading punctuation",
            &format!(r"^{SENTENCE_PUNCT}+\s*"),
            "",
        ),
        Stage::replace(
            "final trailing punctuation",
            &format!(r"\s*{SENTENCE_PUNCT}+\s*$"),
            "",
        ),
        Stage::replace("final leading quotes", &format!("^{QUOTES}+"), ""),
        Stage::replace("final trailing quotes", &format!("{QUOTES}+$"), ""),
    ]);

    stages
}

/// The cleanup pipeline, in application order.
pub fn stages() -> &'static [Stage] {
    &STAGES
}

/// Clean an OCR'd phrase into an item name.
///
/// Returns an empty string when nothing name-like survives.
pub fn sanitize_item_name(raw: &str) -> String {
    let mut name = raw.trim().to_string();
    if name.is_empty() {
        return name;
    }

    for stage in stages() {
        let next = stage.apply(&name);
        if next != name {
            trace!(stage = stage.name(), before = %name, after = %next, "sanitize");
            name = next;
        }
    }

    if name.chars().count() <= 1 {
        return String::new();
    }
    name
}

fn drop_noise_tokens(input: &str) -> String {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let only_token = tokens.len() == 1;

    tokens
        .into_iter()
        .filter(|token| {
            let bare: String = token.chars().filter(|c| !TOKEN_PUNCT.contains(c)).collect();
            if bare.is_empty() {
                return false;
            }
            let lower = bare.to_lowercase();
            if is_noise_word(&lower) {
                return false;
            }
            if lower.chars().all(|c| c.is_ascii_digit()) {
                return false;
            }
            if ARTIFACT_LETTERS.contains(&lower.as_str()) {
                return false;
            }
            !(only_token && lower == LONE_ARTIFACT)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
