//! Loot and opponent extraction from pasted game chat.
//!
//! Real chat examples:
//!   Você recebeu 120 XP.
//!   João derrotou o Pikachu Selvagem.
//!   Você enfraqueceu a Nidoran Fêmea.
//!   Você recebeu: 3 Potions, Elixir e 2 Ethers.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use loot_types::{LogEntry, LootToken, Notice};

// ── Regex patterns ───────────────────────────────────────────────────────

const LOOT_MARKER: &str = "Você recebeu: ";

static RE_XP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Você recebeu\s+\d+\s*XP").unwrap());

/// Combat outcomes, tried in this order. The opponent name follows the match.
static RE_COMBAT: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        r"(?i)derrotou\s+o(s)?\s+",
        r"(?i)enfraqueceu\s+o\s+",
        r"(?i)enfraqueceu\s+a\s+",
        r"(?i)venceu\s+o\s+",
        r"(?i)venceu\s+a\s+",
    ]
    .map(|p| Regex::new(p).unwrap())
});

static RE_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*").unwrap());

/// "e" in Portuguese chat, "and" when the client runs in English.
static RE_CONJUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:e|and)\s+").unwrap());

// ── Line classification ──────────────────────────────────────────────────

/// What a single chat line contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    /// A combat outcome naming the opponent.
    Defeated(String),
    /// A "you received" line with its items.
    Loot(Vec<LootToken>),
}

/// Classify one chat line. `None` for anything that carries no loot or opponent.
pub fn classify_line(line: &str) -> Option<LineMatch> {
    let line = line.trim();
    if line.is_empty() || RE_XP.is_match(line) {
        return None;
    }

    if let Some(m) = RE_COMBAT.iter().find_map(|re| re.find(line)) {
        let target = strip_period(line[m.end()..].trim());
        if target.is_empty() {
            return None;
        }
        return Some(LineMatch::Defeated(target.to_string()));
    }

    let pos = line.find(LOOT_MARKER)?;
    let tokens = split_loot(&line[pos + LOOT_MARKER.len()..]);
    if tokens.is_empty() {
        return None;
    }
    Some(LineMatch::Loot(tokens))
}

fn split_loot(raw: &str) -> Vec<LootToken> {
    let mut tokens = Vec::new();
    for part in RE_COMMA.split(raw.trim()) {
        for fragment in RE_CONJUNCTION.split(part.trim()) {
            let fragment = strip_period(fragment.trim());
            if fragment.is_empty() {
                continue;
            }
            tokens.push(LootToken::from_fragment(fragment));
        }
    }
    tokens
}

fn strip_period(s: &str) -> &str {
    s.strip_suffix('.').unwrap_or(s)
}

// ── Extraction policies ──────────────────────────────────────────────────

/// Loot found in a chat paste, plus who it was taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatExtraction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defeated: Option<String>,
    pub loot: Vec<LootToken>,
}

impl ChatExtraction {
    pub fn is_empty(&self) -> bool {
        self.defeated.is_none() && self.loot.is_empty()
    }

    /// Turn the extraction into a log record for `player`.
    ///
    /// An opponent found in the text wins over `fallback_defeated` (a manual
    /// choice). A paste with neither loot nor opponent yields
    /// [`Notice::EmptyResult`] instead of a record.
    pub fn into_log_entry(
        self,
        player: &str,
        datetime: &str,
        fallback_defeated: Option<&str>,
    ) -> Result<LogEntry, Notice> {
        let defeated = self
            .defeated
            .or_else(|| fallback_defeated.map(str::to_string));
        if self.loot.is_empty() && defeated.is_none() {
            return Err(Notice::EmptyResult);
        }
        Ok(LogEntry {
            id: None,
            datetime: datetime.to_string(),
            player: player.to_string(),
            defeated,
            items: self.loot,
        })
    }
}

/// All loot in the paste, attributed to the last opponent mentioned.
pub fn extract_defeated_and_loot(text: &str) -> ChatExtraction {
    let mut out = ChatExtraction::default();
    for line in text.lines() {
        match classify_line(line) {
            Some(LineMatch::Defeated(name)) => out.defeated = Some(name),
            Some(LineMatch::Loot(tokens)) => out.loot.extend(tokens),
            None => {}
        }
    }
    out
}

/// All loot in the paste, without tracking opponents.
pub fn extract_loot(text: &str) -> Vec<LootToken> {
    text.lines()
        .filter_map(classify_line)
        .flat_map(|m| match m {
            LineMatch::Loot(tokens) => tokens,
            LineMatch::Defeated(_) => Vec::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(tokens: &[LootToken]) -> Vec<&str> {
        tokens.iter().map(|t| t.as_str()).collect()
    }

    fn loot_of(m: Option<LineMatch>) -> Vec<LootToken> {
        match m {
            Some(LineMatch::Loot(tokens)) => tokens,
            other => panic!("expected loot, got {other:?}"),
        }
    }

    // ── classify_line ────────────────────────────────────────────────

    #[test]
    fn test_xp_line_is_ignored() {
        assert_eq!(classify_line("Você recebeu 120 XP."), None);
        assert_eq!(classify_line("você recebeu 5XP"), None);
    }

    #[test]
    fn test_combat_phrasings() {
        let cases = [
            ("João derrotou o Pikachu Selvagem.", "Pikachu Selvagem"),
            ("João derrotou os Rattatas.", "Rattatas"),
            ("Você enfraqueceu o Geodude", "Geodude"),
            ("Você enfraqueceu a Nidoran Fêmea.", "Nidoran Fêmea"),
            ("Ash venceu o Brock.", "Brock"),
            ("Ash VENCEU A Misty.", "Misty"),
        ];
        for (line, expected) in cases {
            assert_eq!(
                classify_line(line),
                Some(LineMatch::Defeated(expected.to_string())),
                "{line}"
            );
        }
    }

    #[test]
    fn test_combat_line_without_target() {
        assert_eq!(classify_line("derrotou o ."), None);
    }

    #[test]
    fn test_combat_wins_over_loot_marker() {
        let m = classify_line("Você derrotou o Onix. Você recebeu: 1 Pedra");
        assert_eq!(
            m,
            Some(LineMatch::Defeated("Onix. Você recebeu: 1 Pedra".to_string()))
        );
    }

    #[test]
    fn test_loot_line_portuguese() {
        let tokens = loot_of(classify_line("Você recebeu: 3 Potions, Elixir e 2 Ethers."));
        assert_eq!(strs(&tokens), vec!["3 Potions", "1 Elixir", "2 Ethers"]);
    }

    #[test]
    fn test_loot_line_english_conjunction() {
        let tokens = loot_of(classify_line("Você recebeu: 3 Potions, 1 Elixir and 2 Ethers."));
        assert_eq!(strs(&tokens), vec!["3 Potions", "1 Elixir", "2 Ethers"]);
    }

    #[test]
    fn test_unrecognized_lines() {
        assert_eq!(classify_line(""), None);
        assert_eq!(classify_line("Bom dia a todos!"), None);
        assert_eq!(classify_line("Você recebeu: "), None);
    }

    // ── policies ─────────────────────────────────────────────────────

    const PASTE: &str = "\
Você recebeu 50 XP.
João derrotou o Rattata.
Você recebeu: 2 Potions e Antidote.
papo aleatório
João venceu a Pidgey.
Você recebeu: 1 Feather.
";

    #[test]
    fn test_last_defeated_wins() {
        let out = extract_defeated_and_loot(PASTE);
        assert_eq!(out.defeated.as_deref(), Some("Pidgey"));
        assert_eq!(strs(&out.loot), vec!["2 Potions", "1 Antidote", "1 Feather"]);
    }

    #[test]
    fn test_loot_only_matches_full_policy() {
        let full = extract_defeated_and_loot(PASTE);
        assert_eq!(extract_loot(PASTE), full.loot);
    }

    #[test]
    fn test_defeated_without_loot() {
        let out = extract_defeated_and_loot("João derrotou o Pikachu Selvagem.");
        assert_eq!(out.defeated.as_deref(), Some("Pikachu Selvagem"));
        assert!(out.loot.is_empty());
    }

    // ── log records ──────────────────────────────────────────────────

    #[test]
    fn test_into_log_entry_prefers_text_over_fallback() {
        let entry = extract_defeated_and_loot(PASTE)
            .into_log_entry("Ash", "02/03/2025 10:00:00", Some("Onix"))
            .unwrap();
        assert_eq!(entry.defeated.as_deref(), Some("Pidgey"));
        assert_eq!(entry.items.len(), 3);
        assert_eq!(entry.player, "Ash");
    }

    #[test]
    fn test_into_log_entry_uses_fallback() {
        let entry = extract_defeated_and_loot("Você recebeu: Pena")
            .into_log_entry("Ash", "02/03/2025 10:00:00", Some("Pidgey"))
            .unwrap();
        assert_eq!(entry.defeated.as_deref(), Some("Pidgey"));
        assert_eq!(strs(&entry.items), vec!["1 Pena"]);
    }

    #[test]
    fn test_into_log_entry_empty() {
        let res = ChatExtraction::default().into_log_entry("Ash", "", None);
        assert_eq!(res, Err(Notice::EmptyResult));
    }

    #[test]
    fn test_nothing_recognizable() {
        let out = extract_defeated_and_loot("oi\ntudo bem?\n\n");
        assert!(out.is_empty());
        assert!(extract_loot("oi").is_empty());
    }
}
