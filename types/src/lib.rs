use std::fmt;

use serde::{Deserialize, Serialize};

// ── Loot token ───────────────────────────────────────────────────────────

/// One "<quantity> <item>" unit extracted from chat text, e.g. "3 Potions".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LootToken(String);

impl LootToken {
    /// Wrap a fragment, prefixing "1 " unless it already starts with a digit.
    pub fn from_fragment(fragment: &str) -> Self {
        if fragment.starts_with(|c: char| c.is_ascii_digit()) {
            Self(fragment.to_string())
        } else {
            Self(format!("1 {fragment}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LootToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LootToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LootToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ── OCR hunt rows ────────────────────────────────────────────────────────

/// A row read from a hunt summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub item: String,
    pub count: u32,
    pub value: f64,
}

impl ExtractedItem {
    pub fn new(item: impl Into<String>, count: u32, value: f64) -> Self {
        Self {
            item: item.into(),
            count,
            value,
        }
    }
}

// ── Price catalog ────────────────────────────────────────────────────────

/// Unit value of one item dropped by one opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCatalogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub defeated: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub value: f64,
}

// ── Persisted records ────────────────────────────────────────────────────

/// A chat paste stored for one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// "dd/MM/yyyy HH:mm:ss" (older records use "yyyy-MM-dd HH:mm:ss")
    #[serde(default)]
    pub datetime: String,
    #[serde(default)]
    pub player: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defeated: Option<String>,
    #[serde(default)]
    pub items: Vec<LootToken>,
}

/// A hunt summary read from one or more screenshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HuntEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub player: String,
    /// "dd/MM/yyyy"
    pub date: String,
    pub items: Vec<ExtractedItem>,
}

impl HuntEntry {
    pub fn total_value(&self) -> f64 {
        self.items.iter().map(|i| i.value).sum()
    }
}

// ── Non-fatal notices ────────────────────────────────────────────────────

/// Something the caller should tell the user about, without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notice", content = "count")]
pub enum Notice {
    /// Nothing usable was found in the whole input.
    EmptyResult,
    /// This many rows were merged into others by name.
    DuplicatesFolded(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loot_token_prefixes_missing_quantity() {
        assert_eq!(LootToken::from_fragment("Elixir").as_str(), "1 Elixir");
        assert_eq!(LootToken::from_fragment("3 Potions").as_str(), "3 Potions");
    }

    #[test]
    fn test_loot_token_serializes_as_plain_string() {
        let json = serde_json::to_string(&vec![LootToken::from("2 Ethers")]).unwrap();
        assert_eq!(json, r#"["2 Ethers"]"#);
    }

    #[test]
    fn test_log_entry_tolerates_missing_fields() {
        let log: LogEntry = serde_json::from_str(r#"{"player":"Ash"}"#).unwrap();
        assert_eq!(log.player, "Ash");
        assert!(log.defeated.is_none());
        assert!(log.items.is_empty());
    }

    #[test]
    fn test_hunt_total_value() {
        let hunt = HuntEntry {
            id: None,
            player: "Ash".into(),
            date: "01/02/2025".into(),
            items: vec![
                ExtractedItem::new("Potion", 5, 120.0),
                ExtractedItem::new("Ether", 1, 2.5),
            ],
        };
        assert_eq!(hunt.total_value(), 122.5);
    }
}
