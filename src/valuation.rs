use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use loot_types::{LootToken, PriceCatalogEntry};

/// Plural endings tried, in order, when an item has no exact catalog entry.
pub const PLURAL_SUFFIXES: &[&str] = &["as", "es", "is", "os", "us", "s"];

static RE_QUANTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\s+(.+)$").unwrap());

/// Split "<qty> <name>" into its parts. Tokens without a leading quantity
/// count as one of the whole (trimmed) text.
pub fn split_quantity(token: &str) -> (u64, &str) {
    if let Some(caps) = RE_QUANTITY.captures(token) {
        if let Ok(qty) = caps[1].parse::<u64>() {
            let name = caps.get(2).map_or("", |m| m.as_str());
            return (qty, name.trim());
        }
    }
    (1, token.trim())
}

/// How a catalog price was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceLookup {
    Exact(f64),
    /// Matched after stripping a plural ending.
    Singular(f64),
    Unknown,
}

/// Unit values by (defeated, item), matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct PriceCatalog {
    /// (defeated, item) lower-cased → unit value. First entry wins.
    prices: HashMap<(String, String), f64>,
    entries: Vec<PriceCatalogEntry>,
}

impl PriceCatalog {
    pub fn from_entries(entries: Vec<PriceCatalogEntry>) -> Self {
        let mut prices = HashMap::new();
        for e in &entries {
            prices
                .entry((e.defeated.to_lowercase(), e.item_name.to_lowercase()))
                .or_insert(e.value);
        }
        Self { prices, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn exact(&self, defeated: &str, item: &str) -> Option<f64> {
        self.prices
            .get(&(defeated.to_string(), item.to_string()))
            .copied()
    }

    /// Is there an entry for exactly this (defeated, item) pair?
    pub fn contains(&self, defeated: &str, item: &str) -> bool {
        matches!(self.lookup(defeated, item), PriceLookup::Exact(_))
    }

    /// Find the entry pricing `item` when dropped by `defeated`: the exact
    /// name first, then the name with a plural ending removed.
    pub fn lookup(&self, defeated: &str, item: &str) -> PriceLookup {
        let defeated = defeated.to_lowercase();
        let item = item.to_lowercase();

        if let Some(v) = self.exact(&defeated, &item) {
            return PriceLookup::Exact(v);
        }

        for suffix in PLURAL_SUFFIXES {
            if item.len() <= suffix.len() {
                continue;
            }
            if let Some(singular) = item.strip_suffix(suffix) {
                if let Some(v) = self.exact(&defeated, singular) {
                    return PriceLookup::Singular(v);
                }
            }
        }

        PriceLookup::Unknown
    }

    /// Unit value of `item` when dropped by `defeated`, falling back to the
    /// singular form. Unknown items are worth 0.
    pub fn unit_value(&self, defeated: &str, item: &str) -> f64 {
        match self.lookup(defeated, item) {
            PriceLookup::Exact(v) | PriceLookup::Singular(v) => v,
            PriceLookup::Unknown => 0.0,
        }
    }

    /// Quantity × unit value for a "<qty> <name>" token.
    pub fn token_value(&self, defeated: &str, token: &str) -> f64 {
        let (qty, name) = split_quantity(token);
        qty as f64 * self.unit_value(defeated, name)
    }

    /// Total value of a batch of loot taken from one opponent.
    pub fn loot_value(&self, defeated: &str, loot: &[LootToken]) -> f64 {
        loot.iter()
            .map(|t| self.token_value(defeated, t.as_str()))
            .sum()
    }

    /// Distinct opponent names in the catalog, sorted.
    pub fn defeated_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.defeated.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(defeated: &str, item: &str, value: f64) -> PriceCatalogEntry {
        PriceCatalogEntry {
            id: None,
            defeated: defeated.to_string(),
            item_name: item.to_string(),
            value,
        }
    }

    fn catalog() -> PriceCatalog {
        PriceCatalog::from_entries(vec![
            entry("Rattata", "Potion", 10.0),
            entry("Rattata", "Potion", 99.0),
            entry("Rattata", "Pedra", 4.0),
            entry("Pidgey", "Feather", 2.5),
            entry(" Pidgey ", "Pena", 1.0),
            entry("", "Orphan", 1.0),
        ])
    }

    // ── split_quantity ───────────────────────────────────────────────

    #[test]
    fn test_split_quantity() {
        assert_eq!(split_quantity("3 Potions"), (3, "Potions"));
        assert_eq!(split_quantity("Potion"), (1, "Potion"));
        assert_eq!(split_quantity("  Potion "), (1, "Potion"));
        assert_eq!(split_quantity("3Potions"), (1, "3Potions"));
    }

    // ── unit_value ───────────────────────────────────────────────────

    #[test]
    fn test_exact_match_ignores_case_and_keeps_first() {
        let c = catalog();
        assert_eq!(c.unit_value("rattata", "POTION"), 10.0);
    }

    #[test]
    fn test_plural_fallback() {
        let c = catalog();
        assert_eq!(c.unit_value("Rattata", "Potions"), 10.0);
        assert_eq!(c.unit_value("Rattata", "Pedras"), 4.0);
        assert_eq!(c.unit_value("Pidgey", "Feathers"), 2.5);
    }

    #[test]
    fn test_suffix_must_leave_something() {
        let c = PriceCatalog::from_entries(vec![entry("Rattata", "", 5.0)]);
        assert_eq!(c.unit_value("Rattata", "s"), 0.0);
        assert_eq!(c.unit_value("Rattata", "as"), 0.0);
    }

    #[test]
    fn test_unknown_is_zero() {
        let c = catalog();
        assert_eq!(c.unit_value("Rattata", "Feather"), 0.0);
        assert_eq!(c.unit_value("Onix", "Potion"), 0.0);
    }

    #[test]
    fn test_lookup_tells_fallback_from_miss() {
        let c = catalog();
        assert_eq!(c.lookup("Rattata", "potion"), PriceLookup::Exact(10.0));
        assert_eq!(c.lookup("Rattata", "Potions"), PriceLookup::Singular(10.0));
        assert_eq!(c.lookup("Rattata", "Feathers"), PriceLookup::Unknown);
        let free = PriceCatalog::from_entries(vec![entry("Rattata", "Rock", 0.0)]);
        assert_eq!(free.lookup("Rattata", "Rocks"), PriceLookup::Singular(0.0));
    }

    // ── token_value ──────────────────────────────────────────────────

    #[test]
    fn test_token_value() {
        let c = catalog();
        assert_eq!(c.token_value("Rattata", "3 Potions"), 30.0);
        assert_eq!(c.token_value("Rattata", "Potion"), 10.0);
        let loot = vec![LootToken::from("2 Potions"), LootToken::from("1 Pedra")];
        assert_eq!(c.loot_value("Rattata", &loot), 24.0);
    }

    // ── catalog helpers ──────────────────────────────────────────────

    #[test]
    fn test_contains_is_exact() {
        let c = catalog();
        assert!(c.contains("RATTATA", "potion"));
        assert!(!c.contains("Rattata", "Potions"));
    }

    #[test]
    fn test_defeated_names() {
        assert_eq!(catalog().defeated_names(), vec!["Pidgey", "Rattata"]);
    }
}
