use std::collections::HashMap;

use loot_types::ExtractedItem;

/// Items merged by name, and how many input rows disappeared into others.
#[derive(Debug, Clone, PartialEq)]
pub struct Consolidation {
    pub items: Vec<ExtractedItem>,
    pub folded: usize,
}

/// Merge rows that name the same item (case-insensitive, trimmed), summing
/// counts and values. Rows with a blank name are dropped.
///
/// Output keeps first-seen order and the first-seen spelling.
pub fn consolidate(items: &[ExtractedItem]) -> Consolidation {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<ExtractedItem> = Vec::new();

    for item in items {
        let name = item.item.trim();
        if name.is_empty() {
            continue;
        }

        match index.get(&name.to_lowercase()) {
            Some(&i) => {
                merged[i].count = merged[i].count.saturating_add(item.count);
                merged[i].value += item.value;
            }
            None => {
                index.insert(name.to_lowercase(), merged.len());
                merged.push(ExtractedItem::new(name, item.count, item.value));
            }
        }
    }

    Consolidation {
        folded: items.len() - merged.len(),
        items: merged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_merge() {
        let out = consolidate(&[
            ExtractedItem::new("Potion", 2, 20.0),
            ExtractedItem::new("potion", 3, 30.0),
        ]);
        assert_eq!(out.items, vec![ExtractedItem::new("Potion", 5, 50.0)]);
        assert_eq!(out.folded, 1);
    }

    #[test]
    fn test_first_seen_order_and_trim() {
        let out = consolidate(&[
            ExtractedItem::new(" Ether ", 1, 5.0),
            ExtractedItem::new("Potion", 1, 10.0),
            ExtractedItem::new("ETHER", 2, 10.0),
        ]);
        assert_eq!(
            out.items,
            vec![
                ExtractedItem::new("Ether", 3, 15.0),
                ExtractedItem::new("Potion", 1, 10.0),
            ]
        );
    }

    #[test]
    fn test_blank_names_dropped() {
        let out = consolidate(&[
            ExtractedItem::new("  ", 4, 4.0),
            ExtractedItem::new("Potion", 1, 1.0),
        ]);
        assert_eq!(out.items.len(), 1);
        // the blank row counts as folded away
        assert_eq!(out.folded, 1);
    }

    #[test]
    fn test_idempotent() {
        let once = consolidate(&[
            ExtractedItem::new("Potion", 2, 20.0),
            ExtractedItem::new("Ether", 1, 3.0),
            ExtractedItem::new("POTION", 1, 10.0),
        ]);
        let twice = consolidate(&once.items);
        assert_eq!(twice.items, once.items);
        assert_eq!(twice.folded, 0);
    }

    #[test]
    fn test_count_saturates() {
        let out = consolidate(&[
            ExtractedItem::new("Potion", u32::MAX, 1.0),
            ExtractedItem::new("potion", 1, 1.0),
        ]);
        assert_eq!(out.items, vec![ExtractedItem::new("Potion", u32::MAX, 2.0)]);
    }

    #[test]
    fn test_empty_input() {
        let out = consolidate(&[]);
        assert!(out.items.is_empty());
        assert_eq!(out.folded, 0);
    }
}
