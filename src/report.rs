//! Value reports over stored chat logs.
//!
//! Values are computed here, at report time, against the current price
//! catalog. Stored logs only keep the raw "<qty> <name>" tokens.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use loot_types::LogEntry;

use crate::valuation::{split_quantity, PriceCatalog};

const UNKNOWN_PLAYER: &str = "Sem nome";
const UNKNOWN_DATE: &str = "Sem data";
const TOP_N: usize = 10;

// ── Dates ────────────────────────────────────────────────────────────────

const DATETIME_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d"];

/// Parse a stored log timestamp down to its calendar day.
pub fn parse_day(datetime: &str) -> Option<NaiveDate> {
    let s = datetime.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    let date_part = s.split(' ').next().unwrap_or("");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// "yyyy-MM-dd" for grouping; the raw date part when it doesn't parse.
pub fn day_key(datetime: &str) -> String {
    match parse_day(datetime) {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => datetime.split(' ').next().unwrap_or(datetime).to_string(),
    }
}

fn display_date(datetime: &str) -> String {
    match parse_day(datetime) {
        Some(d) => d.format("%d/%m/%Y").to_string(),
        None => datetime.to_string(),
    }
}

fn player_of(log: &LogEntry) -> &str {
    let p = log.player.trim();
    if p.is_empty() { UNKNOWN_PLAYER } else { p }
}

fn defeated_of(log: &LogEntry) -> Option<&str> {
    log.defeated
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
}

fn log_value(log: &LogEntry, catalog: &PriceCatalog) -> f64 {
    match defeated_of(log) {
        Some(d) => catalog.loot_value(d, &log.items),
        None => 0.0,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ── Log tree: day/player → defeated ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefeatedNode {
    pub name: String,
    pub log_count: usize,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayNode {
    /// "yyyy-MM-dd"
    pub day: String,
    /// "dd/MM/yyyy"
    pub date: String,
    pub player: String,
    pub item_count: usize,
    pub total_value: f64,
    pub defeated: Vec<DefeatedNode>,
}

/// Group logs per day and player, then per opponent, with loot values.
///
/// Logs without an opponent count toward the item total but carry no value.
pub fn log_tree(logs: &[LogEntry], catalog: &PriceCatalog) -> Vec<DayNode> {
    let mut groups: BTreeMap<(String, String), Vec<&LogEntry>> = BTreeMap::new();
    for log in logs {
        groups
            .entry((day_key(&log.datetime), player_of(log).to_string()))
            .or_default()
            .push(log);
    }

    groups
        .into_iter()
        .map(|((day, player), day_logs)| {
            let mut defeated: Vec<DefeatedNode> = Vec::new();
            for log in &day_logs {
                let Some(name) = defeated_of(log) else {
                    continue;
                };
                let value = log_value(log, catalog);
                match defeated.iter_mut().find(|n| n.name == name) {
                    Some(node) => {
                        node.log_count += 1;
                        node.total_value += value;
                    }
                    None => defeated.push(DefeatedNode {
                        name: name.to_string(),
                        log_count: 1,
                        total_value: value,
                    }),
                }
            }

            DayNode {
                date: display_date(&day_logs[0].datetime),
                item_count: day_logs.iter().map(|l| l.items.len()).sum(),
                total_value: defeated.iter().map(|n| n.total_value).sum(),
                day,
                player,
                defeated,
            }
        })
        .collect()
}

// ── Dashboard ────────────────────────────────────────────────────────────

/// Inclusive day range. Logs whose date can't be read are never filtered out.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    fn admits(&self, day: Option<NaiveDate>) -> bool {
        let Some(day) = day else {
            return true;
        };
        self.from.is_none_or(|f| day >= f) && self.to.is_none_or(|t| day <= t)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Amount {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked {
    pub name: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Sorted by day.
    pub value_by_day: Vec<Amount>,
    /// Highest first.
    pub value_by_player: Vec<Amount>,
    /// Most looted items by summed quantity.
    pub top_items: Vec<Ranked>,
    /// Most frequent opponents by log count.
    pub top_defeated: Vec<Ranked>,
}

/// Accumulates per-key totals, remembering first-seen order for stable ties.
struct Tally<T> {
    index: HashMap<String, usize>,
    rows: Vec<(String, T)>,
}

impl<T: Default + std::ops::AddAssign> Tally<T> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            rows: Vec::new(),
        }
    }

    fn add(&mut self, key: &str, amount: T) {
        let i = *self.index.entry(key.to_string()).or_insert_with(|| {
            self.rows.push((key.to_string(), T::default()));
            self.rows.len() - 1
        });
        self.rows[i].1 += amount;
    }
}

fn top(tally: Tally<u64>) -> Vec<Ranked> {
    let mut rows = tally.rows;
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows.into_iter()
        .take(TOP_N)
        .map(|(name, quantity)| Ranked { name, quantity })
        .collect()
}

pub fn dashboard(logs: &[LogEntry], catalog: &PriceCatalog, range: DateRange) -> Dashboard {
    let mut by_day: BTreeMap<String, f64> = BTreeMap::new();
    let mut by_player: Tally<f64> = Tally::new();
    let mut items: Tally<u64> = Tally::new();
    let mut defeated: Tally<u64> = Tally::new();

    for log in logs {
        let day = parse_day(&log.datetime);
        if !range.admits(day) {
            continue;
        }

        for token in &log.items {
            let (qty, name) = split_quantity(token.as_str());
            items.add(name, qty);
        }
        if let Some(d) = defeated_of(log) {
            defeated.add(d, 1);
        }

        let value = log_value(log, catalog);
        let key = match day {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None if log.datetime.trim().is_empty() => UNKNOWN_DATE.to_string(),
            None => day_key(&log.datetime),
        };
        *by_day.entry(key).or_default() += value;
        by_player.add(player_of(log), value);
    }

    let mut value_by_player: Vec<Amount> = by_player
        .rows
        .into_iter()
        .map(|(key, value)| Amount {
            key,
            value: round2(value),
        })
        .collect();
    value_by_player.sort_by(|a, b| b.value.total_cmp(&a.value));

    Dashboard {
        value_by_day: by_day
            .into_iter()
            .map(|(key, value)| Amount {
                key,
                value: round2(value),
            })
            .collect(),
        value_by_player,
        top_items: top(items),
        top_defeated: top(defeated),
    }
}
