//! Ranked classification and per-team point accumulation.

use std::collections::BTreeMap;

use paddock_core::RankedEntry;

use crate::artifact::DecodedEntry;

/// Builds the ranked classification stored on the event: entries with a
/// decoded position, ascending. Entries without a position (not classified,
/// undecodable) are left out; they still count for driver statistics.
#[must_use]
pub fn build_race_results(entries: &[DecodedEntry]) -> Vec<RankedEntry> {
    let mut ranked: Vec<RankedEntry> = entries
        .iter()
        .filter_map(|entry| {
            entry.rank.map(|position| RankedEntry {
                driver: entry.driver.clone(),
                position,
                time: entry.time.clone(),
            })
        })
        .collect();
    ranked.sort_by_key(|entry| entry.position);
    ranked
}

/// The race winner is the classified entry ranked first. A classification
/// with no rank-1 entry has no winner, which callers treat as a validation
/// failure before anything is persisted.
#[must_use]
pub fn find_winner(ranked: &[RankedEntry]) -> Option<&str> {
    ranked
        .iter()
        .find(|entry| entry.position == 1)
        .map(|entry| entry.driver.as_str())
}

/// Accumulator for per-team point deltas.
///
/// Every driver's points fold into their team's single running delta, so a
/// team with several scoring drivers gets exactly one database update per
/// ingestion. Iteration order is stable (sorted by team id).
#[derive(Debug, Default)]
pub struct TeamDeltas {
    deltas: BTreeMap<String, f64>,
}

impl TeamDeltas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, team: &str, points: f64) {
        *self.deltas.entry(team.to_string()).or_insert(0.0) += points;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.deltas.iter().map(|(team, delta)| (team.as_str(), *delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, driver: &str, rank: Option<i32>, points: f64) -> DecodedEntry {
        DecodedEntry {
            key: key.to_string(),
            driver: driver.to_string(),
            rank,
            points,
            time: None,
        }
    }

    #[test]
    fn race_results_sort_ascending_by_position() {
        let entries = vec![
            entry("third", "hamilton", Some(3), 15.0),
            entry("first", "norris", Some(1), 25.0),
            entry("second", "leclerc", Some(2), 18.0),
        ];

        let ranked = build_race_results(&entries);
        let order: Vec<&str> = ranked.iter().map(|e| e.driver.as_str()).collect();
        assert_eq!(order, vec!["norris", "leclerc", "hamilton"]);
        assert_eq!(ranked[0].position, 1);
    }

    #[test]
    fn unranked_entries_are_excluded_from_classification() {
        let entries = vec![
            entry("first", "norris", Some(1), 25.0),
            entry("eighteenth", "doohan", None, 0.0),
        ];

        let ranked = build_race_results(&entries);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].driver, "norris");
    }

    #[test]
    fn winner_is_the_rank_one_entry() {
        let entries = vec![
            entry("second", "leclerc", Some(2), 18.0),
            entry("first", "norris", Some(1), 25.0),
        ];
        let ranked = build_race_results(&entries);
        assert_eq!(find_winner(&ranked), Some("norris"));
    }

    #[test]
    fn no_rank_one_entry_means_no_winner() {
        let entries = vec![
            entry("second", "leclerc", Some(2), 18.0),
            entry("third", "hamilton", Some(3), 15.0),
        ];
        let ranked = build_race_results(&entries);
        assert_eq!(find_winner(&ranked), None);
        assert_eq!(find_winner(&[]), None);
    }

    #[test]
    fn team_deltas_consolidate_to_one_entry_per_team() {
        let mut deltas = TeamDeltas::new();
        deltas.add("mclaren", 25.0);
        deltas.add("ferrari", 15.0);
        deltas.add("mclaren", 18.0);

        assert_eq!(deltas.len(), 2);
        let collected: Vec<(String, f64)> = deltas
            .iter()
            .map(|(team, delta)| (team.to_string(), delta))
            .collect();
        assert_eq!(
            collected,
            vec![("ferrari".to_string(), 15.0), ("mclaren".to_string(), 43.0)]
        );
    }

    #[test]
    fn zero_point_drivers_still_register_their_team() {
        let mut deltas = TeamDeltas::new();
        deltas.add("haas", 0.0);

        assert!(!deltas.is_empty());
        assert_eq!(deltas.iter().next(), Some(("haas", 0.0)));
    }
}
