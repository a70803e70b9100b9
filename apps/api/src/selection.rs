//! Selected-row tracking for the admin console.
//!
//! Selection is keyed by record id, so it survives list refreshes: a re-fetch
//! replaces the rows but ids that still exist keep their checked state. Ids
//! that vanish from the roster are pruned so a bulk action can never target a
//! deleted record.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet(HashMap<String, bool>);

impl SelectionSet {
    pub fn toggle(&mut self, id: &str) {
        let current = self.0.get(id).copied().unwrap_or(false);
        self.0.insert(id.to_string(), !current);
    }

    /// Select-all scoped to the visible rows: if every visible row is already
    /// selected, deselect them all, otherwise select them all. Rows outside
    /// the visible set are left untouched either way.
    pub fn toggle_all(&mut self, visible: &[String]) {
        let all_selected = visible.iter().all(|id| self.is_selected(id));
        let target = !all_selected;
        for id in visible {
            self.0.insert(id.clone(), target);
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Drops entries whose id no longer exists in the roster. Returns
    /// whether anything was removed.
    pub fn prune(&mut self, roster_ids: &HashSet<String>) -> bool {
        let before = self.0.len();
        self.0.retain(|id, _| roster_ids.contains(id));
        self.0.len() != before
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }

    /// Ids currently selected, sorted for stable output.
    pub fn selected_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .0
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn count(&self) -> usize {
        self.0.values().filter(|selected| **selected).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn toggle_flips_and_unflips() {
        let mut sel = SelectionSet::default();
        sel.toggle("u1");
        assert!(sel.is_selected("u1"));
        sel.toggle("u1");
        assert!(!sel.is_selected("u1"));
        assert_eq!(sel.count(), 0);
    }

    #[test]
    fn toggle_all_selects_when_any_visible_unselected() {
        let mut sel = SelectionSet::default();
        sel.toggle("u1");
        sel.toggle_all(&ids(&["u1", "u2", "u3"]));
        assert_eq!(sel.selected_ids(), ids(&["u1", "u2", "u3"]));
    }

    #[test]
    fn toggle_all_deselects_when_all_visible_selected() {
        let mut sel = SelectionSet::default();
        sel.toggle_all(&ids(&["u1", "u2"]));
        sel.toggle_all(&ids(&["u1", "u2"]));
        assert_eq!(sel.count(), 0);
    }

    #[test]
    fn toggle_all_leaves_rows_outside_visible_set_untouched() {
        let mut sel = SelectionSet::default();
        sel.toggle("hidden");
        sel.toggle_all(&ids(&["u1", "u2"]));
        assert!(sel.is_selected("hidden"));
        sel.toggle_all(&ids(&["u1", "u2"]));
        assert!(sel.is_selected("hidden"));
        assert_eq!(sel.selected_ids(), ids(&["hidden"]));
    }

    #[test]
    fn paired_toggle_all_restores_an_empty_selection() {
        let mut sel = SelectionSet::default();
        let visible = ids(&["u1", "u2", "u3"]);
        sel.toggle_all(&visible);
        sel.toggle_all(&visible);
        assert_eq!(sel.count(), 0);
    }

    #[test]
    fn paired_toggle_all_restores_a_fully_selected_set() {
        let mut sel = SelectionSet::default();
        let visible = ids(&["u1", "u2"]);
        sel.toggle_all(&visible);
        let before = sel.selected_ids();
        sel.toggle_all(&visible);
        sel.toggle_all(&visible);
        assert_eq!(sel.selected_ids(), before);
    }

    #[test]
    fn prune_drops_ids_missing_from_roster() {
        let mut sel = SelectionSet::default();
        sel.toggle("kept");
        sel.toggle("gone");
        let roster: HashSet<String> = ["kept".to_string()].into_iter().collect();
        sel.prune(&roster);
        assert!(sel.is_selected("kept"));
        assert!(!sel.is_selected("gone"));
        assert_eq!(sel.count(), 1);
    }

    #[test]
    fn prune_reports_whether_anything_was_removed() {
        let mut sel = SelectionSet::default();
        sel.toggle("kept");
        let roster: HashSet<String> = ["kept".to_string()].into_iter().collect();
        assert!(!sel.prune(&roster));

        sel.toggle("gone");
        assert!(sel.prune(&roster));
        assert!(sel.is_selected("kept"));
    }

    #[test]
    fn clear_empties_the_set() {
        let mut sel = SelectionSet::default();
        sel.toggle_all(&ids(&["u1", "u2", "u3"]));
        sel.clear();
        assert!(sel.is_empty());
        assert!(sel.selected_ids().is_empty());
    }
}
