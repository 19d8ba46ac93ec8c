// Wizard state (in-memory)
//
// NOTE: This is NOT persisted. One instance per running wizard; only panel transitions and
// a successful analysis submission write to it.

use serde::{Deserialize, Serialize};

use super::responses::ListSummary;

/// A list the user picked for analysis. Captured once from a row and never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSelection {
    pub list_id: String,
    pub list_name: String,
    pub total_member_count: u64,
    pub open_rate_percent: f64,
}

impl ListSelection {
    /// Total size counts subscribed, unsubscribed and cleaned members.
    pub fn from_summary(summary: &ListSummary) -> Self {
        let stats = &summary.stats;
        Self {
            list_id: summary.id.clone(),
            list_name: summary.name.clone(),
            total_member_count: stats
                .member_count
                .saturating_add(stats.unsubscribe_count)
                .saturating_add(stats.cleaned_count),
            open_rate_percent: stats.open_rate,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub current_panel_index: usize,
    pub selected_list: Option<ListSelection>,
}

impl WizardState {
    pub(crate) fn move_panel(&mut self, delta: i32) {
        self.current_panel_index = if delta >= 0 {
            self.current_panel_index.saturating_add(delta.unsigned_abs() as usize)
        } else {
            self.current_panel_index.saturating_sub(delta.unsigned_abs() as usize)
        };
    }

    pub(crate) fn commit_selection(&mut self, selection: ListSelection) {
        self.selected_list = Some(selection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::responses::ListStats;

    #[test]
    fn selection_total_includes_unsubscribed_and_cleaned() {
        let summary = ListSummary {
            id: "abc123".to_string(),
            name: "Weekly".to_string(),
            stats: ListStats {
                member_count: 100,
                unsubscribe_count: 20,
                cleaned_count: 5,
                open_rate: 23.5,
            },
        };
        let sel = ListSelection::from_summary(&summary);
        assert_eq!(sel.total_member_count, 125);
        assert_eq!(sel.open_rate_percent, 23.5);
        assert_eq!(sel.list_name, "Weekly");
    }

    #[test]
    fn selection_total_saturates_on_oversized_counts() {
        let summary = ListSummary {
            id: "huge".to_string(),
            name: "Huge".to_string(),
            stats: ListStats {
                member_count: u64::MAX,
                unsubscribe_count: 1,
                cleaned_count: 1,
                open_rate: 0.0,
            },
        };
        assert_eq!(ListSelection::from_summary(&summary).total_member_count, u64::MAX);
    }

    #[test]
    fn panel_index_never_underflows() {
        let mut state = WizardState::default();
        state.move_panel(-1);
        assert_eq!(state.current_panel_index, 0);
        state.move_panel(2);
        assert_eq!(state.current_panel_index, 2);
    }
}
