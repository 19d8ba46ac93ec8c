// API request models

use serde::{Deserialize, Serialize};

use super::state::ListSelection;

/// Body of `POST /analyze-list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeListRequest {
    pub list_id: String,
    pub list_name: String,
    pub total_count: u64,
    pub open_rate: f64,
}

impl From<&ListSelection> for AnalyzeListRequest {
    fn from(sel: &ListSelection) -> Self {
        Self {
            list_id: sel.list_id.clone(),
            list_name: sel.list_name.clone(),
            total_count: sel.total_member_count,
            open_rate: sel.open_rate_percent,
        }
    }
}

/// Selection fields appended to the results-email form, keyed like the analyze request.
pub fn selection_form_fields(sel: &ListSelection) -> Vec<(String, String)> {
    let req = AnalyzeListRequest::from(sel);
    vec![
        ("listId".to_string(), req.list_id),
        ("listName".to_string(), req.list_name),
        ("totalCount".to_string(), req.total_count.to_string()),
        ("openRate".to_string(), req.open_rate.to_string()),
    ]
}
