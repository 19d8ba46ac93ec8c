// Analysis submission
//
// One analysis request at a time for the whole table. The panel only advances after the
// backend accepted the selection; any failure rolls the table back to fully clickable.

use log::{debug, error, info};
use uuid::Uuid;

use super::gate::SubmissionState;
use super::lists::ListsTable;
use super::panels::PanelTransitionManager;
use crate::api::endpoints;
use crate::api::transport::{HttpRequest, Transport};
use crate::error::{WizardError, WizardResult};
use crate::models::requests::AnalyzeListRequest;
use crate::models::state::{ListSelection, WizardState};

const LISTS_TABLE: &str = "lists-table";

#[derive(Debug)]
pub struct AnalysisSubmissionQueue {
    state: SubmissionState,
    /// Selection captured from the click, pending the backend's answer.
    armed: Option<ListSelection>,
}

impl Default for AnalysisSubmissionQueue {
    fn default() -> Self {
        Self {
            state: SubmissionState::Idle,
            armed: None,
        }
    }
}

impl AnalysisSubmissionQueue {
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn armed(&self) -> Option<&ListSelection> {
        self.armed.as_ref()
    }

    pub async fn submit(
        &mut self,
        selection: ListSelection,
        table: &mut ListsTable,
        transport: &dyn Transport,
        panels: &mut PanelTransitionManager,
        wizard: &mut WizardState,
    ) -> WizardResult<()> {
        if self.state == SubmissionState::Submitting {
            return Err(WizardError::SubmissionInFlight {
                target: LISTS_TABLE.to_string(),
            });
        }
        // An inert table has either a request outstanding or a committed selection.
        if !table.is_enabled() {
            debug!(
                "[PHASE: analysis] [STEP: submit] list {} ignored, table is inert",
                selection.list_id
            );
            return Err(WizardError::FormLocked {
                target: LISTS_TABLE.to_string(),
            });
        }
        let correlation_id = Uuid::new_v4();
        self.state = SubmissionState::Submitting;
        table.make_inert();
        self.armed = Some(selection.clone());
        info!(
            "[PHASE: analysis] [STEP: submit] Submitting list {} ({} members) (correlation_id={})",
            selection.list_id, selection.total_member_count, correlation_id
        );

        let outcome = self.post(&selection, transport).await;
        self.state = SubmissionState::Idle;

        match outcome {
            Ok(()) => {
                panels.advance(wizard);
                if let Some(committed) = self.armed.take() {
                    wizard.commit_selection(committed);
                }
                info!(
                    "[PHASE: analysis] [STEP: accepted] List {} queued for analysis (correlation_id={})",
                    selection.list_id, correlation_id
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    "[PHASE: analysis] [STEP: failed] {} (correlation_id={})",
                    e, correlation_id
                );
                self.armed = None;
                if let Err(rollback) = table.restore() {
                    error!(
                        "[PHASE: analysis] [STEP: rollback] {} after {} (correlation_id={})",
                        rollback, e, correlation_id
                    );
                    return Err(e);
                }
                info!(
                    "[PHASE: analysis] [STEP: rollback] {} row handler(s) reattached (correlation_id={})",
                    table.active_listener_count(),
                    correlation_id
                );
                Err(e)
            }
        }
    }

    async fn post(&self, selection: &ListSelection, transport: &dyn Transport) -> WizardResult<()> {
        let body = serde_json::to_value(AnalyzeListRequest::from(selection))
            .map_err(|e| WizardError::decode(endpoints::ANALYZE_LIST, e))?;
        let resp = transport
            .send(HttpRequest::post_json(endpoints::ANALYZE_LIST, body))
            .await?;
        if !resp.is_success() {
            return Err(WizardError::UnexpectedStatus {
                status: resp.status,
                path: endpoints::ANALYZE_LIST.to_string(),
            });
        }
        Ok(())
    }
}
