// Wizard sessions
//
// BenchmarkSession drives terms -> API key -> list table -> analysis -> results email.
// SignupSession drives basic info -> organization info -> confirmation.
// Each owns its WizardState; nothing here is global.

use log::{error, info, warn};
use std::sync::Arc;

use super::analysis::AnalysisSubmissionQueue;
use super::controller::{Destination, FormSubmissionController, Route};
use super::lists::{ListDataService, ListsTable};
use super::panels::{PanelTransitionManager, TermsAgreement};
use crate::api::transport::Transport;
use crate::config::WizardConfig;
use crate::error::{WizardError, WizardResult};
use crate::form::builders::EMAIL_FORM;
use crate::models::requests::selection_form_fields;
use crate::models::state::{ListSelection, WizardState};

pub struct BenchmarkSession {
    transport: Arc<dyn Transport>,
    panels: PanelTransitionManager,
    state: WizardState,
    terms: TermsAgreement,
    api_key: FormSubmissionController,
    table: ListsTable,
    queue: AnalysisSubmissionQueue,
    email: FormSubmissionController,
    seconds_per_member: f64,
}

impl BenchmarkSession {
    pub fn new(config: &WizardConfig, transport: Arc<dyn Transport>, has_organizations: bool) -> Self {
        Self {
            transport,
            panels: PanelTransitionManager::new(
                config.panel_count,
                config.panel_unit,
                &config.panel_unit_suffix,
                config.initial_offset,
            ),
            state: WizardState::default(),
            terms: TermsAgreement::default(),
            api_key: FormSubmissionController::api_key(has_organizations, config.rules()),
            table: ListsTable::default(),
            queue: AnalysisSubmissionQueue::default(),
            email: FormSubmissionController::email(config.rules()),
            seconds_per_member: config.seconds_per_member,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn panels(&self) -> &PanelTransitionManager {
        &self.panels
    }

    pub fn terms(&self) -> &TermsAgreement {
        &self.terms
    }

    pub fn api_key(&self) -> &FormSubmissionController {
        &self.api_key
    }

    pub fn api_key_mut(&mut self) -> &mut FormSubmissionController {
        &mut self.api_key
    }

    pub fn table(&self) -> &ListsTable {
        &self.table
    }

    pub fn email(&self) -> &FormSubmissionController {
        &self.email
    }

    pub fn email_mut(&mut self) -> &mut FormSubmissionController {
        &mut self.email
    }

    pub fn accept_terms(&mut self) -> bool {
        self.terms.accept(&mut self.panels, &mut self.state)
    }

    pub fn back(&mut self) {
        self.panels.retreat(&mut self.state);
    }

    /// Submit the API key form. When the key is accepted the lists are fetched, the table is
    /// rendered and the filmstrip moves to the list panel. Returns the number of rows.
    pub async fn submit_api_key(&mut self) -> WizardResult<usize> {
        let route = self.api_key.submit(self.transport.as_ref()).await?;
        if route != Route::LoadLists {
            warn!(
                "[PHASE: lists] [STEP: route] unexpected route {:?} for the key form",
                route
            );
        }

        match ListDataService::fetch_lists(self.transport.as_ref()).await {
            Ok(lists) => {
                self.table = ListsTable::render(lists);
                self.api_key.form_mut().fetching = false;
                self.panels.advance(&mut self.state);
                info!(
                    "[PHASE: lists] [STEP: render] {} row(s), {} analyzable",
                    self.table.rows().len(),
                    self.table.registry().len()
                );
                Ok(self.table.rows().len())
            }
            Err(e) => {
                // Panel shows no rows; the user may resubmit the key.
                self.table = ListsTable::default();
                self.api_key.reopen();
                Err(e)
            }
        }
    }

    /// Estimated analysis time in seconds for a row, if it exists.
    pub fn estimate_seconds(&self, row: usize) -> Option<f64> {
        self.table
            .rows()
            .get(row)
            .map(|r| r.summary.stats.estimated_analysis_seconds(self.seconds_per_member))
    }

    /// Click on a list row. Ok(None) means the click was ignored (no handler, or the table
    /// is inert).
    pub async fn click_row(&mut self, row: usize) -> WizardResult<Option<ListSelection>> {
        let Some(selection) = self.table.click(row) else {
            return Ok(None);
        };
        self.queue
            .submit(
                selection,
                &mut self.table,
                self.transport.as_ref(),
                &mut self.panels,
                &mut self.state,
            )
            .await?;
        Ok(self.state.selected_list.clone())
    }

    /// Send the results-email form along with the committed list. Refused until an analysis
    /// has been accepted; on success the filmstrip moves to the final panel.
    pub async fn submit_email(&mut self) -> WizardResult<()> {
        let Some(selection) = self.state.selected_list.as_ref() else {
            warn!("[PHASE: email] [STEP: submit] no list has been queued for analysis");
            return Err(WizardError::FormLocked {
                target: EMAIL_FORM.to_string(),
            });
        };
        let extra = selection_form_fields(selection);
        let route = self.email.submit_with(self.transport.as_ref(), extra).await?;
        if route != Route::Advance {
            warn!(
                "[PHASE: email] [STEP: route] unexpected route {:?} for the email form",
                route
            );
        }
        self.panels.advance(&mut self.state);
        info!(
            "[PHASE: email] [STEP: accepted] results will be sent (panel {})",
            self.state.current_panel_index
        );
        Ok(())
    }
}

/// Signup forms only ever navigate; any other route is a wiring fault.
fn signup_destination(route: Route, path: &str) -> WizardResult<Destination> {
    match route {
        Route::Navigate(d) => Ok(d),
        other => {
            error!(
                "[PHASE: signup] [STEP: route] {:?} from {} has no signup destination",
                other, path
            );
            Err(WizardError::decode(path, format!("unexpected route {:?}", other)))
        }
    }
}

/// Which signup form is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupStep {
    BasicInfo,
    OrgInfo,
    Done,
}

pub struct SignupSession {
    transport: Arc<dyn Transport>,
    basic_info: FormSubmissionController,
    org_info: FormSubmissionController,
    step: SignupStep,
    destination: Option<Destination>,
}

impl SignupSession {
    pub fn new(config: &WizardConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            basic_info: FormSubmissionController::basic_info(config.rules()),
            org_info: FormSubmissionController::org_info(config.rules()),
            step: SignupStep::BasicInfo,
            destination: None,
        }
    }

    pub fn step(&self) -> SignupStep {
        self.step
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    /// The controller for the form currently on screen.
    pub fn current_mut(&mut self) -> &mut FormSubmissionController {
        match self.step {
            SignupStep::BasicInfo => &mut self.basic_info,
            SignupStep::OrgInfo | SignupStep::Done => &mut self.org_info,
        }
    }

    pub async fn submit(&mut self) -> WizardResult<Destination> {
        let transport = Arc::clone(&self.transport);
        let route = self.current_mut().submit(transport.as_ref()).await?;
        let path = self.current_mut().kind().endpoint();
        let destination = match signup_destination(route, path) {
            Ok(d) => d,
            Err(e) => {
                self.current_mut().reopen();
                return Err(e);
            }
        };
        self.step = match destination {
            Destination::OrgInfo => SignupStep::OrgInfo,
            Destination::Confirmation { .. } => SignupStep::Done,
        };
        info!(
            "[PHASE: signup] [STEP: navigate] {}",
            destination.href()
        );
        self.destination = Some(destination.clone());
        Ok(destination)
    }
}
