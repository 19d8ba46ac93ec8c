// Per-form submission gate
//
// At most one submission per form is in flight. Entering the gate detaches the submit
// handler and locks the form's controls; the caller decides whether to release (re-enable
// and reattach the same handler) or hold (leave the form locked).

use log::{debug, warn};

use crate::error::{WizardError, WizardResult};
use crate::form::{ControlScope, Form, HandlerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
}

/// Proof that the gate was entered. Carries the handler detached on entry.
#[must_use = "a ticket must be released or held, otherwise the form stays locked"]
#[derive(Debug, PartialEq, Eq)]
pub struct GateTicket {
    handler: HandlerId,
}

/// SubmissionLock for one form: the state field plus the handler it guards.
#[derive(Debug)]
pub struct SubmissionGate {
    state: SubmissionState,
    registered_handler: HandlerId,
    scope: ControlScope,
}

impl SubmissionGate {
    /// Wires a form: registers a fresh submit handler and attaches it.
    pub fn wire(form: &mut Form, scope: ControlScope) -> Self {
        let handler = HandlerId::fresh();
        form.submit_listeners.attach(handler);
        Self {
            state: SubmissionState::Idle,
            registered_handler: handler,
            scope,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    pub fn handler(&self) -> HandlerId {
        self.registered_handler
    }

    /// Enter the gate: refuse if a submission is already outstanding, otherwise detach the
    /// submit handler and lock the controls.
    pub fn guard(&mut self, form: &mut Form) -> WizardResult<GateTicket> {
        if self.state == SubmissionState::Submitting {
            debug!(
                "[PHASE: submission] [STEP: guard] {} submit ignored, already in flight",
                form.name
            );
            return Err(WizardError::SubmissionInFlight {
                target: form.name.clone(),
            });
        }
        // No attached handler means no submit event can reach us.
        if !form.submit_listeners.detach(self.registered_handler) {
            debug!(
                "[PHASE: submission] [STEP: guard] {} submit ignored, form is locked",
                form.name
            );
            return Err(WizardError::FormLocked {
                target: form.name.clone(),
            });
        }
        form.disable_controls(&self.scope);
        self.state = SubmissionState::Submitting;
        Ok(GateTicket {
            handler: self.registered_handler,
        })
    }

    /// Re-enable the locked controls and reattach the exact handler detached on entry.
    pub fn release(&mut self, form: &mut Form, ticket: GateTicket) {
        form.enable_controls(&self.scope);
        if !form.submit_listeners.attach(ticket.handler) {
            warn!(
                "[PHASE: submission] [STEP: release] {} submit handler was already attached",
                form.name
            );
        }
        self.state = SubmissionState::Idle;
    }

    /// Leave the form locked for good (the flow has moved on).
    pub fn hold(&mut self, ticket: GateTicket) {
        debug!(
            "[PHASE: submission] [STEP: hold] handler {} stays detached",
            ticket.handler.raw()
        );
        self.state = SubmissionState::Idle;
    }

    /// Unlock a held form again, e.g. when a follow-up step failed after acceptance.
    pub fn reopen(&mut self, form: &mut Form) {
        if self.state == SubmissionState::Submitting {
            return;
        }
        form.enable_controls(&self.scope);
        form.submit_listeners.attach(self.registered_handler);
    }
}
