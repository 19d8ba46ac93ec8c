// Admin activation switch
//
// Each user row carries a switch that flips the user's approval server-side. A failed call
// leaves the switch locked until the page is reloaded.

use log::{error, info};

use super::gate::SubmissionGate;
use crate::api::endpoints;
use crate::api::transport::{HttpRequest, Transport};
use crate::error::{WizardError, WizardResult};
use crate::form::{ControlKind, ControlScope, Field, FieldKind, Form};

pub struct ActivationToggle {
    user_id: String,
    form: Form,
    gate: SubmissionGate,
    approved: bool,
}

impl ActivationToggle {
    pub fn new(user_id: &str, approved: bool) -> Self {
        let mut form = Form::new(
            &format!("activation-switch-{}", user_id),
            vec![Field::new(
                "approved",
                "Approved",
                FieldKind::Generic,
                ControlKind::Checkbox,
            )],
        );
        if approved {
            form.set_checked("approved", true);
        }
        let gate = SubmissionGate::wire(&mut form, ControlScope::All);
        Self {
            user_id: user_id.to_string(),
            form,
            gate,
            approved,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn is_approved(&self) -> bool {
        self.approved
    }

    pub fn is_enabled(&self) -> bool {
        self.form.submit_enabled()
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Change event on the switch.
    pub async fn toggle(&mut self, transport: &dyn Transport) -> WizardResult<()> {
        let ticket = self.gate.guard(&mut self.form)?;
        let request =
            HttpRequest::get(endpoints::ACTIVATE_USER).with_query("user", &self.user_id);

        let result = match transport.send(request).await {
            Ok(resp) if resp.is_success() => Ok(()),
            Ok(resp) => Err(WizardError::UnexpectedStatus {
                status: resp.status,
                path: endpoints::ACTIVATE_USER.to_string(),
            }),
            Err(e) => Err(WizardError::from(e)),
        };

        match result {
            Ok(()) => {
                self.approved = !self.approved;
                self.gate.release(&mut self.form, ticket);
                self.form.set_checked("approved", self.approved);
                info!(
                    "[PHASE: admin] [STEP: toggle] user {} approved={}",
                    self.user_id, self.approved
                );
                Ok(())
            }
            Err(e) => {
                self.gate.hold(ticket);
                error!(
                    "[PHASE: admin] [STEP: toggle] user {} left locked: {}",
                    self.user_id, e
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::scripted::ScriptedTransport;

    #[tokio::test]
    async fn successful_toggle_flips_and_stays_enabled() {
        let t = ScriptedTransport::new();
        t.respond(endpoints::ACTIVATE_USER, 200, "true").await;
        let mut toggle = ActivationToggle::new("42", false);

        toggle.toggle(&t).await.unwrap();
        assert!(toggle.is_approved());
        assert!(toggle.is_enabled());
        assert!(toggle.form().field("approved").is_some_and(|f| f.is_checked()));

        toggle.toggle(&t).await.unwrap();
        assert!(!toggle.is_approved());

        let requests = t.requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].query,
            vec![("user".to_string(), "42".to_string())]
        );
    }

    #[tokio::test]
    async fn failed_toggle_stays_disabled() {
        let t = ScriptedTransport::new();
        t.respond(endpoints::ACTIVATE_USER, 500, "").await;
        let mut toggle = ActivationToggle::new("7", true);

        assert!(toggle.toggle(&t).await.is_err());
        assert!(!toggle.is_enabled());
        assert!(toggle.is_approved());

        let again = toggle.toggle(&t).await.unwrap_err();
        assert!(matches!(again, WizardError::FormLocked { .. }));
        assert_eq!(t.request_count().await, 1);
    }
}
