// Form submission controller
//
// Idle -> Validating -> Submitting -> {Advancing | Rejected | Idle}
//
// Local failures never touch the network. 400/422 re-tags exactly the fields the server
// named. Any other failure is logged and the form is re-enabled, so it is never left stuck.

use log::{debug, error, info, warn};
use url::form_urlencoded;
use uuid::Uuid;

use super::gate::SubmissionGate;
use super::validation::{validate_form, validate_on_blur, ValidationResult, ValidationRules};
use crate::api::endpoints;
use crate::api::transport::{HttpRequest, HttpResponse, Transport};
use crate::error::{WizardError, WizardResult};
use crate::form::builders::{API_KEY_FORM, BASIC_INFO_FORM, EMAIL_FORM, ORG_INFO_FORM};
use crate::form::{ControlScope, Form};
use crate::models::responses::{
    BasicInfoResponse, OrgInfoResponse, OrgStatus, ServerValidationErrors, UserStatus,
};
use crate::utils::logging::mask_api_key;
use crate::utils::validation::data_center_from_key;

const THANKS_TITLE: &str = "Thanks!";
const PENDING_BODY: &str = "We've received your details. Once our team has reviewed your \
submission, we'll email you with instructions for accessing our benchmarking tool.";
const APPROVED_TITLE: &str = "Welcome back!";
const APPROVED_BODY: &str = "Your account is already approved. Check your inbox for a link \
to the benchmarking tool.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    ApiKey,
    BasicInfo,
    OrgInfo,
    Email,
}

impl FormKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            FormKind::ApiKey => endpoints::VALIDATE_API_KEY,
            FormKind::BasicInfo => endpoints::VALIDATE_BASIC_INFO,
            FormKind::OrgInfo => endpoints::VALIDATE_ORG_INFO,
            FormKind::Email => endpoints::SUBMIT_EMAIL,
        }
    }

    /// Controls locked while a submission is outstanding.
    pub fn scope(&self) -> ControlScope {
        match self {
            FormKind::ApiKey => ControlScope::Only(vec!["key".to_string()]),
            FormKind::BasicInfo | FormKind::OrgInfo | FormKind::Email => ControlScope::All,
        }
    }

    pub fn form_name(&self) -> &'static str {
        match self {
            FormKind::ApiKey => API_KEY_FORM,
            FormKind::BasicInfo => BASIC_INFO_FORM,
            FormKind::OrgInfo => ORG_INFO_FORM,
            FormKind::Email => EMAIL_FORM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Validating,
    Submitting,
    Advancing,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    OrgInfo,
    Confirmation { title: String, body: String },
}

impl Destination {
    fn pending() -> Self {
        Destination::Confirmation {
            title: THANKS_TITLE.to_string(),
            body: PENDING_BODY.to_string(),
        }
    }

    fn approved() -> Self {
        Destination::Confirmation {
            title: APPROVED_TITLE.to_string(),
            body: APPROVED_BODY.to_string(),
        }
    }

    pub fn href(&self) -> String {
        match self {
            Destination::OrgInfo => endpoints::ORG_INFO_PAGE.to_string(),
            Destination::Confirmation { title, body } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("title", title)
                    .append_pair("body", body)
                    .finish();
                format!("{}?{}", endpoints::CONFIRMATION_PAGE, query)
            }
        }
    }
}

/// Where an accepted submission leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// API key accepted: the caller fetches the lists and advances the filmstrip.
    LoadLists,
    /// Move the filmstrip one panel forward.
    Advance,
    Navigate(Destination),
}

pub struct FormSubmissionController {
    kind: FormKind,
    form: Form,
    gate: SubmissionGate,
    state: ControllerState,
    rules: ValidationRules,
}

impl FormSubmissionController {
    pub fn new(kind: FormKind, mut form: Form, rules: ValidationRules) -> Self {
        let gate = SubmissionGate::wire(&mut form, kind.scope());
        Self {
            kind,
            form,
            gate,
            state: ControllerState::Idle,
            rules,
        }
    }

    pub fn api_key(has_organizations: bool, rules: ValidationRules) -> Self {
        Self::new(FormKind::ApiKey, Form::api_key(has_organizations), rules)
    }

    pub fn basic_info(rules: ValidationRules) -> Self {
        Self::new(FormKind::BasicInfo, Form::basic_info(), rules)
    }

    pub fn org_info(rules: ValidationRules) -> Self {
        Self::new(FormKind::OrgInfo, Form::org_info(), rules)
    }

    pub fn email(rules: ValidationRules) -> Self {
        Self::new(FormKind::Email, Form::email(), rules)
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn gate(&self) -> &SubmissionGate {
        &self.gate
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    /// Live validation of one control (blur/change).
    pub fn blur(&mut self, field_id: &str) -> Option<ValidationResult> {
        validate_on_blur(&mut self.form, field_id, &self.rules)
    }

    /// Unlock a form that was held after acceptance because a follow-up step failed.
    pub fn reopen(&mut self) {
        self.form.fetching = false;
        self.gate.reopen(&mut self.form);
        self.transition(ControllerState::Idle);
    }

    /// Handle one submit event. On acceptance the form stays locked; every other outcome
    /// leaves it enabled with its submit handler attached once.
    pub async fn submit(&mut self, transport: &dyn Transport) -> WizardResult<Route> {
        self.submit_with(transport, Vec::new()).await
    }

    /// Like `submit`, with extra fields posted after the form's own payload.
    pub async fn submit_with(
        &mut self,
        transport: &dyn Transport,
        extra: Vec<(String, String)>,
    ) -> WizardResult<Route> {
        let ticket = self.gate.guard(&mut self.form)?;
        self.transition(ControllerState::Validating);

        let validation = validate_form(&mut self.form, &self.rules);
        if !validation.all_valid {
            self.gate.release(&mut self.form, ticket);
            self.transition(ControllerState::Idle);
            return Err(WizardError::LocalValidation {
                invalid: validation.invalid_fields().len(),
            });
        }

        self.transition(ControllerState::Submitting);
        let correlation_id = Uuid::new_v4();
        self.log_submission(correlation_id);

        let mut fields = self.form.payload();
        fields.extend(extra);
        let request = HttpRequest::post_form(self.kind.endpoint(), fields);
        let result = match transport.send(request).await {
            Ok(resp) if resp.is_success() => self.route(&resp),
            Ok(resp) if resp.is_validation_failure() => Err(self.apply_server_errors(&resp)),
            Ok(resp) => Err(WizardError::UnexpectedStatus {
                status: resp.status,
                path: self.kind.endpoint().to_string(),
            }),
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(route) => {
                self.form.clear_invalid_tags();
                if route == Route::LoadLists {
                    self.form.fetching = true;
                }
                self.gate.hold(ticket);
                self.transition(ControllerState::Advancing);
                info!(
                    "[PHASE: submission] [STEP: accepted] {} accepted, route={:?} (correlation_id={})",
                    self.form.name, route, correlation_id
                );
                Ok(route)
            }
            Err(e @ WizardError::RemoteValidation { .. }) => {
                self.transition(ControllerState::Rejected);
                warn!(
                    "[PHASE: submission] [STEP: rejected] {}: {} (correlation_id={})",
                    self.form.name, e, correlation_id
                );
                self.gate.release(&mut self.form, ticket);
                self.transition(ControllerState::Idle);
                Err(e)
            }
            Err(e) => {
                error!(
                    "[PHASE: submission] [STEP: failed] {}: {} (correlation_id={})",
                    self.form.name, e, correlation_id
                );
                self.gate.release(&mut self.form, ticket);
                self.transition(ControllerState::Idle);
                Err(e)
            }
        }
    }

    fn route(&self, resp: &HttpResponse) -> WizardResult<Route> {
        let path = self.kind.endpoint();
        match self.kind {
            FormKind::ApiKey => Ok(Route::LoadLists),
            FormKind::Email => Ok(Route::Advance),
            FormKind::BasicInfo => {
                let body: BasicInfoResponse =
                    resp.json().map_err(|e| WizardError::decode(path, e))?;
                let destination = match (body.org, body.user) {
                    (OrgStatus::New, _) => Destination::OrgInfo,
                    (OrgStatus::Existing, Some(UserStatus::Approved)) => Destination::approved(),
                    (OrgStatus::Existing, _) => Destination::pending(),
                };
                Ok(Route::Navigate(destination))
            }
            FormKind::OrgInfo => {
                let body: OrgInfoResponse =
                    resp.json().map_err(|e| WizardError::decode(path, e))?;
                let destination = match body.user() {
                    Some(UserStatus::Approved) => Destination::approved(),
                    _ => Destination::pending(),
                };
                Ok(Route::Navigate(destination))
            }
        }
    }

    /// Clears every invalid tag, then tags exactly the fields the server named.
    fn apply_server_errors(&mut self, resp: &HttpResponse) -> WizardError {
        self.form.clear_invalid_tags();
        let errors: ServerValidationErrors = match resp.json() {
            Ok(errors) => errors,
            Err(e) => return WizardError::decode(self.kind.endpoint(), e),
        };
        let mut fields = Vec::new();
        for id in errors.field_ids() {
            if self.form.tag_invalid(id) {
                fields.push(id.to_string());
            } else {
                warn!(
                    "[PHASE: submission] [STEP: rejected] {} has no field named {}",
                    self.form.name, id
                );
            }
        }
        WizardError::RemoteValidation { fields }
    }

    fn log_submission(&self, correlation_id: Uuid) {
        match self.kind {
            FormKind::ApiKey => {
                let key = self.form.field("key").map(|f| f.value()).unwrap_or_default();
                info!(
                    "[PHASE: submission] [STEP: post] {} key={} dc={} (correlation_id={})",
                    self.form.name,
                    mask_api_key(key),
                    data_center_from_key(key).unwrap_or_else(|| "unknown".to_string()),
                    correlation_id
                );
            }
            _ => info!(
                "[PHASE: submission] [STEP: post] {} to {} (correlation_id={})",
                self.form.name,
                self.kind.endpoint(),
                correlation_id
            ),
        }
    }

    fn transition(&mut self, next: ControllerState) {
        debug!(
            "[PHASE: submission] [STEP: state] {} {:?} -> {:?}",
            self.form.name, self.state, next
        );
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::scripted::ScriptedTransport;
    use crate::api::transport::RequestBody;
    use crate::error::TransportError;
    use crate::form::FieldTag;

    fn basic_form_filled() -> FormSubmissionController {
        let mut c = FormSubmissionController::basic_info(ValidationRules::default());
        c.form_mut().set_value("name", "Ada Lovelace");
        c.form_mut().set_value("email", "ada@example.org");
        c.form_mut().set_value("news_org", "The Analytical");
        c
    }

    fn assert_reenabled(c: &FormSubmissionController) {
        assert!(c.form().submit_enabled());
        assert!(c.form().fields.iter().all(|f| !f.disabled));
        assert_eq!(c.form().submit_listeners.count(), 1);
        assert!(c.form().submit_listeners.is_attached(c.gate().handler()));
        assert_eq!(c.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn key_without_marker_never_reaches_the_network() {
        let t = ScriptedTransport::new();
        let mut c = FormSubmissionController::api_key(false, ValidationRules::default());
        c.form_mut().set_value("key", "abc");

        let err = c.submit(&t).await.unwrap_err();

        assert!(matches!(err, WizardError::LocalValidation { invalid: 1 }));
        assert_eq!(t.request_count().await, 0);
        assert_eq!(c.form().field("key").and_then(|f| f.tag()), Some(FieldTag::Invalid));
        assert_reenabled(&c);
    }

    #[tokio::test]
    async fn accepted_key_routes_to_lists_and_holds_form() {
        let t = ScriptedTransport::new();
        t.respond(endpoints::VALIDATE_API_KEY, 200, "{}").await;
        let mut c = FormSubmissionController::api_key(false, ValidationRules::default());
        c.form_mut().set_value("key", "abc-us-123");

        let route = c.submit(&t).await.unwrap();

        assert_eq!(route, Route::LoadLists);
        assert_eq!(c.state(), ControllerState::Advancing);
        assert!(c.form().fetching);
        assert!(!c.form().submit_enabled());
        assert_eq!(c.form().submit_listeners.count(), 0);

        let requests = t.requests().await;
        assert_eq!(
            requests[0].body,
            RequestBody::Form(vec![("key".to_string(), "abc-us-123".to_string())])
        );

        c.reopen();
        assert_reenabled(&c);
        assert!(!c.form().fetching);
    }

    #[tokio::test]
    async fn server_rejection_tags_only_named_fields() {
        let t = ScriptedTransport::new();
        t.respond(endpoints::VALIDATE_BASIC_INFO, 400, r#"{"email":"bad"}"#)
            .await;
        let mut c = basic_form_filled();
        // Stale tag from an earlier rejection.
        c.form_mut().tag_invalid("name");

        let err = c.submit(&t).await.unwrap_err();

        assert_eq!(
            err,
            WizardError::RemoteValidation {
                fields: vec!["email".to_string()]
            }
        );
        assert_eq!(c.form().invalid_field_ids(), vec!["email".to_string()]);
        assert_reenabled(&c);
    }

    #[tokio::test]
    async fn unprocessable_entity_is_a_rejection_too() {
        let t = ScriptedTransport::new();
        t.respond(
            endpoints::VALIDATE_BASIC_INFO,
            422,
            r#"{"name":"missing","unknown_field":"x"}"#,
        )
        .await;
        let mut c = basic_form_filled();

        let err = c.submit(&t).await.unwrap_err();

        assert!(err.is_user_fixable());
        assert_eq!(c.form().invalid_field_ids(), vec!["name".to_string()]);
        assert_reenabled(&c);
    }

    #[tokio::test]
    async fn unexpected_failures_always_reenable() {
        let t = ScriptedTransport::new();
        t.respond(endpoints::VALIDATE_BASIC_INFO, 500, "oops").await;
        t.fail(endpoints::VALIDATE_BASIC_INFO, TransportError::network("reset"))
            .await;
        let mut c = basic_form_filled();

        let first = c.submit(&t).await.unwrap_err();
        assert!(matches!(first, WizardError::UnexpectedStatus { status: 500, .. }));
        assert_reenabled(&c);

        let second = c.submit(&t).await.unwrap_err();
        assert!(matches!(second, WizardError::Transport(_)));
        assert_reenabled(&c);
        assert_eq!(t.calls_to(endpoints::VALIDATE_BASIC_INFO).await, 2);
    }

    #[tokio::test]
    async fn basic_info_routes_on_body_discriminant() {
        let cases = [
            (r#"{"org":"new"}"#, Destination::OrgInfo),
            (
                r#"{"org":"existing","user":"approved"}"#,
                Destination::approved(),
            ),
            (
                r#"{"org":"existing","user":"pending"}"#,
                Destination::pending(),
            ),
            (r#"{"org":"existing"}"#, Destination::pending()),
        ];
        for (body, expected) in cases {
            let t = ScriptedTransport::new();
            t.respond(endpoints::VALIDATE_BASIC_INFO, 200, body).await;
            let mut c = basic_form_filled();
            let route = c.submit(&t).await.unwrap();
            assert_eq!(route, Route::Navigate(expected), "body {}", body);
        }
    }

    #[tokio::test]
    async fn undecodable_rejection_body_still_clears_stale_tags() {
        let t = ScriptedTransport::new();
        t.respond(endpoints::VALIDATE_ORG_INFO, 400, r#"{"budget":"required"}"#)
            .await;
        t.respond(endpoints::VALIDATE_ORG_INFO, 400, "Bad Request").await;
        let mut c = FormSubmissionController::org_info(ValidationRules::default());

        c.submit(&t).await.unwrap_err();
        assert_eq!(c.form().invalid_field_ids(), vec!["budget".to_string()]);

        let err = c.submit(&t).await.unwrap_err();

        assert!(matches!(err, WizardError::Decode { .. }));
        assert!(c.form().invalid_field_ids().is_empty());
        assert_reenabled(&c);
    }

    #[tokio::test]
    async fn undecodable_success_body_reenables() {
        let t = ScriptedTransport::new();
        t.respond(endpoints::VALIDATE_BASIC_INFO, 200, "<html>").await;
        let mut c = basic_form_filled();
        let err = c.submit(&t).await.unwrap_err();
        assert!(matches!(err, WizardError::Decode { .. }));
        assert_reenabled(&c);
    }

    #[tokio::test]
    async fn org_info_accepts_bare_true_and_user_status() {
        let t = ScriptedTransport::new();
        t.respond(endpoints::VALIDATE_ORG_INFO, 200, "true").await;
        let mut c = FormSubmissionController::org_info(ValidationRules::default());
        assert_eq!(
            c.submit(&t).await.unwrap(),
            Route::Navigate(Destination::pending())
        );

        let t = ScriptedTransport::new();
        t.respond(endpoints::VALIDATE_ORG_INFO, 200, r#"{"user":"approved"}"#)
            .await;
        let mut c = FormSubmissionController::org_info(ValidationRules::default());
        assert_eq!(
            c.submit(&t).await.unwrap(),
            Route::Navigate(Destination::approved())
        );
    }

    #[test]
    fn confirmation_href_is_form_urlencoded() {
        let dest = Destination::Confirmation {
            title: "Thanks!".to_string(),
            body: "We'll be in touch & soon".to_string(),
        };
        assert_eq!(
            dest.href(),
            "/confirmation?title=Thanks%21&body=We%27ll+be+in+touch+%26+soon"
        );
        assert_eq!(Destination::OrgInfo.href(), "/org-info");
    }

    #[test]
    fn blur_tags_a_single_field() {
        let mut c = FormSubmissionController::basic_info(ValidationRules::default());
        c.form_mut().set_value("email", "nope");
        assert_eq!(c.blur("email").map(|r| r.is_valid), Some(false));
        assert_eq!(c.form().field("name").and_then(|f| f.tag()), None);
    }
}
