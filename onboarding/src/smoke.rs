// Deterministic flow proof runner
//
// Drives both sessions against ScriptedTransport and records what happened. Each check line
// ends in `ok=true|false`; the run fails if any check is false.

use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;

use crate::api::endpoints;
use crate::api::scripted::ScriptedTransport;
use crate::api::transport::{RequestBody, Transport};
use crate::config::WizardConfig;
use crate::wizard::controller::Destination;
use crate::wizard::session::{BenchmarkSession, SignupSession};

pub const TRANSCRIPT_FILE: &str = "flow_smoke_transcript.log";

const LISTS: &str = r#"{"lists":[
    {"id":"l1","name":"Morning Briefing","stats":{"member_count":1200,"unsubscribe_count":40,"cleaned_count":10,"open_rate":27.5}},
    {"id":"l2","name":"Archive","stats":{"member_count":0}},
    {"id":"l3","name":"Weekend Read","stats":{"member_count":300,"unsubscribe_count":3,"cleaned_count":0,"open_rate":41.0}}
]}"#;

#[derive(Debug, Default)]
pub struct Transcript {
    lines: Vec<String>,
    failures: usize,
}

impl Transcript {
    fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn check(&mut self, label: &str, ok: bool) {
        if !ok {
            self.failures += 1;
        }
        self.lines.push(format!("CHECK {} ok={}", label, ok));
    }

    pub fn passed(&self) -> bool {
        self.failures == 0
    }

    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// Runs the scripted benchmark and signup flows.
pub async fn flow_smoke(config: &WizardConfig) -> Result<Transcript> {
    let mut t = Transcript::default();
    t.line("FLOW_SMOKE begin");

    let scripted = Arc::new(ScriptedTransport::new());
    scripted
        .respond(
            endpoints::VALIDATE_API_KEY,
            400,
            r#"{"key":"Invalid API key"}"#,
        )
        .await;
    scripted.respond(endpoints::VALIDATE_API_KEY, 200, "{}").await;
    scripted.respond(endpoints::GET_LISTS, 200, LISTS).await;
    scripted.respond(endpoints::ANALYZE_LIST, 502, "").await;
    scripted.respond(endpoints::ANALYZE_LIST, 200, "{}").await;
    scripted.respond(endpoints::SUBMIT_EMAIL, 200, "{}").await;

    let transport: Arc<dyn Transport> = scripted.clone();
    let mut session = BenchmarkSession::new(config, Arc::clone(&transport), false);

    t.check("terms_first_accept", session.accept_terms());
    t.check("terms_second_accept_ignored", !session.accept_terms());

    session.api_key_mut().form_mut().set_value("key", "abc");
    let local = session.submit_api_key().await;
    t.line(format!("local_reject result={:?}", local.as_ref().err()));
    t.check(
        "local_reject_no_network",
        local.is_err() && scripted.request_count().await == 0,
    );

    session
        .api_key_mut()
        .form_mut()
        .set_value("key", "0123456789abcdef-us12");
    let remote = session.submit_api_key().await;
    t.line(format!("server_reject result={:?}", remote.as_ref().err()));
    t.check(
        "server_reject_reenabled",
        remote.is_err() && session.api_key().form().submit_enabled(),
    );

    let rows = session.submit_api_key().await.context("key acceptance")?;
    t.line(format!(
        "lists rows={} analyzable={} panel_index={} transform={}",
        rows,
        session.table().registry().len(),
        session.state().current_panel_index,
        session.panels().css_transform()
    ));
    t.check("lists_fetched_once", scripted.calls_to(endpoints::GET_LISTS).await == 1);

    let failed = session.click_row(0).await;
    t.line(format!(
        "analysis_fail result={:?} active_listeners={}",
        failed.as_ref().err(),
        session.table().active_listener_count()
    ));
    t.check(
        "analysis_rollback_complete",
        failed.is_err()
            && session.table().is_enabled()
            && session.table().active_listener_count() == session.table().registry().len(),
    );

    let committed = session.click_row(2).await.context("analysis retry")?;
    t.line(format!(
        "analysis_ok list={:?} panel_index={}",
        committed.as_ref().map(|s| s.list_id.as_str()),
        session.state().current_panel_index
    ));
    t.check(
        "analysis_committed",
        committed.is_some() && session.table().active_listener_count() == 0,
    );

    session
        .email_mut()
        .form_mut()
        .set_value("email", "smoke@example.org");
    session.submit_email().await.context("results email")?;
    let committed_id = committed.as_ref().map(|s| s.list_id.as_str());
    let email_posted = scripted.requests().await.iter().any(|r| match &r.body {
        RequestBody::Form(fields) if r.path == endpoints::SUBMIT_EMAIL => fields
            .iter()
            .any(|(k, v)| k == "listId" && Some(v.as_str()) == committed_id),
        _ => false,
    });
    t.line(format!(
        "email_ok panel_index={}",
        session.state().current_panel_index
    ));
    t.check("email_carries_selection", email_posted);

    let signup_transport = Arc::new(ScriptedTransport::new());
    signup_transport
        .respond(endpoints::VALIDATE_BASIC_INFO, 200, r#"{"org":"new"}"#)
        .await;
    signup_transport
        .respond(endpoints::VALIDATE_ORG_INFO, 200, r#"{"user":"pending"}"#)
        .await;
    let mut signup = SignupSession::new(config, signup_transport);
    let form = signup.current_mut().form_mut();
    form.set_value("name", "Smoke Test");
    form.set_value("email", "smoke@example.org");
    form.set_value("news_org", "Smoke Gazette");
    let first = signup.submit().await.context("basic info")?;
    t.check("signup_routes_to_org_info", first == Destination::OrgInfo);
    let second = signup.submit().await.context("org info")?;
    t.line(format!("signup_destination href={}", second.href()));
    t.check(
        "signup_confirmation",
        matches!(second, Destination::Confirmation { .. }),
    );

    t.line(format!("FLOW_SMOKE end passed={}", t.passed()));
    info!(
        "[PHASE: smoke] [STEP: flow] passed={} checks_failed={}",
        t.passed(),
        t.failures
    );
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_flow_passes_every_check() {
        let transcript = flow_smoke(&WizardConfig::default()).await.unwrap();
        let rendered = transcript.render();
        assert!(transcript.passed(), "{}", rendered);
        assert!(rendered.contains("CHECK analysis_rollback_complete ok=true"));
        assert!(rendered.contains("CHECK email_carries_selection ok=true"));
        assert!(rendered.ends_with("FLOW_SMOKE end passed=true\n"));
    }
}
