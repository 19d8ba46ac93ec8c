// Line-based terminal driver
//
// Prompts on stdout, reads answers from stdin, and feeds them through the same sessions the
// smoke runner uses. An empty answer or end of input leaves the wizard.

use anyhow::{Context, Result};
use log::{info, warn};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::api::csrf::CsrfToken;
use crate::api::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::form::builders::ORG_RADIO_GROUPS;
use crate::form::{ControlKind, Form};
use crate::wizard::controller::Destination;
use crate::wizard::session::{BenchmarkSession, SignupSession, SignupStep};

struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompter {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// None on end of input.
    async fn ask(&mut self, label: &str) -> Result<Option<String>> {
        print!("{}: ", label);
        std::io::stdout().flush().context("Failed to flush stdout")?;
        let line = self
            .lines
            .next_line()
            .await
            .context("Failed to read from stdin")?;
        Ok(line.map(|l| l.trim().to_string()))
    }

    async fn confirm(&mut self, label: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} [y/N]", label)).await?;
        Ok(matches!(answer.as_deref(), Some("y") | Some("Y") | Some("yes")))
    }
}

/// Builds the HTTP transport. Without a configured token, the landing page's csrf-token meta
/// tag is read once.
async fn connect(config: &WizardConfig) -> Result<Arc<dyn Transport>> {
    let configured = CsrfToken::new(config.csrf_token.clone());
    let mut transport =
        ReqwestTransport::new(&config.base_url, configured.clone(), config.request_timeout())
            .context("Failed to build HTTP client")?;

    if configured.is_empty() {
        let page = transport
            .send(HttpRequest::get(&config.landing_path))
            .await
            .context("Failed to load landing page")?;
        match CsrfToken::from_meta(&page.body) {
            Some(token) => {
                info!(
                    "[PHASE: initialization] [STEP: csrf] Token read from page metadata: {:?}",
                    token
                );
                transport.set_csrf(token);
            }
            None => warn!(
                "[PHASE: initialization] [STEP: csrf] No csrf-token meta tag on {}",
                config.landing_path
            ),
        }
    }
    Ok(Arc::new(transport))
}

fn report(err: &WizardError, form: &Form) {
    match err {
        WizardError::LocalValidation { .. } | WizardError::RemoteValidation { .. } => {
            let labels: Vec<&str> = form
                .invalid_field_ids()
                .iter()
                .filter_map(|id| form.field(id).map(|f| f.label.as_str()))
                .collect();
            println!("Please check: {}", labels.join(", "));
        }
        other => println!("Something went wrong ({}). Please try again.", other),
    }
}

pub async fn run_benchmark(config: &WizardConfig) -> Result<()> {
    let transport = connect(config).await?;
    let mut session = BenchmarkSession::new(config, transport, false);
    let mut prompt = Prompter::new();

    println!("Email Benchmarking");
    println!("We only read aggregate list statistics; no subscriber data leaves your account.");
    if !prompt.confirm("Do you agree to the terms").await? {
        return Ok(());
    }
    session.accept_terms();

    let store = prompt
        .confirm("Use my aggregate MailChimp data for benchmarking")
        .await?;
    let updates = prompt
        .confirm("I would like to receive monthly benchmarking updates")
        .await?;
    let form = session.api_key_mut().form_mut();
    form.set_checked("store_aggregates", store);
    form.set_checked("monthly_updates", updates);

    loop {
        let Some(key) = prompt.ask("Mailchimp API key").await?.filter(|k| !k.is_empty()) else {
            return Ok(());
        };
        session.api_key_mut().form_mut().set_value("key", &key);
        match session.submit_api_key().await {
            Ok(_) => break,
            Err(e) => report(&e, session.api_key().form()),
        }
    }

    if session.table().rows().is_empty() {
        println!("No lists found for this account.");
        return Ok(());
    }

    loop {
        for (idx, row) in session.table().rows().iter().enumerate() {
            let stats = &row.summary.stats;
            let action = match (&row.selection, session.estimate_seconds(idx)) {
                (Some(_), Some(secs)) => format!("~{:.0}s to analyze", secs),
                _ => "not analyzable".to_string(),
            };
            println!(
                "  [{}] {} - {} members, {:.1}% open rate ({})",
                idx + 1,
                row.summary.name,
                stats.member_count,
                stats.open_rate,
                action
            );
        }
        let Some(answer) = prompt.ask("List to analyze").await?.filter(|a| !a.is_empty()) else {
            return Ok(());
        };
        let Some(row) = answer.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
            println!("Enter a list number.");
            continue;
        };
        match session.click_row(row).await {
            Ok(Some(selection)) => {
                println!("\"{}\" is queued for analysis.", selection.list_name);
                break;
            }
            Ok(None) => println!("That list can't be analyzed."),
            Err(e) => println!("Could not submit the list ({}). Please pick again.", e),
        }
    }

    loop {
        let Some(email) = prompt
            .ask("Email address for the results")
            .await?
            .filter(|e| !e.is_empty())
        else {
            return Ok(());
        };
        session.email_mut().form_mut().set_value("email", &email);
        match session.submit_email().await {
            Ok(()) => {
                println!("Thanks! We'll email you when the results are ready.");
                return Ok(());
            }
            Err(e) => report(&e, session.email().form()),
        }
    }
}

/// Prompts for every live field of a form. Returns false on end of input.
async fn fill_form(prompt: &mut Prompter, form: &mut Form) -> Result<bool> {
    let fields: Vec<(String, String, ControlKind)> = form
        .fields
        .iter()
        .map(|f| (f.id().to_string(), f.label.clone(), f.control))
        .collect();

    for (id, label, control) in fields {
        if form.field(&id).is_some_and(|f| f.dormant) {
            continue;
        }
        match control {
            ControlKind::Checkbox => {
                let checked = prompt.confirm(&label).await?;
                form.set_checked(&id, checked);
            }
            ControlKind::Radio => {
                let choices = ORG_RADIO_GROUPS
                    .iter()
                    .find(|(group, _, _)| *group == id)
                    .map(|(_, _, choices)| *choices)
                    .unwrap_or_default();
                for (n, choice) in choices.iter().enumerate() {
                    println!("  {}) {}", n + 1, choice);
                }
                let Some(answer) = prompt.ask(&label).await? else {
                    return Ok(false);
                };
                let chosen = answer
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|n| choices.get(n))
                    .map(|c| c.to_string())
                    .unwrap_or_default();
                form.set_value(&id, &chosen);
            }
            ControlKind::Text | ControlKind::Select => {
                let current = form.field(&id).map(|f| f.value().to_string()).unwrap_or_default();
                let question = if current.is_empty() {
                    label.clone()
                } else {
                    format!("{} [{}]", label, current)
                };
                let Some(answer) = prompt.ask(&question).await? else {
                    return Ok(false);
                };
                if !answer.is_empty() {
                    form.set_value(&id, &answer);
                }
            }
        }
    }
    Ok(true)
}

pub async fn run_signup(config: &WizardConfig) -> Result<()> {
    let transport = connect(config).await?;
    let mut session = SignupSession::new(config, transport);
    let mut prompt = Prompter::new();

    while session.step() != SignupStep::Done {
        let heading = match session.step() {
            SignupStep::BasicInfo => "About you",
            _ => "About your organization",
        };
        println!("{}", heading);
        if !fill_form(&mut prompt, session.current_mut().form_mut()).await? {
            return Ok(());
        }
        match session.submit().await {
            Ok(Destination::OrgInfo) => continue,
            Ok(Destination::Confirmation { title, body }) => {
                println!("{}", title);
                println!("{}", body);
            }
            Err(e) => report(&e, session.current_mut().form()),
        }
    }
    Ok(())
}
