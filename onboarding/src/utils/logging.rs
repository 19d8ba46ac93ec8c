// Logging utilities
// Structured logging with JSON and human-readable formats

use log::Level;
use serde_json::json;

use super::validation::data_center_from_key;

/// Mask sensitive data in logs
pub fn mask_sensitive(input: &str) -> String {
    if input.len() <= 8 || !input.is_ascii() {
        return "***".to_string();
    }

    let visible = 4;
    let start = &input[..visible];
    let end = &input[input.len() - visible..];

    format!("{}...{}", start, end)
}

/// Mask an API key, keeping only its data-center suffix for troubleshooting.
pub fn mask_api_key(key: &str) -> String {
    match data_center_from_key(key) {
        Some(dc) => format!("***-{}", dc),
        None => "***".to_string(),
    }
}

/// Metadata carried inline in a log message as `[PHASE: x] [STEP: y] ... (correlation_id=z)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogMetadata {
    pub phase: Option<String>,
    pub step: Option<String>,
    pub correlation_id: Option<String>,
    pub message: String,
}

fn take_tag(message: &str, tag: &str) -> (Option<String>, String) {
    let Some(start) = message.find(tag) else {
        return (None, message.to_string());
    };
    let Some(end) = message[start..].find(']') else {
        return (None, message.to_string());
    };
    let value = message[start + tag.len()..start + end].trim().to_string();
    let rest = format!("{} {}", &message[..start], &message[start + end + 1..])
        .trim()
        .to_string();
    (Some(value), rest)
}

/// Parse phase, step and correlation id from a log message
pub fn parse_log_metadata(message: &str) -> LogMetadata {
    let (phase, rest) = take_tag(message, "[PHASE:");
    let (step, rest) = take_tag(&rest, "[STEP:");

    let correlation_id = rest.find("correlation_id=").map(|start| {
        rest[start + "correlation_id=".len()..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect::<String>()
    });

    LogMetadata {
        phase,
        step,
        correlation_id: correlation_id.filter(|c| !c.is_empty()),
        message: rest,
    }
}

/// Format log entry as JSON for structured logging
pub fn format_json_log(timestamp: &str, level: Level, target: &str, meta: &LogMetadata) -> String {
    let mut log_entry = json!({
        "timestamp": timestamp,
        "level": level.as_str(),
        "target": target,
        "message": meta.message,
    });

    if let Some(phase) = &meta.phase {
        log_entry["phase"] = json!(phase);
    }

    if let Some(step) = &meta.step {
        log_entry["step"] = json!(step);
    }

    if let Some(cid) = &meta.correlation_id {
        log_entry["correlationId"] = json!(cid);
    }

    serde_json::to_string(&log_entry).unwrap_or_else(|_| "{}".to_string())
}

/// Format log entry as human-readable text
pub fn format_human_readable_log(
    timestamp: &str,
    level: Level,
    target: &str,
    meta: &LogMetadata,
) -> String {
    let mut log_line = format!("[{}] [{}]", timestamp, level.as_str());

    if let Some(phase) = &meta.phase {
        log_line.push_str(&format!(" [PHASE: {}]", phase));
    }

    if let Some(step) = &meta.step {
        log_line.push_str(&format!(" [STEP: {}]", step));
    }

    log_line.push_str(&format!(" [{}] {}", target, meta.message));
    log_line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_sensitive_short_values_fully_masked() {
        assert_eq!(mask_sensitive("abc"), "***");
        assert_eq!(mask_sensitive("12345678"), "***");
    }

    #[test]
    fn mask_sensitive_long_values_partially_masked() {
        let masked = mask_sensitive("abcdefghijklmnop");
        assert_eq!(masked, "abcd...mnop");
    }

    #[test]
    fn mask_api_key_keeps_only_data_center() {
        let masked = mask_api_key("API_KEY_SHOULD_BE_REDACTED-us12");
        assert_eq!(masked, "***-us12");
        assert!(!masked.contains("REDACTED"));
        assert_eq!(mask_api_key("abc"), "***");
    }

    #[test]
    fn parse_log_metadata_extracts_phase_step_and_correlation() {
        let meta = parse_log_metadata(
            "[PHASE: api_key] [STEP: submit] accepted by server (correlation_id=ab12cd)",
        );
        assert_eq!(meta.phase.as_deref(), Some("api_key"));
        assert_eq!(meta.step.as_deref(), Some("submit"));
        assert_eq!(meta.correlation_id.as_deref(), Some("ab12cd"));
        assert_eq!(meta.message, "accepted by server (correlation_id=ab12cd)");
    }

    #[test]
    fn parse_log_metadata_plain_message_passes_through() {
        let meta = parse_log_metadata("nothing special");
        assert_eq!(meta.phase, None);
        assert_eq!(meta.step, None);
        assert_eq!(meta.message, "nothing special");
    }

    #[test]
    fn json_log_includes_optional_fields_only_when_present() {
        let meta = parse_log_metadata("[PHASE: lists] fetched 3 lists");
        let line = format_json_log("2026-01-01T00:00:00Z", Level::Info, "t", &meta);
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["phase"], "lists");
        assert!(v.get("step").is_none());
        assert!(v.get("correlationId").is_none());
        assert_eq!(v["message"], "fetched 3 lists");
    }

    #[test]
    fn human_readable_log_renders_tags_before_target() {
        let meta = parse_log_metadata("[PHASE: panels] [STEP: shift] offset=-100");
        let line = format_human_readable_log("ts", Level::Debug, "wizard", &meta);
        assert_eq!(
            line,
            "[ts] [DEBUG] [PHASE: panels] [STEP: shift] [wizard] offset=-100"
        );
    }
}
