// Client-side field validation
//
// Every validated field ends up tagged exactly one of valid/invalid. Form validation never
// short-circuits: all fields are visited so the user sees every error at once.

use log::debug;
use std::collections::BTreeMap;

use crate::form::{Field, FieldDescriptor, FieldKind, Form};
use crate::utils::validation::looks_like_email;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    /// Literal that every valid API key must contain (its account-region suffix).
    pub key_marker: String,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            key_marker: "-us".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub field_identifier: String,
    pub is_valid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValidationResult {
    pub all_valid: bool,
    pub per_field: BTreeMap<String, bool>,
}

impl FormValidationResult {
    pub fn invalid_fields(&self) -> Vec<String> {
        self.per_field
            .iter()
            .filter(|(_, valid)| !**valid)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// Pure rule check; no tagging.
pub fn classify(descriptor: &FieldDescriptor, rules: &ValidationRules) -> bool {
    let value = descriptor.current_value.as_str();
    if value.is_empty() {
        return false;
    }
    match descriptor.declared_kind {
        FieldKind::Key => value.contains(rules.key_marker.as_str()),
        FieldKind::Email => looks_like_email(value),
        FieldKind::Generic => true,
    }
}

pub fn validate_field(field: &mut Field, rules: &ValidationRules) -> ValidationResult {
    let is_valid = classify(&field.descriptor, rules);
    field.set_tag(is_valid);
    ValidationResult {
        field_identifier: field.id().to_string(),
        is_valid,
    }
}

pub fn validate_form(form: &mut Form, rules: &ValidationRules) -> FormValidationResult {
    let mut per_field = BTreeMap::new();
    let mut all_valid = true;
    for field in form.fields.iter_mut().filter(|f| f.is_validatable()) {
        let result = validate_field(field, rules);
        // `&=` rather than `&&` keeps visiting after the first failure.
        all_valid &= result.is_valid;
        per_field.insert(result.field_identifier, result.is_valid);
    }
    debug!(
        "[PHASE: validation] [STEP: form] {} validated {} field(s), all_valid={}",
        form.name,
        per_field.len(),
        all_valid
    );
    FormValidationResult {
        all_valid,
        per_field,
    }
}

/// Blur/change on a single control. Returns None for controls that are not validated locally.
pub fn validate_on_blur(
    form: &mut Form,
    field_id: &str,
    rules: &ValidationRules,
) -> Option<ValidationResult> {
    let field = form.field_mut(field_id)?;
    if !field.is_validatable() {
        return None;
    }
    Some(validate_field(field, rules))
}
