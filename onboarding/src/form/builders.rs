// Field layouts for the three onboarding forms.
// Field identifiers match the names the validation endpoints report errors against.

use super::{ControlKind, Field, FieldKind, Form};

pub const API_KEY_FORM: &str = "api-key-form";
pub const BASIC_INFO_FORM: &str = "basic-info-form";
pub const ORG_INFO_FORM: &str = "org-form";
pub const EMAIL_FORM: &str = "email-form";

/// Consent checkboxes read by the backend when a list is analyzed.
const API_KEY_CONSENTS: &[(&str, &str)] = &[
    (
        "store_aggregates",
        "Use my aggregate MailChimp data for benchmarking",
    ),
    (
        "monthly_updates",
        "I would like to receive monthly benchmarking updates",
    ),
];

const OTHER_AFFILIATION: &str = "other_affiliation";
const OTHER_AFFILIATION_NAME: &str = "other_affiliation_name";

/// Radio groups on the organization form: (id, label, choices).
pub const ORG_RADIO_GROUPS: &[(&str, &str, &[&str])] = &[
    (
        "financial_classification",
        "Financial Classification",
        &["For-Profit", "Non-Profit", "B Corp"],
    ),
    (
        "coverage_scope",
        "Coverage Scope",
        &["Hyperlocal", "City", "State", "National", "International"],
    ),
    (
        "coverage_focus",
        "Coverage Focus",
        &["Single Subject", "Investigative", "Multiple Subjects"],
    ),
    (
        "platform",
        "Publishing Platform",
        &["Digital Only", "Digital and Print", "Newsletter Only"],
    ),
    (
        "employee_range",
        "Number of Full-Time Employees",
        &["5 or fewer", "6-10", "11-20", "21-50", "More than 50"],
    ),
    (
        "budget",
        "Annual Budget",
        &[
            "Less than $500k",
            "$500k-$2m",
            "$2m-$10m",
            "$10m-$30m",
            "Greater than $30m",
        ],
    ),
];

const ORG_AFFILIATIONS: &[(&str, &str)] = &[
    ("news_revenue_hub", "News Revenue Hub"),
    ("institute_for_nonprofit_news", "Institute for Nonprofit News"),
    ("lion_publishers", "LION Publishers"),
    (OTHER_AFFILIATION, "Other"),
];

impl Form {
    /// API key form with the data-use consent boxes. The organization select only appears
    /// for users affiliated with at least one organization.
    pub fn api_key(has_organizations: bool) -> Form {
        let mut fields = vec![Field::new(
            "key",
            "API Key",
            FieldKind::Key,
            ControlKind::Text,
        )];
        if has_organizations {
            fields.push(Field::new(
                "organization",
                "Organization",
                FieldKind::Generic,
                ControlKind::Select,
            ));
        }
        fields.extend(API_KEY_CONSENTS.iter().map(|(id, label)| {
            Field::new(id, label, FieldKind::Generic, ControlKind::Checkbox)
        }));
        Form::new(API_KEY_FORM, fields)
    }

    pub fn basic_info() -> Form {
        Form::new(
            BASIC_INFO_FORM,
            vec![
                Field::new("name", "Name", FieldKind::Generic, ControlKind::Text),
                Field::new("email", "Email Address", FieldKind::Email, ControlKind::Text),
                Field::new(
                    "news_org",
                    "News Organization",
                    FieldKind::Generic,
                    ControlKind::Text,
                ),
            ],
        )
    }

    /// Where the analysis results are sent. Shown once a list has been queued.
    pub fn email() -> Form {
        Form::new(
            EMAIL_FORM,
            vec![Field::new(
                "email",
                "Email Address",
                FieldKind::Email,
                ControlKind::Text,
            )],
        )
    }

    pub fn org_info() -> Form {
        let mut fields: Vec<Field> = ORG_RADIO_GROUPS
            .iter()
            .map(|(id, label, _)| Field::new(id, label, FieldKind::Generic, ControlKind::Radio))
            .collect();
        fields.extend(ORG_AFFILIATIONS.iter().map(|(id, label)| {
            Field::new(id, label, FieldKind::Generic, ControlKind::Checkbox)
        }));
        fields.push(Field::new(
            OTHER_AFFILIATION_NAME,
            "Other",
            FieldKind::Generic,
            ControlKind::Text,
        ));
        let mut form = Form::new(ORG_INFO_FORM, fields);
        apply_dependencies(&mut form);
        form
    }
}

/// The free-text affiliation name only counts when "Other" is checked.
pub(crate) fn apply_dependencies(form: &mut Form) {
    let other_checked = form
        .field(OTHER_AFFILIATION)
        .map(|f| f.is_checked())
        .unwrap_or(false);
    if let Some(name) = form.field_mut(OTHER_AFFILIATION_NAME) {
        name.dormant = !other_checked;
        if name.dormant {
            name.clear_invalid();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_form_adds_organization_select_when_affiliated() {
        assert_eq!(Form::api_key(false).fields.len(), 3);
        assert!(Form::api_key(false).field("organization").is_none());
        let form = Form::api_key(true);
        assert_eq!(
            form.field("organization").map(|f| f.control),
            Some(ControlKind::Select)
        );
    }

    #[test]
    fn api_key_consents_post_only_when_checked() {
        let mut form = Form::api_key(false);
        form.set_value("key", "abc-us1");
        assert_eq!(
            form.payload(),
            vec![("key".to_string(), "abc-us1".to_string())]
        );

        assert!(form.set_checked("store_aggregates", true));
        assert_eq!(
            form.payload(),
            vec![
                ("key".to_string(), "abc-us1".to_string()),
                ("store_aggregates".to_string(), "y".to_string()),
            ]
        );

        form.set_checked("monthly_updates", true);
        form.set_checked("store_aggregates", false);
        let payload = form.payload();
        assert!(payload.contains(&("monthly_updates".to_string(), "y".to_string())));
        assert!(!payload.iter().any(|(id, _)| id == "store_aggregates"));
    }

    #[test]
    fn other_affiliation_name_follows_checkbox() {
        let mut form = Form::org_info();
        assert!(form.field(OTHER_AFFILIATION_NAME).is_some_and(|f| f.dormant));
        assert!(form.set_checked(OTHER_AFFILIATION, true));
        assert!(form.field(OTHER_AFFILIATION_NAME).is_some_and(|f| !f.dormant));
        form.set_checked(OTHER_AFFILIATION, false);
        assert!(form.field(OTHER_AFFILIATION_NAME).is_some_and(|f| f.dormant));
    }

    #[test]
    fn org_form_has_no_locally_validatable_fields_until_other_is_checked() {
        let mut form = Form::org_info();
        assert_eq!(form.fields.iter().filter(|f| f.is_validatable()).count(), 0);
        form.set_checked(OTHER_AFFILIATION, true);
        assert_eq!(form.fields.iter().filter(|f| f.is_validatable()).count(), 1);
    }
}
