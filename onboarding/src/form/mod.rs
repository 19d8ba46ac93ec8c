//! In-memory form representation.
//!
//! This is the controller's view of a page: fields with a declared kind, a control type,
//! a current value and a visual tag, plus the listener sets that stand in for event
//! handler registration. Rendering is somebody else's job; everything here is plain state.

pub mod builders;

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a registered event handler. Reattaching must use the id captured at detach time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    pub fn fresh() -> Self {
        HandlerId(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Handlers attached to one event source (a form's submit, a row's click, a toggle's change).
///
/// Attach and detach are idempotent: attaching twice keeps a single registration and
/// detaching an absent handler is a no-op. Both report whether anything changed.
#[derive(Debug, Clone, Default)]
pub struct ListenerSet {
    attached: Vec<HandlerId>,
}

impl ListenerSet {
    pub fn attach(&mut self, handler: HandlerId) -> bool {
        if self.attached.contains(&handler) {
            return false;
        }
        self.attached.push(handler);
        true
    }

    pub fn detach(&mut self, handler: HandlerId) -> bool {
        let before = self.attached.len();
        self.attached.retain(|h| *h != handler);
        before != self.attached.len()
    }

    pub fn is_attached(&self, handler: HandlerId) -> bool {
        self.attached.contains(&handler)
    }

    pub fn count(&self) -> usize {
        self.attached.len()
    }
}

/// Validation rule selector, read from the field's `custom_type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Key,
    Email,
    Generic,
}

impl FieldKind {
    pub fn from_attr(attr: Option<&str>) -> Self {
        match attr.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("key") => FieldKind::Key,
            Some("email") => FieldKind::Email,
            _ => FieldKind::Generic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Select,
    Checkbox,
    Radio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTag {
    Valid,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub identifier: String,
    pub declared_kind: FieldKind,
    pub current_value: String,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub descriptor: FieldDescriptor,
    pub control: ControlKind,
    pub label: String,
    /// Locked while a submission is outstanding.
    pub disabled: bool,
    /// Switched off by another control; neither validated nor submitted.
    pub dormant: bool,
    tag: Option<FieldTag>,
    wrapper_tag: Option<FieldTag>,
}

impl Field {
    pub fn new(id: &str, label: &str, kind: FieldKind, control: ControlKind) -> Self {
        Self {
            descriptor: FieldDescriptor {
                identifier: id.to_string(),
                declared_kind: kind,
                current_value: String::new(),
            },
            control,
            label: label.to_string(),
            disabled: false,
            dormant: false,
            tag: None,
            wrapper_tag: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.identifier
    }

    pub fn value(&self) -> &str {
        &self.descriptor.current_value
    }

    pub fn tag(&self) -> Option<FieldTag> {
        self.tag
    }

    pub fn wrapper_tag(&self) -> Option<FieldTag> {
        self.wrapper_tag
    }

    /// Tags the field and its wrapper together, replacing any previous tag.
    pub fn set_tag(&mut self, valid: bool) {
        let tag = if valid {
            FieldTag::Valid
        } else {
            FieldTag::Invalid
        };
        self.tag = Some(tag);
        self.wrapper_tag = Some(tag);
    }

    pub fn clear_invalid(&mut self) {
        if self.tag == Some(FieldTag::Invalid) {
            self.tag = None;
        }
        if self.wrapper_tag == Some(FieldTag::Invalid) {
            self.wrapper_tag = None;
        }
    }

    pub fn is_checked(&self) -> bool {
        self.control == ControlKind::Checkbox && !self.descriptor.current_value.is_empty()
    }

    /// Checkboxes and radios are never validated client-side.
    pub fn is_validatable(&self) -> bool {
        !self.dormant && matches!(self.control, ControlKind::Text | ControlKind::Select)
    }
}

/// Which controls a form locks while a submission is outstanding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlScope {
    All,
    Only(Vec<String>),
}

impl ControlScope {
    fn covers(&self, field_id: &str) -> bool {
        match self {
            ControlScope::All => true,
            ControlScope::Only(ids) => ids.iter().any(|id| id == field_id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Form {
    pub name: String,
    pub fields: Vec<Field>,
    pub submit_listeners: ListenerSet,
    submit_enabled: bool,
    /// Set on the key wrapper once the key is accepted and lists are loading.
    pub fetching: bool,
}

impl Form {
    pub fn new(name: &str, fields: Vec<Field>) -> Self {
        Self {
            name: name.to_string(),
            fields,
            submit_listeners: ListenerSet::default(),
            submit_enabled: true,
            fetching: false,
        }
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id() == id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id() == id)
    }

    /// Sets a field's value. Returns false for an unknown field or a locked control.
    pub fn set_value(&mut self, id: &str, value: &str) -> bool {
        match self.field_mut(id) {
            Some(field) if !field.disabled => {
                field.descriptor.current_value = value.to_string();
                true
            }
            _ => false,
        }
    }

    /// Checks or unchecks a checkbox and re-evaluates dependent dormant fields.
    pub fn set_checked(&mut self, id: &str, checked: bool) -> bool {
        let changed = match self.field_mut(id) {
            Some(field) if field.control == ControlKind::Checkbox && !field.disabled => {
                field.descriptor.current_value = if checked { "y" } else { "" }.to_string();
                true
            }
            _ => false,
        };
        if changed {
            builders::apply_dependencies(self);
        }
        changed
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn disable_controls(&mut self, scope: &ControlScope) {
        self.submit_enabled = false;
        for field in self.fields.iter_mut().filter(|f| scope.covers(f.id())) {
            field.disabled = true;
        }
    }

    pub fn enable_controls(&mut self, scope: &ControlScope) {
        for field in self.fields.iter_mut().filter(|f| scope.covers(f.id())) {
            field.disabled = false;
        }
        self.submit_enabled = true;
    }

    pub fn clear_invalid_tags(&mut self) {
        for field in &mut self.fields {
            field.clear_invalid();
        }
    }

    /// Tags a named field invalid. Returns false if no such field exists.
    pub fn tag_invalid(&mut self, id: &str) -> bool {
        match self.field_mut(id) {
            Some(field) => {
                field.set_tag(false);
                true
            }
            None => false,
        }
    }

    pub fn invalid_field_ids(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.tag() == Some(FieldTag::Invalid))
            .map(|f| f.id().to_string())
            .collect()
    }

    /// Form-encoded payload: text/select values as entered, checked boxes as `y`,
    /// chosen radios only, dormant fields omitted.
    pub fn payload(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter(|f| !f.dormant)
            .filter(|f| match f.control {
                ControlKind::Text | ControlKind::Select => true,
                ControlKind::Checkbox | ControlKind::Radio => !f.value().is_empty(),
            })
            .map(|f| (f.id().to_string(), f.value().to_string()))
            .collect()
    }
}
