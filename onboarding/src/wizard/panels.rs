// Panel filmstrip
//
// All panels share one horizontal offset. Shifting reads the first panel's offset and writes
// the new one to every panel. Bounds are the caller's responsibility.

use log::{debug, info};

use crate::models::state::WizardState;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelTransform {
    offset: Option<f64>,
}

impl PanelTransform {
    pub fn offset(&self) -> Option<f64> {
        self.offset
    }
}

#[derive(Debug, Clone)]
pub struct PanelTransitionManager {
    panels: Vec<PanelTransform>,
    unit: f64,
    unit_suffix: String,
    initial_offset: f64,
}

impl PanelTransitionManager {
    pub fn new(panel_count: usize, unit: f64, unit_suffix: &str, initial_offset: f64) -> Self {
        Self {
            panels: vec![PanelTransform::default(); panel_count],
            unit,
            unit_suffix: unit_suffix.to_string(),
            initial_offset,
        }
    }

    pub fn panels(&self) -> &[PanelTransform] {
        &self.panels
    }

    pub fn current_offset(&self) -> f64 {
        self.panels
            .first()
            .and_then(|p| p.offset)
            .unwrap_or(self.initial_offset)
    }

    /// Move by `delta` panels (positive = forward, i.e. further left). Returns the new offset.
    pub fn shift(&mut self, delta: i32, state: &mut WizardState) -> f64 {
        let next = self.current_offset() - f64::from(delta) * self.unit;
        for panel in &mut self.panels {
            panel.offset = Some(next);
        }
        state.move_panel(delta);
        debug!(
            "[PHASE: panels] [STEP: shift] delta={} offset={} panel_index={}",
            delta, next, state.current_panel_index
        );
        next
    }

    pub fn advance(&mut self, state: &mut WizardState) -> f64 {
        self.shift(1, state)
    }

    pub fn retreat(&mut self, state: &mut WizardState) -> f64 {
        self.shift(-1, state)
    }

    /// CSS transform for the current offset, e.g. `translateX(-200vw)`.
    pub fn css_transform(&self) -> String {
        format!("translateX({}{})", self.current_offset(), self.unit_suffix)
    }
}

/// Terms checkbox on the first panel. Accepting advances the filmstrip once.
#[derive(Debug, Default)]
pub struct TermsAgreement {
    accepted: bool,
    nav_visible: bool,
}

impl TermsAgreement {
    pub fn accept(&mut self, panels: &mut PanelTransitionManager, state: &mut WizardState) -> bool {
        if self.accepted {
            return false;
        }
        self.accepted = true;
        panels.advance(state);
        self.nav_visible = true;
        info!("[PHASE: terms] [STEP: accept] Terms accepted");
        true
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    pub fn nav_visible(&self) -> bool {
        self.nav_visible
    }
}
