#![forbid(unsafe_code)]

//! The form navigator/validator.
//!
//! [`FormNavigator`] owns every field of the form in document order, the
//! panels that group them, the single active panel, and input focus. It gates
//! forward navigation and submission on field validity and keeps one
//! conditional field dependency (smoker → cigarettes per day) reconciled.
//!
//! # Invariants
//!
//! 1. A form with panels has exactly one active panel; `show_panel` is the
//!    only way it changes. A form without panels has none and ignores navigation.
//! 2. Validating a disabled field reports valid and leaves its error slot alone.
//! 3. Focus, when set, points at a focusable field of the active panel.
//!
//! # Failure Modes
//!
//! | Scenario | Behavior |
//! |----------|----------|
//! | Unknown panel id | `show_panel` is a no-op |
//! | `next()` with invalid fields | stays on the panel, errors rendered |
//! | `submit()` with invalid fields | cancelled, first offending panel shown |
//! | Unknown field name | validation reports valid, nothing mutated |

use std::collections::BTreeMap;

use cardio_core::event::{KeyCode, KeyEvent};
use tracing::debug;

use crate::field::{Field, FieldKind};
use crate::panel::{Panel, PanelPresentation, PanelSpec, Tab};
use crate::validity::FieldValidity;

/// Submitted values keyed by field name. Disabled fields are left out.
pub type FormValues = BTreeMap<String, String>;

/// What happened to a key handed to [`FormNavigator::handle_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The key was swallowed (confirmation key inside a numeric field).
    Suppressed,
    /// The focused field consumed the key as an edit.
    Edited,
    /// The navigator did not use the key; the caller applies its default.
    PassThrough,
}

/// Why a submission was cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitBlocked {
    /// First invalid field in document order.
    pub field: String,
    /// Panel that contains it (now active).
    pub panel: String,
    /// Number of invalid fields across the form.
    pub invalid_count: usize,
}

/// A boolean trigger field that enables, and requires, a dependent field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDependency {
    /// Field whose value decides.
    pub trigger: String,
    /// Field that is enabled or disabled.
    pub dependent: String,
    /// Trigger value that enables the dependent.
    pub enabling_value: String,
}

impl FieldDependency {
    pub fn new(
        trigger: impl Into<String>,
        dependent: impl Into<String>,
        enabling_value: impl Into<String>,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            dependent: dependent.into(),
            enabling_value: enabling_value.into(),
        }
    }
}

/// Tabbed multi-panel form with validation-gated navigation.
#[derive(Debug, Clone)]
pub struct FormNavigator {
    fields: Vec<Field>,
    panels: Vec<Panel>,
    active: usize,
    focus: Option<usize>,
    dependency: Option<FieldDependency>,
}

impl FormNavigator {
    /// Build a navigator from panel declarations. The first panel starts active.
    pub fn new(specs: Vec<PanelSpec>) -> Self {
        let mut fields = Vec::new();
        let mut panels = Vec::with_capacity(specs.len());
        for (ordinal, spec) in specs.into_iter().enumerate() {
            let start = fields.len();
            fields.extend(spec.fields);
            panels.push(Panel {
                id: spec.id,
                title: spec.title,
                ordinal,
                fields: start..fields.len(),
            });
        }
        let mut nav = Self {
            fields,
            panels,
            active: 0,
            focus: None,
            dependency: None,
        };
        nav.focus = nav.first_focusable(0);
        nav
    }

    /// Attach the conditional dependency and reconcile it against the
    /// trigger's current value.
    #[must_use]
    pub fn with_dependency(mut self, dependency: FieldDependency) -> Self {
        self.dependency = Some(dependency);
        self.reconcile_dependency();
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// All fields in document order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// All panels in order.
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// The active panel. `None` only for a form built without panels.
    pub fn active_panel(&self) -> Option<&Panel> {
        self.panels.get(self.active)
    }

    /// Ordinal of the active panel.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Whether `id` names the active panel.
    pub fn is_active(&self, id: &str) -> bool {
        self.active_panel().is_some_and(|p| p.id == id)
    }

    /// Whether the active panel is the last one.
    pub fn on_last_panel(&self) -> bool {
        self.active + 1 == self.panels.len()
    }

    /// Presentation flags of panel `ordinal`.
    pub fn presentation(&self, ordinal: usize) -> PanelPresentation {
        PanelPresentation::new(ordinal == self.active)
    }

    /// The tab strip, mirroring the active panel.
    pub fn tabs(&self) -> Vec<Tab> {
        self.panels
            .iter()
            .map(|p| Tab {
                target: p.id.clone(),
                title: p.title.clone(),
                selected: p.ordinal == self.active,
            })
            .collect()
    }

    /// Fields of the active panel.
    pub fn active_fields(&self) -> &[Field] {
        match self.active_panel() {
            Some(panel) => &self.fields[panel.fields.clone()],
            None => &[],
        }
    }

    /// The focused field.
    pub fn focused(&self) -> Option<&Field> {
        self.focus.and_then(|i| self.fields.get(i))
    }

    /// Name of the panel containing `field`.
    pub fn panel_of(&self, field: &str) -> Option<&Panel> {
        let idx = self.field_index(field)?;
        self.panels.iter().find(|p| p.fields.contains(&idx))
    }

    // -------------------------------------------------------------------------
    // Panels
    // -------------------------------------------------------------------------

    /// Activate the panel `target`, deactivate the rest, and focus its first
    /// focusable field. Returns `false` (and changes nothing) for unknown ids.
    pub fn show_panel(&mut self, target: &str) -> bool {
        let Some(ordinal) = self.panels.iter().position(|p| p.id == target) else {
            debug!(target, "show_panel: unknown panel");
            return false;
        };
        self.active = ordinal;
        self.focus = self.first_focusable(ordinal);
        debug!(panel = target, "panel shown");
        true
    }

    /// Advance to the next panel if the current one validates.
    pub fn next(&mut self) -> bool {
        if self.panels.is_empty() {
            return false;
        }
        if !self.validate_panel_at(self.active) {
            debug!(panel = self.active, "next blocked by invalid fields");
            return false;
        }
        match self.panels.get(self.active + 1) {
            Some(next) => {
                let id = next.id.clone();
                self.show_panel(&id)
            }
            None => false,
        }
    }

    /// Go back one panel. No validation.
    pub fn prev(&mut self) -> bool {
        if self.active == 0 {
            return false;
        }
        let id = self.panels[self.active - 1].id.clone();
        self.show_panel(&id)
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Re-validate one field and render the outcome next to it.
    ///
    /// Disabled fields report valid and are not touched.
    pub fn validate_field(&mut self, name: &str) -> FieldValidity {
        match self.field_index(name) {
            Some(idx) => self.validate_index(idx),
            None => FieldValidity::Valid,
        }
    }

    fn validate_index(&mut self, idx: usize) -> FieldValidity {
        let field = &mut self.fields[idx];
        if field.disabled {
            return FieldValidity::Valid;
        }
        field.clear_error();
        let validity = field.check_validity();
        if let Some(error) = validity.error() {
            field.show_error(error);
        }
        validity
    }

    /// Validate every non-disabled field of panel `id`.
    ///
    /// Unknown ids validate trivially.
    pub fn validate_panel(&mut self, id: &str) -> bool {
        match self.panels.iter().position(|p| p.id == id) {
            Some(ordinal) => self.validate_panel_at(ordinal),
            None => true,
        }
    }

    fn validate_panel_at(&mut self, ordinal: usize) -> bool {
        let Some(range) = self.panels.get(ordinal).map(|p| p.fields.clone()) else {
            return true;
        };
        let mut ok = true;
        for idx in range {
            // Every field is visited so each one renders or clears its error.
            ok &= self.validate_index(idx).is_valid();
        }
        ok
    }

    /// Validate the whole form and collect values.
    ///
    /// On failure the submission is cancelled and the panel holding the first
    /// invalid field (document order) becomes active.
    pub fn submit(&mut self) -> Result<FormValues, SubmitBlocked> {
        let mut first_invalid = None;
        let mut invalid_count = 0;
        for idx in 0..self.fields.len() {
            if self.validate_index(idx).is_invalid() {
                invalid_count += 1;
                first_invalid.get_or_insert(idx);
            }
        }
        let Some(idx) = first_invalid else {
            debug!(fields = self.fields.len(), "form submitted");
            return Ok(self.values());
        };
        let field = self.fields[idx].name.clone();
        let panel = self
            .panels
            .iter()
            .find(|p| p.fields.contains(&idx))
            .map(|p| p.id.clone())
            .unwrap_or_default();
        self.show_panel(&panel);
        self.focus = Some(idx);
        debug!(%field, %panel, invalid_count, "submission cancelled");
        Err(SubmitBlocked {
            field,
            panel,
            invalid_count,
        })
    }

    /// Current values of every enabled field.
    pub fn values(&self) -> FormValues {
        self.fields
            .iter()
            .filter(|f| !f.disabled)
            .map(|f| (f.name.clone(), f.value.trim().to_string()))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// Apply an input/change event to field `name`.
    ///
    /// Numeric and select fields live-validate on every input. A change of the
    /// dependency trigger reconciles the dependent field first.
    pub fn input(&mut self, name: &str, value: impl Into<String>) -> FieldValidity {
        let Some(idx) = self.field_index(name) else {
            return FieldValidity::Valid;
        };
        if self.fields[idx].disabled {
            return FieldValidity::Valid;
        }
        self.fields[idx].value = value.into();
        let is_trigger = self
            .dependency
            .as_ref()
            .is_some_and(|d| d.trigger == name);
        if is_trigger {
            self.reconcile_dependency();
        }
        self.validate_index(idx)
    }

    /// Enable/require or disable/clear the dependent field according to the
    /// trigger's current value.
    pub fn reconcile_dependency(&mut self) {
        let Some(dep) = self.dependency.clone() else {
            return;
        };
        let enabled = self
            .field(&dep.trigger)
            .is_some_and(|f| f.value.trim() == dep.enabling_value);
        let Some(idx) = self.field_index(&dep.dependent) else {
            return;
        };
        let field = &mut self.fields[idx];
        if enabled {
            field.disabled = false;
            field.required = true;
        } else {
            field.disabled = true;
            field.required = false;
            field.value.clear();
            field.clear_error();
            if self.focus == Some(idx) {
                self.focus = self.first_focusable(self.active);
            }
        }
        debug!(dependent = %dep.dependent, enabled, "dependency reconciled");
    }

    // -------------------------------------------------------------------------
    // Keys & focus
    // -------------------------------------------------------------------------

    /// Route a key to the focused field.
    ///
    /// The confirmation key is suppressed inside numeric fields so it cannot
    /// submit the form from there. Printable keys and Backspace edit numeric
    /// fields; Left/Right cycle select options. Everything else passes through.
    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyDisposition {
        if !key.is_activation() {
            return KeyDisposition::PassThrough;
        }
        let Some(idx) = self.focus else {
            return KeyDisposition::PassThrough;
        };
        let name = self.fields[idx].name.clone();
        match (&self.fields[idx].kind, key.code) {
            (FieldKind::Number { .. }, KeyCode::Enter) => KeyDisposition::Suppressed,
            (FieldKind::Number { .. }, KeyCode::Char(c)) if !key.ctrl() && !key.alt() => {
                let mut value = self.fields[idx].value.clone();
                value.push(c);
                self.input(&name, value);
                KeyDisposition::Edited
            }
            (FieldKind::Number { .. }, KeyCode::Backspace) => {
                let mut value = self.fields[idx].value.clone();
                value.pop();
                self.input(&name, value);
                KeyDisposition::Edited
            }
            (FieldKind::Select { options }, KeyCode::Left | KeyCode::Right) => {
                if options.is_empty() {
                    return KeyDisposition::PassThrough;
                }
                let current = options.iter().position(|o| o.value == self.fields[idx].value);
                let len = options.len();
                let next = match (current, key.code) {
                    (None, KeyCode::Left) => len - 1,
                    (None, _) => 0,
                    (Some(i), KeyCode::Left) => i.checked_sub(1).unwrap_or(len - 1),
                    (Some(i), _) => (i + 1) % len,
                };
                let value = options[next].value.clone();
                self.input(&name, value);
                KeyDisposition::Edited
            }
            _ => KeyDisposition::PassThrough,
        }
    }

    /// Move focus to the next focusable field of the active panel (wrapping).
    pub fn focus_next(&mut self) {
        self.step_focus(true);
    }

    /// Move focus to the previous focusable field of the active panel (wrapping).
    pub fn focus_prev(&mut self) {
        self.step_focus(false);
    }

    /// Focus field `name` if it is focusable and on the active panel.
    pub fn focus_field(&mut self, name: &str) -> bool {
        match self.field_index(name) {
            Some(idx)
                if self.active_panel().is_some_and(|p| p.fields.contains(&idx))
                    && self.fields[idx].is_focusable() =>
            {
                self.focus = Some(idx);
                true
            }
            _ => false,
        }
    }

    fn step_focus(&mut self, forward: bool) {
        let candidates: Vec<usize> = self
            .active_panel()
            .map(|p| p.fields.clone())
            .unwrap_or_default()
            .filter(|&i| self.fields[i].is_focusable())
            .collect();
        if candidates.is_empty() {
            self.focus = None;
            return;
        }
        let pos = self
            .focus
            .and_then(|f| candidates.iter().position(|&c| c == f));
        let next = match (pos, forward) {
            (None, _) => 0,
            (Some(p), true) => (p + 1) % candidates.len(),
            (Some(p), false) => p.checked_sub(1).unwrap_or(candidates.len() - 1),
        };
        self.focus = Some(candidates[next]);
    }

    fn first_focusable(&self, ordinal: usize) -> Option<usize> {
        self.panels
            .get(ordinal)?
            .fields
            .clone()
            .find(|&i| self.fields[i].is_focusable())
    }
}
