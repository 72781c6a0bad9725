//! Selection trigger: a selection asks for an explanation only when the configured modifier
//! key was held at the moment the mouse went down.
//!
//! Input adapters feed key and mouse events into [`TriggerState`]; it owns the modifier state
//! so nothing global tracks the keyboard.

use crate::core::page::Selection;
use crate::core::settings::TriggerKey;

/// Modifier keys reported with a key event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn is_held(&self, key: TriggerKey) -> bool {
        match key {
            TriggerKey::Ctrl => self.ctrl,
            TriggerKey::Alt => self.alt,
            TriggerKey::Shift => self.shift,
            TriggerKey::Meta => self.meta,
        }
    }
}

/// Input events relevant to triggering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Modifiers),
    KeyUp(Modifiers),
    MouseDown,
    /// Mouse released; carries the current selection text (possibly empty).
    MouseUp(String),
}

/// What to do once a selection gesture finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Explain(Selection),
    /// No trigger or empty selection: hide any open explanation.
    Dismiss,
}

#[derive(Debug, Clone)]
pub struct TriggerState {
    trigger_key: TriggerKey,
    modifiers: Modifiers,
    armed: bool,
}

impl TriggerState {
    pub fn new(trigger_key: TriggerKey) -> Self {
        Self {
            trigger_key,
            modifiers: Modifiers::default(),
            armed: false,
        }
    }

    pub fn trigger_key(&self) -> TriggerKey {
        self.trigger_key
    }

    /// Follow a settings change.
    pub fn set_trigger_key(&mut self, key: TriggerKey) {
        self.trigger_key = key;
    }

    /// Feed one event. Only `MouseUp` produces an outcome.
    pub fn apply(&mut self, event: InputEvent) -> Option<SelectionOutcome> {
        match event {
            InputEvent::KeyDown(mods) | InputEvent::KeyUp(mods) => {
                self.modifiers = mods;
                None
            }
            InputEvent::MouseDown => {
                self.armed = self.modifiers.is_held(self.trigger_key);
                None
            }
            InputEvent::MouseUp(text) => Some(self.finish_selection(&text)),
        }
    }

    fn finish_selection(&mut self, raw_text: &str) -> SelectionOutcome {
        let selection = Selection::new(raw_text);
        let outcome = if self.armed && !selection.is_empty() {
            SelectionOutcome::Explain(selection)
        } else {
            SelectionOutcome::Dismiss
        };
        self.armed = false;
        outcome
    }
}
