//! Action-based input for time control and matter bending
//!
//! Raw winit events are mapped to [`InputAction`]s; [`TimeControlInput`]
//! turns the switch actions into controller calls.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tempora_core::Dimension;
use tempora_timeline::{SwitchOutcome, TimelineController, TimelineHost};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// T by default
    SwitchToPast,
    /// R by default
    SwitchToPresent,
    /// Y by default
    SwitchToFuture,
    /// Pick up or use what is in front of the player (E)
    Interact,
    /// Raise matter from the ground (F)
    SpawnMatter,
    /// Select the next matter variant (Q)
    CycleVariant,
    /// Sink the targeted object (right mouse button)
    SinkMatter,
}

impl InputAction {
    /// Dimension requested by a switch action
    pub fn dimension(self) -> Option<Dimension> {
        match self {
            Self::SwitchToPast => Some(Dimension::Past),
            Self::SwitchToPresent => Some(Dimension::Present),
            Self::SwitchToFuture => Some(Dimension::Future),
            _ => None,
        }
    }
}

/// Per-frame action state
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub held: HashSet<InputAction>,
    pub just_pressed: HashSet<InputAction>,
    pub just_released: HashSet<InputAction>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        self.just_pressed.contains(&action)
    }

    pub fn is_just_released(&self, action: InputAction) -> bool {
        self.just_released.contains(&action)
    }

    /// Forget edge-triggered actions (call at end of frame)
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    fn apply(&mut self, action: InputAction, element_state: ElementState) {
        match element_state {
            ElementState::Pressed => {
                if self.held.insert(action) {
                    self.just_pressed.insert(action);
                }
            }
            ElementState::Released => {
                self.held.remove(&action);
                self.just_released.insert(action);
            }
        }
    }
}

/// A physical input that can trigger an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputBinding {
    Key(KeyCode),
    /// 0 = left, 1 = right, 2 = middle
    Mouse(u32),
}

impl From<KeyCode> for InputBinding {
    fn from(key: KeyCode) -> Self {
        Self::Key(key)
    }
}

impl From<MouseButton> for InputBinding {
    fn from(button: MouseButton) -> Self {
        let id = match button {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
            MouseButton::Back => 3,
            MouseButton::Forward => 4,
            MouseButton::Other(id) => id as u32,
        };
        Self::Mouse(id)
    }
}

#[derive(Debug, Clone)]
pub struct InputBindings {
    bindings: HashMap<InputBinding, InputAction>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
        };

        bindings.bind(KeyCode::KeyT, InputAction::SwitchToPast);
        bindings.bind(KeyCode::KeyR, InputAction::SwitchToPresent);
        bindings.bind(KeyCode::KeyY, InputAction::SwitchToFuture);

        bindings.bind(KeyCode::KeyE, InputAction::Interact);
        bindings.bind(KeyCode::KeyF, InputAction::SpawnMatter);
        bindings.bind(KeyCode::KeyQ, InputAction::CycleVariant);
        bindings.bind(MouseButton::Right, InputAction::SinkMatter);

        bindings
    }
}

impl InputBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key or mouse button, replacing its previous action
    pub fn bind(&mut self, binding: impl Into<InputBinding>, action: InputAction) {
        self.bindings.insert(binding.into(), action);
    }

    pub fn unbind(&mut self, binding: impl Into<InputBinding>) -> Option<InputAction> {
        self.bindings.remove(&binding.into())
    }

    pub fn action_for(&self, binding: impl Into<InputBinding>) -> Option<InputAction> {
        self.bindings.get(&binding.into()).copied()
    }

    /// Every binding that triggers `action`
    pub fn bindings_for(&self, action: InputAction) -> Vec<InputBinding> {
        self.bindings
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(binding, _)| *binding)
            .collect()
    }
}

/// Feeds raw window events into an [`InputState`]
#[derive(Debug, Default)]
pub struct InputHandler {
    pub state: InputState,
    pub bindings: InputBindings,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_keyboard(&mut self, physical_key: PhysicalKey, element_state: ElementState) {
        if let PhysicalKey::Code(key) = physical_key {
            if let Some(action) = self.bindings.action_for(key) {
                self.state.apply(action, element_state);
            }
        }
    }

    pub fn handle_mouse_button(&mut self, button: MouseButton, element_state: ElementState) {
        if let Some(action) = self.bindings.action_for(button) {
            self.state.apply(action, element_state);
        }
    }

    pub fn end_frame(&mut self) {
        self.state.clear_frame();
    }
}

/// Maps the three switch actions onto the controller
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeControlInput;

impl TimeControlInput {
    const SWITCHES: [InputAction; 3] = [
        InputAction::SwitchToPast,
        InputAction::SwitchToPresent,
        InputAction::SwitchToFuture,
    ];

    /// Issue at most one switch for this frame.
    ///
    /// Does nothing until time control has been acquired. When several
    /// switch keys went down in the same frame the earliest dimension wins.
    pub fn poll<H: TimelineHost>(
        &self,
        state: &InputState,
        controller: &mut TimelineController,
        host: &mut H,
    ) -> Option<SwitchOutcome> {
        if !controller.switching_enabled() {
            return None;
        }
        let dimension = Self::SWITCHES
            .into_iter()
            .find(|action| state.is_just_pressed(*action))
            .and_then(InputAction::dimension)?;
        Some(controller.switch_to(host, dimension))
    }
}
