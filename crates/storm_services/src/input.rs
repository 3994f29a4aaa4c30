//! Input classification
//!
//! Platform events arrive already translated into [`InputEvent`]; this module
//! decides what each one does to the population.

use rand::Rng;
use storm_core::SpritePopulation;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Adds a batch at the press point.
    Primary,
    /// Removes the newest batch.
    Secondary,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Press position in simulation coordinates.
    PointerPressed { button: PointerButton, x: f32, y: f32 },
    /// Close request or Escape.
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Continue,
    Quit,
}

/// Apply one input event to the population.
pub fn apply<R: Rng>(event: InputEvent, population: &mut SpritePopulation<R>) -> InputOutcome {
    match event {
        InputEvent::PointerPressed {
            button: PointerButton::Primary,
            x,
            y,
        } => {
            population.add_batch(x, y);
            InputOutcome::Continue
        }
        InputEvent::PointerPressed {
            button: PointerButton::Secondary,
            ..
        } => {
            population.remove_batch();
            InputOutcome::Continue
        }
        InputEvent::PointerPressed {
            button: PointerButton::Other,
            ..
        } => InputOutcome::Continue,
        InputEvent::Quit => {
            debug!(sprites = population.len(), "quit requested");
            InputOutcome::Quit
        }
    }
}
