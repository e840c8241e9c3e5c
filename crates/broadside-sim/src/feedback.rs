//! Per-tick audio and UI output collected by the systems.

use broadside_core::events::{AudioEvent, UiEvent};

#[derive(Debug, Default)]
pub struct Feedback {
    pub audio: Vec<AudioEvent>,
    pub ui: Vec<UiEvent>,
}

impl Feedback {
    /// Hand over everything collected since the last call.
    pub fn take(&mut self) -> (Vec<AudioEvent>, Vec<UiEvent>) {
        (
            std::mem::take(&mut self.audio),
            std::mem::take(&mut self.ui),
        )
    }
}
