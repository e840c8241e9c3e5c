//! Audio dispatch.
//!
//! The runner has no sound device. `AudioSink` keeps a decoded-buffer cache
//! keyed by sound path, the way a browser audio loader would, and logs each
//! one-shot playback.

use std::collections::HashMap;

use log::debug;

use broadside_core::events::AudioEvent;

/// A sound loaded once and replayed for every event that uses it.
#[derive(Debug, Clone)]
pub struct SoundBuffer {
    pub path: &'static str,
    pub plays: u32,
}

#[derive(Debug, Default)]
pub struct AudioSink {
    buffers: HashMap<&'static str, SoundBuffer>,
}

impl AudioSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play one event. Fire-and-forget.
    pub fn play(&mut self, event: &AudioEvent) {
        let path = event.path();
        let buffer = self.buffers.entry(path).or_insert_with(|| {
            debug!("loading sound {path}");
            SoundBuffer { path, plays: 0 }
        });
        buffer.plays += 1;
        debug!("play {path} at volume {:.1}", event.volume());
    }

    pub fn play_all<'a>(&mut self, events: impl IntoIterator<Item = &'a AudioEvent>) {
        for event in events {
            self.play(event);
        }
    }

    pub fn buffer(&self, path: &str) -> Option<&SoundBuffer> {
        self.buffers.get(path)
    }

    pub fn cached_buffers(&self) -> usize {
        self.buffers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadside_core::constants::{CANNON_FIRE_SOUND, EXPLOSION_SOUND};
    use broadside_core::enums::Shooter;
    use glam::Vec3;

    #[test]
    fn test_buffers_cached_per_path() {
        let mut sink = AudioSink::new();
        let fire = AudioEvent::CannonFire {
            shooter: Shooter::Player,
            position: Vec3::ZERO,
        };
        let boom = AudioEvent::Explosion {
            position: Vec3::ONE,
        };
        sink.play_all([&fire, &fire, &boom]);

        assert_eq!(sink.cached_buffers(), 2);
        assert_eq!(sink.buffer(CANNON_FIRE_SOUND).map(|b| b.plays), Some(2));
        assert_eq!(sink.buffer(EXPLOSION_SOUND).map(|b| b.plays), Some(1));
    }
}
