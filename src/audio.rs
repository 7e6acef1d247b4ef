//! Sound event seam
//!
//! The simulation only says *what* happened; synthesis belongs to the host's
//! [`AudioSink`].

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// A tank fired
    ShotFired,
    /// A tank was hit or destroyed
    Explosion,
}

/// Host audio backend
pub trait AudioSink {
    /// Play `effect` at `volume` (0.0 - 1.0)
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Volume controls applied before effects reach the sink
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSettings {
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl AudioSettings {
    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

/// Sound for a tick event, with its relative loudness
pub fn sound_for(event: &GameEvent) -> Option<(SoundEffect, f32)> {
    match event {
        GameEvent::ShotFired { .. } => Some((SoundEffect::ShotFired, 0.6)),
        GameEvent::Explosion { big: true, .. } => Some((SoundEffect::Explosion, 1.0)),
        GameEvent::Explosion { big: false, .. } => Some((SoundEffect::Explosion, 0.4)),
        _ => None,
    }
}

/// Forward a tick's events to `sink`
pub fn play_events<S: AudioSink + ?Sized>(events: &[GameEvent], settings: &AudioSettings, sink: &mut S) {
    let volume = settings.effective_volume();
    if volume <= 0.0 {
        return;
    }
    for (effect, loudness) in events.iter().filter_map(sound_for) {
        sink.play(effect, volume * loudness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::CombatantId;
    use glam::Vec2;

    #[derive(Default)]
    struct Recorder(Vec<(SoundEffect, f32)>);

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect, volume: f32) {
            self.0.push((effect, volume));
        }
    }

    fn events() -> Vec<GameEvent> {
        vec![
            GameEvent::ShotFired {
                owner: CombatantId(1),
                pos: Vec2::ZERO,
            },
            GameEvent::WaveStarted { stage: 0 },
            GameEvent::Explosion {
                pos: Vec2::ZERO,
                big: true,
            },
        ]
    }

    #[test]
    fn test_events_map_to_sounds() {
        let mut sink = Recorder::default();
        let settings = AudioSettings {
            master_volume: 1.0,
            ..Default::default()
        };
        play_events(&events(), &settings, &mut sink);
        assert_eq!(
            sink.0,
            vec![(SoundEffect::ShotFired, 0.6), (SoundEffect::Explosion, 1.0)]
        );
    }

    #[test]
    fn test_muted_plays_nothing() {
        let mut sink = Recorder::default();
        let settings = AudioSettings {
            muted: true,
            ..Default::default()
        };
        play_events(&events(), &settings, &mut sink);
        assert!(sink.0.is_empty());
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut settings = AudioSettings::default();
        settings.set_master_volume(3.0);
        settings.set_sfx_volume(-1.0);
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.sfx_volume, 0.0);
        NullAudio.play(SoundEffect::Explosion, 1.0);
    }
}
