//! Effect sinks: the engine's only path to the viewport and the mixer.
//!
//! The engine never renders or plays audio itself.  It reports what changed
//! and what should be heard through [`EffectSink`], whose methods default to
//! doing nothing so an implementation only overrides what it consumes.

use lm_core::{Pos3, TileRect};

/// Zoom level the engine invalidates moving vehicles at.
pub const ZOOM_VEHICLE: u8 = 3;

/// Frequency hint for sounds that play at their recorded rate.
pub const NATIVE_FREQUENCY: i32 = 22050;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SoundId {
    /// Crossing whistle; the variant is drawn from the simulation RNG.
    Whistle(u8),
    Explode,
    Splash,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum VisualEffect {
    ExplosionCloud,
    Splash,
}

pub trait EffectSink {
    /// The tiles in `rect` need redrawing at `zoom`.
    fn invalidate(&mut self, _rect: TileRect, _zoom: u8) {}

    fn play_sound(&mut self, _sound: SoundId, _pos: Pos3, _volume: i32, _frequency: i32) {}

    fn spawn_effect(&mut self, _effect: VisualEffect, _pos: Pos3) {}
}

/// Discards every effect.
pub struct NoopSink;

impl EffectSink for NoopSink {}

/// One recorded effect.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Effect {
    Invalidate { rect: TileRect, zoom: u8 },
    Sound { sound: SoundId, pos: Pos3, volume: i32, frequency: i32 },
    Visual { effect: VisualEffect, pos: Pos3 },
}

/// Keeps every effect in arrival order, for replay comparison and tests.
#[derive(Default, Debug)]
pub struct EffectLog {
    pub effects: Vec<Effect>,
}

impl EffectLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sounds(&self) -> impl Iterator<Item = SoundId> + '_ {
        self.effects.iter().filter_map(|e| match e {
            Effect::Sound { sound, .. } => Some(*sound),
            _ => None,
        })
    }

    pub fn visuals(&self) -> impl Iterator<Item = VisualEffect> + '_ {
        self.effects.iter().filter_map(|e| match e {
            Effect::Visual { effect, .. } => Some(*effect),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

impl EffectSink for EffectLog {
    fn invalidate(&mut self, rect: TileRect, zoom: u8) {
        self.effects.push(Effect::Invalidate { rect, zoom });
    }

    fn play_sound(&mut self, sound: SoundId, pos: Pos3, volume: i32, frequency: i32) {
        self.effects.push(Effect::Sound { sound, pos, volume, frequency });
    }

    fn spawn_effect(&mut self, effect: VisualEffect, pos: Pos3) {
        self.effects.push(Effect::Visual { effect, pos });
    }
}
