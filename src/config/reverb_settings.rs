use crate::error::{PetalCueError, Result};

/// User-facing reverb parameters, each in `[0, 1]`.
///
/// The values are the knob positions a host exposes; the reverb engine maps them onto its
/// internal feedback, damping and mix coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbSettings {
    /// Room size. Larger rooms have longer decay tails.
    pub room_size: f32,
    /// High-frequency damping inside the feedback loop.
    pub damping: f32,
    /// Level of the reverberated signal.
    pub wet_level: f32,
    /// Level of the unprocessed signal.
    pub dry_level: f32,
    /// Stereo width of the wet signal (0 = mono, 1 = full width).
    pub width: f32,
}

impl Default for ReverbSettings {
    /// The reverb engine's own initial state: a medium room, fully wet.
    fn default() -> Self {
        Self {
            room_size: 0.5,
            damping: 0.5,
            wet_level: 1.0 / 3.0,
            dry_level: 0.0,
            width: 1.0,
        }
    }
}

impl ReverbSettings {
    /// Small, heavily damped room with a mostly dry mix, tuned for short UI cues.
    pub const CUE: Self = Self {
        room_size: 0.10,
        damping: 1.00,
        wet_level: 0.09,
        dry_level: 0.30,
        width: 1.00,
    };

    pub fn new(room_size: f32, damping: f32, wet_level: f32, dry_level: f32, width: f32) -> Self {
        Self {
            room_size,
            damping,
            wet_level,
            dry_level,
            width,
        }
    }

    /// Builds settings from host-side percentages (0-100).
    pub fn from_percentages(
        room_size: u8,
        damping: u8,
        wet_level: u8,
        dry_level: u8,
        width: u8,
    ) -> Self {
        let ratio = |percent: u8| f32::from(percent.min(100)) / 100.0;
        Self {
            room_size: ratio(room_size),
            damping: ratio(damping),
            wet_level: ratio(wet_level),
            dry_level: ratio(dry_level),
            width: ratio(width),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("room_size", self.room_size),
            ("damping", self.damping),
            ("wet_level", self.wet_level),
            ("dry_level", self.dry_level),
            ("width", self.width),
        ];

        for (name, value) in fields {
            if !value.is_finite() {
                return Err(PetalCueError::Configuration(format!(
                    "Reverb parameter {} must be finite, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Copy of these settings with every value clamped to `[0, 1]`.
    pub fn clamped(&self) -> Self {
        Self {
            room_size: self.room_size.clamp(0.0, 1.0),
            damping: self.damping.clamp(0.0, 1.0),
            wet_level: self.wet_level.clamp(0.0, 1.0),
            dry_level: self.dry_level.clamp(0.0, 1.0),
            width: self.width.clamp(0.0, 1.0),
        }
    }
}
