use crate::error::{PetalCueError, Result};

/// Largest accepted frame size, in samples per channel.
pub const MAX_FRAME_SIZE: usize = 65536;

/// Configuration descriptor for a PetalCue engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineDesc {
    /// Sample rate of every buffer the engine consumes and produces
    pub sample_rate: u32,
    /// Number of samples per channel in one processing frame.
    /// All scratch buffers, and the padding of partial frames, derive from this.
    pub frame_size: usize,
    /// Optional path to a custom HRTF SOFA file (None uses Steam Audio's default HRTF)
    pub hrtf_path: Option<String>,
}

impl Default for EngineDesc {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            frame_size: 1024,
            hrtf_path: None,
        }
    }
}

impl EngineDesc {
    pub fn new(sample_rate: u32, frame_size: usize) -> Self {
        Self {
            sample_rate,
            frame_size,
            ..Default::default()
        }
    }

    pub fn with_hrtf_path(mut self, path: impl Into<String>) -> Self {
        self.hrtf_path = Some(path.into());
        self
    }

    /// Rejects descriptors the renderer cannot be built from.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(PetalCueError::Configuration(
                "Sample rate must be greater than 0".to_string(),
            ));
        }

        if self.frame_size == 0 {
            return Err(PetalCueError::Configuration(
                "Frame size must be greater than 0".to_string(),
            ));
        }

        if self.frame_size > MAX_FRAME_SIZE {
            return Err(PetalCueError::Configuration(format!(
                "Frame size {} exceeds the maximum of {}",
                self.frame_size, MAX_FRAME_SIZE
            )));
        }

        Ok(())
    }

    pub fn audio_settings(&self) -> AudioSettings {
        AudioSettings {
            sample_rate: self.sample_rate,
            frame_size: self.frame_size,
        }
    }
}

/// The `(sample_rate, frame_size)` pair an initialized engine is fixed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSettings {
    pub sample_rate: u32,
    pub frame_size: usize,
}

impl AudioSettings {
    /// Length of one interleaved stereo frame, in samples.
    pub fn stereo_frame_len(&self) -> usize {
        self.frame_size * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_desc_is_valid() {
        let desc = EngineDesc::default();
        assert!(desc.validate().is_ok());
        assert_eq!(desc.sample_rate, 44100);
        assert_eq!(desc.frame_size, 1024);
        assert!(desc.hrtf_path.is_none());
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(EngineDesc::new(0, 256).validate().is_err());
        assert!(EngineDesc::new(44100, 0).validate().is_err());
    }

    #[test]
    fn test_frame_size_upper_bound() {
        assert!(EngineDesc::new(44100, MAX_FRAME_SIZE).validate().is_ok());
        assert!(matches!(
            EngineDesc::new(44100, MAX_FRAME_SIZE + 1).validate(),
            Err(PetalCueError::Configuration(_))
        ));
    }

    #[test]
    fn test_audio_settings() {
        let settings = EngineDesc::new(48000, 256).audio_settings();
        assert_eq!(settings.sample_rate, 48000);
        assert_eq!(settings.stereo_frame_len(), 512);
    }
}
