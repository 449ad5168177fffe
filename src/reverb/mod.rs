mod filters;
mod stereo;

pub use stereo::{MAX_SAMPLE_RATE, MIN_SAMPLE_RATE, ReverbMode, StereoReverb};

use crate::config::{AudioSettings, ReverbSettings};
use crate::error::{PetalCueError, Result};
use crate::processor::FrameProcessor;

/// [`StereoReverb`] bound to the engine's frame size.
pub struct ReverbStage {
    reverb: StereoReverb,
    frame_size: usize,
}

impl ReverbStage {
    pub fn new(audio_settings: AudioSettings) -> Result<Self> {
        let reverb = StereoReverb::new(audio_settings.sample_rate)?;
        Ok(Self {
            reverb,
            frame_size: audio_settings.frame_size,
        })
    }

    pub fn settings(&self) -> ReverbSettings {
        self.reverb.settings()
    }

    pub fn set_settings(&mut self, settings: ReverbSettings) {
        self.reverb.set_settings(settings);
    }

    pub fn set_mode(&mut self, mode: ReverbMode) {
        self.reverb.set_mode(mode);
    }

    pub fn set_input_width(&mut self, input_width: f32) {
        self.reverb.set_input_width(input_width);
    }

    pub fn reset(&mut self) {
        self.reverb.reset();
    }
}

impl FrameProcessor for ReverbStage {
    type Params = ();

    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn input_channels(&self) -> usize {
        2
    }

    fn output_channels(&self) -> usize {
        2
    }

    fn tail_length(&self) -> usize {
        self.reverb.decay_time_in_frames()
    }

    fn process_frame(&mut self, _params: &(), input: &[f32], output: &mut [f32]) -> Result<()> {
        let expected = self.frame_size * 2;
        if input.len() != expected || output.len() != expected {
            return Err(PetalCueError::InvalidInput(format!(
                "Reverb frame expects {} samples, got {} in / {} out",
                expected,
                input.len(),
                output.len()
            )));
        }

        self.reverb.process_interleaved(input, output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_reports_frame_shape() {
        let stage = ReverbStage::new(AudioSettings {
            sample_rate: 44100,
            frame_size: 256,
        })
        .unwrap();
        assert_eq!(stage.frame_size(), 256);
        assert_eq!(stage.input_channels(), 2);
        assert_eq!(stage.output_channels(), 2);
        assert!(stage.tail_length() > 0);
    }

    #[test]
    fn test_stage_rejects_wrong_frame_length() {
        let mut stage = ReverbStage::new(AudioSettings {
            sample_rate: 44100,
            frame_size: 64,
        })
        .unwrap();
        let input = vec![0.0; 100];
        let mut output = vec![0.0; 128];
        assert!(stage.process_frame(&(), &input, &mut output).is_err());

        let input = vec![0.0; 128];
        assert!(stage.process_frame(&(), &input, &mut output).is_ok());
    }

    #[test]
    fn test_stage_rejects_unsupported_rate() {
        let result = ReverbStage::new(AudioSettings {
            sample_rate: 16000,
            frame_size: 256,
        });
        assert!(result.is_err());
    }
}
