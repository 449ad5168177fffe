use crate::buffer::PcmBuffer;
use crate::config::{AudioSettings, EngineDesc, ReverbSettings};
use crate::error::{PetalCueError, Result};
use crate::math::{Vec3, direction_from_angles};
use crate::pcm;
use crate::processor::FrameProcessor;
use crate::reverb::{ReverbMode, ReverbStage};
use crate::spatial::BinauralRenderer;

/// Spatialization stage as the engine sees it: mono frame + direction to stereo frame.
pub type Spatializer = dyn FrameProcessor<Params = Vec3>;

/// One cue to render: mono samples, where to place them, and how.
#[derive(Debug, Clone, Copy)]
pub struct CueRequest<'a> {
    /// Mono samples, normalized to `[-1, 1]`.
    pub samples: &'a [f32],
    pub angle_x: f32,
    pub angle_y: f32,
    /// Gain applied to the samples before spatialization.
    pub volume: f32,
    /// Whether to run the spatialized result through the reverb.
    pub reverb: bool,
}

impl<'a> CueRequest<'a> {
    pub fn new(samples: &'a [f32], angle_x: f32, angle_y: f32) -> Self {
        Self {
            samples,
            angle_x,
            angle_y,
            volume: 1.0,
            reverb: true,
        }
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn reverb(mut self, reverb: bool) -> Self {
        self.reverb = reverb;
        self
    }
}

/// Binaural cue renderer with an optional reverb tail.
///
/// The engine starts uninitialized. [`initialize`](Self::initialize) builds the Steam Audio
/// renderer and the reverb; [`cleanup`](Self::cleanup) tears everything down again. Rendering
/// calls fail with [`PetalCueError::NotInitialized`] outside that window.
///
/// The engine reuses internal scratch buffers on every call and does no locking. Callers that
/// share an engine between threads must serialize every call themselves.
pub struct PetalCueEngine {
    state: Option<EngineState>,
}

struct EngineState {
    audio_settings: AudioSettings,
    spatializer: Box<Spatializer>,
    reverb: Option<ReverbStage>,

    // Scratch buffers, overwritten every frame and never handed out
    mono_frame: Vec<f32>,
    stereo_frame: Vec<f32>,
    reverb_in: Vec<f32>,
    reverb_out: Vec<f32>,
}

impl Default for PetalCueEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PetalCueEngine {
    /// Create an uninitialized engine
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Build the Steam Audio renderer and the reverb.
    ///
    /// Does nothing if the engine is already initialized. If the renderer cannot be built
    /// the engine stays uninitialized. A reverb that cannot be built only disables
    /// [`apply_reverb`](Self::apply_reverb); the call still succeeds.
    pub fn initialize(&mut self, desc: &EngineDesc) -> Result<()> {
        if self.state.is_some() {
            log::debug!("Engine already initialized");
            return Ok(());
        }

        let spatializer = BinauralRenderer::new(desc)?;
        self.install(desc, Box::new(spatializer))
    }

    /// Like [`initialize`](Self::initialize), with a caller-supplied spatialization stage.
    ///
    /// The stage must take mono frames of `desc.frame_size` samples and produce stereo frames.
    pub fn initialize_with(
        &mut self,
        desc: &EngineDesc,
        spatializer: Box<Spatializer>,
    ) -> Result<()> {
        if self.state.is_some() {
            log::debug!("Engine already initialized");
            return Ok(());
        }

        self.install(desc, spatializer)
    }

    fn install(&mut self, desc: &EngineDesc, spatializer: Box<Spatializer>) -> Result<()> {
        desc.validate()?;

        if spatializer.frame_size() != desc.frame_size
            || spatializer.input_channels() != 1
            || spatializer.output_channels() != 2
        {
            return Err(PetalCueError::Configuration(format!(
                "Spatializer must map {} mono samples to stereo, got {} samples, {} -> {} channels",
                desc.frame_size,
                spatializer.frame_size(),
                spatializer.input_channels(),
                spatializer.output_channels()
            )));
        }

        let audio_settings = desc.audio_settings();
        let stereo_frame_len = audio_settings.stereo_frame_len();

        let reverb = match ReverbStage::new(audio_settings) {
            Ok(stage) => Some(stage),
            Err(e) => {
                log::warn!("Reverb disabled: {}", e);
                None
            }
        };
        let (reverb_in, reverb_out) = if reverb.is_some() {
            (vec![0.0; stereo_frame_len], vec![0.0; stereo_frame_len])
        } else {
            (Vec::new(), Vec::new())
        };

        self.state = Some(EngineState {
            audio_settings,
            spatializer,
            reverb,
            mono_frame: vec![0.0; audio_settings.frame_size],
            stereo_frame: vec![0.0; stereo_frame_len],
            reverb_in,
            reverb_out,
        });

        log::info!(
            "PetalCue engine initialized ({} Hz, frame size {}, reverb {})",
            audio_settings.sample_rate,
            audio_settings.frame_size,
            if self.is_reverb_available() {
                "available"
            } else {
                "unavailable"
            }
        );
        Ok(())
    }

    /// Release the renderer, the reverb and every scratch buffer.
    ///
    /// Does nothing if the engine is not initialized.
    pub fn cleanup(&mut self) {
        if self.state.take().is_some() {
            log::info!("PetalCue engine cleaned up");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    pub fn is_reverb_available(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|state| state.reverb.is_some())
    }

    /// The settings the engine was initialized with, if any.
    pub fn audio_settings(&self) -> Option<AudioSettings> {
        self.state.as_ref().map(|state| state.audio_settings)
    }

    /// Current reverb parameters, if the reverb is available.
    pub fn reverb_settings(&self) -> Option<ReverbSettings> {
        self.state
            .as_ref()
            .and_then(|state| state.reverb.as_ref())
            .map(ReverbStage::settings)
    }

    /// Apply all five reverb parameters at once.
    pub fn set_reverb_settings(&mut self, settings: ReverbSettings) -> Result<()> {
        settings.validate()?;
        let reverb = self.reverb_mut()?;
        reverb.set_settings(settings);
        log::debug!("Reverb settings updated: {:?}", settings);
        Ok(())
    }

    pub fn set_reverb_mode(&mut self, mode: ReverbMode) -> Result<()> {
        self.reverb_mut()?.set_mode(mode);
        Ok(())
    }

    pub fn set_reverb_input_width(&mut self, input_width: f32) -> Result<()> {
        self.reverb_mut()?.set_input_width(input_width);
        Ok(())
    }

    /// Clear the reverb's delay lines so the next call starts from silence.
    pub fn reset_reverb(&mut self) -> Result<()> {
        self.reverb_mut()?.reset();
        Ok(())
    }

    /// Number of extra processing frames [`apply_reverb`](Self::apply_reverb) appends.
    pub fn reverb_tail_frames(&self) -> Result<usize> {
        let state = self.state.as_ref().ok_or(PetalCueError::NotInitialized)?;
        let reverb = state.reverb.as_ref().ok_or(PetalCueError::ReverbUnavailable)?;
        Ok(pcm::frames_needed(
            reverb.tail_length(),
            state.audio_settings.frame_size,
        ))
    }

    /// Spatialize mono samples toward `(angle_x, angle_y)`.
    ///
    /// The input is rendered in whole frames; a trailing partial frame is padded with
    /// silence. The result holds `ceil(len / frame_size) * frame_size` stereo frames of
    /// interleaved 16-bit PCM. Empty input gives an empty buffer.
    pub fn process(&mut self, samples: &[f32], angle_x: f32, angle_y: f32) -> Result<PcmBuffer> {
        let state = self.state.as_mut().ok_or(PetalCueError::NotInitialized)?;
        let direction = direction_from_angles(angle_x, angle_y);
        state.spatialize(samples, direction)
    }

    /// Run interleaved stereo PCM through the reverb and render its decay tail.
    ///
    /// The result holds the input frames plus enough frames of silence-driven output for
    /// the tail to decay; its length is a whole number of processing frames.
    pub fn apply_reverb(&mut self, samples: &[i16]) -> Result<PcmBuffer> {
        let state = self.state.as_mut().ok_or(PetalCueError::NotInitialized)?;
        state.reverberate(samples)
    }

    /// Spatialize a cue and, if requested and possible, add the reverb tail.
    ///
    /// A reverb that is unavailable or fails falls back to the dry spatialized buffer.
    pub fn render_cue(&mut self, cue: &CueRequest<'_>) -> Result<PcmBuffer> {
        let scaled: Vec<f32>;
        let samples: &[f32] = if cue.volume == 1.0 {
            cue.samples
        } else {
            scaled = cue.samples.iter().map(|s| s * cue.volume).collect();
            &scaled[..]
        };

        let dry = self.process(samples, cue.angle_x, cue.angle_y)?;
        if !cue.reverb || dry.is_empty() {
            return Ok(dry);
        }

        match self.apply_reverb(&dry) {
            Ok(wet) => Ok(wet),
            Err(e) => {
                log::debug!("Playing cue without reverb: {}", e);
                Ok(dry)
            }
        }
    }

    fn reverb_mut(&mut self) -> Result<&mut ReverbStage> {
        let state = self.state.as_mut().ok_or(PetalCueError::NotInitialized)?;
        state.reverb.as_mut().ok_or(PetalCueError::ReverbUnavailable)
    }
}

impl EngineState {
    fn spatialize(&mut self, samples: &[f32], direction: Vec3) -> Result<PcmBuffer> {
        let frame_size = self.audio_settings.frame_size;
        let num_frames = pcm::frames_needed(samples.len(), frame_size);
        if num_frames == 0 {
            return Ok(PcmBuffer::empty());
        }

        // Dropped on any early return, so a failed call never hands out a partial buffer
        let mut output = Vec::with_capacity(num_frames * self.audio_settings.stereo_frame_len());

        for chunk in samples.chunks(frame_size) {
            self.mono_frame[..chunk.len()].copy_from_slice(chunk);
            self.mono_frame[chunk.len()..].fill(0.0);

            self.spatializer
                .process_frame(&direction, &self.mono_frame, &mut self.stereo_frame)?;

            output.extend(self.stereo_frame.iter().map(|&s| pcm::f32_to_i16(s)));
        }

        log::debug!(
            "Spatialized {} samples into {} frames toward {:?}",
            samples.len(),
            num_frames,
            direction
        );
        Ok(PcmBuffer::new(output))
    }

    fn reverberate(&mut self, samples: &[i16]) -> Result<PcmBuffer> {
        let reverb = self.reverb.as_mut().ok_or(PetalCueError::ReverbUnavailable)?;
        let frame_size = self.audio_settings.frame_size;
        let stride = self.audio_settings.stereo_frame_len();

        let input_frames = pcm::frames_needed(samples.len() / 2, frame_size);
        if input_frames == 0 {
            return Ok(PcmBuffer::empty());
        }

        let tail_frames = pcm::frames_needed(reverb.tail_length(), frame_size);
        let total_frames = input_frames + tail_frames;
        let mut output = Vec::with_capacity(total_frames * stride);

        for frame in 0..total_frames {
            let start = frame * stride;
            for (offset, slot) in self.reverb_in.iter_mut().enumerate() {
                *slot = samples
                    .get(start + offset)
                    .map_or(0.0, |&s| pcm::i16_to_f32(s));
            }

            reverb.process_frame(&(), &self.reverb_in, &mut self.reverb_out)?;

            output.extend(self.reverb_out.iter().map(|&s| pcm::f32_to_i16(s)));
        }

        log::debug!(
            "Reverberated {} input frames with a {} frame tail",
            input_frames,
            tail_frames
        );
        Ok(PcmBuffer::new(output))
    }
}
