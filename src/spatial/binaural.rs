use crate::config::EngineDesc;
use crate::error::{PetalCueError, Result};
use crate::math::Vec3;
use crate::processor::FrameProcessor;
use audionimbus::{
    AudioBufferSettings, AudioSettings, BinauralEffect, BinauralEffectParams,
    BinauralEffectSettings, Context, Direction, Hrtf, HrtfInterpolation, HrtfSettings, Sofa,
    VolumeNormalization, audio_buffer::AudioBuffer as AudioNimbusAudioBuffer,
};

/// Steam Audio binaural renderer: one mono frame plus a direction in, one interleaved
/// stereo frame out.
///
/// Uses nearest-neighbour HRTF lookup and a full spatial blend; any dry/wet mixing is left
/// to later stages.
pub struct BinauralRenderer {
    // Declared child-first so drop releases effect, then HRTF, then context.
    effect: BinauralEffect,
    hrtf: Hrtf,
    context: Context,

    frame_size: usize,

    // Cached buffers to avoid allocations
    cached_input_buf: Vec<f32>,       // Mono input frame
    cached_planar_buf: Vec<f32>,      // Effect output, one channel after the other
    cached_interleaved_buf: Vec<f32>, // Interleaved L/R
}

impl BinauralRenderer {
    /// Create the Steam Audio context, HRTF and binaural effect, in that order.
    ///
    /// If a later step fails, the handles created by earlier steps are dropped before the
    /// error is returned, so nothing outlives a failed construction.
    pub fn new(desc: &EngineDesc) -> Result<Self> {
        desc.validate()?;

        let frame_size_u32 = u32::try_from(desc.frame_size).map_err(|_| {
            PetalCueError::Configuration(format!("Frame size {} is too large", desc.frame_size))
        })?;

        log::info!(
            "Initializing Steam Audio binaural renderer (sample_rate: {} Hz, frame_size: {})",
            desc.sample_rate,
            desc.frame_size
        );

        let context = Context::try_new(&audionimbus::ContextSettings::default()).map_err(|e| {
            PetalCueError::SpatialAudio(format!("Failed to create Steam Audio context: {}", e))
        })?;

        let audio_settings = AudioSettings {
            sampling_rate: desc.sample_rate,
            frame_size: frame_size_u32,
        };

        let hrtf = create_hrtf(&context, &audio_settings, desc.hrtf_path.as_deref())?;

        let effect = BinauralEffect::try_new(
            &context,
            &audio_settings,
            &BinauralEffectSettings { hrtf: &hrtf },
        )
        .map_err(|e| {
            PetalCueError::SpatialAudio(format!("Failed to create BinauralEffect: {}", e))
        })?;

        log::debug!("Created binaural effect");

        Ok(Self {
            effect,
            hrtf,
            context,
            frame_size: desc.frame_size,
            cached_input_buf: vec![0.0; desc.frame_size],
            cached_planar_buf: vec![0.0; desc.frame_size * 2],
            cached_interleaved_buf: vec![0.0; desc.frame_size * 2],
        })
    }
}

/// Steam Audio's built-in HRTF, or the one in `sofa_path`, at unit volume.
fn create_hrtf(
    context: &Context,
    audio_settings: &AudioSettings,
    sofa_path: Option<&str>,
) -> Result<Hrtf> {
    let settings = HrtfSettings {
        volume_normalization: VolumeNormalization::None,
        sofa_information: sofa_information(sofa_path)?,
        ..Default::default()
    };

    let hrtf = Hrtf::try_new(context, audio_settings, &settings).map_err(|e| {
        PetalCueError::SpatialAudio(format!(
            "Failed to create HRTF ({}): {}",
            sofa_path.unwrap_or("default"),
            e
        ))
    })?;

    log::debug!("Created HRTF ({})", sofa_path.unwrap_or("default"));
    Ok(hrtf)
}

fn sofa_information(sofa_path: Option<&str>) -> Result<Option<Sofa>> {
    sofa_path
        .map(|path| std::fs::read(path).map(Sofa::Buffer))
        .transpose()
        .map_err(PetalCueError::from)
}

impl FrameProcessor for BinauralRenderer {
    /// Unit direction from the listener to the cue.
    type Params = Vec3;

    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn input_channels(&self) -> usize {
        1
    }

    fn output_channels(&self) -> usize {
        2
    }

    fn process_frame(&mut self, direction: &Vec3, input: &[f32], output: &mut [f32]) -> Result<()> {
        if input.len() != self.frame_size || output.len() != self.frame_size * 2 {
            return Err(PetalCueError::InvalidInput(format!(
                "Binaural frame expects {} mono / {} stereo samples, got {} / {}",
                self.frame_size,
                self.frame_size * 2,
                input.len(),
                output.len()
            )));
        }

        self.cached_input_buf.copy_from_slice(input);

        let binaural_effect_params = BinauralEffectParams {
            direction: Direction::new(direction.x, direction.y, direction.z),
            interpolation: HrtfInterpolation::Nearest,
            spatial_blend: 1.0,
            hrtf: &self.hrtf,
            peak_delays: None,
        };

        let input_buf = AudioNimbusAudioBuffer::try_with_data_and_settings(
            &self.cached_input_buf,
            AudioBufferSettings {
                num_channels: Some(1),
                ..Default::default()
            },
        )
        .map_err(|e| {
            PetalCueError::SpatialAudio(format!("Failed to create input buffer: {}", e))
        })?;

        let output_buf = AudioNimbusAudioBuffer::try_with_data_and_settings(
            &mut self.cached_planar_buf,
            AudioBufferSettings {
                num_channels: Some(2),
                ..Default::default()
            },
        )
        .map_err(|e| {
            PetalCueError::SpatialAudio(format!("Failed to create output buffer: {}", e))
        })?;

        let _ = self
            .effect
            .apply(&binaural_effect_params, &input_buf, &output_buf);

        output_buf.interleave(&self.context, &mut self.cached_interleaved_buf);
        output.copy_from_slice(&self.cached_interleaved_buf);

        Ok(())
    }
}
