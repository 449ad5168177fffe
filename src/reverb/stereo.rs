use crate::config::ReverbSettings;
use crate::error::{PetalCueError, Result};
use crate::reverb::filters::{AllpassFilter, CombFilter};

/// Lowest sample rate the delay-line tunings are defined for.
pub const MIN_SAMPLE_RATE: u32 = 22050;
/// Highest supported sample rate.
pub const MAX_SAMPLE_RATE: u32 = 96000;

const REFERENCE_SAMPLE_RATE: f64 = 44100.0;

// Delay lengths in samples at 44.1 kHz; the right channel adds STEREO_SPREAD.
const COMB_TUNINGS: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];
const ALLPASS_TUNINGS: [usize; 4] = [556, 441, 341, 225];
const STEREO_SPREAD: usize = 23;

const FIXED_GAIN: f32 = 0.015;
const ALLPASS_FEEDBACK: f32 = 0.5;
const SCALE_WET: f32 = 3.0;
const SCALE_DRY: f32 = 2.0;
const SCALE_DAMP: f32 = 0.4;
const SCALE_ROOM: f32 = 0.28;
const OFFSET_ROOM: f32 = 0.7;

/// How the feedback network treats incoming audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReverbMode {
    #[default]
    Normal,
    /// Input is muted and the tail recirculates without loss.
    Freeze,
}

/// Freeverb-style stereo reverb: eight parallel damped combs into four series allpasses,
/// per channel.
pub struct StereoReverb {
    settings: ReverbSettings,
    mode: ReverbMode,
    input_width: f32,

    combs_l: Vec<CombFilter>,
    combs_r: Vec<CombFilter>,
    allpasses_l: Vec<AllpassFilter>,
    allpasses_r: Vec<AllpassFilter>,

    // Derived from settings/mode by `update`
    gain: f32,
    feedback: f32,
    damp: f32,
    wet1: f32,
    wet2: f32,
    dry: f32,
}

impl StereoReverb {
    /// Builds a reverb with [`ReverbSettings::default`] for the given sample rate.
    ///
    /// Fails for sample rates outside `MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE`.
    pub fn new(sample_rate: u32) -> Result<Self> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Err(PetalCueError::Reverb(format!(
                "Unsupported sample rate {} Hz (supported: {}-{} Hz)",
                sample_rate, MIN_SAMPLE_RATE, MAX_SAMPLE_RATE
            )));
        }

        let scale = f64::from(sample_rate) / REFERENCE_SAMPLE_RATE;
        let scaled = |tuning: usize| (tuning as f64 * scale) as usize;

        let mut reverb = Self {
            settings: ReverbSettings::default(),
            mode: ReverbMode::Normal,
            input_width: 0.0,
            combs_l: COMB_TUNINGS
                .iter()
                .map(|&t| CombFilter::new(scaled(t)))
                .collect(),
            combs_r: COMB_TUNINGS
                .iter()
                .map(|&t| CombFilter::new(scaled(t + STEREO_SPREAD)))
                .collect(),
            allpasses_l: ALLPASS_TUNINGS
                .iter()
                .map(|&t| AllpassFilter::new(scaled(t), ALLPASS_FEEDBACK))
                .collect(),
            allpasses_r: ALLPASS_TUNINGS
                .iter()
                .map(|&t| AllpassFilter::new(scaled(t + STEREO_SPREAD), ALLPASS_FEEDBACK))
                .collect(),
            gain: FIXED_GAIN,
            feedback: 0.0,
            damp: 0.0,
            wet1: 0.0,
            wet2: 0.0,
            dry: 0.0,
        };
        reverb.update();
        Ok(reverb)
    }

    pub fn settings(&self) -> ReverbSettings {
        self.settings
    }

    /// Applies all five parameters at once. Values are clamped to `[0, 1]`.
    pub fn set_settings(&mut self, settings: ReverbSettings) {
        self.settings = settings.clamped();
        self.update();
    }

    pub fn mode(&self) -> ReverbMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ReverbMode) {
        self.mode = mode;
        self.update();
    }

    pub fn input_width(&self) -> f32 {
        self.input_width
    }

    /// 0 feeds the mono sum into both channels, 1 keeps the input channels separate.
    pub fn set_input_width(&mut self, input_width: f32) {
        self.input_width = input_width.clamp(0.0, 1.0);
    }

    /// Samples the tail needs to fall by 60 dB after the input stops.
    ///
    /// Returns 0 in [`ReverbMode::Freeze`], where the tail never decays.
    pub fn decay_time_in_frames(&self) -> usize {
        if self.mode == ReverbMode::Freeze || self.feedback >= 1.0 || self.feedback <= 0.0 {
            return 0;
        }

        // Each pass through the longest comb attenuates by `feedback`; -60 dB is 10^-3.
        let reflections = -3.0 / f64::from(self.feedback).log10();
        let longest_comb = self.combs_l.last().map_or(0, CombFilter::len);
        (reflections * longest_comb as f64) as usize
    }

    /// Processes interleaved stereo. `input` and `output` must have the same length.
    pub fn process_interleaved(&mut self, input: &[f32], output: &mut [f32]) {
        let side = self.input_width;
        for (frame_in, frame_out) in input.chunks_exact(2).zip(output.chunks_exact_mut(2)) {
            let (in_l, in_r) = (frame_in[0], frame_in[1]);
            let feed_l = (in_l * (1.0 + side) + in_r * (1.0 - side)) * self.gain;
            let feed_r = (in_r * (1.0 + side) + in_l * (1.0 - side)) * self.gain;

            let mut out_l: f32 = self.combs_l.iter_mut().map(|comb| comb.process(feed_l)).sum();
            let mut out_r: f32 = self.combs_r.iter_mut().map(|comb| comb.process(feed_r)).sum();

            for allpass in self.allpasses_l.iter_mut() {
                out_l = allpass.process(out_l);
            }
            for allpass in self.allpasses_r.iter_mut() {
                out_r = allpass.process(out_r);
            }

            frame_out[0] = out_l * self.wet1 + out_r * self.wet2 + in_l * self.dry;
            frame_out[1] = out_r * self.wet1 + out_l * self.wet2 + in_r * self.dry;
        }
    }

    /// Clears every delay line without touching the parameters.
    pub fn reset(&mut self) {
        for comb in self.combs_l.iter_mut().chain(self.combs_r.iter_mut()) {
            comb.reset();
        }
        for allpass in self.allpasses_l.iter_mut().chain(self.allpasses_r.iter_mut()) {
            allpass.reset();
        }
    }

    fn update(&mut self) {
        let wet = self.settings.wet_level * SCALE_WET;
        let width = self.settings.width;
        self.wet1 = wet * (width / 2.0 + 0.5);
        self.wet2 = wet * ((1.0 - width) / 2.0);
        self.dry = self.settings.dry_level * SCALE_DRY;

        match self.mode {
            ReverbMode::Freeze => {
                self.feedback = 1.0;
                self.damp = 0.0;
                self.gain = 0.0;
            }
            ReverbMode::Normal => {
                self.feedback = self.settings.room_size * SCALE_ROOM + OFFSET_ROOM;
                self.damp = self.settings.damping * SCALE_DAMP;
                self.gain = FIXED_GAIN;
            }
        }

        for comb in self.combs_l.iter_mut().chain(self.combs_r.iter_mut()) {
            comb.set_feedback(self.feedback);
            comb.set_damp(self.damp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse(frames: usize) -> Vec<f32> {
        let mut input = vec![0.0; frames * 2];
        input[0] = 1.0;
        input[1] = 1.0;
        input
    }

    #[test]
    fn test_sample_rate_range() {
        assert!(StereoReverb::new(44100).is_ok());
        assert!(StereoReverb::new(MIN_SAMPLE_RATE).is_ok());
        assert!(StereoReverb::new(MAX_SAMPLE_RATE).is_ok());
        assert!(StereoReverb::new(8000).is_err());
        assert!(StereoReverb::new(192000).is_err());
    }

    #[test]
    fn test_decay_time_grows_with_room_size() {
        let mut reverb = StereoReverb::new(44100).unwrap();
        reverb.set_settings(ReverbSettings {
            room_size: 0.1,
            ..Default::default()
        });
        let small = reverb.decay_time_in_frames();

        reverb.set_settings(ReverbSettings {
            room_size: 0.9,
            ..Default::default()
        });
        let large = reverb.decay_time_in_frames();

        assert!(small > 0);
        assert!(large > small);
    }

    #[test]
    fn test_decay_time_for_cue_preset() {
        let mut reverb = StereoReverb::new(44100).unwrap();
        reverb.set_settings(ReverbSettings::CUE);
        // feedback 0.728 -> about 21.7 passes through the 1617-sample comb
        let decay = reverb.decay_time_in_frames();
        assert!((34_000..36_500).contains(&decay), "decay = {}", decay);
    }

    #[test]
    fn test_decay_time_scales_with_sample_rate() {
        let low = StereoReverb::new(22050).unwrap().decay_time_in_frames();
        let high = StereoReverb::new(88200).unwrap().decay_time_in_frames();
        assert!(high > low * 3);
    }

    #[test]
    fn test_freeze_has_no_finite_decay() {
        let mut reverb = StereoReverb::new(48000).unwrap();
        assert_eq!(reverb.mode(), ReverbMode::Normal);
        reverb.set_mode(ReverbMode::Freeze);
        assert_eq!(reverb.mode(), ReverbMode::Freeze);
        assert_eq!(reverb.decay_time_in_frames(), 0);

        reverb.set_mode(ReverbMode::Normal);
        assert!(reverb.decay_time_in_frames() > 0);
    }

    #[test]
    fn test_silence_stays_silent() {
        let mut reverb = StereoReverb::new(44100).unwrap();
        let input = vec![0.0; 2048];
        let mut output = vec![1.0; 2048];
        reverb.process_interleaved(&input, &mut output);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_dry_only_passes_input_scaled() {
        let mut reverb = StereoReverb::new(44100).unwrap();
        reverb.set_settings(ReverbSettings::new(0.5, 0.5, 0.0, 0.5, 1.0));

        let input: Vec<f32> = (0..512).map(|i| ((i % 7) as f32 - 3.0) / 10.0).collect();
        let mut output = vec![0.0; input.len()];
        reverb.process_interleaved(&input, &mut output);

        // dry 0.5 maps to a gain of 1.0
        for (out, inp) in output.iter().zip(input.iter()) {
            assert!((out - inp).abs() < 1e-6);
        }
    }

    #[test]
    fn test_impulse_produces_tail() {
        let mut reverb = StereoReverb::new(44100).unwrap();
        let frames = 4096;
        let input = impulse(frames);
        let mut output = vec![0.0; frames * 2];
        reverb.process_interleaved(&input, &mut output);

        // Nothing comes out before the shortest comb delay has elapsed
        assert!(output[..2 * 1000].iter().all(|&s| s == 0.0));
        let energy: f32 = output.iter().map(|s| s * s).sum();
        assert!(energy > 0.0);
        assert!(output.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_freeze_mutes_new_input() {
        let mut reverb = StereoReverb::new(44100).unwrap();
        reverb.set_mode(ReverbMode::Freeze);
        let input = impulse(4096);
        let mut output = vec![0.0; input.len()];
        reverb.process_interleaved(&input, &mut output);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_reset_restores_initial_response() {
        let mut reverb = StereoReverb::new(44100).unwrap();
        let input = impulse(4096);
        let mut first = vec![0.0; input.len()];
        reverb.process_interleaved(&input, &mut first);

        reverb.reset();
        let mut second = vec![0.0; input.len()];
        reverb.process_interleaved(&input, &mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn test_settings_are_clamped() {
        let mut reverb = StereoReverb::new(44100).unwrap();
        reverb.set_settings(ReverbSettings::new(4.0, -1.0, 0.2, 0.2, 0.5));
        let settings = reverb.settings();
        assert_eq!(settings.room_size, 1.0);
        assert_eq!(settings.damping, 0.0);
        reverb.set_input_width(3.0);
        assert_eq!(reverb.input_width(), 1.0);
    }
}
