//! Sample-format conversion between normalized float and 16-bit PCM.

/// Full-scale magnitude used in both directions of the conversion.
pub const I16_FULL_SCALE: f32 = 32767.0;

/// Number of whole frames needed to hold `samples` samples, counting a trailing partial frame.
///
/// `frame_size` must be non-zero.
pub fn frames_needed(samples: usize, frame_size: usize) -> usize {
    samples.div_ceil(frame_size)
}

/// Clamps to `[-1, 1]`, scales by 32767 and truncates toward zero.
///
/// The result always lies in `[-32767, 32767]`. NaN maps to silence.
#[inline]
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * I16_FULL_SCALE) as i16
}

#[inline]
pub fn i16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / I16_FULL_SCALE
}
