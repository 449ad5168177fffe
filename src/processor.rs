use crate::error::Result;

/// One stage of the rendering pipeline that works a fixed-size frame at a time.
///
/// Implementors own whatever state they carry across frames (HRTF history, delay lines).
/// Buffers are interleaved: `input` holds `frame_size() * input_channels()` samples and
/// `output` holds `frame_size() * output_channels()` samples.
pub trait FrameProcessor {
    /// Per-call parameters, fixed for every frame of one rendering call.
    type Params;

    /// Samples per channel in one frame.
    fn frame_size(&self) -> usize;

    fn input_channels(&self) -> usize;

    fn output_channels(&self) -> usize;

    /// Length of the audible tail left after the input ends, in sample frames.
    fn tail_length(&self) -> usize {
        0
    }

    /// Processes exactly one frame.
    fn process_frame(
        &mut self,
        params: &Self::Params,
        input: &[f32],
        output: &mut [f32],
    ) -> Result<()>;
}
