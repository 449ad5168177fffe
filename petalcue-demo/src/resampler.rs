use petalcue::error::{PetalCueError, Result};
use rubato::{FftFixedIn, Resampler};

const CHUNK_SIZE: usize = 1024;

/// Resample one channel from `source_rate` to `target_rate`.
pub fn resample_mono(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if source_rate == 0 || target_rate == 0 {
        return Err(PetalCueError::AudioLoading(
            "Sample rates must be greater than 0".to_string(),
        ));
    }
    if source_rate == target_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        CHUNK_SIZE,
        2, // sub_chunks
        1,
    )
    .map_err(|e| PetalCueError::AudioLoading(format!("Failed to create resampler: {}", e)))?;

    let expected_len =
        (samples.len() as f64 * f64::from(target_rate) / f64::from(source_rate)).round() as usize;
    // The resampler may round the chunk size to suit the ratio
    let chunk_size = resampler.input_frames_next();
    let mut output = Vec::with_capacity(expected_len + resampler.output_frames_max());
    let mut input_chunk = vec![0.0f32; chunk_size];

    for chunk in samples.chunks(chunk_size) {
        // Pad the last chunk with silence
        input_chunk[..chunk.len()].copy_from_slice(chunk);
        input_chunk[chunk.len()..].fill(0.0);

        let waves_out = resampler
            .process(&[&input_chunk[..]], None)
            .map_err(|e| PetalCueError::AudioLoading(format!("Resampling error: {}", e)))?;

        if let Some(channel) = waves_out.first() {
            output.extend_from_slice(channel);
        }
    }

    output.truncate(expected_len);
    log::debug!(
        "Resampled {} samples at {} Hz to {} samples at {} Hz",
        samples.len(),
        source_rate,
        output.len(),
        target_rate
    );
    Ok(output)
}
