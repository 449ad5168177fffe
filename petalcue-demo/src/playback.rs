use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use petalcue::PcmBuffer;
use petalcue::error::{PetalCueError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const CHANNELS: u16 = 2;

/// Play a rendered cue on the default output device and block until it has finished.
pub fn play_blocking(cue: &PcmBuffer, sample_rate: u32) -> Result<()> {
    if cue.is_empty() {
        return Ok(());
    }

    let host = cpal::default_host();
    let device = host.default_output_device().ok_or_else(|| {
        PetalCueError::AudioDevice("No default output device available".into())
    })?;

    let config = cpal::StreamConfig {
        channels: CHANNELS,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let default_config = device.default_output_config().map_err(|e| {
        PetalCueError::AudioDevice(format!("Failed to get default config: {}", e))
    })?;

    let samples: Arc<[i16]> = Arc::from(cue.samples());
    let position = Arc::new(AtomicUsize::new(0));

    let stream = match default_config.sample_format() {
        cpal::SampleFormat::F32 => {
            create_stream::<f32>(&device, &config, samples.clone(), position.clone())?
        }
        cpal::SampleFormat::I16 => {
            create_stream::<i16>(&device, &config, samples.clone(), position.clone())?
        }
        cpal::SampleFormat::U16 => {
            create_stream::<u16>(&device, &config, samples.clone(), position.clone())?
        }
        other => {
            return Err(PetalCueError::AudioDevice(format!(
                "Unsupported sample format {:?}",
                other
            )));
        }
    };

    stream
        .play()
        .map_err(|e| PetalCueError::AudioDevice(format!("Failed to start stream: {}", e)))?;

    log::info!(
        "Playing {} frames at {} Hz on {}",
        cue.frames(),
        sample_rate,
        device.name().unwrap_or_else(|_| "unknown device".to_string())
    );

    while position.load(Ordering::Relaxed) < samples.len() {
        std::thread::sleep(Duration::from_millis(20));
    }
    // Let the device drain its last buffer
    std::thread::sleep(Duration::from_millis(100));

    drop(stream);
    Ok(())
}

fn create_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: Arc<[i16]>,
    position: Arc<AtomicUsize>,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<i16>,
{
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let start = position.load(Ordering::Relaxed);
                for (i, out) in data.iter_mut().enumerate() {
                    let sample = samples.get(start + i).copied().unwrap_or(0);
                    *out = T::from_sample(sample);
                }
                position.store(start + data.len(), Ordering::Relaxed);
            },
            move |err| {
                log::error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| PetalCueError::AudioDevice(format!("Failed to build stream: {}", e)))
}
