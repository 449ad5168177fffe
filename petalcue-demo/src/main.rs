mod cli;
mod loader;
mod playback;
mod resampler;

use anyhow::{Context, Result};
use petalcue::placement::DisplayLayout;
use petalcue::{CueRequest, EngineDesc, PetalCueEngine};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = match cli::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n\n{}", e, cli::USAGE);
            std::process::exit(2);
        }
    };

    let sound = loader::load_mono(&args.sound_path)
        .with_context(|| format!("Failed to load {}", args.sound_path))?;
    let samples = resampler::resample_mono(&sound.samples, sound.sample_rate, args.sample_rate)?;

    let mut desc = EngineDesc::new(args.sample_rate, args.frame_size);
    if let Some(path) = &args.hrtf_path {
        desc = desc.with_hrtf_path(path.clone());
    }

    let mut engine = PetalCueEngine::new();
    engine
        .initialize(&desc)
        .context("Failed to initialize the cue engine")?;
    if let Some(settings) = args.reverb {
        if let Err(e) = engine.set_reverb_settings(settings) {
            log::warn!("Reverb settings not applied: {}", e);
        }
    }

    let angles = DisplayLayout::default().angles_for(args.position, args.desktop_size);
    log::info!(
        "Placing cue at {:?} on a {}x{} desktop: angles ({:.1}, {:.1})",
        args.position,
        args.desktop_size.x,
        args.desktop_size.y,
        angles.x,
        angles.y
    );

    let cue = engine.render_cue(
        &CueRequest::new(&samples, angles.x, angles.y)
            .volume(args.volume)
            .reverb(args.reverb.is_some()),
    )?;
    log::info!(
        "Rendered {} mono samples into {} stereo frames ({:.2} s)",
        samples.len(),
        cue.frames(),
        cue.frames() as f64 / f64::from(args.sample_rate)
    );

    if let Some(path) = &args.out_path {
        std::fs::write(path, cue.to_le_bytes())
            .with_context(|| format!("Failed to write {}", path))?;
        log::info!("Wrote raw 16-bit stereo PCM to {}", path);
    }

    if args.play {
        if let Err(e) = playback::play_blocking(&cue, args.sample_rate) {
            log::warn!("Playback skipped: {}", e);
        }
    }

    engine.cleanup();
    Ok(())
}
