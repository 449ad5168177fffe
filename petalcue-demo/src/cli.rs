use anyhow::{Context, Result, bail};
use petalcue::ReverbSettings;
use petalcue::math::Vec2;

pub const USAGE: &str = "\
usage: petalcue-demo <sound file> [options]

options:
  --at <x>,<y>          screen position of the cue in pixels (default: none)
  --desktop <w>x<h>     desktop size in pixels (default: 1920x1080)
  --rate <hz>           engine sample rate (default: 44100)
  --frame <samples>     engine frame size (default: 1024)
  --volume <gain>       cue volume (default: 1.0)
  --hrtf <path>         SOFA file to use instead of the default HRTF
  --no-reverb           play the cue dry
  --out <path>          also write the rendered cue as raw 16-bit LE stereo
  --no-play             render only, do not open an output device";

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub sound_path: String,
    pub position: Option<Vec2>,
    pub desktop_size: Vec2,
    pub sample_rate: u32,
    pub frame_size: usize,
    pub volume: f32,
    pub hrtf_path: Option<String>,
    pub reverb: Option<ReverbSettings>,
    pub out_path: Option<String>,
    pub play: bool,
}

impl CliArgs {
    fn with_sound(sound_path: String) -> Self {
        Self {
            sound_path,
            position: None,
            desktop_size: Vec2::new(1920.0, 1080.0),
            sample_rate: 44100,
            frame_size: 1024,
            volume: 1.0,
            hrtf_path: None,
            reverb: Some(ReverbSettings::CUE),
            out_path: None,
            play: true,
        }
    }
}

/// Parse the arguments after the program name.
pub fn parse(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut args = args.into_iter();
    let mut sound_path = None;
    let mut parsed = CliArgs::with_sound(String::new());

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--at" => parsed.position = Some(parse_pair(&value(&mut args, &arg)?, ',')?),
            "--desktop" => parsed.desktop_size = parse_pair(&value(&mut args, &arg)?, 'x')?,
            "--rate" => {
                parsed.sample_rate = value(&mut args, &arg)?
                    .parse()
                    .context("--rate expects an integer")?
            }
            "--frame" => {
                parsed.frame_size = value(&mut args, &arg)?
                    .parse()
                    .context("--frame expects an integer")?
            }
            "--volume" => {
                parsed.volume = value(&mut args, &arg)?
                    .parse()
                    .context("--volume expects a number")?
            }
            "--hrtf" => parsed.hrtf_path = Some(value(&mut args, &arg)?),
            "--out" => parsed.out_path = Some(value(&mut args, &arg)?),
            "--no-reverb" => parsed.reverb = None,
            "--no-play" => parsed.play = false,
            other if other.starts_with("--") => bail!("unknown option {}", other),
            _ => {
                if sound_path.replace(arg).is_some() {
                    bail!("only one sound file can be given");
                }
            }
        }
    }

    parsed.sound_path = sound_path.context("missing sound file")?;
    Ok(parsed)
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .with_context(|| format!("{} expects a value", flag))
}

fn parse_pair(text: &str, separator: char) -> Result<Vec2> {
    let (a, b) = text
        .split_once(separator)
        .with_context(|| format!("expected two numbers separated by '{}'", separator))?;
    let a: f32 = a.trim().parse().with_context(|| format!("invalid number {}", a))?;
    let b: f32 = b.trim().parse().with_context(|| format!("invalid number {}", b))?;
    Ok(Vec2::new(a, b))
}
