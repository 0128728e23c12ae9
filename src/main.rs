//! Demo renderer: a held chord over a repeating digi kick drum

use anyhow::{bail, Context};
use std::env;
use std::sync::Arc;
use ym2149_pcm::{DeviceSettings, PsgDevice, RawStereo, SoundDevice};

/// Playback rate of the synthesized drum sample
const DRUM_RATE: u32 = 8_000;
/// C major triad (C4, E4, G4)
const CHORD_HZ: [f32; 3] = [261.63, 329.63, 392.0];
const DEFAULT_SECONDS: f32 = 4.0;

/// Decaying pitch-swept sine, stored as unsigned 8-bit
fn kick_drum() -> Arc<[u8]> {
    let len = DRUM_RATE as usize / 4;
    let mut phase = 0.0f32;
    (0..len)
        .map(|i| {
            let t = i as f32 / DRUM_RATE as f32;
            let freq = 40.0 + 110.0 * (-t * 30.0).exp();
            phase += std::f32::consts::TAU * freq / DRUM_RATE as f32;
            let env = (-t * 12.0).exp();
            (128.0 + 127.0 * env * phase.sin()).round().clamp(0.0, 255.0) as u8
        })
        .collect()
}

/// PSG device that retriggers the drum on every beat
struct Demo {
    psg: PsgDevice,
    drum: Arc<[u8]>,
    beat_cycles: u64,
}

impl Demo {
    fn new(settings: DeviceSettings) -> Self {
        let mut psg = PsgDevice::new(settings);
        let native = settings.native_rate();
        for (index, hz) in CHORD_HZ.iter().enumerate() {
            psg.voice_mut(index).set_frequency(*hz, native);
            psg.voice_mut(index).set_level(11);
        }
        Self {
            psg,
            drum: kick_drum(),
            // two beats per second
            beat_cycles: (native as u64 / 2).max(1),
        }
    }
}

impl SoundDevice for Demo {
    fn step_cycle(&mut self) -> RawStereo {
        if self.psg.cycles() % self.beat_cycles == 0 {
            self.psg.trigger_digi(Arc::clone(&self.drum), DRUM_RATE);
        }
        self.psg.step_cycle()
    }

    fn decode_digi(&mut self) -> i32 {
        self.psg.decode_digi()
    }

    fn playback_speed(&self) -> u32 {
        self.psg.playback_speed()
    }

    fn master_volume(&self) -> i32 {
        self.psg.master_volume()
    }

    fn digi_mixing(&self) -> bool {
        self.psg.digi_mixing()
    }
}

enum Command {
    Render(String),
    Play,
}

struct Options {
    command: Command,
    seconds: f32,
    settings: DeviceSettings,
}

const USAGE: &str = "Usage:
  ym2149-pcm render <out.wav> [flags]
  ym2149-pcm play [flags]            (requires the \"streaming\" feature)

Flags:
  --seconds <s>      Length to render or play (default 4)
  --speed <n>        Native cycles per output frame
  --volume <0-256>   Master volume
  --no-digi          Disable the digi channel
  --config <file>    Load device settings from JSON (flags override it)
  -h, --help         Show this help
";

fn next_value<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> anyhow::Result<T> {
    let raw = args
        .next()
        .with_context(|| format!("{} requires an argument", flag))?;
    raw.parse()
        .map_err(|_| anyhow::anyhow!("invalid value for {}: {}", flag, raw))
}

fn parse_args() -> anyhow::Result<Option<Options>> {
    let mut args = env::args().skip(1);
    let command = match args.next().as_deref() {
        Some("render") => {
            let path = args.next().context("render requires an output path")?;
            Command::Render(path)
        }
        Some("play") => Command::Play,
        Some("-h") | Some("--help") | None => return Ok(None),
        Some(other) => bail!("unknown command: {}", other),
    };

    let mut seconds = DEFAULT_SECONDS;
    let mut settings = DeviceSettings::default();
    let mut speed = None;
    let mut volume = None;
    let mut no_digi = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seconds" => seconds = next_value(&mut args, "--seconds")?,
            "--speed" => speed = Some(next_value(&mut args, "--speed")?),
            "--volume" => volume = Some(next_value(&mut args, "--volume")?),
            "--no-digi" => no_digi = true,
            "--config" => {
                let path: String = next_value(&mut args, "--config")?;
                settings = DeviceSettings::load(&path)
                    .with_context(|| format!("failed to load settings from '{}'", path))?;
            }
            "--help" | "-h" => return Ok(None),
            _ => bail!("unknown flag: {}", arg),
        }
    }

    if let Some(speed) = speed {
        settings = settings.with_playback_speed(speed);
    }
    if let Some(volume) = volume {
        settings = settings.with_master_volume(volume);
    }
    if no_digi {
        settings = settings.with_digi_mixing(false);
    }
    settings.validate()?;
    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("--seconds must be positive");
    }

    Ok(Some(Options {
        command,
        seconds,
        settings,
    }))
}

#[cfg(feature = "export-wav")]
fn render(path: &str, options: &Options) -> anyhow::Result<()> {
    let frames = (options.seconds * options.settings.sample_rate as f32) as usize;
    let mut demo = Demo::new(options.settings);
    ym2149_pcm::export_wav(&mut demo, options.settings.sample_rate, path, frames)
        .with_context(|| format!("failed to export '{}'", path))?;
    println!("Wrote {} frames to {}", frames, path);
    Ok(())
}

#[cfg(not(feature = "export-wav"))]
fn render(_path: &str, _options: &Options) -> anyhow::Result<()> {
    bail!("rendering requires the \"export-wav\" feature")
}

#[cfg(feature = "streaming")]
fn play(options: &Options) -> anyhow::Result<()> {
    use ym2149_pcm::{shared, AudioOutput, StreamConfig};

    let device = shared(Demo::new(options.settings));
    let output = AudioOutput::new(device, options.settings.sample_rate, StreamConfig::default())?;
    println!("Playing for {:.1}s...", options.seconds);
    std::thread::sleep(std::time::Duration::from_secs_f32(options.seconds));
    output.stop();
    Ok(())
}

#[cfg(not(feature = "streaming"))]
fn play(_options: &Options) -> anyhow::Result<()> {
    bail!("playback requires the \"streaming\" feature; rebuild with `--features streaming`")
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let Some(options) = parse_args()? else {
        eprint!("{}", USAGE);
        return Ok(());
    };

    match &options.command {
        Command::Render(path) => render(path, &options),
        Command::Play => play(&options),
    }
}
