use anyhow::{Result, anyhow, bail};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, StreamConfig};
use log::{debug, error, info, warn};
use reflex_core::Transition;
use std::f32::consts::TAU;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

/// A short sine blip with an exponential pitch glide and gain decay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub start_hz: f32,
    pub end_hz: f32,
    /// Time to reach `end_hz`; the pitch holds after that.
    pub glide: Duration,
    pub gain: f32,
    pub length: Duration,
}

/// Gain the envelope decays to by the end of a tone.
const TAIL_GAIN: f32 = 0.01;

impl Tone {
    /// Trial armed.
    pub const ARM: Tone = Tone::steady(400.0, 0.2, Duration::from_millis(100));
    /// Cue shown.
    pub const CUE: Tone = Tone::steady(1000.0, 0.25, Duration::from_millis(80));
    /// Reaction scored.
    pub const SUCCESS: Tone = Tone {
        start_hz: 800.0,
        end_hz: 1200.0,
        glide: Duration::from_millis(100),
        gain: 0.3,
        length: Duration::from_millis(200),
    };
    /// Clicked too early.
    pub const FAIL: Tone = Tone::steady(200.0, 0.3, Duration::from_millis(300));

    const fn steady(hz: f32, gain: f32, length: Duration) -> Self {
        Self {
            start_hz: hz,
            end_hz: hz,
            glide: length,
            gain,
            length,
        }
    }

    pub fn for_transition(transition: &Transition) -> Option<Tone> {
        match transition {
            Transition::Armed { .. } => Some(Self::ARM),
            Transition::CueShown { .. } => Some(Self::CUE),
            Transition::Scored { .. } => Some(Self::SUCCESS),
            Transition::Penalized => Some(Self::FAIL),
            _ => None,
        }
    }

    /// Mono samples at `sample_rate`.
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let rate = sample_rate as f32;
        let n = (self.length.as_secs_f32() * rate).round() as usize;
        let glide = self.glide.as_secs_f32().max(f32::EPSILON);
        let length = self.length.as_secs_f32().max(f32::EPSILON);
        let ratio = self.end_hz / self.start_hz;

        let mut phase = 0.0f32;
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let t = i as f32 / rate;
            let hz = self.start_hz * ratio.powf((t / glide).min(1.0));
            let gain = self.gain * (TAIL_GAIN / self.gain).powf(t / length);
            out.push(phase.sin() * gain);
            phase = (phase + TAU * hz / rate) % TAU;
        }
        out
    }
}

/// Plays tones on the default output device from a dedicated thread.
///
/// A missing or broken device leaves the player silent.
pub struct TonePlayer {
    sink: Option<Sink>,
}

struct Sink {
    tones: Sender<Arc<Vec<f32>>>,
    sample_rate: u32,
    /// Dropping this ends the audio thread and closes the stream.
    _alive: Sender<()>,
}

impl TonePlayer {
    pub fn silent() -> Self {
        Self { sink: None }
    }

    pub fn open() -> Self {
        let (tone_tx, tone_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();
        let (alive_tx, alive_rx) = mpsc::channel::<()>();
        let spawned = thread::Builder::new()
            .name("reflex-audio".into())
            .spawn(move || match open_stream(tone_rx) {
                Ok((stream, rate)) => {
                    let _ = ready_tx.send(Ok(rate));
                    // blocks until the player is dropped
                    let _ = alive_rx.recv();
                    drop(stream);
                    debug!("Audio stream closed");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            });
        if let Err(e) = spawned {
            warn!("Audio disabled: cannot start audio thread: {e}");
            return Self::silent();
        }

        match ready_rx.recv() {
            Ok(Ok(sample_rate)) => Self {
                sink: Some(Sink {
                    tones: tone_tx,
                    sample_rate,
                    _alive: alive_tx,
                }),
            },
            Ok(Err(e)) => {
                warn!("Audio disabled: {e:#}");
                Self::silent()
            }
            Err(_) => {
                warn!("Audio disabled: audio thread exited during setup");
                Self::silent()
            }
        }
    }

    pub fn is_silent(&self) -> bool {
        self.sink.is_none()
    }

    pub fn play(&self, tone: Tone) {
        let Some(sink) = &self.sink else {
            return;
        };
        if sink.tones.send(Arc::new(tone.render(sink.sample_rate))).is_err() {
            debug!("Audio stream gone; dropping tone");
        }
    }

    pub fn on_transition(&self, transition: &Transition) {
        if let Some(tone) = Tone::for_transition(transition) {
            self.play(tone);
        }
    }
}

fn open_stream(tones: Receiver<Arc<Vec<f32>>>) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("no audio output device"))?;
    let config = device.default_output_config()?;
    let stream_config: StreamConfig = config.config();
    let rate = stream_config.sample_rate.0;

    let stream = match config.sample_format() {
        SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, tones)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, tones)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, tones)?,
        other => bail!("unsupported sample format {other:?}"),
    };
    stream.play()?;
    info!("Audio ready ({} Hz, {} ch)", rate, stream_config.channels);
    Ok((stream, rate))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    tones: Receiver<Arc<Vec<f32>>>,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut active: Vec<(Arc<Vec<f32>>, usize)> = Vec::new();
    let stream = device.build_output_stream(
        config,
        move |out: &mut [T], _: &cpal::OutputCallbackInfo| {
            active.extend(tones.try_iter().map(|t| (t, 0)));
            for frame in out.chunks_mut(channels) {
                let mut mixed = 0.0f32;
                for (samples, cursor) in active.iter_mut() {
                    if let Some(s) = samples.get(*cursor) {
                        mixed += s;
                        *cursor += 1;
                    }
                }
                frame.fill(T::from_sample(mixed.clamp(-1.0, 1.0)));
            }
            active.retain(|(samples, cursor)| *cursor < samples.len());
        },
        |err| error!("Audio stream error: {err}"),
        None,
    )?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0, |m, s| m.max(s.abs()))
    }

    fn crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count()
    }

    #[test]
    fn tones_follow_trial_transitions() {
        assert_eq!(
            Tone::for_transition(&Transition::Armed {
                delay: Duration::from_millis(1500)
            }),
            Some(Tone::ARM)
        );
        assert_eq!(
            Tone::for_transition(&Transition::CueShown { cue_at: 9 }),
            Some(Tone::CUE)
        );
        assert_eq!(
            Tone::for_transition(&Transition::Scored { score: 200 }),
            Some(Tone::SUCCESS)
        );
        assert_eq!(
            Tone::for_transition(&Transition::Penalized),
            Some(Tone::FAIL)
        );
        assert_eq!(Tone::for_transition(&Transition::Reset), None);
        assert_eq!(Tone::for_transition(&Transition::Ignored), None);
    }

    #[test]
    fn render_length_and_envelope() {
        let samples = Tone::FAIL.render(48_000);
        assert_eq!(samples.len(), 14_400);
        assert!(peak(&samples) <= Tone::FAIL.gain + 1e-6);
        let head = peak(&samples[..1_000]);
        let tail = peak(&samples[samples.len() - 1_000..]);
        assert!(tail < head * 0.1, "head {head} tail {tail}");
    }

    #[test]
    fn steady_tone_holds_pitch() {
        // 200 Hz over 0.3 s: about 60 cycles, two crossings each
        let c = crossings(&Tone::FAIL.render(48_000));
        assert!((118..=122).contains(&c), "{c}");
    }

    #[test]
    fn success_sweep_rises() {
        let samples = Tone::SUCCESS.render(48_000);
        // first 50 ms sits near 800-1000 Hz, the last 50 ms holds 1200 Hz
        let early = crossings(&samples[..2_400]);
        let late = crossings(&samples[samples.len() - 2_400..]);
        assert!(late > early, "early {early} late {late}");
        assert!((118..=122).contains(&late), "{late}");
    }

    #[test]
    fn silent_player_ignores_tones() {
        let player = TonePlayer::silent();
        assert!(player.is_silent());
        player.on_transition(&Transition::Penalized);
    }
}
