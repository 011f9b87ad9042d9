//! Audio for answer feedback and background ambience
//!
//! One output per game session, shared by two channels:
//! - `Effect`: short synthesized one-shots that remove themselves when done
//! - `Ambience`: a single looping background track
//!
//! The mixer is pure bookkeeping and emits [`AudioCommand`]s; on wasm32 the
//! [`WebAudioOutput`] turns those into Web Audio oscillators. Sounds are
//! procedurally generated, no files needed.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::Millis;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Right answer
    Correct,
    /// Wrong answer
    Incorrect,
    /// Round finished, completion dialog shown
    RoundComplete,
    /// Object or option tapped
    Tap,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

/// One oscillator in a sound recipe. Times are seconds from the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub freq: f32,
    /// Frequency reached by the end of the tone (exponential glide)
    pub glide_to: Option<f32>,
    pub offset: f32,
    pub duration: f32,
    /// Peak gain before volume scaling
    pub gain: f32,
    pub wave: Waveform,
}

impl Tone {
    const fn note(freq: f32, offset: f32, duration: f32, gain: f32, wave: Waveform) -> Self {
        Self {
            freq,
            glide_to: None,
            offset,
            duration,
            gain,
            wave,
        }
    }

    fn end(&self) -> f32 {
        self.offset + self.duration
    }
}

impl SoundEffect {
    /// Oscillators making up this effect
    pub fn recipe(&self) -> Vec<Tone> {
        match self {
            // Happy rising arpeggio (C5 E5 G5)
            SoundEffect::Correct => [523.25, 659.25, 783.99]
                .iter()
                .enumerate()
                .map(|(i, f)| Tone::note(*f, i as f32 * 0.08, 0.2, 0.3, Waveform::Triangle))
                .collect(),
            // Soft low "uh-oh" rather than a harsh buzz
            SoundEffect::Incorrect => vec![
                Tone {
                    glide_to: Some(180.0),
                    ..Tone::note(260.0, 0.0, 0.18, 0.25, Waveform::Triangle)
                },
                Tone {
                    glide_to: Some(130.0),
                    ..Tone::note(200.0, 0.18, 0.22, 0.25, Waveform::Triangle)
                },
            ],
            // Fanfare
            SoundEffect::RoundComplete => [523.25, 659.25, 783.99, 1046.5]
                .iter()
                .enumerate()
                .map(|(i, f)| Tone::note(*f, i as f32 * 0.1, 0.4, 0.3, Waveform::Triangle))
                .collect(),
            SoundEffect::Tap => vec![Tone::note(600.0, 0.0, 0.06, 0.2, Waveform::Sine)],
        }
    }

    /// Time until the last tone stops
    pub fn duration_ms(&self) -> Millis {
        let end = self
            .recipe()
            .iter()
            .map(Tone::end)
            .fold(0.0f32, f32::max);
        (end * 1000.0).round() as Millis
    }
}

/// Logical playback channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Ambience,
    Effect,
}

/// Handle for one playing sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoiceId(pub u32);

/// What a voice is playing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Sound {
    Effect(SoundEffect),
    /// Looping background track, by name
    Ambience(String),
}

impl Sound {
    pub fn channel(&self) -> Channel {
        match self {
            Sound::Effect(_) => Channel::Effect,
            Sound::Ambience(_) => Channel::Ambience,
        }
    }
}

/// Instruction for the audio backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AudioCommand {
    Play {
        voice: VoiceId,
        sound: Sound,
        volume: f32,
    },
    /// Cut a voice short
    Stop { voice: VoiceId },
    /// Voice finished on its own, drop any handles
    Release { voice: VoiceId },
}

#[derive(Debug, Clone)]
struct Voice {
    id: VoiceId,
    sound: Sound,
    /// `None` for looping ambience
    ends_at: Option<Millis>,
}

/// Voice bookkeeping for one audio output
#[derive(Debug, Clone)]
pub struct AudioMixer {
    volume: f32,
    muted: bool,
    next_id: u32,
    voices: Vec<Voice>,
    commands: Vec<AudioCommand>,
}

impl Default for AudioMixer {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl AudioMixer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            volume: settings.volume.clamp(0.0, 1.0),
            muted: settings.muted,
            next_id: 1,
            voices: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Set volume (0.0 - 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Mute/unmute. Muting silences running ambience too.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.stop_ambience();
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_volume(settings.volume);
        self.set_muted(settings.muted);
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    fn start(&mut self, sound: Sound, ends_at: Option<Millis>) -> Option<VoiceId> {
        let volume = self.effective_volume();
        if volume <= 0.0 {
            return None;
        }
        let id = VoiceId(self.next_id);
        self.next_id += 1;
        self.commands.push(AudioCommand::Play {
            voice: id,
            sound: sound.clone(),
            volume,
        });
        self.voices.push(Voice { id, sound, ends_at });
        Some(id)
    }

    /// Fire a one-shot effect. Returns `None` when silent.
    pub fn play_effect(&mut self, effect: SoundEffect, now: Millis) -> Option<VoiceId> {
        self.start(Sound::Effect(effect), Some(now + effect.duration_ms()))
    }

    /// Start background ambience, replacing whatever was looping
    pub fn start_ambience(&mut self, track: impl Into<String>) -> Option<VoiceId> {
        self.stop_ambience();
        self.start(Sound::Ambience(track.into()), None)
    }

    /// Stop the ambience loop. Effects keep playing.
    pub fn stop_ambience(&mut self) -> bool {
        let ids: Vec<VoiceId> = self
            .voices
            .iter()
            .filter(|v| v.sound.channel() == Channel::Ambience)
            .map(|v| v.id)
            .collect();
        for id in &ids {
            self.stop(*id);
        }
        !ids.is_empty()
    }

    /// Stop a single voice
    pub fn stop(&mut self, voice: VoiceId) -> bool {
        let before = self.voices.len();
        self.voices.retain(|v| v.id != voice);
        let removed = self.voices.len() != before;
        if removed {
            self.commands.push(AudioCommand::Stop { voice });
        }
        removed
    }

    /// Drop effects that finished by `now`, returning their ids
    pub fn update(&mut self, now: Millis) -> Vec<VoiceId> {
        let mut finished = Vec::new();
        self.voices.retain(|v| match v.ends_at {
            Some(end) if end <= now => {
                finished.push(v.id);
                false
            }
            _ => true,
        });
        self.commands
            .extend(finished.iter().map(|&voice| AudioCommand::Release { voice }));
        finished
    }

    /// Number of voices playing on `channel`
    pub fn active(&self, channel: Channel) -> usize {
        self.voices
            .iter()
            .filter(|v| v.sound.channel() == channel)
            .count()
    }

    pub fn is_playing(&self, voice: VoiceId) -> bool {
        self.voices.iter().any(|v| v.id == voice)
    }

    /// Take the commands queued since the last call
    pub fn drain_commands(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.commands)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioOutput;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::collections::HashMap;

    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioCommand, Sound, Tone, VoiceId, Waveform};

    /// Ambience drone pitch (A2)
    const AMBIENCE_FREQ: f32 = 110.0;
    const AMBIENCE_GAIN: f32 = 0.05;

    impl From<Waveform> for OscillatorType {
        fn from(wave: Waveform) -> Self {
            match wave {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Triangle => OscillatorType::Triangle,
                Waveform::Square => OscillatorType::Square,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
            }
        }
    }

    /// Web Audio backend executing mixer commands
    pub struct WebAudioOutput {
        ctx: Option<AudioContext>,
        nodes: HashMap<VoiceId, Vec<OscillatorNode>>,
    }

    impl Default for WebAudioOutput {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudioOutput {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                nodes: HashMap::new(),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn apply(&mut self, command: AudioCommand) {
            match command {
                AudioCommand::Play {
                    voice,
                    sound,
                    volume,
                } => {
                    let oscillators = self.play(&sound, volume);
                    self.nodes.insert(voice, oscillators);
                }
                AudioCommand::Stop { voice } => {
                    for osc in self.nodes.remove(&voice).unwrap_or_default() {
                        osc.stop().ok();
                    }
                }
                AudioCommand::Release { voice } => {
                    self.nodes.remove(&voice);
                }
            }
        }

        fn play(&self, sound: &Sound, vol: f32) -> Vec<OscillatorNode> {
            let Some(ctx) = &self.ctx else {
                return Vec::new();
            };
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match sound {
                Sound::Effect(effect) => effect
                    .recipe()
                    .iter()
                    .filter_map(|tone| self.play_tone(ctx, tone, vol))
                    .collect(),
                Sound::Ambience(track) => {
                    log::debug!("Starting ambience '{}'", track);
                    let Some((osc, gain)) = self.create_osc(ctx, AMBIENCE_FREQ, OscillatorType::Sine)
                    else {
                        return Vec::new();
                    };
                    gain.gain().set_value(vol * AMBIENCE_GAIN);
                    osc.start().ok();
                    vec![osc]
                }
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_tone(&self, ctx: &AudioContext, tone: &Tone, vol: f32) -> Option<OscillatorNode> {
            let (osc, gain) = self.create_osc(ctx, tone.freq, tone.wave.into())?;
            let t = ctx.current_time() + f64::from(tone.offset);
            let end = t + f64::from(tone.duration);

            gain.gain().set_value_at_time(vol * tone.gain, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
            if let Some(target) = tone.glide_to {
                osc.frequency().set_value_at_time(tone.freq, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(target, end)
                    .ok();
            }

            osc.start_with_when(t).ok();
            osc.stop_with_when(end + 0.05).ok();
            Some(osc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_durations() {
        assert_eq!(SoundEffect::Tap.duration_ms(), 60);
        assert_eq!(SoundEffect::Correct.duration_ms(), 360);
        assert_eq!(SoundEffect::Incorrect.duration_ms(), 400);
        assert_eq!(SoundEffect::RoundComplete.duration_ms(), 700);
    }

    #[test]
    fn test_effects_remove_themselves() {
        let mut mixer = AudioMixer::default();
        let voice = mixer.play_effect(SoundEffect::Tap, 1000).unwrap();
        assert_eq!(mixer.active(Channel::Effect), 1);

        assert!(mixer.update(1059).is_empty());
        assert_eq!(mixer.update(1060), vec![voice]);
        assert!(!mixer.is_playing(voice));

        let commands = mixer.drain_commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1], AudioCommand::Release { voice });
    }

    #[test]
    fn test_channels_are_independent() {
        let mut mixer = AudioMixer::default();
        let ambience = mixer.start_ambience("meadow").unwrap();
        let effect = mixer.play_effect(SoundEffect::Correct, 0).unwrap();

        assert!(mixer.stop_ambience());
        assert!(!mixer.is_playing(ambience));
        assert!(mixer.is_playing(effect));

        let again = mixer.start_ambience("meadow").unwrap();
        assert!(mixer.stop(effect));
        assert!(mixer.is_playing(again));
        assert_eq!(mixer.active(Channel::Ambience), 1);
        assert_eq!(mixer.active(Channel::Effect), 0);
    }

    #[test]
    fn test_ambience_replaces_previous_track() {
        let mut mixer = AudioMixer::default();
        let first = mixer.start_ambience("meadow").unwrap();
        let second = mixer.start_ambience("ocean").unwrap();
        assert!(!mixer.is_playing(first));
        assert!(mixer.is_playing(second));
        // Looping ambience never expires on its own
        assert!(mixer.update(u64::MAX).is_empty());
    }

    #[test]
    fn test_muted_mixer_is_silent() {
        let settings = Settings {
            muted: true,
            ..Default::default()
        };
        let mut mixer = AudioMixer::new(&settings);
        assert_eq!(mixer.effective_volume(), 0.0);
        assert!(mixer.play_effect(SoundEffect::Correct, 0).is_none());
        assert!(mixer.drain_commands().is_empty());
    }

    #[test]
    fn test_mute_stops_ambience_only() {
        let mut mixer = AudioMixer::default();
        mixer.start_ambience("meadow");
        let effect = mixer.play_effect(SoundEffect::Tap, 0).unwrap();
        mixer.set_muted(true);
        assert_eq!(mixer.active(Channel::Ambience), 0);
        assert!(mixer.is_playing(effect));
    }

    #[test]
    fn test_play_command_carries_volume() {
        let mut mixer = AudioMixer::default();
        mixer.set_volume(0.5);
        let voice = mixer.play_effect(SoundEffect::Tap, 0).unwrap();
        assert_eq!(
            mixer.drain_commands(),
            vec![AudioCommand::Play {
                voice,
                sound: Sound::Effect(SoundEffect::Tap),
                volume: 0.5,
            }]
        );
    }
}
