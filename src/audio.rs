//! Trigger-to-note mapping
//!
//! Turns simulation `TriggerEvent`s into note requests a synth host can play.
//! Nothing here makes sound; pitch, spatial gains and voice parameters are
//! computed so a Web Audio (or any other) backend only has to schedule them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Canvas;
use crate::sim::{BallKind, GestureControls, TriggerEvent, Voice};

/// MIDI note at the bottom of the canvas
pub const MIDI_LOW: f32 = 48.0;
/// MIDI span from bottom to top of the canvas
pub const MIDI_SPAN: f32 = 36.0;
/// Master level before gesture volume is applied
pub const BASE_VOLUME_DB: f32 = -6.0;
/// Tempo used to turn note lengths into seconds
pub const DEFAULT_BPM: f32 = 120.0;

/// Map a vertical position to a MIDI note; top of the canvas is highest
pub fn y_to_midi(y: f32, height: f32, pitch_offset: f32) -> f32 {
    let ratio = if height > 0.0 { 1.0 - y / height } else { 0.5 };
    MIDI_LOW + ratio * MIDI_SPAN + pitch_offset
}

/// Equal-tempered frequency of a (fractional) MIDI note
pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * 2f32.powf((midi - 69.0) / 12.0)
}

/// Convert decibels to a linear amplitude
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Four-speaker gains: front-left, front-right, back-left, back-right
///
/// The top of the canvas is the front.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadGains {
    pub fl: f32,
    pub fr: f32,
    pub bl: f32,
    pub br: f32,
}

impl Default for QuadGains {
    fn default() -> Self {
        Self {
            fl: 0.25,
            fr: 0.25,
            bl: 0.25,
            br: 0.25,
        }
    }
}

impl QuadGains {
    /// Bilinear gains for `pos`, normalized to sum to 1
    pub fn at(pos: Vec2, canvas: Canvas) -> Self {
        let Some(n) = canvas.normalize(pos) else {
            return Self::default();
        };
        let (left, right) = (1.0 - n.x, n.x);
        let (top, bottom) = (1.0 - n.y, n.y);
        let gains = Self {
            fl: left * top,
            fr: right * top,
            bl: left * bottom,
            br: right * bottom,
        };
        let sum = gains.sum();
        if sum > 0.0 {
            Self {
                fl: gains.fl / sum,
                fr: gains.fr / sum,
                bl: gains.bl / sum,
                br: gains.br / sum,
            }
        } else {
            gains
        }
    }

    pub fn sum(&self) -> f32 {
        self.fl + self.fr + self.bl + self.br
    }
}

/// Musical note length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteLength {
    Eighth,
    Quarter,
    Half,
}

impl NoteLength {
    /// Duration in beats (quarter note = 1)
    pub fn beats(&self) -> f32 {
        match self {
            NoteLength::Eighth => 0.5,
            NoteLength::Quarter => 1.0,
            NoteLength::Half => 2.0,
        }
    }

    pub fn seconds(&self, bpm: f32) -> f32 {
        self.beats() * 60.0 / bpm
    }

    /// Tone.js-style notation
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteLength::Eighth => "8n",
            NoteLength::Quarter => "4n",
            NoteLength::Half => "2n",
        }
    }
}

/// Oscillator family for a voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Triangle,
    /// Square carrier with FM modulation
    FmSquare,
}

/// ADSR envelope, times in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

/// Static parameters of one voice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceParams {
    pub waveform: Waveform,
    pub envelope: Envelope,
    /// Semitones added to the mapped pitch
    pub transpose: f32,
    pub length: NoteLength,
    pub velocity: f32,
    /// Per-voice level trim
    pub volume_db: f32,
}

impl VoiceParams {
    pub fn for_voice(voice: Voice) -> Self {
        match voice {
            Voice::Ball(BallKind::Pluck) => Self {
                waveform: Waveform::Triangle,
                envelope: Envelope {
                    attack: 0.001,
                    decay: 0.12,
                    sustain: 0.0,
                    release: 0.15,
                },
                transpose: -18.0,
                length: NoteLength::Eighth,
                velocity: 0.9,
                volume_db: 0.0,
            },
            Voice::Ball(BallKind::Metal) => Self {
                waveform: Waveform::FmSquare,
                envelope: Envelope {
                    attack: 0.001,
                    decay: 0.2,
                    sustain: 0.0,
                    release: 0.15,
                },
                transpose: 0.0,
                length: NoteLength::Quarter,
                velocity: 1.0,
                volume_db: 0.0,
            },
            Voice::Ball(BallKind::Pad) => Self {
                waveform: Waveform::Sine,
                envelope: Envelope {
                    attack: 0.4,
                    decay: 1.0,
                    sustain: 0.6,
                    release: 1.8,
                },
                transpose: 6.0,
                length: NoteLength::Half,
                velocity: 1.0,
                volume_db: -12.0,
            },
            Voice::Playhead => Self {
                waveform: Waveform::Sine,
                envelope: Envelope {
                    attack: 0.01,
                    decay: 0.1,
                    sustain: 0.1,
                    release: 0.2,
                },
                transpose: 0.0,
                length: NoteLength::Eighth,
                velocity: 1.0,
                volume_db: 0.0,
            },
        }
    }
}

/// Everything a synth host needs to play one trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRequest {
    pub voice: Voice,
    pub frequency: f32,
    pub midi: f32,
    pub gains: QuadGains,
    pub length: NoteLength,
    pub duration: f32,
    pub velocity: f32,
    pub params: VoiceParams,
    /// Output level in dB: base level plus gesture volume
    pub master_db: f32,
    /// `master_db` plus the voice trim, as linear amplitude
    pub gain: f32,
}

impl NoteRequest {
    pub fn from_event(event: &TriggerEvent, canvas: Canvas, controls: &GestureControls) -> Self {
        let params = VoiceParams::for_voice(event.voice);
        let midi =
            y_to_midi(event.pitch_y, canvas.height, controls.pitch_semitones) + params.transpose;
        let master_db = BASE_VOLUME_DB + controls.volume_db;
        Self {
            voice: event.voice,
            frequency: midi_to_hz(midi),
            midi,
            gains: QuadGains::at(event.position, canvas),
            length: params.length,
            duration: params.length.seconds(DEFAULT_BPM),
            velocity: params.velocity,
            params,
            master_db,
            gain: db_to_gain(master_db + params.volume_db),
        }
    }

    /// Map every event of a frame
    pub fn from_events(events: &[TriggerEvent], canvas: Canvas, controls: &GestureControls) -> Vec<Self> {
        events
            .iter()
            .map(|event| Self::from_event(event, canvas, controls))
            .collect()
    }
}
