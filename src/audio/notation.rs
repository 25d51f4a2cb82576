//! Note-notation parser
//!
//! A track is whitespace-separated `NAME:MS` tokens. `NAME` is a letter
//! `A`-`G`, an optional `#`, and an octave digit (`C4`, `F#3`), or `R` for a
//! rest. `MS` is the note length in milliseconds.

use thiserror::Error;

use crate::consts::SAMPLE_RATE;

/// Concert pitch reference (A4)
const A4_HZ: f32 = 440.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("invalid note token {token:?} at position {index}")]
    InvalidToken { token: String, index: usize },
    #[error("invalid duration in token {token:?} at position {index}")]
    InvalidDuration { token: String, index: usize },
    #[error("track contains no notes")]
    Empty,
}

/// One sequencer entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Hz; 0 is a rest
    pub frequency: f32,
    pub duration_samples: u32,
}

impl Note {
    #[inline]
    pub fn is_rest(&self) -> bool {
        self.frequency == 0.0
    }
}

/// How notation maps to pitch and time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotationConfig {
    /// Multiplier on the equal-tempered frequency
    pub pitch_scale: f32,
    /// Multiplier on written durations
    pub tempo_scale: f32,
    pub sample_rate: u32,
}

impl Default for NotationConfig {
    fn default() -> Self {
        Self {
            pitch_scale: 0.25,
            tempo_scale: 2.0,
            sample_rate: SAMPLE_RATE,
        }
    }
}

/// Parse a whole track, failing on the first bad token
pub fn parse_notation(text: &str, config: &NotationConfig) -> Result<Vec<Note>, NotationError> {
    let notes = text
        .split_whitespace()
        .enumerate()
        .map(|(index, token)| parse_token(token, index, config))
        .collect::<Result<Vec<_>, _>>()?;
    if notes.is_empty() {
        return Err(NotationError::Empty);
    }
    Ok(notes)
}

fn parse_token(token: &str, index: usize, config: &NotationConfig) -> Result<Note, NotationError> {
    let invalid = || NotationError::InvalidToken {
        token: token.to_string(),
        index,
    };
    let (name, ms) = token.split_once(':').ok_or_else(invalid)?;
    let ms: u32 = ms.parse().map_err(|_| NotationError::InvalidDuration {
        token: token.to_string(),
        index,
    })?;

    let frequency = if name == "R" {
        0.0
    } else {
        pitch(name).ok_or_else(invalid)? * config.pitch_scale
    };
    let samples = ms as f64 * config.sample_rate as f64 * config.tempo_scale as f64 / 1000.0;

    Ok(Note {
        frequency,
        duration_samples: samples as u32,
    })
}

/// Equal-tempered frequency of a note name like `C4` or `F#3`
fn pitch(name: &str) -> Option<f32> {
    let bytes = name.as_bytes();
    let (letter, sharp, octave) = match bytes {
        [l, o] => (*l, false, *o),
        [l, b'#', o] => (*l, true, *o),
        _ => return None,
    };
    // Semitones from A within the same octave
    let base: i32 = match letter {
        b'C' => -9,
        b'D' => -7,
        b'E' => -5,
        b'F' => -4,
        b'G' => -2,
        b'A' => 0,
        b'B' => 2,
        _ => return None,
    };
    if !octave.is_ascii_digit() {
        return None;
    }
    let octave = (octave - b'0') as i32;
    let semitones = base + sharp as i32 + (octave - 4) * 12;
    Some(A4_HZ * 2f32.powf(semitones as f32 / 12.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn natural() -> NotationConfig {
        NotationConfig {
            pitch_scale: 1.0,
            tempo_scale: 1.0,
            sample_rate: 22_050,
        }
    }

    #[test]
    fn test_three_tokens_with_rest() {
        let notes = parse_notation("C4:500 R:250 E4:500", &NotationConfig::default()).unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[1].frequency, 0.0);
        assert!(notes[1].is_rest());
        assert!(notes[0].frequency > 0.0);
    }

    #[test]
    fn test_pitch_and_duration() {
        let notes = parse_notation("A4:1000 A5:10 C4:10 F#3:10", &natural()).unwrap();
        assert!((notes[0].frequency - 440.0).abs() < 1e-3);
        assert_eq!(notes[0].duration_samples, 22_050);
        assert!((notes[1].frequency - 880.0).abs() < 1e-2);
        assert!((notes[2].frequency - 261.626).abs() < 1e-2);
        assert!((notes[3].frequency - 184.997).abs() < 1e-2);
    }

    #[test]
    fn test_scales_apply() {
        let notes = parse_notation("A4:100", &NotationConfig::default()).unwrap();
        assert!((notes[0].frequency - 110.0).abs() < 1e-3);
        assert_eq!(notes[0].duration_samples, 4410);
    }

    #[test]
    fn test_invalid_tokens_are_reported() {
        let cfg = natural();
        assert_eq!(
            parse_notation("C4:100 H4:100", &cfg),
            Err(NotationError::InvalidToken {
                token: "H4:100".into(),
                index: 1
            })
        );
        assert!(matches!(
            parse_notation("C4", &cfg),
            Err(NotationError::InvalidToken { index: 0, .. })
        ));
        assert!(matches!(
            parse_notation("C4:abc", &cfg),
            Err(NotationError::InvalidDuration { .. })
        ));
        assert!(matches!(
            parse_notation("Cb4:10", &cfg),
            Err(NotationError::InvalidToken { .. })
        ));
        assert_eq!(parse_notation("   ", &cfg), Err(NotationError::Empty));
    }
}
