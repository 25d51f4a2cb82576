//! Looping squarewave music voice

use std::f32::consts::TAU;

use super::notation::Note;

/// Peak amplitude of the music squarewave
pub const MUSIC_AMPLITUDE: f32 = 0.15;
/// Music is divided by this while an effect plays
pub const DUCK_DIVISOR: f32 = 3.0;

/// Sequencer cursor over a note list, looping forever
#[derive(Debug, Clone)]
pub struct MusicVoice {
    notes: Vec<Note>,
    index: usize,
    remaining: u32,
    phase: f32,
    sample_rate: u32,
}

impl MusicVoice {
    pub fn new(notes: Vec<Note>, sample_rate: u32) -> Self {
        let remaining = notes.first().map(|n| n.duration_samples).unwrap_or(0);
        Self {
            notes,
            index: 0,
            remaining,
            phase: 0.0,
            sample_rate,
        }
    }

    /// Silent voice
    pub fn idle(sample_rate: u32) -> Self {
        Self::new(Vec::new(), sample_rate)
    }

    /// Replace the track and restart from its first note
    pub fn set_track(&mut self, notes: Vec<Note>) {
        *self = Self::new(notes, self.sample_rate);
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Next mono sample
    pub fn next_sample(&mut self) -> f32 {
        if !self.advance() {
            return 0.0;
        }
        self.remaining -= 1;

        let freq = self.notes[self.index].frequency;
        if freq <= 0.0 {
            return 0.0;
        }
        let out = if self.phase.sin() >= 0.0 {
            MUSIC_AMPLITUDE
        } else {
            -MUSIC_AMPLITUDE
        };
        self.phase += TAU * freq / self.sample_rate as f32;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        out
    }

    /// Move past exhausted notes; false if nothing is playable
    fn advance(&mut self) -> bool {
        let mut skipped = 0;
        while self.remaining == 0 {
            if self.notes.is_empty() || skipped > self.notes.len() {
                return false;
            }
            self.index = (self.index + 1) % self.notes.len();
            self.remaining = self.notes[self.index].duration_samples;
            skipped += 1;
        }
        true
    }

    /// Fill an interleaved stereo block
    pub fn fill_block(&mut self, out: &mut [f32], gain: f32, ducked: bool) {
        let gain = if ducked { gain / DUCK_DIVISOR } else { gain };
        for frame in out.chunks_exact_mut(2) {
            let s = self.next_sample() * gain;
            frame[0] = s;
            frame[1] = s;
        }
    }
}
