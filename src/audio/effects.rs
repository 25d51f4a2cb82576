//! Pre-rendered sound effects and the one-shot effect voice
//!
//! Both effects are deterministic, so they are rendered once into sample
//! tables at the output rate and replayed verbatim.

use std::f32::consts::TAU;

/// Blaster length (seconds)
const BLASTER_SECONDS: f32 = 0.15;
/// Level-up arpeggio length (seconds)
const LEVEL_UP_SECONDS: f32 = 0.4;
/// Blaster sweep, high to low (Hz)
const BLASTER_SWEEP: (f32, f32) = (900.0, 100.0);
/// Exponential decay rate of the blaster envelope over its length
const BLASTER_DECAY: f32 = 5.0;
/// C5 E5 G5 C6
const ARPEGGIO_HZ: [f32; 4] = [523.0, 659.0, 784.0, 1047.0];
/// Attack time as a fraction of each arpeggio step
const ARPEGGIO_ATTACK: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Blaster,
    LevelUp,
}

/// Frequency-swept shot: fundamental plus two weak harmonics under an
/// exponentially decaying envelope
pub fn render_blaster(sample_rate: u32) -> Vec<f32> {
    let len = (BLASTER_SECONDS * sample_rate as f32) as usize;
    let mut phase = 0.0f32;
    (0..len)
        .map(|i| {
            let progress = i as f32 / len as f32;
            let freq = BLASTER_SWEEP.0 + (BLASTER_SWEEP.1 - BLASTER_SWEEP.0) * progress;
            let env = (-BLASTER_DECAY * progress).exp() * (1.0 - progress);
            let s = phase.sin() + 0.3 * (2.0 * phase).sin() + 0.08 * (7.0 * phase).sin();
            phase = (phase + TAU * freq / sample_rate as f32) % TAU;
            s * env * 0.9
        })
        .collect()
}

/// Four ascending tones over equal quarters, each with a short attack
pub fn render_level_up(sample_rate: u32) -> Vec<f32> {
    let len = (LEVEL_UP_SECONDS * sample_rate as f32) as usize;
    let mut phase = 0.0f32;
    (0..len)
        .map(|i| {
            let pos = i as f32 / len as f32 * ARPEGGIO_HZ.len() as f32;
            let step = (pos as usize).min(ARPEGGIO_HZ.len() - 1);
            let within = pos - step as f32;
            let env = (within / ARPEGGIO_ATTACK).min(1.0);
            let s = 0.7 * phase.sin() + 0.15 * (3.0 * phase).sin();
            phase = (phase + TAU * ARPEGGIO_HZ[step] / sample_rate as f32) % TAU;
            s * env
        })
        .collect()
}

/// Effect tables rendered for one sample rate
#[derive(Debug, Clone)]
pub struct EffectTables {
    blaster: Vec<f32>,
    level_up: Vec<f32>,
}

impl EffectTables {
    pub fn render(sample_rate: u32) -> Self {
        Self {
            blaster: render_blaster(sample_rate),
            level_up: render_level_up(sample_rate),
        }
    }

    pub fn get(&self, kind: EffectKind) -> &[f32] {
        match kind {
            EffectKind::Blaster => &self.blaster,
            EffectKind::LevelUp => &self.level_up,
        }
    }
}

/// Plays one effect to completion
///
/// A trigger while busy is held (latest wins) and starts when the current
/// effect ends.
#[derive(Debug, Clone)]
pub struct EffectVoice {
    tables: EffectTables,
    playing: Option<(EffectKind, usize)>,
    pending: Option<EffectKind>,
}

impl EffectVoice {
    pub fn new(tables: EffectTables) -> Self {
        Self {
            tables,
            playing: None,
            pending: None,
        }
    }

    pub fn trigger(&mut self, kind: EffectKind) {
        if self.playing.is_some() {
            self.pending = Some(kind);
        } else {
            self.playing = Some((kind, 0));
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.playing.is_some()
    }

    pub fn playing(&self) -> Option<EffectKind> {
        self.playing.map(|(kind, _)| kind)
    }

    fn next_sample(&mut self) -> f32 {
        let Some((kind, cursor)) = self.playing else {
            return 0.0;
        };
        let table = self.tables.get(kind);
        let s = table.get(cursor).copied().unwrap_or(0.0);
        if cursor + 1 >= table.len() {
            self.playing = self.pending.take().map(|k| (k, 0));
        } else {
            self.playing = Some((kind, cursor + 1));
        }
        s
    }

    /// Fill an interleaved stereo block; returns whether an effect is still playing
    pub fn fill_block(&mut self, out: &mut [f32], gain: f32) -> bool {
        for frame in out.chunks_exact_mut(2) {
            let s = self.next_sample() * gain;
            frame[0] = s;
            frame[1] = s;
        }
        self.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_reproducible() {
        let a = EffectTables::render(22_050);
        let b = EffectTables::render(22_050);
        assert_eq!(a.get(EffectKind::Blaster), b.get(EffectKind::Blaster));
        assert_eq!(a.get(EffectKind::Blaster).len(), 3307);
        assert_eq!(a.get(EffectKind::LevelUp).len(), 8820);
    }

    #[test]
    fn test_blaster_decays() {
        let table = render_blaster(22_050);
        let peak = |s: &[f32]| s.iter().fold(0.0f32, |m, x| m.max(x.abs()));
        let quarter = table.len() / 4;
        assert!(peak(&table[..quarter]) > 4.0 * peak(&table[3 * quarter..]));
    }

    #[test]
    fn test_level_up_attack_starts_each_step_silent() {
        let table = render_level_up(22_050);
        let quarter = table.len() / 4;
        for step in 0..4 {
            assert!(table[step * quarter].abs() < 1e-3);
        }
    }

    #[test]
    fn test_effect_plays_to_completion_then_pending() {
        let mut voice = EffectVoice::new(EffectTables::render(8_000));
        voice.trigger(EffectKind::Blaster);
        voice.trigger(EffectKind::LevelUp);
        assert_eq!(voice.playing(), Some(EffectKind::Blaster));

        let blaster_len = render_blaster(8_000).len();
        let mut block = vec![0.0; blaster_len * 2];
        assert!(voice.fill_block(&mut block, 1.0));
        assert_eq!(voice.playing(), Some(EffectKind::LevelUp));

        let mut rest = vec![0.0; render_level_up(8_000).len() * 2];
        assert!(!voice.fill_block(&mut rest, 1.0));
        assert!(!voice.is_active());
    }
}
