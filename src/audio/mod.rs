//! Audio synthesis
//!
//! Two producer threads (music, effects) render fixed-size interleaved
//! stereo blocks into sinks. The device side lives in `output`.

pub mod effects;
pub mod engine;
pub mod notation;
pub mod output;
pub mod sink;
pub mod voice;

pub use effects::{EffectKind, EffectTables, EffectVoice};
pub use engine::{AudioEngine, AudioError, EngineConfig};
pub use notation::{Note, NotationConfig, NotationError, parse_notation};
pub use output::AudioOutput;
pub use sink::{AudioSink, PacedSilence, RecordingSink, RingSink, SinkError};
pub use voice::MusicVoice;
