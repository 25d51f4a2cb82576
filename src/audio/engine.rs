//! Music and effect producer threads
//!
//! The main thread talks to each producer over its own command channel. The
//! effect thread publishes whether an effect is sounding through an atomic
//! the music thread reads to duck itself. Shutdown clears the running flag,
//! closes both channels and joins both threads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use super::effects::{EffectKind, EffectTables, EffectVoice};
use super::notation::Note;
use super::sink::AudioSink;
use super::voice::MusicVoice;
use crate::consts::{AUDIO_BLOCK_FRAMES, SAMPLE_RATE};

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("no audio output device available")]
    NoDevice,
    #[error("audio device error: {0}")]
    Device(String),
}

/// Producer parameters
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub sample_rate: u32,
    /// Stereo frames per block
    pub block_frames: usize,
    /// Ticks between accepted blaster triggers
    pub shoot_cooldown_frames: u32,
    pub music_gain: f32,
    pub sfx_gain: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            block_frames: AUDIO_BLOCK_FRAMES,
            shoot_cooldown_frames: 10,
            music_gain: 1.0,
            sfx_gain: 1.0,
        }
    }
}

#[derive(Debug)]
enum MusicCommand {
    SetTrack(Vec<Note>),
}

#[derive(Debug)]
enum EffectCommand {
    Play(EffectKind),
}

/// Handle owning both producer threads
pub struct AudioEngine {
    music_tx: Option<Sender<MusicCommand>>,
    effect_tx: Option<Sender<EffectCommand>>,
    running: Arc<AtomicBool>,
    effect_active: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
    cooldown_frames: u32,
    cooldown: u32,
}

impl AudioEngine {
    /// Spawn the producers writing into the given sinks
    ///
    /// `running` is shared with any sink that must stop blocking on shutdown.
    pub fn start(
        music_sink: Box<dyn AudioSink>,
        effect_sink: Box<dyn AudioSink>,
        running: Arc<AtomicBool>,
        config: EngineConfig,
    ) -> Result<Self, AudioError> {
        running.store(true, Ordering::Release);
        let mut engine = Self {
            music_tx: None,
            effect_tx: None,
            running,
            effect_active: Arc::new(AtomicBool::new(false)),
            threads: Vec::with_capacity(2),
            cooldown_frames: config.shoot_cooldown_frames,
            cooldown: 0,
        };

        let (music_tx, music_rx) = mpsc::channel();
        let music = MusicProducer {
            rx: music_rx,
            sink: music_sink,
            running: engine.running.clone(),
            effect_active: engine.effect_active.clone(),
            voice: MusicVoice::idle(config.sample_rate),
            gain: config.music_gain,
            block: vec![0.0; config.block_frames * 2],
        };
        // A failed spawn drops `engine`, which stops anything already started
        engine.threads.push(spawn("music-gen", move || music.run())?);
        engine.music_tx = Some(music_tx);

        let (effect_tx, effect_rx) = mpsc::channel();
        let effects = EffectProducer {
            rx: effect_rx,
            sink: effect_sink,
            running: engine.running.clone(),
            effect_active: engine.effect_active.clone(),
            voice: EffectVoice::new(EffectTables::render(config.sample_rate)),
            gain: config.sfx_gain,
            block: vec![0.0; config.block_frames * 2],
        };
        engine.threads.push(spawn("sfx-gen", move || effects.run())?);
        engine.effect_tx = Some(effect_tx);

        log::info!(
            "Audio producers started at {} Hz ({} frame blocks)",
            config.sample_rate,
            config.block_frames
        );
        Ok(engine)
    }

    /// Switch the looping music track
    pub fn set_track(&self, notes: Vec<Note>) {
        let Some(tx) = &self.music_tx else {
            return;
        };
        if tx.send(MusicCommand::SetTrack(notes)).is_err() {
            log::warn!("Music thread disconnected");
        }
    }

    /// Request an effect; blaster requests inside the cooldown are ignored
    ///
    /// Returns whether the request was forwarded.
    pub fn play(&mut self, kind: EffectKind) -> bool {
        if kind == EffectKind::Blaster {
            if self.cooldown > 0 {
                return false;
            }
            self.cooldown = self.cooldown_frames;
        }
        match &self.effect_tx {
            Some(tx) => tx.send(EffectCommand::Play(kind)).is_ok(),
            None => false,
        }
    }

    /// Advance the trigger cooldown by one game tick
    pub fn tick(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire) && self.threads.iter().all(|h| !h.is_finished())
    }

    /// Stop both producers and wait for them to exit
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        // Close the channels before joining so a producer waiting on a
        // command sees the disconnect
        drop(self.music_tx.take());
        drop(self.effect_tx.take());
        for handle in self.threads.drain(..) {
            let name = handle.thread().name().unwrap_or("audio").to_string();
            if handle.join().is_err() {
                log::warn!("Audio thread {name} panicked");
            } else {
                log::debug!("Audio thread {name} joined");
            }
        }
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn<F>(name: &'static str, body: F) -> Result<JoinHandle<()>, AudioError>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.into())
        .spawn(body)
        .map_err(|source| AudioError::Spawn { name, source })
}

struct MusicProducer {
    rx: Receiver<MusicCommand>,
    sink: Box<dyn AudioSink>,
    running: Arc<AtomicBool>,
    effect_active: Arc<AtomicBool>,
    voice: MusicVoice,
    gain: f32,
    block: Vec<f32>,
}

impl MusicProducer {
    fn run(mut self) {
        log::debug!("Music thread started");
        'produce: while self.running.load(Ordering::Acquire) {
            loop {
                match self.rx.try_recv() {
                    Ok(MusicCommand::SetTrack(notes)) => self.voice.set_track(notes),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => break 'produce,
                }
            }

            let ducked = self.effect_active.load(Ordering::Acquire);
            self.voice.fill_block(&mut self.block, self.gain, ducked);
            if self.sink.write_block(&self.block).is_err() {
                break;
            }
        }
        log::debug!("Music thread finished");
    }
}

struct EffectProducer {
    rx: Receiver<EffectCommand>,
    sink: Box<dyn AudioSink>,
    running: Arc<AtomicBool>,
    effect_active: Arc<AtomicBool>,
    voice: EffectVoice,
    gain: f32,
    block: Vec<f32>,
}

impl EffectProducer {
    fn run(mut self) {
        log::debug!("Effect thread started");
        'produce: while self.running.load(Ordering::Acquire) {
            loop {
                match self.rx.try_recv() {
                    Ok(EffectCommand::Play(kind)) => self.voice.trigger(kind),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => break 'produce,
                }
            }

            self.effect_active
                .store(self.voice.is_active(), Ordering::Release);
            self.voice.fill_block(&mut self.block, self.gain);
            if self.sink.write_block(&self.block).is_err() {
                break;
            }
        }
        self.effect_active.store(false, Ordering::Release);
        log::debug!("Effect thread finished");
    }
}
