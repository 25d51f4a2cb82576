//! Demon Blaster entry point
//!
//! Loads settings, scores and levels, starts the audio producers, then
//! runs the fixed-step game loop inside a winit event loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use demon_blaster::audio::{
    AudioEngine, AudioOutput, AudioSink, EffectKind, EngineConfig, NotationConfig, PacedSilence,
};
use demon_blaster::consts::{
    AUDIO_BLOCK_FRAMES, MAX_SUBSTEPS, SAMPLE_RATE, SCREEN_HEIGHT, SCREEN_WIDTH, TICKS_PER_SECOND,
};
use demon_blaster::highscores::{HIGH_SCORES_FILE, HighScoreTable};
use demon_blaster::persistence;
#[cfg(feature = "gamepad")]
use demon_blaster::platform::gamepad::Gamepads;
use demon_blaster::platform::{FixedStep, FpsCounter, InputState};
use demon_blaster::renderer::{Presenter, Renderer};
use demon_blaster::settings::{SETTINGS_FILE, Settings};
use demon_blaster::sim::{GameEvent, GameSession, GameState, LevelSet, TickInput, Tuning, tick};

/// Window starts at twice the internal resolution
const WINDOW_SCALE: f64 = 2.0;

/// Audio engine plus the device stream it feeds (absent when silent)
struct Audio {
    engine: AudioEngine,
    output: Option<AudioOutput>,
}

impl Audio {
    /// Open the device, falling back to paced silence, and start the producers
    fn start(settings: &Settings) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(false));
        let (output, music, effects, sample_rate): (
            Option<AudioOutput>,
            Box<dyn AudioSink>,
            Box<dyn AudioSink>,
            u32,
        ) = match AudioOutput::open(running.clone()) {
            Ok((output, music, effects)) => {
                let rate = output.sample_rate();
                (Some(output), Box::new(music), Box::new(effects), rate)
            }
            Err(e) => {
                log::warn!("No audio output ({}); continuing silently", e);
                (
                    None,
                    Box::new(PacedSilence::new(SAMPLE_RATE)),
                    Box::new(PacedSilence::new(SAMPLE_RATE)),
                    SAMPLE_RATE,
                )
            }
        };

        let engine = AudioEngine::start(
            music,
            effects,
            running,
            EngineConfig {
                sample_rate,
                block_frames: AUDIO_BLOCK_FRAMES,
                shoot_cooldown_frames: settings.shoot_cooldown_frames,
                music_gain: settings.music_gain(),
                sfx_gain: settings.sfx_gain(),
            },
        )
        .context("failed to start audio producers")?;

        Ok(Self { engine, output })
    }

    fn sample_rate(&self) -> u32 {
        self.output
            .as_ref()
            .map_or(SAMPLE_RATE, AudioOutput::sample_rate)
    }

    /// Producers stop before the stream they feed is closed
    fn shutdown(self) {
        let Self { engine, output } = self;
        engine.shutdown();
        drop(output);
        log::info!("Audio stopped");
    }
}

/// Configured level pack, or the built-in set when it is missing or invalid
fn load_levels(settings: &Settings, data_dir: &Path, notation: &NotationConfig) -> Result<LevelSet> {
    if let Some(pack) = &settings.level_pack {
        let path = if pack.is_relative() {
            data_dir.join(pack)
        } else {
            pack.clone()
        };
        match LevelSet::from_json_file(&path, notation) {
            Ok(levels) => {
                log::info!("Loaded {} levels from {}", levels.len(), path.display());
                return Ok(levels);
            }
            Err(e) => log::warn!(
                "Level pack {} rejected ({}); using built-in levels",
                path.display(),
                e
            ),
        }
    }
    LevelSet::builtin(notation).context("built-in levels are invalid")
}

struct App {
    data_dir: PathBuf,
    tuning: Tuning,
    levels: LevelSet,
    scores: HighScoreTable,
    session: GameSession,
    input: InputState,
    #[cfg(feature = "gamepad")]
    gamepads: Option<Gamepads>,
    step: FixedStep,
    fps: FpsCounter,
    renderer: Renderer,
    audio: Option<Audio>,
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new() -> Result<Self> {
        let data_dir = persistence::data_dir();
        log::info!("Data directory: {}", data_dir.display());

        let settings_path = data_dir.join(SETTINGS_FILE);
        let settings = Settings::load(&settings_path);
        if !settings_path.exists() {
            if let Err(e) = settings.save(&settings_path) {
                log::warn!("Could not write default settings: {}", e);
            }
        }
        let scores = HighScoreTable::load(&data_dir.join(HIGH_SCORES_FILE));

        // Note lengths depend on the device rate, so audio opens before levels load
        let audio = Audio::start(&settings)?;
        let levels = load_levels(&settings, &data_dir, &settings.notation(audio.sample_rate()))?;
        let session = GameSession::new(&levels);

        Ok(Self {
            tuning: settings.tuning(),
            renderer: Renderer::new(SCREEN_WIDTH, SCREEN_HEIGHT, &settings),
            data_dir,
            levels,
            scores,
            session,
            input: InputState::new(),
            #[cfg(feature = "gamepad")]
            gamepads: Gamepads::new(),
            step: FixedStep::new(TICKS_PER_SECOND, MAX_SUBSTEPS),
            fps: FpsCounter::new(),
            audio: Some(audio),
            window: None,
            presenter: None,
            fatal: None,
        })
    }

    fn held_input(&mut self) -> TickInput {
        #[cfg(feature = "gamepad")]
        let held = match &mut self.gamepads {
            Some(pads) => demon_blaster::platform::input::merge(self.input.keys(), pads.poll()),
            None => self.input.keys(),
        };
        #[cfg(not(feature = "gamepad"))]
        let held = self.input.keys();
        held
    }

    /// Run however many ticks are due and route their side effects
    fn update(&mut self, now: Instant) {
        let ticks = self.step.advance(now);
        for _ in 0..ticks {
            let input = self.held_input();
            tick(
                &mut self.session,
                &input,
                &self.levels,
                &mut self.scores,
                &self.tuning,
            );
            for event in self.session.drain_events() {
                self.dispatch(event);
            }
            if let Some(audio) = &mut self.audio {
                audio.engine.tick();
            }
        }
    }

    fn dispatch(&mut self, event: GameEvent) {
        match event {
            GameEvent::Shot => {
                if let Some(audio) = &mut self.audio {
                    audio.engine.play(EffectKind::Blaster);
                }
            }
            GameEvent::LevelUp => {
                if let Some(audio) = &mut self.audio {
                    audio.engine.play(EffectKind::LevelUp);
                }
            }
            GameEvent::Music(cue) => {
                log::debug!("Music cue {:?}", cue);
                if let Some(audio) = &self.audio {
                    let notes = self.levels.track(cue).map(<[_]>::to_vec);
                    audio.engine.set_track(notes.unwrap_or_default());
                }
            }
            GameEvent::HighScoresChanged => {
                let path = self.data_dir.join(HIGH_SCORES_FILE);
                if let Err(e) = self.scores.save(&path) {
                    log::warn!("High scores not saved: {}", e);
                }
            }
            GameEvent::EnemyKilled => log::debug!("Enemy killed"),
            GameEvent::PlayerHit => log::debug!("Player hit"),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        self.update(now);

        if self.input.take_quit() && self.session.state == GameState::Title {
            log::info!("Quit requested");
            event_loop.exit();
            return;
        }

        let fps = self.fps.frame(now);
        let frame = self
            .renderer
            .render(&self.session, &self.levels, &self.scores, fps);
        let Some(presenter) = &mut self.presenter else {
            return;
        };
        match presenter.present(frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => presenter.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fatal = Some(anyhow::anyhow!("GPU out of memory"));
                event_loop.exit();
            }
            Err(e) => log::warn!("Frame dropped: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let size = LogicalSize::new(
            SCREEN_WIDTH as f64 * WINDOW_SCALE,
            SCREEN_HEIGHT as f64 * WINDOW_SCALE,
        );
        let attributes = Window::default_attributes()
            .with_title("Demon Blaster")
            .with_inner_size(size)
            .with_min_inner_size(LogicalSize::new(SCREEN_WIDTH as f64, SCREEN_HEIGHT as f64));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fatal = Some(anyhow::Error::new(e).context("failed to create window"));
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(Presenter::new(
            window.clone(),
            SCREEN_WIDTH as u32,
            SCREEN_HEIGHT as u32,
        )) {
            Ok(presenter) => self.presenter = Some(presenter),
            Err(e) => {
                self.fatal = Some(anyhow::Error::new(e).context("failed to initialize graphics"));
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
        self.window = Some(window);
        log::info!("Window ready");
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(presenter) = &mut self.presenter {
                    presenter.resize(size.width, size.height);
                }
            }
            WindowEvent::Focused(false) => self.input.clear(),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.input.key(code, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = &self.window else {
            return;
        };
        let now = Instant::now();
        let wait = self.step.until_next(now);
        if wait.is_zero() {
            window.request_redraw();
            event_loop.set_control_flow(ControlFlow::Wait);
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(now + wait));
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(audio) = self.audio.take() {
            audio.shutdown();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Demon Blaster {} starting", env!("CARGO_PKG_VERSION"));

    let mut app = App::new()?;
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    if let Some(audio) = app.audio.take() {
        audio.shutdown();
    }
    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
