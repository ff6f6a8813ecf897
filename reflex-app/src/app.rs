use crate::audio::TonePlayer;
use crate::config::{AppConfig, SharedStore};
use anyhow::{Result, anyhow};
use log::{debug, info, warn};
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use reflex_core::{Millis, PlayerSession, ScoreRecord, Transition};
use reflex_leaderboard::{LeaderboardStore, LeaderboardSummary};
use reflex_render::{FontArc, SkiaRenderer, View};
use reflex_timing::{Clock, DeadlineQueue, FrameWindow, MonotonicClock};
use reflex_trial::{CueTicket, DetachedSubmitter, TrialController};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

type Controller = TrialController<
    MonotonicClock,
    DeadlineQueue<MonotonicClock, CueTicket>,
    ThreadRng,
    DetachedSubmitter<dyn LeaderboardStore + Send + Sync>,
>;

/// Leaderboard rows fetched off the event-loop thread
type Fetched = std::result::Result<Vec<ScoreRecord>, String>;

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    font: Option<FontArc>,
    controller: Controller,
    player: PlayerSession,
    store: SharedStore,
    limit: usize,

    top: Vec<ScoreRecord>,
    best: Option<Millis>,
    summary: Option<Millis>,
    fetch_tx: Sender<Fetched>,
    fetch_rx: Receiver<Fetched>,
    tones: TonePlayer,

    frames: FrameWindow,
    last_frame: Option<Instant>,
    should_exit: bool,
}

impl App {
    pub fn new(config: &AppConfig, player: PlayerSession) -> Self {
        let store = config.open_store();
        let clock = MonotonicClock::new();
        let scheduler = DeadlineQueue::new(clock);
        let controller = TrialController::new(
            config.trial_config(),
            clock,
            scheduler,
            rand::rng(),
            DetachedSubmitter::new(Arc::clone(&store)),
        );
        let (fetch_tx, fetch_rx) = mpsc::channel();
        let font = match reflex_render::load_font(config.font.as_deref()) {
            Ok(font) => Some(font),
            Err(e) => {
                warn!("Prompts disabled: {e:#}");
                None
            }
        };
        let tones = if config.audio {
            TonePlayer::open()
        } else {
            info!("Audio muted");
            TonePlayer::silent()
        };

        Self {
            window: None,
            pixels: None,
            renderer: None,
            font,
            controller,
            player,
            store,
            limit: config.leaderboard_limit,
            top: Vec::new(),
            best: None,
            summary: None,
            fetch_tx,
            fetch_rx,
            tones,
            frames: FrameWindow::default(),
            last_frame: None,
            should_exit: false,
        }
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            "Starting on {}/{} as '{}'",
            std::env::consts::OS,
            std::env::consts::ARCH,
            self.player.name
        );
        info!("Click or press SPACE to start, ESC to exit, L to list scores.");
        self.refresh_leaderboard();

        let result = event_loop.run_app(&mut self);
        self.log_frame_stats();
        result.map_err(Into::into)
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Reflex")
            .with_inner_size(PhysicalSize::new(960u32, 640u32))
            .with_min_inner_size(PhysicalSize::new(320u32, 240u32));

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let size = window.inner_size();
        info!(
            "Window {}x{} at scale {:.2}",
            size.width,
            size.height,
            window.scale_factor()
        );

        let surface_texture = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface_texture)?);
        let mut renderer = SkiaRenderer::new(size.width, size.height)?;
        if let Some(font) = &self.font {
            renderer.set_font(font.clone());
        }
        self.renderer = Some(renderer);

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let Self {
            pixels,
            renderer,
            controller,
            top,
            best,
            summary,
            frames,
            last_frame,
            ..
        } = self;
        let (Some(pixels), Some(renderer)) = (pixels.as_mut(), renderer.as_mut()) else {
            return Ok(());
        };
        let view = match *summary {
            Some(last) => View::Summary {
                last: Some(last),
                top: top.as_slice(),
            },
            None => View::Trial {
                state: controller.state(),
                score: controller.score(),
                best: *best,
            },
        };
        let stats = renderer.render_frame(&view, pixels.frame_mut())?;
        pixels.render()?;

        let now = Instant::now();
        if let Some(prev) = last_frame.replace(now) {
            frames.push(now - prev);
        }
        log::trace!(
            "draw {:.3}ms, copy {:.3}ms, total {:.3}ms",
            stats.draw.as_secs_f64() * 1e3,
            stats.copy.as_secs_f64() * 1e3,
            stats.total.as_secs_f64() * 1e3,
        );
        Ok(())
    }

    fn update(&mut self) {
        for transition in self.controller.update() {
            self.on_transition(transition);
        }
        self.drain_leaderboard();
    }

    fn click(&mut self) {
        if self.summary.take().is_some() {
            debug!("Summary dismissed");
            return;
        }
        let transition = self.controller.click(&self.player);
        self.on_transition(transition);
    }

    fn on_transition(&mut self, transition: Transition) {
        self.tones.on_transition(&transition);
        match transition {
            Transition::Scored { score } => {
                self.best = Some(self.best.map_or(score, |b| b.min(score)));
            }
            Transition::Summary { score } => {
                self.summary = Some(score);
                self.refresh_leaderboard();
            }
            _ => {}
        }
    }

    /// Reads the top scores on a background thread; results land in `update`.
    fn refresh_leaderboard(&self) {
        let store = Arc::clone(&self.store);
        let tx = self.fetch_tx.clone();
        let limit = self.limit;
        thread::spawn(move || {
            let fetched = store.top_n(limit).map_err(|e| e.to_string());
            let _ = tx.send(fetched);
        });
    }

    fn drain_leaderboard(&mut self) {
        while let Ok(fetched) = self.fetch_rx.try_recv() {
            match fetched {
                Ok(top) => {
                    let stored_best = top.first().map(|r| r.score_ms);
                    self.best = match (self.best, stored_best) {
                        (Some(a), Some(b)) => Some(a.min(b)),
                        (a, b) => a.or(b),
                    };
                    self.top = top;
                }
                Err(e) => warn!("Error fetching leaderboard: {e}"),
            }
        }
    }

    fn log_leaderboard(&self) {
        let summary = LeaderboardSummary::from_records(&self.top);
        info!(
            "Leaderboard: {} scores, best {:?}ms, average {:?}ms",
            summary.count, summary.best_ms, summary.average_ms
        );
        for (i, rec) in self.top.iter().enumerate() {
            info!(
                "{:>3}. {:>5}ms  {}  {}",
                i + 1,
                rec.score_ms,
                rec.display_name(),
                rec.created_at.format("%Y-%m-%d %H:%M")
            );
        }
    }

    fn handle_key(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        if let PhysicalKey::Code(k) = key {
            match k {
                KeyCode::Space => self.click(),
                KeyCode::KeyL => {
                    self.log_leaderboard();
                    self.refresh_leaderboard();
                }
                KeyCode::Escape => self.cleanup_and_exit(event_loop),
                _ => {}
            }
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) -> Result<()> {
        if new_size.width == 0 || new_size.height == 0 {
            return Ok(());
        }
        let pixels = self
            .pixels
            .as_mut()
            .ok_or_else(|| anyhow!("resize before surface creation"))?;
        pixels.resize_surface(new_size.width, new_size.height)?;
        pixels.resize_buffer(new_size.width, new_size.height)?;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(new_size.width, new_size.height)?;
        }
        debug!("Resized to {}x{}", new_size.width, new_size.height);
        Ok(())
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        info!(
            "Exiting after {} completed trials",
            self.controller.completed
        );
        self.should_exit = true;
        event_loop.exit();
    }

    fn log_frame_stats(&self) {
        let Some(pacing) = self.frames.pacing() else {
            return;
        };
        let ms = |d: std::time::Duration| d.as_secs_f64() * 1e3;
        info!(
            "Frames: avg {:.3}ms, jitter {:.3}ms, min {:.3}ms, max {:.3}ms, {:.1} fps over {}ms",
            ms(pacing.mean),
            ms(pacing.jitter),
            ms(pacing.shortest),
            ms(pacing.longest),
            pacing.fps(),
            self.controller.clock.now(),
        );
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                log::error!("Failed to create window and surface: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                self.update();
                if let Err(e) = self.render() {
                    log::error!("Render failed: {e:#}");
                    self.cleanup_and_exit(event_loop);
                    return;
                }
                if let Some(win) = &self.window {
                    win.request_redraw();
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.click(),
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                self.handle_key(event.physical_key, event_loop);
            }
            WindowEvent::Resized(size) => {
                if let Err(e) = self.handle_resize(size) {
                    warn!("Failed to resize: {e:#}");
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}
