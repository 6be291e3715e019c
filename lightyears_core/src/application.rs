//! Fixed-timestep application loop
//!
//! Real elapsed time is accumulated and consumed in constant steps of
//! `1 / target_framerate`. Each step runs, in order:
//!
//! 1. world tick (actors, stage, timers)
//! 2. physics step and transform sync
//! 3. cleanup cycle, once enough simulated time has passed
//! 4. render into the window
//!
//! The cleanup interval is measured in simulated time so a run is
//! reproducible regardless of the host's frame rate.

use crate::config::EngineConfig;
use crate::error::GameResult;
use crate::render::{Window, WindowEvent};
use crate::world::World;
use nalgebra::Vector2;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct Application<W: Window> {
    window: W,
    world: World,
    config: EngineConfig,
    target_delta_time: f32,
    accumulated_time: f32,
    time_since_clean: f32,
    steps: u64,
    shut_down: bool,
}

impl<W: Window> Application<W> {
    pub fn new(window: W, config: &EngineConfig) -> Self {
        let mut world = World::from_config(config);
        world.set_window_size(window.size());
        Self {
            window,
            world,
            config: config.clone(),
            target_delta_time: config.target_delta_time(),
            accumulated_time: 0.0,
            time_since_clean: 0.0,
            steps: 0,
            shut_down: false,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn target_delta_time(&self) -> f32 {
        self.target_delta_time
    }

    /// Fixed steps run since start
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Replace the current world with a fresh one built by `setup`.
    ///
    /// The old world's physics is torn down first. If `setup` fails the
    /// old (now shut down) world is kept and the error returned.
    pub fn load_world(&mut self, setup: impl FnOnce(&mut World) -> GameResult<()>) -> GameResult<()> {
        self.world.shutdown();

        let mut world = World::from_config(&self.config);
        world.set_window_size(self.window.size());
        setup(&mut world)?;

        self.world = world;
        self.accumulated_time = 0.0;
        self.time_since_clean = 0.0;
        info!("World loaded");
        Ok(())
    }

    /// Feed real elapsed seconds into the accumulator and run every fixed
    /// step that became due. Returns the number of steps run.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        let elapsed = if elapsed.is_finite() {
            elapsed.clamp(0.0, self.config.max_frame_time)
        } else {
            0.0
        };
        self.accumulated_time += elapsed;

        let mut steps = 0;
        while self.accumulated_time >= self.target_delta_time {
            self.accumulated_time -= self.target_delta_time;
            self.tick_internal(self.target_delta_time);
            self.render_internal();
            steps += 1;
        }
        steps
    }

    fn tick_internal(&mut self, delta_time: f32) {
        self.world.tick_internal(delta_time);
        self.world.step_physics(delta_time);
        self.steps += 1;

        self.time_since_clean += delta_time;
        if self.time_since_clean >= self.config.clean_cycle_interval {
            self.time_since_clean -= self.config.clean_cycle_interval;
            self.clean_cycle();
        }
    }

    fn render_internal(&mut self) {
        self.window.clear();
        self.world.render(&mut self.window);
        self.window.display();
    }

    /// Deferred destruction flush plus asset eviction
    pub fn clean_cycle(&mut self) {
        let actors = self.world.clean_cycle();
        let textures = self.world.assets_mut().clean_cycle();
        debug!(
            "Cleanup cycle at step {}: {} actor(s), {} texture(s) released",
            self.steps, actors, textures
        );
    }

    fn handle_events(&mut self) {
        while let Some(event) = self.window.poll_event() {
            match event {
                WindowEvent::Closed => self.window.close(),
                WindowEvent::Resized { width, height } => {
                    self.world.set_window_size(Vector2::new(width, height));
                }
            }
        }
    }

    /// Run in real time until the window closes, then shut down.
    pub fn run(&mut self) {
        info!(
            "Application started: {}x{} at {} Hz",
            self.config.window.width, self.config.window.height, self.config.target_framerate
        );
        let mut last = Instant::now();
        while self.window.is_open() {
            self.handle_events();
            if !self.window.is_open() {
                break;
            }

            let now = Instant::now();
            let elapsed = now.duration_since(last).as_secs_f32();
            last = now;

            if self.advance(elapsed) == 0 {
                let wait = (self.target_delta_time - self.accumulated_time).max(0.0);
                std::thread::sleep(Duration::from_secs_f32(wait));
            }
        }
        self.shutdown();
    }

    /// Run one fixed step per iteration, ignoring wall time, until the
    /// window closes. Used by headless runs and tests.
    pub fn run_simulated(&mut self) {
        info!(
            "Application started (simulated clock, {} Hz)",
            self.config.target_framerate
        );
        while self.window.is_open() {
            self.handle_events();
            if !self.window.is_open() {
                break;
            }
            self.advance(self.target_delta_time);
        }
        self.shutdown();
    }

    /// Release physics resources. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.world.shutdown();
        info!("Application stopped after {} step(s)", self.steps);
    }
}
