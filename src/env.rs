//! The Duet environment
//!
//! Wraps one [`GameState`] behind the usual reset/step interface and owns
//! everything an episode needs besides it: the control source, the seed
//! stream and an optional display.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde_json::{Map, Value};

use crate::config::{ControlMode, EnvConfig};
use crate::consts::{ACTION_COUNT, COORD_OBS_LEN};
use crate::control::{Action, ControlSource, KeyState};
use crate::error::{DuetError, Result};
use crate::observation::{self, Observation, ObservationSpace, PixelFrame};
use crate::renderer::{DrawOptions, DrawSink, draw_frame};
use crate::sim::{GameState, GateLayout, tick_repeated};

/// What one `step` call reports
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// `None` when capture is off
    pub observation: Option<Observation>,
    pub reward: u32,
    pub done: bool,
    /// Always empty for now; kept for the conventional step tuple
    pub info: Map<String, Value>,
}

/// Result of one played-out episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeSummary {
    pub score: u32,
    pub seed: u64,
    pub ticks: u64,
    /// False when the step limit cut the episode short
    pub terminated: bool,
}

pub struct DuetEnv {
    config: EnvConfig,
    control: ControlSource,
    layout: GateLayout,
    /// Episode seeds are drawn from here on every reset
    seeds: Pcg32,
    state: GameState,
    display: Option<Box<dyn DrawSink>>,
    episodes: u64,
}

impl std::fmt::Debug for DuetEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuetEnv")
            .field("config", &self.config)
            .field("control", &self.control)
            .field("state", &self.state)
            .field("display", &self.display.is_some())
            .field("episodes", &self.episodes)
            .finish()
    }
}

impl DuetEnv {
    /// Validate `config` and build a ready-to-step environment
    pub fn new(config: EnvConfig) -> Result<Self> {
        config.validate()?;

        let layout = GateLayout::from_random_flag(config.random_obstacles);
        let mut seeds = Pcg32::seed_from_u64(config.seed);
        let state = GameState::new(seeds.random(), layout);

        log::info!(
            "Duet env: {} observations, {} control, frame skip {}, {} gates",
            config.observation,
            config.control,
            config.frame_skip,
            if config.random_obstacles { "random" } else { "fixed" }
        );

        Ok(Self {
            control: ControlSource::from_mode(config.control),
            config,
            layout,
            seeds,
            state,
            display: None,
            episodes: 0,
        })
    }

    /// Start a new episode with the next seed from the master stream
    pub fn reset(&mut self) -> Option<Observation> {
        let seed = self.seeds.random();
        self.reset_with_seed(seed)
    }

    /// Start a new episode with an explicit obstacle seed
    pub fn reset_with_seed(&mut self, seed: u64) -> Option<Observation> {
        self.state = GameState::new(seed, self.layout);
        self.episodes += 1;
        log::info!("Episode {} started (seed {})", self.episodes, seed);
        self.capture()
    }

    /// Advance `frame_skip` ticks with one action.
    ///
    /// `action` is only read under external control; keyboard and
    /// controller modes pick their own.
    pub fn step(&mut self, action: Option<Action>) -> Result<StepResult> {
        if self.state.is_terminated() {
            return Err(DuetError::EpisodeTerminated);
        }

        let action = self.control.resolve(action, &self.state);

        let options = self.draw_options();
        let display = if self.config.visualize {
            self.display.as_deref_mut()
        } else {
            None
        };
        let outcome = match display {
            Some(sink) => {
                tick_repeated(&mut self.state, action, self.config.frame_skip, |state| {
                    draw_frame(state, &options, sink);
                    sink.present();
                })
            }
            None => tick_repeated(&mut self.state, action, self.config.frame_skip, |_| {}),
        };

        let done = self.state.is_terminated();
        if done {
            log::info!(
                "Episode {} over: score {} after {} ticks",
                self.episodes,
                self.state.score,
                self.state.time_ticks
            );
        }

        Ok(StepResult {
            observation: self.capture(),
            reward: outcome.reward,
            done,
            info: Map::new(),
        })
    }

    /// Step with a raw action index, as agents usually hand them over
    pub fn step_index(&mut self, index: i64) -> Result<StepResult> {
        let action = Action::try_from(index)?;
        self.step(Some(action))
    }

    /// Play the current episode out with the configured control source.
    ///
    /// Stops at termination or after `max_steps` steps, whichever is first.
    pub fn run_episode(&mut self, max_steps: u32) -> Result<EpisodeSummary> {
        let mut steps = 0;
        while !self.is_done() && steps < max_steps {
            self.step(None)?;
            steps += 1;
        }
        if !self.is_done() {
            log::info!("Episode {} stopped after {} steps", self.episodes, steps);
        }
        Ok(EpisodeSummary {
            score: self.state.score,
            seed: self.state.seed,
            ticks: self.state.time_ticks,
            terminated: self.is_done(),
        })
    }

    /// Draw the current frame to the attached display, if any
    pub fn render(&mut self) {
        let options = self.draw_options();
        if let Some(sink) = self.display.as_deref_mut() {
            draw_frame(&self.state, &options, sink);
            sink.present();
        }
    }

    /// Attach a display; returns the one it replaces
    pub fn attach_display(&mut self, sink: Box<dyn DrawSink>) -> Option<Box<dyn DrawSink>> {
        self.display.replace(sink)
    }

    pub fn detach_display(&mut self) -> Option<Box<dyn DrawSink>> {
        self.display.take()
    }

    /// Record held arrow keys (keyboard control only)
    pub fn set_keys(&mut self, keys: KeyState) {
        if let ControlSource::Keyboard(held) = &mut self.control {
            *held = keys;
            return;
        }
        log::warn!("Ignoring key input under {} control", self.control.mode());
    }

    /// Observation of the current state in the configured encoding
    pub fn observe(&self) -> Observation {
        observation::observe(&self.state, self.config.observation)
    }

    pub fn coord_observation(&self) -> [f32; COORD_OBS_LEN] {
        observation::coord_observation(&self.state)
    }

    pub fn pixel_observation(&self) -> PixelFrame {
        observation::pixel_observation(&self.state)
    }

    pub fn observation_space(&self) -> ObservationSpace {
        ObservationSpace::for_mode(self.config.observation)
    }

    pub fn observation_shape(&self) -> Vec<usize> {
        self.observation_space().shape
    }

    pub fn action_count(&self) -> usize {
        ACTION_COUNT
    }

    pub fn control_mode(&self) -> ControlMode {
        self.control.mode()
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access for scripted setups
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn is_done(&self) -> bool {
        self.state.is_terminated()
    }

    fn capture(&self) -> Option<Observation> {
        self.config.capture.then(|| self.observe())
    }

    fn draw_options(&self) -> DrawOptions {
        DrawOptions {
            hitboxes: self.config.draw_hitboxes,
            game_over_banner: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ObservationMode;
    use crate::consts::*;
    use crate::renderer::{Raster, Rgb};
    use crate::sim::{Ball, BallColor, GateKind, Obstacle, ObstacleSet, Rect};
    use glam::Vec2;
    use std::cell::Cell;
    use std::f32::consts::FRAC_PI_2;
    use std::rc::Rc;

    fn coord_config() -> EnvConfig {
        EnvConfig {
            observation: ObservationMode::Coord,
            random_obstacles: false,
            ..Default::default()
        }
    }

    /// Counts presented frames so tests can inspect a boxed sink
    struct Counter(Rc<Cell<u32>>);

    impl DrawSink for Counter {
        fn fill(&mut self, _: Rgb) {}
        fn circle(&mut self, _: Vec2, _: f32, _: Rgb, _: u32) {}
        fn rect(&mut self, _: Rect, _: Rgb, _: u32) {}
        fn text(&mut self, _: &str, _: Vec2, _: u32, _: Rgb) {}
        fn present(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EnvConfig {
            frame_skip: 0,
            ..Default::default()
        };
        assert!(matches!(DuetEnv::new(config), Err(DuetError::InvalidConfig(_))));
    }

    #[test]
    fn test_reset_and_step_shapes() {
        let mut env = DuetEnv::new(coord_config()).unwrap();
        let obs = env.reset().unwrap();
        assert_eq!(obs.to_f32_vec().len(), 12);
        assert_eq!(env.observation_shape(), vec![12]);
        assert_eq!(env.action_count(), 3);

        let result = env.step(Some(Action::Idle)).unwrap();
        assert!(!result.done);
        assert_eq!(result.reward, 0);
        assert!(result.info.is_empty());
        assert!(matches!(result.observation, Some(Observation::Coords(_))));
    }

    #[test]
    fn test_pixel_mode_observation() {
        let mut env = DuetEnv::new(EnvConfig {
            random_obstacles: false,
            ..Default::default()
        })
        .unwrap();
        match env.reset() {
            Some(Observation::Pixels(frame)) => assert_eq!(frame.shape(), (84, 84, 3)),
            other => panic!("expected pixels, got {:?}", other),
        }
    }

    #[test]
    fn test_capture_off_withholds_observation() {
        let mut env = DuetEnv::new(EnvConfig {
            capture: false,
            ..coord_config()
        })
        .unwrap();
        assert!(env.reset().is_none());
        assert!(env.step(None).unwrap().observation.is_none());
    }

    #[test]
    fn test_same_seed_same_episode() {
        let config = EnvConfig {
            observation: ObservationMode::Coord,
            seed: 42,
            frame_skip: 2,
            ..Default::default()
        };
        let mut a = DuetEnv::new(config.clone()).unwrap();
        let mut b = DuetEnv::new(config).unwrap();
        assert_eq!(a.reset(), b.reset());

        let actions = [Action::SpinLeft, Action::Idle, Action::SpinRight];
        for i in 0..400 {
            let action = actions[i % actions.len()];
            let ra = a.step(Some(action)).unwrap();
            let rb = b.step(Some(action)).unwrap();
            assert_eq!(ra, rb);
            if ra.done {
                break;
            }
        }
    }

    #[test]
    fn test_frame_skip_stops_on_collision() {
        let mut env = DuetEnv::new(EnvConfig {
            frame_skip: 4,
            ..coord_config()
        })
        .unwrap();
        env.reset();

        let state = env.state_mut();
        state.blue = Ball::with_theta(BallColor::Blue, 3.0 * FRAC_PI_2);
        state.red = Ball::with_theta(BallColor::Red, FRAC_PI_2);
        // Upper ball sits at y ~ 745; the block bottom reaches it on the second tick
        let top = 745.0 - OBSTACLE_HEIGHT - 2.0 * OBSTACLE_SPEED + 2.0;
        state.obstacles.clear();
        state.obstacles.push_set(ObstacleSet::new(
            0,
            GateKind::CenterBlock,
            vec![Obstacle::new(210.0, top, CENTER_BLOCK_WIDTH, OBSTACLE_HEIGHT)],
        ));

        let result = env.step(Some(Action::Idle)).unwrap();
        assert!(result.done);
        assert_eq!(result.reward, 0);
        assert_eq!(env.state().time_ticks, 2);
        assert!(matches!(env.step(None), Err(DuetError::EpisodeTerminated)));

        env.reset();
        assert!(!env.is_done());
        assert_eq!(env.score(), 0);
    }

    #[test]
    fn test_step_index_rejects_out_of_range() {
        let mut env = DuetEnv::new(coord_config()).unwrap();
        assert!(matches!(env.step_index(7), Err(DuetError::InvalidAction(7))));
        assert!(env.step_index(1).is_ok());
        assert!((env.state().blue.theta() - (std::f32::consts::PI - SPIN_STEP)).abs() < 1e-5);
    }

    #[test]
    fn test_keyboard_control_ignores_step_action() {
        let mut env = DuetEnv::new(EnvConfig {
            control: ControlMode::Keyboard,
            ..coord_config()
        })
        .unwrap();
        env.set_keys(KeyState {
            left: false,
            right: true,
        });
        env.step(Some(Action::SpinLeft)).unwrap();
        let expected = std::f32::consts::PI + SPIN_STEP;
        assert!((env.state().blue.theta() - expected).abs() < 1e-5);
    }

    #[test]
    fn test_render_presents_to_display() {
        let mut env = DuetEnv::new(coord_config()).unwrap();
        env.render();

        let frames = Rc::new(Cell::new(0));
        env.attach_display(Box::new(Counter(frames.clone())));
        env.render();
        assert_eq!(frames.get(), 1);

        let old = env.attach_display(Box::new(Raster::new(540, 960)));
        assert!(old.is_some());
        env.render();
        assert!(env.detach_display().is_some());
    }

    #[test]
    fn test_visualize_draws_intermediate_ticks() {
        let mut env = DuetEnv::new(EnvConfig {
            frame_skip: 4,
            visualize: true,
            ..coord_config()
        })
        .unwrap();
        let frames = Rc::new(Cell::new(0));
        env.attach_display(Box::new(Counter(frames.clone())));
        env.step(None).unwrap();
        assert_eq!(frames.get(), 3);
    }

    #[test]
    fn test_default_config_plays_headless() {
        let mut env = DuetEnv::new(EnvConfig::default().headless()).unwrap();
        assert_eq!(env.control_mode(), ControlMode::Controller);
        for _ in 0..2 {
            assert!(env.reset().is_none());
            let summary = env.run_episode(2000).unwrap();
            assert!(summary.score > 0, "controller scored nothing: {:?}", summary);
            assert_eq!(summary.seed, env.state().seed);
        }
    }

    #[test]
    fn test_run_episode_stops_at_step_limit() {
        let mut env = DuetEnv::new(EnvConfig {
            control: ControlMode::Controller,
            ..coord_config()
        })
        .unwrap();
        let summary = env.run_episode(10).unwrap();
        assert!(!summary.terminated);
        assert_eq!(summary.ticks, 10);
    }
}
