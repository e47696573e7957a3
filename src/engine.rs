//! The snake simulation.
//!
//! [`Engine`] is a synchronous state machine: the driver calls
//! [`Engine::start`], forwards directions with
//! [`Engine::set_intended_direction`] and calls [`Engine::tick`] from its own
//! timer. Nothing here sleeps, draws, beeps or writes files; every tick returns
//! a [`TickReport`] saying what the driver should do about it.

use std::collections::VecDeque;
use std::time::Duration;

use log::{debug, info, warn};
use rand::rngs::ThreadRng;
use rand::seq::IteratorRandom;
use rand::Rng;

use crate::config::{ConfigError, EngineConfig};
use crate::geometry::{Direction, Pos, Size};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Idle,
    Running,
    GameOver(Ending),
}

/// Why a round stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ending {
    HitWall,
    HitSelf,
    /// The snake covers every cell, so there is nowhere left for food.
    BoardCleared,
}

/// Symbolic sound events for the driver to turn into noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    Ate,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// Tick arrived while no round was running; nothing changed.
    Stalled,
    Ongoing,
    Nommed(u32),
    Over(Ending),
}

/// Everything needed to redraw the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub state: GameState,
    pub size: Size,
    /// Head first.
    pub snake: Vec<Pos>,
    pub direction: Direction,
    pub food: Option<Pos>,
    pub score: u32,
    pub interval: Duration,
    pub high_score: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub step: StepResult,
    pub snapshot: Snapshot,
    /// Set when the food was relocated this tick.
    pub food_moved: Option<Pos>,
    pub score_delta: u32,
    /// Set when the driver has to reschedule its timer.
    pub new_interval: Option<Duration>,
    pub cues: Vec<SoundCue>,
    /// Value the driver should persist as the new high score.
    pub new_high_score: Option<u32>,
}

impl TickReport {
    fn neutral(snapshot: Snapshot) -> Self {
        TickReport {
            step: StepResult::Stalled,
            snapshot,
            food_moved: None,
            score_delta: 0,
            new_interval: None,
            cues: Vec::new(),
            new_high_score: None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.step, StepResult::Over(_))
    }
}

#[derive(Debug)]
pub struct Engine<R = ThreadRng> {
    config: EngineConfig,
    rng: R,
    state: GameState,
    snake: VecDeque<Pos>,
    direction: Direction,
    intended: Direction,
    food: Option<Pos>,
    score: u32,
    interval: Duration,
    high_score: u32,
}

impl Engine<ThreadRng> {
    /// Engine on the standard board, seeded with a previously stored high score.
    pub fn new(high_score: u32) -> Self {
        Engine::build(EngineConfig::default(), high_score, rand::thread_rng())
    }
}

impl<R: Rng> Engine<R> {
    pub fn with_config(
        config: EngineConfig,
        high_score: u32,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Engine::build(config, high_score, rng))
    }

    fn build(config: EngineConfig, high_score: u32, rng: R) -> Self {
        Engine {
            snake: spawn_snake(&config),
            direction: Direction::Right,
            intended: Direction::Right,
            food: None,
            score: 0,
            interval: config.base_tick,
            state: GameState::Idle,
            config,
            rng,
            high_score,
        }
    }

    /// Throws away the current round and begins a new one.
    pub fn start(&mut self) -> Snapshot {
        self.snake = spawn_snake(&self.config);
        self.direction = Direction::Right;
        self.intended = Direction::Right;
        self.score = 0;
        self.interval = self.config.base_tick;
        self.food = None;
        self.state = GameState::Running;

        match self.place_food() {
            Some(food) => self.food = Some(food),
            None => {
                warn!("Board is full before the first move");
                self.state = GameState::GameOver(Ending::BoardCleared);
            }
        }

        info!(
            "Round started on a {}x{} board, food at {:?}",
            self.config.size.width, self.config.size.height, self.food
        );
        self.snapshot()
    }

    /// Buffers a turn for the next tick.
    ///
    /// Requests are dropped while no round is running and when they would
    /// reverse the snake onto its own neck. A later request before the next
    /// tick replaces an earlier one. Returns whether the request was kept.
    pub fn set_intended_direction(&mut self, direction: Direction) -> bool {
        if self.state != GameState::Running || direction.is_opposite(self.direction) {
            return false;
        }
        self.intended = direction;
        true
    }

    /// Advances the snake by one cell.
    pub fn tick(&mut self) -> TickReport {
        if self.state != GameState::Running {
            return TickReport::neutral(self.snapshot());
        }

        self.direction = self.intended;
        let Some(&head) = self.snake.front() else {
            return TickReport::neutral(self.snapshot());
        };

        let Some(new_head) = head.checked_add(self.direction.into(), self.config.size) else {
            debug!("Snake hit the wall heading {:?} from {:?}", self.direction, head);
            return self.finish(Ending::HitWall, 0, Vec::new());
        };

        // The tail has not moved out of the way yet, so running into it counts
        if self.snake.contains(&new_head) {
            debug!("Snake ran into itself at {:?}", new_head);
            return self.finish(Ending::HitSelf, 0, Vec::new());
        }

        self.snake.push_front(new_head);

        if self.food != Some(new_head) {
            self.snake.pop_back();
            return self.report(StepResult::Ongoing, None, 0, None, Vec::new());
        }

        let before = self.score;
        self.score = self.score.saturating_add(self.config.points_per_morsel);
        let points = self.score - before;
        let new_interval = self.speed_up();
        debug!("Nommed at {:?}, score {}", new_head, self.score);

        match self.place_food() {
            Some(food) => {
                self.food = Some(food);
                self.report(
                    StepResult::Nommed(points),
                    Some(food),
                    points,
                    new_interval,
                    vec![SoundCue::Ate],
                )
            }
            None => {
                self.food = None;
                let mut report = self.finish(Ending::BoardCleared, points, vec![SoundCue::Ate]);
                report.new_interval = new_interval;
                report
            }
        }
    }

    fn finish(&mut self, ending: Ending, score_delta: u32, mut cues: Vec<SoundCue>) -> TickReport {
        self.state = GameState::GameOver(ending);
        cues.push(SoundCue::GameOver);

        let new_high_score = if self.score > self.high_score {
            self.high_score = self.score;
            Some(self.score)
        } else {
            None
        };

        match ending {
            Ending::BoardCleared => info!("Board cleared with score {}", self.score),
            _ => info!("Game over ({:?}), final score {}", ending, self.score),
        }
        if let Some(score) = new_high_score {
            info!("New high score: {}", score);
        }

        TickReport {
            step: StepResult::Over(ending),
            snapshot: self.snapshot(),
            food_moved: None,
            score_delta,
            new_interval: None,
            cues,
            new_high_score,
        }
    }

    fn report(
        &self,
        step: StepResult,
        food_moved: Option<Pos>,
        score_delta: u32,
        new_interval: Option<Duration>,
        cues: Vec<SoundCue>,
    ) -> TickReport {
        TickReport {
            step,
            snapshot: self.snapshot(),
            food_moved,
            score_delta,
            new_interval,
            cues,
            new_high_score: None,
        }
    }

    /// Shortens the tick interval, never below the configured floor.
    fn speed_up(&mut self) -> Option<Duration> {
        let next = self
            .interval
            .saturating_sub(self.config.tick_step)
            .max(self.config.min_tick);
        if next == self.interval {
            return None;
        }
        self.interval = next;
        Some(next)
    }

    /// Picks a uniformly random cell the snake does not occupy.
    ///
    /// Random picks are only tried while most of the board is free; once the
    /// snake gets long, or the attempt budget runs out, the free cells are
    /// enumerated instead. Returns `None` when the board is full.
    fn place_food(&mut self) -> Option<Pos> {
        let size = self.config.size;
        let free = size.area().saturating_sub(self.snake.len());
        if free == 0 {
            return None;
        }

        if free * 4 >= size.area() {
            for _ in 0..self.config.placement_attempts {
                let pos = random_pos(&mut self.rng, size);
                if !self.snake.contains(&pos) {
                    return Some(pos);
                }
            }
            debug!(
                "No free cell after {} random picks, scanning the board",
                self.config.placement_attempts
            );
        }

        let snake = &self.snake;
        size.positions()
            .filter(|pos| !snake.contains(pos))
            .choose(&mut self.rng)
    }
}

impl<R> Engine<R> {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            size: self.config.size,
            snake: self.snake.iter().copied().collect(),
            direction: self.direction,
            food: self.food,
            score: self.score,
            interval: self.interval,
            high_score: self.high_score,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == GameState::Running
    }

    pub fn snake(&self) -> impl Iterator<Item = &Pos> + '_ {
        self.snake.iter()
    }

    pub fn head(&self) -> Option<Pos> {
        self.snake.front().copied()
    }

    pub fn len(&self) -> usize {
        self.snake.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snake.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn food(&self) -> Option<Pos> {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Current time between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn size(&self) -> Size {
        self.config.size
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

fn spawn_snake(config: &EngineConfig) -> VecDeque<Pos> {
    let head = config.spawn_head;
    (0..config.initial_length)
        .map(|i| Pos::new(head.x - i, head.y))
        .collect()
}

fn random_pos(rng: &mut impl Rng, size: Size) -> Pos {
    Pos {
        x: rng.gen_range(0..size.width),
        y: rng.gen_range(0..size.height),
    }
}
