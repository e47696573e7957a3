//! Terminal driver around the engine.
//!
//! The driver owns the repeating tick timer, forwards input, and carries out
//! the side effects a [`TickReport`] asks for: redraw, sound, reschedule and
//! persisting a new high score.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEventKind};
use log::{debug, error, info, warn};
use rand::rngs::ThreadRng;
use rand::Rng;
use ratatui::{backend::Backend, Frame, Terminal};

use crate::config::{ConfigError, EngineConfig};
use crate::engine::{Engine, GameState, Snapshot, TickReport};
use crate::high_score::{HighScoreError, HighScoreStore};
use crate::input::{command_for_key, Command, DPad, SwipeTracker};
use crate::sound::SoundBoard;
use crate::ui::{self, Screen};

/// How long to wait for input while the timer is stopped.
const IDLE_POLL: Duration = Duration::from_millis(250);

pub struct App<S, R = ThreadRng> {
    engine: Engine<R>,
    store: S,
    /// Cleared when the store could not be read at all.
    persist: bool,
    sound: SoundBoard,
    swipe: SwipeTracker,
    dpad: DPad,
    snapshot: Snapshot,
    paused: bool,
    exit: bool,
    tick_rate: Duration,
    last_tick: Instant,
}

impl<S: HighScoreStore> App<S> {
    pub fn new(store: S) -> Self {
        let (high_score, persist) = read_high_score(&store);
        App::assemble(Engine::new(high_score), store, persist)
    }
}

impl<S: HighScoreStore, R: Rng> App<S, R> {
    pub fn with_config(config: EngineConfig, store: S, rng: R) -> Result<Self, ConfigError> {
        let (high_score, persist) = read_high_score(&store);
        let engine = Engine::with_config(config, high_score, rng)?;
        Ok(App::assemble(engine, store, persist))
    }

    fn assemble(engine: Engine<R>, store: S, persist: bool) -> Self {
        App {
            snapshot: engine.snapshot(),
            tick_rate: engine.interval(),
            engine,
            store,
            persist,
            sound: SoundBoard::default(),
            swipe: SwipeTracker::default(),
            dpad: DPad::default(),
            paused: false,
            exit: false,
            last_tick: Instant::now(),
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let mut speaker = io::stdout();

        while !self.exit {
            terminal.draw(|f| self.render(f))?;

            if event::poll(self.time_to_next_tick())? {
                self.handle_event(event::read()?);
            }

            if self.timer_running() && self.last_tick.elapsed() >= self.tick_rate {
                self.last_tick = Instant::now();
                self.on_tick(&mut speaker);
            }
            self.ring_bells(Instant::now(), &mut speaker);
        }

        info!("Leaving the arcade");
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        self.dpad = ui::draw(
            frame,
            &Screen {
                snapshot: &self.snapshot,
                paused: self.paused,
                sound_on: self.sound.is_enabled(),
            },
        );
    }

    fn timer_running(&self) -> bool {
        self.engine.is_running() && !self.paused
    }

    /// How long the loop may wait for input before the clock or a bell needs it.
    fn time_to_next_tick(&self) -> Duration {
        let wait = if self.timer_running() {
            self.tick_rate.saturating_sub(self.last_tick.elapsed())
        } else {
            IDLE_POLL
        };
        match self.sound.next_due() {
            Some(due) => wait.min(due.saturating_duration_since(Instant::now())),
            None => wait,
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if let Some(command) = command_for_key(key) {
                    self.handle_command(command);
                }
            }
            Event::Mouse(mouse) => {
                if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                    if let Some(direction) = self.dpad.hit(mouse.column, mouse.row) {
                        self.handle_command(Command::Turn(direction));
                        return;
                    }
                }
                if let Some(direction) = self.swipe.handle(mouse) {
                    self.handle_command(Command::Turn(direction));
                }
            }
            _ => {}
        }
    }

    pub fn handle_command(&mut self, command: Command) {
        match command {
            Command::Turn(direction) => {
                if !self.paused {
                    self.engine.set_intended_direction(direction);
                }
            }
            Command::Select => match self.engine.state() {
                GameState::Running => {
                    self.paused = !self.paused;
                    // Resuming restarts the period from scratch
                    self.last_tick = Instant::now();
                    debug!("{}", if self.paused { "Paused" } else { "Resumed" });
                }
                GameState::Idle | GameState::GameOver(_) => self.start_round(),
            },
            Command::ToggleSound => {
                self.sound.toggle();
            }
            Command::Exit => self.exit = true,
        }
    }

    fn start_round(&mut self) {
        self.snapshot = self.engine.start();
        self.tick_rate = self.snapshot.interval;
        self.paused = false;
        self.last_tick = Instant::now();
    }

    /// Rings whatever part of the queued chimes is due by `now`.
    pub fn ring_bells(&mut self, now: Instant, speaker: &mut impl Write) {
        if let Err(e) = self.sound.ring_due(now, speaker) {
            warn!("Could not play sound: {}", e);
        }
    }

    /// One beat of the timer. Sound goes to `speaker`.
    pub fn on_tick(&mut self, speaker: &mut impl Write) {
        if self.paused {
            return;
        }
        let report = self.engine.tick();
        self.apply(report, speaker);
    }

    fn apply(&mut self, report: TickReport, speaker: &mut impl Write) {
        let now = Instant::now();
        self.sound.queue(&report.cues, now);
        self.ring_bells(now, speaker);

        if let Some(interval) = report.new_interval {
            debug!("Rescheduling tick at {}ms", interval.as_millis());
            self.tick_rate = interval;
        }

        if let Some(score) = report.new_high_score {
            self.save_high_score(score);
        }

        self.snapshot = report.snapshot;
    }

    fn save_high_score(&mut self, score: u32) {
        if !self.persist {
            debug!("High score {} kept in memory only", score);
            return;
        }
        if let Err(e) = self.store.save(score) {
            error!("Error saving high score under {}: {}", self.store.key(), e);
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound.is_enabled()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Reads the stored high score, falling back to 0.
///
/// Returns whether later writes should be attempted: a slot that exists but
/// holds garbage is still writable, an unreachable one is not.
fn read_high_score(store: &impl HighScoreStore) -> (u32, bool) {
    match store.load() {
        Ok(score) => {
            info!("Loaded high score {}", score);
            (score, true)
        }
        Err(e @ HighScoreError::Corrupt(_)) => {
            warn!("Error loading high score: {}", e);
            (0, true)
        }
        Err(e) => {
            error!("Error loading high score: {}", e);
            (0, false)
        }
    }
}
