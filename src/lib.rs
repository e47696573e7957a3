//! A terminal snake cabinet.
//!
//! The game rules live in [`engine`] and know nothing about terminals; the
//! rest of the crate is the driver that feeds them keys and clock ticks.

pub mod app;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod high_score;
pub mod input;
pub mod sound;
pub mod ui;

pub use engine::{Engine, GameState, SoundCue, Snapshot, StepResult, TickReport};
pub use geometry::{Direction, Pos, Size};
