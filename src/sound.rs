//! Turns engine sound cues into something the player can hear.
//!
//! A terminal can only ring its bell, so each cue is a short chime of bells
//! spaced in time. Bells are queued with their due time and rung by the
//! driver loop; nothing here sleeps.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use log::debug;

use crate::engine::SoundCue;

const BELL: &[u8] = b"\x07";

/// Two quick blips.
const ATE_CHIME: [Duration; 2] = [Duration::ZERO, Duration::from_millis(50)];
/// Two slow buzzes.
const GAME_OVER_CHIME: [Duration; 2] = [Duration::ZERO, Duration::from_millis(200)];

/// Offsets of each bell from the moment the cue fires.
pub fn chime(cue: SoundCue) -> &'static [Duration] {
    match cue {
        SoundCue::Ate => &ATE_CHIME,
        SoundCue::GameOver => &GAME_OVER_CHIME,
    }
}

#[derive(Debug, Clone)]
pub struct SoundBoard {
    enabled: bool,
    pending: Vec<Instant>,
}

impl Default for SoundBoard {
    fn default() -> Self {
        SoundBoard {
            enabled: true,
            pending: Vec::new(),
        }
    }
}

impl SoundBoard {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Flips the mute switch and returns the new setting. Muting drops any
    /// bells still waiting.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.pending.clear();
        }
        debug!("Sound {}", if self.enabled { "on" } else { "off" });
        self.enabled
    }

    /// Schedules the chimes for `cues`, starting at `now`. Does nothing while muted.
    pub fn queue(&mut self, cues: &[SoundCue], now: Instant) {
        if !self.enabled {
            return;
        }
        for &cue in cues {
            self.pending
                .extend(chime(cue).iter().map(|&offset| now + offset));
        }
    }

    /// When the next bell is due, if any is waiting.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().min().copied()
    }

    /// Rings every bell due by `now` and returns how many rang.
    pub fn ring_due(&mut self, now: Instant, out: &mut impl Write) -> io::Result<usize> {
        let before = self.pending.len();
        self.pending.retain(|&due| due > now);
        let due = before - self.pending.len();
        if due == 0 {
            return Ok(0);
        }
        for _ in 0..due {
            out.write_all(BELL)?;
        }
        out.flush()?;
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chimes() {
        assert_eq!(chime(SoundCue::Ate).len(), 2);
        assert_eq!(chime(SoundCue::Ate)[1], Duration::from_millis(50));
        assert_eq!(chime(SoundCue::GameOver)[1], Duration::from_millis(200));
    }

    #[test]
    fn test_bells_follow_the_chime_spacing() {
        let mut board = SoundBoard::default();
        let start = Instant::now();
        let mut out = Vec::new();

        board.queue(&[SoundCue::Ate], start);
        assert_eq!(board.next_due(), Some(start));

        // Only the first blip is due straight away
        assert_eq!(board.ring_due(start, &mut out).ok(), Some(1));
        assert_eq!(out, b"\x07");
        assert_eq!(board.next_due(), Some(start + Duration::from_millis(50)));

        assert_eq!(
            board.ring_due(start + Duration::from_millis(49), &mut out).ok(),
            Some(0)
        );
        assert_eq!(
            board.ring_due(start + Duration::from_millis(50), &mut out).ok(),
            Some(1)
        );
        assert_eq!(out, b"\x07\x07");
        assert_eq!(board.next_due(), None);
    }

    #[test]
    fn test_game_over_chime_is_slower() {
        let mut board = SoundBoard::default();
        let start = Instant::now();
        let mut out = Vec::new();

        board.queue(&[SoundCue::Ate, SoundCue::GameOver], start);
        assert_eq!(
            board.ring_due(start + Duration::from_millis(100), &mut out).ok(),
            Some(3)
        );
        assert_eq!(
            board.ring_due(start + Duration::from_millis(200), &mut out).ok(),
            Some(1)
        );
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_muted_board_is_silent() {
        let mut board = SoundBoard::default();
        let start = Instant::now();
        board.queue(&[SoundCue::GameOver], start);

        assert!(!board.toggle());
        assert_eq!(board.next_due(), None);

        board.queue(&[SoundCue::Ate], start);
        let mut out = Vec::new();
        assert_eq!(
            board.ring_due(start + Duration::from_secs(1), &mut out).ok(),
            Some(0)
        );
        assert!(out.is_empty());

        assert!(board.toggle());
        assert!(board.is_enabled());
    }
}
