//! Persistence slot for the best score across sessions.
//!
//! The stored value is a single integer. A store that cannot be read or
//! written never ends the game: callers log the error and keep playing with
//! whatever they have in memory.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::{HIGH_SCORE_FILE, HIGH_SCORE_KEY};

#[derive(Debug)]
pub enum HighScoreError {
    Io(io::Error),
    /// The slot holds something that is not a score.
    Corrupt(String),
}

impl fmt::Display for HighScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighScoreError::Io(e) => write!(f, "high score storage unavailable: {}", e),
            HighScoreError::Corrupt(content) => {
                write!(f, "stored high score {:?} is not a number", content)
            }
        }
    }
}

impl std::error::Error for HighScoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HighScoreError::Io(e) => Some(e),
            HighScoreError::Corrupt(_) => None,
        }
    }
}

impl From<io::Error> for HighScoreError {
    fn from(e: io::Error) -> Self {
        HighScoreError::Io(e)
    }
}

pub trait HighScoreStore {
    /// Identifier the score is stored under.
    fn key(&self) -> &str {
        HIGH_SCORE_KEY
    }

    /// Reads the stored score. An empty slot reads as 0.
    fn load(&self) -> Result<u32, HighScoreError>;

    fn save(&mut self, score: u32) -> Result<(), HighScoreError>;
}

/// Keeps the score in a small text file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileStore {
    fn default() -> Self {
        FileStore::new(HIGH_SCORE_FILE)
    }
}

impl HighScoreStore for FileStore {
    fn load(&self) -> Result<u32, HighScoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No high score at {}, starting from 0", self.path.display());
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };
        parse_score(&content)
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        fs::write(&self.path, score.to_string())?;
        debug!("Saved high score {} to {}", score, self.path.display());
        Ok(())
    }
}

/// Store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    score: Option<u32>,
}

impl MemoryStore {
    pub fn with_score(score: u32) -> Self {
        MemoryStore { score: Some(score) }
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<u32, HighScoreError> {
        Ok(self.score.unwrap_or(0))
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        self.score = Some(score);
        Ok(())
    }
}

fn parse_score(content: &str) -> Result<u32, HighScoreError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .map_err(|_| HighScoreError::Corrupt(trimmed.to_string()))
}
