//! Persist the high score to disk (XDG config or ~/.config/blockfall).

use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

const FILENAME: &str = "highscore";

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("failed to access high score file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("high score file {path} does not contain a number: {content:?}")]
    Parse { path: PathBuf, content: String },
}

/// Where the best score lives between sessions. `save` is only called with a value that beats
/// the last one loaded or saved.
pub trait HighScoreStore {
    fn load(&self) -> Result<u32, HighScoreError>;
    fn save(&mut self, score: u32) -> Result<(), HighScoreError>;
}

/// Base config directory: $XDG_CONFIG_HOME, else $HOME/.config, else the working directory.
pub fn config_dir() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join("blockfall")
}

/// Single decimal number in a text file. A missing file reads as 0.
#[derive(Debug, Clone)]
pub struct FileHighScores {
    path: PathBuf,
}

impl FileHighScores {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/blockfall/highscore`.
    pub fn default_location() -> Self {
        Self::new(config_dir().join(FILENAME))
    }
}

impl HighScoreStore for FileHighScores {
    fn load(&self) -> Result<u32, HighScoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(HighScoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        trimmed.parse().map_err(|_| HighScoreError::Parse {
            path: self.path.clone(),
            content: trimmed.to_string(),
        })
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        let io_err = |source| HighScoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, format!("{score}\n")).map_err(io_err)
    }
}

/// Keeps the score in memory only; used by tests and when persistence is turned off.
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScores {
    best: u32,
    pub saves: usize,
}

impl MemoryHighScores {
    #[cfg(test)]
    pub fn with_score(best: u32) -> Self {
        Self { best, saves: 0 }
    }
}

impl HighScoreStore for MemoryHighScores {
    fn load(&self) -> Result<u32, HighScoreError> {
        Ok(self.best)
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        self.best = score;
        self.saves += 1;
        Ok(())
    }
}

impl<S: HighScoreStore + ?Sized> HighScoreStore for Box<S> {
    fn load(&self) -> Result<u32, HighScoreError> {
        (**self).load()
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        (**self).save(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_path(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir()
            .join(format!("blockfall-test-{}-{n}", std::process::id()))
            .join(name)
    }

    #[test]
    fn missing_file_loads_zero() {
        let store = FileHighScores::new(temp_path("missing"));
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn save_creates_directory_and_round_trips() {
        let path = temp_path("highscore");
        let mut store = FileHighScores::new(&path);
        store.save(1234).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1234\n");
        assert_eq!(FileHighScores::new(&path).load().unwrap(), 1234);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let path = temp_path("garbage");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "lots\n").unwrap();
        let err = FileHighScores::new(&path).load().unwrap_err();
        assert!(matches!(err, HighScoreError::Parse { ref content, .. } if content == "lots"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn memory_store_counts_saves() {
        let mut store = MemoryHighScores::with_score(50);
        assert_eq!(store.load().unwrap(), 50);
        store.save(90).unwrap();
        assert_eq!(store.load().unwrap(), 90);
        assert_eq!(store.saves, 1);
    }
}
