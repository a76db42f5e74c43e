//! Timer Abstraction
//!
//! A `Timer` runs a setup snippet once and then an executable snippet a given
//! number of times, reporting the elapsed wall-clock seconds of the loop only.
//! The engine never interprets snippet text; it just hands it to the timer.

use thiserror::Error;

/// Errors reported by a timer
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TimerError {
    /// The setup or executable snippet failed to run.
    #[error("snippet failed: {0}")]
    SnippetFailed(String),

    /// The timer produced a negative or non-finite elapsed time.
    #[error("timer returned an invalid reading: {0}")]
    InvalidReading(f64),

    /// I/O failure while driving the snippet.
    #[error("I/O error while timing: {0}")]
    Io(#[from] std::io::Error),
}

/// Executes snippets and reports elapsed seconds.
///
/// Implementations are driven from a single thread of control; the engine
/// never calls a timer concurrently.
pub trait Timer {
    /// Run `setup` once, then `snippet` `loops` times, returning the elapsed
    /// seconds of the loop.
    fn time(&self, setup: &str, snippet: &str, loops: u64) -> Result<f64, TimerError>;

    /// Take `repeat` independent timings at a fixed loop count.
    fn repeat(
        &self,
        setup: &str,
        snippet: &str,
        repeat: usize,
        loops: u64,
    ) -> Result<Vec<f64>, TimerError> {
        (0..repeat)
            .map(|_| self.time(setup, snippet, loops))
            .collect()
    }
}

impl<T: Timer + ?Sized> Timer for &T {
    fn time(&self, setup: &str, snippet: &str, loops: u64) -> Result<f64, TimerError> {
        (**self).time(setup, snippet, loops)
    }

    fn repeat(
        &self,
        setup: &str,
        snippet: &str,
        repeat: usize,
        loops: u64,
    ) -> Result<Vec<f64>, TimerError> {
        (**self).repeat(setup, snippet, repeat, loops)
    }
}

impl<T: Timer + ?Sized> Timer for Box<T> {
    fn time(&self, setup: &str, snippet: &str, loops: u64) -> Result<f64, TimerError> {
        (**self).time(setup, snippet, loops)
    }

    fn repeat(
        &self,
        setup: &str,
        snippet: &str,
        repeat: usize,
        loops: u64,
    ) -> Result<Vec<f64>, TimerError> {
        (**self).repeat(setup, snippet, repeat, loops)
    }
}

/// Timer backed by a closure.
///
/// Handy for in-process timing and for deterministic fakes.
pub struct FnTimer<F> {
    f: F,
}

impl<F> FnTimer<F>
where
    F: Fn(&str, &str, u64) -> Result<f64, TimerError>,
{
    /// Wrap a closure `(setup, snippet, loops) -> seconds`
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Timer for FnTimer<F>
where
    F: Fn(&str, &str, u64) -> Result<f64, TimerError>,
{
    fn time(&self, setup: &str, snippet: &str, loops: u64) -> Result<f64, TimerError> {
        (self.f)(setup, snippet, loops)
    }
}
