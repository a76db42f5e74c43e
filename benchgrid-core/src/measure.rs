//! Adaptive Measurement
//!
//! Finds a loop count whose runtime clears `mintime`, then repeats the timing
//! at that fixed count.
//!
//! Loop counts grow by powers of two rather than ten. Final runtimes land in
//! roughly `[mintime, 2 * mintime]` instead of `[mintime, 10 * mintime]`, and
//! candidates of similar speed settle on the same loop count, which keeps
//! their numbers comparable.

use crate::error::ConfigurationError;
use crate::timer::{Timer, TimerError};
use crate::trial::Measurement;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default minimum runtime of one timing (250 ms)
pub const DEFAULT_MINTIME: Duration = Duration::from_millis(250);

/// Default number of timings per trial
pub const DEFAULT_NUMREPEAT: usize = 3;

/// Upper bound on loop-count probing rounds
pub const MAX_PROBE_ROUNDS: usize = 32;

/// Measurement settings shared by every trial of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureConfig {
    /// A timing must exceed this before the loop count is fixed
    pub mintime: Duration,
    /// Timings taken at the fixed loop count (the last probe counts as one)
    pub numrepeat: usize,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            mintime: DEFAULT_MINTIME,
            numrepeat: DEFAULT_NUMREPEAT,
        }
    }
}

impl MeasureConfig {
    /// Create a validated configuration
    pub fn new(mintime: Duration, numrepeat: usize) -> Result<Self, ConfigurationError> {
        let config = Self { mintime, numrepeat };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the probing loop cannot work with
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.mintime.is_zero() {
            return Err(ConfigurationError::NonPositiveMintime(self.mintime));
        }
        if self.numrepeat == 0 {
            return Err(ConfigurationError::ZeroRepeat);
        }
        Ok(())
    }
}

/// Loop multiplier for the next probing round.
///
/// Close to the target a doubling is enough. Further out the jump grows, but
/// some bands deliberately aim short of the target so the final count stays
/// within a factor of two of the minimum that clears it.
fn growth_factor(runtime: f64, mintime: f64) -> u64 {
    if runtime > mintime / 2.0 {
        2
    } else if runtime > mintime / 4.0 {
        4
    } else if runtime > mintime / 8.0 {
        8
    } else if runtime > mintime / 16.0 {
        2 // aim short (to x8)
    } else if runtime > mintime / 32.0 {
        8 // aim short (to x4)
    } else if runtime > mintime / 64.0 {
        8 // aim short (to x8)
    } else {
        2
    }
}

fn checked(reading: f64) -> Result<f64, TimerError> {
    if reading.is_finite() && reading >= 0.0 {
        Ok(reading)
    } else {
        Err(TimerError::InvalidReading(reading))
    }
}

/// Measure one snippet.
///
/// Returns per-iteration times (`numrepeat` entries, the last one being the
/// final probe) and the loop count used. If probing never clears `mintime`
/// the last probed loop count is used and the result is flagged degenerate.
pub fn measure<T: Timer + ?Sized>(
    setup: &str,
    snippet: &str,
    config: &MeasureConfig,
    timer: &T,
) -> Result<Measurement, TimerError> {
    let mintime = config.mintime.as_secs_f64();
    let mut loops: u64 = 1;
    let mut runtime = 0.0;
    let mut converged = false;

    for round in 0..MAX_PROBE_ROUNDS {
        runtime = checked(timer.time(setup, snippet, loops)?)?;
        debug!(round, loops, runtime, "probe");

        if runtime > mintime {
            converged = true;
            break;
        }
        // Keep `loops` paired with the runtime it produced
        if round + 1 == MAX_PROBE_ROUNDS {
            break;
        }
        loops = loops.saturating_mul(growth_factor(runtime, mintime));
    }

    if !converged {
        warn!(
            loops,
            runtime,
            mintime,
            "probing exhausted {} rounds without exceeding mintime; results are low-confidence",
            MAX_PROBE_ROUNDS
        );
    }

    let mut times = timer.repeat(setup, snippet, config.numrepeat.saturating_sub(1), loops)?;
    for t in &times {
        checked(*t)?;
    }
    times.push(runtime);

    let per_iter = times.into_iter().map(|t| t / loops as f64).collect();
    Ok(Measurement::new(loops, per_iter, !converged))
}

/// Pin the current process to a single CPU.
///
/// Child processes spawned afterwards inherit the affinity, which keeps
/// timings from migrating between cores. A CPU number outside the
/// affinity mask is rejected with `InvalidInput`.
#[cfg(target_os = "linux")]
pub fn pin_to_cpu(cpu: usize) -> Result<(), std::io::Error> {
    use std::mem::MaybeUninit;

    let max_cpus = 8 * std::mem::size_of::<libc::cpu_set_t>();
    if cpu >= max_cpus {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("CPU {} is outside the affinity mask (0..{})", cpu, max_cpus),
        ));
    }

    unsafe {
        let mut set = MaybeUninit::<libc::cpu_set_t>::zeroed();
        let set_ref = set.assume_init_mut();

        libc::CPU_ZERO(set_ref);
        libc::CPU_SET(cpu, set_ref);

        let result = libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), set_ref);

        if result == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }
}

/// Pin the current process to a single CPU (no-op on this platform).
#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu(_cpu: usize) -> Result<(), std::io::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::FnTimer;
    use std::cell::{Cell, RefCell};

    fn config(mintime_ms: u64, numrepeat: usize) -> MeasureConfig {
        MeasureConfig::new(Duration::from_millis(mintime_ms), numrepeat).unwrap()
    }

    #[test]
    fn test_defaults() {
        let c = MeasureConfig::default();
        assert_eq!(c.mintime, Duration::from_millis(250));
        assert_eq!(c.numrepeat, 3);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        assert_eq!(
            MeasureConfig::new(Duration::ZERO, 3),
            Err(ConfigurationError::NonPositiveMintime(Duration::ZERO))
        );
        assert_eq!(
            MeasureConfig::new(Duration::from_millis(1), 0),
            Err(ConfigurationError::ZeroRepeat)
        );
    }

    #[test]
    fn test_growth_table() {
        let m = 1.0;
        assert_eq!(growth_factor(0.6, m), 2);
        assert_eq!(growth_factor(0.3, m), 4);
        assert_eq!(growth_factor(0.2, m), 8);
        assert_eq!(growth_factor(0.1, m), 2);
        assert_eq!(growth_factor(0.05, m), 8);
        assert_eq!(growth_factor(0.02, m), 8);
        assert_eq!(growth_factor(0.001, m), 2);
    }

    #[test]
    fn test_converges_above_mintime() {
        // 1 ms per iteration, mintime 250 ms
        let timer = FnTimer::new(|_, _, loops| Ok(loops as f64 * 1e-3));
        let m = measure("", "x", &config(250, 3), &timer).unwrap();

        assert!(m.loops >= 1);
        assert!(!m.degenerate);
        assert_eq!(m.times.len(), 3);
        assert!(m.loops as f64 * m.min_time > 0.25);
        // Final runtime stays well below a decimal-growth overshoot
        assert!(m.loops as f64 * 1e-3 < 0.25 * 8.0);
        for t in &m.times {
            assert!((t - 1e-3).abs() < 1e-12);
        }
    }

    #[test]
    fn test_slow_snippet_single_probe() {
        let calls = Cell::new(0u32);
        let timer = FnTimer::new(|_, _, loops| {
            calls.set(calls.get() + 1);
            Ok(loops as f64 * 2.0)
        });
        let m = measure("", "x", &config(250, 3), &timer).unwrap();

        assert_eq!(m.loops, 1);
        assert_eq!(m.times, vec![2.0, 2.0, 2.0]);
        // one probe + two extra repetitions
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_last_probe_is_reused_last() {
        let readings = RefCell::new(Vec::new());
        let counter = Cell::new(0u32);
        let timer = FnTimer::new(|_, _, loops| {
            counter.set(counter.get() + 1);
            // probe reading is distinguishable from the repeats
            let scale = if counter.get() == 1 { 1.0 } else { 0.5 };
            let reading = scale * loops as f64;
            readings.borrow_mut().push(reading);
            Ok(reading)
        });
        let m = measure("", "x", &config(100, 2), &timer).unwrap();

        assert_eq!(m.loops, 1);
        assert_eq!(m.times, vec![0.5, 1.0]);
        assert_eq!(m.min_time, 0.5);
        assert_eq!(readings.borrow().len(), 2);
    }

    #[test]
    fn test_degenerate_probe_keeps_matching_loops() {
        let calls = Cell::new(0usize);
        let timer = FnTimer::new(|_, _, _| {
            calls.set(calls.get() + 1);
            Ok(0.0)
        });
        let m = measure("", "x", &config(10, 3), &timer).unwrap();

        assert!(m.degenerate);
        assert!(m.loops >= 1);
        // 2^31 after 31 doublings, never grown past the last probe
        assert_eq!(m.loops, 1u64 << (MAX_PROBE_ROUNDS - 1));
        assert_eq!(calls.get(), MAX_PROBE_ROUNDS + 2);
    }

    #[test]
    fn test_setup_and_snippet_are_forwarded() {
        let seen = RefCell::new(Vec::new());
        let timer = FnTimer::new(|setup: &str, snippet: &str, _| {
            seen.borrow_mut().push((setup.to_string(), snippet.to_string()));
            Ok(1.0)
        });
        measure("import x", "x.run()", &config(1, 1), &timer).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], ("import x".to_string(), "x.run()".to_string()));
    }

    #[test]
    fn test_invalid_reading_is_rejected() {
        let timer = FnTimer::new(|_, _, _| Ok(f64::NAN));
        let err = measure("", "x", &config(1, 1), &timer).unwrap_err();
        assert!(matches!(err, TimerError::InvalidReading(_)));
    }

    #[test]
    fn test_timer_error_propagates() {
        let timer = FnTimer::new(|_, _, _| Err(TimerError::SnippetFailed("exit 1".into())));
        assert!(measure("", "x", &config(1, 1), &timer).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_pin_out_of_range_cpu_is_rejected() {
        let err = pin_to_cpu(100_000).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);

        let max_cpus = 8 * std::mem::size_of::<libc::cpu_set_t>();
        let err = pin_to_cpu(max_cpus).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
