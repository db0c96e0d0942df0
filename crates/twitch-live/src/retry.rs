// Phase retry loop: linear-growth backoff with jitter, an optional sleep cap and an
// overall wall-clock budget per phase.

use std::future::Future;
use std::time::{Duration, Instant};

use rand::RngExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::{Phase, ProbeError};

const BASE_SLEEP_SECS: u64 = 60;
const SLEEP_STEP_SECS: u64 = 30;

/// How long to idle between attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    /// Upper bound on the base sleep in seconds. 0 leaves it uncapped.
    #[serde(default)]
    pub max_sleep_secs: u64,
    /// When false, jitter is always subtracted from the base sleep.
    #[serde(default)]
    pub symmetric_jitter: bool,
}

impl BackoffPolicy {
    pub fn capped(max_sleep_secs: u64) -> Self {
        Self {
            max_sleep_secs,
            ..Default::default()
        }
    }

    /// Base sleep for a 1-indexed attempt, before jitter: `60 + 30 * attempt`, capped.
    pub fn base_for_attempt(&self, attempt: u32) -> u64 {
        let base = BASE_SLEEP_SECS.saturating_add(SLEEP_STEP_SECS.saturating_mul(attempt as u64));
        if self.max_sleep_secs > 0 && base > self.max_sleep_secs {
            self.max_sleep_secs
        } else {
            base
        }
    }

    /// Exclusive upper bound of the jitter drawn for `base`.
    pub fn jitter_bound(base: u64) -> u64 {
        (base / 10).max(1)
    }

    pub fn sleep_for_attempt<R: rand::Rng + ?Sized>(
        &self,
        attempt: u32,
        rng: &mut R,
    ) -> Duration {
        let base = self.base_for_attempt(attempt);
        let jitter = rng.random_range(0..Self::jitter_bound(base));

        let secs = if self.symmetric_jitter && rng.random_bool(0.5) {
            base.saturating_add(jitter)
        } else {
            base.checked_sub(jitter).unwrap_or(self.fallback_secs())
        };
        Duration::from_secs(secs)
    }

    fn fallback_secs(&self) -> u64 {
        if self.max_sleep_secs > 0 {
            self.max_sleep_secs
        } else {
            BASE_SLEEP_SECS
        }
    }
}

/// Bookkeeping for one phase. Never shared between phases.
#[derive(Debug)]
struct RetryState {
    started: Instant,
    attempts: u32,
}

impl RetryState {
    fn start(clock: &impl Clock) -> Self {
        Self {
            started: clock.now(),
            attempts: 0,
        }
    }

    fn next_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    fn elapsed(&self, clock: &impl Clock) -> Duration {
        clock.now().saturating_duration_since(self.started)
    }

    fn exhausted(
        &self,
        phase: Phase,
        elapsed: Duration,
        last_error: Option<ProbeError>,
    ) -> ProbeError {
        ProbeError::Timeout {
            phase,
            elapsed: elapsed.as_secs(),
            attempts: self.attempts,
            last_error: last_error.map(Box::new),
        }
    }
}

/// Drives a phase to completion.
///
/// Without `wait` a phase gets exactly one attempt. With `wait` it repeats
/// until done or until the phase has run longer than `timeout`
/// (`Duration::ZERO` polls forever). The deadline is checked after an
/// attempt, never while sleeping.
#[derive(Debug, Clone)]
pub struct RetryScheduler<C = SystemClock> {
    clock: C,
    policy: BackoffPolicy,
    wait: bool,
    timeout: Duration,
}

impl<C: Clock> RetryScheduler<C> {
    pub fn new(clock: C, policy: BackoffPolicy, wait: bool, timeout: Duration) -> Self {
        Self {
            clock,
            policy,
            wait,
            timeout,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn deadline_passed(&self, elapsed: Duration) -> bool {
        !self.timeout.is_zero() && elapsed > self.timeout
    }

    async fn pause(&self, attempt: u32) {
        let sleep = self.policy.sleep_for_attempt(attempt, &mut rand::rng());
        debug!(attempt, sleep_secs = sleep.as_secs(), "zZz...");
        self.clock.sleep(sleep).await;
    }

    /// Retries `attempt` until it returns `Ok`.
    ///
    /// A failed attempt is fatal straight away when not waiting.
    pub async fn retry_until_ok<T, F, Fut>(
        &self,
        phase: Phase,
        mut attempt: F,
    ) -> Result<T, ProbeError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ProbeError>>,
    {
        let mut state = RetryState::start(&self.clock);
        loop {
            let n = state.next_attempt();
            debug!(attempt = n, "Attempting to fetch {phase}");

            match attempt(n).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!(attempt = n, error = %e, "Attempt failed");
                    let elapsed = state.elapsed(&self.clock);
                    if !self.wait || self.deadline_passed(elapsed) {
                        return Err(state.exhausted(phase, elapsed, Some(e)));
                    }
                    self.pause(n).await;
                }
            }
        }
    }

    /// Polls `attempt` until `done` accepts its output.
    ///
    /// Without `wait` the first output is returned whatever it is.
    pub async fn poll_until<T, F, Fut, P>(
        &self,
        phase: Phase,
        mut attempt: F,
        done: P,
    ) -> Result<T, ProbeError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = T>,
        P: Fn(&T) -> bool,
    {
        let mut state = RetryState::start(&self.clock);
        loop {
            let n = state.next_attempt();
            debug!(attempt = n, "Attempting to fetch {phase}");

            let value = attempt(n).await;
            if !self.wait || done(&value) {
                return Ok(value);
            }

            let elapsed = state.elapsed(&self.clock);
            if self.deadline_passed(elapsed) {
                return Err(state.exhausted(phase, elapsed, None));
            }
            self.pause(n).await;
        }
    }
}
