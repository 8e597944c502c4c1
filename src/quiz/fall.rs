/// Identifies one `begin` call. Only the matching token can cancel it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CancelToken(u64);

/// Position of the falling word at one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallTick {
    pub elapsed_ms: u64,
    pub progress: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FallEvent {
    Tick(FallTick),
    /// Emitted once per `begin`, when progress reaches 1.0.
    Expired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Falling { started_at_ms: u64, deadline_ms: u64 },
    Expired,
    Cancelled,
}

/// Timed descent of the active question.
///
/// The host polls once per frame; progress is derived from wall-clock time
/// since `begin`, so a slow or irregular frame rate never stretches the
/// deadline. After expiry or cancellation every poll returns `None` until
/// the next `begin`.
#[derive(Debug)]
pub struct FallScheduler {
    phase: Phase,
    epoch: u64,
}

impl FallScheduler {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            epoch: 0,
        }
    }

    pub fn begin(&mut self, now_ms: u64, deadline_ms: u64) -> CancelToken {
        self.epoch += 1;
        self.phase = Phase::Falling {
            started_at_ms: now_ms,
            deadline_ms,
        };
        CancelToken(self.epoch)
    }

    pub fn poll(&mut self, now_ms: u64) -> Option<FallEvent> {
        let Phase::Falling {
            started_at_ms,
            deadline_ms,
        } = self.phase
        else {
            return None;
        };

        let tick = compute_tick(started_at_ms, deadline_ms, now_ms);
        if tick.progress >= 1.0 {
            self.phase = Phase::Expired;
            Some(FallEvent::Expired)
        } else {
            Some(FallEvent::Tick(tick))
        }
    }

    /// Stop the fall started with `token`. Stale tokens and repeated calls
    /// are ignored.
    pub fn cancel(&mut self, token: CancelToken) {
        if token.0 == self.epoch && matches!(self.phase, Phase::Falling { .. }) {
            self.phase = Phase::Cancelled;
        }
    }

    /// Cancel whatever is falling, regardless of token.
    pub fn cancel_all(&mut self) {
        if matches!(self.phase, Phase::Falling { .. }) {
            self.phase = Phase::Cancelled;
        }
    }

    #[cfg(test)]
    pub fn is_falling(&self) -> bool {
        matches!(self.phase, Phase::Falling { .. })
    }

    /// Progress at `now_ms` without advancing the scheduler.
    pub fn peek(&self, now_ms: u64) -> Option<FallTick> {
        match self.phase {
            Phase::Falling {
                started_at_ms,
                deadline_ms,
            } => Some(compute_tick(started_at_ms, deadline_ms, now_ms)),
            _ => None,
        }
    }
}

impl Default for FallScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn compute_tick(started_at_ms: u64, deadline_ms: u64, now_ms: u64) -> FallTick {
    let elapsed_ms = now_ms.saturating_sub(started_at_ms);
    let progress = if deadline_ms == 0 {
        1.0
    } else {
        (elapsed_ms as f64 / deadline_ms as f64).clamp(0.0, 1.0)
    };
    FallTick {
        elapsed_ms,
        progress,
    }
}
