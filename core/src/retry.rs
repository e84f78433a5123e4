/*
 * retry.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Telegrafo, a Telegram Bot API client.
 *
 * Telegrafo is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Telegrafo is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Telegrafo.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Blind retry policy for send operations: re-issue the same request until
//! it verifies or a wall-clock budget elapses. No backoff, no jitter, no
//! distinction between transient and permanent failures.

use std::time::Duration;

use tokio::time::Instant;

/// Retry budget for a series of send attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    budget: Duration,
}

impl RetryPolicy {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    /// Mark the start of an attempt series.
    pub fn start(&self) -> RetryWindow {
        RetryWindow {
            started: Instant::now(),
            budget: self.budget,
        }
    }
}

/// One running attempt series. The monotonic clock makes elapsed-time
/// checks immune to timer wraparound.
#[derive(Debug, Clone, Copy)]
pub struct RetryWindow {
    started: Instant,
    budget: Duration,
}

impl RetryWindow {
    /// True once the wall-clock budget has elapsed; no further attempts.
    pub fn expired(&self) -> bool {
        self.started.elapsed() >= self.budget
    }
}
