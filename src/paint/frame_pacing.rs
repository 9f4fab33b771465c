//! Flush rate limiting
//!
//! Explicit flushes (the toolkit pushing redrawn content to the screen) are
//! limited to an average rate: the pacer keeps the intervals between the last
//! N flushes and lets a new flush through only if the average interval,
//! counting the one that would end now, is at least the configured floor.
//! Until N intervals have been recorded every flush goes through.
//!
//! A refused flush is remembered as deferred; [`FlushPacer::next_deadline`]
//! tells the caller when it becomes due and [`FlushPacer::poll`] performs it.
//!
//! Native paint callbacks are driven by the platform and are never throttled;
//! they restart the sample window instead.
//!
//! # Example
//!
//! ```
//! use casement::paint::frame_pacing::{FlushDecision, FlushPacer};
//! use std::time::{Duration, Instant};
//!
//! let mut pacer = FlushPacer::new(2, Duration::from_millis(40));
//! let start = Instant::now();
//!
//! assert_eq!(pacer.request_flush(start), FlushDecision::Flush);
//! assert_eq!(pacer.request_flush(start + Duration::from_millis(5)), FlushDecision::Flush);
//! assert_eq!(pacer.request_flush(start + Duration::from_millis(10)), FlushDecision::Flush);
//!
//! // Two 5 ms intervals recorded: the next flush has to wait
//! assert_eq!(pacer.request_flush(start + Duration::from_millis(15)), FlushDecision::Coalesce);
//! assert_eq!(pacer.next_deadline(), Some(start + Duration::from_millis(85)));
//! ```

use log::{debug, trace};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Outcome of a flush request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushDecision {
    /// Flush now
    Flush,
    /// Too soon; the flush is deferred
    Coalesce,
}

/// Sliding-window flush rate limiter
#[derive(Debug, Clone)]
pub struct FlushPacer {
    /// Intervals between recent flushes, oldest first
    intervals: VecDeque<Duration>,
    window: usize,
    min_interval: Duration,
    last_flush: Option<Instant>,
    deferred: bool,
}

impl FlushPacer {
    /// Creates a pacer averaging over `window` intervals (at least 1)
    pub fn new(window: usize, min_interval: Duration) -> Self {
        let window = window.max(1);
        Self {
            intervals: VecDeque::with_capacity(window),
            window,
            min_interval,
            last_flush: None,
            deferred: false,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// `true` while a refused flush is waiting
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// Sum of the intervals that stay in the window when one more is added
    fn retained_sum(&self) -> Duration {
        let skip = (self.intervals.len() + 1).saturating_sub(self.window);
        self.intervals.iter().skip(skip).sum()
    }

    fn budget(&self) -> Duration {
        self.min_interval * self.window as u32
    }

    fn allows(&self, now: Instant) -> bool {
        let Some(last) = self.last_flush else {
            return true;
        };
        if self.intervals.len() < self.window {
            return true;
        }
        self.retained_sum() + now.saturating_duration_since(last) >= self.budget()
    }

    fn record(&mut self, now: Instant) {
        if let Some(last) = self.last_flush {
            self.intervals.push_back(now.saturating_duration_since(last));
            while self.intervals.len() > self.window {
                self.intervals.pop_front();
            }
        }
        self.last_flush = Some(now);
        self.deferred = false;
    }

    /// Asks to flush at `now`
    pub fn request_flush(&mut self, now: Instant) -> FlushDecision {
        if self.allows(now) {
            self.record(now);
            FlushDecision::Flush
        } else {
            if !self.deferred {
                trace!("Flush coalesced, average interval below {:?}", self.min_interval);
            }
            self.deferred = true;
            FlushDecision::Coalesce
        }
    }

    /// Records a platform-driven paint, which always proceeds
    pub fn native_paint(&mut self, now: Instant) {
        self.intervals.clear();
        self.last_flush = Some(now);
        self.deferred = false;
    }

    /// Marks a flush as pending without asking for it
    pub fn defer(&mut self) {
        self.deferred = true;
    }

    /// When a deferred flush becomes allowed, `None` if nothing is deferred
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.deferred {
            return None;
        }
        let last = self.last_flush?;
        if self.intervals.len() < self.window {
            return Some(last);
        }
        Some(last + self.budget().saturating_sub(self.retained_sum()))
    }

    /// Performs the deferred flush if it is due.
    ///
    /// # Returns
    ///
    /// `true` if the caller should flush now
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.deferred || !self.allows(now) {
            return false;
        }
        debug!("⏱️ Deferred flush released");
        self.record(now);
        true
    }
}
