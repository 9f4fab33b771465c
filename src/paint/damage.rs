//! Per-window damage accumulation
//!
//! Invalidations are unioned into one pending [`Region`] per window, in the
//! window's own coordinates. Flushing hands every pending region of a
//! viewable window out as a [`PaintRequest`] and forgets it; regions of
//! windows that are destroyed or unmapped by then are discarded.
//!
//! # Example
//!
//! ```
//! use casement::paint::damage::DamageScheduler;
//! use casement::platform::NativeViewId;
//! use casement::region::Rect;
//! use casement::window::{WindowAttributes, WindowTree};
//! use casement::config::DamageConfig;
//!
//! let mut tree = WindowTree::new(Rect::new(0, 0, 800, 600));
//! let window = tree
//!     .create_toplevel(NativeViewId(1), WindowAttributes::toplevel(Rect::new(0, 0, 200, 200)))
//!     .unwrap();
//! tree.map(window).unwrap();
//!
//! let mut damage = DamageScheduler::new(&DamageConfig::default());
//! damage.invalidate_rect(&tree, window, Rect::new(0, 0, 50, 50));
//! damage.invalidate_rect(&tree, window, Rect::new(25, 25, 50, 50));
//!
//! let requests = damage.flush_due(&tree);
//! assert_eq!(requests.len(), 1);
//! assert_eq!(requests[0].region.area(), 50 * 50 * 2 - 25 * 25);
//! assert!(!damage.has_pending());
//! ```

use log::trace;
use slotmap::SecondaryMap;
use std::time::Instant;

use crate::config::DamageConfig;
use crate::paint::frame_pacing::{FlushDecision, FlushPacer};
use crate::region::{Rect, Region};
use crate::window::{WindowId, WindowTree};

/// Coalesced damage of one window, ready to paint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintRequest {
    pub window: WindowId,
    /// Window-local area to repaint
    pub region: Region,
}

/// Accumulates damage and paces flushes
#[derive(Debug)]
pub struct DamageScheduler {
    pending: SecondaryMap<WindowId, Region>,
    pacer: FlushPacer,
}

impl DamageScheduler {
    pub fn new(config: &DamageConfig) -> Self {
        Self {
            pending: SecondaryMap::new(),
            pacer: FlushPacer::new(config.flush_window, config.min_flush_interval()),
        }
    }

    /// Adds `region` (window-local) to the window's pending damage.
    ///
    /// # Returns
    ///
    /// `false` if the damage was ignored: the window is destroyed or
    /// input-only, or the region is empty
    pub fn invalidate(&mut self, tree: &WindowTree, window: WindowId, region: &Region) -> bool {
        let Some(node) = tree.get(window) else {
            return false;
        };
        if node.destroyed || node.input_only || region.is_empty() {
            trace!("Damage for {:?} ignored", window);
            return false;
        }

        match self.pending.get_mut(window) {
            Some(pending) => pending.union(region),
            None => {
                self.pending.insert(window, region.clone());
            }
        }
        true
    }

    pub fn invalidate_rect(&mut self, tree: &WindowTree, window: WindowId, rect: Rect) -> bool {
        self.invalidate(tree, window, &Region::from_rect(rect))
    }

    pub fn pending_region(&self, window: WindowId) -> Option<&Region> {
        self.pending.get(window)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of windows with pending damage
    pub fn pending_windows(&self) -> usize {
        self.pending.len()
    }

    /// Drops a window's pending damage
    pub fn discard(&mut self, window: WindowId) -> Option<Region> {
        self.pending.remove(window)
    }

    /// Takes all pending damage
    pub fn flush_due(&mut self, tree: &WindowTree) -> Vec<PaintRequest> {
        self.flush_where(tree, |_| true)
    }

    /// Takes pending damage of the windows accepted by `select`, leaving
    /// the rest pending. Damage of windows that can't be seen is dropped.
    pub fn flush_where<F>(&mut self, tree: &WindowTree, select: F) -> Vec<PaintRequest>
    where
        F: Fn(WindowId) -> bool,
    {
        let chosen: Vec<WindowId> = self.pending.keys().filter(|&w| select(w)).collect();

        let mut requests = Vec::with_capacity(chosen.len());
        for window in chosen {
            let Some(region) = self.pending.remove(window) else {
                continue;
            };
            if !tree.is_viewable(window) {
                trace!("Damage for hidden window {:?} discarded", window);
                continue;
            }
            requests.push(PaintRequest { window, region });
        }
        requests
    }

    /// Asks the pacer whether an explicit flush may happen at `now`
    pub fn request_flush(&mut self, now: Instant) -> FlushDecision {
        self.pacer.request_flush(now)
    }

    /// Records a platform-driven paint
    pub fn native_paint(&mut self, now: Instant) {
        self.pacer.native_paint(now);
    }

    /// Keeps a flush pending across a native paint
    pub fn defer_flush(&mut self) {
        self.pacer.defer();
    }

    /// Releases a deferred flush if it is due
    pub fn poll_flush(&mut self, now: Instant) -> bool {
        self.pacer.poll(now)
    }

    pub fn next_flush_deadline(&self) -> Option<Instant> {
        self.pacer.next_deadline()
    }

    pub fn pacer(&self) -> &FlushPacer {
        &self.pacer
    }
}
