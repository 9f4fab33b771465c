//! Event filters
//!
//! Filters see raw native events before the default translation. Global
//! filters run first; per-window filters run once the target window is known.
//! A filter may let the event through, replace its translation, or remove it.
//!
//! Filters can remove themselves or other filters while a pass is running.
//! Removal is deferred: a filter removed mid-pass is skipped for the rest of
//! the pass and unlinked once the pass completes, so no other filter is
//! skipped or invoked twice.

use log::trace;
use slotmap::SecondaryMap;

use crate::input::event::Event;
use crate::input::native::NativeEvent;
use crate::window::WindowId;

/// What a filter decided about an event
#[derive(Debug, Clone, PartialEq)]
pub enum FilterResult {
    /// Keep going with the next filter or the default translation
    Continue,
    /// Queue this event instead of the default translation
    Translate(Event),
    /// Drop the event
    Remove,
}

/// Handle used to remove a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterId(u64);

/// Handed to a running filter so it can unregister filters mid-pass
#[derive(Debug)]
pub struct FilterControl {
    current: FilterId,
    removals: Vec<FilterId>,
}

impl FilterControl {
    fn new() -> Self {
        Self {
            current: FilterId(0),
            removals: Vec::new(),
        }
    }

    /// The filter currently running
    pub fn current(&self) -> FilterId {
        self.current
    }

    /// Unregisters the running filter once the pass completes
    pub fn remove_self(&mut self) {
        let id = self.current;
        self.remove(id);
    }

    /// Unregisters any filter once the pass completes
    pub fn remove(&mut self, id: FilterId) {
        if !self.removals.contains(&id) {
            self.removals.push(id);
        }
    }

    fn is_removed(&self, id: FilterId) -> bool {
        self.removals.contains(&id)
    }
}

/// A native event filter
pub trait EventFilter {
    fn filter(&mut self, event: &NativeEvent, control: &mut FilterControl) -> FilterResult;
}

impl<F> EventFilter for F
where
    F: FnMut(&NativeEvent, &mut FilterControl) -> FilterResult,
{
    fn filter(&mut self, event: &NativeEvent, control: &mut FilterControl) -> FilterResult {
        self(event, control)
    }
}

struct FilterEntry {
    id: FilterId,
    filter: Box<dyn EventFilter>,
}

/// An ordered list of filters
#[derive(Default)]
struct FilterChain {
    entries: Vec<FilterEntry>,
}

impl FilterChain {
    fn run(&mut self, event: &NativeEvent, control: &mut FilterControl) -> FilterResult {
        for entry in &mut self.entries {
            if control.is_removed(entry.id) {
                continue;
            }
            control.current = entry.id;
            match entry.filter.filter(event, control) {
                FilterResult::Continue => {}
                decided => return decided,
            }
        }
        FilterResult::Continue
    }

    fn unlink(&mut self, id: FilterId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }
}

/// Global and per-window filter chains of one input context
#[derive(Default)]
pub struct FilterRegistry {
    global: FilterChain,
    windows: SecondaryMap<WindowId, FilterChain>,
    next_id: u64,
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("global", &self.global.entries.len())
            .field("windows", &self.windows.len())
            .finish()
    }
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> FilterId {
        self.next_id += 1;
        FilterId(self.next_id)
    }

    /// Appends a filter that sees every native event
    pub fn add_global(&mut self, filter: impl EventFilter + 'static) -> FilterId {
        let id = self.allocate_id();
        self.global.entries.push(FilterEntry {
            id,
            filter: Box::new(filter),
        });
        id
    }

    /// Appends a filter for events targeted at `window`
    pub fn add_for_window(
        &mut self,
        window: WindowId,
        filter: impl EventFilter + 'static,
    ) -> FilterId {
        let id = self.allocate_id();
        let entry = FilterEntry {
            id,
            filter: Box::new(filter),
        };
        match self.windows.get_mut(window) {
            Some(chain) => chain.entries.push(entry),
            None => {
                self.windows.insert(
                    window,
                    FilterChain {
                        entries: vec![entry],
                    },
                );
            }
        }
        id
    }

    /// Removes a filter. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: FilterId) -> bool {
        if self.global.unlink(id) {
            return true;
        }
        self.windows.values_mut().any(|chain| chain.unlink(id))
    }

    /// Drops every filter attached to a window
    pub fn forget_window(&mut self, window: WindowId) {
        self.windows.remove(window);
    }

    /// Runs the global filters
    pub fn run_global(&mut self, event: &NativeEvent) -> FilterResult {
        let mut control = FilterControl::new();
        let result = self.global.run(event, &mut control);
        self.finish(control);
        result
    }

    /// Runs the filters attached to `window`
    pub fn run_window(&mut self, window: WindowId, event: &NativeEvent) -> FilterResult {
        let Some(chain) = self.windows.get_mut(window) else {
            return FilterResult::Continue;
        };
        let mut control = FilterControl::new();
        let result = chain.run(event, &mut control);
        self.finish(control);
        result
    }

    pub fn len(&self) -> usize {
        self.global.entries.len() + self.windows.values().map(|c| c.entries.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn finish(&mut self, control: FilterControl) {
        for id in control.removals {
            if self.remove(id) {
                trace!("Filter {:?} removed after pass", id);
            }
        }
    }
}
