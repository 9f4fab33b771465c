//! The input context
//!
//! [`InputContext`] owns every piece of the pipeline: the window tree, grab
//! state, coordinate mapper, translator, filters, event queue and damage
//! scheduler. One context corresponds to one display connection; there is no
//! global state, so several contexts can coexist (tests create one each).
//!
//! The platform is never stored. Calls that need live state borrow a
//! [`NativePlatform`] for their duration, and calls that paint borrow a
//! [`NativeCompositor`].
//!
//! # Example
//!
//! ```
//! use casement::backend::HeadlessPlatform;
//! use casement::config::CasementConfig;
//! use casement::context::InputContext;
//! use casement::input::{EventKind, EventMask, NativeEvent, NativeEventKind};
//! use casement::platform::{NativePoint, NativeRect, NativeViewId};
//! use casement::region::Rect;
//! use casement::window::WindowAttributes;
//!
//! let mut platform = HeadlessPlatform::single_monitor(800.0, 600.0);
//! platform.add_view(NativeViewId(1), NativeRect::new(0.0, 400.0, 200.0, 200.0));
//!
//! let mut ctx = InputContext::new(CasementConfig::default(), &platform);
//! let window = ctx
//!     .create_toplevel(
//!         NativeViewId(1),
//!         WindowAttributes::toplevel(Rect::new(0, 0, 200, 200))
//!             .with_event_mask(EventMask::BUTTON_PRESS),
//!     )
//!     .unwrap();
//! ctx.show(window);
//!
//! let press = NativeEvent::new(NativeEventKind::MouseDown { button: 0 }, 1.0)
//!     .with_view(NativeViewId(1))
//!     .at(NativePoint::new(50.0, 550.0));
//! ctx.dispatch(&press, &platform);
//!
//! let event = ctx.next_event().unwrap();
//! assert_eq!(event.window, window);
//! assert!(matches!(event.kind, EventKind::ButtonPress { button: 1, .. }));
//! ```

use log::{debug, info, trace};
use std::time::Instant;

use crate::config::CasementConfig;
use crate::error::checked;
use crate::input::event::{Event, EventKind};
use crate::input::filter::{EventFilter, FilterId, FilterRegistry, FilterResult};
use crate::input::grab::{GrabManager, GrabStatus};
use crate::input::modifiers::{EventMask, ModifierState};
use crate::input::native::{NativeEvent, NativeEventKind};
use crate::input::queue::EventQueue;
use crate::input::translate::{Dispatch, EventTranslator, Seat};
use crate::paint::damage::{DamageScheduler, PaintRequest};
use crate::paint::frame_pacing::FlushDecision;
use crate::platform::{NativeCompositor, NativePlatform, NativeViewId};
use crate::region::{Point, Rect, Region};
use crate::screen::CoordinateMapper;
use crate::window::{WindowAttributes, WindowId, WindowTree};

/// Owner of the whole event and update pipeline for one display
#[derive(Debug)]
pub struct InputContext {
    config: CasementConfig,
    tree: WindowTree,
    grabs: GrabManager,
    mapper: CoordinateMapper,
    translator: EventTranslator,
    filters: FilterRegistry,
    queue: EventQueue,
    damage: DamageScheduler,
    /// Bumped for every native event and grab request
    serial: u64,
    /// Time of the last native event, used for synthesized events
    last_time: u32,
    /// Views marked for display but not flushed yet
    unflushed: Vec<NativeViewId>,
}

impl InputContext {
    /// Creates a context for the monitors the platform reports
    pub fn new(config: CasementConfig, platform: &dyn NativePlatform) -> Self {
        let mapper = CoordinateMapper::new(&platform.monitor_frames());
        let tree = WindowTree::new(mapper.desktop_bounds());
        let damage = DamageScheduler::new(&config.damage);

        info!(
            "🏗️ Input context ready: {} monitors, desktop {:?}",
            mapper.monitors().len(),
            mapper.desktop_bounds()
        );

        Self {
            config,
            tree,
            grabs: GrabManager::new(),
            mapper,
            translator: EventTranslator::new(),
            filters: FilterRegistry::new(),
            queue: EventQueue::new(),
            damage,
            serial: 0,
            last_time: 0,
            unflushed: Vec::new(),
        }
    }

    pub fn config(&self) -> &CasementConfig {
        &self.config
    }

    pub fn tree(&self) -> &WindowTree {
        &self.tree
    }

    pub fn grabs(&self) -> &GrabManager {
        &self.grabs
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn translator(&self) -> &EventTranslator {
        &self.translator
    }

    pub fn damage(&self) -> &DamageScheduler {
        &self.damage
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    fn next_serial(&mut self) -> u64 {
        self.serial += 1;
        self.serial
    }

    /// Borrows the translator and everything it works on
    fn split<'a>(
        &'a mut self,
        platform: &'a dyn NativePlatform,
    ) -> (&'a mut EventTranslator, Seat<'a>) {
        let seat = Seat {
            tree: &mut self.tree,
            grabs: &mut self.grabs,
            mapper: &self.mapper,
            filters: &mut self.filters,
            queue: &mut self.queue,
            platform,
            config: &self.config.input,
            serial: self.serial,
        };
        (&mut self.translator, seat)
    }

    // Window management

    /// Creates a toplevel backed by `view`; bounds are desktop coordinates
    pub fn create_toplevel(
        &mut self,
        view: NativeViewId,
        attrs: WindowAttributes,
    ) -> Option<WindowId> {
        checked("create_toplevel", self.tree.create_toplevel(view, attrs))
    }

    /// Creates a child window; bounds are relative to `parent`
    pub fn create_child(&mut self, parent: WindowId, attrs: WindowAttributes) -> Option<WindowId> {
        checked("create_child", self.tree.create_child(parent, attrs))
    }

    /// Destroys a window and its subtree.
    ///
    /// Pending damage and filters of the destroyed windows are dropped and
    /// grabs they held end without notification.
    pub fn destroy_window(&mut self, platform: &dyn NativePlatform, window: WindowId) -> bool {
        let Some(destroyed) = checked("destroy_window", self.tree.destroy(window)) else {
            return false;
        };

        for &id in &destroyed {
            self.damage.discard(id);
            self.filters.forget_window(id);
        }
        self.translator.forget_windows(&destroyed);

        let time = self.last_time;
        self.next_serial();
        let (translator, mut seat) = self.split(platform);
        translator.release_unviewable_grabs(&mut seat, time);

        self.purge_tombstones();
        true
    }

    /// Maps a window and damages its whole area
    pub fn show(&mut self, window: WindowId) -> bool {
        if checked("show", self.tree.map(window)) != Some(true) {
            return false;
        }
        self.notify_structure(window, EventKind::Map);

        if let Some(bounds) = self.tree.get(window).map(|node| node.local_bounds()) {
            self.invalidate_with_children(window, &Region::from_rect(bounds));
        }
        true
    }

    /// Unmaps a window.
    ///
    /// Grabs that can no longer be honoured end, and if the pointer was
    /// inside the window it crosses into whatever is now underneath.
    pub fn hide(&mut self, platform: &dyn NativePlatform, window: WindowId) -> bool {
        if checked("hide", self.tree.unmap(window)) != Some(true) {
            return false;
        }
        self.notify_structure(window, EventKind::Unmap);

        let time = self.last_time;
        self.next_serial();
        let (translator, mut seat) = self.split(platform);
        translator.windows_unmapped(&mut seat, time);
        true
    }

    /// Moves and resizes a window; bounds are parent-relative
    pub fn move_resize(&mut self, window: WindowId, bounds: Rect) -> bool {
        if checked("move_resize", self.tree.move_resize(window, bounds)) != Some(true) {
            return false;
        }
        self.notify_structure(window, EventKind::Configure { bounds });
        true
    }

    pub fn reparent(&mut self, window: WindowId, new_parent: WindowId, origin: Point) -> bool {
        checked("reparent", self.tree.reparent(window, new_parent, origin)).is_some()
    }

    pub fn raise(&mut self, window: WindowId) -> bool {
        checked("raise", self.tree.raise(window)).is_some()
    }

    pub fn lower(&mut self, window: WindowId) -> bool {
        checked("lower", self.tree.lower(window)).is_some()
    }

    pub fn set_event_mask(&mut self, window: WindowId, mask: EventMask) -> bool {
        checked("set_event_mask", self.tree.set_event_mask(window, mask)).is_some()
    }

    fn notify_structure(&mut self, window: WindowId, kind: EventKind) {
        let selected = self
            .tree
            .get(window)
            .map_or(false, |node| node.event_mask.contains(EventMask::STRUCTURE));
        if selected {
            self.queue
                .push(Event::new(window, self.last_time, ModifierState::empty(), kind));
        }
    }

    // Grabs

    /// Requests an explicit pointer grab
    pub fn grab_pointer(
        &mut self,
        platform: &dyn NativePlatform,
        window: WindowId,
        owner_events: bool,
        event_mask: EventMask,
        confine_to: Option<WindowId>,
        time: u32,
    ) -> GrabStatus {
        self.next_serial();
        let (translator, mut seat) = self.split(platform);
        translator.grab_pointer(&mut seat, window, owner_events, event_mask, confine_to, time)
    }

    pub fn ungrab_pointer(&mut self, platform: &dyn NativePlatform, time: u32) {
        self.next_serial();
        let (translator, mut seat) = self.split(platform);
        translator.ungrab_pointer(&mut seat, time);
    }

    pub fn grab_keyboard(
        &mut self,
        platform: &dyn NativePlatform,
        window: WindowId,
        owner_events: bool,
        time: u32,
    ) -> GrabStatus {
        self.next_serial();
        let (translator, mut seat) = self.split(platform);
        translator.grab_keyboard(&mut seat, window, owner_events, time)
    }

    pub fn ungrab_keyboard(&mut self, platform: &dyn NativePlatform) {
        self.next_serial();
        let (translator, mut seat) = self.split(platform);
        translator.ungrab_keyboard(&mut seat);
    }

    /// Ends every grab, notifying the grabbing windows
    pub fn break_all_grabs(&mut self, platform: &dyn NativePlatform, time: u32) {
        self.next_serial();
        let (translator, mut seat) = self.split(platform);
        translator.break_all_grabs(&mut seat, time);
    }

    // Filters

    /// Adds a filter that sees every native event before translation
    pub fn add_global_filter(&mut self, filter: impl EventFilter + 'static) -> FilterId {
        self.filters.add_global(filter)
    }

    /// Adds a filter for events targeted at `window`
    pub fn add_window_filter(
        &mut self,
        window: WindowId,
        filter: impl EventFilter + 'static,
    ) -> FilterId {
        self.filters.add_for_window(window, filter)
    }

    pub fn remove_filter(&mut self, id: FilterId) -> bool {
        self.filters.remove(id)
    }

    // Events

    /// Feeds one native event through the pipeline
    pub fn dispatch(&mut self, event: &NativeEvent, platform: &dyn NativePlatform) -> Dispatch {
        self.next_serial();
        self.last_time = event.time_ms();

        match self.filters.run_global(event) {
            FilterResult::Continue => {}
            FilterResult::Translate(translated) => {
                self.queue.push(translated);
                return Dispatch::Translated { queued: 1 };
            }
            FilterResult::Remove => {
                trace!("Native event removed by a global filter");
                return Dispatch::Removed;
            }
        }

        match &event.kind {
            NativeEventKind::ScreenParametersChanged => {
                let queued = self.update_screens(platform);
                Dispatch::Translated { queued }
            }
            NativeEventKind::Paint { rect } => match event.view {
                Some(view) if self.tree.window_for_view(view).is_some() => {
                    let before = self.queue.len();
                    self.handle_native_paint(view, *rect, Instant::now());
                    Dispatch::Translated {
                        queued: self.queue.len() - before,
                    }
                }
                _ => Dispatch::Forward,
            },
            _ => {
                let (translator, mut seat) = self.split(platform);
                translator.translate(&mut seat, event)
            }
        }
    }

    /// Re-reads the monitor layout and moves toplevels to their new
    /// desktop coordinates.
    ///
    /// # Returns
    ///
    /// The number of configure events queued
    fn update_screens(&mut self, platform: &dyn NativePlatform) -> usize {
        if !self.mapper.update_monitors(&platform.monitor_frames()) {
            return 0;
        }
        self.tree.set_desktop_bounds(self.mapper.desktop_bounds());

        let before = self.queue.len();
        for toplevel in self.tree.toplevels() {
            let Some(view) = self.tree.get(toplevel).and_then(|node| node.view) else {
                continue;
            };
            let Some(frame) = platform.view_frame(view) else {
                continue;
            };
            let bounds = self.mapper.native_rect_to_desktop(frame);
            if checked("move_resize", self.tree.move_resize(toplevel, bounds)) == Some(true) {
                self.notify_structure(toplevel, EventKind::Configure { bounds });
            }
        }
        self.tree.invalidate_toplevel_order();
        self.queue.len() - before
    }

    /// Pops the oldest queued event
    pub fn next_event(&mut self) -> Option<Event> {
        let event = self.queue.pop();
        self.purge_tombstones();
        event
    }

    pub fn peek_event(&self) -> Option<&Event> {
        self.queue.peek()
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    fn purge_tombstones(&mut self) {
        if self.tree.has_tombstones() {
            let queue = &self.queue;
            self.tree.purge_destroyed(|id| queue.references(id));
        }
    }

    // Damage

    /// Adds window-local damage
    pub fn invalidate(&mut self, window: WindowId, region: &Region) -> bool {
        self.damage.invalidate(&self.tree, window, region)
    }

    pub fn invalidate_rect(&mut self, window: WindowId, rect: Rect) -> bool {
        self.invalidate(window, &Region::from_rect(rect))
    }

    /// Adds damage to a window and the parts of its mapped descendants it covers
    pub fn invalidate_with_children(&mut self, window: WindowId, region: &Region) {
        let mut stack = vec![(window, region.clone())];
        while let Some((current, area)) = stack.pop() {
            self.damage.invalidate(&self.tree, current, &area);

            let Some(node) = self.tree.get(current) else {
                continue;
            };
            for child in node.children.top_down() {
                let Some(child_node) = self.tree.get(child) else {
                    continue;
                };
                if !child_node.mapped || child_node.destroyed {
                    continue;
                }
                let mut child_area = area.translated(-child_node.bounds.x, -child_node.bounds.y);
                child_area.intersect_rect(child_node.local_bounds());
                if !child_area.is_empty() {
                    stack.push((child, child_area));
                }
            }
        }
    }

    /// Paints pending damage.
    ///
    /// Each window's damage is clipped to the window, marked for display on
    /// its toplevel's view and announced with an expose event if the window
    /// selects them. Touched views are flushed unless the flush pacer defers
    /// it, in which case [`poll_deferred_flush`] flushes them later.
    ///
    /// # Returns
    ///
    /// The number of windows painted
    ///
    /// [`poll_deferred_flush`]: InputContext::poll_deferred_flush
    pub fn process_updates(&mut self, now: Instant, compositor: &mut dyn NativeCompositor) -> usize {
        let requests = self.damage.flush_due(&self.tree);
        let mut painted = 0;

        for request in requests {
            if let Some(view) = self.expose(request, Some(&mut *compositor)) {
                painted += 1;
                if !self.unflushed.contains(&view) {
                    self.unflushed.push(view);
                }
            }
        }

        if !self.unflushed.is_empty() {
            match self.damage.request_flush(now) {
                FlushDecision::Flush => self.flush_views(compositor),
                FlushDecision::Coalesce => {
                    debug!("⏱️ Flush of {} views deferred", self.unflushed.len());
                }
            }
        }
        painted
    }

    /// Flushes views whose flush was deferred, once the pacer allows it
    pub fn poll_deferred_flush(&mut self, now: Instant, compositor: &mut dyn NativeCompositor) -> bool {
        if self.unflushed.is_empty() || !self.damage.poll_flush(now) {
            return false;
        }
        self.flush_views(compositor);
        true
    }

    /// When the next deferred flush becomes due
    pub fn next_flush_deadline(&self) -> Option<Instant> {
        self.damage.next_flush_deadline()
    }

    /// Handles a platform paint callback for `rect` of `view`.
    ///
    /// The platform is already drawing, so nothing is marked for display and
    /// nothing is throttled: the rectangle is damaged, every pending region
    /// inside the view is exposed right away and the pacer restarts.
    ///
    /// # Returns
    ///
    /// The number of windows exposed
    pub fn handle_native_paint(&mut self, view: NativeViewId, rect: Rect, now: Instant) -> usize {
        let Some(toplevel) = self.tree.window_for_view(view) else {
            return 0;
        };

        self.damage.native_paint(now);
        self.unflushed.retain(|&v| v != view);
        if !self.unflushed.is_empty() {
            // Other views still wait for their flush
            self.damage.defer_flush();
        }
        self.invalidate_with_children(toplevel, &Region::from_rect(rect));

        let tree = &self.tree;
        let requests = self
            .damage
            .flush_where(tree, |w| tree.toplevel_of(w) == Some(toplevel));

        requests
            .into_iter()
            .filter_map(|request| self.expose(request, None))
            .count()
    }

    /// Clips a paint request, forwards it to the compositor and queues the
    /// expose event. Returns the view that was painted.
    fn expose(
        &mut self,
        request: PaintRequest,
        compositor: Option<&mut dyn NativeCompositor>,
    ) -> Option<NativeViewId> {
        let PaintRequest { window, mut region } = request;
        let node = self.tree.get(window)?;
        region.intersect_rect(node.local_bounds());
        if region.is_empty() {
            return None;
        }

        let toplevel = self.tree.toplevel_of(window)?;
        let top_node = self.tree.get(toplevel)?;
        let view = top_node.view?;
        let offset = node.absolute_origin - top_node.absolute_origin;
        let wants_expose = node.event_mask.contains(EventMask::EXPOSURE);

        if let Some(compositor) = compositor {
            for rect in region.rectangles() {
                compositor.set_needs_display(view, rect.translated(offset.x, offset.y));
            }
        }

        if wants_expose {
            self.queue.push(Event::new(
                window,
                self.last_time,
                ModifierState::empty(),
                EventKind::Expose { region },
            ));
        }
        Some(view)
    }

    fn flush_views(&mut self, compositor: &mut dyn NativeCompositor) {
        for view in self.unflushed.drain(..) {
            compositor.flush_view(view);
        }
    }
}
