//! Native event translation
//!
//! [`EventTranslator`] turns one [`NativeEvent`] into zero or more queued
//! [`Event`]s. It resolves the target window through the window tree and the
//! grab state, converts coordinates, fills in modifier state and synthesizes
//! crossing, focus and grab-broken events along the way.
//!
//! The translator only keeps the little state that survives between native
//! events (pointer window, focus window, input source). Everything else is
//! borrowed for the duration of one call through a [`Seat`].
//!
//! Events the translator cannot or must not handle (foreign views, title bar
//! presses, live window moves) are reported as [`Dispatch::Forward`] so the
//! caller can hand them back to the platform untouched.

use log::{debug, info, trace};

use crate::config::InputConfig;
use crate::error::checked;
use crate::input::event::{
    CrossingDetail, CrossingMode, DeviceAxes, DndPhase, Event, EventKind, InputSource, KeyData,
    PointerPosition, ScrollDirection,
};
use crate::input::filter::{FilterRegistry, FilterResult};
use crate::input::grab::{BrokenGrabs, GrabManager, GrabStatus, Route};
use crate::input::modifiers::{
    modifier_key, toolkit_button, EventMask, ModifierState, NativeModifierFlags,
};
use crate::input::native::{NativeEvent, NativeEventKind};
use crate::input::queue::EventQueue;
use crate::platform::NativePlatform;
use crate::region::Point;
use crate::screen::CoordinateMapper;
use crate::window::{HitTarget, WindowId, WindowKind, WindowTree};

const KEYCODE_RETURN: u16 = 36;
const KEYCODE_ESCAPE: u16 = 53;
const KEYCODE_KEYPAD_ENTER: u16 = 76;

/// Everything a translation step may read or modify
pub struct Seat<'a> {
    pub tree: &'a mut WindowTree,
    pub grabs: &'a mut GrabManager,
    pub mapper: &'a CoordinateMapper,
    pub filters: &'a mut FilterRegistry,
    pub queue: &'a mut EventQueue,
    pub platform: &'a dyn NativePlatform,
    pub config: &'a InputConfig,
    /// Serial of the native event being processed
    pub serial: u64,
}

/// What happened to a native event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Translated; `queued` events were appended to the queue
    Translated { queued: usize },
    /// A filter removed the event
    Removed,
    /// Not ours to handle, give it back to the platform
    Forward,
}

enum Step {
    Handled,
    Removed,
    Forward,
}

/// One side of a pointer crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub window: WindowId,
    pub enter: bool,
    pub detail: CrossingDetail,
}

/// Translates native events for one input context
#[derive(Debug, Default)]
pub struct EventTranslator {
    /// Window currently considered to contain the pointer
    pointer_window: Option<WindowId>,
    /// Raw result of the last hit test
    last_hit: Option<WindowId>,
    /// Last pointer position in desktop coordinates
    last_root: Point,
    focus_window: Option<WindowId>,
    source: InputSource,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_window(&self) -> Option<WindowId> {
        self.pointer_window
    }

    pub fn focus_window(&self) -> Option<WindowId> {
        self.focus_window
    }

    /// Device producing pointer events, switched by tablet proximity
    pub fn input_source(&self) -> InputSource {
        self.source
    }

    /// Translates one native event
    pub fn translate(&mut self, seat: &mut Seat<'_>, event: &NativeEvent) -> Dispatch {
        let time = event.time_ms();
        let before = seat.queue.len();

        let step = match &event.kind {
            NativeEventKind::AppDeactivated => {
                if seat.config.break_grabs_on_deactivate {
                    info!("💤 Application deactivated, breaking grabs");
                    self.break_all_grabs(seat, time);
                }
                Step::Forward
            }
            NativeEventKind::MouseDown { .. }
            | NativeEventKind::MouseUp { .. }
            | NativeEventKind::MouseMoved
            | NativeEventKind::MouseDragged { .. }
            | NativeEventKind::ScrollWheel { .. } => self.translate_pointer(seat, event, time),
            NativeEventKind::MouseEntered | NativeEventKind::MouseExited => {
                self.translate_native_crossing(seat, event, time)
            }
            NativeEventKind::KeyDown { .. }
            | NativeEventKind::KeyUp { .. }
            | NativeEventKind::FlagsChanged { .. } => self.translate_key(seat, event, time),
            NativeEventKind::TabletProximity { entering, device } => {
                self.source = if *entering {
                    *device
                } else {
                    InputSource::Mouse
                };
                debug!("🖊️ Input source is now {:?}", self.source);
                Step::Forward
            }
            NativeEventKind::KeyWindowChanged { became_key } => {
                self.translate_focus(seat, event, *became_key, time)
            }
            NativeEventKind::WindowFrameChanged { .. }
            | NativeEventKind::WindowMapped
            | NativeEventKind::WindowUnmapped
            | NativeEventKind::WindowShouldClose
            | NativeEventKind::WindowOrderChanged => self.translate_structure(seat, event, time),
            NativeEventKind::Drag { phase } => self.translate_dnd(seat, event, *phase, time),
            NativeEventKind::ApplicationDefined {
                subtype,
                data1,
                data2,
            } => self.translate_client(seat, event, *subtype, [*data1, *data2], time),
            NativeEventKind::AppActivated
            | NativeEventKind::ScreenParametersChanged
            | NativeEventKind::Paint { .. }
            | NativeEventKind::Other(_) => {
                trace!("Native event {:?} left to the platform", event.kind);
                Step::Forward
            }
        };

        match step {
            Step::Handled => Dispatch::Translated {
                queued: seat.queue.len() - before,
            },
            Step::Removed => Dispatch::Removed,
            Step::Forward => Dispatch::Forward,
        }
    }

    fn view_window(&self, seat: &Seat<'_>, event: &NativeEvent) -> Option<WindowId> {
        event
            .view
            .and_then(|view| seat.tree.window_for_view(view))
            .filter(|&w| seat.tree.is_alive(w))
    }

    fn is_foreign(&self, seat: &Seat<'_>, event: &NativeEvent) -> bool {
        event.view.is_some() && self.view_window(seat, event).is_none()
    }

    fn hit_test(&self, seat: &mut Seat<'_>, point: Point) -> HitTarget {
        if seat.tree.needs_order_refresh() {
            let order = seat.platform.ordered_views();
            seat.tree.refresh_toplevel_order(&order);
        }
        seat.tree.find_window_at(seat.tree.root(), point)
    }

    fn in_resize_border(&self, seat: &Seat<'_>, window: WindowId, point: Point) -> bool {
        let border = seat.config.resize_border;
        if border <= 0 {
            return false;
        }
        let Some(toplevel) = seat.tree.toplevel_of(window) else {
            return false;
        };
        let Some(node) = seat.tree.get(toplevel) else {
            return false;
        };
        if node.kind != WindowKind::Toplevel {
            return false;
        }

        let local = point - node.absolute_origin;
        local.x < border
            || local.x > node.bounds.width - border
            || local.y > node.bounds.height - border
    }

    fn translate_pointer(&mut self, seat: &mut Seat<'_>, event: &NativeEvent, time: u32) -> Step {
        if event.in_live_move {
            debug!("🪟 Native window is being moved, breaking grabs");
            self.break_all_grabs(seat, time);
            return Step::Forward;
        }
        if event.in_live_resize {
            return Step::Forward;
        }
        if self.is_foreign(seat, event) && seat.grabs.pointer_grab().is_none() {
            trace!("Pointer event on foreign view {:?} forwarded", event.view);
            return Step::Forward;
        }

        let root_point = seat.mapper.native_to_desktop(event.location);
        let hit = self.hit_test(seat, root_point);

        if let NativeEventKind::MouseDown { .. } = event.kind {
            match hit {
                HitTarget::Decoration(toplevel) => {
                    debug!("🪟 Press on the title bar of {:?}, breaking grabs", toplevel);
                    self.break_all_grabs(seat, time);
                    return Step::Forward;
                }
                HitTarget::Window(window) if self.in_resize_border(seat, window, root_point) => {
                    trace!("Press in the resize border of {:?} forwarded", window);
                    return Step::Forward;
                }
                _ => {}
            }
        }

        let hit_window = match hit {
            HitTarget::Window(window) if window != seat.tree.root() => Some(window),
            _ => None,
        };
        self.last_root = root_point;
        self.last_hit = hit_window;
        self.sync_crossings(seat, CrossingMode::Normal, time);

        let category = match &event.kind {
            NativeEventKind::MouseDown { .. } => EventMask::BUTTON_PRESS,
            NativeEventKind::MouseUp { .. } => EventMask::BUTTON_RELEASE,
            NativeEventKind::MouseMoved => EventMask::POINTER_MOTION,
            NativeEventKind::MouseDragged { button } => {
                EventMask::POINTER_MOTION
                    | EventMask::BUTTON_MOTION
                    | EventMask::for_button_motion(toolkit_button(*button))
            }
            NativeEventKind::ScrollWheel { delta_x, delta_y } => {
                if scroll_direction(*delta_x, *delta_y).is_none() {
                    return Step::Handled;
                }
                EventMask::SCROLL | EventMask::BUTTON_PRESS
            }
            _ => return Step::Forward,
        };

        let Some(target) = pointer_target(seat, hit_window, category) else {
            trace!("Pointer event at {:?} has no target", root_point);
            if let NativeEventKind::MouseUp { button } = event.kind {
                self.end_press(seat, toolkit_button(button), time);
            }
            return Step::Forward;
        };

        let position = position_in(seat.tree, target, root_point);
        let mut state = live_state(seat.platform);
        let axes = self.axes(event);
        let source = self.source;

        let kind = match event.kind {
            NativeEventKind::MouseDown { button } => {
                let button = toolkit_button(button);
                state.remove(ModifierState::for_button(button));
                EventKind::ButtonPress {
                    button,
                    position,
                    source,
                    axes,
                }
            }
            NativeEventKind::MouseUp { button } => {
                let button = toolkit_button(button);
                state.insert(ModifierState::for_button(button));
                EventKind::ButtonRelease {
                    button,
                    position,
                    source,
                    axes,
                }
            }
            NativeEventKind::ScrollWheel { delta_x, delta_y } => EventKind::Scroll {
                direction: scroll_direction(delta_x, delta_y).unwrap_or(ScrollDirection::Up),
                delta_x,
                delta_y,
                position,
            },
            _ => EventKind::Motion {
                position,
                source,
                axes,
            },
        };

        let step = deliver(seat, event, Event::new(target, time, state, kind));

        match event.kind {
            NativeEventKind::MouseDown { button } => {
                if !matches!(step, Step::Removed) {
                    let mask = seat
                        .tree
                        .get(target)
                        .map_or(EventMask::empty(), |node| node.event_mask);
                    let button = toolkit_button(button);
                    if seat
                        .grabs
                        .begin_button_press(target, mask, button, time, seat.serial)
                    {
                        self.sync_crossings(seat, CrossingMode::Grab, time);
                    }
                }
            }
            NativeEventKind::MouseUp { button } => {
                self.end_press(seat, toolkit_button(button), time);
            }
            _ => {}
        }
        step
    }

    fn end_press(&mut self, seat: &mut Seat<'_>, button: u32, time: u32) {
        if seat.grabs.end_button_release(button, seat.serial).is_some() {
            self.sync_crossings(seat, CrossingMode::Ungrab, time);
        }
    }

    fn axes(&self, event: &NativeEvent) -> Option<DeviceAxes> {
        match self.source {
            InputSource::Mouse => None,
            _ => Some(event.tablet.unwrap_or_default()),
        }
    }

    fn translate_native_crossing(
        &mut self,
        seat: &mut Seat<'_>,
        event: &NativeEvent,
        time: u32,
    ) -> Step {
        if self.is_foreign(seat, event) {
            return Step::Forward;
        }

        let root_point = seat.mapper.native_to_desktop(event.location);
        self.last_root = root_point;
        self.last_hit = match self.hit_test(seat, root_point) {
            HitTarget::Window(window) if window != seat.tree.root() => Some(window),
            _ => None,
        };
        self.sync_crossings(seat, CrossingMode::Normal, time);
        Step::Handled
    }

    fn translate_key(&mut self, seat: &mut Seat<'_>, event: &NativeEvent, time: u32) -> Step {
        if event.in_live_move {
            self.break_all_grabs(seat, time);
            return Step::Forward;
        }
        if event.in_live_resize {
            return Step::Forward;
        }
        let view_window = self.view_window(seat, event);
        if event.view.is_some() && view_window.is_none() && seat.grabs.keyboard_grab().is_none() {
            trace!("Key event on foreign view {:?} forwarded", event.view);
            return Step::Forward;
        }

        let mut state = live_state(seat.platform);
        let group = u8::from(event.modifier_flags.contains(NativeModifierFlags::ALTERNATE));

        let (press, data) = match &event.kind {
            NativeEventKind::KeyDown {
                keycode,
                characters,
                ..
            } => (
                true,
                KeyData {
                    keycode: *keycode,
                    text: key_text(*keycode, characters),
                    is_modifier: modifier_key(*keycode).is_some(),
                    group,
                },
            ),
            NativeEventKind::KeyUp {
                keycode,
                characters,
            } => (
                false,
                KeyData {
                    keycode: *keycode,
                    text: key_text(*keycode, characters),
                    is_modifier: modifier_key(*keycode).is_some(),
                    group,
                },
            ),
            NativeEventKind::FlagsChanged { keycode } => {
                let Some(key) = modifier_key(*keycode) else {
                    trace!("Flags change for unknown keycode {} forwarded", keycode);
                    return Step::Forward;
                };
                let press = event.modifier_flags.contains(key.native);
                if press {
                    state.remove(key.state);
                } else {
                    state.insert(key.state);
                }
                (
                    press,
                    KeyData {
                        keycode: *keycode,
                        text: String::new(),
                        is_modifier: true,
                        group,
                    },
                )
            }
            _ => return Step::Forward,
        };

        let category = if press {
            EventMask::KEY_PRESS
        } else {
            EventMask::KEY_RELEASE
        };

        let target = match seat.grabs.route_keyboard() {
            Route::Forced(window) => Some(window),
            Route::Normal { fallback } => view_window
                .and_then(|w| seat.tree.toplevel_of(w))
                .or(self.focus_window)
                .filter(|&w| selects(seat.tree, w, category))
                .or(fallback),
            Route::Drop => None,
        }
        .filter(|&w| seat.tree.is_alive(w));

        let Some(target) = target else {
            trace!("Key event has no target");
            return Step::Forward;
        };

        let kind = if press {
            EventKind::KeyPress(data)
        } else {
            EventKind::KeyRelease(data)
        };
        deliver(seat, event, Event::new(target, time, state, kind))
    }

    fn translate_focus(
        &mut self,
        seat: &mut Seat<'_>,
        event: &NativeEvent,
        became_key: bool,
        time: u32,
    ) -> Step {
        let Some(window) = self
            .view_window(seat, event)
            .and_then(|w| seat.tree.toplevel_of(w))
        else {
            return Step::Forward;
        };
        let state = live_state(seat.platform);

        if !became_key {
            if self.focus_window != Some(window) {
                return Step::Handled;
            }
            debug!("🎯 Focus left {:?}", window);
            self.focus_window = None;
            let focus_out = Event::new(window, time, state, EventKind::FocusChange { focus_in: false });
            return deliver(seat, event, focus_out);
        }

        if self.focus_window == Some(window) {
            return Step::Handled;
        }
        if let Some(old) = self.focus_window.filter(|&w| seat.tree.is_alive(w)) {
            seat.queue.push(Event::new(
                old,
                time,
                state,
                EventKind::FocusChange { focus_in: false },
            ));
        }

        debug!("🎯 Focus moved to {:?}", window);
        self.focus_window = Some(window);
        let focus_in = Event::new(window, time, state, EventKind::FocusChange { focus_in: true });
        let step = deliver(seat, event, focus_in);

        if seat.config.synthesize_motion_on_focus {
            let root = seat.mapper.native_to_desktop(seat.platform.pointer_location());
            let motion = Event::new(
                window,
                time,
                state,
                EventKind::Motion {
                    position: position_in(seat.tree, window, root),
                    source: self.source,
                    axes: None,
                },
            )
            .synthesized();
            seat.queue.push(motion);
        }
        step
    }

    fn translate_structure(&mut self, seat: &mut Seat<'_>, event: &NativeEvent, time: u32) -> Step {
        if event.kind == NativeEventKind::WindowOrderChanged {
            seat.tree.invalidate_toplevel_order();
            return Step::Handled;
        }

        let Some(window) = self.view_window(seat, event) else {
            return Step::Forward;
        };

        let kind = match &event.kind {
            NativeEventKind::WindowFrameChanged { frame } => {
                let bounds = seat.mapper.native_rect_to_desktop(*frame);
                if checked("move_resize", seat.tree.move_resize(window, bounds)) != Some(true) {
                    return Step::Handled;
                }
                EventKind::Configure { bounds }
            }
            NativeEventKind::WindowMapped => {
                if checked("map", seat.tree.map(window)) != Some(true) {
                    return Step::Handled;
                }
                EventKind::Map
            }
            NativeEventKind::WindowUnmapped => {
                if checked("unmap", seat.tree.unmap(window)) != Some(true) {
                    return Step::Handled;
                }
                EventKind::Unmap
            }
            NativeEventKind::WindowShouldClose => EventKind::Delete,
            _ => return Step::Forward,
        };

        let structure = Event::new(window, time, ModifierState::empty(), kind);
        let step = if selects(seat.tree, window, structure.selection_mask()) {
            deliver(seat, event, structure)
        } else {
            Step::Handled
        };

        if event.kind == NativeEventKind::WindowUnmapped {
            self.windows_unmapped(seat, time);
        }
        step
    }

    fn translate_dnd(
        &mut self,
        seat: &mut Seat<'_>,
        event: &NativeEvent,
        phase: DndPhase,
        time: u32,
    ) -> Step {
        let Some(window) = self
            .view_window(seat, event)
            .and_then(|w| seat.tree.toplevel_of(w))
        else {
            return Step::Forward;
        };

        let root = seat.mapper.native_to_desktop(event.location);
        let dnd = Event::new(
            window,
            time,
            live_state(seat.platform),
            EventKind::Dnd {
                phase,
                position: position_in(seat.tree, window, root),
            },
        );
        deliver(seat, event, dnd)
    }

    fn translate_client(
        &mut self,
        seat: &mut Seat<'_>,
        event: &NativeEvent,
        subtype: i16,
        data: [i64; 2],
        time: u32,
    ) -> Step {
        let target = self
            .view_window(seat, event)
            .or(self.focus_window)
            .filter(|&w| seat.tree.is_alive(w));
        let Some(window) = target else {
            return Step::Forward;
        };

        let client = Event::new(
            window,
            time,
            ModifierState::empty(),
            EventKind::Client { subtype, data },
        );
        deliver(seat, event, client)
    }

    /// Requests an explicit pointer grab.
    ///
    /// An implicit grab held by another window is taken over; that window is
    /// told through a grab-broken event naming the new grab window.
    pub fn grab_pointer(
        &mut self,
        seat: &mut Seat<'_>,
        window: WindowId,
        owner_events: bool,
        event_mask: EventMask,
        confine_to: Option<WindowId>,
        time: u32,
    ) -> GrabStatus {
        let previous = seat.grabs.pointer_grab().cloned();
        let status = seat.grabs.request_pointer_grab(
            seat.tree,
            window,
            owner_events,
            event_mask,
            confine_to,
            time,
            seat.serial,
        );
        if status != GrabStatus::Success {
            return status;
        }

        if let Some(old) = previous.filter(|g| g.implicit && g.window != window) {
            if seat.tree.is_alive(old.window) {
                seat.queue.push(Event::new(
                    old.window,
                    time,
                    live_state(seat.platform),
                    EventKind::GrabBroken {
                        keyboard: false,
                        implicit: true,
                        grab_window: Some(window),
                    },
                ));
            }
        }
        self.sync_crossings(seat, CrossingMode::Grab, time);
        status
    }

    pub fn ungrab_pointer(&mut self, seat: &mut Seat<'_>, time: u32) {
        if seat.grabs.ungrab_pointer(seat.serial).is_some() {
            self.sync_crossings(seat, CrossingMode::Ungrab, time);
        }
    }

    pub fn grab_keyboard(
        &mut self,
        seat: &mut Seat<'_>,
        window: WindowId,
        owner_events: bool,
        time: u32,
    ) -> GrabStatus {
        seat.grabs
            .request_keyboard_grab(seat.tree, window, owner_events, time, seat.serial)
    }

    pub fn ungrab_keyboard(&mut self, seat: &mut Seat<'_>) {
        seat.grabs.ungrab_keyboard(seat.serial);
    }

    /// Ends both grabs and tells their windows
    pub fn break_all_grabs(&mut self, seat: &mut Seat<'_>, time: u32) {
        let broken = seat.grabs.break_all(seat.serial);
        self.report_broken(seat, broken, time);
    }

    /// Ends grabs whose window is no longer viewable
    pub fn release_unviewable_grabs(&mut self, seat: &mut Seat<'_>, time: u32) {
        let broken = seat.grabs.release_unviewable(seat.tree, seat.serial);
        self.report_broken(seat, broken, time);
    }

    /// Finds the window under the pointer again after windows were unmapped
    /// and sends the crossings, ending grabs that can no longer be honoured
    pub fn windows_unmapped(&mut self, seat: &mut Seat<'_>, time: u32) {
        // Unmapping only removes windows, so an outside pointer stays outside
        if self.last_hit.is_some() {
            self.last_hit = match self.hit_test(seat, self.last_root) {
                HitTarget::Window(window) if window != seat.tree.root() => Some(window),
                _ => None,
            };
        }
        self.release_unviewable_grabs(seat, time);
        self.sync_crossings(seat, CrossingMode::Normal, time);
    }

    fn report_broken(&mut self, seat: &mut Seat<'_>, broken: BrokenGrabs, time: u32) {
        let pointer_broken = broken.pointer.is_some();
        let state = live_state(seat.platform);

        let records = broken
            .keyboard
            .map(|grab| (grab, true))
            .into_iter()
            .chain(broken.pointer.map(|grab| (grab, false)));
        for (grab, keyboard) in records {
            if !seat.tree.is_alive(grab.window) {
                continue;
            }
            debug!("💔 Grab on {:?} broken (keyboard={})", grab.window, keyboard);
            seat.queue.push(Event::new(
                grab.window,
                time,
                state,
                EventKind::GrabBroken {
                    keyboard,
                    implicit: grab.implicit,
                    grab_window: None,
                },
            ));
        }

        if pointer_broken {
            self.sync_crossings(seat, CrossingMode::Ungrab, time);
        }
    }

    /// Drops references to destroyed windows
    pub fn forget_windows(&mut self, destroyed: &[WindowId]) {
        let gone = |slot: &mut Option<WindowId>| {
            if slot.map_or(false, |w| destroyed.contains(&w)) {
                *slot = None;
            }
        };
        gone(&mut self.pointer_window);
        gone(&mut self.last_hit);
        gone(&mut self.focus_window);
    }

    /// The window the pointer is in for crossing purposes.
    ///
    /// Under a grab without owner events only the grab window and its
    /// descendants can contain the pointer.
    fn effective_pointer_window(&self, seat: &Seat<'_>) -> Option<WindowId> {
        let hit = self.last_hit.filter(|&w| seat.tree.is_viewable(w));
        match seat.grabs.pointer_grab() {
            Some(grab) if !grab.owner_events => {
                hit.filter(|&w| w == grab.window || seat.tree.is_ancestor(grab.window, w))
            }
            _ => hit,
        }
    }

    fn sync_crossings(&mut self, seat: &mut Seat<'_>, mode: CrossingMode, time: u32) {
        let next = self.effective_pointer_window(seat);
        let previous = self.pointer_window.filter(|&w| seat.tree.is_alive(w));
        self.pointer_window = next;
        if previous == next {
            return;
        }

        trace!("Pointer crossed from {:?} to {:?} ({:?})", previous, next, mode);
        let state = live_state(seat.platform);
        for crossing in crossing_path(seat.tree, previous, next) {
            let needed = if crossing.enter {
                EventMask::ENTER_NOTIFY
            } else {
                EventMask::LEAVE_NOTIFY
            };
            if !selects(seat.tree, crossing.window, needed) {
                continue;
            }

            let position = position_in(seat.tree, crossing.window, self.last_root);
            let kind = if crossing.enter {
                EventKind::Enter {
                    mode,
                    detail: crossing.detail,
                    position,
                }
            } else {
                EventKind::Leave {
                    mode,
                    detail: crossing.detail,
                    position,
                }
            };
            seat.queue.push(Event::new(crossing.window, time, state, kind));
        }
    }
}

/// Runs the per-window filters and queues the result
fn deliver(seat: &mut Seat<'_>, native: &NativeEvent, event: Event) -> Step {
    match seat.filters.run_window(event.window, native) {
        FilterResult::Continue => {
            seat.queue.push(event);
            Step::Handled
        }
        FilterResult::Translate(replacement) => {
            seat.queue.push(replacement);
            Step::Handled
        }
        FilterResult::Remove => {
            trace!("Event for {:?} removed by a window filter", event.window);
            Step::Removed
        }
    }
}

fn pointer_target(seat: &Seat<'_>, hit: Option<WindowId>, category: EventMask) -> Option<WindowId> {
    let target = match seat.grabs.route_pointer(hit, category) {
        Route::Forced(window) => Some(window),
        Route::Normal { fallback } => hit
            .and_then(|w| propagate(seat.tree, w, category))
            .or(fallback),
        Route::Drop => None,
    };
    target.filter(|&w| seat.tree.is_alive(w))
}

/// First window from `hit` up (root excluded) that selects `category`
fn propagate(tree: &WindowTree, hit: WindowId, category: EventMask) -> Option<WindowId> {
    let root = tree.root();
    std::iter::once(hit)
        .chain(tree.ancestors(hit))
        .take_while(|&w| w != root)
        .find(|&w| selects(tree, w, category))
}

/// Whether a live window selects any of `mask`; an empty mask always matches
fn selects(tree: &WindowTree, window: WindowId, mask: EventMask) -> bool {
    tree.get(window)
        .filter(|node| !node.destroyed)
        .map_or(false, |node| mask.is_empty() || node.event_mask.intersects(mask))
}

fn position_in(tree: &WindowTree, window: WindowId, root: Point) -> PointerPosition {
    let origin = tree.absolute_origin(window).unwrap_or_default();
    PointerPosition {
        local: root - origin,
        root,
    }
}

fn live_state(platform: &dyn NativePlatform) -> ModifierState {
    ModifierState::from_native_keys(platform.keyboard_modifiers())
        | ModifierState::from_native_buttons(platform.pressed_mouse_buttons())
}

/// Scroll direction for native wheel deltas, horizontal winning ties
pub fn scroll_direction(delta_x: f64, delta_y: f64) -> Option<ScrollDirection> {
    if delta_x != 0.0 {
        Some(if delta_x < 0.0 {
            ScrollDirection::Right
        } else {
            ScrollDirection::Left
        })
    } else if delta_y != 0.0 {
        Some(if delta_y < 0.0 {
            ScrollDirection::Down
        } else {
            ScrollDirection::Up
        })
    } else {
        None
    }
}

/// Text for a key event, with control characters for Escape and Return
pub fn key_text(keycode: u16, characters: &str) -> String {
    match keycode {
        KEYCODE_ESCAPE => "\u{1b}".to_string(),
        KEYCODE_RETURN | KEYCODE_KEYPAD_ENTER => "\r".to_string(),
        _ => characters.to_string(),
    }
}

/// Leave and enter notifications for the pointer moving from `from` to `to`.
///
/// Leaves come first, starting at `from` and walking up; enters follow,
/// walking down to `to`. The root never takes part. `None` stands for
/// anywhere outside our windows.
pub fn crossing_path(
    tree: &WindowTree,
    from: Option<WindowId>,
    to: Option<WindowId>,
) -> Vec<Crossing> {
    let root = tree.root();
    let between = |start: WindowId, stop: Option<WindowId>| -> Vec<WindowId> {
        tree.ancestors(start)
            .take_while(|&w| Some(w) != stop && w != root)
            .collect()
    };
    let leave = |window, detail| Crossing {
        window,
        enter: false,
        detail,
    };
    let enter = |window, detail| Crossing {
        window,
        enter: true,
        detail,
    };

    let mut path = Vec::new();
    match (from, to) {
        (Some(a), Some(b)) if a == b => {}
        (Some(a), Some(b)) if tree.is_ancestor(a, b) => {
            path.push(leave(a, CrossingDetail::Inferior));
            for w in between(b, Some(a)).into_iter().rev() {
                path.push(enter(w, CrossingDetail::Virtual));
            }
            path.push(enter(b, CrossingDetail::Ancestor));
        }
        (Some(a), Some(b)) if tree.is_ancestor(b, a) => {
            path.push(leave(a, CrossingDetail::Ancestor));
            for w in between(a, Some(b)) {
                path.push(leave(w, CrossingDetail::Virtual));
            }
            path.push(enter(b, CrossingDetail::Inferior));
        }
        (Some(a), Some(b)) => {
            let common = tree.common_ancestor(a, b);
            path.push(leave(a, CrossingDetail::Nonlinear));
            for w in between(a, common) {
                path.push(leave(w, CrossingDetail::NonlinearVirtual));
            }
            for w in between(b, common).into_iter().rev() {
                path.push(enter(w, CrossingDetail::NonlinearVirtual));
            }
            path.push(enter(b, CrossingDetail::Nonlinear));
        }
        (Some(a), None) => {
            path.push(leave(a, CrossingDetail::Nonlinear));
            for w in between(a, None) {
                path.push(leave(w, CrossingDetail::NonlinearVirtual));
            }
        }
        (None, Some(b)) => {
            for w in between(b, None).into_iter().rev() {
                path.push(enter(w, CrossingDetail::NonlinearVirtual));
            }
            path.push(enter(b, CrossingDetail::Nonlinear));
        }
        (None, None) => {}
    }
    path
}
