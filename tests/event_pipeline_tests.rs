//! End-to-end tests for native event translation
//!
//! Every test drives an [`InputContext`] with native events from the
//! headless backend and inspects the toolkit events that come out.

use casement::backend::HeadlessPlatform;
use casement::input::event::{CrossingDetail, CrossingMode, PointerPosition};
use casement::input::filter::{FilterControl, FilterResult};
use casement::input::grab::GrabStatus;
use casement::input::modifiers::NativeButtons;
use casement::input::{Dispatch, Event, EventKind, EventMask, ModifierState, NativeEvent, NativeEventKind};
use casement::platform::{NativePoint, NativeRect, NativeViewId};
use casement::region::{Point, Rect};
use casement::window::{WindowAttributes, WindowId};
use casement::{CasementConfig, InputContext};

const SCREEN_HEIGHT: f64 = 600.0;

/// Native location of a desktop point on the 800x600 test monitor
fn native(x: i32, y: i32) -> NativePoint {
    NativePoint::new(x as f64, SCREEN_HEIGHT - y as f64)
}

fn native_frame(bounds: Rect) -> NativeRect {
    NativeRect::new(
        bounds.x as f64,
        SCREEN_HEIGHT - (bounds.y + bounds.height) as f64,
        bounds.width as f64,
        bounds.height as f64,
    )
}

struct Harness {
    platform: HeadlessPlatform,
    ctx: InputContext,
    clock: f64,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(CasementConfig::default())
    }

    fn with_config(config: CasementConfig) -> Self {
        let platform = HeadlessPlatform::single_monitor(800.0, SCREEN_HEIGHT);
        let ctx = InputContext::new(config, &platform);
        Self {
            platform,
            ctx,
            clock: 1.0,
        }
    }

    fn toplevel(&mut self, view: u64, bounds: Rect, mask: EventMask) -> WindowId {
        self.platform.add_view(NativeViewId(view), native_frame(bounds));
        let window = self
            .ctx
            .create_toplevel(
                NativeViewId(view),
                WindowAttributes::toplevel(bounds).with_event_mask(mask),
            )
            .unwrap();
        assert!(self.ctx.show(window));
        window
    }

    fn child(&mut self, parent: WindowId, bounds: Rect, mask: EventMask) -> WindowId {
        let window = self
            .ctx
            .create_child(parent, WindowAttributes::child(bounds).with_event_mask(mask))
            .unwrap();
        assert!(self.ctx.show(window));
        window
    }

    fn event(&mut self, kind: NativeEventKind) -> NativeEvent {
        self.clock += 0.01;
        NativeEvent::new(kind, self.clock)
    }

    fn pointer(&mut self, kind: NativeEventKind, view: u64, x: i32, y: i32) -> Dispatch {
        self.platform.pointer = native(x, y);
        let event = self
            .event(kind)
            .with_view(NativeViewId(view))
            .at(native(x, y));
        self.ctx.dispatch(&event, &self.platform)
    }

    fn press(&mut self, view: u64, button: u32, x: i32, y: i32) -> Dispatch {
        self.platform.press(native_button(button));
        self.pointer(NativeEventKind::MouseDown { button }, view, x, y)
    }

    fn release(&mut self, view: u64, button: u32, x: i32, y: i32) -> Dispatch {
        self.platform.release(native_button(button));
        self.pointer(NativeEventKind::MouseUp { button }, view, x, y)
    }

    fn motion(&mut self, view: u64, x: i32, y: i32) -> Dispatch {
        self.pointer(NativeEventKind::MouseMoved, view, x, y)
    }

    fn view_event(&mut self, kind: NativeEventKind, view: u64) -> Dispatch {
        let event = self.event(kind).with_view(NativeViewId(view));
        self.ctx.dispatch(&event, &self.platform)
    }

    fn drain(&mut self) -> Vec<Event> {
        std::iter::from_fn(|| self.ctx.next_event()).collect()
    }
}

fn native_button(button: u32) -> NativeButtons {
    match button {
        0 => NativeButtons::PRIMARY,
        1 => NativeButtons::SECONDARY,
        _ => NativeButtons::MIDDLE,
    }
}

fn local(event: &Event) -> Point {
    event.position().map(|p: PointerPosition| p.local).unwrap()
}

const BUTTONS: EventMask = EventMask::BUTTON_PRESS.union(EventMask::BUTTON_RELEASE);
const CROSSING: EventMask = EventMask::ENTER_NOTIFY
    .union(EventMask::LEAVE_NOTIFY)
    .union(EventMask::POINTER_MOTION);

#[test]
fn test_press_starts_implicit_grab_and_release_follows_it() {
    let mut h = Harness::new();
    let w = h.toplevel(1, Rect::new(0, 0, 100, 100), BUTTONS);

    assert_eq!(h.press(1, 0, 50, 50), Dispatch::Translated { queued: 1 });
    let press = h.drain().remove(0);
    assert_eq!(press.window, w);
    assert_eq!(local(&press), Point::new(50, 50));
    assert!(matches!(press.kind, EventKind::ButtonPress { button: 1, .. }));
    // The button being pressed is not part of its own state
    assert!(!press.state.contains(ModifierState::BUTTON1));

    let grab = h.ctx.grabs().pointer_grab().unwrap();
    assert!(grab.implicit);
    assert_eq!(grab.window, w);

    // Released far outside the window: still delivered to it
    assert_eq!(h.release(1, 0, 200, 200), Dispatch::Translated { queued: 1 });
    let release = h.drain().remove(0);
    assert_eq!(release.window, w);
    assert_eq!(local(&release), Point::new(150, 150));
    assert!(matches!(release.kind, EventKind::ButtonRelease { button: 1, .. }));
    assert!(release.state.contains(ModifierState::BUTTON1));

    assert!(h.ctx.grabs().pointer_grab().is_none());
}

#[test]
fn test_implicit_grab_spans_every_held_button() {
    let mut h = Harness::new();
    let w = h.toplevel(1, Rect::new(100, 100, 200, 200), BUTTONS);

    h.press(1, 0, 150, 150);
    h.press(1, 1, 160, 160);
    h.release(1, 0, 400, 400);
    assert!(h.ctx.grabs().pointer_grab().is_some());

    h.release(1, 1, 400, 400);
    assert!(h.ctx.grabs().pointer_grab().is_none());

    let buttons: Vec<(u32, bool)> = h
        .drain()
        .into_iter()
        .map(|event| {
            assert_eq!(event.window, w);
            match event.kind {
                EventKind::ButtonPress { button, .. } => (button, true),
                EventKind::ButtonRelease { button, .. } => (button, false),
                other => panic!("unexpected {:?}", other),
            }
        })
        .collect();
    // Native secondary is toolkit button 3
    assert_eq!(buttons, vec![(1, true), (3, true), (1, false), (3, false)]);
}

#[test]
fn test_implicit_grab_survives_releases_in_reverse_order() {
    let mut h = Harness::new();
    let w = h.toplevel(1, Rect::new(100, 100, 200, 200), BUTTONS);

    h.press(1, 0, 150, 150);
    h.press(1, 1, 160, 160);
    h.release(1, 1, 400, 400);
    assert!(h.ctx.grabs().pointer_grab().is_some());

    h.release(1, 0, 420, 420);
    assert!(h.ctx.grabs().pointer_grab().is_none());

    let events = h.drain();
    assert!(events.iter().all(|event| event.window == w));
    let buttons: Vec<(u32, bool)> = events
        .iter()
        .map(|event| match event.kind {
            EventKind::ButtonPress { button, .. } => (button, true),
            EventKind::ButtonRelease { button, .. } => (button, false),
            ref other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(buttons, vec![(1, true), (3, true), (3, false), (1, false)]);
    assert_eq!(local(&events[3]), Point::new(320, 320));
}

#[test]
fn test_sibling_crossing() {
    let mut h = Harness::new();
    let top = h.toplevel(1, Rect::new(0, 0, 400, 300), EventMask::empty());
    let x = h.child(top, Rect::new(10, 10, 100, 100), CROSSING);
    let y = h.child(top, Rect::new(200, 10, 100, 100), CROSSING);

    h.motion(1, 50, 50);
    let entered = h.drain();
    assert_eq!(entered.len(), 2);
    assert_eq!(entered[0].window, x);
    assert!(matches!(
        entered[0].kind,
        EventKind::Enter {
            detail: CrossingDetail::Nonlinear,
            mode: CrossingMode::Normal,
            ..
        }
    ));
    assert!(matches!(entered[1].kind, EventKind::Motion { .. }));

    h.motion(1, 250, 50);
    let events = h.drain();
    assert_eq!(events.len(), 3);

    assert_eq!(events[0].window, x);
    assert!(matches!(
        events[0].kind,
        EventKind::Leave {
            detail: CrossingDetail::Nonlinear,
            ..
        }
    ));
    assert_eq!(events[1].window, y);
    assert!(matches!(
        events[1].kind,
        EventKind::Enter {
            detail: CrossingDetail::Nonlinear,
            ..
        }
    ));
    assert_eq!(events[2].window, y);
    assert!(matches!(events[2].kind, EventKind::Motion { .. }));
    assert_eq!(local(&events[2]), Point::new(50, 40));
}

#[test]
fn test_motion_propagates_to_selecting_ancestor() {
    let mut h = Harness::new();
    let top = h.toplevel(1, Rect::new(0, 0, 400, 300), EventMask::POINTER_MOTION);
    h.child(top, Rect::new(10, 10, 100, 100), EventMask::empty());

    h.motion(1, 20, 30);
    let events = h.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].window, top);
    assert_eq!(local(&events[0]), Point::new(20, 30));
}

#[test]
fn test_pointer_grab_is_exclusive() {
    let mut h = Harness::new();
    let a = h.toplevel(1, Rect::new(0, 0, 100, 100), BUTTONS);
    let b = h.toplevel(2, Rect::new(200, 0, 100, 100), BUTTONS);
    let hidden = h
        .ctx
        .create_toplevel(NativeViewId(3), WindowAttributes::toplevel(Rect::new(0, 200, 50, 50)))
        .unwrap();

    let grab = |h: &mut Harness, w| h.ctx.grab_pointer(&h.platform, w, false, BUTTONS, None, 0);

    assert_eq!(grab(&mut h, a), GrabStatus::Success);
    assert_eq!(grab(&mut h, a), GrabStatus::Success);
    assert_eq!(grab(&mut h, b), GrabStatus::AlreadyGrabbed);
    assert_eq!(grab(&mut h, hidden), GrabStatus::NotViewable);

    h.ctx.ungrab_pointer(&h.platform, 0);
    assert_eq!(grab(&mut h, b), GrabStatus::Success);
    assert_eq!(h.ctx.grabs().pointer_grab().unwrap().window, b);

    assert_eq!(h.ctx.grab_keyboard(&h.platform, a, false, 0), GrabStatus::Success);
    assert_eq!(h.ctx.grab_keyboard(&h.platform, b, false, 0), GrabStatus::AlreadyGrabbed);
}

#[test]
fn test_grab_without_owner_events_redirects_and_filters() {
    let mut h = Harness::new();
    let a = h.toplevel(1, Rect::new(0, 0, 100, 100), BUTTONS);
    h.toplevel(2, Rect::new(200, 0, 100, 100), BUTTONS | EventMask::POINTER_MOTION);

    let status = h
        .ctx
        .grab_pointer(&h.platform, a, false, EventMask::BUTTON_PRESS, None, 0);
    assert_eq!(status, GrabStatus::Success);

    // Motion isn't in the grab mask
    assert_eq!(h.motion(2, 250, 50), Dispatch::Forward);
    assert!(h.drain().is_empty());

    h.press(2, 0, 250, 50);
    let events = h.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].window, a);
    assert_eq!(local(&events[0]), Point::new(250, 50));

    // The explicit grab survives the press episode
    h.release(2, 0, 250, 50);
    assert_eq!(h.ctx.grabs().pointer_grab().unwrap().window, a);
}

#[test]
fn test_explicit_grab_takes_over_implicit_one() {
    let mut h = Harness::new();
    let a = h.toplevel(1, Rect::new(0, 0, 100, 100), BUTTONS);
    let b = h.toplevel(2, Rect::new(200, 0, 100, 100), BUTTONS);

    h.press(1, 0, 50, 50);
    h.drain();

    let status = h.ctx.grab_pointer(&h.platform, b, false, BUTTONS, None, 5);
    assert_eq!(status, GrabStatus::Success);

    let events = h.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].window, a);
    assert_eq!(
        events[0].kind,
        EventKind::GrabBroken {
            keyboard: false,
            implicit: true,
            grab_window: Some(b),
        }
    );
}

#[test]
fn test_deactivation_breaks_grabs() {
    let mut h = Harness::new();
    let a = h.toplevel(1, Rect::new(0, 0, 100, 100), BUTTONS);
    h.ctx.grab_pointer(&h.platform, a, true, BUTTONS, None, 0);
    h.ctx.grab_keyboard(&h.platform, a, false, 0);

    let event = h.event(NativeEventKind::AppDeactivated);
    assert_eq!(h.ctx.dispatch(&event, &h.platform), Dispatch::Forward);

    let kinds: Vec<EventKind> = h.drain().into_iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::GrabBroken {
                keyboard: true,
                implicit: false,
                grab_window: None,
            },
            EventKind::GrabBroken {
                keyboard: false,
                implicit: false,
                grab_window: None,
            },
        ]
    );
    assert!(h.ctx.grabs().pointer_grab().is_none());
    assert!(h.ctx.grabs().keyboard_grab().is_none());
}

#[test]
fn test_destroying_grab_window_ends_grab_silently() {
    let mut h = Harness::new();
    let a = h.toplevel(1, Rect::new(0, 0, 100, 100), BUTTONS);
    h.ctx.grab_pointer(&h.platform, a, false, BUTTONS, None, 0);

    assert!(h.ctx.destroy_window(&h.platform, a));
    assert!(h.ctx.grabs().pointer_grab().is_none());
    assert!(h.drain().is_empty());
}

#[test]
fn test_hiding_the_pointer_window_crosses_to_its_parent() {
    let mut h = Harness::new();
    let top = h.toplevel(1, Rect::new(0, 0, 300, 300), CROSSING);
    let child = h.child(top, Rect::new(20, 20, 100, 100), CROSSING);
    h.motion(1, 50, 50);
    h.drain();

    assert!(h.ctx.hide(&h.platform, child));
    let events = h.drain();
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].window, child);
    assert!(matches!(
        events[0].kind,
        EventKind::Leave {
            detail: CrossingDetail::Ancestor,
            mode: CrossingMode::Normal,
            ..
        }
    ));
    assert_eq!(events[1].window, top);
    assert!(matches!(
        events[1].kind,
        EventKind::Enter {
            detail: CrossingDetail::Inferior,
            mode: CrossingMode::Normal,
            ..
        }
    ));
    assert_eq!(h.ctx.translator().pointer_window(), Some(top));

    // Hiding a window away from the pointer sends nothing
    let other = h.child(top, Rect::new(200, 200, 50, 50), CROSSING);
    assert!(h.ctx.hide(&h.platform, other));
    assert!(h.drain().is_empty());
}

#[test]
fn test_native_unmap_releases_grab() {
    let mut h = Harness::new();
    let a = h.toplevel(1, Rect::new(0, 0, 100, 100), BUTTONS | EventMask::STRUCTURE);
    h.ctx.grab_pointer(&h.platform, a, false, BUTTONS, None, 0);
    h.drain();

    assert_eq!(
        h.view_event(NativeEventKind::WindowUnmapped, 1),
        Dispatch::Translated { queued: 2 }
    );
    let events = h.drain();
    assert_eq!(events[0].kind, EventKind::Unmap);
    assert!(matches!(events[1].kind, EventKind::GrabBroken { keyboard: false, .. }));
    assert!(h.ctx.grabs().pointer_grab().is_none());
}

#[test]
fn test_title_bar_and_resize_border_presses_are_forwarded() {
    let mut h = Harness::new();
    h.platform.add_view(NativeViewId(1), native_frame(Rect::new(100, 100, 200, 200)));
    let w = h
        .ctx
        .create_toplevel(
            NativeViewId(1),
            WindowAttributes::toplevel(Rect::new(100, 100, 200, 200))
                .with_event_mask(BUTTONS)
                .with_decoration(22),
        )
        .unwrap();
    h.ctx.show(w);

    assert_eq!(h.press(1, 0, 150, 90), Dispatch::Forward);
    assert_eq!(h.press(1, 0, 298, 150), Dispatch::Forward);
    assert_eq!(h.press(1, 0, 150, 298), Dispatch::Forward);
    assert_eq!(h.press(1, 0, 296, 150), Dispatch::Forward);
    assert_eq!(h.press(1, 0, 104, 150), Dispatch::Forward);
    assert!(h.drain().is_empty());
    assert!(h.ctx.grabs().pointer_grab().is_none());

    // Exactly one border width in from the far edges is still content
    assert_eq!(h.press(1, 0, 295, 295), Dispatch::Translated { queued: 1 });
}

#[test]
fn test_foreign_views_are_forwarded() {
    let mut h = Harness::new();
    h.toplevel(1, Rect::new(0, 0, 100, 100), BUTTONS);

    assert_eq!(h.press(99, 0, 50, 50), Dispatch::Forward);
    assert!(h.drain().is_empty());
}

#[test]
fn test_scroll_direction_and_zero_delta() {
    let mut h = Harness::new();
    let w = h.toplevel(1, Rect::new(0, 0, 100, 100), EventMask::SCROLL);

    let scroll = |h: &mut Harness, delta_x, delta_y| {
        h.pointer(NativeEventKind::ScrollWheel { delta_x, delta_y }, 1, 40, 40)
    };

    assert_eq!(scroll(&mut h, 0.0, 0.0), Dispatch::Translated { queued: 0 });
    assert_eq!(scroll(&mut h, 0.0, -3.0), Dispatch::Translated { queued: 1 });

    let event = h.drain().remove(0);
    assert_eq!(event.window, w);
    assert!(matches!(
        event.kind,
        EventKind::Scroll {
            direction: casement::input::event::ScrollDirection::Down,
            ..
        }
    ));
}

#[test]
fn test_focus_change_sends_out_in_and_motion() {
    let mut h = Harness::new();
    let a = h.toplevel(1, Rect::new(0, 0, 100, 100), EventMask::empty());
    let b = h.toplevel(2, Rect::new(200, 0, 100, 100), EventMask::empty());
    h.platform.pointer = native(220, 30);

    h.view_event(NativeEventKind::KeyWindowChanged { became_key: true }, 1);
    h.drain();
    h.view_event(NativeEventKind::KeyWindowChanged { became_key: true }, 2);

    let events = h.drain();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].window, a);
    assert_eq!(events[0].kind, EventKind::FocusChange { focus_in: false });
    assert_eq!(events[1].window, b);
    assert_eq!(events[1].kind, EventKind::FocusChange { focus_in: true });
    assert_eq!(events[2].window, b);
    assert!(events[2].send_event);
    assert_eq!(local(&events[2]), Point::new(20, 30));
    assert_eq!(h.ctx.translator().focus_window(), Some(b));
}

#[test]
fn test_focus_motion_can_be_disabled() {
    let mut config = CasementConfig::default();
    config.input.synthesize_motion_on_focus = false;
    let mut h = Harness::with_config(config);
    h.toplevel(1, Rect::new(0, 0, 100, 100), EventMask::empty());

    h.view_event(NativeEventKind::KeyWindowChanged { became_key: true }, 1);
    assert_eq!(h.drain().len(), 1);
}

#[test]
fn test_keys_go_to_the_toplevel_or_the_keyboard_grab() {
    let mut h = Harness::new();
    let keys = EventMask::KEY_PRESS | EventMask::KEY_RELEASE;
    let a = h.toplevel(1, Rect::new(0, 0, 100, 100), keys);
    let b = h.toplevel(2, Rect::new(200, 0, 100, 100), keys);

    let key_down = |h: &mut Harness, keycode, characters: &str| {
        h.view_event(
            NativeEventKind::KeyDown {
                keycode,
                characters: characters.to_string(),
                is_repeat: false,
            },
            2,
        )
    };

    key_down(&mut h, 0, "a");
    key_down(&mut h, 53, "");
    let events = h.drain();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.window == b));
    match (&events[0].kind, &events[1].kind) {
        (EventKind::KeyPress(first), EventKind::KeyPress(second)) => {
            assert_eq!(first.text, "a");
            assert_eq!(second.text, "\u{1b}");
        }
        other => panic!("unexpected {:?}", other),
    }

    h.ctx.grab_keyboard(&h.platform, a, false, 0);
    key_down(&mut h, 0, "a");
    assert_eq!(h.drain()[0].window, a);
}

#[test]
fn test_modifier_key_state_excludes_itself_on_press() {
    let mut h = Harness::new();
    h.toplevel(1, Rect::new(0, 0, 100, 100), EventMask::KEY_PRESS | EventMask::KEY_RELEASE);

    // Left shift goes down; the platform already reports it held
    h.platform.modifiers = casement::input::modifiers::NativeModifierFlags::SHIFT;
    let down = h
        .event(NativeEventKind::FlagsChanged { keycode: 56 })
        .with_view(NativeViewId(1))
        .with_modifiers(casement::input::modifiers::NativeModifierFlags::SHIFT);
    h.ctx.dispatch(&down, &h.platform);

    h.platform.modifiers = Default::default();
    h.view_event(NativeEventKind::FlagsChanged { keycode: 56 }, 1);

    let events = h.drain();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0].kind, EventKind::KeyPress(data) if data.is_modifier));
    assert!(!events[0].state.contains(ModifierState::SHIFT));
    assert!(matches!(&events[1].kind, EventKind::KeyRelease(_)));
    assert!(events[1].state.contains(ModifierState::SHIFT));
}

#[test]
fn test_filters_remove_and_replace_events() {
    let mut h = Harness::new();
    let w = h.toplevel(1, Rect::new(0, 0, 100, 100), BUTTONS);

    let id = h.ctx.add_global_filter(|event: &NativeEvent, _: &mut FilterControl| {
        if matches!(event.kind, NativeEventKind::MouseDown { button: 2 }) {
            FilterResult::Remove
        } else {
            FilterResult::Continue
        }
    });
    assert_eq!(h.press(1, 2, 50, 50), Dispatch::Removed);
    assert!(h.drain().is_empty());

    h.ctx.add_window_filter(w, move |_: &NativeEvent, control: &mut FilterControl| {
        control.remove_self();
        FilterResult::Translate(Event::new(w, 7, ModifierState::empty(), EventKind::Delete))
    });
    h.release(1, 2, 50, 50);
    h.press(1, 0, 50, 50);

    let events = h.drain();
    assert_eq!(events[0].kind, EventKind::Delete);
    assert!(matches!(events[1].kind, EventKind::ButtonPress { button: 1, .. }));

    assert!(h.ctx.remove_filter(id));
    assert!(!h.ctx.remove_filter(id));
}

#[test]
fn test_structure_events_from_the_platform() {
    let mut h = Harness::new();
    let w = h.toplevel(1, Rect::new(0, 0, 100, 100), EventMask::STRUCTURE);
    h.drain();

    let moved = NativeEventKind::WindowFrameChanged {
        frame: native_frame(Rect::new(40, 60, 120, 80)),
    };
    h.view_event(moved, 1);
    h.view_event(NativeEventKind::WindowShouldClose, 1);

    let events = h.drain();
    assert_eq!(
        events[0].kind,
        EventKind::Configure {
            bounds: Rect::new(40, 60, 120, 80)
        }
    );
    assert_eq!(events[1].window, w);
    assert_eq!(events[1].kind, EventKind::Delete);
    assert_eq!(h.ctx.tree().absolute_origin(w), Some(Point::new(40, 60)));
}
