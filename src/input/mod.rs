//! Input pipeline: native events in, normalized events out
//!
//! - [`native`]: raw platform events
//! - [`event`]: normalized events handed to the application
//! - [`modifiers`]: modifier, button and event-selection masks
//! - [`grab`]: pointer and keyboard grab state
//! - [`filter`]: global and per-window event filters
//! - [`queue`]: the outgoing event FIFO
//! - [`translate`]: the translator tying it all together

pub mod event;
pub mod filter;
pub mod grab;
pub mod modifiers;
pub mod native;
pub mod queue;
pub mod translate;

pub use event::{Event, EventKind};
pub use filter::{EventFilter, FilterControl, FilterId, FilterRegistry, FilterResult};
pub use grab::{GrabManager, GrabRecord, GrabStatus};
pub use modifiers::{EventMask, ModifierState};
pub use native::{NativeEvent, NativeEventKind};
pub use queue::EventQueue;
pub use translate::{Dispatch, EventTranslator, Seat};
