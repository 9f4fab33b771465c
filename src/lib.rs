//! # Casement
//!
//! Native event ingestion and screen-update scheduling for a windowing
//! abstraction layer. Raw platform events go in; toolkit events come out,
//! addressed to logical windows, in toolkit coordinates, routed through
//! pointer and keyboard grabs. Damage is coalesced per window and flushed
//! to the platform at a paced rate.
//!
//! ## Architecture
//!
//! - `region`: integer rectangles and banded regions with set operations
//! - `screen`: native (bottom-left origin) to toolkit (top-left) mapping
//! - `window`: the logical window tree, stacking and hit testing
//! - `input`: native events, grabs, filters, translation and the event queue
//! - `paint`: damage accumulation and flush pacing
//! - `context`: [`InputContext`], which owns all of the above
//! - `platform`: the traits a native backend implements
//! - `backend`: a headless backend for tests and tools
//!
//! ## Usage
//!
//! ```rust
//! use casement::backend::HeadlessPlatform;
//! use casement::platform::NativeViewId;
//! use casement::region::Rect;
//! use casement::window::WindowAttributes;
//! use casement::{CasementConfig, InputContext};
//!
//! let platform = HeadlessPlatform::single_monitor(1280.0, 800.0);
//! let mut ctx = InputContext::new(CasementConfig::default(), &platform);
//!
//! let window = ctx
//!     .create_toplevel(NativeViewId(7), WindowAttributes::toplevel(Rect::new(10, 10, 300, 200)))
//!     .unwrap();
//! ctx.show(window);
//!
//! assert!(ctx.tree().is_viewable(window));
//! assert!(ctx.damage().has_pending());
//! ```

pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod input;
pub mod logging;
pub mod paint;
pub mod platform;
pub mod region;
pub mod screen;
pub mod window;

// Re-export main types for easy access
pub use config::CasementConfig;
pub use context::InputContext;
pub use error::WindowError;
pub use input::{Dispatch, Event, EventKind, EventMask, ModifierState, NativeEvent};
pub use platform::{NativeCompositor, NativePlatform};
pub use region::{Point, Rect, Region};
pub use screen::CoordinateMapper;
pub use window::{WindowId, WindowTree};

// Re-export common error types
pub use anyhow::{Context, Error, Result};

/// Version information for casement
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
