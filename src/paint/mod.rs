//! Screen updates: damage accumulation and flush pacing

pub mod damage;
pub mod frame_pacing;

pub use damage::{DamageScheduler, PaintRequest};
pub use frame_pacing::{FlushDecision, FlushPacer};
