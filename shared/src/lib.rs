//! NeuroLift Shared Library
//!
//! Pure domain logic shared by the local client and the WASM bindings:
//! records, units, the workout session and clock, plate math, overload
//! suggestions and the merge protocol. Nothing in this crate does I/O.

pub mod catalog;
pub mod clock;
pub mod errors;
pub mod journal;
pub mod merge;
pub mod models;
pub mod nutrition;
pub mod overload;
pub mod plates;
pub mod session;
pub mod stats;
pub mod units;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::*;
pub use units::*;

pub use clock::{format_clock, Clock, ClockEvent, ClockMode};
pub use merge::{live, merge_by_id, merge_with_report, MergePolicy, MergeReport, SyncRecord};
pub use overload::{suggest, OverloadSuggestion, Rule};
pub use plates::{calculate_plates, PlateConfig, PlateOutcome, PlateSolution};
pub use session::{SessionPhase, SetField, WorkoutSession};
pub use stats::{workout_volume, ProfileStats};
