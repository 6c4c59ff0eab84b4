//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories, the shared domain rules and the remote store.

pub mod export;
pub mod journal;
pub mod nutrition;
pub mod profile;
pub mod sync;
pub mod templates;
pub mod workout;

pub use export::{DataExport, ExportService};
pub use journal::JournalService;
pub use nutrition::NutritionService;
pub use profile::ProfileService;
pub use sync::{CollectionSync, SyncReport, SyncService};
pub use templates::TemplateService;
pub use workout::WorkoutService;
