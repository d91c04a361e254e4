pub mod redaction;
pub mod scheduler;
pub mod sync_engine;

pub use redaction::RedactionView;
pub use scheduler::SyncScheduler;
pub use sync_engine::{CourseScope, EngineSnapshot, LastUpdate, SyncEngine, SyncStats};
