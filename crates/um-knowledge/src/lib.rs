//! `um-knowledge`: what entities learn from travelling.
//!
//! Movement activities emit one [`TravelExperience`] per completed street
//! segment and vehicles emit a [`StopExperience`] per stop dwell.  An
//! entity's [`Knowledge`] handle buffers them, hands them to a persistent
//! [`ExperienceStore`] through the [`KnowledgeExchange`] pool, and uses the
//! store to adjust planner estimates before itineraries are ranked.
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`experience`] | `TravelExperience`, `StopExperience`, `Experience`        |
//! | [`knowledge`]  | `Knowledge` trait, `NoKnowledge`, `KnowledgeModel`        |
//! | [`local`]      | `LocalKnowledge`: buffered, store-backed knowledge        |
//! | [`store`]      | `ExperienceStore`, `InMemoryExperienceStore`, `KnowledgeScope` |
//! | [`csv_log`]    | `CsvExperienceLog`: append-only CSV store                 |
//! | [`exchange`]   | `KnowledgeExchange`: worker pool for store writes         |
//! | [`error`]      | `KnowledgeError`, `KnowledgeResult<T>`                    |

pub mod csv_log;
pub mod error;
pub mod exchange;
pub mod experience;
pub mod knowledge;
pub mod local;
pub mod store;


pub use csv_log::CsvExperienceLog;
pub use error::{KnowledgeError, KnowledgeResult};
pub use exchange::KnowledgeExchange;
pub use experience::{Experience, StopExperience, TravelExperience};
pub use knowledge::{Knowledge, KnowledgeHandle, KnowledgeModel, NoKnowledge};
pub use local::LocalKnowledge;
pub use store::{ExperienceStore, InMemoryExperienceStore, KnowledgeScope, SegmentEstimate};
