//! crates/speaking_master_core/src/services/mod.rs
//!
//! Application services. Each one owns a handle to the store port and
//! implements one slice of the backend: session lifecycle, saved phrases,
//! archive queries, and the practice-session lifecycle.

pub mod archive;
pub mod phrases;
pub mod practice;
pub mod session;

pub use archive::ArchiveService;
pub use phrases::PhraseRepository;
pub use practice::PracticeService;
pub use session::{Login, SessionService};
