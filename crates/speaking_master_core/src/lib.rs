pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use domain::{
    ArchivePage, AuthSession, NewPracticeSession, PracticeSession, SavedPhrase, ScoreReport,
    TaskType, User,
};
pub use ports::{PortError, PortResult, StoreService};
pub use services::{ArchiveService, Login, PhraseRepository, PracticeService, SessionService};
