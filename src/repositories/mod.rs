pub mod entry_repo;
pub mod memory;
pub mod patient_repo;
pub mod user_repo;

pub use entry_repo::EntryRepository;
pub use memory::{InMemoryEntryRepository, InMemoryPatientRepository, InMemoryUserRepository};
pub use patient_repo::PatientRepository;
pub use user_repo::UserRepository;
