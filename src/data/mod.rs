// Public API - what other modules can use
pub use memory::InMemoryDatabase;
pub use postgres::PostgresDatabase;
pub use repository::{EntityStore, Repository, StateRepository, StateStore, TrackedRepository};
pub use session::{Change, Session, StagedChange};
pub use unit_of_work::{ChangeCommitter, SessionUnitOfWork, UnitOfWork, UnitOfWorkFactory};

// Internal modules
pub mod entities;
mod memory;
mod postgres;
mod repository;
mod session;
mod unit_of_work;
