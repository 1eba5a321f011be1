use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};

use super::entities::{CountryModel, Entity, StateModel};
use crate::shared::AppError;

/// A single staged mutation of one entity type
#[derive(Debug, Clone, PartialEq)]
pub enum Change<E> {
    Add(E),
    Update(E),
    Delete(i32),
}

/// A staged mutation tagged with its entity type, kept in staging order
#[derive(Debug, Clone, PartialEq)]
pub enum StagedChange {
    Country(Change<CountryModel>),
    State(Change<StateModel>),
}

/// Storage session shared by a unit of work and its repositories.
///
/// Holds the ordered change log until it is drained by a commit. Once
/// disposed, every operation fails with `AppError::InvalidState`.
#[derive(Debug, Default)]
pub struct Session {
    changes: Mutex<Vec<StagedChange>>,
    disposed: AtomicBool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_open(&self) -> Result<(), AppError> {
        if self.disposed.load(Ordering::SeqCst) {
            warn!("Attempted to use a disposed unit of work");
            return Err(AppError::InvalidState(
                "Unit of work has been disposed".to_string(),
            ));
        }
        Ok(())
    }

    /// Appends a change for entity type `E` to the change log
    pub fn stage<E: Entity>(&self, change: Change<E>) -> Result<(), AppError> {
        self.ensure_open()?;

        let mut changes = self.changes.lock().map_err(|_| AppError::Internal)?;
        changes.push(E::stage(change));

        debug!(
            entity = E::NAME,
            pending_changes = changes.len(),
            "Change staged"
        );
        Ok(())
    }

    /// Drains the change log, leaving the session empty
    pub fn take_changes(&self) -> Result<Vec<StagedChange>, AppError> {
        self.ensure_open()?;

        let mut changes = self.changes.lock().map_err(|_| AppError::Internal)?;
        Ok(std::mem::take(&mut *changes))
    }

    pub fn pending_changes(&self) -> usize {
        self.changes
            .lock()
            .map(|changes| changes.len())
            .unwrap_or_default()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Marks the session disposed and discards pending changes
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut changes = self.changes.lock().unwrap_or_else(|e| e.into_inner());
        if !changes.is_empty() {
            debug!(
                discarded_changes = changes.len(),
                "Discarding unsaved changes on dispose"
            );
        }
        changes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_keeps_changes_in_order() {
        let session = Session::new();
        session
            .stage(Change::Add(CountryModel::new(1, "Country1")))
            .unwrap();
        session
            .stage(Change::Add(StateModel::new(1, "State1", 1)))
            .unwrap();
        session.stage::<CountryModel>(Change::Delete(1)).unwrap();

        let changes = session.take_changes().unwrap();
        assert_eq!(changes.len(), 3);
        assert!(matches!(changes[0], StagedChange::Country(Change::Add(_))));
        assert!(matches!(changes[1], StagedChange::State(Change::Add(_))));
        assert!(matches!(changes[2], StagedChange::Country(Change::Delete(1))));

        assert_eq!(session.pending_changes(), 0);
    }

    #[test]
    fn test_dispose_discards_changes_and_rejects_further_use() {
        let session = Session::new();
        session
            .stage(Change::Add(CountryModel::new(1, "Country1")))
            .unwrap();

        session.dispose();

        assert!(session.is_disposed());
        assert_eq!(session.pending_changes(), 0);
        assert!(matches!(
            session.stage::<CountryModel>(Change::Delete(1)),
            Err(AppError::InvalidState(_))
        ));
        assert!(matches!(
            session.take_changes(),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn test_dispose_twice_is_harmless() {
        let session = Session::new();
        session.dispose();
        session.dispose();
        assert!(session.is_disposed());
    }
}
