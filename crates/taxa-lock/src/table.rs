use std::collections::HashMap;
use std::sync::Mutex;

use crate::session::SessionId;

/// Process-wide advisory lock map: classification root id → holding session.
///
/// The table itself never rejects a writer: [`EditLockTable::acquire`]
/// unconditionally overwrites the entry and returns the previous holder, so
/// callers can surface a force takeover instead of discovering contention
/// via a later failed write check. Mutating callers are expected to check
/// [`EditLockTable::foreign_holder`] first and refuse to proceed while a
/// different session holds the entry.
///
/// All access goes through one mutex, so concurrent sessions racing for the
/// same classification observe a single consistent winner.
#[derive(Debug, Default)]
pub struct EditLockTable {
    entries: Mutex<HashMap<String, SessionId>>,
}

impl EditLockTable {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `session` as the holder of `root_id`, unconditionally.
    ///
    /// Returns the previous holder, if any (also when it is the same
    /// session re-acquiring).
    pub fn acquire(&self, root_id: &str, session: &SessionId) -> Option<SessionId> {
        self.entries
            .lock()
            .expect("lock poisoned")
            .insert(root_id.to_string(), session.clone())
    }

    /// Current holder of `root_id`.
    pub fn holder(&self, root_id: &str) -> Option<SessionId> {
        self.entries
            .lock()
            .expect("lock poisoned")
            .get(root_id)
            .cloned()
    }

    /// The holder of `root_id` when it is a session other than `session`.
    ///
    /// `None` means the classification is free for `session` to mutate:
    /// unlocked, or already held by `session` itself.
    pub fn foreign_holder(&self, root_id: &str, session: &SessionId) -> Option<SessionId> {
        self.entries
            .lock()
            .expect("lock poisoned")
            .get(root_id)
            .filter(|holder| *holder != session)
            .cloned()
    }

    /// Remove the entry for `root_id`, returning the evicted holder.
    pub fn release(&self, root_id: &str) -> Option<SessionId> {
        self.entries.lock().expect("lock poisoned").remove(root_id)
    }

    /// Remove every entry held by `session` (session save or discard).
    ///
    /// Returns the number of entries removed.
    pub fn release_all(&self, session: &SessionId) -> usize {
        let mut entries = self.entries.lock().expect("lock poisoned");
        let before = entries.len();
        entries.retain(|_, holder| holder != session);
        before - entries.len()
    }

    /// Number of locked classifications.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("lock poisoned").len()
    }

    /// Returns `true` if no classification is locked.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("lock poisoned").is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_records_holder() {
        let table = EditLockTable::new();
        let s1 = SessionId::new();

        assert!(table.acquire("A", &s1).is_none());
        assert_eq!(table.holder("A"), Some(s1.clone()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn acquire_overwrites_and_returns_previous_holder() {
        let table = EditLockTable::new();
        let s1 = SessionId::new();
        let s2 = SessionId::new();

        table.acquire("A", &s1);
        let previous = table.acquire("A", &s2);
        assert_eq!(previous, Some(s1));
        assert_eq!(table.holder("A"), Some(s2));
    }

    #[test]
    fn reacquire_by_same_session_returns_itself() {
        let table = EditLockTable::new();
        let s1 = SessionId::new();

        table.acquire("A", &s1);
        assert_eq!(table.acquire("A", &s1), Some(s1.clone()));
        assert_eq!(table.holder("A"), Some(s1));
    }

    #[test]
    fn foreign_holder_only_reports_other_sessions() {
        let table = EditLockTable::new();
        let s1 = SessionId::new();
        let s2 = SessionId::new();

        assert!(table.foreign_holder("A", &s1).is_none());

        table.acquire("A", &s1);
        assert!(table.foreign_holder("A", &s1).is_none());
        assert_eq!(table.foreign_holder("A", &s2), Some(s1));
    }

    #[test]
    fn release_removes_entry() {
        let table = EditLockTable::new();
        let s1 = SessionId::new();

        table.acquire("A", &s1);
        assert_eq!(table.release("A"), Some(s1));
        assert!(table.holder("A").is_none());
        assert!(table.release("A").is_none());
    }

    #[test]
    fn release_all_clears_only_that_session() {
        let table = EditLockTable::new();
        let s1 = SessionId::new();
        let s2 = SessionId::new();

        table.acquire("A", &s1);
        table.acquire("B", &s1);
        table.acquire("C", &s2);

        assert_eq!(table.release_all(&s1), 2);
        assert!(table.holder("A").is_none());
        assert!(table.holder("B").is_none());
        assert_eq!(table.holder("C"), Some(s2));
    }

    #[test]
    fn racing_sessions_observe_single_winner() {
        use std::sync::Arc;
        use std::thread;

        let table = Arc::new(EditLockTable::new());
        let sessions: Vec<SessionId> = (0..8).map(|_| SessionId::new()).collect();

        let handles: Vec<_> = sessions
            .iter()
            .cloned()
            .map(|session| {
                let table = Arc::clone(&table);
                thread::spawn(move || table.acquire("A", &session))
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }

        // Exactly one session ended up as holder, and it is one of ours.
        let winner = table.holder("A").expect("someone must hold the lock");
        assert!(sessions.contains(&winner));
        assert_eq!(table.len(), 1);
    }
}
