//! Per-browser-session state: the uploaded table and the running chat
//! memory. One UI session owns one [`Session`]; everything vanishes with it.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::chat::ChatMemory;
use crate::types::DataTable;

#[derive(Debug, Default)]
pub struct SessionState {
    pub table: Option<DataTable>,
    pub memory: ChatMemory,
}

/// Cheap-to-clone handle to the session state. The UI layer hands clones to
/// its event handlers; each interaction locks for the duration of one call.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_table(&self, table: DataTable) {
        self.inner.write().table = Some(table);
    }

    pub fn table(&self) -> Option<DataTable> {
        self.inner.read().table.clone()
    }

    pub fn has_table(&self) -> bool {
        self.inner.read().table.is_some()
    }

    /// Snapshot of the chat memory. Async interactions clone the memory
    /// here, run, then store the updated copy with
    /// [`Session::replace_memory`]; overlapping interactions on one
    /// session are last-write-wins.
    pub fn memory(&self) -> ChatMemory {
        self.inner.read().memory.clone()
    }

    /// Store an updated memory snapshot, replacing the current one.
    pub fn replace_memory(&self, memory: ChatMemory) {
        self.inner.write().memory = memory;
    }

    /// Run `f` with mutable access to the chat memory. Synchronous
    /// mutation only; the lock is never held across an await.
    pub fn with_memory<T>(&self, f: impl FnOnce(&mut ChatMemory) -> T) -> T {
        f(&mut self.inner.write().memory)
    }

    pub fn reset(&self) {
        let mut state = self.inner.write();
        state.table = None;
        state.memory.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_upload_replaces_previous() {
        let session = Session::new();
        assert!(!session.has_table());

        session.set_table(DataTable::new(vec!["a".into()], vec![vec!["1".into()]]));
        session.set_table(DataTable::new(vec!["b".into()], vec![]));

        assert_eq!(session.table().unwrap().columns, vec!["b"]);
    }

    #[test]
    fn memory_is_shared_across_clones() {
        let session = Session::new();
        let other = session.clone();
        session.with_memory(|m| m.add_user("hello"));
        assert_eq!(other.memory().len(), 1);
    }

    #[test]
    fn updated_memory_snapshot_can_be_stored_back() {
        let session = Session::new();
        let mut memory = session.memory();
        memory.add_user("hi");
        memory.add_assistant("hello");

        session.replace_memory(memory);
        assert_eq!(session.memory().len(), 2);
        assert_eq!(session.memory().turns()[1].content, "hello");
    }

    #[test]
    fn reset_clears_everything() {
        let session = Session::new();
        session.set_table(DataTable::new(vec!["a".into()], vec![]));
        session.with_memory(|m| m.add_user("hi"));

        session.reset();
        assert!(!session.has_table());
        assert!(session.memory().is_empty());
    }
}
