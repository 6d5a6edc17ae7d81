//! History state machine: adjacent dedup, pin-aware eviction, search
//! ordering and self-write suppression.

use clipstash_events::{EventSink, EventSinkRef, UiEvent};
use uuid::Uuid;

use crate::entry::Entry;

/// Durable store for the entry collection.
///
/// Implemented by the storage crate; the manager never touches the on-disk
/// representation itself.
pub trait HistoryRepository: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Replace the stored collection with `entries`.
    fn save(&self, entries: &[Entry]) -> Result<(), Self::Error>;
    /// Read the stored collection; an absent store is an empty collection.
    fn load(&self) -> Result<Vec<Entry>, Self::Error>;
    /// Erase the backing store entirely.
    fn clear(&self) -> Result<(), Self::Error>;
}

/// Write half of the system clipboard, used to restore an entry.
pub trait ClipboardWriter: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    fn write_text(&mut self, text: &str) -> Result<(), Self::Error>;
}

/// Owns the in-memory entry collection and is its sole mutator.
///
/// Every method is synchronous and expected to run inside the daemon's
/// single serialized context; the manager takes no lock of its own. The
/// collection is kept newest-first by insertion order.
pub struct HistoryManager<R, C> {
    entries: Vec<Entry>,
    item_limit: usize,
    /// Content of the last self-initiated clipboard write. Armed by
    /// `copy_item`, consumed by the next observed change.
    suppressed: Option<String>,
    repository: R,
    clipboard: C,
    events: EventSinkRef,
}

impl<R, C> HistoryManager<R, C>
where
    R: HistoryRepository,
    C: ClipboardWriter,
{
    /// Create a manager over the previously persisted collection.
    ///
    /// A load failure is recoverable: it is logged and the manager starts
    /// with an empty history.
    pub fn new(repository: R, clipboard: C, events: EventSinkRef, item_limit: usize) -> Self {
        let entries = match repository.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("failed to load history: {e}; starting empty");
                Vec::new()
            }
        };
        Self {
            entries,
            item_limit: item_limit.max(1),
            suppressed: None,
            repository,
            clipboard,
            events,
        }
    }

    /// The collection, newest-first by insertion order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record an observed clipboard change.
    ///
    /// A change matching the armed suppression value is our own write echoed
    /// back by the watcher and is consumed without touching the history.
    /// Any observed change disarms the suppression, matching or not.
    pub fn add_item(&mut self, content: &str) {
        if let Some(armed) = self.suppressed.take() {
            if armed == content {
                tracing::debug!("suppressed self-initiated clipboard change");
                return;
            }
        }

        // Adjacent dedup: compare against the newest entry only.
        if self.entries.first().is_some_and(|e| e.content == content) {
            return;
        }

        self.entries.insert(0, Entry::new(content));
        self.trim_to_limit();
        self.persist();
        self.publish();
    }

    /// Write an entry's content back to the system clipboard.
    ///
    /// The suppression value is armed before the write: the write triggers
    /// the watcher asynchronously, so arming afterwards would race the echo.
    /// Unknown ids are a no-op.
    pub fn copy_item(&mut self, id: Uuid) {
        let Some(entry) = self.entries.iter().find(|e| e.id == id) else {
            return;
        };
        let content = entry.content.clone();

        self.suppressed = Some(content.clone());
        if let Err(e) = self.clipboard.write_text(&content) {
            // No echo will arrive for a failed write.
            self.suppressed = None;
            tracing::warn!("clipboard write failed: {e}");
        }
    }

    /// Remove the matching entry. Unknown ids are a no-op with no
    /// persistence write.
    pub fn delete_item(&mut self, id: Uuid) {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() != before {
            self.persist();
            self.publish();
        }
    }

    /// Flip the pinned flag on the matching entry. Unknown ids are a no-op
    /// with no persistence write.
    pub fn toggle_pin(&mut self, id: Uuid) {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return;
        };
        entry.pinned = !entry.pinned;
        self.persist();
        self.publish();
    }

    /// Remove every entry and erase the backing store.
    ///
    /// The store is erased rather than overwritten with an empty list so a
    /// crash mid-operation cannot leave a stale non-empty file behind.
    pub fn clear_all(&mut self) {
        self.entries.clear();
        if let Err(e) = self.repository.clear() {
            tracing::warn!("failed to clear history store: {e}");
        }
        self.publish();
    }

    /// Apply a new size bound and evict, persisting only when entries were
    /// actually dropped. This is the settings-observer entry point.
    pub fn enforce_limit(&mut self, limit: usize) {
        self.item_limit = limit.max(1);
        if self.trim_to_limit() {
            self.persist();
            self.publish();
        }
    }

    /// Case-insensitive substring view over the collection, recomputed on
    /// every call: pinned matches first, then unpinned, each group newest
    /// first.
    pub fn filtered_view(&self, search: &str) -> Vec<&Entry> {
        let needle = search.to_lowercase();
        let mut hits: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| needle.is_empty() || e.content.to_lowercase().contains(&needle))
            .collect();
        hits.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then(b.timestamp.cmp(&a.timestamp))
        });
        hits
    }

    /// Evict down to the item limit. Pinned entries are kept unconditionally
    /// in their existing order, followed by the newest unpinned entries that
    /// still fit. Returns whether anything was dropped.
    fn trim_to_limit(&mut self) -> bool {
        if self.entries.len() <= self.item_limit {
            return false;
        }

        let (pinned, unpinned): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|e| e.pinned);
        let allowed = self.item_limit.saturating_sub(pinned.len());
        let dropped = unpinned.len().saturating_sub(allowed);

        self.entries = pinned;
        self.entries.extend(unpinned.into_iter().take(allowed));
        dropped > 0
    }

    /// A failed save is logged and the update dropped on disk; the in-memory
    /// collection stays authoritative.
    fn persist(&self) {
        if let Err(e) = self.repository.save(&self.entries) {
            tracing::warn!("failed to persist history: {e}");
        }
    }

    fn publish(&self) {
        self.events.emit(&UiEvent::HistoryChanged {
            total: self.entries.len(),
            pinned: self.entries.iter().filter(|e| e.pinned).count(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipstash_events::{topics, CapturingSink};
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory repository double with shared inspection handles.
    #[derive(Clone, Default)]
    struct MemoryRepository {
        stored: Arc<Mutex<Option<Vec<Entry>>>>,
        saves: Arc<AtomicUsize>,
        fail: bool,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("injected storage failure")]
    struct InjectedFailure;

    impl MemoryRepository {
        fn seeded(entries: Vec<Entry>) -> Self {
            Self {
                stored: Arc::new(Mutex::new(Some(entries))),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn stored(&self) -> Option<Vec<Entry>> {
            self.stored.lock().unwrap().clone()
        }

        fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    impl HistoryRepository for MemoryRepository {
        type Error = InjectedFailure;

        fn save(&self, entries: &[Entry]) -> Result<(), InjectedFailure> {
            if self.fail {
                return Err(InjectedFailure);
            }
            self.saves.fetch_add(1, Ordering::SeqCst);
            *self.stored.lock().unwrap() = Some(entries.to_vec());
            Ok(())
        }

        fn load(&self) -> Result<Vec<Entry>, InjectedFailure> {
            if self.fail {
                return Err(InjectedFailure);
            }
            Ok(self.stored.lock().unwrap().clone().unwrap_or_default())
        }

        fn clear(&self) -> Result<(), InjectedFailure> {
            *self.stored.lock().unwrap() = None;
            Ok(())
        }
    }

    /// Clipboard double recording every write.
    #[derive(Clone, Default)]
    struct MemoryClipboard {
        writes: Arc<Mutex<Vec<String>>>,
    }

    impl MemoryClipboard {
        fn writes(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl ClipboardWriter for MemoryClipboard {
        type Error = Infallible;

        fn write_text(&mut self, text: &str) -> Result<(), Infallible> {
            self.writes.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    /// Clipboard double that always fails.
    struct BrokenClipboard;

    #[derive(Debug, thiserror::Error)]
    #[error("injected clipboard failure")]
    struct ClipboardFailure;

    impl ClipboardWriter for BrokenClipboard {
        type Error = ClipboardFailure;

        fn write_text(&mut self, _text: &str) -> Result<(), ClipboardFailure> {
            Err(ClipboardFailure)
        }
    }

    fn manager(
        limit: usize,
    ) -> (
        HistoryManager<MemoryRepository, MemoryClipboard>,
        MemoryRepository,
        MemoryClipboard,
        Arc<CapturingSink>,
    ) {
        let repository = MemoryRepository::default();
        let clipboard = MemoryClipboard::default();
        let sink = Arc::new(CapturingSink::new());
        let manager = HistoryManager::new(
            repository.clone(),
            clipboard.clone(),
            sink.clone(),
            limit,
        );
        (manager, repository, clipboard, sink)
    }

    fn contents(manager: &HistoryManager<MemoryRepository, MemoryClipboard>) -> Vec<&str> {
        manager.entries().iter().map(|e| e.content.as_str()).collect()
    }

    // =========================================================================
    // add_item: dedup, ordering, eviction
    // =========================================================================

    #[test]
    fn test_add_item_prepends_newest_first() {
        let (mut manager, ..) = manager(100);
        manager.add_item("a");
        manager.add_item("b");
        assert_eq!(contents(&manager), vec!["b", "a"]);
    }

    #[test]
    fn test_adjacent_duplicates_are_dropped() {
        let (mut manager, repository, ..) = manager(100);
        manager.add_item("a");
        manager.add_item("a");
        manager.add_item("a");
        assert_eq!(contents(&manager), vec!["a"]);
        assert_eq!(repository.save_count(), 1);
    }

    #[test]
    fn test_dedup_is_adjacent_only() {
        let (mut manager, ..) = manager(100);
        manager.add_item("a");
        manager.add_item("b");
        manager.add_item("a");
        assert_eq!(contents(&manager), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_no_two_consecutive_entries_share_content() {
        let (mut manager, ..) = manager(100);
        for content in ["a", "a", "b", "b", "a", "c", "c", "c"] {
            manager.add_item(content);
        }
        let all = manager.entries();
        for pair in all.windows(2) {
            assert_ne!(pair[0].content, pair[1].content);
        }
    }

    #[test]
    fn test_limit_three_keeps_newest_three() {
        // Scenario: limit=3; add a, b, c, d -> [d, c, b]
        let (mut manager, ..) = manager(3);
        for content in ["a", "b", "c", "d"] {
            manager.add_item(content);
        }
        assert_eq!(contents(&manager), vec!["d", "c", "b"]);
    }

    // =========================================================================
    // Suppression
    // =========================================================================

    #[test]
    fn test_copy_echo_is_not_recorded() {
        let (mut manager, _, clipboard, _) = manager(100);
        manager.add_item("a");
        manager.add_item("b");
        let id = manager.entries()[1].id; // "a"

        manager.copy_item(id);
        assert_eq!(clipboard.writes(), vec!["a"]);

        // Watcher observes our own write.
        manager.add_item("a");
        assert_eq!(contents(&manager), vec!["b", "a"]);
    }

    #[test]
    fn test_suppression_is_consumed_once() {
        let (mut manager, ..) = manager(100);
        manager.add_item("a");
        manager.add_item("b");
        let id = manager.entries()[1].id;

        manager.copy_item(id);
        manager.add_item("a"); // echo, suppressed
        manager.add_item("a"); // genuine external copy of the same text
        assert_eq!(contents(&manager), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_any_observed_change_disarms_suppression() {
        let (mut manager, ..) = manager(100);
        manager.add_item("a");
        let id = manager.entries()[0].id;

        manager.copy_item(id);
        manager.add_item("b"); // unrelated change disarms
        manager.add_item("a"); // must not be swallowed by the stale arm
        assert_eq!(contents(&manager), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_copy_item_unknown_id_is_noop() {
        let (mut manager, _, clipboard, _) = manager(100);
        manager.add_item("a");
        manager.copy_item(Uuid::new_v4());
        assert!(clipboard.writes().is_empty());
        // No suppression armed: the next "a" is adjacent-deduped, a new "b" lands.
        manager.add_item("b");
        assert_eq!(contents(&manager), vec!["b", "a"]);
    }

    #[test]
    fn test_failed_clipboard_write_disarms_suppression() {
        let repository = MemoryRepository::default();
        let sink = Arc::new(CapturingSink::new());
        let mut manager =
            HistoryManager::new(repository, BrokenClipboard, sink, 100);
        manager.add_item("a");
        let id = manager.entries()[0].id;

        manager.copy_item(id);
        // No echo will come; a later external "b" then "a" must both record.
        manager.add_item("b");
        manager.add_item("a");
        assert_eq!(manager.len(), 3);
    }

    // =========================================================================
    // delete / pin / clear
    // =========================================================================

    #[test]
    fn test_delete_item_removes_and_persists() {
        let (mut manager, repository, ..) = manager(100);
        manager.add_item("a");
        manager.add_item("b");
        let id = manager.entries()[1].id;

        let saves = repository.save_count();
        manager.delete_item(id);
        assert_eq!(contents(&manager), vec!["b"]);
        assert_eq!(repository.save_count(), saves + 1);
    }

    #[test]
    fn test_delete_unknown_id_writes_nothing() {
        let (mut manager, repository, ..) = manager(100);
        manager.add_item("a");
        let saves = repository.save_count();

        manager.delete_item(Uuid::new_v4());
        assert_eq!(manager.len(), 1);
        assert_eq!(repository.save_count(), saves);
    }

    #[test]
    fn test_toggle_pin_flips_in_place() {
        let (mut manager, ..) = manager(100);
        manager.add_item("a");
        let id = manager.entries()[0].id;

        manager.toggle_pin(id);
        assert!(manager.entries()[0].pinned);
        manager.toggle_pin(id);
        assert!(!manager.entries()[0].pinned);
    }

    #[test]
    fn test_toggle_pin_unknown_id_is_noop_without_persistence() {
        // Scenario: togglePin("nonexistent") changes nothing, writes nothing.
        let (mut manager, repository, ..) = manager(100);
        manager.add_item("a");
        let before: Vec<Entry> = manager.entries().to_vec();
        let saves = repository.save_count();

        manager.toggle_pin(Uuid::new_v4());
        assert_eq!(manager.entries(), &before[..]);
        assert_eq!(repository.save_count(), saves);
    }

    #[test]
    fn test_clear_all_erases_store_not_saves_empty() {
        let (mut manager, repository, ..) = manager(100);
        manager.add_item("a");
        manager.add_item("b");
        assert!(repository.stored().is_some());

        let saves = repository.save_count();
        manager.clear_all();
        assert!(manager.is_empty());
        // The store was erased, not overwritten with an empty list.
        assert!(repository.stored().is_none());
        assert_eq!(repository.save_count(), saves);
    }

    // =========================================================================
    // Eviction
    // =========================================================================

    #[test]
    fn test_pinned_block_precedes_kept_unpinned() {
        // Scenario: ["a","b","c"] newest-first, pin "b", limit 2 -> ["b","a"].
        let (mut manager, ..) = manager(100);
        manager.add_item("c");
        manager.add_item("b");
        manager.add_item("a");
        let b = manager.entries()[1].id;
        manager.toggle_pin(b);

        manager.enforce_limit(2);
        assert_eq!(contents(&manager), vec!["b", "a"]);
        assert!(manager.entries()[0].pinned);
    }

    #[test]
    fn test_eviction_bound_holds() {
        let (mut manager, ..) = manager(100);
        for i in 0..20 {
            manager.add_item(&format!("item {i}"));
        }
        manager.enforce_limit(5);
        assert_eq!(manager.len(), 5);
    }

    #[test]
    fn test_pinned_entries_survive_any_limit() {
        let (mut manager, ..) = manager(100);
        for i in 0..10 {
            manager.add_item(&format!("item {i}"));
        }
        for entry in manager.entries().to_vec() {
            manager.toggle_pin(entry.id);
        }
        manager.add_item("unpinned");

        manager.enforce_limit(3);
        // All 10 pinned survive; no unpinned remain.
        assert_eq!(manager.len(), 10);
        assert!(manager.entries().iter().all(|e| e.pinned));
    }

    #[test]
    fn test_enforce_limit_without_overflow_writes_nothing() {
        let (mut manager, repository, ..) = manager(100);
        manager.add_item("a");
        let saves = repository.save_count();

        manager.enforce_limit(50);
        assert_eq!(repository.save_count(), saves);
    }

    #[test]
    fn test_eviction_drops_oldest_unpinned_first() {
        let (mut manager, ..) = manager(100);
        for content in ["old", "mid", "new"] {
            manager.add_item(content);
        }
        manager.enforce_limit(2);
        assert_eq!(contents(&manager), vec!["new", "mid"]);
    }

    // =========================================================================
    // Search view
    // =========================================================================

    #[test]
    fn test_filtered_view_is_case_insensitive() {
        let (mut manager, ..) = manager(100);
        manager.add_item("Hello World");
        manager.add_item("goodbye");

        let hits = manager.filtered_view("WORLD");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "Hello World");
    }

    #[test]
    fn test_filtered_view_orders_pinned_first_then_newest() {
        let (mut manager, ..) = manager(100);
        manager.add_item("apple pie");
        manager.add_item("apple tart");
        manager.add_item("apple cake");
        let pie = manager.entries()[2].id;
        manager.toggle_pin(pie);

        let hits = manager.filtered_view("apple");
        let contents: Vec<&str> = hits.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["apple pie", "apple cake", "apple tart"]);
    }

    #[test]
    fn test_filtered_view_empty_search_matches_all() {
        let (mut manager, ..) = manager(100);
        manager.add_item("a");
        manager.add_item("b");
        assert_eq!(manager.filtered_view("").len(), 2);
    }

    #[test]
    fn test_filtered_view_does_not_mutate_collection() {
        let (mut manager, ..) = manager(100);
        manager.add_item("b");
        manager.add_item("a");
        let id = manager.entries()[1].id;
        manager.toggle_pin(id);

        let _ = manager.filtered_view("");
        // Insertion order is untouched by the derived view.
        assert_eq!(contents(&manager), vec!["a", "b"]);
    }

    // =========================================================================
    // Failure degradation and published state
    // =========================================================================

    #[test]
    fn test_load_failure_degrades_to_empty() {
        let sink = Arc::new(CapturingSink::new());
        let manager = HistoryManager::new(
            MemoryRepository::failing(),
            MemoryClipboard::default(),
            sink,
            100,
        );
        assert!(manager.is_empty());
    }

    #[test]
    fn test_save_failure_keeps_memory_state() {
        let sink = Arc::new(CapturingSink::new());
        let mut manager = HistoryManager::new(
            MemoryRepository::failing(),
            MemoryClipboard::default(),
            sink,
            100,
        );
        manager.add_item("a");
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_mutations_publish_history_changed() {
        let (mut manager, _, _, sink) = manager(100);
        manager.add_item("a");
        manager.add_item("b");
        let id = manager.entries()[0].id;
        manager.toggle_pin(id);

        let events = sink.events_for(topics::HISTORY_CHANGED);
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[2],
            clipstash_events::UiEvent::HistoryChanged {
                total: 2,
                pinned: 1
            }
        );
    }

    #[test]
    fn test_noop_mutations_publish_nothing() {
        let (mut manager, _, _, sink) = manager(100);
        manager.add_item("a");
        sink.clear();

        manager.add_item("a"); // adjacent dup
        manager.delete_item(Uuid::new_v4());
        manager.toggle_pin(Uuid::new_v4());
        assert!(sink.is_empty());
    }
}
