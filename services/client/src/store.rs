//! services/client/src/store.rs
//!
//! The Local Reading Store: the single in-process source of truth for the
//! current user's reading state. Mutation operations are synchronous, total
//! over state (an unknown id is a silent no-op, never an error), and enforce
//! the status-transition and progress-logging invariants. Every mutation is
//! mirrored to durable local storage and announced on a watch channel so the
//! sync bridge can debounce a cloud push.

use chrono::{NaiveDate, Utc};
use readshelf_core::domain::{
    Book, BookDraft, BookPatch, BookStatus, BookThread, DailyLog, GoalDraft, GoalPatch,
    ReadingData, ReadingGoal, ReadingSession, SessionDraft, ThreadDraft, ThreadPatch,
};
use readshelf_core::ports::LocalStorageService;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::warn;
use uuid::Uuid;

/// Fixed local-storage key holding the whole serialized store state.
pub const STORE_STORAGE_KEY: &str = "readshelf.store";

/// The full persisted form of the store. `notified_badges` is per-user
/// bookkeeping for the sync bridge and survives `clear()`, so a badge
/// notifies at most once per user across sign-in cycles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSnapshot {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub goals: Vec<ReadingGoal>,
    #[serde(default)]
    pub daily_logs: Vec<DailyLog>,
    #[serde(default)]
    pub threads: Vec<BookThread>,
    #[serde(default)]
    pub reader_name: String,
    #[serde(default)]
    pub notified_badges: BTreeMap<String, BTreeSet<String>>,
}

/// The in-process reading-state container.
pub struct ReadingStore {
    state: Mutex<LocalSnapshot>,
    storage: Arc<dyn LocalStorageService>,
    changes: watch::Sender<u64>,
}

impl ReadingStore {
    /// Creates a store, restoring any previously persisted local snapshot so
    /// a restart before a cloud round-trip loses nothing.
    pub fn new(storage: Arc<dyn LocalStorageService>) -> Self {
        let snapshot = match storage.get(STORE_STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Persisted store snapshot is unreadable; starting empty.");
                LocalSnapshot::default()
            }),
            Ok(None) => LocalSnapshot::default(),
            Err(e) => {
                warn!(error = %e, "Could not read persisted store snapshot; starting empty.");
                LocalSnapshot::default()
            }
        };
        let (changes, _) = watch::channel(0);
        Self {
            state: Mutex::new(snapshot),
            storage,
            changes,
        }
    }

    /// Subscribes to change events. The value is a revision counter; only
    /// the fact that it moved matters.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    fn state(&self) -> MutexGuard<'_, LocalSnapshot> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Persists the state and announces the mutation to subscribers.
    fn commit(&self, state: &LocalSnapshot) {
        self.persist(state);
        self.changes.send_modify(|rev| *rev += 1);
    }

    fn persist(&self, state: &LocalSnapshot) {
        match serde_json::to_string(state) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(STORE_STORAGE_KEY, &raw) {
                    warn!(error = %e, "Failed to persist store snapshot locally.");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize store snapshot."),
        }
    }

    //=====================================================================================
    // Book Operations
    //=====================================================================================

    /// Adds a book, assigning its id and creation timestamp. Returns the new id.
    pub fn add_book(&self, draft: BookDraft) -> String {
        let id = Uuid::new_v4().to_string();
        let book = Book {
            id: id.clone(),
            title: draft.title,
            author: draft.author,
            isbn: draft.isbn,
            cover_url: draft.cover_url,
            total_pages: draft.total_pages,
            current_page: draft.current_page,
            status: draft.status,
            genre: draft.genre,
            rating: draft.rating,
            start_date: None,
            finish_date: None,
            date_added: Utc::now(),
            favorite: false,
            notes: draft.notes,
            review: None,
            tags: draft.tags,
            sessions: Vec::new(),
        };
        let mut state = self.state();
        state.books.push(book);
        self.commit(&state);
        id
    }

    /// Shallow-merges the patch into the matching book. No-op if not found.
    pub fn update_book(&self, id: &str, patch: BookPatch) {
        let mut state = self.state();
        let Some(book) = state.books.iter_mut().find(|b| b.id == id) else {
            return;
        };
        if let Some(title) = patch.title {
            book.title = title;
        }
        if let Some(author) = patch.author {
            book.author = author;
        }
        if let Some(isbn) = patch.isbn {
            book.isbn = Some(isbn);
        }
        if let Some(cover_url) = patch.cover_url {
            book.cover_url = Some(cover_url);
        }
        if let Some(total_pages) = patch.total_pages {
            book.total_pages = total_pages;
        }
        if let Some(current_page) = patch.current_page {
            book.current_page = current_page;
        }
        if let Some(status) = patch.status {
            book.status = status;
        }
        if let Some(genre) = patch.genre {
            book.genre = genre;
        }
        if let Some(rating) = patch.rating {
            book.rating = Some(rating);
        }
        if let Some(start_date) = patch.start_date {
            book.start_date = Some(start_date);
        }
        if let Some(finish_date) = patch.finish_date {
            book.finish_date = Some(finish_date);
        }
        if let Some(favorite) = patch.favorite {
            book.favorite = favorite;
        }
        if let Some(notes) = patch.notes {
            book.notes = Some(notes);
        }
        if let Some(review) = patch.review {
            book.review = Some(review);
        }
        if let Some(tags) = patch.tags {
            book.tags = tags;
        }
        self.commit(&state);
    }

    /// Deletes a book and removes its id from every thread's membership list.
    /// This is the only operation that touches thread state as a side effect.
    pub fn delete_book(&self, id: &str) {
        let mut state = self.state();
        let before = state.books.len();
        state.books.retain(|b| b.id != id);
        if state.books.len() == before {
            return;
        }
        for thread in &mut state.threads {
            thread.book_ids.retain(|b| b != id);
        }
        self.commit(&state);
    }

    /// Flips the favorite flag. No-op if not found.
    pub fn toggle_favorite(&self, id: &str) {
        let mut state = self.state();
        let Some(book) = state.books.iter_mut().find(|b| b.id == id) else {
            return;
        };
        book.favorite = !book.favorite;
        self.commit(&state);
    }

    /// Sets a book's current page and derives the follow-on state.
    ///
    /// A `want-to-read` book that gains progress starts `reading` (stamping
    /// the start date if unset); a `reading` book reaching its page count
    /// completes, with the stored page clamped to the total. A positive page
    /// delta is logged as today's activity; zero or negative deltas log
    /// nothing.
    pub fn update_progress(&self, id: &str, new_current_page: u32) {
        let mut state = self.state();
        let Some(book) = state.books.iter_mut().find(|b| b.id == id) else {
            return;
        };
        let previous = book.current_page;
        book.current_page = new_current_page;

        if new_current_page > 0 && book.status == BookStatus::WantToRead {
            book.status = BookStatus::Reading;
            if book.start_date.is_none() {
                book.start_date = Some(Utc::now());
            }
        }
        if new_current_page >= book.total_pages && book.status == BookStatus::Reading {
            book.status = BookStatus::Completed;
            book.finish_date = Some(Utc::now());
            book.current_page = book.total_pages;
        }

        let book_id = book.id.clone();
        let delta = i64::from(new_current_page) - i64::from(previous);
        if delta > 0 {
            merge_daily(&mut state, Utc::now().date_naive(), delta as u32, 0, &book_id);
        }
        self.commit(&state);
    }

    /// Sets a book's status directly. Entering `reading` stamps the start
    /// date if unset; entering `completed` stamps the finish date and snaps
    /// the current page to the total, regardless of prior progress.
    pub fn update_status(&self, id: &str, new_status: BookStatus) {
        let mut state = self.state();
        let Some(book) = state.books.iter_mut().find(|b| b.id == id) else {
            return;
        };
        if new_status == BookStatus::Reading && book.start_date.is_none() {
            book.start_date = Some(Utc::now());
        }
        if new_status == BookStatus::Completed {
            book.finish_date = Some(Utc::now());
            book.current_page = book.total_pages;
        }
        book.status = new_status;
        self.commit(&state);
    }

    //=====================================================================================
    // Session Operations
    //=====================================================================================

    /// Appends a session to a book (entry order, not date order) and logs
    /// its pages and minutes against the session's calendar date.
    pub fn add_session(&self, book_id: &str, draft: SessionDraft) {
        let mut state = self.state();
        let Some(book) = state.books.iter_mut().find(|b| b.id == book_id) else {
            return;
        };
        let date = draft.date.date_naive();
        let pages = draft.pages_read;
        let minutes = draft.minutes_spent;
        book.sessions.push(ReadingSession {
            id: Uuid::new_v4().to_string(),
            date: draft.date,
            pages_read: draft.pages_read,
            minutes_spent: draft.minutes_spent,
            notes: draft.notes,
        });
        let book_id = book.id.clone();
        merge_daily(&mut state, date, pages, minutes, &book_id);
        self.commit(&state);
    }

    /// Removes a session from a book. The daily-log totals it contributed
    /// are left untouched; the aggregate only ever accumulates.
    pub fn delete_session(&self, book_id: &str, session_id: &str) {
        let mut state = self.state();
        let Some(book) = state.books.iter_mut().find(|b| b.id == book_id) else {
            return;
        };
        let before = book.sessions.len();
        book.sessions.retain(|s| s.id != session_id);
        if book.sessions.len() == before {
            return;
        }
        self.commit(&state);
    }

    //=====================================================================================
    // Goal Operations
    //=====================================================================================

    /// Adds a goal, assigning its id and creation timestamp. Returns the new id.
    pub fn add_goal(&self, draft: GoalDraft) -> String {
        let id = Uuid::new_v4().to_string();
        let mut state = self.state();
        state.goals.push(ReadingGoal {
            id: id.clone(),
            goal_type: draft.goal_type,
            target: draft.target,
            year: draft.year,
            created_at: Utc::now(),
        });
        self.commit(&state);
        id
    }

    /// Shallow-merges the patch into the matching goal. No-op if not found.
    pub fn update_goal(&self, id: &str, patch: GoalPatch) {
        let mut state = self.state();
        let Some(goal) = state.goals.iter_mut().find(|g| g.id == id) else {
            return;
        };
        if let Some(goal_type) = patch.goal_type {
            goal.goal_type = goal_type;
        }
        if let Some(target) = patch.target {
            goal.target = target;
        }
        if let Some(year) = patch.year {
            goal.year = year;
        }
        self.commit(&state);
    }

    pub fn delete_goal(&self, id: &str) {
        let mut state = self.state();
        let before = state.goals.len();
        state.goals.retain(|g| g.id != id);
        if state.goals.len() == before {
            return;
        }
        self.commit(&state);
    }

    //=====================================================================================
    // Thread Operations
    //=====================================================================================

    /// Adds a thread, assigning its id and creation timestamp. Returns the
    /// new id. Member ids are deduplicated, preserving first occurrence.
    pub fn add_thread(&self, draft: ThreadDraft) -> String {
        let id = Uuid::new_v4().to_string();
        let mut book_ids = Vec::new();
        for book_id in draft.book_ids {
            if !book_ids.contains(&book_id) {
                book_ids.push(book_id);
            }
        }
        let mut state = self.state();
        state.threads.push(BookThread {
            id: id.clone(),
            name: draft.name,
            description: draft.description,
            color: draft.color,
            icon: draft.icon,
            book_ids,
            is_auto_genre: draft.is_auto_genre,
            created_at: Utc::now(),
            cover_url: draft.cover_url,
            author: draft.author,
            genre: draft.genre,
        });
        self.commit(&state);
        id
    }

    /// Shallow-merges the patch into the matching thread. No-op if not found.
    pub fn update_thread(&self, id: &str, patch: ThreadPatch) {
        let mut state = self.state();
        let Some(thread) = state.threads.iter_mut().find(|t| t.id == id) else {
            return;
        };
        if let Some(name) = patch.name {
            thread.name = name;
        }
        if let Some(description) = patch.description {
            thread.description = description;
        }
        if let Some(color) = patch.color {
            thread.color = color;
        }
        if let Some(icon) = patch.icon {
            thread.icon = icon;
        }
        if let Some(is_auto_genre) = patch.is_auto_genre {
            thread.is_auto_genre = is_auto_genre;
        }
        if let Some(cover_url) = patch.cover_url {
            thread.cover_url = Some(cover_url);
        }
        if let Some(author) = patch.author {
            thread.author = Some(author);
        }
        if let Some(genre) = patch.genre {
            thread.genre = Some(genre);
        }
        self.commit(&state);
    }

    pub fn delete_thread(&self, id: &str) {
        let mut state = self.state();
        let before = state.threads.len();
        state.threads.retain(|t| t.id != id);
        if state.threads.len() == before {
            return;
        }
        self.commit(&state);
    }

    /// Appends the book id to the thread's membership if not already present.
    pub fn add_book_to_thread(&self, thread_id: &str, book_id: &str) {
        let mut state = self.state();
        let Some(thread) = state.threads.iter_mut().find(|t| t.id == thread_id) else {
            return;
        };
        if thread.book_ids.iter().any(|b| b == book_id) {
            return;
        }
        thread.book_ids.push(book_id.to_string());
        self.commit(&state);
    }

    pub fn remove_book_from_thread(&self, thread_id: &str, book_id: &str) {
        let mut state = self.state();
        let Some(thread) = state.threads.iter_mut().find(|t| t.id == thread_id) else {
            return;
        };
        let before = thread.book_ids.len();
        thread.book_ids.retain(|b| b != book_id);
        if thread.book_ids.len() == before {
            return;
        }
        self.commit(&state);
    }

    //=====================================================================================
    // Daily Log and Reader Name
    //=====================================================================================

    /// The shared aggregation primitive: find-or-create the entry for the
    /// date and merge additively (pages and minutes summed, book ids
    /// unioned). Entries are keyed uniquely by date.
    pub fn log_daily(&self, date: NaiveDate, pages_read: u32, minutes_spent: u32, book_id: &str) {
        let mut state = self.state();
        merge_daily(&mut state, date, pages_read, minutes_spent, book_id);
        self.commit(&state);
    }

    pub fn set_reader_name(&self, name: &str) {
        let mut state = self.state();
        state.reader_name = name.to_string();
        self.commit(&state);
    }

    //=====================================================================================
    // Bridge-Facing Operations
    //=====================================================================================

    /// Empties all reading state (books, goals, daily logs, threads, reader
    /// name). The per-user notified-badge bookkeeping is kept.
    pub fn clear(&self) {
        let mut state = self.state();
        state.books.clear();
        state.goals.clear();
        state.daily_logs.clear();
        state.threads.clear();
        state.reader_name.clear();
        self.commit(&state);
    }

    /// Replaces the reading state wholesale from a remote payload.
    pub fn hydrate(&self, data: ReadingData, reader_name: String) {
        let mut state = self.state();
        state.books = data.books;
        state.goals = data.goals;
        state.daily_logs = data.daily_logs;
        state.threads = data.threads;
        state.reader_name = reader_name;
        self.commit(&state);
    }

    /// A full copy of the pushable state at this instant.
    pub fn snapshot(&self) -> (ReadingData, String) {
        let state = self.state();
        (
            ReadingData {
                books: state.books.clone(),
                goals: state.goals.clone(),
                daily_logs: state.daily_logs.clone(),
                threads: state.threads.clone(),
            },
            state.reader_name.clone(),
        )
    }

    /// Badge ids already notified for this user, ever.
    pub fn notified_badges_for(&self, user_id: &str) -> BTreeSet<String> {
        self.state()
            .notified_badges
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Records the full notified set for a user. Persisted, but not
    /// announced as a change: badge bookkeeping is local-only and must not
    /// re-arm the push debounce.
    pub fn record_notified_badges(&self, user_id: &str, badges: BTreeSet<String>) {
        let mut state = self.state();
        state.notified_badges.insert(user_id.to_string(), badges);
        self.persist(&state);
    }

    //=====================================================================================
    // Read Accessors
    //=====================================================================================

    pub fn books(&self) -> Vec<Book> {
        self.state().books.clone()
    }

    pub fn book(&self, id: &str) -> Option<Book> {
        self.state().books.iter().find(|b| b.id == id).cloned()
    }

    pub fn goals(&self) -> Vec<ReadingGoal> {
        self.state().goals.clone()
    }

    pub fn daily_logs(&self) -> Vec<DailyLog> {
        self.state().daily_logs.clone()
    }

    pub fn threads(&self) -> Vec<BookThread> {
        self.state().threads.clone()
    }

    pub fn reader_name(&self) -> String {
        self.state().reader_name.clone()
    }
}

/// Additively merges one activity record into the daily-log list.
fn merge_daily(
    state: &mut LocalSnapshot,
    date: NaiveDate,
    pages_read: u32,
    minutes_spent: u32,
    book_id: &str,
) {
    if let Some(entry) = state.daily_logs.iter_mut().find(|l| l.date == date) {
        entry.pages_read += pages_read;
        entry.minutes_spent += minutes_spent;
        if !entry.books_worked_on.iter().any(|b| b == book_id) {
            entry.books_worked_on.push(book_id.to_string());
        }
    } else {
        state.daily_logs.push(DailyLog {
            date,
            pages_read,
            minutes_spent,
            books_worked_on: vec![book_id.to_string()],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStorageAdapter;
    use chrono::TimeZone;
    use readshelf_core::domain::{GoalType, ThreadIcon};

    fn store() -> ReadingStore {
        ReadingStore::new(Arc::new(MemoryStorageAdapter::new()))
    }

    fn draft(title: &str, total_pages: u32) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author: "Author".to_string(),
            isbn: None,
            cover_url: None,
            total_pages,
            current_page: 0,
            status: BookStatus::WantToRead,
            genre: "Fiction".to_string(),
            rating: None,
            notes: None,
            tags: vec![],
        }
    }

    #[test]
    fn add_book_assigns_distinct_ids() {
        let store = store();
        let a = store.add_book(draft("A", 100));
        let b = store.add_book(draft("B", 100));
        let c = store.add_book(draft("C", 100));
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        assert_eq!(store.books().len(), 3);
    }

    #[test]
    fn add_book_initializes_derived_fields() {
        let store = store();
        let id = store.add_book(draft("A", 100));
        let book = store.book(&id).unwrap();
        assert!(!book.favorite);
        assert!(book.sessions.is_empty());
        assert!(book.tags.is_empty());
        assert!(book.start_date.is_none());
    }

    #[test]
    fn update_progress_completes_and_clamps_at_total_pages() {
        let store = store();
        let id = store.add_book(draft("A", 400));
        store.update_status(&id, BookStatus::Reading);
        store.update_progress(&id, 450);

        let book = store.book(&id).unwrap();
        assert_eq!(book.status, BookStatus::Completed);
        assert_eq!(book.current_page, 400);
        assert!(book.finish_date.is_some());
    }

    #[test]
    fn update_progress_auto_starts_want_to_read_books() {
        let store = store();
        let id = store.add_book(draft("A", 400));
        store.update_progress(&id, 5);

        let book = store.book(&id).unwrap();
        assert_eq!(book.status, BookStatus::Reading);
        assert!(book.start_date.is_some());
    }

    #[test]
    fn update_progress_runs_want_to_read_straight_to_completed() {
        // Scenario A: full progress in one call while still want-to-read.
        let store = store();
        let id = store.add_book(draft("Dune", 400));
        store.update_progress(&id, 400);

        let book = store.book(&id).unwrap();
        assert_eq!(book.status, BookStatus::Completed);
        assert_eq!(book.current_page, 400);
        assert!(book.start_date.is_some());
        assert!(book.finish_date.is_some());
    }

    #[test]
    fn update_progress_logs_only_positive_deltas() {
        let store = store();
        let id = store.add_book(draft("A", 400));
        store.update_progress(&id, 50);
        store.update_progress(&id, 30);

        let logs = store.daily_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].pages_read, 50);
        assert_eq!(logs[0].minutes_spent, 0);
        assert_eq!(logs[0].books_worked_on, vec![id]);
    }

    #[test]
    fn update_status_completed_force_snaps_current_page() {
        let store = store();
        let id = store.add_book(draft("A", 400));
        store.update_progress(&id, 10);
        store.update_status(&id, BookStatus::Completed);

        let book = store.book(&id).unwrap();
        assert_eq!(book.current_page, 400);
        assert!(book.finish_date.is_some());
    }

    #[test]
    fn update_status_reading_stamps_start_date_once() {
        let store = store();
        let id = store.add_book(draft("A", 400));
        store.update_status(&id, BookStatus::Reading);
        let first = store.book(&id).unwrap().start_date;
        assert!(first.is_some());

        store.update_status(&id, BookStatus::Dnf);
        store.update_status(&id, BookStatus::Reading);
        assert_eq!(store.book(&id).unwrap().start_date, first);
    }

    #[test]
    fn unknown_ids_are_silent_noops() {
        let store = store();
        store.update_book("missing", BookPatch::default());
        store.update_progress("missing", 10);
        store.toggle_favorite("missing");
        store.delete_book("missing");
        store.add_session(
            "missing",
            SessionDraft {
                date: Utc::now(),
                pages_read: 1,
                minutes_spent: 1,
                notes: None,
            },
        );
        assert!(store.books().is_empty());
        assert!(store.daily_logs().is_empty());
    }

    #[test]
    fn add_session_logs_activity_under_the_calendar_date() {
        // Scenario C.
        let store = store();
        let id = store.add_book(draft("A", 400));
        store.add_session(
            &id,
            SessionDraft {
                date: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
                pages_read: 30,
                minutes_spent: 45,
                notes: None,
            },
        );

        assert_eq!(store.book(&id).unwrap().sessions.len(), 1);
        let logs = store.daily_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(logs[0].pages_read, 30);
        assert_eq!(logs[0].minutes_spent, 45);
        assert_eq!(logs[0].books_worked_on, vec![id]);
    }

    #[test]
    fn daily_logs_accumulate_additively_per_date() {
        let store = store();
        let a = store.add_book(draft("A", 400));
        let b = store.add_book(draft("B", 400));
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        store.log_daily(date, 10, 20, &a);
        store.log_daily(date, 5, 0, &b);
        store.log_daily(date, 0, 0, &a);

        let logs = store.daily_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].pages_read, 15);
        assert_eq!(logs[0].minutes_spent, 20);
        assert_eq!(logs[0].books_worked_on, vec![a, b]);
    }

    #[test]
    fn delete_session_leaves_daily_totals_untouched() {
        let store = store();
        let id = store.add_book(draft("A", 400));
        store.add_session(
            &id,
            SessionDraft {
                date: Utc::now(),
                pages_read: 30,
                minutes_spent: 45,
                notes: None,
            },
        );
        let session_id = store.book(&id).unwrap().sessions[0].id.clone();
        store.delete_session(&id, &session_id);

        assert!(store.book(&id).unwrap().sessions.is_empty());
        let logs = store.daily_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].pages_read, 30);
    }

    #[test]
    fn deleting_a_book_cascades_to_thread_membership() {
        let store = store();
        let a = store.add_book(draft("A", 100));
        let b = store.add_book(draft("B", 100));
        let c = store.add_book(draft("C", 100));
        let thread_id = store.add_thread(ThreadDraft {
            name: "Favorites".to_string(),
            description: String::new(),
            color: "#ff0000".to_string(),
            icon: ThreadIcon::Star,
            book_ids: vec![a.clone(), b.clone(), c.clone()],
            is_auto_genre: false,
            cover_url: None,
            author: None,
            genre: None,
        });

        store.delete_book(&b);

        let threads = store.threads();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].id, thread_id);
        assert_eq!(threads[0].book_ids, vec![a, c]);
    }

    #[test]
    fn add_book_to_thread_is_idempotent() {
        let store = store();
        let a = store.add_book(draft("A", 100));
        let thread_id = store.add_thread(ThreadDraft {
            name: "Pile".to_string(),
            description: String::new(),
            color: "#00ff00".to_string(),
            icon: ThreadIcon::Book,
            book_ids: vec![],
            is_auto_genre: false,
            cover_url: None,
            author: None,
            genre: None,
        });

        store.add_book_to_thread(&thread_id, &a);
        store.add_book_to_thread(&thread_id, &a);
        assert_eq!(store.threads()[0].book_ids, vec![a.clone()]);

        store.remove_book_from_thread(&thread_id, &a);
        assert!(store.threads()[0].book_ids.is_empty());
    }

    #[test]
    fn goals_with_the_same_shape_get_distinct_ids() {
        // Scenario B.
        let store = store();
        let g1 = store.add_goal(GoalDraft {
            goal_type: GoalType::BooksPerYear,
            target: 20,
            year: 2024,
        });
        let g2 = store.add_goal(GoalDraft {
            goal_type: GoalType::BooksPerYear,
            target: 30,
            year: 2024,
        });

        let goals = store.goals();
        assert_eq!(goals.len(), 2);
        assert_ne!(g1, g2);
    }

    #[test]
    fn update_goal_merges_given_fields_only() {
        let store = store();
        let id = store.add_goal(GoalDraft {
            goal_type: GoalType::PagesPerDay,
            target: 50,
            year: 2024,
        });
        store.update_goal(
            &id,
            GoalPatch {
                target: Some(75),
                ..Default::default()
            },
        );

        let goal = &store.goals()[0];
        assert_eq!(goal.target, 75);
        assert_eq!(goal.goal_type, GoalType::PagesPerDay);
        assert_eq!(goal.year, 2024);
    }

    #[test]
    fn state_survives_restart_through_local_storage() {
        let storage = Arc::new(MemoryStorageAdapter::new());
        let first = ReadingStore::new(storage.clone());
        let id = first.add_book(draft("A", 100));
        first.set_reader_name("Paul");
        drop(first);

        let second = ReadingStore::new(storage);
        assert_eq!(second.books().len(), 1);
        assert_eq!(second.books()[0].id, id);
        assert_eq!(second.reader_name(), "Paul");
    }

    #[test]
    fn clear_keeps_notified_badges() {
        let store = store();
        store.add_book(draft("A", 100));
        store.record_notified_badges("alice", BTreeSet::from(["first-book".to_string()]));

        store.clear();

        assert!(store.books().is_empty());
        assert!(store.notified_badges_for("alice").contains("first-book"));
    }

    #[test]
    fn subscribers_see_every_mutation_but_not_badge_bookkeeping() {
        let store = store();
        let rx = store.subscribe();
        let start = *rx.borrow();

        store.add_book(draft("A", 100));
        store.set_reader_name("Paul");
        assert_eq!(*rx.borrow(), start + 2);

        store.record_notified_badges("alice", BTreeSet::new());
        assert_eq!(*rx.borrow(), start + 2);
    }
}
