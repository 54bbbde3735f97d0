//! crates/readshelf_core/src/domain.rs
//!
//! Defines the pure, core data structures for the reading tracker.
//! These structs serialize field-for-field to the remote profile's
//! reading-data blob, so the serde renames here are part of the wire
//! contract and must not drift.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a tracked book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookStatus {
    WantToRead,
    Reading,
    Completed,
    Dnf,
}

/// A tracked reading item. `id` and `date_added` are assigned at creation
/// and immutable afterwards; `sessions` is kept in insertion order, which
/// is entry order rather than date order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    pub total_pages: u32,
    pub current_page: u32,
    pub status: BookStatus,
    pub genre: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finish_date: Option<DateTime<Utc>>,
    pub date_added: DateTime<Utc>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sessions: Vec<ReadingSession>,
}

/// A single logged reading event, owned by exactly one book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSession {
    pub id: String,
    pub date: DateTime<Utc>,
    pub pages_read: u32,
    pub minutes_spent: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Kind of target a reading goal tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalType {
    BooksPerYear,
    BooksPerMonth,
    PagesPerDay,
    MinutesPerDay,
}

/// A user-defined reading target. Progress is computed on read, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingGoal {
    pub id: String,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub target: u32,
    pub year: i32,
    pub created_at: DateTime<Utc>,
}

/// Aggregate of activity for one calendar date. Keyed uniquely by `date`;
/// totals only ever accumulate (the aggregate is never decremented, even
/// when a contributing session is later deleted).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub date: NaiveDate,
    pub pages_read: u32,
    pub minutes_spent: u32,
    #[serde(default)]
    pub books_worked_on: Vec<String>,
}

/// Icon shown on a thread card. Closed set shared with the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreadIcon {
    Book,
    Bookmark,
    Star,
    Heart,
    Sparkles,
    Trophy,
}

/// A user-curated named collection of books (unrelated to execution
/// threads). Membership lives on the thread as an ordered, deduplicated
/// id list; deleting a book removes its id from every thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookThread {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: ThreadIcon,
    pub book_ids: Vec<String>,
    pub is_auto_genre: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

/// The shape of the remote `reading_data` blob: the four collections,
/// each defaulting to empty when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingData {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub goals: Vec<ReadingGoal>,
    #[serde(default)]
    pub daily_logs: Vec<DailyLog>,
    #[serde(default)]
    pub threads: Vec<BookThread>,
}

//=========================================================================================
// Draft and Patch Types (store operation inputs)
//=========================================================================================

/// Input for creating a book. The store assigns id, date_added, an empty
/// session list and favorite = false.
#[derive(Debug, Clone)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub cover_url: Option<String>,
    pub total_pages: u32,
    pub current_page: u32,
    pub status: BookStatus,
    pub genre: String,
    pub rating: Option<u8>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

/// Shallow-merge update for a book: every `Some` field overwrites the
/// stored value, every `None` leaves it alone.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub cover_url: Option<String>,
    pub total_pages: Option<u32>,
    pub current_page: Option<u32>,
    pub status: Option<BookStatus>,
    pub genre: Option<String>,
    pub rating: Option<u8>,
    pub start_date: Option<DateTime<Utc>>,
    pub finish_date: Option<DateTime<Utc>>,
    pub favorite: Option<bool>,
    pub notes: Option<String>,
    pub review: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Input for logging a reading session against a book.
#[derive(Debug, Clone)]
pub struct SessionDraft {
    pub date: DateTime<Utc>,
    pub pages_read: u32,
    pub minutes_spent: u32,
    pub notes: Option<String>,
}

/// Input for creating a goal; the store assigns id and created_at.
#[derive(Debug, Clone)]
pub struct GoalDraft {
    pub goal_type: GoalType,
    pub target: u32,
    pub year: i32,
}

/// Shallow-merge update for a goal.
#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub goal_type: Option<GoalType>,
    pub target: Option<u32>,
    pub year: Option<i32>,
}

/// Input for creating a thread; the store assigns id and created_at.
#[derive(Debug, Clone)]
pub struct ThreadDraft {
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: ThreadIcon,
    pub book_ids: Vec<String>,
    pub is_auto_genre: bool,
    pub cover_url: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

/// Shallow-merge update for a thread.
#[derive(Debug, Clone, Default)]
pub struct ThreadPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<ThreadIcon>,
    pub is_auto_genre: Option<bool>,
    pub cover_url: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_serializes_with_remote_field_names() {
        let book = Book {
            id: "b1".to_string(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            isbn: None,
            cover_url: Some("http://example.com/dune.jpg".to_string()),
            total_pages: 400,
            current_page: 12,
            status: BookStatus::WantToRead,
            genre: "Sci-Fi".to_string(),
            rating: None,
            start_date: None,
            finish_date: None,
            date_added: Utc::now(),
            favorite: false,
            notes: None,
            review: None,
            tags: vec!["classic".to_string()],
            sessions: vec![],
        };

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["status"], "want-to-read");
        assert_eq!(json["totalPages"], 400);
        assert_eq!(json["currentPage"], 12);
        assert!(json.get("dateAdded").is_some());
        assert!(json.get("coverUrl").is_some());
    }

    #[test]
    fn goal_type_field_is_named_type() {
        let goal = ReadingGoal {
            id: "g1".to_string(),
            goal_type: GoalType::BooksPerYear,
            target: 20,
            year: 2024,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&goal).unwrap();
        assert_eq!(json["type"], "books-per-year");
    }

    #[test]
    fn book_deserializes_with_missing_optional_fields() {
        let json = serde_json::json!({
            "id": "b1",
            "title": "Dune",
            "author": "Herbert",
            "totalPages": 400,
            "currentPage": 0,
            "status": "reading",
            "genre": "Sci-Fi",
            "dateAdded": "2024-01-01T00:00:00Z"
        });
        let book: Book = serde_json::from_value(json).unwrap();
        assert_eq!(book.status, BookStatus::Reading);
        assert!(book.sessions.is_empty());
        assert!(book.tags.is_empty());
        assert!(!book.favorite);
    }

    #[test]
    fn daily_log_date_is_calendar_date() {
        let log = DailyLog {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            pages_read: 30,
            minutes_spent: 45,
            books_worked_on: vec!["b1".to_string()],
        };
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["date"], "2024-03-01");
    }
}
