//! crates/readshelf_core/src/badges.rs
//!
//! The badge/achievement evaluator: a pure function from the current book
//! collection to the set of unlocked badge ids. It is called both for UI
//! progress display and by the sync bridge to detect newly crossed
//! thresholds, so it must stay deterministic and side-effect-free.

use std::collections::{BTreeSet, HashSet};

use crate::domain::{Book, BookStatus};

/// A badge definition: stable id plus the human-readable label carried in
/// unlock notifications.
#[derive(Debug, Clone, Copy)]
pub struct Badge {
    pub id: &'static str,
    pub label: &'static str,
}

/// All badges, in the stable order notifications are emitted in.
pub const BADGES: &[Badge] = &[
    Badge { id: "first-book", label: "First Book" },
    Badge { id: "bookworm", label: "Bookworm" },
    Badge { id: "scholar", label: "Scholar" },
    Badge { id: "bibliophile", label: "Bibliophile" },
    Badge { id: "centurion", label: "Centurion" },
    Badge { id: "explorer", label: "Explorer" },
    Badge { id: "renaissance", label: "Renaissance Reader" },
    Badge { id: "page-turner", label: "Page Turner" },
    Badge { id: "marathon", label: "Marathon Reader" },
    Badge { id: "curator", label: "Curator" },
    Badge { id: "dedicated", label: "Dedicated Reader" },
    Badge { id: "collector", label: "Collector" },
];

/// Looks up the label for a badge id.
pub fn badge_label(id: &str) -> Option<&'static str> {
    BADGES.iter().find(|b| b.id == id).map(|b| b.label)
}

/// Computes the set of unlocked badge ids for the given book collection.
///
/// Every rule is a `>=` comparison against an aggregate over the books, so
/// the result only ever grows as a collection accumulates activity.
pub fn compute_unlocked_badges(books: &[Book]) -> BTreeSet<&'static str> {
    let mut unlocked = BTreeSet::new();

    let completed: Vec<&Book> = books
        .iter()
        .filter(|b| b.status == BookStatus::Completed)
        .collect();

    let completed_count = completed.len();
    if completed_count >= 1 {
        unlocked.insert("first-book");
    }
    if completed_count >= 10 {
        unlocked.insert("bookworm");
    }
    if completed_count >= 25 {
        unlocked.insert("scholar");
    }
    if completed_count >= 50 {
        unlocked.insert("bibliophile");
    }
    if completed_count >= 100 {
        unlocked.insert("centurion");
    }

    let genres: HashSet<&str> = completed.iter().map(|b| b.genre.as_str()).collect();
    if genres.len() >= 5 {
        unlocked.insert("explorer");
    }
    if genres.len() >= 10 {
        unlocked.insert("renaissance");
    }

    // Pages count across all books, not just completed ones.
    let total_pages: u64 = books.iter().map(|b| u64::from(b.current_page)).sum();
    if total_pages >= 1000 {
        unlocked.insert("page-turner");
    }
    if total_pages >= 10000 {
        unlocked.insert("marathon");
    }

    let favorites = books.iter().filter(|b| b.favorite).count();
    if favorites >= 5 {
        unlocked.insert("curator");
    }

    let session_count: usize = books.iter().map(|b| b.sessions.len()).sum();
    if session_count >= 30 {
        unlocked.insert("dedicated");
    }

    if books.len() >= 20 {
        unlocked.insert("collector");
    }

    unlocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn book(status: BookStatus, genre: &str, current_page: u32) -> Book {
        Book {
            id: uuid::Uuid::new_v4().to_string(),
            title: "T".to_string(),
            author: "A".to_string(),
            isbn: None,
            cover_url: None,
            total_pages: 300,
            current_page,
            status,
            genre: genre.to_string(),
            rating: None,
            start_date: None,
            finish_date: None,
            date_added: Utc::now(),
            favorite: false,
            notes: None,
            review: None,
            tags: vec![],
            sessions: vec![],
        }
    }

    #[test]
    fn empty_collection_unlocks_nothing() {
        assert!(compute_unlocked_badges(&[]).is_empty());
    }

    #[test]
    fn first_completed_book_unlocks_first_book() {
        let books = vec![book(BookStatus::Completed, "Fiction", 300)];
        let unlocked = compute_unlocked_badges(&books);
        assert!(unlocked.contains("first-book"));
        assert!(!unlocked.contains("bookworm"));
    }

    #[test]
    fn completed_count_thresholds() {
        let mut books: Vec<Book> = (0..9)
            .map(|_| book(BookStatus::Completed, "Fiction", 0))
            .collect();
        let before = compute_unlocked_badges(&books);
        assert!(!before.contains("bookworm"));

        books.push(book(BookStatus::Completed, "Fiction", 0));
        let after = compute_unlocked_badges(&books);
        assert!(after.contains("bookworm"));

        // Monotonic: crossing a threshold never loses earlier badges.
        assert!(before.is_subset(&after));
    }

    #[test]
    fn genre_badges_count_distinct_genres_of_completed_books_only() {
        let mut books: Vec<Book> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|g| book(BookStatus::Completed, g, 0))
            .collect();
        // A still-reading book in a sixth genre does not count.
        books.push(book(BookStatus::Reading, "F", 50));

        let unlocked = compute_unlocked_badges(&books);
        assert!(unlocked.contains("explorer"));
        assert!(!unlocked.contains("renaissance"));
    }

    #[test]
    fn page_badges_sum_current_page_across_all_statuses() {
        let books = vec![
            book(BookStatus::Reading, "Fiction", 600),
            book(BookStatus::Dnf, "Fiction", 400),
        ];
        let unlocked = compute_unlocked_badges(&books);
        assert!(unlocked.contains("page-turner"));
        assert!(!unlocked.contains("marathon"));
    }

    #[test]
    fn curator_needs_five_favorites() {
        let mut books: Vec<Book> = (0..5)
            .map(|_| book(BookStatus::WantToRead, "Fiction", 0))
            .collect();
        for b in &mut books {
            b.favorite = true;
        }
        assert!(compute_unlocked_badges(&books).contains("curator"));

        books[0].favorite = false;
        assert!(!compute_unlocked_badges(&books).contains("curator"));
    }

    #[test]
    fn dedicated_counts_sessions_across_books() {
        let mut a = book(BookStatus::Reading, "Fiction", 10);
        let mut b = book(BookStatus::Reading, "Fiction", 10);
        for i in 0..15 {
            let session = crate::domain::ReadingSession {
                id: format!("s{i}"),
                date: Utc::now(),
                pages_read: 1,
                minutes_spent: 1,
                notes: None,
            };
            a.sessions.push(session.clone());
            b.sessions.push(session);
        }
        assert!(compute_unlocked_badges(&[a, b]).contains("dedicated"));
    }

    #[test]
    fn collector_counts_any_status() {
        let books: Vec<Book> = (0..20)
            .map(|_| book(BookStatus::WantToRead, "Fiction", 0))
            .collect();
        assert!(compute_unlocked_badges(&books).contains("collector"));
    }

    #[test]
    fn every_badge_id_has_a_label() {
        for badge in BADGES {
            assert_eq!(badge_label(badge.id), Some(badge.label));
        }
        assert_eq!(badge_label("no-such-badge"), None);
    }
}
