//! Bulk add/remove/replace of book genres.
//!
//! ```text
//! request
//!   ↓ validate (retry/error responses, nothing opened)
//! admin mode + manual transaction
//!   ↓ per selected book, in order
//! load book → apply edit
//!   ↓
//! flush + commit → success summary
//! ```
//!
//! Any failure inside the loop rolls the whole selection back.

use core::fmt;
use core::str::FromStr;

use serde_json::Value as JsonValue;
use thiserror::Error;

use bookstore_catalog::{Book, BookGenre, BookId, Genre, GenreId};
use bookstore_infra::session::{PersistenceError, Session, SessionExt, Transaction};

use crate::process::{ProcessActionHandler, ProcessRequest, ProcessResponse};

pub const RESULT_TITLE: &str = "EditBookGenres - Result";

pub const PARAM_OPERATION: &str = "operation";
pub const PARAM_OLD_GENRE: &str = "oldGenre";
pub const PARAM_NEW_GENRE: &str = "newGenre";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreOperation {
    Add,
    Remove,
    Replace,
}

impl FromStr for GenreOperation {
    type Err = BatchValidationError;

    /// Trimmed and case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        match normalized.as_str() {
            "" => Err(BatchValidationError::MissingOperation),
            "ADD" => Ok(Self::Add),
            "REMOVE" => Ok(Self::Remove),
            "REPLACE" => Ok(Self::Replace),
            _ => Err(BatchValidationError::UnknownOperation(normalized)),
        }
    }
}

impl fmt::Display for GenreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "ADD",
            Self::Remove => "REMOVE",
            Self::Replace => "REPLACE",
        })
    }
}

/// What to do to each selected book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenreEdit {
    Add { genre: GenreId },
    Remove { genre: GenreId },
    Replace { old: GenreId, new: GenreId },
}

impl GenreEdit {
    pub fn operation(&self) -> GenreOperation {
        match self {
            Self::Add { .. } => GenreOperation::Add,
            Self::Remove { .. } => GenreOperation::Remove,
            Self::Replace { .. } => GenreOperation::Replace,
        }
    }
}

/// Request problems detected before anything is opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchValidationError {
    #[error("Missing '_params' in request.")]
    MissingParams,

    #[error("Parameter 'operation' is required.")]
    MissingOperation,

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("No books selected. Select at least one book.")]
    NoBooksSelected,

    #[error("newGenre is required for ADD.")]
    MissingNewGenre,

    #[error("oldGenre is required for REMOVE.")]
    MissingOldGenre,

    #[error("oldGenre and newGenre are required for REPLACE.")]
    MissingReplaceGenres,

    #[error("Invalid book id in selection: {0}.")]
    InvalidBookId(String),
}

impl BatchValidationError {
    /// A malformed envelope is an error; everything else asks the user to retry.
    pub fn into_response(self) -> ProcessResponse {
        match self {
            Self::MissingParams => ProcessResponse::error(self.to_string()),
            other => ProcessResponse::retry(other.to_string()),
        }
    }
}

/// A validated batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreBatch {
    pub books: Vec<BookId>,
    pub edit: GenreEdit,
}

impl GenreBatch {
    pub fn from_request(request: &ProcessRequest) -> Result<Self, BatchValidationError> {
        if !request.has_params() {
            return Err(BatchValidationError::MissingParams);
        }

        let operation: GenreOperation = request
            .param(PARAM_OPERATION)
            .ok_or(BatchValidationError::MissingOperation)?
            .parse()?;

        let selection = match request.record_ids() {
            Some(ids) if !ids.is_empty() => ids,
            _ => return Err(BatchValidationError::NoBooksSelected),
        };

        let old = genre_param(request, PARAM_OLD_GENRE);
        let new = genre_param(request, PARAM_NEW_GENRE);

        let edit = match (operation, old, new) {
            (GenreOperation::Add, _, Some(genre)) => GenreEdit::Add { genre },
            (GenreOperation::Add, _, None) => return Err(BatchValidationError::MissingNewGenre),
            (GenreOperation::Remove, Some(genre), _) => GenreEdit::Remove { genre },
            (GenreOperation::Remove, None, _) => return Err(BatchValidationError::MissingOldGenre),
            (GenreOperation::Replace, Some(old), Some(new)) => GenreEdit::Replace { old, new },
            (GenreOperation::Replace, _, _) => {
                return Err(BatchValidationError::MissingReplaceGenres);
            }
        };

        let books = selection
            .iter()
            .map(book_id)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { books, edit })
    }
}

fn genre_param(request: &ProcessRequest, key: &str) -> Option<GenreId> {
    request.param(key).and_then(|id| id.parse().ok())
}

fn book_id(value: &JsonValue) -> Result<BookId, BatchValidationError> {
    value
        .as_str()
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| BatchValidationError::InvalidBookId(value.to_string()))
}

/// Failures that abort a running batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Book not found: {0}")]
    BookNotFound(BookId),

    #[error("Genre not found: {0}")]
    GenreNotFound(GenreId),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub created: usize,
    pub removed: usize,
}

impl BatchSummary {
    pub fn message(&self) -> String {
        format!(
            "Processed: {}. Added: {}. Removed: {}.",
            self.processed, self.created, self.removed
        )
    }
}

/// Process action editing the genres of the selected books.
///
/// Runs in admin mode so users without direct write access to book-genre
/// links can still use it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenreBatchEditor;

impl GenreBatchEditor {
    pub fn new() -> Self {
        Self
    }

    /// Apply `batch` in one transaction.
    ///
    /// On error nothing is committed. Autocommit and the previous privilege
    /// mode are restored in every case.
    pub fn run(&self, session: &mut dyn Session, batch: &GenreBatch) -> Result<BatchSummary, BatchError> {
        // Declared first so it is revoked after the transaction is closed.
        let _admin = session.context().enter_admin_mode();
        let mut tx = Transaction::begin(session)?;

        let mut summary = BatchSummary::default();
        for book_id in &batch.books {
            let book = tx
                .get::<Book>(book_id)?
                .ok_or_else(|| BatchError::BookNotFound(book_id.clone()))?;
            summary.processed += 1;

            match &batch.edit {
                GenreEdit::Add { genre } => {
                    summary.created += add_genre(&mut *tx, &book, genre)?;
                }
                GenreEdit::Remove { genre } => {
                    summary.removed += remove_genre(&mut *tx, &book, genre)?;
                }
                GenreEdit::Replace { old, new } => {
                    let old_genre = resolve_genre(&*tx, old)?;
                    if link_exists(&*tx, &book, &old_genre)? {
                        summary.removed += remove_links(&mut *tx, &book, &old_genre)?;
                        summary.created += add_genre(&mut *tx, &book, new)?;
                    }
                }
            }
        }

        tx.commit()?;
        tracing::info!(
            operation = %batch.edit.operation(),
            processed = summary.processed,
            created = summary.created,
            removed = summary.removed,
            "genre batch committed"
        );
        Ok(summary)
    }
}

impl ProcessActionHandler for GenreBatchEditor {
    fn name(&self) -> &'static str {
        "EditBookGenres"
    }

    fn handle(&self, session: &mut dyn Session, request: ProcessRequest) -> ProcessResponse {
        let batch = match GenreBatch::from_request(&request) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::debug!("genre batch rejected: {e}");
                return e.into_response();
            }
        };

        match self.run(session, &batch) {
            Ok(summary) => ProcessResponse::success(RESULT_TITLE, summary.message()),
            Err(e) => {
                tracing::error!(
                    operation = %batch.edit.operation(),
                    books = batch.books.len(),
                    "genre batch failed, rolled back: {e}"
                );
                ProcessResponse::aborted(e)
            }
        }
    }
}

fn resolve_genre(session: &dyn Session, id: &GenreId) -> Result<Genre, BatchError> {
    session
        .get::<Genre>(id)?
        .ok_or_else(|| BatchError::GenreNotFound(id.clone()))
}

fn links(session: &dyn Session, book: &Book, genre: &Genre) -> Result<Vec<BookGenre>, BatchError> {
    Ok(session
        .criteria::<BookGenre>()
        .eq(BookGenre::PROPERTY_BOOK, &book.id)
        .eq(BookGenre::PROPERTY_GENRE, &genre.id)
        .list()?)
}

fn link_exists(session: &dyn Session, book: &Book, genre: &Genre) -> Result<bool, BatchError> {
    Ok(session
        .criteria::<BookGenre>()
        .eq(BookGenre::PROPERTY_BOOK, &book.id)
        .eq(BookGenre::PROPERTY_GENRE, &genre.id)
        .count()?
        > 0)
}

/// Returns 1 if a link was created, 0 if it already existed.
fn add_genre(session: &mut dyn Session, book: &Book, genre_id: &GenreId) -> Result<usize, BatchError> {
    let genre = resolve_genre(session, genre_id)?;
    if link_exists(session, book, &genre)? {
        return Ok(0);
    }
    session.save(&BookGenre::link(book, &genre))?;
    Ok(1)
}

fn remove_genre(session: &mut dyn Session, book: &Book, genre_id: &GenreId) -> Result<usize, BatchError> {
    let genre = resolve_genre(session, genre_id)?;
    remove_links(session, book, &genre)
}

/// Deletes every (book, genre) link, duplicates included.
fn remove_links(session: &mut dyn Session, book: &Book, genre: &Genre) -> Result<usize, BatchError> {
    let mut removed = 0;
    for link in links(session, book, genre)? {
        if session.remove(&link)? {
            removed += 1;
        }
    }
    Ok(removed)
}
