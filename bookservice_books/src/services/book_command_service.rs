use std::sync::Arc;

use crate::api::{BookDto, BookId};
use crate::books_repository::{BookRepository, BookRepositoryError};
use crate::model::Book;
use crate::services::{BookAlreadyExists, BookNotFound, BookServiceError};

/// Create, update and delete operations on books
pub struct BookCommandService {
    books_repository: Arc<dyn BookRepository>,
}

impl BookCommandService {
    pub fn new(books_repository: Arc<dyn BookRepository>) -> Self {
        Self { books_repository }
    }

    /// Stores a new book, fails if a book with the same title exists.
    /// Any id present on the input is ignored.
    pub async fn create(&self, book: BookDto) -> Result<BookDto, BookServiceError> {
        if self.books_repository.exists_by_title(&book.title).await? {
            return Err(BookAlreadyExists(book.title).into());
        }

        let book = Book {
            id: None,
            ..Book::from(book)
        };
        let title = book.title.clone();
        let saved = self
            .books_repository
            .save(book)
            .await
            .map_err(|err| title_conflict(err, title))?;

        tracing::info!("Created book {:?}", saved.id);
        Ok(saved.into())
    }

    /// Overwrites title, author and publication date of an existing book.
    /// The id from the input is ignored, `book_id` decides which book is changed.
    pub async fn update(&self, book_id: BookId, book: BookDto) -> Result<BookDto, BookServiceError> {
        let existing = self
            .books_repository
            .find_by_id(book_id)
            .await?
            .ok_or(BookNotFound(book_id))?;

        let updated = Book {
            title: book.title,
            author: book.author,
            publication_date: book.publication_date,
            ..existing
        };
        let title = updated.title.clone();
        let saved = match self.books_repository.save(updated).await {
            // deleted between the lookup and the write
            Err(BookRepositoryError::NotFound(book_id)) => Err(BookNotFound(book_id).into()),
            other => other.map_err(|err| title_conflict(err, title)),
        }?;

        tracing::info!("Updated book {}", book_id);
        Ok(saved.into())
    }

    /// Removes the book, deleting a book that does not exist is not an error
    pub async fn delete(&self, book_id: BookId) -> Result<(), BookServiceError> {
        self.books_repository.delete_by_id(book_id).await?;
        tracing::info!("Deleted book {}", book_id);
        Ok(())
    }
}

fn title_conflict(err: BookRepositoryError, title: String) -> BookServiceError {
    match err {
        BookRepositoryError::TitleAlreadyTaken(_) => BookAlreadyExists(title).into(),
        other => other.into(),
    }
}
