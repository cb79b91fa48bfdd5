use std::sync::Arc;

use crate::api::{BookDto, BookId};
use crate::books_repository::BookRepository;
use crate::model::to_dto;
use crate::services::{BookNotFound, BookServiceError};

/// Read-only operations on books
pub struct BookQueryService {
    books_repository: Arc<dyn BookRepository>,
}

impl BookQueryService {
    pub fn new(books_repository: Arc<dyn BookRepository>) -> Self {
        Self { books_repository }
    }

    pub async fn find_by_id(&self, book_id: BookId) -> Result<BookDto, BookServiceError> {
        let book = self.books_repository.find_by_id(book_id).await?;
        Ok(to_dto(book).ok_or(BookNotFound(book_id))?)
    }

    pub async fn find_all(&self) -> Result<Vec<BookDto>, BookServiceError> {
        Ok(self
            .books_repository
            .find_all()
            .await?
            .into_iter()
            .map(BookDto::from)
            .collect())
    }
}
