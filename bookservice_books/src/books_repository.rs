pub use in_memory_books_repository::InMemoryBookRepository;
pub use postgres_books_repository::{PostgresBooksRepository, PostgresBooksRepositoryConfig};

use crate::api::BookId;
use crate::model::Book;

mod in_memory_books_repository;
mod postgres_books_repository;

#[derive(thiserror::Error, Debug)]
pub enum BookRepositoryError {
    #[error("Book {0} not found")]
    NotFound(BookId),

    #[error("Title {0} is already taken")]
    TitleAlreadyTaken(String),

    #[error("Constraint violation: {}", .0.join(", "))]
    ConstraintViolation(Vec<String>),

    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    /// Retrieves the book with given id, None if there is no such book
    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>, BookRepositoryError>;
    /// Lists all books in the repository, ordered by id
    async fn find_all(&self) -> Result<Vec<Book>, BookRepositoryError>;
    /// Inserts the book if it has no id yet, otherwise overwrites the stored book with that id.
    /// Returns the stored book with its id set.
    /// Fails with TitleAlreadyTaken if another book already uses the title
    async fn save(&self, book: Book) -> Result<Book, BookRepositoryError>;
    /// Removes the book, does nothing if it is not there
    async fn delete_by_id(&self, book_id: BookId) -> Result<(), BookRepositoryError>;
    async fn exists_by_title(&self, title: &str) -> Result<bool, BookRepositoryError>;
}
