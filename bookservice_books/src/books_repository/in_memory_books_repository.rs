use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::api::BookId;
use crate::books_repository::{BookRepository, BookRepositoryError};
use crate::model::Book;

pub struct InMemoryBookRepository {
    book_sequence_generator: AtomicI64,
    books: parking_lot::RwLock<BTreeMap<BookId, Book>>,
}

impl Default for InMemoryBookRepository {
    fn default() -> Self {
        Self {
            book_sequence_generator: AtomicI64::new(1),
            books: Default::default(),
        }
    }
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>, BookRepositoryError> {
        Ok(self.books.read().get(&book_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Book>, BookRepositoryError> {
        Ok(self.books.read().values().cloned().collect())
    }

    async fn save(&self, book: Book) -> Result<Book, BookRepositoryError> {
        let mut locked_books = self.books.write();

        if locked_books
            .values()
            .any(|stored| stored.title == book.title && stored.id != book.id)
        {
            return Err(BookRepositoryError::TitleAlreadyTaken(book.title));
        }

        match book.id {
            Some(book_id) => {
                let stored = locked_books
                    .get_mut(&book_id)
                    .ok_or(BookRepositoryError::NotFound(book_id))?;
                *stored = book.clone();
                Ok(book)
            }
            None => {
                let book_id = self.book_sequence_generator.fetch_add(1, Ordering::Relaxed);
                let book = Book {
                    id: Some(book_id),
                    ..book
                };
                locked_books.insert(book_id, book.clone());
                Ok(book)
            }
        }
    }

    async fn delete_by_id(&self, book_id: BookId) -> Result<(), BookRepositoryError> {
        self.books.write().remove(&book_id);
        Ok(())
    }

    async fn exists_by_title(&self, title: &str) -> Result<bool, BookRepositoryError> {
        Ok(self.books.read().values().any(|book| book.title == title))
    }
}
