use chrono::NaiveDate;

use crate::api::{BookDto, BookId};

/// Book as it is kept in the repository.
/// `id` is `None` until the repository assigns one on first save.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Book {
    pub id: Option<BookId>,
    pub title: String,
    pub author: String,
    pub publication_date: Option<NaiveDate>,
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            publication_date: book.publication_date,
        }
    }
}

impl From<BookDto> for Book {
    fn from(dto: BookDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            author: dto.author,
            publication_date: dto.publication_date,
        }
    }
}

pub fn to_dto(book: Option<Book>) -> Option<BookDto> {
    book.map(BookDto::from)
}

pub fn to_entity(dto: Option<BookDto>) -> Option<Book> {
    dto.map(Book::from)
}
