pub use book_command_service::BookCommandService;
pub use book_query_service::BookQueryService;

use actix_web::http::StatusCode;

use crate::api::BookId;
use crate::books_repository::BookRepositoryError;

mod book_command_service;
mod book_query_service;

const BOOK_NOT_FOUND_MESSAGE: &str = "Book not found";
const BOOK_ALREADY_EXISTS_MESSAGE: &str = "Book already exists";

/// Expected business-rule failure, reported to clients with its own status
/// and an error code derived from its kind name.
pub trait DomainError: std::error::Error + Send + Sync {
    /// CamelCase name of the error kind, e.g. `BookNotFound`
    fn kind(&self) -> &'static str;

    fn status(&self) -> StatusCode;

    /// Kind name in upper snake case, e.g. `BOOK_NOT_FOUND`
    fn error_code(&self) -> String {
        let mut code = String::new();
        for (i, c) in self.kind().chars().enumerate() {
            if c.is_uppercase() && i > 0 {
                code.push('_');
            }
            code.push(c.to_ascii_uppercase());
        }
        code
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", BOOK_NOT_FOUND_MESSAGE)]
pub struct BookNotFound(pub BookId);

impl DomainError for BookNotFound {
    fn kind(&self) -> &'static str {
        "BookNotFound"
    }

    fn status(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", BOOK_ALREADY_EXISTS_MESSAGE)]
pub struct BookAlreadyExists(pub String);

impl DomainError for BookAlreadyExists {
    fn kind(&self) -> &'static str {
        "BookAlreadyExists"
    }

    fn status(&self) -> StatusCode {
        StatusCode::CONFLICT
    }
}

#[derive(thiserror::Error, Debug)]
pub enum BookServiceError {
    #[error(transparent)]
    NotFound(#[from] BookNotFound),

    #[error(transparent)]
    AlreadyExists(#[from] BookAlreadyExists),

    #[error(transparent)]
    Repository(#[from] BookRepositoryError),
}
