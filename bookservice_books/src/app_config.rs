use std::sync::Arc;

use paperclip::actix::web;

use crate::books_repository::BookRepository;
use crate::errors;
use crate::handlers;
use crate::services::{BookCommandService, BookQueryService};

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api/books")
                .service(
                    web::resource("")
                        .route(web::get().to(handlers::get_all_books))
                        .route(web::post().to(handlers::create_book))
                        .default_service(
                            actix_web::web::route().to(errors::method_not_allowed),
                        ),
                )
                .service(
                    web::resource("/{book_id}")
                        .route(web::get().to(handlers::get_book))
                        .route(web::put().to(handlers::update_book))
                        .route(web::delete().to(handlers::delete_book))
                        .default_service(
                            actix_web::web::route().to(errors::method_not_allowed),
                        ),
                ),
        );
}

/// Services the handlers take from app data, both backed by the same repository
pub fn book_services(
    books_repository: Arc<dyn BookRepository>,
) -> (web::Data<BookQueryService>, web::Data<BookCommandService>) {
    (
        web::Data::new(BookQueryService::new(books_repository.clone())),
        web::Data::new(BookCommandService::new(books_repository)),
    )
}
