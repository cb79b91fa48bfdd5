use actix_web::http::header::LOCATION;
use actix_web::web::Data;
use actix_web::{Error, HttpRequest, HttpResponse};
use paperclip::actix::{api_v2_operation, web};

use crate::api::{BookDto, BookId};
use crate::handlers::{problem_at, validated};
use crate::services::BookCommandService;

#[api_v2_operation]
pub async fn create_book(
    req: HttpRequest,
    command_service: Data<BookCommandService>,
    book: web::Json<BookDto>,
) -> Result<HttpResponse, Error> {
    let book = validated(book.into_inner(), &req)?;
    let created = command_service
        .create(book)
        .await
        .map_err(problem_at(&req))?;

    let mut response = HttpResponse::Created();
    if let Some(book_id) = created.id {
        response.append_header((LOCATION, format!("/api/books/{}", book_id)));
    }
    Ok(response.json(created))
}

#[api_v2_operation]
pub async fn update_book(
    req: HttpRequest,
    command_service: Data<BookCommandService>,
    book_id: web::Path<BookId>,
    book: web::Json<BookDto>,
) -> Result<HttpResponse, Error> {
    let book = validated(book.into_inner(), &req)?;
    let updated = command_service
        .update(book_id.into_inner(), book)
        .await
        .map_err(problem_at(&req))?;
    Ok(HttpResponse::Ok().json(updated))
}

#[api_v2_operation]
pub async fn delete_book(
    req: HttpRequest,
    command_service: Data<BookCommandService>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    command_service
        .delete(book_id.into_inner())
        .await
        .map_err(problem_at(&req))?;
    Ok(HttpResponse::NoContent().finish())
}
