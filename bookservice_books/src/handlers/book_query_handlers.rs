use actix_web::web::Data;
use actix_web::{Error, HttpRequest, HttpResponse};
use paperclip::actix::{api_v2_operation, web};

use crate::api::BookId;
use crate::handlers::problem_at;
use crate::services::BookQueryService;

#[api_v2_operation]
pub async fn get_all_books(
    req: HttpRequest,
    query_service: Data<BookQueryService>,
) -> Result<HttpResponse, Error> {
    let books = query_service.find_all().await.map_err(problem_at(&req))?;
    Ok(HttpResponse::Ok().json(books))
}

#[api_v2_operation]
pub async fn get_book(
    req: HttpRequest,
    query_service: Data<BookQueryService>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    let book = query_service
        .find_by_id(book_id.into_inner())
        .await
        .map_err(problem_at(&req))?;
    Ok(HttpResponse::Ok().json(book))
}
