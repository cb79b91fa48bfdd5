pub use book_command_handlers::{create_book, delete_book, update_book};
pub use book_query_handlers::{get_all_books, get_book};

use actix_web::{Error, HttpRequest, HttpResponse};
use paperclip::actix::api_v2_operation;

use crate::api::{BookDto, ProblemDetail};
use crate::errors::ApiError;
use crate::services::BookServiceError;

mod book_command_handlers;
mod book_query_handlers;

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

fn problem_at(req: &HttpRequest) -> impl Fn(BookServiceError) -> ProblemDetail + '_ {
    move |err| ApiError::from(err).into_problem_detail(req.path())
}

fn validated(book: BookDto, req: &HttpRequest) -> Result<BookDto, ProblemDetail> {
    match book.validate() {
        Ok(()) => Ok(book),
        Err(errors) => Err(ApiError::Validation(errors).into_problem_detail(req.path())),
    }
}

#[cfg(test)]
mod handler_tests {
    use std::sync::Arc;

    use actix_web::http::header::{CONTENT_TYPE, LOCATION};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use paperclip::actix::OpenApiExt;
    use serde_json::{json, Value};

    use crate::api::{BookDto, ProblemDetail};
    use crate::app_config::{book_services, config_app};
    use crate::books_repository::{BookRepository, InMemoryBookRepository};
    use crate::errors;

    macro_rules! init_app {
        ($repo:expr) => {{
            let (query_service, command_service) = book_services($repo);
            test::init_service(
                App::new()
                    .wrap_api()
                    .app_data(query_service)
                    .app_data(command_service)
                    .configure(config_app)
                    .with_json_spec_at("/apispec/v2")
                    .build()
                    .app_data(errors::json_config())
                    .app_data(errors::path_config())
                    .app_data(errors::query_config())
                    .default_service(actix_web::web::route().to(errors::no_handler_found)),
            )
            .await
        }};
    }

    fn effective_java() -> Value {
        json!({
            "title": "Effective Java",
            "author": "Joshua Bloch",
            "publicationDate": "2018-01-01"
        })
    }

    #[actix_web::test]
    async fn test_create_book() {
        let repo = Arc::new(InMemoryBookRepository::default());
        let app = init_app!(repo.clone());

        let req = test::TestRequest::post()
            .uri("/api/books")
            .set_json(effective_java())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let location = resp
            .headers()
            .get(LOCATION)
            .expect("No location header")
            .to_str()
            .unwrap()
            .to_string();

        let body: Value = test::read_body_json(resp).await;
        let id = body["id"].as_i64().expect("id is not a number");
        assert_eq!(body["title"], "Effective Java");
        assert_eq!(body["author"], "Joshua Bloch");
        assert_eq!(body["publicationDate"], "2018-01-01");
        assert_eq!(location, format!("/api/books/{}", id));

        let stored = repo.find_by_id(id).await.unwrap().expect("Book not stored");
        assert_eq!(stored.title, "Effective Java");
    }

    #[actix_web::test]
    async fn test_create_duplicate_book_returns_conflict() {
        let repo = Arc::new(InMemoryBookRepository::default());
        let app = init_app!(repo.clone());

        let req = test::TestRequest::post()
            .uri("/api/books")
            .set_json(json!({"title": "Clean Code", "author": "Robert C. Martin"}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );

        let req = test::TestRequest::post()
            .uri("/api/books")
            .set_json(json!({"title": "Clean Code", "author": "Another Author"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let problem: ProblemDetail = test::read_body_json(resp).await;
        assert_eq!(problem.status, 409);
        assert_eq!(problem.title, "BookAlreadyExists");
        assert!(problem.detail.contains("Book already exists"));
        assert_eq!(problem.error_code, "BOOK_ALREADY_EXISTS");
        assert_eq!(problem.instance, "/api/books");

        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_create_invalid_book_returns_validation_error() {
        let repo = Arc::new(InMemoryBookRepository::default());
        let app = init_app!(repo.clone());

        let req = test::TestRequest::post()
            .uri("/api/books")
            .set_json(json!({"title": "", "author": "Joshua Bloch"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let problem: ProblemDetail = test::read_body_json(resp).await;
        assert_eq!(problem.error_code, "VALIDATION_ERROR");
        assert_eq!(
            problem.errors,
            Some(vec!["title: Title must not be blank".to_string()])
        );
        assert_eq!(repo.find_all().await.unwrap(), vec![]);
    }

    #[actix_web::test]
    async fn test_create_book_with_null_title_returns_validation_error() {
        let repo = Arc::new(InMemoryBookRepository::default());
        let app = init_app!(repo.clone());

        let req = test::TestRequest::post()
            .uri("/api/books")
            .set_json(json!({"title": null, "author": "Joshua Bloch"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let problem: ProblemDetail = test::read_body_json(resp).await;
        assert_eq!(problem.error_code, "VALIDATION_ERROR");
        assert_eq!(
            problem.errors,
            Some(vec!["title: Title must not be blank".to_string()])
        );
        assert_eq!(repo.find_all().await.unwrap(), vec![]);
    }

    #[actix_web::test]
    async fn test_malformed_body_returns_not_readable() {
        let app = init_app!(Arc::new(InMemoryBookRepository::default()));

        let req = test::TestRequest::post()
            .uri("/api/books")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"title\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let problem: ProblemDetail = test::read_body_json(resp).await;
        assert_eq!(problem.error_code, "MESSAGE_NOT_READABLE");
        assert_eq!(problem.title, "Malformed JSON Request");
    }

    #[actix_web::test]
    async fn test_update_book() {
        let repo = Arc::new(InMemoryBookRepository::default());
        let app = init_app!(repo.clone());

        let req = test::TestRequest::post()
            .uri("/api/books")
            .set_json(json!({"title": "Clean Code", "author": "Robert C. Martin", "publicationDate": "2008-08-01"}))
            .to_request();
        let created: BookDto = test::call_and_read_body_json(&app, req).await;
        let id = created.id.unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/api/books/{}", id))
            .set_json(json!({
                "id": 12345,
                "title": "Clean Code Updated",
                "author": "Robert C. Martin",
                "publicationDate": "2010-01-01"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], id);
        assert_eq!(body["title"], "Clean Code Updated");
        assert_eq!(body["publicationDate"], "2010-01-01");

        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Clean Code Updated");
    }

    #[actix_web::test]
    async fn test_update_missing_book_returns_not_found() {
        let repo = Arc::new(InMemoryBookRepository::default());
        let app = init_app!(repo.clone());

        let req = test::TestRequest::put()
            .uri("/api/books/999")
            .set_json(json!({"title": "Updated Title", "author": "Updated Author", "publicationDate": "2020-05-20"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let problem: ProblemDetail = test::read_body_json(resp).await;
        assert_eq!(problem.status, 404);
        assert_eq!(problem.title, "BookNotFound");
        assert!(problem.detail.contains("Book not found"));
        assert_eq!(problem.error_code, "BOOK_NOT_FOUND");
        assert_eq!(problem.instance, "/api/books/999");

        assert_eq!(repo.find_all().await.unwrap(), vec![]);
    }

    #[actix_web::test]
    async fn test_update_invalid_book_returns_validation_error() {
        let app = init_app!(Arc::new(InMemoryBookRepository::default()));

        let req = test::TestRequest::put()
            .uri("/api/books/1")
            .set_json(json!({"title": "t", "author": "a".repeat(101)}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let problem: ProblemDetail = test::read_body_json(resp).await;
        assert_eq!(problem.error_code, "VALIDATION_ERROR");
    }

    #[actix_web::test]
    async fn test_delete_book() {
        let repo = Arc::new(InMemoryBookRepository::default());
        let app = init_app!(repo.clone());

        let req = test::TestRequest::post()
            .uri("/api/books")
            .set_json(json!({"title": "Domain-Driven Design", "author": "Eric Evans"}))
            .to_request();
        let created: BookDto = test::call_and_read_body_json(&app, req).await;
        let id = created.id.unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/books/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(test::read_body(resp).await.is_empty());

        let req = test::TestRequest::get()
            .uri(&format!("/api/books/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        // deleting again has no observable effect
        let req = test::TestRequest::delete()
            .uri(&format!("/api/books/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn test_get_book_and_list_books() {
        let app = init_app!(Arc::new(InMemoryBookRepository::default()));

        let req = test::TestRequest::get().uri("/api/books").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!([]));

        let req = test::TestRequest::post()
            .uri("/api/books")
            .set_json(effective_java())
            .to_request();
        let first: BookDto = test::call_and_read_body_json(&app, req).await;
        let req = test::TestRequest::post()
            .uri("/api/books")
            .set_json(json!({"title": "Clean Code", "author": "Robert C. Martin"}))
            .to_request();
        let second: BookDto = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/books/{}", first.id.unwrap()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let found: BookDto = test::read_body_json(resp).await;
        assert_eq!(found, first);

        let req = test::TestRequest::get().uri("/api/books").to_request();
        let books: Vec<BookDto> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(books, vec![first, second]);
    }

    #[actix_web::test]
    async fn test_framework_errors_are_problem_details() {
        let app = init_app!(Arc::new(InMemoryBookRepository::default()));

        let req = test::TestRequest::get().uri("/api/books/abc").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let problem: ProblemDetail = test::read_body_json(resp).await;
        assert_eq!(problem.error_code, "ARGUMENT_TYPE_MISMATCH");
        assert_eq!(problem.detail, "book_id should be of type integer");

        let req = test::TestRequest::get().uri("/api/authors").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let problem: ProblemDetail = test::read_body_json(resp).await;
        assert_eq!(problem.error_code, "NO_HANDLER_FOUND");
        assert_eq!(problem.detail, "No handler found for GET /api/authors");
        assert_eq!(problem.instance, "/api/authors");

        let req = test::TestRequest::patch().uri("/api/books/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            resp.headers().get(CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
        let problem: ProblemDetail = test::read_body_json(resp).await;
        assert_eq!(problem.error_code, "METHOD_NOT_ALLOWED");
        assert_eq!(problem.instance, "/api/books/1");

        let req = test::TestRequest::delete().uri("/api/books").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        let problem: ProblemDetail = test::read_body_json(resp).await;
        assert_eq!(problem.detail, "Request method DELETE is not supported for /api/books");
    }

    #[actix_web::test]
    async fn test_health_and_api_spec() {
        let app = init_app!(Arc::new(InMemoryBookRepository::default()));

        let req = test::TestRequest::get().uri("/health").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/apispec/v2").to_request();
        let spec: Value = test::call_and_read_body_json(&app, req).await;
        let paths = spec["paths"].as_object().expect("No paths in api spec");
        assert!(paths.keys().any(|path| path.starts_with("/api/books")));
    }
}
