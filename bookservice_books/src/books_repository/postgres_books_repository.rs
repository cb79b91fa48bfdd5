use anyhow::Context;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Row, Statement};

use crate::api::BookId;
use crate::books_repository::{BookRepository, BookRepositoryError};
use crate::model::Book;

pub struct PostgresBooksRepository {
    client: Client,
}

pub struct PostgresBooksRepositoryConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
    pub dbname: String,
}

impl PostgresBooksRepository {
    pub async fn init(config: PostgresBooksRepositoryConfig) -> anyhow::Result<Self> {
        let connection_str = format!(
            "postgresql://{}:{}@{}/{}",
            config.username, config.password, config.hostname, config.dbname
        );
        tracing::info!(
            "Connecting to postgres at {}/{} as {}",
            config.hostname,
            config.dbname,
            config.username
        );
        let (client, connection) = tokio_postgres::connect(&connection_str, NoTls)
            .await
            .context("Failed to start postgres")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Postgres connection error: {}", e);
            }
        });

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS books (
            id                  BIGSERIAL PRIMARY KEY,
            title               VARCHAR(200) NOT NULL UNIQUE,
            author              VARCHAR(100) NOT NULL,
            publication_date    DATE
            )
        ",
            )
            .await
            .context("Failed to setup table")?;
        Ok(Self { client })
    }
}

fn book_from_row(row: &Row) -> Result<Book, BookRepositoryError> {
    Ok(Book {
        id: Some(row.try_get("id")?),
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        publication_date: row.try_get("publication_date")?,
    })
}

/// Translates constraint failures reported by postgres into repository errors
fn write_error(err: tokio_postgres::Error, title: &str) -> BookRepositoryError {
    let Some(db_err) = err.as_db_error() else {
        return err.into();
    };

    let code = db_err.code();
    if code == &SqlState::UNIQUE_VIOLATION {
        BookRepositoryError::TitleAlreadyTaken(title.to_string())
    } else if code == &SqlState::STRING_DATA_RIGHT_TRUNCATION
        || code == &SqlState::NOT_NULL_VIOLATION
        || code == &SqlState::CHECK_VIOLATION
    {
        let field = db_err.column().unwrap_or("book");
        BookRepositoryError::ConstraintViolation(vec![format!(
            "{}: {}",
            field,
            db_err.message()
        )])
    } else {
        err.into()
    }
}

#[async_trait::async_trait]
impl BookRepository for PostgresBooksRepository {
    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, title, author, publication_date FROM books WHERE id = ($1)")
            .await?;

        let rows = self.client.query(&stmt, &[&book_id]).await?;

        rows.first().map(book_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Book>, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, title, author, publication_date FROM books ORDER BY id")
            .await?;

        let rows = self.client.query(&stmt, &[]).await?;

        rows.iter().map(book_from_row).collect()
    }

    async fn save(&self, book: Book) -> Result<Book, BookRepositoryError> {
        let rows = match book.id {
            None => {
                let stmt: Statement = self
                    .client
                    .prepare(
                        "INSERT INTO books (title, author, publication_date) VALUES ($1, $2, $3) \
                         RETURNING id, title, author, publication_date",
                    )
                    .await?;
                self.client
                    .query(&stmt, &[&book.title, &book.author, &book.publication_date])
                    .await
            }
            Some(book_id) => {
                let stmt: Statement = self
                    .client
                    .prepare(
                        "UPDATE books SET title = ($1), author = ($2), publication_date = ($3) \
                         WHERE id = ($4) RETURNING id, title, author, publication_date",
                    )
                    .await?;
                self.client
                    .query(
                        &stmt,
                        &[&book.title, &book.author, &book.publication_date, &book_id],
                    )
                    .await
            }
        }
        .map_err(|err| write_error(err, &book.title))?;

        match (rows.first(), book.id) {
            (Some(row), _) => book_from_row(row),
            (None, Some(book_id)) => Err(BookRepositoryError::NotFound(book_id)),
            (None, None) => Err(BookRepositoryError::Other("Id not returned".to_string())),
        }
    }

    async fn delete_by_id(&self, book_id: BookId) -> Result<(), BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("DELETE FROM books WHERE id = ($1)")
            .await?;

        self.client.execute(&stmt, &[&book_id]).await?;
        Ok(())
    }

    async fn exists_by_title(&self, title: &str) -> Result<bool, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT EXISTS (SELECT 1 FROM books WHERE title = ($1))")
            .await?;

        let row = self.client.query_one(&stmt, &[&title]).await?;
        Ok(row.try_get(0)?)
    }
}
