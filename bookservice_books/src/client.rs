use anyhow::{bail, Context};
use reqwest::StatusCode;
use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use reqwest_tracing::TracingMiddleware;

use crate::api::{BookDto, BookId, ProblemDetail};

const MAX_RETRIES: u32 = 3;

pub struct BookServiceBooksClient {
    url: String,
    client: ClientWithMiddleware,
}

/// Describes a failed response, using the problem detail body when there is one
async fn failure(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ProblemDetail>().await {
        Ok(problem) => format!("{} ({})", problem, problem.error_code),
        Err(_) => status.to_string(),
    }
}

impl BookServiceBooksClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        // transient failures (connection errors, 5xx, 408, 429) are retried
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(100), Duration::from_secs(2))
            .build_with_max_retries(MAX_RETRIES);
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls POST /api/books endpoint
    /// Returns the created book with its id
    pub async fn create_book(&self, book: BookDto) -> anyhow::Result<BookDto> {
        let response = self
            .client
            .post(format!("{}/api/books", self.url))
            .json(&book)
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            bail!("Failed to create book {}", failure(response).await)
        }
        Ok(response.json().await?)
    }

    /// Calls PUT /api/books/{book_id} endpoint
    /// Returns None if there is no book with given id
    pub async fn update_book(
        &self,
        book_id: BookId,
        book: BookDto,
    ) -> anyhow::Result<Option<BookDto>> {
        let response = self
            .client
            .put(format!("{}/api/books/{}", self.url, book_id))
            .json(&book)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            bail!("Failed to update book {}", failure(response).await)
        }
    }

    /// Calls GET /api/books/{book_id} endpoint
    /// Returns book if it was present
    /// None if book was not in the repository
    /// and error in case of any other failure
    pub async fn get_book(&self, book_id: BookId) -> anyhow::Result<Option<BookDto>> {
        let response = self
            .client
            .get(format!("{}/api/books/{}", self.url, book_id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            bail!("Failed to get book {}", failure(response).await)
        }
    }

    /// Calls GET /api/books endpoint
    pub async fn list_books(&self) -> anyhow::Result<Vec<BookDto>> {
        let response = self
            .client
            .get(format!("{}/api/books", self.url))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to list books {}", failure(response).await)
        }
    }

    /// Calls DELETE /api/books/{book_id} endpoint
    pub async fn delete_book(&self, book_id: BookId) -> anyhow::Result<()> {
        let response = self
            .client
            .delete(format!("{}/api/books/{}", self.url, book_id))
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Failed to delete book {}", failure(response).await)
        }
        Ok(())
    }
}
