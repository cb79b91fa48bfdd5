use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Deserializer, Serialize};

pub type BookId = i64;

pub const TITLE_MAX_CHARS: usize = 200;
pub const AUTHOR_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// Struct representing a book as it is exchanged with clients.
/// On input `id` is optional and ignored, the store or the request path decides it.
pub struct BookDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BookId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<NaiveDate>,
}

/// Reads `null` like an absent field, so both end up as a blank-field validation error
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl BookDto {
    pub fn new(title: &str, author: &str, publication_date: Option<NaiveDate>) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            author: author.to_string(),
            publication_date,
        }
    }

    /// Checks field constraints, returns every violation as `"<field>: <message>"`
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = vec![];
        check_text_field(&mut errors, "title", "Title", &self.title, TITLE_MAX_CHARS);
        check_text_field(&mut errors, "author", "Author", &self.author, AUTHOR_MAX_CHARS);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_text_field(
    errors: &mut Vec<String>,
    field: &str,
    label: &str,
    value: &str,
    max_chars: usize,
) {
    if value.trim().is_empty() {
        errors.push(format!("{field}: {label} must not be blank"));
    }
    if value.chars().count() > max_chars {
        errors.push(format!(
            "{field}: {label} must not exceed {max_chars} characters"
        ));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Error body returned by every failing endpoint (RFC 7807 problem details)
pub struct ProblemDetail {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    pub timestamp: DateTime<Utc>,
    pub error_code: String,
}

impl fmt::Display for ProblemDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status, self.title, self.detail)
    }
}
