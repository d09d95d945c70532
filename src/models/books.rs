use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog record as stored in the `books` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub isbn: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookCreate {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub year: Option<i32>,
    pub isbn: String,
}

/// Partial update; fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
}

impl BookUpdate {
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(ref author) = self.author {
            book.author = author.clone();
        }
        if let Some(year) = self.year {
            book.year = Some(year);
        }
        if let Some(ref isbn) = self.isbn {
            book.isbn = isbn.clone();
        }
    }
}
