/// Wire types exchanged with the LMS API.
///
/// Every record here is a disposable snapshot of server state: list
/// responses replace the local copies wholesale and nothing is merged
/// across requests.
use std::fmt;

use serde::{Deserialize, Serialize};

/// A book catalog entry. Books are never deleted, only archived.
#[derive(Debug, Clone, Deserialize)]
pub struct Book {
    pub id: i64,
    pub category_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub author: String,
    pub date_published: String,
    pub book_image: Option<String>,
    pub book_link: Option<String>,
    pub status: BookStatus,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    #[default]
    Available,
    Borrowed,
    Reserved,
    Unavailable,
}

impl BookStatus {
    pub const ALL: [BookStatus; 4] = [
        BookStatus::Available,
        BookStatus::Borrowed,
        BookStatus::Reserved,
        BookStatus::Unavailable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
            BookStatus::Reserved => "reserved",
            BookStatus::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BookStatus::Available => "Available",
            BookStatus::Borrowed => "Borrowed",
            BookStatus::Reserved => "Reserved",
            BookStatus::Unavailable => "Unavailable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: i64,
    pub category_name: String,
    #[serde(default)]
    pub category_description: String,
    pub who_edited: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// A borrow/return transaction. The book is referenced by id; titles for
/// display come from the dropdown reference list.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub book_id: i64,
    pub borrower_name: String,
    #[serde(default)]
    pub borrower_email: String,
    pub borrow_date: String,
    pub due_date: String,
    pub return_date: Option<String>,
    pub status: TxStatus,
    #[serde(default)]
    pub is_archived: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    #[default]
    Borrowed,
    Returned,
    Overdue,
}

impl TxStatus {
    pub const ALL: [TxStatus; 3] = [TxStatus::Borrowed, TxStatus::Returned, TxStatus::Overdue];

    pub fn as_str(self) -> &'static str {
        match self {
            TxStatus::Borrowed => "borrowed",
            TxStatus::Returned => "returned",
            TxStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TxStatus::Borrowed => "Borrowed",
            TxStatus::Returned => "Returned",
            TxStatus::Overdue => "Overdue",
        };
        f.write_str(label)
    }
}

/// Lightweight category reference for form selects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryOption {
    pub id: i64,
    pub category_name: String,
}

impl fmt::Display for CategoryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.category_name)
    }
}

/// Lightweight book reference for form selects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookOption {
    pub id: i64,
    pub title: String,
}

impl fmt::Display for BookOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Pagination cursor, recomputed from every list response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub per_page: u32,
    pub current_page: u32,
    pub last_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            total: 0,
            per_page: 10,
            current_page: 1,
            last_page: 1,
        }
    }
}

/// One page of a paginated collection.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// The signed-in user, as returned by `/login` and kept in the session file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Envelope of the paginated list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Envelope of the unpaginated collection endpoints (categories, dropdowns).
#[derive(Debug, Deserialize)]
pub struct CollectionResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Field name -> ordered list of validation messages, in server order.
pub type FieldErrors = serde_json::Map<String, serde_json::Value>;

/// Envelope of every mutating endpoint.
#[derive(Debug, Deserialize)]
pub struct MutationResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub errors: Option<FieldErrors>,
}

/// `/login` uses its own envelope, camelCased unlike the rest of the API.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "isSuccess", default)]
    pub is_success: bool,
    pub token: Option<String>,
    pub user: Option<User>,
    pub message: Option<String>,
    pub errors: Option<FieldErrors>,
}
