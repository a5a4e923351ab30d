/// HTTP client wrapper for the LMS API.
///
/// A single configured `reqwest` client with the base address fixed at
/// startup. The bearer token is attached to every request when a session
/// exists. A 401 response surfaces as `ApiError::Unauthorized` and is
/// propagated to the top-level controller; this layer performs no
/// navigation side effects of its own.
pub mod types;

use std::path::PathBuf;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use types::{
    Book, BookOption, BookStatus, Category, CategoryOption, CollectionResponse, FieldErrors,
    ListResponse, LoginResponse, MutationResponse, Page, Transaction, TxStatus, User,
};

/// Default base address for local development.
pub const LOCAL_API: &str = "http://127.0.0.1:8000/api";

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Transport failure: no usable response at all.
    #[error("could not reach the server: {0}")]
    Network(String),
    /// The server rejected the token; the session must be torn down.
    #[error("session is no longer valid")]
    Unauthorized,
    /// The server answered with `success = false` and a message.
    #[error("{0}")]
    Rejected(String),
    /// Structured validation failure with a field-error map.
    #[error("validation failed")]
    Invalid(FieldErrors),
    /// The response did not match any known shape.
    #[error("unexpected response from the server")]
    Unexpected,
}

impl ApiError {
    /// Message suitable for an inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => "Cannot connect to server. Please try again.".to_string(),
            ApiError::Unauthorized => {
                "Your session has expired. Please sign in again.".to_string()
            }
            ApiError::Rejected(message) if !message.is_empty() => message.clone(),
            ApiError::Rejected(_) => "The request was rejected by the server.".to_string(),
            ApiError::Invalid(errors) => {
                first_field_error(errors).unwrap_or_else(|| "Validation failed".to_string())
            }
            ApiError::Unexpected => "An unexpected error occurred.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Unexpected
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// First message of the first invalid field, in server order.
pub fn first_field_error(errors: &FieldErrors) -> Option<String> {
    let (_, messages) = errors.iter().next()?;
    match messages {
        serde_json::Value::Array(list) => list
            .first()
            .and_then(|value| value.as_str())
            .map(str::to_owned),
        serde_json::Value::String(message) => Some(message.clone()),
        _ => None,
    }
}

/// Query parameters of a paginated list fetch. The search term and the
/// categorical filter are omitted from the request when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
    pub filter: Option<String>,
}

/// Book create/update payload. Sent as multipart so the cover image can be
/// appended alongside the scalar fields; empty fields are omitted.
#[derive(Debug, Clone, Default)]
pub struct BookPayload {
    pub category_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub author: String,
    pub date_published: String,
    pub book_link: String,
    pub status: BookStatus,
    pub image: Option<PathBuf>,
}

impl BookPayload {
    /// Scalar multipart fields, empty ones dropped.
    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(id) = self.category_id {
            fields.push(("category_id", id.to_string()));
        }
        for (name, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("author", &self.author),
            ("date_published", &self.date_published),
            ("book_link", &self.book_link),
        ] {
            if !value.is_empty() {
                fields.push((name, value.clone()));
            }
        }
        fields.push(("status", self.status.as_str().to_string()));
        fields
    }

    async fn to_form(&self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (name, value) in self.fields() {
            form = form.text(name, value);
        }
        if let Some(path) = &self.image {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|err| ApiError::Rejected(format!("Could not read image file: {err}")))?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "book_image".to_string());
            form = form.part("book_image", Part::bytes(bytes).file_name(file_name));
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryPayload {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category_description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub who_edited: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub borrower_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub borrower_email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub borrow_date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub due_date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub return_date: String,
    pub status: TxStatus,
}

/// The configured API client. Cheap to clone; clones share the underlying
/// connection pool.
#[derive(Debug, Clone)]
pub struct Api {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl Api {
    pub fn new(base: impl Into<String>) -> Self {
        Api {
            http: reqwest::Client::new(),
            base: base.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            log::warn!("request rejected with 401");
            return Err(ApiError::Unauthorized);
        }
        Ok(response)
    }

    /// Exchange credentials for a session token. Failures here never map to
    /// `Unauthorized`; a wrong password is a rejected login, not an expired
    /// session.
    pub async fn login(&self, username: &str, password: &str) -> Result<(String, User), ApiError> {
        let response = self
            .http
            .post(self.url("/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;
        let body: LoginResponse = response.json().await.map_err(|_| ApiError::Unexpected)?;
        if body.is_success {
            match (body.token, body.user) {
                (Some(token), Some(user)) => Ok((token, user)),
                _ => Err(ApiError::Unexpected),
            }
        } else if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
            Err(ApiError::Invalid(errors))
        } else {
            Err(ApiError::Rejected(
                body.message.unwrap_or_else(|| "Login failed".to_string()),
            ))
        }
    }

    /// Best-effort session invalidation; errors are logged and ignored.
    pub async fn logout(&self) {
        if let Err(err) = self.mutate_empty("/logout").await {
            log::warn!("logout request failed: {err}");
        }
    }

    pub async fn books(&self, query: ListQuery) -> Result<Page<Book>, ApiError> {
        self.list("/books", "category_id", query).await
    }

    pub async fn transactions(&self, query: ListQuery) -> Result<Page<Transaction>, ApiError> {
        self.list("/transactions", "status", query).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.collection("/categories").await
    }

    pub async fn category_options(&self) -> Result<Vec<CategoryOption>, ApiError> {
        self.collection("/dropdown/categories").await
    }

    pub async fn book_options(&self) -> Result<Vec<BookOption>, ApiError> {
        self.collection("/dropdown/books").await
    }

    pub async fn create_book(&self, payload: &BookPayload) -> Result<(), ApiError> {
        let form = payload.to_form().await?;
        self.mutate_multipart("/create/books", form).await
    }

    pub async fn update_book(&self, id: i64, payload: &BookPayload) -> Result<(), ApiError> {
        let form = payload.to_form().await?;
        self.mutate_multipart(&format!("/update/books/{id}"), form)
            .await
    }

    pub async fn archive_book(&self, id: i64) -> Result<(), ApiError> {
        self.mutate_empty(&format!("/archive/books/{id}")).await
    }

    pub async fn create_category(&self, payload: &CategoryPayload) -> Result<(), ApiError> {
        self.mutate_json("/create/categories", payload).await
    }

    pub async fn update_category(&self, id: i64, payload: &CategoryPayload) -> Result<(), ApiError> {
        self.mutate_json(&format!("/update/categories/{id}"), payload)
            .await
    }

    pub async fn create_transaction(&self, payload: &TransactionPayload) -> Result<(), ApiError> {
        self.mutate_json("/create/transactions", payload).await
    }

    pub async fn update_transaction(
        &self,
        id: i64,
        payload: &TransactionPayload,
    ) -> Result<(), ApiError> {
        self.mutate_json(&format!("/update/transactions/{id}"), payload)
            .await
    }

    pub async fn archive_transaction(&self, id: i64) -> Result<(), ApiError> {
        self.mutate_empty(&format!("/archive/transactions/{id}"))
            .await
    }

    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        filter_key: &'static str,
        query: ListQuery,
    ) -> Result<Page<T>, ApiError> {
        let mut params: Vec<(&str, String)> = vec![
            ("page", query.page.to_string()),
            ("per_page", query.per_page.to_string()),
        ];
        if let Some(search) = query.search {
            params.push(("search", search));
        }
        if let Some(filter) = query.filter {
            params.push((filter_key, filter));
        }
        let response = self.send(self.request(Method::GET, path).query(&params)).await?;
        let body: ListResponse<T> = response.json().await?;
        if !body.success {
            return Err(ApiError::Unexpected);
        }
        Ok(Page {
            items: body.data,
            pagination: body.pagination,
        })
    }

    async fn collection<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        let body: CollectionResponse<T> = response.json().await?;
        if !body.success {
            return Err(ApiError::Unexpected);
        }
        Ok(body.data)
    }

    async fn mutate_json<P: Serialize>(&self, path: &str, payload: &P) -> Result<(), ApiError> {
        let response = self
            .send(self.request(Method::POST, path).json(payload))
            .await?;
        self.finish_mutation(response).await
    }

    async fn mutate_multipart(&self, path: &str, form: Form) -> Result<(), ApiError> {
        let response = self
            .send(self.request(Method::POST, path).multipart(form))
            .await?;
        self.finish_mutation(response).await
    }

    async fn mutate_empty(&self, path: &str) -> Result<(), ApiError> {
        let response = self.send(self.request(Method::POST, path)).await?;
        self.finish_mutation(response).await
    }

    async fn finish_mutation(&self, response: reqwest::Response) -> Result<(), ApiError> {
        let body: MutationResponse = response.json().await.map_err(|_| ApiError::Unexpected)?;
        if body.success {
            return Ok(());
        }
        match body.errors.filter(|errors| !errors.is_empty()) {
            Some(errors) => Err(ApiError::Invalid(errors)),
            None => Err(ApiError::Rejected(body.message.unwrap_or_default())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn errors(pairs: &[(&str, &[&str])]) -> FieldErrors {
        let mut map = FieldErrors::new();
        for (field, messages) in pairs {
            map.insert(field.to_string(), json!(messages));
        }
        map
    }

    #[test]
    fn first_field_error_takes_first_message_of_first_field() {
        let map = errors(&[
            ("title", &["Title is required", "Title is too short"]),
            ("author", &["Author is required"]),
        ]);
        assert_eq!(
            first_field_error(&map).as_deref(),
            Some("Title is required")
        );
    }

    #[test]
    fn first_field_error_handles_bare_string_messages() {
        let mut map = FieldErrors::new();
        map.insert("title".to_string(), json!("Title is required"));
        assert_eq!(
            first_field_error(&map).as_deref(),
            Some("Title is required")
        );
    }

    #[test]
    fn validation_error_surfaces_first_field_message() {
        let err = ApiError::Invalid(errors(&[("title", &["Title is required"])]));
        assert_eq!(err.user_message(), "Title is required");
    }

    #[test]
    fn network_error_uses_generic_connectivity_message() {
        let err = ApiError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), "Cannot connect to server. Please try again.");
    }

    #[test]
    fn book_payload_omits_empty_fields() {
        let payload = BookPayload {
            category_id: Some(3),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            date_published: "1965-08-01".to_string(),
            ..BookPayload::default()
        };
        let fields = payload.fields();
        let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            ["category_id", "title", "author", "date_published", "status"]
        );
        assert!(fields.iter().any(|(name, value)| *name == "status" && value == "available"));
    }

    #[test]
    fn transaction_payload_omits_empty_fields() {
        let payload = TransactionPayload {
            book_id: Some(7),
            borrower_name: "Ada".to_string(),
            borrow_date: "2024-01-10".to_string(),
            due_date: "2024-01-24".to_string(),
            status: TxStatus::Borrowed,
            ..TransactionPayload::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("return_date"));
        assert!(!object.contains_key("borrower_email"));
        assert_eq!(object["book_id"], json!(7));
        assert_eq!(object["status"], json!("borrowed"));
    }
}
