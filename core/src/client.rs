//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url`. Every operation is a `build_*`
//! method producing an `HttpRequest` and a `parse_*` method consuming the
//! matching `HttpResponse`; the caller does the round trip in between.
//!
//! Create and update share one wire operation on the server, so
//! `build_create_todo` and `build_update_todo` differ only in verb and path.
//! A lookup of an unknown id answers `204 No Content`, which
//! `parse_get_todo` turns into `Ok(None)`.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Todo;

const JSON_HEADER: (&str, &str) = ("content-type", "application/json");

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        request(HttpMethod::Get, format!("{}/todos", self.base_url), None)
    }

    pub fn build_get_todo(&self, id: i64) -> HttpRequest {
        request(HttpMethod::Get, self.todo_url(id), None)
    }

    /// POST to the collection. Leave `todo.id` at 0 to have the server assign one.
    pub fn build_create_todo(&self, todo: &Todo) -> Result<HttpRequest, ApiError> {
        let body = encode(todo)?;
        Ok(request(
            HttpMethod::Post,
            format!("{}/todos", self.base_url),
            Some(body),
        ))
    }

    /// PUT the whole record to `/todos/{id}`. The path id wins over `todo.id`.
    pub fn build_update_todo(&self, id: i64, todo: &Todo) -> Result<HttpRequest, ApiError> {
        let body = encode(todo)?;
        Ok(request(HttpMethod::Put, self.todo_url(id), Some(body)))
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        request(HttpMethod::Delete, self.todo_url(id), None)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Option<Todo>, ApiError> {
        if response.status == 204 {
            return Ok(None);
        }
        check_status(&response, 200)?;
        decode(&response.body).map(Some)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    fn todo_url(&self, id: i64) -> String {
        format!("{}/todos/{id}", self.base_url)
    }
}

fn request(method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
    let headers = match body {
        Some(_) => vec![(JSON_HEADER.0.to_string(), JSON_HEADER.1.to_string())],
        None => Vec::new(),
    };
    HttpRequest {
        method,
        path,
        headers,
        body,
    }
}

fn encode(todo: &Todo) -> Result<String, ApiError> {
    serde_json::to_string(todo).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
