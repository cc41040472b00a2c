//! Bearer-authenticated JSON access to the parking API.
//!
//! The HTTP stack itself sits behind `HttpTransport` (gloo-net in the
//! browser, scripted fakes in tests). The token is asked for on every call
//! and never kept.

pub mod models;
pub mod parking;

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, TransportError};

pub use parking::ParkingApi;

/* ---------------- requête / réponse ------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method:  Method,
    pub url:     String,
    pub headers: Vec<(String, String)>,
    pub body:    Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: &str) -> Self {
        Self { method, url: url.to_string(), headers: Vec::new(), body: None }
    }

    pub fn get(url: &str) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: &str) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {token}"))
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body:   String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/* ---------------- seams ------------------------------------------------- */

#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait(?Send)]
impl<T: HttpTransport + ?Sized> HttpTransport for Rc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Point-in-time bearer token; `None` means "unauthenticated for this call".
#[async_trait(?Send)]
pub trait TokenSource {
    async fn token(&self) -> Option<String>;
}

#[async_trait(?Send)]
impl<S: TokenSource + ?Sized> TokenSource for Rc<S> {
    async fn token(&self) -> Option<String> {
        (**self).token().await
    }
}

/* ---------------- client ------------------------------------------------ */

#[derive(Deserialize)]
struct ErrorMessage {
    #[serde(alias = "error")]
    message: String,
}

pub struct ApiClient<T, S> {
    base_url:  String,
    transport: T,
    tokens:    S,
}

impl<T: HttpTransport, S: TokenSource> ApiClient<T, S> {
    pub fn new(base_url: &str, transport: T, tokens: S) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), transport, tokens }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<U: DeserializeOwned>(&self, path: &str) -> Result<U, ApiError> {
        let text = self.send(Method::Get, path, None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn post<B, U>(&self, path: &str, body: &B) -> Result<U, ApiError>
    where
        B: Serialize + ?Sized,
        U: DeserializeOwned,
    {
        let text = self.send(Method::Post, path, Some(serde_json::to_string(body)?)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn patch<B, U>(&self, path: &str, body: &B) -> Result<U, ApiError>
    where
        B: Serialize + ?Sized,
        U: DeserializeOwned,
    {
        let text = self.send(Method::Patch, path, Some(serde_json::to_string(body)?)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// DELETE answering 200/204 with or without a body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::Delete, path, None).await.map(|_| ())
    }

    async fn send(&self, method: Method, path: &str, body: Option<String>) -> Result<String, ApiError> {
        let token = self.tokens.token().await.ok_or(ApiError::Unauthenticated)?;

        let mut request = HttpRequest::new(method, &self.url(path)).bearer(&token);
        if let Some(body) = body {
            request = request.header("Content-Type", "application/json").with_body(body);
        }

        debug!("{method} {}", request.url);
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(ApiError::Http {
                status:  response.status,
                message: error_message(&response),
            });
        }
        Ok(response.body)
    }
}

fn error_message(response: &HttpResponse) -> String {
    if let Ok(ErrorMessage { message }) = serde_json::from_str(&response.body) {
        return message;
    }
    match response.body.trim() {
        "" => "request failed".to_string(),
        text => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_json_field() {
        let resp = HttpResponse { status: 400, body: r#"{"message":"Date is in the past"}"#.into() };
        assert_eq!(error_message(&resp), "Date is in the past");

        let resp = HttpResponse { status: 403, body: r#"{"error":"Forbidden"}"#.into() };
        assert_eq!(error_message(&resp), "Forbidden");
    }

    #[test]
    fn error_message_falls_back_to_text() {
        let resp = HttpResponse { status: 502, body: " Bad gateway \n".into() };
        assert_eq!(error_message(&resp), "Bad gateway");

        let resp = HttpResponse { status: 500, body: String::new() };
        assert_eq!(error_message(&resp), "request failed");
    }

    #[test]
    fn request_builder_sets_headers() {
        let req = HttpRequest::get("https://api/requests").bearer("abc");
        assert_eq!(req.header_value("authorization"), Some("Bearer abc"));
        assert_eq!(req.method.as_str(), "GET");
        assert!(req.body.is_none());

        let req = HttpRequest::post("https://api/users")
            .header("Content-Type", "application/json")
            .with_body(r#"{"firstName":"Ada"}"#.into());
        assert_eq!(req.header_value("content-type"), Some("application/json"));
        assert_eq!(req.method, Method::Post);
    }
}
