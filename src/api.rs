//! JSON-over-HTTP client for the external task/chat backend.
//!
//! Every path is relative to `<base_url>/api`. Bodies are JSON, any 2xx response
//! is parsed as JSON (204 becomes `Value::Null`), and anything else fails with an
//! `ApiError` carrying the method and path. A bearer token is attached when the
//! configured cookie string holds an `auth_token` entry.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ApiError;

/// Name of the cookie carrying the bearer token.
pub const AUTH_COOKIE: &str = "auth_token";

/// Extract the `auth_token` value from a `name=value; name=value` cookie string.
/// An empty value counts as absent.
pub fn auth_token(cookies: &str) -> Option<&str> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Blocking client for the backend API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl ApiClient {
    /// `cookies` is a raw cookie string; only its `auth_token` entry is used.
    pub fn new(base_url: &str, cookies: Option<&str>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: cookies.and_then(auth_token).map(str::to_string),
            http,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_url, config.auth_cookie.as_deref())
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Full URL for an api path such as `/tasks`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send("GET", path, self.http.get(self.url(path)))
    }

    pub fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        self.send("POST", path, self.http.post(self.url(path)).json(body))
    }

    pub fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        self.send("PATCH", path, self.http.patch(self.url(path)).json(body))
    }

    pub fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.send("DELETE", path, self.http.delete(self.url(path)))
    }

    /// POST and decode the response into `R`.
    pub fn post_as<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let value = self.post(path, body)?;
        serde_json::from_value(value).map_err(|source| ApiError::Decode {
            method: "POST",
            path: path.to_string(),
            source,
        })
    }

    /// `GET /tasks`.
    pub fn get_tasks(&self) -> Result<Value, ApiError> {
        self.get("/tasks")
    }

    fn send(
        &self,
        method: &'static str,
        path: &str,
        req: RequestBuilder,
    ) -> Result<Value, ApiError> {
        let req = match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        debug!(method, path, "api request");

        let resp = req.send().map_err(|source| ApiError::Transport {
            method,
            path: path.to_string(),
            source,
        })?;
        let status = resp.status();
        if !status.is_success() {
            warn!(method, path, status = status.as_u16(), "api request failed");
            return Err(ApiError::Request {
                method,
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let body = resp.text().map_err(|source| ApiError::Transport {
            method,
            path: path.to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            method,
            path: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    #[test]
    fn test_auth_token_from_cookie_string() {
        assert_eq!(auth_token("auth_token=abc"), Some("abc"));
        assert_eq!(auth_token("theme=dark; auth_token=abc; lang=en"), Some("abc"));
        assert_eq!(auth_token("theme=dark"), None);
        assert_eq!(auth_token("auth_token="), None);
        assert_eq!(auth_token("not_auth_token=abc"), None);
        assert_eq!(auth_token(""), None);
    }

    #[test]
    fn test_url_building() {
        let client = ApiClient::new("http://localhost:8000/", None);
        assert_eq!(client.url("/tasks"), "http://localhost:8000/api/tasks");
        assert!(!client.has_token());
        let client = ApiClient::new("http://h", Some("auth_token=t"));
        assert!(client.has_token());
    }

    #[tokio::test]
    async fn test_get_parses_json_and_sends_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tasks"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let value = tokio::task::spawn_blocking(move || {
            ApiClient::new(&uri, Some("theme=dark; auth_token=secret")).get_tasks()
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(value, json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn test_no_cookie_means_no_authorization_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tasks"))
            .respond_with(|req: &Request| {
                if req.headers.contains_key("authorization") {
                    ResponseTemplate::new(400)
                } else {
                    ResponseTemplate::new(200).set_body_json(json!([]))
                }
            })
            .mount(&server)
            .await;

        let uri = server.uri();
        let value = tokio::task::spawn_blocking(move || ApiClient::new(&uri, None).get("/tasks"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn test_post_and_patch_send_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tasks"))
            .and(body_json(json!({"title": "Write docs"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/tasks/7"))
            .and(body_json(json!({"completed": true})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 7, "completed": true})),
            )
            .mount(&server)
            .await;

        let uri = server.uri();
        let (created, patched) = tokio::task::spawn_blocking(move || {
            let client = ApiClient::new(&uri, None);
            (
                client.post("/tasks", &json!({"title": "Write docs"})),
                client.patch("/tasks/7", &json!({"completed": true})),
            )
        })
        .await
        .unwrap();
        assert_eq!(created.unwrap(), json!({"id": 7}));
        assert_eq!(patched.unwrap()["completed"], json!(true));
    }

    #[tokio::test]
    async fn test_delete_204_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/tasks/7"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let uri = server.uri();
        let value =
            tokio::task::spawn_blocking(move || ApiClient::new(&uri, None).delete("/tasks/7"))
                .await
            .unwrap()
            .unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_non_2xx_carries_method_and_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/tasks/8"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let uri = server.uri();
        let err = tokio::task::spawn_blocking(move || ApiClient::new(&uri, None).delete("/tasks/8"))
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, ApiError::Request { status: 404, .. }));
        assert_eq!(err.context(), ("DELETE", "/tasks/8"));
        assert_eq!(err.to_string(), "DELETE /tasks/8 failed with status 404");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let uri = server.uri();
        let err = tokio::task::spawn_blocking(move || ApiClient::new(&uri, None).get_tasks())
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode { method: "GET", .. }));
    }
}
