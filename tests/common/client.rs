//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with a cookie store and without redirect following, so
//! tests can assert on every 303 the server answers with.
//!
//! When routes or form fields change, update only this file.

use super::constants::*;
use reqwest::header::LOCATION;
use reqwest::multipart::{Form, Part};
use reqwest::{redirect::Policy, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

/// The target of a redirect response, panics if it isn't one.
pub fn redirect_location(response: &Response) -> String {
    assert_eq!(
        response.status(),
        StatusCode::SEE_OTHER,
        "Expected a redirect from {}",
        response.url()
    );
    response
        .headers()
        .get(LOCATION)
        .expect("Redirect without location")
        .to_str()
        .expect("Non ascii location")
        .to_string()
}

/// Body of a JSON view response
pub async fn view(response: Response) -> Value {
    response.json().await.expect("Response is not JSON")
}

impl TestClient {
    /// Creates a new unauthenticated client
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client logged in as one of the seeded users
    ///
    /// # Panics
    ///
    /// Panics if the login fails (indicates test infrastructure problem).
    pub async fn authenticated_as(base_url: String, email: &str) -> Self {
        let client = Self::new(base_url);

        let response = client.login(email, TEST_PASS).await;
        assert_eq!(
            redirect_location(&response),
            "/dashboard/",
            "Login of {} failed",
            email
        );

        client
    }

    pub async fn super_admin(base_url: String) -> Self {
        Self::authenticated_as(base_url, SUPER_ADMIN_EMAIL).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Generic requests
    // ========================================================================

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// POST /login/
    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post_form("/login/", &[("email", email), ("password", password)])
            .await
    }

    /// GET /logout/
    pub async fn logout(&self) -> Response {
        self.get("/logout/").await
    }

    /// POST /register/
    pub async fn register(&self, form: &[(&str, &str)]) -> Response {
        self.post_form("/register/", form).await
    }

    /// GET /dashboard/
    pub async fn dashboard(&self) -> Response {
        self.get("/dashboard/").await
    }

    // ========================================================================
    // Lists
    // ========================================================================

    /// GET /users/?page=&limit=
    pub async fn list_users(&self, page: u64, limit: u64) -> Response {
        self.get(&format!("/users/?page={}&limit={}", page, limit))
            .await
    }

    /// GET /artists/?page=&limit=
    pub async fn list_artists(&self, page: u64, limit: u64) -> Response {
        self.get(&format!("/artists/?page={}&limit={}", page, limit))
            .await
    }

    /// GET /artists/songs/{artist_id}/?page=&limit=
    pub async fn list_songs(&self, artist_id: i64, page: u64, limit: u64) -> Response {
        self.get(&format!(
            "/artists/songs/{}/?page={}&limit={}",
            artist_id, page, limit
        ))
        .await
    }

    // ========================================================================
    // CSV
    // ========================================================================

    /// POST /artists/import_csv/ with the given upload
    pub async fn import_csv(&self, file_name: &str, content: &[u8]) -> Response {
        let part = Part::bytes(content.to_vec()).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        self.client
            .post(self.url("/artists/import_csv/"))
            .multipart(form)
            .send()
            .await
            .expect("Import request failed")
    }

    /// GET /artists/export_csv/
    pub async fn export_csv(&self) -> Response {
        self.get("/artists/export_csv/").await
    }
}
