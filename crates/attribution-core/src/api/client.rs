//! HTTP client for the attribution screen's AJAX endpoints.
//!
//! This module provides the `ApiClient` struct, the `Gateway` implementation
//! used outside of tests.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{
    AvailabilityId, AvailabilityOption, Contact, CorporationId, CreateOutcome, DeletedTraining,
    NewTraining, Period, PeriodId, SectionId, StudentId, StudentOption, TrainingId,
};

use super::{ApiError, AttributionScreen, Gateway};

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Path of the page the screen is served from.
const SCREEN_PATH: &str = "/attribution/";

/// Form field Django reads the CSRF token from.
const CSRF_FIELD: &str = "csrfmiddlewaretoken";

/// API client for the attribution endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    csrf_token: Option<String>,
}

impl ApiClient {
    /// Create a new client for the server at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            csrf_token: None,
        })
    }

    /// Set the CSRF token sent with state-changing requests
    pub fn set_csrf_token(&mut self, token: String) {
        self.csrf_token = Some(token);
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn csrf_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.csrf_token {
            headers.insert("X-CSRFToken", header::HeaderValue::from_str(token)?);
            headers.insert(
                header::COOKIE,
                header::HeaderValue::from_str(&format!("csrftoken={}", token))?,
            );
        }
        // Django rejects secure POSTs without a same-origin referer
        headers.insert(
            header::REFERER,
            header::HeaderValue::from_str(&self.url(SCREEN_PATH))?,
        );
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn send_get(&self, path: &str) -> Result<reqwest::Response> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;
        Self::check_response(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_get(path)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        self.send_get(path)
            .await?
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", path))
    }

    async fn post_form(
        &self,
        path: &str,
        fields: Vec<(&'static str, String)>,
    ) -> Result<reqwest::Response> {
        let url = self.url(path);
        let mut form = fields;
        if let Some(ref token) = self.csrf_token {
            form.push((CSRF_FIELD, token.clone()));
        }
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(&url)
            .headers(self.csrf_headers()?)
            .form(&form)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;
        Self::check_response(response).await
    }
}

#[async_trait]
impl Gateway for ApiClient {
    async fn fetch_screen(&self) -> Result<AttributionScreen> {
        let html = self.get_text(SCREEN_PATH).await?;
        Ok(AttributionScreen::parse(&html))
    }

    async fn fetch_periods(&self, section: SectionId) -> Result<Vec<Period>> {
        self.get_json(&format!("/section/{}/periods/", section)).await
    }

    async fn fetch_students(&self, period: PeriodId) -> Result<Vec<StudentOption>> {
        self.get_json(&format!("/period/{}/students/", period)).await
    }

    async fn fetch_availabilities(&self, period: PeriodId) -> Result<Vec<AvailabilityOption>> {
        self.get_json(&format!("/period/{}/corporations/", period)).await
    }

    async fn fetch_trainings_markup(&self, period: PeriodId) -> Result<String> {
        self.get_text(&format!("/training/by_period/{}/", period)).await
    }

    async fn fetch_student_summary(&self, student: StudentId, period: PeriodId) -> Result<String> {
        self.get_text(&format!("/student/{}/summary/?period={}", student, period))
            .await
    }

    async fn fetch_availability_summary(&self, availability: AvailabilityId) -> Result<String> {
        self.get_text(&format!("/availability/{}/summary/", availability))
            .await
    }

    async fn fetch_contacts(&self, corporation: CorporationId) -> Result<Vec<Contact>> {
        self.get_json(&format!("/corporation/{}/contacts/", corporation))
            .await
    }

    async fn create_training(&self, request: &NewTraining) -> Result<CreateOutcome> {
        let body = self
            .post_form("/training/new/", request.form_fields())
            .await?
            .text()
            .await
            .context("Failed to read training creation response")?;
        Ok(CreateOutcome::from_body(&body))
    }

    async fn delete_training(&self, training: TrainingId) -> Result<DeletedTraining> {
        self.post_form("/training/del/", vec![("pk", training.to_string())])
            .await?
            .json()
            .await
            .context("Failed to parse training deletion response")
    }

    async fn export_trainings(&self, period: PeriodId, non_attributed: bool) -> Result<Vec<u8>> {
        let path = format!(
            "/stages/export/?period={}&non_attr={}",
            period,
            u8::from(non_attributed)
        );
        let bytes = self
            .send_get(&path)
            .await?
            .bytes()
            .await
            .context("Failed to read export body")?;
        Ok(bytes.to_vec())
    }
}
