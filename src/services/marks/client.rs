use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::extract::NoGradeTable;
use super::types::StudentReport;
use super::{build_report, NoDataFound, StudentSource};
use crate::core::config::Settings;

pub(crate) const STUDENT_ID_PLACEHOLDER: &str = "{student_id}";

#[derive(Debug, Error)]
pub(crate) enum FetchFailure {
    #[error("marks request failed: {0}")]
    Transport(reqwest::Error),
    #[error("marks site answered with status {0}")]
    Status(StatusCode),
    #[error("failed to read marks page body: {0}")]
    Body(reqwest::Error),
    #[error("marks page has no grade table")]
    NoGradeTable,
}

impl FetchFailure {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Status(_) => "status",
            Self::Body(_) => "body",
            Self::NoGradeTable => "no_table",
        }
    }
}

impl From<NoGradeTable> for FetchFailure {
    fn from(_: NoGradeTable) -> Self {
        Self::NoGradeTable
    }
}

/// HTTP client for the student marks page. Holds only fixed configuration, so one
/// instance can serve any number of concurrent lookups.
#[derive(Debug, Clone)]
pub(crate) struct MarksClient {
    client: Client,
    url_template: String,
}

impl MarksClient {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let source = settings.source();
        Self::new(
            &source.url_template,
            &source.user_agent,
            Duration::from_secs(source.timeout_seconds),
        )
    }

    pub(crate) fn new(url_template: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build marks HTTP client")?;

        Ok(Self { client, url_template: url_template.to_string() })
    }

    pub(crate) fn student_url(&self, student_id: &str) -> String {
        self.url_template.replace(STUDENT_ID_PLACEHOLDER, student_id)
    }

    /// Every failure collapses into `NoDataFound`; the cause only reaches logs and metrics.
    pub(crate) async fn lookup(&self, student_id: &str) -> Result<StudentReport, NoDataFound> {
        match self.try_lookup(student_id).await {
            Ok(report) => {
                metrics::counter!("marks_lookups_total", "outcome" => "ok").increment(1);
                tracing::info!(
                    student_id,
                    cohort = %report.cohort,
                    subjects = report.subjects.len(),
                    "Fetched student marks"
                );
                Ok(report)
            }
            Err(failure) => {
                metrics::counter!("marks_lookups_total", "outcome" => failure.kind()).increment(1);
                tracing::warn!(
                    student_id,
                    reason = failure.kind(),
                    error = %failure,
                    "No marks data for student"
                );
                Err(NoDataFound)
            }
        }
    }

    async fn try_lookup(&self, student_id: &str) -> Result<StudentReport, FetchFailure> {
        let html = self.fetch_page(student_id).await?;
        Ok(build_report(&html, student_id)?)
    }

    async fn fetch_page(&self, student_id: &str) -> Result<String, FetchFailure> {
        let response = self
            .client
            .get(self.student_url(student_id))
            .send()
            .await
            .map_err(FetchFailure::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status));
        }

        let body = response.bytes().await.map_err(FetchFailure::Body)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl StudentSource for MarksClient {
    async fn fetch_report(&self, student_id: &str) -> Result<StudentReport, NoDataFound> {
        self.lookup(student_id).await
    }
}
