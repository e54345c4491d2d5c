// src/core/service_client.rs
//! HTTP client for the scoring service - one multipart POST per submission.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, trace};

use crate::contract::ContractVariant;
use crate::error::ScanError;
use crate::input::SubmissionRequest;
use crate::types::ScoreResult;

/// The seam between the Submission Controller and the scoring service.
/// The controller holds it as `Arc<dyn ScoringBackend>`.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    async fn score(&self, request: &SubmissionRequest) -> Result<ScoreResult, ScanError>;
}

pub struct ServiceClient {
    client: reqwest::Client,
    endpoint: String,
    contract: ContractVariant,
}

impl ServiceClient {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(
        endpoint: String,
        contract: ContractVariant,
        timeout: Option<Duration>,
    ) -> Result<Self, ScanError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ScanError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            contract,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn contract(&self) -> ContractVariant {
        self.contract
    }
}

#[async_trait]
impl ScoringBackend for ServiceClient {
    async fn score(&self, request: &SubmissionRequest) -> Result<ScoreResult, ScanError> {
        let form = self.contract.build_form(request).await?;

        info!(
            submission_id = %request.id(),
            contract = %self.contract,
            "Calling scoring service: {}",
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        trace!(submission_id = %request.id(), "Response status: {}", status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                submission_id = %request.id(),
                "Scoring service error {}: {}", status, error_text
            );
            return Err(ScanError::Transport(format!(
                "service returned error status {}",
                status
            )));
        }

        let body = response.bytes().await?;
        self.contract.parse_response(&body).map_err(|e| {
            error!(
                submission_id = %request.id(),
                expected = ?self.contract.required_fields(),
                "Invalid response from scoring service: {}. Raw response: {}",
                e,
                String::from_utf8_lossy(&body)
            );
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{CriteriaField, CriteriaShape, InputCollector, ResumeFile};
    use mockito::Matcher;
    use std::io::Write;

    fn request_for(shape: CriteriaShape, name: &str) -> SubmissionRequest {
        let mut collector = InputCollector::new(shape);
        collector.select_file(Some(ResumeFile::from_bytes(name, b"%PDF-1.4 test".to_vec())));
        match shape {
            CriteriaShape::JobDescription => collector
                .update_criteria(CriteriaField::JobDescription, "Python, SQL")
                .unwrap(),
            CriteriaShape::Keywords => {
                collector
                    .update_criteria(CriteriaField::TechKeywords, "Rust\nTokio")
                    .unwrap();
                collector
                    .update_criteria(CriteriaField::SoftKeywords, "Teamwork")
                    .unwrap();
            }
        }
        collector.build_request().unwrap()
    }

    fn client(server: &mockito::Server, contract: ContractVariant) -> ServiceClient {
        ServiceClient::new(
            format!("{}/analyze", server.url()),
            contract,
            Some(Duration::from_secs(5)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_job_description_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/analyze")
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="resume"; filename="resume.pdf""#.to_string()),
                Matcher::Regex("application/pdf".to_string()),
                Matcher::Regex(r#"name="job_description""#.to_string()),
                Matcher::Regex("Python, SQL".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"technical_score": 80, "soft_score": 60, "final_score": 72}"#)
            .expect(1)
            .create_async()
            .await;

        let request = request_for(CriteriaShape::JobDescription, "resume.pdf");
        let result = client(&server, ContractVariant::JobDescription)
            .score(&request)
            .await
            .unwrap();

        assert_eq!(result, ScoreResult::with_breakdown(80.0, 60.0, 72.0));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_keyword_fields_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/analyze")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="tech_keywords""#.to_string()),
                Matcher::Regex(r#"name="soft_keywords""#.to_string()),
                Matcher::Regex("Teamwork".to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"score": "64"}"#)
            .create_async()
            .await;

        let request = request_for(CriteriaShape::Keywords, "cv.pdf");
        let result = client(&server, ContractVariant::KeywordScore)
            .score(&request)
            .await
            .unwrap();

        assert_eq!(result, ScoreResult::final_only(64.0));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/analyze")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let request = request_for(CriteriaShape::JobDescription, "resume.pdf");
        let err = client(&server, ContractVariant::JobDescription)
            .score(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::Transport(msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_client_error_with_json_body_is_still_transport_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/analyze")
            .with_status(400)
            .with_body(r#"{"score": 90}"#)
            .create_async()
            .await;

        let request = request_for(CriteriaShape::Keywords, "resume.pdf");
        let err = client(&server, ContractVariant::KeywordScore)
            .score(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::Transport(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_contract_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/analyze")
            .with_status(200)
            .with_body(r#"{"technical_score": 80}"#)
            .create_async()
            .await;

        let request = request_for(CriteriaShape::JobDescription, "resume.pdf");
        let err = client(&server, ContractVariant::JobDescription)
            .score(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::Contract(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let client = ServiceClient::new(
            "http://127.0.0.1:9/analyze".to_string(),
            ContractVariant::JobDescription,
            Some(Duration::from_secs(2)),
        )
        .unwrap();

        let request = request_for(CriteriaShape::JobDescription, "resume.pdf");
        let err = client.score(&request).await.unwrap_err();
        assert!(matches!(err, ScanError::Transport(_)));
    }

    #[tokio::test]
    async fn test_resume_read_from_disk_at_send_time() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/analyze")
            .match_body(Matcher::Regex("disk-backed resume".to_string()))
            .with_status(200)
            .with_body(r#"{"technical": 70, "soft": 50, "score": 63}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"disk-backed resume").unwrap();

        let mut collector = InputCollector::new(CriteriaShape::Keywords);
        collector.select_file(Some(ResumeFile::from_path(path.clone())));
        let request = collector.build_request().unwrap();

        let result = client(&server, ContractVariant::KeywordBreakdown)
            .score(&request)
            .await
            .unwrap();

        assert_eq!(result.final_score, 63.0);
        mock.assert_async().await;
    }
}
