// src/contract.rs
//! Contract adapters - the only code that knows the scoring service's field
//! names. One variant is active per deployment, chosen in configuration.

use std::fmt;
use std::str::FromStr;

use reqwest::multipart::{Form, Part};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::ScanError;
use crate::input::{Criteria, CriteriaShape, SubmissionRequest};
use crate::types::response::{
    DescriptionScoreResponse, KeywordBreakdownResponse, KeywordScoreResponse, ScalarScore,
};
use crate::types::ScoreResult;

const RESUME_FIELD: &str = "resume";
const JOB_DESCRIPTION_FIELD: &str = "job_description";
const TECH_KEYWORDS_FIELD: &str = "tech_keywords";
const SOFT_KEYWORDS_FIELD: &str = "soft_keywords";
const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractVariant {
    /// `job_description` in, `{technical_score, soft_score, final_score}` out.
    #[default]
    JobDescription,
    /// keyword lists in, `{technical, soft, score}` out.
    KeywordBreakdown,
    /// keyword lists in, `{score}` out.
    KeywordScore,
}

impl ContractVariant {
    pub fn criteria_shape(self) -> CriteriaShape {
        match self {
            ContractVariant::JobDescription => CriteriaShape::JobDescription,
            ContractVariant::KeywordBreakdown | ContractVariant::KeywordScore => {
                CriteriaShape::Keywords
            }
        }
    }

    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            ContractVariant::JobDescription => &["technical_score", "soft_score", "final_score"],
            ContractVariant::KeywordBreakdown => &["technical", "soft", "score"],
            ContractVariant::KeywordScore => &["score"],
        }
    }

    /// Multipart body: the résumé under `resume` plus the criteria fields.
    pub async fn build_form(self, request: &SubmissionRequest) -> Result<Form, ScanError> {
        let file = request.file();
        let bytes = file.read_bytes().await?;
        let resume = Part::bytes(bytes)
            .file_name(file.name().to_string())
            .mime_str(PDF_MIME)?;

        let form = Form::new().part(RESUME_FIELD, resume);

        match (self.criteria_shape(), request.criteria()) {
            (CriteriaShape::JobDescription, Criteria::JobDescription(text)) => {
                Ok(form.text(JOB_DESCRIPTION_FIELD, text.clone()))
            }
            (CriteriaShape::Keywords, Criteria::Keywords { technical, soft }) => Ok(form
                .text(TECH_KEYWORDS_FIELD, technical.clone())
                .text(SOFT_KEYWORDS_FIELD, soft.clone())),
            (expected, criteria) => Err(ScanError::Validation(format!(
                "{} contract expects {:?} criteria, got {:?}",
                self,
                expected,
                criteria.shape()
            ))),
        }
    }

    /// Validates a 2xx body against this contract. Never yields a partial
    /// result: any missing, mistyped or out-of-range field is rejected.
    pub fn parse_response(self, body: &[u8]) -> Result<ScoreResult, ScanError> {
        match self {
            ContractVariant::JobDescription => {
                let raw: DescriptionScoreResponse = self.decode(body)?;
                Ok(ScoreResult::with_breakdown(
                    percentage("technical_score", raw.technical_score)?,
                    percentage("soft_score", raw.soft_score)?,
                    percentage("final_score", raw.final_score)?,
                ))
            }
            ContractVariant::KeywordBreakdown => {
                let raw: KeywordBreakdownResponse = self.decode(body)?;
                Ok(ScoreResult::with_breakdown(
                    percentage("technical", raw.technical)?,
                    percentage("soft", raw.soft)?,
                    percentage("score", raw.score)?,
                ))
            }
            ContractVariant::KeywordScore => {
                let raw: KeywordScoreResponse = self.decode(body)?;
                let value = match raw.score {
                    ScalarScore::Number(value) => value,
                    ScalarScore::Text(text) => text.trim().parse::<f64>().map_err(|_| {
                        ScanError::Contract(format!("score is not numeric: {:?}", text))
                    })?,
                };
                Ok(ScoreResult::final_only(percentage("score", value)?))
            }
        }
    }

    fn decode<T: DeserializeOwned>(self, body: &[u8]) -> Result<T, ScanError> {
        let malformed = |e: serde_json::Error| {
            ScanError::Contract(format!("{} response: {}", self, e))
        };

        let value: Value = serde_json::from_slice(body).map_err(malformed)?;
        if !value.is_object() {
            return Err(ScanError::Contract(format!(
                "{} response is not a JSON object",
                self
            )));
        }
        serde_json::from_value(value).map_err(malformed)
    }
}

fn percentage(field: &str, value: f64) -> Result<f64, ScanError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(ScanError::Contract(format!(
            "{} out of range [0, 100]: {}",
            field, value
        )))
    }
}

impl fmt::Display for ContractVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContractVariant::JobDescription => "job_description",
            ContractVariant::KeywordBreakdown => "keyword_breakdown",
            ContractVariant::KeywordScore => "keyword_score",
        };
        f.write_str(name)
    }
}

impl FromStr for ContractVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "job_description" => Ok(ContractVariant::JobDescription),
            "keyword_breakdown" => Ok(ContractVariant::KeywordBreakdown),
            "keyword_score" => Ok(ContractVariant::KeywordScore),
            other => anyhow::bail!(
                "Unknown contract variant: {}. Use job_description, keyword_breakdown or keyword_score",
                other
            ),
        }
    }
}
