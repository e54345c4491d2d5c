// src/cli.rs
//! Terminal shell: collects input from the command line, drives one
//! submission and draws the progress line and result panel.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::controller::{SubmissionController, SubmissionState};
use crate::core::config_manager::ScannerConfig;
use crate::core::service_client::ServiceClient;
use crate::error::ScanError;
use crate::input::{CriteriaField, InputCollector, ResumeFile};
use crate::progress::DecorativePhase;
use crate::render::{render_failure, render_result};

#[derive(Parser, Debug)]
#[command(name = "ats-scanner")]
#[command(about = "Score a PDF resume against job criteria with a remote ATS scoring service")]
pub struct ScannerCli {
    /// Resume to analyze; must end in .pdf
    pub resume: Option<PathBuf>,

    /// Job or qualification description (job_description contract)
    #[arg(long, conflicts_with = "job_description_file")]
    pub job_description: Option<String>,

    /// Read the job description from a file
    #[arg(long)]
    pub job_description_file: Option<PathBuf>,

    /// Technical keywords, separated by commas or newlines
    #[arg(long)]
    pub tech_keywords: Option<String>,

    /// Soft-skill keywords, separated by commas or newlines
    #[arg(long)]
    pub soft_keywords: Option<String>,

    /// Configuration file (defaults to ./config.yaml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the scoring endpoint
    #[arg(long)]
    pub endpoint: Option<String>,
}

impl ScannerCli {
    /// Fill an Input Collector the way the form would: pick the file, then
    /// type into whichever criteria fields were given.
    pub async fn collect_input(&self, config: &ScannerConfig) -> Result<InputCollector> {
        let mut input = InputCollector::new(config.contract.criteria_shape());
        input.select_file(self.resume.clone().map(ResumeFile::from_path));

        let job_description = match (&self.job_description, &self.job_description_file) {
            (Some(text), _) => Some(text.clone()),
            (None, Some(path)) => Some(
                tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
            ),
            (None, None) => None,
        };

        let fields = [
            (CriteriaField::JobDescription, "--job-description", job_description),
            (CriteriaField::TechKeywords, "--tech-keywords", self.tech_keywords.clone()),
            (CriteriaField::SoftKeywords, "--soft-keywords", self.soft_keywords.clone()),
        ];
        for (field, flag, value) in fields {
            if let Some(text) = value {
                input.update_criteria(field, text).with_context(|| {
                    format!("{} is not used by the {} contract", flag, config.contract)
                })?;
            }
        }

        Ok(input)
    }
}

/// Run one scan. Returns `true` when a result was displayed.
pub async fn handle_scan(cli: ScannerCli, mut config: ScannerConfig) -> Result<bool> {
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
        config.validate()?;
    }

    let input = cli.collect_input(&config).await?;
    if let Some(name) = input.file_name() {
        println!("Filename: {} ✅", name);
    }
    if input.criteria().is_blank() {
        println!("⚠️  No job criteria given; the score will not mean much.");
    }

    let client = ServiceClient::new(
        config.endpoint.clone(),
        config.contract,
        config.request_timeout(),
    )?;
    let controller = Arc::new(SubmissionController::new(
        Arc::new(client),
        DecorativePhase::from_config(&config.animation),
    ));

    let overlay = tokio::spawn(draw_status_line(controller.clone()));

    let outcome = tokio::select! {
        outcome = controller.submit(&input) => outcome,
        _ = tokio::signal::ctrl_c() => {
            info!("Received ctrl+c, tearing down");
            controller.teardown();
            Err(ScanError::Cancelled)
        }
    };

    overlay.abort();
    println!();

    match outcome {
        Ok(result) => {
            println!("{}", render_result(&result));
            Ok(true)
        }
        Err(err @ ScanError::Validation(_)) => {
            warn!("{}", err);
            eprintln!("❌ {}", err.user_message().unwrap_or_default());
            Ok(false)
        }
        Err(ScanError::Cancelled) => Ok(false),
        Err(err) => {
            match controller.state() {
                SubmissionState::Failed(notice) => eprintln!("{}", render_failure(&notice)),
                _ => eprintln!("❌ {}", err.user_message().unwrap_or_default()),
            }
            Ok(false)
        }
    }
}

async fn draw_status_line(controller: Arc<SubmissionController>) {
    let mut frames = controller.status_frames();
    while frames.changed().await.is_ok() {
        let frame = frames.borrow_and_update().clone();
        print!("\r\x1b[2K{} |", frame);
        let _ = std::io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ContractVariant;
    use crate::input::Criteria;

    fn parse(args: &[&str]) -> ScannerCli {
        ScannerCli::try_parse_from(std::iter::once("ats-scanner").chain(args.iter().copied()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_collect_job_description() {
        let cli = parse(&["resume.pdf", "--job-description", "Python, SQL"]);
        let input = cli.collect_input(&ScannerConfig::default()).await.unwrap();

        assert_eq!(input.file_name(), Some("resume.pdf"));
        assert_eq!(
            input.criteria(),
            &Criteria::JobDescription("Python, SQL".to_string())
        );
    }

    #[tokio::test]
    async fn test_collect_keywords() {
        let cli = parse(&[
            "cv.pdf",
            "--tech-keywords",
            "Rust, Tokio",
            "--soft-keywords",
            "Teamwork",
        ]);
        let config = ScannerConfig {
            contract: ContractVariant::KeywordScore,
            ..ScannerConfig::default()
        };
        let input = cli.collect_input(&config).await.unwrap();

        assert_eq!(
            input.criteria(),
            &Criteria::Keywords {
                technical: "Rust, Tokio".to_string(),
                soft: "Teamwork".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_flag_for_other_contract_rejected() {
        let cli = parse(&["resume.pdf", "--tech-keywords", "Rust"]);
        assert!(cli.collect_input(&ScannerConfig::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_job_description_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.txt");
        std::fs::write(&path, "Senior Rust engineer\nTokio, Axum").unwrap();

        let cli = parse(&[
            "resume.pdf",
            "--job-description-file",
            path.to_str().unwrap(),
        ]);
        let input = cli.collect_input(&ScannerConfig::default()).await.unwrap();

        assert_eq!(
            input.criteria(),
            &Criteria::JobDescription("Senior Rust engineer\nTokio, Axum".to_string())
        );
    }

    #[test]
    fn test_job_description_sources_conflict() {
        let result = ScannerCli::try_parse_from([
            "ats-scanner",
            "resume.pdf",
            "--job-description",
            "a",
            "--job-description-file",
            "b.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resume_is_optional() {
        let cli = parse(&["--job-description", "Rust"]);
        assert!(cli.resume.is_none());
    }
}
