//! Text → ParsedResume orchestration.
//!
//! One sequential chain per upload: build the extraction prompt, call the
//! model, repair/validate the completion. A completion that defeats both
//! repair passes triggers exactly one retry with the compact prompt and
//! lower sampling diversity; if that also fails the caller gets the
//! all-defaults resume. Only a failed *initial* model call is an error;
//! everything downstream of a successful first completion degrades
//! gracefully instead of failing the upload.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{CompletionClient, GenerateOptions, LlmError};
use crate::schema::validate::validate_resume;
use crate::schema::ParsedResume;

use super::prompts;
use super::repair;

/// Parses cleaned resume text into the canonical schema via the model.
pub async fn parse_resume_text(
    text: &str,
    client: &dyn CompletionClient,
) -> Result<ParsedResume, AppError> {
    let prompt = prompts::EXTRACTION_PROMPT.replace("{resume_text}", text);

    let completion = client
        .generate(&prompt, &GenerateOptions::extraction())
        .await
        .map_err(ai_unavailable)?;

    if let Some(value) = repair::parse_with_repair(&completion) {
        let resume = validate_resume(&value);
        info!(
            "Extraction parsed on first attempt ({} chars of completion)",
            completion.len()
        );
        return Ok(resume);
    }

    warn!("Completion survived no repair pass, retrying with strict prompt");
    Ok(retry_with_strict_prompt(text, client).await)
}

/// Best-effort second attempt. Every failure mode here (transport error,
/// empty completion, still-unparseable output) resolves to the default
/// resume so the upload flow always ends with a usable object.
async fn retry_with_strict_prompt(text: &str, client: &dyn CompletionClient) -> ParsedResume {
    let prompt = prompts::STRICT_RETRY_PROMPT.replace("{resume_text}", text);

    match client
        .generate(&prompt, &GenerateOptions::strict_retry())
        .await
    {
        Ok(completion) => match repair::parse_with_repair(&completion) {
            Some(value) => {
                info!("Strict retry parsed successfully");
                validate_resume(&value)
            }
            None => {
                warn!("Strict retry output still unparseable, returning empty resume");
                ParsedResume::default()
            }
        },
        Err(e) => {
            warn!("Strict retry request failed ({e}), returning empty resume");
            ParsedResume::default()
        }
    }
}

fn ai_unavailable(e: LlmError) -> AppError {
    AppError::AiUnavailable(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Scripted stand-in for the model: pops one canned result per call and
    /// records the options each call used.
    struct ScriptedClient {
        completions: Mutex<Vec<Result<String, LlmError>>>,
        options_seen: Mutex<Vec<GenerateOptions>>,
    }

    impl ScriptedClient {
        fn new(completions: Vec<Result<String, LlmError>>) -> Self {
            Self {
                completions: Mutex::new(completions),
                options_seen: Mutex::new(Vec::new()),
            }
        }

        async fn calls(&self) -> usize {
            self.options_seen.lock().await.len()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn generate(
            &self,
            _prompt: &str,
            options: &GenerateOptions,
        ) -> Result<String, LlmError> {
            self.options_seen.lock().await.push(options.clone());
            self.completions.lock().await.remove(0)
        }
    }

    fn api_error() -> LlmError {
        LlmError::Api {
            status: 500,
            message: "backend down".to_string(),
        }
    }

    #[tokio::test]
    async fn test_valid_completion_parses_first_try() {
        let client = ScriptedClient::new(vec![Ok(
            "```json\n{\"personalInfo\": {\"name\": \"Jane Doe\"}, \"skills\": [\"Rust\"]}\n```"
                .to_string(),
        )]);

        let resume = parse_resume_text("resume text", &client).await.unwrap();
        assert_eq!(resume.personal_info.name, "Jane Doe");
        assert_eq!(resume.skills, vec!["Rust"]);
        assert_eq!(client.calls().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_then_valid_retry() {
        let client = ScriptedClient::new(vec![
            Ok("the resume seems to describe an engineer".to_string()),
            Ok("{\"personalInfo\": {\"name\": \"Jane\"}}".to_string()),
        ]);

        let resume = parse_resume_text("resume text", &client).await.unwrap();
        assert_eq!(resume.personal_info.name, "Jane");

        let options = client.options_seen.lock().await;
        assert_eq!(options.len(), 2);
        // Retry runs with the stricter sampling preset.
        assert_eq!(options[1].num_predict, 1024);
        assert!(options[1].stop.is_empty());
        assert_eq!(options[0].num_predict, 2048);
    }

    #[tokio::test]
    async fn test_both_attempts_malformed_returns_defaults() {
        let client = ScriptedClient::new(vec![
            Ok("no json here".to_string()),
            Ok("still {]] no json".to_string()),
        ]);

        let resume = parse_resume_text("resume text", &client).await.unwrap();
        assert!(resume.is_empty());
        assert!(resume.skills.is_empty());
        assert_eq!(resume.personal_info.name, "");
        assert_eq!(client.calls().await, 2);
    }

    #[tokio::test]
    async fn test_initial_transport_failure_is_fatal() {
        let client = ScriptedClient::new(vec![Err(api_error())]);

        let result = parse_resume_text("resume text", &client).await;
        assert!(matches!(result, Err(AppError::AiUnavailable(_))));
        assert_eq!(client.calls().await, 1);
    }

    #[tokio::test]
    async fn test_retry_transport_failure_degrades_to_defaults() {
        let client = ScriptedClient::new(vec![
            Ok("unparseable prose".to_string()),
            Err(api_error()),
        ]);

        let resume = parse_resume_text("resume text", &client).await.unwrap();
        assert!(resume.is_empty());
        assert_eq!(client.calls().await, 2);
    }

    #[tokio::test]
    async fn test_repaired_completion_counts_as_first_try() {
        // Bare keys + single quotes: broken enough to need repairs, not a
        // retry.
        let client = ScriptedClient::new(vec![Ok(
            "Sure! ```json {personalInfo: {name: 'Jane Doe', email: 'jane@x.com'}} ```"
                .to_string(),
        )]);

        let resume = parse_resume_text("resume text", &client).await.unwrap();
        assert_eq!(resume.personal_info.name, "Jane Doe");
        assert_eq!(resume.personal_info.email, "jane@x.com");
        assert_eq!(resume.experience.len(), 0);
        assert_eq!(client.calls().await, 1);
    }
}
