// src/generation/gemini.rs

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::{Validate, ValidationError};

use super::GenerationError;
use super::content::FilePart;
use crate::models::question::{NewOption, NewQuestion};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const THINKING_BUDGET: u32 = 32000;

const MCQ_SYSTEM_PROMPT: &str = "You are an expert educational assessment creator specializing in generating high-quality multiple choice questions (MCQs).

Your task is to analyze the provided document and create comprehensive multiple choice questions that test understanding of the key concepts, facts, and ideas presented.

Guidelines for creating MCQs:
1. Each question must have exactly 4 options (A, B, C, D)
2. Exactly one option must be correct for each question
3. All incorrect options (distractors) should be plausible but clearly wrong
4. Questions should cover different aspects and difficulty levels of the material
5. Questions should be clear, unambiguous, and test meaningful understanding
6. Avoid trivial questions or those that can be answered without reading the document
7. Do NOT include explanations - only the question and options
8. Make distractors challenging but fair - they should require actual knowledge to distinguish from the correct answer
9. Vary question types: recall, comprehension, application, and analysis
10. Ensure options are similar in length and structure to avoid giving away the answer";

/// The validated shape the model must return: a list of questions, each
/// with exactly 4 options of which exactly one is correct. Any deviation
/// is a fatal service error, never a silently-accepted partial result.
#[derive(Debug, Deserialize, Validate)]
pub struct McqResponse {
    #[validate(nested)]
    pub questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GeneratedQuestion {
    #[validate(length(min = 1))]
    pub text: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<GeneratedOption>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratedOption {
    pub text: String,
    pub is_correct: bool,
}

fn validate_options(options: &[GeneratedOption]) -> Result<(), ValidationError> {
    if options.len() != 4 {
        return Err(ValidationError::new("exactly_four_options_required"));
    }
    if options.iter().filter(|o| o.is_correct).count() != 1 {
        return Err(ValidationError::new("exactly_one_correct_option_required"));
    }
    Ok(())
}

impl From<GeneratedQuestion> for NewQuestion {
    fn from(question: GeneratedQuestion) -> Self {
        Self {
            text: question.text,
            options: question
                .options
                .into_iter()
                .map(|o| NewOption {
                    text: o.text,
                    is_correct: o.is_correct,
                })
                .collect(),
        }
    }
}

/// Thin client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }

    /// Asks the model for `num_questions` questions over the given document
    /// parts, using structured output constrained to the MCQ schema.
    pub async fn generate_questions(
        &self,
        parts: &[FilePart],
        num_questions: u32,
    ) -> Result<McqResponse, GenerationError> {
        let doc_word = if parts.len() == 1 {
            "document"
        } else {
            "documents"
        };
        let prompt = format!(
            "Analyze the provided {doc_word} and generate exactly {num_questions} multiple choice questions.\n\n\
             Each question should:\n\
             - Test a meaningful concept from the {doc_word}\n\
             - Have exactly 4 options with only one correct answer\n\
             - Be clear and unambiguous\n\
             - Not include any explanation\n\n\
             Generate diverse questions covering different topics and difficulty levels from the {doc_word}."
        );

        // All files first, then the prompt, matching the schema contract.
        let mut request_parts: Vec<Part> = parts.iter().map(Part::inline).collect();
        request_parts.push(Part::text(prompt));

        let request = GenerateContentRequest {
            system_instruction: ContentPayload {
                parts: vec![Part::text(MCQ_SYSTEM_PROMPT.to_string())],
            },
            contents: vec![ContentPayload {
                parts: request_parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
                thinking_config: ThinkingConfig {
                    thinking_budget: THINKING_BUDGET,
                },
            },
        };

        let url = format!(
            "{GEMINI_BASE_URL}/v1beta/models/{}:generateContent",
            self.model
        );
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GenerationError::HttpStatus(response.status()));
        }

        let body: GenerateContentResponse = response.json().await?;
        let text = candidate_text(&body).ok_or(GenerationError::EmptyResponse)?;
        parse_and_validate(&text)
    }
}

/// The structured-output contract, in the schema dialect the endpoint
/// expects.
fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "text": { "type": "STRING" },
                        "options": {
                            "type": "ARRAY",
                            "minItems": 4,
                            "maxItems": 4,
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "text": { "type": "STRING" },
                                    "is_correct": { "type": "BOOLEAN" }
                                },
                                "required": ["text", "is_correct"]
                            }
                        }
                    },
                    "required": ["text", "options"]
                }
            }
        },
        "required": ["questions"]
    })
}

fn candidate_text(response: &GenerateContentResponse) -> Option<String> {
    let candidate = response.candidates.first()?;
    let content = candidate.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();
    if text.trim().is_empty() { None } else { Some(text) }
}

fn parse_and_validate(text: &str) -> Result<McqResponse, GenerationError> {
    let parsed: McqResponse =
        serde_json::from_str(text).map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
    parsed
        .validate()
        .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
    Ok(parsed)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: ContentPayload,
    contents: Vec<ContentPayload>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct ContentPayload {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    fn inline(part: &FilePart) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: part.mime_type.to_string(),
                data: BASE64.encode(&part.data),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
