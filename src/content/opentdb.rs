use std::time::Duration;

use color_eyre::Result;
use serde::Deserialize;

use crate::error::Error;
use crate::models::{Question, Questions};

const CATEGORIES: &[(&str, u32)] = &[
    ("General Knowledge", 9),
    ("Books", 10),
    ("Film", 11),
    ("Music", 12),
    ("Musicals & Theatres", 13),
    ("Television", 14),
    ("Video Games", 15),
    ("Board Games", 16),
    ("Science & Nature", 17),
    ("Computers", 18),
    ("Mathematics", 19),
    ("Mythology", 20),
    ("Sports", 21),
    ("History", 23),
    ("Politics", 24),
    ("Art", 25),
    ("Celebrities", 26),
    ("Animals", 27),
    ("Vehicles", 28),
    ("Comics", 29),
    ("Gadgets", 30),
    ("Japanese Anime & Manga", 31),
    ("Cartoon & Animations", 32),
];

/// Provider id of a category name, if the provider knows it.
pub fn category_id(name: &str) -> Option<u32> {
    CATEGORIES
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, id)| *id)
}

#[derive(Deserialize)]
struct TriviaResponse {
    response_code: i64,
    #[serde(default)]
    results: Vec<TriviaQuestion>,
}

#[derive(Deserialize)]
struct TriviaQuestion {
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

fn decode(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

impl TriviaResponse {
    /// Decode HTML entities and fold each result into a `Question`. The
    /// correct answer is listed last; callers shuffle.
    fn into_questions(self, category: &str) -> Result<Questions, Error> {
        if self.response_code != 0 {
            return Err(Error::UpstreamUnavailable(format!(
                "trivia provider answered with code {}",
                self.response_code
            )));
        }

        Ok(self
            .results
            .into_iter()
            .map(|raw| {
                let response_correct = decode(&raw.correct_answer);
                let mut responses: Vec<String> =
                    raw.incorrect_answers.iter().map(|a| decode(a)).collect();
                responses.push(response_correct.clone());
                Question {
                    question_text: decode(&raw.question),
                    responses,
                    response_correct,
                    category: Some(category.to_string()),
                }
            })
            .collect())
    }
}

/// HTTP client for the Open Trivia Database.
#[derive(Clone)]
pub struct TriviaClient {
    client: reqwest::Client,
    base_url: String,
}

impl TriviaClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub async fn fetch(&self, category: &str, amount: usize) -> Result<Questions, Error> {
        let Some(id) = category_id(category) else {
            return Err(Error::Validation(format!(
                "unknown trivia category '{category}'"
            )));
        };

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("amount", amount.to_string()),
                ("category", id.to_string()),
                ("difficulty", "easy".to_string()),
                ("type", "multiple".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("trivia provider request failed: {e}");
                Error::UpstreamUnavailable("trivia provider unreachable".to_string())
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            tracing::error!("trivia provider returned {status}");
            return Err(Error::UpstreamUnavailable(format!(
                "trivia provider returned {status}"
            )));
        }

        let body: TriviaResponse = resp.json().await.map_err(|e| {
            tracing::error!("trivia provider sent an unreadable body: {e}");
            Error::UpstreamUnavailable("trivia provider sent an unreadable body".to_string())
        })?;

        let questions = body.into_questions(category)?;
        tracing::info!(
            "fetched {} trivia questions for category '{category}'",
            questions.len()
        );
        Ok(questions)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn category_map_covers_provider_ids() {
        assert_eq!(category_id("General Knowledge"), Some(9));
        assert_eq!(category_id("History"), Some(23));
        assert_eq!(category_id("Cartoon & Animations"), Some(32));
        assert_eq!(category_id("Cooking"), None);
    }

    #[test]
    fn results_are_decoded_into_questions() {
        let body: TriviaResponse = serde_json::from_str(
            r#"{
                "response_code": 0,
                "results": [{
                    "category": "Entertainment: Film",
                    "type": "multiple",
                    "difficulty": "easy",
                    "question": "Who directed &quot;Jaws&quot;?",
                    "correct_answer": "Steven Spielberg",
                    "incorrect_answers": ["George Lucas", "Ridley Scott", "James Cameron"]
                }]
            }"#,
        )
        .unwrap();

        let questions = body.into_questions("Film").unwrap();

        assert_eq!(questions.len(), 1);
        let question = &questions[0];
        assert_eq!(question.question_text, "Who directed \"Jaws\"?");
        assert_eq!(question.response_correct, "Steven Spielberg");
        assert_eq!(question.responses.len(), 4);
        assert!(question.validate().is_ok());
        assert_eq!(question.category.as_deref(), Some("Film"));
    }

    #[test]
    fn non_zero_response_code_is_upstream_failure() {
        let body: TriviaResponse =
            serde_json::from_str(r#"{"response_code": 1, "results": []}"#).unwrap();

        let err = body.into_questions("Film").unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn unknown_category_is_rejected_before_any_request() {
        let client = TriviaClient::new(
            "http://127.0.0.1:9/unreachable".to_string(),
            Duration::from_millis(10),
        )
        .unwrap();

        let err = client.fetch("Cooking", 10).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
