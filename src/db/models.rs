// Database model structs

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};

use crate::models::{Question, Questions, Rarity};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

#[derive(Deserialize)]
pub(super) struct CredentialsRow {
    pub(super) id: i64,
    pub(super) password_hash: String,
}

/// A quiz session with its snapshot of questions. Holds every answer, so it
/// is never sent to clients as is; see [`QuizView`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quiz {
    pub id: String,
    pub user_id: i64,
    pub username: String,
    pub questions: Questions,
    pub correct_count: u32,
    pub current_index: u32,
    pub finished: bool,
}

impl Quiz {
    pub fn question_count(&self) -> u32 {
        self.questions.len() as u32
    }

    /// The question awaiting an answer, `None` once the quiz is finished.
    pub fn current_question(&self) -> Option<&Question> {
        if self.finished {
            return None;
        }
        self.questions.get(self.current_index as usize)
    }

    /// Client payload: answers are revealed only for questions already played.
    pub fn view(&self) -> QuizView {
        let questions = self
            .questions
            .iter()
            .enumerate()
            .map(|(i, question)| QuestionView {
                question_text: question.question_text.clone(),
                responses: question.responses.clone(),
                category: question.category.clone(),
                response_correct: ((i as u32) < self.current_index)
                    .then(|| question.response_correct.clone()),
            })
            .collect();

        QuizView {
            id: self.id.clone(),
            username: self.username.clone(),
            questions,
            correct_count: self.correct_count,
            current_index: self.current_index,
            finished: self.finished,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub question_text: String,
    pub responses: Vec<String>,
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_correct: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuizView {
    pub id: String,
    pub username: String,
    pub questions: Vec<QuestionView>,
    pub correct_count: u32,
    pub current_index: u32,
    pub finished: bool,
}

/// Raw `quizzes` row joined with its owner's username.
#[derive(Deserialize)]
pub(super) struct QuizRow {
    id: String,
    user_id: i64,
    username: String,
    questions: String,
    correct_count: i64,
    current_index: i64,
    finished: i64,
}

impl TryFrom<QuizRow> for Quiz {
    type Error = color_eyre::Report;

    fn try_from(row: QuizRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            username: row.username,
            questions: serde_json::from_str(&row.questions)?,
            correct_count: row.correct_count.try_into()?,
            current_index: row.current_index.try_into()?,
            finished: row.finished != 0,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheatSheetStack {
    pub rarity: Rarity,
    pub quantity: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub quizzes_played: i64,
    pub correct_responses: i64,
    pub full_marks: i64,
    pub used_cheat_sheets: i64,
}

/// A user's public record together with their reward ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub picture: String,
    pub coins: i64,
    pub experience: i64,
    pub inventory: Vec<CheatSheetStack>,
    pub stats: Stats,
}

impl Profile {
    pub fn quantity(&self, rarity: Rarity) -> i64 {
        self.inventory
            .iter()
            .find(|stack| stack.rarity == rarity)
            .map_or(0, |stack| stack.quantity)
    }
}

/// Flat `users` row; inventory is loaded separately.
#[derive(Deserialize)]
pub(super) struct ProfileRow {
    id: i64,
    username: String,
    picture: String,
    coins: i64,
    experience: i64,
    quizzes_played: i64,
    correct_responses: i64,
    full_marks: i64,
    used_cheat_sheets: i64,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            picture: row.picture,
            coins: row.coins,
            experience: row.experience,
            inventory: Vec::new(),
            stats: Stats {
                quizzes_played: row.quizzes_played,
                correct_responses: row.correct_responses,
                full_marks: row.full_marks,
                used_cheat_sheets: row.used_cheat_sheets,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopPlayer {
    pub username: String,
    pub experience: i64,
    pub picture: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub questions: Questions,
}

/// Raw `category_questions` row; `responses` is a JSON array.
#[derive(Deserialize)]
pub(super) struct QuestionRow {
    question_text: String,
    responses: String,
    response_correct: String,
}

impl QuestionRow {
    pub(super) fn into_question(self, category: &str) -> Result<Question> {
        let responses: Vec<String> = serde_json::from_str(&self.responses)
            .map_err(|e| eyre!("bad responses for '{}': {e}", self.question_text))?;
        Ok(Question {
            question_text: self.question_text,
            responses,
            response_correct: self.response_correct,
            category: Some(category.to_string()),
        })
    }
}
