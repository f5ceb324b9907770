use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub type Questions = Vec<Question>;

/// A question with its candidate answers. Exactly one of `responses` equals
/// `response_correct`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question_text: String,
    pub responses: Vec<String>,
    pub response_correct: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl Question {
    /// Checks the shape of a user-supplied question, returning a description
    /// of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.question_text.trim().is_empty() {
            return Err("question text is empty".to_string());
        }
        if self.responses.len() < 2 {
            return Err(format!(
                "question '{}' needs at least two responses",
                self.question_text
            ));
        }
        let mut seen = HashSet::new();
        if !self.responses.iter().all(|r| seen.insert(r.as_str())) {
            return Err(format!(
                "question '{}' has duplicate responses",
                self.question_text
            ));
        }
        if !seen.contains(self.response_correct.as_str()) {
            return Err(format!(
                "question '{}' does not list its correct response",
                self.question_text
            ));
        }
        Ok(())
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        self.response_correct == answer
    }

    pub fn incorrect_responses(&self) -> Vec<String> {
        self.responses
            .iter()
            .filter(|r| !self.is_correct(r))
            .cloned()
            .collect()
    }
}

/// Cheat-sheet quality tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Rarity {
    Common = 3,
    Rare = 4,
    Legendary = 5,
}

impl Rarity {
    pub const ALL: [Rarity; 3] = [Rarity::Common, Rarity::Rare, Rarity::Legendary];

    pub fn tier(self) -> i64 {
        self as i64
    }

    /// Number of wrong answers a cheat sheet of this tier reveals.
    pub fn hints(self) -> usize {
        match self {
            Rarity::Legendary => 3,
            Rarity::Rare => 2,
            Rarity::Common => 1,
        }
    }
}

impl TryFrom<i64> for Rarity {
    type Error = String;

    fn try_from(tier: i64) -> Result<Self, Self::Error> {
        match tier {
            3 => Ok(Rarity::Common),
            4 => Ok(Rarity::Rare),
            5 => Ok(Rarity::Legendary),
            other => Err(format!("unknown rarity tier {other}")),
        }
    }
}

impl From<Rarity> for i64 {
    fn from(rarity: Rarity) -> Self {
        rarity.tier()
    }
}

/// Where the questions of a new quiz come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSource {
    /// A category owned by the requesting user.
    #[default]
    Bank,
    /// The external trivia provider.
    Trivia,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorySelector {
    pub source: QuestionSource,
    pub name: String,
}

impl CategorySelector {
    pub fn bank(name: impl Into<String>) -> Self {
        Self {
            source: QuestionSource::Bank,
            name: name.into(),
        }
    }

    pub fn trivia(name: impl Into<String>) -> Self {
        Self {
            source: QuestionSource::Trivia,
            name: name.into(),
        }
    }
}
