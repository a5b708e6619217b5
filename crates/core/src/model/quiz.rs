use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::ids::{ModuleId, QuestionId};

/// Minimum score (inclusive) required to complete a module through its quiz.
pub const PASS_THRESHOLD: f64 = 70.0;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question must offer at least one option")]
    NoOptions,
}

/// Data-quality issue found on a stored question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionProblem {
    EmptyText,
    NoOptions,
    /// The correct answer can never be selected.
    AnswerNotInOptions,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question attached to exactly one module.
///
/// The correct answer is stored as the option string itself. Whether it is
/// actually one of `options` is not checked here; see [`Question::has_valid_answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    module_id: ModuleId,
    text: String,
    options: Vec<String>,
    correct_answer: String,
}

impl Question {
    /// Creates a question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` for blank text and
    /// `QuestionError::NoOptions` when `options` is empty.
    pub fn new(
        id: QuestionId,
        module_id: ModuleId,
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }

        Ok(Self {
            id,
            module_id,
            text,
            options,
            correct_answer: correct_answer.into(),
        })
    }

    /// Rehydrate a question from storage without validating it.
    ///
    /// Stored rows with blank text or no options still load and score; the
    /// catalog audit reports them via [`Question::problems`].
    #[must_use]
    pub fn from_persisted(
        id: QuestionId,
        module_id: ModuleId,
        text: String,
        options: Vec<String>,
        correct_answer: String,
    ) -> Self {
        Self {
            id,
            module_id,
            text,
            options,
            correct_answer,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// True when the designated correct answer is one of the options.
    ///
    /// A question failing this can never be answered correctly.
    #[must_use]
    pub fn has_valid_answer(&self) -> bool {
        self.options.iter().any(|o| *o == self.correct_answer)
    }

    /// Content problems, in a fixed order. Empty for a well-formed question.
    #[must_use]
    pub fn problems(&self) -> Vec<QuestionProblem> {
        let mut problems = Vec::new();
        if self.text.trim().is_empty() {
            problems.push(QuestionProblem::EmptyText);
        }
        if self.options.is_empty() {
            problems.push(QuestionProblem::NoOptions);
        }
        if !self.has_valid_answer() {
            problems.push(QuestionProblem::AnswerNotInOptions);
        }
        problems
    }

    #[must_use]
    pub fn is_correct(&self, selected: &str) -> bool {
        selected == self.correct_answer
    }
}

//
// ─── ANSWER SHEET ──────────────────────────────────────────────────────────────
//

/// Answers picked during one quiz session, keyed by question index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: BTreeMap<usize, String>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the option picked for `index`, replacing any earlier pick.
    pub fn select(&mut self, index: usize, option: impl Into<String>) {
        self.answers.insert(index, option.into());
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Whether every question index in `0..question_count` has an answer.
    #[must_use]
    pub fn is_complete(&self, question_count: usize) -> bool {
        (0..question_count).all(|i| self.answers.contains_key(&i))
    }

    /// Forgets all answers (retake).
    pub fn clear(&mut self) {
        self.answers.clear();
    }
}

impl<S: Into<String>> FromIterator<(usize, S)> for AnswerSheet {
    fn from_iter<I: IntoIterator<Item = (usize, S)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().map(|(i, s)| (i, s.into())).collect(),
        }
    }
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Result for one question of a scored quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub selected: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Score of a single submission. Derived, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizScore {
    correct: usize,
    total: usize,
    outcomes: Vec<QuestionOutcome>,
}

impl QuizScore {
    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn outcomes(&self) -> &[QuestionOutcome] {
        &self.outcomes
    }

    /// Percentage in `[0, 100]`. An empty quiz scores 0.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }

        // Quiz sizes are tiny; the casts are exact.
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.correct as f64 / self.total as f64;
        ratio * 100.0
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.percentage() >= PASS_THRESHOLD
    }
}

/// Scores `answers` against `questions`.
///
/// Unanswered questions count as wrong. Pure; never fails.
#[must_use]
pub fn score(questions: &[Question], answers: &AnswerSheet) -> QuizScore {
    let outcomes: Vec<QuestionOutcome> = questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let selected = answers.get(index);
            QuestionOutcome {
                question_id: question.id(),
                selected: selected.map(str::to_owned),
                correct_answer: question.correct_answer().to_owned(),
                is_correct: selected.is_some_and(|s| question.is_correct(s)),
            }
        })
        .collect();

    QuizScore {
        correct: outcomes.iter().filter(|o| o.is_correct).count(),
        total: questions.len(),
        outcomes,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
