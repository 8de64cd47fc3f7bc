//! Multiple-choice quizzes attached to learning topics.
//!
//! A [`QuizSession`] walks the questions in order. Each answer is checked
//! immediately; once the last question is answered the session yields a
//! [`QuizResult`].
//!
//! ```
//! use bioprint_logic::quiz::{Question, QuizSession};
//!
//! let questions = vec![Question {
//!     id: "q1".into(),
//!     question: "Which bio-ink is protein based?".into(),
//!     options: vec!["Alginate".into(), "Collagen".into()],
//!     correct_answer: 1,
//!     explanation: "Collagen is a structural protein.".into(),
//! }];
//! let mut session = QuizSession::new("materials", questions);
//! assert!(session.answer(1).unwrap());
//! assert_eq!(session.result().unwrap().score_percent, 100);
//! ```

use serde::{Deserialize, Serialize};

use crate::badges::BadgeType;

/// Module id for quiz progress items.
pub const LEARN_MODULE: &str = "learn";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer: usize,
    pub explanation: String,
}

/// A question as shown before answering: no answer key, no explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPrompt {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
}

impl From<&Question> for QuestionPrompt {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            question: q.question.clone(),
            options: q.options.clone(),
        }
    }
}

/// Outcome of one answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    pub question_id: String,
    pub chosen: usize,
    pub correct: bool,
    pub correct_answer: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("option {index} out of range for question {question_id} ({options} options)")]
    OptionOutOfRange {
        question_id: String,
        index: usize,
        options: usize,
    },

    #[error("quiz already finished")]
    Finished,

    #[error("expected {expected} answers, got {answered}")]
    AnswerCount { expected: usize, answered: usize },
}

/// Score of a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub correct: u32,
    pub total: u32,
    pub score_percent: u8,
}

impl QuizResult {
    pub fn new(correct: u32, total: u32) -> Self {
        let score_percent = if total == 0 {
            0
        } else {
            (100.0 * f64::from(correct.min(total)) / f64::from(total)).round() as u8
        };
        Self {
            correct: correct.min(total),
            total,
            score_percent,
        }
    }

    /// Compares the exact fraction, not the rounded `score_percent`.
    pub fn passed(&self, pass_percent: u8) -> bool {
        self.total > 0
            && 100 * u64::from(self.correct) >= u64::from(pass_percent) * u64::from(self.total)
    }

    /// [`BadgeType::QuizMaster`] when the quiz was passed.
    pub fn badge(&self, pass_percent: u8) -> Option<BadgeType> {
        self.passed(pass_percent).then_some(BadgeType::QuizMaster)
    }
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    topic_id: String,
    questions: Vec<Question>,
    current: usize,
    correct: u32,
}

impl QuizSession {
    pub fn new(topic_id: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            topic_id: topic_id.into(),
            questions,
            current: 0,
            correct: 0,
        }
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.questions.len()
    }

    /// Answer the current question and advance. Returns whether it was correct.
    pub fn answer(&mut self, option: usize) -> Result<bool, QuizError> {
        let question = self.questions.get(self.current).ok_or(QuizError::Finished)?;
        if option >= question.options.len() {
            return Err(QuizError::OptionOutOfRange {
                question_id: question.id.clone(),
                index: option,
                options: question.options.len(),
            });
        }
        let correct = option == question.correct_answer;
        if correct {
            self.correct += 1;
        }
        self.current += 1;
        Ok(correct)
    }

    /// Answer every remaining question in order and score the quiz.
    ///
    /// The number of answers must match the remaining questions. Stops at
    /// the first out-of-range option.
    pub fn answer_all(
        &mut self,
        answers: &[usize],
    ) -> Result<(QuizResult, Vec<AnswerFeedback>), QuizError> {
        let expected = self.questions.len() - self.current;
        if answers.len() != expected {
            return Err(QuizError::AnswerCount {
                expected,
                answered: answers.len(),
            });
        }
        let mut feedback = Vec::with_capacity(answers.len());
        for &chosen in answers {
            let (question_id, correct_answer, explanation) = match self.current_question() {
                Some(q) => (q.id.clone(), q.correct_answer, q.explanation.clone()),
                None => return Err(QuizError::Finished),
            };
            let correct = self.answer(chosen)?;
            feedback.push(AnswerFeedback {
                question_id,
                chosen,
                correct,
                correct_answer,
                explanation,
            });
        }
        let result = QuizResult::new(self.correct, self.questions.len() as u32);
        Ok((result, feedback))
    }

    /// Final score, available once every question is answered.
    pub fn result(&self) -> Option<QuizResult> {
        self.is_finished()
            .then(|| QuizResult::new(self.correct, self.questions.len() as u32))
    }

    pub fn completion_item_id(&self) -> String {
        completion_item_id(&self.topic_id)
    }
}

/// Progress item id recorded when a topic quiz is finished, e.g. `quiz_materials`.
pub fn completion_item_id(topic_id: &str) -> String {
    format!("quiz_{topic_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                id: format!("q{i}"),
                question: format!("Question {i}"),
                options: vec!["a".into(), "b".into(), "c".into()],
                correct_answer: i % 3,
                explanation: String::new(),
            })
            .collect()
    }

    #[test]
    fn scores_and_passes_at_80_percent() {
        let mut session = QuizSession::new("materials", questions(5));
        // answer 4 of 5 correctly
        for i in 0..4 {
            assert!(session.answer(i % 3).unwrap());
        }
        assert!(session.result().is_none());
        assert!(!session.answer(0).unwrap());

        let result = session.result().unwrap();
        assert_eq!(result, QuizResult::new(4, 5));
        assert_eq!(result.score_percent, 80);
        assert!(result.passed(80));
        assert_eq!(result.badge(80), Some(BadgeType::QuizMaster));
        assert_eq!(session.completion_item_id(), "quiz_materials");
    }

    #[test]
    fn failing_score_earns_nothing() {
        let result = QuizResult::new(3, 5);
        assert_eq!(result.score_percent, 60);
        assert_eq!(result.badge(80), None);
    }

    #[test]
    fn just_under_pass_mark_fails() {
        let result = QuizResult::new(159, 200);
        // 79.5% displays as 80
        assert_eq!(result.score_percent, 80);
        assert!(!result.passed(80));
        assert_eq!(result.badge(80), None);

        assert!(QuizResult::new(160, 200).passed(80));
    }

    #[test]
    fn rejects_bad_option_and_answers_after_finish() {
        let mut session = QuizSession::new("intro", questions(1));
        assert!(matches!(
            session.answer(3),
            Err(QuizError::OptionOutOfRange { index: 3, .. })
        ));
        session.answer(0).unwrap();
        assert_eq!(session.answer(0), Err(QuizError::Finished));
    }

    #[test]
    fn answer_all_grades_with_feedback() {
        let mut session = QuizSession::new("intro", questions(4));
        let (result, feedback) = session.answer_all(&[0, 1, 2, 1]).unwrap();
        assert_eq!(result, QuizResult::new(3, 4));
        assert!(session.is_finished());
        assert_eq!(feedback.len(), 4);
        assert!(!feedback[3].correct);
        assert_eq!(feedback[3].correct_answer, 0);
        assert_eq!(feedback[3].question_id, "q3");
    }

    #[test]
    fn answer_all_checks_count_and_range() {
        let mut session = QuizSession::new("intro", questions(3));
        assert_eq!(
            session.answer_all(&[0, 1]),
            Err(QuizError::AnswerCount {
                expected: 3,
                answered: 2
            })
        );
        assert!(matches!(
            session.answer_all(&[0, 7, 1]),
            Err(QuizError::OptionOutOfRange { index: 7, .. })
        ));
    }

    #[test]
    fn prompt_hides_answer_key() {
        let q = &questions(1)[0];
        let prompt = QuestionPrompt::from(q);
        let json = serde_json::to_value(&prompt).unwrap();
        assert_eq!(json["options"].as_array().unwrap().len(), 3);
        assert!(json.get("correctAnswer").is_none());
        assert!(json.get("explanation").is_none());
    }

    #[test]
    fn empty_quiz_never_passes() {
        let session = QuizSession::new("empty", Vec::new());
        let result = session.result().unwrap();
        assert_eq!(result.score_percent, 0);
        assert!(!result.passed(0));
    }

    #[test]
    fn correct_count_is_capped_at_total() {
        assert_eq!(QuizResult::new(9, 4).correct, 4);
        assert_eq!(QuizResult::new(9, 4).score_percent, 100);
    }
}
