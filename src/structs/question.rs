use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::structs::alias::OptionTag;

/// 题目类型，序列化后的值与出题服务约定一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    Essay,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::Essay => "essay",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "multiple_choice" => Ok(QuestionType::MultipleChoice),
            "essay" => Ok(QuestionType::Essay),
            other => Err(ValidationError::UnknownQuestionType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub option: OptionTag,
    pub text: String,
}

/// 出题服务返回的单道题目
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<OptionTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    // 以下两项仅在问答题中出现
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<String>,
}

impl Question {
    pub fn choices(&self) -> &[Choice] {
        self.choices.as_deref().unwrap_or_default()
    }

    pub fn has_choice(&self, tag: &str) -> bool {
        self.choices().iter().any(|choice| choice.option == tag)
    }

    /// 选项是否为正确答案，题目没有标注答案时永远为false
    pub fn is_correct(&self, tag: &str) -> bool {
        self.correct_answer.as_deref() == Some(tag)
    }
}

/// 出题服务的响应体，`questions`和`error`都可能缺失
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_choice_response() {
        let body = r#"{
            "questions": [{
                "question": "2 + 2 = ?",
                "choices": [{"option": "A", "text": "3"}, {"option": "B", "text": "4"}],
                "correct_answer": "B",
                "explanation": "Dua ditambah dua adalah empat",
                "attempts": 1
            }]
        }"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        let questions = response.questions.unwrap();
        assert_eq!(questions.len(), 1);
        assert!(questions[0].has_choice("A"));
        assert!(!questions[0].has_choice("C"));
        assert!(questions[0].is_correct("B"));
        assert!(!questions[0].is_correct("A"));
        assert!(response.error.is_none());
    }

    #[test]
    fn parses_error_only_response() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"error": "Subjek dan tingkat pendidikan harus disertakan."}"#).unwrap();
        assert!(response.questions.is_none());
        assert_eq!(response.error.as_deref(), Some("Subjek dan tingkat pendidikan harus disertakan."));
    }

    #[test]
    fn essay_question_without_choices() {
        let question: Question = serde_json::from_str(
            r#"{"question": "Jelaskan fotosintesis", "sample_answer": "...", "rubric": "3 poin"}"#,
        )
        .unwrap();
        assert!(question.choices().is_empty());
        assert!(!question.is_correct("A"));
        assert_eq!(question.rubric.as_deref(), Some("3 poin"));
    }

    #[test]
    fn question_type_wire_names() {
        assert_eq!("essay".parse::<QuestionType>().unwrap(), QuestionType::Essay);
        assert_eq!(QuestionType::MultipleChoice.to_string(), "multiple_choice");
        assert!("pilihan ganda".parse::<QuestionType>().is_err());
    }
}
