use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use askama::Template;

use crate::structs::alias::SessionId;
use crate::structs::form::FormDraft;
use crate::structs::question::{Question, QuestionType};
use crate::structs::submit::ScoreResponse;
use crate::workbench::{Answer, Workbench};

pub struct ChoiceView {
    pub option: String,
    pub text: String,
    pub checked: bool,
}

pub struct FeedbackView {
    pub correct: bool,
    pub message: String,
}

pub struct QuestionView {
    pub index: usize,
    pub number: usize,
    pub prompt: String,
    pub choices: Vec<ChoiceView>,
    pub feedback: Option<FeedbackView>,
    pub essay_text: Option<String>,
    pub sample_answer: Option<String>,
    pub rubric: Option<String>,
}

/// 表单和出题结果在同一页面
#[derive(Template)]
#[template(path = "workbench.html")]
pub struct WorkbenchPage {
    pub session: String,
    pub draft: FormDraft,
    pub essay_selected: bool,
    pub loading: bool,
    pub validation_error: Option<String>,
    pub has_response: bool,
    pub error_message: Option<String>,
    pub questions: Vec<QuestionView>,
    pub can_score: bool,
    pub score: Option<ScoreResponse>,
}

impl WorkbenchPage {
    pub fn new(id: SessionId, workbench: &Workbench) -> WorkbenchPage {
        let question_type = workbench.question_type();
        let questions = workbench
            .questions()
            .iter()
            .enumerate()
            .map(|(index, question)| question_view(index, question, question_type, workbench.answer(index)))
            .collect();

        WorkbenchPage {
            session: id.to_string(),
            draft: workbench.draft().clone(),
            essay_selected: workbench.draft().question_type == QuestionType::Essay.as_str(),
            loading: workbench.is_loading(),
            validation_error: workbench.validation_error().map(str::to_string),
            has_response: workbench.question_type().is_some(),
            error_message: workbench.error_message().map(str::to_string),
            questions,
            can_score: workbench.can_score(),
            score: workbench.score(),
        }
    }

    pub fn respond(&self, status: StatusCode) -> HttpResponse {
        match self.render() {
            Ok(html) => HttpResponse::build(status).content_type("text/html; charset=utf-8").body(html),
            Err(e) => {
                log::error!("渲染页面失败: {e}");
                HttpResponse::InternalServerError().finish()
            }
        }
    }
}

fn question_view(
    index: usize,
    question: &Question,
    question_type: Option<QuestionType>,
    answer: Option<&Answer>,
) -> QuestionView {
    let selected = match answer {
        Some(Answer::Choice { selected, .. }) => Some(selected.as_str()),
        _ => None,
    };
    // 问答题即使带有choices也不渲染单选框
    let choices = match question_type {
        Some(QuestionType::MultipleChoice) => question
            .choices()
            .iter()
            .map(|choice| ChoiceView {
                option: choice.option.clone(),
                text: choice.text.clone(),
                checked: selected == Some(choice.option.as_str()),
            })
            .collect(),
        _ => Vec::new(),
    };

    // 对错提示只在选择题中显示，与计分无关
    let feedback = match (question_type, answer) {
        (Some(QuestionType::MultipleChoice), Some(Answer::Choice { is_correct: true, .. })) => Some(FeedbackView {
            correct: true,
            message: "Correct!".to_string(),
        }),
        (Some(QuestionType::MultipleChoice), Some(Answer::Choice { is_correct: false, .. })) => Some(FeedbackView {
            correct: false,
            message: format!("Incorrect! {}", question.explanation.as_deref().unwrap_or_default())
                .trim_end()
                .to_string(),
        }),
        _ => None,
    };

    let essay = question_type == Some(QuestionType::Essay);
    let essay_text = match answer {
        Some(Answer::Essay { text }) => Some(text.clone()),
        _ if essay => Some(String::new()),
        _ => None,
    };

    QuestionView {
        index,
        number: index + 1,
        prompt: question.question.clone(),
        choices,
        feedback,
        essay_text,
        sample_answer: question.sample_answer.clone().filter(|_| essay),
        rubric: question.rubric.clone().filter(|_| essay),
    }
}
