use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{GenerateError, WorkbenchError, GENERIC_GENERATE_ERROR};
use crate::structs::alias::{OptionTag, QuestionIndex};
use crate::structs::form::FormDraft;
use crate::structs::question::{GenerateResponse, Question, QuestionType};
use crate::structs::submit::ScoreResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Rendering,
    Scored,
}

/// 单道题的作答记录
///
/// 选择题的对错在选中时根据题目答案算出，外部只能读取
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    Choice { selected: OptionTag, is_correct: bool },
    Essay { text: String },
}

impl Answer {
    pub fn is_correct(&self) -> bool {
        matches!(self, Answer::Choice { is_correct: true, .. })
    }
}

/// 一位访问者的表单、题目和作答状态
#[derive(Debug, Clone, Serialize)]
pub struct Workbench {
    draft: FormDraft,
    loading: bool,
    validation_error: Option<String>,
    // 出题时的题型，渲染以它为准而不是表单的当前值
    question_type: Option<QuestionType>,
    #[serde(skip)]
    pending_type: Option<QuestionType>,
    // 请求失败时response里只有统一提示
    failed: bool,
    response: Option<GenerateResponse>,
    answers: BTreeMap<QuestionIndex, Answer>,
    score: Option<ScoreResponse>,
}

impl Default for Workbench {
    fn default() -> Self {
        Workbench::new()
    }
}

impl Workbench {
    pub fn new() -> Self {
        Workbench {
            draft: FormDraft::default(),
            loading: false,
            validation_error: None,
            question_type: None,
            pending_type: None,
            failed: false,
            response: None,
            answers: BTreeMap::new(),
            score: None,
        }
    }

    /// 收到可解析的响应即进入渲染，即使其中没有`questions`；请求失败时仍为Idle
    pub fn phase(&self) -> Phase {
        match (&self.response, self.score) {
            (None, _) => Phase::Idle,
            (Some(_), _) if self.failed => Phase::Idle,
            (Some(_), None) => Phase::Rendering,
            (Some(_), Some(_)) => Phase::Scored,
        }
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    pub fn question_type(&self) -> Option<QuestionType> {
        self.question_type
    }

    pub fn questions(&self) -> &[Question] {
        self.response
            .as_ref()
            .and_then(|response| response.questions.as_deref())
            .unwrap_or_default()
    }

    /// 结果区域要显示的错误，请求失败时为统一提示
    pub fn error_message(&self) -> Option<&str> {
        self.response.as_ref().and_then(|response| response.error.as_deref())
    }

    pub fn answers(&self) -> &BTreeMap<QuestionIndex, Answer> {
        &self.answers
    }

    pub fn answer(&self, index: QuestionIndex) -> Option<&Answer> {
        self.answers.get(&index)
    }

    pub fn score(&self) -> Option<ScoreResponse> {
        self.score
    }

    /// 计分按钮只对选择题且收到了题目列表时出现
    pub fn can_score(&self) -> bool {
        self.question_type == Some(QuestionType::MultipleChoice)
            && self.response.as_ref().is_some_and(|r| r.questions.is_some())
    }

    /// 记录校验失败，表单内容保留，不发出请求
    ///
    /// 请求进行中时拒绝，不覆盖正在提交的表单
    pub fn reject(&mut self, draft: FormDraft, reason: String) -> Result<(), WorkbenchError> {
        if self.loading {
            return Err(WorkbenchError::AlreadySubmitting);
        }
        self.draft = draft;
        self.validation_error = Some(reason);
        Ok(())
    }

    /// 开始一次提交，请求结束前再次提交会被拒绝
    pub fn begin_submit(&mut self, draft: FormDraft, question_type: QuestionType) -> Result<(), WorkbenchError> {
        if self.loading {
            return Err(WorkbenchError::AlreadySubmitting);
        }
        self.draft = draft;
        self.validation_error = None;
        self.loading = true;
        self.pending_type = Some(question_type);
        Ok(())
    }

    /// 请求结束，无论成功失败都解除loading
    pub fn resolve(&mut self, result: Result<GenerateResponse, GenerateError>) {
        self.loading = false;
        self.failed = result.is_err();
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                log::warn!("出题请求失败: {e}");
                GenerateResponse {
                    error: Some(GENERIC_GENERATE_ERROR.to_string()),
                    ..Default::default()
                }
            }
        };
        self.question_type = self.pending_type.take();
        self.response = Some(response);
        self.answers.clear();
        self.score = None;
    }

    /// 选中某个选项并立即判定对错，返回是否正确
    pub fn select_choice(&mut self, index: QuestionIndex, option: &str) -> Result<bool, WorkbenchError> {
        if self.question_type != Some(QuestionType::MultipleChoice) {
            return Err(WorkbenchError::NotMultipleChoice);
        }
        let question = self.question(index)?;
        if !question.has_choice(option) {
            return Err(WorkbenchError::UnknownOption {
                question: index,
                option: option.to_string(),
            });
        }
        let is_correct = question.is_correct(option);
        self.answers.insert(
            index,
            Answer::Choice {
                selected: option.to_string(),
                is_correct,
            },
        );
        Ok(is_correct)
    }

    pub fn write_essay(&mut self, index: QuestionIndex, text: String) -> Result<(), WorkbenchError> {
        if self.question_type != Some(QuestionType::Essay) {
            return Err(WorkbenchError::NotEssay);
        }
        self.question(index)?;
        self.answers.insert(index, Answer::Essay { text });
        Ok(())
    }

    /// 统计当前答对的题数，分母为返回的题目总数
    pub fn calculate_score(&mut self) -> Result<ScoreResponse, WorkbenchError> {
        if self.question_type != Some(QuestionType::MultipleChoice) {
            return Err(WorkbenchError::NotMultipleChoice);
        }
        if !self.can_score() {
            return Err(WorkbenchError::NoQuestions);
        }
        let score = ScoreResponse {
            score: self.answers.values().filter(|answer| answer.is_correct()).count(),
            total: self.questions().len(),
        };
        self.score = Some(score);
        Ok(score)
    }

    fn question(&self, index: QuestionIndex) -> Result<&Question, WorkbenchError> {
        if self.response.is_none() {
            return Err(WorkbenchError::NoQuestions);
        }
        self.questions()
            .get(index)
            .ok_or(WorkbenchError::QuestionOutOfRange(index))
    }
}
