use serde::{Deserialize, Serialize};

use crate::structs::alias::{OptionTag, QuestionIndex};

// 用户点选某个选项时提交的表单
#[derive(Deserialize, Debug)]
pub struct AnswerRequest {
    pub(crate) question: QuestionIndex,
    pub(crate) option: OptionTag,
}

// 问答题作答内容
#[derive(Deserialize, Debug)]
pub struct EssayRequest {
    pub(crate) question: QuestionIndex,
    #[serde(default)]
    pub(crate) text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreResponse {
    pub(crate) score: usize,
    pub(crate) total: usize,
}
