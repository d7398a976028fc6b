use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::structs::question::QuestionType;

/// 用户在表单中填写的原始内容，校验失败或请求失败时原样回填
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDraft {
    pub subject: String,
    pub level: String,
    pub num_questions: String,
    pub question_type: String,
    pub text: String,
}

impl Default for FormDraft {
    fn default() -> Self {
        FormDraft {
            subject: String::new(),
            level: String::new(),
            num_questions: "1".to_string(),
            question_type: QuestionType::default().as_str().to_string(),
            text: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// 出题素材，文件与文本互斥
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    File(UploadedFile),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormParams {
    pub subject: String,
    pub level: String,
    pub num_questions: u32,
    pub question_type: QuestionType,
}

/// 通过校验、可以发送的一次提交
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub params: FormParams,
    pub payload: Option<Payload>,
}

impl FormDraft {
    /// 校验必填项并挑选素材：有文件时只发送文件，否则发送非空文本
    pub fn validate(&self, file: Option<UploadedFile>) -> Result<Submission, ValidationError> {
        let subject = self.subject.trim();
        if subject.is_empty() {
            return Err(ValidationError::MissingSubject);
        }
        let level = self.level.trim();
        if level.is_empty() {
            return Err(ValidationError::MissingLevel);
        }
        let num_questions = match self.num_questions.trim().parse::<u32>() {
            Ok(n) if n >= 1 => n,
            _ => return Err(ValidationError::InvalidQuestionCount(self.num_questions.clone())),
        };
        let question_type = self.question_type.parse::<QuestionType>()?;

        let payload = match file {
            Some(file) if !file.file_name.is_empty() => Some(Payload::File(file)),
            _ if !self.text.trim().is_empty() => Some(Payload::Text(self.text.clone())),
            _ => None,
        };

        Ok(Submission {
            params: FormParams {
                subject: subject.to_string(),
                level: level.to_string(),
                num_questions,
                question_type,
            },
            payload,
        })
    }
}

/// multipart中的一个字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    File {
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl Submission {
    /// 按发送顺序列出multipart字段
    pub fn parts(&self) -> Vec<(&'static str, Part)> {
        let mut parts = vec![
            ("subject", Part::Text(self.params.subject.clone())),
            ("level", Part::Text(self.params.level.clone())),
            ("num_questions", Part::Text(self.params.num_questions.to_string())),
            ("question_type", Part::Text(self.params.question_type.as_str().to_string())),
        ];
        match &self.payload {
            Some(Payload::File(file)) => parts.push((
                "pdf_file",
                Part::File {
                    file_name: file.file_name.clone(),
                    content_type: file.content_type.clone(),
                    bytes: file.bytes.clone(),
                },
            )),
            Some(Payload::Text(text)) => parts.push(("text", Part::Text(text.clone()))),
            None => {}
        }
        parts
    }
}
