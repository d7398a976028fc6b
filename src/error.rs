use thiserror::Error;

use crate::structs::alias::{QuestionIndex, SessionId};

/// 请求失败时展示给用户的统一提示，具体原因只写入日志
pub const GENERIC_GENERATE_ERROR: &str = "An error occurred while generating questions.";

/// 表单校验失败，此时不会向出题服务发送请求
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Mata pelajaran wajib diisi")]
    MissingSubject,
    #[error("Tingkat pendidikan wajib diisi")]
    MissingLevel,
    #[error("Jumlah pertanyaan harus bilangan bulat positif, bukan '{0}'")]
    InvalidQuestionCount(String),
    #[error("Jenis pertanyaan tidak dikenal: '{0}'")]
    UnknownQuestionType(String),
    #[error("Unggahan tidak dapat dibaca: {0}")]
    MalformedUpload(String),
}

/// 调用出题服务时出现的错误
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("请求出题服务失败: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("出题服务返回了无法解析的内容 (HTTP {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkbenchError {
    #[error("工作台{0}不存在或已过期")]
    NoSuchSession(SessionId),
    #[error("上一次出题请求尚未完成")]
    AlreadySubmitting,
    #[error("尚未收到题目")]
    NoQuestions,
    #[error("第{0}题不存在")]
    QuestionOutOfRange(QuestionIndex),
    #[error("第{question}题没有选项'{option}'")]
    UnknownOption { question: QuestionIndex, option: String },
    #[error("当前题目不是选择题")]
    NotMultipleChoice,
    #[error("当前题目不是问答题")]
    NotEssay,
    #[error("工作台服务已关闭")]
    ServerClosed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("配置文件格式错误: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("出题服务地址无效 '{url}': {source}")]
    InvalidUpstream {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("创建HTTP客户端失败: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("配置项{0}无效")]
    Invalid(&'static str),
}

impl actix_web::ResponseError for WorkbenchError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            WorkbenchError::NoSuchSession(_) => StatusCode::NOT_FOUND,
            WorkbenchError::QuestionOutOfRange(_) | WorkbenchError::UnknownOption { .. } => StatusCode::BAD_REQUEST,
            WorkbenchError::AlreadySubmitting
            | WorkbenchError::NoQuestions
            | WorkbenchError::NotMultipleChoice
            | WorkbenchError::NotEssay => StatusCode::CONFLICT,
            WorkbenchError::ServerClosed => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::build(self.status_code()).json(serde_json::json!({
            "code": self.status_code().as_u16(),
            "msg": self.to_string(),
        }))
    }
}
