use reqwest::multipart::{Form, Part as FormPart};
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::{ConfigError, GenerateError};
use crate::structs::form::{Part, Submission};
use crate::structs::question::GenerateResponse;

/// 出题服务客户端
#[derive(Debug, Clone)]
pub struct GeneratorClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl GeneratorClient {
    pub fn new(upstream: &UpstreamConfig) -> Result<GeneratorClient, ConfigError> {
        let endpoint = upstream.endpoint()?;
        let http = reqwest::Client::builder()
            .timeout(upstream.timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(GeneratorClient { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// 发送一次出题请求
    ///
    /// 不检查HTTP状态码，只要响应体是合法JSON就交给上层渲染，
    /// 出题服务在出错时同样会返回带`error`字段的JSON
    pub async fn generate(&self, submission: &Submission) -> Result<GenerateResponse, GenerateError> {
        let form = build_form(submission)?;
        log::info!(
            "请求出题服务: {} 科目={} 数量={} 题型={}",
            self.endpoint,
            submission.params.subject,
            submission.params.num_questions,
            submission.params.question_type
        );
        let response = self.http.post(self.endpoint.clone()).multipart(form).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            log::warn!("出题服务返回HTTP {status}");
        }
        serde_json::from_slice::<GenerateResponse>(&body).map_err(|source| GenerateError::Decode {
            status: status.as_u16(),
            source,
        })
    }
}

fn build_form(submission: &Submission) -> Result<Form, GenerateError> {
    let mut form = Form::new();
    for (name, part) in submission.parts() {
        form = match part {
            Part::Text(value) => form.text(name, value),
            Part::File { file_name, content_type, bytes } => {
                let mut file_part = FormPart::bytes(bytes).file_name(file_name);
                if let Some(mime) = content_type {
                    file_part = file_part.mime_str(&mime)?;
                }
                form.part(name, file_part)
            }
        };
    }
    Ok(form)
}
