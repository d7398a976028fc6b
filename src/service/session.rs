use actix_multipart::Multipart;
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpResponse};
use futures_util::{StreamExt, TryStreamExt};

use crate::config::Config;
use crate::error::{ValidationError, WorkbenchError};
use crate::generator::GeneratorClient;
use crate::service::pages::WorkbenchPage;
use crate::structs::alias::SessionId;
use crate::structs::form::{FormDraft, UploadedFile};
use crate::structs::submit::{AnswerRequest, EssayRequest};
use crate::workbench_server::WorkbenchServerHandle;

fn see_other(location: String) -> HttpResponse {
    HttpResponse::SeeOther().insert_header((header::LOCATION, location)).finish()
}

fn session_url(id: SessionId) -> String {
    format!("/session/{id}")
}

// 每次打开首页都分配一个新的工作台
pub(crate) async fn index(workbench: web::Data<WorkbenchServerHandle>) -> Result<HttpResponse, WorkbenchError> {
    let id = workbench.create().await?;
    Ok(see_other(session_url(id)))
}

pub(crate) async fn page(
    path: web::Path<SessionId>,
    workbench: web::Data<WorkbenchServerHandle>,
) -> Result<HttpResponse, WorkbenchError> {
    let id = path.into_inner();
    match workbench.snapshot(id).await {
        Ok(snapshot) => Ok(WorkbenchPage::new(id, &snapshot).respond(StatusCode::OK)),
        // 过期的工作台直接换一个新的
        Err(WorkbenchError::NoSuchSession(_)) => Ok(see_other("/".to_string())),
        Err(e) => Err(e),
    }
}

/// 读取浏览器提交的multipart表单
///
/// 文件超限时继续读完其余字段，表单内容仍可回填
pub(crate) async fn read_intake(
    mut payload: Multipart,
    max_upload_bytes: usize,
) -> (FormDraft, Result<Option<UploadedFile>, ValidationError>) {
    let mut draft = FormDraft {
        num_questions: String::new(),
        ..Default::default()
    };
    let mut file = None;
    let mut failure = None;

    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                failure = Some(ValidationError::MalformedUpload(e.to_string()));
                break;
            }
        };
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut data = Vec::new();
        let mut oversized = false;
        while let Some(chunk) = field.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    failure = Some(ValidationError::MalformedUpload(e.to_string()));
                    break;
                }
            };
            // 超限后只丢弃剩余数据
            if oversized || data.len() + chunk.len() > max_upload_bytes {
                oversized = true;
                continue;
            }
            data.extend_from_slice(&chunk);
        }
        if oversized {
            failure.get_or_insert(ValidationError::MalformedUpload(format!(
                "berkas melebihi batas {max_upload_bytes} byte"
            )));
            continue;
        }

        if name == "pdf_file" {
            file = Some(UploadedFile {
                file_name: file_name.unwrap_or_default(),
                content_type,
                bytes: data,
            });
            continue;
        }

        let value = match String::from_utf8(data) {
            Ok(value) => value,
            Err(_) => {
                failure.get_or_insert(ValidationError::MalformedUpload(format!("kolom {name} bukan UTF-8")));
                continue;
            }
        };
        match name.as_str() {
            "subject" => draft.subject = value,
            "level" => draft.level = value,
            "num_questions" => draft.num_questions = value,
            "question_type" => draft.question_type = value,
            "text" => draft.text = value,
            other => log::debug!("忽略未知表单字段{other}"),
        }
    }

    match failure {
        Some(e) => (draft, Err(e)),
        None => (draft, Ok(file)),
    }
}

// 提交表单，等待出题服务返回后跳回工作台页面
pub(crate) async fn generate(
    path: web::Path<SessionId>,
    payload: Multipart,
    workbench: web::Data<WorkbenchServerHandle>,
    generator: web::Data<GeneratorClient>,
    config: web::Data<Config>,
) -> Result<HttpResponse, WorkbenchError> {
    let id = path.into_inner();

    let (draft, file) = read_intake(payload, config.max_upload_bytes).await;
    let submission = match file.and_then(|file| draft.validate(file)) {
        Ok(submission) => submission,
        Err(e) => return rejected(id, draft, e, &workbench).await,
    };

    match workbench
        .begin_submit(id, draft, submission.params.question_type)
        .await
    {
        Ok(()) => {}
        Err(WorkbenchError::AlreadySubmitting) => return busy(id, &workbench).await,
        Err(e) => return Err(e),
    }

    // 请求和resolve放在独立任务中，客户端断开导致handler被丢弃时也会执行完
    let handle = workbench.get_ref().clone();
    let generator = generator.get_ref().clone();
    let task = actix_web::rt::spawn(async move {
        let result = generator.generate(&submission).await;
        handle.resolve(id, result).await
    });
    match task.await {
        Ok(resolved) => resolved?,
        Err(e) => {
            log::error!("工作台{id}的出题任务异常结束: {e}");
            return Err(WorkbenchError::ServerClosed);
        }
    }
    Ok(see_other(format!("{}#results", session_url(id))))
}

async fn busy(id: SessionId, workbench: &WorkbenchServerHandle) -> Result<HttpResponse, WorkbenchError> {
    log::info!("工作台{id}重复提交，已忽略");
    let snapshot = workbench.snapshot(id).await?;
    Ok(WorkbenchPage::new(id, &snapshot).respond(StatusCode::CONFLICT))
}

async fn rejected(
    id: SessionId,
    draft: FormDraft,
    reason: ValidationError,
    workbench: &WorkbenchServerHandle,
) -> Result<HttpResponse, WorkbenchError> {
    log::info!("工作台{id}表单校验失败: {reason}");
    match workbench.reject(id, draft, reason.to_string()).await {
        Ok(()) => {}
        Err(WorkbenchError::AlreadySubmitting) => return busy(id, workbench).await,
        Err(e) => return Err(e),
    }
    let snapshot = workbench.snapshot(id).await?;
    Ok(WorkbenchPage::new(id, &snapshot).respond(StatusCode::BAD_REQUEST))
}

pub(crate) async fn answer(
    path: web::Path<SessionId>,
    form: web::Form<AnswerRequest>,
    workbench: web::Data<WorkbenchServerHandle>,
) -> Result<HttpResponse, WorkbenchError> {
    let id = path.into_inner();
    let AnswerRequest { question, option } = form.into_inner();
    workbench.select_choice(id, question, option).await?;
    Ok(see_other(format!("{}#q{question}", session_url(id))))
}

pub(crate) async fn essay(
    path: web::Path<SessionId>,
    form: web::Form<EssayRequest>,
    workbench: web::Data<WorkbenchServerHandle>,
) -> Result<HttpResponse, WorkbenchError> {
    let id = path.into_inner();
    let EssayRequest { question, text } = form.into_inner();
    workbench.write_essay(id, question, text).await?;
    Ok(see_other(format!("{}#q{question}", session_url(id))))
}

pub(crate) async fn score(
    path: web::Path<SessionId>,
    workbench: web::Data<WorkbenchServerHandle>,
) -> Result<HttpResponse, WorkbenchError> {
    let id = path.into_inner();
    let score = workbench.score(id).await?;
    log::debug!("工作台{id}得分{}/{}", score.score, score.total);
    Ok(see_other(format!("{}#score", session_url(id))))
}
