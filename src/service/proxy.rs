use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::error::GENERIC_GENERATE_ERROR;
use crate::generator::GeneratorClient;

/// 原样转发到出题服务，相当于前端开发服务器上的rewrite规则
pub(crate) async fn generate_questions(
    req: HttpRequest,
    body: web::Bytes,
    generator: web::Data<GeneratorClient>,
) -> HttpResponse {
    let mut upstream = generator.http().post(generator.endpoint().clone()).body(body);
    if let Some(content_type) = req.headers().get(header::CONTENT_TYPE) {
        if let Ok(content_type) = content_type.to_str() {
            upstream = upstream.header(reqwest::header::CONTENT_TYPE, content_type);
        }
    }

    let response = match upstream.send().await {
        Ok(response) => response,
        Err(e) => {
            log::error!("转发到出题服务失败: {e}");
            return HttpResponse::BadGateway().json(json!({"error": GENERIC_GENERATE_ERROR}));
        }
    };

    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/json")
        .to_string();
    match response.bytes().await {
        Ok(bytes) => HttpResponse::build(status).content_type(content_type).body(bytes),
        Err(e) => {
            log::error!("读取出题服务响应失败: {e}");
            HttpResponse::BadGateway().json(json!({"error": GENERIC_GENERATE_ERROR}))
        }
    }
}
