use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::WorkbenchError;
use crate::structs::alias::SessionId;
use crate::workbench::{Phase, Workbench};
use crate::workbench_server::WorkbenchServerHandle;

#[derive(Serialize)]
struct SessionView {
    id: SessionId,
    phase: Phase,
    can_score: bool,
    #[serde(flatten)]
    workbench: Workbench,
}

// 以JSON形式返回工作台当前状态
pub(crate) async fn get_session(
    path: web::Path<SessionId>,
    workbench: web::Data<WorkbenchServerHandle>,
) -> Result<HttpResponse, WorkbenchError> {
    let id = path.into_inner();
    let snapshot = workbench.snapshot(id).await?;
    Ok(HttpResponse::Ok().json(SessionView {
        id,
        phase: snapshot.phase(),
        can_score: snapshot.can_score(),
        workbench: snapshot,
    }))
}
