use actix_web::web;

pub(crate) mod api;
pub(crate) mod pages;
pub(crate) mod proxy;
pub(crate) mod resources;
pub(crate) mod session;

/// 注册所有路由，main和测试共用
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(session::index))
        .route("/generate-questions", web::post().to(proxy::generate_questions))
        .route("/resources/{filename:.*}", web::get().to(resources::resources))
        .service(
            web::scope("/session/{id}")
                .route("", web::get().to(session::page))
                .route("/generate", web::post().to(session::generate))
                .route("/answer", web::post().to(session::answer))
                .route("/essay", web::post().to(session::essay))
                .route("/score", web::post().to(session::score)),
        )
        .service(web::scope("/api").route("/session/{id}", web::get().to(api::get_session)));
}
