use actix_web::{middleware, web, App, HttpServer};
use lazy_static::lazy_static;

mod config;
mod error;
mod generator;
mod service;
mod structs;
mod workbench;
mod workbench_server;

use crate::config::{Config, CONFIG_FILE};
use crate::generator::GeneratorClient;
use crate::workbench_server::WorkbenchServer;

lazy_static! {
    pub static ref CONFIG: Config = match Config::load(CONFIG_FILE) {
        Ok(config) => config,
        Err(e) => panic!("加载配置文件失败: {e}"),
    };
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config: Config = CONFIG.clone();
    let generator = match GeneratorClient::new(&config.upstream) {
        Ok(generator) => generator,
        Err(e) => panic!("出题服务配置无效: {e}"),
    };
    log::info!("出题服务地址: {}", generator.endpoint());

    // 启动工作台服务
    let (workbench_server, workbench_handle) = WorkbenchServer::new(config.session_ttl());
    actix_web::rt::spawn(async move {
        if let Err(e) = workbench_server.run().await {
            log::error!("工作台服务意外退出: {e}");
        }
    });

    let bind = config.bind.clone();
    // 转发原始请求体时允许的大小，略大于上传上限以容纳其余字段
    let payload_limit = config.max_upload_bytes + 64 * 1024;
    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(workbench_handle.clone()))
            .app_data(web::Data::new(generator.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::PayloadConfig::new(payload_limit))
            .configure(service::configure)
    })
    .bind(&bind)?
    .run();
    log::info!("HTTP服务启动成功，监听{bind}");
    server.await
}
