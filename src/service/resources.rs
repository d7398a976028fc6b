use std::path::{Component, PathBuf};

use actix_files::NamedFile;
use actix_web::{error, web};

pub const RESOURCE_DIR: &str = "resources/";

// 静态资源，只允许访问resources目录下的文件
pub(crate) async fn resources(filename: web::Path<String>) -> actix_web::Result<NamedFile> {
    let filename = PathBuf::from(filename.into_inner());
    if filename.components().any(|c| !matches!(c, Component::Normal(_))) {
        return Err(error::ErrorNotFound("no such resource"));
    }
    let mut path = PathBuf::from(RESOURCE_DIR);
    path.push(filename);
    Ok(NamedFile::open(path)?)
}
