//! Serves stored report photos at `GET /uploads/{fileName}`.

use actix_web::http::header::{self, CacheDirective};
use actix_web::{HttpResponse, get, web};

use crate::domain::Error;

use super::ApiResult;
use super::schemas::ErrorSchema;
use super::state::HttpState;

/// Return the bytes of a stored photo.
#[utoipa::path(
    get,
    path = "/uploads/{fileName}",
    params(("fileName" = String, Path, description = "Stored photo name, `<uuid>.<ext>`")),
    responses(
        (status = 200, description = "Photo bytes", content_type = "image/*"),
        (status = 404, description = "No such photo", body = ErrorSchema),
        (status = 500, description = "Storage failure", body = ErrorSchema)
    ),
    tags = ["uploads"],
    operation_id = "getUpload",
    security([])
)]
#[get("/uploads/{file_name}")]
pub async fn get_upload(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let file_name = path.into_inner();
    let photo = state
        .photos
        .fetch(&file_name)
        .await
        .map_err(|err| Error::internal("Failed to read photo.").with_context("get upload", err))?
        .ok_or_else(|| {
            Error::not_found("Photo not found.").with_context("get upload", &file_name)
        })?;

    Ok(HttpResponse::Ok()
        .content_type(photo.content_type)
        .insert_header(header::CacheControl(vec![
            CacheDirective::Public,
            CacheDirective::MaxAge(86_400),
        ]))
        .body(photo.bytes))
}
