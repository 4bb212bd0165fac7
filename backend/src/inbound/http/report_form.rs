//! Streaming reader for the multipart report submission form.
//!
//! Text fields: `userId`, `name`, `status`, `rawSituation`. File fields:
//! zero or more `photos`. Unknown fields are drained and ignored. The whole
//! form, files included, may not exceed [`MAX_FORM_BYTES`].

use actix_multipart::Multipart;
use futures_util::StreamExt;

use crate::domain::PhotoUpload;

/// Upper bound on the summed size of every multipart field.
pub const MAX_FORM_BYTES: usize = 10 << 20;

const PHOTOS_FIELD: &str = "photos";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum FormError {
    #[error("malformed multipart body: {0}")]
    Multipart(String),
    #[error("form exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("field `{field}` is not valid UTF-8")]
    NotUtf8 { field: &'static str },
}

/// Values collected from the form, prior to domain validation.
#[derive(Debug, Default)]
pub(crate) struct ReportForm {
    pub user_id: Option<String>,
    pub name: String,
    pub status: String,
    pub raw_situation: String,
    pub photos: Vec<PhotoUpload>,
}

pub(crate) async fn read_report_form(mut payload: Multipart) -> Result<ReportForm, FormError> {
    let mut form = ReportForm::default();
    let mut total = 0_usize;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|err| FormError::Multipart(err.to_string()))?;
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);
        let content_type = field.content_type().map(|mime| mime.essence_str().to_owned());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|err| FormError::Multipart(err.to_string()))?;
            total += chunk.len();
            if total > MAX_FORM_BYTES {
                return Err(FormError::TooLarge {
                    limit: MAX_FORM_BYTES,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_str() {
            PHOTOS_FIELD => form.photos.push(PhotoUpload {
                file_name,
                content_type,
                bytes,
            }),
            "userId" => form.user_id = Some(text(bytes, "userId")?),
            "name" => form.name = text(bytes, "name")?,
            "status" => form.status = text(bytes, "status")?,
            "rawSituation" => form.raw_situation = text(bytes, "rawSituation")?,
            _ => {}
        }
    }

    Ok(form)
}

fn text(bytes: Vec<u8>, field: &'static str) -> Result<String, FormError> {
    String::from_utf8(bytes).map_err(|_| FormError::NotUtf8 { field })
}
