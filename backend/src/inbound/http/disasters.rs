//! Disaster report handlers.
//!
//! ```text
//! GET  /api/v1/disaster-reports                              (session)
//! GET  /api/v1/reporters/{reporterId}/disaster-reports
//! POST /api/v1/disaster-reports                              multipart
//! POST /api/v1/disaster-reports/json                         JSON
//! POST /api/v1/disaster-reports/{reporterId}/responder       (session)
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpRequest, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    CitizenStatus, DisasterReport, Error, NewDisasterReport, ReportSubmissionError, ReporterId,
    ResponderAssignment, SetResponder,
};

use super::ApiResult;
use super::auth::{AuthenticatedSession, RequireSession};
use super::envelope::ApiResponse;
use super::json::{decode_json, invalid_field};
use super::report_form::{MAX_FORM_BYTES, read_report_form};
use super::schemas::ErrorSchema;
use super::state::HttpState;

const LIST_FAILED: &str = "Failed to get disaster reports.";
const LISTED: &str = "Successfully fetched disaster reports.";
const CREATE_FAILED: &str = "Failed to create disaster report.";
const CREATED: &str = "Successfully created disaster report.";
const FORM_INVALID: &str = "Failed to parse disaster report form data.";

/// JSON report submission; photos must already be hosted.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    /// Reporter id; omitted or blank for anonymous reports.
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    #[schema(value_type = crate::inbound::http::schemas::CitizenStatusSchema)]
    pub status: CitizenStatus,
    #[serde(default)]
    pub raw_situation: String,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

/// Multipart form accepted by `POST /api/v1/disaster-reports`.
#[derive(utoipa::ToSchema)]
#[schema(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct CreateReportForm {
    user_id: Option<String>,
    name: String,
    #[schema(value_type = crate::inbound::http::schemas::CitizenStatusSchema)]
    status: String,
    raw_situation: Option<String>,
    #[schema(value_type = Vec<String>, format = Binary)]
    photos: Vec<Vec<u8>>,
}

/// Body of the responder assignment request.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetResponderRequest {
    pub reporter_id: String,
    pub responder_id: String,
}

fn parse_path_reporter(raw: &str, operation: &'static str) -> Result<ReporterId, Error> {
    ReporterId::new(raw).map_err(|err| invalid_field("Invalid reporter ID.", operation, &err))
}

/// List every report, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/disaster-reports",
    responses(
        (status = 200, description = "Reports", body = crate::inbound::http::schemas::ReportListEnvelope),
        (status = 401, description = "No valid session", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["disaster-reports"],
    operation_id = "listDisasterReports",
    security(("SessionCookie" = []))
)]
#[get("/disaster-reports", wrap = "RequireSession")]
pub async fn list_disaster_reports(
    state: web::Data<HttpState>,
    session: AuthenticatedSession,
) -> ApiResult<ApiResponse<Vec<DisasterReport>>> {
    debug!(subject = %session.0.principal.subject(), "listing all disaster reports");
    let reports = state
        .reports
        .list()
        .await
        .map_err(|err| Error::internal(LIST_FAILED).with_context("list disaster reports", err))?;
    Ok(ApiResponse::ok(LISTED, reports))
}

/// List one reporter's reports, newest first. Empty when there are none.
#[utoipa::path(
    get,
    path = "/api/v1/reporters/{reporterId}/disaster-reports",
    params(("reporterId" = String, Path, description = "Reporter identifier")),
    responses(
        (status = 200, description = "Reports", body = crate::inbound::http::schemas::ReportListEnvelope),
        (status = 400, description = "Invalid reporter id", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["disaster-reports"],
    operation_id = "listDisasterReportsByReporter",
    security([])
)]
#[get("/reporters/{reporter_id}/disaster-reports")]
pub async fn list_disaster_reports_by_reporter(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<ApiResponse<Vec<DisasterReport>>> {
    const OP: &str = "list disaster reports by reporter";
    let reporter_id = parse_path_reporter(&path, OP)?;
    let reports = state
        .reports
        .list_by_reporter(&reporter_id)
        .await
        .map_err(|err| Error::internal(LIST_FAILED).with_context(OP, err))?;
    Ok(ApiResponse::ok(LISTED, reports))
}

/// File a report from a JSON body.
#[utoipa::path(
    post,
    path = "/api/v1/disaster-reports/json",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report created", body = crate::inbound::http::schemas::ReportEnvelope),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["disaster-reports"],
    operation_id = "createDisasterReportJson",
    security([])
)]
#[post("/disaster-reports/json")]
pub async fn create_disaster_report_json(
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<ApiResponse<DisasterReport>> {
    const OP: &str = "create disaster report";

    let request: CreateReportRequest = decode_json(&body, OP, CREATE_FAILED)?;
    let reporter_id = ReporterId::optional(request.user_id.as_deref())
        .map_err(|err| invalid_field(CREATE_FAILED, OP, &err))?;
    let report =
        NewDisasterReport::try_new(reporter_id, &request.name, request.status, request.raw_situation)
            .map_err(|err| invalid_field(CREATE_FAILED, OP, &err))?
            .with_photo_urls(request.photo_urls);

    let created = state
        .reports
        .create(&report)
        .await
        .map_err(|err| Error::internal(CREATE_FAILED).with_context(OP, err))?;
    Ok(ApiResponse::created_with(CREATED, created))
}

/// File a report from a multipart form, storing attached photos first.
///
/// Photos upload one at a time in form order. If any upload fails nothing is
/// persisted and photos already stored for this request are removed.
#[utoipa::path(
    post,
    path = "/api/v1/disaster-reports",
    request_body(content = CreateReportForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Report created", body = crate::inbound::http::schemas::ReportEnvelope),
        (status = 400, description = "Malformed or oversized form", body = ErrorSchema),
        (status = 500, description = "Upload or persistence failed", body = ErrorSchema)
    ),
    tags = ["disaster-reports"],
    operation_id = "createDisasterReport",
    security([])
)]
#[post("/disaster-reports")]
pub async fn create_disaster_report(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: Multipart,
) -> ApiResult<ApiResponse<DisasterReport>> {
    const OP: &str = "create disaster report";

    let declared = req
        .headers()
        .get(actix_web::http::header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared.is_some_and(|len| len > MAX_FORM_BYTES) {
        return Err(Error::invalid_request(FORM_INVALID)
            .with_context(OP, format!("content length exceeds {MAX_FORM_BYTES} bytes")));
    }

    let form = read_report_form(payload)
        .await
        .map_err(|err| Error::invalid_request(FORM_INVALID).with_context(OP, err))?;
    let status = form
        .status
        .trim()
        .parse::<CitizenStatus>()
        .map_err(|err| invalid_field(FORM_INVALID, OP, &err))?;
    let reporter_id = ReporterId::optional(form.user_id.as_deref())
        .map_err(|err| invalid_field(FORM_INVALID, OP, &err))?;
    let report = NewDisasterReport::try_new(reporter_id, &form.name, status, form.raw_situation)
        .map_err(|err| invalid_field(FORM_INVALID, OP, &err))?;

    let created = state
        .submissions
        .submit(report, &form.photos)
        .await
        .map_err(|err| match err {
            ReportSubmissionError::Upload { .. } => {
                Error::internal("Failed to upload photo.").with_context(OP, err)
            }
            ReportSubmissionError::Persist(_) => {
                Error::internal(CREATE_FAILED).with_context(OP, err)
            }
        })?;
    Ok(ApiResponse::created_with(CREATED, created))
}

/// Assign a responder to every report of a reporter.
///
/// Every failure answers `400`, including storage errors.
#[utoipa::path(
    post,
    path = "/api/v1/disaster-reports/{reporterId}/responder",
    params(("reporterId" = String, Path, description = "Reporter identifier")),
    request_body = SetResponderRequest,
    responses(
        (status = 200, description = "Responder assigned", body = crate::inbound::http::schemas::ResponderAssignmentEnvelope),
        (status = 400, description = "Mismatched ids or assignment failed", body = ErrorSchema),
        (status = 401, description = "No valid session", body = ErrorSchema)
    ),
    tags = ["disaster-reports"],
    operation_id = "setResponder",
    security(("SessionCookie" = []))
)]
#[post("/disaster-reports/{reporter_id}/responder", wrap = "RequireSession")]
pub async fn set_responder(
    state: web::Data<HttpState>,
    session: AuthenticatedSession,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<ApiResponse<ResponderAssignment>> {
    const OP: &str = "set responder";

    let request: SetResponder = decode_json(&body, OP, "Invalid set responder request.")?;
    if path.trim() != request.reporter_id.as_str() {
        return Err(Error::invalid_request("Reporter ID in path and body doesn't match.")
            .with_context(
                OP,
                format!("path `{}` body `{}`", path.as_str(), request.reporter_id),
            ));
    }

    debug!(
        subject = %session.0.principal.subject(),
        reporter_id = %request.reporter_id,
        responder_id = %request.responder_id,
        "assigning responder"
    );
    let assignment = state
        .reports
        .set_responder(&request)
        .await
        .map_err(|err| Error::invalid_request("Failed to set responder.").with_context(OP, err))?;
    Ok(ApiResponse::ok("Successfully set responder.", assignment))
}
