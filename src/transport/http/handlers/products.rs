use crate::transport::http::handlers::common::{error_response, json_rejection, query_rejection};
use crate::transport::http::types::{
    AppState, CreateProjectRequest, CreateProjectResponse, ErrorResponse, ProjectQuery,
    ProjectResponse,
};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProjectRequest,
    responses(
        (status = 200, description = "Project and products created", body = CreateProjectResponse),
        (status = 400, description = "Invalid image list or body", body = ErrorResponse),
        (status = 413, description = "Body exceeds MAX_BODY_BYTES", body = ErrorResponse),
        (status = 500, description = "Image host or record store failure", body = ErrorResponse)
    )
)]
pub async fn create_project_handler(
    State(state): State<AppState>,
    request: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_rejection(e, "{\"projectName\"?: string, \"imageUrls\": [string, ...]}");
        }
    };

    match state
        .service
        .create_project(request.project_name.as_deref(), request.image_urls.as_ref())
        .await
    {
        Ok(created) => (StatusCode::OK, Json(CreateProjectResponse::from(created))).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ProjectQuery),
    responses(
        (status = 200, description = "Project with its products in upload order", body = ProjectResponse),
        (status = 400, description = "Missing or malformed project parameter", body = ErrorResponse),
        (status = 404, description = "No such project", body = ErrorResponse),
        (status = 500, description = "Record store failure", body = ErrorResponse)
    )
)]
pub async fn get_project_handler(
    State(state): State<AppState>,
    query: Result<Query<ProjectQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(v) => v,
        Err(e) => return query_rejection(e),
    };
    let Some(project_id) = query.project else {
        return error_response(StatusCode::BAD_REQUEST, "Missing 'project' query parameter");
    };

    match state.service.get_project(&project_id).await {
        Ok(found) => (StatusCode::OK, Json(ProjectResponse::from(found))).into_response(),
        Err(e) => e.into_response(),
    }
}
