//! # REST API for Member Management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::MemberMapper;
use crate::AppState;
use shared::{ApiResponse, CreateMemberRequest, CreatedCode, UpdateMemberRequest};

/// Register a new member
pub async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> impl IntoResponse {
    info!("POST /api/members - request: {:?}", request);

    match state.member_service.create(MemberMapper::to_create_command(request)).await {
        Ok(code) => (
            StatusCode::CREATED,
            Json(ApiResponse::with_data(StatusCode::CREATED.as_u16(), "Member created", CreatedCode { code })),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// List all members; expired penalties are cleared first
pub async fn list_members(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/members");

    match state.member_service.list().await {
        Ok(members) => (
            StatusCode::OK,
            Json(ApiResponse::with_data(
                StatusCode::OK.as_u16(),
                "Members retrieved",
                MemberMapper::to_list_dto(members),
            )),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Partially update a member
pub async fn update_member(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<UpdateMemberRequest>,
) -> impl IntoResponse {
    info!("PATCH /api/members/{} - request: {:?}", code, request);

    match state.member_service.update_by_code(&code, MemberMapper::to_update_command(request)).await {
        Ok(()) => {
            (StatusCode::OK, Json(ApiResponse::<()>::empty(StatusCode::OK.as_u16(), "Member updated"))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
