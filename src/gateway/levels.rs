use axum::extract::State;

use super::response::{ApiResponse, ApiResult};
use super::GatewayState;
use crate::api::PartnerSettingApi;
use crate::hierarchy::{Hierarchy, LevelRow};

/// GET /console/levels - level table with resolved ancestry
pub async fn level_rows(State(state): State<GatewayState>) -> ApiResult<Vec<LevelRow>> {
    let levels = state.api.list_levels().await?;
    let rows = Hierarchy::from_levels(levels).rows()?;
    Ok(ApiResponse::success(rows))
}
