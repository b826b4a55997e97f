use crate::{error::AppError, AppState};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use core_types::{Equipment, Topic};
use dashboard::{DashboardView, Panel, ViewFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The widget state the browser sends with every render.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub seed: Option<u64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub hour_start: Option<u32>,
    pub hour_end: Option<u32>,
    /// Comma separated, e.g. `boiler,rolling_mill`.
    pub equipment: Option<String>,
}

impl DashboardQuery {
    fn filter(&self) -> Result<ViewFilter, AppError> {
        let hour_range = match (self.hour_start, self.hour_end) {
            (None, None) => None,
            (start, end) => Some((start.unwrap_or(0), end.unwrap_or(23))),
        };

        let equipment = match &self.equipment {
            Some(list) => list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<Equipment>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| AppError::BadRequest(e.to_string()))?,
            None => Vec::new(),
        };

        Ok(ViewFilter {
            from: self.from,
            to: self.to,
            hour_range,
            equipment,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CostQuery {
    pub total_loss: f64,
    pub rate: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CostResponse {
    pub total_loss: f64,
    pub rate: f64,
    pub cost: f64,
}

/// # GET /api/dashboard
/// Renders every panel for the given widget state.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<DashboardView>, AppError> {
    let Query(query) = query?;
    let filter = query.filter()?;
    let seed = query.seed.or(state.dashboard.config().general.seed);
    let view = state.dashboard.render_with_seed(seed, &filter)?;
    Ok(Json(view))
}

/// # GET /api/panels/:topic
pub async fn get_panel(
    Path(topic): Path<String>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<Panel>, AppError> {
    let topic: Topic = topic
        .parse()
        .map_err(|_| AppError::NotFound(format!("No panel named '{topic}'")))?;
    let Query(query) = query?;
    let filter = query.filter()?;
    let seed = query.seed.or(state.dashboard.config().general.seed);
    let panel = state.dashboard.render_panel(topic, seed, &filter)?;
    Ok(Json(panel))
}

/// # GET /api/cost
/// Prices an arbitrary energy loss at an arbitrary tariff.
pub async fn get_cost(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CostQuery>, QueryRejection>,
) -> Result<Json<CostResponse>, AppError> {
    let Query(query) = query?;
    let cost = state.engine.cost_estimate(query.total_loss, query.rate)?;
    Ok(Json(CostResponse {
        total_loss: query.total_loss,
        rate: query.rate,
        cost,
    }))
}
