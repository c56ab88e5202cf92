//! HTTP handler functions for the dashboard API.

use actix_web::{HttpResponse, http::header::ContentType, web};
use crash_impact_dashboard_models::{
    ApiColumn, ApiComponentRow, ApiHealth, ComponentQueryParams, TABLE_COLUMNS,
};
use crash_impact_models::labels::column_label;

use crate::AppState;
use crate::filter::ComponentFilter;
use crate::map::{escape_html, feature_collection};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// `GET /`
///
/// Serves the single-page dashboard with the configured title and map
/// view substituted in.
pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    let map = &state.config.map;
    let page = INDEX_HTML
        .replace("{{title}}", &escape_html(&state.config.title))
        .replace("{{center_lat}}", &map.center_lat.to_string())
        .replace("{{center_lon}}", &map.center_lon.to_string())
        .replace("{{zoom}}", &map.zoom.to_string());

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(page)
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        component_count: state.dataset.len(),
    })
}

/// `GET /api/columns`
///
/// Table columns with their display labels, in display order.
pub async fn columns() -> HttpResponse {
    let columns: Vec<ApiColumn> = TABLE_COLUMNS
        .iter()
        .map(|name| ApiColumn {
            name: (*name).to_string(),
            label: column_label(name).to_string(),
        })
        .collect();

    HttpResponse::Ok().json(columns)
}

/// `GET /api/facets`
///
/// Distinct values for each filter dropdown.
pub async fn facets(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.dataset.facets())
}

/// `GET /api/components`
///
/// Table rows matching the facet filters.
pub async fn components(
    state: web::Data<AppState>,
    params: web::Query<ComponentQueryParams>,
) -> HttpResponse {
    let filter = ComponentFilter::from_params(&params);
    let rows: Vec<ApiComponentRow> = filter
        .apply(state.dataset.rows())
        .map(crate::dataset::DashboardRow::to_api)
        .collect();

    HttpResponse::Ok().json(rows)
}

/// `GET /api/map`
///
/// Simplified component geometries matching the facet filters, as a
/// `GeoJSON` feature collection.
pub async fn map(
    state: web::Data<AppState>,
    params: web::Query<ComponentQueryParams>,
) -> HttpResponse {
    let filter = ComponentFilter::from_params(&params);
    let map = &state.config.map;
    let collection = feature_collection(
        filter.apply(state.dataset.rows()),
        map.simplify_tolerance,
        map.max_features,
    );

    match serde_json::to_string(&collection) {
        Ok(body) => HttpResponse::Ok()
            .content_type("application/geo+json")
            .body(body),
        Err(e) => {
            log::error!("Failed to serialize map features: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to serialize map features"
            }))
        }
    }
}
