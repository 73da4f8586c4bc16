use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{DonationHub, DonationHubDirectory, FoodCategory, HubFilter, HubType};

/// Router builder exposing the directory search endpoint.
pub fn directory_router(directory: Arc<DonationHubDirectory>) -> Router {
    Router::new()
        .route("/api/v1/directory/hubs", get(search_handler))
        .with_state(directory)
}

/// Raw query parameters. Everything arrives as optional text; sentinel
/// values ("all", "any", empty) and unparseable numbers degrade to "no
/// filter" rather than erroring, matching the dashboard's select inputs.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DirectoryQuery {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    max_distance: Option<String>,
    #[serde(default, rename = "type")]
    hub_type: Option<String>,
    #[serde(default)]
    accepts: Option<String>,
    #[serde(default)]
    min_rating: Option<String>,
}

impl DirectoryQuery {
    pub(crate) fn into_filter(self) -> HubFilter {
        HubFilter {
            query: self.query.unwrap_or_default(),
            max_distance: self.max_distance.as_deref().and_then(parse_bound),
            hub_type: self.hub_type.as_deref().and_then(parse_token(HubType::from_token)),
            accepts: self
                .accepts
                .as_deref()
                .and_then(parse_token(FoodCategory::from_token)),
            min_rating: self.min_rating.as_deref().and_then(parse_bound),
        }
    }
}

fn is_sentinel(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("all") || value.eq_ignore_ascii_case("any")
}

fn parse_bound(value: &str) -> Option<f64> {
    if is_sentinel(value) {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

fn parse_token<T>(from_token: fn(&str) -> Option<T>) -> impl Fn(&str) -> Option<T> {
    move |value| {
        if is_sentinel(value) {
            None
        } else {
            from_token(value)
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    total: usize,
    hubs: Vec<DonationHub>,
}

async fn search_handler(
    State(directory): State<Arc<DonationHubDirectory>>,
    Query(params): Query<DirectoryQuery>,
) -> Json<SearchResponse> {
    let filter = params.into_filter();
    let hubs = directory.search(&filter);
    Json(SearchResponse {
        total: hubs.len(),
        hubs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_and_junk_degrade_to_no_op() {
        let params = DirectoryQuery {
            query: None,
            max_distance: Some("all".to_string()),
            hub_type: Some("ANY".to_string()),
            accepts: Some("warehouse".to_string()),
            min_rating: Some("not-a-number".to_string()),
        };

        let filter = params.into_filter();
        assert!(filter.query.is_empty());
        assert!(filter.max_distance.is_none());
        assert!(filter.hub_type.is_none());
        assert!(filter.accepts.is_none());
        assert!(filter.min_rating.is_none());
    }

    #[test]
    fn concrete_values_parse() {
        let params = DirectoryQuery {
            query: Some("pantry".to_string()),
            max_distance: Some("10".to_string()),
            hub_type: Some("regional".to_string()),
            accepts: Some("fresh-produce".to_string()),
            min_rating: Some("4.5".to_string()),
        };

        let filter = params.into_filter();
        assert_eq!(filter.query, "pantry");
        assert_eq!(filter.max_distance, Some(10.0));
        assert_eq!(filter.hub_type, Some(HubType::Regional));
        assert_eq!(filter.accepts, Some(FoodCategory::FreshProduce));
        assert_eq!(filter.min_rating, Some(4.5));
    }

    #[tokio::test]
    async fn search_endpoint_returns_filtered_hubs() {
        let directory = Arc::new(DonationHubDirectory::sample());
        let params = DirectoryQuery {
            accepts: Some("dairy".to_string()),
            ..DirectoryQuery::default()
        };

        let Json(body) = search_handler(State(directory), Query(params)).await;

        assert_eq!(body.total, 1);
        assert_eq!(body.hubs[0].name, "Second Harvest Food Bank");
    }
}
