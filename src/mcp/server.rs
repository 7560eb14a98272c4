use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ListResourceTemplatesResult, ListResourcesResult,
        PaginatedRequestParams, ProtocolVersion, RawResource, RawResourceTemplate,
        ReadResourceRequestParams, ReadResourceResult, Resource, ResourceContents,
        ResourceTemplate, ServerCapabilities, ServerInfo,
    },
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde::Serialize;
use tracing::debug;

use crate::config::types::Config;
use crate::domain::selection::{
    ChartMode, InvalidSelection, ModalState, ResolvedSelection, SelectionInput, SortOrder, resolve,
};
use crate::ports::cache::ProjectionCache;
use crate::repository::ListingRepository;
use crate::views::View;
use crate::views::amenities::project_amenities;
use crate::views::map::project_map;
use crate::views::options::{city_options, date_marks, project_options};
use crate::views::table::project_table;
use crate::views::time_series::project_time_series;

const BOUNDARY_URI_PREFIX: &str = "dashboard://boundaries/";
const GEOJSON_MIME: &str = "application/geo+json";

// ---------- Tool parameter types ----------

#[derive(Debug, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct CityToolParams {
    /// City name exactly as listed by `dashboard_cities` (e.g. "Rome, Italy")
    pub city: String,
}

/// Widget state for one interaction. Explicit `sort_order` / `chart_mode`
/// take precedence over click counters.
#[derive(Debug, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct SelectionToolParams {
    /// City name exactly as listed by `dashboard_cities`
    pub city: String,
    /// Position on the month slider (index into `dashboard_date_axis`)
    pub month_index: usize,
    /// Selected neighbourhood; required by the table, time-series and amenities views
    pub neighbourhood: Option<String>,
    /// Column to sort the table by (default: review_scores_rating)
    pub sort_key: Option<String>,
    /// Extra table columns, appended after the default columns
    pub extra_columns: Option<Vec<String>>,
    /// Table sort direction (default: descending)
    pub sort_order: Option<SortOrder>,
    /// Time-series metric (default: price)
    pub chart_mode: Option<ChartMode>,
    /// Click count of the "ascending" button, used when `sort_order` is omitted
    pub ascending_clicks: Option<u32>,
    /// Click count of the "descending" button
    pub descending_clicks: Option<u32>,
    /// Click count of the "rating" button, used when `chart_mode` is omitted
    pub rating_clicks: Option<u32>,
    /// Click count of the "price" button
    pub price_clicks: Option<u32>,
}

impl SelectionToolParams {
    fn into_input(self) -> SelectionInput {
        let sort_order = match self.sort_order {
            Some(order) => order,
            None => SortOrder::from_clicks(
                self.ascending_clicks.unwrap_or(0),
                self.descending_clicks.unwrap_or(0),
            ),
        };
        let chart_mode = match self.chart_mode {
            Some(mode) => mode,
            None => ChartMode::from_clicks(
                self.rating_clicks.unwrap_or(0),
                self.price_clicks.unwrap_or(0),
            ),
        };
        SelectionInput {
            city: self.city,
            month_index: self.month_index,
            neighbourhood: self.neighbourhood,
            sort_key: self.sort_key,
            extra_columns: self.extra_columns.unwrap_or_default(),
            sort_order,
            chart_mode,
        }
    }
}

#[derive(Debug, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct MapClickToolParams {
    /// Whether the neighbourhood modal is currently open
    pub modal_open: Option<bool>,
    /// Neighbourhood of the clicked map region, absent when the click hit no region
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
struct MapClickOutcome {
    modal_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    neighbourhood: Option<String>,
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("failed to serialize response: {e}"), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

// ---------- Server ----------

#[derive(Clone)]
pub struct DashboardMcpServer {
    repository: Arc<ListingRepository>,
    config: Arc<Config>,
    cache: Arc<dyn ProjectionCache>,
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for DashboardMcpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardMcpServer")
            .field("cities", &self.repository.city_names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[tool_router]
impl DashboardMcpServer {
    pub fn new(
        repository: Arc<ListingRepository>,
        config: Arc<Config>,
        cache: Arc<dyn ProjectionCache>,
    ) -> Self {
        Self {
            repository,
            config,
            cache,
            tool_router: Self::tool_router(),
        }
    }

    fn resolve_selection(
        &self,
        params: SelectionToolParams,
    ) -> Result<ResolvedSelection, InvalidSelection> {
        let dashboard = &self.config.dashboard;
        resolve(
            self.repository.date_axis(),
            &params.into_input(),
            &dashboard.default_columns,
            &dashboard.default_sort_key,
        )
    }

    /// Resolves the selection, then serves the projection from the cache or
    /// computes and stores it.
    fn cached_view<T: Serialize>(
        &self,
        view_name: &str,
        params: SelectionToolParams,
        project: impl FnOnce(&ResolvedSelection) -> View<T>,
    ) -> Result<CallToolResult, McpError> {
        let selection = match self.resolve_selection(params) {
            Ok(selection) => selection,
            Err(invalid) => return json_result(&View::<T>::InvalidSelection(invalid)),
        };

        let key = selection.cache_key(view_name).map_err(|e| {
            McpError::internal_error(format!("failed to build cache key: {e}"), None)
        })?;
        if let Some(text) = self.cache.get(&key) {
            debug!(view = view_name, "Projection cache hit");
            return Ok(CallToolResult::success(vec![Content::text(text)]));
        }

        let result = json_result(&project(&selection))?;
        if let Some(text) = result.content.first().and_then(|c| c.raw.as_text()) {
            self.cache.set(&key, &text.text);
        }
        Ok(result)
    }

    #[tool(
        name = "dashboard_cities",
        description = "List the configured cities and whether each one's data loaded. Use a loaded city name as the `city` argument of every other tool.",
        annotations(read_only_hint = true)
    )]
    async fn dashboard_cities(&self) -> Result<CallToolResult, McpError> {
        json_result(&city_options(&self.config.data.cities, &self.repository))
    }

    #[tool(
        name = "dashboard_options",
        description = "Choice lists for a city: neighbourhoods in file order, sortable columns and optional extra table columns, each with a display label.",
        annotations(read_only_hint = true)
    )]
    async fn dashboard_options(
        &self,
        Parameters(params): Parameters<CityToolParams>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&project_options(
            &self.repository,
            &params.city,
            &self.config.dashboard,
        ))
    }

    #[tool(
        name = "dashboard_date_axis",
        description = "Month slider marks across all loaded cities: index, YYYY-MM label and whether the position is a forecast period. Pass an index as `month_index`.",
        annotations(read_only_hint = true)
    )]
    async fn dashboard_date_axis(&self) -> Result<CallToolResult, McpError> {
        json_result(&date_marks(&self.repository))
    }

    #[tool(
        name = "dashboard_map",
        description = "Choropleth data for a city and month: one row per neighbourhood with average price as the color field, hover field specs, color scale bounds and map viewport. Ratings and listing counts are omitted for forecast months. Join rows to the `dashboard://boundaries/{city}` resource on properties.neighbourhood.",
        annotations(read_only_hint = true)
    )]
    async fn dashboard_map(
        &self,
        Parameters(params): Parameters<SelectionToolParams>,
    ) -> Result<CallToolResult, McpError> {
        self.cached_view("map", params, |s| {
            project_map(&self.repository, s, &self.config.dashboard)
        })
    }

    #[tool(
        name = "dashboard_table",
        description = "Listings of one neighbourhood in the selected month, sorted by `sort_key` (missing values last) and projected to the default plus requested extra columns.",
        annotations(read_only_hint = true)
    )]
    async fn dashboard_table(
        &self,
        Parameters(params): Parameters<SelectionToolParams>,
    ) -> Result<CallToolResult, McpError> {
        self.cached_view("table", params, |s| {
            project_table(&self.repository, s, &self.config.dashboard)
        })
    }

    #[tool(
        name = "dashboard_time_series",
        description = "Mean price or rating per date for one neighbourhood, split into a historical series and a forecast series covering the last two dates. The historical series ends on the first forecast point.",
        annotations(read_only_hint = true)
    )]
    async fn dashboard_time_series(
        &self,
        Parameters(params): Parameters<SelectionToolParams>,
    ) -> Result<CallToolResult, McpError> {
        self.cached_view("time_series", params, |s| {
            project_time_series(&self.repository, s)
        })
    }

    #[tool(
        name = "dashboard_amenities",
        description = "Top amenities of a neighbourhood with the share of listings offering each, taken from its first listing row. Empty when the neighbourhood has no amenities data.",
        annotations(read_only_hint = true)
    )]
    async fn dashboard_amenities(
        &self,
        Parameters(params): Parameters<SelectionToolParams>,
    ) -> Result<CallToolResult, McpError> {
        self.cached_view("amenities", params, |s| {
            project_amenities(&self.repository, s)
        })
    }

    #[tool(
        name = "dashboard_map_click",
        description = "Apply a map click to the neighbourhood modal. A click on a region toggles the modal and returns that region as the selected neighbourhood; a click outside any region changes nothing.",
        annotations(read_only_hint = true)
    )]
    async fn dashboard_map_click(
        &self,
        Parameters(params): Parameters<MapClickToolParams>,
    ) -> Result<CallToolResult, McpError> {
        let state = ModalState::from(params.modal_open.unwrap_or(false));
        let (state, neighbourhood) = state.on_map_click(params.location.as_deref());
        json_result(&MapClickOutcome {
            modal_open: state.is_open(),
            neighbourhood,
        })
    }
}

#[tool_handler]
impl ServerHandler for DashboardMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Rental market dashboard over preloaded short-term rental listings.\n\
                 \n\
                 ## Selection\n\
                 Start with dashboard_cities and dashboard_date_axis, then dashboard_options for the \
                 chosen city. Every view tool takes the same selection: city, month_index and, for the \
                 neighbourhood views, a neighbourhood.\n\
                 \n\
                 ## Views\n\
                 - dashboard_map: per-neighbourhood averages for the month, colored by price\n\
                 - dashboard_table: listings of one neighbourhood in the month, sorted and column-projected\n\
                 - dashboard_time_series: price or rating over time with the forecast tail split out\n\
                 - dashboard_amenities: top amenities and their presence percentage\n\
                 - dashboard_map_click: modal toggle and neighbourhood selection from a map click\n\
                 \n\
                 ## Results\n\
                 Views answer {\"status\": \"ready\", \"view\": ...} or \
                 {\"status\": \"invalid_selection\", \"view\": {\"reason\": ...}} for an unknown city, \
                 a missing neighbourhood or a month index past the axis.\n\
                 \n\
                 ## Resources\n\
                 Neighbourhood boundaries of each loaded city are available as GeoJSON at \
                 dashboard://boundaries/{city}."
                    .into(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources: Vec<Resource> = self
            .repository
            .city_names()
            .map(|city| Resource {
                annotations: None,
                raw: RawResource {
                    uri: format!("{BOUNDARY_URI_PREFIX}{city}"),
                    name: format!("Boundaries: {city}"),
                    title: None,
                    description: None,
                    mime_type: Some(GEOJSON_MIME.into()),
                    size: None,
                    icons: None,
                    meta: None,
                },
            })
            .collect();
        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
            meta: None,
        })
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        let templates = vec![ResourceTemplate {
            annotations: None,
            raw: RawResourceTemplate {
                uri_template: format!("{BOUNDARY_URI_PREFIX}{{city}}"),
                name: "Neighbourhood Boundaries".into(),
                title: Some("Neighbourhood boundaries".into()),
                description: Some(
                    "GeoJSON FeatureCollection keyed by properties.neighbourhood".into(),
                ),
                mime_type: Some(GEOJSON_MIME.into()),
                icons: None,
            },
        }];
        Ok(ListResourceTemplatesResult {
            resource_templates: templates,
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let boundaries = request
            .uri
            .strip_prefix(BOUNDARY_URI_PREFIX)
            .and_then(|city| self.repository.boundaries(city));
        let Some(boundaries) = boundaries else {
            return Err(McpError::resource_not_found(
                format!("resource not found: {}", request.uri),
                None,
            ));
        };
        let text = serde_json::to_string(boundaries.feature_collection()).map_err(|e| {
            McpError::internal_error(format!("failed to serialize boundaries: {e}"), None)
        })?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }
}
