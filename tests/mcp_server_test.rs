use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;

use rental_dashboard::adapters::cache::memory_cache::MemoryCache;
use rental_dashboard::config::types::Config;
use rental_dashboard::domain::boundary::NeighborhoodBoundaries;
use rental_dashboard::domain::listing::{CityListings, Listing, ListingColumn};
use rental_dashboard::mcp::server::DashboardMcpServer;
use rental_dashboard::repository::{CityData, ListingRepository};

use rmcp::model::{CallToolRequestParams, CallToolResult, ClientInfo, ReadResourceRequestParams};
use rmcp::{ClientHandler, ServerHandler, ServiceExt};

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

fn listing(id: i64, nbhd: &str, date: &str, price: f64, rating: Option<f64>) -> Listing {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let mut l = Listing::new(date, nbhd, price);
    l.id = Some(id);
    l.name = Some(format!("Flat {id}"));
    l.review_scores_rating = rating;
    l
}

fn repository() -> ListingRepository {
    let boundaries: geojson::FeatureCollection = serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "geometry": null, "properties": {"neighbourhood": "Alfama"}},
            {"type": "Feature", "geometry": null, "properties": {"neighbourhood": "Baixa"}}
        ]
    })
    .to_string()
    .parse()
    .unwrap();

    let mut alfama = listing(1, "Alfama", "2024-05-01", 80.0, Some(4.7));
    alfama.top_amenities_with_percentages = Some("Wifi (30, 90%), Kitchen (25, 75%)".into());
    let listings = vec![
        alfama,
        listing(2, "Alfama", "2024-05-01", 120.0, Some(4.1)),
        listing(3, "Baixa", "2024-05-01", 140.0, Some(4.4)),
        listing(4, "Alfama", "2024-07-01", 95.0, None),
        listing(5, "Alfama", "2024-08-01", 99.0, None),
    ];

    let mut cities = BTreeMap::new();
    cities.insert(
        "Lisbon, Portugal".to_string(),
        CityData::new(
            NeighborhoodBoundaries::new(boundaries),
            CityListings::new(ListingColumn::ALL.to_vec(), listings),
        ),
    );
    ListingRepository::from_cities(cities)
}

fn make_server() -> DashboardMcpServer {
    DashboardMcpServer::new(
        Arc::new(repository()),
        Arc::new(Config::default()),
        Arc::new(MemoryCache::new(32)),
    )
}

#[derive(Debug, Clone, Default)]
struct DummyClientHandler;

impl ClientHandler for DummyClientHandler {
    fn get_info(&self) -> ClientInfo {
        ClientInfo::default()
    }
}

fn extract_json(result: &CallToolResult) -> serde_json::Value {
    let text = result
        .content
        .first()
        .and_then(|c| c.raw.as_text())
        .map(|t| t.text.clone())
        .unwrap_or_default();
    serde_json::from_str(&text).expect("tool output should be JSON")
}

#[allow(clippy::needless_pass_by_value)]
fn tool_params(name: &str, args: serde_json::Value) -> CallToolRequestParams {
    CallToolRequestParams {
        meta: None,
        name: std::borrow::Cow::Owned(name.to_string()),
        arguments: Some(args.as_object().unwrap().clone()),
        task: None,
    }
}

async fn setup() -> (
    rmcp::service::RunningService<rmcp::RoleClient, DummyClientHandler>,
    tokio::task::JoinHandle<anyhow::Result<()>>,
) {
    let (server_transport, client_transport) = tokio::io::duplex(65536);

    let server = make_server();
    let server_handle = tokio::spawn(async move {
        server.serve(server_transport).await?.waiting().await?;
        anyhow::Ok(())
    });

    let client = DummyClientHandler
        .serve(client_transport)
        .await
        .expect("client should connect");

    (client, server_handle)
}

async fn teardown(
    client: rmcp::service::RunningService<rmcp::RoleClient, DummyClientHandler>,
    server_handle: tokio::task::JoinHandle<anyhow::Result<()>>,
) {
    let _ = client.cancel().await;
    let _ = server_handle.await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn instructions_mention_every_tool() {
    let info = make_server().get_info();
    let instructions = info.instructions.unwrap();
    for tool in [
        "dashboard_cities",
        "dashboard_options",
        "dashboard_date_axis",
        "dashboard_map",
        "dashboard_table",
        "dashboard_time_series",
        "dashboard_amenities",
        "dashboard_map_click",
    ] {
        assert!(instructions.contains(tool), "{tool} missing from instructions");
    }
}

#[tokio::test]
async fn list_tools_returns_eight() {
    let (client, server_handle) = setup().await;

    let tools = client
        .list_tools(None)
        .await
        .expect("list_tools should work");
    let mut names: Vec<String> = tools.tools.iter().map(|t| t.name.to_string()).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "dashboard_amenities",
            "dashboard_cities",
            "dashboard_date_axis",
            "dashboard_map",
            "dashboard_map_click",
            "dashboard_options",
            "dashboard_table",
            "dashboard_time_series",
        ]
    );

    teardown(client, server_handle).await;
}

#[tokio::test]
async fn interaction_cycle_over_the_wire() {
    let (client, server_handle) = setup().await;

    let axis = extract_json(
        &client
            .call_tool(tool_params("dashboard_date_axis", serde_json::json!({})))
            .await
            .expect("date axis"),
    );
    assert_eq!(axis[0]["label"], "2024-05");

    let map = extract_json(
        &client
            .call_tool(tool_params(
                "dashboard_map",
                serde_json::json!({ "city": "Lisbon, Portugal", "month_index": 0 }),
            ))
            .await
            .expect("map"),
    );
    assert_eq!(map["status"], "ready");
    assert_eq!(map["view"]["rows"].as_array().unwrap().len(), 2);
    assert_eq!(map["view"]["color_scale"]["min"], 100.0);
    assert_eq!(map["view"]["color_scale"]["max"], 140.0);

    let click = extract_json(
        &client
            .call_tool(tool_params(
                "dashboard_map_click",
                serde_json::json!({ "modal_open": false, "location": "Alfama" }),
            ))
            .await
            .expect("map click"),
    );
    assert_eq!(click["modal_open"], true);
    let neighbourhood = click["neighbourhood"].as_str().unwrap();

    let table = extract_json(
        &client
            .call_tool(tool_params(
                "dashboard_table",
                serde_json::json!({
                    "city": "Lisbon, Portugal",
                    "month_index": 0,
                    "neighbourhood": neighbourhood,
                    "sort_order": "ascending",
                    "extra_columns": ["host_name", "room_type"]
                }),
            ))
            .await
            .expect("table"),
    );
    assert_eq!(table["view"]["rows"].as_array().unwrap().len(), 2);
    assert_eq!(table["view"]["rows"][0][1], 4.1);
    assert_eq!(table["view"]["columns"][4]["label"], "Host");
    assert_eq!(table["view"]["columns"].as_array().unwrap().len(), 5);

    let series = extract_json(
        &client
            .call_tool(tool_params(
                "dashboard_time_series",
                serde_json::json!({
                    "city": "Lisbon, Portugal",
                    "month_index": 0,
                    "neighbourhood": neighbourhood,
                    "chart_mode": "price"
                }),
            ))
            .await
            .expect("time series"),
    );
    assert_eq!(series["view"]["historical"]["points"][0]["value"], 100.0);
    assert_eq!(
        series["view"]["forecast"]["points"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
    assert_eq!(series["view"]["forecast"]["points"][0]["value"], 95.0);

    let amenities = extract_json(
        &client
            .call_tool(tool_params(
                "dashboard_amenities",
                serde_json::json!({
                    "city": "Lisbon, Portugal",
                    "month_index": 0,
                    "neighbourhood": neighbourhood
                }),
            ))
            .await
            .expect("amenities"),
    );
    assert_eq!(amenities["view"]["bars"][1]["name"], "Kitchen");

    teardown(client, server_handle).await;
}

#[tokio::test]
async fn unknown_city_is_reported_not_failed() {
    let (client, server_handle) = setup().await;

    let result = client
        .call_tool(tool_params(
            "dashboard_map",
            serde_json::json!({ "city": "Madrid, Spain", "month_index": 0 }),
        ))
        .await
        .expect("call_tool should succeed");
    assert_ne!(result.is_error, Some(true));
    let json = extract_json(&result);
    assert_eq!(json["status"], "invalid_selection");
    assert_eq!(json["view"]["reason"], "Invalid city selected");

    let cities = extract_json(
        &client
            .call_tool(tool_params("dashboard_cities", serde_json::json!({})))
            .await
            .expect("cities"),
    );
    let madrid = cities
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Madrid, Spain")
        .unwrap();
    assert_eq!(madrid["loaded"], false);

    teardown(client, server_handle).await;
}

#[tokio::test]
async fn boundaries_are_resources() {
    let (client, server_handle) = setup().await;

    let listed = client
        .peer()
        .list_resources(None)
        .await
        .expect("list_resources should succeed");
    assert_eq!(listed.resources.len(), 1);
    assert_eq!(
        listed.resources[0].raw.uri,
        "dashboard://boundaries/Lisbon, Portugal"
    );

    let read = client
        .peer()
        .read_resource(ReadResourceRequestParams {
            uri: "dashboard://boundaries/Lisbon, Portugal".into(),
            meta: None,
        })
        .await
        .expect("read_resource should succeed");
    assert_eq!(read.contents.len(), 1);

    let missing = client
        .peer()
        .read_resource(ReadResourceRequestParams {
            uri: "dashboard://boundaries/Madrid, Spain".into(),
            meta: None,
        })
        .await;
    assert!(missing.is_err());

    teardown(client, server_handle).await;
}
