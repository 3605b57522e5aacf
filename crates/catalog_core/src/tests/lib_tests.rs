use super::*;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
use serde_json::json;
use shared::{
    domain::{ColorKey, ColorOption, LocalizedText, RenderedImage, Vehicle, VehicleKey},
    error::{NetworkError, NetworkResult},
};
use tokio::net::TcpListener;

async fn spawn_catalog_server() -> String {
    let app = Router::new()
        .route(
            "/v1/cars",
            get(|| async {
                Json(json!([{
                    "modelRange": "G82",
                    "typeCode": "001",
                    "localizedName": {"en": "M4"},
                    "series": "4"
                }]))
            }),
        )
        .route(
            "/v1/cars/:model_range/:type_code/colors",
            get(|Path((model_range, type_code)): Path<(String, String)>| async move {
                Json(json!([
                    {"p0ID": format!("{model_range}-{type_code}-c2"), "hexCode": "#000000", "SortIndex": 2},
                    {"p0ID": format!("{model_range}-{type_code}-c1"), "hexCode": "#ffffff", "SortIndex": 1}
                ]))
            }),
        )
        .route(
            "/v1/cars/:model_range/:type_code/:color/media",
            get(
                |Path((_, _, color)): Path<(String, String, String)>| async move {
                    if color == "broken" {
                        return Err(StatusCode::INTERNAL_SERVER_ERROR);
                    }
                    if color == "garbage" {
                        return Ok(Json(json!({"images": "not-a-list"})));
                    }
                    Ok(Json(json!({
                        "images": [
                            {"url": format!("https://renderings.evecp.bmw.cloud/{color}/1.jpg"), "environment": "MTown", "viewAngle": "34front"},
                            {"url": format!("https://renderings.evecp.bmw.cloud/{color}/2.jpg"), "environment": "Studio", "viewAngle": "side"}
                        ]
                    })))
                },
            ),
        )
        .route(
            "/renderings/ok.jpg",
            get(|| async { (StatusCode::OK, vec![1_u8, 2, 3]) }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn vehicle_key() -> VehicleKey {
    VehicleKey {
        model_range: "G82".into(),
        type_code: "001".into(),
    }
}

fn color_key(color: &str) -> ColorKey {
    ColorKey {
        vehicle: vehicle_key(),
        color: color.into(),
    }
}

#[tokio::test]
async fn lists_vehicles_from_catalog_service() {
    let base = spawn_catalog_server().await;
    let client = HttpCatalogClient::new(&base, Duration::from_secs(5)).expect("client");

    let vehicles = client.list_vehicles().await.expect("vehicles");
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0].display_name("en"), "M4");
}

#[tokio::test]
async fn scopes_color_request_to_vehicle_path() {
    let base = spawn_catalog_server().await;
    let client = HttpCatalogClient::new(&format!("{base}/"), Duration::from_secs(5)).expect("client");

    let colors = client.list_colors(&vehicle_key()).await.expect("colors");
    let ids: Vec<_> = colors.iter().map(|c| c.p0_id.as_str()).collect();
    // The raw client keeps the service order; sorting is a display rule.
    assert_eq!(ids, ["G82-001-c2", "G82-001-c1"]);
}

#[tokio::test]
async fn unwraps_media_images_in_order() {
    let base = spawn_catalog_server().await;
    let client = HttpCatalogClient::new(&base, Duration::from_secs(5)).expect("client");

    let images = client.list_images(&color_key("c1")).await.expect("images");
    assert_eq!(images.len(), 2);
    assert!(images[0].url.ends_with("/c1/1.jpg"));
    assert_eq!(images[1].environment, "Studio");
}

#[tokio::test]
async fn non_success_status_becomes_status_error() {
    let base = spawn_catalog_server().await;
    let client = HttpCatalogClient::new(&base, Duration::from_secs(5)).expect("client");

    let err = client
        .list_images(&color_key("broken"))
        .await
        .expect_err("500 must fail");
    assert_eq!(err.status_code(), Some(500));
    assert!(err.to_string().contains("HTTP 500"));
}

#[tokio::test]
async fn malformed_body_becomes_decode_error() {
    let base = spawn_catalog_server().await;
    let client = HttpCatalogClient::new(&base, Duration::from_secs(5)).expect("client");

    let err = client
        .list_images(&color_key("garbage"))
        .await
        .expect_err("bad body must fail");
    assert!(matches!(err, NetworkError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_service_becomes_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client =
        HttpCatalogClient::new(&format!("http://{addr}"), Duration::from_secs(2)).expect("client");
    let err = client.list_vehicles().await.expect_err("nothing listening");
    assert!(matches!(err, NetworkError::Transport { .. }));
}

#[test]
fn rejects_base_url_that_cannot_carry_a_path() {
    let err = HttpCatalogClient::new("mailto:someone@example.com", Duration::from_secs(1))
        .expect_err("mailto is not a base");
    assert!(matches!(err, NetworkError::InvalidUrl { .. }));
}

#[test]
fn allowlist_accepts_only_https_on_known_hosts() {
    let allowlist = HostAllowlist::default();
    assert!(allowlist
        .check("https://renderings.evecp.bmw.cloud/trunks/abc/G82_de_MTown_day_cam_01.jpg")
        .is_ok());
    assert!(allowlist.check("https://WWW.BMW-M.COM/x.png").is_ok());
    assert!(matches!(
        allowlist.check("http://renderings.evecp.bmw.cloud/a.jpg"),
        Err(NetworkError::DisallowedHost { .. })
    ));
    assert!(matches!(
        allowlist.check("https://evil.example.com/a.jpg"),
        Err(NetworkError::DisallowedHost { host }) if host == "evil.example.com"
    ));
    assert!(matches!(
        allowlist.check("not a url"),
        Err(NetworkError::InvalidUrl { .. })
    ));
}

#[tokio::test]
async fn image_fetcher_refuses_disallowed_hosts_without_requesting() {
    let base = spawn_catalog_server().await;
    let fetcher = ImageFetcher::new(reqwest::Client::new(), HostAllowlist::default());

    let err = fetcher
        .fetch(&format!("{base}/renderings/ok.jpg"))
        .await
        .expect_err("local http host is not allowed");
    assert!(matches!(err, NetworkError::DisallowedHost { .. }));
}

struct CountingClient {
    vehicle_calls: AtomicUsize,
    color_calls: AtomicUsize,
    image_calls: AtomicUsize,
    fail_images_once: AtomicUsize,
}

impl CountingClient {
    fn new() -> Self {
        Self {
            vehicle_calls: AtomicUsize::new(0),
            color_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
            fail_images_once: AtomicUsize::new(0),
        }
    }

    fn failing_images_once() -> Self {
        let client = Self::new();
        client.fail_images_once.store(1, Ordering::SeqCst);
        client
    }
}

fn color(id: &str, sort_index: i64) -> ColorOption {
    ColorOption {
        p0_id: id.into(),
        hex_code: "#123456".into(),
        main_color: "blue".into(),
        effect: "metallic".into(),
        localized_name: LocalizedText::from([("en", id)]),
        sort_index: sort_index as f64,
    }
}

#[async_trait]
impl CatalogClient for CountingClient {
    async fn list_vehicles(&self) -> NetworkResult<Vec<Vehicle>> {
        self.vehicle_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn list_colors(&self, _vehicle: &VehicleKey) -> NetworkResult<Vec<ColorOption>> {
        self.color_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(vec![color("c2", 2), color("c1", 1)])
    }

    async fn list_images(&self, key: &ColorKey) -> NetworkResult<Vec<RenderedImage>> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .fail_images_once
            .compare_exchange(1, 0, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            return Err(NetworkError::Status {
                url: format!("/v1/cars/{key}/media"),
                status: 503,
            });
        }
        Ok(vec![RenderedImage {
            url: format!("https://renderings.evecp.bmw.cloud/{}.jpg", key.color),
            environment: "Studio".into(),
            view_angle: "front".into(),
        }])
    }
}

#[tokio::test]
async fn cache_shares_one_fetch_between_concurrent_color_requests() {
    let cache = Arc::new(CatalogCache::new(CountingClient::new()));
    let key = vehicle_key();

    let requests = (0..8).map(|_| {
        let cache = Arc::clone(&cache);
        let key = key.clone();
        async move { cache.colors(&key).await }
    });
    let results = futures::future::join_all(requests).await;

    assert_eq!(cache.client().color_calls.load(Ordering::SeqCst), 1);
    for colors in results {
        let colors = colors.expect("colors");
        let ids: Vec<_> = colors.iter().map(|c| c.p0_id.as_str()).collect();
        assert_eq!(ids, ["c1", "c2"]);
    }
}

#[tokio::test]
async fn cache_keys_colors_per_vehicle() {
    let cache = CatalogCache::new(CountingClient::new());
    let other = VehicleKey {
        model_range: "G87".into(),
        type_code: "002".into(),
    };

    cache.colors(&vehicle_key()).await.expect("first vehicle");
    cache.colors(&other).await.expect("second vehicle");
    cache.colors(&vehicle_key()).await.expect("first vehicle again");

    assert_eq!(cache.client().color_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cache_does_not_keep_failures() {
    let cache = CatalogCache::new(CountingClient::failing_images_once());
    let key = color_key("c1");

    let err = cache.images(&key).await.expect_err("first attempt fails");
    assert_eq!(err.status_code(), Some(503));

    let images = cache.images(&key).await.expect("retry succeeds");
    assert_eq!(images.len(), 1);
    cache.images(&key).await.expect("served from cache");
    assert_eq!(cache.client().image_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cache_fetches_vehicle_list_once() {
    let cache = CatalogCache::new(CountingClient::new());
    cache.vehicles().await.expect("vehicles");
    cache.vehicles().await.expect("vehicles");
    assert_eq!(cache.client().vehicle_calls.load(Ordering::SeqCst), 1);
}
