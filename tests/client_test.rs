use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    routing::{get, post},
};
use async_trait::async_trait;
use jammcli::{
    config::Config,
    error::{SpotifyError, StoreError},
    management::{KeyValueStore, MemoryStore, SessionManager},
    server,
    spotify::{Navigator, SpotifyClient},
    types::{AuthOutcome, AuthOutcomeSlot, AuthState},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct Recorded {
    path: String,
    query: Option<String>,
    authorization: Option<String>,
    body: Value,
}

struct MockSpotify {
    token_status: StatusCode,
    token_body: Value,
    search_status: StatusCode,
    search_body: Value,
    tracks_status: StatusCode,
    requests: Mutex<Vec<Recorded>>,
}

impl MockSpotify {
    fn new() -> Self {
        Self {
            token_status: StatusCode::OK,
            token_body: json!({ "access_token": "abc" }),
            search_status: StatusCode::OK,
            search_body: json!({ "tracks": { "items": [] } }),
            tracks_status: StatusCode::CREATED,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, headers: &HeaderMap, uri: &Uri, body: Value) {
        self.requests.lock().unwrap().push(Recorded {
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body,
        });
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn token(
    State(mock): State<Arc<MockSpotify>>,
    headers: HeaderMap,
    uri: Uri,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    mock.record(&headers, &uri, json!(form));
    (mock.token_status, Json(mock.token_body.clone()))
}

async fn search(
    State(mock): State<Arc<MockSpotify>>,
    headers: HeaderMap,
    uri: Uri,
) -> (StatusCode, Json<Value>) {
    mock.record(&headers, &uri, Value::Null);
    (mock.search_status, Json(mock.search_body.clone()))
}

async fn me(
    State(mock): State<Arc<MockSpotify>>,
    headers: HeaderMap,
    uri: Uri,
) -> Json<Value> {
    mock.record(&headers, &uri, Value::Null);
    Json(json!({ "id": "user-1", "display_name": "Test User" }))
}

async fn create_playlist(
    State(mock): State<Arc<MockSpotify>>,
    headers: HeaderMap,
    uri: Uri,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let name = body["name"].clone();
    mock.record(&headers, &uri, body);
    (
        StatusCode::CREATED,
        Json(json!({ "id": "pl-1", "name": name, "uri": "spotify:playlist:pl-1" })),
    )
}

async fn add_tracks(
    State(mock): State<Arc<MockSpotify>>,
    headers: HeaderMap,
    uri: Uri,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    mock.record(&headers, &uri, body);
    (mock.tracks_status, Json(json!({ "snapshot_id": "snap" })))
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_mock(mock: Arc<MockSpotify>) -> String {
    let app = Router::new()
        .route("/api/token", post(token))
        .route("/v1/search", get(search))
        .route("/v1/me", get(me))
        .route("/v1/users/{user_id}/playlists", post(create_playlist))
        .route("/v1/playlists/{playlist_id}/tracks", post(add_tracks))
        .with_state(mock);
    spawn(app).await
}

fn client_for(base: &str, store: Arc<MemoryStore>) -> SpotifyClient {
    let mut config = Config::new("client-123");
    config.token_url = format!("{base}/api/token");
    config.api_url = format!("{base}/v1");
    SpotifyClient::new(config, SessionManager::new(store))
}

async fn logged_in(base: &str, token: &str) -> SpotifyClient {
    let store = Arc::new(MemoryStore::new());
    store.set("access_token", token).await.unwrap();
    client_for(base, store)
}

struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _url: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Memory store whose deletes always fail.
#[derive(Default)]
struct StuckStore {
    inner: MemoryStore,
}

#[async_trait]
impl KeyValueStore for StuckStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("read-only session")))
    }
}

#[tokio::test]
async fn exchange_then_search_sends_bearer_token() {
    let mock = Arc::new(MockSpotify::new());
    let base = spawn_mock(Arc::clone(&mock)).await;
    let client = client_for(&base, Arc::new(MemoryStore::new()));

    client.initiate_login(&NoopNavigator).await.unwrap();
    let verifier = client.session().code_verifier().await.unwrap().unwrap();

    let token = client.exchange_code_for_token("auth-code").await.unwrap();
    assert_eq!(token, "abc");
    assert_eq!(
        client.session().access_token().await.unwrap().as_deref(),
        Some("abc")
    );
    assert_eq!(client.session().code_verifier().await.unwrap(), None);

    client.search("q=daft%20punk").await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);

    let exchange = &requests[0];
    assert_eq!(exchange.path, "/api/token");
    assert_eq!(exchange.body["grant_type"], "authorization_code");
    assert_eq!(exchange.body["code"], "auth-code");
    assert_eq!(exchange.body["client_id"], "client-123");
    assert_eq!(exchange.body["redirect_uri"], client.config().redirect_uri);
    assert_eq!(exchange.body["code_verifier"], verifier);

    let search = &requests[1];
    assert_eq!(search.path, "/v1/search");
    assert_eq!(search.query.as_deref(), Some("q=daft%20punk&type=track"));
    assert_eq!(search.authorization.as_deref(), Some("Bearer abc"));
}

#[tokio::test]
async fn failed_exchange_stores_no_token() {
    let mut mock = MockSpotify::new();
    mock.token_status = StatusCode::BAD_REQUEST;
    mock.token_body = json!({ "error": "invalid_grant" });
    let mock = Arc::new(mock);
    let base = spawn_mock(Arc::clone(&mock)).await;

    let store = Arc::new(MemoryStore::new());
    store.set("code_verifier", "verifier").await.unwrap();
    let client = client_for(&base, store);

    let err = client.exchange_code_for_token("auth-code").await.unwrap_err();
    match err {
        SpotifyError::AuthExchange { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("invalid_grant"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(client.session().access_token().await.unwrap(), None);
    assert_eq!(
        client.session().code_verifier().await.unwrap().as_deref(),
        Some("verifier")
    );
}

#[tokio::test]
async fn search_without_tracks_field_is_empty() {
    let mut mock = MockSpotify::new();
    mock.search_body = json!({ "artists": { "items": [] } });
    let base = spawn_mock(Arc::new(mock)).await;
    let client = logged_in(&base, "abc").await;

    assert!(client.search("q=nothing").await.unwrap().is_empty());
}

#[tokio::test]
async fn search_maps_tracks_in_order() {
    let mut mock = MockSpotify::new();
    mock.search_body = json!({
        "tracks": {
            "items": [
                {
                    "id": "t1",
                    "name": "One More Time",
                    "uri": "spotify:track:t1",
                    "artists": [{ "name": "Daft Punk" }, { "name": "Romanthony" }],
                    "album": { "name": "Discovery" }
                },
                {
                    "id": "t2",
                    "name": "Untitled",
                    "uri": "spotify:track:t2",
                    "artists": [],
                    "album": { "name": "Unknown" }
                }
            ]
        }
    });
    let base = spawn_mock(Arc::new(mock)).await;
    let client = logged_in(&base, "abc").await;

    let tracks = client.search("q=one%20more%20time").await.unwrap();
    assert_eq!(tracks.len(), 2);

    assert_eq!(tracks[0].id, "t1");
    assert_eq!(tracks[0].name, "One More Time");
    assert_eq!(tracks[0].artist, "Daft Punk");
    assert_eq!(tracks[0].album, "Discovery");
    assert_eq!(tracks[0].uri, "spotify:track:t1");

    assert_eq!(tracks[1].id, "t2");
    assert_eq!(tracks[1].artist, "");
}

#[tokio::test]
async fn search_reports_api_errors() {
    let mut mock = MockSpotify::new();
    mock.search_status = StatusCode::UNAUTHORIZED;
    mock.search_body = json!({ "error": { "status": 401, "message": "The access token expired" } });
    let base = spawn_mock(Arc::new(mock)).await;
    let client = logged_in(&base, "stale").await;

    assert!(matches!(
        client.search("q=x").await,
        Err(SpotifyError::Api { status: 401, .. })
    ));
}

#[tokio::test]
async fn search_without_token_sends_nothing() {
    let mock = Arc::new(MockSpotify::new());
    let base = spawn_mock(Arc::clone(&mock)).await;
    let client = client_for(&base, Arc::new(MemoryStore::new()));

    assert!(matches!(
        client.search("q=x").await,
        Err(SpotifyError::MissingToken)
    ));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn save_playlist_skips_without_name_or_tracks() {
    let mock = Arc::new(MockSpotify::new());
    let base = spawn_mock(Arc::clone(&mock)).await;
    let client = logged_in(&base, "abc").await;

    let uris = vec!["spotify:track:t1".to_string()];
    assert!(client.save_playlist("", &uris).await.unwrap().is_none());
    assert!(client.save_playlist("   ", &uris).await.unwrap().is_none());
    assert!(client.save_playlist("Mix", &[]).await.unwrap().is_none());
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn save_playlist_creates_and_fills() {
    let mock = Arc::new(MockSpotify::new());
    let base = spawn_mock(Arc::clone(&mock)).await;
    let client = logged_in(&base, "abc").await;

    let uris: Vec<String> = (0..150).map(|i| format!("spotify:track:{i}")).collect();
    let playlist = client.save_playlist("Road trip", &uris).await.unwrap().unwrap();
    assert_eq!(playlist.id, "pl-1");
    assert_eq!(playlist.name, "Road trip");

    let requests = mock.requests();
    let paths: Vec<&str> = requests.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        [
            "/v1/me",
            "/v1/users/user-1/playlists",
            "/v1/playlists/pl-1/tracks",
            "/v1/playlists/pl-1/tracks",
        ]
    );
    assert!(
        requests
            .iter()
            .all(|r| r.authorization.as_deref() == Some("Bearer abc"))
    );
    assert_eq!(requests[1].body, json!({ "name": "Road trip" }));

    let first_batch = requests[2].body["uris"].as_array().unwrap();
    let second_batch = requests[3].body["uris"].as_array().unwrap();
    assert_eq!(first_batch.len(), 100);
    assert_eq!(second_batch.len(), 50);
    assert_eq!(first_batch[0], "spotify:track:0");
    assert_eq!(second_batch[49], "spotify:track:149");
}

#[tokio::test]
async fn save_playlist_keeps_playlist_when_tracks_fail() {
    let mut mock = MockSpotify::new();
    mock.tracks_status = StatusCode::INTERNAL_SERVER_ERROR;
    let base = spawn_mock(Arc::new(mock)).await;
    let client = logged_in(&base, "abc").await;

    let err = client
        .save_playlist("Road trip", &["spotify:track:t1".to_string()])
        .await
        .unwrap_err();

    match err {
        SpotifyError::TracksNotAdded {
            playlist_id,
            source,
        } => {
            assert_eq!(playlist_id, "pl-1");
            assert!(matches!(*source, SpotifyError::Api { status: 500, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn callback_server_completes_login() {
    let mock = Arc::new(MockSpotify::new());
    let spotify_base = spawn_mock(Arc::clone(&mock)).await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let callback_base = format!("http://{}", listener.local_addr().unwrap());

    let mut config = client_for(&spotify_base, Arc::new(MemoryStore::new()))
        .config()
        .clone();
    config.redirect_uri = format!("{callback_base}/callback");
    let client = Arc::new(SpotifyClient::new(
        config,
        SessionManager::new(Arc::new(MemoryStore::new())),
    ));

    let outcome: AuthOutcomeSlot = Arc::new(tokio::sync::Mutex::new(None));
    let app = server::router(Arc::clone(&client), Arc::clone(&outcome)).unwrap();
    tokio::spawn(server::start_api_server(listener, app));

    client
        .session()
        .persist_auth_state(&AuthState {
            code_verifier: "verifier".to_string(),
            state: "nonce".to_string(),
        })
        .await
        .unwrap();

    let health: Value = reqwest::get(format!("{callback_base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["name"], "jammcli");

    let page = reqwest::get(format!("{callback_base}/callback?code=auth-code&state=nonce"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Authentication successful"));

    let result = jammcli::spotify::auth::wait_for_outcome(outcome, Duration::from_secs(1)).await;
    assert_eq!(result, Some(AuthOutcome::Authorized));
    assert_eq!(
        client.session().access_token().await.unwrap().as_deref(),
        Some("abc")
    );
    assert_eq!(mock.requests()[0].body["code_verifier"], "verifier");
}

#[tokio::test]
async fn failed_cleanup_stores_no_token() {
    let mock = Arc::new(MockSpotify::new());
    let base = spawn_mock(Arc::clone(&mock)).await;

    let store = Arc::new(StuckStore::default());
    store.set("code_verifier", "verifier").await.unwrap();
    let mut config = Config::new("client-123");
    config.token_url = format!("{base}/api/token");
    let client = SpotifyClient::new(config, SessionManager::new(store));

    let err = client.exchange_code_for_token("auth-code").await.unwrap_err();
    assert!(matches!(err, SpotifyError::Store(StoreError::Io(_))));
    assert_eq!(client.session().access_token().await.unwrap(), None);
}

#[tokio::test]
async fn forged_callback_does_not_end_login() {
    let mock = Arc::new(MockSpotify::new());
    let spotify_base = spawn_mock(Arc::clone(&mock)).await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let callback_base = format!("http://{}", listener.local_addr().unwrap());

    let mut config = client_for(&spotify_base, Arc::new(MemoryStore::new()))
        .config()
        .clone();
    config.redirect_uri = format!("{callback_base}/callback");
    let client = Arc::new(SpotifyClient::new(
        config,
        SessionManager::new(Arc::new(MemoryStore::new())),
    ));

    let outcome: AuthOutcomeSlot = Arc::new(tokio::sync::Mutex::new(None));
    let app = server::router(Arc::clone(&client), Arc::clone(&outcome)).unwrap();
    tokio::spawn(server::start_api_server(listener, app));

    let request = client.initiate_login(&NoopNavigator).await.unwrap();

    for forged in [
        "error=access_denied".to_string(),
        "code=stolen&state=forged".to_string(),
        format!("error=access_denied&state={}x", request.state),
    ] {
        let page = reqwest::get(format!("{callback_base}/callback?{forged}"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(page.contains("state mismatch"));
    }
    assert_eq!(*outcome.lock().await, None);
    assert!(mock.requests().is_empty());

    reqwest::get(format!(
        "{callback_base}/callback?code=auth-code&state={}",
        request.state
    ))
    .await
    .unwrap();

    let result = jammcli::spotify::auth::wait_for_outcome(outcome, Duration::from_secs(1)).await;
    assert_eq!(result, Some(AuthOutcome::Authorized));
    assert_eq!(
        client.session().access_token().await.unwrap().as_deref(),
        Some("abc")
    );
    assert_eq!(mock.requests().len(), 1);
}
