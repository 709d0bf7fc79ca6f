use std::sync::Arc;

use feedlog_registry::InMemoryRegistry;
use feedlog_sdk::{ClientConfig, FeedClient, FeedError, FetchOptions, LoadOptions};
use feedlog_server::{build_router, MemoryDaemon, ServerConfig};
use feedlog_store::InMemoryBlobStore;
use serde_json::json;
use tokio::net::TcpListener;

async fn spawn_daemon() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(MemoryDaemon::new(ServerConfig::default()));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(daemon_url: String) -> FeedClient {
    FeedClient::connect(
        ClientConfig::new(daemon_url),
        Arc::new(InMemoryBlobStore::new()),
        Arc::new(InMemoryRegistry::new()),
    )
    .unwrap()
}

#[tokio::test]
async fn feed_round_trip_over_http() {
    let client = client(spawn_daemon().await);
    assert!(client.probe().await.unwrap().success);

    let feed = client.load_feed("remote", LoadOptions::create()).await.unwrap();
    assert!(feed.is_writeable().await.unwrap());
    let mut events = feed.load_subfeed("events").unwrap();
    events.append(vec![json!({"t": 1}), json!({"t": 2})]).await.unwrap();

    assert_eq!(events.num_local_messages().await.unwrap(), 2);
    let got = events.fetch_next(FetchOptions::wait(0)).await.unwrap();
    assert_eq!(got, vec![json!({"t": 1}), json!({"t": 2})]);
    assert_eq!(events.position(), 2);
}

#[tokio::test]
async fn daemon_error_text_reaches_caller() {
    let client = client(spawn_daemon().await);
    let feed = client.open_live(feedlog_sdk::FeedId::new("unknown").unwrap());
    let err = feed.is_writeable().await.unwrap_err();
    match err {
        FeedError::Protocol(e) => assert!(e.to_string().contains("feed not found")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_daemon_is_protocol_error() {
    let client = client("http://127.0.0.1:1".to_string());
    assert!(matches!(
        client.create_feed(None).await,
        Err(FeedError::Protocol(_))
    ));
}
