//! Live integration against a local wiremock server, one test per
//! compiled-in binding. The facade is synchronous, so fetches run on a
//! blocking thread while wiremock lives on the test runtime.

mod common;

use anyfetch::{Context, FetchError, FixedTable, Result};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0d";

async fn start_server() -> MockServer {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/image"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES))
        .mount(&server)
        .await;
    server
}

async fn text_via(delegate: &'static str, url: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let mut ctx = Context::new().with_table(FixedTable::new([delegate]));
        ctx.get_text(&url, None)
    })
    .await
    .expect("fetch thread panicked")
}

async fn binary_via(delegate: &'static str, url: String) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || {
        let mut ctx = Context::new().with_table(FixedTable::new([delegate]));
        ctx.get_binary(&url, None)
    })
    .await
    .expect("fetch thread panicked")
}

macro_rules! binding_tests {
    ($feature:literal, $delegate:literal, $text:ident, $binary:ident) => {
        #[cfg(feature = $feature)]
        #[tokio::test]
        async fn $text() {
            let server = start_server().await;
            let body = text_via($delegate, format!("{}/hello", server.uri()))
                .await
                .unwrap();
            assert_eq!(body, "hello");
        }

        #[cfg(feature = $feature)]
        #[tokio::test]
        async fn $binary() {
            let server = start_server().await;
            let body = binary_via($delegate, format!("{}/image", server.uri()))
                .await
                .unwrap();
            assert_eq!(body, PNG_BYTES);
        }
    };
}

binding_tests!("reqwest", "reqwest", reqwest_text, reqwest_binary);
binding_tests!("ureq", "ureq", ureq_text, ureq_binary);
binding_tests!("minreq", "minreq", minreq_text, minreq_binary);
binding_tests!("attohttpc", "attohttpc", attohttpc_text, attohttpc_binary);
binding_tests!("hyper", "hyper", hyper_text, hyper_binary);
binding_tests!("curl", "curl", curl_text, curl_binary);
binding_tests!("isahc", "isahc", isahc_text, isahc_binary);
binding_tests!("surf", "surf", surf_text, surf_binary);

#[cfg(feature = "reqwest")]
#[tokio::test]
async fn delegate_errors_pass_through_untranslated() {
    common::init_test_tracing();
    // Nothing listens on port 9; the delegate's connection failure must
    // surface as-is, wrapped but not reinterpreted.
    let err = text_via("reqwest", "http://127.0.0.1:9/hello".to_string())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FetchError::Delegate {
            delegate: "reqwest",
            ..
        }
    ));
}

#[cfg(feature = "hyper")]
#[tokio::test]
async fn host_port_binding_rejects_https() {
    common::init_test_tracing();
    let err = text_via("hyper", "https://example.tld/".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Delegate { delegate: "hyper", .. }));
}

#[cfg(feature = "reqwest")]
#[tokio::test]
async fn binary_body_is_not_utf8_decoded_while_text_fails() {
    let server = start_server().await;
    let url = format!("{}/image", server.uri());

    let bytes = binary_via("reqwest", url.clone()).await.unwrap();
    assert_eq!(bytes, PNG_BYTES);

    let err = text_via("reqwest", url).await.unwrap_err();
    assert!(matches!(err, FetchError::UnsupportedResultShape { .. }));
}

#[cfg(feature = "surf")]
#[tokio::test]
async fn per_target_client_is_reused_until_the_base_changes() {
    use anyfetch::bindings::surf::SurfAdapter;
    use anyfetch::Adapter;

    let first = start_server().await;
    let second = start_server().await;

    let (bodies, rebuilds) = tokio::task::spawn_blocking(move || {
        let mut adapter = SurfAdapter::default();
        let a = adapter.fetch_raw(&format!("{}/hello", first.uri()));
        // Same base, different path: the cached client serves it.
        let b = adapter.fetch_raw(&format!("{}/image", first.uri()));
        let after_same_base = adapter.rebuilds();
        // Different port, so a different base: the client is rebuilt.
        let c = adapter.fetch_raw(&format!("{}/hello", second.uri()));
        ((a, b, c), (after_same_base, adapter.rebuilds()))
    })
    .await
    .expect("fetch thread panicked");

    let (a, b, c) = bodies;
    assert_eq!(a.unwrap().as_bytes(), b"hello");
    assert_eq!(b.unwrap().as_bytes(), PNG_BYTES);
    assert_eq!(c.unwrap().as_bytes(), b"hello");
    assert_eq!(rebuilds, (1, 2));
}

#[cfg(feature = "surf")]
#[tokio::test]
async fn per_target_client_survives_a_base_change() {
    let first = start_server().await;
    let second = start_server().await;

    let (a, b) = tokio::task::spawn_blocking(move || {
        let mut ctx = Context::new().with_table(FixedTable::new(["surf"]));
        let a = ctx.get_text(&format!("{}/hello", first.uri()), None);
        // Different port, so a different base: the client is rebuilt.
        let b = ctx.get_text(&format!("{}/hello", second.uri()), None);
        (a, b)
    })
    .await
    .expect("fetch thread panicked");

    assert_eq!(a.unwrap(), "hello");
    assert_eq!(b.unwrap(), "hello");
}
