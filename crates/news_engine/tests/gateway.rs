use std::time::Duration;

use news_core::FailureKind;
use news_engine::{FetchSettings, NewsGateway, ReqwestNewsGateway, TOP_HEADLINES_PATH};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer, settings: FetchSettings) -> ReqwestNewsGateway {
    ReqwestNewsGateway::new(FetchSettings {
        base_url: server.uri(),
        ..settings
    })
    .expect("client builds")
}

#[tokio::test]
async fn fetches_and_decodes_top_headlines() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TOP_HEADLINES_PATH))
        .and(query_param("country", "eg"))
        .and(query_param("page", "2"))
        .and(query_param("pageSize", "20"))
        .and(header("X-Api-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "totalResults": 41,
            "articles": [
                { "title": "Headline", "urlToImage": "https://img.example.com/a.png" }
            ]
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(
        &server,
        FetchSettings {
            api_key: Some("secret".to_string()),
            page_size: Some(20),
            ..FetchSettings::default()
        },
    );

    let news = gateway.fetch("eg", "2").await.expect("fetch ok");
    assert!(news.is_ok());
    assert_eq!(news.total_results, 41);
    assert_eq!(news.articles.len(), 1);
    assert_eq!(news.articles[0].title, "Headline");
    assert_eq!(
        news.articles[0].url_to_image.as_deref(),
        Some("https://img.example.com/a.png")
    );
}

#[tokio::test]
async fn base_url_trailing_slash_is_tolerated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TOP_HEADLINES_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "totalResults": 0})),
        )
        .mount(&server)
        .await;

    let gateway = ReqwestNewsGateway::new(FetchSettings {
        base_url: format!("{}/", server.uri()),
        ..FetchSettings::default()
    })
    .unwrap();

    let news = gateway.fetch("us", "1").await.expect("fetch ok");
    assert!(news.articles.is_empty());
}

#[tokio::test]
async fn non_ok_status_payload_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TOP_HEADLINES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "code": "maximumResultsReached",
            "message": "You have requested too many results."
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, FetchSettings::default());

    let news = gateway.fetch("eg", "9").await.expect("payload decodes");
    assert!(!news.is_ok());
    assert_eq!(news.code.as_deref(), Some("maximumResultsReached"));
}

#[tokio::test]
async fn http_error_uses_endpoint_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TOP_HEADLINES_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid or incorrect."
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, FetchSettings::default());

    let err = gateway.fetch("eg", "1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(401));
    assert_eq!(err.message, "Your API key is invalid or incorrect.");
}

#[tokio::test]
async fn http_error_without_body_uses_status_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TOP_HEADLINES_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, FetchSettings::default());

    let err = gateway.fetch("eg", "1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert!(err.message.contains("503"));
}

#[tokio::test]
async fn invalid_json_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TOP_HEADLINES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>nope</html>", "text/html"))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, FetchSettings::default());

    let err = gateway.fetch("eg", "1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TOP_HEADLINES_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"status": "ok", "totalResults": 0})),
        )
        .mount(&server)
        .await;

    let gateway = gateway_for(
        &server,
        FetchSettings {
            request_timeout: Duration::from_millis(50),
            ..FetchSettings::default()
        },
    );

    let err = gateway.fetch("eg", "1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TOP_HEADLINES_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/json")
                .insert_header("Content-Length", "11")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let gateway = gateway_for(
        &server,
        FetchSettings {
            max_bytes: 10,
            ..FetchSettings::default()
        },
    );

    let err = gateway.fetch("eg", "1").await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn malformed_base_url_is_rejected() {
    let gateway = ReqwestNewsGateway::new(FetchSettings {
        base_url: "not a url".to_string(),
        ..FetchSettings::default()
    })
    .unwrap();

    let err = gateway.fetch("eg", "1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn redirect_chain_beyond_limit_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TOP_HEADLINES_PATH))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", format!("{}/hop/1", server.uri())),
        )
        .mount(&server)
        .await;
    for hop in 1..=4 {
        Mock::given(method("GET"))
            .and(path(format!("/hop/{hop}")))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/hop/{}", server.uri(), hop + 1)),
            )
            .mount(&server)
            .await;
    }

    let gateway = gateway_for(
        &server,
        FetchSettings {
            redirect_limit: 2,
            ..FetchSettings::default()
        },
    );

    let err = gateway.fetch("eg", "1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::RedirectLimitExceeded);
}
