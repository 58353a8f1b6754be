//! End-to-end inspection tests through a real listener and upstream.

use axum::http::StatusCode;

mod common;

#[tokio::test]
async fn test_benign_post_is_relayed_unchanged() {
    let (upstream, recorder) = common::start_mock_upstream().await;
    let (proxy, shutdown) = common::start_proxy(common::config_for(upstream)).await;

    let body = r#"{"user": "alice", "note": "hello world", "qty": 3}"#;
    let res = common::client()
        .post(format!("http://{proxy}/orders?page=2"))
        .header("content-type", "application/json")
        .header("x-request-tag", "abc")
        .body(body)
        .send()
        .await
        .expect("Proxy unreachable");

    // Upstream status, headers and body come back untouched.
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["x-upstream"], "mock");
    assert_eq!(res.text().await.unwrap(), body);

    let received = recorder.received();
    assert_eq!(received.len(), 1);
    let req = &received[0];
    assert_eq!(req.method, "POST");
    assert_eq!(req.path_and_query, "/orders?page=2");
    assert_eq!(req.body.as_ref(), body.as_bytes());
    assert_eq!(req.headers["x-request-tag"], "abc");
    assert_eq!(req.headers["x-forwarded-for"], "127.0.0.1");

    shutdown.trigger();
}

#[tokio::test]
async fn test_eleventh_request_is_rate_limited() {
    let (upstream, recorder) = common::start_mock_upstream().await;
    let (proxy, shutdown) = common::start_proxy(common::config_for(upstream)).await;
    let client = common::client();

    for i in 0..10 {
        let res = client.get(format!("http://{proxy}/")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED, "request {} should pass", i + 1);
    }

    let res = client.get(format!("http://{proxy}/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(recorder.count(), 10);

    shutdown.trigger();
}

#[tokio::test]
async fn test_sql_injection_in_query_is_blocked() {
    let (upstream, recorder) = common::start_mock_upstream().await;
    let (proxy, shutdown) = common::start_proxy(common::config_for(upstream)).await;

    let res = common::client()
        .get(format!("http://{proxy}/search?q=1%27%20or%201=1"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(recorder.count(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_nested_json_xss_is_blocked() {
    let (upstream, recorder) = common::start_mock_upstream().await;
    let (proxy, shutdown) = common::start_proxy(common::config_for(upstream)).await;

    // Only visible once the JSON escape is decoded.
    let res = common::client()
        .post(format!("http://{proxy}/api/comments"))
        .header("content-type", "application/json; charset=utf-8")
        .body(r#"{"a": ["safe", {"b": "\u003cscript>steal()"}]}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(recorder.count(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_encoded_form_field_is_blocked() {
    let (upstream, recorder) = common::start_mock_upstream().await;
    let (proxy, shutdown) = common::start_proxy(common::config_for(upstream)).await;

    let res = common::client()
        .post(format!("http://{proxy}/post"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("name=bob&comment=%3Cscript%3E")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(recorder.count(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_path_traversal_in_put_body_is_blocked() {
    let (upstream, recorder) = common::start_mock_upstream().await;
    let (proxy, shutdown) = common::start_proxy(common::config_for(upstream)).await;

    let res = common::client()
        .put(format!("http://{proxy}/files"))
        .header("content-type", "text/plain")
        .body("path=../../etc/shadow")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(recorder.count(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_harmless_and_malformed_json_is_forwarded() {
    let (upstream, recorder) = common::start_mock_upstream().await;
    let (proxy, shutdown) = common::start_proxy(common::config_for(upstream)).await;
    let client = common::client();

    let bodies = [r#"{"a":123,"b":true}"#, r#"{"a": "\u003cscript>",,}"#];
    for body in bodies {
        let res = client
            .post(format!("http://{proxy}/api"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED, "body {body} should pass");
    }

    let received = recorder.received();
    assert_eq!(received.len(), 2);
    for (req, body) in received.iter().zip(bodies) {
        assert_eq!(req.body.as_ref(), body.as_bytes());
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_large_benign_post_is_forwarded_by_default() {
    let (upstream, recorder) = common::start_mock_upstream().await;
    let (proxy, shutdown) = common::start_proxy(common::config_for(upstream)).await;

    let body = vec![b'a'; 10 * 1024 * 1024 + 1];
    let res = common::client()
        .post(format!("http://{proxy}/upload"))
        .header("content-type", "text/plain")
        .body(body.clone())
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), StatusCode::CREATED);
    let received = recorder.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].body.len(), body.len());
    assert!(received[0].body.iter().all(|b| *b == b'a'));

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_is_rejected_when_limit_configured() {
    let (upstream, recorder) = common::start_mock_upstream().await;
    let mut config = common::config_for(upstream);
    config.inspection.max_body_size = Some(64);
    let (proxy, shutdown) = common::start_proxy(config).await;

    let res = common::client()
        .post(format!("http://{proxy}/upload"))
        .header("content-type", "text/plain")
        .body("x".repeat(1024))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(recorder.count(), 0);

    shutdown.trigger();
}
