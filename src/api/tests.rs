
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use sitepulse_core::{
        pipeline::config, AnalysisRequest, Envelope, EventBus, PipelineConfig, RunState,
    };
    use sitepulse_engine::ScriptedEngine;
    use std::time::Duration;
    use tower::ServiceExt;

    fn pipeline() -> Arc<AnalysisPipeline> {
        let engine = ScriptedEngine::new()
            .with_text(config::SITE_SNAPSHOT_TASK, r#"{"seo": [{"id": "seo-1"}]}"#)
            .with_text(config::SUMMARY_TASK, "Looks healthy.");
        Arc::new(AnalysisPipeline::new(
            Arc::new(EventBus::new()),
            Arc::new(engine),
            PipelineConfig::default(),
        ))
    }

    fn app(pipeline: &Arc<AnalysisPipeline>) -> Router {
        app_router(pipeline.clone(), "http://engine.test".to_string())
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_run(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/runs")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn wait_for_subscriber(bus: &EventBus, channel: &str) {
        for _ in 0..200 {
            if bus.subscriber_count(channel) > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("no subscriber on {}", channel);
    }

    #[tokio::test]
    async fn test_health() {
        let pipeline = pipeline();
        let response = app(&pipeline).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");

        let response = app(&pipeline).oneshot(get("/health/detailed")).await.unwrap();
        let body = json_body(response).await;
        assert_eq!(body["engine"]["base_url"], "http://engine.test");
        assert_eq!(body["engine"]["name"], "scripted");
        assert_eq!(body["event_bus"]["channels"], 0);
    }

    #[tokio::test]
    async fn test_create_run_rejects_invalid_url() {
        let pipeline = pipeline();
        let response = app(&pipeline)
            .oneshot(post_run(r#"{"url": "not a url"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("invalid url"));
    }

    #[tokio::test]
    async fn test_create_run_then_fetch_result() {
        let pipeline = pipeline();
        let response = app(&pipeline)
            .oneshot(post_run(r#"{"url": "https://example.org", "session_id": "abc"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let body = json_body(response).await;
        let run_id = body["data"]["run_id"].as_str().unwrap().to_string();

        let uri = format!("/api/v1/runs/{}/result", run_id);
        let mut outcome = None;
        for _ in 0..200 {
            let response = app(&pipeline).oneshot(get(&uri)).await.unwrap();
            if response.status() == StatusCode::OK {
                outcome = Some(json_body(response).await);
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let outcome = outcome.expect("run result never stored");
        assert_eq!(outcome["data"]["state"], "completed");
        assert_eq!(outcome["data"]["summary"], "Looks healthy.");
    }

    #[tokio::test]
    async fn test_unknown_result_is_not_found() {
        let pipeline = pipeline();
        let response = app(&pipeline)
            .oneshot(get("/api/v1/runs/missing/result"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_run_events_stream_as_sse() {
        let pipeline = pipeline();
        let response = app(&pipeline)
            .oneshot(get("/api/v1/runs/run-sse/events"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");

        wait_for_subscriber(pipeline.bus(), "run-sse").await;
        pipeline.spawn_run("run-sse".to_string(), AnalysisRequest::new("https://example.org"));

        // The body ends once the run's summary and terminal status went out
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        let envelopes: Vec<Envelope> = text
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|data| serde_json::from_str(data.trim_start()).unwrap())
            .collect();
        assert!(!text.contains("event:"));

        assert_eq!(envelopes[0].event.state(), RunState::Connecting);
        assert_eq!(envelopes[0].revision, 0);
        assert!(envelopes.iter().all(Envelope::verify));
        assert!(envelopes.iter().any(|e| e.event.kind() == "summary"));
        assert_eq!(envelopes.last().unwrap().event.state(), RunState::Completed);
        assert_eq!(pipeline.bus().channel_count(), 0);
    }

    #[tokio::test]
    async fn test_site_events_stream_as_sse() {
        use futures::StreamExt;

        let pipeline = pipeline();
        let bus = pipeline.bus().clone();
        let mut observer = bus.subscribe("site-7");

        let response = app(&pipeline)
            .oneshot(get("/api/v1/sites/site-7/events"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");

        let mut body = response.into_body().into_data_stream();
        let mut envelopes: Vec<Envelope> = Vec::new();
        while envelopes.is_empty() {
            let chunk = body.next().await.unwrap().unwrap();
            let text = String::from_utf8(chunk.to_vec()).unwrap();
            envelopes.extend(
                text.lines()
                    .filter_map(|line| line.strip_prefix("data:"))
                    .map(|data| serde_json::from_str::<Envelope>(data.trim_start()).unwrap()),
            );
        }
        assert_eq!(envelopes[0].event.state(), RunState::Connecting);
        assert_eq!(envelopes[0].revision, 0);
        assert!(envelopes[0].verify());
        assert_eq!(bus.subscriber_count("site-7"), 2);

        // Client goes away; the stream announces it and releases its queue
        drop(body);
        let mut seen = Vec::new();
        while seen.last() != Some(&RunState::Disconnected) {
            let envelope = tokio::time::timeout(Duration::from_secs(1), observer.recv())
                .await
                .unwrap()
                .unwrap();
            seen.push(envelope.event.state());
        }
        assert_eq!(seen, vec![RunState::Connecting, RunState::Disconnected]);
        assert_eq!(bus.subscriber_count("site-7"), 1);
    }
