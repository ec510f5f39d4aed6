use std::sync::Arc;

use estate_server::config::AppEnvironment;
use estate_server::error::{DATABASE_ERROR_MESSAGE, INTERNAL_ERROR_MESSAGE};

use crate::common::{Fault, FaultyRepository, TestApp, routes};

const SOME_ID: &str = "507f1f77bcf86cd799439011";

async fn faulty(fault: Fault, environment: AppEnvironment) -> TestApp {
    TestApp::spawn_with(Arc::new(FaultyRepository(fault)), environment).await
}

mod database_failures {
    use super::*;

    #[tokio::test]
    async fn unreachable_store_is_service_unavailable() {
        let app = faulty(Fault::Database, AppEnvironment::Production).await;

        let detail = routes::property(SOME_ID);
        for path in [routes::PROPERTIES, routes::FILTER, detail.as_str()] {
            let res = app.get(path).await;
            let message = res.assert_error(503, "Database Error");
            assert_eq!(message, DATABASE_ERROR_MESSAGE, "{path}");
        }
    }

    #[tokio::test]
    async fn driver_message_never_reaches_the_client() {
        let app = faulty(Fault::Database, AppEnvironment::Production).await;

        let res = app.get(routes::PROPERTIES).await;

        assert_eq!(res.status, 503);
        assert!(!res.text.contains("connection refused"), "{}", res.text);
        assert!(!res.text.contains("Failed to retrieve"), "{}", res.text);
        assert!(res.body.get("details").is_none());
        assert!(res.body.get("stackTrace").is_none());
        assert!(res.body.get("errors").is_none());
    }

    #[tokio::test]
    async fn validation_still_runs_before_the_store() {
        let app = faulty(Fault::Database, AppEnvironment::Production).await;

        let res = app.get(&routes::property("not-an-id")).await;
        res.assert_error(400, "Validation Error");

        let res = app
            .get_with_query(routes::FILTER, &[("minPrice", "9"), ("maxPrice", "1")])
            .await;
        res.assert_error(400, "Validation Error");
    }
}

mod unexpected_failures {
    use super::*;

    #[tokio::test]
    async fn unclassified_store_error_is_a_business_violation() {
        let app = faulty(Fault::Unclassified, AppEnvironment::Production).await;

        let res = app.get(routes::PROPERTIES).await;

        let message = res.assert_error(422, "Business Rule Violation");
        assert_eq!(message, "Failed to retrieve properties");
        assert!(!res.text.contains("cursor closed"), "{}", res.text);
    }

    #[tokio::test]
    async fn panicking_handler_is_an_internal_error() {
        let app = faulty(Fault::Panic, AppEnvironment::Production).await;

        let res = app.get(routes::PROPERTIES).await;

        let message = res.assert_error(500, "Internal Server Error");
        assert_eq!(message, INTERNAL_ERROR_MESSAGE);
        assert!(!res.text.contains("store driver crashed"), "{}", res.text);
    }

    #[tokio::test]
    async fn server_keeps_serving_after_a_panic() {
        let app = faulty(Fault::Panic, AppEnvironment::Production).await;

        assert_eq!(app.get(routes::PROPERTIES).await.status, 500);
        assert_eq!(app.get(routes::PROPERTIES).await.status, 500);
    }
}

mod diagnostics {
    use super::*;

    #[tokio::test]
    async fn development_exposes_details_and_cause_chain() {
        let app = faulty(Fault::Database, AppEnvironment::Development).await;

        let res = app.get(routes::PROPERTIES).await;

        let message = res.assert_error(503, "Database Error");
        assert_eq!(message, DATABASE_ERROR_MESSAGE);
        assert_eq!(
            res.body["details"],
            "Failed to retrieve properties from database"
        );
        let chain = res.body["stackTrace"].as_str().expect("stackTrace present");
        assert!(chain.contains("connection refused"), "{chain}");
    }

    #[tokio::test]
    async fn development_reports_panic_payload() {
        let app = faulty(Fault::Panic, AppEnvironment::Development).await;

        let res = app.get(routes::PROPERTIES).await;

        res.assert_error(500, "Internal Server Error");
        let chain = res.body["stackTrace"].as_str().expect("stackTrace present");
        assert!(chain.contains("store driver crashed"), "{chain}");
    }
}

mod trace_ids {
    use super::*;

    #[tokio::test]
    async fn caller_request_id_becomes_the_trace_id() {
        let app = TestApp::spawn().await;

        let res = app
            .get_with_request_id(&routes::property(SOME_ID), "req-42")
            .await;

        res.assert_error(404, "Not Found");
        assert_eq!(res.body["traceId"], "req-42");
        assert_eq!(res.request_id.as_deref(), Some("req-42"));
    }

    #[tokio::test]
    async fn generated_trace_id_matches_the_response_header() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::property(SOME_ID)).await;

        res.assert_error(404, "Not Found");
        let header = res.request_id.expect("x-request-id header present");
        assert_eq!(res.body["traceId"], header.as_str());
    }

    #[tokio::test]
    async fn each_request_gets_its_own_trace_id() {
        let app = TestApp::spawn().await;

        let first = app.get(&routes::property(SOME_ID)).await;
        let second = app.get(&routes::property(SOME_ID)).await;

        assert_ne!(first.body["traceId"], second.body["traceId"]);
    }
}
