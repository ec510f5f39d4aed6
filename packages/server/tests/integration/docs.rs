use std::sync::Arc;

use estate_server::config::AppEnvironment;
use estate_server::repository::MemoryPropertyRepository;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn openapi_document_is_served_in_development() {
    let app = TestApp::spawn_with(
        Arc::new(MemoryPropertyRepository::new()),
        AppEnvironment::Development,
    )
    .await;

    let res = app.get(routes::OPENAPI).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["info"]["title"], "Real Estate API");
    let paths = res.body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/properties/filter"));
    assert!(paths.contains_key("/api/properties/{id}"));
    assert!(res.body["components"]["schemas"]["ErrorBody"].is_object());
}

#[tokio::test]
async fn docs_are_not_mounted_in_production() {
    let app = TestApp::spawn().await;

    assert_eq!(app.get(routes::OPENAPI).await.status, 404);
    assert_eq!(app.get("/swagger-ui/").await.status, 404);
}
