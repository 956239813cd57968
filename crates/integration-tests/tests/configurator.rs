//! Option picker and price summary.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::http::StatusCode;

use configurator_core::{AddonOption, NewOption, OptionId, OptionPatch};
use configurator_integration_tests::{TestApp, fixture_catalog};
use configurator_server::db::{CatalogStore, MemoryCatalogStore, StoreError};

/// Fails every call while `down` is set.
struct OutageStore {
    inner: MemoryCatalogStore,
    down: AtomicBool,
}

impl OutageStore {
    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            Err(StoreError::Io(std::io::Error::other("store unavailable")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatalogStore for OutageStore {
    async fn list_all(&self) -> Result<Vec<AddonOption>, StoreError> {
        self.check()?;
        self.inner.list_all().await
    }

    async fn create(&self, fields: NewOption) -> Result<OptionId, StoreError> {
        self.check()?;
        self.inner.create(fields).await
    }

    async fn update(&self, id: &OptionId, patch: OptionPatch) -> Result<(), StoreError> {
        self.check()?;
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &OptionId) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn test_index_lists_options_with_empty_summary() {
    let mut app = TestApp::new().await;

    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Capa Básica"));
    assert!(response.body.contains("R$ 150,00"));
    assert!(response.body.contains("Resumo do Orçamento"));
    assert!(response.body.contains("Selecione as opções ao lado"));
    assert!(!response.body.contains("Total:"));

    let first = response.body.find("Capa Básica").unwrap();
    let last = response.body.find("Relevo").unwrap();
    assert!(first < last, "newest option renders first");
}

#[tokio::test]
async fn test_toggle_updates_running_total() {
    let mut app = TestApp::new().await;

    app.post_form("/selection/toggle", &[("option_id", "capa-basica")])
        .await
        .assert_redirect("/");
    app.post_form("/selection/toggle", &[("option_id", "laminacao-fosca")])
        .await
        .assert_redirect("/");

    let response = app.get("/").await;
    assert!(response.body.contains("Total:"));
    assert!(response.body.contains("R$ 230,00"));
    assert!(!response.body.contains("Selecione as opções ao lado"));

    app.post_form("/selection/toggle", &[("option_id", "capa-basica")])
        .await;

    let response = app.get("/").await;
    assert!(!response.body.contains("R$ 230,00"));
    assert!(response.body.contains(r#"<span class="total">R$ 80,00</span>"#));
}

#[tokio::test]
async fn test_selection_is_per_browser() {
    let mut app = TestApp::new().await;
    app.post_form("/selection/toggle", &[("option_id", "relevo")])
        .await;
    assert!(app.get("/").await.body.contains("Total:"));

    app.clear_cookies();
    let response = app.get("/").await;
    assert!(response.body.contains("Selecione as opções ao lado"));
}

#[tokio::test]
async fn test_deleted_option_drops_out_of_selection() {
    let mut app = TestApp::new().await;
    app.post_form("/selection/toggle", &[("option_id", "capa-basica")])
        .await;
    app.post_form("/selection/toggle", &[("option_id", "laminacao-fosca")])
        .await;

    app.state()
        .catalog()
        .remove(&OptionId::new("capa-basica"))
        .await
        .unwrap();

    let response = app.get("/").await;
    assert!(!response.body.contains("Capa Básica"));
    assert!(response.body.contains(r#"<span class="total">R$ 80,00</span>"#));
}

#[tokio::test]
async fn test_unknown_option_in_toggle_is_ignored_by_total() {
    let mut app = TestApp::new().await;
    app.post_form("/selection/toggle", &[("option_id", "does-not-exist")])
        .await
        .assert_redirect("/");

    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Selecione as opções ao lado"));
}

#[tokio::test]
async fn test_option_detail() {
    let mut app = TestApp::new().await;

    let response = app.get("/options/relevo").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Textura em relevo para um efeito tátil"));
    assert!(response.body.contains("R$ 110,00"));
    assert!(response.body.contains("Adicionar ao orçamento"));

    app.post_form("/selection/toggle", &[("option_id", "relevo")])
        .await;
    let response = app.get("/options/relevo").await;
    assert!(response.body.contains("Remover do orçamento"));
}

#[tokio::test]
async fn test_option_detail_not_found() {
    let mut app = TestApp::new().await;

    let response = app.get("/options/missing").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_probes() {
    let mut app = TestApp::new().await;

    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");

    let response = app.get("/health/ready").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_page_recovers_after_startup_load_failure() {
    let store = Arc::new(OutageStore {
        inner: MemoryCatalogStore::with_options(fixture_catalog()),
        down: AtomicBool::new(true),
    });
    let mut app = TestApp::with_store(store.clone()).await;

    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Erro ao carregar opções"));
    assert!(!response.body.contains("Resumo do Orçamento"));

    store.down.store(false, Ordering::SeqCst);

    let response = app.get("/").await;
    assert!(!response.body.contains("Erro ao carregar opções"));
    assert!(response.body.contains("Capa Básica"));
    assert!(response.body.contains("Resumo do Orçamento"));

    let response = app.get("/options/relevo").await;
    assert_eq!(response.status, StatusCode::OK);
}
