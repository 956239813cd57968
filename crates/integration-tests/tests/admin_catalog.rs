//! Creating, editing and deleting options from the admin page.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;

use configurator_core::{AddonOption, NewOption, OptionId, OptionPatch, Price};
use configurator_integration_tests::{TestApp, fixture_catalog};
use configurator_server::db::{CatalogStore, StoreError};

/// Serves the fixture catalog and rejects every write.
struct ReadOnlyStore;

fn unavailable() -> StoreError {
    StoreError::Io(std::io::Error::other("store unavailable"))
}

#[async_trait]
impl CatalogStore for ReadOnlyStore {
    async fn list_all(&self) -> Result<Vec<AddonOption>, StoreError> {
        Ok(fixture_catalog())
    }

    async fn create(&self, _fields: NewOption) -> Result<OptionId, StoreError> {
        Err(unavailable())
    }

    async fn update(&self, _id: &OptionId, _patch: OptionPatch) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn delete(&self, _id: &OptionId) -> Result<(), StoreError> {
        Err(unavailable())
    }
}

#[tokio::test]
async fn test_create_option_with_typed_digits() {
    let mut app = TestApp::new().await;
    app.sign_in().await;

    app.post_form(
        "/admin/options",
        &[
            ("name", "Hot Stamping"),
            ("description", "Aplicação de detalhes em dourado"),
            ("price", "12000"),
        ],
    )
    .await
    .assert_redirect("/admin");

    let catalog = app.state().catalog().snapshot().await;
    assert_eq!(catalog.options.len(), 4);
    assert_eq!(catalog.options[0].name, "Hot Stamping");
    assert_eq!(catalog.options[0].price, Price::from_cents(12000));

    let response = app.get("/").await;
    assert!(response.body.contains("Hot Stamping"));
    assert!(response.body.contains("R$ 120,00"));
}

#[tokio::test]
async fn test_create_option_with_formatted_price() {
    let mut app = TestApp::new().await;
    app.sign_in().await;

    app.post_form(
        "/admin/options",
        &[
            ("name", "Capa Premium"),
            ("description", "Acabamento especial"),
            ("price", "R$ 1.350,50"),
        ],
    )
    .await
    .assert_redirect("/admin");

    let catalog = app.state().catalog().snapshot().await;
    assert_eq!(catalog.options[0].price, Price::from_cents(135_050));
}

#[tokio::test]
async fn test_create_with_blank_field_is_rejected() {
    let mut app = TestApp::new().await;
    app.sign_in().await;

    let response = app
        .post_form(
            "/admin/options",
            &[("name", "Verniz"), ("description", "  "), ("price", "9500")],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Preencha todos os campos"));
    assert!(response.body.contains(r#"value="Verniz""#));
    assert_eq!(app.state().catalog().snapshot().await.options.len(), 3);
}

#[tokio::test]
async fn test_create_with_unreadable_price_is_rejected() {
    let mut app = TestApp::new().await;
    app.sign_in().await;

    let response = app
        .post_form(
            "/admin/options",
            &[("name", "Verniz"), ("description", "Localizado"), ("price", "abc")],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Preço inválido"));
}

#[tokio::test]
async fn test_create_with_negative_price_is_rejected() {
    let mut app = TestApp::new().await;
    app.sign_in().await;

    let response = app
        .post_form(
            "/admin/options",
            &[("name", "Desconto"), ("description", "Abatimento"), ("price", "-R$ 10,00")],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("O preço não pode ser negativo"));
}

#[tokio::test]
async fn test_create_with_fractional_centavos_is_rejected() {
    let mut app = TestApp::new().await;
    app.sign_in().await;

    let response = app
        .post_form(
            "/admin/options",
            &[("name", "Verniz"), ("description", "Localizado"), ("price", "1,005")],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("O preço deve ter no máximo duas casas decimais"));
    assert_eq!(app.state().catalog().snapshot().await.options.len(), 3);
}

#[tokio::test]
async fn test_update_option() {
    let mut app = TestApp::new().await;
    app.sign_in().await;

    app.post_form(
        "/admin/options/relevo",
        &[
            ("name", "Relevo"),
            ("description", "Textura em relevo para um efeito tátil"),
            ("price", "R$ 125,00"),
        ],
    )
    .await
    .assert_redirect("/admin");

    let catalog = app.state().catalog().snapshot().await;
    let relevo = catalog.find(&OptionId::new("relevo")).unwrap();
    assert_eq!(relevo.price, Price::from_cents(12500));
    assert_eq!(relevo.name, "Relevo");
    assert!(relevo.updated_at >= relevo.created_at);

    let response = app.get("/options/relevo").await;
    assert!(response.body.contains("R$ 125,00"));
}

#[tokio::test]
async fn test_update_updates_running_total() {
    let mut app = TestApp::new().await;
    app.post_form("/selection/toggle", &[("option_id", "capa-basica")])
        .await;
    app.sign_in().await;

    app.post_form(
        "/admin/options/capa-basica",
        &[
            ("name", "Capa Básica"),
            ("description", "Capa simples em material resistente"),
            ("price", "20000"),
        ],
    )
    .await
    .assert_redirect("/admin");

    let response = app.get("/").await;
    assert!(response.body.contains(r#"<span class="total">R$ 200,00</span>"#));
}

#[tokio::test]
async fn test_update_unknown_option_reports_failure() {
    let mut app = TestApp::new().await;
    app.sign_in().await;

    let response = app
        .post_form(
            "/admin/options/missing",
            &[("name", "X"), ("description", "Y"), ("price", "100")],
        )
        .await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.body.contains("Erro ao atualizar opção"));
}

#[tokio::test]
async fn test_delete_option() {
    let mut app = TestApp::new().await;
    app.sign_in().await;

    app.post_form("/admin/options/laminacao-fosca/delete", &[])
        .await
        .assert_redirect("/admin");

    let response = app.get("/admin").await;
    assert!(!response.body.contains("Laminação Fosca"));
    assert!(response.body.contains("Capa Básica"));
}

#[tokio::test]
async fn test_delete_last_option_shows_empty_state() {
    let mut app = TestApp::new().await;
    app.sign_in().await;

    for id in ["capa-basica", "laminacao-fosca", "relevo"] {
        app.post_form(&format!("/admin/options/{id}/delete"), &[])
            .await
            .assert_redirect("/admin");
    }

    let response = app.get("/admin").await;
    assert!(response.body.contains("Nenhuma opção cadastrada ainda."));
}

#[tokio::test]
async fn test_store_write_failures_are_reported() {
    let mut app = TestApp::with_store(Arc::new(ReadOnlyStore)).await;
    app.sign_in().await;

    let response = app
        .post_form(
            "/admin/options",
            &[("name", "Relevo Duplo"), ("description", "Textura"), ("price", "100")],
        )
        .await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.body.contains("Erro ao adicionar opção"));
    assert!(response.body.contains(r#"value="Relevo Duplo""#));

    let response = app.post_form("/admin/options/relevo/delete", &[]).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.body.contains("Erro ao deletar opção"));

    // The last good list stays visible.
    assert_eq!(app.state().catalog().snapshot().await.options.len(), 3);
}

#[tokio::test]
async fn test_failed_write_leaves_customer_page_intact() {
    let mut app = TestApp::with_store(Arc::new(ReadOnlyStore)).await;
    app.sign_in().await;

    let response = app.post_form("/admin/options/relevo/delete", &[]).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);

    app.clear_cookies();
    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Capa Básica"));
    assert!(response.body.contains("Resumo do Orçamento"));
    assert!(!response.body.contains("Erro ao deletar opção"));
}

#[tokio::test]
async fn test_admin_reload_clears_write_error() {
    let mut app = TestApp::with_store(Arc::new(ReadOnlyStore)).await;
    app.sign_in().await;

    let response = app.post_form("/admin/options/relevo/delete", &[]).await;
    assert!(response.body.contains("Erro ao deletar opção"));

    let response = app.get("/admin").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.body.contains("Erro ao deletar opção"));
    assert!(response.body.contains("Relevo"));
}
