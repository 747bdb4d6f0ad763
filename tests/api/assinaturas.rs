use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::helpers::TestApp;

/// Creates a member and a plan, returning their ids.
async fn membro_and_plano(app: &TestApp) -> Result<(i64, i64)> {
    let membro = app
        .create("/membros/create", &json!({ "nome": "Ana", "celular": 1 }))
        .await?;
    let plano = app
        .create("/planos/create", &json!({ "nome": "Mensal", "preco": 100 }))
        .await?;

    Ok((
        membro["id_membro"].as_i64().unwrap(),
        plano["id_plano"].as_i64().unwrap(),
    ))
}

#[tokio::test]
async fn create_and_get_subscription() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (id_membro, id_plano) = membro_and_plano(&app).await?;

    let created = app
        .create(
            "/assinaturas/create",
            &json!({
                "ativo": true,
                "data_ativacao": "2024-01-15T10:30:00",
                "id_membro": id_membro,
                "id_plano": id_plano
            }),
        )
        .await?;
    let id = created["id_assinatura"].as_i64().unwrap();
    assert_eq!(created["data_ativacao"], "2024-01-15T10:30:00");

    let res = app.get(&format!("/assinaturas/{id}")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await?;
    assert_eq!(fetched, created);

    Ok(())
}

#[tokio::test]
async fn subscription_for_unknown_member_is_422() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, id_plano) = membro_and_plano(&app).await?;

    let res = app
        .post_json(
            "/assinaturas/create",
            &json!({
                "ativo": true,
                "data_ativacao": "2024-01-15T10:30:00",
                "id_membro": 9999,
                "id_plano": id_plano
            }),
        )
        .await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "detail": "Membro ou plano não encontrado" }));

    Ok(())
}

#[tokio::test]
async fn deactivating_a_subscription_writes_false() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (id_membro, id_plano) = membro_and_plano(&app).await?;
    let created = app
        .create(
            "/assinaturas/create",
            &json!({
                "ativo": true,
                "data_ativacao": "2024-01-15T10:30:00",
                "id_membro": id_membro,
                "id_plano": id_plano
            }),
        )
        .await?;
    let id = created["id_assinatura"].as_i64().unwrap();

    let res = app
        .put_json(&format!("/assinaturas/update/{id}"), &json!({ "ativo": false }))
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["ativo"], false);
    assert_eq!(updated["id_membro"], id_membro);

    Ok(())
}

#[tokio::test]
async fn deleting_a_subscribed_member_is_400() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (id_membro, id_plano) = membro_and_plano(&app).await?;
    app.create(
        "/assinaturas/create",
        &json!({
            "ativo": true,
            "data_ativacao": "2024-01-15T10:30:00",
            "id_membro": id_membro,
            "id_plano": id_plano
        }),
    )
    .await?;

    let res = app.delete(&format!("/membros/delete/{id_membro}")).await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "detail": "Membro possui assinaturas" }));

    Ok(())
}

#[tokio::test]
async fn delete_unknown_subscription_is_422() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.delete("/assinaturas/delete/9999").await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "detail": "Assinatura não encontrada" }));

    Ok(())
}
