use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::helpers::TestApp;

#[tokio::test]
async fn duplicate_plan_name_is_400() -> Result<()> {
    let app = TestApp::spawn().await?;

    app.create("/planos/create", &json!({ "nome": "Plano 1 ano", "preco": 1200.0 }))
        .await?;
    let res = app
        .post_json("/planos/create", &json!({ "nome": "Plano 1 ano", "preco": 999.0 }))
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "detail": "Plano ja registrado" }));

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM planos")
        .fetch_one(&app.db)
        .await?;
    assert_eq!(count, 1);

    Ok(())
}

#[tokio::test]
async fn create_update_and_delete_plan() -> Result<()> {
    let app = TestApp::spawn().await?;

    let created = app
        .create("/planos/create", &json!({ "nome": "Mensal", "preco": 120.5 }))
        .await?;
    let id = created["id_plano"].as_i64().unwrap();
    assert_eq!(created["preco"], 120.5);

    let res = app
        .put_json(&format!("/planos/update/{id}"), &json!({ "id_plano": id, "preco": 0 }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["nome"], "Mensal");
    assert_eq!(updated["preco"], 0.0);

    let res = app.delete(&format!("/planos/delete/{id}")).await?;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body: Value = res.json().await?;
    assert_eq!(body["Deletado"]["id_plano"], id);

    Ok(())
}

#[tokio::test]
async fn renaming_a_plan_to_a_taken_name_is_400() -> Result<()> {
    let app = TestApp::spawn().await?;

    app.create("/planos/create", &json!({ "nome": "Mensal", "preco": 100 }))
        .await?;
    let anual = app
        .create("/planos/create", &json!({ "nome": "Anual", "preco": 1000 }))
        .await?;
    let id = anual["id_plano"].as_i64().unwrap();

    let res = app
        .put_json(&format!("/planos/update/{id}"), &json!({ "nome": "Mensal" }))
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn plan_with_long_name_is_422_and_not_stored() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_json(
            "/planos/create",
            &json!({ "nome": "Plano com um nome comprido demais", "preco": 10 }),
        )
        .await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"][0]["loc"], json!(["body", "nome"]));
    assert_eq!(body["body"]["preco"], 10);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM planos")
        .fetch_one(&app.db)
        .await?;
    assert_eq!(count, 0);

    Ok(())
}
