use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::helpers::TestApp;

#[tokio::test]
async fn create_then_get_membro() -> Result<()> {
    let app = TestApp::spawn().await?;

    let created = app
        .create(
            "/membros/create",
            &json!({ "nome": "Ana", "sobrenome": "Souza", "celular": 11987654321i64 }),
        )
        .await?;
    let id = created["id_membro"].as_i64().expect("id assigned by the store");

    let res = app.get(&format!("/membros/{id}")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await?;
    assert_eq!(fetched, created);
    assert_eq!(fetched["nome"], "Ana");
    assert_eq!(fetched["celular"], 11987654321i64);

    let (nome,): (String,) = sqlx::query_as("SELECT nome FROM membros WHERE id_membro = $1")
        .bind(id as i32)
        .fetch_one(&app.db)
        .await?;
    assert_eq!(nome, "Ana");

    Ok(())
}

#[tokio::test]
async fn list_membros_in_insertion_order() -> Result<()> {
    let app = TestApp::spawn().await?;

    for (nome, celular) in [("Ana", 1), ("Bruno", 2), ("Carla", 3)] {
        app.create("/membros/create", &json!({ "nome": nome, "celular": celular }))
            .await?;
    }

    let res = app.get("/membros/").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let membros: Vec<Value> = res.json().await?;
    let nomes = membros.iter().map(|m| m["nome"].as_str().unwrap()).collect::<Vec<_>>();
    assert_eq!(nomes, ["Ana", "Bruno", "Carla"]);

    Ok(())
}

#[tokio::test]
async fn listing_twice_without_writes_gives_the_same_result() -> Result<()> {
    let app = TestApp::spawn().await?;

    app.create("/membros/create", &json!({ "nome": "Ana", "celular": 1 }))
        .await?;
    app.create("/membros/create", &json!({ "nome": "Bruno" }))
        .await?;

    let first: Value = app.get("/membros/").await?.json().await?;
    let second: Value = app.get("/membros/").await?.json().await?;

    assert_eq!(first, second);
    assert_eq!(first.as_array().map(Vec::len), Some(2));

    Ok(())
}

#[tokio::test]
async fn duplicate_celular_is_400() -> Result<()> {
    let app = TestApp::spawn().await?;

    app.create("/membros/create", &json!({ "nome": "Ana", "celular": 42 }))
        .await?;
    let res = app
        .post_json("/membros/create", &json!({ "nome": "Outra", "celular": 42 }))
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "detail": "Membro ja registrado" }));

    Ok(())
}

#[tokio::test]
async fn members_without_celular_are_not_duplicates() -> Result<()> {
    let app = TestApp::spawn().await?;

    app.create("/membros/create", &json!({ "nome": "Ana" })).await?;
    app.create("/membros/create", &json!({ "nome": "Ana" })).await?;

    Ok(())
}

#[tokio::test]
async fn get_unknown_membro_is_422() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get("/membros/9999").await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "detail": "Membro não encontrado" }));

    Ok(())
}

#[tokio::test]
async fn update_only_touches_sent_fields() -> Result<()> {
    let app = TestApp::spawn().await?;

    let created = app
        .create(
            "/membros/create",
            &json!({ "nome": "Ana", "sobrenome": "Souza", "celular": 5 }),
        )
        .await?;
    let id = created["id_membro"].as_i64().unwrap();

    let res = app
        .put_json(&format!("/membros/update/{id}"), &json!({ "nome": "Joana" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["nome"], "Joana");
    assert_eq!(updated["sobrenome"], "Souza");
    assert_eq!(updated["celular"], 5);

    // null clears, zero is a value
    let res = app
        .put_json(
            &format!("/membros/update/{id}"),
            &json!({ "sobrenome": null, "celular": 0 }),
        )
        .await?;
    let updated: Value = res.json().await?;
    assert_eq!(updated["sobrenome"], Value::Null);
    assert_eq!(updated["celular"], 0);

    Ok(())
}

#[tokio::test]
async fn update_of_missing_membro_is_422_instead_of_200() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .put_json("/membros/update/9999", &json!({ "nome": "Ninguem" }))
        .await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "detail": "Membro não encontrado" }));

    Ok(())
}

#[tokio::test]
async fn delete_returns_the_snapshot_and_removes_the_row() -> Result<()> {
    let app = TestApp::spawn().await?;

    let created = app
        .create("/membros/create", &json!({ "nome": "Ana", "celular": 7 }))
        .await?;
    let id = created["id_membro"].as_i64().unwrap();

    let res = app.delete(&format!("/membros/delete/{id}")).await?;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "Deletado": created }));

    let res = app.get(&format!("/membros/{id}")).await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = app.delete(&format!("/membros/delete/{id}")).await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    Ok(())
}
