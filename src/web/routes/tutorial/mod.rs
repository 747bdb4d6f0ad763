//! A small in-memory API showing off how requests get validated:
//! path bounds, query constraints, header reading, json bodies, forms and partial updates.

mod types;

pub use types::{FakeItem, Image, Item, ItemPatch, ItemStore, UserIn, UserOut};

use axum::{
    extract::State,
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::{
    web::{
        extract::{PathParams, ValidatedForm, ValidatedJson, ValidatedQuery},
        Error, WebResult,
    },
    AppState,
};
use types::{ItemsQuery, LoginForm, UserItemQuery, FAKE_ITEMS_DB};

/// TUTORIAL - Routes under the "/tutorial" path
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/tutorial/", get(root))
        .route("/tutorial/users/", get(read_users))
        .route("/tutorial/users/me", get(read_user_me))
        .route("/tutorial/users/{user_id}", get(read_user))
        .route("/tutorial/users/{user_id}/items/{item_id}", get(read_user_item))
        .route("/tutorial/items/", get(read_items).post(create_item))
        .route("/tutorial/items/{item_id}", put(update_item).patch(patch_item))
        .route("/tutorial/keyword-weights/", get(read_keyword_weights))
        .route("/tutorial/user/", post(create_user))
        .route("/tutorial/login/", post(login))
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello World" }))
}

async fn read_users() -> Json<[&'static str; 2]> {
    Json(["Rick", "Morty"])
}

async fn read_user_me() -> Json<Value> {
    Json(json!({ "user_id": "the current user" }))
}

async fn read_user(params: PathParams) -> Json<Value> {
    Json(json!({ "user_id": params.str("user_id") }))
}

async fn read_items(
    headers: HeaderMap,
    ValidatedQuery(query): ValidatedQuery<ItemsQuery>,
) -> Json<Value> {
    let mut results = Map::new();
    results.insert("items".into(), json!(FAKE_ITEMS_DB));
    if let Some(q) = query.q.filter(|q| !q.is_empty()) {
        results.insert("q".into(), Value::String(q));
    }
    if let Some(user_agent) = headers.get(USER_AGENT).and_then(|ua| ua.to_str().ok()) {
        results.insert("user_agent".into(), Value::String(user_agent.to_string()));
    }

    Json(Value::Object(results))
}

#[tracing::instrument(name = "Reading a user's item", skip_all)]
async fn read_user_item(
    params: PathParams,
    ValidatedQuery(query): ValidatedQuery<UserItemQuery>,
) -> WebResult<Json<Value>> {
    let user_id = params
        .int("user_id", 1, i64::MAX)
        .map_err(|violation| Error::validation(vec![violation], Value::Null))?;
    let item_id = params
        .int("item_id", 1, 1000)
        .map_err(|violation| Error::validation(vec![violation], Value::Null))?;

    if item_id > FAKE_ITEMS_DB.len() as i64 {
        return Err(Error::ItemNotFound);
    }

    let mut item = Map::new();
    item.insert("item_id".into(), json!(item_id));
    item.insert("owner_id".into(), json!(user_id));
    if let Some(q) = query.q.filter(|q| !q.is_empty()) {
        item.insert("q".into(), Value::String(q));
    }
    if !query.short {
        item.insert(
            "description".into(),
            json!("This is an amazing item that has a long description"),
        );
    }

    Ok(Json(Value::Object(item)))
}

async fn read_keyword_weights() -> Json<Value> {
    Json(json!({ "foo": 2.3, "bar": 3.4 }))
}

async fn create_item(body: ValidatedJson<Item>) -> (StatusCode, Json<Item>) {
    (StatusCode::CREATED, Json(body.data))
}

async fn create_user(body: ValidatedJson<UserIn>) -> (StatusCode, Json<UserOut>) {
    info!(username = %body.data.username, "User saved! ..not really");
    (StatusCode::CREATED, Json(UserOut::from(body.data)))
}

async fn login(ValidatedForm(form): ValidatedForm<LoginForm>) -> Json<Value> {
    Json(json!({ "username": form.username }))
}

/// Echoes the item back together with the id from the path. The path id wins over one in the body.
async fn update_item(params: PathParams, body: ValidatedJson<Item>) -> WebResult<Json<Value>> {
    let item_id = params
        .int("item_id", i64::MIN, i64::MAX)
        .map_err(|violation| Error::validation(vec![violation], body.raw.clone()))?;

    let mut item = match json!(body.data) {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    item.insert("item_id".into(), json!(item_id));

    Ok(Json(Value::Object(item)))
}

/// Partially updates a stored item, here `item_id` is the key of the item, e.g. "foo".
#[tracing::instrument(name = "Patching a stored item", skip_all)]
async fn patch_item(
    State(app_state): State<AppState>,
    params: PathParams,
    body: ValidatedJson<ItemPatch>,
) -> WebResult<Json<Item>> {
    let key = params.str("item_id").unwrap_or_default();
    let item = app_state
        .item_store
        .patch(key, body.data)
        .await
        .ok_or(Error::ItemNotFound)?;

    Ok(Json(item))
}
