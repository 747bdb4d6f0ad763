use std::net::SocketAddr;

use anyhow::Result;
use academia::{config::get_or_init_config, App};
use reqwest::{Client, Response};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

pub struct TestApp {
    pub addr: SocketAddr,
    pub http_client: Client,
    pub db: PgPool,
}

impl TestApp {
    /// Spawns the app on a random port with its own, migrated but unseeded, database.
    pub async fn spawn() -> Result<Self> {
        let mut config = get_or_init_config().clone();
        config.net_config.host = [127, 0, 0, 1];
        // Binding port 0 makes the OS pick a free port.
        config.net_config.app_port = 0;
        config.db_config.db_name = format!("academia_test_{}", Uuid::new_v4().simple());
        config.db_config.create_if_missing = true;
        config.db_config.seed_script = None;

        let app = App::build_from_config(&config).await?;
        let addr = app.local_addr()?;
        let db = app.app_state.database_mgr.db().clone();

        tokio::spawn(academia::serve(app));

        Ok(TestApp {
            addr,
            http_client: Client::new(),
            db,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.http_client.get(self.url(path)).send().await?)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Response> {
        Ok(self.http_client.post(self.url(path)).json(body).send().await?)
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> Result<Response> {
        Ok(self.http_client.put(self.url(path)).json(body).send().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<Response> {
        Ok(self.http_client.delete(self.url(path)).send().await?)
    }

    /// Creates an entity and returns it as json, fails the test on anything but 201.
    pub async fn create(&self, path: &str, body: &Value) -> Result<Value> {
        let res = self.post_json(path, body).await?;
        assert_eq!(res.status().as_u16(), 201, "creating at {path} failed");
        Ok(res.json().await?)
    }
}
