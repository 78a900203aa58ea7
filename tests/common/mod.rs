#![allow(dead_code)]

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use taskboard_api::config::{AppConfig, StoreBackend};
use taskboard_api::database::{EntityStore, MemoryStore};
use taskboard_api::{server, AppState};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        config.database.backend = StoreBackend::Memory;
        config.security.jwt_secret = TEST_SECRET.to_string();

        // The server outlives any single test's runtime, so it gets its own
        std::thread::Builder::new()
            .name("taskboard-test-server".to_string())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .expect("failed to build server runtime");
                runtime.block_on(async move {
                    let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
                    let state = AppState::from_config(&config, store);
                    if let Err(e) = server::serve(state, &config).await {
                        eprintln!("test server stopped: {e:?}");
                    }
                });
            })
            .context("failed to spawn server thread")?;

        Ok(Self { port, base_url })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn test server"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Handle that cannot collide with records created by other tests
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

/// A registered user together with a bearer token for it
pub struct Account {
    pub id: String,
    pub handle: String,
    pub token: String,
    pub user: Value,
}

pub async fn create_user(server: &TestServer, prefix: &str, role: &str) -> Result<Value> {
    let handle = unique(prefix);
    let res = reqwest::Client::new()
        .post(server.url("/users"))
        .json(&json!({
            "user_id": handle,
            "name": prefix.to_uppercase(),
            "email": format!("{}@example.com", handle),
            "role": role,
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create user failed: {}", res.status());
    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}

pub async fn login(server: &TestServer, handle: &str) -> Result<String> {
    let res = reqwest::Client::new()
        .post(server.url("/login"))
        .json(&json!({ "user_id": handle }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
    let body: Value = res.json().await?;
    body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("login response without token")
}

pub async fn register(server: &TestServer, prefix: &str, role: &str) -> Result<Account> {
    let user = create_user(server, prefix, role).await?;
    let handle = user["user_id"].as_str().context("user without handle")?.to_string();
    let id = user["id"].as_str().context("user without id")?.to_string();
    let token = login(server, &handle).await?;
    Ok(Account { id, handle, token, user })
}

pub async fn create_project(server: &TestServer, owner: &Account, name: &str, members: &[&str]) -> Result<Value> {
    let res = reqwest::Client::new()
        .post(server.url("/projects"))
        .bearer_auth(&owner.token)
        .json(&json!({ "name": name, "ownerId": owner.id, "memberIds": members }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create project failed: {}", res.status());
    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}

pub async fn create_task(server: &TestServer, caller: &Account, payload: Value) -> Result<Value> {
    let res = reqwest::Client::new()
        .post(server.url("/tasks"))
        .bearer_auth(&caller.token)
        .json(&payload)
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create task failed: {}", res.status());
    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}

pub async fn dashboard(server: &TestServer, caller: &Account) -> Result<Value> {
    let res = reqwest::Client::new()
        .get(server.url("/dashboard"))
        .bearer_auth(&caller.token)
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "dashboard failed: {}", res.status());
    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}

/// Collect the `id` of every element of a JSON array
pub fn ids(items: &Value) -> Vec<String> {
    items
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
