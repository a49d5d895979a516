//! Shared test setup: in-memory storage, a scripted LLM gateway and a recording bot.

#![allow(dead_code)]

use async_trait::async_trait;
use consultant::{assemble, AppConfig, Bot, Chat, Components, FileProductSource, Result};
use llm_gateway::{GatewayError, LlmGateway, MessageRole};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storage::Storage;
use tempfile::TempDir;
use tokio::sync::{mpsc, Notify, Semaphore};

/// Gateway that returns a fixed reply (or fails) and records every call. When held, each
/// call waits for [`StubGateway::release_one`] before answering.
pub struct StubGateway {
    reply: Mutex<String>,
    fail: AtomicBool,
    calls: Mutex<Vec<(String, MessageRole)>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    entered: Notify,
}

impl StubGateway {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(reply.to_string()),
            fail: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
            entered: Notify::new(),
        })
    }

    /// From now on calls block until released one by one.
    pub fn hold(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Lets one held call answer.
    pub fn release_one(&self) {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            gate.add_permits(1);
        }
    }

    /// Waits until a call has reached the gateway.
    pub async fn wait_entered(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.entered.notified())
            .await
            .expect("gateway call within 5s");
    }

    pub fn set_reply(&self, reply: &str) {
        *self.reply.lock().unwrap() = reply.to_string();
    }

    /// When set, every call fails with HTTP 500.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<(String, MessageRole)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(p, _)| p.clone())
    }
}

#[async_trait]
impl LlmGateway for StubGateway {
    async fn complete(&self, prompt: &str, role: MessageRole) -> std::result::Result<String, GatewayError> {
        self.calls.lock().unwrap().push((prompt.to_string(), role));
        self.entered.notify_one();
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate open").forget();
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(self.reply.lock().unwrap().clone())
    }
}

/// One recorded `send_message` call.
#[derive(Debug, Clone)]
pub struct SentRecord {
    pub chat_id: i64,
    pub text: String,
}

/// Bot that records every sent message.
pub struct MockBot {
    tx: mpsc::UnboundedSender<SentRecord>,
}

impl MockBot {
    pub fn with_receiver() -> (Arc<Self>, mpsc::UnboundedReceiver<SentRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        let _ = self.tx.send(SentRecord {
            chat_id: chat.id,
            text: text.to_string(),
        });
        Ok(())
    }
}

pub fn test_config(product_dir: &str) -> AppConfig {
    AppConfig {
        bot_token: "test_token".to_string(),
        telegram_api_url: None,
        log_file: "logs/test.log".to_string(),
        database_url: "sqlite::memory:".to_string(),
        llm_api_key: "sk-test-0123456789".to_string(),
        llm_base_url: "http://127.0.0.1:9/v1".to_string(),
        llm_model: "deepseek-chat".to_string(),
        llm_timeout_secs: 5,
        session_idle_timeout_secs: 15 * 60,
        reaper_interval_secs: 3 * 60,
        product_data_dir: product_dir.to_string(),
        product_api_url: None,
    }
}

pub struct TestEnv {
    pub storage: Storage,
    pub gateway: Arc<StubGateway>,
    pub components: Components,
    pub product_dir: TempDir,
}

impl TestEnv {
    /// Writes `product<id>.json` into the product directory.
    pub fn write_product(&self, id: &str, json: &str) {
        std::fs::write(self.product_dir.path().join(format!("product{}.json", id)), json)
            .expect("write product file");
    }
}

/// In-memory storage, stub gateway replying `reply`, file product source in a temp dir.
pub async fn setup(reply: &str) -> TestEnv {
    let storage = Storage::connect("sqlite::memory:")
        .await
        .expect("Failed to open storage");
    let gateway = StubGateway::new(reply);
    let product_dir = TempDir::new().expect("TempDir::new must succeed");
    let config = test_config(product_dir.path().to_str().expect("utf8 path"));
    let components = assemble(
        &config,
        storage.clone(),
        gateway.clone(),
        Arc::new(FileProductSource::new(product_dir.path())),
    );
    TestEnv {
        storage,
        gateway,
        components,
        product_dir,
    }
}
