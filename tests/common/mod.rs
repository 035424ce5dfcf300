//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use agora::config::EngineConfig;
use agora::domain::Account;
use agora::store::DocumentGateway;
use agora::{DiscussionService, MemoryGateway};

/// Initialize tracing once per test binary; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Gateway and service wired together with the default configuration.
pub fn service() -> (Arc<MemoryGateway>, DiscussionService<MemoryGateway>) {
    init_tracing();
    let gateway = Arc::new(MemoryGateway::new());
    let service = DiscussionService::new(gateway.clone());
    (gateway, service)
}

/// Like [`service`], with a larger commit retry budget for contention tests.
pub fn contended_service(
    retries: u32,
) -> (Arc<MemoryGateway>, DiscussionService<MemoryGateway>) {
    init_tracing();
    let gateway = Arc::new(MemoryGateway::new());
    let config = EngineConfig::builder()
        .max_commit_retries(retries)
        .build()
        .expect("valid config");
    let service = DiscussionService::with_config(gateway.clone(), config);
    (gateway, service)
}

/// Register an account named `display_name` and return it.
pub async fn register(gateway: &MemoryGateway, display_name: &str) -> Account {
    let handle = display_name.to_lowercase();
    let account = Account::new(
        display_name,
        handle.clone(),
        format!("{handle}@example.com"),
    );
    gateway
        .upsert_account(account.clone())
        .await
        .expect("account registration");
    account
}
