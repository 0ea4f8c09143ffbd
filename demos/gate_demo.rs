//! End-to-end walkthrough of the access decision flow.
//!
//! This example wires an engine to an in-memory subscription store and
//! walks through the states a real deployment sees: an anonymous caller,
//! a free account, a fresh checkout bridged by a grace credential, and
//! the moment the subscription record lands.
//!
//! # Running
//!
//! ```bash
//! cargo run --example gate_demo
//! ```
//!
//! # Note
//!
//! In production the signing secret comes from your secret manager, the
//! store wraps your real account database, and the carrier adapts your
//! HTTP framework's cookie jar.

use paygate::{
    AccessEngine, AccessRequest, EmptyCarrier, PaygateConfig, PaygateError, SubscriptionRecord,
    SubscriptionStatus, SubscriptionStore,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Toy account store: one map, no I/O.
#[derive(Default)]
struct DemoStore {
    records: Mutex<HashMap<String, SubscriptionRecord>>,
}

impl DemoStore {
    fn activate(&self, subject_id: &str) {
        self.records.lock().unwrap().insert(
            subject_id.to_string(),
            SubscriptionRecord {
                status: SubscriptionStatus::Active,
                cancel_at_period_end: false,
                current_period_end: None,
            },
        );
    }
}

impl SubscriptionStore for DemoStore {
    fn find_latest_subscription(
        &self,
        subject_id: &str,
    ) -> Result<Option<SubscriptionRecord>, PaygateError> {
        Ok(self.records.lock().unwrap().get(subject_id).cloned())
    }
}

fn main() -> Result<(), PaygateError> {
    let store = Arc::new(DemoStore::default());
    let config = PaygateConfig {
        signing_secret: Some("demo-secret-do-not-ship".to_string()),
        secure_credentials: false, // plain HTTP for the demo
        ..PaygateConfig::default()
    };
    let store_dyn: Arc<dyn SubscriptionStore> = store.clone();
    let engine = AccessEngine::new(config, store_dyn)?;

    let route = "/api/practice";

    // 1. Anonymous caller, no credential.
    let request = AccessRequest {
        route,
        subject_id: None,
        request_id: None,
    };
    let decision = engine.decide(&request, &EmptyCarrier);
    println!("anonymous        -> allowed={}", decision.allowed);

    // 2. Logged-in account without a subscription.
    let request = AccessRequest {
        route,
        subject_id: Some("account-123"),
        request_id: None,
    };
    let decision = engine.decide(&request, &EmptyCarrier);
    println!("free account     -> allowed={}", decision.allowed);

    // 3. Checkout just completed: the billing webhook has not landed yet,
    //    but the checkout success handler issued a grace credential.
    let credential = engine.issue_grace_credential()?;
    let mut cookies = HashMap::new();
    cookies.insert(credential.name.to_string(), credential.value);
    let decision = engine.decide(&request, &cookies);
    println!("grace window     -> allowed={}", decision.allowed);

    // 4. The subscription record propagates. The next decision confirms
    //    real entitlement and asks us to expire the now-redundant cookie.
    store.activate("account-123");
    engine.reset_cache(); // the demo skips the 30s negative TTL
    let decision = engine.decide(&request, &cookies);
    println!(
        "subscribed       -> allowed={} clear_credential={}",
        decision.allowed, decision.clear_credential
    );
    if decision.clear_credential {
        let cleared = engine.clear_credential();
        println!("response clears  -> {}={:?}", cleared.name, cleared.value);
    }

    // 5. Cookie gone, subscription authoritative from here on.
    let decision = engine.decide(&request, &EmptyCarrier);
    println!("steady state     -> allowed={}", decision.allowed);

    Ok(())
}
