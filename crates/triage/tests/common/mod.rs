use serde_json::{json, Value};
use triage_core::RoutingEngine;

pub fn engine() -> RoutingEngine {
    RoutingEngine::with_defaults().expect("builtin rules compile")
}

pub fn sample_history() -> Vec<Value> {
    vec![
        json!({"role": "user", "content": "the login endpoint returns 500"}),
        json!({"role": "assistant", "content": "I traced it to an expired auth token"}),
        json!(null),
        json!({"role": "user", "content": "can we add a regression test for that?"}),
    ]
}

#[allow(dead_code)]
pub const REQUESTS: &[&str] = &[
    "",
    "   ",
    "coordinating comprehensive analysis using 3 tasks in parallel: security, performance, testing",
    "docker container orchestration with kubernetes scaling",
    "urgent hotfix: the checkout api is down, fix asap <30s",
    "first migrate the schema, then backfill the warehouse, followed by a docs update",
    "delegate the frontend rewrite to sub-agents and supervise the react migration",
    "write a readme and a tutorial for the sdk",
    "profile the slow database queries and optimize the cache layer",
    "security audit of auth, encryption and xss handling across the api and ui",
    "ünïcödé ✓ request with émoji 🚀 and <5s bound",
    "hello",
];
