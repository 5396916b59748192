//! End-to-end scenarios exercised directly against [`Facade::dispatch`],
//! without a real TCP socket — the façade is the unit under test; the
//! transport layer has its own tests for the wire framing.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use twister_hub_daemon::facade::Facade;
use twister_hub_daemon::project::InMemoryProjectModel;
use twister_hub_daemon::registry::{ConnectionRegistry, Session};
use twister_hub_daemon::transport::{OutboundFrame, PeerHandle};
use twister_hub_core::Request;

fn connected_session(registry: &ConnectionRegistry, addr: &str) -> mpsc::UnboundedReceiver<OutboundFrame> {
    let (tx, rx) = mpsc::unbounded_channel();
    let peer = PeerHandle::new(addr.to_string(), tx);
    registry.insert(Session::new(addr.to_string(), peer));
    rx
}

fn new_facade(registry: ConnectionRegistry) -> Facade {
    new_facade_with_users(registry, &[])
}

/// Build a façade whose in-memory project model already knows the given
/// `(user, password)` pairs, so `login` can succeed against them.
fn new_facade_with_users(registry: ConnectionRegistry, users: &[(&str, &str)]) -> Facade {
    let project = InMemoryProjectModel::new();
    for (user, password) in users {
        project.add_user(user, password);
    }
    Facade::new(
        registry,
        Arc::new(project),
        "127.0.0.1:18812".to_string(),
        Duration::from_secs(1),
        "info".to_string(),
    )
}

async fn call(facade: &Facade, addr: &str, id: u64, method: &str, args: Vec<Value>) -> Value {
    let response = facade.dispatch(addr.to_string(), Request::new(id, method, args)).await;
    response.result.expect("response always carries a result")
}

#[tokio::test]
async fn scenario_happy_path_login_register_start() {
    let registry = ConnectionRegistry::new();
    let mut client_rx = connected_session(&registry, "10.0.0.7:51000");
    connected_session(&registry, "10.0.0.7:51001");
    let facade = new_facade_with_users(registry.clone(), &[("alice", "anything")]);

    call(&facade, "10.0.0.7:51000", 1, "hello", vec![Value::String("client".into())]).await;
    let logged_in = call(
        &facade,
        "10.0.0.7:51000",
        2,
        "login",
        vec![Value::String("alice".into()), Value::String("anything".into())],
    )
    .await;
    assert_eq!(logged_in, Value::Bool(true));

    let facade = Arc::new(facade);
    let register_call = tokio::spawn({
        let facade = facade.clone();
        async move {
            facade
                .dispatch(
                    "10.0.0.7:51000".to_string(),
                    Request::new(
                        3,
                        "register_eps",
                        vec![Value::Array(vec![
                            Value::String("ep-linux".into()),
                            Value::String("ep-win".into()),
                        ])],
                    ),
                )
                .await
        }
    });

    // `register_eps` issues a courtesy `hello` upcall on the same
    // connection once the ledger is updated; answer it so the call above
    // actually completes.
    let frame = client_rx.recv().await.unwrap();
    let OutboundFrame::Request(hello_req) = frame else {
        panic!("expected courtesy hello upcall");
    };
    assert_eq!(hello_req.method, "hello");
    registry
        .get("10.0.0.7:51000")
        .unwrap()
        .peer
        .resolve(twister_hub_core::Response::ok(hello_req.id, Value::Bool(true)));

    let registered = register_call.await.unwrap().result.unwrap();
    // InMemoryProjectModel accepts every EP name by default.
    assert_eq!(
        registered,
        Value::Array(vec![Value::String("ep-linux".into()), Value::String("ep-win".into())])
    );

    // A second session (the "launcher") logs in and starts the EP.
    call(
        &facade,
        "10.0.0.7:51001",
        4,
        "login",
        vec![Value::String("alice".into()), Value::String("anything".into())],
    )
    .await;

    let start_call = tokio::spawn({
        let facade = facade.clone();
        async move {
            facade
                .dispatch(
                    "10.0.0.7:51001".to_string(),
                    Request::new(5, "start_ep", vec![Value::String("ep-linux".into())]),
                )
                .await
        }
    });

    let frame = client_rx.recv().await.unwrap();
    let OutboundFrame::Request(start_req) = frame else {
        panic!("expected the dispatcher's start upcall");
    };
    assert_eq!(start_req.method, "start");

    registry
        .get("10.0.0.7:51000")
        .unwrap()
        .peer
        .resolve(twister_hub_core::Response::ok(start_req.id, Value::Bool(true)));

    let response = start_call.await.unwrap();
    assert_eq!(response.result, Some(Value::Bool(true)));
}

#[tokio::test]
async fn scenario_unauthenticated_call_is_rejected() {
    let registry = ConnectionRegistry::new();
    connected_session(&registry, "1.1.1.1:1");
    let facade = new_facade(registry);

    let response = facade
        .dispatch(
            "1.1.1.1:1".to_string(),
            Request::new(1, "get_user_variable", vec![Value::String("k".into())]),
        )
        .await;

    let result = response.result.unwrap();
    assert_eq!(result, Value::Bool(false));
}

#[tokio::test]
async fn scenario_resource_reserve_set_save_release() {
    let registry = ConnectionRegistry::new();
    connected_session(&registry, "2.2.2.2:1");
    let facade = new_facade_with_users(registry, &[("bob", "pw")]);

    call(
        &facade,
        "2.2.2.2:1",
        1,
        "login",
        vec![Value::String("bob".into()), Value::String("pw".into())],
    )
    .await;

    call(
        &facade,
        "2.2.2.2:1",
        2,
        "create_new_tb",
        vec![Value::String("rig-1".into()), Value::String("/".into()), json!({})],
    )
    .await;

    call(&facade, "2.2.2.2:1", 3, "reserve_tb", vec![Value::String("/rig-1".into())]).await;

    call(
        &facade,
        "2.2.2.2:1",
        4,
        "update_meta_tb",
        vec![
            Value::String("rig-1".into()),
            Value::String("/".into()),
            json!({ "os": "linux" }),
        ],
    )
    .await;

    let saved = call(
        &facade,
        "2.2.2.2:1",
        5,
        "save_release_reserved_tb",
        vec![Value::String("/rig-1".into())],
    )
    .await;
    assert_eq!(saved, Value::Bool(true));

    let reserved_after = call(
        &facade,
        "2.2.2.2:1",
        6,
        "is_tb_reserved",
        vec![Value::String("/rig-1".into())],
    )
    .await;
    assert_eq!(reserved_after, Value::Bool(false));

    let node = call(&facade, "2.2.2.2:1", 7, "get_tb", vec![Value::String("/rig-1".into())]).await;
    assert_eq!(node.get("os"), Some(&Value::String("linux".into())));
}

#[tokio::test]
async fn scenario_reserve_conflict_is_already_reserved() {
    let registry = ConnectionRegistry::new();
    connected_session(&registry, "3.3.3.3:1");
    connected_session(&registry, "3.3.3.3:2");
    let facade = new_facade_with_users(registry, &[("carol", "pw"), ("dave", "pw")]);

    call(&facade, "3.3.3.3:1", 1, "login", vec![Value::String("carol".into()), Value::String("pw".into())]).await;
    call(&facade, "3.3.3.3:2", 1, "login", vec![Value::String("dave".into()), Value::String("pw".into())]).await;

    call(
        &facade,
        "3.3.3.3:1",
        2,
        "create_new_sut",
        vec![Value::String("sut-1".into()), Value::String("/".into()), json!({})],
    )
    .await;
    call(&facade, "3.3.3.3:1", 3, "reserve_sut", vec![Value::String("/sut-1".into())]).await;

    let response = facade
        .dispatch(
            "3.3.3.3:2".to_string(),
            Request::new(4, "reserve_sut", vec![Value::String("/sut-1".into())]),
        )
        .await;
    let result = response.result.unwrap();
    assert!(result.as_str().unwrap().starts_with("*ERROR*"));
}

#[tokio::test]
async fn scenario_run_plugin_converts_failure_to_string_result() {
    let registry = ConnectionRegistry::new();
    connected_session(&registry, "4.4.4.4:1");
    let facade = new_facade_with_users(registry, &[("erin", "pw")]);

    call(&facade, "4.4.4.4:1", 1, "login", vec![Value::String("erin".into()), Value::String("pw".into())]).await;

    let result = call(
        &facade,
        "4.4.4.4:1",
        2,
        "run_plugin",
        vec![json!({ "command": "does-not-exist", "params": {} })],
    )
    .await;

    assert!(result.as_str().unwrap().starts_with("*ERROR*"));
}
