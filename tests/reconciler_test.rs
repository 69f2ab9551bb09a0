use traefik_gateway::discovery::{
    DiscoveryEvent, Node, NODE_ID_FALLBACK_PROPERTY, NODE_ID_PROPERTY, PATH_PREFIX_PROPERTY, PUBLIC_PROPERTY,
};
use traefik_gateway::gateway::Reconciler;
use traefik_gateway::routing::RoutingError;

fn foobar(node_id: &str, address: &str) -> Node {
    Node::new("foobar", "1.33.711", address).with_property(NODE_ID_PROPERTY, node_id)
}

fn active(node: Node) -> DiscoveryEvent {
    DiscoveryEvent::NodeActive { node }
}

fn expired(node: Node) -> DiscoveryEvent {
    DiscoveryEvent::NodeExpired { node }
}

#[test]
fn test_active_node_fans_out_versions() {
    let mut reconciler = Reconciler::new();
    let changed = reconciler.on_event(active(foobar("n1", "http://127.0.0.1:5000"))).unwrap();
    assert!(changed);

    let table = reconciler.table();
    assert!(table.is_dirty());
    assert_eq!(table.frontend_count(), 3);
    assert_eq!(table.backend_count(), 3);

    for (suffix, prefix) in [
        ("1", "/foobar/api/v1"),
        ("1.33", "/foobar/api/v1.33"),
        ("1.33.711", "/foobar/api/v1.33.711"),
    ] {
        let frontend = table.frontend(&format!("fe-foobar-v{}", suffix)).unwrap();
        assert_eq!(frontend.backend, format!("be-foobar-v{}", suffix));
        assert_eq!(frontend.path_prefix, prefix);

        let backend = table.backend(&format!("be-foobar-v{}", suffix)).unwrap();
        assert_eq!(backend.servers.get("n1").map(String::as_str), Some("http://127.0.0.1:5000"));
    }
}

#[test]
fn test_expired_node_removes_routes() {
    let mut reconciler = Reconciler::new();
    reconciler.on_event(active(foobar("n1", "http://127.0.0.1:5000"))).unwrap();
    reconciler.table_mut().mark_clean();

    reconciler.on_event(expired(foobar("n1", "http://127.0.0.1:5000"))).unwrap();

    let table = reconciler.table();
    assert!(table.is_dirty());
    assert_eq!(table.frontend_count(), 0);
    assert_eq!(table.backend_count(), 0);
}

#[test]
fn test_two_nodes_share_frontends() {
    let mut reconciler = Reconciler::new();
    reconciler.on_event(active(foobar("n1", "http://127.0.0.1:5000"))).unwrap();
    reconciler.on_event(active(foobar("n2", "http://127.0.0.1:5001"))).unwrap();

    assert_eq!(reconciler.table().frontend_count(), 3);
    assert_eq!(reconciler.table().backend("be-foobar-v1").unwrap().len(), 2);

    reconciler.on_event(expired(foobar("n1", "http://127.0.0.1:5000"))).unwrap();

    let table = reconciler.table();
    assert_eq!(table.frontend_count(), 3);
    let pool = table.backend("be-foobar-v1.33").unwrap();
    assert_eq!(pool.len(), 1);
    assert!(pool.servers.contains_key("n2"));
}

#[test]
fn test_minor_versions_share_major_route() {
    let mut reconciler = Reconciler::new();
    reconciler.on_event(active(foobar("n1", "http://127.0.0.1:5000"))).unwrap();
    reconciler
        .on_event(active(
            Node::new("foobar", "1.34.0", "http://127.0.0.1:6000").with_property(NODE_ID_PROPERTY, "n3"),
        ))
        .unwrap();

    let table = reconciler.table();
    // v1 공유 + v1.33, v1.33.711, v1.34, v1.34.0
    assert_eq!(table.frontend_count(), 5);
    assert_eq!(table.backend("be-foobar-v1").unwrap().len(), 2);
    assert_eq!(table.backend("be-foobar-v1.34").unwrap().len(), 1);
}

#[test]
fn test_prerelease_only_gets_exact_route() {
    let mut reconciler = Reconciler::new();
    reconciler
        .on_event(active(
            Node::new("foobar", "2.0.0-beta.1", "http://127.0.0.1:5000").with_property(NODE_ID_PROPERTY, "n1"),
        ))
        .unwrap();

    let table = reconciler.table();
    assert_eq!(table.frontend_count(), 1);
    assert!(table.frontend("fe-foobar-v2.0.0-beta.1").is_some());
    assert!(table.frontend("fe-foobar-v2").is_none());
}

#[test]
fn test_repeated_active_is_idempotent() {
    let mut reconciler = Reconciler::new();
    reconciler.on_event(active(foobar("n1", "http://127.0.0.1:5000"))).unwrap();
    let before = reconciler.table().snapshot();
    reconciler.table_mut().mark_clean();

    let changed = reconciler.on_event(active(foobar("n1", "http://127.0.0.1:5000"))).unwrap();

    assert!(!changed);
    assert!(!reconciler.table().is_dirty());
    assert_eq!(reconciler.table().snapshot(), before);
}

#[test]
fn test_missing_identity_is_rejected_without_changes() {
    let mut reconciler = Reconciler::new();
    let node = Node::new("foobar", "1.0.0", "http://127.0.0.1:5000");

    let err = reconciler.on_event(active(node.clone())).unwrap_err();
    assert!(matches!(err, RoutingError::MissingIdentity { .. }));

    let err = reconciler.on_event(expired(node)).unwrap_err();
    assert!(matches!(err, RoutingError::MissingIdentity { .. }));

    assert!(!reconciler.table().is_dirty());
    assert_eq!(reconciler.table().frontend_count(), 0);
}

#[test]
fn test_empty_service_is_rejected() {
    let mut reconciler = Reconciler::new();
    let node = Node::new("", "1.0.0", "http://127.0.0.1:5000").with_property(NODE_ID_PROPERTY, "n1");

    let err = reconciler.on_event(active(node)).unwrap_err();
    assert!(matches!(err, RoutingError::InvalidNode { .. }));
    assert!(!reconciler.table().is_dirty());
}

#[test]
fn test_fallback_node_id_property() {
    let mut reconciler = Reconciler::new();
    let node = Node::new("foobar", "latest", "http://127.0.0.1:5000").with_property(NODE_ID_FALLBACK_PROPERTY, "alt");

    reconciler.on_event(active(node)).unwrap();

    let pool = reconciler.table().backend("be-foobar-vlatest").unwrap();
    assert!(pool.servers.contains_key("alt"));
}

#[test]
fn test_private_node_is_not_routed() {
    let mut reconciler = Reconciler::new();
    let node = foobar("n1", "http://127.0.0.1:5000").with_property(PUBLIC_PROPERTY, "false");

    reconciler.on_event(active(node)).unwrap();

    assert_eq!(reconciler.table().frontend_count(), 0);
    assert_eq!(reconciler.table().backend_count(), 0);
    assert!(!reconciler.table().is_dirty());
}

#[test]
fn test_custom_path_template() {
    let mut reconciler = Reconciler::new();
    let node = foobar("n1", "http://127.0.0.1:5000")
        .with_property(PATH_PREFIX_PROPERTY, "svc/{SERVICE_NAME}/{SERVICE_VERSION}");

    reconciler.on_event(active(node)).unwrap();

    let frontend = reconciler.table().frontend("fe-foobar-v1.33").unwrap();
    assert_eq!(frontend.rule(), "PathPrefixStrip: /svc/foobar/1.33");
}

#[test]
fn test_unknown_event_is_ignored() {
    let mut reconciler = Reconciler::new();
    reconciler.on_event(DiscoveryEvent::Unknown).unwrap();
    assert!(!reconciler.table().is_dirty());
}

#[test]
fn test_expire_of_unknown_node_is_noop() {
    let mut reconciler = Reconciler::new();
    reconciler.on_event(expired(foobar("ghost", "http://127.0.0.1:5000"))).unwrap();
    assert!(!reconciler.table().is_dirty());
}

#[test]
fn test_node_round_trip_on_shared_pools() {
    let mut reconciler = Reconciler::new();
    reconciler.on_event(active(foobar("n1", "http://127.0.0.1:5000"))).unwrap();
    let before = reconciler.table().snapshot();

    assert!(reconciler.on_event(active(foobar("n2", "http://127.0.0.1:5001"))).unwrap());
    assert!(reconciler.on_event(expired(foobar("n2", "http://127.0.0.1:5001"))).unwrap());

    assert_eq!(reconciler.table().snapshot(), before);
}
