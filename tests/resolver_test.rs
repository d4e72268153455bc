mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::{Call, RecordingCatalog, instance};
use service_catalog::services::catalog::{CatalogBackend, HealthStatus, InMemoryCatalog};
use service_catalog::services::resolver::{ResolveError, Resolver, select_instance};

#[tokio::test]
async fn test_resolve_only_returns_passing_instance() {
    let catalog = Arc::new(RecordingCatalog::with_instances(vec![
        instance("a", "catalog-svc", "10.0.0.1", 9001, HealthStatus::Passing),
        instance("b", "catalog-svc", "10.0.0.2", 9001, HealthStatus::Critical),
    ]));
    let resolver = Resolver::new(catalog);

    for _ in 0..200 {
        let uri = resolver.resolve("catalog-svc").await.unwrap();
        assert_eq!(uri.to_string(), "http://10.0.0.1:9001/");
    }
}

#[tokio::test]
async fn test_resolve_skips_warning_instances() {
    let catalog = InMemoryCatalog::new();
    catalog.insert(instance("a", "orders", "10.0.0.1", 8080, HealthStatus::Warning));
    catalog.insert(instance("b", "orders", "10.0.0.2", 8080, HealthStatus::Passing));
    let resolver = Resolver::new(Arc::new(catalog));

    for _ in 0..50 {
        let uri = resolver.resolve("orders").await.unwrap();
        assert_eq!(uri.host(), Some("10.0.0.2"));
        assert_eq!(uri.port_u16(), Some(8080));
        assert_eq!(uri.scheme_str(), Some("http"));
    }
}

#[tokio::test]
async fn test_resolve_without_instances_fails() {
    let resolver = Resolver::new(Arc::new(InMemoryCatalog::new()));

    let err = resolver.resolve("missing").await.unwrap_err();
    match err {
        ResolveError::NoHealthyInstances { service_name } => assert_eq!(service_name, "missing"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_resolve_with_only_critical_instances_fails() {
    let catalog = Arc::new(RecordingCatalog::with_instances(vec![
        instance("a", "orders", "10.0.0.1", 8080, HealthStatus::Critical),
        instance("b", "orders", "10.0.0.2", 8080, HealthStatus::Warning),
    ]));
    let resolver = Resolver::new(catalog);

    let err = resolver.resolve("orders").await.unwrap_err();
    assert!(matches!(err, ResolveError::NoHealthyInstances { .. }));
}

#[tokio::test]
async fn test_resolve_reports_catalog_unavailable() {
    let catalog = Arc::new(RecordingCatalog::failing());
    let resolver = Resolver::new(catalog.clone());

    let err = resolver.resolve("orders").await.unwrap_err();
    assert!(matches!(err, ResolveError::CatalogUnavailable { .. }));
    assert_eq!(catalog.calls(), vec![Call::Query("orders".to_string())]);
}

#[tokio::test]
async fn test_resolve_follows_health_changes() {
    let catalog = InMemoryCatalog::new();
    catalog.insert(instance("a", "orders", "10.0.0.1", 8080, HealthStatus::Passing));
    let resolver = Resolver::new(Arc::new(catalog.clone()));

    assert!(resolver.resolve("orders").await.is_ok());

    assert!(catalog.set_health("a", HealthStatus::Critical));
    assert!(matches!(
        resolver.resolve("orders").await,
        Err(ResolveError::NoHealthyInstances { .. })
    ));

    assert!(!catalog.set_health("unknown", HealthStatus::Passing));
}

#[tokio::test]
async fn test_resolve_distribution_is_uniform() {
    let catalog = InMemoryCatalog::new();
    let addresses = ["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"];
    for (i, address) in addresses.iter().enumerate() {
        let id = format!("orders-{i}");
        catalog.insert(instance(&id, "orders", address, 8080, HealthStatus::Passing));
    }
    let resolver = Resolver::new(Arc::new(catalog));

    let rounds = 20_000;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..rounds {
        let uri = resolver.resolve("orders").await.unwrap();
        *counts.entry(uri.host().unwrap().to_string()).or_default() += 1;
    }

    // 期望每个实例约 1/4，允许 ±3%
    let expected = rounds / addresses.len();
    let tolerance = rounds * 3 / 100;
    assert_eq!(counts.len(), addresses.len());
    for address in addresses {
        let count = counts[address];
        assert!(
            count.abs_diff(expected) < tolerance,
            "{address} selected {count} times, expected about {expected}"
        );
    }
}

#[tokio::test]
async fn test_resolve_is_shareable_across_tasks() {
    let catalog = InMemoryCatalog::new();
    catalog.insert(instance("a", "orders", "10.0.0.1", 8080, HealthStatus::Passing));
    catalog.insert(instance("b", "orders", "10.0.0.2", 8080, HealthStatus::Passing));
    let resolver = Resolver::new(Arc::new(catalog));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let resolver = resolver.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..100 {
                resolver.resolve("orders").await.unwrap();
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_resolve_brackets_ipv6_hosts() {
    let catalog = InMemoryCatalog::new();
    catalog.insert(instance("a", "orders", "::1", 8080, HealthStatus::Passing));
    let resolver = Resolver::new(Arc::new(catalog));

    let uri = resolver.resolve("orders").await.unwrap();
    assert_eq!(uri.to_string(), "http://[::1]:8080/");
}

#[tokio::test]
async fn test_resolve_rejects_empty_address() {
    let catalog = InMemoryCatalog::new();
    catalog.insert(instance("a", "orders", "", 8080, HealthStatus::Passing));
    let resolver = Resolver::new(Arc::new(catalog));

    assert!(matches!(
        resolver.resolve("orders").await,
        Err(ResolveError::InvalidAddress { .. })
    ));
}

#[test]
fn test_select_instance_on_empty_set() {
    assert!(select_instance(&[]).is_none());

    let single = [instance("a", "orders", "10.0.0.1", 8080, HealthStatus::Passing)];
    assert_eq!(select_instance(&single).map(|i| i.id.as_str()), Some("a"));
}

#[tokio::test]
async fn test_in_memory_catalog_filters_by_service_name() {
    let catalog = InMemoryCatalog::new();
    catalog.insert(instance("a", "orders", "10.0.0.1", 8080, HealthStatus::Passing));
    catalog.insert(instance("b", "billing", "10.0.0.2", 8080, HealthStatus::Passing));

    let instances = catalog.healthy_instances("orders").await.unwrap();
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].id, "a");
    assert_eq!(catalog.len(), 2);
}
