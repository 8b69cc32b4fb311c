use super::*;
use crate::api::modrinth::MockCatalogClient;
use crate::testing::{project, version};

fn mock() -> Arc<MockCatalogClient> {
    Arc::new(
        MockCatalogClient::new()
            .with_project(project("sodium"), vec![version("sodium", "s1")])
            .with_failure("flaky", "boom"),
    )
}

#[tokio::test]
async fn test_project_lookups_hit_the_catalog_once() {
    let inner = mock();
    let cached = CachedCatalog::new(inner.clone());

    let by_slug = cached.get_project("sodium").await.unwrap();
    let again = cached.get_project("sodium").await.unwrap();
    let by_id = cached.get_project("id-sodium").await.unwrap();

    assert_eq!(by_slug, again);
    assert_eq!(by_slug, by_id);
    assert_eq!(inner.count_calls("project:sodium"), 1);
    assert_eq!(inner.count_calls("project:id-sodium"), 0);
}

#[tokio::test]
async fn test_versions_cached_per_filter() {
    let inner = mock();
    let cached = CachedCatalog::new(inner.clone());

    cached.list_versions("id-sodium", Some("1.20.1"), Some(ModLoader::Fabric)).await.unwrap();
    cached.list_versions("id-sodium", Some("1.20.1"), Some(ModLoader::Fabric)).await.unwrap();
    cached.list_versions("id-sodium", None, None).await.unwrap();

    assert_eq!(inner.count_calls("versions:id-sodium"), 2);
}

#[tokio::test]
async fn test_errors_are_not_cached() {
    let inner = mock();
    let cached = CachedCatalog::new(inner.clone());

    assert!(cached.get_project("flaky").await.is_err());
    assert!(cached.get_project("flaky").await.is_err());

    assert_eq!(inner.count_calls("project:flaky"), 2);
    assert_eq!(cached.cached_projects().await, 0);
}

#[tokio::test]
async fn test_details_and_search_pass_through() {
    let mut page = ProjectDetails::from(project("lithium"));
    page.body = "Server optimisations".to_string();
    let inner = Arc::new(MockCatalogClient::new().with_details(page));
    let cached = CachedCatalog::new(inner.clone());

    assert_eq!(cached.project_details("lithium").await.unwrap().body, "Server optimisations");
    cached.search("lith", None, SearchSort::Downloads, 5, 0).await.unwrap();

    assert_eq!(inner.count_calls("details:lithium"), 1);
    assert_eq!(inner.last_search_sort(), Some(SearchSort::Downloads));
}
