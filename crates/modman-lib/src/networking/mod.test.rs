use super::*;

#[test]
fn test_networking_config_defaults() {
    let config = NetworkingConfig::default();
    assert_eq!(config.jobs, 4);
    assert_eq!(config.timeout_seconds, 30);
    assert_eq!(config.retries, 5);
}

#[test]
fn test_zero_jobs_is_rejected() {
    let result = NetworkingManager::new(NetworkingConfig {
        jobs: 0,
        ..NetworkingConfig::default()
    });
    assert!(matches!(
        result,
        Err(NetworkingError::InvalidJobCount { count: 0 })
    ));
}

#[test]
fn test_user_agent_names_the_tool() {
    assert!(USER_AGENT.starts_with("modman/"));
}

#[tokio::test]
async fn test_manager_carries_retry_budget() {
    let manager = NetworkingManager::new(NetworkingConfig {
        retries: 2,
        ..NetworkingConfig::default()
    })
    .unwrap();
    assert_eq!(manager.http().max_retries(), 2);
}

#[tokio::test]
async fn test_semaphore_bounds_concurrent_permits() {
    let manager = NetworkingManager::new(NetworkingConfig {
        jobs: 2,
        ..NetworkingConfig::default()
    })
    .unwrap();

    let first = manager.acquire().await.unwrap();
    let _second = manager.acquire().await.unwrap();

    let third = tokio::time::timeout(Duration::from_millis(50), manager.acquire()).await;
    assert!(third.is_err(), "third permit should wait for a free slot");

    drop(first);
    let third = tokio::time::timeout(Duration::from_millis(50), manager.acquire()).await;
    assert!(third.is_ok());
}
