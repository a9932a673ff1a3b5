use mockito::Server;
use tempfile::TempDir;

use specver::version::cache::{ArtifactCache, ArtifactStore, download_artifact};
use specver::version::error::{ArtifactError, TargetError};
use specver::version::targets::RubyGemsRegistry;

#[tokio::test]
async fn download_artifact_reads_through_cache() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/gems/rake-10.3.2.gem")
        .with_status(200)
        .with_body(b"rake-gem")
        .expect(1)
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let cache = ArtifactCache::new(temp_dir.path()).unwrap();
    let registry = RubyGemsRegistry::new(&server.url());

    let first = download_artifact(&cache, &registry, "rake", "10.3.2")
        .await
        .unwrap();
    let second = download_artifact(&cache, &registry, "rake", "10.3.2")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(first, b"rake-gem");
    assert_eq!(second, first);
    assert_eq!(
        std::fs::read(cache.path_for("rake", "10.3.2")).unwrap(),
        b"rake-gem"
    );
}

#[tokio::test]
async fn download_artifact_does_not_cache_failures() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/gems/missing-1.0.gem")
        .with_status(404)
        .create_async()
        .await;

    let temp_dir = TempDir::new().unwrap();
    let cache = ArtifactCache::new(temp_dir.path()).unwrap();
    let registry = RubyGemsRegistry::new(&server.url());

    let result = download_artifact(&cache, &registry, "missing", "1.0").await;

    assert!(matches!(
        result,
        Err(ArtifactError::Fetch(TargetError::NotFound(_)))
    ));
    assert_eq!(cache.get("missing", "1.0").unwrap(), None);
}
