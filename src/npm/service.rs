// npm data accessor.
// Fronts the registry, downloads, and npms.io endpoints with a keyed TTL
// cache. Historical data (download ranges, quality scores) gets day-long
// TTLs; mutable metadata expires faster.

use tracing::debug;
use urlencoding::encode;

use crate::cache::{CacheKey, CacheStats, ResponseCache};
use crate::error::{DashError, Result};

use super::client::NpmClient;
use super::types::{
    DownloadPeriod, DownloadStats, NpmsPackageResponse, PackageDependencies, PackageManifest,
    QualityScore, RangeDownloads, RegistryDocument, SearchResponse, SearchResult,
};

const PACKAGE_TTL_SECS: i64 = 14_400;
const DOWNLOADS_TTL_SECS: i64 = 3600;
const RANGE_TTL_SECS: i64 = 86_400;
const VERSIONS_TTL_SECS: i64 = 14_400;
const QUALITY_TTL_SECS: i64 = 86_400;
const SEARCH_TTL_SECS: i64 = 3600;

/// Cached payloads, tagged by resource kind.
#[derive(Debug, Clone)]
enum NpmData {
    Package(PackageManifest),
    Downloads(DownloadStats),
    Range(RangeDownloads),
    Versions(Vec<String>),
    Quality(QualityScore),
    Search(Vec<SearchResult>),
}

/// npm accessor owning its client and response cache.
pub struct NpmService {
    client: NpmClient,
    cache: ResponseCache<NpmData>,
}

impl NpmService {
    pub fn new(client: NpmClient) -> Self {
        Self {
            client,
            cache: ResponseCache::new(),
        }
    }

    /// Get the manifest of a package's latest version.
    ///
    /// Resolves the `latest` dist-tag, falling back to the last version
    /// listed in the registry document.
    pub async fn package(&mut self, name: &str) -> Result<PackageManifest> {
        let key = CacheKey::new("package").push(name).build();
        if let Some(NpmData::Package(cached)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(cached);
        }

        debug!(%key, "cache miss, fetching");
        let document = self.fetch_registry_document(name).await?;
        let manifest = Self::latest_manifest(name, &document)?;

        self.cache
            .set(key, NpmData::Package(manifest.clone()), PACKAGE_TTL_SECS);
        Ok(manifest)
    }

    /// Get the aggregate download count for a period.
    pub async fn downloads(
        &mut self,
        name: &str,
        period: DownloadPeriod,
    ) -> Result<DownloadStats> {
        let key = CacheKey::new("downloads")
            .push(name)
            .push(period.as_str())
            .build();
        if let Some(NpmData::Downloads(cached)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(cached);
        }

        debug!(%key, "cache miss, fetching");
        let response = self
            .client
            .get_downloads(&format!(
                "/downloads/point/{}/{}",
                period.as_str(),
                encode(name)
            ))
            .await?;
        let stats: DownloadStats = response.json().await?;

        self.cache
            .set(key, NpmData::Downloads(stats.clone()), DOWNLOADS_TTL_SECS);
        Ok(stats)
    }

    /// Get the daily download time series for a date range (YYYY-MM-DD).
    pub async fn download_range(
        &mut self,
        name: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<RangeDownloads> {
        let key = CacheKey::new("downloads-range")
            .push(name)
            .push(start_date)
            .push(end_date)
            .build();
        if let Some(NpmData::Range(cached)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(cached);
        }

        debug!(%key, "cache miss, fetching");
        let response = self
            .client
            .get_downloads(&format!(
                "/downloads/range/{}:{}/{}",
                start_date,
                end_date,
                encode(name)
            ))
            .await?;
        let range: RangeDownloads = response.json().await?;

        self.cache
            .set(key, NpmData::Range(range.clone()), RANGE_TTL_SECS);
        Ok(range)
    }

    /// Get every published version of a package, in registry order.
    pub async fn versions(&mut self, name: &str) -> Result<Vec<String>> {
        let key = CacheKey::new("versions").push(name).build();
        if let Some(NpmData::Versions(cached)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(cached);
        }

        debug!(%key, "cache miss, fetching");
        let document = self.fetch_registry_document(name).await?;
        let versions: Vec<String> = document.versions.keys().cloned().collect();

        self.cache
            .set(key, NpmData::Versions(versions.clone()), VERSIONS_TTL_SECS);
        Ok(versions)
    }

    /// Get the npms.io quality score for a package.
    pub async fn quality_score(&mut self, name: &str) -> Result<QualityScore> {
        let key = CacheKey::new("quality").push(name).build();
        if let Some(NpmData::Quality(cached)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(cached);
        }

        debug!(%key, "cache miss, fetching");
        let response = self
            .client
            .get_npms(&format!("/v2/package/{}", encode(name)))
            .await?;
        let envelope: NpmsPackageResponse = response.json().await?;

        self.cache.set(
            key,
            NpmData::Quality(envelope.score.clone()),
            QUALITY_TTL_SECS,
        );
        Ok(envelope.score)
    }

    /// Get the dependency maps of a package's latest version.
    ///
    /// Derived from `package`; shares its cache entry rather than owning one.
    pub async fn dependencies(&mut self, name: &str) -> Result<PackageDependencies> {
        let manifest = self.package(name).await?;
        Ok(PackageDependencies {
            dependencies: manifest.dependencies,
            dev_dependencies: manifest.dev_dependencies,
        })
    }

    /// Search the registry for packages matching a query.
    pub async fn search(&mut self, query: &str, size: u32) -> Result<Vec<SearchResult>> {
        let key = CacheKey::new("search")
            .push(query)
            .push(size.to_string())
            .build();
        if let Some(NpmData::Search(cached)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(cached);
        }

        debug!(%key, "cache miss, fetching");
        let response = self
            .client
            .get_registry(&format!(
                "/-/v1/search?text={}&size={}",
                encode(query),
                size
            ))
            .await?;
        let envelope: SearchResponse = response.json().await?;

        self.cache.set(
            key,
            NpmData::Search(envelope.objects.clone()),
            SEARCH_TTL_SECS,
        );
        Ok(envelope.objects)
    }

    /// Drop every cached response.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Diagnostic snapshot of the cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn fetch_registry_document(&self, name: &str) -> Result<RegistryDocument> {
        let response = self.client.get_registry(&format!("/{}", encode(name))).await?;
        let document: RegistryDocument = response.json().await?;
        Ok(document)
    }

    fn latest_manifest(name: &str, document: &RegistryDocument) -> Result<PackageManifest> {
        let latest = document
            .dist_tags
            .get("latest")
            .cloned()
            .or_else(|| document.versions.keys().last().cloned())
            .ok_or_else(|| {
                DashError::MalformedResponse(format!("package {} has no versions", name))
            })?;

        let manifest = document.versions.get(&latest).ok_or_else(|| {
            DashError::MalformedResponse(format!(
                "package {} lists no manifest for version {}",
                name, latest
            ))
        })?;

        Ok(serde_json::from_value(manifest.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn registry_doc() -> serde_json::Value {
        json!({
            "dist-tags": { "latest": "18.3.1" },
            "versions": {
                "18.2.0": {
                    "name": "react",
                    "version": "18.2.0",
                    "description": "React is a JavaScript library for building user interfaces.",
                    "license": "MIT"
                },
                "18.3.1": {
                    "name": "react",
                    "version": "18.3.1",
                    "description": "React is a JavaScript library for building user interfaces.",
                    "license": "MIT",
                    "dependencies": { "loose-envify": "^1.1.0" },
                    "devDependencies": { "jest": "^29.0.0" }
                }
            }
        })
    }

    async fn service_for(server: &MockServer) -> NpmService {
        let client = NpmClient::new().unwrap().with_base_url(server.uri());
        NpmService::new(client)
    }

    #[tokio::test]
    async fn test_package_resolves_latest_dist_tag_and_caches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/react"))
            .respond_with(ResponseTemplate::new(200).set_body_json(registry_doc()))
            .expect(1)
            .mount(&server)
            .await;

        let mut service = service_for(&server).await;
        let first = service.package("react").await.unwrap();
        let second = service.package("react").await.unwrap();

        assert_eq!(first.version, "18.3.1");
        assert_eq!(second.version, first.version);
        assert_eq!(service.cache_stats().size, 1);
    }

    #[tokio::test]
    async fn test_package_falls_back_to_last_listed_version() {
        let server = MockServer::start().await;
        let mut doc = registry_doc();
        doc["dist-tags"] = json!({});
        Mock::given(method("GET"))
            .and(path("/react"))
            .respond_with(ResponseTemplate::new(200).set_body_json(doc))
            .mount(&server)
            .await;

        let mut service = service_for(&server).await;
        let manifest = service.package("react").await.unwrap();

        assert_eq!(manifest.version, "18.3.1");
    }

    #[tokio::test]
    async fn test_package_with_no_versions_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "dist-tags": {}, "versions": {} })),
            )
            .mount(&server)
            .await;

        let mut service = service_for(&server).await;
        let err = service.package("empty").await.unwrap_err();

        assert!(matches!(err, DashError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_download_periods_cache_independently() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/downloads/point/last-week/react"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "downloads": 5_000_000u64,
                "start": "2024-05-25",
                "end": "2024-05-31",
                "package": "react"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/downloads/point/last-month/react"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "downloads": 20_000_000u64,
                "start": "2024-05-01",
                "end": "2024-05-31",
                "package": "react"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut service = service_for(&server).await;
        let week = service
            .downloads("react", DownloadPeriod::LastWeek)
            .await
            .unwrap();
        let month = service
            .downloads("react", DownloadPeriod::LastMonth)
            .await
            .unwrap();

        assert_eq!(week.downloads, 5_000_000);
        assert_eq!(month.downloads, 20_000_000);

        // Repeat lookups for both periods come from the cache.
        let week_again = service
            .downloads("react", DownloadPeriod::LastWeek)
            .await
            .unwrap();
        assert_eq!(week_again.downloads, 5_000_000);
        assert_eq!(service.cache_stats().size, 2);
    }

    #[tokio::test]
    async fn test_download_range_time_series() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/downloads/range/2024-01-01:2024-01-03/react"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "downloads": [
                    { "downloads": 600_000u64, "day": "2024-01-01" },
                    { "downloads": 700_000u64, "day": "2024-01-02" },
                    { "downloads": 650_000u64, "day": "2024-01-03" }
                ],
                "start": "2024-01-01",
                "end": "2024-01-03",
                "package": "react"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut service = service_for(&server).await;
        let range = service
            .download_range("react", "2024-01-01", "2024-01-03")
            .await
            .unwrap();

        assert_eq!(range.downloads.len(), 3);
        assert_eq!(range.downloads[1].day, "2024-01-02");
    }

    #[tokio::test]
    async fn test_versions_preserve_document_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/react"))
            .respond_with(ResponseTemplate::new(200).set_body_json(registry_doc()))
            .mount(&server)
            .await;

        let mut service = service_for(&server).await;
        let versions = service.versions("react").await.unwrap();

        assert_eq!(versions, vec!["18.2.0", "18.3.1"]);
    }

    #[tokio::test]
    async fn test_quality_score_parses_npms_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/package/react"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "score": {
                    "quality": 0.92,
                    "popularity": 0.89,
                    "maintenance": 0.95,
                    "final": 0.91,
                    "detail": {
                        "quality": {
                            "carefulness": 0.9, "tests": 0.95,
                            "health": 1.0, "branding": 0.8
                        },
                        "popularity": {
                            "communityInterest": 0.97, "downloadsCount": 0.99,
                            "downloadsAcceleration": 0.5, "dependentsCount": 0.99
                        },
                        "maintenance": {
                            "releasesFrequency": 0.9, "commitsFrequency": 0.95,
                            "openIssues": 0.7, "issuesDistribution": 0.8
                        }
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut service = service_for(&server).await;
        let score = service.quality_score("react").await.unwrap();
        assert_eq!(score.final_score, 0.91);
        assert_eq!(score.detail.popularity.downloads_count, 0.99);

        // Second lookup is a cache hit.
        service.quality_score("react").await.unwrap();
    }

    #[tokio::test]
    async fn test_dependencies_derive_from_package() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/react"))
            .respond_with(ResponseTemplate::new(200).set_body_json(registry_doc()))
            .expect(1)
            .mount(&server)
            .await;

        let mut service = service_for(&server).await;
        let deps = service.dependencies("react").await.unwrap();

        assert_eq!(deps.dependencies.get("loose-envify").unwrap(), "^1.1.0");
        assert_eq!(deps.dev_dependencies.get("jest").unwrap(), "^29.0.0");

        // Derived from the package entry, no entry of its own.
        let stats = service.cache_stats();
        assert_eq!(stats.size, 1);
        assert!(stats.keys.contains(&"package:react".to_string()));
    }

    #[tokio::test]
    async fn test_search_keyed_by_query_and_size() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/-/v1/search"))
            .and(query_param("text", "react"))
            .and(query_param("size", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "objects": [
                    { "package": { "name": "react", "version": "18.3.1",
                                   "description": "UI library" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut service = service_for(&server).await;
        let results = service.search("react", 20).await.unwrap();
        assert_eq!(results[0].package.name, "react");

        service.search("react", 20).await.unwrap();
        assert!(
            service
                .cache_stats()
                .keys
                .contains(&"search:react:20".to_string())
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_cached_entries_undisturbed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/react"))
            .respond_with(ResponseTemplate::new(200).set_body_json(registry_doc()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/downloads/point/last-month/react"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut service = service_for(&server).await;
        service.package("react").await.unwrap();

        let err = service
            .downloads("react", DownloadPeriod::LastMonth)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));

        assert_eq!(service.cache_stats().size, 1);
        let manifest = service.package("react").await.unwrap();
        assert_eq!(manifest.version, "18.3.1");
    }
}
