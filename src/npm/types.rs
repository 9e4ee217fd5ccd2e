// npm API response types.
// Covers the registry package document, the downloads API, and npms.io
// quality scores.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Package author: the registry stores either a plain string or an object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    Name(String),
    Details {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
}

/// Source repository pointer in a package manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// Manifest of a single published package version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub repository: Option<RepositoryRef>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub dependencies: HashMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: HashMap<String, String>,
}

/// Full registry document for a package.
///
/// `versions` stays as raw JSON so the publish order the registry reports is
/// preserved (serde_json is built with `preserve_order`); the latest-version
/// fallback in the accessor depends on it.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryDocument {
    #[serde(default, rename = "dist-tags")]
    pub dist_tags: HashMap<String, String>,
    pub versions: serde_json::Map<String, serde_json::Value>,
}

/// Aggregate download count over a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadStats {
    pub downloads: u64,
    pub start: String,
    pub end: String,
    pub package: String,
}

/// One day of downloads in a time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadPoint {
    pub downloads: u64,
    pub day: String,
}

/// Download time series over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeDownloads {
    pub downloads: Vec<DownloadPoint>,
    pub start: String,
    pub end: String,
    pub package: String,
}

/// Period accepted by the downloads point endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadPeriod {
    LastDay,
    LastWeek,
    #[default]
    LastMonth,
    LastYear,
}

impl DownloadPeriod {
    /// URL-path and cache-key form.
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadPeriod::LastDay => "last-day",
            DownloadPeriod::LastWeek => "last-week",
            DownloadPeriod::LastMonth => "last-month",
            DownloadPeriod::LastYear => "last-year",
        }
    }
}

/// Quality sub-scores from npms.io.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityDetail {
    pub carefulness: f64,
    pub tests: f64,
    pub health: f64,
    pub branding: f64,
}

/// Popularity sub-scores from npms.io.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularityDetail {
    pub community_interest: f64,
    pub downloads_count: f64,
    pub downloads_acceleration: f64,
    pub dependents_count: f64,
}

/// Maintenance sub-scores from npms.io.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceDetail {
    pub releases_frequency: f64,
    pub commits_frequency: f64,
    pub open_issues: f64,
    pub issues_distribution: f64,
}

/// Per-axis score breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreDetail {
    pub quality: QualityDetail,
    pub popularity: PopularityDetail,
    pub maintenance: MaintenanceDetail,
}

/// Package quality score as computed by npms.io.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityScore {
    pub quality: f64,
    pub popularity: f64,
    pub maintenance: f64,
    #[serde(rename = "final")]
    pub final_score: f64,
    pub detail: ScoreDetail,
}

/// Envelope around the score in the npms.io package response.
#[derive(Debug, Clone, Deserialize)]
pub struct NpmsPackageResponse {
    pub score: QualityScore,
}

/// Abbreviated package record in search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPackage {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One hit from the registry search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub package: SearchPackage,
}

/// Envelope for the registry search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub objects: Vec<SearchResult>,
}

/// Direct and dev dependency maps of a package's latest version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDependencies {
    pub dependencies: HashMap<String, String>,
    pub dev_dependencies: HashMap<String, String>,
}
