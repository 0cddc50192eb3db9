//! CurseForge REST v1 client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::{Catalog, Category, Project, ReleaseFile, ReleaseType};
use crate::error::CatalogError;

const USER_AGENT: &str = concat!("modshelf/", env!("CARGO_PKG_VERSION"));
const MAX_RETRIES: u32 = 5;
const BASE_RETRY_DELAY_MS: u64 = 2000;
const MAX_RETRY_DELAY_MS: u64 = 60000;

/// CurseForge catalog client
#[derive(Clone)]
pub struct CurseForgeClient {
    client: Arc<reqwest::Client>,
    api_base: String,
    page_size: u32,
    base_retry_delay_ms: u64,
    max_retry_delay_ms: u64,
}

impl CurseForgeClient {
    /// Create a new client authenticated with `api_key`
    pub fn new(
        api_key: &str,
        api_base: &str,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(CatalogError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).map_err(|_| CatalogError::InvalidApiKey)?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            api_base: api_base.trim_end_matches('/').to_string(),
            page_size: page_size.clamp(1, 50),
            base_retry_delay_ms: BASE_RETRY_DELAY_MS,
            max_retry_delay_ms: MAX_RETRY_DELAY_MS,
        })
    }

    /// Override the first retry delay and the delay cap
    pub fn with_retry_delays(mut self, base_ms: u64, max_ms: u64) -> Self {
        self.base_retry_delay_ms = base_ms;
        self.max_retry_delay_ms = max_ms;
        self
    }

    /// Fetch project metadata
    pub async fn get_project(&self, project_id: u64) -> Result<Project, CatalogError> {
        let url = format!("{}/mods/{}", self.api_base, project_id);
        let body = self.get_text(&url, &[]).await?;
        parse_project(&body)
    }

    /// Fetch every file of a project, walking all catalog pages
    pub async fn get_files(&self, project_id: u64) -> Result<Vec<ReleaseFile>, CatalogError> {
        let url = format!("{}/mods/{}/files", self.api_base, project_id);
        let mut files = Vec::new();
        let mut index: u32 = 0;

        loop {
            let query = [
                ("index", index.to_string()),
                ("pageSize", self.page_size.to_string()),
            ];
            let body = self.get_text(&url, &query).await?;
            let page = parse_files_page(&body)?;

            let page_count = if page.pagination.result_count > 0 {
                page.pagination.result_count
            } else {
                page.data.len() as u32
            };
            files.extend(page.data.into_iter().map(ReleaseFile::from));

            tracing::debug!(
                "Fetched files page index={} with {} files out of {} total",
                index,
                page_count,
                page.pagination.total_count
            );

            if page_count == 0 {
                break;
            }
            index = index.saturating_add(page_count);
            if index >= page.pagination.total_count {
                break;
            }
        }

        Ok(files)
    }

    /// GET with rate-limit and server-error retries
    async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<String, CatalogError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let response = self.client.get(url).query(query).send().await?;
            let status = response.status();

            // Handle rate limiting (429)
            if status.as_u16() == 429 {
                if attempt >= MAX_RETRIES {
                    return Err(CatalogError::RateLimited(MAX_RETRIES));
                }

                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(|secs| secs.saturating_mul(1000).min(self.max_retry_delay_ms))
                    .unwrap_or_else(|| self.backoff_delay(attempt));

                tracing::warn!(
                    "Rate limited (attempt {}/{}), retrying in {}ms",
                    attempt,
                    MAX_RETRIES,
                    retry_after
                );

                sleep(Duration::from_millis(retry_after)).await;
                continue;
            }

            // Handle server errors (5xx) with retry
            if status.is_server_error() {
                if attempt >= MAX_RETRIES {
                    let body = response.text().await.unwrap_or_default();
                    return Err(CatalogError::Status {
                        status: status.as_u16(),
                        body,
                    });
                }

                let delay = self.backoff_delay(attempt);
                tracing::warn!(
                    "Server error {} (attempt {}/{}), retrying in {}ms",
                    status,
                    attempt,
                    MAX_RETRIES,
                    delay
                );

                sleep(Duration::from_millis(delay)).await;
                continue;
            }

            // Handle client errors (4xx) - don't retry
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(CatalogError::InvalidApiKey);
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CatalogError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            return Ok(response.text().await?);
        }
    }

    /// Exponential backoff with 85-115% jitter
    fn backoff_delay(&self, attempt: u32) -> u64 {
        backoff_delay(attempt, self.base_retry_delay_ms, self.max_retry_delay_ms)
    }
}

#[async_trait]
impl Catalog for CurseForgeClient {
    async fn fetch_release_files(
        &self,
        project: &Project,
    ) -> Result<Vec<ReleaseFile>, CatalogError> {
        self.get_files(project.id).await
    }
}

fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let base = base_ms.saturating_mul(1 << (attempt.saturating_sub(1)).min(16));
    let jitter: u64 = rand::thread_rng().gen_range(85..=115);
    (base.saturating_mul(jitter) / 100).min(max_ms)
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    Ok(serde_json::from_str(body)?)
}

fn parse_project(body: &str) -> Result<Project, CatalogError> {
    let response: ApiResponse<ProjectNode> = parse_json(body)?;
    Ok(response.data.into())
}

fn parse_files_page(body: &str) -> Result<FilesPage, CatalogError> {
    parse_json(body)
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    data: T,
}

#[derive(Deserialize)]
struct FilesPage {
    data: Vec<FileNode>,
    pagination: Pagination,
}

#[derive(Deserialize)]
struct Pagination {
    #[serde(rename = "resultCount", default)]
    result_count: u32,
    #[serde(rename = "totalCount")]
    total_count: u32,
}

#[derive(Deserialize)]
struct ProjectNode {
    id: u64,
    name: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    links: Option<Links>,
    #[serde(default)]
    categories: Vec<CategoryNode>,
    #[serde(default)]
    logo: Option<Logo>,
}

#[derive(Deserialize)]
struct Links {
    #[serde(default, rename = "websiteUrl")]
    website_url: Option<String>,
}

#[derive(Deserialize)]
struct CategoryNode {
    id: u64,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct Logo {
    #[serde(default, rename = "thumbnailUrl")]
    thumbnail_url: Option<String>,
}

#[derive(Deserialize)]
struct FileNode {
    id: u64,
    #[serde(default, rename = "displayName")]
    display_name: String,
    #[serde(rename = "fileName")]
    file_name: String,
    #[serde(rename = "fileDate")]
    file_date: DateTime<Utc>,
    #[serde(default, rename = "releaseType")]
    release_type: u32,
    #[serde(default, rename = "downloadUrl")]
    download_url: Option<String>,
    #[serde(default, rename = "gameVersions")]
    game_versions: Vec<String>,
}

impl From<ProjectNode> for Project {
    fn from(node: ProjectNode) -> Self {
        Project {
            id: node.id,
            name: node.name,
            summary: node.summary,
            categories: node
                .categories
                .into_iter()
                .map(|c| Category {
                    id: c.id,
                    name: c.name,
                })
                .collect(),
            website_url: node.links.and_then(|l| l.website_url),
            thumbnail_url: node.logo.and_then(|l| l.thumbnail_url),
        }
    }
}

impl From<FileNode> for ReleaseFile {
    fn from(node: FileNode) -> Self {
        let display_name = if node.display_name.trim().is_empty() {
            node.file_name.clone()
        } else {
            node.display_name
        };
        ReleaseFile {
            id: node.id,
            file_name: node.file_name,
            display_name,
            game_versions: node.game_versions,
            released_at: node.file_date,
            release_type: ReleaseType::from_code(node.release_type),
            download_url: node.download_url.filter(|u| !u.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT_JSON: &str = r#"{
        "data": {
            "id": 238222,
            "name": "Just Enough Items (JEI)",
            "summary": "View Items and Recipes",
            "links": { "websiteUrl": "https://www.curseforge.com/minecraft/mc-mods/jei" },
            "categories": [
                { "id": 421, "name": "API and Library", "slug": "library-api" },
                { "id": 423, "name": "Map and Information", "slug": "map-information" }
            ],
            "logo": { "thumbnailUrl": "https://media.forgecdn.net/avatars/thumbnails/29/69/64/64/635838945588716414.jpeg" }
        }
    }"#;

    const FILES_JSON: &str = r#"{
        "data": [
            {
                "id": 4371666,
                "displayName": "jei-1.19.2-forge-11.6.0.1015.jar",
                "fileName": "jei-1.19.2-forge-11.6.0.1015.jar",
                "fileDate": "2023-01-29T05:31:29.123Z",
                "releaseType": 1,
                "downloadUrl": "https://edge.forgecdn.net/files/4371/666/jei-1.19.2-forge-11.6.0.1015.jar",
                "gameVersions": ["Forge", "1.19.2"]
            },
            {
                "id": 4000001,
                "displayName": "",
                "fileName": "jei-1.18.2-9.7.1.jar",
                "fileDate": "2022-06-01T00:00:00Z",
                "releaseType": 2,
                "downloadUrl": null,
                "gameVersions": ["1.18.2"]
            }
        ],
        "pagination": { "index": 0, "pageSize": 50, "resultCount": 2, "totalCount": 2 }
    }"#;

    #[test]
    fn test_parse_project() {
        let project = parse_project(PROJECT_JSON).unwrap();
        assert_eq!(project.id, 238222);
        assert_eq!(project.name, "Just Enough Items (JEI)");
        assert_eq!(project.categories.len(), 2);
        assert_eq!(project.categories[0].name, "API and Library");
        assert_eq!(
            project.website_url.as_deref(),
            Some("https://www.curseforge.com/minecraft/mc-mods/jei")
        );
        assert!(project.thumbnail_url.is_some());
    }

    #[test]
    fn test_parse_files_page() {
        let page = parse_files_page(FILES_JSON).unwrap();
        assert_eq!(page.pagination.total_count, 2);

        let files: Vec<ReleaseFile> = page.data.into_iter().map(ReleaseFile::from).collect();
        assert_eq!(files[0].release_type, ReleaseType::Release);
        assert!(files[0].supports("1.19.2"));
        assert_eq!(files[0].released_at.to_rfc3339(), "2023-01-29T05:31:29.123+00:00");

        // Empty display name falls back to the file name
        assert_eq!(files[1].display_name, "jei-1.18.2-9.7.1.jar");
        assert_eq!(files[1].release_type, ReleaseType::Beta);
        assert_eq!(files[1].download_url, None);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = parse_files_page("{\"data\": 3}").err().unwrap();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn test_backoff_is_capped() {
        assert!(backoff_delay(1, BASE_RETRY_DELAY_MS, MAX_RETRY_DELAY_MS) <= 2300);
        assert!(backoff_delay(1, BASE_RETRY_DELAY_MS, MAX_RETRY_DELAY_MS) >= 1700);
        assert_eq!(
            backoff_delay(12, BASE_RETRY_DELAY_MS, MAX_RETRY_DELAY_MS),
            MAX_RETRY_DELAY_MS
        );
        assert_eq!(backoff_delay(40, u64::MAX, MAX_RETRY_DELAY_MS), MAX_RETRY_DELAY_MS);
    }

    #[test]
    fn test_missing_api_key() {
        let err = CurseForgeClient::new(
            "  ",
            "https://api.curseforge.com/v1",
            50,
            Duration::from_secs(5),
        )
        .err()
        .unwrap();
        assert!(matches!(err, CatalogError::MissingApiKey));
    }

    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn response(status_line: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n{}",
            status_line,
            body.len(),
            extra_headers,
            body
        )
    }

    fn files_page(ids: &[u64], total: u32) -> String {
        let data: Vec<String> = ids
            .iter()
            .map(|id| {
                format!(
                    r#"{{"id": {id}, "displayName": "Mod {id}", "fileName": "mod-{id}.jar", "fileDate": "2022-01-01T00:00:00Z", "releaseType": 1, "gameVersions": ["1.19.2"]}}"#
                )
            })
            .collect();
        format!(
            r#"{{"data": [{}], "pagination": {{"index": 0, "pageSize": 2, "resultCount": {}, "totalCount": {}}}}}"#,
            data.join(","),
            ids.len(),
            total
        )
    }

    /// Answers one connection per canned response, recording request lines
    async fn serve(responses: Vec<String>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        tokio::spawn(async move {
            for canned in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let head = String::from_utf8_lossy(&buf[..n]);
                let line = head.lines().next().unwrap_or_default().to_string();
                seen.lock().unwrap().push(line);
                socket.write_all(canned.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });

        (format!("http://{}", addr), requests)
    }

    fn client(base: &str, page_size: u32) -> CurseForgeClient {
        CurseForgeClient::new("test-key", base, page_size, Duration::from_secs(5))
            .unwrap()
            .with_retry_delays(1, 5)
    }

    #[tokio::test]
    async fn test_get_files_walks_every_page() {
        let (base, requests) = serve(vec![
            response("200 OK", "", &files_page(&[1, 2], 5)),
            response("200 OK", "", &files_page(&[3, 4], 5)),
            response("200 OK", "", &files_page(&[5], 5)),
        ])
        .await;

        let files = client(&base, 2).get_files(9).await.unwrap();
        let ids: Vec<u64> = files.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].contains("/mods/9/files?index=0&pageSize=2"));
        assert!(requests[1].contains("index=2"));
        assert!(requests[2].contains("index=4"));
    }

    #[tokio::test]
    async fn test_get_files_stops_on_empty_page() {
        let (base, requests) = serve(vec![response("200 OK", "", &files_page(&[], 10))]).await;

        let files = client(&base, 2).get_files(9).await.unwrap();
        assert!(files.is_empty());
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let (base, requests) = serve(vec![
            response("503 Service Unavailable", "", "busy"),
            response("200 OK", "", &files_page(&[1], 1)),
        ])
        .await;

        let files = client(&base, 50).get_files(9).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_huge_retry_after_is_capped() {
        let (base, requests) = serve(vec![
            response("429 Too Many Requests", "Retry-After: 99999999999999999\r\n", ""),
            response("200 OK", "", &files_page(&[1], 1)),
        ])
        .await;

        let files = client(&base, 50).get_files(9).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_gives_up_after_max_retries() {
        let limited = response("429 Too Many Requests", "Retry-After: 0\r\n", "");
        let (base, requests) = serve(vec![limited; MAX_RETRIES as usize]).await;

        let err = client(&base, 50).get_files(9).await.unwrap_err();
        assert!(matches!(err, CatalogError::RateLimited(MAX_RETRIES)));
        assert_eq!(requests.lock().unwrap().len(), MAX_RETRIES as usize);
    }

    #[tokio::test]
    async fn test_rejected_key_is_reported() {
        for status_line in ["401 Unauthorized", "403 Forbidden"] {
            let (base, requests) = serve(vec![response(status_line, "", "")]).await;

            let err = client(&base, 50).get_project(9).await.unwrap_err();
            assert!(matches!(err, CatalogError::InvalidApiKey));
            assert_eq!(requests.lock().unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (base, requests) = serve(vec![response("404 Not Found", "", "no such mod")]).await;

        let err = client(&base, 50).get_files(9).await.unwrap_err();
        match err {
            CatalogError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "no such mod");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(requests.lock().unwrap().len(), 1);
    }
}
