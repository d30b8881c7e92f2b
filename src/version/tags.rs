//! Listing the tags a registry offers for a module.

use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::time::Duration;

use crate::config::Source;
use crate::error::{ComcolError, Result};
use crate::modules::ModuleRequest;

/// Public Docker Hub API.
pub const DOCKER_HUB_URL: &str = "https://hub.docker.com";

/// Upper bound on followed result pages per repository.
const MAX_PAGES: usize = 50;

/// Something that can list the tags available for a request.
pub trait TagSource {
    /// Tags in the order the source returns them.
    fn list_tags(&self, request: &ModuleRequest) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct TagPage {
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    results: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Docker Hub tag listing.
///
/// # Example
///
/// ```no_run
/// use comcol::modules::ModuleRequest;
/// use comcol::config::{Source, WhitelistEntry};
/// use comcol::version::{DockerHubTags, TagSource};
///
/// let hub = DockerHubTags::new().unwrap();
/// let request = ModuleRequest::from_entry(
///     "python",
///     &WhitelistEntry::Version(">=3.8".into()),
///     Source::Docker,
/// );
/// let tags = hub.list_tags(&request).unwrap();
/// ```
pub struct DockerHubTags {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl DockerHubTags {
    /// Client for the public hub.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DOCKER_HUB_URL)
    }

    /// Client for a hub-compatible API at `base_url`.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("comcol/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// First page URL. Bare repository names live under `library/`.
    fn first_page(&self, repo: &str) -> String {
        let repo = if repo.contains('/') {
            repo.to_string()
        } else {
            format!("library/{}", repo)
        };
        format!(
            "{}/v2/repositories/{}/tags?page_size=100",
            self.base_url, repo
        )
    }

    fn fetch_page(&self, url: &str) -> anyhow::Result<TagPage> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP {} fetching {}", response.status(), url));
        }

        response
            .json()
            .with_context(|| format!("Failed to parse tag listing from {}", url))
    }
}

impl TagSource for DockerHubTags {
    fn list_tags(&self, request: &ModuleRequest) -> Result<Vec<String>> {
        let mut tags = Vec::new();
        let mut next = Some(self.first_page(&request.repo));
        let mut pages = 0;

        while let Some(url) = next.take() {
            if pages == MAX_PAGES {
                tracing::warn!("stopped listing {} after {} pages", request.repo, pages);
                break;
            }
            let page = self
                .fetch_page(&url)
                .map_err(|e| ComcolError::RegistryError {
                    repo: request.repo.clone(),
                    message: format!("{:#}", e),
                })?;
            tags.extend(page.results.into_iter().map(|t| t.name));
            next = page.next;
            pages += 1;
        }

        tracing::debug!("{} tags listed for {}", tags.len(), request.repo);
        Ok(tags)
    }
}

/// Tags for sources without a listing API.
///
/// The only candidate is the requested version itself, so only exact
/// requests can be satisfied.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiteralTags;

impl TagSource for LiteralTags {
    fn list_tags(&self, request: &ModuleRequest) -> Result<Vec<String>> {
        let constraint = request.constraint();
        if constraint.is_exact() {
            Ok(vec![constraint.concat()])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Routes each request to the tag source for its image source.
pub struct SourceTags {
    docker: Box<dyn TagSource>,
    literal: LiteralTags,
}

impl SourceTags {
    /// Route docker requests to `docker`, everything else to [`LiteralTags`].
    pub fn new(docker: Box<dyn TagSource>) -> Self {
        Self {
            docker,
            literal: LiteralTags,
        }
    }

    /// Routing against the public Docker Hub.
    pub fn public() -> Result<Self> {
        Ok(Self::new(Box::new(DockerHubTags::new()?)))
    }
}

impl TagSource for SourceTags {
    fn list_tags(&self, request: &ModuleRequest) -> Result<Vec<String>> {
        match request.source {
            Source::Docker => self.docker.list_tags(request),
            Source::Library | Source::Hub => self.literal.list_tags(request),
        }
    }
}

/// Fixed tag list, for tests and offline use.
#[derive(Debug, Default, Clone)]
pub struct StaticTags {
    tags: Vec<String>,
}

impl StaticTags {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

impl TagSource for StaticTags {
    fn list_tags(&self, _request: &ModuleRequest) -> Result<Vec<String>> {
        Ok(self.tags.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WhitelistEntry;
    use httpmock::prelude::*;

    fn request(repo: &str, version: &str, source: Source) -> ModuleRequest {
        let mut request =
            ModuleRequest::from_entry(repo, &WhitelistEntry::Version(version.into()), source);
        request.repo = repo.to_string();
        request
    }

    #[test]
    fn lists_tags_for_bare_repo_under_library() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/repositories/library/python/tags")
                .query_param("page_size", "100");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"next": null, "results": [{"name": "3.6"}, {"name": "3.6-wheezy"}]}"#);
        });

        let hub = DockerHubTags::with_base_url(&server.base_url()).unwrap();
        let tags = hub
            .list_tags(&request("python", ">=3.6", Source::Docker))
            .unwrap();

        mock.assert();
        assert_eq!(tags, vec!["3.6", "3.6-wheezy"]);
    }

    #[test]
    fn follows_next_pages() {
        let server = MockServer::start();
        let second = server.url("/page2");
        server.mock(|when, then| {
            when.method(GET).path("/v2/repositories/nvidia/cuda/tags");
            then.status(200).body(format!(
                r#"{{"next": "{}", "results": [{{"name": "10.2-base"}}]}}"#,
                second
            ));
        });
        server.mock(|when, then| {
            when.method(GET).path("/page2");
            then.status(200)
                .body(r#"{"next": null, "results": [{"name": "11.0-base"}]}"#);
        });

        let hub = DockerHubTags::with_base_url(&server.base_url()).unwrap();
        let tags = hub
            .list_tags(&request("nvidia/cuda", "latest", Source::Docker))
            .unwrap();
        assert_eq!(tags, vec!["10.2-base", "11.0-base"]);
    }

    #[test]
    fn http_error_is_registry_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2/repositories/library/nope/tags");
            then.status(404).body("Not Found");
        });

        let hub = DockerHubTags::with_base_url(&server.base_url()).unwrap();
        let err = hub
            .list_tags(&request("nope", "1.0", Source::Docker))
            .unwrap_err();
        match err {
            ComcolError::RegistryError { repo, message } => {
                assert_eq!(repo, "nope");
                assert!(message.contains("404"), "unexpected message: {}", message);
            }
            other => panic!("Expected RegistryError, got {:?}", other),
        }
    }

    #[test]
    fn literal_tags_only_for_exact_requests() {
        let exact = request("lolcow", "1.0", Source::Library);
        assert_eq!(LiteralTags.list_tags(&exact).unwrap(), vec!["1.0"]);

        let range = request("lolcow", ">=1.0", Source::Library);
        assert!(LiteralTags.list_tags(&range).unwrap().is_empty());
    }

    #[test]
    fn source_tags_routes_by_source() {
        let tags = SourceTags::new(Box::new(StaticTags::new(["9.9"])));
        assert_eq!(
            tags.list_tags(&request("x", "1.0", Source::Docker)).unwrap(),
            vec!["9.9"]
        );
        assert_eq!(
            tags.list_tags(&request("x", "1.0", Source::Hub)).unwrap(),
            vec!["1.0"]
        );
    }
}
