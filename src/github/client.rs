// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Async GitHub REST client.
//!
//! ```text
//! GitHubClient::new(&GitHubConfig)
//!   |
//!   +-- repository()        GET   /repos/{o}/{r}
//!   +-- authenticated_user  GET   /user
//!   +-- create_repository   POST  /user/repos | /orgs/{o}/repos
//!   +-- branch_head()       GET   /repos/{o}/{r}/git/ref/heads/{b}
//!   +-- commit_tree()       GET   /repos/{o}/{r}/git/commits/{sha}
//!   +-- create_blob()       POST  /repos/{o}/{r}/git/blobs
//!   +-- create_tree()       POST  /repos/{o}/{r}/git/trees
//!   +-- create_commit()     POST  /repos/{o}/{r}/git/commits
//!   +-- update_ref()        PATCH /repos/{o}/{r}/git/refs/heads/{b}  (force)
//!   +-- create_ref()        POST  /repos/{o}/{r}/git/refs
//!   '-- tarball_url()             /repos/{o}/{r}/tarball/{ref}
//! ```
//!
//! Every call takes the credential explicitly; the client holds no token.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

use super::location::{Credential, RepoSlug};
use super::types::{
    CommitInfo, CommitRecord, CreateBlobRequest, CreateRefRequest, CreateRepoRequest,
    CreateTreeRequest, ErrorBody, RefInfo, RepoInfo, ShaResponse, TreeEntry, UpdateRefRequest,
    UserInfo,
};
use crate::config::types::GitHubConfig;
use crate::error::{ApiError, ApiResult};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Result of a credential check against the identity endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_name: Option<String>,
}

/// GitHub REST API client bound to one API root.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: String,
    request_timeout: Duration,
}

fn verb(method: &Method) -> &'static str {
    if *method == Method::POST {
        "POST"
    } else if *method == Method::PATCH {
        "PATCH"
    } else {
        "GET"
    }
}

impl GitHubClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be constructed
    /// (e.g. TLS backend initialisation fails).
    pub fn new(config: &GitHubConfig) -> ApiResult<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout(),
        })
    }

    /// Underlying HTTP client, shared with the archive downloader.
    #[must_use]
    pub const fn http(&self) -> &Client {
        &self.http
    }

    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    fn repo_url(&self, slug: &RepoSlug, rest: &str) -> String {
        self.url(&format!("/repos/{}/{}{rest}", slug.owner(), slug.repo()))
    }

    /// URL of the gzip tarball of `reference`.
    #[must_use]
    pub fn tarball_url(&self, slug: &RepoSlug, reference: &str) -> String {
        self.repo_url(slug, &format!("/tarball/{reference}"))
    }

    /// Headers the downloader must send alongside a tarball request.
    #[must_use]
    pub fn download_headers(credential: Option<&Credential>) -> Vec<(String, String)> {
        let mut headers = vec![("X-GitHub-Api-Version".to_string(), API_VERSION.to_string())];
        if let Some(credential) = credential.filter(|c| !c.is_empty()) {
            headers.push((
                "Authorization".to_string(),
                format!("Bearer {}", credential.expose()),
            ));
        }
        headers
    }

    fn request(&self, method: Method, url: &str, credential: Option<&Credential>) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, url)
            .timeout(self.request_timeout)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(credential) = credential.filter(|c| !c.is_empty()) {
            request = request.bearer_auth(credential.expose());
        }
        request
    }

    /// Sends a request and turns any non-success status into `ApiError::Http`
    /// carrying the provider's message.
    async fn execute(&self, method: &Method, url: &str, request: RequestBuilder) -> ApiResult<Response> {
        debug!(method = verb(method), url, "github request");
        let response = request.send().await?;
        let status = response.status();
        trace!(method = verb(method), url, status = status.as_u16(), "github response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .ok()
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.chars().take(200).collect())
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());

        Err(ApiError::Http {
            method: verb(method),
            status: status.as_u16(),
            url: url.to_string(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> ApiResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        credential: Option<&Credential>,
    ) -> ApiResult<T> {
        let request = self.request(Method::GET, url, credential);
        let response = self.execute(&Method::GET, url, request).await?;
        Self::decode(url, response).await
    }

    /// Like [`Self::get_json`] but maps 404 to `None`.
    async fn get_optional<T: DeserializeOwned>(
        &self,
        url: &str,
        credential: Option<&Credential>,
    ) -> ApiResult<Option<T>> {
        match self.get_json(url, credential).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        credential: &Credential,
        body: &B,
    ) -> ApiResult<T> {
        let request = self.request(method.clone(), url, Some(credential)).json(body);
        let response = self.execute(&method, url, request).await?;
        Self::decode(url, response).await
    }

    /// Repository metadata, or `None` if it does not exist (or is invisible
    /// to the credential).
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures and non-404 error statuses.
    pub async fn repository(
        &self,
        slug: &RepoSlug,
        credential: Option<&Credential>,
    ) -> ApiResult<Option<RepoInfo>> {
        self.get_optional(&self.repo_url(slug, ""), credential).await
    }

    /// Identity behind the credential.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` with status 401 for a rejected token.
    pub async fn authenticated_user(&self, credential: &Credential) -> ApiResult<UserInfo> {
        self.get_json(&self.url("/user"), Some(credential)).await
    }

    /// Checks the credential against the identity endpoint.
    ///
    /// Never fails: any error, including transport errors, reads as invalid.
    pub async fn validate_credential(&self, credential: &Credential) -> CredentialStatus {
        if credential.is_empty() {
            return CredentialStatus {
                valid: false,
                identity_name: None,
            };
        }
        match self.authenticated_user(credential).await {
            Ok(user) => CredentialStatus {
                valid: true,
                identity_name: Some(user.login),
            },
            Err(e) => {
                debug!(error = %e, "credential check failed");
                CredentialStatus {
                    valid: false,
                    identity_name: None,
                }
            }
        }
    }

    /// Creates a repository under the authenticated user (`org == None`) or an
    /// organization.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the provider rejects the request (name
    /// collision, missing permission).
    pub async fn create_repository(
        &self,
        credential: &Credential,
        org: Option<&str>,
        request: &CreateRepoRequest<'_>,
    ) -> ApiResult<RepoInfo> {
        let url = org.map_or_else(
            || self.url("/user/repos"),
            |org| self.url(&format!("/orgs/{org}/repos")),
        );
        self.send_json(Method::POST, &url, credential, request).await
    }

    /// Commit id at the tip of `branch`, or `None` if the branch does not
    /// exist. An empty repository (409) has no branches at all.
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures and other error statuses.
    pub async fn branch_head(
        &self,
        credential: &Credential,
        slug: &RepoSlug,
        branch: &str,
    ) -> ApiResult<Option<String>> {
        let url = self.repo_url(slug, &format!("/git/ref/heads/{branch}"));
        match self.get_json::<RefInfo>(&url, Some(credential)).await {
            Ok(found) => Ok(Some(found.object.sha)),
            Err(e) if e.is_not_found() || e.is_empty_repository() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Tree id of commit `sha`.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit cannot be read.
    pub async fn commit_tree(
        &self,
        credential: &Credential,
        slug: &RepoSlug,
        sha: &str,
    ) -> ApiResult<String> {
        let url = self.repo_url(slug, &format!("/git/commits/{sha}"));
        let commit: CommitInfo = self.get_json(&url, Some(credential)).await?;
        Ok(commit.tree.sha)
    }

    /// Uploads raw bytes as a blob (base64 on the wire) and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is rejected.
    pub async fn create_blob(
        &self,
        credential: &Credential,
        slug: &RepoSlug,
        content: &[u8],
    ) -> ApiResult<String> {
        let encoded = STANDARD.encode(content);
        let body = CreateBlobRequest {
            content: &encoded,
            encoding: "base64",
        };
        let url = self.repo_url(slug, "/git/blobs");
        let created: ShaResponse = self
            .send_json(Method::POST, &url, credential, &body)
            .await?;
        Ok(created.sha)
    }

    /// Creates a tree from `entries` layered over `base_tree`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree is rejected.
    pub async fn create_tree(
        &self,
        credential: &Credential,
        slug: &RepoSlug,
        base_tree: Option<&str>,
        entries: &[TreeEntry],
    ) -> ApiResult<String> {
        let body = CreateTreeRequest {
            base_tree,
            tree: entries,
        };
        let url = self.repo_url(slug, "/git/trees");
        let created: ShaResponse = self
            .send_json(Method::POST, &url, credential, &body)
            .await?;
        Ok(created.sha)
    }

    /// # Errors
    ///
    /// Returns an error if the commit is rejected.
    pub async fn create_commit(
        &self,
        credential: &Credential,
        slug: &RepoSlug,
        commit: &CommitRecord,
    ) -> ApiResult<String> {
        let url = self.repo_url(slug, "/git/commits");
        let created: ShaResponse = self
            .send_json(Method::POST, &url, credential, commit)
            .await?;
        Ok(created.sha)
    }

    /// Force-moves `branch` to `sha`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ref does not exist or the update is rejected.
    pub async fn update_ref(
        &self,
        credential: &Credential,
        slug: &RepoSlug,
        branch: &str,
        sha: &str,
    ) -> ApiResult<()> {
        let url = self.repo_url(slug, &format!("/git/refs/heads/{branch}"));
        let body = UpdateRefRequest { sha, force: true };
        let _: RefInfo = self
            .send_json(Method::PATCH, &url, credential, &body)
            .await?;
        Ok(())
    }

    /// Creates `refs/heads/{branch}` pointing at `sha`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ref already exists or creation is rejected.
    pub async fn create_ref(
        &self,
        credential: &Credential,
        slug: &RepoSlug,
        branch: &str,
        sha: &str,
    ) -> ApiResult<()> {
        let url = self.repo_url(slug, "/git/refs");
        let name = format!("refs/heads/{branch}");
        let body = CreateRefRequest { name: &name, sha };
        let _: RefInfo = self
            .send_json(Method::POST, &url, credential, &body)
            .await?;
        Ok(())
    }
}
