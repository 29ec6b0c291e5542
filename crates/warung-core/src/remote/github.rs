//! GitHub contents API backend for [`ContentStore`].

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;

use super::{ContentStore, RemoteEntry, RemoteFile};
use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::util::compact_text;
use crate::vault::BearerToken;

const GITHUB_API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("warung/", env!("CARGO_PKG_VERSION"));

/// Content store backed by a single repository branch.
#[derive(Debug, Clone)]
pub struct GithubContentStore {
    config: RemoteConfig,
    token: BearerToken,
    client: Client,
}

impl GithubContentStore {
    pub fn new(config: RemoteConfig, token: BearerToken) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            config,
            token,
            client,
        })
    }

    pub const fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_base_url,
            urlencoding::encode(&self.config.owner),
            urlencoding::encode(&self.config.repo),
            encode_path(path)
        )
    }

    fn read_url(&self, path: &str) -> String {
        format!(
            "{}?ref={}",
            self.contents_url(path),
            urlencoding::encode(&self.config.branch)
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(self.token.expose())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, path, &body))
    }
}

impl ContentStore for GithubContentStore {
    async fn get(&self, path: &str) -> Result<RemoteFile> {
        let response = self
            .send(self.request(Method::GET, &self.read_url(path)), path)
            .await?;
        let body = response.text().await?;
        parse_file_response(path, &body)
    }

    async fn revision(&self, path: &str) -> Result<String> {
        let response = self
            .send(self.request(Method::GET, &self.read_url(path)), path)
            .await?;
        let body = response.text().await?;
        parse_revision_response(path, &body)
    }

    async fn put(
        &self,
        path: &str,
        content: &[u8],
        expected_revision: Option<&str>,
        message: &str,
    ) -> Result<String> {
        let mut body = serde_json::json!({
            "message": message,
            "content": B64.encode(content),
            "branch": self.config.branch,
        });
        if let Some(revision) = expected_revision {
            body["sha"] = serde_json::Value::String(revision.to_string());
        }

        let response = self
            .send(
                self.request(Method::PUT, &self.contents_url(path)).json(&body),
                path,
            )
            .await?;
        let payload = response.json::<WriteResponse>().await?;
        tracing::debug!("Wrote {} at revision {}", path, payload.content.sha);
        Ok(payload.content.sha)
    }

    async fn delete(&self, path: &str, revision: &str, message: &str) -> Result<()> {
        let body = serde_json::json!({
            "message": message,
            "sha": revision,
            "branch": self.config.branch,
        });
        self.send(
            self.request(Method::DELETE, &self.contents_url(path)).json(&body),
            path,
        )
        .await?;
        Ok(())
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        let response = self
            .send(self.request(Method::GET, &self.read_url(path)), path)
            .await?;
        let body = response.text().await?;
        parse_dir_response(path, &body)
    }
}

/// Map a failed contents API response onto the error taxonomy.
///
/// 404 is a missing path; 409, and 422 complaints about `sha`, are revision
/// conflicts; everything else is a generic remote failure.
pub fn classify_failure(status: u16, path: &str, body: &str) -> Error {
    let message = api_message(body);
    match status {
        404 => Error::NotFound(path.to_string()),
        409 => Error::Conflict {
            path: path.to_string(),
            message,
        },
        422 if message.to_ascii_lowercase().contains("sha") => Error::Conflict {
            path: path.to_string(),
            message,
        },
        _ => Error::Remote { status, message },
    }
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirEntryResponse {
    name: String,
    path: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    content: WrittenContent,
}

#[derive(Debug, Deserialize)]
struct WrittenContent {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn parse_file_response(path: &str, body: &str) -> Result<RemoteFile> {
    if body.trim_start().starts_with('[') {
        return Err(Error::InvalidInput(format!("{path} is a directory, not a file")));
    }
    let payload = serde_json::from_str::<FileResponse>(body)?;
    if let Some(encoding) = payload.encoding.as_deref() {
        if encoding != "base64" {
            return Err(Error::Remote {
                status: 200,
                message: format!("unsupported content encoding '{encoding}' for {path}"),
            });
        }
    }

    let content = decode_content(payload.content.as_deref().unwrap_or_default()).map_err(
        |error| Error::Remote {
            status: 200,
            message: format!("invalid base64 content for {path}: {error}"),
        },
    )?;
    Ok(RemoteFile {
        content,
        revision: payload.sha,
    })
}

/// Only the `sha` is read, so files between 1 and 100 MB, which the API
/// returns with `"encoding": "none"` and an empty body, still resolve.
fn parse_revision_response(path: &str, body: &str) -> Result<String> {
    if body.trim_start().starts_with('[') {
        return Err(Error::InvalidInput(format!("{path} is a directory, not a file")));
    }
    Ok(serde_json::from_str::<FileResponse>(body)?.sha)
}

fn parse_dir_response(path: &str, body: &str) -> Result<Vec<RemoteEntry>> {
    if !body.trim_start().starts_with('[') {
        return Err(Error::InvalidInput(format!("{path} is a file, not a directory")));
    }
    let entries = serde_json::from_str::<Vec<DirEntryResponse>>(body)?;
    Ok(entries
        .into_iter()
        .map(|entry| RemoteEntry {
            name: entry.name,
            path: entry.path,
            revision: entry.sha,
        })
        .collect())
}

/// Contents API base64 is wrapped at 60 columns.
fn decode_content(raw: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let compact: String = raw.chars().filter(|ch| !ch.is_ascii_whitespace()).collect();
    B64.decode(compact)
}

fn api_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body).map_or_else(
        |_| compact_text(body),
        |payload| compact_text(&payload.message),
    )
}

fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
