use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::{Hit, IndexError, IndexResult, IndexSchema, Query, ScrollPage, SearchBackend};
use crate::document::ListingDocument;

/// Elasticsearch over its REST API.
pub struct ElasticClient {
    http: reqwest::Client,
    base: Url,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(rename = "_scroll_id")]
    scroll_id: Option<String>,
    hits: HitsEnvelope,
}

#[derive(Deserialize)]
struct HitsEnvelope {
    hits: Vec<RawHit>,
}

#[derive(Deserialize)]
struct RawHit {
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source")]
    source: ListingDocument,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

impl From<RawHit> for Hit {
    fn from(raw: RawHit) -> Self {
        Hit {
            score: raw.score,
            source: raw.source,
        }
    }
}

impl ElasticClient {
    pub fn new(base_url: &str) -> IndexResult<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(ElasticClient {
            http: reqwest::Client::new(),
            base,
        })
    }

    fn request(&self, method: Method, path: &str) -> IndexResult<reqwest::RequestBuilder> {
        let url = self.base.join(path)?;
        debug!("{} {}", method, url);
        Ok(self.http.request(method, url))
    }

    async fn decode_search(response: Response) -> IndexResult<SearchResponse> {
        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| IndexError::Decode(e.to_string()))
    }

    async fn into_page(response: Response) -> IndexResult<ScrollPage> {
        let data = Self::decode_search(response).await?;
        let cursor = data
            .scroll_id
            .ok_or_else(|| IndexError::Decode("missing _scroll_id".into()))?;
        Ok(ScrollPage {
            cursor,
            hits: data.hits.hits.into_iter().map(Hit::from).collect(),
        })
    }
}

/// Pass successful responses through; everything else becomes `IndexError::Status`.
async fn check(operation: &'static str, response: Response) -> IndexResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(IndexError::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}

impl SearchBackend for ElasticClient {
    async fn index_exists(&self, index: &str) -> IndexResult<bool> {
        let response = self.request(Method::HEAD, index)?.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => check("exists", response).await.map(|_| true),
        }
    }

    async fn delete_index(&self, index: &str) -> IndexResult<()> {
        let response = self.request(Method::DELETE, index)?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IndexError::Missing(index.to_string()));
        }
        check("delete index", response).await?;
        Ok(())
    }

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> IndexResult<()> {
        let response = self
            .request(Method::PUT, index)?
            .json(&schema.to_body())
            .send()
            .await?;
        match check("create index", response).await {
            Err(IndexError::Status { body, .. }) if body.contains("resource_already_exists") => {
                Err(IndexError::AlreadyExists(index.to_string()))
            }
            other => other.map(|_| ()),
        }
    }

    async fn index_document(&self, index: &str, doc: &ListingDocument) -> IndexResult<()> {
        let response = self
            .request(Method::POST, &format!("{}/_doc", index))?
            .json(doc)
            .send()
            .await?;
        check("index document", response).await?;
        Ok(())
    }

    async fn refresh(&self, index: &str) -> IndexResult<()> {
        let response = self
            .request(Method::POST, &format!("{}/_refresh", index))?
            .send()
            .await?;
        check("refresh", response).await?;
        Ok(())
    }

    async fn count(&self, index: &str) -> IndexResult<u64> {
        let response = self
            .request(Method::GET, &format!("{}/_count", index))?
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IndexError::Missing(index.to_string()));
        }
        let data = check("count", response)
            .await?
            .json::<CountResponse>()
            .await
            .map_err(|e| IndexError::Decode(e.to_string()))?;
        Ok(data.count)
    }

    async fn search(&self, index: &str, query: &Query, size: usize) -> IndexResult<Vec<Hit>> {
        let response = self
            .request(Method::POST, &format!("{}/_search", index))?
            .json(&json!({ "query": query.to_dsl(), "size": size }))
            .send()
            .await?;
        let data = Self::decode_search(check("search", response).await?).await?;
        Ok(data.hits.hits.into_iter().map(Hit::from).collect())
    }

    async fn open_scroll(
        &self,
        index: &str,
        query: &Query,
        size: usize,
        keep_alive: &str,
    ) -> IndexResult<ScrollPage> {
        let response = self
            .request(Method::POST, &format!("{}/_search", index))?
            .query(&[("scroll", keep_alive)])
            .json(&json!({ "query": query.to_dsl(), "size": size }))
            .send()
            .await?;
        Self::into_page(check("search", response).await?).await
    }

    async fn scroll(&self, cursor: &str, keep_alive: &str) -> IndexResult<ScrollPage> {
        let response = self
            .request(Method::POST, "_search/scroll")?
            .json(&json!({ "scroll": keep_alive, "scroll_id": cursor }))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IndexError::UnknownCursor(cursor.to_string()));
        }
        Self::into_page(check("scroll", response).await?).await
    }

    async fn clear_scroll(&self, cursor: &str) -> IndexResult<()> {
        let response = self
            .request(Method::DELETE, "_search/scroll")?
            .json(&json!({ "scroll_id": [cursor] }))
            .send()
            .await?;
        // Already expired cursors report 404.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check("clear scroll", response).await?;
        Ok(())
    }
}
