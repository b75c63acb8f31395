use reqwest::header::ACCEPT;
use url::Url;

use crate::config::Config;
use crate::error::CatalogError;
use crate::types::{TemplateCategory, TemplateCollection, TemplateGroup};

use super::raw::{ApiResponse, RawTemplateItem, map_template_item};

/// HTTP client for the template catalog service.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base: Url,
    lang: String,
}

impl CatalogClient {
    pub fn new(base: Url, lang: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
            lang: lang.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base.clone(), config.lang.clone())
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// `{base}/{endpoint}?lang={lang}`
    pub fn category_url(&self, category: TemplateCategory) -> Result<Url, CatalogError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::Url {
                url: self.base.to_string(),
                message: "base url cannot have path segments".to_string(),
            })?
            .pop_if_empty()
            .push(category.endpoint());
        url.query_pairs_mut().append_pair("lang", &self.lang);
        Ok(url)
    }

    #[tracing::instrument(skip_all, fields(category = %category))]
    pub async fn fetch_category(
        &self,
        category: TemplateCategory,
    ) -> Result<TemplateGroup, CatalogError> {
        let url = self.category_url(category)?;
        let request_failed = |source: reqwest::Error| CatalogError::Request {
            message: category.title().to_lowercase(),
            source,
        };

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                category: category.title().to_lowercase(),
                status: status.as_u16(),
            });
        }

        let payload: ApiResponse = response.json().await.map_err(request_failed)?;
        let group = parse_group(category, payload)?;
        tracing::debug!(items = group.items.len(), "fetched catalog category");
        Ok(group)
    }

    /// Fetch every category concurrently. Any failing category fails the
    /// whole collection.
    pub async fn fetch_collection(&self) -> Result<TemplateCollection, CatalogError> {
        let requests = TemplateCategory::ALL.map(|category| self.fetch_category(category));
        let template_groups = n0_future::join_all(requests)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TemplateCollection {
            template_groups,
            fetched_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

/// Validate the response envelope and map every item. Items that fail to
/// decode are logged and skipped; the rest of the group is kept.
pub fn parse_group(
    category: TemplateCategory,
    payload: ApiResponse,
) -> Result<TemplateGroup, CatalogError> {
    if payload.result != "ok" {
        return Err(invalid_payload(category));
    }
    let serde_json::Value::Array(raw_items) = payload.data else {
        return Err(invalid_payload(category));
    };

    let items = raw_items
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            match serde_json::from_value::<RawTemplateItem>(value) {
                Ok(item) => Some(map_template_item(category, item)),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        category = %category,
                        index,
                        "skipping malformed catalog item"
                    );
                    None
                }
            }
        })
        .collect();

    Ok(TemplateGroup {
        id: category,
        title: category.title().to_string(),
        items,
    })
}

fn invalid_payload(category: TemplateCategory) -> CatalogError {
    CatalogError::InvalidPayload {
        category: category.title().to_string(),
    }
}
