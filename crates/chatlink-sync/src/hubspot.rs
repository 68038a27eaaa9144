use crate::error::{Result, SearchError};
use crate::http::{endpoint, read_json};
use crate::source::{ContactSearch, SearchTerm};
use async_trait::async_trait;
use chatlink_core::CrmContact;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use url::Url;

const SEARCH_PATH: &str = "crm/v3/objects/contacts/search";
const PAGE_LIMIT: usize = 100;
const MAX_PAGES: usize = 10;

/// Contact search against the HubSpot CRM v3 search endpoint.
///
/// A chunk becomes one request with a filter group per phone field, each using
/// `IN` over every value in the chunk; groups are OR-ed by HubSpot.
#[derive(Debug, Clone)]
pub struct HubSpotSearch {
    client: Client,
    search_url: Url,
    phone_fields: Vec<String>,
    chunk_size: usize,
}

impl HubSpotSearch {
    pub fn new(
        client: Client,
        base_url: &str,
        phone_fields: Vec<String>,
        chunk_size: usize,
    ) -> Result<Self> {
        Ok(Self {
            client,
            search_url: endpoint(base_url, SEARCH_PATH)?,
            phone_fields,
            chunk_size,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    filter_groups: Vec<FilterGroup<'a>>,
    properties: &'a [String],
    limit: usize,
    after: String,
}

#[derive(Debug, Serialize)]
struct FilterGroup<'a> {
    filters: [Filter<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Filter<'a> {
    property_name: &'a str,
    operator: &'static str,
    values: &'a [String],
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<HubSpotContact>,
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct HubSpotContact {
    id: String,
    #[serde(default)]
    properties: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    next: Option<NextPage>,
}

#[derive(Debug, Deserialize)]
struct NextPage {
    after: String,
}

impl From<HubSpotContact> for CrmContact {
    fn from(contact: HubSpotContact) -> Self {
        let fields = contact
            .properties
            .into_iter()
            .filter_map(|(name, value)| value.map(|value| (name, value)))
            .collect();
        CrmContact {
            id: contact.id,
            fields,
        }
    }
}

#[async_trait]
impl ContactSearch for HubSpotSearch {
    fn platform(&self) -> &'static str {
        "hubspot"
    }

    fn phone_fields(&self) -> &[String] {
        &self.phone_fields
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    async fn search(
        &self,
        terms: &[SearchTerm],
        access_token: &str,
    ) -> std::result::Result<Vec<CrmContact>, SearchError> {
        let values: Vec<String> = terms
            .iter()
            .flat_map(|term| term.values.iter().cloned())
            .collect();
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let mut contacts = Vec::new();
        let mut after = "0".to_string();
        for _ in 0..MAX_PAGES {
            let request = SearchRequest {
                filter_groups: self
                    .phone_fields
                    .iter()
                    .map(|field| FilterGroup {
                        filters: [Filter {
                            property_name: field,
                            operator: "IN",
                            values: &values,
                        }],
                    })
                    .collect(),
                properties: &self.phone_fields,
                limit: PAGE_LIMIT,
                after: after.clone(),
            };
            let response = self
                .client
                .post(self.search_url.clone())
                .bearer_auth(access_token)
                .json(&request)
                .send()
                .await?;
            let page: SearchResponse = read_json(response).await?;
            debug!(results = page.results.len(), after = %after, "hubspot search page");
            contacts.extend(page.results.into_iter().map(CrmContact::from));

            match page.paging.and_then(|paging| paging.next) {
                Some(next) => after = next.after,
                None => return Ok(contacts),
            }
        }

        warn!(pages = MAX_PAGES, "hubspot search truncated at page limit, later results dropped");
        Ok(contacts)
    }
}
