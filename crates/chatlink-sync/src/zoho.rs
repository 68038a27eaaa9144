use crate::error::{Result, SearchError};
use crate::http::{endpoint, read_json};
use crate::source::{ContactSearch, Pooling, SearchTerm};
use async_trait::async_trait;
use chatlink_core::CrmContact;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

const COMPOSITE_PATH: &str = "crm/v6/__composite_requests";
const SEARCH_URI: &str = "/crm/v6/Contacts/search";

/// Contact search against Zoho CRM. Zoho caps composite envelopes at five
/// sub-requests, so every term (one phone's variations) is a sub-request.
#[derive(Debug, Clone)]
pub struct ZohoSearch {
    client: Client,
    composite_url: Url,
    phone_fields: Vec<String>,
    chunk_size: usize,
}

impl ZohoSearch {
    pub fn new(
        client: Client,
        base_url: &str,
        phone_fields: Vec<String>,
        chunk_size: usize,
    ) -> Result<Self> {
        Ok(Self {
            client,
            composite_url: endpoint(base_url, COMPOSITE_PATH)?,
            phone_fields,
            chunk_size,
        })
    }
}

#[derive(Debug, Serialize)]
struct CompositeRequest<'a> {
    parallel_execution: bool,
    #[serde(rename = "__composite_requests")]
    requests: Vec<SubRequest<'a>>,
}

#[derive(Debug, Serialize)]
struct SubRequest<'a> {
    sub_request_id: String,
    method: &'static str,
    uri: &'static str,
    params: SubParams<'a>,
}

#[derive(Debug, Serialize)]
struct SubParams<'a> {
    criteria: String,
    fields: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct CompositeResponse {
    #[serde(rename = "__composite_requests", default)]
    responses: Vec<SubResponse>,
}

#[derive(Debug, Deserialize)]
struct SubResponse {
    #[serde(default)]
    sub_request_id: Option<String>,
    details: Option<SubDetails>,
}

#[derive(Debug, Deserialize)]
struct SubDetails {
    response: SubResult,
}

#[derive(Debug, Deserialize)]
struct SubResult {
    status_code: u16,
    #[serde(default)]
    body: Value,
}

/// `(Phone:in:a,b) or (Mobile:in:a,b)` with criteria metacharacters escaped.
pub fn build_criteria(phone_fields: &[String], values: &[String]) -> String {
    let joined = values
        .iter()
        .map(|value| escape_criteria_value(value))
        .collect::<Vec<_>>()
        .join(",");
    phone_fields
        .iter()
        .map(|field| format!("({field}:in:{joined})"))
        .collect::<Vec<_>>()
        .join(" or ")
}

fn escape_criteria_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '(' | ')' | ',' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn record_to_contact(record: &Map<String, Value>, phone_fields: &[String]) -> Option<CrmContact> {
    let id = match record.get("id")? {
        Value::String(id) => id.clone(),
        Value::Number(id) => id.to_string(),
        _ => return None,
    };
    let mut contact = CrmContact::new(id);
    for field in phone_fields {
        if let Some(Value::String(value)) = record.get(field) {
            contact = contact.with_field(field.clone(), value.clone());
        }
    }
    Some(contact)
}

fn sub_result_contacts(
    result: SubResult,
    phone_fields: &[String],
) -> std::result::Result<Vec<CrmContact>, SearchError> {
    match result.status_code {
        204 => Ok(Vec::new()),
        200..=299 => {
            let records = result
                .body
                .get("data")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            Ok(records
                .iter()
                .filter_map(Value::as_object)
                .filter_map(|record| record_to_contact(record, phone_fields))
                .collect())
        }
        401 => Err(SearchError::Unauthorized {
            status: result.status_code,
            body: result.body.to_string(),
        }),
        status => Err(SearchError::Status {
            status,
            body: result.body.to_string(),
        }),
    }
}

#[async_trait]
impl ContactSearch for ZohoSearch {
    fn platform(&self) -> &'static str {
        "zoho"
    }

    fn phone_fields(&self) -> &[String] {
        &self.phone_fields
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn pooling(&self) -> Pooling {
        Pooling::PerPhone
    }

    async fn search(
        &self,
        terms: &[SearchTerm],
        access_token: &str,
    ) -> std::result::Result<Vec<CrmContact>, SearchError> {
        let fields = self.phone_fields.join(",");
        let requests: Vec<SubRequest<'_>> = terms
            .iter()
            .filter(|term| !term.values.is_empty())
            .enumerate()
            .map(|(idx, term)| SubRequest {
                sub_request_id: (idx + 1).to_string(),
                method: "GET",
                uri: SEARCH_URI,
                params: SubParams {
                    criteria: build_criteria(&self.phone_fields, &term.values),
                    fields: &fields,
                },
            })
            .collect();
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let envelope = CompositeRequest {
            parallel_execution: true,
            requests,
        };
        let response = self
            .client
            .post(self.composite_url.clone())
            .header(AUTHORIZATION, format!("Zoho-oauthtoken {access_token}"))
            .json(&envelope)
            .send()
            .await?;
        let composite: CompositeResponse = read_json(response).await?;

        let mut contacts = Vec::new();
        for sub in composite.responses {
            let sub_request = sub.sub_request_id.as_deref().unwrap_or("?");
            let Some(details) = sub.details else {
                warn!(sub_request, "zoho sub-request has no response, skipping");
                continue;
            };
            let found = match sub_result_contacts(details.response, &self.phone_fields) {
                Ok(found) => found,
                Err(err) if err.is_unauthorized() => return Err(err),
                Err(err) => {
                    warn!(sub_request, error = %err, "zoho sub-request failed, skipping");
                    continue;
                }
            };
            debug!(sub_request, results = found.len(), "zoho search sub-request");
            contacts.extend(found);
        }
        Ok(contacts)
    }
}
