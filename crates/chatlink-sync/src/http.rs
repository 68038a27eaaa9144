use crate::error::{Result, SearchError};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

const DEFAULT_USER_AGENT: &str = "chatlink";

pub fn build_client(user_agent: Option<&str>) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> Result<Url> {
    let url = Url::parse(&format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))?;
    Ok(url)
}

/// Maps the status onto [`SearchError`] and decodes the body. Only 401 is
/// `Unauthorized`: a 403 (missing scope) is not fixed by a token refresh.
/// An empty body (Zoho answers searches without hits with 204) decodes to
/// `T::default()`.
pub(crate) async fn read_json<T>(response: Response) -> std::result::Result<T, SearchError>
where
    T: DeserializeOwned + Default,
{
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        let body = response.text().await.unwrap_or_default();
        return Err(SearchError::Unauthorized {
            status: status.as_u16(),
            body,
        });
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SearchError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await?;
    if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&body).map_err(|err| SearchError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::endpoint;

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let url = endpoint("https://api.hubapi.com/", "/crm/v3/objects/contacts/search")
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://api.hubapi.com/crm/v3/objects/contacts/search"
        );
        let nested = endpoint("https://proxy.example.com/hubspot", "crm/v3").expect("url");
        assert_eq!(nested.as_str(), "https://proxy.example.com/hubspot/crm/v3");
    }

    #[test]
    fn endpoint_rejects_invalid_base() {
        assert!(endpoint("not a url", "crm").is_err());
    }
}
