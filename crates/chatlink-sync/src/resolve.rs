use crate::auth::TokenRefresher;
use crate::error::{Result, SearchError, SyncError};
use crate::source::{ContactSearch, Pooling, SearchTerm};
use chatlink_core::{
    generate_variations, match_contacts, CrmContact, PhoneToContactMap, VariationSet,
};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }
}

#[derive(Debug)]
pub struct ChunkReport {
    pub index: usize,
    pub terms: usize,
    /// Number of contacts the chunk returned, or why it was skipped.
    pub outcome: std::result::Result<usize, SearchError>,
}

#[derive(Debug, Default)]
pub struct Resolution {
    pub matches: PhoneToContactMap,
    pub chunks: Vec<ChunkReport>,
}

impl Resolution {
    pub fn failed_chunks(&self) -> impl Iterator<Item = &ChunkReport> {
        self.chunks.iter().filter(|chunk| chunk.outcome.is_err())
    }
}

/// Resolves raw phones to CRM contacts through one [`ContactSearch`].
///
/// Chunks run one after another with a pause in between; the pause yields to
/// the runtime, so other resolutions on the same scheduler keep progressing.
pub struct ContactResolver<S> {
    search: S,
    credentials: Credentials,
    refresher: Option<Box<dyn TokenRefresher>>,
    chunk_delay: Duration,
}

impl<S: ContactSearch> ContactResolver<S> {
    pub fn new(search: S, credentials: Credentials) -> Self {
        Self {
            search,
            credentials,
            refresher: None,
            chunk_delay: DEFAULT_CHUNK_DELAY,
        }
    }

    pub fn with_refresher(mut self, refresher: Box<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn with_chunk_delay(mut self, chunk_delay: Duration) -> Self {
        self.chunk_delay = chunk_delay;
        self
    }

    pub fn search(&self) -> &S {
        &self.search
    }

    pub fn platform(&self) -> &'static str {
        self.search.platform()
    }

    /// Chunk failures are recorded in the returned [`Resolution`] and never abort
    /// the call. Only a rejected access token with no way to refresh it does.
    pub async fn resolve(&self, raw_phones: &[String]) -> Result<Resolution> {
        let platform = self.search.platform();
        let phone_to_variations = collect_variations(raw_phones)?;
        if phone_to_variations.is_empty() {
            debug!(platform, "no phones to resolve");
            return Ok(Resolution::default());
        }

        let terms = build_terms(&phone_to_variations, self.search.pooling());
        let chunk_size = self.search.chunk_size().max(1);
        let mut access_token = self.credentials.access_token.clone();
        let mut contacts: Vec<CrmContact> = Vec::new();
        let mut chunks = Vec::new();

        for (index, chunk) in terms.chunks(chunk_size).enumerate() {
            if index > 0 && !self.chunk_delay.is_zero() {
                tokio::time::sleep(self.chunk_delay).await;
            }

            let first = self.search.search(chunk, &access_token).await;
            let outcome = match first {
                Err(err) if err.is_unauthorized() => {
                    self.retry_with_refresh(chunk, err, &mut access_token)
                        .await?
                }
                outcome => outcome,
            };

            let outcome = match outcome {
                Ok(found) => {
                    let count = found.len();
                    contacts.extend(found);
                    Ok(count)
                }
                Err(err) => {
                    warn!(platform, chunk = index, error = %err, "search chunk failed, skipping");
                    Err(err)
                }
            };
            chunks.push(ChunkReport {
                index,
                terms: chunk.len(),
                outcome,
            });
        }

        let matches = match_contacts(&phone_to_variations, &contacts, self.search.phone_fields());
        debug!(
            platform,
            phones = phone_to_variations.len(),
            chunks = chunks.len(),
            contacts = contacts.len(),
            matched = matches.len(),
            "resolution finished"
        );
        Ok(Resolution { matches, chunks })
    }

    async fn retry_with_refresh(
        &self,
        chunk: &[SearchTerm],
        original: SearchError,
        access_token: &mut String,
    ) -> Result<std::result::Result<Vec<CrmContact>, SearchError>> {
        let platform = self.search.platform();
        let (Some(refresher), Some(refresh_token)) = (
            self.refresher.as_deref(),
            self.credentials.refresh_token.as_deref(),
        ) else {
            return Err(SyncError::Unauthorized {
                platform,
                source: original,
            });
        };

        info!(platform, "access token rejected, refreshing");
        match refresher.refresh(refresh_token).await {
            Ok(token) => {
                *access_token = token;
                Ok(self.search.search(chunk, access_token.as_str()).await)
            }
            Err(err) => {
                warn!(platform, error = %err, "token refresh failed");
                Ok(Err(original))
            }
        }
    }
}

fn collect_variations(raw_phones: &[String]) -> Result<BTreeMap<String, VariationSet>> {
    let mut out = BTreeMap::new();
    for raw in raw_phones {
        if raw.trim().is_empty() {
            debug!("skipping blank phone");
            continue;
        }
        if out.contains_key(raw) {
            continue;
        }
        out.insert(raw.clone(), generate_variations(raw)?);
    }
    Ok(out)
}

fn build_terms(
    phone_to_variations: &BTreeMap<String, VariationSet>,
    pooling: Pooling,
) -> Vec<SearchTerm> {
    match pooling {
        Pooling::Variations => {
            let mut seen = HashSet::new();
            phone_to_variations
                .values()
                .flatten()
                .filter(|value| seen.insert(value.as_str()))
                .map(|value| SearchTerm::single(value.as_str()))
                .collect()
        }
        Pooling::PerPhone => phone_to_variations
            .values()
            .map(|variations| SearchTerm {
                values: variations.iter().cloned().collect(),
            })
            .collect(),
    }
}
