use crate::error::SearchError;
use async_trait::async_trait;
use chatlink_core::CrmContact;
use serde::Serialize;

/// How variation strings are grouped into search terms before chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pooling {
    /// Every distinct variation across all phones is its own term.
    Variations,
    /// Each phone's full variation list is one term.
    PerPhone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchTerm {
    pub values: Vec<String>,
}

impl SearchTerm {
    pub fn single(value: impl Into<String>) -> Self {
        Self {
            values: vec![value.into()],
        }
    }
}

#[async_trait]
pub trait ContactSearch: Send + Sync {
    fn platform(&self) -> &'static str;
    fn phone_fields(&self) -> &[String];
    fn chunk_size(&self) -> usize;

    fn pooling(&self) -> Pooling {
        Pooling::Variations
    }

    /// Runs one chunk of terms against the CRM.
    async fn search(
        &self,
        terms: &[SearchTerm],
        access_token: &str,
    ) -> std::result::Result<Vec<CrmContact>, SearchError>;
}
