pub mod auth;
pub mod error;
pub mod http;
pub mod hubspot;
pub mod resolve;
pub mod source;
pub mod zoho;

pub use auth::{OAuthRefresher, TokenRefresher};
pub use error::{Result, SearchError, SyncError};
pub use hubspot::HubSpotSearch;
pub use resolve::{ChunkReport, ContactResolver, Credentials, Resolution};
pub use source::{ContactSearch, Pooling, SearchTerm};
pub use zoho::ZohoSearch;
