pub mod local_blob_store;
pub mod sqlite_store;

pub use local_blob_store::LocalBlobStore;
pub use sqlite_store::SqliteContactStore;

use anyhow::Result;
use async_trait::async_trait;
use shared_types::{Contact, ContactQuery, NewContact};

/// Durable home of contacts, scoped per owning user.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Bulk insert; returns the number of rows written.
    async fn insert_many(&self, contacts: &[NewContact]) -> Result<usize>;

    /// Contacts of `user_id` matching the query, ordered by name.
    async fn query(&self, user_id: &str, query: &ContactQuery) -> Result<Vec<Contact>>;

    /// A single contact, only if it belongs to `user_id`.
    async fn get(&self, user_id: &str, contact_id: i64) -> Result<Option<Contact>>;

    /// Returns `false` if the contact does not exist or belongs to someone else.
    async fn set_photo_url(&self, user_id: &str, contact_id: i64, url: &str) -> Result<bool>;
}

/// Object storage for contact photos.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    fn public_url(&self, key: &str) -> String;

    /// Whether `url` points at this store or at an origin it is configured
    /// to trust. Only such URLs may be kept as a contact's photo.
    fn serves_url(&self, url: &str) -> bool;

    /// Downloads the object behind a URL for which `serves_url` holds.
    /// Any other URL is refused without a request being made.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
