use super::ContactStore;
use crate::database::contacts as contacts_db;
use crate::database::AsyncDbConnection;
use async_trait::async_trait;
use shared_types::{Contact, ContactQuery, NewContact};

pub struct SqliteContactStore {
    conn: AsyncDbConnection,
}

impl SqliteContactStore {
    pub fn new(conn: AsyncDbConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    async fn insert_many(&self, contacts: &[NewContact]) -> anyhow::Result<usize> {
        contacts_db::insert_contacts(self.conn.clone(), contacts).await
    }

    async fn query(&self, user_id: &str, query: &ContactQuery) -> anyhow::Result<Vec<Contact>> {
        // Category narrows in SQL; search and birthday are applied here
        let contacts =
            contacts_db::list_contacts(self.conn.clone(), user_id, query.category_id.as_deref())
                .await?;

        Ok(contacts.into_iter().filter(|c| query.matches(c)).collect())
    }

    async fn get(&self, user_id: &str, contact_id: i64) -> anyhow::Result<Option<Contact>> {
        contacts_db::get_contact(self.conn.clone(), user_id, contact_id).await
    }

    async fn set_photo_url(
        &self,
        user_id: &str,
        contact_id: i64,
        url: &str,
    ) -> anyhow::Result<bool> {
        contacts_db::update_photo_url(self.conn.clone(), user_id, contact_id, url).await
    }
}
