use crate::database::AsyncDbConnection;
use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};
use shared_types::{Contact, NewContact};

const CATEGORY_SEPARATOR: char = '\u{1f}';

const SELECT_CONTACTS: &str = "SELECT c.id, c.user_id, c.name, c.phone, c.email, c.birthday,
            c.photo_url, c.created_at, c.updated_at,
            GROUP_CONCAT(cc.category_id, char(31))
     FROM contacts c
     LEFT JOIN contact_categories cc ON cc.contact_id = c.id";

/// Inserts all contacts in one transaction and returns how many were written.
pub async fn insert_contacts(conn: AsyncDbConnection, contacts: &[NewContact]) -> Result<usize> {
    let mut conn = conn.lock().await?;
    let now = chrono::Utc::now().timestamp();

    let tx = conn.transaction()?;
    {
        let mut insert_contact = tx.prepare(
            "INSERT INTO contacts
             (user_id, name, phone, email, birthday, photo_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        let mut insert_category = tx.prepare(
            "INSERT OR IGNORE INTO contact_categories (contact_id, category_id) VALUES (?1, ?2)",
        )?;

        for contact in contacts {
            insert_contact.execute(params![
                &contact.user_id,
                &contact.name,
                &contact.phone,
                contact.email.as_ref(),
                contact.birthday.map(|d| d.format("%Y-%m-%d").to_string()),
                contact.photo_url.as_ref(),
                now,
                now,
            ])?;
            let contact_id = tx.last_insert_rowid();

            for category_id in &contact.category_ids {
                insert_category.execute(params![contact_id, category_id])?;
            }
        }
    }
    tx.commit()?;

    Ok(contacts.len())
}

/// Lists a user's contacts, optionally restricted to one category.
pub async fn list_contacts(
    conn: AsyncDbConnection,
    user_id: &str,
    category_id: Option<&str>,
) -> Result<Vec<Contact>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(&format!(
        "{SELECT_CONTACTS}
         WHERE c.user_id = ?1
           AND (?2 IS NULL OR c.id IN
                (SELECT contact_id FROM contact_categories WHERE category_id = ?2))
         GROUP BY c.id
         ORDER BY c.name COLLATE NOCASE, c.id"
    ))?;

    let contacts = stmt
        .query_map(params![user_id, category_id], contact_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(contacts)
}

pub async fn get_contact(
    conn: AsyncDbConnection,
    user_id: &str,
    id: i64,
) -> Result<Option<Contact>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(&format!(
        "{SELECT_CONTACTS}
         WHERE c.user_id = ?1 AND c.id = ?2
         GROUP BY c.id"
    ))?;

    stmt.query_row(params![user_id, id], contact_from_row)
        .optional()
        .map_err(|e| anyhow::anyhow!("Failed to get contact: {}", e))
}

/// Returns `false` when no contact with that id belongs to the user.
pub async fn update_photo_url(
    conn: AsyncDbConnection,
    user_id: &str,
    id: i64,
    photo_url: &str,
) -> Result<bool> {
    let conn = conn.lock().await?;
    let now = chrono::Utc::now().timestamp();

    let updated = conn.execute(
        "UPDATE contacts SET photo_url = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
        params![photo_url, now, id, user_id],
    )?;

    Ok(updated > 0)
}

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    let categories: Option<String> = row.get(9)?;

    Ok(Contact {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        birthday: row.get(5)?,
        photo_url: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        category_ids: categories
            .map(|joined| {
                joined
                    .split(CATEGORY_SEPARATOR)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use chrono::NaiveDate;

    fn new_contact(user_id: &str, name: &str, categories: &[&str]) -> NewContact {
        NewContact {
            user_id: user_id.to_string(),
            name: name.to_string(),
            phone: "555".to_string(),
            email: None,
            birthday: None,
            category_ids: categories.iter().map(|c| c.to_string()).collect(),
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("contacts.db")).unwrap();
        let conn = db.async_connection.clone();

        let mut bob = new_contact("u1", "bob", &["friends", "work"]);
        bob.birthday = NaiveDate::from_ymd_opt(1990, 1, 2);
        let contacts = vec![
            bob,
            new_contact("u1", "Alice", &[]),
            new_contact("u2", "Mallory", &["friends"]),
        ];

        assert_eq!(insert_contacts(conn.clone(), &contacts).await.unwrap(), 3);

        let listed = list_contacts(conn.clone(), "u1", None).await.unwrap();
        let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "bob"]);
        assert!(listed[0].category_ids.is_empty());

        let mut categories = listed[1].category_ids.clone();
        categories.sort();
        assert_eq!(categories, vec!["friends", "work"]);
        assert_eq!(listed[1].birthday.as_deref(), Some("1990-01-02"));

        let friends = list_contacts(conn.clone(), "u1", Some("friends")).await.unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].name, "bob");
        // Filtering must not hide the contact's other categories
        assert_eq!(friends[0].category_ids.len(), 2);
    }

    #[tokio::test]
    async fn test_update_photo_url_checks_owner() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("contacts.db")).unwrap();
        let conn = db.async_connection.clone();

        insert_contacts(conn.clone(), &[new_contact("u1", "Ann", &[])])
            .await
            .unwrap();
        let id = list_contacts(conn.clone(), "u1", None).await.unwrap()[0].id;

        assert!(!update_photo_url(conn.clone(), "u2", id, "http://x/a.jpg").await.unwrap());
        assert!(update_photo_url(conn.clone(), "u1", id, "http://x/a.jpg").await.unwrap());

        let contact = get_contact(conn.clone(), "u1", id).await.unwrap().unwrap();
        assert_eq!(contact.photo_url.as_deref(), Some("http://x/a.jpg"));
        assert!(get_contact(conn, "u2", id).await.unwrap().is_none());
    }
}
