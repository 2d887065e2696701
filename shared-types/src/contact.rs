use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A stored contact as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Contact {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    /// Always `YYYY-MM-DD` when present
    pub birthday: Option<String>,
    pub category_ids: Vec<String>,
    pub photo_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Photo attached to a contact while it moves through import or export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum PhotoPayload {
    /// Reference to an already stored image
    Url { url: String },
    /// Base64 image data without any `data:` prefix
    Inline { mime_type: String, data_base64: String },
}

/// The unit exchanged by the CSV and vCard codecs.
///
/// Codecs build a record once the whole row or card has been read. Fields are
/// already sanitized: `phone` holds digits with an optional leading `+`, and a
/// malformed birthday is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContactRecord {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[ts(type = "string | null")]
    pub birthday: Option<NaiveDate>,
    pub category_ids: Vec<String>,
    pub photo: Option<PhotoPayload>,
}

impl ContactRecord {
    /// `YYYY-MM-DD` rendering of the birthday.
    pub fn birthday_string(&self) -> Option<String> {
        self.birthday.map(|d| d.format("%Y-%m-%d").to_string())
    }

    pub fn photo_url(&self) -> Option<&str> {
        match &self.photo {
            Some(PhotoPayload::Url { url }) => Some(url.as_str()),
            _ => None,
        }
    }
}

impl From<Contact> for ContactRecord {
    fn from(contact: Contact) -> Self {
        Self {
            name: Some(contact.name),
            phone: Some(contact.phone),
            email: contact.email,
            birthday: contact
                .birthday
                .as_deref()
                .and_then(|b| NaiveDate::parse_from_str(b, "%Y-%m-%d").ok()),
            category_ids: contact.category_ids,
            photo: contact.photo_url.map(|url| PhotoPayload::Url { url }),
        }
    }
}

/// Validated input for the contact store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub user_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub category_ids: Vec<String>,
    pub photo_url: Option<String>,
}

/// Filters applied when listing or exporting a user's contacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactQuery {
    /// Case-insensitive substring of name, phone or email
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub has_birthday: bool,
}

impl ContactQuery {
    /// Applies the in-memory part of the filter (search and birthday).
    pub fn matches(&self, contact: &Contact) -> bool {
        if self.has_birthday && contact.birthday.is_none() {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                contact.name.to_lowercase().contains(&term)
                    || contact.phone.contains(&term)
                    || contact
                        .email
                        .as_deref()
                        .is_some_and(|e| e.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ContactsResponse {
    pub contacts: Vec<Contact>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str, email: Option<&str>, birthday: Option<&str>) -> Contact {
        Contact {
            id: 1,
            user_id: "u1".to_string(),
            name: name.to_string(),
            phone: "+15550100".to_string(),
            email: email.map(String::from),
            birthday: birthday.map(String::from),
            category_ids: vec![],
            photo_url: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_query_search_is_case_insensitive() {
        let query = ContactQuery {
            search: Some("JANE".to_string()),
            ..Default::default()
        };
        assert!(query.matches(&contact("Jane Roe", None, None)));
        assert!(!query.matches(&contact("Bob", Some("bob@example.com"), None)));
        assert!(query.matches(&contact("Bob", Some("jane.b@example.com"), None)));
    }

    #[test]
    fn test_query_has_birthday() {
        let query = ContactQuery {
            has_birthday: true,
            ..Default::default()
        };
        assert!(!query.matches(&contact("Jane", None, None)));
        assert!(query.matches(&contact("Jane", None, Some("1990-01-02"))));
    }

    #[test]
    fn test_record_from_contact() {
        let mut stored = contact("Jane", None, Some("1990-01-02"));
        stored.photo_url = Some("http://localhost/photos/a.png".to_string());

        let record = ContactRecord::from(stored);
        assert_eq!(record.birthday_string().as_deref(), Some("1990-01-02"));
        assert_eq!(record.photo_url(), Some("http://localhost/photos/a.png"));
    }
}
