use serde::{Deserialize, Serialize};

const MAX_TITLE_LEN: usize = 512;
const MAX_CONTENT_LEN: usize = 100_000;

/// Canonical journal entry as held in the entry store.
///
/// `id` is assigned by the store on first put; timestamps are assigned by the
/// journal service, never by the converter or the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub date_created: Option<i64>,
    pub date_modified: Option<i64>,
}

impl JournalEntry {
    pub fn to_dto(&self) -> EntryDto {
        EntryDto {
            id: self.id.clone(),
            title: self.title.clone(),
            content: Some(self.content.clone()),
            date_created: self.date_created,
            date_modified: self.date_modified,
        }
    }
}

/// Entry as sent/received over the wire. An absent `id` means "create new",
/// a present one means "update existing".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_created: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<i64>,
}

impl EntryDto {
    /// Map to the canonical representation. Client-supplied timestamps are
    /// carried through untouched; the journal service decides what to keep.
    pub fn to_entry(&self) -> JournalEntry {
        JournalEntry {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone().unwrap_or_default(),
            date_created: self.date_created,
            date_modified: self.date_modified,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be blank".into());
        }
        if self.title.len() > MAX_TITLE_LEN {
            return Err(format!(
                "title length must be 1-{MAX_TITLE_LEN}, got {}",
                self.title.len()
            ));
        }
        if let Some(content) = &self.content {
            if content.len() > MAX_CONTENT_LEN {
                return Err(format!(
                    "content length must be 0-{MAX_CONTENT_LEN}, got {}",
                    content.len()
                ));
            }
        }
        Ok(())
    }
}
