//! Sections in the local tier.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tablebuilder_core::settings::Settings;
use tablebuilder_core::types::{DbId, Timestamp};

use super::{fresh_id, modify_records, read_records, KvStore, SECTIONS_KEY};
use crate::models::section::{CreateSection, Section, UpdateSection};
use crate::store::{SectionStore, StoreError};

/// Stored shape of one section.
///
/// Owner and timestamps are written under both snake_case and camelCase
/// names; records written by either convention are readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SectionRecord {
    id: DbId,
    name: String,
    #[serde(default)]
    settings: Settings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<DbId>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    user_id_camel: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<Timestamp>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    created_at_camel: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<Timestamp>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    updated_at_camel: Option<Timestamp>,
}

impl SectionRecord {
    fn owner(&self) -> Option<DbId> {
        self.user_id.or(self.user_id_camel)
    }

    fn touch(&mut self, at: Timestamp) {
        self.updated_at = Some(at);
        self.updated_at_camel = Some(at);
    }

    /// `None` for records with no owner, which no user can reach.
    fn to_section(&self) -> Option<Section> {
        let user_id = self.owner()?;
        let created_at = self
            .created_at
            .or(self.created_at_camel)
            .unwrap_or_default();
        let updated_at = self
            .updated_at
            .or(self.updated_at_camel)
            .unwrap_or(created_at);
        Some(Section {
            id: self.id,
            user_id,
            name: self.name.clone(),
            settings: self.settings.clone(),
            created_at,
            updated_at,
        })
    }
}

impl From<&Section> for SectionRecord {
    fn from(section: &Section) -> Self {
        Self {
            id: section.id,
            name: section.name.clone(),
            settings: section.settings.clone(),
            user_id: Some(section.user_id),
            user_id_camel: Some(section.user_id),
            created_at: Some(section.created_at),
            created_at_camel: Some(section.created_at),
            updated_at: Some(section.updated_at),
            updated_at_camel: Some(section.updated_at),
        }
    }
}

/// Newest first, ties broken by id.
fn newest_first(mut sections: Vec<Section>) -> Vec<Section> {
    sections.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    sections
}

/// Sections stored under [`SECTIONS_KEY`].
#[derive(Clone)]
pub struct LocalSectionStore {
    kv: Arc<dyn KvStore>,
}

impl LocalSectionStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    fn records(&self) -> Result<Vec<SectionRecord>, StoreError> {
        read_records(self.kv.as_ref(), SECTIONS_KEY)
    }
}

#[async_trait]
impl SectionStore for LocalSectionStore {
    async fn list_for_user(&self, user_id: DbId) -> Result<Vec<Section>, StoreError> {
        let sections = self
            .records()?
            .iter()
            .filter(|r| r.owner() == Some(user_id))
            .filter_map(SectionRecord::to_section)
            .collect();
        Ok(newest_first(sections))
    }

    async fn list_all(&self) -> Result<Vec<Section>, StoreError> {
        let sections = self
            .records()?
            .iter()
            .filter_map(SectionRecord::to_section)
            .collect();
        Ok(newest_first(sections))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Section>, StoreError> {
        Ok(self
            .records()?
            .iter()
            .find(|r| r.id == id)
            .and_then(SectionRecord::to_section))
    }

    async fn create(&self, user_id: DbId, input: &CreateSection) -> Result<Section, StoreError> {
        let section = modify_records(self.kv.as_ref(), SECTIONS_KEY, |records: &mut Vec<SectionRecord>| {
            let now = Utc::now();
            let section = Section {
                id: fresh_id(records.iter().map(|r| r.id)),
                user_id,
                name: input.name.clone(),
                settings: input.settings.clone(),
                created_at: now,
                updated_at: now,
            };
            records.push(SectionRecord::from(&section));
            Ok(section)
        })?;
        tracing::debug!(section_id = section.id, user_id, "Section saved locally");
        Ok(section)
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdateSection,
    ) -> Result<Option<Section>, StoreError> {
        modify_records(self.kv.as_ref(), SECTIONS_KEY, |records: &mut Vec<SectionRecord>| {
            let Some(record) = records.iter_mut().find(|r| r.id == id) else {
                return Ok(None);
            };
            if let Some(name) = &input.name {
                record.name = name.clone();
            }
            if let Some(settings) = &input.settings {
                record.settings = settings.clone();
            }
            record.touch(Utc::now());
            Ok(record.to_section())
        })
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        modify_records(self.kv.as_ref(), SECTIONS_KEY, |records: &mut Vec<SectionRecord>| {
            let before = records.len();
            records.retain(|r| r.id != id);
            Ok(records.len() < before)
        })
    }

    async fn delete_for_user(&self, user_id: DbId) -> Result<u64, StoreError> {
        modify_records(self.kv.as_ref(), SECTIONS_KEY, |records: &mut Vec<SectionRecord>| {
            let before = records.len();
            records.retain(|r| r.owner() != Some(user_id));
            Ok((before - records.len()) as u64)
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::local::MemoryKvStore;

    fn store() -> (Arc<MemoryKvStore>, LocalSectionStore) {
        let kv = Arc::new(MemoryKvStore::new());
        (kv.clone(), LocalSectionStore::new(kv))
    }

    fn input(name: &str) -> CreateSection {
        CreateSection {
            name: name.to_string(),
            settings: Settings::default(),
        }
    }

    #[tokio::test]
    async fn create_writes_both_key_conventions() {
        let (kv, store) = store();
        let section = store.create(7, &input("Patio")).await.unwrap();

        let raw: Value = serde_json::from_str(&kv.get(SECTIONS_KEY).unwrap().unwrap()).unwrap();
        let record = &raw[0];
        assert_eq!(record["id"], json!(section.id));
        assert_eq!(record["user_id"], json!(7));
        assert_eq!(record["userId"], json!(7));
        assert!(record["created_at"].is_string());
        assert_eq!(record["created_at"], record["createdAt"]);
        assert_eq!(record["updated_at"], record["updatedAt"]);
    }

    #[tokio::test]
    async fn unreadable_record_does_not_block_the_rest() {
        let (kv, store) = store();
        let stored = json!([
            {
                "id": 1,
                "name": "Broken",
                "user_id": 3,
                "created_at": "2024-05-01T12:00:00Z",
                "settings": { "buttonStyle": "neon" }
            },
            {
                "id": 2,
                "name": "Fine",
                "user_id": 3,
                "created_at": "2024-05-02T12:00:00Z",
                "settings": {}
            }
        ]);
        kv.set(SECTIONS_KEY, &stored.to_string()).unwrap();

        let listed = store.list_for_user(3).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Fine");

        let created = store.create(3, &input("New")).await.unwrap();
        assert_eq!(store.list_for_user(3).await.unwrap().len(), 2);
        assert!(store.find_by_id(created.id).await.unwrap().is_some());

        let raw = kv.get(SECTIONS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"neon\""));
    }

    #[tokio::test]
    async fn camel_case_records_are_readable() {
        let (kv, store) = store();
        let legacy = json!([{
            "id": 1700000000000_i64,
            "name": "Legacy",
            "userId": 3,
            "createdAt": "2024-05-01T12:00:00Z",
            "settings": { "title": "Old Title" }
        }]);
        kv.set(SECTIONS_KEY, &legacy.to_string()).unwrap();

        let sections = store.list_for_user(3).await.unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].settings.title, "Old Title");
        assert_eq!(sections[0].updated_at, sections[0].created_at);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let (_kv, store) = store();
        let section = store.create(1, &input("Bar")).await.unwrap();

        let patch = UpdateSection {
            name: Some("Bar Counter".to_string()),
            settings: None,
        };
        let updated = store.update(section.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.name, "Bar Counter");
        assert!(updated.updated_at >= section.updated_at);

        assert!(store.update(-99, &patch).await.unwrap().is_none());
        assert!(store.delete(section.id).await.unwrap());
        assert!(!store.delete(section.id).await.unwrap());
        assert!(store.find_by_id(section.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listing_is_scoped_and_ordered() {
        let (_kv, store) = store();
        let first = store.create(1, &input("First")).await.unwrap();
        let second = store.create(1, &input("Second")).await.unwrap();
        store.create(2, &input("Other")).await.unwrap();

        let mine = store.list_for_user(1).await.unwrap();
        assert_eq!(
            mine.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
        assert_eq!(store.list_all().await.unwrap().len(), 3);
        assert_eq!(store.delete_for_user(1).await.unwrap(), 2);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_copies_settings_under_new_id() {
        let (_kv, store) = store();
        let mut create = input("Terrace");
        create.settings.title = "Sunset Seating".to_string();
        let original = store.create(4, &create).await.unwrap();

        let copy = store.duplicate(original.id, 4).await.unwrap().unwrap();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "Terrace (Copy)");
        assert_eq!(copy.settings, original.settings);
        assert!(store.duplicate(-1, 4).await.unwrap().is_none());
    }
}
