use std::sync::Arc;

use crate::error::AppError;
use crate::listing::{GroupSort, PageRequest, Pagination, SortOrder, WordSort};
use crate::models::{Group, GroupWithStats, SessionWithStats, WordWithStats};
use crate::repos::GroupRepository;

#[derive(Clone)]
pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
}

impl GroupService {
    pub fn new(groups: Arc<dyn GroupRepository>) -> Self {
        Self { groups }
    }

    pub async fn list_groups(
        &self,
        page: Option<i64>,
        page_size: Option<i64>,
        sort_by: Option<&str>,
        order: Option<&str>,
    ) -> Result<(Vec<Group>, Pagination), AppError> {
        let request = PageRequest::new(page, page_size);
        let sort = GroupSort::parse(sort_by);
        let order = SortOrder::parse(order);

        let (groups, total) = self.groups.list(&request, sort, order).await?;
        Ok((groups, Pagination::new(total, &request)))
    }

    pub async fn get_group(&self, id: i64) -> Result<Group, AppError> {
        self.groups
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("group", id))
    }

    pub async fn get_group_with_stats(&self, id: i64) -> Result<GroupWithStats, AppError> {
        let group = self.get_group(id).await?;
        let stats = self.groups.stats(id).await?;
        Ok(GroupWithStats { group, stats })
    }

    pub async fn create_group(&self, name: &str) -> Result<Group, AppError> {
        validate_group_name(name)?;
        self.groups.create(name.trim()).await
    }

    pub async fn update_group(&self, id: i64, name: &str) -> Result<Group, AppError> {
        validate_group_name(name)?;
        self.groups.update(id, name.trim()).await
    }

    pub async fn delete_group(&self, id: i64) -> Result<(), AppError> {
        self.groups.delete(id).await
    }

    /// Adds the word and returns the group's recomputed words_count.
    pub async fn add_word(&self, group_id: i64, word_id: i64) -> Result<i64, AppError> {
        self.groups.add_word(group_id, word_id).await
    }

    pub async fn remove_word(&self, group_id: i64, word_id: i64) -> Result<i64, AppError> {
        self.groups.remove_word(group_id, word_id).await
    }

    pub async fn list_group_words(
        &self,
        group_id: i64,
        page: Option<i64>,
        page_size: Option<i64>,
        sort_by: Option<&str>,
        order: Option<&str>,
    ) -> Result<(Vec<WordWithStats>, Pagination), AppError> {
        // Listing a missing group is an error, not an empty page.
        self.get_group(group_id).await?;

        let request = PageRequest::new(page, page_size);
        let sort = WordSort::parse(sort_by);
        let order = SortOrder::parse(order);

        let (words, total) = self
            .groups
            .list_words(group_id, &request, sort, order)
            .await?;
        Ok((words, Pagination::new(total, &request)))
    }

    pub async fn list_group_sessions(
        &self,
        group_id: i64,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<(Vec<SessionWithStats>, Pagination), AppError> {
        self.get_group(group_id).await?;

        let request = PageRequest::new(page, page_size);
        let (sessions, total) = self.groups.list_sessions(group_id, &request).await?;
        Ok((sessions, Pagination::new(total, &request)))
    }
}

fn validate_group_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation("group name is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::memory::MemoryStore;
    use crate::repos::WordRepository;
    use crate::models::WordFields;

    fn word_fields(kanji: &str) -> WordFields {
        let mut parts = crate::models::Parts::new();
        parts.insert("part_of_speech".into(), serde_json::json!("noun"));
        WordFields {
            kanji: kanji.to_string(),
            romaji: "hon".to_string(),
            english: "book".to_string(),
            parts,
        }
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let service = GroupService::new(Arc::new(MemoryStore::new()));
        let err = service.create_group("   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn membership_round_trip_restores_words_count() {
        let store = Arc::new(MemoryStore::new());
        let service = GroupService::new(store.clone());

        let group = service.create_group("Basics").await.unwrap();
        let word = WordRepository::create(store.as_ref(), &word_fields("本"))
            .await
            .unwrap();
        assert_eq!(group.words_count, 0);

        let count = service.add_word(group.id, word.id).await.unwrap();
        assert_eq!(count, 1);
        let fetched = service.get_group_with_stats(group.id).await.unwrap();
        assert_eq!(fetched.group.words_count, 1);
        assert_eq!(fetched.stats.total_reviews, 0);
        assert_eq!(fetched.stats.accuracy, 0.0);

        let count = service.remove_word(group.id, word.id).await.unwrap();
        assert_eq!(count, 0);
        let fetched = service.get_group(group.id).await.unwrap();
        assert_eq!(fetched.words_count, 0);
    }

    #[tokio::test]
    async fn removing_non_member_fails_and_keeps_count() {
        let store = Arc::new(MemoryStore::new());
        let service = GroupService::new(store.clone());

        let group = service.create_group("Basics").await.unwrap();
        let member = WordRepository::create(store.as_ref(), &word_fields("本"))
            .await
            .unwrap();
        let outsider = WordRepository::create(store.as_ref(), &word_fields("水"))
            .await
            .unwrap();
        service.add_word(group.id, member.id).await.unwrap();

        let err = service.remove_word(group.id, outsider.id).await.unwrap_err();
        assert!(err.is_not_found());

        let fetched = service.get_group(group.id).await.unwrap();
        assert_eq!(fetched.words_count, 1);
    }

    #[tokio::test]
    async fn listing_words_of_missing_group_is_not_found() {
        let service = GroupService::new(Arc::new(MemoryStore::new()));
        let err = service
            .list_group_words(99, None, None, None, None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
