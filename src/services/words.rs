use std::sync::Arc;

use crate::error::AppError;
use crate::listing::{PageRequest, Pagination, SortOrder, WordSort};
use crate::models::{Word, WordFields, WordStats, WordWithStats};
use crate::repos::WordRepository;

#[derive(Clone)]
pub struct WordService {
    words: Arc<dyn WordRepository>,
}

impl WordService {
    pub fn new(words: Arc<dyn WordRepository>) -> Self {
        Self { words }
    }

    pub async fn list_words(
        &self,
        page: Option<i64>,
        page_size: Option<i64>,
        sort_by: Option<&str>,
        order: Option<&str>,
    ) -> Result<(Vec<WordWithStats>, Pagination), AppError> {
        let request = PageRequest::new(page, page_size);
        let sort = WordSort::parse(sort_by);
        let order = SortOrder::parse(order);

        let (words, total) = self.words.list(&request, sort, order).await?;
        Ok((words, Pagination::new(total, &request)))
    }

    pub async fn get_word(&self, id: i64) -> Result<WordWithStats, AppError> {
        self.words
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("word", id))
    }

    pub async fn create_word(&self, fields: WordFields) -> Result<Word, AppError> {
        validate_word(&fields)?;
        self.words.create(&fields).await
    }

    pub async fn update_word(&self, id: i64, fields: WordFields) -> Result<Word, AppError> {
        validate_word(&fields)?;
        self.words.update(id, &fields).await
    }

    pub async fn delete_word(&self, id: i64) -> Result<(), AppError> {
        self.words.delete(id).await
    }

    pub async fn word_stats(&self, id: i64) -> Result<WordStats, AppError> {
        if self.words.get(id).await?.is_none() {
            return Err(AppError::not_found("word", id));
        }
        self.words.stats(id).await
    }
}

fn validate_word(fields: &WordFields) -> Result<(), AppError> {
    if fields.kanji.trim().is_empty() {
        return Err(AppError::validation("word kanji is required"));
    }
    if fields.romaji.trim().is_empty() {
        return Err(AppError::validation("word romaji is required"));
    }
    if fields.english.trim().is_empty() {
        return Err(AppError::validation("word english is required"));
    }
    if fields.parts.is_empty() {
        return Err(AppError::validation("word parts are required"));
    }
    Ok(())
}
