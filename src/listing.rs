use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A normalized page request. Out-of-range or unparsable input falls back to
/// the defaults instead of failing.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = match page {
            Some(value) if value >= 1 => value,
            _ => DEFAULT_PAGE,
        };
        let page_size = match page_size {
            Some(value) if value >= 1 => value,
            _ => DEFAULT_PAGE_SIZE,
        };
        Self { page, page_size }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Query-layer offset. Never surfaces in responses.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// The pagination block attached to every listing response. `current_page`
/// echoes the requested page even when it lies past `total_pages`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
}

impl Pagination {
    pub fn new(total_items: i64, request: &PageRequest) -> Self {
        let total_pages = if total_items <= 0 {
            0
        } else {
            (total_items + request.page_size - 1) / request.page_size
        };
        Self {
            current_page: request.page,
            total_pages,
            total_items,
            items_per_page: request.page_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Case-insensitive; anything other than "desc" sorts ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Whitelisted sort fields for word listings. Unknown keys fall back to
/// kanji; the raw string never reaches the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordSort {
    Kanji,
    Romaji,
    English,
    CorrectCount,
    WrongCount,
}

impl WordSort {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("kanji") => WordSort::Kanji,
            Some("romaji") => WordSort::Romaji,
            Some("english") => WordSort::English,
            Some("correct_count") => WordSort::CorrectCount,
            Some("wrong_count") => WordSort::WrongCount,
            _ => WordSort::Kanji,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            WordSort::Kanji => "kanji",
            WordSort::Romaji => "romaji",
            WordSort::English => "english",
            WordSort::CorrectCount => "correct_count",
            WordSort::WrongCount => "wrong_count",
        }
    }
}

/// Whitelisted sort fields for group listings, defaulting to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSort {
    Name,
    WordsCount,
}

impl GroupSort {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("name") => GroupSort::Name,
            Some("words_count") => GroupSort::WordsCount,
            _ => GroupSort::Name,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            GroupSort::Name => "name",
            GroupSort::WordsCount => "words_count",
        }
    }
}
