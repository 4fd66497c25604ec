use chrono::NaiveDate;
use serde::Serialize;

/// Parameters of a single list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
    pub filter_date: Option<NaiveDate>,
}

impl PageQuery {
    pub fn new(page: u32, limit: u32, filter_date: Option<NaiveDate>) -> Self {
        Self {
            page,
            limit,
            filter_date,
        }
    }

    /// Query-string pairs in wire order. The filter is omitted when unset.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(date) = self.filter_date {
            pairs.push(("filterDate", date.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

/// Pagination and contents of the page currently held by a controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageState<T> {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub filter_date: Option<NaiveDate>,
    pub items: Vec<T>,
}

impl<T> PageState<T> {
    /// The state a freshly mounted view starts from.
    pub fn initial() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_count: 0,
            filter_date: None,
            items: Vec::new(),
        }
    }

    /// Builds a state from a server response, enforcing
    /// `1 <= current_page <= total_pages`.
    pub fn from_response(
        current_page: u32,
        total_pages: u32,
        total_count: u64,
        filter_date: Option<NaiveDate>,
        items: Vec<T>,
    ) -> Self {
        let total_pages = total_pages.max(1);
        Self {
            current_page: current_page.clamp(1, total_pages),
            total_pages,
            total_count,
            filter_date,
            items,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        Self::initial()
    }
}

/// Primary state machine shared by both controllers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum LoadStatus {
    Loading,
    Ready,
    Error(String),
}

impl LoadStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadStatus::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadStatus::Ready)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            LoadStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// What happened to a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// The response replaced the page state.
    Applied,
    /// A newer request was issued meanwhile; the response was dropped.
    Superseded,
    /// The requested page was outside `[1, total_pages]`; nothing was sent.
    OutOfRange,
}

/// One slot in a row of pagination controls.
///
/// Serializes as the page number, or `"..."` for a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Gap,
}

impl Serialize for PageItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageItem::Page(n) => serializer.serialize_u32(*n),
            PageItem::Gap => serializer.serialize_str("..."),
        }
    }
}
