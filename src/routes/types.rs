use serde::{Deserialize, Serialize};

/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound on the requested page size
pub const MAX_PAGE_SIZE: usize = 100;

/// Query parameters for listing a collection resource
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Zero-based page number
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl PageQuery {
    pub fn number(&self) -> usize {
        self.page.unwrap_or(0)
    }

    pub fn size(&self) -> usize {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> usize {
        self.number().saturating_mul(self.size())
    }
}

/// Paging metadata of a collection response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
    pub number: usize,
}

impl PageMetadata {
    pub fn new(query: &PageQuery, total_elements: usize) -> Self {
        let size = query.size();
        Self {
            size,
            total_elements,
            total_pages: total_elements.div_ceil(size),
            number: query.number(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    pub status: String,
    pub base_path: String,
    pub students: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
