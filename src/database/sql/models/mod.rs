
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One solution as reconstructed by the solutions query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, Default)]
pub struct SolutionRecord {
    pub id: i64,
    pub title: Option<String>,
    #[sqlx(rename = "abstract")]
    pub abstract_html: Option<String>,
    #[sqlx(rename = "description")]
    pub description_html: Option<String>,
    pub keywords: Option<String>,
    pub pricing_options: Option<String>,
    pub customer_types: Option<String>,
    pub solution_types: Option<String>,
    pub country: Option<String>,
    pub sales_centers: Option<String>,
    pub link: Option<String>,
}

impl SolutionRecord {
    /// Title as it appears in documents and progress output
    #[inline]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("None")
    }

    /// Key under which every chunk of this record is stored in the index
    #[inline]
    pub fn vector_id(&self) -> String {
        format!("solution_{}", self.id)
    }
}
