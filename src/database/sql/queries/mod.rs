
use anyhow::{Context, Result};
use sqlx::AnyConnection;
use tracing::debug;

use crate::database::sql::models::SolutionRecord;

/// Rebuilds one row per solution language entry from the link tables.
///
/// Each child table is aggregated on its own and the aggregates are stitched
/// together with full outer joins, so a solution missing pricing options (or
/// any other child rows) still appears with a NULL in that column. Written in
/// the dialect PostgreSQL and SQLite (3.44+) share.
pub const SOLUTIONS_QUERY: &str = r#"
WITH pricing_option_cte AS (
    SELECT a.Id, a.Title, a.Abstract, a.Description, a.Keywords, a.ReadySolutionId,
           STRING_AGG(c.Title, ', ') AS pricing_options
    FROM ReadySolutionLanguage a
    FULL JOIN ReadySolutionPricingOptionLinks b ON a.ReadySolutionId = b.ReadySolutionId
    FULL JOIN PricingOptions c ON b.PricingOptionId = c.Id
    GROUP BY a.Id, a.Title, a.Abstract, a.Description, a.Keywords, a.ReadySolutionId
),
targeted_customers AS (
    SELECT a.Id, STRING_AGG(e.Title, ',') AS customer_types
    FROM ReadySolutionLanguage a
    FULL JOIN ReadySolutionCustomerTypeLinks d ON d.ReadySolutionId = a.ReadySolutionId
    FULL JOIN CustomerTypes e ON e.Id = d.CustomerTypeId
    GROUP BY a.Id
),
solution_types AS (
    SELECT a.Id, STRING_AGG(g.Title, ',') AS solution_types
    FROM ReadySolutionLanguage a
    FULL JOIN ReadySolutionTypeLinks f ON f.ReadySolutionId = a.ReadySolutionId
    FULL JOIN ReadySolutionTypes g ON g.Id = f.ReadySolutionTypeId
    GROUP BY a.Id
),
active_sales_centers AS (
    SELECT a.ReadySolutionId, STRING_AGG(b.Country, ',') AS sales_centers
    FROM SalesPartnerLinks a
    JOIN Company b ON a.SalesPartnerId = b.Id
    GROUP BY a.ReadySolutionId
),
origin_countries AS (
    SELECT a.ReadySolutionId, c.Country
    FROM ReadySolutionLanguage a
    JOIN ReadySolutions b ON a.ReadySolutionId = b.Id
    JOIN Company c ON b.CompanyId = c.Id
)
SELECT DISTINCT
    CAST(a.Id AS BIGINT) AS id,
    a.Title AS title,
    a.Abstract AS abstract,
    a.Description AS description,
    a.Keywords AS keywords,
    a.pricing_options AS pricing_options,
    b.customer_types AS customer_types,
    c.solution_types AS solution_types,
    e.Country AS country,
    d.sales_centers AS sales_centers,
    'https://www.findaso.com/ready-solution/' || COALESCE(CAST(a.ReadySolutionId AS TEXT), '') AS link
FROM pricing_option_cte a
FULL JOIN targeted_customers b ON a.Id = b.Id
FULL JOIN solution_types c ON a.Id = c.Id
FULL JOIN active_sales_centers d ON a.ReadySolutionId = d.ReadySolutionId
FULL JOIN origin_countries e ON e.ReadySolutionId = a.ReadySolutionId
WHERE a.Id IS NOT NULL
ORDER BY id
"#;

pub struct SolutionQueries;

impl SolutionQueries {
    /// Run the solutions query and materialise every row
    pub async fn fetch_all(conn: &mut AnyConnection) -> Result<Vec<SolutionRecord>> {
        let records = sqlx::query_as::<_, SolutionRecord>(SOLUTIONS_QUERY)
            .fetch_all(&mut *conn)
            .await
            .context("Failed to run solutions query")?;

        debug!("Solutions query returned {} rows", records.len());
        Ok(records)
    }
}
