//! PostgreSQL store
//!
//! sqlx queries over the `categories`, `subcategories`, `annonces` and
//! `search_queries` tables (see `migrations/`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::domain::search::escape_like;
use crate::domain::{
    Category, CategoryActivity, CategoryWithSubcategories, Listing, ListingFilter, SearchCount,
    SearchQueryRecord, Subcategory, SuggestionCandidate, TimeWindow,
};

use super::{MarketplaceStore, StoreError};

/// Upper bound on distinct queries pulled for trending searches
const GROUP_SCAN_LIMIT: i64 = 1000;

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    icon: String,
    description: Option<String>,
    is_active: bool,
    sort_order: i32,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            icon: row.icon,
            description: row.description,
            is_active: row.is_active,
            sort_order: row.sort_order,
        }
    }
}

#[derive(Debug, FromRow)]
struct SubcategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    is_active: bool,
    sort_order: i32,
    category_id: Uuid,
}

impl From<SubcategoryRow> for Subcategory {
    fn from(row: SubcategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            is_active: row.is_active,
            sort_order: row.sort_order,
            category_id: row.category_id,
        }
    }
}

#[derive(Debug, FromRow)]
struct ListingRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    price: Decimal,
    location: String,
    image_url: String,
    posted_at: DateTime<Utc>,
    condition: String,
    seller_id: Uuid,
    category_id: Option<Uuid>,
    subcategory_id: Option<Uuid>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            location: row.location,
            image_url: row.image_url,
            posted_at: row.posted_at,
            condition: row.condition,
            seller_id: row.seller_id,
            category_id: row.category_id,
            subcategory_id: row.subcategory_id,
        }
    }
}

const LISTING_COLUMNS: &str = "l.id, l.title, l.description, l.price, l.location, l.image_url, \
     l.posted_at, l.condition, l.seller_id, l.category_id, l.subcategory_id";

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new PgStore over a shared pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn subcategories_of(&self, category_ids: &[Uuid]) -> Result<Vec<Subcategory>, StoreError> {
        let rows: Vec<SubcategoryRow> = sqlx::query_as(
            r#"
            SELECT id, name, slug, description, is_active, sort_order, category_id
            FROM subcategories
            WHERE category_id = ANY($1)
            ORDER BY sort_order, name
            "#,
        )
        .bind(category_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Subcategory::from).collect())
    }

    async fn listing_candidates(
        &self,
        patterns: &MatchPatterns,
        limit: i64,
    ) -> Result<Vec<SuggestionCandidate>, StoreError> {
        let sql = format!(
            r#"
            SELECT id, title, posted_at
            FROM annonces
            WHERE title ILIKE $4
            ORDER BY {}, posted_at DESC
            LIMIT $5
            "#,
            match_tier_sql("title")
        );
        let rows: Vec<(Uuid, String, DateTime<Utc>)> = patterns
            .bind_to(sqlx::query_as(&sql))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, title, posted_at)| SuggestionCandidate::listing(title, id, posted_at))
            .collect())
    }

    async fn category_candidates(
        &self,
        patterns: &MatchPatterns,
        limit: i64,
    ) -> Result<Vec<SuggestionCandidate>, StoreError> {
        let sql = format!(
            r#"
            SELECT name, slug
            FROM categories
            WHERE is_active AND name ILIKE $4
            ORDER BY {}, sort_order, name
            LIMIT $5
            "#,
            match_tier_sql("name")
        );
        let categories: Vec<(String, String)> = patterns
            .bind_to(sqlx::query_as(&sql))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!(
            r#"
            SELECT s.name, s.slug
            FROM subcategories s
            JOIN categories c ON c.id = s.category_id
            WHERE s.is_active AND c.is_active AND s.name ILIKE $4
            ORDER BY {}, s.sort_order, s.name
            LIMIT $5
            "#,
            match_tier_sql("s.name")
        );
        let subcategories: Vec<(String, String)> = patterns
            .bind_to(sqlx::query_as(&sql))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(categories
            .into_iter()
            .map(|(name, slug)| SuggestionCandidate::category(name, slug))
            .chain(
                subcategories
                    .into_iter()
                    .map(|(name, slug)| SuggestionCandidate::subcategory(name, slug)),
            )
            .collect())
    }

    async fn history_candidates(
        &self,
        patterns: &MatchPatterns,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<SuggestionCandidate>, StoreError> {
        let sql = format!(
            r#"
            SELECT normalized_query, MAX(searched_at) AS last_searched_at
            FROM search_queries
            WHERE normalized_query LIKE $4 AND searched_at >= $6
            GROUP BY normalized_query
            ORDER BY {}, COUNT(*) DESC, MAX(searched_at) DESC, normalized_query
            LIMIT $5
            "#,
            match_tier_sql("normalized_query")
        );
        let rows: Vec<(String, DateTime<Utc>)> = patterns
            .bind_to(sqlx::query_as(&sql))
            .bind(limit)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(query, last)| SuggestionCandidate::search(query, last))
            .collect())
    }
}

/// LIKE patterns for one normalized query, bound as `$1..$4`
#[derive(Debug)]
struct MatchPatterns {
    exact: String,
    prefix: String,
    word_prefix: String,
    substring: String,
}

impl MatchPatterns {
    fn new(normalized_query: &str) -> Self {
        let escaped = escape_like(normalized_query);
        Self {
            exact: normalized_query.to_string(),
            prefix: format!("{escaped}%"),
            word_prefix: format!("% {escaped}%"),
            substring: format!("%{escaped}%"),
        }
    }

    fn bind_to<'q, O>(
        &'q self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        query
            .bind(&self.exact)
            .bind(&self.prefix)
            .bind(&self.word_prefix)
            .bind(&self.substring)
    }
}

/// Match quality of `column` against the bound patterns, best first.
/// Same tiers as `MatchTier::classify`, with words split on spaces.
fn match_tier_sql(column: &str) -> String {
    format!(
        "CASE WHEN LOWER({column}) = $1 THEN 0 \
              WHEN LOWER({column}) LIKE $2 THEN 1 \
              WHEN LOWER({column}) LIKE $3 THEN 2 \
              ELSE 3 END"
    )
}

#[async_trait]
impl MarketplaceStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithSubcategories>, StoreError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r#"
            SELECT id, name, slug, icon, description, is_active, sort_order
            FROM categories
            ORDER BY sort_order, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let subcategories = self.subcategories_of(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryWithSubcategories::assemble(row.into(), &subcategories))
            .collect())
    }

    async fn find_category(
        &self,
        slug: &str,
    ) -> Result<Option<CategoryWithSubcategories>, StoreError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            r#"
            SELECT id, name, slug, icon, description, is_active, sort_order
            FROM categories
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let subcategories = self.subcategories_of(&[row.id]).await?;
        Ok(Some(CategoryWithSubcategories::assemble(
            row.into(),
            &subcategories,
        )))
    }

    async fn recent_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, StoreError> {
        let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);

        let rows: Vec<ListingRow> = match &filter.category_slug {
            Some(slug) => {
                let sql = format!(
                    r#"
                    SELECT {LISTING_COLUMNS}
                    FROM annonces l
                    LEFT JOIN subcategories s ON s.id = l.subcategory_id
                    JOIN categories c ON c.id = COALESCE(l.category_id, s.category_id)
                    WHERE c.slug = $1
                    ORDER BY l.posted_at DESC, l.id
                    LIMIT $2
                    "#
                );
                sqlx::query_as(&sql)
                    .bind(slug)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    r#"
                    SELECT {LISTING_COLUMNS}
                    FROM annonces l
                    ORDER BY l.posted_at DESC, l.id
                    LIMIT $1
                    "#
                );
                sqlx::query_as(&sql).bind(limit).fetch_all(&self.pool).await?
            }
        };

        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM annonces l WHERE l.id = $1");
        let row: Option<ListingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Listing::from))
    }

    async fn suggestion_candidates(
        &self,
        normalized_query: &str,
        history_since: DateTime<Utc>,
        per_source: usize,
    ) -> Result<Vec<SuggestionCandidate>, StoreError> {
        let patterns = MatchPatterns::new(normalized_query);
        let limit = i64::try_from(per_source).unwrap_or(i64::MAX);

        let (categories, history, listings) = tokio::try_join!(
            self.category_candidates(&patterns, limit),
            self.history_candidates(&patterns, history_since, limit),
            self.listing_candidates(&patterns, limit),
        )?;

        Ok(categories.into_iter().chain(history).chain(listings).collect())
    }

    async fn record_search(&self, record: &SearchQueryRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO search_queries (id, query, normalized_query, searched_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id)
        .bind(&record.query)
        .bind(&record.normalized_query)
        .bind(record.searched_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn search_counts(&self, window: &TimeWindow) -> Result<Vec<SearchCount>, StoreError> {
        let rows: Vec<(String, i64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT normalized_query, COUNT(*)::BIGINT, MAX(searched_at)
            FROM search_queries
            WHERE searched_at >= $1 AND searched_at <= $2
            GROUP BY normalized_query
            ORDER BY COUNT(*) DESC, MAX(searched_at) DESC, normalized_query
            LIMIT $3
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .bind(GROUP_SCAN_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(query, count, last_searched_at)| SearchCount {
                query,
                count,
                last_searched_at,
            })
            .collect())
    }

    async fn category_activity(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<CategoryActivity>, StoreError> {
        let rows: Vec<(Uuid, String, String, String, i32, i64, i64, i64)> = sqlx::query_as(
            r#"
            WITH listing_activity AS (
                SELECT COALESCE(l.category_id, s.category_id) AS category_id,
                       FLOOR(EXTRACT(EPOCH FROM ($2 - l.posted_at)) / 86400)::BIGINT AS age_days,
                       COUNT(*)::BIGINT AS listings
                FROM annonces l
                LEFT JOIN subcategories s ON s.id = l.subcategory_id
                WHERE l.posted_at >= $1 AND l.posted_at <= $2
                  AND COALESCE(l.category_id, s.category_id) IS NOT NULL
                GROUP BY 1, 2
            ),
            search_activity AS (
                SELECT c.id AS category_id,
                       FLOOR(EXTRACT(EPOCH FROM ($2 - q.searched_at)) / 86400)::BIGINT AS age_days,
                       COUNT(*)::BIGINT AS searches
                FROM search_queries q
                JOIN categories c
                  ON c.name <> '' AND STRPOS(q.normalized_query, LOWER(c.name)) > 0
                WHERE q.searched_at >= $1 AND q.searched_at <= $2
                GROUP BY 1, 2
            )
            SELECT c.id, c.name, c.slug, c.icon, c.sort_order,
                   COALESCE(la.age_days, sa.age_days) AS age_days,
                   COALESCE(la.listings, 0) AS listings,
                   COALESCE(sa.searches, 0) AS searches
            FROM listing_activity la
            FULL OUTER JOIN search_activity sa
              ON sa.category_id = la.category_id AND sa.age_days = la.age_days
            JOIN categories c ON c.id = COALESCE(la.category_id, sa.category_id)
            WHERE c.is_active
            ORDER BY c.id, age_days
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(category_id, name, slug, icon, sort_order, age_days, listings, searches)| {
                    CategoryActivity {
                        category_id,
                        name,
                        slug,
                        icon,
                        sort_order,
                        age_days,
                        listings,
                        searches,
                    }
                },
            )
            .collect())
    }

    async fn purge_searches_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM search_queries WHERE searched_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
