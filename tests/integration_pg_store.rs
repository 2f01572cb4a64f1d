//! PostgreSQL store tests
//!
//! Need a disposable database: `DATABASE_URL=... cargo test -- --ignored`

use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use grabi::domain::{ListingFilter, SearchQuery, SearchQueryRecord, SuggestionKind, TimeWindow};
use grabi::{db, MarketplaceStore, PgStore};

mod common;

async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    db::run_migrations(&pool).await.expect("Failed to migrate");

    sqlx::query("TRUNCATE TABLE search_queries, annonces, subcategories, categories CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}

async fn insert_category(pool: &PgPool, name: &str, sort_order: i32) -> Uuid {
    let category = common::category(name, sort_order);
    sqlx::query(
        r#"
        INSERT INTO categories (id, name, slug, icon, is_active, sort_order)
        VALUES ($1, $2, $3, $4, true, $5)
        "#,
    )
    .bind(category.id)
    .bind(&category.name)
    .bind(&category.slug)
    .bind(&category.icon)
    .bind(category.sort_order)
    .execute(pool)
    .await
    .expect("Failed to seed category");
    category.id
}

async fn insert_subcategory(pool: &PgPool, category_id: Uuid, name: &str, sort_order: i32) {
    sqlx::query(
        r#"
        INSERT INTO subcategories (id, name, slug, is_active, sort_order, category_id)
        VALUES ($1, $2, $3, true, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(name.to_lowercase())
    .bind(sort_order)
    .bind(category_id)
    .execute(pool)
    .await
    .expect("Failed to seed subcategory");
}

async fn insert_listing(pool: &PgPool, title: &str, category_id: Uuid) -> Uuid {
    let listing = common::listing(title, Some(category_id), Utc::now());
    sqlx::query(
        r#"
        INSERT INTO annonces (id, title, price, location, image_url, posted_at, condition, seller_id, category_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(listing.id)
    .bind(&listing.title)
    .bind(listing.price)
    .bind(&listing.location)
    .bind(&listing.image_url)
    .bind(listing.posted_at)
    .bind(&listing.condition)
    .bind(listing.seller_id)
    .bind(category_id)
    .execute(pool)
    .await
    .expect("Failed to seed listing");
    listing.id
}

async fn track(store: &PgStore, raw: &str) {
    let query = SearchQuery::parse(raw).unwrap();
    store
        .record_search(&SearchQueryRecord::new(&query, Utc::now()))
        .await
        .unwrap();
}

#[tokio::test]
#[ignore]
async fn test_pg_directory_and_listings() {
    let pool = setup_test_db().await;
    let store = PgStore::new(pool.clone());

    let vehicles = insert_category(&pool, "Vehicles", 2).await;
    let home = insert_category(&pool, "Home", 1).await;
    insert_subcategory(&pool, home, "A", 1).await;
    insert_subcategory(&pool, home, "B", 0).await;
    let golf = insert_listing(&pool, "Golf 7", vehicles).await;
    insert_listing(&pool, "Sofa", home).await;

    store.ping().await.unwrap();

    let categories = store.list_categories().await.unwrap();
    assert_eq!(categories.len(), 2);
    let home_entry = categories
        .iter()
        .find(|c| c.category.id == home)
        .unwrap();
    let subs: Vec<_> = home_entry.subcategories.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(subs, vec!["B", "A"]);

    let found = store.find_category("vehicles").await.unwrap();
    assert_eq!(found.map(|c| c.category.id), Some(vehicles));

    let filter = ListingFilter::new(10).with_category("vehicles");
    let listings = store.recent_listings(&filter).await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].id, golf);

    assert!(store.find_listing(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_pg_search_tracking_and_trending() {
    let pool = setup_test_db().await;
    let store = PgStore::new(pool.clone());
    let phones = insert_category(&pool, "Phones", 0).await;
    insert_listing(&pool, "Phone case", phones).await;

    for raw in ["chair", "Chair", "chair ", "phones"] {
        track(&store, raw).await;
    }

    let window = TimeWindow::trailing(Duration::days(7), Utc::now());
    let counts = store.search_counts(&window).await.unwrap();
    let chair = counts.iter().find(|c| c.query == "chair").unwrap();
    assert_eq!(chair.count, 3);

    let activity = store.category_activity(&window).await.unwrap();
    let listings: i64 = activity.iter().map(|a| a.listings).sum();
    let searches: i64 = activity.iter().map(|a| a.searches).sum();
    assert_eq!(listings, 1);
    assert_eq!(searches, 1);

    let candidates = store
        .suggestion_candidates("pho", Utc::now() - Duration::days(30), 4)
        .await
        .unwrap();
    assert!(candidates.iter().any(|c| c.kind == SuggestionKind::Category));
    assert!(candidates.iter().any(|c| c.kind == SuggestionKind::Listing));
    assert!(candidates.iter().any(|c| c.kind == SuggestionKind::Search));

    let purged = store
        .purge_searches_before(Utc::now() + Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(purged, 4);
}

async fn insert_listing_at(pool: &PgPool, title: &str, category_id: Uuid, age: Duration) {
    let listing = common::listing(title, Some(category_id), Utc::now() - age);
    sqlx::query(
        r#"
        INSERT INTO annonces (id, title, price, location, image_url, posted_at, condition, seller_id, category_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(listing.id)
    .bind(&listing.title)
    .bind(listing.price)
    .bind(&listing.location)
    .bind(&listing.image_url)
    .bind(listing.posted_at)
    .bind(&listing.condition)
    .bind(listing.seller_id)
    .bind(category_id)
    .execute(pool)
    .await
    .expect("Failed to seed listing");
}

#[tokio::test]
#[ignore]
async fn test_pg_candidates_keep_best_matches_within_cap() {
    let pool = setup_test_db().await;
    let store = PgStore::new(pool.clone());
    let home = insert_category(&pool, "Home", 0).await;

    insert_listing_at(&pool, "Sofa", home, Duration::days(3)).await;
    insert_listing_at(&pool, "Big sofa bed", home, Duration::days(2)).await;
    insert_listing_at(&pool, "Red sofa", home, Duration::days(1)).await;
    insert_listing_at(&pool, "Old sofa", home, Duration::zero()).await;

    let candidates = store
        .suggestion_candidates("sofa", Utc::now() - Duration::days(30), 2)
        .await
        .unwrap();
    let titles: Vec<_> = candidates
        .iter()
        .filter(|c| c.kind == SuggestionKind::Listing)
        .map(|c| c.text.as_str())
        .collect();
    assert_eq!(titles, vec!["Sofa", "Old sofa"]);
}

#[tokio::test]
#[ignore]
async fn test_pg_search_counts_break_ties_by_query() {
    let pool = setup_test_db().await;
    let store = PgStore::new(pool.clone());
    let at = Utc::now() - Duration::hours(1);

    // One more distinct query than the store pulls, all tied on count and time
    sqlx::query(
        r#"
        INSERT INTO search_queries (id, query, normalized_query, searched_at)
        SELECT gen_random_uuid(), 'q' || LPAD(i::TEXT, 4, '0'), 'q' || LPAD(i::TEXT, 4, '0'), $1
        FROM generate_series(0, 1000) AS i
        "#,
    )
    .bind(at)
    .execute(&pool)
    .await
    .expect("Failed to seed searches");

    let window = TimeWindow::trailing(Duration::days(7), Utc::now());
    let counts = store.search_counts(&window).await.unwrap();

    assert_eq!(counts.len(), 1000);
    assert_eq!(counts[0].query, "q0000");
    assert!(counts.iter().all(|c| c.query != "q1000"));
}

#[tokio::test]
#[ignore]
async fn test_pg_category_activity_matches_names_literally() {
    let pool = setup_test_db().await;
    let store = PgStore::new(pool.clone());
    let underscore = insert_category(&pool, "A_B", 0).await;
    let percent = insert_category(&pool, "50%", 1).await;

    for raw in ["axb stuff", "500 things", "a_b stuff"] {
        track(&store, raw).await;
    }

    let window = TimeWindow::trailing(Duration::days(7), Utc::now());
    let activity = store.category_activity(&window).await.unwrap();
    let searches = |id: Uuid| -> i64 {
        activity
            .iter()
            .filter(|a| a.category_id == id)
            .map(|a| a.searches)
            .sum()
    };

    assert_eq!(searches(underscore), 1);
    assert_eq!(searches(percent), 0);
}
