//! Plan-level tests for the ranking engine public API.
//!
//! No database required: these exercise the query plans a caller composes
//! through the crate surface, pinned to a fixed clock.

use std::sync::Arc;

use catalog_service::cache::MemoryCache;
use catalog_service::db::{Bind, BookQuery, DateWindow};
use catalog_service::services::{
    FixedClock, RankingService, LAST_6_MONTHS_MIN_REVIEWS, LAST_MONTH_MIN_REVIEWS,
};
use catalog_service::CatalogService;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgresql://localhost/unused")
        .expect("lazy pool")
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 27, 9, 30, 0).unwrap()
}

fn service() -> RankingService {
    RankingService::new(lazy_pool()).with_clock(Arc::new(FixedClock(fixed_now())))
}

#[test]
fn composing_all_three_effects_yields_one_query() {
    let now = fixed_now();
    let window = DateWindow::between(now - chrono::Duration::days(30), now);
    let plan = BookQuery::new()
        .popular(window)
        .highest_rated(window)
        .min_reviews(2);
    let sql = plan.sql();

    // One select, both aggregate joins, one threshold filter, one ORDER BY.
    assert_eq!(sql.matches("SELECT b.id").count(), 1);
    assert_eq!(sql.matches("LEFT JOIN").count(), 2);
    assert_eq!(sql.matches("ORDER BY").count(), 1);
    assert!(sql.contains("COALESCE(rc.reviews_count, 0) >= $5"));
}

#[test]
fn later_ordering_takes_precedence_and_keeps_count_column() {
    let window = DateWindow::unbounded();
    let plan = BookQuery::new().popular(window).highest_rated(window);

    assert!(plan
        .sql()
        .ends_with("ORDER BY reviews_avg_rating DESC NULLS LAST, b.id ASC"));
    assert!(plan.sql().contains("AS reviews_count"));
}

#[tokio::test]
async fn preset_thresholds_match_their_windows() {
    let service = service();

    assert!(service
        .popular_last_month_plan()
        .binds()
        .contains(&Bind::Int(LAST_MONTH_MIN_REVIEWS)));
    assert!(service
        .popular_last_6_months_plan()
        .binds()
        .contains(&Bind::Int(LAST_6_MONTHS_MIN_REVIEWS)));
    assert!(service
        .highest_rated_last_month_plan()
        .binds()
        .contains(&Bind::Int(LAST_MONTH_MIN_REVIEWS)));
    assert!(service
        .highest_rated_last_6_months_plan()
        .binds()
        .contains(&Bind::Int(LAST_6_MONTHS_MIN_REVIEWS)));
}

#[tokio::test]
async fn preset_windows_end_at_the_injected_instant() {
    let service = service();
    for plan in [
        service.popular_last_month_plan(),
        service.popular_last_6_months_plan(),
        service.highest_rated_last_month_plan(),
        service.highest_rated_last_6_months_plan(),
    ] {
        let binds = plan.binds();
        assert_eq!(binds[1], Bind::Timestamp(fixed_now()));
        assert_eq!(binds[3], Bind::Timestamp(fixed_now()));
    }
}

#[tokio::test]
async fn popular_and_highest_rated_presets_disagree_on_primary_sort() {
    let service = service();

    assert!(service
        .popular_last_month_plan()
        .sql()
        .contains("ORDER BY reviews_avg_rating DESC NULLS LAST"));
    assert!(service
        .highest_rated_last_month_plan()
        .sql()
        .contains("ORDER BY reviews_count DESC"));
}

#[tokio::test]
async fn assembled_service_uses_the_injected_clock() {
    let service = CatalogService::assemble_with_clock(
        lazy_pool(),
        Arc::new(MemoryCache::new()),
        Arc::new(FixedClock(fixed_now())),
    );

    // Preset windows end at the pinned instant, not the wall clock.
    let binds = service.rankings.popular_last_month_plan().binds();
    assert_eq!(binds[1], Bind::Timestamp(fixed_now()));
    assert_eq!(binds[3], Bind::Timestamp(fixed_now()));
}

#[tokio::test]
async fn repeated_invocations_render_identical_plans() {
    let service = service();
    let first = service.popular_last_6_months_plan();
    let second = service.popular_last_6_months_plan();
    assert_eq!(first.sql(), second.sql());
    assert_eq!(first.binds(), second.binds());
}
