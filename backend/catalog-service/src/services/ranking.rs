//! Ranking service: generic engagement rankings plus the fixed presets.
//!
//! Every preset reads the clock exactly once per invocation and binds both
//! window bounds to that single instant, so one call can never straddle two
//! different "now"s.
//!
//! Preset pairs deliberately invert the composition order: under
//! last-applied-order-wins, `popular_last_month` sorts primarily by average
//! rating with the count column present, while `highest_rated_last_month`
//! sorts primarily by review count — mirroring how the rankings are chained
//! upstream.

use std::sync::Arc;

use chrono::{DateTime, Months, Utc};
use sqlx::PgPool;

use crate::db::{BookQuery, DateWindow};
use crate::error::Result;
use crate::models::RankedBook;
use crate::services::clock::{Clock, SystemClock};

/// Minimum qualifying reviews for the one-month presets.
pub const LAST_MONTH_MIN_REVIEWS: i64 = 2;
/// Minimum qualifying reviews for the six-month presets.
pub const LAST_6_MONTHS_MIN_REVIEWS: i64 = 5;

pub struct RankingService {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl RankingService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Books ordered by review count over `window`, descending.
    pub async fn popular(&self, window: DateWindow) -> Result<Vec<RankedBook>> {
        BookQuery::new().popular(window).fetch_all(&self.pool).await
    }

    /// Books ordered by average rating over `window`, descending, unrated
    /// books last.
    pub async fn highest_rated(&self, window: DateWindow) -> Result<Vec<RankedBook>> {
        BookQuery::new()
            .highest_rated(window)
            .fetch_all(&self.pool)
            .await
    }

    pub fn popular_last_month_plan(&self) -> BookQuery {
        let window = self.window_over_months(1);
        BookQuery::new()
            .popular(window)
            .highest_rated(window)
            .min_reviews(LAST_MONTH_MIN_REVIEWS)
    }

    pub async fn popular_last_month(&self) -> Result<Vec<RankedBook>> {
        self.popular_last_month_plan().fetch_all(&self.pool).await
    }

    pub fn popular_last_6_months_plan(&self) -> BookQuery {
        let window = self.window_over_months(6);
        BookQuery::new()
            .popular(window)
            .highest_rated(window)
            .min_reviews(LAST_6_MONTHS_MIN_REVIEWS)
    }

    pub async fn popular_last_6_months(&self) -> Result<Vec<RankedBook>> {
        self.popular_last_6_months_plan()
            .fetch_all(&self.pool)
            .await
    }

    pub fn highest_rated_last_month_plan(&self) -> BookQuery {
        let window = self.window_over_months(1);
        BookQuery::new()
            .highest_rated(window)
            .popular(window)
            .min_reviews(LAST_MONTH_MIN_REVIEWS)
    }

    pub async fn highest_rated_last_month(&self) -> Result<Vec<RankedBook>> {
        self.highest_rated_last_month_plan()
            .fetch_all(&self.pool)
            .await
    }

    pub fn highest_rated_last_6_months_plan(&self) -> BookQuery {
        let window = self.window_over_months(6);
        BookQuery::new()
            .highest_rated(window)
            .popular(window)
            .min_reviews(LAST_6_MONTHS_MIN_REVIEWS)
    }

    pub async fn highest_rated_last_6_months(&self) -> Result<Vec<RankedBook>> {
        self.highest_rated_last_6_months_plan()
            .fetch_all(&self.pool)
            .await
    }

    /// `[now - months, now]` with a single clock read.
    fn window_over_months(&self, months: u32) -> DateWindow {
        let now = self.clock.now();
        let from = now
            .checked_sub_months(Months::new(months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        DateWindow::between(from, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Bind;
    use crate::services::clock::FixedClock;
    use chrono::TimeZone;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unused")
            .expect("lazy pool")
    }

    fn fixed_service(now: DateTime<Utc>) -> RankingService {
        RankingService::new(lazy_pool()).with_clock(Arc::new(FixedClock(now)))
    }

    fn aug_27() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_popular_last_month_window_and_threshold() {
        let now = aug_27();
        let plan = fixed_service(now).popular_last_month_plan();
        let from = Utc.with_ymd_and_hms(2026, 7, 27, 12, 0, 0).unwrap();

        // Count join window, avg join window (identical, independently
        // bound), then the threshold.
        assert_eq!(
            plan.binds(),
            vec![
                Bind::Timestamp(from),
                Bind::Timestamp(now),
                Bind::Timestamp(from),
                Bind::Timestamp(now),
                Bind::Int(LAST_MONTH_MIN_REVIEWS),
            ]
        );
        // highest_rated applied last: avg is the primary sort key.
        assert!(plan
            .sql()
            .ends_with("ORDER BY reviews_avg_rating DESC NULLS LAST, b.id ASC"));
    }

    #[tokio::test]
    async fn test_popular_last_6_months_window_and_threshold() {
        let now = aug_27();
        let plan = fixed_service(now).popular_last_6_months_plan();
        let from = Utc.with_ymd_and_hms(2026, 2, 27, 12, 0, 0).unwrap();

        let binds = plan.binds();
        assert_eq!(binds[0], Bind::Timestamp(from));
        assert_eq!(binds[1], Bind::Timestamp(now));
        assert_eq!(binds[4], Bind::Int(LAST_6_MONTHS_MIN_REVIEWS));
    }

    #[tokio::test]
    async fn test_highest_rated_presets_invert_primary_sort() {
        let service = fixed_service(aug_27());

        let month = service.highest_rated_last_month_plan();
        assert!(month.sql().ends_with("ORDER BY reviews_count DESC, b.id ASC"));
        assert!(month.binds().contains(&Bind::Int(LAST_MONTH_MIN_REVIEWS)));

        let six = service.highest_rated_last_6_months_plan();
        assert!(six.sql().ends_with("ORDER BY reviews_count DESC, b.id ASC"));
        assert!(six.binds().contains(&Bind::Int(LAST_6_MONTHS_MIN_REVIEWS)));
    }

    #[tokio::test]
    async fn test_preset_pairs_share_everything_but_ordering() {
        let service = fixed_service(aug_27());
        let popular = service.popular_last_month_plan();
        let highest = service.highest_rated_last_month_plan();

        assert_eq!(popular.binds(), highest.binds());
        assert_ne!(popular.sql(), highest.sql());
    }

    /// Clock returning a later instant on every read. If a preset read the
    /// clock more than once, `to` would no longer equal the first instant.
    struct SteppingClock {
        base: DateTime<Utc>,
        reads: AtomicI64,
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let step = self.reads.fetch_add(1, Ordering::SeqCst);
            self.base + chrono::Duration::seconds(step)
        }
    }

    #[tokio::test]
    async fn test_preset_reads_clock_exactly_once() {
        let base = aug_27();
        let clock = Arc::new(SteppingClock {
            base,
            reads: AtomicI64::new(0),
        });
        let service = RankingService::new(lazy_pool()).with_clock(clock.clone());

        let plan = service.popular_last_month_plan();
        let binds = plan.binds();

        // Both windows end at the first instant the clock produced.
        assert_eq!(binds[1], Bind::Timestamp(base));
        assert_eq!(binds[3], Bind::Timestamp(base));
        assert_eq!(clock.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_month_end_clamping() {
        // One month before Aug 31 clamps to Jul 31; before Mar 31 clamps
        // to Feb 28 — chrono::Months handles short months without panicking.
        let service = fixed_service(Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap());
        let plan = service.popular_last_month_plan();
        assert_eq!(
            plan.binds()[0],
            Bind::Timestamp(Utc.with_ymd_and_hms(2026, 2, 28, 0, 0, 0).unwrap())
        );
    }
}
