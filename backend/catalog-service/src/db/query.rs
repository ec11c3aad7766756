//! Query-plan construction for book ranking.
//!
//! `BookQuery` is an owned, chainable plan value: composer methods consume
//! and return the plan, and nothing touches the database until
//! [`BookQuery::fetch_all`]. Each aggregate column (`reviews_count`,
//! `reviews_avg_rating`) is backed by its own independently-scoped
//! `LEFT JOIN (... GROUP BY book_id)` subquery, so the two date filters can
//! never interfere with each other and the join is built once no matter how
//! many composer calls reference it.
//!
//! Rendering is deterministic: [`BookQuery::sql`] exposes the exact SQL for
//! inspection, and every plan carries a stable `b.id ASC` tie-break so
//! identical inputs produce identical orderings.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use crate::error::Result;
use crate::models::RankedBook;

/// Inclusive time window restricting which reviews count toward an
/// aggregate. Either bound may be absent; no `from <= to` validation is
/// performed — an inverted window simply matches no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateWindow {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// Window with both bounds present: `[from, to]`, inclusive.
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Window matching every review.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn since(from: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    pub fn until(to: DateTime<Utc>) -> Self {
        Self {
            from: None,
            to: Some(to),
        }
    }

    /// Renders the review-side predicate, appending bind values in the
    /// order their placeholders appear. Returns `None` when unbounded.
    fn predicate(&self, binds: &mut Vec<Bind>) -> Option<String> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => {
                let a = push_bind(binds, Bind::Timestamp(from));
                let b = push_bind(binds, Bind::Timestamp(to));
                Some(format!("created_at BETWEEN ${} AND ${}", a, b))
            }
            (Some(from), None) => {
                let a = push_bind(binds, Bind::Timestamp(from));
                Some(format!("created_at >= ${}", a))
            }
            (None, Some(to)) => {
                let a = push_bind(binds, Bind::Timestamp(to));
                Some(format!("created_at <= ${}", a))
            }
            (None, None) => None,
        }
    }
}

/// Positional bind value carried alongside the rendered SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Timestamp(DateTime<Utc>),
    Int(i64),
    Text(String),
}

fn push_bind(binds: &mut Vec<Bind>, value: Bind) -> usize {
    binds.push(value);
    binds.len()
}

/// Primary sort key. The plan holds at most one: applying a second ordering
/// replaces the first (last-applied wins), matching query-builder chaining
/// semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderKey {
    ReviewsCount,
    ReviewsAvgRating,
}

/// An un-executed ranking query over books.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookQuery {
    count_window: Option<DateWindow>,
    avg_window: Option<DateWindow>,
    title_filter: Option<String>,
    min_reviews: Option<i64>,
    order: Option<OrderKey>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl BookQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring filter on the book title.
    pub fn title_like(mut self, needle: &str) -> Self {
        self.title_filter = Some(format!("%{}%", escape_like(needle)));
        self
    }

    /// Adds the `reviews_count` derived column: per book, the number of
    /// reviews whose `created_at` falls inside `window`. Books with no
    /// qualifying reviews read 0.
    pub fn with_reviews_count(mut self, window: DateWindow) -> Self {
        self.count_window = Some(window);
        self
    }

    /// Adds the `reviews_avg_rating` derived column: mean rating over the
    /// windowed review set. Books with no qualifying reviews read SQL NULL,
    /// never zero.
    pub fn with_avg_rating(mut self, window: DateWindow) -> Self {
        self.avg_window = Some(window);
        self
    }

    /// Count reviews in `window` and order by `reviews_count` descending.
    pub fn popular(self, window: DateWindow) -> Self {
        let mut plan = self.with_reviews_count(window);
        plan.order = Some(OrderKey::ReviewsCount);
        plan
    }

    /// Average ratings in `window` and order by `reviews_avg_rating`
    /// descending, NULLS LAST — unrated books never outrank rated ones.
    pub fn highest_rated(self, window: DateWindow) -> Self {
        let mut plan = self.with_avg_rating(window);
        plan.order = Some(OrderKey::ReviewsAvgRating);
        plan
    }

    /// Keep only books with at least `min` qualifying reviews. Acts after
    /// grouping: the filter targets the already-aggregated count column.
    /// Reuses an existing (possibly windowed) count; applies an unbounded
    /// count when none was requested yet.
    pub fn min_reviews(mut self, min: i64) -> Self {
        if self.count_window.is_none() {
            self.count_window = Some(DateWindow::unbounded());
        }
        self.min_reviews = Some(min);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// The exact SQL this plan executes.
    pub fn sql(&self) -> String {
        self.render().0
    }

    /// Bind values in placeholder order.
    pub fn binds(&self) -> Vec<Bind> {
        self.render().1
    }

    fn render(&self) -> (String, Vec<Bind>) {
        let mut binds = Vec::new();

        let mut sql = String::from("SELECT b.id, b.title, b.author, b.created_at, b.updated_at");
        if self.count_window.is_some() {
            sql.push_str(", COALESCE(rc.reviews_count, 0) AS reviews_count");
        } else {
            sql.push_str(", 0::bigint AS reviews_count");
        }
        if self.avg_window.is_some() {
            sql.push_str(", ra.reviews_avg_rating AS reviews_avg_rating");
        } else {
            sql.push_str(", NULL::float8 AS reviews_avg_rating");
        }
        sql.push_str(" FROM books b");

        if let Some(window) = self.count_window {
            let filter = window
                .predicate(&mut binds)
                .map(|p| format!(" WHERE {}", p))
                .unwrap_or_default();
            sql.push_str(&format!(
                " LEFT JOIN (SELECT book_id, COUNT(*) AS reviews_count FROM reviews{} \
                 GROUP BY book_id) rc ON rc.book_id = b.id",
                filter
            ));
        }
        if let Some(window) = self.avg_window {
            let filter = window
                .predicate(&mut binds)
                .map(|p| format!(" WHERE {}", p))
                .unwrap_or_default();
            sql.push_str(&format!(
                " LEFT JOIN (SELECT book_id, AVG(rating)::float8 AS reviews_avg_rating \
                 FROM reviews{} GROUP BY book_id) ra ON ra.book_id = b.id",
                filter
            ));
        }

        let mut filters = Vec::new();
        if let Some(pattern) = &self.title_filter {
            let n = push_bind(&mut binds, Bind::Text(pattern.clone()));
            filters.push(format!("b.title ILIKE ${}", n));
        }
        if let Some(min) = self.min_reviews {
            // Post-aggregation threshold: rc is already grouped, so this
            // outer filter is the HAVING-equivalent over the derived count.
            let n = push_bind(&mut binds, Bind::Int(min));
            filters.push(format!("COALESCE(rc.reviews_count, 0) >= ${}", n));
        }
        if !filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&filters.join(" AND "));
        }

        match self.order {
            Some(OrderKey::ReviewsCount) => {
                sql.push_str(" ORDER BY reviews_count DESC, b.id ASC");
            }
            Some(OrderKey::ReviewsAvgRating) => {
                sql.push_str(" ORDER BY reviews_avg_rating DESC NULLS LAST, b.id ASC");
            }
            None => sql.push_str(" ORDER BY b.id ASC"),
        }

        if let Some(limit) = self.limit {
            let n = push_bind(&mut binds, Bind::Int(limit));
            sql.push_str(&format!(" LIMIT ${}", n));
        }
        if let Some(offset) = self.offset {
            let n = push_bind(&mut binds, Bind::Int(offset));
            sql.push_str(&format!(" OFFSET ${}", n));
        }

        (sql, binds)
    }

    /// Execute the plan.
    pub async fn fetch_all(&self, pool: &PgPool) -> Result<Vec<RankedBook>> {
        let (sql, binds) = self.render();
        debug!("executing ranking query: {}", sql);

        let mut query = sqlx::query_as::<_, RankedBook>(&sql);
        for bind in binds {
            query = match bind {
                Bind::Timestamp(ts) => query.bind(ts),
                Bind::Int(i) => query.bind(i),
                Bind::Text(s) => query.bind(s),
            };
        }

        let rows = query.fetch_all(pool).await?;
        Ok(rows)
    }
}

/// Escape LIKE metacharacters so user input matches literally. Postgres
/// defaults the escape character to backslash.
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
