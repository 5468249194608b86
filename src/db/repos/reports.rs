use rusqlite::params;
use serde::Deserialize;

use crate::db::models::SalesBucket;
use crate::db::DbPool;
use crate::error::AppError;

/// Aggregation window for the sales summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    /// SQLite strftime pattern that names the bucket.
    fn format(self) -> &'static str {
        match self {
            Period::Daily => "%Y-%m-%d",
            Period::Weekly => "%Y-%W",
            Period::Monthly => "%Y-%m",
        }
    }
}

/// Orders and revenue per bucket over completed transactions, oldest first.
pub fn sales_summary(pool: &DbPool, period: Period) -> Result<Vec<SalesBucket>, AppError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT strftime(?1, completed_at) AS bucket,
                COUNT(*) AS orders,
                COALESCE(SUM(total), 0) AS revenue
         FROM transactions
         WHERE status = 'completed' AND completed_at IS NOT NULL
         GROUP BY bucket
         ORDER BY bucket",
    )?;
    let rows = stmt.query_map(params![period.format()], |row| {
        Ok(SalesBucket {
            bucket: row.get(0)?,
            orders: row.get(1)?,
            revenue: row.get(2)?,
        })
    })?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;

    fn seed_completed(pool: &DbPool, id: &str, completed_at: &str, total: f64) {
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO transactions (id, user_id, status, total, created_at, completed_at)
             VALUES (?1, 'u1', 'completed', ?2, ?3, ?3)",
            params![id, total, completed_at],
        )
        .unwrap();
    }

    #[test]
    fn test_daily_summary() {
        let pool = init_test_db().unwrap();
        seed_completed(&pool, "t1", "2026-08-01T09:00:00Z", 10.0);
        seed_completed(&pool, "t2", "2026-08-01T15:30:00Z", 5.5);
        seed_completed(&pool, "t3", "2026-08-02T11:00:00Z", 7.0);

        // A pending order never counts
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO transactions (id, user_id, status, total, created_at)
             VALUES ('t4', 'u1', 'pending', 99.0, '2026-08-02T12:00:00Z')",
            [],
        )
        .unwrap();
        drop(conn);

        let summary = sales_summary(&pool, Period::Daily).unwrap();
        assert_eq!(
            summary,
            vec![
                SalesBucket { bucket: "2026-08-01".into(), orders: 2, revenue: 15.5 },
                SalesBucket { bucket: "2026-08-02".into(), orders: 1, revenue: 7.0 },
            ]
        );
    }

    #[test]
    fn test_monthly_summary() {
        let pool = init_test_db().unwrap();
        seed_completed(&pool, "t1", "2026-07-28T09:00:00Z", 10.0);
        seed_completed(&pool, "t2", "2026-08-03T15:30:00Z", 5.0);
        seed_completed(&pool, "t3", "2026-08-20T11:00:00Z", 5.0);

        let summary = sales_summary(&pool, Period::Monthly).unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].bucket, "2026-07");
        assert_eq!(summary[1].bucket, "2026-08");
        assert_eq!(summary[1].orders, 2);
        assert_eq!(summary[1].revenue, 10.0);
    }

    #[test]
    fn test_empty_summary() {
        let pool = init_test_db().unwrap();
        assert!(sales_summary(&pool, Period::Weekly).unwrap().is_empty());
    }
}
