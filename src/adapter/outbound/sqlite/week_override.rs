//! SQLite store for tester week pins.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{encode_ts, WeekOverrideRow};
use crate::adapter::outbound::sqlite::database::schema::week_overrides;
use crate::domain::{UserId, WeekSlot};
use crate::error::{Error, Result};
use crate::port::outbound::store::WeekOverrideStore;

/// SQLite-backed week override store.
pub struct SqliteWeekOverrideStore {
    pool: DbPool,
}

impl SqliteWeekOverrideStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl WeekOverrideStore for SqliteWeekOverrideStore {
    async fn pinned_week(&self, user: &UserId) -> Result<Option<WeekSlot>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let row: Option<WeekOverrideRow> = week_overrides::table
            .find(user.as_str())
            .select(WeekOverrideRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(|r| r.slot()).transpose()
    }

    async fn pin_week(&self, user: &UserId, slot: WeekSlot, now: DateTime<Utc>) -> Result<()> {
        let row = WeekOverrideRow {
            user_id: user.to_string(),
            phase: slot.phase().code().to_string(),
            week: i32::from(slot.week()),
            pinned_at: encode_ts(now),
        };
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        diesel::replace_into(week_overrides::table)
            .values(&row)
            .execute(&mut conn)?;
        Ok(())
    }

    async fn unpin_week(&self, user: &UserId) -> Result<bool> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let deleted = diesel::delete(week_overrides::table.find(user.as_str())).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection;
    use crate::domain::Phase;

    fn setup_test_db() -> DbPool {
        connection::open(":memory:").unwrap()
    }

    #[tokio::test]
    async fn pin_replace_and_unpin() {
        let store = SqliteWeekOverrideStore::new(setup_test_db());
        let user = UserId::from("tester");
        assert_eq!(store.pinned_week(&user).await.unwrap(), None);

        let first = WeekSlot::new(Phase::Preseason, 2).unwrap();
        store.pin_week(&user, first, Utc::now()).await.unwrap();
        assert_eq!(store.pinned_week(&user).await.unwrap(), Some(first));

        let second = WeekSlot::new(Phase::Postseason, 4).unwrap();
        store.pin_week(&user, second, Utc::now()).await.unwrap();
        assert_eq!(store.pinned_week(&user).await.unwrap(), Some(second));

        assert!(store.unpin_week(&user).await.unwrap());
        assert!(!store.unpin_week(&user).await.unwrap());
        assert_eq!(store.pinned_week(&user).await.unwrap(), None);
    }

    #[tokio::test]
    async fn pins_are_per_user() {
        let store = SqliteWeekOverrideStore::new(setup_test_db());
        let slot = WeekSlot::new(Phase::Regular, 9).unwrap();
        store
            .pin_week(&UserId::from("a"), slot, Utc::now())
            .await
            .unwrap();
        assert_eq!(
            store.pinned_week(&UserId::from("b")).await.unwrap(),
            None
        );
    }
}
