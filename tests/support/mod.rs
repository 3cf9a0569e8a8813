//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use diesel::prelude::*;
use tempfile::TempDir;

use loserpool::adapter::outbound::sqlite::database::connection::{self, DbPool};
use loserpool::domain::{DefaultPickPolicy, Phase, SeasonClock, WeekSlot};
use loserpool::infrastructure::operator::{Operator, OperatorSettings};
use loserpool::testkit::clock::FixedClock;
use loserpool::testkit::source::ScriptedScheduleSource;

/// Preseason week 1 of the test season.
pub fn season_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 6).expect("valid date")
}

pub fn at(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, month, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Regular-season week 2: 2026-09-03 through 2026-09-09.
pub fn reg2() -> WeekSlot {
    WeekSlot::new(Phase::Regular, 2).expect("valid slot")
}

/// Sunday kickoff of week 2.
pub fn reg2_kickoff() -> DateTime<Utc> {
    at(9, 6, 17)
}

/// Temporary on-disk SQLite database, removed on drop.
pub struct TempDb {
    dir: TempDir,
    path: PathBuf,
    pool: DbPool,
}

impl TempDb {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("loserpool.db");
        let pool = connection::open(&path.display().to_string()).expect("open sqlite database");

        // WAL mode improves concurrent writer behavior in tests.
        {
            let mut conn = pool.get().expect("get sqlite connection");
            diesel::sql_query("PRAGMA journal_mode=WAL")
                .execute(&mut conn)
                .expect("enable WAL mode");
        }

        Self { dir, path, pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Operator over `db` with a scripted feed and a settable clock.
pub struct TestPool {
    pub operator: Arc<Operator>,
    pub source: Arc<ScriptedScheduleSource>,
    pub clock: Arc<FixedClock>,
}

impl TestPool {
    pub fn new(db: &TempDb, now: DateTime<Utc>) -> Self {
        Self::with_policy(db, now, DefaultPickPolicy::Favorite)
    }

    pub fn with_policy(db: &TempDb, now: DateTime<Utc>, policy: DefaultPickPolicy) -> Self {
        let source = Arc::new(ScriptedScheduleSource::new());
        let clock = Arc::new(FixedClock::new(now));
        let settings = OperatorSettings {
            season_clock: SeasonClock::new(season_start()),
            default_policy: policy,
            sync_budget: Duration::from_secs(30),
        };
        let operator = Operator::new(settings, db.pool().clone(), source.clone(), clock.clone());
        Self {
            operator: Arc::new(operator),
            source,
            clock,
        }
    }
}

/// Write a config file pointing at `database` and return its path.
pub fn write_config(dir: &Path, database: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    let contents = format!(
        concat!(
            "database = \"{}\"\n",
            "\n",
            "[logging]\n",
            "level = \"warn\"\n",
            "\n",
            "[season]\n",
            "start_date = \"2026-08-06\"\n",
        ),
        database.display()
    );
    std::fs::write(&path, contents).expect("write config");
    path
}
