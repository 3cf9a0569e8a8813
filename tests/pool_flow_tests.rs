//! End-to-end weekly cycle through the pool operator.
//!
//! Each test runs the real services over an on-disk SQLite database with a
//! scripted feed and a fixed clock.

mod support;

use rust_decimal_macros::dec;

use loserpool::domain::error::DomainError;
use loserpool::domain::{
    Matchup, MatchupStatus, Phase, PickStatus, ScheduledGame, UserId, WeekSlot,
};
use loserpool::error::{AllocationError, Error};
use loserpool::port::inbound::pool::{AllocationRequest, PoolOperator};
use loserpool::testkit::fixtures::{final_game, game};

use support::{at, reg2, reg2_kickoff, TempDb, TestPool};

fn week_two_games() -> Vec<ScheduledGame> {
    vec![
        // Bills favored by 3.
        game("Jets", "Bills", reg2_kickoff(), Some(dec!(3))),
        // Chiefs favored by 10.5.
        game("Chiefs", "Raiders", reg2_kickoff(), Some(dec!(-10.5))),
    ]
}

fn request(user: &UserId, matchup: &Matchup, team: &str, picks: &[&str]) -> AllocationRequest {
    AllocationRequest {
        user_id: user.clone(),
        matchup_id: matchup.id.clone(),
        team: team.to_string(),
        pick_names: picks.iter().map(|p| (*p).to_string()).collect(),
    }
}

#[tokio::test]
async fn full_week_allocate_default_and_eliminate() {
    let db = TempDb::create();
    let pool = TestPool::new(&db, at(9, 4, 12));
    let op = pool.operator.as_ref();
    let user = UserId::from("alice");

    pool.source.set_week(reg2(), week_two_games());
    let report = op.sync_week(None).await.unwrap();
    assert_eq!(report.slot, reg2());
    assert_eq!(report.created, 2);

    let ctx = op.week_context(Some(&user)).await.unwrap();
    assert_eq!(ctx.season.slot, reg2());
    assert_eq!(ctx.deadline, Some(reg2_kickoff()));

    let granted = op.grant_picks(&user, 2, "purchase-1").await.unwrap();
    let names: Vec<_> = granted.iter().map(|p| p.display_name.as_str()).collect();
    assert_eq!(names, ["Pick 1", "Pick 2"]);

    let matchups = op.matchups(None).await.unwrap();
    let jets_bills = matchups.iter().find(|m| m.home_team == "Bills").unwrap();
    let chiefs_raiders = matchups.iter().find(|m| m.home_team == "Raiders").unwrap();

    let outcome = op
        .allocate(request(&user, jets_bills, "Bills", &["Pick 1"]))
        .await
        .unwrap();
    assert_eq!(outcome.updated_picks.len(), 1);
    assert_eq!(outcome.updated_picks[0].status, PickStatus::Active);

    // Before the deadline nothing is defaulted.
    let early = op.assign_defaults(None).await.unwrap();
    assert_eq!(early.picks_assigned, 0);
    assert!(early.skipped.is_some());

    pool.clock.set(reg2_kickoff() + chrono::Duration::hours(1));
    let defaults = op.assign_defaults(None).await.unwrap();
    assert_eq!(defaults.picks_assigned, 1);
    let target = defaults.target.unwrap();
    assert_eq!(target.matchup_id, chiefs_raiders.id);
    assert_eq!(target.team, "Chiefs");

    // Running again is a no-op.
    assert_eq!(op.assign_defaults(None).await.unwrap().picks_assigned, 0);

    pool.clock.set(at(9, 8, 9));
    pool.source.set_week(
        reg2(),
        vec![
            final_game(game("Jets", "Bills", reg2_kickoff(), Some(dec!(3))), 17, 20),
            final_game(game("Chiefs", "Raiders", reg2_kickoff(), Some(dec!(-10.5))), 24, 27),
        ],
    );
    let resync = op.sync_week(None).await.unwrap();
    assert_eq!(resync.created, 0);
    assert_eq!(resync.updated, 2);

    let reports = op.evaluate_results().await.unwrap();
    assert_eq!(reports.len(), 2);
    let eliminated: Vec<_> = reports.iter().flat_map(|r| r.picks_eliminated.clone()).collect();
    assert_eq!(eliminated, ["alice / Pick 1"]);

    let picks = op.picks(&user).await.unwrap();
    let pick1 = picks.iter().find(|p| p.display_name == "Pick 1").unwrap();
    let pick2 = picks.iter().find(|p| p.display_name == "Pick 2").unwrap();
    assert_eq!(pick1.status, PickStatus::Eliminated);
    assert_eq!(pick2.status, PickStatus::Active);
    assert!(pick2.allocation(reg2()).unwrap().is_default);

    assert!(op.evaluate_results().await.unwrap().is_empty());

    let status = op.status(None, None).await.unwrap();
    assert_eq!(status.summary.eliminated, 1);
    assert_eq!(status.summary.active, 1);
    assert_eq!(status.summary.allocated, 2);
    assert_eq!(status.summary.defaulted, 1);
}

#[tokio::test]
async fn surviving_pick_is_defaulted_the_following_week() {
    let db = TempDb::create();
    let pool = TestPool::new(&db, at(9, 4, 12));
    let op = pool.operator.as_ref();
    let user = UserId::from("carol");
    let reg3 = WeekSlot::new(Phase::Regular, 3).unwrap();
    let reg3_kickoff = at(9, 13, 17);

    pool.source.set_week(reg2(), week_two_games());
    op.sync_week(None).await.unwrap();
    op.grant_picks(&user, 1, "purchase-2").await.unwrap();
    let matchups = op.matchups(None).await.unwrap();
    let jets_bills = matchups.iter().find(|m| m.home_team == "Bills").unwrap();
    op.allocate(request(&user, jets_bills, "Jets", &["Pick 1"]))
        .await
        .unwrap();

    // Jets lose, so the pick rides on.
    pool.clock.set(at(9, 8, 9));
    pool.source.set_week(
        reg2(),
        vec![
            final_game(game("Jets", "Bills", reg2_kickoff(), Some(dec!(3))), 17, 20),
            final_game(game("Chiefs", "Raiders", reg2_kickoff(), Some(dec!(-10.5))), 24, 27),
        ],
    );
    op.sync_week(None).await.unwrap();
    let reports = op.evaluate_results().await.unwrap();
    assert!(reports.iter().all(|r| r.picks_eliminated.is_empty()));
    assert_eq!(op.picks(&user).await.unwrap()[0].status, PickStatus::Active);

    // Week 3 opens with no allocation from carol.
    pool.clock.set(at(9, 10, 12));
    pool.source.set_week(
        reg3,
        vec![
            game("Dolphins", "Patriots", reg3_kickoff, Some(dec!(2.5))),
            game("Packers", "Bears", reg3_kickoff, Some(dec!(-7))),
        ],
    );
    let report = op.sync_week(None).await.unwrap();
    assert_eq!(report.slot, reg3);
    assert_eq!(report.created, 2);

    pool.clock.set(reg3_kickoff + chrono::Duration::minutes(5));
    let defaults = op.assign_defaults(None).await.unwrap();
    assert_eq!(defaults.slot, reg3);
    assert_eq!(defaults.picks_assigned, 1);
    assert_eq!(defaults.target.unwrap().team, "Packers");

    let pick = op.picks(&user).await.unwrap().remove(0);
    assert_eq!(pick.status, PickStatus::Active);
    let week2 = pick.allocation(reg2()).unwrap();
    assert_eq!(week2.token.team, "Jets");
    assert!(!week2.is_default);
    let week3 = pick.allocation(reg3).unwrap();
    assert_eq!(week3.token.team, "Packers");
    assert!(week3.is_default);
}

#[tokio::test]
async fn kicked_off_matchup_locks_allocation_and_deallocation() {
    let db = TempDb::create();
    let pool = TestPool::new(&db, at(9, 4, 12));
    let op = pool.operator.as_ref();
    let user = UserId::from("bob");

    pool.source.set_week(reg2(), week_two_games());
    op.sync_week(None).await.unwrap();
    op.grant_picks(&user, 2, "promo").await.unwrap();
    let matchups = op.matchups(None).await.unwrap();
    let jets_bills = matchups.iter().find(|m| m.home_team == "Bills").unwrap();

    op.allocate(request(&user, jets_bills, "Jets", &["Pick 1"]))
        .await
        .unwrap();

    pool.clock.set(reg2_kickoff());
    let err = op
        .allocate(request(&user, jets_bills, "Bills", &["Pick 2"]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Allocation(AllocationError::Locked { .. })));

    let err = op.deallocate(&user, "Pick 1").await.unwrap_err();
    assert!(matches!(err, Error::Allocation(AllocationError::Locked { .. })));

    let picks = op.picks(&user).await.unwrap();
    let pick1 = picks.iter().find(|p| p.display_name == "Pick 1").unwrap();
    assert_eq!(pick1.token(reg2()).unwrap().team, "Jets");
}

#[tokio::test]
async fn deallocation_reverts_to_pending_before_kickoff() {
    let db = TempDb::create();
    let pool = TestPool::new(&db, at(9, 4, 12));
    let op = pool.operator.as_ref();
    let user = UserId::from("carol");

    pool.source.set_week(reg2(), week_two_games());
    op.sync_week(None).await.unwrap();
    op.grant_picks(&user, 1, "promo").await.unwrap();
    let matchups = op.matchups(None).await.unwrap();

    op.allocate(request(&user, &matchups[0], &matchups[0].home_team, &["Pick 1"]))
        .await
        .unwrap();
    let pick = op.deallocate(&user, "Pick 1").await.unwrap();
    assert_eq!(pick.status, PickStatus::Pending);
    assert!(pick.allocations.is_empty());
}

#[tokio::test]
async fn batch_with_one_bad_pick_changes_nothing() {
    let db = TempDb::create();
    let pool = TestPool::new(&db, at(9, 4, 12));
    let op = pool.operator.as_ref();
    let user = UserId::from("dave");

    pool.source.set_week(reg2(), week_two_games());
    op.sync_week(None).await.unwrap();
    op.grant_picks(&user, 2, "promo").await.unwrap();
    let matchups = op.matchups(None).await.unwrap();

    let err = op
        .allocate(request(
            &user,
            &matchups[0],
            &matchups[0].away_team,
            &["Pick 1", "Pick 2", "Pick 9"],
        ))
        .await
        .unwrap_err();
    let Error::Allocation(AllocationError::PartialBatchFailure { requested, failed }) = err else {
        panic!("expected partial batch failure, got {err:?}");
    };
    assert_eq!(requested, 3);
    assert_eq!(failed.len(), 1);
    assert!(failed[0].starts_with("Pick 9"));

    let picks = op.picks(&user).await.unwrap();
    assert!(picks.iter().all(|p| p.allocations.is_empty()));
    assert!(picks.iter().all(|p| p.status == PickStatus::Pending));
}

#[tokio::test]
async fn matchup_from_another_week_is_rejected() {
    let db = TempDb::create();
    let pool = TestPool::new(&db, at(9, 4, 12));
    let op = pool.operator.as_ref();
    let user = UserId::from("erin");
    let reg3 = WeekSlot::new(Phase::Regular, 3).unwrap();

    pool.source.set_week(
        reg3,
        vec![game("Jets", "Bills", at(9, 13, 17), Some(dec!(3)))],
    );
    op.sync_week(Some(reg3)).await.unwrap();
    op.grant_picks(&user, 1, "promo").await.unwrap();
    let next_week = op.matchups(Some(reg3)).await.unwrap();

    let err = op
        .allocate(request(&user, &next_week[0], "Jets", &["Pick 1"]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Domain(DomainError::MatchupOutsideWeek { .. })
    ));

    // A tester pinned to week 3 can use it.
    op.pin_week(&user, reg3).await.unwrap();
    op.allocate(request(&user, &next_week[0], "Jets", &["Pick 1"]))
        .await
        .unwrap();

    let pinned = op.status(Some(&user), Some(reg3)).await.unwrap();
    assert!(pinned.week.pinned);
    assert_eq!(pinned.week.deadline, Some(at(9, 13, 17)));
    assert!(!pinned.week.locked);
    assert_eq!(pinned.summary.allocated, 1);
    assert!(op.status(Some(&user), None).await.unwrap().week.pinned);
    assert!(!op.status(Some(&user), Some(reg2())).await.unwrap().week.pinned);
    assert!(!op.status(None, Some(reg3)).await.unwrap().week.pinned);

    assert!(op.unpin_week(&user).await.unwrap());
    assert!(!op.unpin_week(&user).await.unwrap());
}

#[tokio::test]
async fn resync_preserves_ids_and_live_allocations() {
    let db = TempDb::create();
    let pool = TestPool::new(&db, at(9, 4, 12));
    let op = pool.operator.as_ref();
    let user = UserId::from("frank");

    pool.source.set_week(reg2(), week_two_games());
    op.sync_week(None).await.unwrap();
    let before = op.matchups(None).await.unwrap();
    op.grant_picks(&user, 1, "promo").await.unwrap();
    op.allocate(request(&user, &before[0], &before[0].home_team, &["Pick 1"]))
        .await
        .unwrap();

    let noop = op.sync_week(None).await.unwrap();
    assert!(noop.is_noop());
    assert_eq!(noop.unchanged, 2);

    // The line moves and the game goes live.
    let mut moved = week_two_games();
    moved[0].away_spread = Some(dec!(6.5));
    moved[0].home_spread = Some(dec!(-6.5));
    moved[0].status = MatchupStatus::InProgress;
    pool.source.set_week(reg2(), moved);
    let report = op.sync_week(None).await.unwrap();
    assert_eq!(report.updated, 1);

    let after = op.matchups(None).await.unwrap();
    let ids = |ms: &[Matchup]| {
        let mut ids: Vec<_> = ms.iter().map(|m| m.id.clone()).collect();
        ids.sort();
        ids
    };
    assert_eq!(ids(&before), ids(&after));

    let picks = op.picks(&user).await.unwrap();
    let token = picks[0].token(reg2()).unwrap();
    assert!(after.iter().any(|m| m.id == token.matchup_id));
}

#[tokio::test]
async fn transient_feed_failure_leaves_store_untouched() {
    let db = TempDb::create();
    let pool = TestPool::new(&db, at(9, 4, 12));
    let op = pool.operator.as_ref();

    pool.source.set_week(reg2(), week_two_games());
    pool.source.fail_next_transient();
    let err = op.sync_week(None).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(op.matchups(None).await.unwrap().is_empty());

    assert_eq!(op.sync_week(None).await.unwrap().created, 2);
    assert_eq!(pool.source.fetch_count(), 2);
}
