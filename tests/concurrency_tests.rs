//! Concurrent writers against one on-disk database.

mod support;

use std::collections::HashSet;

use rust_decimal_macros::dec;

use loserpool::domain::{PickStatus, UserId};
use loserpool::port::inbound::pool::{AllocationRequest, PoolOperator};
use loserpool::testkit::fixtures::game;

use support::{at, reg2, reg2_kickoff, TempDb, TestPool};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_syncs_create_each_game_once() {
    let db = TempDb::create();
    let pool = TestPool::new(&db, at(9, 4, 12));
    pool.source.set_week(
        reg2(),
        vec![
            game("Jets", "Bills", reg2_kickoff(), Some(dec!(3))),
            game("Chiefs", "Raiders", reg2_kickoff(), Some(dec!(-10.5))),
            game("Eagles", "Giants", reg2_kickoff(), Some(dec!(-6))),
        ],
    );

    let mut tasks = Vec::new();
    for _ in 0..6 {
        let operator = pool.operator.clone();
        tasks.push(tokio::spawn(async move { operator.sync_week(None).await }));
    }

    let mut created = 0;
    for task in tasks {
        let report = task.await.unwrap().unwrap();
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        created += report.created;
    }
    assert_eq!(created, 3);

    let matchups = pool.operator.matchups(None).await.unwrap();
    assert_eq!(matchups.len(), 3);
    let ids: HashSet<_> = matchups.iter().map(|m| m.id.clone()).collect();
    assert_eq!(ids.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_allocations_leave_one_token_per_pick() {
    let db = TempDb::create();
    let pool = TestPool::new(&db, at(9, 4, 12));
    let user = UserId::from("alice");
    pool.source.set_week(
        reg2(),
        vec![
            game("Jets", "Bills", reg2_kickoff(), Some(dec!(3))),
            game("Chiefs", "Raiders", reg2_kickoff(), Some(dec!(-10.5))),
        ],
    );
    pool.operator.sync_week(None).await.unwrap();
    pool.operator.grant_picks(&user, 1, "promo").await.unwrap();
    let matchups = pool.operator.matchups(None).await.unwrap();

    let mut tasks = Vec::new();
    for i in 0..8 {
        let operator = pool.operator.clone();
        let matchup = matchups[i % matchups.len()].clone();
        let team = if i % 2 == 0 {
            matchup.away_team.clone()
        } else {
            matchup.home_team.clone()
        };
        let request = AllocationRequest {
            user_id: user.clone(),
            matchup_id: matchup.id.clone(),
            team,
            pick_names: vec!["Pick 1".to_string()],
        };
        tasks.push(tokio::spawn(async move { operator.allocate(request).await }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let picks = pool.operator.picks(&user).await.unwrap();
    assert_eq!(picks.len(), 1);
    assert_eq!(picks[0].status, PickStatus::Active);
    assert_eq!(picks[0].allocations.len(), 1);
    let token = picks[0].token(reg2()).unwrap();
    assert!(matchups.iter().any(|m| m.id == token.matchup_id && m.has_team(&token.team)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_grants_number_picks_without_gaps() {
    let db = TempDb::create();
    let pool = TestPool::new(&db, at(9, 4, 12));
    let user = UserId::from("bob");

    let mut tasks = Vec::new();
    for i in 0..5 {
        let operator = pool.operator.clone();
        let user = user.clone();
        tasks.push(tokio::spawn(async move {
            operator.grant_picks(&user, 2, &format!("purchase-{i}")).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let picks = pool.operator.picks(&user).await.unwrap();
    let mut numbers: Vec<_> = picks.iter().map(|p| p.number).collect();
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=10).collect::<Vec<_>>());
}
