//! Handlers for the pool commands.
//!
//! Each handler makes one call on the [`PoolOperator`] and renders the
//! result, either as indented fields and tables or as a single JSON object.

use chrono::{DateTime, Utc};
use serde_json::json;
use tabled::{Table, Tabled};

use super::command::{
    AllocateArgs, DeallocateArgs, GrantArgs, PinArgs, SlotArgs, StatusArgs, UserArgs, WeekArgs,
};
use super::output;
use crate::domain::{Matchup, MatchupId, Pick, UserId, WeekContext, WeekSlot};
use crate::error::Result;
use crate::port::inbound::pool::{AllocationRequest, PoolOperator};

#[derive(Tabled)]
struct MatchupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Game")]
    game: String,
    #[tabled(rename = "Kickoff")]
    kickoff: String,
    #[tabled(rename = "Line")]
    line: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Score")]
    score: String,
}

impl From<&Matchup> for MatchupRow {
    fn from(m: &Matchup) -> Self {
        let line = match (m.favored_team(), m.spread_magnitude()) {
            (_, Some(spread)) if spread.is_zero() => "PK".to_string(),
            (Some(team), Some(spread)) => format!("{team} -{spread}"),
            _ => "-".to_string(),
        };
        let score = match (m.away_score, m.home_score) {
            (Some(away), Some(home)) => format!("{away}-{home}"),
            _ => "-".to_string(),
        };
        Self {
            id: m.id.to_string(),
            game: m.label(),
            kickoff: timestamp(m.kickoff),
            line,
            status: m.status.to_string(),
            score,
        }
    }
}

#[derive(Tabled)]
struct PickRow {
    #[tabled(rename = "Pick")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Allocations")]
    allocations: String,
}

impl From<&Pick> for PickRow {
    fn from(pick: &Pick) -> Self {
        let allocations = if pick.allocations.is_empty() {
            "-".to_string()
        } else {
            pick.allocations
                .iter()
                .map(|a| {
                    let marker = if a.is_default { " (default)" } else { "" };
                    format!("{}: {}{marker}", a.slot, a.token.team)
                })
                .collect::<Vec<_>>()
                .join(", ")
        };
        Self {
            name: pick.display_name.clone(),
            status: pick.status.to_string(),
            allocations,
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn deadline_label(ctx: &WeekContext) -> String {
    match ctx.deadline {
        Some(deadline) if ctx.locked => {
            format!("{} {}", timestamp(deadline), output::negative("(passed)"))
        }
        Some(deadline) => timestamp(deadline),
        None => output::muted("no matchups synced"),
    }
}

fn print_week(ctx: &WeekContext) {
    output::field("Week", output::highlight(ctx.season.label()));
    output::field("Slot", ctx.season.slot);
    output::field("Deadline", deadline_label(ctx));
    if ctx.pinned {
        output::field("Pinned", "yes");
    }
}

fn print_picks(picks: &[Pick]) {
    if picks.is_empty() {
        output::note("(no picks)");
        return;
    }
    let rows: Vec<PickRow> = picks.iter().map(PickRow::from).collect();
    output::lines(&Table::new(rows).to_string());
}

/// Execute `week`.
pub async fn week(operator: &dyn PoolOperator, args: &WeekArgs) -> Result<()> {
    let user = args.user.as_deref().map(UserId::from);
    let ctx = operator.week_context(user.as_ref()).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "week", "week": ctx }));
        return Ok(());
    }
    output::section("Current Week");
    print_week(&ctx);
    Ok(())
}

/// Execute `sync`.
pub async fn sync(operator: &dyn PoolOperator, args: &SlotArgs) -> Result<()> {
    let report = operator.sync_week(args.slot()?).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "sync", "report": report }));
        return Ok(());
    }
    output::section(&format!("Synced {}", report.slot));
    output::field("Created", report.created);
    output::field("Updated", report.updated);
    output::field("Unchanged", report.unchanged);
    if report.not_processed > 0 {
        output::warning(&format!(
            "{} games not processed (sync budget exceeded)",
            report.not_processed
        ));
    }
    for failure in &report.errors {
        output::warning(&format!("{}: {}", failure.game, failure.error));
    }
    if report.errors.is_empty() && report.not_processed == 0 {
        output::success("Sync complete");
    }
    Ok(())
}

/// Execute `matchups`.
pub async fn matchups(operator: &dyn PoolOperator, args: &SlotArgs) -> Result<()> {
    let matchups = operator.matchups(args.slot()?).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "matchups", "matchups": matchups }));
        return Ok(());
    }
    output::section("Matchups");
    if matchups.is_empty() {
        output::note("(none, run `loserpool sync` first)");
        return Ok(());
    }
    let rows: Vec<MatchupRow> = matchups.iter().map(MatchupRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}

/// Execute `grant`.
pub async fn grant(operator: &dyn PoolOperator, args: &GrantArgs) -> Result<()> {
    let user = UserId::from(args.user.as_str());
    let picks = operator.grant_picks(&user, args.count, &args.source).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "grant", "user": user, "picks": picks }));
        return Ok(());
    }
    output::success(&format!("Granted {} picks to {user}", picks.len()));
    print_picks(&picks);
    Ok(())
}

/// Execute `picks`.
pub async fn picks(operator: &dyn PoolOperator, args: &UserArgs) -> Result<()> {
    let user = UserId::from(args.user.as_str());
    let picks = operator.picks(&user).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "picks", "user": user, "picks": picks }));
        return Ok(());
    }
    output::section(&format!("Picks for {user}"));
    print_picks(&picks);
    Ok(())
}

/// Execute `allocate`.
pub async fn allocate(operator: &dyn PoolOperator, args: &AllocateArgs) -> Result<()> {
    let request = AllocationRequest {
        user_id: UserId::from(args.user.as_str()),
        matchup_id: MatchupId::from(args.matchup.as_str()),
        team: args.team.clone(),
        pick_names: args.picks.clone(),
    };
    let outcome = operator.allocate(request).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "allocate", "outcome": outcome }));
        return Ok(());
    }
    output::success(&outcome.message);
    print_picks(&outcome.updated_picks);
    Ok(())
}

/// Execute `deallocate`.
pub async fn deallocate(operator: &dyn PoolOperator, args: &DeallocateArgs) -> Result<()> {
    let user = UserId::from(args.user.as_str());
    let pick = operator.deallocate(&user, &args.pick).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "deallocate", "pick": pick }));
        return Ok(());
    }
    output::success(&format!("Cleared {} ({})", pick.display_name, pick.status));
    Ok(())
}

/// Execute `defaults`.
pub async fn defaults(operator: &dyn PoolOperator, args: &SlotArgs) -> Result<()> {
    let report = operator.assign_defaults(args.slot()?).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "defaults", "report": report }));
        return Ok(());
    }
    output::section(&format!("Default picks for {}", report.slot));
    if let Some(reason) = &report.skipped {
        output::note(reason);
        return Ok(());
    }
    if let Some(target) = &report.target {
        output::field("Team", output::highlight(&target.team));
        output::field("Matchup", &target.matchup_id);
    }
    output::success(&format!("Assigned {} picks", report.picks_assigned));
    Ok(())
}

/// Execute `evaluate`.
pub async fn evaluate(operator: &dyn PoolOperator) -> Result<()> {
    let reports = operator.evaluate_results().await?;

    if output::is_json() {
        output::json_output(json!({ "command": "evaluate", "reports": reports }));
        return Ok(());
    }
    output::section("Results");
    if reports.is_empty() {
        output::note("(no final results awaiting evaluation)");
        return Ok(());
    }
    for report in &reports {
        let winner = report.winner.as_deref().unwrap_or("tie");
        output::field(&report.matchup, format!("winner: {winner}"));
        for eliminated in &report.picks_eliminated {
            output::note(&format!("  eliminated {eliminated}"));
        }
    }
    let total: usize = reports.iter().map(|r| r.picks_eliminated.len()).sum();
    output::success(&format!(
        "Evaluated {} matchups, eliminated {total} picks",
        reports.len()
    ));
    Ok(())
}

/// Execute `pin`.
pub async fn pin(operator: &dyn PoolOperator, args: &PinArgs) -> Result<()> {
    let user = UserId::from(args.user.as_str());
    let slot = WeekSlot::new(args.phase, args.week)?;
    operator.pin_week(&user, slot).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "pin", "user": user, "slot": slot }));
        return Ok(());
    }
    output::success(&format!("Pinned {user} to {slot}"));
    Ok(())
}

/// Execute `unpin`.
pub async fn unpin(operator: &dyn PoolOperator, args: &UserArgs) -> Result<()> {
    let user = UserId::from(args.user.as_str());
    let removed = operator.unpin_week(&user).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "unpin", "user": user, "removed": removed }));
        return Ok(());
    }
    if removed {
        output::success(&format!("Removed week pin for {user}"));
    } else {
        output::note(&format!("{user} had no week pin"));
    }
    Ok(())
}

/// Execute `status`.
pub async fn status(operator: &dyn PoolOperator, args: &StatusArgs) -> Result<()> {
    let user = args.user.as_deref().map(UserId::from);
    let report = operator.status(user.as_ref(), args.slot.slot()?).await?;

    if output::is_json() {
        output::json_output(json!({ "command": "status", "status": report }));
        return Ok(());
    }
    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Week");
    print_week(&report.week);

    let summary = &report.summary;
    output::section("Picks");
    output::field("Pending", summary.pending);
    output::field("Active", output::positive(summary.active));
    output::field("Eliminated", output::negative(summary.eliminated));
    output::field("Allocated", summary.allocated);
    output::field("Defaulted", summary.defaulted);
    Ok(())
}
