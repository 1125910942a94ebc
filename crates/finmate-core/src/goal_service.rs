//! Savings goals: registry maintenance, deposits, and completion projection.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use tracing::{debug, info};
use uuid::Uuid;

use finmate_domain::{
    month_start, shift_month, Goal, GoalContribution, GoalDraft, GoalPatch, GoalProgress, Ledger,
    MAX_AMOUNT,
};

use crate::{
    money::{non_negative_amount, positive_amount},
    CoreError, CoreResult,
};

/// Goals trailing their schedule by more than this share of the target get nudged.
const BEHIND_NUDGE_THRESHOLD: f64 = 0.20;
const DEADLINE_NUDGE_DAYS: i64 = 7;

pub struct GoalService;

impl GoalService {
    pub fn create(ledger: &mut Ledger, draft: GoalDraft, now: DateTime<Utc>) -> CoreResult<Goal> {
        let name = Self::clean_name(&draft.name)?;
        let target = positive_amount("goal target", draft.target_amount)?;
        let current = non_negative_amount(
            "goal current amount",
            draft.current_amount.unwrap_or(Decimal::ZERO),
        )?;
        let mut goal = Goal::new(name, target, now);
        goal.current_amount = current;
        if let Some(deadline) = draft.deadline {
            goal = goal.with_deadline(deadline);
        }
        ledger.add_goal(goal.clone());
        info!(goal_id = %goal.id, target = %goal.target_amount, "goal created");
        Ok(goal)
    }

    pub fn get(ledger: &Ledger, id: Uuid) -> CoreResult<&Goal> {
        ledger.goal(id).ok_or_else(|| CoreError::not_found("goal", id))
    }

    pub fn list(ledger: &Ledger) -> Vec<&Goal> {
        ledger.goals.iter().collect()
    }

    pub fn update(ledger: &mut Ledger, id: Uuid, patch: GoalPatch) -> CoreResult<Goal> {
        Self::get(ledger, id)?;
        let name = patch.name.as_deref().map(Self::clean_name).transpose()?;
        let target = patch
            .target_amount
            .map(|target| positive_amount("goal target", target))
            .transpose()?;
        let goal = ledger
            .goal_mut(id)
            .ok_or_else(|| CoreError::not_found("goal", id))?;
        if let Some(name) = name {
            goal.name = name;
        }
        if let Some(target) = target {
            goal.target_amount = target;
        }
        if patch.deadline.is_some() {
            goal.deadline = patch.deadline;
        }
        let updated = goal.clone();
        ledger.touch();
        Ok(updated)
    }

    /// Deletes a goal together with its contribution history.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> CoreResult<Goal> {
        let index = ledger
            .goals
            .iter()
            .position(|goal| goal.id == id)
            .ok_or_else(|| CoreError::not_found("goal", id))?;
        let removed = ledger.goals.remove(index);
        ledger.contributions.retain(|contribution| contribution.goal_id != id);
        ledger.touch();
        Ok(removed)
    }

    /// Adds `amount` to the goal and records the contribution.
    pub fn deposit(
        ledger: &mut Ledger,
        id: Uuid,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> CoreResult<Goal> {
        let amount = positive_amount("deposit amount", amount)?;
        let goal = ledger
            .goal_mut(id)
            .ok_or_else(|| CoreError::not_found("goal", id))?;
        let current = goal.current_amount + amount;
        if current > MAX_AMOUNT {
            return Err(CoreError::InvalidArgument(format!(
                "goal balance cannot exceed {MAX_AMOUNT}"
            )));
        }
        goal.current_amount = current;
        let updated = goal.clone();
        ledger.contributions.push(GoalContribution::new(id, amount, now));
        ledger.touch();
        info!(
            goal_id = %id,
            %amount,
            current_amount = %updated.current_amount,
            "goal deposit recorded"
        );
        Ok(updated)
    }

    pub fn contributions(ledger: &Ledger, id: Uuid) -> CoreResult<Vec<&GoalContribution>> {
        Self::get(ledger, id)?;
        Ok(ledger
            .contributions
            .iter()
            .filter(|contribution| contribution.goal_id == id)
            .collect())
    }

    /// Projects completion from the average monthly net savings of the last `months` months.
    pub fn progress(
        ledger: &Ledger,
        id: Uuid,
        now: DateTime<Utc>,
        months: u32,
    ) -> CoreResult<GoalProgress> {
        let goal = Self::get(ledger, id)?;
        let today = now.date_naive();

        let target = goal.target_amount;
        let current = goal.current_amount;
        let remaining_amount = (target - current).max(Decimal::ZERO);
        let progress_pct = goal.progress_pct();
        let is_completed = current >= target;
        let days_left = goal.deadline.map(|deadline| (deadline - today).num_days());

        let monthly_net_savings =
            Self::monthly_net_savings(ledger, goal.created_at.date_naive(), today, months);
        let projected_months_to_complete = if monthly_net_savings > Decimal::ZERO {
            remaining_amount
                .checked_div(monthly_net_savings)
                .map(|months| months.round_dp(2))
        } else {
            None
        };
        // Unrepresentable completion dates are reported as unknown.
        let estimated_completion_date = projected_months_to_complete
            .and_then(|months| months.ceil().to_i32())
            .and_then(|months| shift_month(today, months));

        let behind_pct = goal
            .deadline
            .map(|deadline| Self::behind_share(goal, deadline, today));

        let message = if is_completed {
            "Goal reached. Great job!".to_string()
        } else if let Some(behind) = behind_pct.filter(|behind| *behind > BEHIND_NUDGE_THRESHOLD) {
            format!(
                "You're behind schedule by {:.1}%, consider increasing contributions.",
                behind * 100.0
            )
        } else if days_left.map_or(false, |days| days <= DEADLINE_NUDGE_DAYS) {
            "Deadline is within a week, consider increasing contributions.".to_string()
        } else {
            "Keep going! You're making progress.".to_string()
        };

        debug!(
            goal_id = %goal.id,
            %monthly_net_savings,
            ?projected_months_to_complete,
            ?behind_pct,
            "projected goal progress"
        );

        Ok(GoalProgress {
            id: goal.id,
            name: goal.name.clone(),
            target_amount: target,
            current_amount: current,
            remaining_amount,
            progress_pct,
            days_left,
            is_completed,
            message,
            monthly_net_savings,
            projected_months_to_complete,
            estimated_completion_date,
            behind_pct,
        })
    }

    /// Average of income minus expenses over complete months before `today`'s month.
    ///
    /// Months before `created` are skipped; with no complete month available the
    /// current month to date is used.
    pub fn monthly_net_savings(
        ledger: &Ledger,
        created: NaiveDate,
        today: NaiveDate,
        months: u32,
    ) -> Decimal {
        let current_month = month_start(today);
        let earliest = month_start(created);
        let lookback = i32::try_from(months).unwrap_or(i32::MAX);
        let windows: Vec<(NaiveDate, NaiveDate)> = (1..=lookback)
            .map_while(|back| shift_month(current_month, -back))
            .take_while(|start| *start >= earliest)
            .filter_map(|start| Some((start, shift_month(start, 1)?)))
            .collect();

        if windows.is_empty() {
            let tomorrow = today.succ_opt().unwrap_or(today);
            return Self::net_between(ledger, current_month, tomorrow);
        }
        let total: Decimal = windows
            .iter()
            .map(|(start, end)| Self::net_between(ledger, *start, *end))
            .sum();
        (total / Decimal::from(windows.len())).round_dp(2)
    }

    fn net_between(ledger: &Ledger, start: NaiveDate, end: NaiveDate) -> Decimal {
        let in_range = |date: NaiveDate| date >= start && date < end;
        let income: Decimal = ledger
            .income
            .iter()
            .filter(|entry| in_range(entry.date))
            .map(|entry| entry.amount)
            .sum();
        let expenses: Decimal = ledger
            .expenses
            .iter()
            .filter(|entry| in_range(entry.date))
            .map(|entry| entry.amount)
            .sum();
        income - expenses
    }

    /// Share of the target the goal trails a linear schedule by; negative when ahead.
    fn behind_share(goal: &Goal, deadline: NaiveDate, today: NaiveDate) -> f64 {
        let (Some(target), Some(current)) = (goal.target_amount.to_f64(), goal.current_amount.to_f64())
        else {
            return 0.0;
        };
        if target <= 0.0 {
            return 0.0;
        }
        let created = goal.created_at.date_naive();
        let total_days = (deadline - created).num_days();
        let expected_ratio = if total_days <= 0 {
            1.0
        } else {
            let elapsed = (today - created).num_days() as f64;
            (elapsed / total_days as f64).clamp(0.0, 1.0)
        };
        (target * expected_ratio - current) / target
    }

    fn clean_name(candidate: &str) -> CoreResult<String> {
        let name = candidate.trim();
        if name.is_empty() {
            Err(CoreError::InvalidArgument("goal name cannot be empty".into()))
        } else {
            Ok(name.to_string())
        }
    }
}
