use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use finmate_domain::{
    Category, CategoryDraft, CategoryPatch, CategoryQuery, Ledger, LedgerEntry,
};

use crate::{CoreError, CoreResult};

/// Counts reported after folding one category into another.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergeOutcome {
    pub source: Uuid,
    pub target: Uuid,
    pub expenses_moved: usize,
    pub income_moved: usize,
    pub budgets_moved: usize,
}

pub struct CategoryService;

impl CategoryService {
    pub fn create(ledger: &mut Ledger, draft: CategoryDraft) -> CoreResult<Category> {
        let name = Self::clean_name(&draft.name)?;
        Self::validate_name(ledger, None, &name)?;
        let category = Category::new(name, draft.kind);
        ledger.add_category(category.clone());
        info!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    pub fn get(ledger: &Ledger, id: Uuid) -> CoreResult<&Category> {
        ledger
            .category(id)
            .ok_or_else(|| CoreError::not_found("category", id))
    }

    pub fn list<'a>(ledger: &'a Ledger, query: &CategoryQuery) -> Vec<&'a Category> {
        ledger
            .categories
            .iter()
            .filter(|category| query.kind.map_or(true, |kind| category.kind == kind))
            .skip(query.skip.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// Renames and/or retypes a category.
    ///
    /// Retyping is refused while entries or budgets of the previous kind still point at it.
    pub fn update(ledger: &mut Ledger, id: Uuid, patch: CategoryPatch) -> CoreResult<Category> {
        let current = Self::get(ledger, id)?.clone();
        let name = match patch.name.as_deref() {
            Some(name) => {
                let name = Self::clean_name(name)?;
                Self::validate_name(ledger, Some(id), &name)?;
                name
            }
            None => current.name.clone(),
        };
        let kind = patch.kind.unwrap_or(current.kind);
        if kind != current.kind && Self::is_referenced(ledger, id) {
            return Err(CoreError::InvalidArgument(format!(
                "category `{}` is still referenced as {}",
                current.name, current.kind
            )));
        }

        if name != current.name {
            Self::rename_feedback(ledger, &current.name, &name);
        }
        let category = ledger
            .category_mut(id)
            .ok_or_else(|| CoreError::not_found("category", id))?;
        category.name = name;
        category.kind = kind;
        let updated = category.clone();
        ledger.touch();
        Ok(updated)
    }

    /// Deletes a category, detaching its entries and dropping budgets scoped to it.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> CoreResult<Category> {
        let index = ledger
            .categories
            .iter()
            .position(|category| category.id == id)
            .ok_or_else(|| CoreError::not_found("category", id))?;
        let removed = ledger.categories.remove(index);

        let mut detached = 0;
        for entry in ledger
            .expenses
            .iter_mut()
            .chain(ledger.income.iter_mut())
            .filter(|entry| entry.category_id == Some(id))
        {
            entry.category_id = None;
            detached += 1;
        }
        let budgets_before = ledger.budgets.len();
        ledger.budgets.retain(|budget| budget.category_id != Some(id));
        let budgets_dropped = budgets_before - ledger.budgets.len();

        ledger.touch();
        info!(
            category_id = %id,
            detached,
            budgets_dropped,
            "category removed"
        );
        Ok(removed)
    }

    /// Re-points every reference from `source_id` to `target_id` and deletes the source.
    ///
    /// All validation happens before the ledger is touched. A source budget whose
    /// cadence the target already budgets would leave two budgets on one scope,
    /// so the merge is refused instead.
    pub fn merge(ledger: &mut Ledger, source_id: Uuid, target_id: Uuid) -> CoreResult<MergeOutcome> {
        if source_id == target_id {
            return Err(CoreError::InvalidArgument(
                "cannot merge a category into itself".into(),
            ));
        }
        let source = Self::get(ledger, source_id)?.clone();
        let target = Self::get(ledger, target_id)?.clone();
        if source.kind != target.kind {
            return Err(CoreError::InvalidArgument(format!(
                "cannot merge {} category `{}` into {} category `{}`",
                source.kind, source.name, target.kind, target.name
            )));
        }

        if let Some(collision) = ledger.budgets.iter().find(|budget| {
            budget.category_id == Some(source_id)
                && ledger
                    .budgets
                    .iter()
                    .any(|other| other.same_scope(Some(target_id), budget.period_type))
        }) {
            return Err(CoreError::InvalidArgument(format!(
                "both `{}` and `{}` have a {} budget; remove one before merging",
                source.name, target.name, collision.period_type
            )));
        }

        let expenses_moved = Self::repoint(&mut ledger.expenses, source_id, target_id);
        let income_moved = Self::repoint(&mut ledger.income, source_id, target_id);

        let mut budgets_moved = 0;
        for budget in ledger
            .budgets
            .iter_mut()
            .filter(|budget| budget.category_id == Some(source_id))
        {
            budget.category_id = Some(target_id);
            budgets_moved += 1;
        }

        Self::rename_feedback(ledger, &source.name, &target.name);
        ledger.categories.retain(|category| category.id != source_id);
        ledger.touch();

        info!(
            source = %source.name,
            target = %target.name,
            expenses_moved,
            income_moved,
            budgets_moved,
            "categories merged"
        );
        Ok(MergeOutcome {
            source: source_id,
            target: target_id,
            expenses_moved,
            income_moved,
            budgets_moved,
        })
    }

    /// Looks a category up by name, case-insensitively.
    pub fn find_by_name<'a>(ledger: &'a Ledger, name: &str) -> Option<&'a Category> {
        let normalized = name.trim().to_lowercase();
        ledger
            .categories
            .iter()
            .find(|category| category.name.trim().to_lowercase() == normalized)
    }

    fn repoint(entries: &mut [LedgerEntry], from: Uuid, to: Uuid) -> usize {
        let mut moved = 0;
        for entry in entries.iter_mut().filter(|entry| entry.category_id == Some(from)) {
            entry.category_id = Some(to);
            moved += 1;
        }
        moved
    }

    fn is_referenced(ledger: &Ledger, id: Uuid) -> bool {
        ledger.all_entries().any(|entry| entry.category_id == Some(id))
            || ledger.budgets.iter().any(|budget| budget.category_id == Some(id))
    }

    fn rename_feedback(ledger: &mut Ledger, from: &str, to: &str) {
        let from = from.to_lowercase();
        for feedback in ledger
            .merchant_feedback
            .iter_mut()
            .filter(|feedback| feedback.category.to_lowercase() == from)
        {
            feedback.category = to.to_string();
        }
    }

    fn clean_name(candidate: &str) -> CoreResult<String> {
        let name = candidate.trim();
        if name.is_empty() {
            Err(CoreError::InvalidArgument("category name cannot be empty".into()))
        } else {
            Ok(name.to_string())
        }
    }

    fn validate_name(ledger: &Ledger, exclude: Option<Uuid>, candidate: &str) -> CoreResult<()> {
        let duplicate = Self::find_by_name(ledger, candidate)
            .map_or(false, |existing| exclude.map_or(true, |id| existing.id != id));
        if duplicate {
            Err(CoreError::InvalidArgument(format!(
                "category `{candidate}` already exists"
            )))
        } else {
            Ok(())
        }
    }
}
