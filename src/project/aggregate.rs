//! Project-wide reconciliation of file plans

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::result::ProjectResult;
use crate::base::{KindBuckets, SymbolKind};
use crate::planner::{FilePlan, PlanError, PlannerConfig};

/// Owner of an accepted identity: file index and decision index
type Owner = (usize, usize);

/// Fold file plans, in the given order, into a project result.
///
/// A decision whose new identity was already taken by an earlier decision of
/// the same kind is evicted and replaced by a conflict error on its file.
pub fn aggregate(source_root: impl Into<String>, config: &PlannerConfig, plans: Vec<FilePlan>) -> ProjectResult {
    let mut taken: KindBuckets<FxHashMap<String, Owner>> = KindBuckets::default();
    let mut accepted: Vec<FilePlan> = Vec::with_capacity(plans.len());

    for mut plan in plans {
        let file_index = accepted.len();
        let decisions = std::mem::take(&mut plan.decisions);
        for decision in decisions {
            let clash = decision.components.iter().find_map(|component| {
                let kind = component.symbol_kind();
                taken[kind]
                    .get(&component.new.lookup_key(kind))
                    .copied()
            });

            match clash {
                Some((owner_file, owner_decision)) => {
                    let (earlier, earlier_path) = if owner_file == file_index {
                        (&plan.decisions[owner_decision], plan.path.as_str())
                    } else {
                        let owner = &accepted[owner_file];
                        (&owner.decisions[owner_decision], owner.path.as_str())
                    };
                    let error = PlanError::conflict(&decision, earlier, earlier_path);
                    warn!(path = %plan.path, "{}", error.message);
                    plan.errors.push(error);
                }
                None => {
                    let decision_index = plan.decisions.len();
                    for component in &decision.components {
                        let kind = component.symbol_kind();
                        taken[kind]
                            .entry(component.new.lookup_key(kind))
                            .or_insert((file_index, decision_index));
                    }
                    plan.decisions.push(decision);
                }
            }
        }
        accepted.push(plan);
    }

    let result = ProjectResult::new(source_root, config, accepted);
    debug!(
        files = result.files.len(),
        types = count(&result, SymbolKind::Type),
        errors = result.error_count(),
        "plans aggregated"
    );
    result
}

fn count(result: &ProjectResult, kind: SymbolKind) -> usize {
    result
        .decisions()
        .flat_map(|(_, decision)| decision.components.iter())
        .filter(|component| component.symbol_kind() == kind)
        .count()
}
