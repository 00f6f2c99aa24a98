//! Action resolution

use crate::task::Task;
use crate::types::Action;

/// Pick the submission flow for `task`.
///
/// `submit-toplevel` and `schedule` map directly; any other tag, or none at
/// all, means locale submission.
pub fn resolve_action(task: &Task, scope_prefixes: &[String]) -> Action {
    Action::from_tag(task.action_tag(scope_prefixes).as_deref())
}
