use crate::types::{StatusFilter, Task, TaskId};

/// Records to display for `filter` and `term`, in store order.
///
/// The search term is matched as a case-insensitive substring of the title
/// and is ignored when empty. Whitespace is significant.
pub fn project<'a>(tasks: &'a [Task], filter: StatusFilter, term: &str) -> Vec<&'a Task> {
    let needle = (!term.is_empty()).then(|| term.to_lowercase());

    tasks
        .iter()
        .filter(|task| filter.matches(task))
        .filter(|task| match needle.as_deref() {
            Some(needle) => task.title.to_lowercase().contains(needle),
            None => true,
        })
        .collect()
}

pub fn visible_ids(tasks: &[Task], filter: StatusFilter, term: &str) -> Vec<TaskId> {
    project(tasks, filter, term)
        .into_iter()
        .map(|task| task.id)
        .collect()
}
