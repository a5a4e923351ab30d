/// State management module
///
/// Screen-independent controller state:
/// - paginated, searchable, filterable list fetching (list.rs)
/// - create/edit form drafts and archive confirmation (form.rs)
///
/// Both are pure: they decide what should happen and the screens turn those
/// decisions into tasks, which keeps the behavior unit-testable.
pub mod form;
pub mod list;
