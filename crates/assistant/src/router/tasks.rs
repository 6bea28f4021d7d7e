use shared::tasks::{TaskListing, TaskStore};
use tracing::{info, warn};

pub(super) fn add(store: &TaskStore, task: &str) -> String {
    if task.is_empty() {
        return "Please tell me the task to add.".to_string();
    }

    match store.add(task) {
        Ok(()) => {
            info!(path = %store.path().display(), "task added");
            format!("Added task: {task}")
        }
        Err(err) => {
            warn!(error = %err, "failed to append task");
            format!("Error adding task: {err}")
        }
    }
}

pub(super) fn show(store: &TaskStore) -> String {
    match store.list() {
        Ok(TaskListing::Tasks(tasks)) => tasks,
        Ok(TaskListing::Empty) => "No tasks found.".to_string(),
        Ok(TaskListing::Missing) => "No tasks file found.".to_string(),
        Err(err) => {
            warn!(error = %err, "failed to read tasks");
            format!("Error reading tasks: {err}")
        }
    }
}

pub(super) fn delete(store: &TaskStore, query: &str) -> String {
    if query.is_empty() {
        return "Please tell me which task to delete.".to_string();
    }

    match store.delete_matching(query) {
        Ok(removed) => {
            info!(removed, "tasks deleted");
            format!("Deleted task: {query}")
        }
        Err(err) => {
            warn!(error = %err, "failed to delete task");
            format!("Error deleting task: {err}")
        }
    }
}

#[cfg(test)]
mod tests {
    use shared::tasks::TaskStore;

    use super::{add, delete, show};

    #[test]
    fn empty_arguments_ask_for_clarification() {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        let store = TaskStore::new(dir.path().join("todo.txt"));

        assert_eq!(add(&store, ""), "Please tell me the task to add.");
        assert_eq!(delete(&store, ""), "Please tell me which task to delete.");
        assert!(!store.path().exists());
    }

    #[test]
    fn show_distinguishes_missing_and_empty_files() {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        let store = TaskStore::new(dir.path().join("todo.txt"));
        assert_eq!(show(&store), "No tasks file found.");

        std::fs::write(store.path(), "\n  \n").expect("file should be written");
        assert_eq!(show(&store), "No tasks found.");
    }

    #[test]
    fn deleting_from_missing_file_reports_error() {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        let store = TaskStore::new(dir.path().join("todo.txt"));

        assert!(delete(&store, "milk").starts_with("Error deleting task: "));
    }
}
