//! Searchable employee list with confirm-then-delete.
//!
//! All network work runs on spawned tasks and reports back as
//! [`ListEvent`]s over a channel; [`EmployeeList::apply`] folds those into
//! the list state. This keeps the owner (a UI loop) free of awaits.

use super::{
    debounce::Debouncer,
    models::{Employee, EmployeeId},
};
use crate::{api::ApiResult, notify::Notification};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;

/// Shown once a confirmed delete succeeds.
pub const DELETE_SUCCESS_MESSAGE: &str = "Employee deleted successfully.";

/// Backend operations the list needs
#[async_trait]
pub trait EmployeeDirectory: Send + Sync + 'static {
    async fn list_employees(&self) -> ApiResult<Vec<Employee>>;

    async fn search_employees(&self, query: &str) -> ApiResult<Vec<Employee>>;

    async fn delete_employee(&self, id: EmployeeId) -> ApiResult<()>;
}

/// Completion of a background list operation
#[derive(Debug)]
pub enum ListEvent {
    /// Fetch number `seq`, for `query`, finished
    Loaded {
        seq: u64,
        query: String,
        result: ApiResult<Vec<Employee>>,
    },
    /// A confirmed delete finished
    Deleted {
        id: EmployeeId,
        result: ApiResult<()>,
    },
}

impl ListEvent {
    /// Whether the operation failed because the session is gone.
    pub fn session_expired(&self) -> bool {
        match self {
            ListEvent::Loaded { result, .. } => {
                result.as_ref().is_err_and(|e| e.is_session_expired())
            }
            ListEvent::Deleted { result, .. } => {
                result.as_ref().is_err_and(|e| e.is_session_expired())
            }
        }
    }
}

/// Employee list state
pub struct EmployeeList<D: EmployeeDirectory> {
    directory: Arc<D>,
    events: mpsc::UnboundedSender<ListEvent>,
    debouncer: Debouncer,
    query: String,
    employees: Vec<Employee>,
    loading: bool,
    pending_delete: Option<EmployeeId>,
    /// Number of the newest fetch started; older results are stale
    latest_fetch: u64,
}

impl<D: EmployeeDirectory> EmployeeList<D> {
    /// Create an empty list. Results are delivered on `events`.
    pub fn new(
        directory: Arc<D>,
        events: mpsc::UnboundedSender<ListEvent>,
        debounce: Duration,
    ) -> Self {
        Self {
            directory,
            events,
            debouncer: Debouncer::new(debounce),
            query: String::new(),
            employees: Vec::new(),
            loading: false,
            pending_delete: None,
            latest_fetch: 0,
        }
    }

    fn next_fetch(&mut self) -> u64 {
        self.latest_fetch += 1;
        self.latest_fetch
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Employee awaiting delete confirmation.
    pub fn pending_delete(&self) -> Option<EmployeeId> {
        self.pending_delete
    }

    /// Update the query; the search runs once typing pauses.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query == self.query {
            return;
        }

        self.query = query;
        self.loading = true;
        let seq = self.next_fetch();
        self.debouncer.schedule(fetch(
            seq,
            self.directory.clone(),
            self.query.clone(),
            self.events.clone(),
        ));
    }

    /// Fetch the current query immediately, dropping any pending search.
    pub fn refresh(&mut self) {
        self.debouncer.cancel();
        self.loading = true;
        let seq = self.next_fetch();
        tokio::spawn(fetch(
            seq,
            self.directory.clone(),
            self.query.clone(),
            self.events.clone(),
        ));
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: EmployeeId) {
        self.pending_delete = Some(id);
    }

    /// Dismiss the confirmation without touching the backend.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the employee awaiting confirmation, then re-fetch the list.
    ///
    /// Returns false if nothing was awaiting confirmation.
    pub fn confirm_delete(&mut self) -> bool {
        let Some(id) = self.pending_delete.take() else {
            return false;
        };

        let directory = self.directory.clone();
        let events = self.events.clone();
        let query = self.query.clone();
        self.loading = true;
        // Anything still in flight predates the delete
        let seq = self.next_fetch();

        tokio::spawn(async move {
            let result = directory.delete_employee(id).await;
            let deleted = result.is_ok();
            let _ = events.send(ListEvent::Deleted { id, result });
            if deleted {
                fetch(seq, directory, query, events).await;
            }
        });
        true
    }

    /// Fold a completed operation into the list, returning what to tell the user.
    pub fn apply(&mut self, event: ListEvent) -> Vec<Notification> {
        match event {
            ListEvent::Loaded { seq, query, result } => {
                // A newer fetch superseded this one
                if seq < self.latest_fetch {
                    log::debug!("Dropping stale results #{} for '{}'", seq, query);
                    return Vec::new();
                }

                self.loading = false;
                match result {
                    Ok(employees) => {
                        self.employees = employees;
                        Vec::new()
                    }
                    Err(e) => e.notifications(),
                }
            }
            ListEvent::Deleted { id, result } => match result {
                Ok(()) => {
                    self.employees.retain(|e| e.id != id);
                    vec![Notification::success(DELETE_SUCCESS_MESSAGE)]
                }
                Err(e) => {
                    self.loading = false;
                    e.notifications()
                }
            },
        }
    }
}

async fn fetch<D: EmployeeDirectory>(
    seq: u64,
    directory: Arc<D>,
    query: String,
    events: mpsc::UnboundedSender<ListEvent>,
) {
    let trimmed = query.trim();
    let result = if trimmed.is_empty() {
        directory.list_employees().await
    } else {
        directory.search_employees(trimmed).await
    };
    let _ = events.send(ListEvent::Loaded { seq, query, result });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApiError, employees::EmployeeData, notify::NotificationLevel};
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// In-memory directory recording every call
    #[derive(Default)]
    struct FakeDirectory {
        employees: Mutex<Vec<Employee>>,
        calls: Mutex<Vec<String>>,
        /// Delay for the next list call, answered with data read before it
        list_delay: Mutex<Option<Duration>>,
    }

    impl FakeDirectory {
        fn with_ids(ids: &[EmployeeId]) -> Self {
            let employees = ids
                .iter()
                .map(|&id| Employee {
                    id,
                    form_template: 1,
                    form_template_name: Some("Standard".to_string()),
                    data: vec![EmployeeData::new("Name", format!("Employee {id}"))],
                    created_at: None,
                })
                .collect();
            Self {
                employees: Mutex::new(employees),
                calls: Mutex::new(Vec::new()),
                list_delay: Mutex::new(None),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl EmployeeDirectory for FakeDirectory {
        async fn list_employees(&self) -> ApiResult<Vec<Employee>> {
            self.record("list".to_string());
            let snapshot = self.employees.lock().unwrap().clone();
            let delay = self.list_delay.lock().unwrap().take();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(snapshot)
        }

        async fn search_employees(&self, query: &str) -> ApiResult<Vec<Employee>> {
            self.record(format!("search:{query}"));
            Ok(self
                .employees
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.matches(query))
                .cloned()
                .collect())
        }

        async fn delete_employee(&self, id: EmployeeId) -> ApiResult<()> {
            self.record(format!("delete:{id}"));
            let mut employees = self.employees.lock().unwrap();
            let before = employees.len();
            employees.retain(|e| e.id != id);
            if employees.len() == before {
                return Err(ApiError::backend(
                    StatusCode::NOT_FOUND,
                    r#"{"detail":"Not found."}"#,
                ));
            }
            Ok(())
        }
    }

    const DELAY: Duration = Duration::from_millis(500);

    fn setup(
        ids: &[EmployeeId],
    ) -> (
        Arc<FakeDirectory>,
        EmployeeList<FakeDirectory>,
        mpsc::UnboundedReceiver<ListEvent>,
    ) {
        let directory = Arc::new(FakeDirectory::with_ids(ids));
        let (tx, rx) = mpsc::unbounded_channel();
        let list = EmployeeList::new(directory.clone(), tx, DELAY);
        (directory, list, rx)
    }

    fn ids(list: &EmployeeList<FakeDirectory>) -> Vec<EmployeeId> {
        list.employees().iter().map(|e| e.id).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_searches_once() {
        let (directory, mut list, mut rx) = setup(&[1, 2]);

        list.set_query("jo");
        tokio::time::sleep(Duration::from_millis(100)).await;
        list.set_query("joh");
        tokio::time::sleep(Duration::from_millis(100)).await;
        list.set_query("john");
        assert!(list.is_loading());

        let event = rx.recv().await.unwrap();
        assert!(list.apply(event).is_empty());
        assert!(!list.is_loading());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(directory.calls(), vec!["search:john".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_query_lists_everything() {
        let (directory, mut list, mut rx) = setup(&[1, 2, 3]);

        list.refresh();
        let event = rx.recv().await.unwrap();
        list.apply(event);

        assert_eq!(ids(&list), vec![1, 2, 3]);
        assert_eq!(directory.calls(), vec!["list".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_delete_refetches() {
        let (directory, mut list, mut rx) = setup(&[4, 5, 6]);
        list.refresh();
        let event = rx.recv().await.unwrap();
        list.apply(event);

        list.request_delete(5);
        assert_eq!(list.pending_delete(), Some(5));
        assert!(list.confirm_delete());
        assert_eq!(list.pending_delete(), None);

        let deleted = rx.recv().await.unwrap();
        let notes = list.apply(deleted);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Success);
        assert_eq!(notes[0].message, DELETE_SUCCESS_MESSAGE);

        let reloaded = rx.recv().await.unwrap();
        list.apply(reloaded);
        assert_eq!(ids(&list), vec![4, 6]);
        assert_eq!(
            directory.calls(),
            vec![
                "list".to_string(),
                "delete:5".to_string(),
                "list".to_string()
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_delete_changes_nothing() {
        let (directory, mut list, mut rx) = setup(&[4, 5, 6]);
        list.refresh();
        let event = rx.recv().await.unwrap();
        list.apply(event);

        list.request_delete(5);
        list.cancel_delete();
        assert!(!list.confirm_delete());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(ids(&list), vec![4, 5, 6]);
        assert_eq!(directory.calls(), vec!["list".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_delete_reports_error() {
        let (_directory, mut list, mut rx) = setup(&[1]);

        list.request_delete(99);
        list.confirm_delete();

        let event = rx.recv().await.unwrap();
        let notes = list.apply(event);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].is_error());
        assert_eq!(notes[0].message, "Not found.");

        // No re-fetch after a failed delete
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_results_ignored() {
        let (_directory, mut list, _rx) = setup(&[]);
        list.set_query("new");

        let notes = list.apply(ListEvent::Loaded {
            seq: 0,
            query: "old".to_string(),
            result: Err(ApiError::SessionExpired),
        });
        assert!(notes.is_empty());
        assert!(list.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_does_not_undo_delete() {
        let (directory, mut list, mut rx) = setup(&[4, 5, 6]);
        *directory.list_delay.lock().unwrap() = Some(Duration::from_millis(200));

        list.refresh();
        // Let the slow fetch read the list before the delete
        tokio::time::sleep(Duration::from_millis(10)).await;
        list.request_delete(5);
        list.confirm_delete();

        let mut notes = Vec::new();
        for _ in 0..3 {
            let event = rx.recv().await.unwrap();
            notes.extend(list.apply(event));
        }

        // The reload after the delete lands first; the old snapshot follows
        assert_eq!(
            directory.calls(),
            vec![
                "list".to_string(),
                "delete:5".to_string(),
                "list".to_string()
            ]
        );
        assert_eq!(ids(&list), vec![4, 6]);
        assert!(!list.is_loading());
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message, DELETE_SUCCESS_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_supersedes_pending_fetch() {
        let (directory, mut list, mut rx) = setup(&[1, 2]);
        *directory.list_delay.lock().unwrap() = Some(Duration::from_millis(200));

        list.refresh();
        tokio::time::sleep(Duration::from_millis(10)).await;
        directory.employees.lock().unwrap().retain(|e| e.id != 2);
        list.refresh();

        let fresh = rx.recv().await.unwrap();
        list.apply(fresh);
        let stale = rx.recv().await.unwrap();
        list.apply(stale);

        assert_eq!(ids(&list), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_pending_search() {
        let (directory, mut list, mut rx) = setup(&[1]);
        list.set_query("an");
        drop(list);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.recv().await.is_none());
        assert!(directory.calls().is_empty());
    }

    #[test]
    fn test_session_expired_detection() {
        let event = ListEvent::Deleted {
            id: 1,
            result: Err(ApiError::SessionExpired),
        };
        assert!(event.session_expired());

        let event = ListEvent::Loaded {
            seq: 1,
            query: String::new(),
            result: Ok(Vec::new()),
        };
        assert!(!event.session_expired());
    }
}
