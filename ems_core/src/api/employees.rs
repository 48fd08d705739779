//! Employee endpoints.

use super::{
    client::{ApiClient, PendingRequest},
    errors::ApiResult,
};
use crate::employees::{Employee, EmployeeDirectory, EmployeeDraft, EmployeeId, EmployeeRequest};
use async_trait::async_trait;

const EMPLOYEES_PATH: &str = "/employees/";
const SEARCH_PATH: &str = "/employees/search/";

impl ApiClient {
    /// List all employees created by the signed-in user
    pub async fn list_employees(&self) -> ApiResult<Vec<Employee>> {
        self.send_json(PendingRequest::get(EMPLOYEES_PATH)).await
    }

    /// Fetch a single employee
    pub async fn get_employee(&self, id: EmployeeId) -> ApiResult<Employee> {
        self.send_json(PendingRequest::get(format!("{EMPLOYEES_PATH}{id}/")))
            .await
    }

    /// Search employees by any field value
    pub async fn search_employees(&self, query: &str) -> ApiResult<Vec<Employee>> {
        self.send_json(PendingRequest::get(SEARCH_PATH).with_query("q", query))
            .await
    }

    /// Create an employee record
    pub async fn create_employee(&self, request: &EmployeeRequest) -> ApiResult<()> {
        self.send_empty(PendingRequest::post(EMPLOYEES_PATH, request)?)
            .await
    }

    /// Replace an employee record
    pub async fn update_employee(&self, id: EmployeeId, request: &EmployeeRequest) -> ApiResult<()> {
        self.send_empty(PendingRequest::put(
            format!("{EMPLOYEES_PATH}{id}/"),
            request,
        )?)
        .await
    }

    /// Delete an employee record. Irreversible.
    pub async fn delete_employee(&self, id: EmployeeId) -> ApiResult<()> {
        self.send_empty(PendingRequest::delete(format!("{EMPLOYEES_PATH}{id}/")))
            .await
    }

    /// Validate a draft and create or update it depending on its mode.
    ///
    /// # Errors
    ///
    /// * `ApiError::Validation` - Draft fails client-side checks; nothing sent
    pub async fn save_employee(&self, draft: &EmployeeDraft) -> ApiResult<()> {
        let request = draft.to_request()?;
        match draft.employee_id() {
            Some(id) => self.update_employee(id, &request).await,
            None => self.create_employee(&request).await,
        }
    }
}

#[async_trait]
impl EmployeeDirectory for ApiClient {
    async fn list_employees(&self) -> ApiResult<Vec<Employee>> {
        ApiClient::list_employees(self).await
    }

    async fn search_employees(&self, query: &str) -> ApiResult<Vec<Employee>> {
        ApiClient::search_employees(self, query).await
    }

    async fn delete_employee(&self, id: EmployeeId) -> ApiResult<()> {
        ApiClient::delete_employee(self, id).await
    }
}
