use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{CreateEmployeeRequest, DeleteByNameRequest, Employee};

/// Operations offered by the upstream employee store.
///
/// Implementations own retries and envelope unwrapping; every returned error is
/// already tagged so the service and callers can classify it.
#[async_trait]
pub trait EmployeeUpstream: Send + Sync {
    async fn list(&self) -> Result<Vec<Employee>, GatewayError>;

    async fn get_by_id(&self, id: &str) -> Result<Employee, GatewayError>;

    async fn create(&self, request: &CreateEmployeeRequest) -> Result<Employee, GatewayError>;

    /// `Ok(false)` means upstream declined the deletion.
    async fn delete_by_name(&self, request: &DeleteByNameRequest) -> Result<bool, GatewayError>;
}
