use std::{cmp::Reverse, sync::Arc};

use tracing::{debug, info, warn};

use crate::error::{ErrorKind, GatewayError};
use crate::port::EmployeeUpstream;
use crate::types::{is_blank, CreateEmployeeRequest, DeleteByNameRequest, Employee};

pub const TOP_EARNERS_LIMIT: usize = 10;

/// Composes upstream calls into the operations offered to callers.
///
/// Every call re-fetches from upstream; nothing is cached between calls.
#[derive(Clone)]
pub struct EmployeeService {
    upstream: Arc<dyn EmployeeUpstream>,
}

impl EmployeeService {
    pub fn new(upstream: Arc<dyn EmployeeUpstream>) -> Self {
        Self { upstream }
    }

    pub async fn get_all_employees(&self) -> Result<Vec<Employee>, GatewayError> {
        self.upstream.list().await
    }

    /// Case-insensitive substring match on employee names. Blank terms are rejected.
    pub async fn search_by_name(&self, term: &str) -> Result<Vec<Employee>, GatewayError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            debug!(stage = "service", "search term is blank");
            return Err(GatewayError::validation("searchString: must not be blank"));
        }

        let employees = self.upstream.list().await?;
        let matches: Vec<Employee> = employees
            .into_iter()
            .filter(|employee| {
                employee
                    .display_name()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .collect();

        debug!(stage = "service", term = %needle, matches = matches.len(), "name search finished");
        Ok(matches)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Employee, GatewayError> {
        if is_blank(Some(id)) {
            debug!(stage = "service", "employee id is blank");
            return Err(GatewayError::validation("id: must not be blank"));
        }

        self.upstream.get_by_id(id).await
    }

    /// Highest defined salary, or `None` when no employee has one.
    pub async fn highest_salary(&self) -> Result<Option<u32>, GatewayError> {
        let employees = self.upstream.list().await?;
        Ok(employees.iter().filter_map(|employee| employee.salary).max())
    }

    /// Names of the ten best paid employees, highest first.
    ///
    /// Equal salaries keep upstream order; employees without a salary rank last.
    pub async fn top_ten_highest_earners(&self) -> Result<Vec<String>, GatewayError> {
        let mut employees = self.upstream.list().await?;
        employees.sort_by_key(|employee| Reverse(employee.salary));

        Ok(employees
            .into_iter()
            .take(TOP_EARNERS_LIMIT)
            .map(|employee| employee.name.unwrap_or_default())
            .collect())
    }

    pub async fn create_employee(
        &self,
        request: &CreateEmployeeRequest,
    ) -> Result<Employee, GatewayError> {
        request.validate()?;

        let employee = self.upstream.create(request).await?;
        info!(stage = "service", id = %employee.id, "employee created");
        Ok(employee)
    }

    /// Deletes the employee currently holding `id` and returns its name.
    ///
    /// Upstream deletes by name, so the name is resolved first. The two calls are not
    /// atomic: a concurrent rename or insert upstream between them can make the second
    /// call remove a different record.
    pub async fn delete_by_id(&self, id: &str) -> Result<String, GatewayError> {
        let employee = self.get_by_id(id).await?;
        let name = match employee.name {
            Some(name) if !is_blank(Some(&name)) => name,
            _ => {
                warn!(stage = "service", %id, "resolved employee has no name");
                return Err(GatewayError::not_found(format!(
                    "employee {id} has no name to delete by"
                )));
            }
        };

        // Upstream matches on the stored name exactly.
        let request = DeleteByNameRequest::for_resolved(&name);
        let deleted = self.upstream.delete_by_name(&request).await?;
        if !deleted {
            warn!(stage = "service", %id, name = %request.name, "upstream declined deletion");
            return Err(GatewayError::new(
                ErrorKind::Protocol,
                "deletion declined by upstream",
            ));
        }

        info!(stage = "service", %id, name = %request.name, "employee deleted");
        Ok(request.name)
    }
}
