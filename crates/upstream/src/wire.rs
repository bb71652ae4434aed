use employee_facade_core::Employee;
use serde::Deserialize;

/// `{ data, status }` wrapper around every upstream response body.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub status: Option<String>,
}

impl<T> Envelope<T> {
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or("<none>")
    }
}

/// Employee as stored upstream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmployeeRecord {
    pub id: String,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub employee_salary: Option<u32>,
    #[serde(default)]
    pub employee_age: Option<u32>,
    #[serde(default)]
    pub employee_title: Option<String>,
    #[serde(default)]
    pub employee_email: Option<String>,
}

impl From<EmployeeRecord> for Employee {
    fn from(record: EmployeeRecord) -> Self {
        Self {
            id: record.id,
            name: record.employee_name,
            salary: record.employee_salary,
            age: record.employee_age,
            title: record.employee_title,
            email: record.employee_email,
        }
    }
}
