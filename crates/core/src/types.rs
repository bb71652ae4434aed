use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

pub const MIN_SALARY: i64 = 1;
pub const MAX_SALARY: i64 = u32::MAX as i64;
pub const MIN_AGE: i64 = 16;
pub const MAX_AGE: i64 = 75;

/// Employee record as exposed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: Option<String>,
    pub salary: Option<u32>,
    pub age: Option<u32>,
    pub title: Option<String>,
    pub email: Option<String>,
}

impl Employee {
    /// Name with surrounding whitespace removed, or `None` when absent or blank.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Payload accepted when creating an employee.
///
/// Fields are optional on the wire so that missing values surface as validation
/// failures rather than decoding errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: Option<String>,
    pub salary: Option<i64>,
    pub age: Option<i64>,
    pub title: Option<String>,
}

impl CreateEmployeeRequest {
    /// Checks field constraints in declaration order and reports the first violation.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if is_blank(self.name.as_deref()) {
            return Err(violation("name", "must not be blank"));
        }

        match self.salary {
            None => return Err(violation("salary", "must not be null")),
            Some(salary) if salary < MIN_SALARY => {
                return Err(violation(
                    "salary",
                    &format!("must be greater than or equal to {MIN_SALARY}"),
                ))
            }
            Some(salary) if salary > MAX_SALARY => {
                return Err(violation(
                    "salary",
                    &format!("must be less than or equal to {MAX_SALARY}"),
                ))
            }
            Some(_) => {}
        }

        match self.age {
            None => return Err(violation("age", "must not be null")),
            Some(age) if age < MIN_AGE => {
                return Err(violation(
                    "age",
                    &format!("must be greater than or equal to {MIN_AGE}"),
                ))
            }
            Some(age) if age > MAX_AGE => {
                return Err(violation(
                    "age",
                    &format!("must be less than or equal to {MAX_AGE}"),
                ))
            }
            Some(_) => {}
        }

        if is_blank(self.title.as_deref()) {
            return Err(violation("title", "must not be blank"));
        }

        Ok(())
    }
}

/// Body of the upstream delete call. Only built from a resolved employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteByNameRequest {
    pub name: String,
}

impl DeleteByNameRequest {
    pub(crate) fn for_resolved(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |value| value.trim().is_empty())
}

fn violation(field: &str, constraint: &str) -> GatewayError {
    GatewayError::validation(format!("{field}: {constraint}"))
}
