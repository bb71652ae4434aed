//! Domain types, failure classification and the employee operations built on top
//! of the upstream store.

pub mod error;
pub mod port;
pub mod service;
pub mod types;

pub use error::{classify, ErrorKind, ErrorReport, GatewayError};
pub use port::EmployeeUpstream;
pub use service::EmployeeService;
pub use types::{CreateEmployeeRequest, DeleteByNameRequest, Employee};
