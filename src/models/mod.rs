//! # Data Models
//!
//! This module contains all the SeaORM entity models used throughout the
//! Exeat API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod exeat;
pub mod house;
pub mod house_supervisor;
pub mod school;
pub mod security_person;
pub mod student;
pub mod sub_admin;
pub mod user;

pub use exeat::Entity as Exeat;
pub use house::Entity as House;
pub use house_supervisor::Entity as HouseSupervisor;
pub use school::Entity as School;
pub use security_person::Entity as SecurityPerson;
pub use student::Entity as Student;
pub use sub_admin::Entity as SubAdmin;
pub use user::Entity as User;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "exeat-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
