//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for database entities, providing a clean API for data access
//! with visibility-scoped methods.

pub mod exeat;
pub mod house;
pub mod identity;
pub mod school;
pub mod staff;
pub mod student;

pub use exeat::ExeatRepository;
pub use house::HouseRepository;
pub use identity::IdentityRepository;
pub use school::SchoolRepository;
pub use staff::StaffRepository;
pub use student::StudentRepository;
