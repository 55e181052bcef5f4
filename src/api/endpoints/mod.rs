//! Route handlers, one module per resource.

pub mod doctors;
pub mod gpt;
pub mod home;
pub mod meet;
pub mod patients;
pub mod payments;
