pub mod core;
pub mod grade;
pub mod session;
pub mod students;
