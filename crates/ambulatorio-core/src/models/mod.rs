//! Domain models for the outpatient nursing service.

mod appointment;
mod forms;
mod patient;
mod photo;
mod site;

pub use appointment::*;
pub use forms::*;
pub use patient::*;
pub use photo::*;
pub use site::*;
