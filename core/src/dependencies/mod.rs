pub mod container;
pub mod types;

pub use container::Container;
pub use types::{Registration, RegistrationBuilder, RegistrationEntry, Registry};
