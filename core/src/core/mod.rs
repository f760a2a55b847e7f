pub mod bus;
pub mod clock;
pub mod codec;
pub mod controller;
pub mod error;
pub mod machine;
pub mod options;

pub use bus::{Interrupt, RstVector, SystemBus};
pub use controller::Controller;
pub use error::ErrorCode;
pub use machine::Machine;
pub use options::MachineOptions;
