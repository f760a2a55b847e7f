pub mod core;
pub mod cpu;

pub mod prelude {
    pub use crate::core::bus::{Interrupt, RstVector, SystemBus};
    pub use crate::core::controller::Controller;
    pub use crate::core::error::ErrorCode;
    pub use crate::core::machine::{ErrorContext, Machine};
    pub use crate::core::options::MachineOptions;
    pub use crate::cpu::Cpu;
}
