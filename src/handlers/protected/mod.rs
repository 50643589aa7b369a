// handlers/protected/mod.rs - endpoints behind the access gate
//
// Every handler here takes `CurrentUser`; the gate has already resolved it.

pub mod dashboard;
pub mod whoami;

pub use dashboard::dashboard;
pub use whoami::whoami;
