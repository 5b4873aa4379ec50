pub mod countdown;
pub mod gate;
pub mod network;
pub mod session;
pub mod snapshot;
