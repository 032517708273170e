//! Concrete transport adapters.

pub mod inmem;
pub mod tcp;

pub use inmem::{InMemoryHub, InMemoryNetwork};
pub use tcp::{TcpNetwork, TcpNetworkConfig};
