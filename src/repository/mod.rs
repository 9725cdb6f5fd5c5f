// Per-entity data access with in-memory and remote backends.

mod memory;
mod remote;
mod resource;
mod test_suite;
pub mod wire;

pub use memory::InMemoryRepository;
pub use remote::RemoteRepository;
pub use resource::{Resource, ResourceRepository};
pub use test_suite::{InMemoryTestSuites, RemoteTestSuites, TestSuiteRepository};
pub use wire::{Endpoint, RemoteResource};
