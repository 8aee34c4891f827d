pub mod memory;

pub use memory::InMemoryEndpointRegistry;
