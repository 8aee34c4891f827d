pub mod collector;
pub mod data_store;
pub mod descriptor;
pub mod directory;
pub mod models;
pub mod resolver;

#[cfg(test)]
pub mod testing;

pub use data_store::{LdapDataStore, TestConnectionMode};
pub use resolver::EndpointResolver;
