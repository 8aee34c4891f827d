pub mod endpoints;

pub use endpoints::HttpEndpointResolver;
