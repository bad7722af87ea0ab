//! Outbound HTTP clients.
//!
//! - [`CohereApiAgent`]: the hosted language model, used by the server
//! - [`GenerateEndpointClient`]: the server's `/api/generate` endpoint,
//!   used by session front-ends

pub mod cohere_api_agent;
pub mod generate_endpoint_client;

pub use cohere_api_agent::CohereApiAgent;
pub use generate_endpoint_client::GenerateEndpointClient;
