// Content generation: typed requests → prompts → inference gateway.
// All model calls go through llm_client: nothing here talks to a backend.

pub mod builder;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod request;
