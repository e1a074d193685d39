//! Text generation domain models and traits

mod generator;
mod request;
mod response;

pub use generator::TextGenerator;
pub use request::GenerationRequest;
pub use response::{FinishReason, GenerationResponse, Usage};

#[cfg(test)]
pub use generator::mock::MockTextGenerator;
