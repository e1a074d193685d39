//! Text generation backend implementations

mod adapter;
mod gemini;
mod http_client;
mod openai;

pub use adapter::{
    GenerationAdapter, GenerationAdapterFactory, GEMINI_API_KEY_ENV, OPENAI_API_KEY_ENV,
};
pub use gemini::{GeminiGenerator, DEFAULT_GEMINI_MODEL};
pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::{OpenAiGenerator, DEFAULT_OPENAI_MODEL};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
