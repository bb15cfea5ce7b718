mod traits;
mod openai;
pub mod provider;

pub use traits::*;
pub use openai::OpenAICompatClient;
pub use provider::ProviderId;
