//! Language model adapters.

mod huggingface;
mod mock;

pub use huggingface::{HuggingFaceConfig, HuggingFaceProvider};
pub use mock::MockModel;
