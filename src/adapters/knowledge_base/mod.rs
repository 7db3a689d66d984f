//! Knowledge base adapters.

mod http_client;
mod mock_client;

pub use http_client::{HttpKnowledgeBase, HttpKnowledgeBaseConfig};
pub use mock_client::MockKnowledgeBase;
