pub mod http;
pub mod storage;
pub mod tokenizer;
pub mod wire;

pub use http::HttpGateway;
pub use storage::FileCredentialStore;
pub use tokenizer::StaticPrimeTokenizer;
