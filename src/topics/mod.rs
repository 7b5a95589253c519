// Topic discovery: normalization, clustering, naming and ranking.

pub mod clusterer;
pub mod download;
pub mod embeddings;
pub mod engine;
pub mod normalize;
pub mod ranker;
pub mod tfidf;
pub mod traits;
