mod chunk_source;
mod embedding;
mod generator;
mod parser;
mod scorer;

pub use chunk_source::IChunkSource;
pub use embedding::IEmbeddingProvider;
pub use generator::IGenerator;
pub use parser::{DocumentFormat, IDocumentParser};
pub use scorer::ICrossEncoderScorer;
