pub mod buffer_pool;
pub mod doppler;
pub mod matched_filter;
pub mod matrix;
pub mod pipeline;
pub mod reference;

pub use buffer_pool::BufferPool;
pub use doppler::DopplerStage;
pub use matched_filter::MatchedFilterStage;
pub use matrix::RangePulseMatrix;
pub use pipeline::{PipelineReport, RadarPipeline};
pub use reference::ReferenceSpectrum;
