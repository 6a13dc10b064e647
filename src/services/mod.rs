pub mod asset_store;
pub mod mosaic_pipeline;

pub use asset_store::AssetStore;
pub use mosaic_pipeline::{MosaicPipeline, PipelineReport};
