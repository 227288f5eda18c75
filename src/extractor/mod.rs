// Extraction layer: turns opaque analysis text into displayable structure.

pub mod metrics;
pub mod sections;

pub use metrics::MetricExtractor;
pub use sections::SectionSplitter;
