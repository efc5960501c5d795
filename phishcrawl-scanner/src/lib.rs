pub mod crawler;
pub mod error;
pub mod extract;
pub mod frontier;
pub mod link;
pub mod policy;
pub mod result;
pub mod task;

pub use crawler::{Crawler, ProgressCallback, RecordSink};
pub use error::ScanError;
pub use frontier::Frontier;
pub use policy::{DepthPolicy, ScopePolicy};
pub use result::{CrawlStats, FeatureRecord};
pub use task::{CrawlTask, Label, SeedEntry};
pub use tokio_util::sync::CancellationToken;
