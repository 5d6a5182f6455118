pub mod aggregator;
pub mod classifier;
pub mod formatter;
pub mod matcher;
pub mod name_extractor;
pub mod window;

pub use aggregator::ReportService;
pub use classifier::classify;
pub use matcher::{MatchStrategy, NameIndex};
pub use name_extractor::extract_name;
