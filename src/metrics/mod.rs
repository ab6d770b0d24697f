//! Per-request performance metrics and the builders that extract them from
//! chat-completion responses.
mod buffered;
mod builder;
mod streaming;
mod types;
mod wire;


pub use buffered::BufferedMetricsBuilder;
pub use builder::{BuiltMetric, MetricsBuilder, MetricsBuilders, ResponseMode};
pub use streaming::StreamingMetricsBuilder;
pub use types::{PerformanceMetric, TokenUsage, UNKNOWN_REQUEST_ID};

#[cfg(feature = "fuzzing")]
pub(crate) use buffered::parse_completion;
#[cfg(feature = "fuzzing")]
pub(crate) use streaming::{MAX_LINE_BYTES, read_event_stream};
