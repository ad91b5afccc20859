//! # Dispatcher
//!
//! 出站分发模块。
//!
//! 负责：
//! - 消费组装好的 `Batch`
//! - Fan-out 到每个已配置 sink，互不影响
//! - 按 sink 执行载荷大小限制（排除，绝不截断）
//! - 隔离单个 sink 的失败；所有 sink 尝试完后再汇总报错

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod sinks;

pub use contracts::{Batch, SinkClient, SinkSpec};
pub use dispatcher::{Dispatcher, SinkRuntime};
pub use error::DispatcherError;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{create_sink, LogSink, RelaySink, WebhookSink};
