//! 中继指标定义模块
//!
//! 管道各 crate 通过 `metrics` facade 上报这些计数器；在此注册描述，
//! 让 Prometheus 导出端带上帮助文本。

use metrics::describe_counter;

/// 进入聚合引擎的事件数
pub const EVENTS_ADMITTED: &str = "relay_events_admitted";

/// 聚合引擎丢弃的重复投递数
pub const DUPLICATE_EVENTS: &str = "relay_duplicate_events";

/// 交给刷出路径的组数
pub const GROUPS_FLUSHED: &str = "relay_groups_flushed";

/// 因获取或转码失败丢弃的附件数
pub const ATTACHMENTS_DROPPED: &str = "relay_attachments_dropped";

/// 被 sink 接受的批次数
pub const BATCHES_DELIVERED: &str = "relay_batches_delivered";

/// 按 sink 统计的投递失败数
pub const SINK_FAILURES: &str = "relay_sink_failures";

/// 注册所有中继计数器的描述
pub fn describe() {
    describe_counter!(EVENTS_ADMITTED, "Events admitted into the aggregation engine");
    describe_counter!(
        DUPLICATE_EVENTS,
        "Duplicate deliveries dropped during aggregation"
    );
    describe_counter!(GROUPS_FLUSHED, "Groups flushed after their quiet window");
    describe_counter!(
        ATTACHMENTS_DROPPED,
        "Attachments dropped by fetch or conversion failures"
    );
    describe_counter!(BATCHES_DELIVERED, "Batches accepted by a sink");
    describe_counter!(SINK_FAILURES, "Per-sink delivery failures");
}
