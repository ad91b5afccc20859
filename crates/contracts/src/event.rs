//! InboundEvent - 驱动中继管道的记录
//!
//! 源平台投递的单条消息，作为 `admit` 的入参。

use serde::{Deserialize, Serialize};

use crate::GroupKey;

/// 单条已投递消息的稳定标识。
pub type EventId = i64;

/// 附件类型
///
/// 封闭集合：新增类型后，每个消费方在处理新变体前都是编译错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    /// 静态图片，原样投递
    Image,
    /// 普通视频，原样投递
    Video,
    /// 循环短视频；sink 只接受动图形式
    AnimatedLoop,
}

impl AttachmentKind {
    /// 投递前是否需要转码。
    pub fn needs_conversion(self) -> bool {
        matches!(self, Self::AnimatedLoop)
    }

    /// 该类型出站文件名的扩展名。
    pub fn target_extension(self) -> &'static str {
        match self {
            Self::Image => "jpg",
            Self::Video => "mp4",
            Self::AnimatedLoop => "gif",
        }
    }
}

/// 事件附带的单个远端资源引用。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// 源平台资源标识，经由 source client 解析
    pub asset_id: String,

    /// 附件类型
    pub kind: AttachmentKind,
}

impl AttachmentRef {
    /// 便捷构造函数。
    pub fn new(asset_id: impl Into<String>, kind: AttachmentKind) -> Self {
        Self {
            asset_id: asset_id.into(),
            kind,
        }
    }
}

/// 转发消息的原作者/频道身份。
///
/// 事件上以 `Option<Origin>` 表示缺失。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    /// 转发自频道
    Channel {
        /// 频道显示名称
        title: Option<String>,
        /// 公开频道时指向原帖的永久链接
        permalink: Option<String>,
    },
    /// 转发自用户
    User {
        /// 用户名字
        first_name: Option<String>,
        /// 用户主页链接（可用时）
        profile_link: Option<String>,
    },
}

/// 单条已投递的消息。
///
/// 构造后不可变；聚合引擎只会整体移动事件。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    /// 稳定事件 id（组内去重键）
    pub event_id: EventId,

    /// 组键；缺失表示独立事件
    #[serde(default)]
    pub group_key: Option<GroupKey>,

    /// 正文或媒体说明文字
    #[serde(default)]
    pub text: Option<String>,

    /// 附件引用，按发布顺序
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,

    /// 事件本身为转发时的来源元数据
    #[serde(default)]
    pub origin: Option<Origin>,
}
