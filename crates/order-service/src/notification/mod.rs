//! 通知分发
//!
//! 编排器产出 [`NotificationEvent`] 后交给 [`NotificationService`]：
//! 先持久化一条通知记录（管理后台通知列表读它），再按事件声明的渠道
//! 逐个投递。整条链路发出即忘，任何失败只记日志。

mod sender;
mod service;

pub use sender::{EmailSender, InAppSender, NotificationSink, WhatsappSender};
pub use service::NotificationService;

pub use nefol_shared::events::{
    NotificationAudience, NotificationChannel, NotificationEvent, NotificationType,
};
