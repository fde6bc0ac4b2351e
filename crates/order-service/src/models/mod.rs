//! 领域模型定义
//!
//! 所有模型都支持数据库（sqlx）和 JSON（serde）序列化

mod affiliate;
mod cancellation;
mod coin;
mod order;
mod user;

pub use affiliate::AffiliatePartner;
pub use cancellation::{
    CancelItem, CancellationStatus, CancellationType, OrderCancellation, RefundStatus,
};
pub use coin::{CoinTransaction, CoinTxStatus, CoinTxType};
pub use order::{Order, OrderItem, OrderStatus, PaymentMethod};
pub use user::User;
