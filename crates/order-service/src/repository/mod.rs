//! 数据库仓储层
//!
//! 每个聚合一个仓储。服务层依赖 trait 抽象而非具体实现，支持 mock 测试；
//! 跨表事务步骤通过具体类型上的 `_in_tx` 静态方法在服务层组装。

mod affiliate_repo;
mod cancellation_repo;
mod coin_repo;
mod order_repo;
mod traits;
mod user_repo;

pub use affiliate_repo::AffiliateRepository;
pub use cancellation_repo::{CancellationRepository, NewCancellation};
pub use coin_repo::CoinRepository;
pub use order_repo::OrderRepository;
pub use user_repo::UserRepository;
pub use traits::{
    AffiliateRepositoryTrait, CancellationRepositoryTrait, CoinRepositoryTrait,
    OrderRepositoryTrait, UserRepositoryTrait,
};

#[cfg(test)]
pub use traits::{
    MockAffiliateRepositoryTrait, MockCancellationRepositoryTrait, MockCoinRepositoryTrait,
    MockOrderRepositoryTrait, MockUserRepositoryTrait,
};
