//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态。服务装配在这里完成：仓储 -> 冲正管道 /
//! 退款派发器 -> 结算编排器 -> 三个编排服务。

use std::sync::Arc;

use nefol_orders::carrier::CarrierService;
use nefol_orders::notification::{EmailSender, InAppSender, NotificationSink, WhatsappSender};
use nefol_orders::{
    AffiliateRepository, CancelService, CancellationRepository, CoinRepository, DecisionService,
    NotificationService, OrderRepository, RazorpayClient, RefundDispatcher, RequestService,
    ReversalPipeline, Settlement, UserRepository,
};
use nefol_shared::cache::Cache;
use nefol_shared::config::AppConfig;
use sqlx::PgPool;

/// 具体仓储类型装配后的结算编排器
pub type AppSettlement =
    Settlement<CoinRepository, AffiliateRepository, UserRepository, CancellationRepository>;
/// 具体仓储类型装配后的立即取消服务
pub type AppCancelService =
    CancelService<CoinRepository, AffiliateRepository, UserRepository, CancellationRepository>;
/// 具体仓储类型装配后的审批服务
pub type AppDecisionService =
    DecisionService<CoinRepository, AffiliateRepository, UserRepository, CancellationRepository>;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池
    pub pool: PgPool,
    /// Redis 缓存客户端
    pub cache: Arc<Cache>,
    pub order_repo: Arc<OrderRepository>,
    pub cancellation_repo: Arc<CancellationRepository>,
    pub request_service: Arc<RequestService>,
    pub cancel_service: Arc<AppCancelService>,
    pub decision_service: Arc<AppDecisionService>,
}

impl AppState {
    /// 装配完整的服务依赖树
    pub fn build(
        pool: PgPool,
        cache: Arc<Cache>,
        config: &AppConfig,
    ) -> nefol_orders::Result<Self> {
        let order_repo = Arc::new(OrderRepository::new(pool.clone()));
        let cancellation_repo = Arc::new(CancellationRepository::new(pool.clone()));
        let coin_repo = Arc::new(CoinRepository::new(pool.clone()));
        let affiliate_repo = Arc::new(AffiliateRepository::new(pool.clone()));
        let user_repo = Arc::new(UserRepository::new(pool.clone()));

        let gateway = Arc::new(RazorpayClient::new(
            config.payment.base_url.clone(),
            config.payment.key_id.clone(),
            config.payment.key_secret.clone(),
            config.payment.timeout_seconds,
        )?);

        let senders: Vec<Arc<dyn NotificationSink>> = vec![
            Arc::new(InAppSender),
            Arc::new(EmailSender),
            Arc::new(WhatsappSender),
        ];
        let notifications = Arc::new(NotificationService::new(pool.clone(), senders));

        let reversals = ReversalPipeline::new(
            coin_repo,
            affiliate_repo,
            user_repo,
            config.loyalty.coins_per_rupee,
            config.loyalty.referral_reversal_window_days,
        );
        let refunds = RefundDispatcher::new(cancellation_repo.clone(), gateway);
        let settlement = Arc::new(Settlement::new(
            reversals,
            refunds,
            CarrierService::new(),
            notifications.clone(),
            Some(cache.clone()),
        ));

        let request_service = Arc::new(RequestService::new(
            pool.clone(),
            notifications.clone(),
            config.loyalty.cancellation_window_days,
        ));
        let cancel_service = Arc::new(CancelService::new(pool.clone(), settlement.clone()));
        let decision_service = Arc::new(DecisionService::new(
            pool.clone(),
            settlement,
            notifications,
        ));

        Ok(Self {
            pool,
            cache,
            order_repo,
            cancellation_repo,
            request_service,
            cancel_service,
            decision_service,
        })
    }
}
