//! 取消流程集成测试
//!
//! 使用真实 PostgreSQL 测试申请 / 立即取消 / 审批的完整编排。编排服务
//! 内部通过 sqlx 直接操作数据库（行级锁、条件插入、事务提交），无法
//! 通过纯 mock 覆盖，因此需要集成测试。
//!
//! ## 运行方式
//!
//! ```bash
//! DATABASE_URL=postgres://... \
//!   cargo test --test cancellation_flow_test -- --ignored
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use nefol_orders::carrier::CarrierService;
use nefol_orders::dto::{CancelCommand, DecisionCommand, ReversalOutcome};
use nefol_orders::repository::CancellationRepositoryTrait;
use nefol_orders::{
    AffiliateRepository, CancelService, CancellationRepository, CancellationStatus,
    CancellationType, CoinRepository, DecisionService, NotificationService, OrderError,
    PaymentGateway, RefundDispatcher, RefundReceipt, RefundRequest, RefundStatus,
    RequestService, ReversalPipeline, Settlement, UserRepository,
};
use sqlx::PgPool;

// ==================== 辅助函数 ====================

fn database_url() -> String {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests")
}

/// 替代真实网关的测试桩
struct StubGateway {
    fail: bool,
}

#[async_trait::async_trait]
impl PaymentGateway for StubGateway {
    async fn refund(&self, request: &RefundRequest) -> nefol_orders::Result<RefundReceipt> {
        if self.fail {
            return Err(OrderError::PaymentGateway {
                message: "stub gateway failure".to_string(),
            });
        }
        Ok(RefundReceipt {
            refund_id: format!("rfnd_stub_{}", request.cancellation_id),
            gateway_status: "pending".to_string(),
        })
    }
}

type TestSettlement =
    Settlement<CoinRepository, AffiliateRepository, UserRepository, CancellationRepository>;
type TestCancelService =
    CancelService<CoinRepository, AffiliateRepository, UserRepository, CancellationRepository>;
type TestDecisionService =
    DecisionService<CoinRepository, AffiliateRepository, UserRepository, CancellationRepository>;

fn build_settlement(pool: &PgPool, fail_refund: bool) -> Arc<TestSettlement> {
    let reversals = ReversalPipeline::new(
        Arc::new(CoinRepository::new(pool.clone())),
        Arc::new(AffiliateRepository::new(pool.clone())),
        Arc::new(UserRepository::new(pool.clone())),
        10,
        8,
    );
    let refunds = RefundDispatcher::new(
        Arc::new(CancellationRepository::new(pool.clone())),
        Arc::new(StubGateway { fail: fail_refund }),
    );
    // 集成测试不关心通知投递，不注册任何渠道发送器
    let notifications = Arc::new(NotificationService::new(pool.clone(), Vec::new()));
    Arc::new(Settlement::new(
        reversals,
        refunds,
        CarrierService::new(),
        notifications,
        None,
    ))
}

fn build_request_service(pool: &PgPool) -> RequestService {
    let notifications = Arc::new(NotificationService::new(pool.clone(), Vec::new()));
    RequestService::new(pool.clone(), notifications, 5)
}

fn build_cancel_service(pool: &PgPool, fail_refund: bool) -> TestCancelService {
    CancelService::new(pool.clone(), build_settlement(pool, fail_refund))
}

fn build_decision_service(pool: &PgPool) -> TestDecisionService {
    let notifications = Arc::new(NotificationService::new(pool.clone(), Vec::new()));
    DecisionService::new(pool.clone(), build_settlement(pool, false), notifications)
}

/// 插入测试用户（幂等），返回用户 ID
async fn seed_user(pool: &PgPool, phone: &str, coin_balance: i64) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (name, phone, email, coin_balance)
        VALUES ('IntegTest User', $1, NULL, $2)
        ON CONFLICT (phone) DO UPDATE SET coin_balance = $2
        RETURNING id
        "#,
    )
    .bind(phone)
    .bind(coin_balance)
    .fetch_one(pool)
    .await
    .expect("插入测试用户失败");
    id
}

#[allow(clippy::too_many_arguments)]
async fn seed_order(
    pool: &PgPool,
    order_number: &str,
    user_id: Option<i64>,
    phone: &str,
    status: &str,
    payment_method: &str,
    payment_reference: Option<&str>,
    coins_used: i64,
    delivered_days_ago: Option<i64>,
) -> i64 {
    let delivered_at = delivered_days_ago.map(|days| Utc::now() - Duration::days(days));
    let items = serde_json::json!([
        {"productId": 10, "slug": "vitamin-c-serum", "name": "Vitamin C Serum", "price": 499.0, "quantity": 2}
    ]);

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO orders
            (order_number, user_id, customer_name, customer_phone, status, items,
             total, coins_used, payment_method, payment_reference, can_cancel, delivered_at)
        VALUES ($1, $2, 'IntegTest User', $3, $4, $5, 998.0, $6, $7, $8, TRUE, $9)
        ON CONFLICT (order_number) DO UPDATE
            SET status = $4, can_cancel = TRUE, delivered_at = $9,
                coins_used = $6, payment_method = $7, payment_reference = $8
        RETURNING id
        "#,
    )
    .bind(order_number)
    .bind(user_id)
    .bind(phone)
    .bind(status)
    .bind(items)
    .bind(coins_used)
    .bind(payment_method)
    .bind(payment_reference)
    .bind(delivered_at)
    .fetch_one(pool)
    .await
    .expect("插入测试订单失败");
    id
}

/// 插入分销伙伴（幂等），聚合计数固定为 5 / 500 / 200 便于断言
async fn seed_partner(pool: &PgPool, user_id: i64, code: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO affiliate_partners
            (user_id, code, total_referrals, total_earnings, pending_earnings)
        VALUES ($1, $2, 5, 500.0, 200.0)
        ON CONFLICT (code) DO UPDATE
            SET total_referrals = 5, total_earnings = 500.0, pending_earnings = 200.0
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(code)
    .fetch_one(pool)
    .await
    .expect("插入分销伙伴失败");
    id
}

async fn set_order_affiliate(pool: &PgPool, order_id: i64, partner_id: i64) {
    sqlx::query("UPDATE orders SET affiliate_id = $2 WHERE id = $1")
        .bind(order_id)
        .bind(partner_id)
        .execute(pool)
        .await
        .expect("关联推荐人失败");
}

/// 插入一条指定账龄的金币流水
async fn seed_coin_entry(
    pool: &PgPool,
    user_id: i64,
    order_id: i64,
    amount: i64,
    tx_type: &str,
    days_ago: i64,
) {
    sqlx::query(
        r#"
        INSERT INTO coin_transactions
            (user_id, amount, tx_type, description, status, order_id, created_at)
        VALUES ($1, $2, $3, '', 'COMPLETED', $4, $5)
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .bind(tx_type)
    .bind(order_id)
    .bind(Utc::now() - Duration::days(days_ago))
    .execute(pool)
    .await
    .expect("插入金币流水失败");
}

async fn get_partner_state(pool: &PgPool, partner_id: i64) -> (i64, f64, f64) {
    sqlx::query_as(
        "SELECT total_referrals, total_earnings, pending_earnings FROM affiliate_partners WHERE id = $1",
    )
    .bind(partner_id)
    .fetch_one(pool)
    .await
    .expect("查询分销伙伴失败")
}

async fn cleanup_partner(pool: &PgPool, code: &str, phone: &str) {
    sqlx::query("DELETE FROM affiliate_partners WHERE code = $1")
        .bind(code)
        .execute(pool)
        .await
        .ok();
    sqlx::query("DELETE FROM users WHERE phone = $1")
        .bind(phone)
        .execute(pool)
        .await
        .ok();
}

async fn get_order_state(pool: &PgPool, order_number: &str) -> (String, bool) {
    sqlx::query_as("SELECT status, can_cancel FROM orders WHERE order_number = $1")
        .bind(order_number)
        .fetch_one(pool)
        .await
        .expect("查询订单状态失败")
}

async fn get_coin_balance(pool: &PgPool, user_id: i64) -> i64 {
    let (balance,): (i64,) = sqlx::query_as("SELECT coin_balance FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("查询余额失败");
    balance
}

/// 清理测试数据，按外键依赖顺序删除
async fn cleanup(pool: &PgPool, order_number: &str, phone: &str) {
    sqlx::query("DELETE FROM order_cancellations WHERE order_number = $1")
        .bind(order_number)
        .execute(pool)
        .await
        .ok();
    sqlx::query(
        "DELETE FROM coin_transactions WHERE order_id IN (SELECT id FROM orders WHERE order_number = $1)",
    )
    .bind(order_number)
    .execute(pool)
    .await
    .ok();
    sqlx::query("DELETE FROM notifications WHERE order_number = $1")
        .bind(order_number)
        .execute(pool)
        .await
        .ok();
    sqlx::query("DELETE FROM orders WHERE order_number = $1")
        .bind(order_number)
        .execute(pool)
        .await
        .ok();
    sqlx::query("DELETE FROM users WHERE phone = $1")
        .bind(phone)
        .execute(pool)
        .await
        .ok();
}

// ==================== 测试用例 ====================

/// 申请取消：已送达订单在窗口内申请，生成 PENDING 取消单并锁定订单
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_request_cancellation_creates_pending_record() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let order_number = "NEFOL-IT-9001";
    let phone = "+919800009001";

    cleanup(&pool, order_number, phone).await;
    let user_id = seed_user(&pool, phone, 100).await;
    seed_order(
        &pool,
        order_number,
        Some(user_id),
        phone,
        "DELIVERED",
        "RAZORPAY",
        Some("pay_it_9001"),
        0,
        Some(2),
    )
    .await;

    let svc = build_request_service(&pool);
    let record = svc
        .request_cancellation(CancelCommand {
            order_number: order_number.to_string(),
            contact: Some(phone.to_string()),
            reason: "质地不合适".to_string(),
            cancel_type: CancellationType::Full,
            items: None,
        })
        .await
        .expect("申请取消失败");

    assert_eq!(record.status, CancellationStatus::Pending);
    assert!((record.refund_amount - 998.0).abs() < f64::EPSILON);

    let (status, can_cancel) = get_order_state(&pool, order_number).await;
    assert_eq!(status, "DELIVERED");
    assert!(!can_cancel, "申请受理后订单应锁定");

    // 重复申请被拦截
    let err = svc
        .request_cancellation(CancelCommand {
            order_number: order_number.to_string(),
            contact: Some(phone.to_string()),
            reason: "再次申请".to_string(),
            cancel_type: CancellationType::Full,
            items: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::DuplicateCancellation { .. }));

    cleanup(&pool, order_number, phone).await;
}

/// 申请取消：超出送达窗口被拒绝
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_request_cancellation_rejects_expired_window() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let order_number = "NEFOL-IT-9002";
    let phone = "+919800009002";

    cleanup(&pool, order_number, phone).await;
    let user_id = seed_user(&pool, phone, 0).await;
    seed_order(
        &pool,
        order_number,
        Some(user_id),
        phone,
        "DELIVERED",
        "RAZORPAY",
        Some("pay_it_9002"),
        0,
        Some(6),
    )
    .await;

    let err = build_request_service(&pool)
        .request_cancellation(CancelCommand {
            order_number: order_number.to_string(),
            contact: Some(phone.to_string()),
            reason: "太晚了".to_string(),
            cancel_type: CancellationType::Full,
            items: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrderError::CancellationWindowExpired {
            days_since_delivery: 6,
            window_days: 5
        }
    ));

    cleanup(&pool, order_number, phone).await;
}

/// 立即取消：在途在线支付订单，退款走网关、金币退还到账
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_cancel_now_refunds_and_reverses_coins() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let order_number = "NEFOL-IT-9003";
    let phone = "+919800009003";

    cleanup(&pool, order_number, phone).await;
    let user_id = seed_user(&pool, phone, 100).await;
    seed_order(
        &pool,
        order_number,
        Some(user_id),
        phone,
        "SHIPPED",
        "RAZORPAY",
        Some("pay_it_9003"),
        50,
        None,
    )
    .await;

    let outcome = build_cancel_service(&pool, false)
        .cancel_now(CancelCommand {
            order_number: order_number.to_string(),
            contact: Some(phone.to_string()),
            reason: "不再需要".to_string(),
            cancel_type: CancellationType::Full,
            items: None,
        })
        .await
        .expect("立即取消失败");

    assert_eq!(outcome.refund.refund_status, RefundStatus::Processing);
    assert!(outcome.refund.refund_id.is_some());
    assert_eq!(outcome.reversals.coins, ReversalOutcome::Reversed { amount: 50 });

    let (status, can_cancel) = get_order_state(&pool, order_number).await;
    assert_eq!(status, "CANCELLED");
    assert!(!can_cancel);

    // 金币退还：100 + 50
    assert_eq!(get_coin_balance(&pool, user_id).await, 150);

    // 取消单已自动批准且带网关退款单号
    let repo = CancellationRepository::new(pool.clone());
    let record = repo
        .get(outcome.cancellation_id)
        .await
        .unwrap()
        .expect("取消单不存在");
    assert_eq!(record.status, CancellationStatus::Approved);
    assert_eq!(record.refund_status, RefundStatus::Processing);
    assert!(record.refund_id.is_some());

    cleanup(&pool, order_number, phone).await;
}

/// 立即取消：COD 订单不走网关，退款直接标记已处理
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_cancel_now_cod_marks_refund_processed() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let order_number = "NEFOL-IT-9004";
    let phone = "+919800009004";

    cleanup(&pool, order_number, phone).await;
    let user_id = seed_user(&pool, phone, 0).await;
    seed_order(
        &pool,
        order_number,
        Some(user_id),
        phone,
        "PROCESSING",
        "COD",
        None,
        0,
        None,
    )
    .await;

    let outcome = build_cancel_service(&pool, false)
        .cancel_now(CancelCommand {
            order_number: order_number.to_string(),
            contact: Some(phone.to_string()),
            reason: "重复下单".to_string(),
            cancel_type: CancellationType::Full,
            items: None,
        })
        .await
        .expect("立即取消失败");

    assert_eq!(outcome.refund.refund_status, RefundStatus::Processed);
    assert!(outcome.refund.refund_id.is_none());

    cleanup(&pool, order_number, phone).await;
}

/// 立即取消：网关失败时取消仍生效，退款标记 FAILED
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_cancel_now_gateway_failure_keeps_cancellation() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let order_number = "NEFOL-IT-9005";
    let phone = "+919800009005";

    cleanup(&pool, order_number, phone).await;
    let user_id = seed_user(&pool, phone, 0).await;
    seed_order(
        &pool,
        order_number,
        Some(user_id),
        phone,
        "SHIPPED",
        "RAZORPAY",
        Some("pay_it_9005"),
        0,
        None,
    )
    .await;

    let outcome = build_cancel_service(&pool, true)
        .cancel_now(CancelCommand {
            order_number: order_number.to_string(),
            contact: Some(phone.to_string()),
            reason: "不再需要".to_string(),
            cancel_type: CancellationType::Full,
            items: None,
        })
        .await
        .expect("取消本身不应因退款失败而报错");

    assert_eq!(outcome.refund.refund_status, RefundStatus::Failed);

    // 取消已生效且退款状态落库
    let (status, _) = get_order_state(&pool, order_number).await;
    assert_eq!(status, "CANCELLED");

    let repo = CancellationRepository::new(pool.clone());
    let record = repo.get(outcome.cancellation_id).await.unwrap().unwrap();
    assert_eq!(record.status, CancellationStatus::Approved);
    assert_eq!(record.refund_status, RefundStatus::Failed);

    cleanup(&pool, order_number, phone).await;
}

/// 审批流：批准后订单取消、退款发起；二次决策得到 AlreadyDecided
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_approve_then_second_decision_conflicts() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let order_number = "NEFOL-IT-9006";
    let phone = "+919800009006";

    cleanup(&pool, order_number, phone).await;
    let user_id = seed_user(&pool, phone, 0).await;
    seed_order(
        &pool,
        order_number,
        Some(user_id),
        phone,
        "DELIVERED",
        "RAZORPAY",
        Some("pay_it_9006"),
        0,
        Some(1),
    )
    .await;

    let record = build_request_service(&pool)
        .request_cancellation(CancelCommand {
            order_number: order_number.to_string(),
            contact: Some(phone.to_string()),
            reason: "过敏".to_string(),
            cancel_type: CancellationType::Full,
            items: None,
        })
        .await
        .expect("申请取消失败");

    let svc = build_decision_service(&pool);
    let outcome = svc
        .approve(DecisionCommand {
            cancellation_id: record.id,
            decided_by: "test_admin".to_string(),
            notes: Some("已核实".to_string()),
        })
        .await
        .expect("批准失败");

    assert_eq!(outcome.refund.refund_status, RefundStatus::Processing);

    let (status, _) = get_order_state(&pool, order_number).await;
    assert_eq!(status, "CANCELLED");

    // 已批准的取消单不可再次决策
    let err = svc
        .reject(DecisionCommand {
            cancellation_id: record.id,
            decided_by: "test_admin".to_string(),
            notes: Some("撤回".to_string()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::AlreadyDecided { .. }));

    cleanup(&pool, order_number, phone).await;
}

/// 审批流：驳回恢复订单可取消标记，客户可重新申请
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_reject_restores_can_cancel() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let order_number = "NEFOL-IT-9007";
    let phone = "+919800009007";

    cleanup(&pool, order_number, phone).await;
    let user_id = seed_user(&pool, phone, 0).await;
    seed_order(
        &pool,
        order_number,
        Some(user_id),
        phone,
        "DELIVERED",
        "RAZORPAY",
        Some("pay_it_9007"),
        0,
        Some(1),
    )
    .await;

    let request_svc = build_request_service(&pool);
    let record = request_svc
        .request_cancellation(CancelCommand {
            order_number: order_number.to_string(),
            contact: Some(phone.to_string()),
            reason: "买错了".to_string(),
            cancel_type: CancellationType::Full,
            items: None,
        })
        .await
        .expect("申请取消失败");

    let svc = build_decision_service(&pool);

    // 驳回必须填写备注
    let err = svc
        .reject(DecisionCommand {
            cancellation_id: record.id,
            decided_by: "test_admin".to_string(),
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Validation(_)));

    let rejected = svc
        .reject(DecisionCommand {
            cancellation_id: record.id,
            decided_by: "test_admin".to_string(),
            notes: Some("商品已使用，不符合退货条件".to_string()),
        })
        .await
        .expect("驳回失败");

    assert_eq!(rejected.status, CancellationStatus::Rejected);
    assert_eq!(rejected.processed_by.as_deref(), Some("test_admin"));

    let (status, can_cancel) = get_order_state(&pool, order_number).await;
    assert_eq!(status, "DELIVERED", "驳回不改变履约状态");
    assert!(can_cancel, "驳回后应恢复可取消标记");

    // 恢复后可重新申请
    let again = request_svc
        .request_cancellation(CancelCommand {
            order_number: order_number.to_string(),
            contact: Some(phone.to_string()),
            reason: "重新申请".to_string(),
            cancel_type: CancellationType::Full,
            items: None,
        })
        .await
        .expect("重新申请失败");
    assert_eq!(again.status, CancellationStatus::Pending);

    cleanup(&pool, order_number, phone).await;
}

/// 立即取消：已送达订单被引导到申请流程
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_cancel_now_redirects_delivered_order() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let order_number = "NEFOL-IT-9008";
    let phone = "+919800009008";

    cleanup(&pool, order_number, phone).await;
    let user_id = seed_user(&pool, phone, 0).await;
    seed_order(
        &pool,
        order_number,
        Some(user_id),
        phone,
        "DELIVERED",
        "RAZORPAY",
        Some("pay_it_9008"),
        0,
        Some(1),
    )
    .await;

    let err = build_cancel_service(&pool, false)
        .cancel_now(CancelCommand {
            order_number: order_number.to_string(),
            contact: Some(phone.to_string()),
            reason: "不再需要".to_string(),
            cancel_type: CancellationType::Full,
            items: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::UseRequestPath { .. }));

    cleanup(&pool, order_number, phone).await;
}

/// 佣金冲正：8 天窗口内的佣金流水被回收，推荐人余额与聚合计数同步扣减
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_referral_commission_within_window_reversed() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let order_number = "NEFOL-IT-9009";
    let phone = "+919800009009";
    let partner_phone = "+919800009109";
    let partner_code = "ITEST9009";

    cleanup(&pool, order_number, phone).await;
    cleanup_partner(&pool, partner_code, partner_phone).await;

    let user_id = seed_user(&pool, phone, 0).await;
    let partner_user_id = seed_user(&pool, partner_phone, 100).await;
    let partner_id = seed_partner(&pool, partner_user_id, partner_code).await;
    let order_id = seed_order(
        &pool,
        order_number,
        Some(user_id),
        phone,
        "PROCESSING",
        "COD",
        None,
        0,
        None,
    )
    .await;
    set_order_affiliate(&pool, order_id, partner_id).await;
    // 发放于 7 天前，仍在 8 天回收窗口内
    seed_coin_entry(&pool, partner_user_id, order_id, 30, "REFERRAL_COMMISSION", 7).await;

    let outcome = build_cancel_service(&pool, false)
        .cancel_now(CancelCommand {
            order_number: order_number.to_string(),
            contact: Some(phone.to_string()),
            reason: "不再需要".to_string(),
            cancel_type: CancellationType::Full,
            items: None,
        })
        .await
        .expect("立即取消失败");

    assert_eq!(
        outcome.reversals.referral_commission,
        ReversalOutcome::Reversed { amount: 30 }
    );

    // 佣金 30 金币从推荐人余额扣回
    assert_eq!(get_coin_balance(&pool, partner_user_id).await, 70);

    // 聚合计数同步冲正：推荐数 -1，收益按 30 金币折 ₹3 扣减
    let (total_referrals, total_earnings, pending_earnings) =
        get_partner_state(&pool, partner_id).await;
    assert_eq!(total_referrals, 4);
    assert!((total_earnings - 497.0).abs() < f64::EPSILON);
    assert!((pending_earnings - 197.0).abs() < f64::EPSILON);

    cleanup(&pool, order_number, phone).await;
    cleanup_partner(&pool, partner_code, partner_phone).await;
}

/// 佣金冲正：超出 8 天窗口的佣金流水不回收
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_referral_commission_outside_window_untouched() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let order_number = "NEFOL-IT-9010";
    let phone = "+919800009010";
    let partner_phone = "+919800009110";
    let partner_code = "ITEST9010";

    cleanup(&pool, order_number, phone).await;
    cleanup_partner(&pool, partner_code, partner_phone).await;

    let user_id = seed_user(&pool, phone, 0).await;
    let partner_user_id = seed_user(&pool, partner_phone, 100).await;
    let partner_id = seed_partner(&pool, partner_user_id, partner_code).await;
    let order_id = seed_order(
        &pool,
        order_number,
        Some(user_id),
        phone,
        "PROCESSING",
        "COD",
        None,
        0,
        None,
    )
    .await;
    set_order_affiliate(&pool, order_id, partner_id).await;
    // 发放于 9 天前，已出窗口
    seed_coin_entry(&pool, partner_user_id, order_id, 30, "REFERRAL_COMMISSION", 9).await;

    let outcome = build_cancel_service(&pool, false)
        .cancel_now(CancelCommand {
            order_number: order_number.to_string(),
            contact: Some(phone.to_string()),
            reason: "不再需要".to_string(),
            cancel_type: CancellationType::Full,
            items: None,
        })
        .await
        .expect("立即取消失败");

    assert_eq!(
        outcome.reversals.referral_commission,
        ReversalOutcome::NothingToReverse
    );

    // 余额与聚合计数保持原值
    assert_eq!(get_coin_balance(&pool, partner_user_id).await, 100);
    let (total_referrals, total_earnings, _) = get_partner_state(&pool, partner_id).await;
    assert_eq!(total_referrals, 5);
    assert!((total_earnings - 500.0).abs() < f64::EPSILON);

    cleanup(&pool, order_number, phone).await;
    cleanup_partner(&pool, partner_code, partner_phone).await;
}

/// 返现冲正：不受时间窗口限制，陈年流水照样回收
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_cashback_reversed_regardless_of_age() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let order_number = "NEFOL-IT-9011";
    let phone = "+919800009011";

    cleanup(&pool, order_number, phone).await;
    let user_id = seed_user(&pool, phone, 100).await;
    let order_id = seed_order(
        &pool,
        order_number,
        Some(user_id),
        phone,
        "PROCESSING",
        "COD",
        None,
        0,
        None,
    )
    .await;
    // 30 天前的返现，仍应回收
    seed_coin_entry(&pool, user_id, order_id, 20, "CASHBACK", 30).await;

    let outcome = build_cancel_service(&pool, false)
        .cancel_now(CancelCommand {
            order_number: order_number.to_string(),
            contact: Some(phone.to_string()),
            reason: "不再需要".to_string(),
            cancel_type: CancellationType::Full,
            items: None,
        })
        .await
        .expect("立即取消失败");

    assert_eq!(
        outcome.reversals.cashback,
        ReversalOutcome::Reversed { amount: 20 }
    );
    assert_eq!(get_coin_balance(&pool, user_id).await, 80);

    cleanup(&pool, order_number, phone).await;
}
