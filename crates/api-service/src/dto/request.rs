//! 请求 DTO 定义

use nefol_orders::{CancelItem, CancellationStatus, CancellationType};
use serde::Deserialize;
use validator::Validate;

/// 取消请求体（申请取消与立即取消共用）
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    /// 请求者联系方式（下单电话或邮箱）；提供时校验订单归属，可不填
    #[serde(default)]
    #[validate(length(max = 128, message = "联系方式不超过 128 字"))]
    pub contact: Option<String>,

    #[validate(length(min = 1, max = 500, message = "取消原因不能为空且不超过 500 字"))]
    pub reason: String,

    /// 取消类型，缺省为全单取消
    #[serde(default)]
    pub cancel_type: CancellationType,

    /// 部分取消的行项目
    #[serde(default)]
    pub items: Option<Vec<CancelItem>>,
}

/// 管理员审批请求体
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    /// 审批人标识（后台账号名）
    #[validate(length(min = 1, max = 64, message = "审批人标识不能为空"))]
    pub decided_by: String,

    /// 审批备注；驳回时必填（由服务层校验）
    #[serde(default)]
    #[validate(length(max = 500, message = "备注不超过 500 字"))]
    pub notes: Option<String>,
}

/// 取消单列表查询参数
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationListQuery {
    /// 按状态过滤，缺省返回全部
    #[serde(default)]
    pub status: Option<CancellationStatus>,

    #[serde(default = "default_page")]
    pub page: i64,

    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

impl CancellationListQuery {
    /// 归一化分页参数，page_size 封顶 100 防止全表拉取
    pub fn normalized(&self) -> (i64, i64) {
        (self.page.max(1), self.page_size.clamp(1, 100))
    }
}
