//! 响应 DTO 定义
//!
//! 所有 REST API 的响应体结构

use serde::Serialize;

/// 分页响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    /// 创建分页响应
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

/// API 统一响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（自定义消息）
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// 创建失败响应（携带数据）
    ///
    /// 退款发起失败时使用：取消已生效，响应必须带回取消单信息
    pub fn failure_with_data(
        code: impl Into<String>,
        message: impl Into<String>,
        data: T,
    ) -> Self {
        Self {
            success: false,
            code: code.into(),
            message: message.into(),
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_response_total_pages() {
        let page = PageResponse::new(vec![1, 2, 3], 45, 1, 20);
        assert_eq!(page.total_pages, 3);

        let page = PageResponse::new(Vec::<i64>::new(), 0, 1, 20);
        assert_eq!(page.total_pages, 0);

        let page = PageResponse::new(vec![1], 40, 2, 20);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_api_response_serialization() {
        let json = serde_json::to_string(&ApiResponse::success(42)).unwrap();
        assert!(json.contains(r#""success":true"#));
        assert!(json.contains(r#""code":"SUCCESS""#));
        assert!(json.contains(r#""data":42"#));

        let json =
            serde_json::to_string(&ApiResponse::failure_with_data("REFUND_FAILED", "退款发起失败", 7))
                .unwrap();
        assert!(json.contains(r#""success":false"#));
        assert!(json.contains("REFUND_FAILED"));
        assert!(json.contains(r#""data":7"#));
    }
}
