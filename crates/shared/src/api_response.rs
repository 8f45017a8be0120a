//! # API レスポンスエンベロープ
//!
//! RPC エンドポイントの統一レスポンス形式 `{ "data": T }` を提供する。

use serde::{Deserialize, Serialize};

/// RPC エンドポイントの統一レスポンス型
///
/// 成功時のレスポンスはすべて `{ "data": T }` 形式で返す。
/// エラー時は [`ErrorResponse`](crate::ErrorResponse) を返す。
///
/// ## 使用例
///
/// ```
/// use mailflow_shared::ApiResponse;
///
/// let response = ApiResponse::new("hello");
/// assert_eq!(response.data, "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// 新しい `ApiResponse` を作成する
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
