use async_trait::async_trait;

use crate::domain::value_objects::Coordinates;
use crate::shared::error::AppError;

/// 現在地を解決するポート
///
/// 権限拒否や解決失敗はエラーとして返す。呼び出し側が上限付きで待ち、
/// 失敗・超過時は中立座標へフォールバックする。
#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve(&self) -> Result<Coordinates, AppError>;
}
