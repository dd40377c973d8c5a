use async_trait::async_trait;

use crate::application::ports::location::LocationResolver;
use crate::domain::value_objects::Coordinates;
use crate::shared::error::AppError;

/// 固定座標を返すリゾルバ(デスクトップ・テスト用)
pub struct StaticLocationResolver {
    coordinates: Coordinates,
}

impl StaticLocationResolver {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationResolver for StaticLocationResolver {
    async fn resolve(&self) -> Result<Coordinates, AppError> {
        Ok(self.coordinates)
    }
}
