use serde::{Deserialize, Serialize};

/// 地理座標
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("Invalid latitude: {latitude}"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("Invalid longitude: {longitude}"));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// 現在地が解決できないときに使う中立座標
    pub fn neutral() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
        }
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::neutral()
    }
}
