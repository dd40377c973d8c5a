use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub cache: CacheConfig,
    pub refresh: RefreshConfig,
    pub location: LocationConfig,
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// キャッシュを陳腐化とみなすまでの秒数
    pub stale_after_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// バックグラウンド再取得の周期(秒)
    pub interval_secs: u64,
    /// 楽観的挿入後に整合サイクルを走らせるまでの遅延(秒)
    pub reconcile_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// 現在地解決を待つ上限(秒)。超過時はデフォルト座標に落とす
    pub resolve_timeout_secs: u64,
    pub default_latitude: f64,
    pub default_longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub radius_km: f64,
    pub page_size: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig {
                stale_after_secs: 90,
            },
            refresh: RefreshConfig {
                interval_secs: 60,
                reconcile_delay_secs: 5,
            },
            location: LocationConfig {
                resolve_timeout_secs: 10,
                default_latitude: 0.0,
                default_longitude: 0.0,
            },
            query: QueryConfig {
                radius_km: 50.0,
                page_size: 20,
            },
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> Self {
        // 既定値
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("MACHIKADO_STALE_AFTER_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.cache.stale_after_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("MACHIKADO_REFRESH_INTERVAL_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.refresh.interval_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("MACHIKADO_RECONCILE_DELAY_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.refresh.reconcile_delay_secs = value;
            }
        }
        if let Ok(v) = std::env::var("MACHIKADO_LOCATION_TIMEOUT_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.location.resolve_timeout_secs = value;
            }
        }
        if let Ok(v) = std::env::var("MACHIKADO_QUERY_RADIUS_KM") {
            if let Some(value) = parse_f64(&v) {
                if value > 0.0 {
                    cfg.query.radius_km = value;
                }
            }
        }
        if let Ok(v) = std::env::var("MACHIKADO_QUERY_PAGE_SIZE") {
            if let Some(value) = parse_u64(&v) {
                cfg.query.page_size = (value.max(1)).min(u32::MAX as u64) as u32;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.cache.stale_after_secs == 0 {
            return Err("Cache stale_after_secs must be greater than 0".to_string());
        }
        if self.refresh.interval_secs == 0 {
            return Err("Refresh interval_secs must be greater than 0".to_string());
        }
        if self.query.page_size == 0 {
            return Err("Query page_size must be greater than 0".to_string());
        }
        if self.query.radius_km <= 0.0 {
            return Err("Query radius_km must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = FeedConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.cache.stale_after_secs, 90);
        assert_eq!(cfg.refresh.interval_secs, 60);
        assert_eq!(cfg.location.resolve_timeout_secs, 10);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut cfg = FeedConfig::default();
        cfg.refresh.interval_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_radius() {
        let mut cfg = FeedConfig::default();
        cfg.query.radius_km = 0.0;
        assert!(cfg.validate().is_err());
    }
}
