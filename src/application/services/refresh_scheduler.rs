use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// 1回分の再取得・比較サイクル
#[async_trait]
pub trait RefreshCycle: Send + Sync {
    async fn run_cycle(&self);
}

/// 定期的なサイレント再取得を駆動するタイマー
///
/// Stopped と Running の2状態。tick は重ねない:
/// 前のサイクルが未完了の間に来た tick はスキップされる(キューしない)。
/// stop() は以後の tick を止めるだけで、実行中のサイクルは完走する。
/// その結果は `is_running` の liveness チェックで破棄される。
pub struct RefreshScheduler {
    interval: Duration,
    running: AtomicBool,
    in_flight: Arc<AtomicBool>,
    stop_tx: Mutex<Option<watch::Sender<bool>>>,
}

impl RefreshScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: AtomicBool::new(false),
            in_flight: Arc::new(AtomicBool::new(false)),
            stop_tx: Mutex::new(None),
        }
    }

    /// タイマーを開始する。既に Running なら何もしない。
    pub async fn start(self: &Arc<Self>, cycle: Arc<dyn RefreshCycle>) {
        let mut stop_slot = self.stop_tx.lock().await;
        if stop_slot.is_some() {
            return;
        }
        let (tx, mut rx) = watch::channel(false);
        *stop_slot = Some(tx);
        drop(stop_slot);
        self.running.store(true, Ordering::SeqCst);

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(scheduler.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval の最初の tick は即時発火するため読み捨てる
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = rx.changed() => break,
                }
                scheduler.fire(Arc::clone(&cycle));
            }
            debug!("feed refresh scheduler stopped");
        });
    }

    /// 以後の tick を止める
    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(tx) = self.stop_tx.lock().await.take() {
            let _ = tx.send(true);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// スケジュールを待たずに1サイクルを起動する
    ///
    /// 楽観的挿入後の整合や、陳腐化キャッシュ提示直後の即時比較に使う。
    /// Running でなければ何もしない。
    pub fn trigger(&self, cycle: Arc<dyn RefreshCycle>) {
        self.fire(cycle);
    }

    fn fire(&self, cycle: Arc<dyn RefreshCycle>) {
        if !self.is_running() {
            return;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("refresh tick skipped: previous cycle still in flight");
            return;
        }

        let in_flight = Arc::clone(&self.in_flight);
        tokio::spawn(async move {
            cycle.run_cycle().await;
            in_flight.store(false, Ordering::SeqCst);
        });
    }
}
