use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::application::ports::feed_gateway::{FeedGateway, FeedLocation, NearbyQuery};
use crate::application::ports::handoff::PendingPostSlot;
use crate::application::ports::location::LocationResolver;
use crate::application::ports::snapshot_cache::SnapshotStore;
use crate::application::services::freshness_policy::FreshnessPolicy;
use crate::application::services::refresh_scheduler::{RefreshCycle, RefreshScheduler};
use crate::domain::entities::{FeedSnapshot, Post};
use crate::domain::value_objects::{Coordinates, Hashtag};
use crate::shared::config::FeedConfig;

/// 初期ロード失敗時に表示する位置ラベル
pub const LOCATION_UNAVAILABLE_LABEL: &str = "unavailable";

/// UI へ押し出すフィードイベント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// 新着が控えており、バナー表示を要求する
    NewPostsAvailable { count: usize },
    /// ステージ済みデータが破棄されたのでバナーを隠してよい
    BannerDismissed,
    /// コミット後にリストを先頭へスクロールする
    ScrollToTop,
}

/// フィード画面の表示モード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FeedMode {
    Nearby,
    Hashtag { tag: Hashtag },
}

/// 3系統のビュー射影と表示メタデータ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedViewState {
    pub all: Vec<Post>,
    pub filtered: Vec<Post>,
    pub displayed: Vec<Post>,
    pub location_label: String,
    pub search: Option<String>,
    pub mode: FeedMode,
    /// 最後にデータを確定適用した時刻(エポックミリ秒)
    pub last_fetch_at: i64,
}

impl Default for FeedViewState {
    fn default() -> Self {
        Self {
            all: Vec::new(),
            filtered: Vec::new(),
            displayed: Vec::new(),
            location_label: String::new(),
            search: None,
            mode: FeedMode::Nearby,
            last_fetch_at: 0,
        }
    }
}

/// バックグラウンド比較で見つかった、未適用のフェッチ結果
struct StagedPosts {
    posts: Vec<Post>,
    location: Option<FeedLocation>,
}

/// ホームフィードのオーケストレータ
///
/// キャッシュ優先の初期ロード、強制リフレッシュ、バックグラウンド比較の
/// ステージング、バナー経由のコミットを調停する。永続スナップショットへの
/// 書き込みはここからのみ行い、バックグラウンド側は読み比べるだけ。
pub struct FeedService {
    gateway: Arc<dyn FeedGateway>,
    location: Arc<dyn LocationResolver>,
    cache: Arc<dyn SnapshotStore>,
    handoff: Arc<dyn PendingPostSlot>,
    policy: FreshnessPolicy,
    config: FeedConfig,
    scheduler: Arc<RefreshScheduler>,
    state: RwLock<FeedViewState>,
    /// 最後に画面へ確定適用したスナップショット(新着比較の基準)
    committed: RwLock<Option<FeedSnapshot>>,
    staged: RwLock<Option<StagedPosts>>,
    event_tx: mpsc::UnboundedSender<FeedEvent>,
}

impl FeedService {
    pub fn new(
        gateway: Arc<dyn FeedGateway>,
        location: Arc<dyn LocationResolver>,
        cache: Arc<dyn SnapshotStore>,
        handoff: Arc<dyn PendingPostSlot>,
        config: FeedConfig,
        event_tx: mpsc::UnboundedSender<FeedEvent>,
    ) -> Self {
        let policy = FreshnessPolicy::new(config.cache.stale_after_secs);
        let scheduler = Arc::new(RefreshScheduler::new(Duration::from_secs(
            config.refresh.interval_secs,
        )));
        Self {
            gateway,
            location,
            cache,
            handoff,
            policy,
            config,
            scheduler,
            state: RwLock::new(FeedViewState::default()),
            committed: RwLock::new(None),
            staged: RwLock::new(None),
            event_tx,
        }
    }

    /// 画面マウント時の初期ロード
    ///
    /// ハッシュタグ指定時はキャッシュもタイマーも使わない。
    /// 受け渡しスロットに投稿があればそのサイクルはキャッシュ読込と
    /// ネットワークを飛ばして先頭に挿し込む。それ以外はキャッシュ優先で、
    /// 無ければネットワークへフォールバックする。
    pub async fn load_initial(self: &Arc<Self>, filter: Option<Hashtag>) -> FeedViewState {
        if let Some(tag) = filter {
            self.load_hashtag(tag).await;
            return self.view_state().await;
        }

        if let Some(post) = self.handoff.take().await {
            self.apply_optimistic_insert(post).await;
            return self.view_state().await;
        }

        match self.cache.load().await {
            Some(snapshot) if !snapshot.is_empty() => {
                self.apply_cached_snapshot(snapshot).await;
            }
            _ => {
                self.load_from_network().await;
            }
        }
        self.view_state().await
    }

    /// 強制リフレッシュ(プルリフレッシュ、フィルタ解除)
    ///
    /// キャッシュをバイパスしてフェッチし、スナップショットを上書きする。
    /// ステージ済みデータは破棄され、バナーは消える。
    pub async fn refresh(self: &Arc<Self>) -> FeedViewState {
        self.discard_staged().await;
        self.load_from_network().await;
        self.view_state().await
    }

    /// ハッシュタグフィルタの切り替え。None はフィルタ解除で、強制リフレッシュに等しい
    pub async fn set_hashtag_filter(self: &Arc<Self>, filter: Option<Hashtag>) -> FeedViewState {
        match filter {
            Some(tag) => {
                self.load_hashtag(tag).await;
                self.view_state().await
            }
            None => self.refresh().await,
        }
    }

    /// 「新着あり」バナーのタップ。ステージ済みデータを確定適用する
    pub async fn commit_staged(&self) -> FeedViewState {
        let staged = self.staged.write().await.take();
        let Some(staged) = staged else {
            return self.view_state().await;
        };

        let label = match staged.location.as_ref() {
            Some(location) => location.label(),
            None => self.state.read().await.location_label.clone(),
        };
        info!(posts = staged.posts.len(), "committing staged feed posts");
        self.apply_fetched(staged.posts, label, FeedMode::Nearby, true)
            .await;
        let _ = self.event_tx.send(FeedEvent::ScrollToTop);
        self.view_state().await
    }

    /// 検索クエリを適用し filtered / displayed 射影を作り直す
    pub async fn apply_search(&self, query: Option<String>) -> FeedViewState {
        {
            let mut state = self.state.write().await;
            state.search = query
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty());
            let posts = state.all.clone();
            Self::project(&mut state, posts);
        }
        self.view_state().await
    }

    /// 画面アンマウント時に呼ぶ。以後のバックグラウンド tick を止める
    pub async fn shutdown(&self) {
        self.scheduler.stop().await;
    }

    pub async fn view_state(&self) -> FeedViewState {
        self.state.read().await.clone()
    }

    /// 「新着あり」バナーを出すべきか
    pub async fn banner_visible(&self) -> bool {
        self.staged.read().await.is_some()
    }

    pub fn is_background_refresh_running(&self) -> bool {
        self.scheduler.is_running()
    }

    async fn load_hashtag(self: &Arc<Self>, tag: Hashtag) {
        // ハッシュタグ表示中はバックグラウンド更新もバナーも使わない
        self.scheduler.stop().await;
        self.discard_staged().await;

        match self
            .gateway
            .fetch_hashtag(&tag, self.config.query.page_size)
            .await
        {
            Ok(page) => {
                let label = page.location_label();
                info!(tag = %tag, posts = page.posts.len(), "hashtag feed loaded");
                self.apply_fetched(page.posts, label, FeedMode::Hashtag { tag }, false)
                    .await;
            }
            Err(err) => {
                warn!(tag = %tag, error = %err, "hashtag feed fetch failed");
                self.apply_empty_state(FeedMode::Hashtag { tag }).await;
            }
        }
    }

    async fn load_from_network(self: &Arc<Self>) {
        let coords = self.resolve_coordinates().await;
        match self.gateway.fetch_nearby(self.nearby_query(coords)).await {
            Ok(page) => {
                let label = page.location_label();
                info!(posts = page.posts.len(), label = %label, "nearby feed loaded");
                self.apply_fetched(page.posts, label, FeedMode::Nearby, true)
                    .await;
                self.start_background_refresh().await;
            }
            Err(err) => {
                warn!(error = %err, "nearby feed fetch failed");
                self.apply_empty_state(FeedMode::Nearby).await;
            }
        }
    }

    async fn apply_cached_snapshot(self: &Arc<Self>, snapshot: FeedSnapshot) {
        info!(
            posts = snapshot.posts.len(),
            age_secs = snapshot.age_seconds(),
            "feed served from cache"
        );
        {
            let mut state = self.state.write().await;
            state.mode = FeedMode::Nearby;
            state.location_label = snapshot.location_label.clone();
            state.last_fetch_at = snapshot.captured_at;
            let posts = snapshot.posts.clone();
            Self::project(&mut state, posts);
        }
        let captured_at = snapshot.captured_at;
        *self.committed.write().await = Some(snapshot);

        self.start_background_refresh().await;
        if self.policy.is_stale(captured_at) {
            debug!("cached snapshot is stale, running an immediate compare cycle");
            let cycle: Arc<dyn RefreshCycle> = self.clone();
            self.scheduler.trigger(cycle);
        }
    }

    async fn apply_optimistic_insert(self: &Arc<Self>, post: Post) {
        info!(post_id = %post.id, "prepending locally created post");
        {
            let mut state = self.state.write().await;
            state.mode = FeedMode::Nearby;
            let mut posts = state.all.clone();
            posts.insert(0, post.clone());
            Self::project(&mut state, posts);
        }
        self.cache.append_one(&post).await;

        // 比較基準にも載せておく。自分の投稿がサーバから返り始めても
        // 新着として誤検出しないようにするため。
        {
            let mut committed = self.committed.write().await;
            if let Some(snapshot) = committed.as_mut() {
                snapshot.posts.insert(0, post.clone());
                snapshot.lead_post_id = Some(post.id.clone());
            } else {
                let label = self.state.read().await.location_label.clone();
                *committed = Some(FeedSnapshot::capture(vec![post.clone()], label));
            }
        }

        self.start_background_refresh().await;

        // 少し置いてからサーバの正とすり合わせる(非ブロッキング)
        let service = Arc::clone(self);
        let delay = Duration::from_secs(self.config.refresh.reconcile_delay_secs);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let cycle: Arc<dyn RefreshCycle> = service.clone();
            service.scheduler.trigger(cycle);
        });
    }

    async fn apply_fetched(
        &self,
        posts: Vec<Post>,
        location_label: String,
        mode: FeedMode,
        persist: bool,
    ) {
        let is_nearby = matches!(mode, FeedMode::Nearby);
        let snapshot = FeedSnapshot::capture(posts, location_label.clone());
        {
            let mut state = self.state.write().await;
            state.mode = mode;
            state.location_label = location_label.clone();
            state.last_fetch_at = snapshot.captured_at;
            let posts = snapshot.posts.clone();
            Self::project(&mut state, posts);
        }
        if persist {
            self.cache.save(&snapshot.posts, &location_label).await;
        }
        if is_nearby {
            *self.committed.write().await = Some(snapshot);
        }
    }

    async fn apply_empty_state(&self, mode: FeedMode) {
        let mut state = self.state.write().await;
        state.mode = mode;
        state.location_label = LOCATION_UNAVAILABLE_LABEL.to_string();
        Self::project(&mut state, Vec::new());
    }

    async fn discard_staged(&self) {
        let had_staged = self.staged.write().await.take().is_some();
        if had_staged {
            let _ = self.event_tx.send(FeedEvent::BannerDismissed);
        }
    }

    /// 上限付きで現在地を解決し、失敗・超過時はデフォルト座標に落とす
    async fn resolve_coordinates(&self) -> Coordinates {
        let wait = Duration::from_secs(self.config.location.resolve_timeout_secs);
        match tokio::time::timeout(wait, self.location.resolve()).await {
            Ok(Ok(coords)) => coords,
            Ok(Err(err)) => {
                debug!(error = %err, "location resolution failed, using default coordinates");
                self.default_coordinates()
            }
            Err(_) => {
                debug!("location resolution timed out, using default coordinates");
                self.default_coordinates()
            }
        }
    }

    fn default_coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.config.location.default_latitude,
            longitude: self.config.location.default_longitude,
        }
    }

    fn nearby_query(&self, center: Coordinates) -> NearbyQuery {
        NearbyQuery {
            center,
            radius_km: self.config.query.radius_km,
            limit: self.config.query.page_size,
        }
    }

    async fn start_background_refresh(self: &Arc<Self>) {
        let cycle: Arc<dyn RefreshCycle> = self.clone();
        self.scheduler.start(cycle).await;
    }

    fn project(state: &mut FeedViewState, posts: Vec<Post>) {
        state.all = posts;
        state.filtered = match state.search.as_deref() {
            Some(query) => filter_posts(&state.all, query),
            None => state.all.clone(),
        };
        state.displayed = state.filtered.clone();
    }
}

#[async_trait]
impl RefreshCycle for FeedService {
    /// サイレント再取得と比較。表示中リストと永続スナップショットには触れない
    async fn run_cycle(&self) {
        if !matches!(self.state.read().await.mode, FeedMode::Nearby) {
            return;
        }

        let coords = self.resolve_coordinates().await;
        let page = match self.gateway.fetch_nearby(self.nearby_query(coords)).await {
            Ok(page) => page,
            Err(err) => {
                debug!(error = %err, "background fetch failed, next tick will retry");
                return;
            }
        };

        // タイマー停止後に完了した分は捨てる
        if !self.scheduler.is_running() {
            debug!("discarding background fetch result after stop");
            return;
        }

        let new_count = {
            let committed = self.committed.read().await;
            match committed.as_ref() {
                Some(snapshot) if self.policy.has_newer_posts(snapshot, &page.posts) => {
                    let cached_ids: HashSet<&str> = snapshot
                        .posts
                        .iter()
                        .map(|post| post.id.as_str())
                        .collect();
                    page.posts
                        .iter()
                        .filter(|post| !cached_ids.contains(post.id.as_str()))
                        .count()
                }
                _ => 0,
            }
        };

        if new_count == 0 {
            debug!("background fetch found no new posts");
            return;
        }

        info!(new_posts = new_count, "staging background fetch result");
        *self.staged.write().await = Some(StagedPosts {
            posts: page.posts,
            location: page.location,
        });
        let _ = self.event_tx.send(FeedEvent::NewPostsAvailable { count: new_count });
    }
}

fn filter_posts(posts: &[Post], query: &str) -> Vec<Post> {
    let needle = query.to_lowercase();
    posts
        .iter()
        .filter(|post| {
            post.content.to_lowercase().contains(&needle)
                || post.author.display_name.to_lowercase().contains(&needle)
                || post
                    .hashtags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}
