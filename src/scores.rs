use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use url::Url;

// ── Feed types ─────────────────────────────────────────────────────────────

/// One match as returned by the cricket-data API. Missing fields default so a
/// sparse upstream payload still renders.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Match {
    pub name: String,
    pub match_type: String,
    pub status: String,
    pub venue: String,
    pub date: String,
    pub teams: Vec<String>,
    pub score: Vec<Innings>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Innings {
    pub inning: String,
    #[serde(rename = "r")]
    pub runs: u32,
    #[serde(rename = "w")]
    pub wickets: u32,
    #[serde(rename = "o")]
    pub overs: f64,
}

impl Innings {
    /// e.g. "182/6 (20 ov)"
    pub fn summary(&self) -> String {
        format!("{}/{} ({} ov)", self.runs, self.wickets, self.overs)
    }
}

#[derive(Debug, Deserialize)]
struct Feed {
    status: String,
    #[serde(default)]
    data: Vec<Match>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScoreSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub matches: Vec<Match>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScoresError {
    #[error("invalid feed endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed returned status '{status}': {reason}")]
    Upstream { status: String, reason: String },
}

// ── Filtering ──────────────────────────────────────────────────────────────

/// Keep matches whose status contains `needle`, ignoring case. An empty or
/// blank needle keeps everything.
pub fn filter_by_status<'a>(matches: &'a [Match], needle: &str) -> Vec<&'a Match> {
    let needle = needle.trim().to_lowercase();
    matches
        .iter()
        .filter(|m| needle.is_empty() || m.status.to_lowercase().contains(&needle))
        .collect()
}

// ── Source ─────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ScoreSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<Vec<Match>, ScoresError>;
}

/// HTTP client for the cricket-data endpoint.
#[derive(Debug, Clone)]
pub struct ScoreClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl ScoreClient {
    pub fn new(
        endpoint: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ScoresError> {
        let mut endpoint = Url::parse(endpoint)?;
        if let Some(key) = api_key {
            endpoint.query_pairs_mut().append_pair("apikey", key);
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl ScoreSource for ScoreClient {
    async fn fetch(&self) -> Result<Vec<Match>, ScoresError> {
        let feed: Feed = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if feed.status != "success" {
            return Err(ScoresError::Upstream {
                status: feed.status,
                reason: feed.reason.unwrap_or_default(),
            });
        }
        Ok(feed.data)
    }
}

// ── Poller ─────────────────────────────────────────────────────────────────

/// Fixed-interval background poller.
///
/// Polls run one after another inside a single task, so an older response can
/// never replace a newer one. The task stops when the handle is shut down or
/// dropped.
pub struct ScorePoller;

impl ScorePoller {
    pub fn spawn<S: ScoreSource>(source: S, every: Duration) -> PollerHandle {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run(source, every, snapshot_tx, shutdown_rx));

        PollerHandle {
            snapshots: snapshot_rx,
            shutdown: shutdown_tx,
            task,
        }
    }
}

async fn run<S: ScoreSource>(
    source: S,
    every: Duration,
    snapshot_tx: watch::Sender<Option<ScoreSnapshot>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            _ = ticker.tick() => {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = source.fetch() => match result {
                        Ok(matches) => {
                            tracing::debug!("Score feed returned {} match(es)", matches.len());
                            snapshot_tx.send_replace(Some(ScoreSnapshot {
                                fetched_at: Utc::now(),
                                matches,
                            }));
                        }
                        // Keep showing the previous snapshot
                        Err(e) => tracing::warn!("Score feed poll failed: {}", e),
                    },
                }
            }
        }
    }

    tracing::debug!("Score poller stopped");
}

/// Owner of a running [`ScorePoller`]. Dropping it stops the task.
pub struct PollerHandle {
    snapshots: watch::Receiver<Option<ScoreSnapshot>>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Most recent successful poll, if any has completed.
    pub fn latest(&self) -> Option<ScoreSnapshot> {
        self.snapshots.borrow().clone()
    }

    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<Option<ScoreSnapshot>> {
        self.snapshots.clone()
    }

    /// Stop polling and wait for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::error!("Score poller task failed: {:?}", e);
        }
    }
}
