//! In-process key/value read service used to exercise readload end to end.
use axum::{
    extract::{ConnectInfo, Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use rand_distr::{Distribution, Normal};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Time spent on every row read.
    pub delay: Duration,
    /// Standard deviation of the read delay.
    pub jitter: Option<Duration>,
    /// Reads beyond this rate are answered with 503.
    pub max_tps: Option<NonZeroU32>,
    /// Keys that exist. `None` treats every key as present.
    pub keys: Option<HashSet<String>>,
}

#[derive(Debug, Default)]
pub struct Counters {
    served: AtomicU64,
    missed: AtomicU64,
    throttled: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    peers: Mutex<HashSet<SocketAddr>>,
}

impl Counters {
    pub fn served(&self) -> u64 {
        self.served.load(Ordering::SeqCst)
    }

    pub fn missed(&self) -> u64 {
        self.missed.load(Ordering::SeqCst)
    }

    pub fn throttled(&self) -> u64 {
        self.throttled.load(Ordering::SeqCst)
    }

    /// Total row requests answered, whatever the status.
    pub fn requests(&self) -> u64 {
        self.served() + self.missed() + self.throttled()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Distinct client connections that sent a row request.
    pub fn connections(&self) -> usize {
        self.peers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn enter(&self, peer: SocketAddr) -> InFlight<'_> {
        self.peers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(peer);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(self)
    }
}

struct InFlight<'a>(&'a Counters);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
struct AppState {
    config: Arc<MockConfig>,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
    counters: Arc<Counters>,
}

impl AppState {
    fn delay(&self) -> Duration {
        match self.config.jitter {
            Some(jitter) => {
                let Ok(normal) = Normal::new(
                    self.config.delay.as_secs_f64(),
                    jitter.as_secs_f64(),
                ) else {
                    return self.config.delay;
                };
                let v: f64 = normal.sample(&mut rand::thread_rng()).max(0.);
                Duration::from_secs_f64(v)
            }
            None => self.config.delay,
        }
    }
}

/// Serve with `into_make_service_with_connect_info::<SocketAddr>()`; row reads record the peer.
pub fn router(config: MockConfig) -> (Router, Arc<Counters>) {
    let counters = Arc::new(Counters::default());
    let state = AppState {
        limiter: config.max_tps.map(|tps| Arc::new(rate_limiter(tps))),
        config: Arc::new(config),
        counters: counters.clone(),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/tables/:table/rows/:key", get(read_row))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    (app, counters)
}

async fn health() -> &'static str {
    "ok"
}

async fn read_row(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path((table, key)): Path<(String, String)>,
) -> Result<String, StatusCode> {
    let _in_flight = state.counters.enter(peer);
    let delay = state.delay();
    tokio::time::sleep(delay).await;

    if let Some(limiter) = &state.limiter {
        if limiter.check().is_err() {
            debug!("Throttled read of {table}/{key}");
            state.counters.throttled.fetch_add(1, Ordering::SeqCst);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    match &state.config.keys {
        Some(keys) if !keys.contains(&key) => {
            state.counters.missed.fetch_add(1, Ordering::SeqCst);
            Err(StatusCode::NOT_FOUND)
        }
        _ => {
            state.counters.served.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{table}/{key}"))
        }
    }
}

pub fn rate_limiter(tps: NonZeroU32) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::per_second(tps))
}

/// A mock store serving on an ephemeral local port until dropped.
pub struct MockStore {
    addr: SocketAddr,
    counters: Arc<Counters>,
    handle: JoinHandle<()>,
}

impl MockStore {
    pub async fn spawn(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (app, counters) = router(config);

        let handle = tokio::spawn(async move {
            let app = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!("Mock store stopped: {err}");
            }
        });

        Ok(Self {
            addr,
            counters,
            handle,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }
}

impl Drop for MockStore {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve on `addr` until the process exits.
pub async fn run(addr: SocketAddr, config: MockConfig) -> std::io::Result<()> {
    let (app, _) = router(config);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
