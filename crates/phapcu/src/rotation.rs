//! Timed quote rotation with repeat suppression.
//!
//! [`RotationEngine`] is the stateful half of the crate. It owns the current
//! quote, a bounded window of recently shown ids and the timer task driving
//! automatic transitions. Engines move between three states: idle (nothing
//! selected), playing (timer armed) and paused (selection kept, timer off).
//! Construct one engine per rotation surface; there is no global instance.
//!
//! All methods take `&self` and the engine is `Send + Sync`, so shells can
//! share one behind an `Arc`. `start` and `resume` arm a timer task, as do
//! `next` and an interval change while playing, so those calls must happen
//! inside a tokio runtime; everything else is runtime-free.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::quote::Quote;

/// Shortest accepted rotation interval.
pub const MIN_INTERVAL: Duration = Duration::from_secs(5);
/// Longest accepted rotation interval.
pub const MAX_INTERVAL: Duration = Duration::from_secs(60);
/// Interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);
/// Recent-quote window used when none is configured.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Rotation only fails one way: there is nothing to select from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RotationError {
  #[error("cannot select a quote from an empty pool")]
  EmptyPool,
}

/// Engine configuration. Intervals outside
/// [`MIN_INTERVAL`]..=[`MAX_INTERVAL`] are clamped when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationConfig {
  pub interval: Duration,
  /// How many recently shown quotes are kept out of the draw
  pub recent_quotes_limit: usize,
}

impl Default for RotationConfig {
  fn default() -> Self {
    Self {
      interval: DEFAULT_INTERVAL,
      recent_quotes_limit: DEFAULT_RECENT_LIMIT,
    }
  }
}

impl RotationConfig {
  fn clamped(mut self) -> Self {
    self.interval = self.interval.clamp(MIN_INTERVAL, MAX_INTERVAL);
    self
  }
}

/// Snapshot of the engine, cheap enough to take per frame.
#[derive(Debug, Clone, Default)]
pub struct RotationState {
  pub current_quote: Option<Quote>,
  pub is_playing: bool,
  /// Oldest first; never longer than the configured window
  pub recent_quote_ids: Vec<Uuid>,
  pub next_transition_at: Option<DateTime<Utc>>,
}

type Subscriber = Arc<dyn Fn(&Quote) + Send + Sync>;

struct Inner {
  config: RotationConfig,
  current: Option<Quote>,
  playing: bool,
  recent: VecDeque<Uuid>,
  next_transition_at: Option<DateTime<Utc>>,
  pool: Option<Arc<Vec<Quote>>>,
  subscribers: Vec<Subscriber>,
  timer: Option<JoinHandle<()>>,
  epoch: u64,
}

impl Inner {
  fn remember(&mut self, id: Uuid) {
    self.recent.push_back(id);
    while self.recent.len() > self.config.recent_quotes_limit {
      self.recent.pop_front();
    }
  }
}

/// Rotating quote selector with a no-immediate-repeat window.
pub struct RotationEngine {
  inner: Arc<Mutex<Inner>>,
}

impl RotationEngine {
  pub fn new() -> Self {
    Self::with_config(RotationConfig::default())
  }

  pub fn with_config(config: RotationConfig) -> Self {
    Self {
      inner: Arc::new(Mutex::new(Inner {
        config: config.clamped(),
        current: None,
        playing: false,
        recent: VecDeque::new(),
        next_transition_at: None,
        pool: None,
        subscribers: Vec::new(),
        timer: None,
        epoch: 0,
      })),
    }
  }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// The configuration currently in effect, after clamping.
  pub fn config(&self) -> RotationConfig {
    self.lock().config
  }

  /// Replace the configuration. Changing the interval while playing tears
  /// the timer down and re-arms it at the new period immediately; the
  /// recent window is shrunk on the spot if the new limit is smaller.
  pub fn configure(&self, config: RotationConfig) {
    let mut inner = self.lock();
    let config = config.clamped();
    let interval_changed = config.interval != inner.config.interval;
    inner.config = config;
    while inner.recent.len() > inner.config.recent_quotes_limit {
      inner.recent.pop_front();
    }
    if inner.playing && interval_changed {
      inner.next_transition_at = Some(Utc::now() + inner.config.interval);
      arm_timer(&self.inner, &mut inner);
      debug!(interval = ?inner.config.interval, "rotation interval changed");
    }
  }

  /// Convenience for the one hot configuration field.
  pub fn set_interval(&self, interval: Duration) {
    let current = self.config();
    self.configure(RotationConfig { interval, ..current });
  }

  /// Register a transition observer. Subscribers run synchronously, in
  /// registration order, after every timer- or [`next`]-driven transition.
  /// The initial selection made by [`start`] is not announced; it is
  /// `start`'s return value.
  ///
  /// [`next`]: RotationEngine::next
  /// [`start`]: RotationEngine::start
  pub fn subscribe(&self, subscriber: impl Fn(&Quote) + Send + Sync + 'static) {
    self.lock().subscribers.push(Arc::new(subscriber));
  }

  /// Start rotating over `pool`: clear any previous history, pick a first
  /// quote, arm the timer and return the pick. Restarting while already
  /// playing is allowed and begins a fresh window.
  pub fn start(&self, pool: &Arc<Vec<Quote>>) -> Result<Quote, RotationError> {
    if pool.is_empty() {
      return Err(RotationError::EmptyPool);
    }
    let mut inner = self.lock();
    inner.recent.clear();
    let quote = select(pool, &inner.recent)?;
    inner.current = Some(quote.clone());
    inner.remember(quote.id);
    inner.playing = true;
    inner.pool = Some(Arc::clone(pool));
    inner.next_transition_at = Some(Utc::now() + inner.config.interval);
    arm_timer(&self.inner, &mut inner);
    debug!(quote = %quote.id, "rotation started");
    Ok(quote)
  }

  /// Pause the timer. The current quote and the recent window survive and a
  /// pending tick is cancelled for good. No-op unless playing.
  pub fn pause(&self) {
    let mut inner = self.lock();
    if !inner.playing {
      return;
    }
    disarm(&mut inner);
    inner.playing = false;
    inner.next_transition_at = None;
    debug!("rotation paused");
  }

  /// Resume a paused rotation with a full interval ahead of the next
  /// transition. No-op while playing, and from idle (nothing to rotate).
  pub fn resume(&self) {
    let mut inner = self.lock();
    if inner.playing || inner.pool.is_none() {
      return;
    }
    inner.playing = true;
    inner.next_transition_at = Some(Utc::now() + inner.config.interval);
    arm_timer(&self.inner, &mut inner);
    debug!("rotation resumed");
  }

  /// Stop rotating and return to the pre-[`start`] state: no current quote,
  /// empty history, no pool. Safe to call from any state.
  ///
  /// [`start`]: RotationEngine::start
  pub fn stop(&self) {
    let mut inner = self.lock();
    disarm(&mut inner);
    inner.playing = false;
    inner.current = None;
    inner.recent.clear();
    inner.next_transition_at = None;
    inner.pool = None;
    debug!("rotation stopped");
  }

  /// Advance to a new quote immediately, selecting from `pool`, and notify
  /// subscribers. Works from any state without starting playback; while
  /// playing, the countdown restarts at the full interval.
  pub fn next(&self, pool: &[Quote]) -> Result<Quote, RotationError> {
    let mut inner = self.lock();
    let quote = select(pool, &inner.recent)?;
    inner.current = Some(quote.clone());
    inner.remember(quote.id);
    if inner.playing {
      inner.next_transition_at = Some(Utc::now() + inner.config.interval);
      arm_timer(&self.inner, &mut inner);
    }
    let subscribers = inner.subscribers.clone();
    drop(inner);
    debug!(quote = %quote.id, "manual transition");
    for subscriber in &subscribers {
      subscriber(&quote);
    }
    Ok(quote)
  }

  /// The bare selection primitive: a uniform pick from `pool` excluding the
  /// recent window, falling back to the whole pool once everything in it is
  /// recent. Records nothing; [`start`] and [`next`] do the recording.
  ///
  /// [`start`]: RotationEngine::start
  /// [`next`]: RotationEngine::next
  pub fn random_quote(&self, pool: &[Quote]) -> Result<Quote, RotationError> {
    let inner = self.lock();
    select(pool, &inner.recent)
  }

  /// Snapshot of the current rotation state.
  pub fn state(&self) -> RotationState {
    let inner = self.lock();
    RotationState {
      current_quote: inner.current.clone(),
      is_playing: inner.playing,
      recent_quote_ids: inner.recent.iter().copied().collect(),
      next_transition_at: inner.next_transition_at,
    }
  }
}

impl Default for RotationEngine {
  fn default() -> Self {
    Self::new()
  }
}

impl Drop for RotationEngine {
  fn drop(&mut self) {
    disarm(&mut self.lock());
  }
}

// Kill the active timer. Bumping the epoch makes a tick from the old timer
// harmless even if it was already past its await when aborted.
fn disarm(inner: &mut Inner) {
  inner.epoch += 1;
  if let Some(timer) = inner.timer.take() {
    timer.abort();
  }
}

// Replace the active timer with a fresh one counting a full period from now.
fn arm_timer(shared: &Arc<Mutex<Inner>>, inner: &mut Inner) {
  disarm(inner);
  let epoch = inner.epoch;
  let period = inner.config.interval;
  let first_tick = tokio::time::Instant::now() + period;
  let weak = Arc::downgrade(shared);
  inner.timer = Some(tokio::spawn(async move {
    let mut ticker = tokio::time::interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
      ticker.tick().await;
      if !tick(&weak, epoch) {
        break;
      }
    }
  }));
}

// One timer beat. Returns false when the engine is gone or this timer has
// been superseded, which ends the task.
fn tick(weak: &Weak<Mutex<Inner>>, epoch: u64) -> bool {
  let Some(shared) = weak.upgrade() else {
    return false;
  };
  let mut inner = shared.lock().unwrap_or_else(PoisonError::into_inner);
  if inner.epoch != epoch || !inner.playing {
    return false;
  }
  let Some(pool) = inner.pool.clone() else {
    return false;
  };
  let Ok(quote) = select(&pool, &inner.recent) else {
    return false;
  };
  inner.current = Some(quote.clone());
  inner.remember(quote.id);
  inner.next_transition_at = Some(Utc::now() + inner.config.interval);
  let subscribers = inner.subscribers.clone();
  drop(inner);
  trace!(quote = %quote.id, "timer transition");
  for subscriber in &subscribers {
    subscriber(&quote);
  }
  true
}

// Uniform selection excluding the recent window; the whole pool becomes
// eligible again once every member is recent.
fn select(pool: &[Quote], recent: &VecDeque<Uuid>) -> Result<Quote, RotationError> {
  if pool.is_empty() {
    return Err(RotationError::EmptyPool);
  }
  let eligible: Vec<&Quote> = pool.iter().filter(|quote| !recent.contains(&quote.id)).collect();
  let candidates = if eligible.is_empty() { pool.iter().collect() } else { eligible };
  let index = rand::rng().random_range(0..candidates.len());
  Ok(candidates[index].clone())
}
