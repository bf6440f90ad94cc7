use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use phapcu::quote::{Language, Quote, QuoteType};
use phapcu::rotation::{RotationConfig, RotationEngine};
use tokio::time::advance;
use uuid::Uuid;

#[cfg(test)]
mod rotation_timer_tests {
  use super::*;

  fn quote_pool(size: usize) -> Arc<Vec<Quote>> {
    Arc::new(
      (0..size)
        .map(|i| {
          Quote::new(
            &format!("Lời dạy thứ {i} về sự tĩnh lặng"),
            "Thích Nhất Hạnh",
            QuoteType::BuddhistQuote,
            "Thiền định",
            &["thiền"],
            Language::Vietnamese,
          )
        })
        .collect(),
    )
  }

  fn config(interval_secs: u64, recent_limit: usize) -> RotationConfig {
    RotationConfig {
      interval: Duration::from_secs(interval_secs),
      recent_quotes_limit: recent_limit,
    }
  }

  fn counting_subscriber(engine: &RotationEngine) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&calls);
    engine.subscribe(move |_| {
      sink.fetch_add(1, Ordering::SeqCst);
    });
    calls
  }

  fn current_id(engine: &RotationEngine) -> Option<Uuid> {
    engine.state().current_quote.map(|quote| quote.id)
  }

  #[tokio::test(start_paused = true)]
  async fn test_timer_advances_to_a_new_quote() {
    let engine = RotationEngine::with_config(config(5, 10));
    let pool = quote_pool(5);
    let initial = engine.start(&pool).unwrap();
    tokio::task::yield_now().await;

    advance(Duration::from_secs(5)).await;
    tokio::task::yield_now().await;

    let state = engine.state();
    let current = state.current_quote.expect("a quote should stay selected");
    assert_ne!(current.id, initial.id);
    assert_eq!(state.recent_quote_ids, vec![initial.id, current.id]);
    assert!(state.is_playing);
  }

  #[tokio::test(start_paused = true)]
  async fn test_timer_keeps_firing_every_interval() {
    let engine = RotationEngine::with_config(config(5, 10));
    let pool = quote_pool(6);
    let transitions = counting_subscriber(&engine);
    engine.start(&pool).unwrap();
    tokio::task::yield_now().await;

    for _ in 0..3 {
      advance(Duration::from_secs(5)).await;
      tokio::task::yield_now().await;
    }

    assert_eq!(transitions.load(Ordering::SeqCst), 3);
    assert_eq!(engine.state().recent_quote_ids.len(), 4);
  }

  #[tokio::test(start_paused = true)]
  async fn test_pause_cancels_the_pending_tick() {
    let engine = RotationEngine::with_config(config(5, 10));
    let pool = quote_pool(5);
    let transitions = counting_subscriber(&engine);
    let initial = engine.start(&pool).unwrap();
    tokio::task::yield_now().await;

    // stop just short of the transition, then wait well past it
    advance(Duration::from_millis(4900)).await;
    engine.pause();
    advance(Duration::from_secs(10)).await;
    tokio::task::yield_now().await;

    assert_eq!(current_id(&engine), Some(initial.id));
    assert_eq!(transitions.load(Ordering::SeqCst), 0);
    assert!(!engine.state().is_playing);
  }

  #[tokio::test(start_paused = true)]
  async fn test_next_restarts_the_countdown() {
    let engine = RotationEngine::with_config(config(5, 10));
    let pool = quote_pool(6);
    engine.start(&pool).unwrap();
    tokio::task::yield_now().await;

    advance(Duration::from_secs(4)).await;
    let manual = engine.next(&pool).unwrap();
    tokio::task::yield_now().await;

    // the original deadline passes without a transition
    advance(Duration::from_secs(4)).await;
    tokio::task::yield_now().await;
    assert_eq!(current_id(&engine), Some(manual.id));

    // the replacement timer fires a full interval after the manual advance
    advance(Duration::from_secs(1)).await;
    tokio::task::yield_now().await;
    assert_ne!(current_id(&engine), Some(manual.id));
  }

  #[tokio::test(start_paused = true)]
  async fn test_resume_waits_a_full_interval() {
    let engine = RotationEngine::with_config(config(5, 10));
    let pool = quote_pool(5);
    let initial = engine.start(&pool).unwrap();
    tokio::task::yield_now().await;

    advance(Duration::from_secs(3)).await;
    engine.pause();
    engine.resume();
    tokio::task::yield_now().await;

    // four seconds in, the pre-pause deadline has passed silently
    advance(Duration::from_secs(4)).await;
    tokio::task::yield_now().await;
    assert_eq!(current_id(&engine), Some(initial.id));

    advance(Duration::from_secs(1)).await;
    tokio::task::yield_now().await;
    assert_ne!(current_id(&engine), Some(initial.id));
  }

  #[tokio::test(start_paused = true)]
  async fn test_interval_change_while_playing_rearms() {
    let engine = RotationEngine::with_config(config(60, 10));
    let pool = quote_pool(5);
    let initial = engine.start(&pool).unwrap();
    tokio::task::yield_now().await;

    advance(Duration::from_secs(30)).await;
    engine.set_interval(Duration::from_secs(5));
    tokio::task::yield_now().await;

    advance(Duration::from_secs(5)).await;
    tokio::task::yield_now().await;
    assert_ne!(current_id(&engine), Some(initial.id));
  }

  #[tokio::test(start_paused = true)]
  async fn test_stop_silences_the_timer() {
    let engine = RotationEngine::with_config(config(5, 10));
    let pool = quote_pool(5);
    let transitions = counting_subscriber(&engine);
    engine.start(&pool).unwrap();
    tokio::task::yield_now().await;

    engine.stop();
    advance(Duration::from_secs(120)).await;
    tokio::task::yield_now().await;

    assert!(engine.state().current_quote.is_none());
    assert_eq!(transitions.load(Ordering::SeqCst), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn test_small_pool_keeps_rotating() {
    // with two quotes everything is recent almost immediately, so every
    // tick exercises the full-pool fallback
    let engine = RotationEngine::with_config(config(5, 10));
    let pool = quote_pool(2);
    let transitions = counting_subscriber(&engine);
    engine.start(&pool).unwrap();
    tokio::task::yield_now().await;

    for _ in 0..4 {
      advance(Duration::from_secs(5)).await;
      tokio::task::yield_now().await;
    }

    assert_eq!(transitions.load(Ordering::SeqCst), 4);
    assert!(engine.state().current_quote.is_some());
  }

  #[tokio::test(start_paused = true)]
  async fn test_timer_transitions_avoid_recent_quotes() {
    let engine = RotationEngine::with_config(config(5, 10));
    let pool = quote_pool(5);
    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);
    engine.subscribe(move |quote| sink.lock().unwrap().push(quote.id));

    let initial = engine.start(&pool).unwrap();
    tokio::task::yield_now().await;
    advance(Duration::from_secs(5)).await;
    tokio::task::yield_now().await;
    advance(Duration::from_secs(5)).await;
    tokio::task::yield_now().await;

    let observed = observed.lock().unwrap();
    assert_eq!(observed.len(), 2);
    assert_ne!(observed[0], initial.id);
    assert_ne!(observed[1], observed[0]);
  }
}
