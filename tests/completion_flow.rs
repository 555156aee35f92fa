//! Readings assembled through a scripted completion double.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use divination_backend::completion::Completion;
use divination_backend::config::EngineConfig;
use divination_backend::logic::divine;
use divination_backend::seeds::DISCLAIMER_TITLE;
use divination_backend::storage::MemoryStore;
use divination_backend::{AppState, DivinationError};

struct Scripted {
  reply: Result<String, DivinationError>,
  prompts_seen: AtomicUsize,
}

impl Scripted {
  fn new(reply: Result<String, DivinationError>) -> Arc<Self> {
    Arc::new(Self { reply, prompts_seen: AtomicUsize::new(0) })
  }
}

#[async_trait]
impl Completion for Scripted {
  async fn complete(&self, prompt: &str) -> Result<String, DivinationError> {
    assert!(prompt.contains("【"));
    self.prompts_seen.fetch_add(1, Ordering::SeqCst);
    self.reply.clone()
  }
}

fn state_with(completion: Arc<Scripted>) -> AppState {
  AppState::with_parts(EngineConfig::default(), Arc::new(MemoryStore::new()), Some(completion as Arc<dyn Completion>)).unwrap()
}

fn inputs(pairs: &[(&str, &str)]) -> divination_backend::domain::Inputs {
  pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[tokio::test]
async fn external_reply_is_authoritative() {
  let completion = Scripted::new(Ok("## 卦象\n地天泰\n## 断语\n小往大来，吉亨".into()));
  let state = state_with(completion.clone());
  let r = divine(&state, "zhouyi", inputs(&[("question", "合作能成吗")])).await.unwrap();
  assert_eq!(completion.prompts_seen.load(Ordering::SeqCst), 1);
  assert!(r.section(DISCLAIMER_TITLE).is_none());
  let titles: Vec<&str> = r.sections.iter().map(|s| s.title.as_str()).collect();
  assert_eq!(titles[1..], ["卦象", "断语"]);
}

#[tokio::test]
async fn failing_endpoint_still_yields_a_reading() {
  let completion = Scripted::new(Err(DivinationError::external("connection refused")));
  let state = state_with(completion);
  let r = divine(&state, "astrology", inputs(&[("birthDate", "1995-07-30")])).await.unwrap();
  assert_eq!(r.sections[0].title, DISCLAIMER_TITLE);
  let chart = r.section("星盘描述").unwrap();
  let parsed = state.parser.chart().parse(&chart.content);
  assert_eq!(parsed.positions.len(), 12);
  assert_eq!(parsed.sign_of("太阳"), Some("狮子"));
}
