//! Guide Session Controller
//!
//! Owns the current guide and the pin set for one user session and
//! serializes generations so at most one is in flight.
//!
//! ## State machine
//!
//! ```text
//! Idle ──generate──▶ Generating ──ok──▶ Ready
//!   ▲                  │    ▲             │
//!   │                  err  └─regenerate──┤
//!   │                  ▼                  │
//!   └──────reset────  Failed ◀────────────┘
//! ```
//!
//! Each attempt takes a sequence number. A result that arrives after a
//! newer attempt or a reset is discarded with `ForgeError::Superseded`.
//! The lock is never held across the network call.

use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::{ConstraintBundle, GeneratedGuide, GuidePipeline, Selection, aggregate};
use crate::ai::ConformanceReport;
use crate::types::{BuildGuide, ForgeError, PinSet, Result, SessionId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Generating,
    Ready,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Generating => write!(f, "generating"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: SessionState,
    selection: Option<Selection>,
    /// Surfaced guide; only set in `Ready`
    guide: Option<BuildGuide>,
    /// Last good guide kept for refinement after a failure
    retained: Option<BuildGuide>,
    pins: PinSet,
    sequence: u64,
    last_error: Option<String>,
    last_report: Option<ConformanceReport>,
}

impl Inner {
    /// Claim the session for a new attempt and return its sequence number
    fn begin(&mut self) -> Result<u64> {
        if self.state == SessionState::Generating {
            return Err(ForgeError::Busy);
        }
        self.sequence += 1;
        self.state = SessionState::Generating;
        self.last_error = None;
        Ok(self.sequence)
    }
}

pub struct GuideSession {
    id: SessionId,
    pipeline: GuidePipeline,
    inner: Mutex<Inner>,
}

impl GuideSession {
    pub fn new(pipeline: GuidePipeline) -> Self {
        Self {
            id: SessionId::generate(),
            pipeline,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fresh generation: clears pins and the stored guide first
    pub async fn generate(&self, selection: Selection) -> Result<BuildGuide> {
        let sequence = {
            let mut inner = self.lock();
            let sequence = inner.begin()?;
            inner.pins.clear();
            inner.guide = None;
            inner.retained = None;
            inner.selection = Some(selection.clone());
            sequence
        };

        info!(session = %self.id, sequence, "Generating guide for {}", selection.aspect);
        let result = self
            .pipeline
            .run(&selection, &ConstraintBundle::default(), None)
            .await;
        self.finish(sequence, result)
    }

    /// Refine the current guide, carrying `pins` and avoiding its playstyle.
    ///
    /// `pins` becomes the session pin set and survives the call. Fails with
    /// `NoGuide` if nothing has been generated yet.
    pub async fn regenerate(&self, pins: PinSet) -> Result<BuildGuide> {
        let (sequence, selection, prior, bundle) = {
            let mut inner = self.lock();
            if inner.state == SessionState::Generating {
                return Err(ForgeError::Busy);
            }
            let prior = inner
                .guide
                .take()
                .or_else(|| inner.retained.take())
                .ok_or(ForgeError::NoGuide)?;
            let Some(selection) = inner.selection.clone() else {
                inner.retained = Some(prior);
                return Err(ForgeError::NoGuide);
            };

            let bundle = aggregate(Some(&prior), &pins);
            inner.pins = pins;
            inner.retained = Some(prior.clone());
            let sequence = inner.begin()?;
            (sequence, selection, prior, bundle)
        };

        info!(
            session = %self.id,
            sequence,
            pinned = bundle.len(),
            "Regenerating guide for {}",
            selection.aspect
        );
        let result = self.pipeline.run(&selection, &bundle, Some(&prior)).await;
        self.finish(sequence, result)
    }

    /// Adopt a previously generated guide as the current one, e.g. one
    /// loaded from disk. Pins are cleared; the session becomes `Ready`.
    pub fn resume(&self, selection: Selection, guide: BuildGuide) -> Result<()> {
        let mut inner = self.lock();
        if inner.state == SessionState::Generating {
            return Err(ForgeError::Busy);
        }
        let sequence = inner.sequence + 1;
        *inner = Inner {
            state: SessionState::Ready,
            selection: Some(selection),
            guide: Some(guide),
            sequence,
            ..Inner::default()
        };
        debug!(session = %self.id, "Session resumed from stored guide");
        Ok(())
    }

    /// Return to `Idle`, dropping guide and pins. Any in-flight result
    /// will be discarded when it arrives.
    pub fn reset(&self) {
        let mut inner = self.lock();
        let sequence = inner.sequence + 1;
        *inner = Inner {
            sequence,
            ..Inner::default()
        };
        debug!(session = %self.id, "Session reset");
    }

    fn finish(
        &self,
        sequence: u64,
        result: Result<GeneratedGuide>,
    ) -> Result<BuildGuide> {
        let mut inner = self.lock();

        if inner.sequence != sequence {
            debug!(
                session = %self.id,
                sequence,
                current = inner.sequence,
                "Discarding superseded result"
            );
            return Err(ForgeError::Superseded { sequence });
        }

        match result {
            Ok(generated) => {
                inner.state = SessionState::Ready;
                inner.guide = Some(generated.guide.clone());
                inner.retained = None;
                inner.last_report = Some(generated.report);
                Ok(generated.guide)
            }
            Err(err) => {
                warn!(session = %self.id, sequence, "Generation failed: {}", err);
                inner.state = SessionState::Failed;
                inner.last_error = Some(err.user_message());
                inner.last_report = None;
                Err(err)
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// The guide, only while `Ready`
    pub fn current_guide(&self) -> Option<BuildGuide> {
        let inner = self.lock();
        match inner.state {
            SessionState::Ready => inner.guide.clone(),
            _ => None,
        }
    }

    pub fn pins(&self) -> PinSet {
        self.lock().pins.clone()
    }

    /// User-facing message of the last failure
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Conformance findings of the last successful generation
    pub fn last_report(&self) -> Option<ConformanceReport> {
        self.lock().last_report.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::mock::ScriptedProvider;
    use crate::ai::{CatalogPolicy, PinPolicy};
    use crate::catalog::StaticCatalog;
    use crate::types::testing::{boon, sample_guide, sample_guide_json};
    use crate::types::{BoonRecommendation, Slot};
    use std::sync::Arc;
    use std::time::Duration;

    fn session_with(provider: ScriptedProvider) -> (GuideSession, Arc<ScriptedProvider>) {
        let provider = Arc::new(provider);
        let catalog = StaticCatalog::embedded().unwrap().into_shared();
        let pipeline = GuidePipeline::new(provider.clone(), catalog);
        (GuideSession::new(pipeline), provider)
    }

    fn circe() -> Selection {
        Selection::new("Witch's Staff", "Aspect of Circe")
    }

    fn electric_coating() -> BoonRecommendation {
        BoonRecommendation {
            slot: "Attack".to_string(),
            god: "Zeus".to_string(),
            boon_name: "Electric Coating".to_string(),
            description: "Attacks inflict Blitz.".to_string(),
            explanation: "Blitz detonates on Omega hits.".to_string(),
            rarity: Some("Epic".to_string()),
        }
    }

    fn guide_json(guide: &BuildGuide) -> String {
        serde_json::to_string(guide).unwrap()
    }

    #[tokio::test]
    async fn test_generate_reaches_ready() {
        let (session, _) = session_with(ScriptedProvider::replying(sample_guide_json()));
        assert_eq!(session.state(), SessionState::Idle);

        let guide = session.generate(circe()).await.unwrap();
        assert_eq!(guide, sample_guide());
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.current_guide(), Some(guide));
    }

    #[tokio::test]
    async fn test_pinned_boon_survives_regenerate() {
        let mut first = sample_guide();
        first.boons.attack = electric_coating();

        let mut second = sample_guide();
        second.playstyle = "Close-range burst".to_string();
        second.boons.attack = electric_coating();
        second.boons.special = boon(Slot::Special, "Hera", "Sworn Flourish");

        let (session, provider) = session_with(ScriptedProvider::new(vec![
            Ok(guide_json(&first)),
            Ok(format!("```json\n{}\n```", guide_json(&second))),
        ]));

        let guide = session.generate(circe()).await.unwrap();
        let mut pins = PinSet::new();
        pins.toggle_boon(&guide, Slot::Attack);

        let refined = session.regenerate(pins.clone()).await.unwrap();
        assert_eq!(refined.boons.attack, first.boons.attack);
        assert_eq!(
            serde_json::to_string(&refined.boons.attack).unwrap(),
            serde_json::to_string(&first.boons.attack).unwrap()
        );
        assert_ne!(refined.boons.special, first.boons.special);
        assert_eq!(session.pins(), pins);

        let prompt = &provider.prompts()[1];
        assert!(prompt.contains("- attack: Zeus - Electric Coating (Epic)"));
        assert!(prompt.contains("Previous Style: Omega-heavy ranged control"));
    }

    #[tokio::test]
    async fn test_pin_without_rarity_survives_default_echo() {
        let mut first = sample_guide();
        first.boons.attack = electric_coating();
        first.boons.attack.rarity = None;

        let mut second = first.clone();
        second.boons.attack.rarity = Some("Common".to_string());
        second.boons.special = boon(Slot::Special, "Hera", "Sworn Flourish");

        let (session, provider) = session_with(ScriptedProvider::new(vec![
            Ok(guide_json(&first)),
            Ok(guide_json(&second)),
        ]));

        let guide = session.generate(circe()).await.unwrap();
        let mut pins = PinSet::new();
        pins.toggle_boon(&guide, Slot::Attack);

        let refined = session.regenerate(pins).await.unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(refined.boons.attack, first.boons.attack);
        assert_eq!(refined.boons.special, second.boons.special);

        let prompt = &provider.prompts()[1];
        assert!(prompt.contains("- attack: Zeus - Electric Coating\n"));
        assert!(!prompt.contains("Electric Coating (Common)"));
    }

    #[tokio::test]
    async fn test_dropped_pin_fails_under_reject() {
        let mut second = sample_guide();
        second.boons.attack = boon(Slot::Attack, "Aphrodite", "Flutter Strike");

        let (session, _) = session_with(ScriptedProvider::new(vec![
            Ok(sample_guide_json()),
            Ok(guide_json(&second)),
        ]));

        let guide = session.generate(circe()).await.unwrap();
        let mut pins = PinSet::new();
        pins.toggle_boon(&guide, Slot::Attack);

        let err = session.regenerate(pins).await.unwrap_err();
        assert!(matches!(err, ForgeError::ConstraintViolation(_)));
        assert_eq!(session.state(), SessionState::Failed);
        assert!(session.current_guide().is_none());
    }

    #[tokio::test]
    async fn test_dropped_pin_restored_under_restore() {
        let mut second = sample_guide();
        second.boons.attack = boon(Slot::Attack, "Aphrodite", "Flutter Strike");

        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(sample_guide_json()),
            Ok(guide_json(&second)),
        ]));
        let catalog = StaticCatalog::embedded().unwrap().into_shared();
        let pipeline = GuidePipeline::new(provider, catalog)
            .with_policies(PinPolicy::Restore, CatalogPolicy::Off);
        let session = GuideSession::new(pipeline);

        let guide = session.generate(circe()).await.unwrap();
        let mut pins = PinSet::new();
        pins.toggle_boon(&guide, Slot::Attack);

        let refined = session.regenerate(pins).await.unwrap();
        assert_eq!(refined.boons.attack, guide.boons.attack);
        assert_eq!(session.last_report().unwrap().restored, 1);
    }

    #[tokio::test]
    async fn test_missing_sprint_fails_with_parse_error() {
        let mut value = serde_json::to_value(sample_guide()).unwrap();
        value["boons"].as_object_mut().unwrap().remove("sprint");
        let (session, _) = session_with(ScriptedProvider::replying(value.to_string()));

        let err = session.generate(circe()).await.unwrap_err();
        assert!(matches!(err, ForgeError::Parse { .. }));
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(
            session.last_error().as_deref(),
            Some(crate::constants::messages::PARSE_FAILED)
        );
    }

    #[tokio::test]
    async fn test_empty_reply_never_reaches_extractor() {
        let (session, _) = session_with(ScriptedProvider::replying("   "));
        let err = session.generate(circe()).await.unwrap_err();
        assert!(matches!(err, ForgeError::EmptyResponse));
        assert_eq!(
            session.last_error().as_deref(),
            Some(crate::constants::messages::GENERATION_FAILED)
        );
    }

    #[tokio::test]
    async fn test_failure_hides_guide_but_allows_refine() {
        let (session, _) = session_with(ScriptedProvider::new(vec![
            Ok(sample_guide_json()),
            Ok("not json at all".to_string()),
            Ok(sample_guide_json()),
        ]));

        session.generate(circe()).await.unwrap();
        assert!(session.regenerate(PinSet::new()).await.is_err());
        assert_eq!(session.state(), SessionState::Failed);
        assert!(session.current_guide().is_none());

        let guide = session.regenerate(PinSet::new()).await.unwrap();
        assert_eq!(guide, sample_guide());
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_regenerate_without_guide() {
        let (session, _) = session_with(ScriptedProvider::new(vec![]));
        let err = session.regenerate(PinSet::new()).await.unwrap_err();
        assert!(matches!(err, ForgeError::NoGuide));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_resume_enables_regenerate() {
        let (session, provider) = session_with(ScriptedProvider::replying(sample_guide_json()));
        session.resume(circe(), sample_guide()).unwrap();
        assert_eq!(session.state(), SessionState::Ready);

        let mut pins = PinSet::new();
        pins.toggle_hammer("Vortex Strike");
        session.regenerate(pins).await.unwrap();
        assert!(provider.prompts()[0].contains("LOCKED HAMMERS"));
    }

    #[tokio::test]
    async fn test_generate_clears_pins() {
        let (session, _) = session_with(ScriptedProvider::new(vec![
            Ok(sample_guide_json()),
            Ok(sample_guide_json()),
            Ok(sample_guide_json()),
        ]));

        let guide = session.generate(circe()).await.unwrap();
        let mut pins = PinSet::new();
        pins.toggle_boon(&guide, Slot::Cast);
        session.regenerate(pins).await.unwrap();
        assert!(!session.pins().is_empty());

        session.generate(circe()).await.unwrap();
        assert!(session.pins().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_call_is_busy() {
        let provider = ScriptedProvider::replying(sample_guide_json())
            .with_delay(Duration::from_millis(100));
        let (session, _) = session_with(provider);

        let (first, second) = tokio::join!(session.generate(circe()), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            session.generate(circe()).await
        });

        assert!(first.is_ok());
        assert!(matches!(second, Err(ForgeError::Busy)));
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_reset_supersedes_in_flight_result() {
        let provider = ScriptedProvider::replying(sample_guide_json())
            .with_delay(Duration::from_millis(100));
        let (session, _) = session_with(provider);

        let (result, ()) = tokio::join!(session.generate(circe()), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            session.reset();
        });

        assert!(matches!(result, Err(ForgeError::Superseded { sequence: 1 })));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.current_guide().is_none());
    }
}
