// hiveforge-orchestrator/src/ra/driver.rs
// ============================================================================
// Module: RA Orchestrator Driver
// Description: Drives the 16-state requirement analysis machine end to end,
//              wiring the component workers and recording each step to the
//              Akashic Record (§4.5).
// Dependencies: hiveforge_core::{ra_state_machine, RaState, OscillationDetector}, hiveforge_storage::AkashicRecord
// ============================================================================

use std::sync::Arc;

use hiveforge_core::Actor;
use hiveforge_core::AmbiguityScores;
use hiveforge_core::AnalysisPath;
use hiveforge_core::Assumption;
use hiveforge_core::ClarificationRound;
use hiveforge_core::Clock;
use hiveforge_core::DraftId;
use hiveforge_core::Event;
use hiveforge_core::EventType;
use hiveforge_core::FailureHypothesis;
use hiveforge_core::IntentGraph;
use hiveforge_core::OscillationDetector;
use hiveforge_core::Payload;
use hiveforge_core::PayloadValue;
use hiveforge_core::RaGateResult;
use hiveforge_core::RaState;
use hiveforge_core::RunId;
use hiveforge_core::ra_domain::MAX_CLARIFICATION_ROUNDS;
use hiveforge_core::ra_state_machine;
use hiveforge_llm::LlmClient;
use hiveforge_storage::AkashicRecord;

use crate::error::OrchestratorError;
use crate::ra::AmbiguityScorer;
use crate::ra::AssumptionMapper;
use crate::ra::ClarificationGenerator;
use crate::ra::IntentMiner;
use crate::ra::PersistedDocument;
use crate::ra::RiskChallenger;
use crate::ra::SpecPersister;
use crate::ra::SpecSynthesizer;
use crate::ra::evaluate_guard_gate;

/// Maximum oscillations the driver's governance monitor tolerates before
/// raising [`GovernanceError::Oscillation`] (§4.4).
const MAX_OSCILLATIONS: u32 = 3;

/// Terminal outcome of a driver run.
pub enum RaOutcome {
    /// The machine is paused in `USER_FEEDBACK`, awaiting answers to a
    /// clarification round.
    AwaitingClarification {
        /// Round the user must answer.
        round: ClarificationRound,
        /// The analysis path the triage scores resolved to (§4.5.1).
        path: AnalysisPath,
    },
    /// The machine reached one of the three terminal states.
    Terminal {
        /// The terminal state reached.
        state: RaState,
        /// The persisted document, when synthesis ran.
        document: Option<PersistedDocument>,
        /// The final Guard Gate result, when the gate ran.
        gate: Option<RaGateResult>,
        /// The analysis path the triage scores resolved to (§4.5.1).
        path: AnalysisPath,
    },
}

/// In-flight analysis context threaded between driver steps.
struct Session {
    /// Raw intake text the session started from.
    text: String,
    /// Ambiguity/context/risk scores computed during triage.
    scores: AmbiguityScores,
    /// Intent graph mined from `text`.
    intent: IntentGraph,
    /// Assumptions surviving the confidence post-processing rules.
    assumptions: Vec<Assumption>,
    /// Failure hypotheses from the Risk Challenger's Phase A.
    hypotheses: Vec<FailureHypothesis>,
    /// Number of clarification rounds generated so far.
    clarify_round: u32,
}

/// Drives one requirement analysis run from raw intake text through to a
/// terminal state, emitting an `ra.*` event to the Akashic Record at every
/// transition (§4.5).
pub struct RaDriver<'a> {
    /// Run this driver's events are appended under.
    run_id: RunId,
    /// Event log the driver appends `ra.*` events to.
    record: Arc<AkashicRecord>,
    /// Clock used to timestamp emitted events.
    clock: Arc<dyn Clock>,
    /// LLM client shared by every RA worker this driver invokes.
    llm: &'a dyn LlmClient,
    /// Ambiguity scorer used at the triage step.
    scorer: AmbiguityScorer,
    /// Spec persister backing the requirements directory.
    persister: SpecPersister,
    /// The 16-state RA state machine tracking the current step.
    machine: hiveforge_core::StateMachine<RaState>,
    /// Governance monitor guarding against state oscillation.
    oscillation: OscillationDetector<RaState>,
    /// Context accumulated since `intake`, absent before the first call.
    session: Option<Session>,
}

impl<'a> RaDriver<'a> {
    /// Opens a driver for `run_id`, persisting drafts under `requirements_dir`.
    ///
    /// # Errors
    ///
    /// Propagates [`OrchestratorError::Io`] if the requirements directory
    /// cannot be created.
    pub fn new(
        run_id: RunId,
        record: Arc<AkashicRecord>,
        clock: Arc<dyn Clock>,
        llm: &'a dyn LlmClient,
        requirements_dir: impl Into<std::path::PathBuf>,
    ) -> Result<Self, OrchestratorError> {
        Ok(Self {
            run_id,
            record,
            clock,
            llm,
            scorer: AmbiguityScorer::default(),
            persister: SpecPersister::open(requirements_dir)?,
            machine: ra_state_machine(),
            oscillation: OscillationDetector::new(MAX_OSCILLATIONS),
            session: None,
        })
    }

    fn record_event(&self, event_type: EventType, payload: Payload) -> Result<Event, OrchestratorError> {
        let prev_hash = self
            .record
            .last_event(self.run_id.as_str())?
            .map(|event| event.hash);
        let event = Event {
            id: hiveforge_storage::new_event_id(),
            event_type,
            timestamp: self.clock.now(),
            run_id: Some(self.run_id.clone()),
            hive_id: None,
            colony_id: None,
            task_id: None,
            worker_id: None,
            actor: Actor::system(),
            payload,
            prev_hash,
            parents: Vec::new(),
            hash: String::new(),
        }
        .finalized()
        .map_err(|err| OrchestratorError::Persistence(err.to_string()))?;
        Ok(self.record.append(event)?)
    }

    fn advance(&mut self, event_type: EventType, payload: &Payload) -> Result<RaState, OrchestratorError> {
        let state = self.machine.transition(&event_type, payload)?;
        self.oscillation.record(state)?;
        Ok(state)
    }

    /// Starts a fresh run from raw intake text, driving the machine forward
    /// until it either pauses for clarification answers or reaches a
    /// terminal state.
    ///
    /// `context_sufficiency` is the externally supplied measure of how much
    /// surrounding context is already available (§4.5.1); it is folded into
    /// the triage scores before `analysis_path()` is consulted, so a
    /// concrete, low-risk, already-well-contexted intake can resolve to
    /// `INSTANT_PASS` on the very first call instead of always falling
    /// through to clarification.
    ///
    /// # Errors
    ///
    /// Propagates worker, storage, and governance errors.
    pub async fn intake(&mut self, text: &str, context_sufficiency: f64) -> Result<RaOutcome, OrchestratorError> {
        let mut payload = Payload::new();
        payload.insert("text".to_string(), PayloadValue::String(text.to_string()));
        self.record_event(EventType::RaIntakeReceived, payload)?;

        let scores = self.scorer.score(text, context_sufficiency);
        self.emit_triage(&scores)?;
        self.advance(EventType::RaTriageCompleted, &Payload::new())?;

        if scores.analysis_path() == AnalysisPath::InstantPass {
            return self.fast_track(text, scores).await;
        }

        let enriched_context_sufficiency = (scores.context_sufficiency + 0.3).min(1.0);
        let enriched = AmbiguityScores::new(scores.ambiguity, enriched_context_sufficiency, scores.execution_risk);
        self.record_event(EventType::RaContextEnriched, Payload::new())?;
        self.advance(EventType::RaContextEnriched, &Payload::new())?;

        let intent = IntentMiner::mine(self.llm, text).await?;
        let mapped = AssumptionMapper::map(self.llm, text).await?;
        let hypotheses = RiskChallenger::hypothesize(self.llm, text).await?;
        self.record_event(EventType::RaHypothesisBuilt, Payload::new())?;
        self.advance(EventType::RaHypothesisBuilt, &Payload::new())?;

        self.session = Some(Session {
            text: text.to_string(),
            scores: enriched,
            intent,
            assumptions: mapped.assumptions,
            hypotheses,
            clarify_round: 0,
        });

        self.generate_clarification().await
    }

    /// Drives an `INSTANT_PASS` intake straight through to execution
    /// readiness without pausing for a clarification round (§4.5.1, §8 S2):
    /// a concrete, low-risk, high-context intake needs no questions, so the
    /// clarification round is recorded as empty (`question_count: 0`) and
    /// the machine proceeds directly into spec synthesis.
    async fn fast_track(&mut self, text: &str, scores: AmbiguityScores) -> Result<RaOutcome, OrchestratorError> {
        self.record_event(EventType::RaContextEnriched, Payload::new())?;
        self.advance(EventType::RaContextEnriched, &Payload::new())?;

        let intent = IntentMiner::mine(self.llm, text).await?;
        let mapped = AssumptionMapper::map(self.llm, text).await?;
        let hypotheses = RiskChallenger::hypothesize(self.llm, text).await?;
        self.record_event(EventType::RaHypothesisBuilt, Payload::new())?;
        self.advance(EventType::RaHypothesisBuilt, &Payload::new())?;

        self.session = Some(Session {
            text: text.to_string(),
            scores,
            intent,
            assumptions: mapped.assumptions,
            hypotheses,
            clarify_round: 0,
        });

        let mut skip_payload = Payload::new();
        skip_payload.insert("question_count".to_string(), PayloadValue::Int(0));
        self.record_event(EventType::RaClarifyGenerated, skip_payload.clone())?;
        self.advance(EventType::RaClarifyGenerated, &skip_payload)?;

        self.synthesize_and_continue().await
    }

    fn emit_triage(&self, scores: &AmbiguityScores) -> Result<Event, OrchestratorError> {
        let mut payload = Payload::new();
        let ambiguity = PayloadValue::float(scores.ambiguity).unwrap_or(PayloadValue::Int(0));
        let execution_risk = PayloadValue::float(scores.execution_risk).unwrap_or(PayloadValue::Int(0));
        payload.insert("ambiguity".to_string(), ambiguity);
        payload.insert("execution_risk".to_string(), execution_risk);
        self.record_event(EventType::RaTriageCompleted, payload)
    }

    async fn generate_clarification(&mut self) -> Result<RaOutcome, OrchestratorError> {
        let Some(session) = self.session.as_mut() else {
            return Err(OrchestratorError::Persistence("no active RA session".to_string()));
        };
        let round = ClarificationGenerator::generate(self.llm, &session.text, session.clarify_round + 1).await?;
        session.clarify_round += 1;
        let path = session.scores.analysis_path();

        let mut payload = Payload::new();
        payload.insert(
            "question_count".to_string(),
            PayloadValue::Int(i64::try_from(round.questions.len()).unwrap_or(i64::MAX)),
        );
        self.record_event(EventType::RaClarifyGenerated, payload.clone())?;
        let state = self.advance(EventType::RaClarifyGenerated, &payload)?;

        if state == RaState::UserFeedback {
            return Ok(RaOutcome::AwaitingClarification { round, path });
        }
        self.synthesize_and_continue().await
    }

    /// Resumes a paused run after the caller has answered the outstanding
    /// clarification round. Capped at [`MAX_CLARIFICATION_ROUNDS`]: once
    /// reached, the driver proceeds to synthesis regardless of remaining
    /// unknowns.
    ///
    /// # Errors
    ///
    /// Propagates worker, storage, and governance errors.
    pub async fn resume_with_answers(&mut self, answers_resolved_ambiguity: bool) -> Result<RaOutcome, OrchestratorError> {
        self.record_event(EventType::RaUserResponded, Payload::new())?;
        self.advance(EventType::RaUserResponded, &Payload::new())?;

        let round_exhausted = self
            .session
            .as_ref()
            .is_some_and(|s| s.clarify_round >= u32::try_from(MAX_CLARIFICATION_ROUNDS).unwrap_or(u32::MAX));

        if answers_resolved_ambiguity || round_exhausted {
            self.record_event(EventType::RaHypothesisBuilt, Payload::new())?;
            self.advance(EventType::RaHypothesisBuilt, &Payload::new())?;
            return self.synthesize_and_continue().await;
        }
        self.generate_clarification().await
    }

    async fn synthesize_and_continue(&mut self) -> Result<RaOutcome, OrchestratorError> {
        let Some(session) = self.session.as_ref() else {
            return Err(OrchestratorError::Persistence("no active RA session".to_string()));
        };
        let context = build_synthesis_context(session);
        let scores = session.scores;
        let hypotheses = session.hypotheses.clone();
        let path = scores.analysis_path();

        let draft = SpecSynthesizer::synthesize(self.llm, &context, DraftId::new(self.run_id.as_str()), 1).await?;

        self.record_event(EventType::RaSpecSynthesized, Payload::new())?;
        self.advance(EventType::RaSpecSynthesized, &Payload::new())?;

        let document = self.persister.persist(draft.clone(), None)?;

        let challenges = RiskChallenger::challenge(self.llm, &document.draft).await?;
        self.record_event(EventType::RaChallengeReviewed, Payload::new())?;
        self.advance(EventType::RaChallengeReviewed, &Payload::new())?;

        let gate = evaluate_guard_gate(&document.draft, &scores, &hypotheses, Some(&challenges));

        let outcome = if gate.passed {
            "execution_ready"
        } else if hypotheses.iter().any(|h| !h.addressed) {
            "execution_ready_with_risks"
        } else {
            "abandoned"
        };
        let mut payload = Payload::new();
        payload.insert("outcome".to_string(), PayloadValue::String(outcome.to_string()));
        self.record_event(EventType::RaGateDecided, Payload::new())?;
        self.advance(EventType::RaGateDecided, &Payload::new())?;

        self.record_event(EventType::RaCompleted, payload.clone())?;
        let final_state = self.advance(EventType::RaCompleted, &payload)?;

        Ok(RaOutcome::Terminal { state: final_state, document: Some(document), gate: Some(gate), path })
    }
}

fn build_synthesis_context(session: &Session) -> String {
    let assumptions: Vec<&str> = session.assumptions.iter().map(|a| a.text.as_str()).collect();
    format!(
        "intake: {}\ngoals: {:?}\nsuccess_criteria: {:?}\nconstraints: {:?}\nnon_goals: {:?}\nassumptions: {:?}",
        session.text, session.intent.goals, session.intent.success_criteria, session.intent.constraints,
        session.intent.non_goals, assumptions,
    )
}
