//! [`AgentRuntime`]: the C6 agent graph orchestrator — router→specialist
//! dispatch, the per-turn tool-call loop, the write-class approval
//! interrupt, and checkpoint/audit/context wiring around every step.
//!
//! Modeled on the teacher's top-level session loop: one long-lived struct
//! holding every collaborator crate, a single `drive` loop walking
//! [`GraphState`] forward, and durable state written after each transition
//! so a crash mid-turn resumes instead of restarting (spec §4.6, §4.7,
//! §8 scenario 6).

use std::sync::Arc;
use std::time::{Duration, Instant};

use bestbox_adapters::AdapterRegistry;
use bestbox_checkpoint::{Checkpoint, Checkpointer};
use bestbox_config::LimitsSection;
use bestbox_context::ContextManager;
use bestbox_core::ids::{ThreadId, Timestamp, ToolCallId, TurnId};
use bestbox_core::model::{AgentName, AgentState, Message as CoreMessage, ReasoningStep, Thread, ThreadStatus, Turn, UserContext};
use bestbox_gpu::{GpuClass, GpuLease, GpuScheduler};
use bestbox_llm::{LlmError, LlmProvider, LlmResponse, LlmToolDefinition};
use bestbox_retriever::{HybridRetriever, Lexicon};
use bestbox_tools::{ApprovalEnvelope, ErrorKind, ToolOutcome, ToolRegistry};

use crate::catalog;
use crate::convert;
use crate::error::{RuntimeError, RuntimeResult};
use crate::observer::TurnObserver;
use crate::persona;
use crate::router;
use crate::state::GraphState;
use crate::threads::{PendingApproval, ThreadStore, TurnRecord};

/// Everything a turn concludes with, as seen by the caller (`bestbox-server`).
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The turn produced a final answer.
    Done {
        /// The thread this turn belongs to (new or continued).
        thread_id: ThreadId,
        /// The completed turn's id.
        turn_id: TurnId,
        /// The assistant's final answer text.
        answer: String,
    },
    /// A write-class tool call needs human approval before the turn can
    /// continue.
    AwaitingHuman {
        /// The thread this turn belongs to (new or continued).
        thread_id: ThreadId,
        /// The interrupted turn's id.
        turn_id: TurnId,
        /// What's pending and what it would do if approved.
        approval: ApprovalEnvelope,
    },
}

/// Outcome of a single specialist reasoning step (one model call, plus
/// whatever it decided to do with it).
enum StepOutcome {
    ToolExecuted,
    AwaitingApproval(ApprovalEnvelope),
    FinalAnswer(String),
    /// The specialist's tool-call arguments were unrepairable JSON and the
    /// one allowed corrective re-prompt was just issued (spec §4.4 point 2);
    /// the turn stays in `Executing` for another pass.
    Reprompted,
}

/// The agent graph runtime: holds every collaborator crate this turn loop
/// drives, and the handful of per-deployment settings ([`LimitsSection`],
/// the GPU device backing LLM calls) that aren't owned by any one of them.
pub struct AgentRuntime {
    specialist_llm: Arc<dyn LlmProvider>,
    router_llm: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    context: Arc<ContextManager>,
    checkpointer: Arc<Checkpointer>,
    audit: bestbox_audit::AuditLog,
    threads: Arc<ThreadStore>,
    gpu: Arc<GpuScheduler>,
    lexicon: Lexicon,
    limits: LimitsSection,
    llm_gpu_id: Option<String>,
    gpu_acquire_timeout: Duration,
}

impl AgentRuntime {
    /// Assemble a runtime from its collaborators. `adapters` and
    /// `mold_retriever` are only needed to build the tool catalog
    /// ([`catalog::build`]); callers that already have a [`ToolRegistry`]
    /// can use [`Self::with_tools`] instead.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        specialist_llm: Arc<dyn LlmProvider>,
        router_llm: Arc<dyn LlmProvider>,
        adapters: Arc<AdapterRegistry>,
        mold_retriever: Arc<HybridRetriever>,
        context: Arc<ContextManager>,
        checkpointer: Arc<Checkpointer>,
        audit: bestbox_audit::AuditLog,
        threads: Arc<ThreadStore>,
        gpu: Arc<GpuScheduler>,
        lexicon: Lexicon,
        limits: LimitsSection,
        llm_gpu_id: Option<String>,
        gpu_acquire_timeout: Duration,
    ) -> Self {
        let tools = Arc::new(catalog::build(adapters, mold_retriever));
        Self { specialist_llm, router_llm, tools, context, checkpointer, audit, threads, gpu, lexicon, limits, llm_gpu_id, gpu_acquire_timeout }
    }

    /// Load a thread and every turn recorded against it (spec §6 `GET
    /// /v1/threads/{thread_id}`).
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ThreadNotFound`] if no such thread exists.
    pub async fn get_thread(&self, thread_id: ThreadId) -> RuntimeResult<(Thread, Vec<Turn>)> {
        let thread = self.threads.load_thread(thread_id).await?.ok_or(RuntimeError::ThreadNotFound(thread_id))?;
        let turns = self.threads.turns_for_thread(thread_id).await?;
        Ok((thread, turns))
    }

    /// Open (or continue) a thread with a new user message and drive it to
    /// completion, an approval interrupt, or failure.
    ///
    /// # Errors
    ///
    /// Returns a [`RuntimeError`] if thread/checkpoint persistence fails or
    /// the turn's deadline elapses.
    pub async fn run_turn(&self, thread_id: Option<ThreadId>, input: &str, user_context: UserContext, observer: &dyn TurnObserver) -> RuntimeResult<TurnOutcome> {
        let mut thread = match thread_id {
            Some(id) => self.threads.load_thread(id).await?.ok_or(RuntimeError::ThreadNotFound(id))?,
            None => Thread::new(user_context.clone()),
        };

        let mut turn = Turn::new(thread.thread_id, input);
        thread.turn_ids.push(turn.turn_id);
        thread.status = ThreadStatus::Active;

        let mut state = AgentState::new(user_context);
        state.push_message(CoreMessage::user(input));

        let checkpoint = Checkpoint::initial(thread.thread_id, turn.turn_id, state.clone());
        self.checkpointer.create(&checkpoint).await?;

        self.audit.record(bestbox_audit::AuditEntry::turn_start(turn.turn_id, thread.thread_id, &state.user_context.user_id, state.user_context.org_id.clone(), input)).await;

        self.threads.save_thread(&thread).await?;
        self.threads.save_turn(&TurnRecord { turn: turn.clone(), pending_approval: None }).await?;

        self.drive(&mut thread, &mut turn, state, checkpoint, GraphState::Routing, Instant::now(), None, observer).await
    }

    /// Resume a turn left in progress (crash recovery, spec §8 scenario 6):
    /// loads the latest checkpoint and replays forward without re-invoking
    /// tool calls already recorded in [`Checkpoint::completed_tool_calls`].
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::TurnNotFound`] if no checkpoint exists for
    /// this turn.
    pub async fn resume_turn(&self, thread_id: ThreadId, turn_id: TurnId, observer: &dyn TurnObserver) -> RuntimeResult<TurnOutcome> {
        let mut thread = self.threads.load_thread(thread_id).await?.ok_or(RuntimeError::ThreadNotFound(thread_id))?;
        let record = self.threads.load_turn(turn_id).await?.ok_or(RuntimeError::TurnNotFound(turn_id))?;
        let checkpoint = self.checkpointer.load(thread_id, turn_id).await?.ok_or(RuntimeError::TurnNotFound(turn_id))?;

        if record.pending_approval.is_some() {
            let approval = record.pending_approval.expect("checked is_some above").envelope;
            return Ok(TurnOutcome::AwaitingHuman { thread_id, turn_id, approval });
        }

        let mut turn = record.turn;
        let state = checkpoint.state.clone();
        let (graph_state, deadline) = if state.current_agent == AgentName::Router {
            (GraphState::Routing, None)
        } else {
            (GraphState::Executing(state.current_agent), Some(self.deadline_for(state.current_agent)))
        };
        self.drive(&mut thread, &mut turn, state, checkpoint, graph_state, Instant::now(), deadline, observer).await
    }

    /// Approve or deny a pending write-class tool call, resuming the turn
    /// either way (spec §4.6, §8 scenario 4).
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::NoPendingApproval`] if the turn has nothing
    /// awaiting approval.
    pub async fn approve_turn(&self, thread_id: ThreadId, turn_id: TurnId, approved: bool, observer: &dyn TurnObserver) -> RuntimeResult<TurnOutcome> {
        let mut thread = self.threads.load_thread(thread_id).await?.ok_or(RuntimeError::ThreadNotFound(thread_id))?;
        let record = self.threads.load_turn(turn_id).await?.ok_or(RuntimeError::TurnNotFound(turn_id))?;
        let pending = record.pending_approval.clone().ok_or(RuntimeError::NoPendingApproval(turn_id))?;
        let checkpoint = self.checkpointer.load(thread_id, turn_id).await?.ok_or(RuntimeError::TurnNotFound(turn_id))?;

        let mut turn = record.turn;
        let mut state = checkpoint.state.clone();
        let agent = state.current_agent;

        let outcome = if approved {
            let tool = self.tools.get(&pending.envelope.tool_name).ok_or_else(|| RuntimeError::Internal(format!("approved tool '{}' no longer registered", pending.envelope.tool_name)))?;
            tool.invoke(pending.envelope.args.clone(), &state.user_context).await
        } else {
            ToolOutcome::err(ErrorKind::PermissionDenied, "the pending action was declined by the user")
        };

        self.record_tool_outcome(&mut state, &mut turn, pending.envelope.tool_call_id, &pending.envelope.tool_name, &pending.envelope.args, outcome, observer).await;

        let mut checkpoint = checkpoint;
        checkpoint.completed_tool_calls.insert(pending.envelope.tool_call_id);
        let next_checkpoint = checkpoint.next(state.clone(), checkpoint.completed_tool_calls.clone());
        self.checkpointer.advance(&next_checkpoint).await?;

        self.threads.save_turn(&TurnRecord { turn: turn.clone(), pending_approval: None }).await?;

        let deadline = Some(self.deadline_for(agent));
        self.drive(&mut thread, &mut turn, state, next_checkpoint, GraphState::Executing(agent), Instant::now(), deadline, observer).await
    }

    /// Walk the graph forward from `graph_state` until the turn reaches a
    /// terminal state or interrupts on approval.
    #[allow(clippy::too_many_arguments)]
    async fn drive(
        &self,
        thread: &mut Thread,
        turn: &mut Turn,
        mut state: AgentState,
        mut checkpoint: Checkpoint,
        mut graph_state: GraphState,
        started_at: Instant,
        mut deadline: Option<Duration>,
        observer: &dyn TurnObserver,
    ) -> RuntimeResult<TurnOutcome> {
        loop {
            if let Some(deadline) = deadline {
                if started_at.elapsed() > deadline {
                    let elapsed_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
                    return self.fail_turn(thread, turn, RuntimeError::DeadlineExceeded { elapsed_ms }, observer).await;
                }
            }

            match graph_state {
                GraphState::Routing => {
                    let agent = match self.route(&turn.input_text).await {
                        Ok(agent) => agent,
                        Err(error) => return self.fail_turn(thread, turn, error, observer).await,
                    };
                    deadline = Some(self.deadline_for(agent));
                    turn.current_agent = agent;
                    state.current_agent = agent;
                    checkpoint = checkpoint.next(state.clone(), checkpoint.completed_tool_calls.clone());
                    self.checkpointer.advance(&checkpoint).await?;
                    graph_state = GraphState::Executing(agent);
                }

                GraphState::Executing(agent) => {
                    if turn.at_tool_call_limit(self.limits.max_tool_calls_per_turn) {
                        state.push_message(CoreMessage::system("You have reached the maximum number of tool calls for this turn. Answer now using only what you already know."));
                        let text = match self.force_final_answer(agent, &mut state, observer).await {
                            Ok(text) => text,
                            Err(error) => return self.fail_turn(thread, turn, error, observer).await,
                        };
                        turn.final_answer = Some(text);
                        checkpoint = checkpoint.next(state.clone(), checkpoint.completed_tool_calls.clone());
                        self.checkpointer.advance(&checkpoint).await?;
                        self.threads.save_turn(&TurnRecord { turn: turn.clone(), pending_approval: None }).await?;
                        graph_state = GraphState::Answering(agent);
                        continue;
                    }

                    match self.step_specialist(agent, &mut state, turn, observer).await {
                        Ok(StepOutcome::ToolExecuted | StepOutcome::Reprompted) => {}
                        Ok(StepOutcome::FinalAnswer(text)) => {
                            turn.final_answer = Some(text);
                            graph_state = GraphState::Answering(agent);
                        }
                        Ok(StepOutcome::AwaitingApproval(envelope)) => {
                            checkpoint = checkpoint.next(state.clone(), checkpoint.completed_tool_calls.clone());
                            self.checkpointer.advance(&checkpoint).await?;
                            self.threads.save_turn(&TurnRecord { turn: turn.clone(), pending_approval: Some(PendingApproval { envelope: envelope.clone() }) }).await?;
                            self.threads.save_thread(thread).await?;
                            return Ok(TurnOutcome::AwaitingHuman { thread_id: thread.thread_id, turn_id: turn.turn_id, approval: envelope });
                        }
                        Err(error) => return self.fail_turn(thread, turn, error, observer).await,
                    }

                    checkpoint = checkpoint.next(state.clone(), checkpoint.completed_tool_calls.clone());
                    self.checkpointer.advance(&checkpoint).await?;
                    self.threads.save_turn(&TurnRecord { turn: turn.clone(), pending_approval: None }).await?;
                }

                GraphState::Answering(_) => {
                    graph_state = GraphState::Done;
                }

                GraphState::Done => {
                    turn.ended_at = Some(Timestamp::now());
                    let answer = turn.final_answer.clone().unwrap_or_default();
                    self.threads.save_turn(&TurnRecord { turn: turn.clone(), pending_approval: None }).await?;
                    self.threads.save_thread(thread).await?;
                    self.audit.record(bestbox_audit::AuditEntry::turn_end(turn.turn_id, thread.thread_id, &state.user_context.user_id, state.user_context.org_id.clone(), "done", turn.tool_call_count)).await;
                    return Ok(TurnOutcome::Done { thread_id: thread.thread_id, turn_id: turn.turn_id, answer });
                }

                GraphState::Failed => {
                    return self.fail_turn(thread, turn, RuntimeError::Internal("turn failed".to_owned()), observer).await;
                }
            }
        }
    }

    /// Finalize a turn that cannot continue and hand the originating error
    /// back to the caller — `bestbox-server` maps it to an HTTP status via
    /// [`RuntimeError::to_core_error`] rather than this ever surfacing as a
    /// plain 200 body.
    async fn fail_turn(&self, thread: &mut Thread, turn: &mut Turn, error: RuntimeError, _observer: &dyn TurnObserver) -> RuntimeResult<TurnOutcome> {
        turn.ended_at = Some(Timestamp::now());
        thread.status = ThreadStatus::Failed;
        self.threads.save_turn(&TurnRecord { turn: turn.clone(), pending_approval: None }).await?;
        self.threads.save_thread(thread).await?;
        self.audit
            .record(bestbox_audit::AuditEntry::turn_end(turn.turn_id, thread.thread_id, &thread.user_context.user_id, thread.user_context.org_id.clone(), "failed", turn.tool_call_count))
            .await;
        tracing::warn!(thread_id = %thread.thread_id, turn_id = %turn.turn_id, %error, "turn failed");
        Err(error)
    }

    /// `Mold` queries fan out to the retriever and typically need another
    /// round-trip for citation-grounded synthesis; every other domain is a
    /// one- or two-tool-call lookup (spec §4.6 simple/complex deadlines).
    fn deadline_for(&self, agent: AgentName) -> Duration {
        if agent == AgentName::Mold {
            Duration::from_secs(self.limits.turn_deadline_seconds_complex)
        } else {
            Duration::from_secs(self.limits.turn_deadline_seconds)
        }
    }

    async fn route(&self, input_text: &str) -> RuntimeResult<AgentName> {
        let _lease = self.acquire_llm_lease().await?;
        Ok(router::decide(&self.router_llm, &self.lexicon, input_text).await)
    }

    /// Re-prompt `agent` with no tools offered, so a model stuck looping
    /// tool calls is forced to synthesize from what it already has (spec
    /// §4.6, §8 scenario 5: `MAX_TOOL_CALLS_PER_TURN` injects a
    /// forced-answer instruction rather than failing the turn).
    async fn force_final_answer(&self, agent: AgentName, state: &mut AgentState, observer: &dyn TurnObserver) -> RuntimeResult<String> {
        let system = persona::specialist_prompt(agent);
        let response = self.complete_compacted(&self.specialist_llm, system, &state.messages, &[]).await?;
        let text = response.message.text().unwrap_or_default().to_owned();
        observer.on_step(&ReasoningStep::Answer { text: text.clone() });
        state.push_message(CoreMessage::assistant(text.clone()));
        Ok(text)
    }

    async fn step_specialist(&self, agent: AgentName, state: &mut AgentState, turn: &mut Turn, observer: &dyn TurnObserver) -> RuntimeResult<StepOutcome> {
        let system = persona::specialist_prompt(agent);
        let tool_defs = self.tool_defs_for(agent);

        let response = self.complete_compacted(&self.specialist_llm, system, &state.messages, &tool_defs).await?;

        if let Some(reasoning) = response.reasoning.as_ref().filter(|r| !r.is_empty()) {
            observer.on_step(&ReasoningStep::Think { text: reasoning.clone() });
        }

        let Some(call) = response.message.tool_calls().and_then(|calls| calls.first()) else {
            let text = response.message.text().unwrap_or_default().to_owned();

            // Unrepairable tool-call JSON degrades to a plain no-tool-call
            // response (spec §4.4 point 2) rather than failing the turn.
            // Issue one corrective re-prompt asking the specialist to retry
            // with valid arguments; a second failure falls through to a
            // genuine final answer instead of looping forever.
            if response.tool_call_repair_failed && !state.tool_json_reprompted {
                state.tool_json_reprompted = true;
                tracing::warn!(turn_id = %turn.turn_id, agent = ?agent, "tool-call JSON unrepairable, issuing corrective re-prompt");
                state.push_message(CoreMessage::system(
                    "Your previous tool call's arguments were not valid JSON and could not be used. Re-issue the call with well-formed JSON arguments, or answer directly if you have enough information.",
                ));
                return Ok(StepOutcome::Reprompted);
            }

            observer.on_step(&ReasoningStep::Answer { text: text.clone() });
            state.push_message(CoreMessage::assistant(text.clone()));
            return Ok(StepOutcome::FinalAnswer(text));
        };
        let call = call.clone();

        let outcome = self.tools.invoke(&call.name, call.arguments.clone(), &state.user_context).await;

        if let ToolOutcome::PendingApproval(envelope) = outcome {
            observer.on_step(&ReasoningStep::Act { tool_name: call.name.clone(), tool_call_id: envelope.tool_call_id });
            let mut assistant_msg = CoreMessage::assistant(String::new());
            assistant_msg.tool_name = Some(call.name.clone());
            assistant_msg.tool_call_id = Some(envelope.tool_call_id);
            assistant_msg.tool_args = Some(call.arguments.clone());
            state.push_message(assistant_msg);
            return Ok(StepOutcome::AwaitingApproval(envelope));
        }

        let tool_call_id = ToolCallId::new();
        observer.on_step(&ReasoningStep::Act { tool_name: call.name.clone(), tool_call_id });
        let mut assistant_msg = CoreMessage::assistant(String::new());
        assistant_msg.tool_name = Some(call.name.clone());
        assistant_msg.tool_call_id = Some(tool_call_id);
        assistant_msg.tool_args = Some(call.arguments.clone());
        state.push_message(assistant_msg);

        self.record_tool_outcome(state, turn, tool_call_id, &call.name, &call.arguments, outcome, observer).await;

        Ok(StepOutcome::ToolExecuted)
    }

    /// Append the tool result to the message history, bump both the
    /// checkpointed [`AgentState::tool_call_count`] and the durable
    /// [`Turn::tool_call_count`] mirror, and record an audit entry.
    async fn record_tool_outcome(&self, state: &mut AgentState, turn: &mut Turn, tool_call_id: ToolCallId, tool_name: &str, args: &serde_json::Value, outcome: ToolOutcome, observer: &dyn TurnObserver) {
        let summary = outcome_summary(&outcome);
        observer.on_step(&ReasoningStep::Observe { tool_call_id, summary: summary.clone() });
        let ok = matches!(outcome, ToolOutcome::Ok { .. });
        let content = serde_json::to_string(&outcome).unwrap_or_else(|_| "{}".to_owned());
        state.push_message(CoreMessage::tool_result(tool_call_id, tool_name, content));
        state.tool_call_count = state.tool_call_count.saturating_add(1);
        turn.tool_call_count = state.tool_call_count;
        self.audit.record(bestbox_audit::AuditEntry::tool_call(turn.turn_id, turn.thread_id, &state.user_context.user_id, state.user_context.org_id.clone(), tool_name, args, ok, &summary)).await;
    }

    fn tool_defs_for(&self, agent: AgentName) -> Vec<LlmToolDefinition> {
        catalog::tools_for(agent)
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| {
                let spec = tool.spec();
                LlmToolDefinition::new(spec.name.clone()).with_description(spec.description.clone()).with_schema(spec.arg_schema.clone())
            })
            .collect()
    }

    /// Acquire the GPU lease gating an LLM call (spec §4.8 C8). A contended
    /// device surfaces as [`RuntimeError::ResourceBusy`] rather than letting
    /// the call through unscheduled; a device that was never configured is a
    /// deployment choice, not contention, so that case still degrades to
    /// running without a lease.
    async fn acquire_llm_lease(&self) -> RuntimeResult<Option<GpuLease>> {
        let Some(gpu_id) = self.llm_gpu_id.as_ref() else { return Ok(None) };
        match self.gpu.acquire_with_timeout(gpu_id, GpuClass::LlmPrimary, 0, self.gpu_acquire_timeout).await {
            Ok(lease) => Ok(Some(lease)),
            Err(bestbox_gpu::GpuError::UnknownDevice) => {
                tracing::warn!(gpu_id, "LLM GPU device not configured, proceeding without a lease");
                Ok(None)
            }
            Err(bestbox_gpu::GpuError::ResourceBusy) => Err(RuntimeError::ResourceBusy { resource: format!("{gpu_id}:llm_primary") }),
        }
    }

    /// Compact `history` and call `llm`, retrying once with aggressive
    /// compaction if the compacted request still overflowed the model's
    /// context window (spec §7).
    async fn complete_compacted(&self, llm: &Arc<dyn LlmProvider>, system: &str, history: &[CoreMessage], tools: &[LlmToolDefinition]) -> RuntimeResult<LlmResponse> {
        let compaction = self.context.compact(system, history).await;
        let llm_messages = convert::to_llm_messages(&compaction.messages);
        match self.complete_with_retry(llm, &llm_messages, tools, system).await {
            Err(RuntimeError::ContextOverflow { current, max }) => {
                tracing::warn!(current, max, "context overflow after compaction, retrying with aggressive compaction");
                let aggressive = self.context.compact_aggressive(system, history).await;
                let llm_messages = convert::to_llm_messages(&aggressive.messages);
                self.complete_with_retry(llm, &llm_messages, tools, system).await
            }
            other => other,
        }
    }

    async fn complete_with_retry(&self, llm: &Arc<dyn LlmProvider>, messages: &[bestbox_llm::Message], tools: &[LlmToolDefinition], system: &str) -> RuntimeResult<LlmResponse> {
        let _lease = self.acquire_llm_lease().await?;
        let config = bestbox_core::RetryConfig::runtime_default();
        let outcome = bestbox_core::retry(
            &config,
            |error: &LlmError| matches!(error, LlmError::UpstreamUnavailable(_) | LlmError::ApiRequestFailed(_) | LlmError::StreamingError(_)),
            |_attempt| async { llm.complete(messages, tools, system).await },
        )
        .await;
        match outcome {
            bestbox_core::RetryOutcome::Success(response) => Ok(response),
            bestbox_core::RetryOutcome::Exhausted { error, .. } => Err(RuntimeError::from(error)),
        }
    }
}

fn outcome_summary(outcome: &ToolOutcome) -> String {
    match outcome {
        ToolOutcome::Ok { data } => data.to_string(),
        ToolOutcome::Err { message, .. } => message.clone(),
        ToolOutcome::PendingApproval(envelope) => envelope.summary.clone(),
    }
}
