//! The engine runtime.
//!
//! [`Engine`] owns everything that is shared across sessions and never
//! changes during play: configuration, the function table expressions call
//! into, the condition evaluator and the effect applier. Sessions own the
//! mutable data; one engine can drive many sessions.

use crate::core::{EngineConfig, GameState};
use crate::effects::{Effect, EffectApplier, EffectContext, EffectResult, Pipeline, StandardApplier};
use crate::error::Result;
use crate::expr::{eval_value, ConditionEvaluator, Document, Expr, FunctionTable, Outcome, StandardEvaluator, Value};
use crate::responses::{submit_choice, ChoiceId};
use crate::triggers::{
    fire_request_event, resume_request_event, DispatchResult, EventContext, EventCounters, GameEvent, TriggerId,
    TriggerRegistry,
};

/// Session-independent runtime.
pub struct Engine {
    config: EngineConfig,
    functions: FunctionTable,
    evaluator: Box<dyn ConditionEvaluator>,
    applier: Box<dyn EffectApplier>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("functions", &self.functions)
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Create an engine with the builtin functions and the standard
    /// evaluator and applier.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            functions: FunctionTable::with_builtins(),
            evaluator: Box::new(StandardEvaluator),
            applier: Box::new(StandardApplier),
        }
    }

    /// Replace the function table (builder pattern).
    #[must_use]
    pub fn with_functions(mut self, functions: FunctionTable) -> Self {
        self.functions = functions;
        self
    }

    /// Replace the condition evaluator (builder pattern).
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: impl ConditionEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    /// Replace the effect applier (builder pattern).
    #[must_use]
    pub fn with_applier(mut self, applier: impl EffectApplier + 'static) -> Self {
        self.applier = Box::new(applier);
        self
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Function table.
    #[must_use]
    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    // === Capabilities ===

    /// Evaluate a condition.
    ///
    /// # Errors
    ///
    /// Unknown functions and rejected arguments.
    pub fn evaluate(&self, condition: &Expr, document: &Document) -> Result<Outcome> {
        self.evaluator.evaluate(condition, document, &self.functions)
    }

    /// Evaluate an expression to a value.
    ///
    /// # Errors
    ///
    /// Unknown functions and rejected arguments.
    pub fn eval_value(&self, expr: &Expr, document: &Document) -> Result<Value> {
        eval_value(expr, document, &self.functions)
    }

    /// Start a pipeline for one top-level dispatch. The depth bound comes
    /// from the configuration.
    #[must_use]
    pub fn pipeline(&self, state: GameState, registry: TriggerRegistry, counters: EventCounters) -> Pipeline {
        let events = EventContext::new(counters).with_max_depth(self.config.max_event_depth);
        Pipeline::new(state, registry, events)
    }

    // === Entry Points ===

    /// Dispatch a request event. See [`fire_request_event`].
    ///
    /// # Errors
    ///
    /// Recursion overflow and fatal effect errors.
    pub fn fire_request_event(&self, pipeline: Pipeline, event: GameEvent) -> Result<DispatchResult> {
        fire_request_event(self, pipeline, event)
    }

    /// Finish a paused dispatch. See [`resume_request_event`].
    ///
    /// # Errors
    ///
    /// Recursion overflow and fatal effect errors.
    pub fn resume_request_event(
        &self,
        pipeline: Pipeline,
        event: GameEvent,
        remaining: &[TriggerId],
        prevented: bool,
    ) -> Result<DispatchResult> {
        resume_request_event(self, pipeline, event, remaining, prevented)
    }

    /// Apply an effect tree with the configured applier.
    ///
    /// # Errors
    ///
    /// Fatal effect errors.
    pub fn apply_effect(&self, pipeline: Pipeline, effect: &Effect, ctx: &EffectContext) -> Result<EffectResult> {
        self.applier.apply(self, pipeline, effect, ctx)
    }

    /// Answer the pending choice and resume its chain. See [`submit_choice`].
    ///
    /// # Errors
    ///
    /// Unknown or resolved choice, invalid selection, fatal effect errors.
    pub fn submit_choice(&self, pipeline: Pipeline, id: ChoiceId, selection: &str) -> Result<EffectResult> {
        submit_choice(self, pipeline, id, selection)
    }
}
