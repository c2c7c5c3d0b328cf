//! Agent module - turns a goal into a plan.
//!
//! The planner runs a bounded tool-calling exchange:
//! 1. Build context with system prompt and the user's goal
//! 2. Call the LLM with the lookup tools on offer
//! 3. If the LLM requests tool calls, execute them and feed results back
//! 4. Call the LLM once more, without tools, for the final plan

mod planner;
mod prompt;

pub use planner::{PlanError, PlanOptions, PlanOutcome, PlanStatus, Planner, PLAN_TEMPERATURE};
pub use prompt::{build_user_prompt, SYSTEM_PROMPT};
