//! # Plan Agent
//!
//! Turns a natural-language goal into an actionable plan.
//!
//! This library provides:
//! - A two-phase planner that lets the model call tools before answering
//! - Web search and current-weather tools
//! - Plan persistence and an HTTP API for submission and history
//!
//! ## Architecture
//!
//! A planning request runs at most two model calls:
//! 1. Send the system prompt, the goal and the tool schemas
//! 2. If the model asks for tools, execute every call in order
//! 3. Send the tool results back without tools and take the final text
//!
//! ## Example
//!
//! ```rust,ignore
//! use plan_agent::{agent::{Planner, PlanOptions}, Config};
//!
//! let config = Config::from_env()?;
//! let planner = Planner::new(&config)?;
//! let outcome = planner.create_plan("Weekend in Paris", PlanOptions::default()).await;
//! println!("{}", outcome.plan);
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod tools;

pub use config::Config;
