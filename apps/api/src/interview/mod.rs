// Interview relay: question generation, answer scoring, session summary.
// All provider calls go through `pipeline::Pipeline`; handlers never touch
// the LLM client or the circuit breaker directly.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
