//! Agent-action runtime: the action contract, the execution dispatcher,
//! background jobs, and the test harness.

pub mod action;
pub mod capability;
pub mod dispatcher;
pub mod job;
pub mod testing;

pub use action::{AgentAction, HasTools, StreamingResponse, StructuredOutput};
pub use capability::{Capabilities, Strategy};
pub use dispatcher::{ActionRunner, Dispatcher};
pub use job::{fingerprint, ActionJob, JobQueue, LocalQueue, SubmitOutcome};
