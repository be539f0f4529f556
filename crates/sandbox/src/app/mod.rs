mod bootstrap;
mod kitchen;
mod loop_runner;
mod script;

pub(crate) use bootstrap::init_tracing;
pub(crate) use loop_runner::{run_replay, run_windowed};
