//! CLI command implementations.

mod ask;
mod assist;
mod config;
mod doctor;
mod eval;
mod ingest;
mod lookup;
mod serve;

pub use ask::run_ask;
pub use assist::run_assist;
pub use config::run_config;
pub use doctor::run_doctor;
pub use eval::run_eval;
pub use ingest::run_ingest;
pub use lookup::{run_define, run_search, run_weather};
pub use serve::{router, run_serve, AppState};
