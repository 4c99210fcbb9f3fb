/// Episodic environment with reset/step.
pub mod env;
pub mod kpi;
/// Evaluation policies.
pub mod policy;
pub mod power_balance;
pub mod reward;
/// Episode runner.
pub mod rollout;
/// Shared exogenous series and CSV loading.
pub mod series;
pub mod types;
