//! Evaluation rollouts: drive one episode with a policy and record every step.

use tracing::{debug, info};

use super::env::GridEnv;
use super::policy::Policy;
use super::types::{Observation, StepRecord};
use crate::error::EnvError;

/// Recorded outcome of one evaluation episode.
#[derive(Debug, Clone)]
pub struct Episode {
    /// Name of the policy that produced the actions.
    pub policy: &'static str,
    /// Row the episode started from.
    pub start: usize,
    /// One record per step taken.
    pub records: Vec<StepRecord>,
}

impl Episode {
    /// Sum of rewards over the episode.
    pub fn total_reward(&self) -> f32 {
        self.records.iter().map(|r| r.reward).sum()
    }

    /// Whether the episode ended by exhausting the series.
    pub fn truncated(&self) -> bool {
        self.records.last().is_some_and(|r| r.truncated)
    }
}

/// Resets `env` with `seed` and steps it with `policy` until the episode is
/// done or `max_steps` steps were taken.
pub fn run_episode<P: Policy>(
    env: &mut GridEnv,
    policy: &mut P,
    seed: Option<u64>,
    max_steps: usize,
) -> Episode {
    let (observation, _info) = env.reset(seed);
    run_from(env, policy, observation, max_steps)
}

/// Like [`run_episode`] but starts from an explicit row.
///
/// # Errors
///
/// Returns `EnvError::StartOutOfRange` if `start` is not a valid row.
pub fn run_episode_at<P: Policy>(
    env: &mut GridEnv,
    policy: &mut P,
    start: usize,
    max_steps: usize,
) -> Result<Episode, EnvError> {
    let (observation, _info) = env.reset_at(start)?;
    Ok(run_from(env, policy, observation, max_steps))
}

fn run_from<P: Policy>(
    env: &mut GridEnv,
    policy: &mut P,
    mut observation: Observation,
    max_steps: usize,
) -> Episode {
    let start = env.cursor();
    let mut records = Vec::with_capacity(max_steps.min(env.series().len() - start));

    for t in 0..max_steps {
        let action = policy.act(&observation);
        let timestamp = env.row().timestamp;
        let step = env.step(action);

        let record = StepRecord {
            step: t,
            timestamp,
            action,
            load: observation.load,
            solar: observation.solar,
            wind: observation.wind_total,
            battery_power: step.info.battery_power,
            soc: step.info.soc,
            net_grid_exchange: step.info.net_grid_exchange,
            reward: step.reward,
            truncated: step.truncated,
        };
        debug!("{record}");
        records.push(record);

        if step.done() {
            break;
        }
        observation = step.observation;
    }

    let episode = Episode {
        policy: policy.name(),
        start,
        records,
    };
    info!(
        policy = episode.policy,
        start,
        steps = episode.records.len(),
        total_reward = episode.total_reward(),
        truncated = episode.truncated(),
        "episode finished"
    );
    episode
}
