//! Post-hoc KPI computation from episode records.

use std::fmt;

use super::types::StepRecord;

/// Aggregate key performance indicators of one evaluation episode.
///
/// Computed post-hoc from the step records so reported metrics always match
/// the exported telemetry.
#[derive(Debug, Clone)]
pub struct EpisodeReport {
    /// Number of steps taken.
    pub steps: usize,
    /// Sum of rewards.
    pub total_reward: f32,
    /// Mean reward per step.
    pub mean_reward: f32,
    /// Root-mean-square net grid exchange.
    pub rms_grid_exchange: f32,
    /// Peak import (positive).
    pub peak_import: f32,
    /// Peak export (positive magnitude).
    pub peak_export: f32,
    /// Battery energy throughput (sum of |power| * dt).
    pub battery_throughput: f32,
    /// Battery equivalent full cycles (throughput / 2*capacity).
    pub equivalent_full_cycles: f32,
    /// State of charge after the last step.
    pub final_soc: f32,
}

impl EpisodeReport {
    /// Computes all KPIs from the episode's step records.
    ///
    /// # Arguments
    ///
    /// * `records` - Step records of one episode
    /// * `step_hours` - Step duration in hours
    /// * `battery_capacity` - Battery capacity for cycle calculation
    pub fn from_records(records: &[StepRecord], step_hours: f32, battery_capacity: f32) -> Self {
        let Some(last) = records.last() else {
            return Self {
                steps: 0,
                total_reward: 0.0,
                mean_reward: 0.0,
                rms_grid_exchange: 0.0,
                peak_import: 0.0,
                peak_export: 0.0,
                battery_throughput: 0.0,
                equivalent_full_cycles: 0.0,
                final_soc: 0.0,
            };
        };

        let n = records.len() as f32;
        let mut reward_sum = 0.0_f32;
        let mut sq_sum = 0.0_f32;
        let mut peak_import = 0.0_f32;
        let mut peak_export = 0.0_f32;
        let mut throughput = 0.0_f32;

        for r in records {
            reward_sum += r.reward;
            sq_sum += r.net_grid_exchange * r.net_grid_exchange;
            peak_import = peak_import.max(r.net_grid_exchange);
            peak_export = peak_export.max(-r.net_grid_exchange);
            throughput += r.battery_power.abs() * step_hours;
        }

        let cycles = if battery_capacity > 0.0 {
            throughput / (2.0 * battery_capacity)
        } else {
            0.0
        };

        Self {
            steps: records.len(),
            total_reward: reward_sum,
            mean_reward: reward_sum / n,
            rms_grid_exchange: (sq_sum / n).sqrt(),
            peak_import,
            peak_export,
            battery_throughput: throughput,
            equivalent_full_cycles: cycles,
            final_soc: last.soc,
        }
    }
}

impl fmt::Display for EpisodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Episode Report ---")?;
        writeln!(f, "Steps:                 {}", self.steps)?;
        writeln!(
            f,
            "Reward:                {:.2} total, {:.3} mean",
            self.total_reward, self.mean_reward
        )?;
        writeln!(f, "RMS grid exchange:     {:.2}", self.rms_grid_exchange)?;
        writeln!(f, "Peak import:           {:.2}", self.peak_import)?;
        writeln!(f, "Peak export:           {:.2}", self.peak_export)?;
        writeln!(
            f,
            "Battery throughput:    {:.2} ({:.2} equiv. cycles)",
            self.battery_throughput, self.equivalent_full_cycles
        )?;
        write!(f, "Final SoC:             {:.1}%", self.final_soc * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn make_record(net: f32, battery_power: f32, reward: f32) -> StepRecord {
        StepRecord {
            step: 0,
            timestamp: NaiveDateTime::default(),
            action: 0.0,
            load: 0.0,
            solar: 0.0,
            wind: 0.0,
            battery_power,
            soc: 0.5,
            net_grid_exchange: net,
            reward,
            truncated: false,
        }
    }

    #[test]
    fn reward_totals() {
        let records: Vec<StepRecord> = [-1.0, -2.0, -3.0, -6.0]
            .iter()
            .map(|&r| make_record(0.0, 0.0, r))
            .collect();
        let kpi = EpisodeReport::from_records(&records, 0.25, 1000.0);
        assert_eq!(kpi.steps, 4);
        assert_eq!(kpi.total_reward, -12.0);
        assert_eq!(kpi.mean_reward, -3.0);
    }

    #[test]
    fn rms_and_peaks() {
        // nets: [3, -4] → rms = sqrt(12.5)
        let records = vec![make_record(3.0, 0.0, 0.0), make_record(-4.0, 0.0, 0.0)];
        let kpi = EpisodeReport::from_records(&records, 0.25, 1000.0);
        assert!((kpi.rms_grid_exchange - 12.5_f32.sqrt()).abs() < 1e-5);
        assert_eq!(kpi.peak_import, 3.0);
        assert_eq!(kpi.peak_export, 4.0);
    }

    #[test]
    fn battery_throughput_and_cycles() {
        // |P| = 200 + 200 + 100 + 300 = 800, dt = 0.25 → 200
        let records: Vec<StepRecord> = [200.0, -200.0, 100.0, -300.0]
            .iter()
            .map(|&p| make_record(0.0, p, 0.0))
            .collect();
        let kpi = EpisodeReport::from_records(&records, 0.25, 100.0);
        assert!((kpi.battery_throughput - 200.0).abs() < 1e-4);
        assert!((kpi.equivalent_full_cycles - 1.0).abs() < 1e-6);
    }

    #[test]
    fn final_soc_is_last_record() {
        let mut records = vec![make_record(0.0, 0.0, 0.0); 3];
        records[2].soc = 0.8;
        let kpi = EpisodeReport::from_records(&records, 0.25, 100.0);
        assert_eq!(kpi.final_soc, 0.8);
    }

    #[test]
    fn empty_records() {
        let kpi = EpisodeReport::from_records(&[], 0.25, 1000.0);
        assert_eq!(kpi.steps, 0);
        assert_eq!(kpi.total_reward, 0.0);
        assert_eq!(kpi.battery_throughput, 0.0);
    }

    #[test]
    fn display_mentions_every_kpi() {
        let kpi = EpisodeReport::from_records(&[make_record(1.0, 2.0, -0.5)], 0.25, 10.0);
        let s = kpi.to_string();
        for label in ["Steps", "Reward", "RMS", "Peak import", "Peak export", "throughput", "SoC"] {
            assert!(s.contains(label), "missing {label}");
        }
    }
}
