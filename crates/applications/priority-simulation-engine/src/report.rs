//! Run reports: text tables for the terminal and a JSON summary

use serde::{Deserialize, Serialize};

use crate::job::PriorityJob;
use crate::types::{Cloudlet, JobId};

/// One job's priority state at report time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRow {
    pub id: JobId,
    pub static_level: f64,
    pub dynamic_priority: f64,
    pub wait_ms: i64,
}

impl From<&PriorityJob> for JobRow {
    fn from(job: &PriorityJob) -> Self {
        JobRow {
            id: job.id(),
            static_level: job.static_level(),
            dynamic_priority: job.dynamic_priority(),
            wait_ms: job.wait_elapsed().num_milliseconds(),
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub policy_name: String,
    pub engine_name: String,
    pub unsorted: Vec<JobRow>,
    pub sorted: Vec<JobRow>,
    pub results: Vec<Cloudlet>,
}

impl RunReport {
    /// Ids in the order they were dispatched
    pub fn dispatch_order(&self) -> Vec<JobId> {
        self.sorted.iter().map(|row| row.id).collect()
    }
}

pub fn rows(jobs: &[PriorityJob]) -> Vec<JobRow> {
    jobs.iter().map(JobRow::from).collect()
}

/// Priority table, one line per job
pub fn job_table(rows: &[JobRow]) -> String {
    let mut out = format!(
        "{:<17}{:<17}{:<17}{:<17}\n",
        "Cloudlet Index", "Priority Level", "Priority Value", "Time Elapsed"
    );
    for row in rows {
        out.push_str(&format!(
            "{:<17}{:<17}{:<17.2}{:<17}\n",
            row.id, row.static_level, row.dynamic_priority, row.wait_ms
        ));
    }
    out
}

/// Completed cloudlet table
pub fn results_table(results: &[Cloudlet]) -> String {
    let mut out = format!(
        "{:<13}{:<10}{:>15}{:>8}{:>12}{:>14}{:>14}\n",
        "Cloudlet ID", "STATUS", "Data center ID", "VM ID", "Time", "Start Time", "Finish Time"
    );
    for cloudlet in results {
        if cloudlet.is_finished() {
            out.push_str(&format!(
                "{:<13}{:<10}{:>15}{:>8}{:>12.2}{:>14.2}{:>14.2}\n",
                cloudlet.id,
                cloudlet.status.as_str(),
                cloudlet.datacenter_id.map_or("-".to_string(), |d| d.to_string()),
                cloudlet.vm_id.map_or("-".to_string(), |v| v.to_string()),
                cloudlet.actual_cpu_time().unwrap_or_default(),
                cloudlet.exec_start_time.unwrap_or_default(),
                cloudlet.finish_time.unwrap_or_default(),
            ));
        } else {
            out.push_str(&format!("{:<13}{:<10}\n", cloudlet.id, cloudlet.status.as_str()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aging::LinearAging;
    use crate::types::{CloudletStatus, CloudletTemplate};
    use chrono::{TimeDelta, TimeZone, Utc};

    #[test]
    fn test_job_rows() {
        let policy = LinearAging::default();
        let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut job = PriorityJob::new(4, 3.0, t0, &policy).unwrap();
        job.refresh(t0 + TimeDelta::milliseconds(2000), &policy).unwrap();

        let rows = rows(&[job]);

        assert_eq!(
            rows[0],
            JobRow {
                id: 4,
                static_level: 3.0,
                dynamic_priority: 306.0,
                wait_ms: 2000,
            }
        );
        let table = job_table(&rows);
        assert!(table.starts_with("Cloudlet Index"));
        assert!(table.contains("306.00"));
    }

    #[test]
    fn test_results_table_marks_unfinished() {
        let template = CloudletTemplate::default();
        let mut done = template.build(0);
        done.status = CloudletStatus::Success;
        done.vm_id = Some(1);
        done.datacenter_id = Some(2);
        done.exec_start_time = Some(0.0);
        done.finish_time = Some(1000.0);
        let mut failed = template.build(1);
        failed.status = CloudletStatus::Failed;

        let table = results_table(&[done, failed]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("Success"));
        assert!(lines[1].contains("1000.00"));
        assert_eq!(lines[2].trim_end(), "1            Failed");
    }

    #[test]
    fn test_report_json() {
        let report = RunReport {
            policy_name: "Linear".to_string(),
            engine_name: "LoopbackBroker".to_string(),
            unsorted: Vec::new(),
            sorted: vec![JobRow {
                id: 2,
                static_level: 5.0,
                dynamic_priority: 500.0,
                wait_ms: 0,
            }],
            results: Vec::new(),
        };

        let json = serde_json::to_string(&report).unwrap();
        let parsed: RunReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.dispatch_order(), vec![2]);
        assert_eq!(parsed.policy_name, "Linear");
    }
}
