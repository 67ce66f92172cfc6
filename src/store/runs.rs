
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failed,
    Running,
}

/// One execution record. `automation_id` is not checked against the
/// automation store; runs whose automation is gone are simply never matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub id: String,
    pub automation_id: String,
    pub status: RunStatus,
    pub start_time: i64,
    pub duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStore {
    runs: Vec<Run>,
}

impl RunStore {
    pub fn new(runs: Vec<Run>) -> Self {
        Self { runs }
    }

    pub fn sample(now_ms: i64) -> Self {
        let seed = |id: &str, automation_id: &str, status, age_ms: i64, duration: &str| Run {
            id: id.to_string(),
            automation_id: automation_id.to_string(),
            status,
            start_time: now_ms - age_ms,
            duration: duration.to_string(),
        };

        Self::new(vec![
            seed("r1", "a1", RunStatus::Success, 3_600_000, "2m 15s"),
            seed("r2", "a1", RunStatus::Success, 86_400_000, "2m 10s"),
            seed("r3", "a3", RunStatus::Failed, 1_800_000, "15s"),
            seed("r4", "a2", RunStatus::Running, 30_000, "30s"),
        ])
    }

    #[cfg(test)]
    pub fn all(&self) -> &[Run] {
        &self.runs
    }

    pub fn runs_for(&self, automation_id: Option<&str>) -> Vec<&Run> {
        let Some(automation_id) = automation_id else {
            return Vec::new();
        };
        self.runs
            .iter()
            .filter(|run| run.automation_id == automation_id)
            .collect()
    }
}
