use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
    Error,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Passed => "passed",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
            StepStatus::Error => "error",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, StepStatus::Failed | StepStatus::Error)
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, StepStatus::Pending | StepStatus::Running)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub step_id: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    // Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StepResult>,
}

impl StepResult {
    pub fn new(step_id: impl Into<String>, status: StepStatus) -> Self {
        Self {
            step_id: step_id.into(),
            status,
            start_time: None,
            end_time: None,
            duration: None,
            error: None,
            screenshot: None,
            logs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn passed(step_id: impl Into<String>) -> Self {
        Self::new(step_id, StepStatus::Passed)
    }

    pub fn failed(step_id: impl Into<String>, error: impl Into<String>) -> Self {
        let mut result = Self::new(step_id, StepStatus::Failed);
        result.error = Some(error.into());
        result
    }

    pub fn skipped(step_id: impl Into<String>) -> Self {
        Self::new(step_id, StepStatus::Skipped)
    }

    pub fn with_children(mut self, children: Vec<StepResult>) -> Self {
        self.children = children;
        self
    }

    fn tally(&self, summary: &mut ResultSummary) {
        summary.total += 1;
        match self.status {
            StepStatus::Passed => summary.passed += 1,
            StepStatus::Failed | StepStatus::Error => summary.failed += 1,
            StepStatus::Skipped => summary.skipped += 1,
            StepStatus::Pending | StepStatus::Running => {}
        }
        for child in &self.children {
            child.tally(summary);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl ResultSummary {
    pub fn of(steps: &[StepResult]) -> Self {
        let mut summary = ResultSummary::default();
        for step in steps {
            step.tally(&mut summary);
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_id: Option<i64>,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub steps: Vec<StepResult>,
    pub summary: ResultSummary,
}

impl ScriptResult {
    pub fn from_steps(script_id: Option<i64>, steps: Vec<StepResult>) -> Self {
        let summary = ResultSummary::of(&steps);
        let status = overall_status(&steps);
        Self {
            script_id,
            status,
            start_time: None,
            end_time: None,
            duration: None,
            steps,
            summary,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0 || self.status.is_failure()
    }
}

fn overall_status(steps: &[StepResult]) -> StepStatus {
    let statuses: Vec<StepStatus> = steps.iter().map(|step| step.status).collect();
    if statuses.contains(&StepStatus::Error) {
        StepStatus::Error
    } else if statuses.contains(&StepStatus::Failed) {
        StepStatus::Failed
    } else if statuses.contains(&StepStatus::Running) {
        StepStatus::Running
    } else if statuses.is_empty() || statuses.contains(&StepStatus::Pending) {
        StepStatus::Pending
    } else if statuses.iter().all(|status| *status == StepStatus::Skipped) {
        StepStatus::Skipped
    } else {
        StepStatus::Passed
    }
}

impl fmt::Display for ScriptResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            writeln!(f, "No step results.")?;
            return Ok(());
        }

        writeln!(
            f,
            "Execution {}: {} total, {} passed, {} failed, {} skipped",
            self.status,
            self.summary.total,
            self.summary.passed,
            self.summary.failed,
            self.summary.skipped
        )?;
        for step in &self.steps {
            write_step(f, step, 1)?;
        }
        Ok(())
    }
}

fn write_step(f: &mut fmt::Formatter<'_>, step: &StepResult, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    write!(f, "{indent}- [{}] {}", step.status, step.step_id)?;
    if let Some(duration) = step.duration {
        write!(f, " ({duration:.0} ms)")?;
    }
    writeln!(f)?;
    if let Some(error) = &step.error {
        for line in error.lines() {
            writeln!(f, "{indent}    {line}")?;
        }
    }
    for child in &step.children {
        write_step(f, child, depth + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_nested_results() {
        let result = ScriptResult::from_steps(
            Some(7),
            vec![
                StepResult::passed("a"),
                StepResult::passed("loop").with_children(vec![
                    StepResult::passed("b"),
                    StepResult::failed("c", "element not found"),
                ]),
                StepResult::skipped("d"),
            ],
        );
        assert_eq!(
            result.summary,
            ResultSummary {
                total: 5,
                passed: 3,
                failed: 1,
                skipped: 1
            }
        );
        assert!(result.has_failures());
    }

    #[test]
    fn overall_status_prefers_the_worst_outcome() {
        let passed = ScriptResult::from_steps(None, vec![StepResult::passed("a")]);
        assert_eq!(passed.status, StepStatus::Passed);
        assert!(!passed.has_failures());

        let skipped = ScriptResult::from_steps(None, vec![StepResult::skipped("a")]);
        assert_eq!(skipped.status, StepStatus::Skipped);

        let error = ScriptResult::from_steps(
            None,
            vec![
                StepResult::failed("a", "boom"),
                StepResult::new("b", StepStatus::Error),
            ],
        );
        assert_eq!(error.status, StepStatus::Error);

        assert_eq!(ScriptResult::from_steps(None, Vec::new()).status, StepStatus::Pending);
    }

    #[test]
    fn results_use_engine_field_names() {
        let json = serde_json::json!({
            "stepId": "s1",
            "status": "failed",
            "startTime": "2024-01-01T00:00:00Z",
            "duration": 120.0,
            "error": "timeout",
            "logs": ["clicked"]
        });
        let result: StepResult = serde_json::from_value(json).expect("parse result");
        assert_eq!(result.status, StepStatus::Failed);
        assert_eq!(result.logs, vec!["clicked".to_string()]);
        assert!(result.children.is_empty());
    }

    #[test]
    fn display_lists_steps_with_errors() {
        let result = ScriptResult::from_steps(
            None,
            vec![StepResult::failed("s1", "expected 'ok'\ngot 'ko'")],
        );
        let rendered = result.to_string();
        assert!(rendered.starts_with("Execution failed: 1 total, 0 passed, 1 failed, 0 skipped"));
        assert!(rendered.contains("  - [failed] s1"));
        assert!(rendered.contains("      got 'ko'"));
    }
}
