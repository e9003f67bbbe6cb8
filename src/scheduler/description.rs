use serde::{Deserialize, Serialize};

/// Task group specification, opaque to the controller. Backends build these
/// and the scheduler client serializes them as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskGroup(pub serde_json::Value);

impl From<serde_json::Value> for TaskGroup {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// What gets submitted to the scheduler for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobDescription {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub task_groups: Vec<TaskGroup>,
}

impl JobDescription {
    pub fn new(id: String, name: String, task_groups: Vec<TaskGroup>) -> Self {
        Self {
            id,
            name,
            task_groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_scheduler_field_names() {
        let desc = JobDescription::new(
            "vmck-3".to_string(),
            "vmck job #3".to_string(),
            vec![TaskGroup(json!({"Name": "test", "Count": 1}))],
        );
        let value = serde_json::to_value(&desc).unwrap();
        assert_eq!(
            value,
            json!({
                "ID": "vmck-3",
                "Name": "vmck job #3",
                "TaskGroups": [{"Name": "test", "Count": 1}],
            })
        );
    }
}
