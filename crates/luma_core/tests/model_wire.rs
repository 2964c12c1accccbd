use luma_core::{Note, Project, Task};
use serde_json::json;

#[test]
fn task_uses_camel_case_and_omits_absent_optionals() {
    let task: Task = serde_json::from_value(json!({
        "id": "1704880000000-abc123def",
        "title": "Draft plan",
        "description": "",
        "completed": false,
        "createdAt": "2024-01-10T09:00:00.000Z",
        "updatedAt": "2024-01-10T09:00:00.000Z"
    }))
    .unwrap();
    assert_eq!(task.project_id, None);
    assert_eq!(task.date, None);

    let value = serde_json::to_value(&task).unwrap();
    assert!(value.get("projectId").is_none());
    assert!(value.get("date").is_none());
    assert_eq!(value["id"], "1704880000000-abc123def");
    assert!(value["createdAt"].as_str().unwrap().starts_with("2024-01-10T09:00:00"));
}

#[test]
fn task_with_schedule_and_project_roundtrips() {
    let value = json!({
        "id": "t1",
        "title": "Ship",
        "description": "v1",
        "projectId": "p1",
        "date": "2024-01-10",
        "completed": true,
        "createdAt": "2024-01-10T09:00:00Z",
        "updatedAt": "2024-01-11T09:00:00Z"
    });
    let task: Task = serde_json::from_value(value).unwrap();
    assert_eq!(task.project_id.as_deref(), Some("p1"));
    assert_eq!(task.date.as_deref(), Some("2024-01-10"));
    assert!(task.updated_at > task.created_at);

    let encoded = serde_json::to_value(&task).unwrap();
    assert_eq!(encoded["projectId"], "p1");
    assert_eq!(encoded["date"], "2024-01-10");
}

#[test]
fn project_keeps_vestigial_tasks_field() {
    let project: Project = serde_json::from_value(json!({
        "id": "p1",
        "name": "Launch",
        "description": "Q1 launch",
        "tasks": [],
        "createdAt": "2024-01-10T09:00:00Z",
        "updatedAt": "2024-01-10T09:00:00Z"
    }))
    .unwrap();
    let encoded = serde_json::to_value(&project).unwrap();
    assert_eq!(encoded["tasks"], json!([]));
}

#[test]
fn note_tag_sets_use_camel_case_names() {
    let note: Note = serde_json::from_value(json!({
        "id": "n1",
        "title": "Ideas",
        "body": "# one",
        "projectIds": ["p1"],
        "taskIds": ["t1", "t2"],
        "createdAt": "2024-01-10T09:00:00Z",
        "updatedAt": "2024-01-10T09:00:00Z"
    }))
    .unwrap();
    assert_eq!(note.project_ids, vec!["p1".to_string()]);
    assert_eq!(note.task_ids.len(), 2);
}
