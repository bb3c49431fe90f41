use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/event.ts")]
pub enum EventKind {
    Evaluacion,
    Entrega,
    Otro,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Evaluacion => write!(f, "evaluacion"),
            EventKind::Entrega => write!(f, "entrega"),
            EventKind::Otro => write!(f, "otro"),
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "evaluacion" | "evaluación" => Ok(EventKind::Evaluacion),
            "entrega" => Ok(EventKind::Entrega),
            "otro" | "" => Ok(EventKind::Otro),
            _ => Err(format!("Invalid event kind: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/event.ts")]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub course: String,
    pub kind: EventKind,
    pub created_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub course: String,
    pub kind: EventKind,
    pub created_by: Option<i64>,
}
