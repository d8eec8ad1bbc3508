use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Serialize, FromRow, Debug)]
pub struct CollegeEntry {
    pub id: Uuid,
    pub name: String,
}
