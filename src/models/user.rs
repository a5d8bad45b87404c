use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// bcrypt digest
    #[serde(skip_serializing)]
    pub password: String,
    pub profile_image: Option<String>,
}
