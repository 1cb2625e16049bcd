use crate::models::group::Group;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// GET /user body
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub uid: i64,
    pub username: String,
    pub authenticated: bool,
    pub admin: bool,
    pub password_editable: bool,
    pub default_cid: i64,
    pub timezone: Option<String>,
    pub locale: String,
    pub groups: Vec<GroupResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupResponse {
    pub gid: i64,
    pub cid: i64,
    pub name: String,
}

impl From<&Group> for GroupResponse {
    fn from(group: &Group) -> Self {
        Self {
            gid: group.gid,
            cid: group.cid,
            name: group.name.clone(),
        }
    }
}
