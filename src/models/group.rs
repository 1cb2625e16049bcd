/// A named set of users within one calendar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub gid: i64,
    pub cid: i64,
    pub name: String,
}
