use tracing::info;

use crate::fixtures::{DEMO_ADMIN_ID, DEMO_PARENT_ID, DEMO_STUDENT_ID, DEMO_TEACHER_ID};
use crate::role::Role;
use crate::store::SchoolStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub role: Role,
    pub user_id: String,
    pub display_name: String,
}

pub fn demo_user(role: Role) -> &'static str {
    match role {
        Role::Admin => DEMO_ADMIN_ID,
        Role::Teacher => DEMO_TEACHER_ID,
        Role::Parent => DEMO_PARENT_ID,
        Role::Student => DEMO_STUDENT_ID,
    }
}

impl Session {
    pub fn login(store: &SchoolStore, role: Role) -> Self {
        let user_id = demo_user(role).to_string();
        let display_name = match role {
            Role::Admin => "School Office".to_string(),
            _ => store.person_name(&user_id),
        };
        info!(%role, user = %user_id, "signed in");
        Self {
            role,
            user_id,
            display_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn login_picks_demo_user_for_role() {
        let store = fixtures::seed();
        let session = Session::login(&store, Role::Parent);
        assert_eq!(session.user_id, DEMO_PARENT_ID);
        assert_eq!(session.display_name, "Grace Chen");

        let admin = Session::login(&store, Role::Admin);
        assert_eq!(admin.display_name, "School Office");
    }
}
