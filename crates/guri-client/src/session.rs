use guri_types::User;

/// Who the client is acting as.
///
/// Login and registration move to `Authenticated`; logout and any 401 move back to
/// `Anonymous`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { token: String, user: User },
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Authenticated { token, .. } => Some(token),
            Session::Anonymous => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Authenticated { user, .. } => Some(user),
            Session::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guri_types::Role;

    #[test]
    fn test_session_accessors() {
        let anonymous = Session::default();
        assert!(!anonymous.is_authenticated());
        assert_eq!(anonymous.token(), None);

        let user = User {
            id: 7,
            name: "Amina".to_string(),
            email: "amina@guri.so".to_string(),
            role: Role::Agent,
            created_at: "2026-01-01T00:00:00Z".parse().unwrap(),
        };
        let session = Session::Authenticated {
            token: "jwt".to_string(),
            user: user.clone(),
        };
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("jwt"));
        assert_eq!(session.user(), Some(&user));
    }
}
