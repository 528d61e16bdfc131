use crate::error::AttendanceError;

/// What the core needs to know about whoever is calling.
///
/// Identity and role determination live outside the core; any identity type
/// can drive the services by implementing this.
pub trait Capabilities {
    /// `None` for anonymous callers.
    fn user_id(&self) -> Option<u64>;

    fn is_admin(&self) -> bool;

    /// The single team this caller manages, if any.
    fn managed_team(&self) -> Option<u64>;

    fn is_authenticated(&self) -> bool {
        self.user_id().is_some()
    }

    fn manages_team(&self, team_id: u64) -> bool {
        self.managed_team() == Some(team_id)
    }

    fn manages_any_team(&self) -> bool {
        self.managed_team().is_some()
    }

    /// Admin, or manager of `team_id`.
    fn supervises(&self, team_id: Option<u64>) -> bool {
        self.is_admin() || team_id.is_some_and(|id| self.manages_team(id))
    }

    fn require_auth(&self) -> Result<u64, AttendanceError> {
        self.user_id().ok_or(AttendanceError::Unauthenticated)
    }
}

/// A caller that presented no credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Capabilities for Anonymous {
    fn user_id(&self) -> Option<u64> {
        None
    }

    fn is_admin(&self) -> bool {
        false
    }

    fn managed_team(&self) -> Option<u64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Manager;

    impl Capabilities for Manager {
        fn user_id(&self) -> Option<u64> {
            Some(5)
        }

        fn is_admin(&self) -> bool {
            false
        }

        fn managed_team(&self) -> Option<u64> {
            Some(10)
        }
    }

    #[test]
    fn anonymous_has_no_capabilities() {
        assert!(!Anonymous.is_authenticated());
        assert!(!Anonymous.supervises(Some(1)));
        assert!(matches!(
            Anonymous.require_auth(),
            Err(AttendanceError::Unauthenticated)
        ));
    }

    #[test]
    fn manager_supervises_only_their_team() {
        assert!(Manager.manages_team(10));
        assert!(Manager.supervises(Some(10)));
        assert!(!Manager.supervises(Some(11)));
        assert!(!Manager.supervises(None));
        assert_eq!(Manager.require_auth().unwrap(), 5);
    }
}
