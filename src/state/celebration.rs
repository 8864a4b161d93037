/// Celebration shown for the leader, either on demand or when the countdown ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Celebration {
    active: bool,
    leader_name: String,
}

impl Celebration {
    /// Create an inactive celebration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the celebration is showing.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Leader name captured at activation; empty while inactive or when there was no leader.
    pub fn leader_name(&self) -> &str {
        &self.leader_name
    }

    /// Celebrate `leader_name`, replacing any name captured earlier. Returns
    /// `false` when already celebrating that same name.
    pub fn activate(&mut self, leader_name: impl Into<String>) -> bool {
        let leader_name = leader_name.into();
        if self.active && self.leader_name == leader_name {
            return false;
        }
        self.active = true;
        self.leader_name = leader_name;
        true
    }

    /// Stop celebrating. Returns `false` if it was not active.
    pub fn deactivate(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.leader_name.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_records_leader() {
        let mut celebration = Celebration::new();
        assert!(celebration.activate("Ana"));
        assert!(celebration.is_active());
        assert_eq!(celebration.leader_name(), "Ana");
    }

    #[test]
    fn activate_same_leader_is_idempotent() {
        let mut celebration = Celebration::new();
        celebration.activate("Ana");
        assert!(!celebration.activate("Ana"));
        assert_eq!(celebration.leader_name(), "Ana");
    }

    #[test]
    fn activate_with_new_leader_replaces_name() {
        let mut celebration = Celebration::new();
        celebration.activate("Ana");
        assert!(celebration.activate("Bruno"));
        assert!(celebration.is_active());
        assert_eq!(celebration.leader_name(), "Bruno");
    }

    #[test]
    fn empty_leader_degrades_gracefully() {
        let mut celebration = Celebration::new();
        assert!(celebration.activate(""));
        assert!(celebration.is_active());
        assert_eq!(celebration.leader_name(), "");
    }

    #[test]
    fn deactivate_is_idempotent() {
        let mut celebration = Celebration::new();
        assert!(!celebration.deactivate());

        celebration.activate("Ana");
        assert!(celebration.deactivate());
        assert!(!celebration.deactivate());
        assert!(!celebration.is_active());
        assert_eq!(celebration.leader_name(), "");
    }
}
