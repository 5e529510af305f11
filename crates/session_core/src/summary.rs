use shared::domain::{DailyUpdate, Member, RoundLimit};

/// What the end-of-session screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub sector_name: String,
    /// Speaking order.
    pub speakers: Vec<Member>,
    /// Absent members who never spoke.
    pub absent: Vec<Member>,
    pub rounds_completed: u32,
    pub round_limit: RoundLimit,
    pub updates: Vec<DailyUpdate>,
}

impl Summary {
    pub fn speaker_count(&self) -> usize {
        self.speakers.len()
    }

    pub fn has_updates(&self) -> bool {
        !self.updates.is_empty()
    }
}
