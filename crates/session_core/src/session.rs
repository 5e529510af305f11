use std::collections::HashSet;

use chrono::Utc;
use shared::{
    domain::{normalize_name, DailyUpdate, Member, MemberId, RoundLimit, Sector, SectorId},
    error::RosterError,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{selector::Selector, summary::Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fresh after activation or reset.
    Idle,
    /// At least one round done, waiting for the next draw.
    DrawPending,
    /// A winner has been chosen but not revealed yet.
    Spinning,
    /// Winner revealed, waiting for acknowledgement.
    WinnerPending,
    /// Terminal until `reset`.
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Pending,
    Absent,
    Finished,
}

/// Reasons an operation was rejected. A rejected operation never changes the
/// session, so callers may treat any of these as a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a draw is already in progress")]
    AlreadySpinning,
    #[error("the current winner has not been acknowledged")]
    WinnerAwaitingAcknowledgement,
    #[error("session is complete; reset to start a new round")]
    Complete,
    #[error("no eligible members left to draw")]
    EmptyPool,
    #[error("selector returned index {index} for {len} candidates")]
    SelectorOutOfRange { index: usize, len: usize },
    #[error("no draw is waiting to be revealed")]
    NotSpinning,
    #[error("no revealed winner to acknowledge")]
    NoPendingWinner,
    #[error("unknown member {0}")]
    UnknownMember(MemberId),
    #[error("member {0} has not spoken yet")]
    NotYetSpoken(MemberId),
    #[error("update has no content")]
    EmptyUpdate,
    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// One run of the speaker draw over a snapshot of a sector's roster.
#[derive(Debug, Clone)]
pub struct Session {
    sector_id: SectorId,
    sector_name: String,
    roster: Vec<Member>,
    remaining: Vec<Member>,
    absent: HashSet<MemberId>,
    finished: Vec<Member>,
    updates: Vec<DailyUpdate>,
    round_limit: RoundLimit,
    rounds_completed: u32,
    current_winner: Option<Member>,
    phase: Phase,
}

impl Session {
    pub fn new(sector: &Sector, round_limit: RoundLimit) -> Self {
        info!(
            sector_id = %sector.id,
            members = sector.members.len(),
            %round_limit,
            "session started"
        );
        Self {
            sector_id: sector.id.clone(),
            sector_name: sector.name.clone(),
            roster: sector.members.clone(),
            remaining: sector.members.clone(),
            absent: HashSet::new(),
            finished: Vec::new(),
            updates: Vec::new(),
            round_limit,
            rounds_completed: 0,
            current_winner: None,
            phase: Phase::Idle,
        }
    }

    pub fn sector_id(&self) -> &SectorId {
        &self.sector_id
    }

    pub fn sector_name(&self) -> &str {
        &self.sector_name
    }

    pub fn roster(&self) -> &[Member] {
        &self.roster
    }

    pub fn remaining(&self) -> &[Member] {
        &self.remaining
    }

    pub fn finished(&self) -> &[Member] {
        &self.finished
    }

    pub fn updates(&self) -> &[DailyUpdate] {
        &self.updates
    }

    pub fn is_absent(&self, member_id: &MemberId) -> bool {
        self.absent.contains(member_id)
    }

    /// Absent members who have not spoken, the same set the summary lists.
    pub fn absent_count(&self) -> usize {
        self.absent
            .iter()
            .filter(|member_id| !self.is_finished(member_id))
            .count()
    }

    pub fn round_limit(&self) -> RoundLimit {
        self.round_limit
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn current_winner(&self) -> Option<&Member> {
        self.current_winner.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn member(&self, member_id: &MemberId) -> Option<&Member> {
        self.roster.iter().find(|m| &m.id == member_id)
    }

    /// Finished wins over absent, matching what a roster panel should show.
    pub fn status(&self, member_id: &MemberId) -> Option<MemberStatus> {
        self.member(member_id)?;
        if self.is_finished(member_id) {
            Some(MemberStatus::Finished)
        } else if self.absent.contains(member_id) {
            Some(MemberStatus::Absent)
        } else {
            Some(MemberStatus::Pending)
        }
    }

    /// Roster in order, each member with its current status.
    pub fn queue(&self) -> Vec<(&Member, MemberStatus)> {
        self.roster
            .iter()
            .filter_map(|m| self.status(&m.id).map(|status| (m, status)))
            .collect()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            sector_name: self.sector_name.clone(),
            speakers: self.finished.clone(),
            absent: self
                .roster
                .iter()
                .filter(|m| self.absent.contains(&m.id) && !self.is_finished(&m.id))
                .cloned()
                .collect(),
            rounds_completed: self.rounds_completed,
            round_limit: self.round_limit,
            updates: self.updates.clone(),
        }
    }

    /// Chooses the next speaker and enters [`Phase::Spinning`]. A lone
    /// candidate is chosen without consulting the selector.
    pub fn draw(&mut self, selector: &mut dyn Selector) -> Result<Member, SessionError> {
        match self.phase {
            Phase::Idle | Phase::DrawPending => {}
            Phase::Spinning => return Err(SessionError::AlreadySpinning),
            Phase::WinnerPending => return Err(SessionError::WinnerAwaitingAcknowledgement),
            Phase::Complete => return Err(SessionError::Complete),
        }

        let len = self.remaining.len();
        let index = match len {
            0 => return Err(SessionError::EmptyPool),
            1 => 0,
            _ => selector.pick(len),
        };
        let winner = self
            .remaining
            .get(index)
            .cloned()
            .ok_or(SessionError::SelectorOutOfRange { index, len })?;

        debug!(member_id = %winner.id, candidates = len, "drew winner");
        self.current_winner = Some(winner.clone());
        self.phase = Phase::Spinning;
        Ok(winner)
    }

    pub fn reveal(&mut self) -> Result<&Member, SessionError> {
        if self.phase != Phase::Spinning {
            return Err(SessionError::NotSpinning);
        }
        let winner = self
            .current_winner
            .as_ref()
            .ok_or(SessionError::NotSpinning)?;
        self.phase = Phase::WinnerPending;
        Ok(winner)
    }

    /// Moves the revealed winner to the finished list and evaluates the stop
    /// condition.
    pub fn acknowledge(&mut self) -> Result<Member, SessionError> {
        if self.phase != Phase::WinnerPending {
            return Err(SessionError::NoPendingWinner);
        }
        let winner = self
            .current_winner
            .take()
            .ok_or(SessionError::NoPendingWinner)?;

        self.remaining.retain(|m| m.id != winner.id);
        self.finished.push(winner.clone());
        self.rounds_completed = self.rounds_completed.saturating_add(1);

        let limit_reached = self.round_limit.is_reached(self.rounds_completed);
        if limit_reached || self.remaining.is_empty() {
            self.phase = Phase::Complete;
            info!(
                sector_id = %self.sector_id,
                rounds = self.rounds_completed,
                limit_reached,
                "session complete"
            );
        } else {
            self.phase = Phase::DrawPending;
            debug!(
                rounds = self.rounds_completed,
                remaining = self.remaining.len(),
                "round acknowledged"
            );
        }
        Ok(winner)
    }

    /// Takes effect on the next acknowledgement; never completes the
    /// session by itself.
    pub fn set_round_limit(&mut self, round_limit: RoundLimit) {
        debug!(%round_limit, "round limit changed");
        self.round_limit = round_limit;
    }

    /// Flips the absence flag and returns whether the member is now absent.
    ///
    /// A member coming back goes to the end of the pool unless they already
    /// spoke. A finished member only has the flag recorded, which keeps them
    /// out of the pool after a reset.
    pub fn toggle_absence(&mut self, member_id: &MemberId) -> Result<bool, SessionError> {
        let member = self
            .member(member_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownMember(member_id.clone()))?;

        if self.absent.remove(member_id) {
            if !self.is_finished(member_id) && !self.is_remaining(member_id) {
                self.remaining.push(member);
            }
            debug!(%member_id, "marked present");
            Ok(false)
        } else {
            self.absent.insert(member_id.clone());
            self.remaining.retain(|m| &m.id != member_id);
            debug!(%member_id, "marked absent");
            Ok(true)
        }
    }

    /// Adds an ad-hoc member for this session only; the stored roster is not
    /// touched.
    pub fn add_member(&mut self, name: &str) -> Result<Member, SessionError> {
        let member = Member::new(MemberId::generate(), normalize_name(name)?);
        self.roster.push(member.clone());
        self.remaining.push(member.clone());
        debug!(member_id = %member.id, "member added to session");
        Ok(member)
    }

    /// Purges the member from every set. If they were the drawn winner the
    /// draw is discarded without counting a round, and the session completes
    /// when nobody is left to draw after at least one round.
    pub fn remove_member(&mut self, member_id: &MemberId) -> Result<Member, SessionError> {
        let index = self
            .roster
            .iter()
            .position(|m| &m.id == member_id)
            .ok_or_else(|| SessionError::UnknownMember(member_id.clone()))?;
        let member = self.roster.remove(index);

        self.remaining.retain(|m| &m.id != member_id);
        self.absent.remove(member_id);
        self.finished.retain(|m| &m.id != member_id);
        self.updates.retain(|u| &u.member_id != member_id);

        if self
            .current_winner
            .as_ref()
            .is_some_and(|w| &w.id == member_id)
        {
            self.current_winner = None;
            debug!(%member_id, "pending winner removed, draw discarded");

            let pool_exhausted = self.rounds_completed > 0 && self.remaining.is_empty();
            let limit_reached = self.round_limit.is_reached(self.rounds_completed);
            if pool_exhausted || limit_reached {
                self.phase = Phase::Complete;
                info!(
                    sector_id = %self.sector_id,
                    rounds = self.rounds_completed,
                    limit_reached,
                    "session complete"
                );
            } else {
                self.phase = self.ready_phase();
            }
        }

        debug!(%member_id, "member removed from session");
        Ok(member)
    }

    /// Starts over with every present roster member back in the pool.
    /// Absence flags survive.
    pub fn reset(&mut self) {
        self.remaining = self
            .roster
            .iter()
            .filter(|m| !self.absent.contains(&m.id))
            .cloned()
            .collect();
        self.finished.clear();
        self.updates.clear();
        self.rounds_completed = 0;
        self.current_winner = None;
        self.phase = Phase::Idle;
        info!(
            sector_id = %self.sector_id,
            remaining = self.remaining.len(),
            "session reset"
        );
    }

    /// Stores notes for the revealed winner or someone who already spoke,
    /// replacing any earlier notes from the same member.
    pub fn record_update(
        &mut self,
        member_id: &MemberId,
        demands: &str,
        updates: &str,
    ) -> Result<(), SessionError> {
        let member = self
            .member(member_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownMember(member_id.clone()))?;

        let is_revealed_winner = self.phase == Phase::WinnerPending
            && self
                .current_winner
                .as_ref()
                .is_some_and(|w| &w.id == member_id);
        if !is_revealed_winner && !self.is_finished(member_id) {
            return Err(SessionError::NotYetSpoken(member_id.clone()));
        }

        let (demands, updates) = (demands.trim(), updates.trim());
        if demands.is_empty() && updates.is_empty() {
            return Err(SessionError::EmptyUpdate);
        }

        self.updates.retain(|u| &u.member_id != member_id);
        self.updates.push(DailyUpdate {
            member_id: member.id,
            member_name: member.name,
            demands: demands.to_string(),
            updates: updates.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    fn is_finished(&self, member_id: &MemberId) -> bool {
        self.finished.iter().any(|m| &m.id == member_id)
    }

    fn is_remaining(&self, member_id: &MemberId) -> bool {
        self.remaining.iter().any(|m| &m.id == member_id)
    }

    fn ready_phase(&self) -> Phase {
        if self.rounds_completed == 0 {
            Phase::Idle
        } else {
            Phase::DrawPending
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
