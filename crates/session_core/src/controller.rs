use std::time::Duration;

use anyhow::Result;
use shared::{
    domain::{Member, RoundLimit, Sector, SectorId},
    error::RosterError,
};
use storage::RosterStore;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    selector::Selector,
    session::{Session, SessionError},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("no sector is active")]
    NoActiveSession,
}

/// Owns the roster store and the active session. Every user action goes
/// through here, one at a time.
pub struct StandupController<S> {
    store: S,
    selector: Box<dyn Selector>,
    spin_delay: Duration,
    default_round_limit: RoundLimit,
    session: Option<Session>,
}

impl<S: RosterStore> StandupController<S> {
    pub fn new(store: S, selector: Box<dyn Selector>, spin_delay: Duration) -> Self {
        Self {
            store,
            selector,
            spin_delay,
            default_round_limit: RoundLimit::Unbounded,
            session: None,
        }
    }

    pub fn with_default_round_limit(mut self, round_limit: RoundLimit) -> Self {
        self.default_round_limit = round_limit;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn sectors(&self) -> Result<Vec<Sector>> {
        self.store.list_sectors().await
    }

    /// Loads, edits, and saves one sector. Nothing is written when the edit
    /// fails.
    pub async fn edit_sector<T>(
        &self,
        sector_id: &SectorId,
        edit: impl FnOnce(&mut Sector) -> Result<T, RosterError>,
    ) -> Result<T> {
        let mut sector = self.store.get_sector(sector_id).await?;
        let out = edit(&mut sector)?;
        self.store.save_sector(sector).await?;
        info!(%sector_id, "sector saved");
        Ok(out)
    }

    pub async fn reset_roster_to_defaults(&self) -> Result<()> {
        self.store.reset_to_defaults().await?;
        info!("roster reset to defaults");
        Ok(())
    }

    /// Starts a session over a snapshot of the sector, replacing any
    /// session already running.
    pub async fn activate(&mut self, sector_id: &SectorId) -> Result<&mut Session> {
        let sector = self.store.get_sector(sector_id).await?;
        let session = Session::new(&sector, self.default_round_limit);
        Ok(self.session.insert(session))
    }

    /// Leaves the session screen; the session is discarded.
    pub fn back(&mut self) -> Option<Session> {
        let session = self.session.take();
        if let Some(session) = &session {
            debug!(sector_id = %session.sector_id(), "session discarded");
        }
        session
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Result<&mut Session, ControllerError> {
        self.session.as_mut().ok_or(ControllerError::NoActiveSession)
    }

    /// Draws a winner, waits out the spin delay, then reveals it.
    pub async fn spin(&mut self) -> Result<Member> {
        let session = self
            .session
            .as_mut()
            .ok_or(ControllerError::NoActiveSession)?;
        let winner = session.draw(self.selector.as_mut())?;

        if !self.spin_delay.is_zero() {
            tokio::time::sleep(self.spin_delay).await;
        }

        let session = self
            .session
            .as_mut()
            .ok_or(ControllerError::NoActiveSession)?;
        session.reveal()?;
        Ok(winner)
    }

    pub fn acknowledge(&mut self) -> Result<Member> {
        Ok(self.session_mut()?.acknowledge()?)
    }
}

/// True when the error is a rejected session operation rather than a
/// failure, i.e. something the UI can quietly ignore.
pub fn is_rejection(err: &anyhow::Error) -> bool {
    err.downcast_ref::<SessionError>().is_some()
        || err.downcast_ref::<RosterError>().is_some()
        || err.downcast_ref::<ControllerError>().is_some()
}
