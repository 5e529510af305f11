//! Line-oriented front end. Three screens share one loop: the sector list,
//! the running daily, and its summary.

mod commands;
mod render;

use std::io::Write;

use anyhow::Result;
use session_core::{is_rejection, Phase, StandupController};
use shared::{
    domain::{Member, Sector, SectorId},
    error::RosterError,
};
use storage::RosterStore;
use text_generation::DailyAssistant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use commands::{parse_sector_command, parse_session_command, SectorCommand, SessionCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Sectors,
    Session,
    Summary,
}

enum Flow {
    Continue,
    Quit,
}

pub struct App<S> {
    controller: StandupController<S>,
    assistant: DailyAssistant,
}

impl<S: RosterStore> App<S> {
    pub fn new(controller: StandupController<S>, assistant: DailyAssistant) -> Self {
        Self {
            controller,
            assistant,
        }
    }

    pub fn controller(&self) -> &StandupController<S> {
        &self.controller
    }

    /// Opens a sector before the loop starts, as if `start` had been typed.
    pub async fn open(&mut self, out: &mut impl Write, sector: &str) -> Result<()> {
        self.start(out, sector).await
    }

    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        if self.screen() == Screen::Sectors {
            render::sectors(out, &self.controller.sectors().await?)?;
            writeln!(out, "type 'help' for commands")?;
        }

        let mut lines = input.lines();
        loop {
            write!(out, "{}", self.prompt())?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match self.handle_line(line, out).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(err) if is_rejection(&err) => {
                    debug!(error = %err, "command rejected");
                    writeln!(out, "  ! {err}")?;
                }
                Err(err) => {
                    warn!(error = %err, "command failed");
                    writeln!(out, "  error: {err:#}")?;
                }
            }
        }

        info!("leaving standup");
        Ok(())
    }

    fn screen(&self) -> Screen {
        match self.controller.session() {
            None => Screen::Sectors,
            Some(session) if session.is_complete() => Screen::Summary,
            Some(_) => Screen::Session,
        }
    }

    fn prompt(&self) -> String {
        match (self.screen(), self.controller.session()) {
            (Screen::Session, Some(session)) => format!("{}> ", session.sector_name()),
            (Screen::Summary, Some(session)) => format!("{} (done)> ", session.sector_name()),
            _ => "sectors> ".to_string(),
        }
    }

    async fn handle_line(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        if self.screen() == Screen::Sectors {
            match parse_sector_command(line) {
                Ok(command) => self.sector_command(command, out).await,
                Err(err) => {
                    writeln!(out, "  ! {err}")?;
                    Ok(Flow::Continue)
                }
            }
        } else {
            match parse_session_command(line) {
                Ok(command) => self.session_command(command, out).await,
                Err(err) => {
                    writeln!(out, "  ! {err}")?;
                    Ok(Flow::Continue)
                }
            }
        }
    }

    async fn sector_command(&mut self, command: SectorCommand, out: &mut impl Write) -> Result<Flow> {
        match command {
            SectorCommand::List => render::sectors(out, &self.controller.sectors().await?)?,
            SectorCommand::Start(sector) => self.start(out, &sector).await?,
            SectorCommand::AddMember { sector, name } => {
                let sector = self.resolve_sector(&sector).await?;
                let member = self
                    .controller
                    .edit_sector(&sector.id, |s| s.add_member(&name))
                    .await?;
                writeln!(out, "added {} to {}", member.name, sector.name)?;
            }
            SectorCommand::RemoveMember { sector, member } => {
                let sector = self.resolve_sector(&sector).await?;
                let Some(target) = sector.members.get(member) else {
                    writeln!(out, "  ! {} has no member #{}", sector.name, member + 1)?;
                    return Ok(Flow::Continue);
                };
                let removed = self
                    .controller
                    .edit_sector(&sector.id, |s| s.remove_member(&target.id))
                    .await?;
                writeln!(out, "removed {} from {}", removed.name, sector.name)?;
            }
            SectorCommand::RenameMember {
                sector,
                member,
                name,
            } => {
                let sector = self.resolve_sector(&sector).await?;
                let Some(target) = sector.members.get(member) else {
                    writeln!(out, "  ! {} has no member #{}", sector.name, member + 1)?;
                    return Ok(Flow::Continue);
                };
                self.controller
                    .edit_sector(&sector.id, |s| s.rename_member(&target.id, &name))
                    .await?;
                writeln!(out, "renamed {} to {}", target.name, name.trim())?;
            }
            SectorCommand::Defaults => {
                self.controller.reset_roster_to_defaults().await?;
                writeln!(out, "roster restored to defaults")?;
            }
            SectorCommand::Help => writeln!(out, "{}", render::SECTOR_HELP)?,
            SectorCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn session_command(
        &mut self,
        command: SessionCommand,
        out: &mut impl Write,
    ) -> Result<Flow> {
        match command {
            SessionCommand::Spin => {
                writeln!(out, "spinning...")?;
                out.flush()?;
                let winner = self.controller.spin().await?;
                writeln!(out, ">> {} <<", render::member_label(&winner))?;
                writeln!(out, "type 'ok' when they are done")?;
            }
            SessionCommand::Acknowledge => {
                let member = self.controller.acknowledge()?;
                writeln!(out, "{} is done", member.name)?;
                if self.screen() == Screen::Summary {
                    self.show_summary(out).await?;
                } else if let Some(session) = self.controller.session() {
                    render::progress(out, session)?;
                }
            }
            SessionCommand::Absent(position) => {
                let session = self.controller.session_mut()?;
                let Some(member) = session.roster().get(position).cloned() else {
                    writeln!(out, "  ! no member #{}", position + 1)?;
                    return Ok(Flow::Continue);
                };
                let absent = session.toggle_absence(&member.id)?;
                let state = if absent { "absent" } else { "present" };
                writeln!(out, "{} marked {state}", member.name)?;
            }
            SessionCommand::Remove(position) => {
                let session = self.controller.session_mut()?;
                let Some(member) = session.roster().get(position).cloned() else {
                    writeln!(out, "  ! no member #{}", position + 1)?;
                    return Ok(Flow::Continue);
                };
                session.remove_member(&member.id)?;
                writeln!(out, "{} left this daily", member.name)?;
                if self.screen() == Screen::Summary {
                    self.show_summary(out).await?;
                }
            }
            SessionCommand::Add(name) => {
                let member = self.controller.session_mut()?.add_member(&name)?;
                writeln!(out, "{} joined this daily", member.name)?;
            }
            SessionCommand::Limit(limit) => {
                let session = self.controller.session_mut()?;
                session.set_round_limit(limit);
                writeln!(out, "round limit set to {limit}")?;
            }
            SessionCommand::Note { demands, updates } => {
                let session = self.controller.session_mut()?;
                let Some(member) = note_target(session) else {
                    writeln!(out, "  ! nobody has spoken yet")?;
                    return Ok(Flow::Continue);
                };
                session.record_update(&member.id, &demands, &updates)?;
                writeln!(out, "noted for {}", member.name)?;
            }
            SessionCommand::Icebreaker => {
                let winner = self
                    .controller
                    .session()
                    .filter(|s| s.phase() == Phase::WinnerPending)
                    .and_then(|s| s.current_winner().cloned());
                let Some(winner) = winner else {
                    writeln!(out, "  ! spin first")?;
                    return Ok(Flow::Continue);
                };
                let question = self
                    .assistant
                    .icebreaker(&winner.name, winner.role.as_deref())
                    .await;
                writeln!(out, "{question}")?;
            }
            SessionCommand::Queue => {
                if let Some(session) = self.controller.session() {
                    render::queue(out, session)?;
                }
            }
            SessionCommand::Summary => self.show_summary(out).await?,
            SessionCommand::Reset => {
                let session = self.controller.session_mut()?;
                session.reset();
                render::progress(out, session)?;
            }
            SessionCommand::Back => {
                self.controller.back();
                render::sectors(out, &self.controller.sectors().await?)?;
            }
            SessionCommand::Help => writeln!(out, "{}", render::SESSION_HELP)?,
            SessionCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn start(&mut self, out: &mut impl Write, raw: &str) -> Result<()> {
        let sector = self.resolve_sector(raw).await?;
        let session = self.controller.activate(&sector.id).await?;
        info!(sector_id = %sector.id, "daily started");
        render::queue(out, session)?;
        Ok(())
    }

    async fn show_summary(&self, out: &mut impl Write) -> Result<()> {
        let Some(session) = self.controller.session() else {
            return Ok(());
        };
        let summary = session.summary();
        let recap = self.assistant.summarize(&summary.updates).await;
        render::summary(out, &summary, &recap)?;
        Ok(())
    }

    /// Accepts a list number, a sector id, or a sector name.
    async fn resolve_sector(&self, raw: &str) -> Result<Sector> {
        let raw = raw.trim();
        let mut sectors = self.controller.sectors().await?;

        let index = raw
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=sectors.len()).contains(n))
            .map(|n| n - 1)
            .or_else(|| sectors.iter().position(|s| s.id.as_str() == raw))
            .or_else(|| {
                sectors
                    .iter()
                    .position(|s| s.name.to_lowercase() == raw.to_lowercase())
            });

        match index {
            Some(i) => Ok(sectors.swap_remove(i)),
            None => Err(RosterError::UnknownSector(SectorId::new(raw)).into()),
        }
    }
}

/// The revealed winner, otherwise whoever spoke last.
fn note_target(session: &session_core::Session) -> Option<Member> {
    match (session.phase(), session.current_winner()) {
        (Phase::WinnerPending, Some(winner)) => Some(winner.clone()),
        _ => session.finished().last().cloned(),
    }
}

#[cfg(test)]
#[path = "../tests/repl_tests.rs"]
mod tests;
