use std::io::{self, Write};

use session_core::{MemberStatus, Phase, Session, Summary};
use shared::domain::{Member, RoundLimit, Sector};

pub const SECTOR_HELP: &str = "\
commands:
  list                          show sectors and their members
  start <sector>                open the daily for a sector (number, id or name)
  add <sector> <name>           add a member to the stored roster
  remove <sector> <member#>     remove a member from the stored roster
  rename <sector> <member#> <name>
  defaults                      restore the built-in roster
  quit";

pub const SESSION_HELP: &str = "\
commands:
  spin                          draw the next speaker
  ok                            confirm the revealed speaker
  absent <#>                    toggle a member's absence
  remove <#> / add <name>       change who is in this daily
  limit <n|all>                 stop after n speakers
  note <demands> | <updates>    notes for the current or last speaker
  ice                           icebreaker question for the revealed speaker
  queue                         show everyone and their status
  summary                       show the summary so far
  reset                         start the daily over
  back                          return to the sector list
  quit";

pub fn sectors(out: &mut impl Write, sectors: &[Sector]) -> io::Result<()> {
    if sectors.is_empty() {
        return writeln!(out, "no sectors stored");
    }
    for (i, sector) in sectors.iter().enumerate() {
        writeln!(
            out,
            "[{}] {} (id {}, manager {}) - {} members",
            i + 1,
            sector.name,
            sector.id,
            sector.manager,
            sector.members.len()
        )?;
        for (j, member) in sector.members.iter().enumerate() {
            writeln!(out, "    {:>2}. {}", j + 1, member_label(member))?;
        }
    }
    Ok(())
}

pub fn member_label(member: &Member) -> String {
    match member.role.as_deref() {
        Some(role) => format!("{} ({role})", member.name),
        None => member.name.clone(),
    }
}

pub fn progress(out: &mut impl Write, session: &Session) -> io::Result<()> {
    let limit = match session.round_limit() {
        RoundLimit::Unbounded => session.roster().len().to_string(),
        bounded => bounded.to_string(),
    };
    writeln!(
        out,
        "{}: {}/{} spoken, {} waiting, {} absent",
        session.sector_name(),
        session.rounds_completed(),
        limit,
        session.remaining().len(),
        session.absent_count()
    )
}

pub fn queue(out: &mut impl Write, session: &Session) -> io::Result<()> {
    progress(out, session)?;
    let winner = session.current_winner().map(|m| &m.id);
    for (i, (member, status)) in session.queue().into_iter().enumerate() {
        let marker = if Some(&member.id) == winner {
            match session.phase() {
                Phase::Spinning => "?",
                _ => ">",
            }
        } else {
            match status {
                MemberStatus::Pending => " ",
                MemberStatus::Absent => "-",
                MemberStatus::Finished => "x",
            }
        };
        writeln!(out, "  {marker} {:>2}. {}", i + 1, member_label(member))?;
    }
    Ok(())
}

pub fn summary(out: &mut impl Write, summary: &Summary, recap: &str) -> io::Result<()> {
    writeln!(
        out,
        "== {} daily: {} spoke ==",
        summary.sector_name,
        summary.speaker_count()
    )?;
    for (i, member) in summary.speakers.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, member.name)?;
    }
    if !summary.absent.is_empty() {
        let names: Vec<&str> = summary.absent.iter().map(|m| m.name.as_str()).collect();
        writeln!(out, "absent: {}", names.join(", "))?;
    }
    for update in &summary.updates {
        writeln!(out, "  * {}", update.member_name)?;
        if !update.demands.is_empty() {
            writeln!(out, "      demands: {}", update.demands)?;
        }
        if !update.updates.is_empty() {
            writeln!(out, "      updates: {}", update.updates)?;
        }
    }
    writeln!(out, "{recap}")
}
