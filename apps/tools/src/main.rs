use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::domain::{MemberId, SectorId};
use storage::{RosterStore, Storage};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Edit the stored standup roster")]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/standup.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    ListSectors,
    AddMember {
        sector_id: String,
        name: String,
        #[arg(long)]
        role: Option<String>,
    },
    RemoveMember {
        sector_id: String,
        member_id: String,
    },
    RenameMember {
        sector_id: String,
        member_id: String,
        name: String,
    },
    SetRole {
        sector_id: String,
        member_id: String,
        /// Omit to clear the role.
        role: Option<String>,
    },
    SetManager {
        sector_id: String,
        manager: String,
    },
    ResetDefaults,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;
    storage.health_check().await?;

    match cli.command {
        Command::ListSectors => {
            for sector in storage.list_sectors().await? {
                println!(
                    "{}\t{}\tmanager={}\tmembers={}",
                    sector.id,
                    sector.name,
                    sector.manager,
                    sector.members.len()
                );
                for member in &sector.members {
                    match member.role.as_deref() {
                        Some(role) => println!("  {}\t{}\t{role}", member.id, member.name),
                        None => println!("  {}\t{}", member.id, member.name),
                    }
                }
            }
        }
        Command::AddMember {
            sector_id,
            name,
            role,
        } => {
            let mut sector = storage.get_sector(&SectorId::new(sector_id)).await?;
            let member = sector.add_member(&name)?;
            if let Some(role) = role {
                sector.set_member_role(&member.id, Some(&role))?;
            }
            storage.save_sector(sector).await?;
            println!("created member_id={}", member.id);
        }
        Command::RemoveMember {
            sector_id,
            member_id,
        } => {
            let mut sector = storage.get_sector(&SectorId::new(sector_id)).await?;
            let removed = sector.remove_member(&MemberId::new(member_id))?;
            storage.save_sector(sector).await?;
            println!("removed {}", removed.name);
        }
        Command::RenameMember {
            sector_id,
            member_id,
            name,
        } => {
            let mut sector = storage.get_sector(&SectorId::new(sector_id)).await?;
            sector.rename_member(&MemberId::new(member_id), &name)?;
            storage.save_sector(sector).await?;
            println!("renamed");
        }
        Command::SetRole {
            sector_id,
            member_id,
            role,
        } => {
            let mut sector = storage.get_sector(&SectorId::new(sector_id)).await?;
            sector.set_member_role(&MemberId::new(member_id), role.as_deref())?;
            storage.save_sector(sector).await?;
            println!("role updated");
        }
        Command::SetManager { sector_id, manager } => {
            let mut sector = storage.get_sector(&SectorId::new(sector_id)).await?;
            sector.set_manager(&manager)?;
            storage.save_sector(sector).await?;
            println!("manager updated");
        }
        Command::ResetDefaults => {
            storage.reset_to_defaults().await?;
            info!("stored roster cleared");
            println!("roster restored to defaults");
        }
    }

    Ok(())
}
