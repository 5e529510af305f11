use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Member, MemberId, Sector, SectorId, Theme},
    error::RosterError,
};

/// Key under which the whole roster collection is persisted.
pub const ROSTER_KEY: &str = "daily-sectors";

/// Every sector keyed by id. Serialized as a JSON object `{id: sector}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterCollection {
    sectors: BTreeMap<SectorId, Sector>,
}

impl RosterCollection {
    pub fn from_sectors(sectors: impl IntoIterator<Item = Sector>) -> Self {
        Self {
            sectors: sectors.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn sectors(&self) -> impl Iterator<Item = &Sector> {
        self.sectors.values()
    }

    pub fn get(&self, sector_id: &SectorId) -> Result<&Sector, RosterError> {
        self.sectors
            .get(sector_id)
            .ok_or_else(|| RosterError::UnknownSector(sector_id.clone()))
    }

    /// Overwrites the sector with the same id, or inserts it.
    pub fn upsert(&mut self, sector: Sector) {
        self.sectors.insert(sector.id.clone(), sector);
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn into_sectors(self) -> Vec<Sector> {
        self.sectors.into_values().collect()
    }
}

fn sector(
    id: &str,
    name: &str,
    manager: &str,
    theme: (&str, &str),
    member_prefix: &str,
    names: &[&str],
) -> Sector {
    Sector {
        id: SectorId::new(id),
        name: name.to_string(),
        manager: manager.to_string(),
        members: names
            .iter()
            .enumerate()
            .map(|(i, n)| Member::new(MemberId::new(format!("{member_prefix}-{}", i + 1)), *n))
            .collect(),
        theme: Theme::new(theme.0, theme.1),
    }
}

/// Built-in roster used on first start and by "reset to defaults".
pub fn default_roster() -> RosterCollection {
    RosterCollection::from_sectors([
        sector(
            "1",
            "Service Desk, Redes e Automação",
            "Diego",
            ("blue-500", "cyan-500"),
            "sd",
            &[
                "Chagas",
                "Andriano",
                "Adriano",
                "Mateus",
                "Andrei",
                "Lucas Gustavo",
                "Natanael",
                "Igor",
                "Gardenia Lia",
                "Ingrid",
                "João Marcelo",
                "Wagner",
                "Micael",
                "Anthony",
                "Vitória",
                "Membro Novo 01",
                "Membro Novo 02",
            ],
        ),
        sector(
            "2",
            "Sistemas, Estoque e Manutenção",
            "Esdras",
            ("orange-500", "red-500"),
            "sys",
            &[
                "Hiago",
                "Carlos Alberto",
                "Cosme",
                "Gustavo",
                "Carlos Desiderio",
                "Ricardo",
                "André",
                "Wesley",
                "João",
            ],
        ),
        sector(
            "3",
            "Cibersegurança",
            "Tech Lead",
            ("emerald-500", "green-500"),
            "sec",
            &["Renato Kira", "Kauê", "Matheus", "Isaias", "Ralyne"],
        ),
    ])
}
