use super::*;
use shared::{
    domain::{RoundLimit, SectorId},
    error::RosterError,
};
use std::time::Duration;
use storage::{MemoryRosterStore, RosterStore};

fn controller(picks: &[usize], delay: Duration) -> StandupController<MemoryRosterStore> {
    StandupController::new(
        MemoryRosterStore::default(),
        Box::new(ScriptedSelector::new(picks.to_vec())),
        delay,
    )
}

#[tokio::test]
async fn activate_snapshots_the_stored_sector() {
    let mut controller = controller(&[], Duration::ZERO);
    let session = controller
        .activate(&SectorId::new("3"))
        .await
        .expect("activate");
    assert_eq!(session.sector_name(), "Cibersegurança");
    assert_eq!(session.remaining().len(), 5);
    assert_eq!(session.phase(), Phase::Idle);
}

#[tokio::test]
async fn spin_reveals_the_drawn_winner() {
    let mut controller = controller(&[2], Duration::ZERO);
    controller
        .activate(&SectorId::new("3"))
        .await
        .expect("activate");

    let winner = controller.spin().await.expect("spin");
    assert_eq!(winner.name, "Matheus");

    let session = controller.session().expect("session");
    assert_eq!(session.phase(), Phase::WinnerPending);
    assert_eq!(session.current_winner(), Some(&winner));

    let acknowledged = controller.acknowledge().expect("acknowledge");
    assert_eq!(acknowledged, winner);
    assert_eq!(controller.session().expect("session").finished().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn spin_waits_out_the_delay_before_revealing() {
    let delay = Duration::from_millis(4_000);
    let mut controller = controller(&[0], delay);
    controller
        .activate(&SectorId::new("3"))
        .await
        .expect("activate");

    let started = tokio::time::Instant::now();
    controller.spin().await.expect("spin");
    assert!(started.elapsed() >= delay);
    assert_eq!(
        controller.session().expect("session").phase(),
        Phase::WinnerPending
    );
}

#[tokio::test]
async fn spin_without_session_is_a_rejection() {
    let mut controller = controller(&[], Duration::ZERO);
    let err = controller.spin().await.expect_err("no session");
    assert_eq!(
        err.downcast_ref::<ControllerError>(),
        Some(&ControllerError::NoActiveSession)
    );
    assert!(is_rejection(&err));
}

#[tokio::test]
async fn second_spin_before_acknowledge_is_rejected() {
    let mut controller = controller(&[0, 0], Duration::ZERO);
    controller
        .activate(&SectorId::new("3"))
        .await
        .expect("activate");
    let winner = controller.spin().await.expect("spin");

    let err = controller.spin().await.expect_err("double draw");
    assert_eq!(
        err.downcast_ref::<SessionError>(),
        Some(&SessionError::WinnerAwaitingAcknowledgement)
    );
    assert!(is_rejection(&err));
    assert_eq!(
        controller.session().expect("session").current_winner(),
        Some(&winner)
    );
}

#[tokio::test]
async fn round_limit_default_applies_to_new_sessions() {
    let mut controller =
        controller(&[0, 0, 0], Duration::ZERO).with_default_round_limit(RoundLimit::bounded(2).unwrap());
    controller
        .activate(&SectorId::new("2"))
        .await
        .expect("activate");

    for _ in 0..2 {
        controller.spin().await.expect("spin");
        controller.acknowledge().expect("acknowledge");
    }

    let session = controller.session().expect("session");
    assert!(session.is_complete());
    assert_eq!(session.summary().speaker_count(), 2);
    assert_eq!(session.remaining().len(), 7);
}

#[tokio::test]
async fn session_member_changes_do_not_touch_the_store() {
    let mut controller = controller(&[], Duration::ZERO);
    let sector_id = SectorId::new("3");
    let session = controller.activate(&sector_id).await.expect("activate");
    session.add_member("Visitante").expect("add");
    let first = session.roster()[0].id.clone();
    session.remove_member(&first).expect("remove");

    let stored = controller
        .store()
        .get_sector(&sector_id)
        .await
        .expect("stored");
    assert_eq!(stored.members.len(), 5);
    assert!(stored.member(&first).is_some());
}

#[tokio::test]
async fn edit_sector_persists_only_successful_edits() {
    let controller = controller(&[], Duration::ZERO);
    let sector_id = SectorId::new("1");

    let added = controller
        .edit_sector(&sector_id, |sector| sector.add_member("Nova"))
        .await
        .expect("edit");
    let err = controller
        .edit_sector(&sector_id, |sector| {
            sector.members.clear();
            sector.add_member("  ")
        })
        .await
        .expect_err("blank name");
    assert_eq!(err.downcast_ref::<RosterError>(), Some(&RosterError::BlankName));

    let stored = controller
        .store()
        .get_sector(&sector_id)
        .await
        .expect("stored");
    assert_eq!(stored.members.len(), 18);
    assert_eq!(stored.members.last().map(|m| &m.id), Some(&added.id));
}

#[tokio::test]
async fn back_discards_the_session_and_activate_starts_fresh() {
    let mut controller = controller(&[0], Duration::ZERO);
    let sector_id = SectorId::new("3");
    controller.activate(&sector_id).await.expect("activate");
    controller.spin().await.expect("spin");
    controller.acknowledge().expect("acknowledge");

    let discarded = controller.back().expect("had a session");
    assert_eq!(discarded.rounds_completed(), 1);
    assert!(controller.session().is_none());
    assert!(controller.session_mut().is_err());

    let session = controller.activate(&sector_id).await.expect("activate");
    assert_eq!(session.rounds_completed(), 0);
    assert_eq!(session.remaining().len(), 5);
}

#[tokio::test]
async fn unknown_sector_activation_fails_without_a_session() {
    let mut controller = controller(&[], Duration::ZERO);
    let err = controller
        .activate(&SectorId::new("nope"))
        .await
        .expect_err("unknown");
    assert!(is_rejection(&err));
    assert!(controller.session().is_none());
}

#[tokio::test]
async fn reset_roster_restores_defaults() {
    let controller = controller(&[], Duration::ZERO);
    controller
        .edit_sector(&SectorId::new("2"), |sector| sector.set_manager("Outra"))
        .await
        .expect("edit");
    controller.reset_roster_to_defaults().await.expect("reset");

    let sectors = controller.sectors().await.expect("sectors");
    let sector = sectors
        .iter()
        .find(|s| s.id == SectorId::new("2"))
        .expect("sector 2");
    assert_eq!(sector.manager, "Esdras");
}
