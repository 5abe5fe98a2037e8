//! End-to-end turn scenarios driven through the turn controller

use kill_zone::game::event::{DamageCause, MissReason};
use kill_zone::game::types::Trap;
use kill_zone::game::{
    Action, ActionSubmission, Combatant, CombatantId, Controller, Direction, EventPayload, Grid,
    Loot, MatchPhase, MatchState, Position, Rules, SubmitError, TurnController, Weapon,
};
use uuid::Uuid;

fn combatant(id: u8, x: i32, y: i32) -> Combatant {
    Combatant::new(CombatantId(id), format!("p{}", id), Controller::Agent, None, Position::new(x, y))
}

/// Controller already in the action phase at `turn`
fn controller_at(turn: u32, grid: Grid, roster: Vec<Combatant>) -> TurnController {
    let mut state = MatchState::new(Uuid::nil(), 77, Rules::default(), grid, roster);
    state.phase = MatchPhase::Action;
    state.turn = turn;
    TurnController::new(state)
}

fn hp(c: &TurnController, id: u8) -> u32 {
    c.state().combatant(CombatantId(id)).unwrap().hp
}

#[test]
fn knife_at_distance_one_hits_without_dodge_roll() {
    let mut c = controller_at(1, Grid::open(), vec![combatant(0, 4, 4), combatant(1, 5, 5)]);
    c.submit(
        CombatantId(0),
        Action::Attack {
            target: Position::new(5, 5),
            weapon: Some(Weapon::Knife),
        }
        .into(),
    )
    .unwrap();
    c.submit(CombatantId(1), Action::Scout.into()).unwrap();

    let result = c.resolve_turn().unwrap();
    assert_eq!(hp(&c, 1), 65);

    let hit = result
        .events
        .iter()
        .find_map(|e| match e.payload {
            EventPayload::AttackHit { damage, reveal, .. } => Some((damage, reveal)),
            _ => None,
        })
        .unwrap();
    assert_eq!(hit, (35, false));
    assert!(!result.events.iter().any(|e| matches!(
        e.payload,
        EventPayload::AttackMissed {
            reason: MissReason::Dodged,
            ..
        }
    )));
}

#[test]
fn sniper_without_setup_misses() {
    let mut sniper = combatant(0, 0, 0);
    sniper.inventory.push(Loot::Weapon(Weapon::Sniper));
    sniper.equipped = Weapon::Sniper;
    sniper.status.moved_last_turn = true;
    let mut c = controller_at(1, Grid::open(), vec![sniper, combatant(1, 6, 0)]);

    c.submit(
        CombatantId(0),
        Action::Attack {
            target: Position::new(6, 0),
            weapon: None,
        }
        .into(),
    )
    .unwrap();
    let result = c.resolve_turn().unwrap();

    assert_eq!(hp(&c, 1), 100);
    assert!(result.events.iter().any(|e| matches!(
        e.payload,
        EventPayload::AttackMissed {
            weapon: Weapon::Sniper,
            reason: MissReason::NotSetUp
        }
    )));

    // Standing still for a turn sets the shot up
    c.submit(CombatantId(0), Action::Hide.into()).unwrap();
    c.resolve_turn().unwrap();
    c.submit(
        CombatantId(0),
        Action::Attack {
            target: Position::new(6, 0),
            weapon: None,
        }
        .into(),
    )
    .unwrap();
    c.resolve_turn().unwrap();
    assert_eq!(hp(&c, 1), 50);
}

#[test]
fn trap_springs_on_arrival() {
    let mut grid = Grid::open();
    grid.get_mut(Position::new(5, 5)).unwrap().trap = Some(Trap {
        owner: CombatantId(0),
        damage: 25,
    });
    let mut c = controller_at(1, grid, vec![combatant(0, 10, 10), combatant(1, 5, 4)]);

    c.submit(
        CombatantId(1),
        Action::Move {
            direction: Direction::S,
            distance: 1,
        }
        .into(),
    )
    .unwrap();
    let result = c.resolve_turn().unwrap();

    let mover = c.state().combatant(CombatantId(1)).unwrap();
    assert_eq!(mover.position, Position::new(5, 5));
    assert_eq!(mover.hp, 75);
    assert!(c.state().grid.get(Position::new(5, 5)).unwrap().trap.is_none());

    let trap_event = result
        .events
        .iter()
        .find(|e| matches!(e.payload, EventPayload::TrapTriggered { damage: 25, .. }))
        .unwrap();
    assert_eq!(trap_event.actor, Some(CombatantId(0)));
    assert_eq!(c.state().combatant(CombatantId(0)).unwrap().damage_dealt, 25);
}

#[test]
fn trapped_combatant_cannot_move_that_turn() {
    let mut grid = Grid::open();
    grid.get_mut(Position::new(5, 5)).unwrap().trap = Some(Trap {
        owner: CombatantId(0),
        damage: 25,
    });
    let mut state = MatchState::new(
        Uuid::nil(),
        1,
        Rules::default(),
        grid,
        vec![combatant(0, 10, 10), combatant(1, 5, 4)],
    );
    state.phase = MatchPhase::Action;
    state.turn = 1;
    // Immobilized this turn, so the move is skipped and the trap stays armed
    state
        .combatants
        .get_mut(&CombatantId(1))
        .unwrap()
        .status
        .immobilized = true;
    let mut c = TurnController::new(state);

    c.submit(
        CombatantId(1),
        Action::Move {
            direction: Direction::S,
            distance: 1,
        }
        .into(),
    )
    .unwrap();
    c.resolve_turn().unwrap();
    assert_eq!(
        c.state().combatant(CombatantId(1)).unwrap().position,
        Position::new(5, 4)
    );
    assert!(!c.state().combatant(CombatantId(1)).unwrap().status.immobilized);
}

#[test]
fn zone_burns_outsiders_from_start_turn() {
    let mut c = controller_at(4, Grid::open(), vec![combatant(0, 0, 0), combatant(1, 6, 6)]);

    c.resolve_turn().unwrap();
    assert!(!c.state().zone.active);
    assert_eq!(hp(&c, 0), 100);

    let result = c.resolve_turn().unwrap();
    assert_eq!(result.turn, 5);
    assert!(c.state().zone.active);
    assert!(c.state().zone.safe_area.width() < 12);
    assert_eq!(hp(&c, 0), 80);
    assert_eq!(hp(&c, 1), 100);

    c.resolve_turn().unwrap();
    assert_eq!(hp(&c, 0), 60);

    // Stepping inside before the tick avoids damage
    c.submit(
        CombatantId(0),
        Action::Move {
            direction: Direction::SE,
            distance: 1,
        }
        .into(),
    )
    .unwrap();
    c.resolve_turn().unwrap();
    assert_eq!(hp(&c, 0), 60);
}

#[test]
fn zone_kill_is_credited_to_the_zone() {
    let mut victim = combatant(0, 0, 0);
    victim.hp = 15;
    let mut c = controller_at(5, Grid::open(), vec![victim, combatant(1, 6, 6), combatant(2, 7, 7)]);
    let result = c.resolve_turn().unwrap();

    assert_eq!(result.eliminated, vec![CombatantId(0)]);
    let entry = &c.state().kill_feed[0];
    assert_eq!(entry.killer, None);
    assert_eq!(entry.cause, DamageCause::Zone);
}

#[test]
fn zone_tick_after_lethal_hit_takes_the_credit() {
    let mut victim = combatant(0, 0, 1);
    victim.hp = 20;
    let mut c = controller_at(
        5,
        Grid::open(),
        vec![victim, combatant(1, 0, 0), combatant(2, 6, 6)],
    );
    c.submit(CombatantId(0), Action::Scout.into()).unwrap();
    c.submit(
        CombatantId(1),
        Action::Attack {
            target: Position::new(0, 1),
            weapon: Some(Weapon::Knife),
        }
        .into(),
    )
    .unwrap();

    let result = c.resolve_turn().unwrap();
    assert_eq!(result.eliminated, vec![CombatantId(0)]);

    let entry = &c.state().kill_feed[0];
    assert_eq!(entry.killer, None);
    assert_eq!(entry.cause, DamageCause::Zone);
    assert_eq!(c.state().combatant(CombatantId(1)).unwrap().kills, 0);
    assert_eq!(c.state().combatant(CombatantId(0)).unwrap().damage_taken, 35 + 20);
}

#[test]
fn phase_and_winner_transitions() {
    let mut doomed = combatant(4, 5, 6);
    doomed.hp = 10;
    let roster = vec![
        combatant(0, 5, 5),
        combatant(1, 0, 11),
        combatant(2, 11, 0),
        combatant(3, 11, 11),
        doomed,
    ];
    let mut c = controller_at(1, Grid::open(), roster);

    c.submit(
        CombatantId(0),
        Action::Attack {
            target: Position::new(5, 6),
            weapon: None,
        }
        .into(),
    )
    .unwrap();
    let result = c.resolve_turn().unwrap();
    assert_eq!(result.eliminated, vec![CombatantId(4)]);
    assert_eq!(c.phase(), MatchPhase::Action);
    assert_eq!(c.state().turn, 2);
    assert_eq!(c.state().alive_count(), 4);
    assert_eq!(c.state().combatant(CombatantId(0)).unwrap().kills, 1);
    assert_eq!(
        c.submit(CombatantId(4), ActionSubmission::fallback()),
        Err(SubmitError::Eliminated(CombatantId(4)))
    );

    // Everyone else falls to the zone at once
    let mut state = c.state().clone();
    for id in 1..4 {
        state.combatants.get_mut(&CombatantId(id)).unwrap().hp = 5;
    }
    state.turn = 5;
    let mut c = TurnController::new(state);
    let result = c.resolve_turn().unwrap();
    assert_eq!(result.eliminated.len(), 3);
    assert_eq!(c.phase(), MatchPhase::Finished);
    assert_eq!(c.state().winner, Some(CombatantId(0)));
    assert_eq!(c.state().turn, 5);
}

#[test]
fn simultaneous_last_deaths_leave_no_winner() {
    let mut a = combatant(0, 0, 0);
    let mut b = combatant(1, 11, 11);
    a.hp = 5;
    b.hp = 5;
    let mut c = controller_at(5, Grid::open(), vec![a, b]);
    c.resolve_turn().unwrap();
    assert_eq!(c.phase(), MatchPhase::Finished);
    assert_eq!(c.state().winner, None);
}
