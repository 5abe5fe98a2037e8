//! Reproducibility and roll-rate checks

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use kill_zone::agents::HeuristicProvider;
use kill_zone::game::event::MissReason;
use kill_zone::game::{
    Action, ActionResolver, Archetype, Combatant, CombatantId, Controller, EventPayload, Grid,
    MatchPhase, MatchState, Position, Rules, TurnController,
};

/// Play up to `turns` turns with every combatant on the heuristic policy
fn play(seed: u64, turns: u32) -> TurnController {
    let mut c = TurnController::standard(Uuid::nil(), seed, Rules::default(), "Ada");
    c.start().unwrap();

    for _ in 0..turns {
        if c.phase() == MatchPhase::Finished {
            break;
        }
        for id in c.pending_combatants() {
            let view = c.view(id).unwrap();
            c.submit(id, HeuristicProvider::choose(&view).into()).unwrap();
        }
        c.resolve_turn().unwrap();
    }
    c
}

#[test]
fn same_seed_same_match() {
    for seed in [1, 42, 9_001] {
        let a = play(seed, 30);
        let b = play(seed, 30);
        assert_eq!(a.state().history, b.state().history);
        assert_eq!(
            serde_json::to_string(a.state()).unwrap(),
            serde_json::to_string(b.state()).unwrap()
        );
    }
}

#[test]
fn long_match_keeps_invariants() {
    let c = play(7, 60);
    let state = c.state();
    for combatant in state.combatants.values() {
        assert!(combatant.hp <= combatant.max_hp);
        assert_eq!(combatant.alive, combatant.hp > 0);
        assert!(combatant.holds(combatant.equipped));
    }
    for result in &state.history {
        for (i, event) in result.events.iter().enumerate() {
            assert_eq!(event.order, i as u32 + 1);
        }
    }
    if state.phase == MatchPhase::Finished {
        assert!(state.alive_count() <= 1);
        assert_eq!(state.winner, state.alive_ids().first().copied());
    }
}

/// Fraction of attacks dodged by a hiding target over `trials` turns
fn dodge_rate(archetype: Option<Archetype>, trials: u32) -> f64 {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut dodged = 0;

    for _ in 0..trials {
        let attacker = Combatant::new(CombatantId(0), "a", Controller::Agent, None, Position::new(5, 5));
        let target = Combatant::new(CombatantId(1), "t", Controller::Agent, archetype, Position::new(6, 5));
        let mut state = MatchState::new(Uuid::nil(), 0, Rules::default(), Grid::open(), vec![attacker, target]);
        state.turn = 1;
        state.pending.insert(
            CombatantId(0),
            Action::Attack {
                target: Position::new(6, 5),
                weapon: None,
            }
            .into(),
        );
        state.pending.insert(CombatantId(1), Action::Hide.into());

        let resolution = ActionResolver::resolve(&mut state, &mut rng);
        if resolution.events.iter().any(|e| {
            matches!(
                e.payload,
                EventPayload::AttackMissed {
                    reason: MissReason::Dodged,
                    ..
                }
            )
        }) {
            dodged += 1;
        }
    }

    f64::from(dodged) / f64::from(trials)
}

#[test]
fn dodge_rate_converges() {
    let base = dodge_rate(None, 4_000);
    assert!((base - 0.5).abs() < 0.04, "base dodge rate {}", base);

    let viper = dodge_rate(Some(Archetype::Viper), 4_000);
    assert!((viper - 0.65).abs() < 0.04, "viper dodge rate {}", viper);
}
