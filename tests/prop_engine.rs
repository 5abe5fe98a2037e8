//! Property-based tests for map generation, the danger zone and resolution

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use kill_zone::game::{
    Action, ActionResolver, ActionSubmission, CombatantId, DangerZone, Direction, Item, MapGenerator,
    MatchState, Position, Rules, Weapon, ZoneRules,
};

fn direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

fn position() -> impl Strategy<Value = Position> {
    (-1i32..13, -1i32..13).prop_map(|(x, y)| Position::new(x, y))
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (direction(), 0u32..5).prop_map(|(direction, distance)| Action::Move { direction, distance }),
        (position(), prop::option::of(prop::sample::select(vec![Weapon::Knife, Weapon::Pistol])))
            .prop_map(|(target, weapon)| Action::Attack { target, weapon }),
        Just(Action::Loot),
        Just(Action::Hide),
        Just(Action::Scout),
        (prop::sample::select(vec![Item::Medkit, Item::Grenade, Item::Trap]), prop::option::of(position()))
            .prop_map(|(item, target)| Action::UseItem { item, target }),
        Just(Action::WarCry),
        Just(Action::DeadSignal),
        (0u8..6).prop_map(|n| Action::MarkTarget { target_id: CombatantId(n) }),
        prop::collection::vec(position(), 0..4).prop_map(|tiles| Action::Overwatch { tiles }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Map generation is a pure function of the seed.
    #[test]
    fn prop_map_generation_is_pure(seed in any::<u64>()) {
        let a = MapGenerator::generate(seed);
        let b = MapGenerator::generate(seed);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.spawn_points.len(), 6);
    }

    /// Once active, the safe area never grows and never drops below the minimum.
    #[test]
    fn prop_zone_never_grows(
        start in 1u32..10,
        interval in 1u32..5,
        turn in 0u32..200,
    ) {
        let rules = ZoneRules { start_turn: start, shrink_interval: interval, ..ZoneRules::default() };
        let now = DangerZone::at_turn(turn, &rules).safe_area;
        let next = DangerZone::at_turn(turn + 1, &rules).safe_area;

        prop_assert!(next.min_x >= now.min_x && next.min_y >= now.min_y);
        prop_assert!(next.max_x <= now.max_x && next.max_y <= now.max_y);
        prop_assert!(next.min_x <= 4 && next.max_x >= 8);
        prop_assert!(next.min_y <= 4 && next.max_y >= 8);
    }

    /// Arbitrary action sets resolve without breaking combatant invariants.
    #[test]
    fn prop_resolution_keeps_invariants(
        seed in any::<u64>(),
        turn in 1u32..12,
        actions in prop::collection::vec(action(), 6),
    ) {
        let mut state = MatchState::standard(Uuid::nil(), seed, Rules::default(), "Ada");
        state.turn = turn;
        for (i, action) in actions.into_iter().enumerate() {
            state.pending.insert(CombatantId(i as u8), ActionSubmission::new(action));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let resolution = ActionResolver::resolve(&mut state, &mut rng);

        prop_assert!(state.pending.is_empty());
        for (i, event) in resolution.events.iter().enumerate() {
            prop_assert_eq!(event.order, i as u32 + 1);
        }
        for c in state.combatants.values() {
            prop_assert!(c.hp <= c.max_hp);
            prop_assert_eq!(c.alive, c.hp > 0);
            prop_assert!(c.position.in_bounds());
            prop_assert!(!state.grid.is_wall(c.position));
            prop_assert!(c.holds(c.equipped));
        }
        prop_assert_eq!(resolution.eliminated.len(), state.kill_feed.len());
    }
}
