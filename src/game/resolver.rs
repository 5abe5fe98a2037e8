//! Turn resolution - twelve ordered phases over one buffered action per combatant
//!
//! Every phase visits combatants in join order, and the event order index is
//! the sole arbiter of "which happened last". A combatant brought to 0 hp
//! mid-turn still completes its buffered action; removal happens in the
//! final elimination phase.

use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

use super::action::{Action, ActionSubmission};
use super::combat::{
    CombatSystem, WeaponStats, DEAD_SIGNAL_DURATION, GRENADE_DAMAGE, GRENADE_RADIUS,
    GRENADE_RANGE, MARK_DURATION, MEDKIT_HEAL, OVERWATCH_DURATION, SMOKE_DURATION,
    WAR_CRY_FLINCH_RADIUS, WAR_CRY_REVEAL_RADIUS,
};
use super::combatant::{tick_effect, Combatant, CombatantId, TimedEffect};
use super::event::{
    ChatMessage, DamageCause, EventPayload, FizzleReason, GameEvent, KillFeedEntry, MissReason,
};
use super::state::MatchState;
use super::types::{Direction, Grid, Item, Position, Terrain, Trap, Weapon};

/// Output of one resolution pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub events: Vec<GameEvent>,
    pub eliminated: Vec<CombatantId>,
}

/// Where a move ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePlan {
    To(Position),
    /// The move would end on a wall; the combatant stays put
    Blocked(Position),
}

/// Destination of a move under the movement rules: capped distance, clamped
/// to the map, walls rejected, water limiting the move to one step.
pub fn plan_move(grid: &Grid, mover: &Combatant, direction: Direction, distance: u32) -> MovePlan {
    let (dx, dy) = direction.vector();
    let steps = distance.clamp(1, CombatSystem::max_move(mover)) as i32;
    let from = mover.position;
    let dest = from.offset(dx * steps, dy * steps).clamped();

    if grid.is_wall(dest) {
        return MovePlan::Blocked(dest);
    }

    if steps > 1 && grid.is_terrain(dest, Terrain::Water) {
        let step = from.offset(dx, dy).clamped();
        if grid.is_wall(step) {
            return MovePlan::Blocked(step);
        }
        return MovePlan::To(step);
    }

    MovePlan::To(dest)
}

#[derive(Debug, Clone, Copy)]
struct DamageRecord {
    order: u32,
    victim: CombatantId,
    /// None for the danger zone
    source: Option<CombatantId>,
    cause: DamageCause,
}

/// Append-only event log plus a ledger of damaging events
#[derive(Debug, Default)]
struct EventLog {
    events: Vec<GameEvent>,
    damage: Vec<DamageRecord>,
}

impl EventLog {
    fn push(
        &mut self,
        actor: Option<CombatantId>,
        target: Option<CombatantId>,
        payload: EventPayload,
        narration: String,
    ) -> u32 {
        let order = self.events.len() as u32 + 1;
        self.events.push(GameEvent {
            order,
            kind: payload.kind(),
            actor,
            target,
            payload,
            narration,
        });
        order
    }

    fn damaged(
        &mut self,
        order: u32,
        victim: CombatantId,
        source: Option<CombatantId>,
        cause: DamageCause,
    ) {
        self.damage.push(DamageRecord {
            order,
            victim,
            source,
            cause,
        });
    }

    /// The chronologically last damaging event against `victim`
    fn last_damage(&self, victim: CombatantId) -> Option<&DamageRecord> {
        self.damage
            .iter()
            .filter(|d| d.victim == victim)
            .max_by_key(|d| d.order)
    }
}

/// Resolves one turn of a match
pub struct ActionResolver<'a, R: Rng + ?Sized> {
    state: &'a mut MatchState,
    rng: &'a mut R,
    /// Buffered actions; war cry flinches remove entries mid-turn
    actions: BTreeMap<CombatantId, ActionSubmission>,
    /// Who submitted a move this turn, fixed before any phase runs
    movers: BTreeSet<CombatantId>,
    order: Vec<CombatantId>,
    log: EventLog,
}

impl<'a, R: Rng + ?Sized> ActionResolver<'a, R> {
    /// Drain the action buffer and run all twelve phases
    pub fn resolve(state: &'a mut MatchState, rng: &'a mut R) -> Resolution {
        let actions = std::mem::take(&mut state.pending);
        let movers = actions
            .iter()
            .filter(|(_, s)| s.action.is_move())
            .map(|(id, _)| *id)
            .collect();
        let order = state.combatants.keys().copied().collect();

        let mut resolver = Self {
            state,
            rng,
            actions,
            movers,
            order,
            log: EventLog::default(),
        };

        resolver.overwatch();
        resolver.hide_and_scout();
        resolver.movement();
        resolver.attacks();
        resolver.items();
        resolver.loot();
        resolver.specials();
        resolver.messages();
        resolver.danger_zone();
        resolver.smoke_decay();
        resolver.status_decay();
        let eliminated = resolver.eliminations();

        Resolution {
            events: resolver.log.events,
            eliminated,
        }
    }

    fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.state.combatants.get(&id)
    }

    fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.state.combatants.get_mut(&id)
    }

    /// Living combatant by id, cloned so the state can be mutated freely
    fn living(&self, id: CombatantId) -> Option<Combatant> {
        self.combatant(id).filter(|c| c.alive).cloned()
    }

    fn action_of(&self, id: CombatantId) -> Option<Action> {
        self.actions.get(&id).map(|s| s.action.clone())
    }

    fn name_of(&self, id: CombatantId) -> String {
        self.combatant(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    fn hp_of(&self, id: CombatantId) -> u32 {
        self.combatant(id).map_or(0, |c| c.hp)
    }

    /// Apply damage and update both sides' counters
    fn deal_damage(&mut self, source: Option<CombatantId>, victim: CombatantId, amount: u32) {
        if let Some(v) = self.combatant_mut(victim) {
            v.take_damage(amount);
        }
        if let Some(s) = source.and_then(|s| self.combatant_mut(s)) {
            s.damage_dealt += amount;
        }
    }

    /// Phase 1: overwatch zones fire on combatants moving into them
    fn overwatch(&mut self) {
        for watcher_id in self.order.clone() {
            let Some(watcher) = self.living(watcher_id) else {
                continue;
            };
            let Some(tiles) = watcher.overwatch_tiles().map(<[Position]>::to_vec) else {
                continue;
            };

            if watcher.equipped != Weapon::Knife {
                let damage =
                    CombatSystem::overwatch_damage(&watcher, self.state.grid.terrain(watcher.position));

                for mover_id in self.order.clone() {
                    if mover_id == watcher_id {
                        continue;
                    }
                    let Some(mover) = self.living(mover_id) else {
                        continue;
                    };
                    let Some(Action::Move { direction, distance }) = self.action_of(mover_id) else {
                        continue;
                    };
                    let MovePlan::To(dest) = plan_move(&self.state.grid, &mover, direction, distance)
                    else {
                        continue;
                    };
                    if !tiles.contains(&dest) {
                        continue;
                    }

                    self.deal_damage(Some(watcher_id), mover_id, damage);
                    let order = self.log.push(
                        Some(watcher_id),
                        Some(mover_id),
                        EventPayload::OverwatchFire {
                            weapon: watcher.equipped,
                            damage,
                            tile: dest,
                        },
                        format!(
                            "{} fires from overwatch! {} takes {} damage moving through the kill zone.",
                            watcher.name, mover.name, damage
                        ),
                    );
                    self.log
                        .damaged(order, mover_id, Some(watcher_id), DamageCause::Weapon(watcher.equipped));
                }
            }

            if let Some(w) = self.combatant_mut(watcher_id) {
                tick_effect(&mut w.status.overwatch);
            }
        }
    }

    /// Phase 2: hiding and scouting flags for this turn
    fn hide_and_scout(&mut self) {
        for id in self.order.clone() {
            let action = self.action_of(id);
            let Some(c) = self.combatant_mut(id) else {
                continue;
            };
            c.status.hiding = false;
            c.status.scouting = false;
            if !c.alive {
                continue;
            }

            let name = c.name.clone();
            match action {
                Some(Action::Hide) => {
                    c.status.hiding = true;
                    self.log.push(
                        Some(id),
                        None,
                        EventPayload::Hid,
                        format!("{} conceals themselves.", name),
                    );
                }
                Some(Action::Scout) => {
                    c.status.scouting = true;
                    self.log.push(
                        Some(id),
                        None,
                        EventPayload::Scouted,
                        format!("{} surveys the area, extending their vision.", name),
                    );
                }
                _ => {}
            }
        }
    }

    /// Phase 3: movement and trap triggers
    fn movement(&mut self) {
        for id in self.order.clone() {
            let Some(mover) = self.living(id) else {
                continue;
            };
            if mover.status.immobilized {
                continue;
            }
            let Some(Action::Move { direction, distance }) = self.action_of(id) else {
                continue;
            };

            let from = mover.position;
            let dest = match plan_move(&self.state.grid, &mover, direction, distance) {
                MovePlan::Blocked(toward) => {
                    self.log.push(
                        Some(id),
                        None,
                        EventPayload::MoveBlocked { from, toward },
                        format!("{} runs into a wall.", mover.name),
                    );
                    continue;
                }
                MovePlan::To(dest) => dest,
            };

            if let Some(c) = self.combatant_mut(id) {
                c.position = dest;
            }
            self.log.push(
                Some(id),
                None,
                EventPayload::Moved { from, to: dest },
                format!("{} moves to {}.", mover.name, dest),
            );

            let trap = self
                .state
                .grid
                .get(dest)
                .and_then(|t| t.trap)
                .filter(|t| t.owner != id);
            if let Some(trap) = trap {
                if let Some(tile) = self.state.grid.get_mut(dest) {
                    tile.trap = None;
                }
                self.deal_damage(Some(trap.owner), id, trap.damage);
                if let Some(c) = self.combatant_mut(id) {
                    c.status.immobilized = true;
                }
                let order = self.log.push(
                    Some(trap.owner),
                    Some(id),
                    EventPayload::TrapTriggered {
                        damage: trap.damage,
                        at: dest,
                    },
                    format!(
                        "{} steps on a trap! {} damage and immobilized!",
                        mover.name, trap.damage
                    ),
                );
                self.log
                    .damaged(order, id, Some(trap.owner), DamageCause::Item(Item::Trap));
            }
        }
    }

    fn miss(
        &mut self,
        attacker: &Combatant,
        weapon: Weapon,
        reason: MissReason,
        target: Option<&Combatant>,
        at: Position,
    ) {
        let narration = match reason {
            MissReason::NoWeapon => format!("{} reaches for a {} they don't have.", attacker.name, weapon),
            MissReason::OutOfRange => format!("{} fires at {} but it's out of range.", attacker.name, at),
            MissReason::WallBlocked => format!("{} fires but the shot hits a wall.", attacker.name),
            MissReason::NotSetUp => format!(
                "{} tries to use the sniper but hasn't set up. Wasted turn.",
                attacker.name
            ),
            MissReason::NoTarget => format!("{} fires at empty ground.", attacker.name),
            MissReason::Dodged => format!(
                "{} attacks {} but they dodge!",
                attacker.name,
                target.map_or("someone", |t| t.name.as_str())
            ),
        };
        self.log.push(
            Some(attacker.id),
            target.map(|t| t.id),
            EventPayload::AttackMissed { weapon, reason },
            narration,
        );
    }

    /// Phase 4: attacks, all against post-movement positions
    fn attacks(&mut self) {
        for id in self.order.clone() {
            let Some(attacker) = self.living(id) else {
                continue;
            };
            let Some(Action::Attack { target: at, weapon }) = self.action_of(id) else {
                continue;
            };

            let weapon = weapon.unwrap_or(attacker.equipped);
            if !attacker.holds(weapon) {
                self.miss(&attacker, weapon, MissReason::NoWeapon, None, at);
                continue;
            }

            let stats = WeaponStats::for_weapon(weapon);
            let distance = attacker.position.chebyshev(at);
            if distance > stats.range {
                self.miss(&attacker, weapon, MissReason::OutOfRange, None, at);
                continue;
            }
            if weapon != Weapon::Knife && self.state.grid.wall_between(attacker.position, at) {
                self.miss(&attacker, weapon, MissReason::WallBlocked, None, at);
                continue;
            }
            if stats.requires_setup && attacker.status.moved_last_turn {
                self.miss(&attacker, weapon, MissReason::NotSetUp, None, at);
                continue;
            }

            let target = self
                .order
                .iter()
                .filter(|t| **t != id)
                .filter_map(|t| self.living(*t))
                .find(|t| t.position == at);
            let Some(target) = target else {
                self.miss(&attacker, weapon, MissReason::NoTarget, None, at);
                continue;
            };

            if target.status.hiding {
                let chance = CombatSystem::dodge_chance(
                    &target,
                    self.state.rules.dodge_chance,
                    self.state.rules.viper_dodge_chance,
                );
                if self.rng.gen_bool(chance.clamp(0.0, 1.0)) {
                    self.miss(&attacker, weapon, MissReason::Dodged, Some(&target), at);
                    continue;
                }
            }

            let damage = CombatSystem::attack_damage(
                &attacker,
                self.state.grid.terrain(attacker.position),
                &target,
                self.state.grid.terrain(target.position),
                weapon,
                distance,
            );
            let damage = self.absorb(&target, damage);

            self.deal_damage(Some(id), target.id, damage);
            let target_hp = self.hp_of(target.id);
            let outcome = if target_hp == 0 {
                " LETHAL!".to_string()
            } else {
                format!(" ({} HP left)", target_hp)
            };
            let order = self.log.push(
                Some(id),
                Some(target.id),
                EventPayload::AttackHit {
                    weapon,
                    damage,
                    reveal: !stats.silent,
                    target_hp,
                },
                format!(
                    "{} hits {} with {} for {} damage!{}",
                    attacker.name, target.name, weapon, damage, outcome
                ),
            );
            self.log
                .damaged(order, target.id, Some(id), DamageCause::Weapon(weapon));
        }
    }

    /// Consume the target's armor charge if armed, logging the absorption
    fn absorb(&mut self, target: &Combatant, damage: u32) -> u32 {
        let Some(t) = self.combatant_mut(target.id) else {
            return damage;
        };
        let (net, absorbed) = CombatSystem::absorb(t, damage);
        if absorbed > 0 {
            self.log.push(
                Some(target.id),
                None,
                EventPayload::ArmorAbsorbed { absorbed },
                format!("{}'s armor vest absorbs some of the blow!", target.name),
            );
        }
        net
    }

    fn fizzle(&mut self, user: &Combatant, item: Item, reason: FizzleReason) {
        self.log.push(
            Some(user.id),
            None,
            EventPayload::ItemFizzled { item, reason },
            format!("{} fumbles with a {}.", user.name, item),
        );
    }

    /// Phase 5: item use
    fn items(&mut self) {
        for id in self.order.clone() {
            let Some(user) = self.living(id) else {
                continue;
            };
            let Some(Action::UseItem { item, target }) = self.action_of(id) else {
                continue;
            };
            if !user.holds(item) {
                self.fizzle(&user, item, FizzleReason::NotHeld);
                continue;
            }

            match item {
                Item::Medkit => {
                    let Some(c) = self.combatant_mut(id) else {
                        continue;
                    };
                    c.consume(item);
                    let amount = c.heal(MEDKIT_HEAL);
                    let hp = c.hp;
                    self.log.push(
                        Some(id),
                        None,
                        EventPayload::Healed { amount, hp },
                        format!("{} uses a medkit. +{} HP (now {}).", user.name, amount, hp),
                    );
                }
                Item::Grenade => {
                    let Some(at) = target else {
                        self.fizzle(&user, item, FizzleReason::NoTarget);
                        continue;
                    };
                    if user.position.manhattan(at) > GRENADE_RANGE {
                        self.fizzle(&user, item, FizzleReason::OutOfRange);
                        continue;
                    }
                    if let Some(c) = self.combatant_mut(id) {
                        c.consume(item);
                    }
                    self.log.push(
                        Some(id),
                        None,
                        EventPayload::GrenadeThrown { at },
                        format!("{} throws a grenade at {}!", user.name, at),
                    );
                    self.grenade_blast(&user, at);
                }
                Item::Trap => {
                    let at = target.unwrap_or(user.position);
                    if !at.in_bounds() {
                        self.fizzle(&user, item, FizzleReason::OutOfRange);
                        continue;
                    }
                    let damage = CombatSystem::trap_damage(&user);
                    if let Some(tile) = self.state.grid.get_mut(at) {
                        tile.trap = Some(Trap { owner: id, damage });
                    }
                    if let Some(c) = self.combatant_mut(id) {
                        c.consume(item);
                    }
                    self.log.push(
                        Some(id),
                        None,
                        EventPayload::TrapPlaced { at },
                        format!("{} places a trap.", user.name),
                    );
                }
                Item::ArmorVest => {
                    if let Some(c) = self.combatant_mut(id) {
                        c.consume(item);
                        c.status.armored = true;
                    }
                    self.log.push(
                        Some(id),
                        None,
                        EventPayload::ArmorEquipped,
                        format!("{} equips an armor vest.", user.name),
                    );
                }
                Item::SmokeBomb => {
                    let Some(at) = target.filter(Position::in_bounds) else {
                        self.fizzle(&user, item, FizzleReason::NoTarget);
                        continue;
                    };
                    for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                        if let Some(tile) = self.state.grid.get_mut(at.offset(dx, dy)) {
                            tile.smoke_turns = SMOKE_DURATION;
                        }
                    }
                    if let Some(c) = self.combatant_mut(id) {
                        c.consume(item);
                    }
                    self.log.push(
                        Some(id),
                        None,
                        EventPayload::SmokeDeployed { at },
                        format!("{} deploys a smoke bomb at {}.", user.name, at),
                    );
                }
            }
        }
    }

    /// Area damage around `at`; the thrower is not spared
    fn grenade_blast(&mut self, thrower: &Combatant, at: Position) {
        for victim_id in self.order.clone() {
            let Some(victim) = self.living(victim_id) else {
                continue;
            };
            if victim.position.manhattan(at) > GRENADE_RADIUS {
                continue;
            }

            let damage = self.absorb(&victim, GRENADE_DAMAGE);
            self.deal_damage(Some(thrower.id), victim_id, damage);
            let order = self.log.push(
                Some(thrower.id),
                Some(victim_id),
                EventPayload::BlastDamage { damage },
                format!(
                    "{} caught in {}'s grenade blast! {} damage.",
                    victim.name, thrower.name, damage
                ),
            );
            self.log
                .damaged(order, victim_id, Some(thrower.id), DamageCause::Item(Item::Grenade));
        }
    }

    /// Phase 6: pick up everything on the current tile
    fn loot(&mut self) {
        for id in self.order.clone() {
            let Some(looter) = self.living(id) else {
                continue;
            };
            if !matches!(self.action_of(id), Some(Action::Loot)) {
                continue;
            }

            let items = self
                .state
                .grid
                .get_mut(looter.position)
                .map(|t| std::mem::take(&mut t.items))
                .unwrap_or_default();
            if items.is_empty() {
                continue;
            }

            let Some(c) = self.combatant_mut(id) else {
                continue;
            };
            c.inventory.extend(items.iter().copied());
            c.equip_best();
            let equipped = c.equipped;

            let names: Vec<String> = items.iter().map(ToString::to_string).collect();
            self.log.push(
                Some(id),
                None,
                EventPayload::Looted { items, equipped },
                format!("{} loots: {}.", looter.name, names.join(", ")),
            );
        }
    }

    /// Phase 7: once-per-match archetype abilities
    fn specials(&mut self) {
        for id in self.order.clone() {
            // Looked up live: a war cry earlier in this phase may have
            // removed the action
            let Some(action) = self.action_of(id) else {
                continue;
            };
            let Some(required) = action.required_archetype() else {
                continue;
            };
            let Some(user) = self.living(id) else {
                continue;
            };
            if user.status.special_used || !user.is(required) {
                debug!(combatant = %id, ability = action.name(), "Special ability not available");
                continue;
            }

            match action {
                Action::MarkTarget { target_id } => {
                    if target_id == id || self.combatant(target_id).is_none() {
                        debug!(combatant = %id, target = %target_id, "Invalid mark target");
                        continue;
                    }
                    if let Some(c) = self.combatant_mut(id) {
                        c.status.mark = Some(TimedEffect::new(target_id, MARK_DURATION));
                        c.status.special_used = true;
                    }
                    self.log.push(
                        Some(id),
                        Some(target_id),
                        EventPayload::MarkTarget { target: target_id },
                        format!("{} marks a target. They can't hide now.", user.name),
                    );
                }
                Action::WarCry => self.war_cry(&user),
                Action::DeadSignal => {
                    if let Some(c) = self.combatant_mut(id) {
                        c.status.dead_signal = Some(TimedEffect::new((), DEAD_SIGNAL_DURATION));
                        c.status.special_used = true;
                    }
                    self.log.push(
                        Some(id),
                        None,
                        EventPayload::DeadSignal,
                        format!(
                            "A death notification broadcasts: {} has been eliminated. ...Or have they?",
                            user.name
                        ),
                    );
                }
                Action::FalseFlag {
                    fake_sender,
                    to,
                    text,
                } => {
                    if let Some(c) = self.combatant_mut(id) {
                        c.status.special_used = true;
                    }
                    let from_name = self.name_of(fake_sender);
                    self.state.messages.push(ChatMessage {
                        turn: self.state.turn,
                        from: fake_sender,
                        from_name,
                        to,
                        text,
                        private: !to.is_public(),
                    });
                    self.log.push(
                        Some(id),
                        None,
                        EventPayload::FalseFlag,
                        format!("{} sends a false flag message.", user.name),
                    );
                }
                Action::Overwatch { tiles } => {
                    let mut tiles: Vec<Position> =
                        tiles.into_iter().filter(Position::in_bounds).collect();
                    tiles.sort();
                    tiles.dedup();
                    if tiles.is_empty() {
                        debug!(combatant = %id, "Overwatch without any tiles on the map");
                        continue;
                    }
                    if let Some(c) = self.combatant_mut(id) {
                        c.status.overwatch = Some(TimedEffect::new(tiles.clone(), OVERWATCH_DURATION));
                        c.status.special_used = true;
                    }
                    self.log.push(
                        Some(id),
                        None,
                        EventPayload::Overwatch { tiles },
                        format!("{} sets up overwatch on a corridor. Enter at your own risk.", user.name),
                    );
                }
                _ => {}
            }
        }
    }

    /// Reveal nearby combatants; the closest may flinch and lose their action
    fn war_cry(&mut self, user: &Combatant) {
        if let Some(c) = self.combatant_mut(user.id) {
            c.status.special_used = true;
        }

        let mut revealed = Vec::new();
        let mut flinched = Vec::new();
        let flinch_chance = self.state.rules.flinch_chance.clamp(0.0, 1.0);

        for other_id in self.order.clone() {
            if other_id == user.id {
                continue;
            }
            let Some(other) = self.living(other_id) else {
                continue;
            };
            let dist = user.position.manhattan(other.position);
            if dist > WAR_CRY_REVEAL_RADIUS {
                continue;
            }
            revealed.push(other_id);
            if dist <= WAR_CRY_FLINCH_RADIUS && self.rng.gen_bool(flinch_chance) {
                flinched.push(other_id);
                self.actions.remove(&other_id);
                trace!(combatant = %other_id, "Flinched, buffered action cancelled");
            }
        }

        let narration = format!(
            "{} unleashes a WAR CRY! {} players revealed. {} flinched.",
            user.name,
            revealed.len(),
            flinched.len()
        );
        self.log.push(
            Some(user.id),
            None,
            EventPayload::WarCry { revealed, flinched },
            narration,
        );
    }

    /// Phase 8: chat messages attached to surviving buffered actions
    fn messages(&mut self) {
        for id in self.order.clone() {
            let Some(sender) = self.living(id) else {
                continue;
            };
            let Some(submission) = self.actions.get(&id) else {
                continue;
            };
            let outgoing: Vec<ChatMessage> = submission
                .messages
                .iter()
                .map(|m| ChatMessage {
                    turn: self.state.turn,
                    from: id,
                    from_name: sender.name.clone(),
                    to: m.to,
                    text: m.text.clone(),
                    private: !m.to.is_public(),
                })
                .collect();
            self.state.messages.extend(outgoing);
        }
    }

    /// Phase 9: advance the zone and burn whoever is outside
    fn danger_zone(&mut self) {
        let rules = self.state.rules.zone;
        self.state.zone.advance(self.state.turn, &rules);

        let zone = self.state.zone;
        let hits = zone.apply_damage(self.state.combatants.values_mut(), rules.damage);
        for (id, hp) in hits {
            let name = self.name_of(id);
            let lethal = if hp == 0 { " LETHAL!" } else { "" };
            let order = self.log.push(
                Some(id),
                None,
                EventPayload::ZoneDamage {
                    damage: rules.damage,
                    hp,
                },
                format!(
                    "{} takes {} damage from the danger zone!{}",
                    name, rules.damage, lethal
                ),
            );
            self.log.damaged(order, id, None, DamageCause::Zone);
        }
    }

    /// Phase 10
    fn smoke_decay(&mut self) {
        for tile in self.state.grid.tiles_mut() {
            tile.smoke_turns = tile.smoke_turns.saturating_sub(1);
        }
    }

    /// Phase 11: timers and per-turn flags
    fn status_decay(&mut self) {
        for c in self.state.combatants.values_mut() {
            c.status.decay();
            c.status.moved_last_turn = self.movers.contains(&c.id);
        }
    }

    /// Phase 12: remove the fallen and credit the last damage source
    fn eliminations(&mut self) -> Vec<CombatantId> {
        let mut eliminated = Vec::new();

        for id in self.order.clone() {
            let Some(victim) = self.living(id) else {
                continue;
            };
            if victim.hp > 0 {
                continue;
            }
            if let Some(c) = self.combatant_mut(id) {
                c.alive = false;
            }
            eliminated.push(id);

            // hp only drops through recorded damage, so a missing record
            // cannot happen; treat it like the zone
            let last = self.log.last_damage(id).copied();
            let cause = last.map_or(DamageCause::Zone, |d| d.cause);
            let killer = last.and_then(|d| d.source);

            if let Some(k) = killer.filter(|k| *k != id) {
                if let Some(c) = self.combatant_mut(k) {
                    c.kills += 1;
                }
            }

            let (killer_name, narration) = match killer {
                Some(k) => {
                    let name = self.name_of(k);
                    let narration = format!("{} eliminated {}.", name, victim.name);
                    (name, narration)
                }
                None => (
                    "The Zone".to_string(),
                    format!("{} was consumed by the danger zone.", victim.name),
                ),
            };

            self.state.kill_feed.push(KillFeedEntry {
                turn: self.state.turn,
                killer,
                killer_name: killer_name.clone(),
                victim: id,
                victim_name: victim.name.clone(),
                cause,
                narration: narration.clone(),
            });
            self.log.push(
                killer,
                Some(id),
                EventPayload::Eliminated {
                    killer,
                    killer_name,
                    cause,
                },
                narration,
            );
            debug!(victim = %id, killer = ?killer, cause = cause.label(), "Combatant eliminated");
        }

        eliminated
    }
}
