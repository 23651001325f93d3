//! Fixed-step simulation tick
//!
//! One call advances the world by one frame in a fixed order:
//! ship commands, bunker AI, ship shots, bunker shots, ship terrain
//! contact, strafe sparks.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::bunkers::{Bunker, BunkerKind, choose_shot, lead_turn};
use super::geometry::{dot, within};
use super::rng::RandomSource;
use super::ship::{ShipState, resolve_terrain, steer};
use super::shots::{Expiry, Launched, Shot, ShotOwner, StrafeRequest};
use super::state::{SimEvent, SimState};
use crate::World;
use crate::consts::*;

/// Commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub fire: bool,
    pub thrust: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Held: shield is up only on ticks where this is set
    pub shield: bool,
    pub self_destruct: bool,
}

/// Advance the simulation by one tick using the state's own random source
pub fn tick(state: &mut SimState, input: &TickInput) -> Vec<SimEvent> {
    let mut rng = state.rng.clone();
    let events = tick_with_rng(state, input, &mut rng);
    state.rng = rng;
    events
}

/// Advance the simulation by one tick drawing from `rng`
pub fn tick_with_rng<R: RandomSource>(
    state: &mut SimState,
    input: &TickInput,
    rng: &mut R,
) -> Vec<SimEvent> {
    let mut events = Vec::new();
    let mut strafes = Vec::new();

    state.time_ticks += 1;
    state.ship_shots.clear_just_died();
    state.bunker_shots.clear_just_died();

    // Shots fired this tick already had their first frame applied
    let ship_live = live_slots(state.ship_shots.slots());
    let bunker_live = live_slots(state.bunker_shots.slots());

    update_ship(state, input, &mut events, &mut strafes);
    update_bunkers(state, rng, &mut events, &mut strafes);
    advance_ship_shots(state, &ship_live, &mut events, &mut strafes);
    advance_bunker_shots(state, &bunker_live, &mut events, &mut strafes);
    update_terrain(state, &mut events);
    update_strafes(state, strafes, &mut events);

    events
}

fn update_ship(
    state: &mut SimState,
    input: &TickInput,
    events: &mut Vec<SimEvent>,
    strafes: &mut Vec<StrafeRequest>,
) {
    if !state.ship.alive {
        return;
    }
    if input.self_destruct {
        state.ship.alive = false;
        events.push(SimEvent::ShipSelfDestructed);
        return;
    }

    steer(&mut state.ship, input, &state.world, state.config.thrust_scale);

    if input.fire {
        let launched = state.ship_shots.launch(
            state.ship.pos,
            state.ship.shot_velocity(),
            state.config.ship_shot_life,
            &state.walls,
            &state.world,
        );
        if let Some(launched) = launched {
            settle_launch(state, ShotOwner::Ship, launched, events, strafes);
        }
    }
}

fn update_bunkers<R: RandomSource>(
    state: &mut SimState,
    rng: &mut R,
    events: &mut Vec<SimEvent>,
    strafes: &mut Vec<StrafeRequest>,
) {
    if !state.ship.alive {
        return;
    }
    let ship_pos = state.ship.pos;

    let interval = state.config.follow_turn_interval.max(1) as u64;
    if state.time_ticks % interval == 0 {
        for bunker in &mut state.bunkers {
            if bunker.alive && bunker.kind == BunkerKind::Follow {
                let turn = lead_turn(bunker.rot, bunker.pos, ship_pos, &state.world);
                bunker.rot = (bunker.rot + turn).rem_euclid(8);
            }
        }
    }

    let Some((index, aimed)) =
        choose_shot(&state.bunkers, ship_pos, &state.world, &state.config, rng)
    else {
        return;
    };
    let launched = state.bunker_shots.launch(
        aimed.origin,
        aimed.vel,
        state.config.bunker_shot_life,
        &state.walls,
        &state.world,
    );
    if let Some(launched) = launched {
        log::debug!("Bunker {} fired into slot {}", index, launched.slot);
        settle_launch(state, ShotOwner::Bunker, launched, events, strafes);
    }
}

/// Report a fresh shot, then run its spawn frame through the same target
/// checks as any other frame before resolving expiry
fn settle_launch(
    state: &mut SimState,
    owner: ShotOwner,
    launched: Launched,
    events: &mut Vec<SimEvent>,
    strafes: &mut Vec<StrafeRequest>,
) {
    let slot = launched.slot;
    events.push(SimEvent::ProjectileSpawned { owner, slot });

    let SimState {
        ship_shots,
        bunker_shots,
        walls,
        world,
        bunkers,
        ship,
        ..
    } = state;
    let pool = match owner {
        ShotOwner::Ship => ship_shots,
        ShotOwner::Bunker => bunker_shots,
    };
    let Some(shot) = pool.slot_mut(slot) else {
        return;
    };

    let spent = match owner {
        // Leaving the muzzle, so no friendly fire yet
        ShotOwner::Ship => {
            ship_shot_hits(slot, shot, launched.prev, bunkers, ship, world, false, events)
        }
        ShotOwner::Bunker => bunker_shot_hits(slot, shot, ship, world, events),
    };
    if !spent && !shot.is_alive() {
        let expiry = shot.expire(walls, world, launched.moved);
        record_expiry(owner, slot, shot, expiry, events, strafes);
    }
}

fn live_slots(slots: &[Shot]) -> Vec<bool> {
    slots.iter().map(Shot::is_alive).collect()
}

fn advance_ship_shots(
    state: &mut SimState,
    live: &[bool],
    events: &mut Vec<SimEvent>,
    strafes: &mut Vec<StrafeRequest>,
) {
    let SimState {
        ship_shots,
        walls,
        world,
        bunkers,
        ship,
        ..
    } = state;

    for slot in 0..ship_shots.capacity() {
        let Some(shot) = ship_shots.slot_mut(slot) else {
            continue;
        };
        if !live[slot] || !shot.is_alive() {
            continue;
        }
        let prev = shot.step(world);
        if ship_shot_hits(slot, shot, prev, bunkers, ship, world, true, events) {
            continue;
        }
        if !shot.is_alive() {
            let expiry = shot.expire(walls, world, true);
            record_expiry(ShotOwner::Ship, slot, shot, expiry, events, strafes);
        }
    }
}

/// Bunker and friendly-fire checks for a ship shot that just moved from
/// `prev`. Returns true if the shot was used up.
#[allow(clippy::too_many_arguments)]
fn ship_shot_hits(
    slot: usize,
    shot: &mut Shot,
    prev: IVec2,
    bunkers: &mut [Bunker],
    ship: &ShipState,
    world: &World,
    check_owner: bool,
    events: &mut Vec<SimEvent>,
) -> bool {
    // One bunker per shot; the first in level order wins
    let hit = bunkers.iter().position(|b| {
        b.alive
            && within(world.delta(b.pos, shot.pos), BUNKER_RADIUS)
            && b.vulnerable_from(prev, world)
    });
    if let Some(index) = hit {
        bunkers[index].alive = false;
        shot.kill();
        log::debug!("Bunker {} destroyed at {:?}", index, bunkers[index].pos);
        events.push(SimEvent::BunkerDestroyed {
            index,
            pos: bunkers[index].pos,
        });
        push_death(ShotOwner::Ship, slot, shot, events);
        return true;
    }

    // Own shot coming back, not one leaving the muzzle
    let to_ship = world.delta(shot.pos, ship.pos);
    if check_owner && ship.alive && within(to_ship, SHIP_RADIUS) && dot(shot.vel, to_ship) >= 0
    {
        shot.kill();
        events.push(SimEvent::ShieldFeedback);
        push_death(ShotOwner::Ship, slot, shot, events);
        return true;
    }
    false
}

/// Ship check for a bunker shot. Returns true if the shot was used up.
fn bunker_shot_hits(
    slot: usize,
    shot: &mut Shot,
    ship: &mut ShipState,
    world: &World,
    events: &mut Vec<SimEvent>,
) -> bool {
    if !ship.alive || !within(world.delta(shot.pos, ship.pos), SHIP_RADIUS) {
        return false;
    }
    shot.kill();
    if ship.shielding {
        events.push(SimEvent::ShotDeflected { slot });
    } else {
        ship.alive = false;
        log::debug!("Ship killed by bunker shot at {:?}", shot.pos);
        events.push(SimEvent::ShipKilled);
    }
    push_death(ShotOwner::Bunker, slot, shot, events);
    true
}

fn advance_bunker_shots(
    state: &mut SimState,
    live: &[bool],
    events: &mut Vec<SimEvent>,
    strafes: &mut Vec<StrafeRequest>,
) {
    let SimState {
        bunker_shots,
        walls,
        world,
        ship,
        ..
    } = state;

    for slot in 0..bunker_shots.capacity() {
        let Some(shot) = bunker_shots.slot_mut(slot) else {
            continue;
        };
        if !live[slot] || !shot.is_alive() {
            continue;
        }
        shot.step(world);
        if bunker_shot_hits(slot, shot, ship, world, events) {
            continue;
        }
        if !shot.is_alive() {
            let expiry = shot.expire(walls, world, true);
            record_expiry(ShotOwner::Bunker, slot, shot, expiry, events, strafes);
        }
    }
}

fn update_terrain(state: &mut SimState, events: &mut Vec<SimEvent>) {
    match resolve_terrain(&mut state.ship, &state.walls, &state.world) {
        Ok(contact) => {
            if let Some(bounce) = contact.bounce {
                events.push(SimEvent::ShipBounced {
                    wall: bounce.wall,
                    norm: bounce.norm,
                });
            }
            if contact.crashed {
                state.ship.alive = false;
                log::debug!("Ship crashed at {:?}", state.ship.pos);
                events.push(SimEvent::ShipCrashed);
            }
        }
        Err(err) => log::error!("Terrain check failed: {}", err),
    }
}

fn update_strafes(state: &mut SimState, requests: Vec<StrafeRequest>, events: &mut Vec<SimEvent>) {
    state.strafes.advance();
    for request in requests {
        if let Some(slot) = state.strafes.spawn(request) {
            events.push(SimEvent::StrafeSpawned {
                slot,
                pos: request.pos,
                dir: request.dir,
            });
        }
    }
}

fn record_expiry(
    owner: ShotOwner,
    slot: usize,
    shot: &Shot,
    expiry: Expiry,
    events: &mut Vec<SimEvent>,
    strafes: &mut Vec<StrafeRequest>,
) {
    if let Expiry::Died(strafe) = expiry {
        push_death(owner, slot, shot, events);
        strafes.extend(strafe);
    }
}

fn push_death(owner: ShotOwner, slot: usize, shot: &Shot, events: &mut Vec<SimEvent>) {
    events.push(SimEvent::ProjectileJustDied {
        owner,
        slot,
        pos: shot.pos,
    });
}

/// Position a renderer should draw a shot at this tick, if any
pub fn visible_pos(shot: &Shot) -> Option<IVec2> {
    (shot.is_alive() || shot.just_died).then_some(shot.pos)
}
