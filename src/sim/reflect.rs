//! Reflection engine
//!
//! Projectiles leave a bounce wall along the table direction picked by the
//! predictor. The ship gets a velocity kick along the wall normal instead,
//! with a minimum force so it never sticks to the wall.

use glam::IVec2;

use super::geometry::dot;
use super::ship::ShipState;
use super::tables::{BOUNCE_NORMAL_HALF_SQ, bounce_normal, direction_vector};
use crate::consts::{BOUNCE_DOT_THRESHOLD, BOUNCE_MIN_FORCE};

/// Outgoing projectile velocity for a 16-step strafe direction.
///
/// `None` when the hit side has no bounce direction.
pub fn bounce_shot_velocity(strafe_dir: i8) -> Option<IVec2> {
    (strafe_dir >= 0).then(|| direction_vector(strafe_dir as i32))
}

/// Impulse magnitude for an incoming dot product against the normal.
///
/// Ships already moving away fast enough get nothing; everything else gets
/// at least the minimum force.
pub fn bounce_impulse(dot: i64) -> Option<i64> {
    (dot < BOUNCE_DOT_THRESHOLD as i64).then(|| dot.abs().max(BOUNCE_MIN_FORCE as i64))
}

/// Velocity after a kick along normal `norm` (16-step)
pub fn bounce_velocity(vel: IVec2, norm: i32) -> IVec2 {
    let normal = bounce_normal(norm);
    match bounce_impulse(dot(vel, normal)) {
        Some(force) => {
            let kick = |component: i32| {
                (component as i64 * force / BOUNCE_NORMAL_HALF_SQ as i64) as i32
            };
            vel + IVec2::new(kick(normal.x), kick(normal.y))
        }
        None => vel,
    }
}

/// Kick the ship off a bounce wall; the ship is marked bouncing either way
pub fn bounce_ship(ship: &mut ShipState, norm: i32) {
    ship.vel = bounce_velocity(ship.vel, norm);
    ship.bouncing = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_shot_bounce_directions() {
        assert_eq!(bounce_shot_velocity(12), Some(IVec2::new(-72, 0)));
        assert_eq!(bounce_shot_velocity(0), Some(IVec2::new(0, -72)));
        assert_eq!(bounce_shot_velocity(-1), None);
    }

    #[test]
    fn test_head_on_ship_bounce_reflects() {
        // Falling onto a floor (normal up) at 4 px/frame
        let vel = IVec2::new(0, 1024);
        let out = bounce_velocity(vel, 0);
        // dot = -24 * 1024; kick = -24 * 24576 / 288 = -2048
        assert_eq!(out, IVec2::new(0, -1024));
    }

    #[test]
    fn test_slow_contact_gets_minimum_kick() {
        let out = bounce_velocity(IVec2::ZERO, 4);
        // 24 * 2560 / 288
        assert_eq!(out, IVec2::new(213, 0));
    }

    #[test]
    fn test_fast_departure_is_untouched() {
        // Moving east at 4 px/frame away from an east-facing wall: dot = 24 * 1024
        let vel = IVec2::new(1024, 0);
        assert_eq!(bounce_velocity(vel, 4), vel);
    }

    #[test]
    fn test_bounce_ship_always_flags() {
        let mut ship = ShipState::new(IVec2::new(50, 50));
        ship.vel = IVec2::new(1024, 0);
        bounce_ship(&mut ship, 4);
        assert!(ship.bouncing);
        assert_eq!(ship.vel, IVec2::new(1024, 0));
    }

    proptest! {
        #[test]
        fn prop_impulse_never_below_minimum(dot in -2559i64..2560) {
            prop_assert_eq!(bounce_impulse(dot), Some(BOUNCE_MIN_FORCE as i64));
        }

        #[test]
        fn prop_impulse_at_least_minimum(dot in -1_000_000i64..BOUNCE_DOT_THRESHOLD as i64) {
            let force = bounce_impulse(dot).unwrap();
            prop_assert!(force >= BOUNCE_MIN_FORCE as i64);
            prop_assert!(force >= dot.abs());
        }

        #[test]
        fn prop_no_impulse_above_threshold(dot in BOUNCE_DOT_THRESHOLD as i64..1_000_000) {
            prop_assert_eq!(bounce_impulse(dot), None);
        }
    }
}
