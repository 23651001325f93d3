//! Gravity Sim headless runner
//!
//! Usage: `gravity-sim [config.json] [level.json] [ticks]`
//!
//! Loads (or defaults) the tunables and a level, drives the simulation with
//! a fixed command script, and logs every intent. Use `RUST_LOG=debug` for
//! per-tick detail.

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use std::process::ExitCode;

    use glam::IVec2;
    use gravity_sim::consts::TICK_HZ;
    use gravity_sim::sim::{BunkerKind, SimEvent, SimState, TickInput, WallKind, tick};
    use gravity_sim::{BunkerSpec, LevelData, Result, SimConfig, WallSpec};

    const DEFAULT_TICKS: u64 = 400;
    const SEED: u64 = 0x5eed_1986;

    pub fn main() -> ExitCode {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("Gravity Sim (headless) starting...");

        match run() {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                log::error!("{}", err);
                ExitCode::FAILURE
            }
        }
    }

    fn run() -> Result<()> {
        let args: Vec<String> = std::env::args().skip(1).collect();

        let config = match args.first().map(String::as_str) {
            Some(path) if path != "-" => SimConfig::load(path)?,
            _ => SimConfig::default(),
        };
        let level = match args.get(1).map(String::as_str) {
            Some(path) if path != "-" => LevelData::load(path)?,
            _ => demo_level(),
        };
        let ticks = args
            .get(2)
            .and_then(|t| t.parse().ok())
            .unwrap_or(DEFAULT_TICKS);

        let mut state = SimState::new(config, &level, SEED)?;
        let mut shots_fired = 0usize;
        let mut bunkers_destroyed = 0usize;
        let mut strafes = 0usize;
        let mut bounces = 0usize;

        for t in 0..ticks {
            let input = scripted_input(t);
            for event in tick(&mut state, &input) {
                match event {
                    SimEvent::ProjectileSpawned { .. } => shots_fired += 1,
                    SimEvent::BunkerDestroyed { .. } => bunkers_destroyed += 1,
                    SimEvent::StrafeSpawned { .. } => strafes += 1,
                    SimEvent::ShipBounced { .. } => bounces += 1,
                    _ => {}
                }
                log::info!("[tick {:>5}] {:?}", state.time_ticks, event);
            }
            if !state.ship.alive {
                log::info!("Ship lost at tick {}", state.time_ticks);
                break;
            }
        }

        println!(
            "Ran {} ticks ({:.1}s at {} Hz)",
            state.time_ticks,
            state.time_ticks as f64 / TICK_HZ as f64,
            TICK_HZ
        );
        println!("  shots fired:       {}", shots_fired);
        println!("  bunkers destroyed: {} ({} left)", bunkers_destroyed, state.bunkers_alive());
        println!("  strafes:           {}", strafes);
        println!("  ship bounces:      {}", bounces);
        println!(
            "  ship:              {} at {:?}",
            if state.ship.alive { "alive" } else { "lost" },
            state.ship.pos
        );
        Ok(())
    }

    /// Turn to face east, then alternate volleys, short burns and shields
    fn scripted_input(t: u64) -> TickInput {
        let phase = t % 60;
        TickInput {
            turn_right: t < 8 || (20..24).contains(&phase),
            turn_left: (44..48).contains(&phase),
            fire: phase % 5 == 0,
            thrust: (30..33).contains(&phase),
            shield: (50..56).contains(&phase),
            self_destruct: false,
        }
    }

    fn demo_level() -> LevelData {
        let wall = |kind, a: (i32, i32), b: (i32, i32)| {
            WallSpec::new(kind, IVec2::new(a.0, a.1), IVec2::new(b.0, b.1))
        };
        let bunker = |kind, x, y, rot| BunkerSpec {
            kind,
            pos: IVec2::new(x, y),
            rot,
            ranges: None,
        };
        LevelData {
            walls: vec![
                wall(WallKind::Normal, (0, 520), (300, 520)),
                wall(WallKind::Normal, (300, 520), (420, 460)),
                wall(WallKind::Normal, (420, 460), (999, 460)),
                wall(WallKind::Bounce, (135, 40), (135, 300)),
                wall(WallKind::Bounce, (620, 120), (700, 280)),
                wall(WallKind::Ghost, (800, 200), (900, 200)),
            ],
            bunkers: vec![
                bunker(BunkerKind::Ground, 220, 508, 0),
                bunker(BunkerKind::Wall, 500, 448, 0),
                bunker(BunkerKind::Diff, 650, 448, 2),
                bunker(BunkerKind::Follow, 780, 448, 0),
                bunker(BunkerKind::Generator, 900, 448, 0),
            ],
            ship_start: IVec2::new(250, 200),
            world_width: None,
            wraps: Some(true),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    runner::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the product on wasm; there is no headless runner
}
