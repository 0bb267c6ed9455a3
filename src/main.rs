//! Sky Battle entry point
//!
//! Headless native driver: loads settings, runs the stock levels against an
//! autopilot and logs what the view would show.
//!
//! Usage: `sky-battle [config.json] [--fast] [--max-ticks N]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::process::ExitCode;
    use std::thread;
    use std::time::{Duration, Instant};

    use sky_battle::Settings;
    use sky_battle::controller::Controller;
    use sky_battle::sim::{ActorKind, Command, Hud, Level, LevelPhase, ViewEvent};
    use sky_battle::transition::LevelRegistry;

    #[derive(Debug, Default)]
    struct Args {
        config: Option<String>,
        /// Step the clock by exactly one period instead of sleeping
        fast: bool,
        max_ticks: Option<u64>,
    }

    impl Args {
        fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
            let mut parsed = Args::default();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--fast" => parsed.fast = true,
                    "--max-ticks" => {
                        let value = args.next().ok_or("--max-ticks needs a value")?;
                        let ticks = value
                            .parse()
                            .map_err(|_| format!("invalid tick count: {value}"))?;
                        parsed.max_ticks = Some(ticks);
                    }
                    flag if flag.starts_with("--") => return Err(format!("unknown flag: {flag}")),
                    path => parsed.config = Some(path.to_string()),
                }
            }
            Ok(parsed)
        }
    }

    /// Chase the row of the closest enemy and keep the trigger held
    fn autopilot(level: &Level) -> Vec<Command> {
        let Some(user) = level.user() else {
            return Vec::new();
        };
        let user_y = user.bounds().min.y + user.kind().size().y / 2.0;
        let target = level
            .enemy_units()
            .iter()
            .filter(|enemy| !enemy.is_destroyed())
            .min_by(|a, b| a.position().x.total_cmp(&b.position().x))
            .map(|enemy| enemy.position().y + enemy.kind().size().y / 2.0);

        let steer = match target {
            Some(y) if y < user_y - 8.0 => Command::MoveUp,
            Some(y) if y > user_y + 8.0 => Command::MoveDown,
            _ => Command::StopVertical,
        };
        vec![steer, Command::Fire]
    }

    fn log_event(event: &ViewEvent) {
        match event {
            ViewEvent::ActorAdded { id, kind } if *kind == ActorKind::Boss => {
                log::info!("Boss {} enters the field", id)
            }
            ViewEvent::ShieldChanged { id, shielded } => {
                log::info!("Boss {} shield {}", id, if *shielded { "raised" } else { "lowered" })
            }
            ViewEvent::ShowWin => log::info!("*** YOU WIN ***"),
            ViewEvent::ShowLose => log::info!("*** GAME OVER ***"),
            other => log::trace!("{:?}", other),
        }
    }

    fn log_hud(id: &str, hud: &Hud) {
        let progress = match hud.kill_target {
            Some(target) => format!("kills {}/{}", hud.kills, target),
            None => format!("kills {}", hud.kills),
        };
        match hud.boss_health {
            Some(ratio) => log::info!(
                "[{}] hearts {} | {} | boss {:.0}%",
                id,
                hud.hearts,
                progress,
                ratio * 100.0
            ),
            None => log::info!("[{}] hearts {} | {}", id, hud.hearts, progress),
        }
    }

    pub fn run() -> ExitCode {
        env_logger::init();
        log::info!("Sky Battle (native) starting...");

        let args = match Args::parse(std::env::args().skip(1)) {
            Ok(args) => args,
            Err(err) => {
                log::error!("{}", err);
                eprintln!("usage: sky-battle [config.json] [--fast] [--max-ticks N]");
                return ExitCode::from(2);
            }
        };

        let settings = match &args.config {
            Some(path) => match Settings::load(path) {
                Ok(settings) => settings,
                Err(err) => {
                    log::error!("{}", err);
                    return ExitCode::FAILURE;
                }
            },
            None => Settings::default(),
        };
        let period = Duration::from_millis(settings.tick_millis);

        let mut controller = Controller::new(settings, LevelRegistry::standard());
        if let Err(err) = controller.launch() {
            log::error!("{}", err);
            return ExitCode::FAILURE;
        }

        let mut total_ticks = 0u64;
        let mut last_hud: Option<(String, Hud)> = None;
        let mut last_time = Instant::now();

        loop {
            let elapsed = if args.fast {
                period
            } else {
                thread::sleep(period);
                let now = Instant::now();
                let elapsed = now - last_time;
                last_time = now;
                elapsed
            };

            let commands = controller.level().map(autopilot).unwrap_or_default();
            for command in commands {
                controller.handle_command(command);
            }
            total_ticks += u64::from(controller.update(elapsed));

            let Some(level) = controller.level_mut() else {
                break;
            };
            for event in level.drain_events() {
                log_event(&event);
            }
            let snapshot = (level.id().to_string(), *level.hud());
            if last_hud.as_ref() != Some(&snapshot) {
                log_hud(&snapshot.0, &snapshot.1);
                last_hud = Some(snapshot);
            }

            let phase = level.phase();
            if let Some(err) = controller.last_error() {
                log::error!("Cannot continue: {}", err);
                return ExitCode::FAILURE;
            }
            if matches!(phase, LevelPhase::Won | LevelPhase::Lost) {
                let options = controller
                    .level()
                    .map(|level| level.end_options())
                    .unwrap_or_default();
                log::info!("Finished after {} ticks; options: {:?}", total_ticks, options);
                return if phase == LevelPhase::Won {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(1)
                };
            }
            if args.max_ticks.is_some_and(|max| total_ticks >= max) {
                log::info!("Stopping after {} ticks", total_ticks);
                break;
            }
        }
        ExitCode::SUCCESS
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end; the library is the deliverable on wasm32
}
