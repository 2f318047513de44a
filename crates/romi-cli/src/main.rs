//! `romi` – runs the robot's autonomous routine against the simulated chassis.
//!
//! 1. Installs the `tracing` pipeline (see `romi_runtime::telemetry`).
//! 2. Loads `~/.romi/config.toml` (or `$ROMI_CONFIG`), falling back to
//!    defaults.  `romi --init` writes the defaults to that path and exits.
//! 3. Builds the drivetrain, on-board IO and vision subsystems once.
//! 4. Steps the scheduler at a fixed period until the routine completes.
//! 5. On **Ctrl-C** cancels the active goal, which zeroes both motors.
//!
//! LEDs: yellow while a goal runs, green when the routine finished, red when
//! it was cancelled or a goal ran out of cycles.

mod config;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use colored::Colorize;
use romi_hal::sim::SimRobot;
use romi_perception::{PipelineResult, TrackedTarget};
use romi_runtime::{GoalEvent, Scheduler};
use romi_subsystems::{DriveBase, OnBoardIo, Vision};
use tracing::{info, warn};

fn main() {
    let guard = romi_runtime::init_tracing("romi");
    if guard.is_exporting() {
        info!("exporting spans over OTLP");
    }

    if std::env::args().skip(1).any(|a| a == "--init") {
        init_config();
        return;
    }

    print_banner();

    // ── Shutdown flag ─────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler; motors will not be stopped on interrupt");
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let loaded = config::load();
    match &loaded {
        Ok(Some(_)) => println!(
            "  Config loaded from {}",
            config::config_path().display().to_string().bold()
        ),
        Ok(None) => println!("  No config file found; using defaults."),
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
        }
    }
    let cfg = config::or_defaults(loaded);

    run(&cfg, &shutdown);
}

// ─────────────────────────────────────────────────────────────────────────────
// Control loop
// ─────────────────────────────────────────────────────────────────────────────

fn run(cfg: &config::Config, shutdown: &AtomicBool) {
    let hw = SimRobot::new()
        .with_geometry(
            cfg.drive.wheel_diameter_inch,
            cfg.drive.counts_per_revolution,
            cfg.drive.track_width_inch,
        )
        .with_camera(cfg.vision.camera_name.clone())
        .build();
    let mut plant = hw.plant;

    // The simulated co-processor sees one fixed target for the whole run.
    hw.handles.camera.publish(PipelineResult::with_target(TrackedTarget {
        yaw: 4.0,
        pitch: 6.0,
        area: 2.5,
        pose_ambiguity: 0.08,
        ..Default::default()
    }));

    let mut drive = DriveBase::new(hw.drive, cfg.drive.clone());
    let mut io = OnBoardIo::new(hw.io);
    let mut vision = Vision::new(hw.camera, cfg.vision.clone());

    let mut scheduler = Scheduler::new();
    for step in &cfg.autonomous {
        scheduler.enqueue_with_budget(Box::new(step.to_goal()), cfg.goal_budget());
    }
    println!(
        "  Running {} autonomous step(s) at {} ms per cycle.\n",
        cfg.autonomous.len(),
        cfg.cycle_period_ms
    );
    for (i, step) in cfg.autonomous.iter().enumerate() {
        println!("    {}. {}", i + 1, step);
    }
    println!();

    let period = Duration::from_millis(cfg.cycle_period_ms);
    let mut next = Instant::now();
    let mut cycles: u64 = 0;
    let mut faulted = false;

    io.set_yellow_led(true);
    while !scheduler.is_idle() {
        if shutdown.load(Ordering::SeqCst) {
            println!();
            println!("{}", "⚠  Ctrl-C received – stopping drivetrain …".yellow().bold());
            for event in scheduler.cancel(&mut drive) {
                report(&event);
            }
            faulted = true;
            break;
        }

        for event in scheduler.run_cycle(&mut drive, &mut vision) {
            if matches!(event, GoalEvent::TimedOut(_)) {
                faulted = true;
            }
            report(&event);
        }
        plant.step();
        cycles += 1;

        next += period;
        if let Some(wait) = next.checked_duration_since(Instant::now()) {
            std::thread::sleep(wait);
        } else {
            // Overran; restart the schedule from now instead of bursting.
            next = Instant::now();
        }
    }
    drive.stop();

    io.set_yellow_led(false);
    io.set_green_led(!faulted);
    io.set_red_led(faulted);

    let telemetry = drive.telemetry();
    match serde_json::to_string(&telemetry) {
        Ok(json) => info!(cycles, telemetry = %json, "routine complete"),
        Err(e) => warn!(error = %e, "failed to serialize telemetry"),
    }

    println!();
    println!(
        "  Travelled L {:.2} in / R {:.2} in, heading {:.1}°",
        telemetry.left_distance_inch, telemetry.right_distance_inch, telemetry.gyro_angle_z_deg
    );
    if vision.has_target() {
        let class = vision.best_target_class();
        println!(
            "  Target: yaw {:.1}°, {:.2} m away (pitch estimate), pose {:.2} m, {}",
            vision.best_yaw(),
            vision.distance_from_target(),
            vision.camera_to_best_target().distance(),
            if vision.is_best_target_usable() {
                class.to_string().green()
            } else {
                class.to_string().yellow()
            }
        );
    } else {
        println!("  {}", "No vision target.".dimmed());
    }
    if faulted {
        println!("  {}", "✗ Routine did not complete.".red().bold());
    } else {
        println!("  {}", "✓ Routine complete.".green().bold());
    }
}

fn report(event: &GoalEvent) {
    match event {
        GoalEvent::Started(name) => println!("  {} {}", "▶".cyan(), name.bold()),
        GoalEvent::Finished(name) => println!("  {} {}", "✓".green(), name),
        GoalEvent::Interrupted(name) => println!("  {} {} interrupted", "■".yellow(), name),
        GoalEvent::TimedOut(name) => println!("  {} {} ran out of cycles", "✗".red(), name),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn init_config() {
    let path = config::config_path();
    if path.exists() {
        println!("  {} already exists; not overwriting.", path.display());
        return;
    }
    match config::save(&config::Config::default()) {
        Ok(()) => println!(
            "  {} Config written to {}",
            "✓".green().bold(),
            path.display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
}

fn print_banner() {
    println!();
    println!(
        "  {} {}",
        "romi".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Differential-drive robot controller");
    println!();
}
