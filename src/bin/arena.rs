//! Scripted demo game against the in-memory store.
//!
//! Creates a session, joins a handful of players, plays a full round of
//! inspect-then-underwrite turns, then prints the leaderboard and the
//! instructor reveal.
//!
//! Usage:
//!   arena [OPTIONS]
//!
//! Options:
//!   --difficulty <KEY>   easy, medium, or hard (default: medium)
//!   --players <N>        Number of scripted players (default: 3)
//!   --time-limit <MIN>   Wall-clock limit in minutes, 0 = untimed
//!
//! Example:
//!   RUST_LOG=actuary_arena=debug arena --difficulty hard --players 4

use chrono::Utc;
use clap::Parser;
use rand::rngs::OsRng;
use rand::Rng;
use tracing_subscriber::EnvFilter;

use actuary_arena::{
    buy_budget, create_session, end_session, execute_sell, execute_test, export_rows,
    join_session, leaderboard, player_devices, reveal, start_session, Difficulty, GameError,
    GameStore, MemoryStore, SessionConfig,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(name = "arena")]
#[command(version, about = "Run a scripted quality-inspection underwriting game")]
struct Cli {
    /// Difficulty preset: easy, medium, hard
    #[arg(short, long, default_value = "medium")]
    difficulty: String,

    /// Number of scripted players
    #[arg(short, long, default_value = "3")]
    players: usize,

    /// Wall-clock limit in minutes; 0 disables the timer
    #[arg(long, default_value = "0")]
    time_limit: u32,
}

const NAMES: &[&str] = &["Ada", "Blaise", "Carl", "Dina", "Emmy", "Fisher", "Gauss", "Hedy"];

/// Normal quantile for the two-sided confidence levels the game prices.
fn z_for(confidence: &str) -> f64 {
    match confidence {
        "0.90" => 1.645,
        "0.95" => 1.960,
        "0.99" => 2.576,
        _ => 2.0,
    }
}

// ============================================================================
// Scripted Play
// ============================================================================

fn run(cli: Cli) -> Result<(), GameError> {
    let difficulty: Difficulty = cli.difficulty.parse()?;
    let mut config = SessionConfig::for_difficulty(difficulty);
    config.time_limit_minutes = cli.time_limit;

    let mut store = MemoryStore::new();
    let mut rng = OsRng;

    let session = create_session(&mut store, &mut rng, difficulty, config, Utc::now())?;
    println!(
        "session {} ({difficulty}) join code {}",
        session.id, session.join_code
    );

    let count = cli.players.clamp(1, NAMES.len());
    let mut players = Vec::with_capacity(count);
    for &name in &NAMES[..count] {
        let outcome =
            join_session(&mut store, &mut rng, &session.join_code, name, None, Utc::now())?;
        players.push(outcome.player);
    }
    start_session(&mut store, session.id, Utc::now())?;

    let confidences = ["0.90", "0.95", "0.99"];
    for (pi, player) in players.iter().enumerate() {
        let config = store.session(session.id)?.config;
        let n = (config.min_n + config.max_n) / 2;

        for device_id in 0..session.device_count() {
            // Inspect, then underwrite from the observed rate.
            let test = match execute_test(
                &mut store,
                &mut rng,
                session.id,
                player.id,
                device_id,
                n,
                Utc::now(),
            ) {
                Ok(t) => t,
                Err(GameError::NoTurnsRemaining) | Err(GameError::InsufficientBudget { .. }) => {
                    break
                }
                Err(e) => return Err(e),
            };

            let p_hat = f64::from(test.x) / f64::from(test.n);
            let confidence = confidences[(pi + device_id) % confidences.len()];
            let half = z_for(confidence) * (p_hat * (1.0 - p_hat) / f64::from(test.n)).sqrt();
            let lower = (p_hat - half).max(0.0);
            let upper = (p_hat + half).min(1.0).max(lower + 0.01).min(1.0);
            if lower >= upper {
                continue;
            }

            match execute_sell(
                &mut store,
                session.id,
                player.id,
                device_id,
                confidence,
                lower,
                upper,
                Utc::now(),
            ) {
                Ok(sell) => println!(
                    "  {} batch {device_id}: [{lower:.3}, {upper:.3}] @ {confidence} -> {} ({:+})",
                    player.name,
                    if sell.hit { "HIT" } else { "MISS" },
                    sell.delta
                ),
                Err(GameError::NoTurnsRemaining) => break,
                Err(e) => return Err(e),
            }

            // Reinvest winnings in more samples now and then.
            if rng.gen_bool(0.25) {
                match buy_budget(&mut store, session.id, player.id, Utc::now()) {
                    Ok(p) => println!("  {} bought +{} budget for {}", player.name, p.amount, p.cost),
                    Err(GameError::InsufficientScore { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
        }
    }

    end_session(&mut store, session.id, Utc::now())?;

    // ========================================================================
    // Results
    // ========================================================================

    println!("\nleaderboard:");
    for entry in leaderboard(&store, session.id) {
        println!(
            "  #{} {:<8} {:>6} pts  ({} turns, {} samples)",
            entry.rank, entry.name, entry.score, entry.turns_used, entry.budget_used
        );
    }

    println!("\nreveal (batch: true rate, per-player estimates):");
    let true_ps = reveal(&store, session.id)?;
    for (device_id, p) in true_ps.iter().enumerate() {
        print!("  batch {device_id}: p = {p:.4}");
        for player in &players {
            let board = player_devices(&store, session.id, player.id)?;
            let view = &board[device_id];
            if view.tested {
                let p_hat = view.x_total as f64 / view.n_total as f64;
                print!("  {}={:.3}", player.name, p_hat);
            }
        }
        println!();
    }

    let rows = export_rows(&store, session.id)?;
    println!("\n{} events logged", rows.len());
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("game aborted: {e}");
        std::process::exit(1);
    }
}
