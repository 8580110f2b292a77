use knight_moves::constants::{QUEEN_SQUARE, STARTING_POSITION, TICK_INTERVAL_MS};
use knight_moves::puzzle::is_cheating;
use knight_moves::{KnightRules, PuzzleLayout, PuzzleSession, Square, SystemClock, TimerTicker};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

fn print_help() {
    println!("Knight Moves - visit every square the queen does not cover\n");
    println!("Usage: knight_moves [options]\n");
    println!("Options:");
    println!("  --fen <FEN>       Starting position (default: {})", STARTING_POSITION);
    println!("  --queen <SQUARE>  Square of the enemy queen (default: {})", QUEEN_SQUARE);
    println!("  --version         Show version information");
    println!("  --help            Show this help message\n");
    println!("Commands once running:");
    println!("  <square>  Move the knight, e.g. g6");
    println!("  moves     List the knight's legal jumps");
    println!("  time      Show the running clock");
    println!("  state     Print the puzzle snapshot as JSON");
    println!("  reset     Start over");
    println!("  quit      Leave");
}

fn print_status(session: &PuzzleSession) {
    let view = session.view();
    let next = match view.next_target {
        Some(square) => square.to_string(),
        None => "solved".to_string(),
    };
    println!(
        "next: {:<6} progress: {:>3.0}%  time: {}",
        next,
        view.progress * 100.0,
        if view.elapsed.is_empty() { "-" } else { view.elapsed.as_str() }
    );
}

fn print_moves(session: &PuzzleSession) {
    let labels: Vec<String> = session
        .legal_destinations()
        .into_iter()
        .map(|sq| {
            if is_cheating(session.layout(), sq) {
                format!("{}(x)", sq)
            } else {
                sq.to_string()
            }
        })
        .collect();
    println!("jumps: {}", labels.join(" "));
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mut fen = STARTING_POSITION.to_string();
    let mut queen = QUEEN_SQUARE.to_string();

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--version" | "-v" => {
                println!("knight_moves {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--fen" | "--queen" => match rest.next() {
                Some(value) if arg == "--fen" => fen = value.clone(),
                Some(value) => queen = value.clone(),
                None => {
                    eprintln!("Missing value for {}", arg);
                    std::process::exit(1);
                }
            },
            other => {
                eprintln!("Unknown option: {}", other);
                eprintln!("Run 'knight_moves --help' for usage.");
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let layout = match PuzzleLayout::from_config(&fen, &queen) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut session = PuzzleSession::new(layout, KnightRules, SystemClock);
    let ticker = TimerTicker::spawn(
        session.subscribe(),
        SystemClock,
        Duration::from_millis(TICK_INTERVAL_MS),
    );

    println!("Move the knight to every square, right to left, top to bottom.");
    println!("Don't land anywhere the queen can take you, and don't take the queen.");
    print_status(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                print_help();
                continue;
            }
            "moves" => {
                print_moves(&session);
                continue;
            }
            "time" => {
                println!("{}", ticker.display());
                continue;
            }
            "state" => {
                match serde_json::to_string_pretty(&session.view()) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("Failed to encode state: {}", e),
                }
                continue;
            }
            "reset" => {
                session.reset();
            }
            label => match label.parse::<Square>() {
                Ok(square) => {
                    let before = session.state().clone();
                    if *session.attempt_move(square) == before {
                        println!("{}: not allowed", square);
                    }
                }
                Err(e) => {
                    eprintln!("{}", e);
                    continue;
                }
            },
        }
        print_status(&session);
    }

    Ok(())
}
