//! geocache-runner: headless driver for the geocache game core.
//!
//! Usage:
//!   geocache-runner --seed 12345 --steps 40
//!   geocache-runner --seed 12345 --config data/game_config.json --ipc-mode
//!
//! In IPC mode each stdin line is one JSON command, e.g.
//!   {"type":"move","direction":"north"}
//!   {"type":"collect","i":2,"j":-3}
//!   {"type":"restore","state":"..."}
//! and each reply is one JSON line.

use anyhow::Result;
use geocache_core::{
    CacheView, Cell, Direction, GameConfig, GameController, GameEvent, HashedLuck, LatLng,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Move { direction: Direction },
    Reset,
    Collect { i: i32, j: i32 },
    Deposit { i: i32, j: i32 },
    Save,
    Restore { state: String },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    position:  LatLng,
    cell:      Cell,
    coins:     usize,
    inventory: String,
    caches:    Vec<CacheView>,
    events:    Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved:     Option<String>,
}

/// Headless walk: four steps per leg, turning clockwise.
const ROUTE: [Direction; 4] = [Direction::North, Direction::East, Direction::South, Direction::West];

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let steps = parse_arg(&args, "--steps", 32u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config = match args.windows(2).find(|w| w[0] == "--config") {
        Some(w) => GameConfig::load(&w[1])?,
        None => GameConfig::default(),
    };

    if !ipc_mode {
        println!("geocache-runner");
        println!("  seed:      {seed}");
        println!("  steps:     {steps}");
        println!("  origin:    {:.6}, {:.6}", config.origin.lat, config.origin.lng);
        println!("  regrowth:  {}", config.allow_cache_regrowth);
        println!();
    }

    let mut game = GameController::build(config, Box::new(HashedLuck::new(seed)))?;

    if ipc_mode {
        run_ipc_loop(&mut game)?;
    } else {
        run_walk(&mut game, steps)?;
        print_summary(&game)?;
    }

    Ok(())
}

fn run_ipc_loop(game: &mut GameController) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        let mut saved = None;
        let outcome = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => Ok(Vec::new()),
            IpcCommand::Move { direction } => game.move_player(direction),
            IpcCommand::Reset => game.reset(),
            IpcCommand::Collect { i, j } => Ok(game.collect(Cell::new(i, j))),
            IpcCommand::Deposit { i, j } => Ok(game.deposit(Cell::new(i, j))),
            IpcCommand::Save => game.save().map(|state| {
                saved = Some(state);
                Vec::new()
            }),
            IpcCommand::Restore { state } => game.restore(&state),
        };

        match outcome {
            Ok(events) => {
                let state = build_ui_state(game, events, saved);
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            Err(e) => write_error(&mut stdout, &e.to_string())?,
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{}", err_json)?;
    stdout.flush()?;
    Ok(())
}

fn build_ui_state(game: &GameController, events: Vec<GameEvent>, saved: Option<String>) -> UiState {
    UiState {
        position:  game.position(),
        cell:      game.player_cell(),
        coins:     game.coin_count(),
        inventory: game.inventory().summary(),
        caches:    game.visible_cells().map(|cell| game.cache_view(cell)).collect(),
        events,
        saved,
    }
}

/// Walk the route, emptying every cache in sight after each step.
fn run_walk(game: &mut GameController, steps: u64) -> Result<()> {
    for step in 0..steps {
        let direction = ROUTE[((step / 4) % 4) as usize];
        game.move_player(direction)?;

        let cells: Vec<Cell> = game.visible_cells().collect();
        for cell in cells {
            while !game.collect(cell).is_empty() {}
        }
        log::debug!("step {step}: holding {} coins", game.coin_count());
    }
    Ok(())
}

fn print_summary(game: &GameController) -> Result<()> {
    let registry = game.registry();
    let depleted = registry.iter().filter(|r| r.is_empty()).count();

    println!("=== WALK SUMMARY ===");
    println!("  final cell:     {}", game.player_cell());
    println!("  caches seen:    {}", registry.len());
    println!("  depleted:       {depleted}");
    println!("  coins in world: {}", registry.total_coins());
    println!("  {}", game.inventory().summary());

    let recent: Vec<_> = game.inventory().iter().rev().take(5).collect();
    if !recent.is_empty() {
        let ids: Vec<String> = recent.iter().map(|c| c.id()).collect();
        println!("  latest coins:   {}", ids.join(", "));
    }

    println!();
    println!("=== CACHES IN VIEW ===");
    for cell in game.visible_cells() {
        println!("  {}", game.cache_view(cell).describe());
    }

    println!();
    println!("=== SAVED STATE ===");
    println!("{}", game.save()?);
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
