//! Subcommand implementations.

use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::info;

use vigil_core::{Move, Position};
use vigil_engine::search::mate_distance;
use vigil_engine::{EngineConfig, SearchLimits, ThreadPool};

/// Middlegame and endgame positions with tactics on both sides.
const BENCH_FENS: [&str; 8] = [
    vigil_core::STARTING_FEN,
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3",
    "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2",
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "8/8/8/2Kp4/3Pk3/8/8/8 w - - 0 1",
];

#[derive(Args, Debug)]
pub struct SearchArgs {
    #[arg(short, long, default_value = vigil_core::STARTING_FEN)]
    fen: String,
    /// Moves played from the FEN, in coordinate notation
    #[arg(short, long, num_args = 1..)]
    moves: Vec<String>,
    #[arg(short, long)]
    depth: Option<u8>,
    #[arg(short, long)]
    nodes: Option<u64>,
    /// Milliseconds for the whole search
    #[arg(short = 't', long)]
    movetime: Option<u64>,
    /// Overrides the configured thread count
    #[arg(long)]
    threads: Option<usize>,
}

fn parse_fen(fen: &str) -> Result<Position> {
    fen.parse().with_context(|| format!("invalid FEN `{fen}`"))
}

fn format_score(score: i32) -> String {
    match mate_distance(score) {
        Some(moves) => format!("mate {moves}"),
        None => format!("cp {score}"),
    }
}

fn format_line(moves: &[Move]) -> String {
    moves.iter().map(|mv| mv.to_uci()).collect::<Vec<_>>().join(" ")
}

pub fn perft(fen: &str, depth: u32, divide: bool) -> Result<()> {
    let pos = parse_fen(fen)?;
    let start = Instant::now();
    let nodes = if divide {
        let split = vigil_core::divide(&pos, depth);
        for (mv, count) in &split {
            println!("{mv}: {count}");
        }
        split.iter().map(|(_, count)| count).sum()
    } else {
        vigil_core::perft(&pos, depth)
    };
    let elapsed = start.elapsed();
    println!("nodes {nodes}");
    info!(depth, nodes, elapsed_ms = elapsed.as_millis() as u64, "perft complete");
    Ok(())
}

pub fn search(config: EngineConfig, args: &SearchArgs) -> Result<()> {
    let mut pos = parse_fen(&args.fen)?;
    let mut history = Vec::with_capacity(args.moves.len());
    for uci in &args.moves {
        let Some(mv) = pos.parse_move(uci) else {
            bail!("illegal move `{uci}` in position {pos}");
        };
        let Some(next) = pos.apply(mv) else {
            bail!("illegal move `{uci}` in position {pos}");
        };
        history.push(pos.hash());
        pos = next;
    }

    let mut pool = ThreadPool::new(config).context("invalid engine configuration")?;
    if let Some(threads) = args.threads {
        pool.set_threads(threads);
    }
    let limits = SearchLimits {
        depth: args.depth,
        nodes: args.nodes,
        movetime: args.movetime.map(Duration::from_millis),
        ..SearchLimits::default()
    };
    if limits == SearchLimits::default() {
        bail!("search needs at least one of --depth, --nodes or --movetime");
    }

    let start = Instant::now();
    let result = pool.search(&pos, &limits, &history, |depth, score, nodes, pv| {
        let ms = start.elapsed().as_millis().max(1) as u64;
        println!(
            "depth {depth} score {} nodes {nodes} nps {} time {ms} pv {}",
            format_score(score),
            nodes * 1000 / ms,
            format_line(pv)
        );
    });
    if result.best_move.is_null() {
        println!("bestmove (none)");
    } else {
        match result.ponder_move {
            Some(ponder) => println!("bestmove {} ponder {ponder}", result.best_move),
            None => println!("bestmove {}", result.best_move),
        }
    }
    Ok(())
}

pub fn bench(config: EngineConfig, depth: u8) -> Result<()> {
    let mut pool = ThreadPool::new(config).context("invalid engine configuration")?;
    let limits = SearchLimits::depth(depth);
    let start = Instant::now();
    let mut total = 0u64;
    for fen in BENCH_FENS {
        let pos = parse_fen(fen)?;
        pool.clear();
        let result = pool.search(&pos, &limits, &[], |_, _, _, _| {});
        let score = format_score(result.score);
        println!("{fen}: {} {score} nodes {}", result.best_move, result.nodes);
        total += result.nodes;
    }
    let ms = start.elapsed().as_millis().max(1) as u64;
    let nps = total * 1000 / ms;
    println!("{total} nodes {nps} nps");
    info!(depth, nodes = total, nps, elapsed_ms = ms, "bench complete");
    Ok(())
}
