//! Edgegrid demo binary
//!
//! Starts several peers on one in-process hub, joins them to a room, lets
//! each register a display name and paint random cells, then checks that
//! every replica ended up with the same grid.
//!
//! Usage: `edgegrid [peers] [strokes] [room] [seed]`

mod render;

use edgegrid_core::Topic;
use edgegrid_edge::{EdgeConfig, EdgeHub, EdgeNode, RoomHooks};
use edgegrid_grid::{Color, GridAction, GridReducer, GridState, GRID_SIZE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const NAMES: [&str; 8] = ["Ada", "Bea", "Cyd", "Dee", "Eli", "Fay", "Gus", "Hal"];

const PALETTE: [&str; 8] = [
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#000",
];

/// How long replicas get to apply the final frame.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

fn display_name(index: usize) -> String {
    let base = NAMES[index % NAMES.len()];
    match index / NAMES.len() {
        0 => base.to_string(),
        round => format!("{base}{round}"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edgegrid=info,edgegrid_edge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line args
    let args: Vec<String> = env::args().collect();

    let peer_count: usize = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3)
        .max(1);

    let strokes: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(40);

    let topic = Topic::new(args.get(3).map(String::as_str).unwrap_or("lobby"))?;

    let seed: u64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(7);

    let config = EdgeConfig::from_env()?;
    let hub = EdgeHub::from_config(&config);

    // A configured peer id belongs to the first node only
    let nodes: Vec<EdgeNode> = (0..peer_count)
        .map(|i| {
            let node_config = if i == 0 {
                config.clone()
            } else {
                EdgeConfig {
                    peer_id: None,
                    ..config.clone()
                }
            };
            EdgeNode::start(hub.clone(), &node_config)
        })
        .collect();

    let mut rooms = Vec::with_capacity(nodes.len());
    for node in &nodes {
        let peer = node.peer_id().short().to_string();
        let hooks = RoomHooks::<GridReducer>::new().on_reset(move |state: &GridState| {
            debug!(peer = %peer, painted = state.painted_count(), "Replica reset");
        });
        rooms.push(node.join(topic.as_str(), GridReducer, hooks).await?);
    }

    for (i, room) in rooms.iter().enumerate() {
        room.dispatch(GridAction::set_name(display_name(i))).await?;
    }

    // One cell of margin on each side so some strokes miss the grid
    let edge = GRID_SIZE as i64;
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..strokes {
        let room = &rooms[rng.gen_range(0..rooms.len())];
        let x = rng.gen_range(-1..=edge);
        let y = rng.gen_range(-1..=edge);
        let color = Color::parse(PALETTE[rng.gen_range(0..PALETTE.len())])?;
        room.dispatch(GridAction::paint(x, y, color)).await?;
    }

    let last = hub.head(&topic).await;
    let mut states = Vec::with_capacity(rooms.len());
    for room in &rooms {
        states.push(tokio::time::timeout(SETTLE_TIMEOUT, room.wait_for_seq(last)).await??);
    }

    let converged = states.windows(2).all(|pair| pair[0] == pair[1]);
    info!(
        topic = %topic,
        peers = rooms.len(),
        frames = last,
        converged,
        "Demo finished"
    );

    let Some(state) = states.first() else {
        return Ok(());
    };

    println!("Room ID: {}", topic);
    println!();
    print!("{}", render::grid(state));
    println!();
    print!("{}", render::legend(state));
    println!();
    for node in &nodes {
        println!("Peer ID: {}  Status: {}", node.peer_id(), node.status());
    }

    for node in &nodes {
        node.stop();
    }

    if !converged {
        return Err("replicas diverged".into());
    }
    Ok(())
}
