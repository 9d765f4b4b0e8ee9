use crate::cli::RunArgs;
use roomcalc_core::{AppConfig, RoomResult};
use roomcalc_domain::{RadixRoomFactory, Room, RoomSnapshot, StatsReport, UndoOutcome};
use roomcalc_cli::output;
use roomcalc_cli::RoomSession;
use roomcalc_pool::{PoolStats, ShutdownReport};
use serde::Serialize;
use std::sync::mpsc;

#[derive(Serialize)]
pub struct RunReport {
    pub rooms: RoomSnapshot,
    pub history_depth: usize,
    pub history: Vec<String>,
    pub undone: Vec<UndoOutcome>,
    pub stats: Vec<StatsReport>,
    pub pool: PoolStats,
    pub shutdown: ShutdownReport,
}

pub fn handle(mut config: AppConfig, args: RunArgs) -> anyhow::Result<()> {
    if args.workers.is_some() {
        config.workers = args.workers;
    }
    if args.queue_capacity.is_some() {
        config.queue_capacity = args.queue_capacity;
    }
    if args.grace_ms.is_some() {
        config.shutdown_grace_ms = args.grace_ms;
    }

    let factory = if args.binary {
        RadixRoomFactory::binary()
    } else {
        RadixRoomFactory::decimal()
    };
    let mut session = match RoomSession::new(&config) {
        Ok(session) => session.with_factory(factory),
        Err(e) => output::output_error(&e.to_string()),
    };
    let (stats_tx, stats_rx) = mpsc::channel();

    // The pool is shut down whether or not the work below succeeds.
    let outcome = drive(&mut session, &args, stats_tx);
    let shutdown = session.shutdown(config.effective_shutdown_grace());

    let undone = match outcome {
        Ok(undone) => undone,
        Err(e) => output::output_error(&e.to_string()),
    };

    let mut stats: Vec<StatsReport> = stats_rx.try_iter().collect();
    stats.sort_by_key(|report| {
        args.stats
            .iter()
            .position(|m| *m == report.metric)
            .unwrap_or(usize::MAX)
    });

    let report = RunReport {
        rooms: session.snapshot(),
        history_depth: session.history_depth(),
        history: session.history_descriptions(),
        undone,
        stats,
        pool: session.pool_stats(),
        shutdown,
    };
    output::output_success(&report)
}

fn drive(
    session: &mut RoomSession,
    args: &RunArgs,
    stats_tx: mpsc::Sender<StatsReport>,
) -> RoomResult<Vec<UndoOutcome>> {
    let rooms = args
        .rooms
        .chunks(3)
        .map(|dims| match dims {
            [l, w, h] => session.create_room_from_input(l, w, h),
            _ => Err(roomcalc_core::RoomError::Validation(
                "each room needs three dimensions".to_string(),
            )),
        })
        .collect::<RoomResult<Vec<Room>>>()?;

    if args.as_macro {
        if !rooms.is_empty() {
            session.add_rooms(rooms)?;
        }
    } else {
        for room in rooms {
            session.add_room(room)?;
        }
    }

    let undone = (0..args.undo)
        .map(|_| session.undo_last_command())
        .collect::<RoomResult<Vec<_>>>()?;

    for metric in &args.stats {
        session.submit_stats(*metric, Some(stats_tx.clone()))?;
    }

    Ok(undone)
}
