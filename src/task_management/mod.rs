//! # Generation Worker Pool
//!
//! Chunk generation is embarrassingly parallel: each chunk mutates only its
//! own occupancy store, fill-state trees and mesh buffers, so the world
//! manager hands one task per chunk to a fixed pool of worker threads and
//! barrier-joins before any mesh is handed to the rendering stage.
//!
//! Each worker owns a dedicated task channel and result channel; tasks are
//! distributed round-robin. There is no cancellation (generation always
//! runs to completion) and no per-frame polling: `join` drains every
//! in-flight result, which is the finalize-then-render barrier the
//! concurrency model requires.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cgmath::Point2;
use log::{error, info};

use crate::error::TerrainError;
use crate::voxels::chunk::generation::Heightfield;
use crate::voxels::chunk::Chunk;

/// One unit of work: generate and mesh the chunk at a grid coordinate.
pub struct GenerationTask {
    /// Grid coordinate of the chunk to generate.
    pub coord: Point2<i32>,
    /// The terrain height sampler, shared across workers.
    pub heightfield: Arc<dyn Heightfield>,
    /// The world seed mixed into per-chunk randomness.
    pub world_seed: u64,
}

/// The result of one generation task.
///
/// A failed chunk carries its error so the world manager can log and skip
/// it without affecting siblings.
pub struct GenerationOutcome {
    /// Grid coordinate the task was for.
    pub coord: Point2<i32>,
    /// The generated, fully meshed chunk, or the error that aborted it.
    pub result: Result<Chunk, TerrainError>,
}

/// A communication channel between the pool and one worker thread.
struct WorkerChannel {
    task_sender: Sender<GenerationTask>,
    result_receiver: Receiver<GenerationOutcome>,
    tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// A fixed pool of chunk-generation workers.
pub struct GenerationPool {
    channels: Vec<WorkerChannel>,
    current_channel: usize,
}

impl GenerationPool {
    /// Creates a pool with the given number of worker threads (at least
    /// one).
    pub fn new(num_workers: usize) -> Self {
        let num_workers = num_workers.max(1);
        info!("starting generation pool with {} workers", num_workers);

        let mut channels = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<GenerationTask>();
            let (result_tx, result_rx) = channel::<GenerationOutcome>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let mut chunk =
                        Chunk::generate(task.coord, task.heightfield.as_ref(), task.world_seed);
                    // Meshing happens inside the worker so a joined chunk's
                    // buffers are complete before anything renders them.
                    let result = match chunk.rebuild_mesh() {
                        Ok(()) => Ok(chunk),
                        Err(e) => Err(e),
                    };
                    let outcome = GenerationOutcome {
                        coord: task.coord,
                        result,
                    };
                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                }
            });

            channels.push(WorkerChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                tasks_in_flight: 0,
                _worker: worker,
            });
        }

        GenerationPool {
            channels,
            current_channel: 0,
        }
    }

    /// Number of worker threads in the pool.
    pub fn num_workers(&self) -> usize {
        self.channels.len()
    }

    /// Sends a task to the next worker, round-robin.
    pub fn dispatch(&mut self, task: GenerationTask) {
        let index = self.current_channel;
        self.current_channel = (self.current_channel + 1) % self.channels.len();

        let coord = task.coord;
        match self.channels[index].task_sender.send(task) {
            Ok(()) => self.channels[index].tasks_in_flight += 1,
            Err(_) => error!(
                "generation worker {} disconnected; chunk ({}, {}) dropped",
                index, coord.x, coord.y
            ),
        }
    }

    /// Blocks until every dispatched task has completed, returning all
    /// outcomes.
    ///
    /// This is the barrier between generation and rendering: once `join`
    /// returns, no worker holds a chunk whose buffers could still change.
    pub fn join(&mut self) -> Vec<GenerationOutcome> {
        let mut outcomes = Vec::new();
        for (index, channel) in self.channels.iter_mut().enumerate() {
            while channel.tasks_in_flight > 0 {
                match channel.result_receiver.recv() {
                    Ok(outcome) => {
                        channel.tasks_in_flight -= 1;
                        outcomes.push(outcome);
                    }
                    Err(_) => {
                        error!("generation worker {} died with tasks in flight", index);
                        channel.tasks_in_flight = 0;
                    }
                }
            }
        }
        outcomes
    }
}
