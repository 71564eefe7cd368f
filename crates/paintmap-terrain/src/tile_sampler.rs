//! Background sampling of rectangular column tiles on a worker pool.
//!
//! Each tile is sampled against a single [`WorldMaps`] snapshot taken when a
//! worker picks it up, so a reload mid-run never mixes two map sets inside one
//! tile. Tiles can be cancelled while queued; completed tiles come back over a
//! bounded channel.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::world_maps::{ColumnSample, MapStore, WorldMaps};

/// Tile index in a tiling of the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Tile column.
    pub x: i32,
    /// Tile row.
    pub z: i32,
}

/// A square block of columns to sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRequest {
    /// Identifies the tile in results and for cancellation.
    pub coord: TileCoord,
    /// World X of the first sample.
    pub origin_x: i32,
    /// World Z of the first sample.
    pub origin_z: i32,
    /// Samples per side.
    pub size: u32,
    /// World blocks between neighbouring samples.
    pub step: i32,
}

impl TileRequest {
    /// Tile `coord` of a grid of `size`-sample tiles spaced `step` blocks
    /// apart, with tile `(0, 0)` starting at `(origin_x, origin_z)`.
    pub fn in_grid(coord: TileCoord, origin_x: i32, origin_z: i32, size: u32, step: i32) -> Self {
        let span = size as i32 * step;
        Self {
            coord,
            origin_x: origin_x + coord.x * span,
            origin_z: origin_z + coord.z * span,
            size,
            step,
        }
    }

    /// World position of sample `(i, j)`.
    pub fn world_of(&self, i: u32, j: u32) -> (i32, i32) {
        (
            self.origin_x + i as i32 * self.step,
            self.origin_z + j as i32 * self.step,
        )
    }
}

/// A completed tile.
#[derive(Clone, Debug)]
pub struct SampledTile {
    /// The request this answers.
    pub request: TileRequest,
    /// `size * size` samples in row-major order (Z rows of X samples).
    pub columns: Vec<ColumnSample>,
    /// Sampling time in microseconds.
    pub sample_time_us: u64,
}

impl SampledTile {
    /// Sample `(i, j)` of the tile.
    pub fn get(&self, i: u32, j: u32) -> Option<ColumnSample> {
        if i >= self.request.size || j >= self.request.size {
            return None;
        }
        self.columns
            .get((j * self.request.size + i) as usize)
            .copied()
    }
}

/// Why [`TileSampler::submit`] handed a request back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The work queue is full; retry after draining some results.
    #[error("tile queue is full")]
    QueueFull(TileRequest),
    /// A tile with the same coord is queued, running, or not yet drained.
    #[error("tile ({}, {}) is already pending", .0.coord.x, .0.coord.z)]
    AlreadyPending(TileRequest),
}

impl SubmitError {
    /// The rejected request.
    pub fn into_request(self) -> TileRequest {
        match self {
            Self::QueueFull(request) | Self::AlreadyPending(request) => request,
        }
    }
}

struct QueuedTile {
    request: TileRequest,
    cancelled: Arc<AtomicBool>,
}

/// Samples tiles across a thread pool.
pub struct TileSampler {
    task_sender: Sender<QueuedTile>,
    result_receiver: Receiver<SampledTile>,
    active_tasks: Arc<DashMap<TileCoord, Arc<AtomicBool>>>,
    in_flight: Arc<AtomicU64>,
}

impl TileSampler {
    /// Spawn `thread_count` workers reading from `store`.
    ///
    /// At most `max_concurrent * 2` tiles queue before [`submit`](Self::submit)
    /// starts rejecting; `result_capacity` bounds finished tiles waiting to be drained.
    ///
    /// # Errors
    ///
    /// Fails if a worker thread cannot be spawned.
    pub fn new(
        store: Arc<MapStore>,
        thread_count: usize,
        max_concurrent: usize,
        result_capacity: usize,
    ) -> io::Result<Self> {
        let (task_sender, task_receiver) = bounded::<QueuedTile>(max_concurrent * 2);
        let (result_sender, result_receiver) = bounded::<SampledTile>(result_capacity);
        let in_flight = Arc::new(AtomicU64::new(0));

        for i in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let store = Arc::clone(&store);

            std::thread::Builder::new()
                .name(format!("tile-sampler-{i}"))
                .spawn(move || {
                    while let Ok(queued) = receiver.recv() {
                        if queued.cancelled.load(Ordering::Relaxed) {
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let maps = store.snapshot();
                        let start = Instant::now();
                        let columns = sample_tile_sync(&maps, &queued.request);
                        let elapsed = start.elapsed().as_micros() as u64;

                        if !queued.cancelled.load(Ordering::Relaxed) {
                            let _ = sender.send(SampledTile {
                                request: queued.request,
                                columns,
                                sample_time_us: elapsed,
                            });
                        }

                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })?;
        }

        tracing::debug!(threads = thread_count.max(1), "tile sampler started");

        Ok(Self {
            task_sender,
            result_receiver,
            active_tasks: Arc::new(DashMap::new()),
            in_flight,
        })
    }

    /// Sampler with a thread count based on CPU cores.
    pub fn with_defaults(store: Arc<MapStore>) -> io::Result<Self> {
        let threads = num_cpus::get().saturating_sub(1).max(1);
        Self::new(store, threads, 64, 128)
    }

    /// Queue a tile.
    ///
    /// A coord stays pending until its result is drained or it is cancelled;
    /// submitting it again before then is rejected rather than replacing the
    /// pending tile's cancellation handle.
    pub fn submit(&self, request: TileRequest) -> Result<(), SubmitError> {
        let cancelled = Arc::new(AtomicBool::new(false));
        match self.active_tasks.entry(request.coord) {
            Entry::Occupied(_) => return Err(SubmitError::AlreadyPending(request)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&cancelled));
            }
        }
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        self.task_sender
            .try_send(QueuedTile { request, cancelled })
            .map_err(|e| {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                let request = e.into_inner().request;
                self.active_tasks.remove(&request.coord);
                SubmitError::QueueFull(request)
            })
    }

    /// Cancel a queued or running tile. No-op once it has completed.
    pub fn cancel(&self, coord: &TileCoord) {
        if let Some((_, cancelled)) = self.active_tasks.remove(coord) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Take every finished tile without blocking.
    pub fn drain_results(&self) -> Vec<SampledTile> {
        let mut results = Vec::new();
        while let Ok(tile) = self.result_receiver.try_recv() {
            self.active_tasks.remove(&tile.request.coord);
            results.push(tile);
        }
        results
    }

    /// Block for the next finished tile, up to `timeout`.
    pub fn wait_result(&self, timeout: Duration) -> Option<SampledTile> {
        let tile = self.result_receiver.recv_timeout(timeout).ok()?;
        self.active_tasks.remove(&tile.request.coord);
        Some(tile)
    }

    /// Number of tiles queued or being sampled.
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if the tile is queued, running, or finished but not yet drained.
    pub fn is_pending(&self, coord: &TileCoord) -> bool {
        self.active_tasks.contains_key(coord)
    }
}

/// Sample one tile on the calling thread.
pub fn sample_tile_sync(maps: &WorldMaps, request: &TileRequest) -> Vec<ColumnSample> {
    let mut columns = Vec::with_capacity((request.size * request.size) as usize);
    for j in 0..request.size {
        for i in 0..request.size {
            let (x, z) = request.world_of(i, j);
            columns.push(maps.sample_column(x, z));
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{WESTEROS_MANIFEST, png_bytes, solid_image};

    fn store() -> Arc<MapStore> {
        let height = image::RgbImage::from_fn(32, 32, |x, _| {
            if x < 16 {
                image::Rgb([0x08, 0x08, 0x30])
            } else {
                image::Rgb([200, 255, 0])
            }
        });
        let maps = WorldMaps::from_bytes(
            &png_bytes(&height),
            &png_bytes(&solid_image(32, 32, [0x94, 0x90, 0x38])),
            WESTEROS_MANIFEST,
        )
        .unwrap();
        Arc::new(MapStore::new(maps))
    }

    fn request(x: i32, z: i32) -> TileRequest {
        TileRequest::in_grid(TileCoord { x, z }, -256, -256, 8, 16)
    }

    #[test]
    fn test_in_grid_tiles_abut() {
        let a = request(0, 0);
        let b = request(1, 0);
        let (last_x, _) = a.world_of(a.size - 1, 0);
        assert_eq!(b.origin_x, last_x + a.step);
        assert_eq!(request(0, 2).origin_z, -256 + 2 * 8 * 16);
    }

    #[test]
    fn test_sync_tile_matches_direct_queries() {
        let store = store();
        let maps = store.snapshot();
        let req = request(1, 1);
        let columns = sample_tile_sync(&maps, &req);
        assert_eq!(columns.len(), 64);
        for j in 0..8 {
            for i in 0..8 {
                let (x, z) = req.world_of(i, j);
                assert_eq!(columns[(j * 8 + i) as usize], maps.sample_column(x, z));
            }
        }
    }

    #[test]
    fn test_concurrent_sampling_returns_every_tile() {
        let store = store();
        let sampler = TileSampler::new(Arc::clone(&store), 4, 32, 64).unwrap();

        let mut submitted = 0;
        for x in 0..4 {
            for z in 0..4 {
                if sampler.submit(request(x, z)).is_ok() {
                    submitted += 1;
                }
            }
        }

        let maps = store.snapshot();
        let mut received = 0;
        let deadline = Instant::now() + Duration::from_secs(30);
        while received < submitted && Instant::now() < deadline {
            if let Some(tile) = sampler.wait_result(Duration::from_millis(50)) {
                assert_eq!(tile.columns, sample_tile_sync(&maps, &tile.request));
                assert!(!sampler.is_pending(&tile.request.coord));
                received += 1;
            }
        }

        assert_eq!(
            received, submitted,
            "Should receive all submitted tiles: got {received}/{submitted}"
        );
    }

    #[test]
    fn test_full_queue_rejects_submission() {
        let store = store();
        // One queue slot and a single worker busy with large tiles.
        let sampler = TileSampler::new(store, 1, 1, 64).unwrap();
        let big = |x| TileRequest::in_grid(TileCoord { x, z: 0 }, 0, 0, 128, 1);
        let rejected = (0..16)
            .filter_map(|x| sampler.submit(big(x)).err())
            .inspect(|err| assert!(matches!(err, SubmitError::QueueFull(_))))
            .count();
        assert!(rejected > 0, "a two-slot queue cannot take sixteen tiles at once");
        assert!(sampler.in_flight_count() <= 16 - rejected as u64);
    }

    #[test]
    fn test_cancelled_tile_is_not_pending() {
        let sampler = TileSampler::new(store(), 1, 8, 8).unwrap();
        let req = request(3, 3);
        sampler.submit(req).unwrap();
        assert!(sampler.is_pending(&req.coord));
        sampler.cancel(&req.coord);
        assert!(!sampler.is_pending(&req.coord));
    }

    #[test]
    fn test_resubmitting_a_pending_tile_keeps_the_first() {
        let sampler = TileSampler::new(store(), 1, 8, 8).unwrap();
        let req = request(2, 1);
        sampler.submit(req).unwrap();

        let err = sampler.submit(req).unwrap_err();
        assert_eq!(err, SubmitError::AlreadyPending(req));
        assert_eq!(err.into_request(), req);
        assert!(sampler.is_pending(&req.coord));

        // Cancelling reaches the original submission, which frees the coord.
        sampler.cancel(&req.coord);
        assert!(!sampler.is_pending(&req.coord));
        sampler.submit(req).unwrap();
        assert!(sampler.is_pending(&req.coord));
    }

    #[test]
    fn test_in_flight_drains_to_zero() {
        let sampler = TileSampler::new(store(), 2, 16, 16).unwrap();
        for x in 0..5 {
            let _ = sampler.submit(request(x, 0));
        }
        let deadline = Instant::now() + Duration::from_secs(10);
        while sampler.in_flight_count() > 0 && Instant::now() < deadline {
            let _ = sampler.drain_results();
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(sampler.in_flight_count(), 0);
    }

    #[test]
    fn test_sampled_tile_indexing() {
        let maps = store().snapshot();
        let req = request(0, 0);
        let tile = SampledTile {
            columns: sample_tile_sync(&maps, &req),
            request: req,
            sample_time_us: 0,
        };
        let (x, z) = req.world_of(3, 5);
        assert_eq!(tile.get(3, 5), Some(maps.sample_column(x, z)));
        assert_eq!(tile.get(8, 0), None);
    }
}
