/// Which countdown a tick belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSlot {
    Round,
    MiniGame,
}

/// One elapsed second, stamped with the ticker that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub slot: TimerSlot,
    pub generation: u64,
}

pub type TickSender = tokio::sync::mpsc::UnboundedSender<Tick>;
pub type TickReceiver = tokio::sync::mpsc::UnboundedReceiver<Tick>;

static GENERATION: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

pub fn channel() -> (TickSender, TickReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Posts one [`Tick`] per elapsed second until dropped.
///
/// Every ticker gets a fresh generation, so ticks still queued from a stopped
/// ticker can be told apart from the ones of its replacement.
///
/// Must be created from within a tokio runtime.
#[derive(Debug)]
pub struct Ticker {
    slot: TimerSlot,
    generation: u64,
    handle: tokio::task::JoinHandle<()>,
}

impl Ticker {
    pub fn spawn(slot: TimerSlot, sink: TickSender) -> Self {
        let generation = GENERATION.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        tracing::debug!(?slot, generation, "Starting ticker");
        let tick = Tick { slot, generation };

        let handle = tokio::task::spawn(async move {
            let period = std::time::Duration::from_secs(1);
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if sink.send(tick).is_err() {
                    tracing::debug!(?slot, "Tick receiver gone, stopping ticker");
                    break;
                }
            }
        });

        Self {
            slot,
            generation,
            handle,
        }
    }

    pub fn slot(&self) -> TimerSlot {
        self.slot
    }

    /// Whether `tick` was sent by this ticker.
    pub fn produced(&self, tick: &Tick) -> bool {
        tick.slot == self.slot && tick.generation == self.generation
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        tracing::debug!(slot = ?self.slot, generation = self.generation, "Stopping ticker");
        self.handle.abort();
    }
}
