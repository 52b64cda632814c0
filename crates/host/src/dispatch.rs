use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::warn;

/// A callback posted to the foreground execution context.
pub type ForegroundCallback = Box<dyn FnOnce() + Send>;

/// Capability to run a callback later on the host's foreground thread.
///
/// `post` is fire-and-forget: there is no latency bound beyond "eventually,
/// in the dispatcher's own order", and the dispatcher owns whatever happens
/// inside the callback, including panics.
pub trait ForegroundDispatcher: Send + Sync {
    /// Schedule `callback` to run on the foreground context.
    fn post(&self, callback: ForegroundCallback);
}

/// Channel-backed [`ForegroundDispatcher`].
///
/// `post` enqueues the callback on an unbounded channel; the owner drains
/// it from the designated foreground thread with [`run_pending`]. Callbacks
/// run in FIFO order.
///
/// [`run_pending`]: ChannelDispatcher::run_pending
pub struct ChannelDispatcher {
    tx: Sender<ForegroundCallback>,
    rx: Receiver<ForegroundCallback>,
}

impl ChannelDispatcher {
    /// Create a dispatcher with an empty queue.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Run every callback queued at the time of the call, on the calling
    /// thread. Returns how many callbacks ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(callback) = self.rx.try_recv() {
            callback();
            ran += 1;
        }
        ran
    }
}

impl Default for ChannelDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ForegroundDispatcher for ChannelDispatcher {
    fn post(&self, callback: ForegroundCallback) {
        // Cannot disconnect while the dispatcher holds both ends, but a
        // dropped callback is worth a log line rather than a panic.
        if self.tx.send(callback).is_err() {
            warn!("Foreground dispatcher queue disconnected, callback dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn callbacks_run_in_fifo_order() {
        let dispatcher = ChannelDispatcher::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = order.clone();
            dispatcher.post(Box::new(move || order.lock().unwrap().push(i)));
        }

        assert_eq!(dispatcher.run_pending(), 3);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn run_pending_on_empty_queue_is_a_noop() {
        let dispatcher = ChannelDispatcher::new();
        assert_eq!(dispatcher.run_pending(), 0);
    }

    #[test]
    fn post_from_another_thread_is_delivered() {
        let dispatcher = Arc::new(ChannelDispatcher::new());
        let ran = Arc::new(Mutex::new(false));

        let d = dispatcher.clone();
        let r = ran.clone();
        std::thread::spawn(move || {
            d.post(Box::new(move || *r.lock().unwrap() = true));
        })
        .join()
        .unwrap();

        assert_eq!(dispatcher.run_pending(), 1);
        assert!(*ran.lock().unwrap());
    }
}
