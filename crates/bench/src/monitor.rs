//! Peak memory footprint and thread-count monitoring.
//!
//! Both reporters read `/proc/self/status` and are no-ops off Linux. The
//! thread monitor samples the process thread count every 10 ms while a
//! build or query phase runs, mirroring what benchmark comparisons expect.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Print the `PID`, `Name:`, `VmPeak:` and `VmHWM:` lines for the current
/// process as stable stdout keys.
pub fn print_peak_memory() {
    println!("PID: {}", std::process::id());
    match std::fs::read_to_string("/proc/self/status") {
        Ok(status) => {
            for line in status.lines() {
                if line.starts_with("Name:")
                    || line.starts_with("VmPeak:")
                    || line.starts_with("VmHWM:")
                {
                    println!("{line}");
                }
            }
        }
        Err(e) => {
            tracing::warn!("memory footprint unavailable: {e}");
        }
    }
}

fn current_thread_count() -> Option<usize> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|l| l.starts_with("Threads:"))?;
    line.split_whitespace().nth(1)?.parse().ok()
}

/// Samples the process thread count in the background and records the peak.
pub struct ThreadMonitor {
    stop: Arc<AtomicBool>,
    peak: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl ThreadMonitor {
    /// Start sampling. The monitor thread itself is included in the count,
    /// as in comparable benchmark harnesses; callers subtract one when
    /// reporting worker counts.
    pub fn start() -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let peak = Arc::new(AtomicUsize::new(1));
        let handle = {
            let stop = Arc::clone(&stop);
            let peak = Arc::clone(&peak);
            std::thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    if let Some(count) = current_thread_count() {
                        peak.fetch_max(count, Ordering::Relaxed);
                    }
                    std::thread::sleep(Duration::from_millis(10));
                }
            })
        };
        Self { stop, peak, handle }
    }

    /// Stop sampling and return the peak thread count observed.
    pub fn stop(self) -> usize {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.handle.join();
        self.peak.load(Ordering::Relaxed)
    }
}
