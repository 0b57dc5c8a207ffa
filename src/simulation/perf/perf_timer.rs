//! Stopwatch for per-phase step timings.

#[cfg(target_arch = "wasm32")]
type Instant = f64;
#[cfg(not(target_arch = "wasm32"))]
type Instant = std::time::Instant;

#[cfg(target_arch = "wasm32")]
fn now() -> Instant {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now() -> Instant {
    std::time::Instant::now()
}

#[cfg(target_arch = "wasm32")]
fn ms_since(from: Instant, to: Instant) -> f64 {
    to - from
}

#[cfg(not(target_arch = "wasm32"))]
fn ms_since(from: Instant, to: Instant) -> f64 {
    to.duration_since(from).as_secs_f64() * 1000.0
}

#[derive(Clone, Copy)]
pub(crate) struct PerfTimer {
    started: Instant,
    lap: Instant,
}

impl PerfTimer {
    pub(crate) fn start() -> Self {
        let t = now();
        PerfTimer { started: t, lap: t }
    }

    /// Milliseconds since the previous lap (or the start); begins a new lap.
    pub(crate) fn lap_ms(&mut self) -> f64 {
        let t = now();
        let ms = ms_since(self.lap, t);
        self.lap = t;
        ms
    }

    pub(crate) fn total_ms(&self) -> f64 {
        ms_since(self.started, now())
    }
}
