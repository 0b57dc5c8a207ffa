//! Console logging.
//!
//! In the browser messages go to the devtools console. Native builds (tests,
//! tools) print to stderr in debug builds and stay silent in release.
//!
//! ```rust
//! use impulse_engine::console_log;
//!
//! let pruned = 2;
//! console_log!("pruned {} joints", pruned);
//! ```

#[cfg(target_arch = "wasm32")]
pub fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}

#[cfg(target_arch = "wasm32")]
pub fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log(message: &str) {
    #[cfg(debug_assertions)]
    eprintln!("[impulse] {}", message);
    #[cfg(not(debug_assertions))]
    let _ = message;
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(message: &str) {
    #[cfg(debug_assertions)]
    eprintln!("[impulse] warning: {}", message);
    #[cfg(not(debug_assertions))]
    let _ = message;
}

#[macro_export]
macro_rules! console_log {
    ($($arg:tt)*) => {
        $crate::core::utils::log::log(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! console_warn {
    ($($arg:tt)*) => {
        $crate::core::utils::log::warn(&format!($($arg)*))
    };
}
