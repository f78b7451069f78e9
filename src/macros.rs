/// Logs a formatted INFO line to a `RunLog`.
/// ```ignore
/// log_info!(log, "str {}, {}", 1, 2);
/// ```
#[macro_export]
macro_rules! log_info {
    ($log:expr, $($arg:tt)*) => {
        $log.write($crate::log::Level::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($log:expr, $($arg:tt)*) => {
        $log.write($crate::log::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($log:expr, $($arg:tt)*) => {
        $log.write($crate::log::Level::Error, &format!($($arg)*))
    };
}

/// Like `log_info!`, but you also pass in the starting time and it appends how long it took
/// from starting time to now.
/// ```ignore
/// let time = Local::now();
/// info_time!(log, time, "str {}, {}", 1, 2);
/// ```
#[macro_export]
macro_rules! info_time {
    ($log:expr, $time:expr, $($arg:tt)*) => {{
        let run_time = $crate::log::runtime_secs($time);
        $log.write(
            $crate::log::Level::Info,
            &format!("{} (RUNTIME: {} sec)", format!($($arg)*), run_time),
        )
    }};
}
