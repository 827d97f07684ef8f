/// Logs at info level how long it took from the starting time to now.
/// The starting time is a `chrono::DateTime<Local>`.
/// ```
/// let time = chrono::Local::now();
/// denue::info_time!(time, "str {}, {}", 1, 2);
/// ```
#[macro_export]
macro_rules! info_time {
    ($time:expr, $strfm:literal $(,)? $($arg:expr),*) => {{
        let run_time = (::chrono::Local::now() - $time)
                .num_microseconds()
                .map(|n| n as f64 / 1_000_000.0)
                .unwrap_or(0.0);
        ::log::info!("{} (RUNTIME: {} sec)", format!($strfm, $($arg),*), run_time);
    }};
}
