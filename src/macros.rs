/// Logs a line tagged with the component that produced it.
/// Usage:
/// ```rust
/// use log::Level;
/// sketchy::sketchy_log!(Level::Info, "scoring", "tracking {} score(s)", 3);
/// ```
/// Logs like (with the fern format installed by `logging::init`):
/// [2025-04-25T16:32:10+02:00][INFO ][sketchy::scoring::agent][pid=4568][tid=ThreadId(3)] [scoring] tracking 3 score(s)
#[macro_export]
macro_rules! sketchy_log {
    ($level:expr, $component:literal, $fmt:literal $(, $($arg:tt)+)?) => {
        ::log::log!(
            $level,
            concat!("[", $component, "] ", $fmt)
            $(, $($arg)+)?
        )
    };
}
