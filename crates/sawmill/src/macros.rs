//! Logging macros
//!
//! Each macro takes format arguments, optionally preceded by `logger: <expr>,`
//! and `extra: <expr>,`. Without a logger the global instance is used.
//!
//! ```ignore
//! sawmill::info!("listening on {}", addr);
//! sawmill::warn!(logger: &logger, extra: Extra::new().with("retry", 3), "slow peer");
//! sawmill::log!(Level::Trace, "raw frame {:?}", frame);
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __submit {
    ($method:ident, $method_ex:ident; logger: $logger:expr, extra: $extra:expr, $($arg:tt)+) => {
        $logger.$method_ex($extra, ::std::format_args!($($arg)+))
    };
    ($method:ident, $method_ex:ident; logger: $logger:expr, $($arg:tt)+) => {
        $logger.$method(::std::format_args!($($arg)+))
    };
    ($method:ident, $method_ex:ident; extra: $extra:expr, $($arg:tt)+) => {
        $crate::global().$method_ex($extra, ::std::format_args!($($arg)+))
    };
    ($method:ident, $method_ex:ident; $($arg:tt)+) => {
        $crate::global().$method(::std::format_args!($($arg)+))
    };
}

/// Log at `Finest`
#[macro_export]
macro_rules! finest {
    ($($arg:tt)+) => { $crate::__submit!(finest, finest_ex; $($arg)+) };
}

/// Log at `Fine`
#[macro_export]
macro_rules! fine {
    ($($arg:tt)+) => { $crate::__submit!(fine, fine_ex; $($arg)+) };
}

/// Log at `Debug`
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__submit!(debug, debug_ex; $($arg)+) };
}

/// Log at `Trace`
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__submit!(trace, trace_ex; $($arg)+) };
}

/// Log at `Info`
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__submit!(info, info_ex; $($arg)+) };
}

/// Log at `Warning`; evaluates to a [`LogError`](crate::LogError)
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__submit!(warn, warn_ex; $($arg)+) };
}

/// Log at `Error`; evaluates to a [`LogError`](crate::LogError)
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__submit!(error, error_ex; $($arg)+) };
}

/// Log at `Critical`; evaluates to a [`LogError`](crate::LogError)
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => { $crate::__submit!(critical, critical_ex; $($arg)+) };
}

/// Log at a level chosen at runtime
#[macro_export]
macro_rules! log {
    (logger: $logger:expr, extra: $extra:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_ex($level, $extra, ::std::format_args!($($arg)+))
    };
    (logger: $logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, ::std::format_args!($($arg)+))
    };
    (extra: $extra:expr, $level:expr, $($arg:tt)+) => {
        $crate::global().log_ex($level, $extra, ::std::format_args!($($arg)+))
    };
    ($level:expr, $($arg:tt)+) => {
        $crate::global().log($level, ::std::format_args!($($arg)+))
    };
}
