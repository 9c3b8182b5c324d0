#[cfg(feature = "logging")]
macro_rules! __fram_log {
    ($level:ident, $($arg:tt)+) => {
        log::$level!(target: "fram_provision", $($arg)+);
    };
}

#[cfg(not(feature = "logging"))]
macro_rules! __fram_log {
    ($level:ident, $($arg:tt)+) => {
        let _ = core::format_args!($($arg)+);
        let _level = stringify!($level);
        let _ = _level;
    };
}

macro_rules! fram_log_info {
    ($($arg:tt)+) => {
        __fram_log!(info, $($arg)+);
    };
}

macro_rules! fram_log_warn {
    ($($arg:tt)+) => {
        __fram_log!(warn, $($arg)+);
    };
}

macro_rules! fram_log_debug {
    ($($arg:tt)+) => {
        __fram_log!(debug, $($arg)+);
    };
}
