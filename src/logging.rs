// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Logging macros.
//!
//! - `firmware` builds forward to `defmt` (RTT through the debug probe).
//! - Host tests print to stdout with a level prefix.
//! - Other host builds discard the message.
//!
//! Only plain `{}` placeholders with primitive or `&str` arguments are portable across all three.
//! Operator-facing status never goes through here; it is written to the serial link.

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "firmware")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "firmware"), test))]
        println!("[INFO] {}", format!($($arg)*));

        #[cfg(all(not(feature = "firmware"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "firmware")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "firmware"), test))]
        println!("[WARN] {}", format!($($arg)*));

        #[cfg(all(not(feature = "firmware"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "firmware")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(feature = "firmware"), test))]
        println!("[ERROR] {}", format!($($arg)*));

        #[cfg(all(not(feature = "firmware"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "firmware")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "firmware"), test))]
        println!("[DEBUG] {}", format!($($arg)*));

        #[cfg(all(not(feature = "firmware"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}
