//! Logging shims.
//!
//! The crate logs through whichever backend is enabled: `log`, `defmt`, or
//! `esp-println` (feature `esp32-log`). With none enabled the macros expand to
//! nothing but still borrow their arguments so call sites stay warning-free.
//!
//! Arguments must implement both `Display` and `defmt::Format`, so messages only
//! use `{}` placeholders.

#![macro_use]
#![allow(unused_macros)]

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "log")]
            ::log::trace!($s $(, $x)*);
            #[cfg(feature = "defmt")]
            ::defmt::trace!($s $(, $x)*);
            #[cfg(not(any(feature = "log", feature = "defmt")))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "log")]
            ::log::debug!($s $(, $x)*);
            #[cfg(feature = "defmt")]
            ::defmt::debug!($s $(, $x)*);
            #[cfg(not(any(feature = "log", feature = "defmt")))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "log")]
            ::log::info!($s $(, $x)*);
            #[cfg(feature = "defmt")]
            ::defmt::info!($s $(, $x)*);
            #[cfg(feature = "esp32-log")]
            ::esp_println::println!($s $(, $x)*);
            #[cfg(not(any(feature = "log", feature = "defmt", feature = "esp32-log")))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "log")]
            ::log::warn!($s $(, $x)*);
            #[cfg(feature = "defmt")]
            ::defmt::warn!($s $(, $x)*);
            #[cfg(feature = "esp32-log")]
            ::esp_println::println!($s $(, $x)*);
            #[cfg(not(any(feature = "log", feature = "defmt", feature = "esp32-log")))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "log")]
            ::log::error!($s $(, $x)*);
            #[cfg(feature = "defmt")]
            ::defmt::error!($s $(, $x)*);
            #[cfg(feature = "esp32-log")]
            ::esp_println::println!($s $(, $x)*);
            #[cfg(not(any(feature = "log", feature = "defmt", feature = "esp32-log")))]
            let _ = ($( & $x ),*);
        }
    };
}
