//! # Homie 4 Devices for Embedded Systems
//!
//! `myrtio-homie` is a `no_std`, asynchronous implementation of the device side
//! of the [Homie 4 convention](https://homieiot.github.io/): it describes a
//! device as nodes and typed properties, announces it over MQTT, publishes
//! property values, and routes `set` commands back to per-property handlers.
//!
//! ## Core Features
//!
//! - **`no_std`:** Runs on bare-metal microcontrollers with an allocator.
//!   Timers and locking come from the [Embassy](https://embassy.dev/) ecosystem.
//! - **Fully Async:** Uses native `async fn` in traits (Rust 2024 Edition).
//! - **Transport Agnostic:** The device only needs a [`HomieTransport`] that can
//!   connect, publish and subscribe. Any MQTT client can provide one.
//! - **Validated Up Front:** Ids, constraints and initial values are checked
//!   before anything is published.
//! - **Typed Values:** Integer, float, boolean, string and enum properties with
//!   ranges and enum values enforced on both outgoing and incoming values.
//!
//! ## Usage
//!
//! ```ignore
//! use myrtio_homie::{
//!     DeviceDescription, HomieDevice, MqttSettings, NodeDescription, PropertyDescription,
//! };
//!
//! let description = DeviceDescription::new("thermostat").node(
//!     NodeDescription::new("heating")
//!         .property(PropertyDescription::float("temperature").unit("°C"))
//!         .property(
//!             PropertyDescription::float("target")
//!                 .unit("°C")
//!                 .min(5)
//!                 .max(30)
//!                 .initial_value(21)
//!                 .on_set(|value, updates| updates.set_value("target", value.clone())),
//!         ),
//! );
//!
//! let settings = MqttSettings::new("192.168.1.10").with_topic("homie");
//! let device: HomieDevice<_> = HomieDevice::connect(transport, &settings, description).await?;
//!
//! device.set_value("temperature", 20.5).await?;
//! ```
//!
//! ## Incoming Messages
//!
//! The crate does not own the MQTT receive loop. The host reads messages from
//! its client and passes each one to [`HomieDevice::on_message`]. Messages
//! on foreign topics are ignored, so a client shared with other consumers can
//! forward everything.
//!
//! ## Logging
//!
//! Enable one of the `log`, `defmt` or `esp32-log` features to get the crate's
//! diagnostics.

#![no_std]

extern crate alloc;

// This must go first so the macros are visible to every other module.
mod fmt;

pub mod codec;
pub mod description;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod id;
pub mod meta;
pub mod model;
pub mod publish;
pub mod settings;
pub mod state;
pub mod topic;
pub mod transport;

pub use codec::{Bound, Datatype, DecodeError, PropertyKind, Value};
pub use description::{DeviceDescription, NodeDescription, PropertyDescription};
pub use device::HomieDevice;
pub use dispatch::{Dispatch, UpdateOutbox};
pub use error::{ConnectError, ConstructionError, HomieError, PropertyError};
pub use meta::Meta;
pub use settings::MqttSettings;
pub use state::State;
pub use transport::HomieTransport;
