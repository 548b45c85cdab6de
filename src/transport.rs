//! # MQTT Transport Abstraction
//!
//! This module defines the `HomieTransport` trait, the only thing a device needs
//! from an MQTT client: connect, publish and subscribe. Keeping the device
//! behind this trait makes it independent of any particular client crate or
//! network stack.
//!
//! Incoming messages are not read through the trait. The host runs its client's
//! receive loop and hands every publish to
//! [`HomieDevice::on_message`](crate::HomieDevice::on_message).
//!
//! With the Rust 2024 Edition, this trait uses native `async fn`, removing the
//! need for the `#[async_trait]` macro.

use crate::settings::MqttSettings;

/// The publishing half of an MQTT client.
#[allow(async_fn_in_trait)]
pub trait HomieTransport {
    /// The error type returned by the transport.
    type Error: core::fmt::Debug;

    /// Connects to the broker described by `settings`.
    ///
    /// The device bounds this call with `settings.connect_timeout`, so an
    /// implementation may simply wait for the broker's acknowledgement.
    async fn connect(&mut self, settings: &MqttSettings) -> Result<(), Self::Error>;

    /// Publishes `payload` on `topic`. An empty payload with `retain` set clears
    /// the retained message.
    async fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error>;

    /// Subscribes to `topic`. Matching messages must be routed back to the device.
    async fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error>;
}

/// Forwarding implementation so a transport can be lent to a device.
impl<T: HomieTransport> HomieTransport for &mut T {
    type Error = T::Error;

    async fn connect(&mut self, settings: &MqttSettings) -> Result<(), Self::Error> {
        (**self).connect(settings).await
    }

    async fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error> {
        (**self).publish(topic, payload, retain).await
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error> {
        (**self).subscribe(topic).await
    }
}
