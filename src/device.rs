//! # Homie Device
//!
//! [`HomieDevice`] ties the model, the publication engine and the dispatcher
//! to one transport.
//!
//! ## Lifecycle
//!
//! 1. The description is validated. Nothing touches the transport if it is
//!    invalid.
//! 2. The transport connects, bounded by the configured timeout
//!    ([`connect`](HomieDevice::connect) only).
//! 3. `$state = init`, the full announcement, subscriptions to every `set`
//!    topic, initial values, then `$state = ready`.
//!
//! ## Concurrency
//!
//! All state sits behind one async mutex. Every public operation, including
//! message dispatch and the handler it runs, takes the lock for its whole
//! duration, so the publishes of one operation are never interleaved with
//! those of another.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::pin::pin;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::mutex::Mutex;
use embassy_time::Timer;
use futures::future::{Either, select};

use crate::codec::Value;
use crate::description::DeviceDescription;
use crate::dispatch::{Dispatch, Dispatcher, Update, UpdateOutbox};
use crate::error::{ConnectError, HomieError, PropertyError};
use crate::meta::Meta;
use crate::model::Device;
use crate::publish::{self, BufferedOutbox};
use crate::settings::MqttSettings;
use crate::state::State;
use crate::topic::Topics;
use crate::transport::HomieTransport;

/// A running Homie device.
///
/// # Example
///
/// ```ignore
/// let device: HomieDevice<_> = HomieDevice::connect(transport, &settings, description).await?;
///
/// device.set_value("temperature", 21.5).await?;
///
/// // in the MQTT receive loop
/// device.on_message(publish.topic, publish.payload).await?;
/// ```
pub struct HomieDevice<T: HomieTransport, M: RawMutex = CriticalSectionRawMutex> {
    inner: Mutex<M, DeviceCore<T>>,
}

struct DeviceCore<T> {
    device: Device,
    topics: Topics,
    transport: T,
    dispatcher: Dispatcher,
    outbox: BufferedOutbox,
}

impl<T: HomieTransport, M: RawMutex> HomieDevice<T, M> {
    /// Builds the device, connects the transport and announces the device.
    ///
    /// Fails with [`ConnectError::Timeout`] if the transport does not connect
    /// within `settings.connect_timeout`.
    pub async fn connect(
        mut transport: T,
        settings: &MqttSettings,
        description: DeviceDescription,
    ) -> Result<Self, HomieError<T::Error>> {
        let device = Device::build(description)?;

        debug!("connecting to {}", settings.broker.as_str());
        let connect = transport.connect(settings);
        let timeout = Timer::after(settings.connect_timeout);
        match select(pin!(connect), pin!(timeout)).await {
            Either::Left((Ok(()), _)) => {}
            Either::Left((Err(err), _)) => {
                error!("failed to connect to {}", settings.broker.as_str());
                return Err(ConnectError::Transport(err).into());
            }
            Either::Right(_) => {
                error!(
                    "connect to {} timed out after {}ms",
                    settings.broker.as_str(),
                    settings.connect_timeout.as_millis()
                );
                return Err(ConnectError::Timeout.into());
            }
        }

        Self::announce(transport, &settings.topic, device).await
    }

    /// Builds and announces the device over an already connected transport.
    pub async fn start(
        transport: T,
        prefix: &str,
        description: DeviceDescription,
    ) -> Result<Self, HomieError<T::Error>> {
        let device = Device::build(description)?;
        Self::announce(transport, prefix, device).await
    }

    async fn announce(
        transport: T,
        prefix: &str,
        device: Device,
    ) -> Result<Self, HomieError<T::Error>> {
        let topics = Topics::new(prefix, device.id());
        let dispatcher = Dispatcher::new(&device, &topics);
        let mut core = DeviceCore {
            device,
            topics,
            transport,
            dispatcher,
            outbox: BufferedOutbox::new(),
        };

        publish::state(&core.topics, State::Init, &mut core.outbox);
        publish::announce(&core.topics, &core.device, &mut core.outbox);
        core.flush().await?;

        core.dispatcher
            .subscribe(&mut core.transport)
            .await
            .map_err(HomieError::Transport)?;

        let initial: Vec<Update> = core
            .device
            .properties()
            .filter_map(|(node, p)| {
                p.initial_value().map(|value| Update::Value {
                    property: format!("{}/{}", node.id(), p.id()),
                    value: value.clone(),
                })
            })
            .collect();
        for update in initial {
            core.apply(update, None)?;
        }
        core.apply(Update::State(State::Ready), None)?;
        core.flush().await?;

        info!("device {} is ready at {}", core.device.id(), core.topics.base());
        Ok(Self {
            inner: Mutex::new(core),
        })
    }

    /// Stores and publishes a new value.
    ///
    /// `id` is a property id or a `node/property` path; the path is needed to
    /// reach a property whose id is shared with a later node. The value must fit the property's datatype, enum values and range.
    /// Integers are accepted for float properties and strings for enum
    /// properties.
    pub async fn set_value(
        &self,
        id: &str,
        value: impl Into<Value>,
    ) -> Result<(), HomieError<T::Error>> {
        let mut core = self.inner.lock().await;
        core.apply(
            Update::Value {
                property: id.into(),
                value: value.into(),
            },
            None,
        )?;
        core.flush().await
    }

    /// The current value of a property; `None` until first set.
    pub async fn value(&self, id: &str) -> Result<Option<Value>, PropertyError> {
        let core = self.inner.lock().await;
        core.device.value(id).map(Option::<&Value>::cloned)
    }

    /// Replaces a property's metadata and publishes the new mapping.
    pub async fn set_meta(
        &self,
        id: &str,
        meta: impl Into<Meta>,
    ) -> Result<(), HomieError<T::Error>> {
        let mut core = self.inner.lock().await;
        core.apply(
            Update::Meta {
                property: id.into(),
                meta: meta.into(),
            },
            None,
        )?;
        core.flush().await
    }

    pub async fn meta(&self, id: &str) -> Result<Meta, PropertyError> {
        let core = self.inner.lock().await;
        core.device.meta(id).cloned()
    }

    /// Publishes a new `$state`.
    pub async fn set_state(&self, state: State) -> Result<(), HomieError<T::Error>> {
        let mut core = self.inner.lock().await;
        core.apply(Update::State(state), None)?;
        core.flush().await
    }

    pub async fn state(&self) -> State {
        self.inner.lock().await.device.state()
    }

    /// Routes an incoming MQTT message to the matching property handler and
    /// applies whatever the handler queued.
    ///
    /// Messages for other topics are [`Dispatch::Ignored`]. Payloads that do
    /// not decode are [`Dispatch::Rejected`] without invoking the handler.
    /// Neither is an error. Bare property ids queued by the handler resolve
    /// within the addressed node first.
    pub async fn on_message(
        &self,
        topic: &str,
        payload: &[u8],
    ) -> Result<Dispatch, HomieError<T::Error>> {
        let mut guard = self.inner.lock().await;
        let core = &mut *guard;

        let mut updates = UpdateOutbox::new();
        let outcome =
            core.dispatcher
                .dispatch(&mut core.device, &core.topics, topic, payload, &mut updates);

        let scope = core.topics.parse_set(topic).map(|(node, _)| node);
        let mut applied = Ok(());
        for update in updates.drain() {
            if let Err(err) = core.apply(update, scope) {
                warn!("handler update rejected: {}", err);
                applied = Err(err);
                break;
            }
        }
        core.flush().await?;
        applied?;
        Ok(outcome)
    }

    /// Runs `f` with read access to the device model.
    pub async fn inspect<R>(&self, f: impl FnOnce(&Device) -> R) -> R {
        f(&self.inner.lock().await.device)
    }

    /// The `set` topics the device subscribed to.
    pub async fn subscriptions(&self) -> Vec<String> {
        let core = self.inner.lock().await;
        core.dispatcher.iter().map(String::from).collect()
    }

    /// Releases the transport.
    pub fn into_transport(self) -> T {
        self.inner.into_inner().transport
    }
}

impl<T: HomieTransport> DeviceCore<T> {
    /// Applies one change to the model and queues its publishes.
    ///
    /// `scope` is the node a set handler ran for, if any.
    fn apply(&mut self, update: Update, scope: Option<&str>) -> Result<(), PropertyError> {
        match update {
            Update::Value { property, value } => {
                let slot = self.device.resolve(scope, &property)?;
                self.device.set_value_at(slot, &property, value)?;
                let (node, property) = self.device.at(slot);
                publish::value(&self.topics, node, property, &mut self.outbox);
            }
            Update::Meta { property, meta } => {
                let slot = self.device.resolve(scope, &property)?;
                let previous = self.device.set_meta_at(slot, meta);
                let (node, property) = self.device.at(slot);
                publish::meta_update(&self.topics, node, property, &previous, &mut self.outbox);
            }
            Update::State(state) => {
                self.device.set_state(state);
                publish::state(&self.topics, state, &mut self.outbox);
            }
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), HomieError<T::Error>> {
        match self.outbox.flush(&mut self.transport).await {
            Ok(_) => Ok(()),
            Err(err) => {
                error!("publish failed");
                Err(HomieError::Transport(err))
            }
        }
    }
}
