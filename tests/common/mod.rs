#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use myrtio_homie::{
    DeviceDescription, HomieDevice, HomieTransport, MqttSettings, NodeDescription,
    PropertyDescription,
};

/// Transport error raised on purpose by [`Recorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refused;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnConnect {
    #[default]
    Accept,
    Refuse,
    Hang,
}

#[derive(Debug, Default)]
struct Log {
    published: Vec<(String, String, bool)>,
    subscribed: Vec<String>,
    connects: usize,
    on_connect: OnConnect,
    refuse_publishes: bool,
}

/// In-memory transport that records every call.
///
/// Clones share the same log, so a test can keep one handle while the device
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Log>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_connect(self, behavior: OnConnect) -> Self {
        self.log.lock().unwrap().on_connect = behavior;
        self
    }

    pub fn refuse_publishes(&self, refuse: bool) {
        self.log.lock().unwrap().refuse_publishes = refuse;
    }

    pub fn published(&self) -> Vec<(String, String, bool)> {
        self.log.lock().unwrap().published.clone()
    }

    pub fn topics(&self) -> Vec<String> {
        self.published().into_iter().map(|(topic, _, _)| topic).collect()
    }

    /// The last payload published on `topic`.
    pub fn payload(&self, topic: &str) -> Option<String> {
        self.published()
            .into_iter()
            .rev()
            .find(|(t, _, _)| t == topic)
            .map(|(_, payload, _)| payload)
    }

    pub fn count(&self, topic: &str) -> usize {
        self.published().iter().filter(|(t, _, _)| t == topic).count()
    }

    pub fn subscribed(&self) -> Vec<String> {
        self.log.lock().unwrap().subscribed.clone()
    }

    pub fn connects(&self) -> usize {
        self.log.lock().unwrap().connects
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().published.clear();
    }
}

impl HomieTransport for Recorder {
    type Error = Refused;

    async fn connect(&mut self, _settings: &MqttSettings) -> Result<(), Refused> {
        let behavior = {
            let mut log = self.log.lock().unwrap();
            log.connects += 1;
            log.on_connect
        };
        match behavior {
            OnConnect::Accept => Ok(()),
            OnConnect::Refuse => Err(Refused),
            OnConnect::Hang => core::future::pending().await,
        }
    }

    async fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Refused> {
        let mut log = self.log.lock().unwrap();
        if log.refuse_publishes {
            return Err(Refused);
        }
        let payload = String::from_utf8(payload.to_vec()).unwrap();
        log.published.push((topic.to_string(), payload, retain));
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), Refused> {
        self.log.lock().unwrap().subscribed.push(topic.to_string());
        Ok(())
    }
}

/// Starts `description` on a fresh recorder under the `homie` prefix.
pub fn start(description: DeviceDescription) -> (HomieDevice<Recorder>, Recorder) {
    let recorder = Recorder::new();
    let device = embassy_futures::block_on(HomieDevice::start(
        recorder.clone(),
        "homie",
        description,
    ))
    .unwrap();
    (device, recorder)
}

/// A device with one node per common property shape.
pub fn thermostat() -> DeviceDescription {
    DeviceDescription::new("test-device")
        .node(
            NodeDescription::new("heating")
                .property(PropertyDescription::float("temperature").unit("°C"))
                .property(
                    PropertyDescription::float("target")
                        .unit("°C")
                        .min(0)
                        .max(100)
                        .initial_value(6)
                        .on_set(|value, updates| updates.set_value("target", value.clone())),
                )
                .property(
                    PropertyDescription::enumeration("mode", ["off", "eco", "comfort"])
                        .on_set(|value, updates| updates.set_value("mode", value.clone())),
                ),
        )
        .node(
            NodeDescription::new("status")
                .node_type("xyz")
                .property(PropertyDescription::integer("uptime").retained(false))
                .property(PropertyDescription::boolean("online")),
        )
}
