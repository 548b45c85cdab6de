//! A thermostat announced over a transport that prints instead of talking to a
//! broker.
//!
//! Run with `cargo run --example thermostat`.

use std::convert::Infallible;

use embassy_futures::block_on;
use myrtio_homie::{
    DeviceDescription, HomieDevice, HomieError, HomieTransport, MqttSettings, NodeDescription,
    PropertyDescription, State,
};

struct PrintTransport;

impl HomieTransport for PrintTransport {
    type Error = Infallible;

    async fn connect(&mut self, settings: &MqttSettings) -> Result<(), Infallible> {
        println!("connect {settings:?}");
        Ok(())
    }

    async fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Infallible> {
        let flag = if retain { "r" } else { " " };
        println!("{flag} {topic} = {}", String::from_utf8_lossy(payload));
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), Infallible> {
        println!("+ {topic}");
        Ok(())
    }
}

fn description() -> DeviceDescription {
    DeviceDescription::new("thermostat")
        .name("Living Room Thermostat")
        .node(
            NodeDescription::new("heating")
                .property(PropertyDescription::float("temperature").unit("°C"))
                .property(
                    PropertyDescription::float("target")
                        .unit("°C")
                        .min(5)
                        .max(30)
                        .initial_value(21)
                        .on_set(|value, updates| updates.set_value("target", value.clone())),
                )
                .property(
                    PropertyDescription::enumeration("mode", ["off", "eco", "comfort"])
                        .initial_value("comfort")
                        .on_set(|value, updates| {
                            updates.set_value("mode", value.clone());
                            if value.as_str() == Some("off") {
                                updates.set_value("target", 5);
                            }
                        }),
                ),
        )
        .node(
            NodeDescription::new("system")
                .node_type("esp32")
                .property(PropertyDescription::integer("uptime").unit("s").retained(false))
                .property(
                    PropertyDescription::string("firmware")
                        .meta([("Build Channel", "stable"), ("Board", "esp32-c3")])
                        .initial_value("0.1.0"),
                ),
        )
}

async fn run() -> Result<(), HomieError<Infallible>> {
    let settings = MqttSettings::new("192.168.1.10").with_credentials("thermostat", "secret");
    let device: HomieDevice<_> =
        HomieDevice::connect(PrintTransport, &settings, description()).await?;

    device.set_value("temperature", 19.5).await?;
    device.set_value("uptime", 12).await?;

    for (topic, payload) in [
        ("homie/thermostat/heating/target/set", "22.5"),
        ("homie/thermostat/heating/target/set", "45"),
        ("homie/thermostat/heating/mode/set", "off"),
        ("homie/thermostat/system/uptime/set", "0"),
    ] {
        let outcome = device.on_message(topic, payload.as_bytes()).await?;
        println!("# {topic} <- {payload}: {outcome:?}");
    }

    device.set_meta("firmware", [("Build Channel", "beta")]).await?;
    device.set_state(State::Sleeping).await?;
    Ok(())
}

fn main() {
    if let Err(err) = block_on(run()) {
        eprintln!("thermostat failed: {err}");
    }
}
