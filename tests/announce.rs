mod common;

use common::{Recorder, start, thermostat};
use myrtio_homie::{
    ConstructionError, DeviceDescription, HomieDevice, HomieError, NodeDescription,
    PropertyDescription, State, Value,
};

fn position(recorder: &Recorder, topic: &str) -> usize {
    recorder
        .topics()
        .iter()
        .position(|t| t == topic)
        .unwrap_or_else(|| panic!("{topic} was not published"))
}

#[test]
fn state_goes_from_init_to_ready_around_the_announcement() {
    let (device, recorder) = start(thermostat());
    let published = recorder.published();

    assert_eq!(
        published.first().unwrap(),
        &("homie/test-device/$state".to_string(), "init".to_string(), true)
    );
    assert_eq!(
        published.last().unwrap(),
        &("homie/test-device/$state".to_string(), "ready".to_string(), true)
    );
    assert_eq!(embassy_futures::block_on(device.state()), State::Ready);
}

#[test]
fn device_attributes() {
    let (_device, recorder) = start(thermostat());
    assert_eq!(recorder.payload("homie/test-device/$homie").as_deref(), Some("4.0.0"));
    assert_eq!(recorder.payload("homie/test-device/$name").as_deref(), Some("Test device"));
    assert_eq!(recorder.payload("homie/test-device/$extensions").as_deref(), Some(""));
    assert_eq!(
        recorder.payload("homie/test-device/$nodes").as_deref(),
        Some("heating,status")
    );
}

#[test]
fn explicit_device_name_is_published_verbatim() {
    let (_device, recorder) =
        start(DeviceDescription::new("test-device").name("Exactly Given Device Name"));
    assert_eq!(
        recorder.payload("homie/test-device/$name").as_deref(),
        Some("Exactly Given Device Name")
    );
    assert_eq!(recorder.payload("homie/test-device/$nodes").as_deref(), Some(""));
}

#[test]
fn node_attributes() {
    let (_device, recorder) = start(thermostat());
    assert_eq!(recorder.payload("homie/test-device/heating/$name").as_deref(), Some("Heating"));
    assert_eq!(recorder.payload("homie/test-device/heating/$type").as_deref(), Some("heating"));
    assert_eq!(
        recorder.payload("homie/test-device/heating/$properties").as_deref(),
        Some("temperature,target,mode")
    );
    assert_eq!(recorder.payload("homie/test-device/status/$type").as_deref(), Some("xyz"));
}

#[test]
fn property_attributes() {
    let (_device, recorder) = start(thermostat());
    let attr = |path: &str| recorder.payload(&format!("homie/test-device/{path}"));

    assert_eq!(attr("heating/temperature/$datatype").as_deref(), Some("float"));
    assert_eq!(attr("heating/temperature/$settable").as_deref(), Some("false"));
    assert_eq!(attr("heating/temperature/$retained").as_deref(), Some("true"));
    assert_eq!(attr("heating/temperature/$unit").as_deref(), Some("°C"));
    assert_eq!(attr("heating/temperature/$format"), None);

    assert_eq!(attr("heating/target/$name").as_deref(), Some("Target"));
    assert_eq!(attr("heating/target/$settable").as_deref(), Some("true"));
    assert_eq!(attr("heating/target/$format").as_deref(), Some("0:100"));

    assert_eq!(attr("heating/mode/$datatype").as_deref(), Some("enum"));
    assert_eq!(attr("heating/mode/$format").as_deref(), Some("off,eco,comfort"));

    assert_eq!(attr("status/uptime/$datatype").as_deref(), Some("integer"));
    assert_eq!(attr("status/uptime/$retained").as_deref(), Some("false"));
    assert_eq!(attr("status/uptime/$unit"), None);
    assert_eq!(attr("status/online/$datatype").as_deref(), Some("boolean"));
}

#[test]
fn every_attribute_is_retained() {
    let (_device, recorder) = start(thermostat());
    assert!(
        recorder
            .published()
            .iter()
            .filter(|(topic, _, _)| topic.contains('$'))
            .all(|(_, _, retain)| *retain)
    );
}

#[test]
fn announcement_order() {
    let (_device, recorder) = start(thermostat());

    let homie = position(&recorder, "homie/test-device/$homie");
    let nodes = position(&recorder, "homie/test-device/$nodes");
    let heating = position(&recorder, "homie/test-device/heating/$name");
    let target = position(&recorder, "homie/test-device/heating/target/$name");
    let status = position(&recorder, "homie/test-device/status/$name");
    let initial = position(&recorder, "homie/test-device/heating/target");
    let ready = recorder.topics().len() - 1;

    assert!(homie < nodes);
    assert!(nodes < heating);
    assert!(heating < target);
    assert!(target < status);
    assert!(status < initial);
    assert!(initial < ready);
}

#[test]
fn initial_values_are_published_as_floats() {
    let (device, recorder) = start(thermostat());
    assert_eq!(
        recorder.payload("homie/test-device/heating/target").as_deref(),
        Some("6.0")
    );
    assert_eq!(
        embassy_futures::block_on(device.value("target")),
        Ok(Some(Value::Float(6.0)))
    );
    assert_eq!(recorder.payload("homie/test-device/heating/temperature"), None);
}

#[test]
fn settable_properties_are_subscribed() {
    let (device, recorder) = start(thermostat());
    let expected = vec![
        "homie/test-device/heating/target/set".to_string(),
        "homie/test-device/heating/mode/set".to_string(),
    ];
    assert_eq!(recorder.subscribed(), expected);
    assert_eq!(embassy_futures::block_on(device.subscriptions()), expected);
}

#[test]
fn meta_is_part_of_the_announcement() {
    let (_device, recorder) = start(
        DeviceDescription::new("test-device").node(
            NodeDescription::new("node").property(
                PropertyDescription::string("label").meta([("a", "b"), ("c", "d")]),
            ),
        ),
    );
    let meta = |path: &str| recorder.payload(&format!("homie/test-device/node/label/$meta/{path}"));

    assert_eq!(meta("$mainkey-ids").as_deref(), Some("a,c"));
    assert_eq!(meta("a/$key").as_deref(), Some("a"));
    assert_eq!(meta("a/$value").as_deref(), Some("b"));
    assert_eq!(meta("c/$key").as_deref(), Some("c"));
    assert_eq!(meta("c/$value").as_deref(), Some("d"));
}

#[test]
fn empty_meta_publishes_nothing() {
    let (_device, recorder) = start(thermostat());
    assert!(recorder.topics().iter().all(|t| !t.contains("$meta")));
}

#[test]
fn invalid_description_never_reaches_the_transport() {
    let recorder = Recorder::new();
    let result = embassy_futures::block_on(HomieDevice::<Recorder>::start(
        recorder.clone(),
        "homie",
        DeviceDescription::new("test-device").node(
            NodeDescription::new("node")
                .property(PropertyDescription::enumeration("mode", Vec::<String>::new())),
        ),
    ));

    assert!(matches!(
        result,
        Err(HomieError::Construction(ConstructionError::InvalidEnumValues { .. }))
    ));
    assert!(recorder.published().is_empty());
    assert!(recorder.subscribed().is_empty());
}
