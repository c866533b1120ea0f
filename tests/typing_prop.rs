#![cfg(not(target_arch = "wasm32"))]

use adb_bus::sim::{HostScript, SimBus};
use adb_bus::{BusEngine, EngineConfig, Outcome};
use adb_devices::{DeviceClass, LoopbackChannel, SerialIngest, KEY_QUEUE_FILLER, RESET_KEY};
use adb_time::Speed;
use proptest::prelude::*;

/// Any keycode except the reset key, pressed or released.
fn keycode() -> impl Strategy<Value = u8> {
    (0u8..RESET_KEY, any::<bool>()).prop_map(|(key, up)| if up { key | 0x80 } else { key })
}

fn serial_keystrokes(codes: &[u8]) -> Vec<u8> {
    codes
        .iter()
        .flat_map(|&code| [0x40 | (code & 0x0F), 0x50 | (code >> 4)])
        .collect()
}

fn type_and_read(speed: Speed, codes: &[u8]) -> Vec<Outcome> {
    let mut channel = LoopbackChannel::new();
    channel.feed(&serial_keystrokes(codes));
    let mut script = HostScript::new().high_us(1_000);
    for _ in 0..codes.len().div_ceil(2) {
        script = script.talk(2, 0);
    }

    let mut engine = BusEngine::new(
        SimBus::new(speed, script),
        SerialIngest::new(channel),
        EngineConfig::for_speed(speed),
    )
    .expect("default configuration is valid");

    let mut outcomes = Vec::new();
    while !engine.bus_mut().script_done() {
        match engine.service() {
            Outcome::Idle | Outcome::Spurious => {}
            other => outcomes.push(other),
        }
    }
    assert_eq!(
        engine.devices().keyboard().map(|kbd| kbd.queue().len()),
        Some(0)
    );
    outcomes
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 12,
        rng_algorithm: proptest::test_runner::RngAlgorithm::ChaCha,
        rng_seed: proptest::test_runner::RngSeed::Fixed(0x0ADB_0002),
        .. ProptestConfig::default()
    })]

    /// Keystrokes typed over the serial link come out of register 0 talks in order, two per
    /// talk, with a filler only after an odd final key.
    #[test]
    fn typed_keys_arrive_in_order(
        codes in prop::collection::vec(keycode(), 1..=14),
        half in any::<bool>(),
    ) {
        let speed = if half { Speed::Half } else { Speed::Full };
        let outcomes = type_and_read(speed, &codes);

        let mut expected: Vec<u8> = codes.clone();
        if expected.len() % 2 == 1 {
            expected.push(KEY_QUEUE_FILLER);
        }
        let sent: Vec<u8> = outcomes
            .iter()
            .flat_map(|outcome| match outcome {
                Outcome::Talked { target: DeviceClass::Keyboard, register: 0, bytes } => {
                    bytes.clone()
                }
                other => panic!("unexpected outcome {other:?}"),
            })
            .collect();
        prop_assert_eq!(sent, expected);
    }
}
