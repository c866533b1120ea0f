//! Whole-session scenarios: a simulated host drives the engine while the serial link feeds
//! device state, the way the device runs on the board.

use adb_bus::sim::{decode_response, HostScript, SimBus};
use adb_bus::{BusEngine, EngineConfig, Outcome};
use adb_devices::{DeviceClass, Identity, LoopbackChannel, SerialIngest};
use adb_time::Speed;

type Session = BusEngine<SimBus, SerialIngest<LoopbackChannel>>;

fn session(speed: Speed, script: HostScript) -> Session {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    BusEngine::new(
        SimBus::new(speed, script),
        SerialIngest::new(LoopbackChannel::new()),
        EngineConfig::for_speed(speed),
    )
    .expect("default configuration is valid")
}

/// Queues serial bytes and more host activity, giving the link time to drain first.
fn then(session: &mut Session, serial: &[u8], script: HostScript) {
    session.ingest_mut().channel_mut().feed(serial);
    session
        .bus_mut()
        .extend_script(HostScript::new().high_us(1_000));
    session.bus_mut().extend_script(script);
}

fn run(session: &mut Session) -> Vec<Outcome> {
    let mut outcomes = Vec::new();
    while !session.bus_mut().script_done() {
        match session.service() {
            Outcome::Idle | Outcome::Spurious => {}
            other => outcomes.push(other),
        }
    }
    outcomes
}

fn talked(target: DeviceClass, register: u8, bytes: &[u8]) -> Outcome {
    Outcome::Talked {
        target,
        register,
        bytes: bytes.to_vec(),
    }
}

#[test]
fn relocated_mouse_reports_serial_motion() {
    let mut s = session(Speed::Full, HostScript::new().reset());
    assert!(run(&mut s).iter().all(|o| *o == Outcome::Reset));

    // X +3, Y +4.
    then(
        &mut s,
        &[0x83, 0xC4],
        HostScript::new()
            .listen(3, 3, &[0x65, 0xFE])
            .talk(5, 0)
            .talk(3, 0),
    );
    let outcomes = run(&mut s);
    assert_eq!(
        outcomes,
        vec![
            Outcome::Listened {
                target: DeviceClass::Mouse,
                register: 3,
                accepted: true,
            },
            talked(DeviceClass::Mouse, 0, &[0x84, 0x83]),
            Outcome::NotAddressed,
        ]
    );
    // 0xFE is not a mouse handler, so only the address moved.
    assert_eq!(
        s.devices().identity(DeviceClass::Mouse),
        Some(Identity::new(5, 1))
    );
    assert_eq!(decode_response(s.bus().pulses()), vec![0x84, 0x83]);
}

#[test]
fn waiting_keystroke_requests_service_then_is_read() {
    let mut s = session(Speed::Full, HostScript::new());
    // Keycode 0x0C, then talk the mouse (nothing to say) and the keyboard.
    then(
        &mut s,
        &[0x4C, 0x50],
        HostScript::new().talk(3, 0).talk(2, 0),
    );
    let outcomes = run(&mut s);
    assert_eq!(
        outcomes,
        vec![
            Outcome::TalkSilent {
                target: DeviceClass::Mouse,
                register: 0,
            },
            talked(DeviceClass::Keyboard, 0, &[0x0C, 0xFF]),
        ]
    );
    assert!(s.bus().pulses().iter().any(|p| p.is_service_request()));
    assert_eq!(decode_response(s.bus().pulses()), vec![0x0C, 0xFF]);
}

#[test]
fn keyboard_backlog_shows_in_serial_status() {
    let mut s = session(Speed::Full, HostScript::new());
    let typed: Vec<u8> = (0x10..0x1A)
        .flat_map(|code: u8| [0x40 | (code & 0x0F), 0x50 | (code >> 4)])
        .chain([0x01])
        .collect();
    then(&mut s, &typed, HostScript::new());
    run(&mut s);
    assert_eq!(s.ingest_mut().channel_mut().take_sent(), vec![0x81]);

    let mut talks = HostScript::new();
    for _ in 0..5 {
        talks = talks.talk(2, 0);
    }
    then(&mut s, &[], talks);
    let outcomes = run(&mut s);
    assert_eq!(outcomes.len(), 5);
    assert_eq!(outcomes[0], talked(DeviceClass::Keyboard, 0, &[0x10, 0x11]));
    assert_eq!(outcomes[4], talked(DeviceClass::Keyboard, 0, &[0x18, 0x19]));

    then(&mut s, &[0x01], HostScript::new());
    run(&mut s);
    assert_eq!(s.ingest_mut().channel_mut().take_sent(), vec![0x80]);
}

#[test]
fn arbitrary_payload_from_serial_is_sent_once() {
    let mut s = session(Speed::Full, HostScript::new());
    // Bytes 0x21 and 0x34, then publish register 0 and ask for status.
    then(
        &mut s,
        &[0x21, 0x32, 0x24, 0x33, 0x02, 0x01],
        HostScript::new().talk(7, 0).talk(7, 0),
    );
    let outcomes = run(&mut s);
    assert_eq!(
        outcomes,
        vec![
            talked(DeviceClass::Arbitrary, 0, &[0x21, 0x34]),
            Outcome::TalkSilent {
                target: DeviceClass::Arbitrary,
                register: 0,
            },
        ]
    );
    assert_eq!(s.ingest_mut().channel_mut().take_sent(), vec![0x84]);
}

#[test]
fn host_written_register2_reads_back_over_serial() {
    let mut s = session(Speed::Half, HostScript::new());
    then(&mut s, &[], HostScript::new().listen(7, 2, &[0x9A, 0xBC]));
    assert_eq!(
        run(&mut s),
        vec![Outcome::Listened {
            target: DeviceClass::Arbitrary,
            register: 2,
            accepted: true,
        }]
    );

    then(&mut s, &[0x01, 0x0C, 0x0D, 0x0E, 0x0F], HostScript::new());
    run(&mut s);
    assert_eq!(
        s.ingest_mut().channel_mut().take_sent(),
        vec![0x88, 0x4C, 0x5B, 0x6A, 0x79]
    );
}
