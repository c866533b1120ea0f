use adb_devices::{
    AdbDevice, Arbitrary, DeviceClass, DeviceConfig, DeviceMask, DeviceSet, Identity, Keyboard,
    Mouse, SerialDecoder, MAX_PAYLOAD,
};

fn talk(set: &mut DeviceSet, target: DeviceMask, register: u8) -> Vec<u8> {
    let mut out = [0u8; MAX_PAYLOAD];
    let n = set.talk(target, register, &mut out);
    assert!(n <= MAX_PAYLOAD);
    out[..n].to_vec()
}

#[test]
fn keyboard_talk_reports_pairs_then_drains_exactly_what_was_sent() {
    let mut set = DeviceSet::new(&DeviceConfig::default());
    let kbd = set.keyboard_mut().expect("keyboard enabled by default");
    for code in [0x0C, 0x8C, 0x0E] {
        kbd.key_event(code);
    }

    assert_eq!(talk(&mut set, DeviceMask::KEYBOARD, 0), vec![0x0C, 0x8C]);
    set.talk_drain(DeviceMask::KEYBOARD, 0);
    assert_eq!(talk(&mut set, DeviceMask::KEYBOARD, 0), vec![0x0E, 0xFF]);
    set.talk_drain(DeviceMask::KEYBOARD, 0);
    assert!(talk(&mut set, DeviceMask::KEYBOARD, 0).is_empty());
    assert!(set.needs_service().is_empty());
}

#[test]
fn every_class_answers_register3_with_its_identity() {
    let mut set = DeviceSet::new(&DeviceConfig::default());
    for class in DeviceClass::ALL {
        let Identity { address, handler } = set.identity(class).expect("class present");
        assert_eq!(
            talk(&mut set, class.mask(), 3),
            vec![0x60 | address, handler],
            "{}",
            class.name()
        );
    }
}

#[test]
fn flush_clears_registers_but_keeps_identity() {
    let mut set = DeviceSet::new(&DeviceConfig::default());
    if let Some(id) = set.identity_mut(DeviceClass::Arbitrary) {
        id.address = 11;
    }
    if let Some(arb) = set.arbitrary_mut() {
        arb.set_reg0(&[1, 2, 3]);
        arb.set_reg2(0xBEEF);
    }

    set.flush(DeviceMask::ARBITRARY);

    assert!(talk(&mut set, DeviceMask::ARBITRARY, 0).is_empty());
    assert_eq!(talk(&mut set, DeviceMask::ARBITRARY, 2), vec![0, 0]);
    assert_eq!(set.identity(DeviceClass::Arbitrary), Some(Identity::new(11, 0xFC)));
}

#[test]
fn mouse_drain_subtracts_only_the_reported_step() {
    let mut set = DeviceSet::new(&DeviceConfig::default());
    let mut decoder = SerialDecoder::new();
    // +9*16 on X.
    decoder.handle(0xA9, &mut set);

    let report = talk(&mut set, DeviceMask::MOUSE, 0);
    assert_eq!(report, vec![0x80, 0x80 | 0x3F]);

    // More motion arrives before the drain.
    decoder.handle(0x81, &mut set);
    set.talk_drain(DeviceMask::MOUSE, 0);
    assert_eq!(set.mouse().map(Mouse::pending_motion), Some((144 + 1 - 63, 0)));
}

#[test]
fn handler_acceptance_is_class_specific() {
    let kbd = Keyboard::new();
    assert!(kbd.accepts_handler(2));
    assert!(kbd.accepts_handler(3));
    assert!(!kbd.accepts_handler(1));
    assert!(!Mouse::new().accepts_handler(1));
    assert!(!Arbitrary::default().accepts_handler(0xFC));
}

#[test]
fn keyboard_only_configuration() {
    let config = DeviceConfig {
        mouse: false,
        arbitrary: false,
        ..DeviceConfig::default()
    };
    config.validate().expect("valid config");
    let set = DeviceSet::new(&config);
    assert_eq!(set.present(), DeviceMask::KEYBOARD);
    assert_eq!(set.addressed(2), DeviceMask::KEYBOARD);
    assert_eq!(set.addressed(7), DeviceMask::empty());
}
