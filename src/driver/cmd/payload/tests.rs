use super::{parse_position, HomeDirection, LimitFlags, MicrostepResolution, Settings};
use crate::driver::DriverError;
use std::time::Duration;

fn example() -> Settings {
    Settings {
        run_current: 1,
        sleep_current: 0,
        microstep_res: 7,
        sleep_timeout: 100,
        top_speed: 40000,
        acceleration: 200000,
        flags: LimitFlags {
            home_enable: true,
            ..Default::default()
        },
    }
}

#[test]
fn settings_pack() {
    let bytes = example().pack();
    let expected = [
        0x01, 0x07, 100, 0x40, 0x9c, 0x00, 0x00, 0x40, 0x0d, 0x03, 0x00, 0b100,
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn settings_pack_currents_share_a_byte() {
    let s = Settings {
        run_current: 0x3,
        sleep_current: 0xa,
        ..example()
    };
    assert_eq!(s.pack()[0], 0xa3);
}

#[test]
fn settings_unpack() {
    let bytes = [
        0x01, 0x07, 100, 0x40, 0x9c, 0x00, 0x00, 0x40, 0x0d, 0x03, 0x00, 0b100,
    ];
    assert_eq!(Settings::unpack(&bytes).unwrap(), example());
}

#[test]
fn settings_roundtrip_extremes() {
    let all_set = Settings {
        run_current: 15,
        sleep_current: 15,
        microstep_res: 15,
        sleep_timeout: u8::MAX,
        top_speed: u32::MAX,
        acceleration: u32::MAX,
        flags: LimitFlags::from(0x3f),
    };
    for s in [Settings::default(), example(), all_set] {
        assert_eq!(Settings::unpack(&s.pack()).unwrap(), s);
    }
}

#[test]
fn settings_bytes_roundtrip() {
    // reserved bits clear, everything else arbitrary
    let bytes = [
        0x5c, 0x0a, 0x01, 0xde, 0xad, 0xbe, 0xef, 0x01, 0x02, 0x03, 0x04, 0x2a,
    ];
    assert_eq!(Settings::unpack(&bytes).unwrap().pack(), bytes);
}

#[test]
fn settings_unpack_ignores_reserved_bits() {
    let mut bytes = example().pack();
    bytes[1] |= 0xf0;
    bytes[11] |= 0xc0;
    let s = Settings::unpack(&bytes).unwrap();
    assert_eq!(s, example());
    // and they are written back as zero
    assert_eq!(s.pack(), example().pack());
}

#[test]
fn settings_unpack_wrong_length() {
    for len in [0, 1, Settings::SIZE - 1, Settings::SIZE + 1, 64] {
        let bytes = vec![0u8; len];
        assert!(matches!(
            Settings::unpack(&bytes),
            Err(DriverError::InvalidLength { expected: 12, actual }) if actual == len
        ));
    }
}

#[test]
fn settings_pack_truncates_oversized_fields() {
    let s = Settings {
        run_current: 0x1f,
        microstep_res: 0x12,
        ..example()
    };
    let bytes = s.pack();
    assert_eq!(bytes[0], 0x0f);
    assert_eq!(bytes[1], 0x02);
}

#[test]
fn settings_default_is_firmware_default() {
    let s = Settings::default();
    assert_eq!(s.microstep_resolution(), Some(MicrostepResolution::S16));
    assert_eq!(s.sleep_timeout_duration(), Duration::from_secs(1));
    assert_eq!(s.top_speed, 2000);
    assert_eq!(s.acceleration, 4000);
}

#[test]
fn settings_validate() {
    assert!(example().validate());
    let mut s = example();
    s.run_current = 16;
    assert!(!s.validate());
    let mut s = example();
    s.microstep_res = 11;
    assert!(!s.validate());
    assert_eq!(s.microstep_resolution(), None);
    s.set_microstep_resolution(MicrostepResolution::S256);
    assert!(s.validate());
    assert_eq!(s.microstep_res, 10);
}

//

#[test]
fn limitflags_bits() {
    let flags = LimitFlags {
        limit1_enable: true,
        limit2_polarity: true,
        ..Default::default()
    };
    assert_eq!(u8::from(flags), 0b10001);
    assert_eq!(LimitFlags::from(0b10001), flags);
}

#[test]
fn limitflags_ignore_reserved() {
    assert_eq!(LimitFlags::from(0xc0), LimitFlags::default());
}

#[test]
fn microsteps() {
    assert_eq!(MicrostepResolution::Full71.microsteps(), 1);
    assert_eq!(MicrostepResolution::Half.microsteps(), 2);
    assert_eq!(MicrostepResolution::S32.microsteps(), 32);
    assert_eq!(format!("{}", MicrostepResolution::S32), "7");
}

#[test]
fn homedirection_fmt() {
    assert_eq!(format!("{}", HomeDirection::Positive), "1");
}

//

#[test]
fn position_parse() {
    assert_eq!(parse_position(&(-830i32).to_le_bytes()).unwrap(), -830);
    assert_eq!(parse_position(&[0xff, 0xff, 0xff, 0x7f]).unwrap(), i32::MAX);
}

#[test]
fn position_parse_wrong_length() {
    assert!(matches!(
        parse_position(&[1, 2, 3]),
        Err(DriverError::MalformedReply(_))
    ));
    assert!(matches!(
        parse_position(&[1, 2, 3, 4, 5]),
        Err(DriverError::MalformedReply(_))
    ));
}
