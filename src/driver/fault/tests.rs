use super::{decode, FaultRegisters, FaultReport};
use nom::Finish;

#[test]
fn no_bits() {
    assert_eq!(decode(0, 0, 0), FaultReport::NoFaults);
}

#[test]
fn reserved_bits_are_ignored() {
    assert_eq!(decode(0, 0, 0b1000_0100), FaultReport::NoFaults);
}

#[test]
fn motor_stall() {
    assert_eq!(decode(0b100, 0, 0), FaultReport::Conditions(vec!["Motor stall"]));
}

#[test]
fn open_load() {
    assert_eq!(decode(1, 0, 0).conditions(), ["Open load"]);
}

#[test]
fn order_is_register_then_high_bit_first() {
    let r = decode(0b1000_0001, 0b0000_0011, 0b0100_0001);
    assert_eq!(
        r.conditions(),
        [
            "FAULT pin active",
            "Open load",
            "Overcurrent on AOUT low-side FET 1",
            "Overcurrent on AOUT high-side FET 1",
            "Overtemperature warning",
            "Open load on AOUT",
        ]
    );
}

#[test]
fn all_bits() {
    let r = decode(0xff, 0xff, 0xff);
    assert_eq!(r.conditions().len(), 8 + 8 + 6);
    assert!(r.is_fault());
}

#[test]
fn display() {
    assert_eq!(format!("{}", FaultReport::NoFaults), "No faults detected");
    assert_eq!(
        format!("{}", decode(0b1100, 0, 0)),
        "Overcurrent\nMotor stall"
    );
}

#[test]
fn registers_parse() {
    let (rem, r) = FaultRegisters::parse(&[1, 2, 3, 4]).finish().unwrap();
    assert_eq!(r, FaultRegisters::from((1, 2, 3)));
    assert_eq!(rem, [4]);
}

#[test]
#[should_panic]
fn registers_parse_short() {
    let (_, _) = FaultRegisters::parse(&[1, 2]).finish().unwrap();
}

#[test]
fn registers_report() {
    assert_eq!(
        FaultRegisters::from((0, 0, 0b1000)).report(),
        FaultReport::Conditions(vec!["Motor stall detected"])
    );
}
