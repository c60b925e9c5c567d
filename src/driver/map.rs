//! Tag bytes of the wire protocol

macro_rules! maketag {
    ($($name:ident, $val:literal),*) => {
        $(pub const $name: u8 = $val;)*
    };
}

// frame delimiters
#[rustfmt::skip]
maketag!(
    START_MARKER, b'[',
    END_MARKER, b']'
);

// commands
#[rustfmt::skip]
maketag!(
    GOTO, b'G',
    STOP, b'S',
    HOME, b'H',
    RESET, b'R',
    QUERY, b'Q',
    UPDATE_PARAMETERS, b'P',
    ECHO, b'E',
    ENABLE, b'Y',
    DISABLE, b'X',
    RESET_POSITION, b'Z'
);

// query selectors, sent as the argument of QUERY
#[rustfmt::skip]
maketag!(
    QUERY_MODEL_NO, b'M',
    QUERY_SERIAL_NO, b'S',
    QUERY_FIRMWARE, b'W',
    QUERY_PARAMETERS, b'P',
    QUERY_FAULTS, b'F',
    QUERY_POSITION, b'X',
    QUERY_MODE, b'T',
    QUERY_FAULT_REGS, b'R'
);

// first byte of every reply
#[rustfmt::skip]
maketag!(
    REPLY_ACK, b'A',
    REPLY_DONE, b'D',
    REPLY_FAULT, b'F',
    REPLY_ECHO, b'E'
);

// second byte of a FAULT reply
#[rustfmt::skip]
maketag!(
    FAULT_NACK, b'N',
    FAULT_DRIVER, b'D',
    FAULT_INVALID_PARAMETERS, b'P',
    FAULT_DRIVER_SYNC, b'Y',
    FAULT_LIMIT1, b'L',
    FAULT_LIMIT2, b'K',
    FAULT_HOME, b'H'
);
