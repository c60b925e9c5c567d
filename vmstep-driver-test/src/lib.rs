
use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{self, Read, Write},
    rc::Rc,
};

#[derive(Debug)]
enum ReadEvent {
    Bytes(Vec<u8>),
    TimedOut,
    Closed,
}

// used to mock the byte stream to a controller board.
// read holds scripted events: chunks of bytes, read timeouts and a closed
// stream. write holds the bytes that are expected to be written, in order.
// writing anything that doesn't match panics, and so does writing when nothing
// is expected. reading with nothing scripted behaves like a serial port whose
// read timeout elapsed, so it returns io::ErrorKind::TimedOut.
//
// it doesn't need to be fast nor efficient, its just for testing. it needs to
// be easy
pub struct Interface {
    read: Rc<RefCell<VecDeque<ReadEvent>>>,
    write: Rc<RefCell<Vec<u8>>>,
}

impl Read for Interface {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut q = self.read.as_ref().borrow_mut();
        match q.pop_front() {
            None | Some(ReadEvent::TimedOut) => {
                Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"))
            }
            Some(ReadEvent::Closed) => {
                // once closed, stays closed
                q.push_front(ReadEvent::Closed);
                Ok(0)
            }
            Some(ReadEvent::Bytes(mut bytes)) => {
                if bytes.len() > buf.len() {
                    let rest = bytes.split_off(buf.len());
                    q.push_front(ReadEvent::Bytes(rest));
                }
                buf[..bytes.len()].copy_from_slice(&bytes);
                Ok(bytes.len())
            }
        }
    }
}

impl Write for Interface {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut q = self.write.as_ref().borrow_mut();
        if q.is_empty() {
            panic!("write was emtpy, tried to write {:?}", buf)
        } else if q.starts_with(buf) {
            q.drain(..buf.len());
            Ok(buf.len())
        } else {
            panic!("write didn't start with {:?}, write was {:?}", buf, q)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Clone for Interface {
    fn clone(&self) -> Self {
        Interface {
            read: self.read.clone(),
            write: self.write.clone(),
        }
    }
}

impl Default for Interface {
    fn default() -> Self {
        Self::new()
    }
}

impl Interface {
    pub fn new() -> Self {
        Interface {
            read: Rc::new(RefCell::new(VecDeque::new())),
            write: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn add_read(&mut self, buf: &[u8]) {
        self.read
            .as_ref()
            .borrow_mut()
            .push_back(ReadEvent::Bytes(buf.to_vec()))
    }

    /// Next read fails with [`io::ErrorKind::TimedOut`]
    pub fn add_timeout(&mut self) {
        self.read.as_ref().borrow_mut().push_back(ReadEvent::TimedOut)
    }

    /// Every read from here on returns end of stream
    pub fn add_disconnect(&mut self) {
        self.read.as_ref().borrow_mut().push_back(ReadEvent::Closed)
    }

    pub fn add_write(&mut self, buf: &[u8]) {
        self.write.as_ref().borrow_mut().extend_from_slice(buf)
    }

    /// Expects `request` to be written and answers it with `reply`
    pub fn add_exchange(&mut self, request: &[u8], reply: &[u8]) {
        self.add_write(request);
        self.add_read(reply);
    }

    /// True once every scripted write happened and every scripted chunk of
    /// bytes was read. Pending timeouts and disconnects don't count.
    pub fn is_empty(&self) -> bool {
        self.write.as_ref().borrow().is_empty()
            && !self
                .read
                .as_ref()
                .borrow()
                .iter()
                .any(|e| matches!(e, ReadEvent::Bytes(_)))
    }
}
