//! Drives `Client` against an in-process PLC that keeps data block memory.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use s7_db::{Client, ClientConfig, ConnectionState, DataType, S7Error, Tag, Value};

const DB_SIZE: usize = 256;

type Memory = Arc<Mutex<HashMap<u16, Vec<u8>>>>;

/// Minimal S7-300 stand-in. Data blocks 1 and 10 exist; anything else is
/// answered with return code 0x0A (object does not exist).
struct MockPlc {
    addr: SocketAddr,
    memory: Memory,
}

impl MockPlc {
    fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let mut dbs = HashMap::new();
        dbs.insert(1, vec![0u8; DB_SIZE]);
        dbs.insert(10, vec![0u8; DB_SIZE]);
        let memory: Memory = Arc::new(Mutex::new(dbs));

        let shared = Arc::clone(&memory);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let memory = Arc::clone(&shared);
                thread::spawn(move || serve(stream, memory));
            }
        });

        Self { addr, memory }
    }

    fn config(&self) -> ClientConfig {
        ClientConfig::new(self.addr.ip())
            .with_port(self.addr.port())
            .with_read_delay(Duration::ZERO)
    }

    fn connected_client(&self) -> Client {
        let mut client = Client::new(self.config());
        client.connect().unwrap();
        client
    }

    fn poke(&self, db: u16, offset: usize, bytes: &[u8]) {
        let mut memory = self.memory.lock().unwrap();
        let data = memory.get_mut(&db).unwrap();
        data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn peek(&self, db: u16, offset: usize, len: usize) -> Vec<u8> {
        let memory = self.memory.lock().unwrap();
        memory[&db][offset..offset + len].to_vec()
    }
}

fn read_frame(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut tpkt = [0u8; 4];
    stream.read_exact(&mut tpkt).ok()?;
    let len = usize::from(u16::from_be_bytes([tpkt[2], tpkt[3]]));
    let mut frame = tpkt.to_vec();
    frame.resize(len, 0);
    stream.read_exact(&mut frame[4..]).ok()?;
    Some(frame)
}

fn with_tpkt(mut body: Vec<u8>) -> Vec<u8> {
    let len = (body.len() + 4) as u16;
    let mut frame = vec![0x03, 0x00];
    frame.extend_from_slice(&len.to_be_bytes());
    frame.append(&mut body);
    frame
}

fn ack_data(param: &[u8], data: &[u8]) -> Vec<u8> {
    let mut body = vec![0x02, 0xF0, 0x80, 0x32, 0x03, 0x00, 0x00, 0x00, 0x00];
    body.extend_from_slice(&(param.len() as u16).to_be_bytes());
    body.extend_from_slice(&(data.len() as u16).to_be_bytes());
    body.extend_from_slice(&[0x00, 0x00]);
    body.extend_from_slice(param);
    body.extend_from_slice(data);
    with_tpkt(body)
}

fn serve(mut stream: TcpStream, memory: Memory) {
    while let Some(frame) = read_frame(&mut stream) {
        let reply = if frame[5] == 0xE0 {
            with_tpkt(vec![
                0x11, 0xD0, 0x00, 0x01, 0x00, 0x01, 0x00, 0xC0, 0x01, 0x0A, 0xC1, 0x02, 0x01,
                0x00, 0xC2, 0x02, 0x01, 0x01,
            ])
        } else {
            match frame[17] {
                0xF0 => ack_data(&[0xF0, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0xF0], &[]),
                0x04 => handle_read(&frame, &memory),
                0x05 => handle_write(&frame, &memory),
                _ => break,
            }
        };
        if stream.write_all(&reply).is_err() {
            break;
        }
    }
}

struct Item {
    bit: bool,
    size: usize,
    db: u16,
    offset: usize,
    bit_number: u8,
}

fn parse_item(frame: &[u8]) -> Item {
    let address = u32::from_be_bytes([0, frame[28], frame[29], frame[30]]);
    Item {
        bit: frame[22] == 0x01,
        size: usize::from(u16::from_be_bytes([frame[23], frame[24]])),
        db: u16::from_be_bytes([frame[25], frame[26]]),
        offset: (address >> 3) as usize,
        bit_number: (address & 0x07) as u8,
    }
}

fn handle_read(frame: &[u8], memory: &Memory) -> Vec<u8> {
    let item = parse_item(frame);
    let memory = memory.lock().unwrap();
    let Some(db) = memory.get(&item.db) else {
        return ack_data(&[0x04, 0x01], &[0x0A, 0x00, 0x00, 0x00]);
    };

    let (transport, bit_len, data) = if item.bit {
        let value = (db[item.offset] >> item.bit_number) & 0x01;
        (0x03, 1u16, vec![value])
    } else {
        let data = db[item.offset..item.offset + item.size].to_vec();
        (0x04, (item.size as u16) << 3, data)
    };

    let mut payload = vec![0xFF, transport];
    payload.extend_from_slice(&bit_len.to_be_bytes());
    payload.extend_from_slice(&data);
    ack_data(&[0x04, 0x01], &payload)
}

fn handle_write(frame: &[u8], memory: &Memory) -> Vec<u8> {
    let item = parse_item(frame);
    let payload = &frame[35..];
    let mut memory = memory.lock().unwrap();
    let Some(db) = memory.get_mut(&item.db) else {
        return ack_data(&[0x05, 0x01], &[0x0A]);
    };

    if item.bit {
        let mask = 1u8 << item.bit_number;
        if payload[0] & 0x01 == 1 {
            db[item.offset] |= mask;
        } else {
            db[item.offset] &= !mask;
        }
    } else {
        db[item.offset..item.offset + payload.len()].copy_from_slice(payload);
    }
    ack_data(&[0x05, 0x01], &[0xFF])
}

#[test]
fn connect_and_disconnect() {
    let plc = MockPlc::start();
    let mut client = Client::new(plc.config());
    assert_eq!(client.state(), ConnectionState::Disconnected);

    client.connect().unwrap();
    assert_eq!(client.state(), ConnectionState::SessionReady);
    assert!(client.is_connected());

    client.disconnect();
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(matches!(
        client.read_int(1, 0),
        Err(S7Error::NotConnected { .. })
    ));
    assert!(matches!(
        client.write_int(1, 0, 5),
        Err(S7Error::NotConnected { .. })
    ));
}

#[test]
fn reconnect_after_disconnect() {
    let plc = MockPlc::start();
    let mut client = plc.connected_client();
    assert!(client.write_int(1, 0, 1234).unwrap());
    client.disconnect();

    client.connect().unwrap();
    assert_eq!(client.read_int(1, 0).unwrap(), 1234);
}

#[test]
fn connect_twice_replaces_session() {
    let plc = MockPlc::start();
    let mut client = plc.connected_client();
    client.connect().unwrap();
    assert!(client.write_byte(1, 3, 7).unwrap());
    assert_eq!(client.read_byte(1, 3).unwrap(), 7);
}

#[test]
fn integer_roundtrip() {
    let plc = MockPlc::start();
    let mut client = plc.connected_client();

    assert!(client.write_int(1, 10, -1).unwrap());
    assert_eq!(plc.peek(1, 10, 2), vec![0xFF, 0xFF]);
    assert_eq!(client.read_int(1, 10).unwrap(), -1);

    assert!(client.write_int(1, 10, i16::MIN).unwrap());
    assert_eq!(client.read_int(1, 10).unwrap(), i16::MIN);
}

#[test]
#[allow(clippy::approx_constant)]
fn float_roundtrip() {
    let plc = MockPlc::start();
    let mut client = plc.connected_client();

    assert!(client.write_float(1, 20, 3.14).unwrap());
    let value = client.read_float(1, 20).unwrap();
    assert_eq!(value.to_bits(), 3.14f32.to_bits());
}

#[test]
fn byte_roundtrip() {
    let plc = MockPlc::start();
    let mut client = plc.connected_client();

    assert!(client.write_byte(1, 30, -100).unwrap());
    assert_eq!(plc.peek(1, 30, 1), vec![0x9C]);
    assert_eq!(client.read_byte(1, 30).unwrap(), -100);
}

#[test]
fn bit_roundtrip_leaves_neighbours() {
    let plc = MockPlc::start();
    plc.poke(1, 8, &[0b1000_0001]);
    let mut client = plc.connected_client();

    assert!(client.write_bit(1, 8, 3, true).unwrap());
    assert_eq!(plc.peek(1, 8, 1), vec![0b1000_1001]);
    assert!(client.read_bit(1, 8, 3).unwrap());
    assert!(client.read_bit(1, 8, 7).unwrap());
    assert!(!client.read_bit(1, 8, 2).unwrap());

    assert!(client.write_bit(1, 8, 3, false).unwrap());
    assert!(!client.read_bit(1, 8, 3).unwrap());
}

#[test]
fn string_roundtrip() {
    let plc = MockPlc::start();
    let mut client = plc.connected_client();

    assert!(client.write_string(1, 40, 12, "  BATCH-7 ").unwrap());
    assert_eq!(&plc.peek(1, 40, 9), &[12, 7, b'B', b'A', b'T', b'C', b'H', b'-', b'7']);
    assert_eq!(client.read_string(1, 40, 12).unwrap(), "BATCH-7");
}

#[test]
fn string_roundtrip_at_full_capacity() {
    let plc = MockPlc::start();
    let mut client = plc.connected_client();

    assert!(client.write_string(1, 40, 12, "ABCDEFGHIJKL").unwrap());
    assert_eq!(client.read_string(1, 40, 12).unwrap(), "ABCDEFGHIJKL");
}

#[test]
fn string_roundtrip_with_printable_capacity_byte() {
    let plc = MockPlc::start();
    let mut client = plc.connected_client();

    assert!(client.write_string(1, 40, 40, "hello").unwrap());
    assert_eq!(plc.peek(1, 40, 2), vec![40, 5]);
    assert_eq!(client.read_string(1, 40, 40).unwrap(), "hello");

    assert!(client.write_string(1, 100, 33, "x").unwrap());
    assert_eq!(client.read_string(1, 100, 33).unwrap(), "x");
}

#[test]
fn string_longer_than_capacity_is_cut() {
    let plc = MockPlc::start();
    let mut client = plc.connected_client();

    assert!(client.write_string(1, 60, 4, "0123456789").unwrap());
    assert_eq!(plc.peek(1, 60, 6), vec![4, 4, b'0', b'1', b'2', b'3']);
    assert_eq!(client.read_string(1, 60, 4).unwrap(), "0123");
}

#[test]
fn string_read_stops_at_stored_length() {
    let plc = MockPlc::start();
    plc.poke(1, 70, &[10, 3, b'a', b'b', b'c', b'x', b'y', b'z']);
    let mut client = plc.connected_client();

    assert_eq!(client.read_string(1, 70, 10).unwrap(), "abc");
}

#[test]
fn block_roundtrip() {
    let plc = MockPlc::start();
    let mut client = plc.connected_client();

    assert!(client.write_block(10, 0, 4, &[0xDE, 0xAD, 0xBE, 0xEF]).unwrap());
    assert_eq!(client.read_block(10, 0, 4).unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);

    assert!(client.write_block_hex(10, 4, 2, "0A1F").unwrap());
    assert_eq!(client.read_block(10, 4, 2).unwrap(), vec![0x0A, 0x1F]);
}

#[test]
fn block_hex_rejects_odd_length() {
    let plc = MockPlc::start();
    let mut client = plc.connected_client();

    let err = client.write_block_hex(10, 0, 2, "0A1").unwrap_err();
    assert!(matches!(err, S7Error::InvalidEncoding { .. }));
    assert!(client.is_connected());
}

#[test]
fn generic_tags() {
    let plc = MockPlc::start();
    let mut client = plc.connected_client();

    let cases = [
        (Tag::bit(1, 100, 5), Value::Bit(true)),
        (Tag::new(1, 101, DataType::Byte), Value::Byte(-3)),
        (Tag::new(1, 102, DataType::Integer), Value::Integer(4242)),
        (Tag::new(1, 104, DataType::Float), Value::Float(-0.5)),
        (
            Tag::new(1, 110, DataType::String(16)),
            Value::String("line A".into()),
        ),
        (
            Tag::new(1, 130, DataType::Block(3)),
            Value::Block(vec![1, 2, 3]),
        ),
    ];

    for (tag, value) in &cases {
        assert!(client.write(tag, value).unwrap(), "write {}", tag);
        assert_eq!(&client.read(tag).unwrap(), value, "read {}", tag);
    }
}

#[test]
fn write_rejects_mismatched_value() {
    let plc = MockPlc::start();
    let mut client = plc.connected_client();

    let tag = Tag::new(1, 0, DataType::Integer);
    let err = client.write(&tag, &Value::Float(1.0)).unwrap_err();
    assert!(matches!(err, S7Error::TypeMismatch { .. }));
}

#[test]
fn unknown_db_is_reported() {
    let plc = MockPlc::start();
    let mut client = plc.connected_client();

    assert!(!client.write_int(99, 0, 1).unwrap());
    let err = client.read_int(99, 0).unwrap_err();
    assert!(matches!(err, S7Error::Protocol { .. }));
}

#[test]
fn default_read_delay_is_applied() {
    let plc = MockPlc::start();
    let mut client = Client::new(plc.config().with_read_delay(s7_db::DEFAULT_READ_DELAY));
    client.connect().unwrap();

    let start = std::time::Instant::now();
    client.read_int(1, 0).unwrap();
    assert!(start.elapsed() >= s7_db::DEFAULT_READ_DELAY);
}
