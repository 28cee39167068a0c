//! Example: Reading values from a PLC data block
//!
//! Run with: cargo run --example simple_read -- <plc-ip> [port]
//!
//! Set RUST_LOG=s7_db=trace to see every frame.

use s7_db::{Client, ClientConfig, DataType, Tag};
use tracing_subscriber::EnvFilter;

fn main() -> s7_db::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "192.168.0.1".to_string());
    let port = args
        .next()
        .and_then(|p| p.parse().ok())
        .unwrap_or(s7_db::DEFAULT_S7_PORT);

    let mut client = Client::new(ClientConfig::from_host(&host, port)?);
    client.connect()?;

    println!("DB10.DBX0.0 = {}", client.read_bit(10, 0, 0)?);
    println!("DB10.DBB1   = {}", client.read_byte(10, 1)?);
    println!("DB10.DBW2   = {}", client.read_int(10, 2)?);
    println!("DB10.DBD4   = {:.3}", client.read_float(10, 4)?);
    println!("DB10.8 (20) = \"{}\"", client.read_string(10, 8, 20)?);

    let block = client.read_block(10, 30, 8)?;
    println!("DB10.30 (8) = {}", s7_db::utils::bytes_to_hex(&block));

    // Tag types as a form would submit them
    let data_type: DataType = "integer".parse()?;
    let value = client.read(&Tag::new(10, 2, data_type))?;
    println!("tag {} = {}", data_type, value);

    client.disconnect();
    Ok(())
}
