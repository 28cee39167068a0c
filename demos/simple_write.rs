//! Example: Writing values to a PLC data block
//!
//! Run with: cargo run --example simple_write -- <plc-ip> [port]

use s7_db::{Client, ClientConfig};
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

    let results = [
        ("DB10.DBX0.0", client.write_bit(10, 0, 0, true)?),
        ("DB10.DBB1", client.write_byte(10, 1, -12)?),
        ("DB10.DBW2", client.write_int(10, 2, 1500)?),
        ("DB10.DBD4", client.write_float(10, 4, 21.75)?),
        ("DB10.8", client.write_string(10, 8, 20, "PRODUCT-001")?),
        ("DB10.30", client.write_block_hex(10, 30, 4, "DEADBEEF")?),
    ];

    for (address, ok) in results {
        println!("{:<12} {}", address, if ok { "OK" } else { "rejected" });
    }

    client.disconnect();
    Ok(())
}
