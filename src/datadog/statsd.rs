//! DogStatsD timing client
//!
//! Datagram format: `<name>:<value>|ms[|@<rate>][|#<tag>,<tag>]`

use std::net::UdpSocket;
use tracing::debug;

use super::client::TimingEmitter;
use crate::config::StatsdConfig;
use crate::error::BackendError;

/// Format a DogStatsD timing datagram
pub fn format_timing(name: &str, duration_millis: i64, tags: &[String], sample_rate: f64) -> String {
    let mut line = format!("{}:{}|ms", name, duration_millis);
    if sample_rate < 1.0 {
        line.push_str(&format!("|@{}", sample_rate));
    }
    if !tags.is_empty() {
        line.push_str("|#");
        line.push_str(&tags.join(","));
    }
    line
}

/// Sends timings to a DogStatsD agent over UDP
pub struct DogStatsdClient {
    socket: UdpSocket,
    addr: String,
}

impl DogStatsdClient {
    pub fn new(config: &StatsdConfig) -> Result<Self, BackendError> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(&config.addr)?;
        Ok(Self {
            socket,
            addr: config.addr.clone(),
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl TimingEmitter for DogStatsdClient {
    fn emit_timing(
        &self,
        name: &str,
        duration_millis: i64,
        tags: &[String],
        sample_rate: f64,
    ) -> Result<(), BackendError> {
        let datagram = format_timing(name, duration_millis, tags, sample_rate);
        debug!(addr = %self.addr, metric = name, "Sending DogStatsD timing");
        self.socket.send(datagram.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_timing() {
        let tags = vec!["origin:spinnaker".to_string(), "app:someapp".to_string()];
        assert_eq!(
            format_timing("pipeline.duration", 1500, &tags, 1.0),
            "pipeline.duration:1500|ms|#origin:spinnaker,app:someapp"
        );
        assert_eq!(format_timing("pipeline.duration", -3, &[], 1.0), "pipeline.duration:-3|ms");
        assert_eq!(format_timing("x", 1, &[], 0.5), "x:1|ms|@0.5");
    }

    #[test]
    fn test_emit_timing_sends_datagram() {
        let agent = UdpSocket::bind("127.0.0.1:0").unwrap();
        agent.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let addr = agent.local_addr().unwrap().to_string();

        let client = DogStatsdClient::new(&StatsdConfig { addr: addr.clone() }).unwrap();
        assert_eq!(client.addr(), addr);
        client
            .emit_timing("pipeline.duration", 42, &["execution_id:someid".to_string()], 1.0)
            .unwrap();

        let mut buf = [0u8; 512];
        let n = agent.recv(&mut buf).unwrap();
        assert_eq!(
            std::str::from_utf8(&buf[..n]).unwrap(),
            "pipeline.duration:42|ms|#execution_id:someid"
        );
    }
}
