use crate::config::ScanConfig;
use crate::errors::ScoutError;
use network_interface::{NetworkInterface, NetworkInterfaceConfig};
use std::net::{IpAddr, Ipv4Addr};

/// Concurrent subnet scanning
pub mod scan {
    use super::*;
    use crate::model::TelemetryRecord;
    use crate::probe::NodeProbe;
    use futures::Stream;
    use log::info;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use std::time::Instant;
    use tokio::sync::mpsc;

    /// Fans a node probe out over every host address of a /24
    pub struct NetworkScanner {
        probe: Arc<dyn NodeProbe>,
        config: ScanConfig,
    }

    impl NetworkScanner {
        pub fn new(probe: Arc<dyn NodeProbe>, config: ScanConfig) -> Self {
            Self { probe, config }
        }

        /// Every address probed for `base_address`, e.g. "192.168.1.1" .. "192.168.1.255"
        pub fn candidate_addresses(&self, base_address: &str) -> Result<Vec<String>, ScoutError> {
            interface::parse_base_address(base_address)?;
            Ok((self.config.first_host..=self.config.last_host)
                .map(|host| format!("{}{}", base_address, host))
                .collect())
        }

        /// Start probing all candidate addresses at once.
        ///
        /// Found nodes are streamed in completion order as soon as each probe
        /// resolves; the stream ends once every probe has finished or timed
        /// out. Dropping the stream abandons the scan, probes still in
        /// flight run to completion in the background and their results are
        /// discarded. Must be called from within a tokio runtime.
        pub fn scan(&self, base_address: &str) -> Result<ScanStream, ScoutError> {
            let addresses = self.candidate_addresses(base_address)?;
            let total = addresses.len();
            let probe_timeout = self.config.scan_timeout();
            let (tx, rx) = mpsc::channel::<TelemetryRecord>(total.max(1));

            info!(
                "Scanning {}{}-{} with {} ({} hosts, {} ms timeout)",
                base_address,
                self.config.first_host,
                self.config.last_host,
                self.probe.name(),
                total,
                self.config.scan_timeout_ms
            );

            for address in addresses {
                let probe = self.probe.clone();
                let tx_clone = tx.clone();

                tokio::spawn(async move {
                    if let Some(record) = probe.probe(&address, probe_timeout).await {
                        // A dropped receiver means the caller abandoned the scan
                        let _ = tx_clone.send(record).await;
                    }
                });
            }

            // Close the sender channel
            drop(tx);

            Ok(ScanStream {
                rx,
                probed: total,
                found: 0,
                started: Instant::now(),
            })
        }
    }

    /// Partial results of one running scan
    pub struct ScanStream {
        rx: mpsc::Receiver<TelemetryRecord>,
        probed: usize,
        found: usize,
        started: Instant,
    }

    impl ScanStream {
        /// Number of addresses probed by this scan
        pub fn probed(&self) -> usize {
            self.probed
        }

        /// Wait for the next found node; `None` once all probes resolved
        pub async fn next_partial(&mut self) -> Option<TelemetryRecord> {
            let next = self.rx.recv().await;
            self.note(next.is_some());
            next
        }

        /// Drain the stream, handing every partial result to `on_partial`,
        /// and return the full batch
        pub async fn for_each_partial<F>(mut self, mut on_partial: F) -> Vec<TelemetryRecord>
        where
            F: FnMut(&TelemetryRecord),
        {
            let mut results = Vec::new();
            while let Some(record) = self.next_partial().await {
                on_partial(&record);
                results.push(record);
            }
            results
        }

        pub async fn collect_all(self) -> Vec<TelemetryRecord> {
            self.for_each_partial(|_| {}).await
        }

        fn note(&mut self, found: bool) {
            if found {
                self.found += 1;
            } else {
                info!(
                    "Scan finished: {} node(s) among {} hosts in {:.2}s",
                    self.found,
                    self.probed,
                    self.started.elapsed().as_secs_f64()
                );
            }
        }
    }

    impl Stream for ScanStream {
        type Item = TelemetryRecord;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            let polled = self.rx.poll_recv(cx);
            if let Poll::Ready(ref item) = polled {
                self.note(item.is_some());
            }
            polled
        }
    }
}

/// Local address detection and IPv4 helpers
pub mod interface {
    use super::*;
    use std::str::FromStr;

    /// Whether `ip` is a dotted quad with four numeric parts in 0..=255
    pub fn is_valid_ipv4(ip: &str) -> bool {
        let parts: Vec<&str> = ip.split('.').collect();
        parts.len() == 4
            && parts.iter().all(|p| {
                !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()) && p.parse::<u8>().is_ok()
            })
    }

    /// The /24 prefix of an address including the trailing dot, "192.168.1.42" -> "192.168.1."
    pub fn base_address(ip: &str) -> Result<String, ScoutError> {
        let ipv4 = Ipv4Addr::from_str(ip.trim())
            .map_err(|_| ScoutError::InvalidAddress(ip.to_string()))?;
        let [a, b, c, _] = ipv4.octets();
        Ok(format!("{}.{}.{}.", a, b, c))
    }

    /// Validate a scan prefix of the form "a.b.c." and return its octets
    pub fn parse_base_address(base: &str) -> Result<[u8; 3], ScoutError> {
        let invalid = || ScoutError::InvalidAddress(base.to_string());
        let stripped = base.strip_suffix('.').ok_or_else(invalid)?;
        let parts: Vec<&str> = stripped.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let mut octets = [0u8; 3];
        for (slot, part) in octets.iter_mut().zip(parts) {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }
        Ok(octets)
    }

    fn is_virtual(name: &str) -> bool {
        name.starts_with("lo") || name.starts_with("docker") || name.starts_with("veth")
    }

    /// First usable IPv4 of a physical-looking interface
    pub fn local_ipv4() -> Result<Option<Ipv4Addr>, ScoutError> {
        let interfaces = NetworkInterface::show()?;
        for interface in interfaces {
            if is_virtual(&interface.name) {
                continue;
            }
            for addr in &interface.addr {
                if let IpAddr::V4(ipv4) = addr.ip() {
                    if !ipv4.is_loopback() && !ipv4.is_unspecified() {
                        return Ok(Some(ipv4));
                    }
                }
            }
        }
        Ok(None)
    }

    /// List all available network interfaces and the scan prefix each one implies
    pub fn list_network_interfaces() -> Result<(), ScoutError> {
        let interfaces = NetworkInterface::show()?;
        println!("Available network interfaces:");
        for interface in interfaces {
            println!("  Interface: {}", interface.name);
            for addr in &interface.addr {
                if let IpAddr::V4(ipv4) = addr.ip() {
                    if !ipv4.is_loopback() && !ipv4.is_unspecified() {
                        let base = base_address(&ipv4.to_string())?;
                        println!("    IPv4: {} -> Scan range: {}1-255", ipv4, base);
                    }
                }
            }
        }
        Ok(())
    }

}
