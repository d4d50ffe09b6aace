//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::constants::{FPS, FRQ, IMAGE_RES};

/// Pipeline and server configuration options.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the correlator connects to.
    pub bind_addr: SocketAddr,

    /// Antenna position table (one XYZ row per antenna).
    pub antenna_table: PathBuf,

    /// Central observation frequency in Hz.
    pub frequency_hz: f64,

    /// Which of the interleaved polarizations to image.
    pub polarization: usize,

    /// Sky image resolution in pixels.
    pub image_size: usize,

    /// Directory the disk sink writes artifacts into.
    pub media_root: PathBuf,

    /// Streaming destination URL; `None` disables the stream sink.
    pub stream_destination: Option<String>,

    /// Maximum concurrent compute workers.
    pub max_in_flight: usize,

    /// Encoder output frame rate.
    pub encoder_fps: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".parse().expect("valid literal address"),
            antenna_table: PathBuf::from("lba_outer.dat"),
            frequency_hz: FRQ,
            polarization: 0,
            image_size: IMAGE_RES,
            media_root: PathBuf::from("."),
            stream_destination: None,
            max_in_flight: 4,
            encoder_fps: FPS,
        }
    }
}

impl ServerConfig {
    /// Create a new config with a custom bind address.
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address.
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the antenna position table path.
    pub fn antenna_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.antenna_table = path.into();
        self
    }

    /// Set the observation frequency in Hz.
    pub fn frequency(mut self, hz: f64) -> Self {
        self.frequency_hz = hz;
        self
    }

    /// Set the polarization index to image.
    pub fn polarization(mut self, pol: usize) -> Self {
        self.polarization = pol;
        self
    }

    /// Set the artifact output directory.
    pub fn media_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.media_root = path.into();
        self
    }

    /// Enable the streaming sink.
    pub fn stream_destination(mut self, url: impl Into<String>) -> Self {
        self.stream_destination = Some(url.into());
        self
    }

    /// Set the compute worker limit.
    pub fn max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max.max(1);
        self
    }

    /// Set the encoder frame rate.
    pub fn encoder_fps(mut self, fps: u32) -> Self {
        self.encoder_fps = fps;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.frequency_hz, FRQ);
        assert_eq!(config.polarization, 0);
        assert_eq!(config.image_size, IMAGE_RES);
        assert_eq!(config.max_in_flight, 4);
        assert_eq!(config.encoder_fps, FPS);
        assert!(config.stream_destination.is_none());
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:5001".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr.port(), 5001);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .antenna_table("/etc/allsky/lba_outer.dat")
            .frequency(61_523_437.5)
            .polarization(1)
            .media_root("/var/lib/allsky")
            .stream_destination("rtmp://localhost/live/allsky")
            .max_in_flight(8)
            .encoder_fps(30);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(
            config.antenna_table,
            PathBuf::from("/etc/allsky/lba_outer.dat")
        );
        assert_eq!(config.frequency_hz, 61_523_437.5);
        assert_eq!(config.polarization, 1);
        assert_eq!(config.media_root, PathBuf::from("/var/lib/allsky"));
        assert_eq!(
            config.stream_destination.as_deref(),
            Some("rtmp://localhost/live/allsky")
        );
        assert_eq!(config.max_in_flight, 8);
        assert_eq!(config.encoder_fps, 30);
    }

    #[test]
    fn test_max_in_flight_floor() {
        let config = ServerConfig::default().max_in_flight(0);
        assert_eq!(config.max_in_flight, 1);
    }
}
