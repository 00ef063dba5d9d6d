use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

/// Default upload ceiling: 16 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Herbpedia classification server
#[derive(Parser, Debug, Clone)]
#[command(name = "herbpedia")]
#[command(version)]
#[command(about = "Classify plant photos and describe the matching herb")]
pub struct ServerConfig {
    /// Host to bind to
    #[arg(long, env = "HERBPEDIA_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "HERBPEDIA_PORT", default_value = "8000")]
    pub port: u16,

    /// ONNX classifier model
    #[arg(long, env = "HERBPEDIA_MODEL")]
    pub model: PathBuf,

    /// Label file (one per line, or a JSON array) in model output order.
    /// Falls back to labels embedded in the model, then the bundled list.
    #[arg(long, env = "HERBPEDIA_LABELS")]
    pub labels: Option<PathBuf>,

    /// Plant metadata JSON. Defaults to the bundled table.
    #[arg(long, env = "HERBPEDIA_METADATA")]
    pub metadata: Option<PathBuf>,

    /// Directory for per-request upload files
    #[arg(long, env = "HERBPEDIA_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "HERBPEDIA_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Reject best matches scoring below this value (0.0 to 1.0).
    /// Unset accepts any best match.
    #[arg(long, env = "HERBPEDIA_MIN_CONFIDENCE", value_parser = parse_confidence)]
    pub min_confidence: Option<f32>,
}

impl ServerConfig {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("herbpedia"))
    }
}

fn parse_confidence(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside 0.0..=1.0"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::try_parse_from(["herbpedia", "--model", "m.onnx"]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.model, PathBuf::from("m.onnx"));
        assert!(config.labels.is_none());
        assert!(config.metadata.is_none());
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.min_confidence.is_none());
        assert_eq!(config.addr().unwrap(), "0.0.0.0:8000".parse().unwrap());
    }

    #[test]
    fn model_is_required() {
        assert!(ServerConfig::try_parse_from(["herbpedia"]).is_err());
    }

    #[test]
    fn overrides() {
        let config = ServerConfig::try_parse_from([
            "herbpedia",
            "--model",
            "m.onnx",
            "--host",
            "127.0.0.1",
            "-p",
            "9001",
            "--labels",
            "labels.txt",
            "--scratch-dir",
            "/tmp/spool",
            "--min-confidence",
            "0.6",
        ])
        .unwrap();
        assert_eq!(config.addr().unwrap(), "127.0.0.1:9001".parse().unwrap());
        assert_eq!(config.labels, Some(PathBuf::from("labels.txt")));
        assert_eq!(config.scratch_dir(), PathBuf::from("/tmp/spool"));
        assert_eq!(config.min_confidence, Some(0.6));
    }

    #[test]
    fn confidence_out_of_range_is_rejected() {
        let result = ServerConfig::try_parse_from([
            "herbpedia",
            "--model",
            "m.onnx",
            "--min-confidence",
            "1.5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn bad_host_is_reported() {
        let config =
            ServerConfig::try_parse_from(["herbpedia", "--model", "m.onnx", "--host", "not a host"])
                .unwrap();
        assert!(config.addr().is_err());
    }
}
