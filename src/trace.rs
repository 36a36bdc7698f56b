use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result, bail};

#[derive(Debug, Clone)]
pub struct TraceFile {
    pub name: String,
    pub addresses: Vec<u64>,
}

impl TraceFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Unable to open trace file {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut addresses = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.context("Failed to read line from trace")?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let mut parts = trimmed.split_whitespace();
            let token = parts
                .next()
                .with_context(|| format!("Trace line {} missing address", idx + 1))?;
            if parts.next().is_some() {
                bail!("Trace line {} has extra tokens", idx + 1);
            }
            let address = parse_address(token).with_context(|| {
                format!("Trace line {}: invalid address literal '{}'", idx + 1, token)
            })?;
            addresses.push(address);
        }
        Ok(Self {
            name: path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            addresses,
        })
    }
}

fn parse_address(token: &str) -> io::Result<u64> {
    let token = token.trim();
    let invalid = |e: std::num::ParseIntError| io::Error::new(io::ErrorKind::InvalidData, e);
    let prefixed = [("0x", 16), ("0X", 16), ("0b", 2), ("0B", 2), ("0o", 8), ("0O", 8)]
        .into_iter()
        .find_map(|(prefix, radix)| token.strip_prefix(prefix).map(|digits| (digits, radix)));
    match prefixed {
        Some((digits, radix)) => u64::from_str_radix(digits, radix).map_err(invalid),
        // Bare tokens read as hex first, the usual trace encoding, then decimal.
        None => u64::from_str_radix(token, 16).or_else(|_| token.parse::<u64>().map_err(invalid)),
    }
}
