//! Compact binary form of an [`AnalysisReport`].
//!
//! # Layout
//!
//! ```text
//! magic "PFER" (4) | version (1) | dropped_sequence_count u64
//! failed_sequences: u32 count, u64 each
//! methods: u32 count, then per method
//!   name (u32 len + UTF-8)
//!   networks: u32 count, then per network
//!     name, total_cost f64, total_wait_time_ms f64,
//!     total_request_bytes u64, total_response_bytes u64, total_request_count u64,
//!     4 x distribution (u32 count, then end u64 + count u64)
//!   categories: u32 count, then per category
//!     name, cost_per_sequence (u32 count + f64s),
//!     bytes_per_sequence (u32 count + f64s), sequence_ids (u32 count + u64s)
//! ```
//!
//! All integers and floats are little-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::distribution::Bucket;
use crate::error::ReportError;
use crate::report::{
    AnalysisReport, DistributionReport, MethodReport, NetworkCategoryReport, NetworkReport,
};

const MAGIC: [u8; 4] = *b"PFER";
const VERSION: u8 = 1;

pub fn encode(report: &AnalysisReport) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_slice(&MAGIC);
    buf.put_u8(VERSION);
    buf.put_u64_le(report.dropped_sequence_count as u64);
    put_u64s(&mut buf, report.failed_sequences.iter().map(|&i| i as u64));

    put_len(&mut buf, report.methods.len());
    for method in &report.methods {
        put_str(&mut buf, &method.method_name);

        put_len(&mut buf, method.results_by_network.len());
        for network in &method.results_by_network {
            put_str(&mut buf, &network.network_model_name);
            buf.put_f64_le(network.total_cost);
            buf.put_f64_le(network.total_wait_time_ms);
            buf.put_u64_le(network.total_request_bytes);
            buf.put_u64_le(network.total_response_bytes);
            buf.put_u64_le(network.total_request_count);
            put_distribution(&mut buf, &network.wait_per_page_view);
            put_distribution(&mut buf, &network.cost_per_page_view);
            put_distribution(&mut buf, &network.request_bytes_per_page_view);
            put_distribution(&mut buf, &network.response_bytes_per_page_view);
        }

        put_len(&mut buf, method.results_by_network_category.len());
        for category in &method.results_by_network_category {
            put_str(&mut buf, &category.category);
            put_f64s(&mut buf, &category.cost_per_sequence);
            put_f64s(&mut buf, &category.bytes_per_sequence);
            put_u64s(&mut buf, category.sequence_ids.iter().map(|&i| i as u64));
        }
    }
    buf.freeze()
}

pub fn decode(data: &[u8]) -> Result<AnalysisReport, ReportError> {
    let mut reader = Reader { buf: data };

    let magic: [u8; 4] = reader.array()?;
    if magic != MAGIC {
        return Err(ReportError::BadMagic(magic));
    }
    let version = reader.u8()?;
    if version != VERSION {
        return Err(ReportError::UnsupportedVersion(version));
    }

    let dropped_sequence_count = reader.u64()? as usize;
    let failed_sequences = reader.u64s()?.into_iter().map(|i| i as usize).collect();

    let method_count = reader.count()?;
    let mut methods = Vec::new();
    for _ in 0..method_count {
        let method_name = reader.string()?;

        let network_count = reader.count()?;
        let mut results_by_network = Vec::new();
        for _ in 0..network_count {
            results_by_network.push(NetworkReport {
                network_model_name: reader.string()?,
                total_cost: reader.f64()?,
                total_wait_time_ms: reader.f64()?,
                total_request_bytes: reader.u64()?,
                total_response_bytes: reader.u64()?,
                total_request_count: reader.u64()?,
                wait_per_page_view: reader.distribution()?,
                cost_per_page_view: reader.distribution()?,
                request_bytes_per_page_view: reader.distribution()?,
                response_bytes_per_page_view: reader.distribution()?,
            });
        }

        let category_count = reader.count()?;
        let mut results_by_network_category = Vec::new();
        for _ in 0..category_count {
            results_by_network_category.push(NetworkCategoryReport {
                category: reader.string()?,
                cost_per_sequence: reader.f64s()?,
                bytes_per_sequence: reader.f64s()?,
                sequence_ids: reader.u64s()?.into_iter().map(|i| i as usize).collect(),
            });
        }

        methods.push(MethodReport {
            method_name,
            results_by_network,
            results_by_network_category,
        });
    }

    if reader.buf.has_remaining() {
        return Err(ReportError::TrailingBytes(reader.buf.remaining()));
    }

    Ok(AnalysisReport {
        dropped_sequence_count,
        failed_sequences,
        methods,
    })
}

fn put_len(buf: &mut BytesMut, len: usize) {
    buf.put_u32_le(len as u32);
}

fn put_str(buf: &mut BytesMut, value: &str) {
    put_len(buf, value.len());
    buf.put_slice(value.as_bytes());
}

fn put_u64s(buf: &mut BytesMut, values: impl ExactSizeIterator<Item = u64>) {
    put_len(buf, values.len());
    for value in values {
        buf.put_u64_le(value);
    }
}

fn put_f64s(buf: &mut BytesMut, values: &[f64]) {
    put_len(buf, values.len());
    for value in values {
        buf.put_f64_le(*value);
    }
}

fn put_distribution(buf: &mut BytesMut, distribution: &DistributionReport) {
    put_len(buf, distribution.buckets.len());
    for bucket in &distribution.buckets {
        buf.put_u64_le(bucket.end);
        buf.put_u64_le(bucket.count);
    }
}

struct Reader<'a> {
    buf: &'a [u8],
}

impl Reader<'_> {
    fn need(&self, needed: usize) -> Result<(), ReportError> {
        if self.buf.remaining() < needed {
            return Err(ReportError::Truncated {
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], ReportError> {
        self.need(N)?;
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, ReportError> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    fn u64(&mut self) -> Result<u64, ReportError> {
        self.need(8)?;
        Ok(self.buf.get_u64_le())
    }

    fn f64(&mut self) -> Result<f64, ReportError> {
        self.need(8)?;
        Ok(self.buf.get_f64_le())
    }

    fn count(&mut self) -> Result<usize, ReportError> {
        self.need(4)?;
        Ok(self.buf.get_u32_le() as usize)
    }

    fn string(&mut self) -> Result<String, ReportError> {
        let len = self.count()?;
        self.need(len)?;
        let bytes = self.buf[..len].to_vec();
        self.buf.advance(len);
        Ok(String::from_utf8(bytes)?)
    }

    fn u64s(&mut self) -> Result<Vec<u64>, ReportError> {
        let len = self.count()?;
        self.need(len.saturating_mul(8))?;
        Ok((0..len).map(|_| self.buf.get_u64_le()).collect())
    }

    fn f64s(&mut self) -> Result<Vec<f64>, ReportError> {
        let len = self.count()?;
        self.need(len.saturating_mul(8))?;
        Ok((0..len).map(|_| self.buf.get_f64_le()).collect())
    }

    fn distribution(&mut self) -> Result<DistributionReport, ReportError> {
        let len = self.count()?;
        self.need(len.saturating_mul(16))?;
        let buckets = (0..len)
            .map(|_| Bucket {
                end: self.buf.get_u64_le(),
                count: self.buf.get_u64_le(),
            })
            .collect();
        Ok(DistributionReport { buckets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisReport {
        AnalysisReport {
            dropped_sequence_count: 1,
            failed_sequences: vec![3],
            methods: vec![MethodReport {
                method_name: "WholeFont".into(),
                results_by_network: vec![NetworkReport {
                    network_model_name: "desktop_fast".into(),
                    total_cost: 12.5,
                    total_wait_time_ms: 1234.25,
                    total_request_bytes: 70,
                    total_response_bytes: 50_070,
                    total_request_count: 2,
                    wait_per_page_view: DistributionReport {
                        buckets: vec![Bucket { end: 100, count: 1 }],
                    },
                    cost_per_page_view: DistributionReport::default(),
                    request_bytes_per_page_view: DistributionReport::default(),
                    response_bytes_per_page_view: DistributionReport {
                        buckets: vec![Bucket { end: 0, count: 0 }, Bucket { end: 51_000, count: 1 }],
                    },
                }],
                results_by_network_category: vec![NetworkCategoryReport {
                    category: "Desktop".into(),
                    cost_per_sequence: vec![0.1, 0.2],
                    bytes_per_sequence: vec![10.0, 20.0],
                    sequence_ids: vec![0, 1],
                }],
            }],
        }
    }

    #[test]
    fn test_binary_round_trip() {
        let report = sample();
        let encoded = encode(&report);
        assert_eq!(&encoded[..4], b"PFER");
        assert_eq!(decode(&encoded).unwrap(), report);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut encoded = encode(&sample()).to_vec();
        encoded[0] = b'X';
        assert!(matches!(decode(&encoded), Err(ReportError::BadMagic(_))));
    }

    #[test]
    fn test_rejects_truncated_and_trailing() {
        let encoded = encode(&sample()).to_vec();
        assert!(matches!(
            decode(&encoded[..encoded.len() - 3]),
            Err(ReportError::Truncated { .. })
        ));

        let mut padded = encoded.clone();
        padded.push(0);
        assert!(matches!(decode(&padded), Err(ReportError::TrailingBytes(1))));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut encoded = encode(&sample()).to_vec();
        encoded[4] = 9;
        assert!(matches!(
            decode(&encoded),
            Err(ReportError::UnsupportedVersion(9))
        ));
    }
}
