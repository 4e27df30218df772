//! Datasets and Mini-Batching
//!
//! Small synthetic problems used by the demo programs and tests, a reader for
//! the binary dataset format, and a mini-batch iterator.
//!
//! ## Binary Format
//!
//! ```text
//! i32 n, i32 in_dim, i32 out_dim      # native endian
//! f64 × n·in_dim                      # inputs, row-major
//! f64 × n·out_dim                     # targets, row-major
//! ```
//!
//! Classification files store one target column holding the class index.

use crate::error::{Error, Result};
use crate::matrix::Matrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// The four XOR points with their 0/1 targets
pub fn xor() -> (Matrix, Matrix) {
    let x = Matrix::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0], 4, 2);
    let y = Matrix::new(vec![0.0, 1.0, 1.0, 0.0], 4, 1);
    (x, y)
}

/// Two interleaved spirals, `per_class` points each
///
/// Point `i` of class 0 sits at radius `5·i/n` and angle `1.75·π·i/n`; class 1
/// is the same curve rotated by π. Each coordinate gets uniform noise in
/// ±0.05. Rows `0..per_class` are class 0, the rest class 1.
pub fn spirals(per_class: usize, seed: u64) -> (Matrix, Matrix) {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = per_class * 2;
    let mut x = Matrix::zeros(n, 2);
    let mut y = Matrix::zeros(n, 1);

    for i in 0..per_class {
        let frac = i as f64 / per_class as f64;
        let r = frac * 5.0;
        let t = 1.75 * frac * PI;

        for (class, angle) in [(0usize, t), (1, t + PI)] {
            let row = i + class * per_class;
            x.data[row * 2] = r * angle.cos() + rng.random_range(-0.05..0.05);
            x.data[row * 2 + 1] = r * angle.sin() + rng.random_range(-0.05..0.05);
            y.data[row] = class as f64;
        }
    }

    (x, y)
}

fn read_i32<R: Read>(reader: &mut R) -> std::io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_ne_bytes(buf))
}

fn read_f64s<R: Read>(reader: &mut R, count: usize) -> std::io::Result<Vec<f64>> {
    let mut bytes = vec![0u8; count * 8];
    reader.read_exact(&mut bytes)?;
    Ok(bytes
        .chunks_exact(8)
        .map(|b| f64::from_ne_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
        .collect())
}

/// Load `(inputs, targets)` from a binary dataset file
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be opened, [`Error::Dataset`] if the header
/// is invalid or the file is shorter than the header promises. The size check
/// runs before any buffer is allocated.
pub fn load_binary<P: AsRef<Path>>(path: P) -> Result<(Matrix, Matrix)> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let dataset_err = |reason: String| Error::Dataset {
        path: path.to_path_buf(),
        reason,
    };

    let mut header = [0i32; 3];
    for h in header.iter_mut() {
        *h = read_i32(&mut reader).map_err(|e| dataset_err(format!("truncated header: {}", e)))?;
    }
    let [n, in_dim, out_dim] = header;
    if n < 0 || in_dim <= 0 || out_dim <= 0 {
        return Err(dataset_err(format!(
            "invalid header n={} in_dim={} out_dim={}",
            n, in_dim, out_dim
        )));
    }
    let (n, in_dim, out_dim) = (n as usize, in_dim as usize, out_dim as usize);

    let x_len = n.checked_mul(in_dim);
    let y_len = n.checked_mul(out_dim);
    let expected = x_len
        .zip(y_len)
        .and_then(|(a, b)| a.checked_add(b))
        .and_then(|values| values.checked_mul(8))
        .and_then(|bytes| bytes.checked_add(12))
        .ok_or_else(|| {
            dataset_err(format!(
                "header size overflows: n={} in_dim={} out_dim={}",
                n, in_dim, out_dim
            ))
        })?;
    let actual = reader.get_ref().metadata()?.len();
    if actual < expected as u64 {
        return Err(dataset_err(format!(
            "header promises {} bytes but the file has {}",
            expected, actual
        )));
    }

    let x = read_f64s(&mut reader, n * in_dim)
        .map_err(|e| dataset_err(format!("truncated inputs: {}", e)))?;
    let y = read_f64s(&mut reader, n * out_dim)
        .map_err(|e| dataset_err(format!("truncated targets: {}", e)))?;

    Ok((Matrix::new(x, n, in_dim), Matrix::new(y, n, out_dim)))
}

/// Write `(inputs, targets)` in the format read by [`load_binary`]
pub fn save_binary<P: AsRef<Path>>(path: P, x: &Matrix, y: &Matrix) -> Result<()> {
    assert_eq!(x.rows, y.rows, "Inputs and targets must have the same row count");
    let mut bytes = Vec::with_capacity(12 + 8 * (x.len() + y.len()));
    for v in [x.rows, x.cols, y.cols] {
        bytes.extend_from_slice(&(v as i32).to_ne_bytes());
    }
    for v in x.data.iter().chain(&y.data) {
        bytes.extend_from_slice(&v.to_ne_bytes());
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Iterator over contiguous mini-batches
///
/// Yields `(x, y)` row slices of `batch_size` rows; the last batch holds the
/// remainder and may be shorter.
pub struct Batches<'a> {
    x: &'a Matrix,
    y: &'a Matrix,
    batch_size: usize,
    position: usize,
}

impl<'a> Batches<'a> {
    /// # Panics
    ///
    /// Panics if `batch_size` is zero or the row counts differ
    pub fn new(x: &'a Matrix, y: &'a Matrix, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch_size must be at least 1");
        assert_eq!(x.rows, y.rows, "Inputs and targets must have the same row count");
        Self {
            x,
            y,
            batch_size,
            position: 0,
        }
    }

    /// Number of batches per pass
    pub fn num_batches(&self) -> usize {
        self.x.rows.div_ceil(self.batch_size)
    }
}

impl Iterator for Batches<'_> {
    type Item = (Matrix, Matrix);

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.x.rows {
            return None;
        }
        let end = (self.position + self.batch_size).min(self.x.rows);
        let batch = (
            self.x.slice_rows(self.position, end),
            self.y.slice_rows(self.position, end),
        );
        self.position = end;
        Some(batch)
    }
}
