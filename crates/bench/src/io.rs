//! Readers for the benchmark input formats.
//!
//! `.fvecs` / `.ivecs`: a sequence of records `{dim: i32 LE, dim × payload}`
//! where the payload is f32 (fvecs) or i32 (ivecs). Every record must carry
//! the same dim; a short record is an error, not an EOF.
//!
//! Attribute files: one `key value` pair per line, whitespace-separated.
//! Query-range files: one `L-R` pair per line, split on the first hyphen.
//! Both may start with a header line, detected by a non-integer first token.

use rangehnsw_core::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Read an `.fvecs` file into `(dim, flat row-major data)`.
pub fn read_fvecs(path: &Path) -> Result<(usize, Vec<f32>)> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut dim: Option<usize> = None;
    let mut data: Vec<f32> = Vec::new();
    let mut header = [0u8; 4];

    loop {
        match reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
        let record_dim = i32::from_le_bytes(header);
        if record_dim <= 0 {
            return Err(Error::input_shape(format!(
                "{}: non-positive record dimension {record_dim}",
                path.display()
            )));
        }
        let record_dim = record_dim as usize;
        match dim {
            None => dim = Some(record_dim),
            Some(d) if d != record_dim => {
                return Err(Error::input_shape(format!(
                    "{}: record dimension changed from {d} to {record_dim}",
                    path.display()
                )));
            }
            Some(_) => {}
        }

        let mut payload = vec![0u8; record_dim * 4];
        reader.read_exact(&mut payload).map_err(|_| {
            Error::input_shape(format!("{}: truncated vector record", path.display()))
        })?;
        data.extend(
            payload
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        );
    }

    match dim {
        Some(d) => Ok((d, data)),
        None => Err(Error::input_shape(format!(
            "{}: file contains no vectors",
            path.display()
        ))),
    }
}

/// Read an `.ivecs` file (groundtruth) into one row of i32 ids per record.
pub fn read_ivecs(path: &Path) -> Result<Vec<Vec<i32>>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut rows: Vec<Vec<i32>> = Vec::new();
    let mut header = [0u8; 4];

    loop {
        match reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
        let record_dim = i32::from_le_bytes(header);
        if record_dim < 0 {
            return Err(Error::input_shape(format!(
                "{}: negative record dimension {record_dim}",
                path.display()
            )));
        }
        let mut payload = vec![0u8; record_dim as usize * 4];
        reader.read_exact(&mut payload).map_err(|_| {
            Error::input_shape(format!("{}: truncated groundtruth record", path.display()))
        })?;
        rows.push(
            payload
                .chunks_exact(4)
                .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        );
    }

    Ok(rows)
}

/// Read an attribute file of `key value` lines into parallel arrays.
/// An optional header line (non-integer first token) is skipped.
pub fn read_attributes(path: &Path) -> Result<(Vec<i32>, Vec<i32>)> {
    let reader = BufReader::new(File::open(path)?);
    let mut keys = Vec::new();
    let mut values = Vec::new();
    let mut first_line = true;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let first = tokens.next().unwrap_or_default();
        if first_line {
            first_line = false;
            if first.parse::<i32>().is_err() {
                continue; // header
            }
        }
        let key: i32 = first.parse().map_err(|_| {
            Error::input_shape(format!(
                "{}:{}: non-integer key '{first}'",
                path.display(),
                line_no + 1
            ))
        })?;
        let value_token = tokens.next().ok_or_else(|| {
            Error::input_shape(format!(
                "{}:{}: missing attribute value",
                path.display(),
                line_no + 1
            ))
        })?;
        let value: i32 = value_token.parse().map_err(|_| {
            Error::input_shape(format!(
                "{}:{}: non-integer value '{value_token}'",
                path.display(),
                line_no + 1
            ))
        })?;
        if tokens.next().is_some() {
            return Err(Error::input_shape(format!(
                "{}:{}: more than two values on line",
                path.display(),
                line_no + 1
            )));
        }
        keys.push(key);
        values.push(value);
    }

    Ok((keys, values))
}

/// Read a query-range file of `L-R` lines. An optional header line is
/// skipped when it does not parse as a pair of integers.
pub fn read_ranges(path: &Path) -> Result<Vec<(i32, i32)>> {
    let reader = BufReader::new(File::open(path)?);
    let mut ranges = Vec::new();
    let mut first_line = true;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed = parse_range_line(line);
        if first_line {
            first_line = false;
            if parsed.is_none() {
                continue; // header
            }
        }
        match parsed {
            Some(pair) => ranges.push(pair),
            None => {
                return Err(Error::input_shape(format!(
                    "{}:{}: invalid range line '{line}'",
                    path.display(),
                    line_no + 1
                )));
            }
        }
    }

    Ok(ranges)
}

fn parse_range_line(line: &str) -> Option<(i32, i32)> {
    let (low, high) = line.split_once('-')?;
    Some((low.trim().parse().ok()?, high.trim().parse().ok()?))
}

/// Parse a comma-separated integer list such as `4,8,16` or `[4,8,16]`.
pub fn parse_int_list(input: &str) -> Result<Vec<usize>> {
    let cleaned: String = input
        .chars()
        .filter(|&c| c != '[' && c != ']' && !c.is_whitespace())
        .collect();
    cleaned
        .split(',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<usize>()
                .map_err(|_| Error::parameter(format!("invalid integer '{token}' in list")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_fvecs(records: &[&[f32]]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for rec in records {
            file.write_all(&(rec.len() as i32).to_le_bytes()).unwrap();
            for v in *rec {
                file.write_all(&v.to_le_bytes()).unwrap();
            }
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_fvecs_roundtrip() {
        let file = write_fvecs(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]);
        let (dim, data) = read_fvecs(file.path()).unwrap();
        assert_eq!(dim, 2);
        assert_eq!(data, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_read_fvecs_dim_change_rejected() {
        let file = write_fvecs(&[&[1.0, 2.0], &[3.0]]);
        assert!(read_fvecs(file.path()).is_err());
    }

    #[test]
    fn test_read_fvecs_truncated_record_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&4i32.to_le_bytes()).unwrap();
        file.write_all(&1.0f32.to_le_bytes()).unwrap(); // 1 of 4 floats
        file.flush().unwrap();
        assert!(read_fvecs(file.path()).is_err());
    }

    #[test]
    fn test_read_fvecs_empty_file_rejected() {
        let file = NamedTempFile::new().unwrap();
        assert!(read_fvecs(file.path()).is_err());
    }

    #[test]
    fn test_read_ivecs() {
        let mut file = NamedTempFile::new().unwrap();
        for row in [[5i32, 7, 9].as_slice(), [2i32].as_slice()] {
            file.write_all(&(row.len() as i32).to_le_bytes()).unwrap();
            for v in row {
                file.write_all(&v.to_le_bytes()).unwrap();
            }
        }
        file.flush().unwrap();
        let rows = read_ivecs(file.path()).unwrap();
        assert_eq!(rows, vec![vec![5, 7, 9], vec![2]]);
    }

    #[test]
    fn test_read_attributes_plain() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0 42\n1 -7\n2 100").unwrap();
        let (keys, values) = read_attributes(file.path()).unwrap();
        assert_eq!(keys, vec![0, 1, 2]);
        assert_eq!(values, vec![42, -7, 100]);
    }

    #[test]
    fn test_read_attributes_skips_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "key value\n0 10\n1 20").unwrap();
        let (keys, values) = read_attributes(file.path()).unwrap();
        assert_eq!(keys, vec![0, 1]);
        assert_eq!(values, vec![10, 20]);
    }

    #[test]
    fn test_read_attributes_rejects_garbage() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0 10\n1 twenty").unwrap();
        assert!(read_attributes(file.path()).is_err());
    }

    #[test]
    fn test_read_ranges_with_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "range\n10-20\n0-999").unwrap();
        let ranges = read_ranges(file.path()).unwrap();
        assert_eq!(ranges, vec![(10, 20), (0, 999)]);
    }

    #[test]
    fn test_read_ranges_bad_line_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "10-20\nnope").unwrap();
        assert!(read_ranges(file.path()).is_err());
    }

    #[test]
    fn test_parse_int_list() {
        assert_eq!(parse_int_list("4,8,16").unwrap(), vec![4, 8, 16]);
        assert_eq!(parse_int_list("[4, 8, 16]").unwrap(), vec![4, 8, 16]);
        assert!(parse_int_list("4,x").is_err());
    }
}
