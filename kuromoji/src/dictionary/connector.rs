use std::io::Read;

use crate::buffer::ByteBuffer;
use crate::errors::{Diagnostic, KuromojiError, Result, skip_line};

/// Dimensions of a connection cost table.
pub trait ConnectorView {
    /// Returns maximum number of left connection ID
    fn num_left(&self) -> usize;

    /// Returns maximum number of right connection ID
    fn num_right(&self) -> usize;
}

/// Lookup of connection costs.
pub trait ConnectorCost: ConnectorView {
    /// Gets the value of the connection matrix
    fn cost(&self, right_id: u16, left_id: u16) -> i32;
}

/// Matrix of connection costs.
///
/// Rows are indexed by the right id of the preceding word and columns by
/// the left id of the following word.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MatrixConnector {
    data: Vec<i16>,
    num_right: usize,
    num_left: usize,
}

impl MatrixConnector {
    /// Creates a zero-filled matrix.
    pub fn new(num_right: usize, num_left: usize) -> Self {
        Self {
            data: vec![0; num_right * num_left],
            num_right,
            num_left,
        }
    }

    #[inline(always)]
    fn index(&self, right_id: u16, left_id: u16) -> Option<usize> {
        let (right_id, left_id) = (usize::from(right_id), usize::from(left_id));
        (right_id < self.num_right && left_id < self.num_left)
            .then(|| right_id * self.num_left + left_id)
    }

    /// Stores a cost; ids outside the matrix are ignored.
    pub fn put(&mut self, right_id: u16, left_id: u16, cost: i16) -> bool {
        match self.index(right_id, left_id) {
            Some(index) => {
                self.data[index] = cost;
                true
            }
            None => false,
        }
    }

    /// Creates a matrix from `matrix.def`.
    ///
    /// The first line is `num_right num_left`; every following line is
    /// `right_id left_id cost`. Malformed or out-of-range lines are skipped
    /// and recorded in `diagnostics`.
    ///
    /// # Errors
    ///
    /// [`KuromojiError`] is returned when the input cannot be read or the
    /// header is malformed.
    pub fn from_reader<R>(mut rdr: R, diagnostics: &mut Vec<Diagnostic>) -> Result<Self>
    where
        R: Read,
    {
        const SOURCE: &str = "matrix.def";

        let mut text = String::new();
        rdr.read_to_string(&mut text)?;

        let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
        let (_, header) = lines
            .next()
            .ok_or_else(|| KuromojiError::invalid_format(SOURCE, "the header is missing"))?;
        let (num_right, num_left) = Self::parse_header(header)?;
        let mut conn = Self::new(num_right, num_left);

        for (i, line) in lines {
            let cols: Vec<_> = line.split_ascii_whitespace().collect();
            if cols.len() != 3 {
                skip_line(diagnostics, SOURCE, i + 1, line, "a line must have three columns");
                continue;
            }
            let (Ok(right_id), Ok(left_id), Ok(cost)) = (
                cols[0].parse::<u16>(),
                cols[1].parse::<u16>(),
                cols[2].parse::<i16>(),
            ) else {
                skip_line(diagnostics, SOURCE, i + 1, line, "invalid id or cost");
                continue;
            };
            if !conn.put(right_id, left_id, cost) {
                skip_line(diagnostics, SOURCE, i + 1, line, "id out of range");
            }
        }
        Ok(conn)
    }

    fn parse_header(line: &str) -> Result<(usize, usize)> {
        let cols: Vec<_> = line.split_ascii_whitespace().collect();
        if cols.len() != 2 {
            return Err(KuromojiError::invalid_format(
                "matrix.def",
                "the header must be `num_right num_left`",
            ));
        }
        // Dimensions are stored as i16 in the binary segment.
        let num_right = usize::try_from(cols[0].parse::<i16>()?)?;
        let num_left = usize::try_from(cols[1].parse::<i16>()?)?;
        Ok((num_right, num_left))
    }

    /// Serializes as `i16 num_right`, `i16 num_left` and the row-major costs.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = ByteBuffer::with_capacity(4 + self.data.len() * 2);
        buffer.put_i16(i16::try_from(self.num_right)?);
        buffer.put_i16(i16::try_from(self.num_left)?);
        for &cost in &self.data {
            buffer.put_i16(cost);
        }
        buffer.shrink();
        Ok(buffer.into_bytes())
    }

    /// Deserializes a matrix written by [`MatrixConnector::to_bytes`].
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mut buffer = ByteBuffer::from_bytes(bytes);
        let num_right = usize::try_from(buffer.read_i16()?)?;
        let num_left = usize::try_from(buffer.read_i16()?)?;
        let len = num_right * num_left;
        if buffer.remaining() != len * 2 {
            return Err(KuromojiError::invalid_format(
                "cc.dat",
                format!(
                    "expected {len} costs for a {num_right}x{num_left} matrix, found {} bytes",
                    buffer.remaining()
                ),
            ));
        }
        let mut data = Vec::with_capacity(len);
        for _ in 0..len {
            data.push(buffer.read_i16()?);
        }
        Ok(Self {
            data,
            num_right,
            num_left,
        })
    }
}

impl ConnectorView for MatrixConnector {
    #[inline(always)]
    fn num_left(&self) -> usize {
        self.num_left
    }

    #[inline(always)]
    fn num_right(&self) -> usize {
        self.num_right
    }
}

impl ConnectorCost for MatrixConnector {
    /// Returns 0 for ids outside the matrix.
    #[inline(always)]
    fn cost(&self, right_id: u16, left_id: u16) -> i32 {
        self.index(right_id, left_id)
            .map_or(0, |index| i32::from(self.data[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reader() {
        let data = "2 3\n0 0 0\n0 1 1\n0 2 2\n1 0 3\n1 1 4\n1 2 5\n";
        let mut diagnostics = vec![];
        let conn = MatrixConnector::from_reader(data.as_bytes(), &mut diagnostics).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(conn.num_right(), 2);
        assert_eq!(conn.num_left(), 3);
        assert_eq!(conn.cost(0, 0), 0);
        assert_eq!(conn.cost(0, 2), 2);
        assert_eq!(conn.cost(1, 0), 3);
        assert_eq!(conn.cost(1, 2), 5);
    }

    #[test]
    fn test_out_of_range_cost() {
        let data = "2 2\n1 1 -7\n";
        let conn = MatrixConnector::from_reader(data.as_bytes(), &mut vec![]).unwrap();
        assert_eq!(conn.cost(1, 1), -7);
        assert_eq!(conn.cost(2, 0), 0);
        assert_eq!(conn.cost(0, 2), 0);
        assert_eq!(conn.cost(u16::MAX, u16::MAX), 0);
    }

    #[test]
    fn test_malformed_lines() {
        let data = "2 2\n0 0\n0 0 x\n5 0 1\n1 0 -3\n";
        let mut diagnostics = vec![];
        let conn = MatrixConnector::from_reader(data.as_bytes(), &mut diagnostics).unwrap();
        let lines: Vec<_> = diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
        assert_eq!(conn.cost(1, 0), -3);
    }

    #[test]
    fn test_invalid_header() {
        assert!(MatrixConnector::from_reader("2\n0 0 0\n".as_bytes(), &mut vec![]).is_err());
        assert!(MatrixConnector::from_reader("".as_bytes(), &mut vec![]).is_err());
        assert!(MatrixConnector::from_reader("a b\n".as_bytes(), &mut vec![]).is_err());
    }

    #[test]
    fn test_bytes() {
        let data = "2 3\n0 2 -2\n1 1 300\n";
        let conn = MatrixConnector::from_reader(data.as_bytes(), &mut vec![]).unwrap();
        let bytes = conn.to_bytes().unwrap();
        assert_eq!(bytes.len(), 4 + 2 * 6);
        assert_eq!(MatrixConnector::from_bytes(bytes).unwrap(), conn);
    }

    #[test]
    fn test_bytes_size_mismatch() {
        let mut bytes = MatrixConnector::new(2, 2).to_bytes().unwrap();
        bytes.pop();
        assert!(MatrixConnector::from_bytes(bytes).is_err());
    }
}
