use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// The outcome of comparing two files byte for byte.
#[derive(Debug)]
pub enum Equality {
    Equal,
    Different,
    /// The comparison couldn't finish. Treated as different.
    Unknown(io::Error),
}

impl Equality {
    pub fn is_equal(&self) -> bool {
        match *self {
            Equality::Equal => true,
            _ => false,
        }
    }
}

/// Compares the contents of two files, failing closed.
pub fn files_equal(a: &Path, b: &Path) -> Equality {
    if a == b {
        return Equality::Equal;
    }
    match file_contents_equal(a, b) {
        Ok(true) => Equality::Equal,
        Ok(false) => Equality::Different,
        Err(e) => {
            warn!("Couldn't compare {:?} with {:?}: {}", a, b, e);
            Equality::Unknown(e)
        }
    }
}

fn file_contents_equal(a: &Path, b: &Path) -> io::Result<bool> {
    debug!("Comparing {:?} with {:?}", a, b);
    let file_a = File::open(a)?;
    let file_b = File::open(b)?;

    let size_a = file_a.metadata()?.len();
    let size_b = file_b.metadata()?.len();
    if size_a != size_b {
        trace!("File sizes not equal: {} != {}", size_a, size_b);
        return Ok(false);
    }

    let mut reader_a = BufReader::new(file_a);
    let mut reader_b = BufReader::new(file_b);
    loop {
        let (len, same) = {
            let buf_a = reader_a.fill_buf()?;
            let buf_b = reader_b.fill_buf()?;

            // if one reaches eof and the other doesn't, then they aren't equal
            match (buf_a.is_empty(), buf_b.is_empty()) {
                (true, true) => return Ok(true),
                (true, false) | (false, true) => return Ok(false),
                _ => {}
            }

            let len = buf_a.len().min(buf_b.len());
            (len, buf_a[..len] == buf_b[..len])
        };

        if !same {
            return Ok(false);
        }
        reader_a.consume(len);
        reader_b.consume(len);
    }
}
