/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! TFRecord stream framing
//! ```diagram
//!   ┌──────────┬────────────────┬──────────────┬───────────────┐
//!   │ len: u64 │ crc(len): u32  │ data[len]    │ crc(data): u32│   (all little endian)
//!   └──────────┴────────────────┴──────────────┴───────────────┘
//! ```
//! crc values are *masked* CRC32C checksums

use std::{fs::File, io::{self,BufReader,BufWriter,Read,Write,ErrorKind}, path::{Path,PathBuf}};
use flate2::{Compression, read::MultiGzDecoder, write::GzEncoder};
use tracing::debug;

use crate::errors::*;

const MASK_DELTA: u32 = 0xa282_ead8;

/// the checksum that is stored in TFRecord headers and trailers
pub fn masked_crc32c (data: &[u8])->u32 {
    let crc = crc32c::crc32c(data);
    ((crc >> 15) | (crc << 17)).wrapping_add(MASK_DELTA)
}

/// is this a GZIP compressed record file (by naming convention)
pub fn is_compressed_path (path: impl AsRef<Path>)->bool {
    path.as_ref().extension().map( |ext| ext.eq_ignore_ascii_case("gz")).unwrap_or(false)
}

/* #region reader ***************************************************************************************/

pub struct TfRecordReader<R: Read> {
    reader: R,
    verify_crc: bool,
    n_records: usize,
    is_done: bool,
}

impl<R: Read> TfRecordReader<R> {
    pub fn new (reader: R)->Self {
        TfRecordReader { reader, verify_crc: true, n_records: 0, is_done: false }
    }

    pub fn with_crc_check (mut self, verify_crc: bool)->Self {
        self.verify_crc = verify_crc;
        self
    }

    /// number of records read so far
    pub fn n_records (&self)->usize { self.n_records }

    /// read the next record payload. Returns `Ok(None)` on a clean EOF at a record boundary
    pub fn read_record (&mut self)->Result<Option<Vec<u8>>> {
        let mut len_buf = [0u8; 8];
        if !read_exact_or_eof( &mut self.reader, &mut len_buf)? {
            return Ok(None)
        }

        let mut crc_buf = [0u8; 4];
        read_exact_in_record( &mut self.reader, &mut crc_buf, self.n_records, "length crc")?;
        if self.verify_crc && u32::from_le_bytes(crc_buf) != masked_crc32c(&len_buf) {
            return Err( corrupt_record( format!("length checksum mismatch in record {}", self.n_records)))
        }

        // the length is untrusted if crc checks are off, don't pre-allocate it
        let len = u64::from_le_bytes(len_buf);
        let mut data = Vec::new();
        let n = (&mut self.reader).take(len).read_to_end( &mut data)?;
        if (n as u64) < len {
            return Err( corrupt_record( format!("truncated payload in record {} ({n} of {len} bytes)", self.n_records)))
        }

        read_exact_in_record( &mut self.reader, &mut crc_buf, self.n_records, "payload crc")?;
        if self.verify_crc && u32::from_le_bytes(crc_buf) != masked_crc32c(&data) {
            return Err( corrupt_record( format!("payload checksum mismatch in record {}", self.n_records)))
        }

        self.n_records += 1;
        Ok(Some(data))
    }
}

impl<R: Read> Iterator for TfRecordReader<R> {
    type Item = Result<Vec<u8>>;

    fn next (&mut self)->Option<Self::Item> {
        if self.is_done { return None }

        match self.read_record() {
            Ok(Some(data)) => Some(Ok(data)),
            Ok(None) => { self.is_done = true; None }
            Err(e) => { self.is_done = true; Some(Err(e)) }
        }
    }
}

/// fill buf completely, return false if the stream was already at EOF
fn read_exact_or_eof<R: Read> (reader: &mut R, buf: &mut [u8])->Result<bool> {
    let mut n = 0;
    while n < buf.len() {
        match reader.read( &mut buf[n..]) {
            Ok(0) => {
                if n == 0 { return Ok(false) }
                return Err( corrupt_record( format!("truncated record header ({n} of {} bytes)", buf.len())))
            }
            Ok(k) => n += k,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into())
        }
    }
    Ok(true)
}

fn read_exact_in_record<R: Read> (reader: &mut R, buf: &mut [u8], idx: usize, what: &str)->Result<()> {
    reader.read_exact(buf).map_err( |e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            corrupt_record( format!("truncated {what} in record {idx}"))
        } else {
            e.into()
        }
    })
}

/// open a record file for reading, transparently decompressing `*.gz` files
pub fn open_record_file (path: impl AsRef<Path>)->Result<TfRecordReader<Box<dyn Read + Send>>> {
    let path = path.as_ref();
    let file = BufReader::new( File::open(path)?);

    let reader: Box<dyn Read + Send> = if is_compressed_path(path) {
        Box::new( MultiGzDecoder::new(file))
    } else {
        Box::new( file)
    };
    Ok( TfRecordReader::new(reader) )
}

/// a single record stream over the concatenation of several record files.
/// Files are opened lazily in the given order and each one is closed before the next is opened
pub struct RecordChain {
    paths: Vec<PathBuf>,
    next_path: usize,
    current: Option<TfRecordReader<Box<dyn Read + Send>>>,
    verify_crc: bool,
}

impl RecordChain {
    pub fn new (paths: Vec<PathBuf>)->Self {
        RecordChain { paths, next_path: 0, current: None, verify_crc: true }
    }

    pub fn with_crc_check (mut self, verify_crc: bool)->Self {
        self.verify_crc = verify_crc;
        self
    }

    pub fn n_files (&self)->usize { self.paths.len() }

    /// the file we are currently reading from (if any)
    pub fn current_path (&self)->Option<&Path> {
        if self.current.is_some() && self.next_path > 0 {
            Some( self.paths[self.next_path-1].as_path())
        } else {
            None
        }
    }

    pub fn read_record (&mut self)->Result<Option<Vec<u8>>> {
        loop {
            if let Some(reader) = &mut self.current {
                if let Some(data) = reader.read_record()? {
                    return Ok(Some(data))
                }
                let n_records = reader.n_records();
                debug!("read {} records from {:?}", n_records, self.current_path());
                self.current = None; // drops (closes) the exhausted file
            }

            if self.next_path >= self.paths.len() {
                return Ok(None)
            }

            let path = &self.paths[self.next_path];
            self.next_path += 1;
            self.current = Some( open_record_file(path)?.with_crc_check(self.verify_crc));
        }
    }
}

impl Iterator for RecordChain {
    type Item = Result<Vec<u8>>;

    fn next (&mut self)->Option<Self::Item> {
        match self.read_record() {
            Ok(Some(data)) => Some(Ok(data)),
            Ok(None) => None,
            Err(e) => {
                // don't keep reading past a fatal error
                self.current = None;
                self.next_path = self.paths.len();
                Some(Err(e))
            }
        }
    }
}

/* #endregion reader */

/* #region writer ***************************************************************************************/

pub struct TfRecordWriter<W: Write> {
    writer: W,
    n_records: usize,
}

impl<W: Write> TfRecordWriter<W> {
    pub fn new (writer: W)->Self {
        TfRecordWriter { writer, n_records: 0 }
    }

    pub fn n_records (&self)->usize { self.n_records }

    pub fn write_record (&mut self, data: &[u8])->Result<()> {
        let len_buf = (data.len() as u64).to_le_bytes();

        self.writer.write_all( &len_buf)?;
        self.writer.write_all( &masked_crc32c(&len_buf).to_le_bytes())?;
        self.writer.write_all( data)?;
        self.writer.write_all( &masked_crc32c(data).to_le_bytes())?;

        self.n_records += 1;
        Ok(())
    }

    pub fn flush (&mut self)->Result<()> {
        Ok( self.writer.flush()? )
    }

    pub fn into_inner (self)->W { self.writer }
}

/// the sink behind a record file, which is either plain or GZIP compressed
pub enum RecordFileSink<W: Write> {
    Plain(BufWriter<W>),
    Gzip(GzEncoder<BufWriter<W>>),
}

impl<W: Write> RecordFileSink<W> {
    pub fn new (w: W, compressed: bool)->Self {
        if compressed {
            RecordFileSink::Gzip( GzEncoder::new( BufWriter::new(w), Compression::default()))
        } else {
            RecordFileSink::Plain( BufWriter::new(w))
        }
    }

    /// write the GZIP trailer (if any) and flush all buffers. This has to be called before dropping the
    /// sink if write errors should be reported
    pub fn finish (self)->io::Result<W> {
        let buf_writer = match self {
            RecordFileSink::Plain(w) => w,
            RecordFileSink::Gzip(enc) => enc.finish()?
        };
        buf_writer.into_inner().map_err( |e| e.into_error())
    }
}

impl<W: Write> Write for RecordFileSink<W> {
    fn write (&mut self, buf: &[u8])->io::Result<usize> {
        match self {
            RecordFileSink::Plain(w) => w.write(buf),
            RecordFileSink::Gzip(w) => w.write(buf),
        }
    }

    fn flush (&mut self)->io::Result<()> {
        match self {
            RecordFileSink::Plain(w) => w.flush(),
            RecordFileSink::Gzip(w) => w.flush(),
        }
    }
}

impl<W: Write> TfRecordWriter<RecordFileSink<W>> {
    /// finish the underlying (possibly compressed) stream and return the raw sink
    pub fn finish (self)->Result<W> {
        Ok( self.writer.finish()? )
    }
}

/// create a record file for writing
pub fn create_record_file (path: impl AsRef<Path>, compressed: bool)->Result<TfRecordWriter<RecordFileSink<File>>> {
    let file = File::create( path.as_ref())?;
    Ok( TfRecordWriter::new( RecordFileSink::new( file, compressed)) )
}

/* #endregion writer */
