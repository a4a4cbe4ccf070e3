//! Literal-data layer: packet framing and the bounded plaintext copy.

use crate::error::Result;
use crate::BUFFER_SIZE;
use sequoia_openpgp::serialize::stream::{LiteralWriter, Message};
use sequoia_openpgp::types::DataFormat;
use std::io::{ErrorKind, Read, Write};
use std::time::SystemTime;
use zeroize::Zeroizing;

/// File name marking literal data that did not come from a file
pub const CONSOLE_FILENAME: &str = "_CONSOLE";

/// Opens a binary literal-data packet over `inner`, stamped with the
/// current time.
pub fn literal_writer(inner: Message<'_>) -> Result<Message<'_>> {
    let writer = LiteralWriter::new(inner)
        .format(DataFormat::Binary)
        .filename(CONSOLE_FILENAME)?
        .date(SystemTime::now())?
        .build()?;
    Ok(writer)
}

/// Copies at most `length` bytes from `source` to `sink` through an
/// 8 KiB scratch buffer and returns the number of bytes copied.
///
/// Bytes past `length` are left unread. The scratch buffer is zeroed when it
/// goes out of scope, on success and on error alike.
pub fn copy_bounded<R, W>(source: R, sink: &mut W, length: u64) -> Result<u64>
where
    R: Read,
    W: Write + ?Sized,
{
    let mut buffer = Zeroizing::new(vec![0u8; BUFFER_SIZE]);
    let mut source = source.take(length);
    let mut copied = 0u64;

    loop {
        let read = match source.read(&mut buffer[..]) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        sink.write_all(&buffer[..read])?;
        copied += read as u64;
    }

    Ok(copied)
}
