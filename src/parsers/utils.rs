//! Common reading utilities

use std::io::{self, Read};

/// Fill `buf` from `r`, stopping early only at end of stream.
///
/// Returns the number of bytes read; anything short of `buf.len()` means the
/// source is exhausted. Unlike `read_exact` the partial bytes stay usable.
pub fn read_full<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Slide `window` one byte forward: drop its first byte and append the next
/// byte from `r`. Returns `false` when the source has no byte left.
pub fn shift_in<R: Read + ?Sized>(r: &mut R, window: &mut [u8]) -> io::Result<bool> {
    if window.is_empty() {
        return Ok(false);
    }
    window.copy_within(1.., 0);
    let last = window.len() - 1;
    Ok(read_full(r, &mut window[last..])? == 1)
}
