use std::io::Read;

use crate::DecodeError;

pub(crate) fn read_u32_le_array<const N: usize, R: Read + ?Sized>(reader: &mut R) -> std::io::Result<[u32; N]> {
    let mut buffer = [0; N];
    reader.read_exact(bytemuck::cast_slice_mut(buffer.as_mut_slice()))?;
    for i in buffer.iter_mut() {
        *i = u32::from_le(*i);
    }
    Ok(buffer)
}

pub(crate) fn read_u64_le_array<const N: usize, R: Read + ?Sized>(reader: &mut R) -> std::io::Result<[u64; N]> {
    let mut buffer = [0; N];
    reader.read_exact(bytemuck::cast_slice_mut(buffer.as_mut_slice()))?;
    for i in buffer.iter_mut() {
        *i = u64::from_le(*i);
    }
    Ok(buffer)
}

/// Fills `buffer` completely or reports how many bytes the reader had left.
///
/// Unlike [`Read::read_exact`], the error carries the expected and actual byte
/// counts.
pub(crate) fn read_exact_counted<R: Read + ?Sized>(
    reader: &mut R,
    buffer: &mut [u8],
) -> Result<(), DecodeError> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => {
                return Err(DecodeError::Truncated {
                    expected: buffer.len() as u64,
                    actual: filled as u64,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Skips `count` bytes of the reader.
pub(crate) fn skip_bytes<R: Read + ?Sized>(reader: &mut R, count: u64) -> Result<(), DecodeError> {
    let skipped = std::io::copy(&mut reader.take(count), &mut std::io::sink())?;
    if skipped != count {
        return Err(DecodeError::Truncated {
            expected: count,
            actual: skipped,
        });
    }
    Ok(())
}

/// An implementation of div_ceil to lower MSRV.
pub(crate) fn div_ceil<T>(a: T, b: T) -> T
where
    T: Copy
        + PartialEq
        + PartialOrd
        + From<u8>
        + std::ops::Div<Output = T>
        + std::ops::Rem<Output = T>
        + std::ops::Add<Output = T>,
{
    assert!(a >= T::from(0));
    assert!(b > T::from(0));

    let d = a / b;
    if a % b != T::from(0) {
        d + T::from(1)
    } else {
        d
    }
}

/// Rounds `n` up to the next multiple of 4.
pub(crate) const fn align4(n: u64) -> u64 {
    (n + 3) & !3
}

#[cold]
pub(crate) fn unlikely_branch() {}
