use crate::acquisition::AcquisitionError;

/// Largest value a 12-bit sample can hold.
pub const MAX_SAMPLE: u16 = 0x0FFF;

/// Bytes needed to hold `count` packed 12-bit samples.
pub fn packed_len(count: usize) -> usize {
    (count * 3 + 1) / 2
}

/// Unpacks `out.len()` 12-bit samples from the sensor FIFO byte stream.
///
/// Two samples share three bytes, most significant nibble first:
/// `[a11..a4] [a3..a0 b11..b8] [b7..b0]`.
pub fn unpack_12bit(packed: &[u8], out: &mut [u16]) -> Result<(), AcquisitionError> {
    let needed = packed_len(out.len());
    if packed.len() < needed {
        return Err(AcquisitionError::PacketTooShort {
            needed,
            actual: packed.len(),
        });
    }

    for (i, value) in out.iter_mut().enumerate() {
        let byte = (i * 3) / 2;
        *value = if i % 2 == 0 {
            (u16::from(packed[byte]) << 4) | (u16::from(packed[byte + 1]) >> 4)
        } else {
            (u16::from(packed[byte] & 0x0F) << 8) | u16::from(packed[byte + 1])
        };
    }
    Ok(())
}

/// Packs samples into the FIFO byte layout read by [`unpack_12bit`].
/// Values above [`MAX_SAMPLE`] are truncated to their low 12 bits.
pub fn pack_12bit(samples: &[u16], packed: &mut [u8]) -> Result<(), AcquisitionError> {
    let needed = packed_len(samples.len());
    if packed.len() < needed {
        return Err(AcquisitionError::PacketTooShort {
            needed,
            actual: packed.len(),
        });
    }

    packed[..needed].fill(0);
    for (i, &sample) in samples.iter().enumerate() {
        let value = sample & MAX_SAMPLE;
        let byte = (i * 3) / 2;
        if i % 2 == 0 {
            packed[byte] = (value >> 4) as u8;
            packed[byte + 1] |= ((value & 0x0F) << 4) as u8;
        } else {
            packed[byte] |= (value >> 8) as u8;
            packed[byte + 1] = (value & 0xFF) as u8;
        }
    }
    Ok(())
}
