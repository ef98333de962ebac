use log::{debug, error, info};
use thiserror::Error;

use super::format::{
    dimension_from_byte, IconDir, IconImage, DIR_ENTRY_SIZE, HEADER_SIZE, ICON_TYPE,
};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Buffer of {0} bytes is too short for the container header")]
    InvalidHeader(usize),
    #[error("Reserved header field must be zero, found {0}")]
    NonZeroReserved(u16),
    #[error("Unsupported container type {0}")]
    UnsupportedType(u16),
    #[error("Unexpected end of data while reading directory entry #{0}")]
    TruncatedDirectory(usize),
    #[error("Image #{0} data at offset {1} with size {2} falls outside the buffer")]
    ImageOutOfBounds(usize, usize, usize),
    #[error("Failed to parse a container field")]
    FieldParsingFailed,
}

/// Parses an icon container back into its embedded images.
///
/// Directory bytes that do not affect payload recovery (color count,
/// reserved byte, planes, bit count) are read over without validation; a
/// zero-count container decodes to an empty image list.
pub fn decode(encoded_data: &[u8]) -> Result<IconDir, DecodeError> {
    let mut cursor = 0;

    // Check the fixed-size header
    if encoded_data.len() < HEADER_SIZE {
        error!(
            "Buffer of {} bytes cannot hold the container header",
            encoded_data.len()
        );
        return Err(DecodeError::InvalidHeader(encoded_data.len()));
    }

    let reserved = u16::from_le_bytes(
        encoded_data[cursor..cursor + IconImage::COUNT_FIELD_SIZE]
            .try_into()
            .map_err(|_| {
                error!("Failed to parse reserved field");
                DecodeError::FieldParsingFailed
            })?,
    );
    cursor += IconImage::COUNT_FIELD_SIZE;
    if reserved != 0 {
        error!("Reserved header field must be zero, found {}", reserved);
        return Err(DecodeError::NonZeroReserved(reserved));
    }

    let container_type = u16::from_le_bytes(
        encoded_data[cursor..cursor + IconImage::COUNT_FIELD_SIZE]
            .try_into()
            .map_err(|_| {
                error!("Failed to parse type field");
                DecodeError::FieldParsingFailed
            })?,
    );
    cursor += IconImage::COUNT_FIELD_SIZE;
    if container_type != ICON_TYPE {
        error!("Unsupported container type {}", container_type);
        return Err(DecodeError::UnsupportedType(container_type));
    }
    debug!("Header validated successfully");

    let count = u16::from_le_bytes(
        encoded_data[cursor..cursor + IconImage::COUNT_FIELD_SIZE]
            .try_into()
            .map_err(|_| {
                error!("Failed to parse image count");
                DecodeError::FieldParsingFailed
            })?,
    ) as usize;
    cursor += IconImage::COUNT_FIELD_SIZE;
    debug!("Directory entry count: {}", count);

    // Walk the directory and slice each payload out of the data section
    let mut images = Vec::with_capacity(count);
    for index in 0..count {
        if cursor + DIR_ENTRY_SIZE > encoded_data.len() {
            error!(
                "Unexpected end of data while reading directory entry #{}",
                index
            );
            return Err(DecodeError::TruncatedDirectory(index));
        }

        let width = dimension_from_byte(encoded_data[cursor]);
        let height = dimension_from_byte(encoded_data[cursor + 1]);
        let size = u32::from_le_bytes(
            encoded_data[cursor + 8..cursor + 8 + IconImage::OFFSET_FIELD_SIZE]
                .try_into()
                .map_err(|_| {
                    error!("Failed to parse size field of entry #{}", index);
                    DecodeError::FieldParsingFailed
                })?,
        ) as usize;
        let offset = u32::from_le_bytes(
            encoded_data[cursor + 12..cursor + 12 + IconImage::OFFSET_FIELD_SIZE]
                .try_into()
                .map_err(|_| {
                    error!("Failed to parse offset field of entry #{}", index);
                    DecodeError::FieldParsingFailed
                })?,
        ) as usize;
        cursor += DIR_ENTRY_SIZE;
        debug!(
            "Read directory entry #{}: {}x{}, {} bytes at offset {}",
            index, width, height, size, offset
        );

        if offset > encoded_data.len() || size > encoded_data.len() - offset {
            error!(
                "Image #{} data at offset {} with size {} falls outside the buffer",
                index, offset, size
            );
            return Err(DecodeError::ImageOutOfBounds(index, offset, size));
        }
        images.push(IconImage::new(
            width,
            height,
            encoded_data[offset..offset + size].to_vec(),
        ));
    }

    info!("Decoding process completed successfully");
    Ok(IconDir { images })
}
