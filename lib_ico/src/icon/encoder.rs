use log::{debug, error, info};
use thiserror::Error;

use super::format::{
    dimension_to_byte, IconImage, BITS_PER_PIXEL, COLOR_PLANES, DIR_ENTRY_SIZE, HEADER_SIZE,
    ICON_TYPE, MAX_IMAGES,
};

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("No images supplied")]
    NoImages,
    #[error("Image count {0} exceeds the 16-bit directory limit of 65535 entries")]
    TooManyImages(usize),
    #[error("Image #{0} payload of {1} bytes exceeds the 32-bit size field")]
    PayloadTooLarge(usize, usize),
    #[error("Container of {0} bytes exceeds the 32-bit offset range")]
    ContainerTooLarge(usize),
}

/// Assembles independently encoded images into a single icon container.
///
/// # Parameters
/// - `images`: the images to embed, each carrying its pixel dimensions and a
///   complete payload (in practice PNG-encoded). Payloads are treated as
///   opaque bytes; directory entries are written in input order.
///
/// # Returns
/// A Result containing either the complete container buffer or an
/// `EncodingError`.
///
/// # Errors
/// - Returns `EncodingError::NoImages` if the image list is empty
/// - Returns `EncodingError::TooManyImages` if more than 65535 images are supplied
/// - Returns `EncodingError::PayloadTooLarge` if a payload does not fit the 32-bit size field
/// - Returns `EncodingError::ContainerTooLarge` if the assembled buffer would outgrow the 32-bit offset fields
pub fn encode(images: &[IconImage]) -> Result<Vec<u8>, EncodingError> {
    info!("Starting encoding with {} images", images.len());

    // Validate everything up front; no partial buffer is ever returned
    if images.is_empty() {
        error!("No images supplied");
        return Err(EncodingError::NoImages);
    }
    if images.len() > MAX_IMAGES {
        error!(
            "Image count {} exceeds the maximum allowed limit of {} entries",
            images.len(),
            MAX_IMAGES
        );
        return Err(EncodingError::TooManyImages(images.len()));
    }
    for (index, image) in images.iter().enumerate() {
        if u32::try_from(image.data.len()).is_err() {
            error!(
                "Image #{} payload of {} bytes exceeds the 32-bit size field",
                index,
                image.data.len()
            );
            return Err(EncodingError::PayloadTooLarge(index, image.data.len()));
        }
    }

    let directory_end = HEADER_SIZE + DIR_ENTRY_SIZE * images.len();
    let total_size = directory_end + images.iter().map(|image| image.data.len()).sum::<usize>();
    if u32::try_from(total_size).is_err() {
        error!(
            "Container of {} bytes exceeds the 32-bit offset range",
            total_size
        );
        return Err(EncodingError::ContainerTooLarge(total_size));
    }

    let mut encoded_data: Vec<u8> = Vec::with_capacity(total_size);

    // Step 1: Write header
    encoded_data.extend_from_slice(&0u16.to_le_bytes()); // Reserved
    encoded_data.extend_from_slice(&ICON_TYPE.to_le_bytes()); // Type
    encoded_data.extend_from_slice(&(images.len() as u16).to_le_bytes()); // Image count
    debug!(
        "Header written:\nType: {}\nCount: {}",
        ICON_TYPE,
        images.len()
    );

    // Step 2: Write directory entries, tracking a running payload offset
    // that starts right after the directory table
    let mut offset = directory_end as u32;
    for (index, image) in images.iter().enumerate() {
        encoded_data.push(dimension_to_byte(image.width)); // Width
        encoded_data.push(dimension_to_byte(image.height)); // Height
        encoded_data.push(0); // Color count
        encoded_data.push(0); // Reserved
        encoded_data.extend_from_slice(&COLOR_PLANES.to_le_bytes());
        encoded_data.extend_from_slice(&BITS_PER_PIXEL.to_le_bytes());
        encoded_data.extend_from_slice(&(image.data.len() as u32).to_le_bytes());
        encoded_data.extend_from_slice(&offset.to_le_bytes());
        debug!(
            "Directory entry #{} written: {}x{}, {} bytes at offset {}",
            index,
            image.width,
            image.height,
            image.data.len(),
            offset
        );
        offset += image.data.len() as u32;
    }

    // Step 3: Append payloads contiguously, in directory order
    for image in images {
        encoded_data.extend_from_slice(&image.data);
    }
    debug!(
        "Image data written: {} bytes",
        encoded_data.len() - directory_end
    );

    info!("Encoding process completed successfully");
    Ok(encoded_data)
}
