use image::imageops::FilterType;
use log::debug;
use ndarray::Array3;

use crate::{
    config::TaskConfig,
    error::{Result, TaskErr},
    http::HttpClient,
};

use super::{
    batch::TrainingBatch,
    metadata::{label_for, parse_manifest, DatasetRecord},
};

/// Streams the remote dataset: the CSV manifest first, then one image per
/// surviving record, strictly in manifest order.
pub struct DatasetLoader<'a, C> {
    client: &'a C,
    manifest_url: String,
    dataset_base_url: String,
    positive_label: String,
    image_side: usize,
}

impl<'a, C: HttpClient> DatasetLoader<'a, C> {
    pub fn new(client: &'a C, config: &TaskConfig) -> Self {
        Self {
            client,
            manifest_url: config.manifest_url.clone(),
            dataset_base_url: config.dataset_base_url.clone(),
            positive_label: config.positive_label.clone(),
            image_side: config.image_side,
        }
    }

    /// Fetches and parses the manifest. Restartable: every call re-fetches;
    /// nothing is cached.
    ///
    /// # Errors
    /// `TaskErr::Download` when the manifest cannot be fetched.
    pub async fn load_metadata(&self) -> Result<Vec<DatasetRecord>> {
        let body = self
            .client
            .get(&self.manifest_url)
            .await
            .map_err(|source| TaskErr::Download {
                resource: self.manifest_url.clone(),
                source,
            })?;

        let text = String::from_utf8_lossy(&body);
        Ok(parse_manifest(&text))
    }

    /// Fetches, decodes and normalizes every record's image, assembling the
    /// training batch. One missing image aborts the whole load.
    ///
    /// # Errors
    /// `TaskErr::ImageFetch` on a failed fetch (naming the image and URL),
    /// `TaskErr::ImageDecode` on undecodable bytes.
    pub async fn load_images(&self, records: &[DatasetRecord]) -> Result<TrainingBatch> {
        let mut images = Vec::with_capacity(records.len());
        let mut labels = Vec::with_capacity(records.len());

        for record in records {
            let url = format!("{}{}.jpg", self.dataset_base_url, record.image_id);

            let body = self
                .client
                .get(&url)
                .await
                .map_err(|source| TaskErr::ImageFetch {
                    image_id: record.image_id.clone(),
                    url: url.clone(),
                    source,
                })?;

            let tensor =
                decode_image(&body, self.image_side).map_err(|detail| TaskErr::ImageDecode {
                    image_id: record.image_id.clone(),
                    detail,
                })?;

            images.push(tensor);
            labels.push(label_for(&record.dx, &self.positive_label));
            debug!("fetched image {}", record.image_id);
        }

        TrainingBatch::new(images, labels)
    }
}

/// Decodes image bytes into a `(side, side, 3)` tensor: 3-channel decode,
/// nearest-neighbor resize, then every channel value divided by 255.
fn decode_image(bytes: &[u8], side: usize) -> std::result::Result<Array3<f32>, String> {
    let decoded = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let resized = decoded
        .resize_exact(side as u32, side as u32, FilterType::Nearest)
        .to_rgb8();

    let scaled: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|v| f32::from(v) / 255.)
        .collect();

    Array3::from_shape_vec((side, side, 3), scaled).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn jpeg_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
        buf.into_inner()
    }

    #[test]
    fn decode_resizes_and_normalizes() {
        let bytes = jpeg_bytes(10, 6, [255, 0, 128]);
        let tensor = decode_image(&bytes, 4).unwrap();

        assert_eq!(tensor.shape(), &[4, 4, 3]);
        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
        // Red channel of a uniform near-red image stays near 1.
        assert!(tensor[[0, 0, 0]] > 0.9);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_image(b"not an image", 4).is_err());
    }
}
