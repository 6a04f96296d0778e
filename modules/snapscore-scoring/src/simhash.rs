//! Perceptual hashing and near-duplicate detection.
//!
//! An 8×8 average hash (64 bits, hex-encoded) compared by Hamming distance
//! against the user's previously completed submissions in the same event.
//! This is anti-spam, not forensics: it must never block the pipeline, so
//! hash failures produce a sentinel that is excluded from every comparison
//! instead of raising.

use image::imageops::FilterType;
use rand::Rng;
use tracing::{debug, warn};

/// Hamming distance at or below which two hashes count as near-duplicates.
/// 8 of 64 bits — roughly 12.5% divergence tolerance.
pub const DEFAULT_SIMILARITY_THRESHOLD: u32 = 8;

const HASH_SIZE: u32 = 8;
const ERROR_HASH_PREFIX: &str = "error_";

/// Compute the average hash of an image as a 16-char lowercase hex string.
///
/// On any decode/compute failure, returns an `error_NNNN` sentinel rather
/// than erroring; sentinels never match anything in similarity checks.
pub fn average_hash(image_bytes: &[u8]) -> String {
    match compute_hash(image_bytes) {
        Ok(bits) => {
            let hash = format!("{bits:016x}");
            debug!(hash = %hash, "computed average hash");
            hash
        }
        Err(err) => {
            warn!(error = %err, "average hash failed, emitting sentinel");
            format!("{ERROR_HASH_PREFIX}{}", rand::rng().random_range(1000..10000))
        }
    }
}

fn compute_hash(image_bytes: &[u8]) -> Result<u64, image::ImageError> {
    let img = image::load_from_memory(image_bytes)?;
    let small = img
        .resize_exact(HASH_SIZE, HASH_SIZE, FilterType::Triangle)
        .to_luma8();

    let pixels: Vec<u8> = small.pixels().map(|p| p.0[0]).collect();
    let mean = pixels.iter().map(|&p| u32::from(p)).sum::<u32>() as f64 / pixels.len() as f64;

    // MSB-first: top-left pixel is the highest bit.
    let mut bits = 0u64;
    for &p in &pixels {
        bits <<= 1;
        if f64::from(p) > mean {
            bits |= 1;
        }
    }
    Ok(bits)
}

/// Whether a stored hash is the failure sentinel.
pub fn is_error_hash(hash: &str) -> bool {
    hash.starts_with(ERROR_HASH_PREFIX)
}

/// Hamming distance between two hex hashes; `None` if either fails to parse.
pub fn hamming_distance(a: &str, b: &str) -> Option<u32> {
    let a = u64::from_str_radix(a, 16).ok()?;
    let b = u64::from_str_radix(b, 16).ok()?;
    Some((a ^ b).count_ones())
}

/// True if `new_hash` is within `threshold` bits of any stored hash.
///
/// Error sentinels on either side are skipped — a failed hash is never
/// treated as similar and never matched against. Unparseable stored hashes
/// are skipped individually rather than failing the whole check.
pub fn is_similar(new_hash: &str, existing_hashes: &[String], threshold: u32) -> bool {
    if is_error_hash(new_hash) {
        warn!("skipping similarity check: new hash is an error sentinel");
        return false;
    }

    for existing in existing_hashes {
        if is_error_hash(existing) {
            continue;
        }
        match hamming_distance(new_hash, existing) {
            Some(distance) => {
                debug!(new = %new_hash, existing = %existing, distance, "hash comparison");
                if distance <= threshold {
                    warn!(distance, threshold, "near-duplicate submission detected");
                    return true;
                }
            }
            None => {
                warn!(existing = %existing, "unparseable stored hash, skipping");
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_bytes(img: RgbImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn gradient_image() -> Vec<u8> {
        png_bytes(RgbImage::from_fn(64, 64, |x, y| {
            image::Rgb([(x * 4) as u8, (y * 4) as u8, 128])
        }))
    }

    fn checker_image() -> Vec<u8> {
        png_bytes(RgbImage::from_fn(64, 64, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([0, 0, 0])
            }
        }))
    }

    #[test]
    fn hashing_is_idempotent() {
        let bytes = gradient_image();
        assert_eq!(average_hash(&bytes), average_hash(&bytes));
    }

    #[test]
    fn hash_is_16_hex_chars() {
        let hash = average_hash(&gradient_image());
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn undecodable_bytes_yield_error_sentinel() {
        let hash = average_hash(b"not an image at all");
        assert!(is_error_hash(&hash));
    }

    #[test]
    fn identical_hash_is_similar_at_distance_zero() {
        let hash = average_hash(&gradient_image());
        assert!(is_similar(&hash, &[hash.clone()], DEFAULT_SIMILARITY_THRESHOLD));
    }

    #[test]
    fn distant_hashes_are_not_similar() {
        // 0x0000.. vs 0xffff.. is 64 bits apart.
        let existing = vec!["ffffffffffffffff".to_string()];
        assert!(!is_similar("0000000000000000", &existing, 8));
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // 0xff = 8 set bits.
        let existing = vec!["00000000000000ff".to_string()];
        assert!(is_similar("0000000000000000", &existing, 8));
        let nine_bits = vec!["00000000000001ff".to_string()];
        assert!(!is_similar("0000000000000000", &nine_bits, 8));
    }

    #[test]
    fn error_sentinel_never_matches_either_side() {
        let hash = average_hash(&gradient_image());
        assert!(!is_similar("error_1234", &[hash.clone()], 64));
        assert!(!is_similar(&hash, &["error_9999".to_string()], 64));
    }

    #[test]
    fn unparseable_stored_hashes_are_skipped() {
        let existing = vec!["zzzz".to_string(), "0000000000000000".to_string()];
        assert!(is_similar("0000000000000001", &existing, 8));
    }

    #[test]
    fn different_images_hash_apart() {
        let a = average_hash(&gradient_image());
        let b = average_hash(&checker_image());
        assert!(hamming_distance(&a, &b).unwrap() > DEFAULT_SIMILARITY_THRESHOLD);
    }
}
