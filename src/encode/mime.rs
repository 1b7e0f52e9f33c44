/// Content type and file extension of an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageKind {
    pub mime: &'static str,
    pub extension: &'static str,
}

const PNG: ImageKind = ImageKind {
    mime: "image/png",
    extension: "png",
};

const JPEG: ImageKind = ImageKind {
    mime: "image/jpeg",
    extension: "jpg",
};

const WEBP: ImageKind = ImageKind {
    mime: "image/webp",
    extension: "webp",
};

/// Identifies an image upload by its leading bytes. Unknown data is sent
/// as PNG, the only format every image endpoint accepts.
pub fn sniff_image(bytes: &[u8]) -> ImageKind {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        PNG
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        JPEG
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        WEBP
    } else {
        tracing::warn!(
            "Unknown image signature {:02X?}, uploading as {}",
            &bytes[..bytes.len().min(4)],
            PNG.mime
        );
        PNG
    }
}

impl ImageKind {
    /// Part filename such as `mask.png`.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_signatures() {
        assert_eq!(sniff_image(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]), PNG);
        assert_eq!(sniff_image(&[0xFF, 0xD8, 0xFF, 0xE0]).extension, "jpg");

        let webp = sniff_image(b"RIFF\x00\x00\x00\x00WEBPVP8 ");
        assert_eq!(webp.mime, "image/webp");
        assert_eq!(webp.file_name("image"), "image.webp");
    }

    #[test]
    fn test_truncated_or_unknown_data_is_png() {
        assert_eq!(sniff_image(b"RIFF\x00\x00"), PNG);
        assert_eq!(sniff_image(&[0x00, 0x01, 0x02, 0x03]), PNG);
        assert_eq!(sniff_image(&[]).file_name("mask"), "mask.png");
    }
}
