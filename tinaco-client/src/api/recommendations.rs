/// Image payload for the photo recommendation endpoint. The bytes are opaque
/// here; picking and resizing happen upstream.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

impl PhotoUpload {
    /// The shape the mobile capture flow produces.
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            filename: "foto.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
        }
    }
}
