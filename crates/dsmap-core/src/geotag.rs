//! Image geolocation from embedded GPS metadata.
//!
//! Converts the sexagesimal GPS tags of an image into a decimal position.
//! Reading the tags is delegated to a [`TagReader`]; the conversion itself
//! is pure.

use crate::geo::LatLng;
use std::io::Cursor;
use thiserror::Error;

/// Latitude reference assumed when the tag is absent.
pub const DEFAULT_LATITUDE_REF: char = 'N';
/// Longitude reference assumed when the tag is absent.
pub const DEFAULT_LONGITUDE_REF: char = 'W';

/// Geolocation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoTagError {
    #[error("Image has no GPS location tags")]
    NoGeoTag,
}

/// GPS tags read from an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsTags {
    /// Degrees, minutes, seconds.
    pub latitude: [f64; 3],
    pub latitude_ref: Option<char>,
    /// Degrees, minutes, seconds.
    pub longitude: [f64; 3],
    pub longitude_ref: Option<char>,
}

impl GpsTags {
    /// Decimal position with hemisphere signs applied.
    pub fn to_latlng(&self) -> LatLng {
        let lat_ref = self
            .latitude_ref
            .unwrap_or(DEFAULT_LATITUDE_REF)
            .to_ascii_uppercase();
        let lng_ref = self
            .longitude_ref
            .unwrap_or(DEFAULT_LONGITUDE_REF)
            .to_ascii_uppercase();

        let lat = dms_to_decimal(self.latitude);
        let lng = dms_to_decimal(self.longitude);
        LatLng::new(
            if lat_ref == 'N' { lat } else { -lat },
            if lng_ref == 'W' { -lng } else { lng },
        )
    }
}

/// `degrees + minutes/60 + seconds/3600`.
pub fn dms_to_decimal(dms: [f64; 3]) -> f64 {
    dms[0] + dms[1] / 60.0 + dms[2] / 3600.0
}

/// Reads GPS tags from raw image bytes.
pub trait TagReader {
    /// Returns `None` when the bytes carry no usable GPS position.
    fn read_tags(&self, bytes: &[u8]) -> Option<GpsTags>;
}

/// [`TagReader`] backed by the EXIF block of JPEG, TIFF, PNG, HEIF or WebP files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifTagReader;

impl ExifTagReader {
    fn dms(exif: &exif::Exif, tag: exif::Tag) -> Option<[f64; 3]> {
        let field = exif.get_field(tag, exif::In::PRIMARY)?;
        match field.value {
            exif::Value::Rational(ref v) if v.len() >= 3 => {
                Some([v[0].to_f64(), v[1].to_f64(), v[2].to_f64()])
            }
            _ => None,
        }
    }

    fn reference(exif: &exif::Exif, tag: exif::Tag) -> Option<char> {
        let field = exif.get_field(tag, exif::In::PRIMARY)?;
        match field.value {
            exif::Value::Ascii(ref v) => v
                .first()
                .and_then(|s| s.first())
                .map(|&b| char::from(b))
                .filter(char::is_ascii_alphabetic),
            _ => None,
        }
    }
}

impl TagReader for ExifTagReader {
    fn read_tags(&self, bytes: &[u8]) -> Option<GpsTags> {
        let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif,
            Err(e) => {
                log::debug!("No EXIF data: {}", e);
                return None;
            }
        };
        Some(GpsTags {
            latitude: Self::dms(&exif, exif::Tag::GPSLatitude)?,
            latitude_ref: Self::reference(&exif, exif::Tag::GPSLatitudeRef),
            longitude: Self::dms(&exif, exif::Tag::GPSLongitude)?,
            longitude_ref: Self::reference(&exif, exif::Tag::GPSLongitudeRef),
        })
    }
}

/// An image file delivered by the file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Locate one image.
pub fn extract_location<R: TagReader + ?Sized>(
    reader: &R,
    bytes: &[u8],
) -> Result<LatLng, GeoTagError> {
    reader
        .read_tags(bytes)
        .map(|tags| tags.to_latlng())
        .ok_or(GeoTagError::NoGeoTag)
}

/// Locate every image independently; one failure never affects the others.
pub fn locate_batch<'a, R: TagReader + ?Sized>(
    reader: &R,
    files: &'a [ImageFile],
) -> Vec<(&'a str, Result<LatLng, GeoTagError>)> {
    files
        .iter()
        .map(|file| (file.name.as_str(), extract_location(reader, &file.bytes)))
        .collect()
}
