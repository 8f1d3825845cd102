use super::{GeolocationApi, GeolocationError};
use crate::model::Coordinate;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct TableEntry {
    #[serde(rename = "Lat", alias = "lat")]
    lat: f64,

    #[serde(rename = "Lng", alias = "lng")]
    lng: f64,
}

/// Geolocation backed by a fixed `"City, Country" -> {Lat, Lng}` table loaded once at startup.
///
/// Keys match exactly: case-sensitive with a single space after the comma. The table is never
/// mutated after construction, so clones share it.
#[derive(Debug, Clone)]
pub struct CityTableGeolocation {
    cities: Arc<HashMap<String, Coordinate>>,
}

impl CityTableGeolocation {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GeolocationError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| GeolocationError::LoadTable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, GeolocationError> {
        let entries: HashMap<String, TableEntry> =
            serde_json::from_slice(bytes).map_err(GeolocationError::ParseTable)?;

        let cities = entries
            .into_iter()
            .map(|(key, entry)| (key, Coordinate::new(entry.lat, entry.lng)))
            .collect();

        Ok(Self { cities: Arc::new(cities) })
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    fn lookup(&self, city: &str, country: &str) -> Option<Coordinate> {
        self.cities.get(&format!("{city}, {country}")).copied()
    }
}

#[async_trait]
impl GeolocationApi for CityTableGeolocation {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn find_coordinate(
        &self, city: &str, country: &str,
    ) -> Result<Coordinate, GeolocationError> {
        self.lookup(city, country).ok_or_else(|| GeolocationError::NotFound {
            city: city.to_string(),
            country: country.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const CITIES: &str = r#"{
        "Tokyo, Japan": {"Lat": 35.6897, "Lng": 139.6922},
        "Jakarta, Indonesia": {"Lat": -6.175, "Lng": 106.8275},
        "Delhi, India": {"Lat": 28.61, "Lng": 77.23},
        "Guangzhou, China": {"Lat": 23.13, "Lng": 113.26},
        "Sao Paulo, Brazil": {"Lat": -23.55, "Lng": -46.6333}
    }"#;

    fn table() -> CityTableGeolocation {
        CityTableGeolocation::from_slice(CITIES.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn test_find_existing_city_returns_stored_coordinate() {
        let table = table();
        assert_eq!(table.len(), 5);

        let actual = table.find_coordinate("Sao Paulo", "Brazil").await.unwrap();
        assert_eq!(actual, Coordinate::new(-23.55, -46.6333));

        let actual = table.find_coordinate("Delhi", "India").await.unwrap();
        assert_eq!(actual, Coordinate::new(28.61, 77.23));
    }

    #[tokio::test]
    async fn test_find_unknown_city_is_not_found() {
        let error = table().find_coordinate("Nowhere", "NoCountry").await.unwrap_err();
        match error {
            GeolocationError::NotFound { city, country } => {
                assert_eq!(city, "Nowhere");
                assert_eq!(country, "NoCountry");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_lookup_key_is_exact() {
        let table = table();
        for (city, country) in [("tokyo", "Japan"), ("Tokyo", "japan"), ("Tokyo ", "Japan"), ("Tokyo,", "Japan")]
        {
            let result = table.find_coordinate(city, country).await;
            assert!(
                matches!(result, Err(GeolocationError::NotFound { .. })),
                "[{city}], [{country}] should not match"
            );
        }
    }

    #[test]
    fn test_lowercase_field_names_are_accepted() {
        let table =
            CityTableGeolocation::from_slice(br#"{"Lima, Peru": {"lat": -12.06, "lng": -77.0375}}"#)
                .unwrap();
        assert_eq!(table.lookup("Lima", "Peru"), Some(Coordinate::new(-12.06, -77.0375)));
    }

    #[test]
    fn test_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CITIES.as_bytes()).unwrap();

        let table = CityTableGeolocation::from_path(file.path()).unwrap();
        assert_eq!(table.len(), 5);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_from_path_fails_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("local_city_source.json");

        let error = CityTableGeolocation::from_path(&missing).unwrap_err();
        match error {
            GeolocationError::LoadTable { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_path_fails_on_directory() {
        let dir = tempfile::tempdir().unwrap();
        let error = CityTableGeolocation::from_path(dir.path()).unwrap_err();
        assert!(matches!(error, GeolocationError::LoadTable { .. }));
    }

    #[test]
    fn test_invalid_json_fails_to_parse() {
        for content in ["", "} this is a broken json", r#"["Tokyo, Japan"]"#, r#"{"Tokyo, Japan": {"Lat": "north"}}"#] {
            let error = CityTableGeolocation::from_slice(content.as_bytes()).unwrap_err();
            assert!(
                matches!(error, GeolocationError::ParseTable(_)),
                "content {content:?} produced {error:?}"
            );
        }
    }
}
