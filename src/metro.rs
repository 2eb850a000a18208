//! Metro area composition: which counties make up each dashboard area.
//!
//! The table is static configuration. It can be loaded from a JSON object
//! mapping area names to ordered county lists:
//! ```json
//! {
//!   "Austin": ["Travis", "Williamson", "Hays"],
//!   "El Paso": ["El Paso"]
//! }
//! ```

use indexmap::IndexMap;

use crate::error::{Error, Result};

const TEXAS_METROS: &[(&str, &[&str])] = &[
    (
        "Houston",
        &["Harris", "Fort Bend", "Montgomery", "Brazoria", "Galveston"],
    ),
    ("Dallas-Fort Worth", &["Dallas", "Tarrant", "Collin", "Denton"]),
    ("San Antonio", &["Bexar", "Comal", "Guadalupe"]),
    ("Austin", &["Travis", "Williamson", "Hays"]),
    ("El Paso", &["El Paso"]),
    ("Rio Grande Valley", &["Hidalgo", "Cameron"]),
    ("Corpus Christi", &["Nueces", "San Patricio"]),
    ("Lubbock", &["Lubbock"]),
];

#[derive(Debug, Clone, PartialEq)]
pub struct MetroComposition {
    areas: IndexMap<String, Vec<String>>,
}

impl MetroComposition {
    /// The eight largest Texas metro areas.
    pub fn texas_default() -> Self {
        let areas = TEXAS_METROS
            .iter()
            .map(|(area, counties)| {
                let counties = counties.iter().map(|c| c.to_string()).collect();
                (area.to_string(), counties)
            })
            .collect();
        Self { areas }
    }

    /// Builds a table, rejecting areas with no counties.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut areas = IndexMap::new();
        for (area, counties) in entries {
            if counties.is_empty() {
                return Err(Error::Schema(format!("metro area '{area}' has no counties")));
            }
            areas.insert(area, counties);
        }
        Ok(Self { areas })
    }

    /// Loads the table from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::unavailable(path, e))?;
        let entries: IndexMap<String, Vec<String>> = serde_json::from_str(&content)
            .map_err(|e| Error::Schema(format!("metro config {path}: {e}")))?;
        Self::from_entries(entries)
    }

    pub fn contains(&self, area: &str) -> bool {
        self.areas.contains_key(area)
    }

    /// Constituent counties of `area`, in configured order.
    pub fn counties(&self, area: &str) -> Result<&[String]> {
        self.areas
            .get(area)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::InvalidArea(area.to_string()))
    }

    /// Markdown sentence naming the counties behind an area view.
    pub fn describe(&self, area: &str) -> Result<String> {
        let counties = self.counties(area)?;
        let noun = if counties.len() == 1 { "county" } else { "counties" };
        Ok(format!(
            "The **{area}** area view includes data from {} {noun}",
            join_counties(counties)
        ))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.areas.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// `A`, `A and B`, `A, B and C`.
fn join_counties(counties: &[String]) -> String {
    match counties {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &[&str])]) -> MetroComposition {
        MetroComposition::from_entries(entries.iter().map(|(a, cs)| {
            (a.to_string(), cs.iter().map(|c| c.to_string()).collect())
        }))
        .unwrap()
    }

    #[test]
    fn test_describe_single_county() {
        let metros = MetroComposition::texas_default();
        assert_eq!(
            metros.describe("El Paso").unwrap(),
            "The **El Paso** area view includes data from El Paso county"
        );
    }

    #[test]
    fn test_describe_two_counties_has_no_comma() {
        let metros = table(&[("X", &["A", "B"])]);
        assert_eq!(
            metros.describe("X").unwrap(),
            "The **X** area view includes data from A and B counties"
        );
    }

    #[test]
    fn test_describe_four_counties() {
        let metros = table(&[("X", &["A", "B", "C", "D"])]);
        assert_eq!(
            metros.describe("X").unwrap(),
            "The **X** area view includes data from A, B, C and D counties"
        );
    }

    #[test]
    fn test_unknown_area_is_invalid() {
        let metros = MetroComposition::texas_default();
        assert!(matches!(metros.describe("Waco"), Err(Error::InvalidArea(_))));
        assert!(matches!(metros.counties("Waco"), Err(Error::InvalidArea(_))));
    }

    #[test]
    fn test_counties_keep_configured_order() {
        let metros = MetroComposition::texas_default();
        assert_eq!(
            metros.counties("Austin").unwrap(),
            &["Travis", "Williamson", "Hays"]
        );
        assert_eq!(metros.iter().next().unwrap().0, "Houston");
    }

    #[test]
    fn test_empty_area_rejected() {
        let err = MetroComposition::from_entries(vec![("X".to_string(), vec![])]).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("texas_rt_metro_test.json");
        std::fs::write(&path, r#"{"Waco": ["McLennan"], "Tyler": ["Smith", "Gregg"]}"#).unwrap();

        let metros = MetroComposition::load(path.to_str().unwrap()).unwrap();
        assert_eq!(metros.counties("Tyler").unwrap(), &["Smith", "Gregg"]);
        assert!(metros.contains("Waco"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file_is_unavailable() {
        let err = MetroComposition::load("/nonexistent/texas_rt/metros.json").unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }
}
