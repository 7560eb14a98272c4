//! Choice lists behind the selection widgets.

use serde::Serialize;

use super::View;
use crate::config::types::{CityConfig, DashboardConfig};
use crate::domain::listing::{CityListings, ListingColumn};
use crate::repository::ListingRepository;

const FORECAST_SUFFIX: &str = " (Forecasted)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionItem {
    pub label: String,
    pub value: String,
}

impl OptionItem {
    fn same(value: &str) -> Self {
        Self {
            label: value.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityOption {
    pub name: String,
    /// False when the city's files could not be read at startup.
    pub loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateMark {
    pub index: usize,
    pub label: String,
    pub display_label: String,
    pub forecast_period: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionsView {
    pub city: String,
    pub neighbourhoods: Vec<OptionItem>,
    pub sort_keys: Vec<OptionItem>,
    pub extra_columns: Vec<OptionItem>,
}

pub fn city_options(configs: &[CityConfig], repo: &ListingRepository) -> Vec<CityOption> {
    configs
        .iter()
        .map(|c| CityOption {
            name: c.name.clone(),
            loaded: repo.contains(&c.name),
        })
        .collect()
}

pub fn neighbourhood_options(repo: &ListingRepository, city: &str) -> Vec<OptionItem> {
    repo.listings(city)
        .map(|l| l.neighbourhoods().into_iter().map(OptionItem::same).collect())
        .unwrap_or_default()
}

fn labelled_columns<'a>(
    keys: impl Iterator<Item = &'a String>,
    listings: &CityListings,
    dashboard: &DashboardConfig,
) -> Vec<OptionItem> {
    let mut items: Vec<OptionItem> = Vec::new();
    for key in keys {
        let present = key
            .parse::<ListingColumn>()
            .is_ok_and(|c| listings.has_column(c));
        if present && !items.iter().any(|i| &i.value == key) {
            items.push(OptionItem {
                label: dashboard.column_label(key).to_string(),
                value: key.clone(),
            });
        }
    }
    items
}

/// Default and additional columns the city's file carries.
pub fn sort_options(
    repo: &ListingRepository,
    city: &str,
    dashboard: &DashboardConfig,
) -> Vec<OptionItem> {
    repo.listings(city)
        .map(|l| {
            let keys = dashboard
                .default_columns
                .iter()
                .chain(&dashboard.additional_columns);
            labelled_columns(keys, l, dashboard)
        })
        .unwrap_or_default()
}

pub fn column_options(
    repo: &ListingRepository,
    city: &str,
    dashboard: &DashboardConfig,
) -> Vec<OptionItem> {
    repo.listings(city)
        .map(|l| labelled_columns(dashboard.additional_columns.iter(), l, dashboard))
        .unwrap_or_default()
}

pub fn date_marks(repo: &ListingRepository) -> Vec<DateMark> {
    repo.date_axis()
        .entries()
        .iter()
        .map(|e| DateMark {
            index: e.index,
            label: e.label.clone(),
            display_label: if e.forecast_label {
                format!("{}{FORECAST_SUFFIX}", e.label)
            } else {
                e.label.clone()
            },
            forecast_period: e.forecast_label,
        })
        .collect()
}

pub fn project_options(
    repo: &ListingRepository,
    city: &str,
    dashboard: &DashboardConfig,
) -> View<OptionsView> {
    if !repo.contains(city) {
        return View::invalid("Invalid city selected");
    }
    View::Ready(OptionsView {
        city: city.to_string(),
        neighbourhoods: neighbourhood_options(repo, city),
        sort_keys: sort_options(repo, city, dashboard),
        extra_columns: column_options(repo, city, dashboard),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{city_config, make_repository};
    use pretty_assertions::assert_eq;

    fn values(items: &[OptionItem]) -> Vec<&str> {
        items.iter().map(|i| i.value.as_str()).collect()
    }

    #[test]
    fn cities_flag_unloaded() {
        let repo = make_repository();
        let configs = vec![city_config("Rome, Italy"), city_config("Paris, France")];
        assert_eq!(
            city_options(&configs, &repo),
            vec![
                CityOption {
                    name: "Rome, Italy".into(),
                    loaded: true
                },
                CityOption {
                    name: "Paris, France".into(),
                    loaded: false
                },
            ]
        );
    }

    #[test]
    fn neighbourhoods_in_file_order() {
        let repo = make_repository();
        let items = neighbourhood_options(&repo, "Rome, Italy");
        assert_eq!(values(&items), vec!["Monti", "Trastevere"]);
        assert_eq!(items[0].label, "Monti");
        assert!(neighbourhood_options(&repo, "Atlantis").is_empty());
    }

    #[test]
    fn sort_options_are_labelled_and_filtered_by_schema() {
        let repo = make_repository();
        let dashboard = DashboardConfig::default();

        let rome = sort_options(&repo, "Rome, Italy", &dashboard);
        assert_eq!(rome.len(), 8);
        assert_eq!(rome[1].label, "Rating");
        assert_eq!(rome[7].label, "Positivity_Score(1to5)(NLP)");

        // Lisbon's file has no category column
        let lisbon = sort_options(&repo, "Lisbon, Portugal", &dashboard);
        assert!(!values(&lisbon).contains(&"category"));
        assert!(sort_options(&repo, "Atlantis", &dashboard).is_empty());
    }

    #[test]
    fn column_options_are_additional_only() {
        let repo = make_repository();
        let items = column_options(&repo, "Rome, Italy", &DashboardConfig::default());
        assert_eq!(
            values(&items),
            vec![
                "host_name",
                "number_of_reviews",
                "category",
                "Positivity_Score(1to5)"
            ]
        );
        assert_eq!(items[2].label, "Category(NLP)");
    }

    #[test]
    fn date_marks_flag_last_two() {
        let repo = make_repository();
        let marks = date_marks(&repo);
        let labels: Vec<&str> = marks.iter().map(|m| m.display_label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "2024-03",
                "2024-04",
                "2024-07 (Forecasted)",
                "2024-08 (Forecasted)"
            ]
        );
        assert_eq!(marks[2].label, "2024-07");
        assert!(marks[3].forecast_period);
    }

    #[test]
    fn options_for_unknown_city_are_invalid() {
        let repo = make_repository();
        let dashboard = DashboardConfig::default();
        assert!(!project_options(&repo, "Atlantis", &dashboard).is_ready());
        let view = project_options(&repo, "Rome, Italy", &dashboard)
            .into_ready()
            .unwrap();
        assert_eq!(view.neighbourhoods.len(), 2);
    }
}
