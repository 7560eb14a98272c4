use std::cmp::Ordering;

use serde::Serialize;

use super::View;
use crate::config::types::DashboardConfig;
use crate::domain::listing::{CellValue, Listing, ListingColumn};
use crate::domain::selection::{ResolvedSelection, SortOrder};
use crate::repository::ListingRepository;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub city: String,
    pub month: u32,
    pub neighbourhood: String,
    pub sort_key: String,
    pub sort_order: SortOrder,
    pub columns: Vec<TableColumn>,
    /// One entry per listing, cells in `columns` order.
    pub rows: Vec<Vec<CellValue>>,
}

/// Keeps the requested columns the city carries, in order, once each.
fn table_columns(
    requested: &[String],
    has_column: impl Fn(ListingColumn) -> bool,
) -> Vec<ListingColumn> {
    let mut columns = Vec::with_capacity(requested.len());
    for column in requested.iter().filter_map(|k| k.parse::<ListingColumn>().ok()) {
        if has_column(column) && !columns.contains(&column) {
            columns.push(column);
        }
    }
    columns
}

/// Orders by `key`, missing values last in either direction. Stable, so
/// ties keep file order.
fn sort_listings(listings: &mut Vec<(CellValue, &Listing)>, order: SortOrder) {
    listings.sort_by(|(a, _), (b, _)| match (a.is_missing(), b.is_missing()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) if order.is_ascending() => a.compare(b),
        (false, false) => b.compare(a),
    });
}

/// Listings matching city, month and neighbourhood exactly, sorted and
/// projected to the resolved columns.
pub fn project_table(
    repo: &ListingRepository,
    selection: &ResolvedSelection,
    dashboard: &DashboardConfig,
) -> View<TableView> {
    let Some(city) = repo.listings(&selection.city) else {
        return View::invalid("Invalid city selected");
    };
    let Some(neighbourhood) = selection.neighbourhood.as_deref() else {
        return View::invalid("No neighbourhood selected");
    };
    let sort_key = match selection.sort_key.parse::<ListingColumn>() {
        Ok(column) if city.has_column(column) => column,
        _ => {
            return View::invalid(format!(
                "Cannot sort {} listings by '{}'",
                selection.city, selection.sort_key
            ));
        }
    };

    let columns = table_columns(&selection.columns, |c| city.has_column(c));

    let mut matching: Vec<(CellValue, &Listing)> = city
        .listings
        .iter()
        .filter(|l| l.month == selection.month && l.neighbourhood_cleansed == neighbourhood)
        .map(|l| (l.cell(sort_key), l))
        .collect();
    sort_listings(&mut matching, selection.sort_order);

    let rows = matching
        .into_iter()
        .map(|(_, listing)| columns.iter().map(|c| listing.cell(*c)).collect())
        .collect();

    View::Ready(TableView {
        city: selection.city.clone(),
        month: selection.month,
        neighbourhood: neighbourhood.to_string(),
        sort_key: sort_key.key().to_string(),
        sort_order: selection.sort_order,
        columns: columns
            .iter()
            .map(|c| TableColumn {
                key: c.key().to_string(),
                label: dashboard.column_label(c.key()).to_string(),
            })
            .collect(),
        rows,
    })
}
