use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::export::export_csv;
use crate::data::filter::{FilterSelection, filtered_indices, full_selection};
use crate::data::insight;
use crate::data::metrics::{self, MetricSet};
use crate::data::model::{CellValue, Record, SurveyDataset};
use crate::data::schema;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded once at startup, shared read-only.
    pub dataset: Arc<SurveyDataset>,

    pub config: DashboardConfig,

    /// Per-column filter selections. Empty set = column unrestricted.
    pub selection: FilterSelection,

    /// Indices of records passing the current filters.
    pub visible_indices: Vec<usize>,

    /// Statistics of the visible records, recomputed on every filter change.
    pub metrics: MetricSet,

    pub insights: Vec<String>,

    /// Colours for adoption profiles (shared by charts and sidebar).
    pub profile_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: Arc<SurveyDataset>, config: DashboardConfig) -> Self {
        let profile_colors = ColorMap::new(
            schema::ADOPTION_PROFILE,
            dataset
                .unique_values
                .get(schema::ADOPTION_PROFILE)
                .unwrap_or(&BTreeSet::new()),
        );
        let mut state = Self {
            dataset,
            config,
            selection: FilterSelection::new(),
            visible_indices: Vec::new(),
            metrics: metrics::compute(&[]),
            insights: Vec::new(),
            profile_colors,
            status_message: None,
        };
        state.refilter();
        state
    }

    /// Filterable columns actually present in the dataset, in config order.
    pub fn filter_columns(&self) -> Vec<String> {
        self.config
            .filter_columns
            .iter()
            .filter(|c| self.dataset.has_column(c))
            .cloned()
            .collect()
    }

    /// The records passing the current filters.
    pub fn visible_records(&self) -> Vec<&Record> {
        self.visible_indices
            .iter()
            .map(|&i| &self.dataset.records[i])
            .collect()
    }

    /// Recompute visible rows, metrics and insights after a filter change.
    pub fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.dataset, &self.selection);
        let metrics = metrics::compute(&self.visible_records());
        self.insights = insight::generate(&metrics);
        self.metrics = metrics;
        log::debug!(
            "Filters {:?} → {} of {} records",
            self.selection,
            self.visible_indices.len(),
            self.dataset.len()
        );
    }

    /// Toggle a single value in a column's selection.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        let selected = self.selection.entry(column.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    /// Select every observed value of a column.
    pub fn select_all(&mut self, column: &str) {
        self.selection.extend(full_selection(&self.dataset, &[column]));
        self.refilter();
    }

    /// Drop a column's restriction.
    pub fn clear(&mut self, column: &str) {
        self.selection.remove(column);
        self.refilter();
    }

    /// Write the visible records to `path` as CSV and report the outcome.
    pub fn export_visible(&mut self, path: &Path) {
        let result = export_csv(path, &self.dataset, &self.visible_records());
        self.status_message = Some(match result {
            Ok(()) => format!(
                "Exported {} rows to {}",
                self.visible_indices.len(),
                path.display()
            ),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                format!("Export failed: {e:#}")
            }
        });
    }
}
